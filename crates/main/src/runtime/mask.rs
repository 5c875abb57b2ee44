////////////////////////////////////////////////////////////////////////////////
// This file is part of "Ad Astra", an embeddable scripting programming       //
// language platform.                                                         //
//                                                                            //
// This work is proprietary software with source-available code.              //
//                                                                            //
// To copy, use, distribute, or contribute to this work, you must agree to    //
// the terms of the General License Agreement:                                //
//                                                                            //
// https://github.com/Eliah-Lakhin/ad-astra/blob/master/EULA.md               //
//                                                                            //
// The agreement grants a Basic Commercial License, allowing you to use       //
// this work in non-commercial and limited commercial products with a total   //
// gross revenue cap. To remove this commercial limit for one of your         //
// products, you must acquire a Full Commercial License.                      //
//                                                                            //
// If you contribute to the source code, documentation, or related materials, //
// you must grant me an exclusive license to these contributions.             //
// Contributions are governed by the "Contributions" section of the General   //
// License Agreement.                                                         //
//                                                                            //
// Copying the work in parts is strictly forbidden, except as permitted       //
// under the General License Agreement.                                       //
//                                                                            //
// If you do not or cannot agree to the terms of this Agreement,              //
// do not use this work.                                                      //
//                                                                            //
// This work is provided "as is", without any warranties, express or implied, //
// except where such disclaimers are legally invalid.                         //
//                                                                            //
// Copyright (c) 2024 Ilya Lakhin (Илья Александрович Лахин).                 //
// All rights reserved.                                                       //
////////////////////////////////////////////////////////////////////////////////

use std::{
    fmt::{Debug, Display, Formatter},
    ops::{BitOr, BitOrAssign},
};

use crate::runtime::ObjectClass;

/// A kind of runtime value as seen by the calling convention.
///
/// The [Display] implementation prints the user-facing name of the kind
/// (e.g. `"integer"` or `"NULL"`), which is the name used in diagnostics.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum ValueKind {
    /// The absence of any value. Only callables that return nothing produce
    /// it.
    Void,

    /// The "nothing to report" value.
    Null,

    /// A vector of booleans.
    Logical,

    /// A vector of 64-bit integers.
    Int,

    /// A vector of 64-bit floats.
    Float,

    /// A vector of strings.
    String,

    /// A vector of object references of a single object class.
    Object,
}

impl Display for ValueKind {
    #[inline(always)]
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.name())
    }
}

impl ValueKind {
    /// Returns the user-facing name of this kind.
    #[inline(always)]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Void => "void",
            Self::Null => "NULL",
            Self::Logical => "logical",
            Self::Int => "integer",
            Self::Float => "float",
            Self::String => "string",
            Self::Object => "object",
        }
    }

    /// Returns the kind bit of the [TypeMask] that admits this kind.
    #[inline(always)]
    pub const fn mask(self) -> TypeMask {
        match self {
            Self::Void => TypeMask::VOID,
            Self::Null => TypeMask::NULL,
            Self::Logical => TypeMask::LOGICAL,
            Self::Int => TypeMask::INT,
            Self::Float => TypeMask::FLOAT,
            Self::String => TypeMask::STRING,
            Self::Object => TypeMask::OBJECT,
        }
    }
}

/// A bit set of admissible value kinds plus cardinality and arity modifiers.
///
/// The kind bits ([NULL](Self::NULL), [LOGICAL](Self::LOGICAL),
/// [INT](Self::INT), etc.) combine freely: `TypeMask::INT | TypeMask::STRING`
/// admits either an integer or a string vector. The modifier bits are:
///
///  - [OPTIONAL](Self::OPTIONAL): the parameter may be omitted, in which case
///    its default value is used.
///  - [SINGLETON](Self::SINGLETON): the value must have exactly one element.
///    A NULL value is exempt from this rule whenever NULL is admitted.
///  - [ELLIPSIS](Self::ELLIPSIS): marks the variadic tail of a signature.
///
/// [VOID](Self::VOID) is never implied by any other kind bit, including
/// [ANY](Self::ANY), and a well-formed mask never combines VOID with other
/// kinds.
///
/// The [Display] implementation renders the canonical short form used in
/// signature listings: `integer$`, kind letters such as `ifs` for mixed
/// masks, `*` for any value, and `+` for any non-object value.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct TypeMask(u32);

impl BitOr for TypeMask {
    type Output = Self;

    #[inline(always)]
    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

impl BitOrAssign for TypeMask {
    #[inline(always)]
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.union(rhs);
    }
}

impl Debug for TypeMask {
    #[inline(always)]
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_fmt(format_args!("TypeMask({self})"))
    }
}

impl Display for TypeMask {
    #[inline(always)]
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.display(None), formatter)
    }
}

impl TypeMask {
    /// A mask without any bits. Never well-formed on its own.
    pub const NONE: Self = Self(0);

    pub const VOID: Self = Self(0x0000_0001);
    pub const NULL: Self = Self(0x0000_0002);
    pub const LOGICAL: Self = Self(0x0000_0004);
    pub const INT: Self = Self(0x0000_0008);
    pub const FLOAT: Self = Self(0x0000_0010);
    pub const STRING: Self = Self(0x0000_0020);
    pub const OBJECT: Self = Self(0x0000_0040);

    /// Integer or float.
    pub const NUMERIC: Self = Self::INT.union(Self::FLOAT);

    /// Logical, integer, or float.
    pub const LOGICAL_EQUIV: Self = Self::LOGICAL.union(Self::NUMERIC);

    /// Any kind except object and void.
    pub const ANY_BASE: Self = Self::NULL.union(Self::LOGICAL_EQUIV).union(Self::STRING);

    /// Any kind except void.
    pub const ANY: Self = Self::ANY_BASE.union(Self::OBJECT);

    pub const OPTIONAL: Self = Self(0x8000_0000);
    pub const SINGLETON: Self = Self(0x4000_0000);
    pub const ELLIPSIS: Self = Self(0x2000_0000);

    const FLAGS: Self = Self::OPTIONAL.union(Self::SINGLETON).union(Self::ELLIPSIS);

    /// Returns a mask with the bits of both masks.
    #[inline(always)]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Returns true if every bit of `other` is set in this mask.
    #[inline(always)]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns true if this mask and `other` have at least one bit in common.
    #[inline(always)]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Returns the kind bits of this mask without the modifiers.
    #[inline(always)]
    pub const fn kinds(self) -> Self {
        Self(self.0 & !Self::FLAGS.0)
    }

    /// Returns a copy of this mask with the [OPTIONAL](Self::OPTIONAL) bit
    /// set.
    #[inline(always)]
    pub const fn optional(self) -> Self {
        self.union(Self::OPTIONAL)
    }

    /// Returns a copy of this mask with the [SINGLETON](Self::SINGLETON) bit
    /// set.
    #[inline(always)]
    pub const fn singleton(self) -> Self {
        self.union(Self::SINGLETON)
    }

    /// Returns a copy of this mask with the [NULL](Self::NULL) kind admitted.
    #[inline(always)]
    pub const fn nullable(self) -> Self {
        self.union(Self::NULL)
    }

    #[inline(always)]
    pub const fn is_optional(self) -> bool {
        self.contains(Self::OPTIONAL)
    }

    #[inline(always)]
    pub const fn is_singleton(self) -> bool {
        self.contains(Self::SINGLETON)
    }

    #[inline(always)]
    pub const fn is_ellipsis(self) -> bool {
        self.contains(Self::ELLIPSIS)
    }

    /// Returns true if the kind bits of this mask are exactly
    /// [VOID](Self::VOID).
    #[inline(always)]
    pub const fn is_void(self) -> bool {
        self.kinds().0 == Self::VOID.0
    }

    /// Returns true if a value of the specified `kind` passes the kind test of
    /// this mask.
    ///
    /// Note that VOID is admitted only when the mask sets the VOID bit
    /// explicitly.
    #[inline(always)]
    pub const fn admits(self, kind: ValueKind) -> bool {
        self.intersects(kind.mask())
    }

    /// Returns true if the mask names at least one kind and does not combine
    /// VOID with other kinds.
    #[inline]
    pub const fn is_well_formed(self) -> bool {
        let kinds = self.kinds();

        if kinds.0 == 0 {
            return false;
        }

        if kinds.intersects(Self::VOID) && kinds.0 != Self::VOID.0 {
            return false;
        }

        true
    }

    /// Returns the raw bits of this mask.
    #[inline(always)]
    pub const fn bits(self) -> u32 {
        self.0
    }

    #[inline(always)]
    pub(crate) fn display(self, class: Option<&'static ObjectClass>) -> MaskDisplay {
        MaskDisplay { mask: self, class }
    }
}

/// Renders a mask together with its object class constraint:
/// `object<Mutation>$`.
pub(crate) struct MaskDisplay {
    mask: TypeMask,
    class: Option<&'static ObjectClass>,
}

impl Display for MaskDisplay {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        let kinds = self.mask.kinds();

        match kinds {
            TypeMask::NONE => formatter.write_str("?")?,
            TypeMask::ANY => formatter.write_str("*")?,
            TypeMask::ANY_BASE => formatter.write_str("+")?,
            TypeMask::VOID => formatter.write_str("void")?,
            TypeMask::NULL => formatter.write_str("NULL")?,
            TypeMask::LOGICAL => formatter.write_str("logical")?,
            TypeMask::INT => formatter.write_str("integer")?,
            TypeMask::FLOAT => formatter.write_str("float")?,
            TypeMask::STRING => formatter.write_str("string")?,
            TypeMask::OBJECT => formatter.write_str("object")?,
            TypeMask::NUMERIC => formatter.write_str("numeric")?,

            _ => {
                for (bit, letter) in [
                    (TypeMask::NULL, "N"),
                    (TypeMask::LOGICAL, "l"),
                    (TypeMask::INT, "i"),
                    (TypeMask::FLOAT, "f"),
                    (TypeMask::STRING, "s"),
                    (TypeMask::OBJECT, "o"),
                ] {
                    if kinds.intersects(bit) {
                        formatter.write_str(letter)?;
                    }
                }
            }
        }

        if let Some(class) = self.class {
            if kinds.intersects(TypeMask::OBJECT) {
                formatter.write_fmt(format_args!("<{}>", class.name()))?;
            }
        }

        if self.mask.is_singleton() {
            formatter.write_str("$")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::runtime::{ObjectClass, TypeMask, ValueKind, OBJECT_CLASS};

    #[test]
    fn test_mask_algebra() {
        let mask = TypeMask::INT | TypeMask::STRING;

        assert!(mask.admits(ValueKind::Int));
        assert!(mask.admits(ValueKind::String));
        assert!(!mask.admits(ValueKind::Float));
        assert!(!mask.admits(ValueKind::Null));

        let mask = mask.optional().singleton();

        assert!(mask.is_optional());
        assert!(mask.is_singleton());
        assert!(!mask.is_ellipsis());
        assert_eq!(TypeMask::INT | TypeMask::STRING, mask.kinds());
    }

    #[test]
    fn test_void_is_never_implied() {
        assert!(!TypeMask::ANY.admits(ValueKind::Void));
        assert!(TypeMask::VOID.admits(ValueKind::Void));
        assert!(TypeMask::VOID.is_void());
        assert!(!TypeMask::ANY.is_void());
    }

    #[test]
    fn test_well_formed_masks() {
        assert!(TypeMask::VOID.is_well_formed());
        assert!(TypeMask::ANY.singleton().is_well_formed());
        assert!(!TypeMask::NONE.is_well_formed());
        assert!(!TypeMask::OPTIONAL.is_well_formed());
        assert!(!(TypeMask::VOID | TypeMask::NULL).is_well_formed());
    }

    #[test]
    fn test_mask_display() {
        assert_eq!("integer$", TypeMask::INT.singleton().to_string());
        assert_eq!("*", TypeMask::ANY.to_string());
        assert_eq!("+", TypeMask::ANY_BASE.to_string());
        assert_eq!("numeric", TypeMask::NUMERIC.to_string());
        assert_eq!("is", (TypeMask::INT | TypeMask::STRING).to_string());
        assert_eq!("Nlif$", TypeMask::LOGICAL_EQUIV.nullable().singleton().to_string());
        assert_eq!("void", TypeMask::VOID.to_string());

        static SHAPE: ObjectClass = ObjectClass::new("Shape", &OBJECT_CLASS);

        assert_eq!(
            "io<Shape>$",
            (TypeMask::INT | TypeMask::OBJECT)
                .singleton()
                .display(Some(&SHAPE))
                .to_string(),
        );
    }
}
