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
    any::Any,
    fmt::{Debug, Display, Formatter},
    hash::{Hash, Hasher},
    iter::FusedIterator,
    ptr::eq,
    sync::Arc,
};

/// A class of script objects.
///
/// Object classes are declared in statics, and their identity is the address
/// of the static. Every class except the root [OBJECT_CLASS] has exactly one
/// superclass, forming a single-inheritance tree.
///
/// ```
/// use eidos_sig::runtime::{ObjectClass, OBJECT_CLASS};
///
/// static ANIMAL: ObjectClass = ObjectClass::new("Animal", &OBJECT_CLASS);
/// static DOG: ObjectClass = ObjectClass::new("Dog", &ANIMAL);
///
/// assert!(DOG.is_subclass_of(&ANIMAL));
/// assert!(!ANIMAL.is_subclass_of(&DOG));
/// ```
///
/// It is recommended to use the [object_class](crate::object_class) macro to
/// declare classes instead.
pub struct ObjectClass {
    name: &'static str,
    superclass: Option<&'static ObjectClass>,
    doc: Option<&'static str>,
}

/// The root of the class tree.
///
/// This is also the class of object vectors whose element class is not known
/// statically (e.g. an empty `object()` vector).
pub static OBJECT_CLASS: ObjectClass = ObjectClass::root("Object");

impl PartialEq for ObjectClass {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        eq(self, other)
    }
}

impl Eq for ObjectClass {}

impl Hash for ObjectClass {
    #[inline(always)]
    fn hash<H: Hasher>(&self, state: &mut H) {
        (self as *const Self as usize).hash(state)
    }
}

impl Debug for ObjectClass {
    #[inline(always)]
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_fmt(format_args!("ObjectClass({})", self.name))
    }
}

impl Display for ObjectClass {
    #[inline(always)]
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.name)
    }
}

impl ObjectClass {
    /// Creates a class named `name` that derives from `superclass`.
    #[inline(always)]
    pub const fn new(name: &'static str, superclass: &'static ObjectClass) -> Self {
        Self {
            name,
            superclass: Some(superclass),
            doc: None,
        }
    }

    /// Similar to [new](Self::new), but attaches raw Markdown documentation
    /// to the class.
    #[inline(always)]
    pub const fn with_doc(
        name: &'static str,
        superclass: &'static ObjectClass,
        doc: &'static str,
    ) -> Self {
        Self {
            name,
            superclass: Some(superclass),
            doc: Some(doc),
        }
    }

    #[inline(always)]
    const fn root(name: &'static str) -> Self {
        Self {
            name,
            superclass: None,
            doc: None,
        }
    }

    /// Returns the root class, [OBJECT_CLASS].
    #[inline(always)]
    pub fn generic() -> &'static Self {
        &OBJECT_CLASS
    }

    /// Returns true if this class is the root class.
    #[inline(always)]
    pub fn is_generic(&self) -> bool {
        self == Self::generic()
    }

    /// Returns the user-facing name of the class.
    #[inline(always)]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the documentation of the class, if any.
    #[inline(always)]
    pub fn doc(&self) -> Option<&'static str> {
        self.doc
    }

    /// Returns the direct superclass. The root class has none.
    #[inline(always)]
    pub fn superclass(&self) -> Option<&'static ObjectClass> {
        self.superclass
    }

    /// Returns true if this class is `other` or derives from it, directly or
    /// transitively.
    #[inline]
    pub fn is_subclass_of(&self, other: &ObjectClass) -> bool {
        if self == other {
            return true;
        }

        let mut next = self.superclass;

        while let Some(class) = next {
            if class == other {
                return true;
            }

            next = class.superclass;
        }

        false
    }

    /// Iterates over this class and all its superclasses up to the root
    /// class.
    #[inline(always)]
    pub fn lineage(&'static self) -> Lineage {
        Lineage(Some(self))
    }
}

pub struct Lineage(Option<&'static ObjectClass>);

impl Iterator for Lineage {
    type Item = &'static ObjectClass;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let current = self.0?;

        self.0 = current.superclass;

        Some(current)
    }
}

impl FusedIterator for Lineage {}

/// A macro that declares new [object classes](ObjectClass) in statics.
///
/// ```
/// use eidos_sig::{object_class, runtime::OBJECT_CLASS};
///
/// object_class!(
///     /// A genomic mutation.
///     pub static MUTATION = "Mutation": OBJECT_CLASS;
///
///     static SYNONYMOUS = "SynonymousMutation": MUTATION;
/// );
///
/// assert_eq!(MUTATION.name(), "Mutation");
/// assert_eq!(MUTATION.doc(), Some(" A genomic mutation.\n"));
/// assert!(SYNONYMOUS.is_subclass_of(&MUTATION));
/// ```
#[macro_export]
macro_rules! object_class {
    (
        $vis:vis static $ident:ident = $name:literal: $superclass:path;
    ) => {
        $vis static $ident: $crate::runtime::ObjectClass =
            $crate::runtime::ObjectClass::new($name, &$superclass);
    };

    (
        $(#[doc = $doc:expr])+
        $vis:vis static $ident:ident = $name:literal: $superclass:path;
    ) => {
        $(#[doc = $doc])+
        $vis static $ident: $crate::runtime::ObjectClass =
            $crate::runtime::ObjectClass::with_doc(
                $name, &$superclass, ::std::concat!($($doc, "\n"),+)
            );
    };

    {
        $(
            $(#[doc = $doc:expr])*
            $vis:vis static $ident:ident = $name:literal: $superclass:path;
        )*
    } => {
        $(
            $crate::object_class!{
                $(#[doc = $doc])*
                $vis static $ident = $name: $superclass;
            }
        )*
    };
}

/// An instance of an [ObjectClass] living in the host program.
///
/// The calling convention only needs the runtime class of an instance.
/// Method implementations use [as_any](Self::as_any) to reach the concrete
/// Rust type behind the reference.
pub trait ScriptObject: Send + Sync + 'static {
    /// Returns the runtime class of this instance.
    fn class(&self) -> &'static ObjectClass;

    fn as_any(&self) -> &dyn Any;
}

/// A shared reference to a [ScriptObject].
pub type ObjectRef = Arc<dyn ScriptObject>;

#[cfg(test)]
mod tests {
    use crate::runtime::{ObjectClass, OBJECT_CLASS};

    crate::object_class!(
        static SPECIES = "Species": OBJECT_CLASS;
        static INDIVIDUAL = "Individual": OBJECT_CLASS;
        static FEMALE = "Female": INDIVIDUAL;
    );

    #[test]
    fn test_class_identity() {
        assert_eq!(&SPECIES, &SPECIES);
        assert_ne!(&SPECIES, &INDIVIDUAL);
        assert!(OBJECT_CLASS.is_generic());
        assert!(!SPECIES.is_generic());
        assert_eq!(Some(&OBJECT_CLASS), SPECIES.superclass());
        assert_eq!(None, OBJECT_CLASS.superclass());
    }

    #[test]
    fn test_subclassing() {
        assert!(FEMALE.is_subclass_of(&FEMALE));
        assert!(FEMALE.is_subclass_of(&INDIVIDUAL));
        assert!(FEMALE.is_subclass_of(&OBJECT_CLASS));
        assert!(!FEMALE.is_subclass_of(&SPECIES));
        assert!(!INDIVIDUAL.is_subclass_of(&FEMALE));
    }

    #[test]
    fn test_lineage() {
        let names = FEMALE
            .lineage()
            .map(ObjectClass::name)
            .collect::<Vec<_>>();

        assert_eq!(vec!["Female", "Individual", "Object"], names);
    }
}
