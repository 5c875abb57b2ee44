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
    fmt::{Debug, Formatter},
    sync::Arc,
};

use compact_str::CompactString;

use crate::runtime::{ObjectClass, ObjectRef, ValueKind};

/// A runtime value as seen by the argument and return checkers.
///
/// The checkers only need a value's kind, its element count, and (for object
/// vectors) its element class. Interpreters with their own value
/// representation implement this trait to pass their values to the checkers
/// directly. The crate's own [Value] type implements it as well.
pub trait ScriptValue {
    /// Returns the kind of the value.
    fn kind(&self) -> ValueKind;

    /// Returns the number of elements of the value.
    fn count(&self) -> usize;

    /// Returns the element class of an object vector.
    ///
    /// The default implementation returns None, which the checkers treat as
    /// the generic [OBJECT_CLASS](crate::runtime::OBJECT_CLASS).
    #[inline(always)]
    fn object_class(&self) -> Option<&'static ObjectClass> {
        None
    }

    /// Returns true if the value is the invisible NULL sentinel that some
    /// built-ins use as a default regardless of their parameter's kind.
    #[inline(always)]
    fn is_invisible_null(&self) -> bool {
        false
    }
}

/// A script value: a typed vector of elements, NULL, or void.
///
/// Values are plain data. Cloning a Value produces an independent copy that
/// shares nothing mutable with the original, except for object vectors whose
/// elements are shared [references](ObjectRef) to host objects.
#[derive(Clone)]
pub enum Value {
    /// No value at all.
    Void,

    /// The NULL value. An `invisible` NULL is not echoed by interactive
    /// tooling and may serve as a default of any parameter kind.
    Null { invisible: bool },

    Logical(Vec<bool>),

    Int(Vec<i64>),

    Float(Vec<f64>),

    String(Vec<CompactString>),

    Object(ObjectVector),
}

impl Debug for Value {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Void => formatter.write_str("void"),
            Self::Null { invisible: false } => formatter.write_str("NULL"),
            Self::Null { invisible: true } => formatter.write_str("NULL(invisible)"),
            Self::Logical(vector) => Debug::fmt(vector, formatter),
            Self::Int(vector) => Debug::fmt(vector, formatter),
            Self::Float(vector) => Debug::fmt(vector, formatter),
            Self::String(vector) => Debug::fmt(vector, formatter),
            Self::Object(vector) => Debug::fmt(vector, formatter),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Void, Self::Void) => true,
            (Self::Null { .. }, Self::Null { .. }) => true,
            (Self::Logical(this), Self::Logical(other)) => this == other,
            (Self::Int(this), Self::Int(other)) => this == other,
            (Self::Float(this), Self::Float(other)) => this == other,
            (Self::String(this), Self::String(other)) => this == other,
            (Self::Object(this), Self::Object(other)) => this == other,
            _ => false,
        }
    }
}

impl ScriptValue for Value {
    #[inline]
    fn kind(&self) -> ValueKind {
        match self {
            Self::Void => ValueKind::Void,
            Self::Null { .. } => ValueKind::Null,
            Self::Logical(_) => ValueKind::Logical,
            Self::Int(_) => ValueKind::Int,
            Self::Float(_) => ValueKind::Float,
            Self::String(_) => ValueKind::String,
            Self::Object(_) => ValueKind::Object,
        }
    }

    #[inline]
    fn count(&self) -> usize {
        match self {
            Self::Void | Self::Null { .. } => 0,
            Self::Logical(vector) => vector.len(),
            Self::Int(vector) => vector.len(),
            Self::Float(vector) => vector.len(),
            Self::String(vector) => vector.len(),
            Self::Object(vector) => vector.elements.len(),
        }
    }

    #[inline(always)]
    fn object_class(&self) -> Option<&'static ObjectClass> {
        match self {
            Self::Object(vector) => Some(vector.class),
            _ => None,
        }
    }

    #[inline(always)]
    fn is_invisible_null(&self) -> bool {
        matches!(self, Self::Null { invisible: true })
    }
}

impl From<bool> for Value {
    #[inline(always)]
    fn from(value: bool) -> Self {
        Self::Logical(vec![value])
    }
}

impl From<i64> for Value {
    #[inline(always)]
    fn from(value: i64) -> Self {
        Self::Int(vec![value])
    }
}

impl From<f64> for Value {
    #[inline(always)]
    fn from(value: f64) -> Self {
        Self::Float(vec![value])
    }
}

impl From<&str> for Value {
    #[inline(always)]
    fn from(value: &str) -> Self {
        Self::String(vec![CompactString::from(value)])
    }
}

impl From<ObjectVector> for Value {
    #[inline(always)]
    fn from(value: ObjectVector) -> Self {
        Self::Object(value)
    }
}

impl Value {
    /// Returns the visible NULL value.
    #[inline(always)]
    pub fn null() -> Self {
        Self::Null { invisible: false }
    }

    /// Returns the invisible NULL sentinel.
    #[inline(always)]
    pub fn invisible_null() -> Self {
        Self::Null { invisible: true }
    }

    /// Concatenates a sequence of values of the same kind into a single
    /// vector.
    ///
    /// NULL and void values are skipped. An empty sequence (or a sequence of
    /// NULLs only) results in NULL. Object vectors of distinct classes
    /// concatenate into a vector of their closest common class. Empty object
    /// vectors do not take part in choosing the class.
    ///
    /// Returns the first pair of mismatching kinds on failure.
    pub fn concat(
        values: impl IntoIterator<Item = Value>,
    ) -> Result<Self, (ValueKind, ValueKind)> {
        let mut result = None::<Value>;

        for value in values {
            if matches!(value, Self::Void | Self::Null { .. }) {
                continue;
            }

            let Some(accumulator) = &mut result else {
                result = Some(value);
                continue;
            };

            match (accumulator, value) {
                (Self::Logical(this), Self::Logical(other)) => this.extend(other),
                (Self::Int(this), Self::Int(other)) => this.extend(other),
                (Self::Float(this), Self::Float(other)) => this.extend(other),
                (Self::String(this), Self::String(other)) => this.extend(other),

                (Self::Object(this), Self::Object(other)) => {
                    if this.elements.is_empty() {
                        this.class = other.class;
                    } else if !other.elements.is_empty() {
                        this.class = common_class(this.class, other.class);
                    }

                    this.elements.extend(other.elements);
                }

                (this, other) => return Err((this.kind(), other.kind())),
            }
        }

        Ok(result.unwrap_or_else(Self::null))
    }
}

fn common_class(
    this: &'static ObjectClass,
    other: &'static ObjectClass,
) -> &'static ObjectClass {
    this.lineage()
        .find(|candidate| other.is_subclass_of(candidate))
        .unwrap_or(ObjectClass::generic())
}

/// A vector of object references sharing a declared element class.
#[derive(Clone)]
pub struct ObjectVector {
    /// The element class of the vector. Every element's runtime class is this
    /// class or one of its subclasses.
    pub class: &'static ObjectClass,

    /// The object references.
    pub elements: Vec<ObjectRef>,
}

impl Debug for ObjectVector {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_fmt(format_args!(
            "object<{}>[{}]",
            self.class,
            self.elements.len()
        ))
    }
}

impl PartialEq for ObjectVector {
    fn eq(&self, other: &Self) -> bool {
        if self.class != other.class || self.elements.len() != other.elements.len() {
            return false;
        }

        self.elements
            .iter()
            .zip(other.elements.iter())
            .all(|(this, other)| Arc::ptr_eq(this, other))
    }
}

impl ObjectVector {
    /// Creates a vector of `class` elements.
    #[inline(always)]
    pub fn new(class: &'static ObjectClass, elements: Vec<ObjectRef>) -> Self {
        Self { class, elements }
    }

    /// Creates an empty vector of the generic object class.
    #[inline(always)]
    pub fn empty() -> Self {
        Self::new(ObjectClass::generic(), Vec::new())
    }

    /// Creates a one-element vector whose class is the element's runtime
    /// class.
    #[inline(always)]
    pub fn singleton(element: ObjectRef) -> Self {
        Self::new(element.class(), vec![element])
    }
}

/// A value that can no longer be modified in place.
///
/// Signature registration stores default values as FrozenValue. Reading a
/// default through [thaw](Self::thaw) always produces a fresh copy, so a
/// call site that modifies its copy never affects the stored default or
/// other call sites.
#[derive(Clone, PartialEq, Debug)]
pub struct FrozenValue(Value);

impl FrozenValue {
    #[inline(always)]
    pub(crate) fn freeze(value: Value) -> Self {
        Self(value)
    }

    /// Returns a read-only view of the frozen value.
    #[inline(always)]
    pub fn get(&self) -> &Value {
        &self.0
    }

    /// Returns an independent copy of the frozen value.
    #[inline(always)]
    pub fn thaw(&self) -> Value {
        self.0.clone()
    }
}

#[cfg(test)]
mod tests {
    use std::{any::Any, sync::Arc};

    use crate::runtime::{
        FrozenValue,
        ObjectClass,
        ObjectRef,
        ObjectVector,
        ScriptObject,
        ScriptValue,
        Value,
        ValueKind,
        OBJECT_CLASS,
    };

    crate::object_class!(
        static FRUIT = "Fruit": OBJECT_CLASS;
        static APPLE = "Apple": FRUIT;
        static PEAR = "Pear": FRUIT;
    );

    struct Instance(&'static ObjectClass);

    impl ScriptObject for Instance {
        fn class(&self) -> &'static ObjectClass {
            self.0
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn test_value_shape() {
        assert_eq!(ValueKind::Int, Value::from(5i64).kind());
        assert_eq!(1, Value::from(5i64).count());
        assert_eq!(0, Value::null().count());
        assert_eq!(ValueKind::Void, Value::Void.kind());
        assert_eq!(3, Value::Float(vec![1.0, 2.0, 3.0]).count());
        assert!(Value::invisible_null().is_invisible_null());
        assert!(!Value::null().is_invisible_null());
        assert_eq!(None, Value::from("x").object_class());
    }

    #[test]
    fn test_concat() {
        let result = Value::concat([
            Value::Int(vec![1, 2]),
            Value::null(),
            Value::Int(vec![3]),
        ])
        .unwrap();

        assert_eq!(Value::Int(vec![1, 2, 3]), result);

        assert_eq!(Value::null(), Value::concat([]).unwrap());

        assert_eq!(
            Err((ValueKind::Int, ValueKind::String)),
            Value::concat([Value::from(1i64), Value::from("a")]),
        );
    }

    #[test]
    fn test_concat_objects() {
        let apple: ObjectRef = Arc::new(Instance(&APPLE));
        let pear: ObjectRef = Arc::new(Instance(&PEAR));

        let result = Value::concat([
            Value::from(ObjectVector::singleton(apple)),
            Value::from(ObjectVector::singleton(pear)),
        ])
        .unwrap();

        assert_eq!(ValueKind::Object, result.kind());
        assert_eq!(Some(&FRUIT), result.object_class());
        assert_eq!(2, result.count());
    }

    #[test]
    fn test_concat_ignores_empty_object_classes() {
        let first: ObjectRef = Arc::new(Instance(&APPLE));
        let second: ObjectRef = Arc::new(Instance(&APPLE));

        let result = Value::concat([
            Value::from(ObjectVector::empty()),
            Value::from(ObjectVector::singleton(first)),
            Value::from(ObjectVector::empty()),
            Value::from(ObjectVector::singleton(second)),
        ])
        .unwrap();

        assert_eq!(Some(&APPLE), result.object_class());
        assert_eq!(2, result.count());

        let result = Value::concat([
            Value::from(ObjectVector::empty()),
            Value::from(ObjectVector::new(&PEAR, Vec::new())),
        ])
        .unwrap();

        assert_eq!(Some(&PEAR), result.object_class());
        assert_eq!(0, result.count());
    }

    #[test]
    fn test_frozen_copies_are_independent() {
        let frozen = FrozenValue::freeze(Value::Int(vec![1, 2, 3]));

        let mut first = frozen.thaw();
        let second = frozen.thaw();

        if let Value::Int(vector) = &mut first {
            vector.push(4);
        }

        assert_eq!(Value::Int(vec![1, 2, 3, 4]), first);
        assert_eq!(Value::Int(vec![1, 2, 3]), second);
        assert_eq!(&Value::Int(vec![1, 2, 3]), frozen.get());
    }
}
