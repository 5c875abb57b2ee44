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
    cmp::Ordering,
    fmt::{Debug, Display, Formatter},
    sync::Arc,
};

use compact_str::CompactString;

use crate::runtime::{FrozenValue, NameId, ObjectClass, ObjectRef, ScriptValue, TypeMask, Value};

/// A batched implementation of an instance method.
///
/// The function receives every receiver of a method call at once, the
/// method's interned name, and the already checked and default-materialized
/// arguments. It returns the concatenation of the per-receiver results.
///
/// The checkers never inspect the function itself: the owning [Signature]'s
/// return mask is validated against the produced value with the aggregate
/// return check.
pub type AcceleratedFn = fn(receivers: &[ObjectRef], method: NameId, arguments: &[Value]) -> Value;

/// A calling context of a [Signature].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum CallKind {
    /// A free function.
    Function,

    /// A method invoked once per receiver (or once per batch, if
    /// accelerated).
    InstanceMethod,

    /// A method invoked once regardless of how many receivers are selected.
    ClassMethod,
}

impl Display for CallKind {
    #[inline(always)]
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.call_type())
    }
}

impl CallKind {
    /// Returns the word used for this calling context in diagnostics:
    /// `"function"` or `"method"`.
    #[inline(always)]
    pub fn call_type(self) -> &'static str {
        match self {
            Self::Function => "function",
            Self::InstanceMethod | Self::ClassMethod => "method",
        }
    }

    /// Returns the prefix of the canonical signature text: `""` for
    /// functions, `"- "` for instance methods, and `"+ "` for class methods.
    #[inline(always)]
    pub fn call_prefix(self) -> &'static str {
        match self {
            Self::Function => "",
            Self::InstanceMethod => "- ",
            Self::ClassMethod => "+ ",
        }
    }
}

/// A calling-context specific part of a [Signature].
#[derive(Clone)]
pub enum SignatureKind {
    /// A free function, optionally provided by a named delegate.
    Function {
        /// The name of the component that implements the function. Only
        /// used in the canonical signature text.
        delegate: Option<CompactString>,
    },

    /// An instance method, optionally carrying a batched implementation.
    InstanceMethod {
        /// The batched implementation, if declared.
        accelerated: Option<AcceleratedFn>,
    },

    /// A class method.
    ClassMethod,
}

impl Debug for SignatureKind {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Function { delegate } => formatter
                .debug_struct("Function")
                .field("delegate", delegate)
                .finish(),

            Self::InstanceMethod { accelerated } => formatter
                .debug_struct("InstanceMethod")
                .field("accelerated", &accelerated.is_some())
                .finish(),

            Self::ClassMethod => formatter.write_str("ClassMethod"),
        }
    }
}

impl SignatureKind {
    /// Returns the calling context of this variant.
    #[inline(always)]
    pub fn call_kind(&self) -> CallKind {
        match self {
            Self::Function { .. } => CallKind::Function,
            Self::InstanceMethod { .. } => CallKind::InstanceMethod,
            Self::ClassMethod => CallKind::ClassMethod,
        }
    }
}

/// A description of one parameter of a [Signature].
#[derive(Clone, Debug)]
pub struct Param {
    pub(super) mask: TypeMask,
    pub(super) name: CompactString,
    pub(super) id: NameId,
    pub(super) class: Option<&'static ObjectClass>,
    pub(super) default: Option<FrozenValue>,
}

impl Display for Param {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        if self.mask.is_ellipsis() {
            return formatter.write_str("...");
        }

        if self.mask.is_optional() {
            formatter.write_str("[")?;
        }

        formatter.write_fmt(format_args!(
            "{} {}",
            self.mask.display(self.class),
            self.name,
        ))?;

        if let Some(default) = &self.default {
            if !default.get().is_invisible_null() {
                formatter.write_str(" = ")?;
                write_default(formatter, default.get())?;
            }
        }

        if self.mask.is_optional() {
            formatter.write_str("]")?;
        }

        Ok(())
    }
}

impl Param {
    /// The type mask of this parameter, including its modifier bits.
    #[inline(always)]
    pub fn mask(&self) -> TypeMask {
        self.mask
    }

    /// The name of this parameter. The ellipsis is named `"..."`.
    #[inline(always)]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// The interned name of this parameter.
    #[inline(always)]
    pub fn id(&self) -> NameId {
        self.id
    }

    /// The object class constraint of this parameter, if any.
    #[inline(always)]
    pub fn class(&self) -> Option<&'static ObjectClass> {
        self.class
    }

    /// The registration-time default value of an optional parameter.
    #[inline(always)]
    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref().map(FrozenValue::get)
    }

    /// Returns a fresh copy of the default value that the caller may consume
    /// freely.
    #[inline(always)]
    pub fn default_value(&self) -> Option<Value> {
        self.default.as_ref().map(FrozenValue::thaw)
    }

    /// Returns true if this parameter can be omitted by the caller.
    #[inline(always)]
    pub fn is_optional(&self) -> bool {
        self.mask.is_optional()
    }

    /// Returns true if this parameter is the trailing ellipsis.
    #[inline(always)]
    pub fn is_ellipsis(&self) -> bool {
        self.mask.is_ellipsis()
    }

    /// Returns true if the parameter's default value is the invisible NULL
    /// sentinel, which means "the caller did not supply this argument".
    #[inline(always)]
    pub fn defaults_to_invisible_null(&self) -> bool {
        match &self.default {
            Some(default) => default.get().is_invisible_null(),
            None => false,
        }
    }
}

/// The declared calling convention of a built-in callable.
///
/// A signature is created once, at registration time, through a
/// [SignatureBuilder](crate::runtime::SignatureBuilder), and is shared
/// read-only afterwards by every call site that dispatches through the
/// callable's name. It is never mutated after [build](crate::runtime::SignatureBuilder::build).
///
/// The [Display] implementation renders the canonical signature text, such as
/// `(integer$)sum(numeric x, [logical$ strict = F])` for a function, or
/// `- (float)yolk(...)` for an instance method. An empty parameter list
/// renders as `void`.
///
/// Signatures are ordered by their callable names, which is the order of the
/// registry listings.
#[derive(Clone, Debug)]
pub struct Signature {
    pub(super) name: CompactString,
    pub(super) id: NameId,
    pub(super) return_mask: TypeMask,
    pub(super) return_class: Option<&'static ObjectClass>,
    pub(super) params: Vec<Param>,
    pub(super) has_optional: bool,
    pub(super) has_ellipsis: bool,
    pub(super) deprecated: bool,
    pub(super) hint: Option<CompactString>,
    pub(super) kind: SignatureKind,
}

impl Display for Signature {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_fmt(format_args!(
            "{}({}){}(",
            self.call_kind().call_prefix(),
            self.return_mask.display(self.return_class),
            self.name,
        ))?;

        if self.params.is_empty() {
            formatter.write_str("void")?;
        }

        let mut is_first = true;

        for param in &self.params {
            match is_first {
                true => is_first = false,
                false => formatter.write_str(", ")?,
            }

            Display::fmt(param, formatter)?;
        }

        formatter.write_str(")")?;

        if let SignatureKind::Function {
            delegate: Some(delegate),
        } = &self.kind
        {
            formatter.write_fmt(format_args!(" <{delegate}>"))?;
        }

        Ok(())
    }
}

impl Signature {
    /// The callable's name.
    #[inline(always)]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// The callable's interned name.
    #[inline(always)]
    pub fn id(&self) -> NameId {
        self.id
    }

    /// The declared return mask.
    #[inline(always)]
    pub fn return_mask(&self) -> TypeMask {
        self.return_mask
    }

    /// The object class constraint of the return value, if any.
    #[inline(always)]
    pub fn return_class(&self) -> Option<&'static ObjectClass> {
        self.return_class
    }

    /// The parameters in declaration order, including the trailing ellipsis
    /// if declared.
    #[inline(always)]
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Returns true if at least one parameter is optional.
    #[inline(always)]
    pub fn has_optional(&self) -> bool {
        self.has_optional
    }

    /// Returns true if the signature ends with an ellipsis.
    #[inline(always)]
    pub fn has_ellipsis(&self) -> bool {
        self.has_ellipsis
    }

    /// Returns true if the callable has been marked deprecated.
    #[inline(always)]
    pub fn is_deprecated(&self) -> bool {
        self.deprecated
    }

    /// Additional guidance appended to argument diagnostics of this
    /// callable.
    #[inline(always)]
    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    /// The calling-context specific part of this signature.
    #[inline(always)]
    pub fn kind(&self) -> &SignatureKind {
        &self.kind
    }

    /// The calling context of this signature.
    #[inline(always)]
    pub fn call_kind(&self) -> CallKind {
        self.kind.call_kind()
    }

    /// The name of the delegate that provides this function, if any.
    #[inline(always)]
    pub fn delegate(&self) -> Option<&str> {
        match &self.kind {
            SignatureKind::Function { delegate } => delegate.as_deref(),
            _ => None,
        }
    }

    /// The batched implementation of this instance method, if declared.
    #[inline(always)]
    pub fn accelerated(&self) -> Option<AcceleratedFn> {
        match &self.kind {
            SignatureKind::InstanceMethod { accelerated } => *accelerated,
            _ => None,
        }
    }

    /// The number of arguments every call must supply.
    #[inline]
    pub fn required_count(&self) -> usize {
        self.params
            .iter()
            .filter(|param| !param.is_optional() && !param.is_ellipsis())
            .count()
    }

    /// The number of declared parameters excluding the ellipsis.
    ///
    /// This is the upper arity bound of a signature without an ellipsis.
    #[inline]
    pub fn declared_count(&self) -> usize {
        match self.has_ellipsis {
            true => self.params.len() - 1,
            false => self.params.len(),
        }
    }

    /// Finds a declared parameter by name.
    #[inline]
    pub fn param(&self, name: &str) -> Option<&Param> {
        self.params.iter().find(|param| param.name == name)
    }

    /// Compares two signatures by their callable names.
    #[inline(always)]
    pub fn cmp_by_name(&self, other: &Self) -> Ordering {
        self.name.cmp(&other.name)
    }

    /// Sorts a listing of signatures by callable name.
    #[inline(always)]
    pub fn sort_by_name(signatures: &mut [Arc<Self>]) {
        signatures.sort_by(|a, b| a.cmp_by_name(b));
    }
}

fn write_default(formatter: &mut Formatter<'_>, value: &Value) -> std::fmt::Result {
    match value {
        Value::Void => formatter.write_str("void"),
        Value::Null { .. } => formatter.write_str("NULL"),

        Value::Logical(vector) if vector.len() == 1 => match vector[0] {
            true => formatter.write_str("T"),
            false => formatter.write_str("F"),
        },

        Value::Int(vector) if vector.len() == 1 => Display::fmt(&vector[0], formatter),

        Value::Float(vector) if vector.len() == 1 => {
            let float = vector[0];

            match float.fract() == 0.0 && float.is_finite() {
                true => formatter.write_fmt(format_args!("{float:.1}")),
                false => Display::fmt(&float, formatter),
            }
        }

        Value::String(vector) if vector.len() == 1 => {
            formatter.write_fmt(format_args!("\"{}\"", vector[0]))
        }

        other => Debug::fmt(other, formatter),
    }
}

#[cfg(test)]
mod tests {
    use crate::runtime::{CallKind, Signature, TypeMask, Value};

    #[test]
    fn test_call_kind_text() {
        assert_eq!("function", CallKind::Function.to_string());
        assert_eq!("method", CallKind::InstanceMethod.to_string());
        assert_eq!("method", CallKind::ClassMethod.to_string());
        assert_eq!("+ ", CallKind::ClassMethod.call_prefix());
    }

    #[test]
    fn test_signature_display() {
        let signature = Signature::function("sum", TypeMask::INT.singleton())
            .add_numeric("x")
            .add_logical_optional_singleton("strict", Value::from(false))
            .add_ellipsis()
            .build()
            .expect("valid signature");

        assert_eq!(
            "(integer$)sum(numeric x, [logical$ strict = F], ...)",
            signature.to_string(),
        );
        assert_eq!(1, signature.required_count());
        assert_eq!(2, signature.declared_count());
        assert!(signature.has_optional());
        assert!(signature.has_ellipsis());

        let signature = Signature::class_method("size", TypeMask::INT)
            .build()
            .expect("valid signature");

        assert_eq!("+ (integer)size(void)", signature.to_string());

        let signature = Signature::function("plot", TypeMask::VOID)
            .add_string_singleton("title")
            .delegate("Plotter")
            .build()
            .expect("valid signature");

        assert_eq!("(void)plot(string$ title) <Plotter>", signature.to_string());
    }
}
