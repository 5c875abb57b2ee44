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
    error::Error as StdError,
    fmt::{Display, Formatter},
    result::Result as StdResult,
};

use compact_str::CompactString;

use crate::runtime::{CallKind, ObjectClass, TypeMask, ValueKind};

/// A result of a checked call, which can either be a normal value or a
/// [CallError].
pub type CallResult<T> = StdResult<T, CallError>;

/// A result of signature registration, which can either be a normal value or
/// a [SignatureError].
pub type SignatureResult<T> = StdResult<T, SignatureError>;

/// A helper trait for [CallResult] and [SignatureResult] objects.
///
/// The [expect_blame](Self::expect_blame) function either unwraps the
/// underlying value or panics with the error's diagnostic text. Registration
/// code uses it at warm-up, where a malformed signature is a fatal
/// configuration error.
pub trait CallResultExt {
    /// The [Ok] type of the underlying [Result].
    type OkType;

    /// If the result is [Ok], returns the underlying data; otherwise, panics
    /// with the `message` followed by the error description.
    fn expect_blame(self, message: &str) -> Self::OkType;
}

impl<T> CallResultExt for CallResult<T> {
    type OkType = T;

    #[inline(always)]
    fn expect_blame(self, message: &str) -> Self::OkType {
        match self {
            Ok(ok) => ok,
            Err(error) => panic!("{message}\n{error}"),
        }
    }
}

impl<T> CallResultExt for SignatureResult<T> {
    type OkType = T;

    #[inline(always)]
    fn expect_blame(self, message: &str) -> Self::OkType {
        match self {
            Ok(ok) => ok,
            Err(error) => panic!("{message}\n{error}"),
        }
    }
}

/// A broad category of a [CallError].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum CallErrorKind {
    /// The number of arguments does not fit the signature.
    Arity,

    /// An argument does not satisfy its parameter's type mask.
    Argument,

    /// A callable's result does not satisfy its declared return contract.
    Return,

    /// The callable could not be resolved by name.
    Lookup,

    /// The callable was resolved but could not be invoked.
    Dispatch,
}

/// Represents an error raised while checking or dispatching a call.
///
/// None of these errors are meant to be recovered locally: they terminate the
/// current script evaluation and present their [Display] text to the user.
/// The wording of the messages is stable; test suites match substrings such
/// as `"cannot be type"`, `"must be a singleton (size() == 1)"`,
/// `"requires exactly N argument(s)"`, and
/// `"requires at most/least N argument(s)"`.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub enum CallError {
    /// Fewer arguments were supplied than the signature requires.
    TooFewArguments {
        /// The calling context of the signature.
        call: CallKind,

        /// The name of the callable.
        callable: CompactString,

        /// The minimum number of arguments.
        required: usize,

        /// The actual number of arguments.
        supplied: usize,

        /// True if the signature accepts exactly `required` arguments.
        exact: bool,
    },

    /// More arguments were supplied than the signature accepts.
    TooManyArguments {
        /// The calling context of the signature.
        call: CallKind,

        /// The name of the callable.
        callable: CompactString,

        /// The maximum number of arguments.
        allowed: usize,

        /// The actual number of arguments.
        supplied: usize,

        /// True if the signature accepts exactly `allowed` arguments.
        exact: bool,
    },

    /// An argument's kind is not admitted by its parameter.
    ArgumentType {
        call: CallKind,
        callable: CompactString,

        /// The 1-based position of the argument.
        position: usize,

        /// The name of the parameter.
        parameter: CompactString,

        /// The kind of the supplied argument.
        kind: ValueKind,

        /// Additional guidance for callables whose call form has changed.
        hint: Option<CompactString>,
    },

    /// An object argument's element class is neither the parameter's class
    /// nor one of its subclasses.
    ArgumentClass {
        call: CallKind,
        callable: CompactString,
        position: usize,
        parameter: CompactString,

        /// The element class of the supplied object vector.
        actual: &'static ObjectClass,

        /// The class required by the parameter.
        expected: &'static ObjectClass,

        hint: Option<CompactString>,
    },

    /// A singleton parameter received a value with zero or more than one
    /// element.
    ArgumentSingleton {
        call: CallKind,
        callable: CompactString,
        position: usize,
        parameter: CompactString,

        /// The element count of the supplied argument.
        count: usize,

        hint: Option<CompactString>,
    },

    /// A callable returned a value of a kind its signature does not admit.
    ReturnType {
        call: CallKind,
        callable: CompactString,

        /// The kind of the returned value.
        kind: ValueKind,

        /// True if the signature is declared to return nothing.
        declared_void: bool,
    },

    /// A callable returned an object vector of the wrong class.
    ReturnClass {
        call: CallKind,
        callable: CompactString,
        actual: &'static ObjectClass,
        expected: &'static ObjectClass,
    },

    /// A callable declared to return a singleton returned zero or more than
    /// one element.
    ReturnSingleton {
        call: CallKind,
        callable: CompactString,
        count: usize,
    },

    /// A batched call of a singleton-returning method returned more elements
    /// than there were receivers.
    ReturnBatchSize {
        call: CallKind,
        callable: CompactString,

        /// The number of receivers in the batch.
        batch: usize,

        /// The number of returned elements.
        count: usize,
    },

    /// Per-receiver results of a method call could not be combined into a
    /// single vector.
    MixedResults {
        call: CallKind,
        callable: CompactString,
        first: ValueKind,
        second: ValueKind,
    },

    /// No function with this name has been registered.
    UnknownFunction {
        name: CompactString,

        /// The closest registered function name, if any is close enough.
        suggestion: Option<CompactString>,
    },

    /// No method with this name has been registered on the class or its
    /// superclasses.
    UnknownMethod {
        class: &'static ObjectClass,
        name: CompactString,
        suggestion: Option<CompactString>,
    },

    /// The callable has a signature but no implementation to invoke.
    UnboundCallable {
        call: CallKind,
        callable: CompactString,
    },
}

impl Display for CallError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooFewArguments {
                call,
                callable,
                required,
                supplied,
                exact,
            } => {
                let bound = match exact {
                    true => "exactly",
                    false => "at least",
                };

                formatter.write_fmt(format_args!(
                    "{call} {callable}() requires {bound} {required} argument(s), \
                    but {supplied} are supplied",
                ))
            }

            Self::TooManyArguments {
                call,
                callable,
                allowed,
                supplied,
                exact,
            } => {
                let bound = match exact {
                    true => "exactly",
                    false => "at most",
                };

                formatter.write_fmt(format_args!(
                    "{call} {callable}() requires {bound} {allowed} argument(s), \
                    but {supplied} are supplied",
                ))
            }

            Self::ArgumentType {
                call,
                callable,
                position,
                parameter,
                kind,
                hint,
            } => {
                formatter.write_fmt(format_args!(
                    "argument {position} ({parameter}) cannot be type {kind} \
                    for {call} {callable}()",
                ))?;

                write_hint(formatter, hint)
            }

            Self::ArgumentClass {
                call,
                callable,
                position,
                parameter,
                actual,
                expected,
                hint,
            } => {
                formatter.write_fmt(format_args!(
                    "argument {position} ({parameter}) cannot be object element \
                    type {actual} for {call} {callable}(); expected object \
                    element type {expected}",
                ))?;

                write_hint(formatter, hint)
            }

            Self::ArgumentSingleton {
                call,
                callable,
                position,
                parameter,
                count,
                hint,
            } => {
                formatter.write_fmt(format_args!(
                    "argument {position} ({parameter}) must be a singleton \
                    (size() == 1) for {call} {callable}(), but size() == {count}",
                ))?;

                write_hint(formatter, hint)
            }

            Self::ReturnType {
                call,
                callable,
                kind,
                declared_void,
            } => {
                formatter.write_fmt(format_args!(
                    "return value cannot be type {kind} for {call} {callable}()",
                ))?;

                if *declared_void {
                    formatter.write_str("; a void callable must not return a value")?;
                }

                Ok(())
            }

            Self::ReturnClass {
                call,
                callable,
                actual,
                expected,
            } => formatter.write_fmt(format_args!(
                "object return value cannot be element type {actual} for {call} \
                {callable}(); expected object element type {expected}",
            )),

            Self::ReturnSingleton {
                call,
                callable,
                count,
            } => formatter.write_fmt(format_args!(
                "return value must be a singleton (size() == 1) for {call} \
                {callable}(), but size() == {count}",
            )),

            Self::ReturnBatchSize {
                call,
                callable,
                batch,
                count,
            } => formatter.write_fmt(format_args!(
                "return value must have at most one element per receiver for \
                {call} {callable}() called on {batch} receiver(s), but \
                size() == {count}",
            )),

            Self::MixedResults {
                call,
                callable,
                first,
                second,
            } => formatter.write_fmt(format_args!(
                "cannot combine results of type {first} and {second} for {call} \
                {callable}()",
            )),

            Self::UnknownFunction { name, suggestion } => {
                formatter.write_fmt(format_args!("unrecognized function name {name}"))?;

                write_suggestion(formatter, suggestion)
            }

            Self::UnknownMethod {
                class,
                name,
                suggestion,
            } => {
                formatter.write_fmt(format_args!(
                    "method {name}() is not defined on object element type {class}",
                ))?;

                write_suggestion(formatter, suggestion)
            }

            Self::UnboundCallable { call, callable } => formatter.write_fmt(format_args!(
                "{call} {callable}() has no implementation",
            )),
        }
    }
}

impl StdError for CallError {}

impl CallError {
    /// Returns the broad category of this error.
    #[inline]
    pub fn kind(&self) -> CallErrorKind {
        match self {
            Self::TooFewArguments { .. } | Self::TooManyArguments { .. } => CallErrorKind::Arity,

            Self::ArgumentType { .. }
            | Self::ArgumentClass { .. }
            | Self::ArgumentSingleton { .. } => CallErrorKind::Argument,

            Self::ReturnType { .. }
            | Self::ReturnClass { .. }
            | Self::ReturnSingleton { .. }
            | Self::ReturnBatchSize { .. }
            | Self::MixedResults { .. } => CallErrorKind::Return,

            Self::UnknownFunction { .. } | Self::UnknownMethod { .. } => CallErrorKind::Lookup,

            Self::UnboundCallable { .. } => CallErrorKind::Dispatch,
        }
    }

    /// Returns the 1-based argument position for argument errors.
    #[inline]
    pub fn position(&self) -> Option<usize> {
        match self {
            Self::ArgumentType { position, .. }
            | Self::ArgumentClass { position, .. }
            | Self::ArgumentSingleton { position, .. } => Some(*position),

            _ => None,
        }
    }
}

#[inline(always)]
fn write_hint(formatter: &mut Formatter<'_>, hint: &Option<CompactString>) -> std::fmt::Result {
    match hint {
        Some(hint) => formatter.write_fmt(format_args!(", {hint}")),
        None => Ok(()),
    }
}

#[inline(always)]
fn write_suggestion(
    formatter: &mut Formatter<'_>,
    suggestion: &Option<CompactString>,
) -> std::fmt::Result {
    match suggestion {
        Some(suggestion) => formatter.write_fmt(format_args!("; did you mean {suggestion}()?")),
        None => Ok(()),
    }
}

/// The reason a value does not satisfy a [TypeMask].
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Mismatch {
    /// The value's kind is not admitted.
    Type(ValueKind),

    /// The value's object class is not the required class or a subclass of
    /// it.
    Class {
        actual: &'static ObjectClass,
        expected: &'static ObjectClass,
    },

    /// The mask requires a singleton, but the value has this many elements.
    Singleton(usize),
}

impl Display for Mismatch {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Type(kind) => formatter.write_fmt(format_args!("cannot be type {kind}")),

            Self::Class { actual, expected } => formatter.write_fmt(format_args!(
                "cannot be object element type {actual}; expected object element \
                type {expected}",
            )),

            Self::Singleton(count) => formatter.write_fmt(format_args!(
                "must be a singleton (size() == 1), but size() == {count}",
            )),
        }
    }
}

/// Represents a malformed signature detected at registration time.
///
/// These errors indicate a bug in the registration code rather than in a
/// script, and are normally fatal at warm-up.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub enum SignatureError {
    /// The callable or one of its parameters has an empty name.
    EmptyName {
        /// The name of the callable. Empty if the callable itself is unnamed.
        callable: CompactString,
    },

    /// A required parameter follows an optional one.
    RequiredAfterOptional {
        callable: CompactString,
        parameter: CompactString,
    },

    /// A parameter follows the ellipsis.
    ParameterAfterEllipsis {
        callable: CompactString,
        parameter: CompactString,
    },

    /// The ellipsis was added more than once.
    DuplicateEllipsis { callable: CompactString },

    /// Two parameters share a name.
    DuplicateParameter {
        callable: CompactString,
        parameter: CompactString,
    },

    /// An object class constraint was given for a mask without the object
    /// kind. The `parameter` is None for the return value.
    ClassWithoutObject {
        callable: CompactString,
        parameter: Option<CompactString>,
    },

    /// The mask names no kinds, combines void with other kinds, or carries a
    /// modifier that is not allowed in its position. The `parameter` is None
    /// for the return value.
    MalformedMask {
        callable: CompactString,
        parameter: Option<CompactString>,
        mask: TypeMask,
    },

    /// A parameter admits the void kind.
    VoidParameter {
        callable: CompactString,
        parameter: CompactString,
    },

    /// An optional parameter has no default value.
    MissingDefault {
        callable: CompactString,
        parameter: CompactString,
    },

    /// A required parameter has a default value.
    DefaultWithoutOptional {
        callable: CompactString,
        parameter: CompactString,
    },

    /// A default value does not satisfy its parameter's mask.
    MalformedDefault {
        callable: CompactString,
        parameter: CompactString,
        mismatch: Mismatch,
    },

    /// An accelerated implementation was declared for a signature that is
    /// not an instance method.
    MisplacedAccelerated { callable: CompactString },

    /// A delegate was declared for a signature that is not a function.
    MisplacedDelegate { callable: CompactString },

    /// A signature was registered in a slot of another calling context.
    WrongCallKind {
        callable: CompactString,
        expected: CallKind,
        actual: CallKind,
    },

    /// A callable with the same name has already been registered in the same
    /// scope. The `class` is None for free functions.
    DuplicateCallable {
        callable: CompactString,
        class: Option<&'static ObjectClass>,
    },
}

impl Display for SignatureError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName { callable } => match callable.is_empty() {
                true => formatter.write_str("a callable name is required"),
                false => formatter.write_fmt(format_args!(
                    "{callable}(): a parameter name is required",
                )),
            },

            Self::RequiredAfterOptional {
                callable,
                parameter,
            } => formatter.write_fmt(format_args!(
                "{callable}(): cannot add required parameter {parameter} after \
                an optional parameter has been added",
            )),

            Self::ParameterAfterEllipsis {
                callable,
                parameter,
            } => formatter.write_fmt(format_args!(
                "{callable}(): cannot add parameter {parameter} after an ellipsis",
            )),

            Self::DuplicateEllipsis { callable } => formatter.write_fmt(format_args!(
                "{callable}(): cannot add more than one ellipsis",
            )),

            Self::DuplicateParameter {
                callable,
                parameter,
            } => formatter.write_fmt(format_args!(
                "{callable}(): parameter {parameter} is declared more than once",
            )),

            Self::ClassWithoutObject {
                callable,
                parameter: Some(parameter),
            } => formatter.write_fmt(format_args!(
                "{callable}(): an object element type may only be supplied for \
                parameter {parameter} if it is of object type",
            )),

            Self::ClassWithoutObject {
                callable,
                parameter: None,
            } => formatter.write_fmt(format_args!(
                "{callable}(): an object element type may only be supplied for \
                a return value of object type",
            )),

            Self::MalformedMask {
                callable,
                parameter: Some(parameter),
                mask,
            } => formatter.write_fmt(format_args!(
                "{callable}(): malformed type mask {mask:?} for parameter {parameter}",
            )),

            Self::MalformedMask {
                callable,
                parameter: None,
                mask,
            } => formatter.write_fmt(format_args!(
                "{callable}(): malformed return type mask {mask:?}",
            )),

            Self::VoidParameter {
                callable,
                parameter,
            } => formatter.write_fmt(format_args!(
                "{callable}(): parameter {parameter} cannot be of type void",
            )),

            Self::MissingDefault {
                callable,
                parameter,
            } => formatter.write_fmt(format_args!(
                "{callable}(): optional parameter {parameter} requires a default value",
            )),

            Self::DefaultWithoutOptional {
                callable,
                parameter,
            } => formatter.write_fmt(format_args!(
                "{callable}(): a default value is supplied for required parameter \
                {parameter}",
            )),

            Self::MalformedDefault {
                callable,
                parameter,
                mismatch,
            } => formatter.write_fmt(format_args!(
                "{callable}(): default value for parameter {parameter} {mismatch}",
            )),

            Self::MisplacedAccelerated { callable } => formatter.write_fmt(format_args!(
                "{callable}(): only instance methods can declare an accelerated \
                implementation",
            )),

            Self::MisplacedDelegate { callable } => formatter.write_fmt(format_args!(
                "{callable}(): only functions can be provided by a delegate",
            )),

            Self::WrongCallKind {
                callable,
                expected,
                actual,
            } => formatter.write_fmt(format_args!(
                "{callable}(): expected {expected:?} signature, but {actual:?} \
                signature provided",
            )),

            Self::DuplicateCallable {
                callable,
                class: None,
            } => formatter.write_fmt(format_args!(
                "function {callable}() is already registered",
            )),

            Self::DuplicateCallable {
                callable,
                class: Some(class),
            } => formatter.write_fmt(format_args!(
                "method {callable}() is already registered on class {class}",
            )),
        }
    }
}

impl StdError for SignatureError {}
