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

//! The calling convention of built-in callables.
//!
//! A language's built-in functions and methods declare their signatures once,
//! at warm-up, through the [SignatureBuilder] and register them in a
//! [Registry]. At run time, an interpreter validates every call against the
//! callable's [Signature]: it materializes defaults for omitted optional
//! arguments, checks the arguments, invokes the native implementation, and
//! checks the produced result.
//!
//! ```
//! use eidos_sig::runtime::{Signature, TypeMask, Value};
//!
//! let signature = Signature::function("abs", TypeMask::NUMERIC)
//!     .add_numeric("x")
//!     .build()
//!     .unwrap();
//!
//! assert!(signature.check_arguments(&[Value::from(-3i64)]).is_ok());
//!
//! let error = signature.check_arguments(&[Value::from("text")]).unwrap_err();
//!
//! assert_eq!(
//!     error.to_string(),
//!     "argument 1 (x) cannot be type string for function abs()",
//! );
//! ```
//!
//! Values cross the boundary either as the crate's own [Value] type or as any
//! host representation implementing [ScriptValue].

mod builder;
mod check;
mod class;
mod dispatch;
mod error;
mod hints;
mod ident;
mod invoke;
mod mask;
mod registry;
mod value;

pub use crate::runtime::{
    builder::{BuildMode, SignatureBuilder},
    class::{Lineage, ObjectClass, ObjectRef, ScriptObject, OBJECT_CLASS},
    dispatch::DISPATCH_LOG,
    error::{
        CallError,
        CallErrorKind,
        CallResult,
        CallResultExt,
        Mismatch,
        SignatureError,
        SignatureResult,
    },
    hints::HintTable,
    ident::NameId,
    invoke::{AcceleratedFn, CallKind, Param, Signature, SignatureKind},
    mask::{TypeMask, ValueKind},
    registry::{ClassMethodFn, FunctionFn, InstanceMethodFn, Registry, REGISTRY_LOG},
    value::{FrozenValue, ObjectVector, ScriptValue, Value},
};
