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

use std::slice::from_ref;

use log::trace;

use crate::{
    report::system_panic,
    runtime::{
        registry::{MethodHandler, Registry},
        CallError,
        CallResult,
        ObjectRef,
        ObjectVector,
        ScriptObject,
        Signature,
        Value,
    },
};

/// A log target of the dispatch events.
pub static DISPATCH_LOG: &str = "eidos-sig::$dispatch";

impl Signature {
    /// Substitutes default values for the omitted trailing optional
    /// arguments.
    ///
    /// Fails if fewer arguments than required, or (without an ellipsis) more
    /// arguments than declared are supplied. Arguments beyond the declared
    /// parameters are left for the ellipsis.
    ///
    /// Every substituted default is a fresh copy of the registration-time
    /// value.
    pub fn materialize_defaults(&self, mut arguments: Vec<Value>) -> CallResult<Vec<Value>> {
        let required = self.required_count();
        let declared = self.declared_count();
        let supplied = arguments.len();

        if supplied < required {
            return Err(CallError::TooFewArguments {
                call: self.call_kind(),
                callable: self.name.clone(),
                required,
                supplied,
                exact: !self.has_ellipsis && required == declared,
            });
        }

        if !self.has_ellipsis && supplied > declared {
            return Err(CallError::TooManyArguments {
                call: self.call_kind(),
                callable: self.name.clone(),
                allowed: declared,
                supplied,
                exact: required == declared,
            });
        }

        if supplied < declared {
            arguments.reserve(declared - supplied);

            for param in &self.params[supplied..declared] {
                let Some(default) = param.default_value() else {
                    system_panic!(
                        "Optional parameter {} of {}() without default value.",
                        param.name,
                        self.name,
                    );
                };

                arguments.push(default);
            }
        }

        Ok(arguments)
    }
}

impl Registry {
    /// Calls a free function by name.
    ///
    /// The call materializes defaults, checks the arguments, invokes the
    /// native handler, and (if [verify_returns](crate::config::RegistryConfig::verify_returns)
    /// is enabled) checks the result.
    pub fn call_function(&self, name: &str, arguments: Vec<Value>) -> CallResult<Value> {
        let entry = self.function_entry(name)?;
        let signature = &entry.signature;

        trace!(target: DISPATCH_LOG, "Calling {signature}.");

        self.report_deprecation(signature);

        let arguments = signature.materialize_defaults(arguments)?;

        signature.check_arguments(&arguments)?;

        let Some(handler) = entry.handler else {
            return Err(unbound(signature));
        };

        let result = handler(&arguments)?;

        if self.config().verify_returns {
            signature.check_return(&result)?;
        }

        Ok(result)
    }

    /// Calls a method on every receiver of the `receivers` vector.
    ///
    /// The method is resolved on the vector's element class. A class method
    /// is invoked once regardless of the number of receivers. An instance
    /// method with an [accelerated](Signature::accelerated) implementation is
    /// invoked once for the whole batch, and its result passes the aggregate
    /// return check. Otherwise, the instance method is invoked per receiver,
    /// each result passes the singular return check, and the results are
    /// concatenated. A void method yields void for any number of receivers,
    /// and a lone receiver's result is returned as is.
    pub fn call_method(
        &self,
        receivers: &ObjectVector,
        name: &str,
        arguments: Vec<Value>,
    ) -> CallResult<Value> {
        let entry = self.method_entry(receivers.class, name)?;
        let signature = &entry.signature;
        let verify = self.config().verify_returns;

        trace!(
            target: DISPATCH_LOG,
            "Calling {signature} on {} receiver(s) of {}.",
            receivers.elements.len(),
            receivers.class,
        );

        self.report_deprecation(signature);

        let arguments = signature.materialize_defaults(arguments)?;

        signature.check_arguments(&arguments)?;

        let handler = match &entry.handler {
            MethodHandler::Class(handler) => {
                let result = handler(receivers.class, signature.id, &arguments)?;

                if verify {
                    signature.check_return(&result)?;
                }

                return Ok(result);
            }

            MethodHandler::Instance(handler) => *handler,
        };

        if let Some(accelerated) = signature.accelerated() {
            let result = accelerated(&receivers.elements, signature.id, &arguments);

            if verify {
                signature.check_aggregate_return(&result, receivers.elements.len())?;
            }

            return Ok(result);
        }

        let Some(handler) = handler else {
            return Err(unbound(signature));
        };

        let mut results = Vec::with_capacity(receivers.elements.len());

        for receiver in &receivers.elements {
            let result = handler(receiver, signature.id, &arguments)?;

            if verify {
                signature.check_return(&result)?;
            }

            results.push(result);
        }

        if signature.return_mask.is_void() {
            return Ok(Value::Void);
        }

        if results.len() == 1 {
            if let Some(result) = results.pop() {
                return Ok(result);
            }
        }

        Value::concat(results).map_err(|(first, second)| CallError::MixedResults {
            call: signature.call_kind(),
            callable: signature.name.clone(),
            first,
            second,
        })
    }

    /// Calls a method on a single receiver.
    ///
    /// The method is resolved on the receiver's class. An instance method
    /// without a per-receiver handler falls back to its accelerated
    /// implementation with a batch of one. In every case the result passes
    /// the singular return check.
    pub fn call_method_on(
        &self,
        receiver: &ObjectRef,
        name: &str,
        arguments: Vec<Value>,
    ) -> CallResult<Value> {
        let class = receiver.class();
        let entry = self.method_entry(class, name)?;
        let signature = &entry.signature;

        trace!(target: DISPATCH_LOG, "Calling {signature} on a {class} receiver.");

        self.report_deprecation(signature);

        let arguments = signature.materialize_defaults(arguments)?;

        signature.check_arguments(&arguments)?;

        let result = match (&entry.handler, signature.accelerated()) {
            (MethodHandler::Class(handler), _) => handler(class, signature.id, &arguments)?,

            (MethodHandler::Instance(Some(handler)), _) => {
                handler(receiver, signature.id, &arguments)?
            }

            (MethodHandler::Instance(None), Some(accelerated)) => {
                accelerated(from_ref(receiver), signature.id, &arguments)
            }

            (MethodHandler::Instance(None), None) => return Err(unbound(signature)),
        };

        if self.config().verify_returns {
            signature.check_return(&result)?;
        }

        Ok(result)
    }
}

#[inline(always)]
fn unbound(signature: &Signature) -> CallError {
    CallError::UnboundCallable {
        call: signature.call_kind(),
        callable: signature.name.clone(),
    }
}

#[cfg(test)]
mod tests {
    use crate::runtime::{CallError, Signature, TypeMask, Value};

    #[test]
    fn test_materialize_defaults() {
        let signature = Signature::function("seq", TypeMask::INT)
            .add_int_singleton("from")
            .add_int_optional_singleton("to", 10i64)
            .add_int_optional_singleton("by", 1i64)
            .build()
            .expect("valid signature");

        let arguments = signature
            .materialize_defaults(vec![Value::from(1i64)])
            .expect("enough arguments");

        assert_eq!(
            vec![Value::from(1i64), Value::from(10i64), Value::from(1i64)],
            arguments,
        );

        let arguments = signature
            .materialize_defaults(vec![Value::from(1i64), Value::from(5i64)])
            .expect("enough arguments");

        assert_eq!(Value::from(5i64), arguments[1]);

        let error = signature
            .materialize_defaults(Vec::new())
            .expect_err("missing required argument");

        assert!(error.to_string().contains("requires at least 1 argument(s)"));

        let error = signature
            .materialize_defaults(vec![Value::from(1i64); 4])
            .expect_err("too many arguments");

        assert!(error.to_string().contains("requires at most 3 argument(s)"));
    }

    #[test]
    fn test_defaults_are_fresh_copies() {
        let signature = Signature::function("f", TypeMask::VOID)
            .add_int_optional("x", Value::Int(vec![1, 2]))
            .build()
            .expect("valid signature");

        let mut first = signature
            .materialize_defaults(Vec::new())
            .expect("no arguments required");

        if let Value::Int(vector) = &mut first[0] {
            vector.push(3);
        }

        let second = signature
            .materialize_defaults(Vec::new())
            .expect("no arguments required");

        assert_eq!(Value::Int(vec![1, 2]), second[0]);
        assert_eq!(Some(&Value::Int(vec![1, 2])), signature.params()[0].default());
    }

    #[test]
    fn test_exact_arity_message() {
        let signature = Signature::function("f", TypeMask::VOID)
            .add_int("a")
            .build()
            .expect("valid signature");

        let error = signature
            .materialize_defaults(Vec::new())
            .expect_err("missing argument");

        assert!(matches!(error, CallError::TooFewArguments { exact: true, .. }));
        assert!(error.to_string().contains("requires exactly 1 argument(s)"));
    }
}
