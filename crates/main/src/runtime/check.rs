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

use compact_str::CompactString;

use crate::runtime::{
    CallError,
    CallResult,
    Mismatch,
    ObjectClass,
    Param,
    ScriptValue,
    Signature,
    TypeMask,
    ValueKind,
};

/// Tests a value against a mask and its optional object class constraint.
///
/// VOID passes only if the mask sets the VOID bit. NULL passes if the mask
/// admits it, and is exempt from the singleton requirement. An empty object
/// vector of the generic class passes any class constraint.
pub(crate) fn match_value<V: ScriptValue + ?Sized>(
    mask: TypeMask,
    class: Option<&'static ObjectClass>,
    value: &V,
) -> Result<(), Mismatch> {
    let kind = value.kind();

    if !mask.admits(kind) {
        return Err(Mismatch::Type(kind));
    }

    if kind == ValueKind::Null {
        return Ok(());
    }

    match_class(class, value)?;

    if mask.is_singleton() {
        let count = value.count();

        if count != 1 {
            return Err(Mismatch::Singleton(count));
        }
    }

    Ok(())
}

#[inline]
fn match_class<V: ScriptValue + ?Sized>(
    expected: Option<&'static ObjectClass>,
    value: &V,
) -> Result<(), Mismatch> {
    if value.kind() != ValueKind::Object {
        return Ok(());
    }

    let Some(expected) = expected else {
        return Ok(());
    };

    let actual = value.object_class().unwrap_or(ObjectClass::generic());

    if actual.is_generic() && value.count() == 0 {
        return Ok(());
    }

    if !actual.is_subclass_of(expected) {
        return Err(Mismatch::Class { actual, expected });
    }

    Ok(())
}

impl Signature {
    /// Validates a fully materialized argument list.
    ///
    /// The caller is expected to have substituted defaults for omitted
    /// optional arguments already, so without an ellipsis the argument count
    /// must match the number of declared parameters exactly. Arguments
    /// consumed by the ellipsis are only required to be non-void.
    ///
    /// This function does not mutate anything and may be called concurrently
    /// from any number of threads.
    pub fn check_arguments<V: ScriptValue>(&self, arguments: &[V]) -> CallResult<()> {
        let count = arguments.len();
        let min_count = self.declared_count();

        if count < min_count {
            return Err(CallError::TooFewArguments {
                call: self.call_kind(),
                callable: self.name.clone(),
                required: min_count,
                supplied: count,
                exact: !self.has_ellipsis,
            });
        }

        if !self.has_ellipsis && count > min_count {
            return Err(CallError::TooManyArguments {
                call: self.call_kind(),
                callable: self.name.clone(),
                allowed: min_count,
                supplied: count,
                exact: true,
            });
        }

        let mut arguments = arguments.iter().enumerate();

        for param in &self.params {
            if param.is_ellipsis() {
                for _ in 0..(count - min_count) {
                    let Some((index, argument)) = arguments.next() else {
                        break;
                    };

                    let kind = argument.kind();

                    if kind == ValueKind::Void {
                        return Err(self.argument_error(index + 1, param, Mismatch::Type(kind)));
                    }
                }

                continue;
            }

            let Some((index, argument)) = arguments.next() else {
                break;
            };

            if argument.is_invisible_null() && param.defaults_to_invisible_null() {
                continue;
            }

            if let Err(mismatch) = match_value(param.mask, param.class, argument) {
                return Err(self.argument_error(index + 1, param, mismatch));
            }
        }

        Ok(())
    }

    /// Validates the result of a single invocation against the declared
    /// return contract.
    ///
    /// NULL is accepted from every callable except one declared to return
    /// void.
    pub fn check_return<V: ScriptValue + ?Sized>(&self, result: &V) -> CallResult<()> {
        self.check_return_kind(result)?;

        if result.kind() == ValueKind::Null {
            return Ok(());
        }

        if self.return_mask.is_singleton() {
            let count = result.count();

            if count != 1 {
                return Err(CallError::ReturnSingleton {
                    call: self.call_kind(),
                    callable: self.name.clone(),
                    count,
                });
            }
        }

        Ok(())
    }

    /// Validates the concatenated result of a batched invocation over
    /// `batch` receivers.
    ///
    /// The kind and class checks are the same as in
    /// [check_return](Self::check_return). A singleton return mask bounds the
    /// result's element count by the batch size instead of requiring exactly
    /// one element.
    pub fn check_aggregate_return<V: ScriptValue + ?Sized>(
        &self,
        result: &V,
        batch: usize,
    ) -> CallResult<()> {
        self.check_return_kind(result)?;

        if result.kind() == ValueKind::Null {
            return Ok(());
        }

        if self.return_mask.is_singleton() {
            let count = result.count();

            if count > batch {
                return Err(CallError::ReturnBatchSize {
                    call: self.call_kind(),
                    callable: self.name.clone(),
                    batch,
                    count,
                });
            }
        }

        Ok(())
    }

    fn check_return_kind<V: ScriptValue + ?Sized>(&self, result: &V) -> CallResult<()> {
        let kind = result.kind();

        let admitted = match kind {
            ValueKind::Void => self.return_mask.is_void(),
            ValueKind::Null => !self.return_mask.is_void(),
            _ => self.return_mask.admits(kind),
        };

        if !admitted {
            return Err(CallError::ReturnType {
                call: self.call_kind(),
                callable: self.name.clone(),
                kind,
                declared_void: self.return_mask.is_void(),
            });
        }

        if let Err(Mismatch::Class { actual, expected }) = match_class(self.return_class, result) {
            return Err(CallError::ReturnClass {
                call: self.call_kind(),
                callable: self.name.clone(),
                actual,
                expected,
            });
        }

        Ok(())
    }

    fn argument_error(&self, position: usize, param: &Param, mismatch: Mismatch) -> CallError {
        let call = self.call_kind();
        let callable = self.name.clone();
        let parameter = param.name.clone();
        let hint = self.hint.as_ref().map(CompactString::clone);

        match mismatch {
            Mismatch::Type(kind) => CallError::ArgumentType {
                call,
                callable,
                position,
                parameter,
                kind,
                hint,
            },

            Mismatch::Class { actual, expected } => CallError::ArgumentClass {
                call,
                callable,
                position,
                parameter,
                actual,
                expected,
                hint,
            },

            Mismatch::Singleton(count) => CallError::ArgumentSingleton {
                call,
                callable,
                position,
                parameter,
                count,
                hint,
            },
        }
    }
}
