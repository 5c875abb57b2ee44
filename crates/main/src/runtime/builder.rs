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

use std::sync::Arc;

use compact_str::CompactString;
use log::{debug, warn};

use crate::runtime::{
    check::match_value,
    registry::REGISTRY_LOG,
    AcceleratedFn,
    FrozenValue,
    NameId,
    ObjectClass,
    Param,
    ScriptValue,
    Signature,
    SignatureError,
    SignatureKind,
    SignatureResult,
    TypeMask,
    Value,
};

/// A policy for parameters rejected by a [SignatureBuilder].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum BuildMode {
    /// The first rejected parameter makes [SignatureBuilder::build] fail.
    #[default]
    Strict,

    /// Rejected parameters are logged and skipped, and the signature is
    /// built from the remaining ones.
    FaultTolerant,
}

/// A fluent registration API for [Signature] objects.
///
/// ```
/// use eidos_sig::runtime::{Signature, TypeMask};
///
/// let signature = Signature::function("rep", TypeMask::ANY)
///     .add_any("x")
///     .add_int_singleton("count")
///     .build()
///     .unwrap();
///
/// assert_eq!("(*)rep(* x, integer$ count)", signature.to_string());
/// ```
///
/// Every `add_*` function validates the new parameter against the ones added
/// before it, and skips the parameter on violation. The violations are
/// remembered until [build](Self::build): in [BuildMode::Strict] mode the
/// first one fails the build, and in [BuildMode::FaultTolerant] mode each one
/// is logged as a warning.
///
/// The [try_add](Self::try_add) function reports a violation immediately
/// regardless of the mode.
pub struct SignatureBuilder {
    signature: Signature,
    mode: Option<BuildMode>,
    rejected: Vec<SignatureError>,
}

impl Signature {
    /// Starts a free function signature.
    #[inline(always)]
    pub fn function(name: &str, return_mask: TypeMask) -> SignatureBuilder {
        SignatureBuilder::new(name, return_mask, SignatureKind::Function { delegate: None })
    }

    /// Starts an instance method signature.
    #[inline(always)]
    pub fn instance_method(name: &str, return_mask: TypeMask) -> SignatureBuilder {
        SignatureBuilder::new(
            name,
            return_mask,
            SignatureKind::InstanceMethod { accelerated: None },
        )
    }

    /// Starts a class method signature.
    #[inline(always)]
    pub fn class_method(name: &str, return_mask: TypeMask) -> SignatureBuilder {
        SignatureBuilder::new(name, return_mask, SignatureKind::ClassMethod)
    }
}

macro_rules! add_family {
    (
        $what:literal, $mask:expr;
        $plain:ident,
        $optional:ident,
        $singleton:ident,
        $optional_singleton:ident,
        $nullable:ident $(,)?
    ) => {
        #[doc = concat!("Adds a required ", $what, " parameter.")]
        #[inline(always)]
        pub fn $plain(self, name: &str) -> Self {
            self.add(name, $mask, None, None)
        }

        #[doc = concat!("Adds an optional ", $what, " parameter.")]
        #[inline(always)]
        pub fn $optional(self, name: &str, default: impl Into<Value>) -> Self {
            self.add(name, $mask.optional(), None, Some(default.into()))
        }

        #[doc = concat!("Adds a required singleton ", $what, " parameter.")]
        #[inline(always)]
        pub fn $singleton(self, name: &str) -> Self {
            self.add(name, $mask.singleton(), None, None)
        }

        #[doc = concat!("Adds an optional singleton ", $what, " parameter.")]
        #[inline(always)]
        pub fn $optional_singleton(self, name: &str, default: impl Into<Value>) -> Self {
            self.add(name, $mask.optional().singleton(), None, Some(default.into()))
        }

        #[doc = concat!("Adds a required ", $what, " parameter that also accepts NULL.")]
        #[inline(always)]
        pub fn $nullable(self, name: &str) -> Self {
            self.add(name, $mask.nullable(), None, None)
        }
    };
}

macro_rules! add_object_family {
    (
        $what:literal, $mask:expr;
        $plain:ident,
        $optional:ident,
        $singleton:ident,
        $optional_singleton:ident,
        $nullable:ident $(,)?
    ) => {
        #[doc = concat!("Adds a required ", $what, " parameter of the specified class.")]
        #[inline(always)]
        pub fn $plain(self, name: &str, class: &'static ObjectClass) -> Self {
            self.add(name, $mask, narrow(class), None)
        }

        #[doc = concat!("Adds an optional ", $what, " parameter of the specified class.")]
        #[inline(always)]
        pub fn $optional(
            self,
            name: &str,
            class: &'static ObjectClass,
            default: impl Into<Value>,
        ) -> Self {
            self.add(name, $mask.optional(), narrow(class), Some(default.into()))
        }

        #[doc = concat!(
            "Adds a required singleton ",
            $what,
            " parameter of the specified class.",
        )]
        #[inline(always)]
        pub fn $singleton(self, name: &str, class: &'static ObjectClass) -> Self {
            self.add(name, $mask.singleton(), narrow(class), None)
        }

        #[doc = concat!(
            "Adds an optional singleton ",
            $what,
            " parameter of the specified class.",
        )]
        #[inline(always)]
        pub fn $optional_singleton(
            self,
            name: &str,
            class: &'static ObjectClass,
            default: impl Into<Value>,
        ) -> Self {
            self.add(
                name,
                $mask.optional().singleton(),
                narrow(class),
                Some(default.into()),
            )
        }

        #[doc = concat!(
            "Adds a required ",
            $what,
            " parameter of the specified class that also accepts NULL.",
        )]
        #[inline(always)]
        pub fn $nullable(self, name: &str, class: &'static ObjectClass) -> Self {
            self.add(name, $mask.nullable(), narrow(class), None)
        }
    };
}

impl SignatureBuilder {
    fn new(name: &str, return_mask: TypeMask, kind: SignatureKind) -> Self {
        Self {
            signature: Signature {
                name: CompactString::from(name),
                id: NameId::intern(name),
                return_mask,
                return_class: None,
                params: Vec::new(),
                has_optional: false,
                has_ellipsis: false,
                deprecated: false,
                hint: None,
                kind,
            },
            mode: None,
            rejected: Vec::new(),
        }
    }

    /// Sets the policy for rejected parameters.
    ///
    /// If not set, the policy is [BuildMode::Strict], or the one configured
    /// by the [Registry](crate::runtime::Registry) the builder is registered
    /// with.
    #[inline(always)]
    pub fn mode(mut self, mode: BuildMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// A shortcut for `mode(BuildMode::FaultTolerant)`.
    #[inline(always)]
    pub fn fault_tolerant(self) -> Self {
        self.mode(BuildMode::FaultTolerant)
    }

    /// Constrains the object elements of the return value to the specified
    /// class or its subclasses.
    #[inline(always)]
    pub fn returning_class(mut self, class: &'static ObjectClass) -> Self {
        self.signature.return_class = narrow(class);
        self
    }

    /// Names the component that provides this function.
    pub fn delegate(mut self, delegate: &str) -> Self {
        match &mut self.signature.kind {
            SignatureKind::Function { delegate: slot } => {
                *slot = Some(CompactString::from(delegate));
            }

            _ => {
                let error = SignatureError::MisplacedDelegate {
                    callable: self.signature.name.clone(),
                };

                self.reject(error);
            }
        }

        self
    }

    /// Attaches a batched implementation to this instance method.
    pub fn declare_accelerated(mut self, accelerated: AcceleratedFn) -> Self {
        match &mut self.signature.kind {
            SignatureKind::InstanceMethod { accelerated: slot } => *slot = Some(accelerated),

            _ => {
                let error = SignatureError::MisplacedAccelerated {
                    callable: self.signature.name.clone(),
                };

                self.reject(error);
            }
        }

        self
    }

    /// Sets the guidance text appended to argument diagnostics of this
    /// callable.
    #[inline(always)]
    pub fn hint(mut self, hint: &str) -> Self {
        self.signature.hint = Some(CompactString::from(hint));
        self
    }

    /// Marks the callable as deprecated.
    #[inline(always)]
    pub fn mark_deprecated(mut self) -> Self {
        self.signature.deprecated = true;
        self
    }

    /// Returns true if a guidance text has been set.
    #[inline(always)]
    pub(crate) fn has_hint(&self) -> bool {
        self.signature.hint.is_some()
    }

    /// The name of the callable being built.
    #[inline(always)]
    pub fn name(&self) -> &str {
        self.signature.name.as_str()
    }

    /// Adds a parameter, or skips it and remembers the violation.
    ///
    /// The `default` value is required for parameters with the
    /// [OPTIONAL](TypeMask::OPTIONAL) modifier and forbidden otherwise.
    pub fn add(
        mut self,
        name: &str,
        mask: TypeMask,
        class: Option<&'static ObjectClass>,
        default: Option<Value>,
    ) -> Self {
        if let Err(error) = self.try_add(name, mask, class, default) {
            self.reject(error);
        }

        self
    }

    /// Adds a parameter, or returns the violation without modifying the
    /// builder.
    pub fn try_add(
        &mut self,
        name: &str,
        mask: TypeMask,
        class: Option<&'static ObjectClass>,
        default: Option<Value>,
    ) -> SignatureResult<()> {
        let callable = &self.signature.name;
        let parameter = || CompactString::from(name);

        if name.is_empty() {
            return Err(SignatureError::EmptyName {
                callable: callable.clone(),
            });
        }

        if self.signature.has_ellipsis {
            return Err(SignatureError::ParameterAfterEllipsis {
                callable: callable.clone(),
                parameter: parameter(),
            });
        }

        if mask.kinds().intersects(TypeMask::VOID) {
            return Err(SignatureError::VoidParameter {
                callable: callable.clone(),
                parameter: parameter(),
            });
        }

        if mask.is_ellipsis() || !mask.is_well_formed() {
            return Err(SignatureError::MalformedMask {
                callable: callable.clone(),
                parameter: Some(parameter()),
                mask,
            });
        }

        if class.is_some() && !mask.intersects(TypeMask::OBJECT) {
            return Err(SignatureError::ClassWithoutObject {
                callable: callable.clone(),
                parameter: Some(parameter()),
            });
        }

        if self.signature.param(name).is_some() {
            return Err(SignatureError::DuplicateParameter {
                callable: callable.clone(),
                parameter: parameter(),
            });
        }

        let optional = mask.is_optional();

        if !optional && self.signature.has_optional {
            return Err(SignatureError::RequiredAfterOptional {
                callable: callable.clone(),
                parameter: parameter(),
            });
        }

        let default = match (optional, default) {
            (true, None) => {
                return Err(SignatureError::MissingDefault {
                    callable: callable.clone(),
                    parameter: parameter(),
                })
            }

            (false, Some(_)) => {
                return Err(SignatureError::DefaultWithoutOptional {
                    callable: callable.clone(),
                    parameter: parameter(),
                })
            }

            (false, None) => None,

            (true, Some(default)) => {
                if !default.is_invisible_null() {
                    if let Err(mismatch) = match_value(mask, class, &default) {
                        return Err(SignatureError::MalformedDefault {
                            callable: callable.clone(),
                            parameter: parameter(),
                            mismatch,
                        });
                    }
                }

                Some(FrozenValue::freeze(default))
            }
        };

        self.signature.params.push(Param {
            mask,
            name: parameter(),
            id: NameId::intern(name),
            class,
            default,
        });

        self.signature.has_optional |= optional;

        Ok(())
    }

    /// Adds the trailing ellipsis, which accepts any number of additional
    /// non-void arguments.
    ///
    /// The ellipsis may follow optional parameters, but nothing may follow
    /// the ellipsis.
    pub fn add_ellipsis(mut self) -> Self {
        if self.signature.has_ellipsis {
            let error = SignatureError::DuplicateEllipsis {
                callable: self.signature.name.clone(),
            };

            self.reject(error);

            return self;
        }

        self.signature.params.push(Param {
            mask: TypeMask::ANY.union(TypeMask::ELLIPSIS),
            name: CompactString::from("..."),
            id: NameId::intern("..."),
            class: None,
            default: None,
        });

        self.signature.has_ellipsis = true;

        self
    }

    add_family!(
        "logical", TypeMask::LOGICAL;
        add_logical,
        add_logical_optional,
        add_logical_singleton,
        add_logical_optional_singleton,
        add_logical_nullable,
    );

    add_family!(
        "integer", TypeMask::INT;
        add_int,
        add_int_optional,
        add_int_singleton,
        add_int_optional_singleton,
        add_int_nullable,
    );

    add_family!(
        "float", TypeMask::FLOAT;
        add_float,
        add_float_optional,
        add_float_singleton,
        add_float_optional_singleton,
        add_float_nullable,
    );

    add_family!(
        "string", TypeMask::STRING;
        add_string,
        add_string_optional,
        add_string_singleton,
        add_string_optional_singleton,
        add_string_nullable,
    );

    add_family!(
        "integer or string", TypeMask::INT.union(TypeMask::STRING);
        add_int_string,
        add_int_string_optional,
        add_int_string_singleton,
        add_int_string_optional_singleton,
        add_int_string_nullable,
    );

    add_family!(
        "numeric", TypeMask::NUMERIC;
        add_numeric,
        add_numeric_optional,
        add_numeric_singleton,
        add_numeric_optional_singleton,
        add_numeric_nullable,
    );

    add_family!(
        "logical-equivalent", TypeMask::LOGICAL_EQUIV;
        add_logical_equiv,
        add_logical_equiv_optional,
        add_logical_equiv_singleton,
        add_logical_equiv_optional_singleton,
        add_logical_equiv_nullable,
    );

    add_family!(
        "non-object", TypeMask::ANY_BASE;
        add_any_base,
        add_any_base_optional,
        add_any_base_singleton,
        add_any_base_optional_singleton,
        add_any_base_nullable,
    );

    add_family!(
        "untyped", TypeMask::ANY;
        add_any,
        add_any_optional,
        add_any_singleton,
        add_any_optional_singleton,
        add_any_nullable,
    );

    add_object_family!(
        "object", TypeMask::OBJECT;
        add_object,
        add_object_optional,
        add_object_singleton,
        add_object_optional_singleton,
        add_object_nullable,
    );

    add_object_family!(
        "integer or object", TypeMask::INT.union(TypeMask::OBJECT);
        add_int_object,
        add_int_object_optional,
        add_int_object_singleton,
        add_int_object_optional_singleton,
        add_int_object_nullable,
    );

    /// Finishes the signature.
    ///
    /// Fails with the first remembered violation in [BuildMode::Strict] mode,
    /// or if the callable name or the return contract is malformed.
    #[inline(always)]
    pub fn build(self) -> SignatureResult<Arc<Signature>> {
        self.build_in(BuildMode::Strict)
    }

    /// Finishes the signature using the `default` policy if the builder has
    /// no policy of its own.
    pub(crate) fn build_in(self, default: BuildMode) -> SignatureResult<Arc<Signature>> {
        let signature = self.signature;

        match self.mode.unwrap_or(default) {
            BuildMode::Strict => {
                if let Some(error) = self.rejected.into_iter().next() {
                    return Err(error);
                }
            }

            BuildMode::FaultTolerant => {
                for error in self.rejected {
                    warn!(target: REGISTRY_LOG, "Signature declaration skipped: {error}.");
                }
            }
        }

        if signature.name.is_empty() {
            return Err(SignatureError::EmptyName {
                callable: CompactString::default(),
            });
        }

        let return_mask = signature.return_mask;

        if return_mask.is_optional() || return_mask.is_ellipsis() || !return_mask.is_well_formed()
        {
            return Err(SignatureError::MalformedMask {
                callable: signature.name,
                parameter: None,
                mask: return_mask,
            });
        }

        if signature.return_class.is_some() && !return_mask.intersects(TypeMask::OBJECT) {
            return Err(SignatureError::ClassWithoutObject {
                callable: signature.name,
                parameter: None,
            });
        }

        debug!(target: REGISTRY_LOG, "Signature built: {signature}.");

        Ok(Arc::new(signature))
    }

    #[inline(always)]
    fn reject(&mut self, error: SignatureError) {
        self.rejected.push(error);
    }
}

#[inline(always)]
fn narrow(class: &'static ObjectClass) -> Option<&'static ObjectClass> {
    match class.is_generic() {
        true => None,
        false => Some(class),
    }
}

#[cfg(test)]
mod tests {
    use crate::runtime::{
        Mismatch,
        ObjectClass,
        Signature,
        SignatureError,
        TypeMask,
        Value,
        ValueKind,
        OBJECT_CLASS,
    };

    static CELL: ObjectClass = ObjectClass::new("Cell", &OBJECT_CLASS);

    #[test]
    fn test_required_after_optional() {
        let result = Signature::function("f", TypeMask::VOID)
            .add_int_optional("a", 1i64)
            .add_int("b")
            .build();

        assert!(matches!(
            result,
            Err(SignatureError::RequiredAfterOptional { parameter, .. }) if parameter == "b",
        ));
    }

    #[test]
    fn test_ellipsis_placement() {
        let signature = Signature::function("f", TypeMask::VOID)
            .add_int_optional("a", 1i64)
            .add_ellipsis()
            .build()
            .expect("ellipsis may follow optional parameters");

        assert!(signature.has_ellipsis());
        assert_eq!(0, signature.required_count());

        let result = Signature::function("f", TypeMask::VOID)
            .add_ellipsis()
            .add_int("a")
            .build();

        assert!(matches!(
            result,
            Err(SignatureError::ParameterAfterEllipsis { .. })
        ));

        let result = Signature::function("f", TypeMask::VOID)
            .add_ellipsis()
            .add_ellipsis()
            .build();

        assert!(matches!(result, Err(SignatureError::DuplicateEllipsis { .. })));
    }

    #[test]
    fn test_defaults_are_validated() {
        let result = Signature::function("f", TypeMask::VOID)
            .add_int_optional("a", "text")
            .build();

        assert!(matches!(
            result,
            Err(SignatureError::MalformedDefault {
                mismatch: Mismatch::Type(ValueKind::String),
                ..
            })
        ));

        let result = Signature::function("f", TypeMask::VOID)
            .add("a", TypeMask::INT.optional(), None, None)
            .build();

        assert!(matches!(result, Err(SignatureError::MissingDefault { .. })));

        let result = Signature::function("f", TypeMask::VOID)
            .add("a", TypeMask::INT, None, Some(Value::from(1i64)))
            .build();

        assert!(matches!(
            result,
            Err(SignatureError::DefaultWithoutOptional { .. })
        ));

        let signature = Signature::function("f", TypeMask::VOID)
            .add_object_optional_singleton("cell", &CELL, Value::invisible_null())
            .build()
            .expect("invisible NULL is accepted for any optional parameter");

        assert!(signature.params()[0].defaults_to_invisible_null());
    }

    #[test]
    fn test_malformed_masks() {
        let result = Signature::function("f", TypeMask::VOID)
            .add("a", TypeMask::VOID, None, None)
            .build();

        assert!(matches!(result, Err(SignatureError::VoidParameter { .. })));

        let result = Signature::function("f", TypeMask::VOID)
            .add("a", TypeMask::INT, Some(&CELL), None)
            .build();

        assert!(matches!(
            result,
            Err(SignatureError::ClassWithoutObject { .. })
        ));

        let result = Signature::function("f", TypeMask::INT.optional()).build();

        assert!(matches!(
            result,
            Err(SignatureError::MalformedMask { parameter: None, .. })
        ));

        let result = Signature::function("f", TypeMask::INT)
            .returning_class(&CELL)
            .build();

        assert!(matches!(
            result,
            Err(SignatureError::ClassWithoutObject { parameter: None, .. })
        ));
    }

    #[test]
    fn test_fault_tolerant_mode() {
        let signature = Signature::function("f", TypeMask::VOID)
            .fault_tolerant()
            .add_int("a")
            .add_int("a")
            .add_int_optional("b", 2i64)
            .add_int("c")
            .build()
            .expect("violations are skipped");

        let names = signature
            .params()
            .iter()
            .map(|param| param.name())
            .collect::<Vec<_>>();

        assert_eq!(vec!["a", "b"], names);
    }

    #[test]
    fn test_try_add_reports_immediately() {
        let mut builder = Signature::function("f", TypeMask::VOID).add_int("a");

        assert!(builder
            .try_add("a", TypeMask::FLOAT, None, None)
            .is_err());
        assert!(builder.try_add("b", TypeMask::FLOAT, None, None).is_ok());

        let signature = builder.build().expect("valid signature");

        assert_eq!(2, signature.params().len());
    }

    #[test]
    fn test_misplaced_declarations() {
        fn batch(
            _receivers: &[crate::runtime::ObjectRef],
            _method: crate::runtime::NameId,
            _arguments: &[Value],
        ) -> Value {
            Value::null()
        }

        let result = Signature::function("f", TypeMask::VOID)
            .declare_accelerated(batch)
            .build();

        assert!(matches!(
            result,
            Err(SignatureError::MisplacedAccelerated { .. })
        ));

        let result = Signature::class_method("f", TypeMask::VOID)
            .delegate("Other")
            .build();

        assert!(matches!(
            result,
            Err(SignatureError::MisplacedDelegate { .. })
        ));

        let signature = Signature::instance_method("f", TypeMask::INT)
            .declare_accelerated(batch)
            .build()
            .expect("valid signature");

        assert!(signature.accelerated().is_some());
    }
}
