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

use std::sync::{Arc, Mutex};

use ahash::{AHashMap, AHashSet};
use compact_str::CompactString;
use log::{debug, trace, warn};
use strsim::normalized_damerau_levenshtein;

use crate::{
    config::RegistryConfig,
    runtime::{
        CallError,
        CallKind,
        CallResult,
        HintTable,
        NameId,
        ObjectClass,
        ObjectRef,
        Signature,
        SignatureBuilder,
        SignatureError,
        SignatureResult,
        Value,
    },
};

/// A log target of the registration and lookup events.
pub static REGISTRY_LOG: &str = "eidos-sig::$registry";

/// A native implementation of a free function.
///
/// The `arguments` are already default-materialized and checked against the
/// function's signature.
pub type FunctionFn = fn(arguments: &[Value]) -> CallResult<Value>;

/// A native implementation of an instance method, invoked once per receiver.
pub type InstanceMethodFn =
    fn(receiver: &ObjectRef, method: NameId, arguments: &[Value]) -> CallResult<Value>;

/// A native implementation of a class method, invoked once per call with the
/// class of the receivers.
pub type ClassMethodFn =
    fn(class: &'static ObjectClass, method: NameId, arguments: &[Value]) -> CallResult<Value>;

pub(super) struct FunctionEntry {
    pub(super) signature: Arc<Signature>,
    pub(super) handler: Option<FunctionFn>,
}

pub(super) enum MethodHandler {
    Instance(Option<InstanceMethodFn>),
    Class(ClassMethodFn),
}

pub(super) struct MethodEntry {
    pub(super) signature: Arc<Signature>,
    pub(super) handler: MethodHandler,
}

/// A table of the callables a language offers: free functions, and instance
/// and class methods per [ObjectClass].
///
/// The registry is populated once, during the warm-up phase, through the
/// `register_*` functions, and is shared read-only afterwards (typically
/// behind an [Arc], see [Registry::warm_up]). Every registered
/// [Signature] is immutable, so any number of threads may look up callables
/// and dispatch calls concurrently.
///
/// Method lookup walks the receiver class's [lineage](ObjectClass::lineage):
/// a method registered on a superclass is available on all of its
/// subclasses unless a subclass registers a method with the same name.
pub struct Registry {
    config: RegistryConfig,
    hints: HintTable,
    functions: AHashMap<NameId, FunctionEntry>,
    methods: AHashMap<&'static ObjectClass, AHashMap<NameId, MethodEntry>>,
    deprecation_reported: Mutex<AHashSet<NameId>>,
}

impl Default for Registry {
    #[inline(always)]
    fn default() -> Self {
        Self::new(RegistryConfig::default())
    }
}

impl Registry {
    /// Creates an empty registry with the [historical](HintTable::historical)
    /// diagnostic hints.
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            config,
            hints: HintTable::default(),
            functions: AHashMap::new(),
            methods: AHashMap::new(),
            deprecation_reported: Mutex::new(AHashSet::new()),
        }
    }

    /// Creates a registry, populates it with the `setup` function, and
    /// freezes it for shared use.
    ///
    /// ```
    /// use eidos_sig::{
    ///     config::RegistryConfig,
    ///     runtime::{Registry, Signature, TypeMask, Value},
    /// };
    ///
    /// let registry = Registry::warm_up(RegistryConfig::new(), |registry| {
    ///     registry.register_function(
    ///         Signature::function("answer", TypeMask::INT.singleton()),
    ///         Some(|_| Ok(Value::from(42i64))),
    ///     )?;
    ///
    ///     Ok(())
    /// })
    /// .unwrap();
    ///
    /// let result = registry.call_function("answer", Vec::new()).unwrap();
    ///
    /// assert_eq!(Value::from(42i64), result);
    /// ```
    pub fn warm_up(
        config: RegistryConfig,
        setup: impl FnOnce(&mut Self) -> SignatureResult<()>,
    ) -> SignatureResult<Arc<Self>> {
        let mut registry = Self::new(config);

        setup(&mut registry)?;

        debug!(
            target: REGISTRY_LOG,
            "Registry warmed up: {} function(s), {} class(es) with methods.",
            registry.functions.len(),
            registry.methods.len(),
        );

        Ok(Arc::new(registry))
    }

    /// The configuration of this registry.
    #[inline(always)]
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// The diagnostic hints attached to signatures at registration.
    #[inline(always)]
    pub fn hints(&self) -> &HintTable {
        &self.hints
    }

    /// Gives mutable access to the diagnostic hints.
    ///
    /// Changes affect only the signatures registered afterwards.
    #[inline(always)]
    pub fn hints_mut(&mut self) -> &mut HintTable {
        &mut self.hints
    }

    /// Registers a free function.
    ///
    /// The `handler` may be omitted for functions that are implemented
    /// elsewhere (e.g. by a delegate); calling such a function through
    /// [call_function](Self::call_function) fails with
    /// [CallError::UnboundCallable].
    pub fn register_function(
        &mut self,
        builder: SignatureBuilder,
        handler: Option<FunctionFn>,
    ) -> SignatureResult<Arc<Signature>> {
        let signature = self.finish(builder, CallKind::Function)?;

        if self.functions.contains_key(&signature.id) {
            return Err(SignatureError::DuplicateCallable {
                callable: signature.name.clone(),
                class: None,
            });
        }

        trace!(target: REGISTRY_LOG, "Function registered: {signature}.");

        let _ = self.functions.insert(
            signature.id,
            FunctionEntry {
                signature: signature.clone(),
                handler,
            },
        );

        Ok(signature)
    }

    /// Registers an instance method of the `class`.
    ///
    /// The `handler` is invoked once per receiver. It may be omitted if the
    /// signature declares an
    /// [accelerated](SignatureBuilder::declare_accelerated) implementation.
    pub fn register_instance_method(
        &mut self,
        class: &'static ObjectClass,
        builder: SignatureBuilder,
        handler: Option<InstanceMethodFn>,
    ) -> SignatureResult<Arc<Signature>> {
        let signature = self.finish(builder, CallKind::InstanceMethod)?;

        self.insert_method(class, &signature, MethodHandler::Instance(handler))?;

        Ok(signature)
    }

    /// Registers a class method of the `class`.
    pub fn register_class_method(
        &mut self,
        class: &'static ObjectClass,
        builder: SignatureBuilder,
        handler: ClassMethodFn,
    ) -> SignatureResult<Arc<Signature>> {
        let signature = self.finish(builder, CallKind::ClassMethod)?;

        self.insert_method(class, &signature, MethodHandler::Class(handler))?;

        Ok(signature)
    }

    /// Looks up a free function by name.
    #[inline(always)]
    pub fn function(&self, name: &str) -> CallResult<&Arc<Signature>> {
        self.function_entry(name).map(|entry| &entry.signature)
    }

    /// Looks up a method available on the `class`, including the methods
    /// inherited from its superclasses.
    #[inline(always)]
    pub fn method(&self, class: &'static ObjectClass, name: &str) -> CallResult<&Arc<Signature>> {
        self.method_entry(class, name).map(|entry| &entry.signature)
    }

    /// Lists the signatures of all free functions sorted by name.
    pub fn functions(&self) -> Vec<Arc<Signature>> {
        let mut result = self
            .functions
            .values()
            .map(|entry| entry.signature.clone())
            .collect::<Vec<_>>();

        Signature::sort_by_name(&mut result);

        result
    }

    /// Lists the signatures of all methods available on the `class` sorted
    /// by name.
    ///
    /// Methods inherited from superclasses are included unless the class or
    /// a closer superclass registers a method with the same name.
    pub fn methods(&self, class: &'static ObjectClass) -> Vec<Arc<Signature>> {
        let mut seen = AHashSet::new();
        let mut result = Vec::new();

        for class in class.lineage() {
            let Some(table) = self.methods.get(class) else {
                continue;
            };

            for (id, entry) in table {
                if seen.insert(*id) {
                    result.push(entry.signature.clone());
                }
            }
        }

        Signature::sort_by_name(&mut result);

        result
    }

    pub(super) fn function_entry(&self, name: &str) -> CallResult<&FunctionEntry> {
        if let Some(id) = NameId::lookup(name) {
            if let Some(entry) = self.functions.get(&id) {
                return Ok(entry);
            }
        }

        debug!(target: REGISTRY_LOG, "Unknown function {name}().");

        let suggestion = self.suggest(
            name,
            self.functions
                .values()
                .map(|entry| entry.signature.name.as_str()),
        );

        Err(CallError::UnknownFunction {
            name: CompactString::from(name),
            suggestion,
        })
    }

    pub(super) fn method_entry(
        &self,
        class: &'static ObjectClass,
        name: &str,
    ) -> CallResult<&MethodEntry> {
        if let Some(id) = NameId::lookup(name) {
            for class in class.lineage() {
                let Some(table) = self.methods.get(class) else {
                    continue;
                };

                if let Some(entry) = table.get(&id) {
                    return Ok(entry);
                }
            }
        }

        debug!(target: REGISTRY_LOG, "Unknown method {name}() on {class}.");

        let suggestion = self.suggest(
            name,
            class
                .lineage()
                .filter_map(|class| self.methods.get(class))
                .flat_map(|table| table.values())
                .map(|entry| entry.signature.name.as_str()),
        );

        Err(CallError::UnknownMethod {
            class,
            name: CompactString::from(name),
            suggestion,
        })
    }

    /// Logs a warning the first time a deprecated callable is invoked.
    pub(super) fn report_deprecation(&self, signature: &Signature) {
        if !signature.deprecated {
            return;
        }

        let mut reported = self
            .deprecation_reported
            .lock()
            .unwrap_or_else(|poison| poison.into_inner());

        if reported.insert(signature.id) {
            warn!(
                target: REGISTRY_LOG,
                "{} {}() is deprecated.",
                signature.call_kind(),
                signature.name,
            );
        }
    }

    fn finish(
        &self,
        mut builder: SignatureBuilder,
        expected: CallKind,
    ) -> SignatureResult<Arc<Signature>> {
        if !builder.has_hint() {
            if let Some(hint) = self.hints.get(builder.name()) {
                builder = builder.hint(hint);
            }
        }

        let signature = builder.build_in(self.config.build_mode())?;
        let actual = signature.call_kind();

        if actual != expected {
            return Err(SignatureError::WrongCallKind {
                callable: signature.name.clone(),
                expected,
                actual,
            });
        }

        Ok(signature)
    }

    fn insert_method(
        &mut self,
        class: &'static ObjectClass,
        signature: &Arc<Signature>,
        handler: MethodHandler,
    ) -> SignatureResult<()> {
        let table = self.methods.entry(class).or_default();

        if table.contains_key(&signature.id) {
            return Err(SignatureError::DuplicateCallable {
                callable: signature.name.clone(),
                class: Some(class),
            });
        }

        trace!(target: REGISTRY_LOG, "Method registered on {class}: {signature}.");

        let _ = table.insert(
            signature.id,
            MethodEntry {
                signature: signature.clone(),
                handler,
            },
        );

        Ok(())
    }

    fn suggest<'a>(
        &self,
        name: &str,
        candidates: impl Iterator<Item = &'a str>,
    ) -> Option<CompactString> {
        if !self.config.suggest_names {
            return None;
        }

        let mut best = None;
        let mut best_score = self.config.suggestion_threshold;

        for candidate in candidates {
            let score = normalized_damerau_levenshtein(name, candidate);

            if score >= best_score {
                best_score = score;
                best = Some(candidate);
            }
        }

        best.map(CompactString::from)
    }
}
