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

use std::{any::Any, sync::Arc};

use eidos_sig::{
    config::RegistryConfig,
    object_class,
    runtime::{
        CallError,
        CallErrorKind,
        CallResult,
        CallResultExt,
        NameId,
        ObjectClass,
        ObjectRef,
        ObjectVector,
        Registry,
        ScriptObject,
        Signature,
        TypeMask,
        Value,
        OBJECT_CLASS,
    },
};

object_class!(
    /// A test element carrying a single number.
    static EGG = "Egg": OBJECT_CLASS;

    static DUCK_EGG = "DuckEgg": EGG;

    static STONE = "Stone": OBJECT_CLASS;
);

struct Egg {
    class: &'static ObjectClass,
    yolk: i64,
}

impl ScriptObject for Egg {
    fn class(&self) -> &'static ObjectClass {
        self.class
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn eggs(class: &'static ObjectClass, count: usize) -> ObjectVector {
    let elements = (0..count)
        .map(|index| {
            Arc::new(Egg {
                class,
                yolk: index as i64,
            }) as ObjectRef
        })
        .collect();

    ObjectVector::new(class, elements)
}

fn yolk(receiver: &ObjectRef) -> i64 {
    receiver
        .as_any()
        .downcast_ref::<Egg>()
        .map(|egg| egg.yolk)
        .unwrap_or_default()
}

fn double_yolk_batch(receivers: &[ObjectRef], _method: NameId, _arguments: &[Value]) -> Value {
    Value::Int(receivers.iter().map(|receiver| yolk(receiver) * 2).collect())
}

fn cubic_yolk(receiver: &ObjectRef, _method: NameId, _arguments: &[Value]) -> CallResult<Value> {
    let yolk = yolk(receiver);

    Ok(Value::from(yolk * yolk * yolk))
}

fn broken_batch(receivers: &[ObjectRef], _method: NameId, _arguments: &[Value]) -> Value {
    Value::Int(vec![0; receivers.len() + 1])
}

fn second_argument(arguments: &[Value]) -> CallResult<Value> {
    Ok(arguments[1].clone())
}

fn echo(arguments: &[Value]) -> CallResult<Value> {
    Ok(arguments.first().cloned().unwrap_or(Value::Void))
}

fn silent(_arguments: &[Value]) -> CallResult<Value> {
    Ok(Value::Void)
}

fn cluck(_receiver: &ObjectRef, _method: NameId, _arguments: &[Value]) -> CallResult<Value> {
    Ok(Value::Void)
}

fn brood(receiver: &ObjectRef, _method: NameId, _arguments: &[Value]) -> CallResult<Value> {
    match yolk(receiver) {
        0 => Ok(Value::Object(ObjectVector::empty())),

        parent => Ok(Value::Object(ObjectVector::singleton(Arc::new(Egg {
            class: &EGG,
            yolk: parent,
        })))),
    }
}

fn lay(class: &'static ObjectClass, _method: NameId, arguments: &[Value]) -> CallResult<Value> {
    let count = match &arguments[0] {
        Value::Int(vector) => vector[0] as usize,
        _ => 0,
    };

    Ok(Value::Object(eggs(class, count)))
}

fn registry() -> Arc<Registry> {
    Registry::warm_up(RegistryConfig::new(), |registry| {
        registry.register_function(
            Signature::function("f", TypeMask::STRING)
                .add_int_singleton("a")
                .add_string_optional("b", "x")
                .add_ellipsis(),
            Some(second_argument),
        )?;

        registry.register_function(
            Signature::function("echo", TypeMask::ANY).add_any("x"),
            Some(echo),
        )?;

        registry.register_function(
            Signature::function("nothing", TypeMask::VOID).add_any("x"),
            Some(echo),
        )?;

        registry.register_function(Signature::function("silent", TypeMask::VOID), Some(silent))?;

        registry.register_function(
            Signature::function("incubate", TypeMask::VOID)
                .add_object_singleton("egg", &EGG),
            None,
        )?;

        registry.register_instance_method(
            &EGG,
            Signature::instance_method("doubleYolk", TypeMask::INT.singleton())
                .declare_accelerated(double_yolk_batch),
            None,
        )?;

        registry.register_instance_method(
            &EGG,
            Signature::instance_method("cubicYolk", TypeMask::INT.singleton()),
            Some(cubic_yolk),
        )?;

        registry.register_instance_method(
            &EGG,
            Signature::instance_method("brokenYolk", TypeMask::INT.singleton())
                .declare_accelerated(broken_batch),
            None,
        )?;

        registry.register_instance_method(
            &EGG,
            Signature::instance_method("cluck", TypeMask::VOID),
            Some(cluck),
        )?;

        registry.register_instance_method(
            &EGG,
            Signature::instance_method("brood", TypeMask::OBJECT).returning_class(&EGG),
            Some(brood),
        )?;

        registry.register_class_method(
            &EGG,
            Signature::class_method("lay", TypeMask::OBJECT)
                .returning_class(&EGG)
                .add_int_singleton("count"),
            lay,
        )?;

        Ok(())
    })
    .expect_blame("Registry warm-up failed.")
}

#[test]
fn test_optional_and_ellipsis_call() {
    let registry = registry();

    let result = registry
        .call_function("f", vec![Value::from(5i64)])
        .expect("defaults are materialized");

    assert_eq!(Value::from("x"), result);

    let result = registry
        .call_function(
            "f",
            vec![
                Value::from(5i64),
                Value::from("y"),
                Value::from(1i64),
                Value::from(2.0),
                Value::from("z"),
            ],
        )
        .expect("ellipsis accepts any non-void arguments");

    assert_eq!(Value::from("y"), result);

    let error = registry
        .call_function("f", vec![Value::from(5i64), Value::from(5i64)])
        .expect_err("int is not a string");

    assert_eq!(CallErrorKind::Argument, error.kind());
    assert_eq!(Some(2), error.position());
    assert_eq!(
        "argument 2 (b) cannot be type integer for function f()",
        error.to_string(),
    );

    let error = registry
        .call_function("f", Vec::new())
        .expect_err("a is required");

    assert_eq!(CallErrorKind::Arity, error.kind());
    assert!(error
        .to_string()
        .contains("requires at least 1 argument(s), but 0 are supplied"));
}

#[test]
fn test_batched_and_single_receiver_calls() {
    let registry = registry();
    let receivers = eggs(&EGG, 1000);

    let result = registry
        .call_method(&receivers, "doubleYolk", Vec::new())
        .expect("batched call passes the aggregate check");

    match &result {
        Value::Int(vector) => {
            assert_eq!(1000, vector.len());
            assert_eq!(1998, vector[999]);
        }

        other => panic!("integer vector expected, got {other:?}"),
    }

    let signature = registry
        .method(&EGG, "doubleYolk")
        .expect("registered method");

    assert!(signature.check_aggregate_return(&result, 1000).is_ok());
    assert!(signature.check_return(&result).is_err());

    let single = eggs(&EGG, 1);

    let result = registry
        .call_method_on(&single.elements[0], "doubleYolk", Vec::new())
        .expect("single receiver passes the singular check");

    assert_eq!(Value::Int(vec![0]), result);
    assert!(signature.check_return(&result).is_ok());
}

#[test]
fn test_per_receiver_dispatch() {
    let registry = registry();
    let receivers = eggs(&DUCK_EGG, 4);

    let result = registry
        .call_method(&receivers, "cubicYolk", Vec::new())
        .expect("inherited method");

    assert_eq!(Value::Int(vec![0, 1, 8, 27]), result);

    let result = registry
        .call_method_on(&receivers.elements[3], "cubicYolk", Vec::new())
        .expect("inherited method");

    assert_eq!(Value::from(27i64), result);
}

#[test]
fn test_void_method_over_receivers() {
    let registry = registry();

    let signature = registry
        .method(&EGG, "cluck")
        .expect("registered method");

    for count in [0, 1, 3] {
        let result = registry
            .call_method(&eggs(&EGG, count), "cluck", Vec::new())
            .expect("void method returns nothing");

        assert_eq!(Value::Void, result, "{count} receiver(s)");
        assert!(signature.check_return(&result).is_ok());
    }

    let single = eggs(&EGG, 1);

    assert_eq!(
        Value::Void,
        registry
            .call_method_on(&single.elements[0], "cluck", Vec::new())
            .expect("void method returns nothing"),
    );
}

#[test]
fn test_empty_object_results_keep_class() {
    let registry = registry();

    let result = registry
        .call_method(&eggs(&EGG, 3), "brood", Vec::new())
        .expect("empty and singleton results concatenate");

    match &result {
        Value::Object(vector) => {
            assert_eq!(&EGG, vector.class);
            assert_eq!(2, vector.elements.len());
        }

        other => panic!("object vector expected, got {other:?}"),
    }

    let signature = registry
        .method(&EGG, "brood")
        .expect("registered method");

    assert!(signature.check_return(&result).is_ok());
}

#[test]
fn test_class_method_dispatch() {
    let registry = registry();
    let receivers = eggs(&EGG, 10);

    let result = registry
        .call_method(&receivers, "lay", vec![Value::from(3i64)])
        .expect("class method is called once");

    match result {
        Value::Object(vector) => {
            assert_eq!(3, vector.elements.len());
            assert_eq!(&EGG, vector.class);
        }

        other => panic!("object vector expected, got {other:?}"),
    }
}

#[test]
fn test_aggregate_overflow_is_reported() {
    let registry = registry();
    let receivers = eggs(&EGG, 5);

    let error = registry
        .call_method(&receivers, "brokenYolk", Vec::new())
        .expect_err("more results than receivers");

    assert!(matches!(
        error,
        CallError::ReturnBatchSize {
            batch: 5,
            count: 6,
            ..
        }
    ));
}

#[test]
fn test_unknown_callables() {
    let registry = registry();

    let error = registry
        .call_function("ecoh", vec![Value::from(1i64)])
        .expect_err("unknown function");

    assert_eq!(CallErrorKind::Lookup, error.kind());
    assert!(error.to_string().contains("did you mean echo()?"));

    let error = registry
        .call_method(&eggs(&STONE, 1), "cubicYolk", Vec::new())
        .expect_err("not available on stones");

    assert!(matches!(error, CallError::UnknownMethod { .. }));

    let error = registry
        .call_function("incubate", vec![Value::Object(eggs(&EGG, 1))])
        .expect_err("no implementation");

    assert_eq!(CallErrorKind::Dispatch, error.kind());
}

#[test]
fn test_arity_range() {
    let signature = Signature::function("window", TypeMask::VOID)
        .add_int("a")
        .add_int("b")
        .add_int_optional("c", 3i64)
        .add_int_optional("d", 4i64)
        .build()
        .expect_blame("Valid signature.");

    for count in 0..7 {
        let arguments = vec![Value::from(1i64); count];
        let result = signature
            .materialize_defaults(arguments)
            .and_then(|arguments| signature.check_arguments(&arguments));

        match (2..=4).contains(&count) {
            true => assert!(result.is_ok(), "count {count} is in range"),

            false => assert_eq!(
                Some(CallErrorKind::Arity),
                result.err().map(|error| error.kind()),
                "count {count} is out of range",
            ),
        }
    }
}

#[test]
fn test_ellipsis_accepts_any_non_void() {
    let signature = Signature::function("collect", TypeMask::VOID)
        .add_float("x")
        .add_ellipsis()
        .build()
        .expect_blame("Valid signature.");

    let tail = [
        Value::from(true),
        Value::from(1i64),
        Value::from("s"),
        Value::null(),
        Value::Object(eggs(&STONE, 2)),
    ];

    for length in 0..=tail.len() {
        let mut arguments = vec![Value::from(0.5)];

        arguments.extend(tail[..length].iter().cloned());

        assert!(signature.check_arguments(&arguments).is_ok());
    }

    for position in 1..4 {
        let mut arguments = vec![Value::from(0.5), Value::from(1i64), Value::from(2i64)];

        arguments.insert(position, Value::Void);

        let error = signature
            .check_arguments(&arguments)
            .expect_err("void in the ellipsis tail");

        assert_eq!(Some(position + 1), error.position());
    }
}

#[test]
fn test_null_bypasses_singleton() {
    let signature = Signature::function("tally", TypeMask::VOID)
        .add_int_nullable("x")
        .build()
        .expect_blame("Valid signature.");

    let signature_singleton = Signature::function("tallyOne", TypeMask::VOID)
        .add("x", TypeMask::INT.nullable().singleton(), None, None)
        .build()
        .expect_blame("Valid signature.");

    assert!(signature.check_arguments(&[Value::null()]).is_ok());
    assert!(signature_singleton.check_arguments(&[Value::null()]).is_ok());
    assert!(signature_singleton
        .check_arguments(&[Value::from(1i64)])
        .is_ok());

    let error = signature_singleton
        .check_arguments(&[Value::Int(vec![1, 2])])
        .expect_err("multi-element integer");

    assert!(error
        .to_string()
        .contains("must be a singleton (size() == 1)"));
}

#[test]
fn test_object_subclass_arguments() {
    let signature = Signature::function("hatch", TypeMask::VOID)
        .add_object("egg", &EGG)
        .build()
        .expect_blame("Valid signature.");

    assert!(signature
        .check_arguments(&[Value::Object(eggs(&EGG, 2))])
        .is_ok());
    assert!(signature
        .check_arguments(&[Value::Object(eggs(&DUCK_EGG, 2))])
        .is_ok());
    assert!(signature
        .check_arguments(&[Value::Object(ObjectVector::empty())])
        .is_ok());

    let error = signature
        .check_arguments(&[Value::Object(eggs(&STONE, 1))])
        .expect_err("unrelated class");

    assert_eq!(
        "argument 1 (egg) cannot be object element type Stone for function hatch(); \
        expected object element type Egg",
        error.to_string(),
    );
}

#[test]
fn test_default_copies_are_independent() {
    let signature = Signature::function("label", TypeMask::VOID)
        .add_string_optional("names", Value::String(vec!["a".into(), "b".into()]))
        .build()
        .expect_blame("Valid signature.");

    let param = &signature.params()[0];

    let mut first = param.default_value().expect("optional parameter");
    let second = param.default_value().expect("optional parameter");

    if let Value::String(vector) = &mut first {
        vector.clear();
    }

    assert_eq!(Value::String(vec!["a".into(), "b".into()]), second);
    assert_eq!(
        Some(&Value::String(vec!["a".into(), "b".into()])),
        param.default(),
    );
}

#[test]
fn test_void_and_null_returns() {
    let registry = registry();

    assert_eq!(
        Value::Void,
        registry
            .call_function("silent", Vec::new())
            .expect("void function returned nothing"),
    );

    let error = registry
        .call_function("nothing", vec![Value::null()])
        .expect_err("void function returned NULL");

    assert_eq!(CallErrorKind::Return, error.kind());

    let void = Signature::function("v", TypeMask::VOID)
        .build()
        .expect_blame("Valid signature.");

    assert!(void.check_return(&Value::Void).is_ok());
    assert!(void.check_return(&Value::null()).is_err());

    for mask in [
        TypeMask::INT.singleton(),
        TypeMask::STRING,
        TypeMask::OBJECT.singleton(),
        TypeMask::ANY,
    ] {
        let signature = Signature::function("n", mask)
            .build()
            .expect_blame("Valid signature.");

        assert!(signature.check_return(&Value::null()).is_ok());
    }

    let result = registry
        .call_function("echo", vec![Value::null()])
        .expect("NULL passes a non-void return");

    assert_eq!(Value::null(), result);
}

#[test]
fn test_required_after_optional_is_rejected() {
    let strict = Signature::function("order", TypeMask::VOID)
        .add_int_optional("a", 1i64)
        .add_int("b")
        .build();

    assert!(strict.is_err());

    let tolerant = Signature::function("order", TypeMask::VOID)
        .fault_tolerant()
        .add_int_optional("a", 1i64)
        .add_int("b")
        .build()
        .expect_blame("Violations are skipped.");

    assert_eq!(0, tolerant.required_count());
    assert_eq!(1, tolerant.params().len());

    let arguments = tolerant
        .materialize_defaults(Vec::new())
        .expect("nothing is required");

    assert!(tolerant.check_arguments(&arguments).is_ok());
    assert!(tolerant
        .materialize_defaults(vec![Value::from(1i64); 2])
        .is_err());
}

#[test]
fn test_deprecated_callables_still_dispatch() {
    let registry = Registry::warm_up(RegistryConfig::new(), |registry| {
        registry.register_function(
            Signature::function("old", TypeMask::ANY)
                .add_any("x")
                .mark_deprecated(),
            Some(echo),
        )?;

        Ok(())
    })
    .expect_blame("Registry warm-up failed.");

    for _ in 0..3 {
        assert_eq!(
            Value::from(1i64),
            registry
                .call_function("old", vec![Value::from(1i64)])
                .expect("deprecated functions still work"),
        );
    }
}
