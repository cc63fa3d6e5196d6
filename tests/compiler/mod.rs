// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use anyhow::Result;
use appstate_config::builders::*;
use appstate_config::*;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}

fn record<const N: usize>(fields: [(&str, Spec); N]) -> Spec {
    Spec::record(fields)
}

fn same_node(a: &StateNode, b: &StateNode) -> bool {
    a.ptr_eq(b)
}

#[test]
fn compiling_a_state_node_returns_it() -> Result<()> {
    let node = config(record([("a", Spec::from(1))]))?;
    let again = config(node.clone())?;
    assert!(same_node(&node, &again));

    // Nested nodes are kept by identity as well.
    let tree = config(record([("inner", Spec::from(&node))]))?;
    assert!(same_node(&tree.find("inner")?, &node));
    Ok(())
}

#[test]
fn required_without_default_fails_fast() {
    for pending in [string().required(), number().required(), array().required()] {
        let pending = pending.expect("primitive types have a required form");
        assert_eq!(
            config(pending),
            Err(CompileError::MissingDefault { path: "/".into() })
        );
    }
}

#[test]
fn two_phase_validation_wiring() -> Result<()> {
    init_tracing();
    let a = string().required().expect("required string").defaults_to("x");
    let root = config(record([
        ("a", Spec::from(a)),
        ("chk", Spec::from(validates("a"))),
    ]))?;

    assert_eq!(root.find("a")?.value(), Value::from("x"));
    let chk = root.find("chk")?;
    let target = chk
        .as_validation()
        .and_then(ValidationState::target)
        .expect("chk validates a");
    assert!(same_node(&target, &root.find("a")?));
    Ok(())
}

#[test]
fn array_unification() -> Result<()> {
    let compiler = Compiler::new();
    let enum_value = enumeration(["A", "B", "C"])?
        .required()
        .expect("enums have a required form")
        .defaults_to("A");

    let unified = compiler.resolve_shape_type(&Spec::sequence([
        enum_value.clone(),
        enum_value.clone(),
    ]))?;
    let TypeKind::ArrayOf(element) = unified.kind() else {
        panic!("expected an array type, found {unified}");
    };
    assert_eq!(element.as_ref(), enum_value.descriptor());

    let mixed = compiler.resolve_shape_type(&Spec::sequence([
        Spec::from(1),
        Spec::from("s"),
        Spec::from(Value::new_object()),
    ]))?;
    let TypeKind::ArrayOf(element) = mixed.kind() else {
        panic!("expected an array type, found {mixed}");
    };
    let TypeKind::OneOf(candidates) = element.kind() else {
        panic!("expected a union, found {element}");
    };
    let expected = [
        PrimitiveKind::Number,
        PrimitiveKind::String,
        PrimitiveKind::Object,
    ]
    .map(|kind| TypeDescriptor::primitive(kind).required());
    assert_eq!(candidates.as_slice(), expected.as_slice());
    Ok(())
}

#[test]
fn structural_record_type() -> Result<()> {
    let t = Compiler::new().resolve_shape_type(&Spec::from(Value::from_json_str(
        r#"{"x": 1, "y": "s"}"#,
    )?))?;
    let TypeKind::ExactShapeOf(fields) = t.kind() else {
        panic!("expected an exact shape, found {t}");
    };
    let names: Vec<&str> = fields.keys().map(|k| k.as_ref()).collect();
    assert_eq!(names, ["x", "y"]);
    assert_eq!(
        fields["x"],
        TypeDescriptor::primitive(PrimitiveKind::Number).required()
    );
    assert_eq!(
        fields["y"],
        TypeDescriptor::primitive(PrimitiveKind::String).required()
    );
    Ok(())
}

fn end_to_end_spec() -> Spec {
    record([
        ("withArray", Spec::sequence([1, 2, 3])),
        ("withEmpty", record([])),
        (
            "nested",
            record([
                ("s", Spec::from(string().defaults_to("n"))),
                ("n", Spec::from(Value::Null)),
            ]),
        ),
        ("check", Spec::from(validates("withArray"))),
    ])
}

#[test]
fn end_to_end_structural() -> Result<()> {
    init_tracing();
    let mut compiler = Compiler::new();
    compiler.set_literal_containers(LiteralContainers::Structural);
    let root = compiler.compile(end_to_end_spec())?;

    let with_array = root.find("withArray")?;
    let items = with_array.as_list().expect("withArray is a list");
    assert_eq!(items.len(), 3);
    for (idx, expected) in [1, 2, 3].into_iter().enumerate() {
        let item = items.get(idx).expect("three items");
        assert!(item.as_scalar().is_some());
        assert_eq!(item.value(), Value::from(expected));
    }

    let with_empty = root.find("withEmpty")?;
    assert!(with_empty.as_composite().is_some_and(|c| c.is_empty()));

    assert_eq!(root.find("nested/s")?.value(), Value::from("n"));
    let n = root.find("nested/n")?;
    let scalar = n.as_scalar().expect("nested/n is a scalar");
    assert_eq!(scalar.descriptor(), &TypeDescriptor::primitive(PrimitiveKind::Any));
    assert_eq!(scalar.default_value(), None);
    assert_eq!(scalar.value(), Value::Null);

    let check = root.find("check")?;
    let target = check
        .as_validation()
        .and_then(ValidationState::target)
        .expect("check validates withArray");
    assert!(same_node(&target, &with_array));
    Ok(())
}

#[test]
fn end_to_end_opaque() -> Result<()> {
    let root = config(end_to_end_spec())?;

    let with_array = root.find("withArray")?;
    let scalar = with_array.as_scalar().expect("withArray is a scalar");
    assert_eq!(
        scalar.descriptor(),
        &TypeDescriptor::primitive(PrimitiveKind::Array).required()
    );
    assert_eq!(scalar.value(), Value::from_json_str("[1, 2, 3]")?);
    assert_eq!(root.find("withEmpty")?.value(), Value::new_object());
    assert!(root.find("withEmpty")?.as_scalar().is_some());

    // The snapshot does not depend on the container policy.
    let mut compiler = Compiler::new();
    compiler.set_literal_containers(LiteralContainers::Structural);
    assert_eq!(root.value(), compiler.compile(end_to_end_spec())?.value());
    Ok(())
}

#[test]
fn missing_validation_path_yields_no_node() {
    let r = config(record([
        ("a", Spec::from(1)),
        ("chk", Spec::from(validates("missing/field"))),
    ]));
    assert_eq!(
        r,
        Err(CompileError::PathResolution {
            path: "missing/field".into(),
            segment: "missing".into()
        })
    );
}

#[test]
fn configuring_app_state() -> Result<()> {
    init_tracing();
    let existing = StateNode::composite();
    let instance = Value::new_instance("TestClass", Fields::new());
    let enum_value = enumeration(["A", "B", "C"])?
        .required()
        .expect("enums have a required form")
        .defaults_to("B");

    let typed = shape(record([
        ("withPrimitive", Spec::from(string())),
        ("withPrimitiveDefault", Spec::from(string().defaults_to("default"))),
        (
            "withRequiredPrimitive",
            Spec::from(
                string()
                    .required()
                    .expect("required string")
                    .defaults_to("required default"),
            ),
        ),
        ("withDefaultValue", Spec::from("another default")),
        ("withShape", Spec::from(enum_value.clone())),
        (
            "withEnumInArray",
            Spec::from(
                array_of(enum_value.clone())?
                    .required()
                    .expect("arrays have a required form")
                    .defaults_to(vec![Value::from("A")]),
            ),
        ),
    ]));

    let states = config(record([
        ("withType", Spec::from(typed)),
        ("withEnum", Spec::from(enum_value)),
        ("withArray", Spec::sequence([1, 2, 3])),
        (
            "withArrayOfDifferentTypes",
            Spec::from(Value::from_json_str(r#"[1, "string", {}]"#)?),
        ),
        ("withClassObject", Spec::from(instance.clone())),
        ("withEmptyObject", record([])),
        (
            "nested",
            record([
                ("nestedString", Spec::from(string().defaults_to("nested"))),
                ("withNull", Spec::from(Value::Null)),
            ]),
        ),
        ("withAppState", Spec::from(&existing)),
        ("validation", Spec::from(validates("withEnum"))),
    ]))?;

    assert_eq!(states.find("withEnum")?.value(), Value::from("B"));
    assert_eq!(
        states.find("withArray")?.value(),
        Value::from_json_str("[1, 2, 3]")?
    );
    assert_eq!(
        states.find("withArrayOfDifferentTypes")?.value(),
        Value::from_json_str(r#"[1, "string", {}]"#)?
    );
    assert_eq!(states.find("withClassObject")?.value(), instance);
    assert_eq!(states.find("withEmptyObject")?.value(), Value::new_object());
    assert_eq!(
        states.find("nested/nestedString")?.value(),
        Value::from("nested")
    );
    assert!(states.find("nested/withNull")?.value().is_null());
    assert!(same_node(&states.find("withAppState")?, &existing));
    assert_eq!(
        states.find("withType")?.value(),
        Value::from_json_str(
            r#"{
                "withPrimitive": null,
                "withPrimitiveDefault": "default",
                "withRequiredPrimitive": "required default",
                "withDefaultValue": "another default",
                "withShape": "B",
                "withEnumInArray": ["A"]
            }"#
        )?
    );
    Ok(())
}

#[test]
fn disconnect_clears_passwords() -> Result<()> {
    let root = config(record([
        ("user", Spec::from(string().defaults_to("ada"))),
        ("password", Spec::from(password())),
    ]))?;
    root.set("user", "grace")?;
    root.set("password", "hunter2")?;

    root.disconnect();
    assert_eq!(root.find("user")?.value(), Value::from("grace"));
    assert!(root.find("password")?.value().is_null());

    root.reset();
    assert_eq!(root.find("user")?.value(), Value::from("ada"));
    Ok(())
}

#[test]
fn configuration_from_yaml() -> Result<()> {
    let spec = Value::from_yaml_str(
        r##"
theme:
  dark: false
  accent: "#336699"
recent: []
"##,
    )?;
    let options = CompileOptions::from_yaml_str("literalContainers: structural")?;
    let root = Compiler::with_options(options).compile(spec.clone())?;
    assert_eq!(root.value(), spec);
    assert!(root.find("recent")?.as_list().is_some_and(|l| l.is_empty()));
    assert_eq!(
        root.find("theme/accent")?.as_scalar().map(|s| s.descriptor().to_string()),
        Some("required string".to_string())
    );
    Ok(())
}

#[test]
fn compound_builders_follow_compiler_inference() -> Result<()> {
    let element = Value::from_json_str(r#"{"$$typeof": "element", "type": "div"}"#)?;
    let mut compiler = Compiler::new();
    compiler.set_element_predicate(|v: &Value| !v["$$typeof"].is_null());

    let literal = Spec::from(Value::from(vec![element.clone()]));
    let resolved = compiler.resolve_shape_type(&literal)?;
    assert_eq!(resolved.to_string(), "required arrayOf(required element)");

    let items = compiler.array_of(element.clone())?;
    assert_eq!(items.descriptor(), &resolved.optional());
    assert_eq!(
        compiler.one_of([Spec::from(element.clone()), Spec::from(string())])?
            .descriptor()
            .to_string(),
        "oneOf(required element | string)"
    );

    let root = compiler.compile(record([(
        "children",
        Spec::from(items.defaults_to(Value::from(vec![element]))),
    )]))?;
    assert_eq!(
        root.find("children")?.as_scalar().map(|s| s.descriptor().clone()),
        Some(resolved.optional())
    );
    Ok(())
}
