// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::collections::BTreeMap;

use anyhow::{anyhow, bail, Result};
use appstate_config::*;
use serde::{Deserialize, Serialize};
use test_generator::test_resources;

// Process a literal specified in yaml to interpret special encodings.
fn process_literal(v: &Value) -> Result<Value> {
    match v {
        // Host values encoded as single-key objects:
        // symbol! : name
        // function! : name
        Value::Object(fields) if fields.len() == 1 && v["symbol!"].as_string().is_ok() => {
            Ok(Value::symbol(v["symbol!"].as_string()?))
        }
        Value::Object(fields) if fields.len() == 1 && v["function!"].as_string().is_ok() => {
            Ok(Value::function(v["function!"].as_string()?))
        }

        // instance! :
        //   class: Point
        //   fields: { x: 1 }
        Value::Object(fields) if fields.len() == 1 && !v["instance!"].is_null() => {
            let instance = &v["instance!"];
            let mut fields = Fields::new();
            if let Value::Object(f) = &instance["fields"] {
                for (key, value) in f.iter() {
                    fields.insert(key.clone(), process_literal(value)?);
                }
            }
            Ok(Value::new_instance(instance["class"].as_string()?, fields))
        }

        Value::Array(items) => Ok(Value::from(
            items
                .iter()
                .map(process_literal)
                .collect::<Result<Vec<_>>>()?,
        )),

        Value::Object(fields) => {
            let mut object = Fields::new();
            for (key, value) in fields.iter() {
                object.insert(key.clone(), process_literal(value)?);
            }
            Ok(Value::from(object))
        }

        _ => Ok(v.clone()),
    }
}

fn has_declarations(v: &Value) -> bool {
    match v {
        Value::Array(items) => items.iter().any(has_declarations),
        Value::Object(fields) => fields
            .iter()
            .any(|(key, value)| key.ends_with('!') || has_declarations(value)),
        _ => false,
    }
}

// Process a configuration spec specified in yaml.
//
// Declarations are objects carrying a `type!` key:
//   type!: string
//   required: true
//   default: "x"
//   options: { maxLength: 3 }
// Structural builders take their argument as `of`, `values`, `class` or
// `candidates`. A validation is encoded as `validates!: path`.
fn process_spec(v: &Value) -> Result<Spec> {
    if !has_declarations(v) || !v["symbol!"].is_null() || !v["function!"].is_null() {
        return Ok(Spec::from(process_literal(v)?));
    }
    match v {
        Value::Object(_) if !v["instance!"].is_null() => Ok(Spec::from(process_literal(v)?)),
        Value::Object(fields) if fields.len() == 1 && !v["validates!"].is_null() => {
            Ok(Spec::from(validates(v["validates!"].as_string()?)))
        }
        Value::Object(_) if !v["type!"].is_null() => process_declaration(v),
        Value::Array(items) => Ok(Spec::Sequence(
            items.iter().map(process_spec).collect::<Result<Vec<_>>>()?,
        )),
        Value::Object(fields) => {
            let mut record = SpecFields::new();
            for (key, value) in fields.iter() {
                record.insert(key.clone(), process_spec(value)?);
            }
            Ok(Spec::Record(record))
        }
        _ => Ok(Spec::from(v.clone())),
    }
}

fn process_declaration(v: &Value) -> Result<Spec> {
    let name = v["type!"].as_string()?;
    let required = v["required"] == Value::Bool(true);
    let mut c = match &**name {
        "shape" => {
            let s = shape(process_spec(&v["of"])?);
            return Ok(Spec::from(if required { s.required() } else { s }));
        }
        "enum" => builders::enumeration(v["values"].as_array()?.iter().cloned())?,
        "instanceOf" => builders::instance_of(v["class"].as_string()?)?,
        "arrayOf" => builders::array_of(process_spec(&v["of"])?)?,
        "objectOf" => builders::object_of(process_spec(&v["of"])?)?,
        "shapeOf" => builders::shape_of(process_spec(&v["of"])?)?,
        "exactShapeOf" => builders::exact_shape_of(process_spec(&v["of"])?)?,
        "oneOf" => builders::one_of(
            v["candidates"]
                .as_array()?
                .iter()
                .map(process_spec)
                .collect::<Result<Vec<_>>>()?,
        )?,
        other => builders::lookup(other).ok_or_else(|| anyhow!("unknown type `{other}`"))?,
    };

    if let Value::Object(options) = &v["options"] {
        let options: Options = options
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        c = c.with_options(&options)?;
    }

    let default = match &v["default"] {
        Value::Null => None,
        d => Some(process_literal(d)?),
    };
    Ok(match (required, default) {
        (true, default) => {
            let Some(r) = c.required() else {
                bail!("type `{name}` has no required form");
            };
            match default {
                Some(d) => Spec::from(r.defaults_to(d)),
                None => Spec::from(r),
            }
        }
        (false, Some(d)) => Spec::from(c.defaults_to(d)),
        (false, None) => Spec::from(c),
    })
}

#[derive(Serialize, Deserialize, PartialEq, Debug)]
#[serde(deny_unknown_fields)]
struct TestCase {
    note: String,
    options: Option<Value>,
    spec: Value,
    resolve: Option<bool>,
    want_value: Option<Value>,
    want_kinds: Option<BTreeMap<String, String>>,
    want_types: Option<BTreeMap<String, String>>,
    want_validates: Option<BTreeMap<String, String>>,
    want_type: Option<String>,
    want_error: Option<String>,
    skip: Option<bool>,
}

#[derive(Serialize, Deserialize, PartialEq, Debug)]
struct YamlTest {
    cases: Vec<TestCase>,
}

fn compiler_for(case: &TestCase) -> Result<Compiler> {
    let options = match &case.options {
        Some(options) => CompileOptions::from_json_str(&options.to_json_str()?)?,
        None => CompileOptions::default(),
    };
    Ok(Compiler::with_options(options))
}

fn check_error<T: std::fmt::Debug>(
    r: core::result::Result<T, CompileError>,
    expected: &str,
) -> Result<()> {
    match r {
        Ok(v) => bail!("expected error `{expected}`, got {v:?}"),
        Err(actual) if actual.to_string().contains(expected) => Ok(()),
        Err(actual) => bail!("`{actual}` does not contain `{expected}`"),
    }
}

fn check_tree(case: &TestCase, root: &StateNode) -> Result<()> {
    if let Some(expected) = &case.want_value {
        let expected = process_literal(expected)?;
        let actual = root.value();
        if actual != expected {
            bail!("value mismatch\ncomputed: {actual}\nexpected: {expected}");
        }
    }

    for (path, kind) in case.want_kinds.iter().flatten() {
        let node = root.find(path)?;
        if node.kind_name() != kind.as_str() {
            bail!("`{path}`: expected a {kind} node, found a {}", node.kind_name());
        }
    }

    for (path, expected) in case.want_types.iter().flatten() {
        let node = root.find(path)?;
        let Some(scalar) = node.as_scalar() else {
            bail!("`{path}` is not a scalar");
        };
        let actual = scalar.descriptor().to_string();
        if &actual != expected {
            bail!("`{path}`: expected type `{expected}`, found `{actual}`");
        }
    }

    for (path, target) in case.want_validates.iter().flatten() {
        let node = root.find(path)?;
        let Some(check) = node.as_validation() else {
            bail!("`{path}` is not a validation node");
        };
        match check.target() {
            Some(t) if t.ptr_eq(&root.find(target)?) => {}
            _ => bail!("`{path}` does not validate `{target}`"),
        }
    }
    Ok(())
}

fn yaml_test_impl(file: &str) -> Result<()> {
    let yaml_str = std::fs::read_to_string(file)?;
    let test: YamlTest = serde_yaml::from_str(&yaml_str)?;

    std::eprintln!("running {file}");

    for case in test.cases {
        std::print!("case {} ", case.note);
        if case.skip == Some(true) {
            std::println!("skipped");
            continue;
        }

        let spec = match (process_spec(&case.spec), &case.want_error) {
            (Ok(spec), _) => spec,
            // Builder errors surface while the spec is assembled.
            (Err(actual), Some(expected)) if actual.to_string().contains(expected.as_str()) => {
                std::println!("passed");
                continue;
            }
            (Err(actual), _) => return Err(actual),
        };
        let compiler = compiler_for(&case)?;

        if case.resolve == Some(true) {
            let r = compiler.resolve_shape_type(&spec);
            match (&case.want_type, &case.want_error) {
                (Some(expected), None) => {
                    let actual = r?.to_string();
                    if &actual != expected {
                        bail!("expected type `{expected}`, found `{actual}`");
                    }
                }
                (None, Some(expected)) => check_error(r, expected)?,
                _ => panic!("either want_type or want_error must be specified in test case."),
            }
        } else {
            let r = compiler.compile(spec);
            match &case.want_error {
                Some(expected) => check_error(r, expected)?,
                None => check_tree(&case, &r?)?,
            }
        }

        std::println!("passed");
    }

    Ok(())
}

fn yaml_test(file: &str) -> Result<()> {
    match yaml_test_impl(file) {
        Ok(_) => Ok(()),
        Err(e) => {
            // If Err is returned, it doesn't always get printed by cargo test.
            // Therefore, panic with the error.
            panic!("{e}");
        }
    }
}

#[test_resources("tests/cases/*.yaml")]
fn run(path: &str) {
    yaml_test(path).unwrap()
}
