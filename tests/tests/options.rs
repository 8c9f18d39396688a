//! Classes declared from JSON attribute options.

use antler_tests::prelude::*;
use pretty_assertions::assert_eq;
use serde_json::{json, Value as Json};

/// Define `name` with one attribute per key of `attributes`.
fn define(registry: &mut Registry, name: &str, attributes: Json) -> Result<Class, SchemaError> {
    let mut builder = registry.define_class(name);
    if let Json::Object(fields) = attributes {
        for (attr, options) in fields {
            builder = builder.attr(attr, AttrSpec::from_options(options)?);
        }
    }
    Ok(builder.done()?)
}

#[test]
fn test_class_from_options() {
    init_tracing();
    let mut registry = Registry::new();
    let class = define(
        &mut registry,
        "Config",
        json!({
            "host": { "type": "str", "required": true },
            "port": { "type": "int", "default": 8080 },
            "tags": { "type": "list", "lazy": true },
            "secret": { "mode": "ro", "init_arg": "password" },
        }),
    )
    .unwrap();

    let config = construct(&class, kwargs! { "host" => "localhost", "password" => "hunter2" }).unwrap();

    assert_eq!(config.get("host").unwrap(), Value::from("localhost"));
    assert_eq!(config.get("port").unwrap(), Value::Int(8080));
    assert_eq!(config.get("secret").unwrap(), Value::from("hunter2"));
    assert_error_matches(config.set("secret", Value::from("x")), "read-only");
    assert_error_matches(
        config.set("port", Value::from("eighty")),
        "'port' attribute must be a Int, got String",
    );
    assert_eq!(
        construct(&class, Keywords::new()).unwrap_err(),
        ObjectError::required_missing("Config", "host")
    );
}

#[test]
fn test_null_default_is_a_default() {
    let mut registry = Registry::new();
    let class = define(&mut registry, "Nullable", json!({ "x": { "default": null } })).unwrap();

    let obj = construct(&class, Keywords::new()).unwrap();
    assert!(obj.has("x"));
    assert_eq!(obj.get("x").unwrap(), Value::Null);
}

#[test]
fn test_null_init_arg_disables_keyword() {
    let mut registry = Registry::new();
    let class = define(
        &mut registry,
        "Hidden",
        json!({ "x": { "init_arg": null, "default": 1 } }),
    )
    .unwrap();

    assert_eq!(class.init_args().count(), 0);
    assert_error_matches(
        construct(&class, kwargs! { "x" => 2 }),
        "unexpected keyword argument 'x'",
    );
}

#[test]
fn test_handles_from_options() {
    let mut registry = Registry::new();
    define(&mut registry, "Engine", json!({ "power": { "default": 300 } })).unwrap();
    let car = define(
        &mut registry,
        "Car",
        json!({ "engine": { "type": "Engine", "handles": { "horsepower": "power" } } }),
    )
    .unwrap();

    let engine = new_object(registry.class("Engine").unwrap(), Keywords::new()).unwrap();
    let car = construct(&car, kwargs! { "engine" => Value::Object(engine) }).unwrap();
    assert_eq!(car.get("horsepower").unwrap(), Value::Int(300));
}

mod rejected {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_unknown_option() {
        let mut registry = Registry::new();
        let err = define(&mut registry, "Bad", json!({ "x": { "isa": "int" } })).unwrap_err();

        assert_eq!(
            err,
            SchemaError::Declaration(DeclarationError::UnknownOption("isa".into()))
        );
        assert!(!registry.is_defined("Bad"));
    }

    #[test]
    fn test_invalid_mode() {
        assert_eq!(
            AttrSpec::from_json(r#"{ "mode": "wo" }"#).unwrap_err(),
            DeclarationError::InvalidMode("wo".into())
        );
    }

    #[test]
    fn test_list_default_needs_producer() {
        assert!(matches!(
            AttrSpec::from_json(r#"{ "default": [] }"#),
            Err(DeclarationError::UnhashableDefault(_))
        ));
    }

    #[test]
    fn test_default_checked_against_type() {
        assert_error_matches(
            AttrSpec::from_json(r#"{ "type": "int", "default": "ten" }"#),
            "attribute default has bad type: expected Int, got String",
        );
    }

    #[test]
    fn test_unknown_type_fails_composition() {
        let mut registry = Registry::new();
        let err = define(&mut registry, "Typo", json!({ "x": { "type": "Strnig" } })).unwrap_err();

        assert!(matches!(
            err,
            SchemaError::Composition(CompositionError::UnknownType { ref type_name, .. })
                if type_name == "Strnig"
        ));
    }
}
