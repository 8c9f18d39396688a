//! Base class merging and ancestry.

use antler_tests::prelude::*;
use pretty_assertions::assert_eq;

fn spec() -> antler_registry::AttrSpecBuilder {
    AttrSpec::builder()
}

fn registry() -> Registry {
    let mut registry = Registry::new();
    registry
        .define_class("Animal")
        .attr("legs", spec().isa(TypeRef::Int).default(4).build().unwrap())
        .attr("sound", spec().default("...").build().unwrap())
        .method("speak", |obj, _| obj.get("sound"))
        .method("kind", |_, _| Ok(Value::from("animal")))
        .done()
        .unwrap();
    registry
        .define_class("Pet")
        .attr("owner", AttrSpec::plain())
        .method("kind", |_, _| Ok(Value::from("pet")))
        .done()
        .unwrap();
    registry
        .define_class("Dog")
        .extends("Animal")
        .extends("Pet")
        .attr("sound", spec().default("woof").build().unwrap())
        .done()
        .unwrap();
    registry
}

#[test]
fn test_attributes_merged_from_all_bases() {
    init_tracing();
    let registry = registry();
    let dog = registry.class("Dog").unwrap();

    let names: Vec<&str> = dog.attributes().iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["owner", "legs", "sound"]);

    let rex = construct(dog, kwargs! { "owner" => "Sam" }).unwrap();
    assert_eq!(rex.get("legs").unwrap(), Value::Int(4));
    assert_eq!(rex.get("owner").unwrap(), Value::from("Sam"));
}

#[test]
fn test_own_attribute_overrides_base() {
    let registry = registry();
    let rex = new_object(registry.class("Dog").unwrap(), Keywords::new()).unwrap();
    let generic = new_object(registry.class("Animal").unwrap(), Keywords::new()).unwrap();

    assert_eq!(rex.call("speak", &[]).unwrap(), Value::from("woof"));
    assert_eq!(generic.call("speak", &[]).unwrap(), Value::from("..."));
}

#[test]
fn test_earlier_base_wins() {
    let registry = registry();
    let rex = new_object(registry.class("Dog").unwrap(), Keywords::new()).unwrap();
    assert_eq!(rex.call("kind", &[]).unwrap(), Value::from("animal"));
}

#[test]
fn test_inherited_method_shared() {
    let registry = registry();
    let animal = registry.class("Animal").unwrap();
    let dog = registry.class("Dog").unwrap();

    assert!(dog
        .method("speak")
        .unwrap()
        .ptr_eq(animal.method("speak").unwrap()));
}

#[test]
fn test_ancestry() {
    let mut registry = registry();
    let puppy = registry.define_class("Puppy").extends("Dog").done().unwrap();
    let obj = new_object(&puppy, Keywords::new()).unwrap();

    for ancestor in ["Puppy", "Dog", "Animal", "Pet"] {
        assert!(obj.isa(ancestor), "Puppy should be a {}", ancestor);
        assert!(puppy.is_subclass_of(ancestor));
    }
    assert!(!obj.isa("Cat"));
    assert_eq!(obj.class_name(), "Puppy");
    assert_eq!(puppy.bases()[0].name(), "Dog");
}

#[test]
fn test_subclass_passes_base_type_check() {
    let mut registry = registry();
    let kennel = registry
        .define_class("Kennel")
        .attr("resident", spec().isa(TypeRef::named("Animal")).build().unwrap())
        .done()
        .unwrap();

    let rex = new_object(registry.class("Dog").unwrap(), Keywords::new()).unwrap();
    let sam = new_object(registry.class("Pet").unwrap(), Keywords::new()).unwrap();

    assert!(construct(&kennel, kwargs! { "resident" => Value::Object(rex) }).is_ok());
    assert_error_matches(
        construct(&kennel, kwargs! { "resident" => Value::Object(sam) }),
        "'resident' attribute must be a Animal, got Pet",
    );
}

#[test]
fn test_object_values_compare_by_identity() {
    let registry = registry();
    let dog = registry.class("Dog").unwrap();
    let rex = new_object(dog, Keywords::new()).unwrap();
    let fido = new_object(dog, Keywords::new()).unwrap();

    assert_eq!(Value::Object(rex.clone()), Value::Object(rex.clone()));
    assert_ne!(Value::Object(rex), Value::Object(fido));
}

#[test]
fn test_unknown_base() {
    let mut registry = registry();
    assert_eq!(
        registry.define_class("Cat").extends("Feline").done().unwrap_err(),
        CompositionError::UnknownBase {
            class: "Cat".into(),
            base: "Feline".into(),
        }
    );
    assert_eq!(registry.class_count(), 3);
}

#[test]
fn test_self_typed_attribute() {
    // GIVEN a class restricting an attribute to its own type
    let mut registry = Registry::new();
    let node = registry
        .define_class("Node")
        .attr("next", spec().isa(TypeRef::named("Node")).build().unwrap())
        .done()
        .unwrap();

    // THEN linking two instances works
    let tail = new_object(&node, Keywords::new()).unwrap();
    let head = construct(&node, kwargs! { "next" => Value::Object(tail.clone()) }).unwrap();
    assert_eq!(head.get("next").unwrap(), Value::Object(tail));
}
