//! Delegated names: forwarding reads, writes, deletes and calls through the
//! object held by another attribute.

use antler_tests::prelude::*;
use pretty_assertions::assert_eq;
use std::rc::Rc;

fn spec() -> antler_registry::AttrSpecBuilder {
    AttrSpec::builder()
}

/// `A.b` forwards `attr` and `method` to a `B`, which forwards them to a `C`.
fn chain_registry() -> Registry {
    let mut registry = Registry::new();
    registry
        .define_class("C")
        .attr("attr", spec().default(10).build().unwrap())
        .method("method", |obj, _| Ok(Value::Object(obj.clone())))
        .done()
        .unwrap();
    registry
        .define_class("B")
        .attr(
            "c",
            spec().handles(Delegates::list(["attr", "method"])).build().unwrap(),
        )
        .done()
        .unwrap();
    registry
        .define_class("A")
        .attr(
            "b",
            spec().handles(Delegates::list(["attr", "method"])).build().unwrap(),
        )
        .done()
        .unwrap();
    registry
}

struct Chain {
    a: Rc<Instance>,
    b: Rc<Instance>,
    c: Rc<Instance>,
}

fn chain(registry: &Registry) -> Chain {
    let new = |name: &str| construct(registry.class(name).unwrap(), Keywords::new()).unwrap();
    let (a, b, c) = (new("A"), new("B"), new("C"));
    a.set("b", Value::from(b.clone())).unwrap();
    b.set("c", Value::from(c.clone())).unwrap();
    Chain { a, b, c }
}

#[test]
fn test_get_through_delegation() {
    init_tracing();
    let registry = chain_registry();
    let Chain { a, b, .. } = chain(&registry);

    assert_eq!(b.get("attr").unwrap(), Value::Int(10));
    assert_eq!(a.get("attr").unwrap(), Value::Int(10));
}

#[test]
fn test_set_through_delegation() {
    let registry = chain_registry();
    let Chain { a, b, c } = chain(&registry);

    b.set("attr", Value::Int(20)).unwrap();
    assert_eq!(b.get("attr").unwrap(), Value::Int(20));
    assert_eq!(c.get("attr").unwrap(), Value::Int(20));

    a.set("attr", Value::Int(30)).unwrap();
    assert_eq!(a.get("attr").unwrap(), Value::Int(30));
    assert_eq!(b.get("attr").unwrap(), Value::Int(30));
    assert_eq!(c.get("attr").unwrap(), Value::Int(30));
}

#[test]
fn test_delete_through_delegation() {
    let registry = chain_registry();
    let Chain { a, b, c } = chain(&registry);

    a.delete("attr").unwrap();

    assert!(!a.has("attr"));
    assert!(!b.has("attr"));
    assert_eq!(
        c.get("attr").unwrap_err(),
        ObjectError::not_set("C", "attr")
    );
}

#[test]
fn test_method_runs_on_delegatee() {
    let registry = chain_registry();
    let Chain { a, b, c } = chain(&registry);
    let c_value = Value::from(c);

    assert_eq!(b.call("method", &[]).unwrap(), c_value);
    assert_eq!(a.call("method", &[]).unwrap(), c_value);
}

#[test]
fn test_target_resolved_on_every_access() {
    // GIVEN a chain whose middle link is replaced
    let registry = chain_registry();
    let Chain { a, .. } = chain(&registry);
    let other = construct(registry.class("C").unwrap(), kwargs! { "attr" => 99 }).unwrap();
    let other_b = construct(registry.class("B").unwrap(), Keywords::new()).unwrap();
    other_b.set("c", Value::from(other.clone())).unwrap();

    // WHEN the owner's source attribute is reassigned
    a.set("b", Value::from(other_b)).unwrap();

    // THEN delegated access lands on the new target
    assert_eq!(a.get("attr").unwrap(), Value::Int(99));
    a.set("attr", Value::Int(100)).unwrap();
    assert_eq!(other.get("attr").unwrap(), Value::Int(100));
}

#[test]
fn test_unset_source_reports_not_set() {
    let registry = chain_registry();
    let a = construct(registry.class("A").unwrap(), Keywords::new()).unwrap();

    assert_eq!(
        a.get("attr").unwrap_err(),
        ObjectError::not_set("A", "b")
    );
    assert!(a.call("method", &[]).unwrap_err().is_attribute_error());
}

#[test]
fn test_non_object_source() {
    let mut registry = Registry::new();
    let class = registry
        .define_class("Outer")
        .attr(
            "inner",
            spec()
                .isa(TypeRef::List)
                .handles(Delegates::list(["append"]))
                .build()
                .unwrap(),
        )
        .done()
        .unwrap();

    let outer = construct(&class, Keywords::new()).unwrap();
    assert_error_matches(outer.call("append", &[Value::Int(1)]), "'inner' attribute is not set");

    outer.set("inner", Value::List(vec![])).unwrap();
    assert_error_matches(
        outer.call("append", &[Value::Int(1)]),
        "cannot delegate 'append' through 'inner': value of type List is not an object",
    );
}

mod forms {
    use super::*;
    use pretty_assertions::assert_eq;

    fn registry(handles: Delegates) -> (Registry, Class) {
        let mut registry = Registry::new();
        let uri = registry
            .define_class("Uri")
            .attr("host", AttrSpec::plain())
            .attr("path", AttrSpec::plain())
            .done()
            .unwrap();
        let default = construct(&uri, kwargs! { "host" => "example.com", "path" => "foo" }).unwrap();
        let website = registry
            .define_class("Website")
            .attr(
                "uri",
                spec()
                    .isa(TypeRef::named("Uri"))
                    .default(Value::from(default))
                    .handles(handles)
                    .build()
                    .unwrap(),
            )
            .done()
            .unwrap();
        (registry, website)
    }

    #[test]
    fn test_sequence_form() {
        let (_registry, website) = registry(Delegates::list(["host", "path"]));
        let site = construct(&website, Keywords::new()).unwrap();
        assert_eq!(site.get("host").unwrap(), Value::from("example.com"));
        assert_eq!(site.get("path").unwrap(), Value::from("foo"));
    }

    #[test]
    fn test_set_form() {
        let (_registry, website) = registry(Delegates::set(["path", "host", "host"]));
        let site = construct(&website, Keywords::new()).unwrap();
        assert_eq!(site.get("host").unwrap(), Value::from("example.com"));
        assert_eq!(site.get("path").unwrap(), Value::from("foo"));
    }

    #[test]
    fn test_mapping_form() {
        let (_registry, website) =
            registry(Delegates::map([("hostname", "host"), ("path", "path")]));
        let site = construct(&website, Keywords::new()).unwrap();

        assert_eq!(site.get("hostname").unwrap(), Value::from("example.com"));
        assert_eq!(site.get("path").unwrap(), Value::from("foo"));
        assert_error_matches(site.get("host"), "has no member 'host'");
    }
}

mod cycles {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cycle_exhausts_depth() {
        // GIVEN two objects that forward `x` to each other
        let mut registry = Registry::new();
        let class = registry
            .define_class("Loop")
            .attr(
                "peer",
                spec().handles(Delegates::list(["x"])).build().unwrap(),
            )
            .done()
            .unwrap();
        let first = construct(&class, Keywords::new()).unwrap();
        let second = construct(&class, Keywords::new()).unwrap();
        first.set("peer", Value::from(second.clone())).unwrap();
        second.set("peer", Value::from(first.clone())).unwrap();

        // WHEN the delegated name is read
        let err = first.get("x").unwrap_err();

        // THEN it fails with a resource error instead of overflowing the stack
        assert_eq!(err.kind(), ErrorKind::Resource);
        assert_error_matches(Err::<(), _>(err), r"delegation depth exceeded \(65 hops\)");

        // AND the counter is released afterwards
        let third = construct(&class, Keywords::new()).unwrap();
        assert!(third.get("x").unwrap_err().is_attribute_error());

        // break the reference cycle
        first.delete("peer").unwrap();
    }

    #[test]
    fn test_self_delegation_exhausts_depth() {
        let mut registry = Registry::new();
        let class = registry
            .define_class("Mirror")
            .attr(
                "me",
                spec().handles(Delegates::map([("x", "x")])).build().unwrap(),
            )
            .done()
            .unwrap();
        let mirror = construct(&class, Keywords::new()).unwrap();
        mirror.set("me", Value::from(mirror.clone())).unwrap();

        assert!(matches!(
            mirror.set("x", Value::Int(1)),
            Err(ObjectError::DelegationDepthExceeded { depth }) if depth == MAX_DELEGATION_DEPTH + 1
        ));
        mirror.delete("me").unwrap();
    }

    /// `links` objects each forwarding `value` to the next, ending at a leaf.
    fn linked_chain(registry: &Registry, links: usize) -> Rc<Instance> {
        let link = registry.class("Link").unwrap();
        let leaf = construct(registry.class("Leaf").unwrap(), kwargs! { "value" => 7 }).unwrap();
        let mut head = construct(link, kwargs! { "next" => Value::from(leaf) }).unwrap();
        for _ in 1..links {
            head = construct(link, kwargs! { "next" => Value::from(head) }).unwrap();
        }
        head
    }

    #[test]
    fn test_long_acyclic_chain_is_bounded() {
        // GIVEN chains of forwarding objects on either side of the limit
        let mut registry = Registry::new();
        registry
            .define_class("Leaf")
            .attr("value", AttrSpec::plain())
            .done()
            .unwrap();
        registry
            .define_class("Link")
            .attr(
                "next",
                spec().handles(Delegates::list(["value"])).build().unwrap(),
            )
            .done()
            .unwrap();

        // THEN a chain of exactly the limit resolves
        let within = linked_chain(&registry, MAX_DELEGATION_DEPTH);
        assert_eq!(within.get("value").unwrap(), Value::Int(7));

        // AND one more link fails although nothing loops
        let beyond = linked_chain(&registry, MAX_DELEGATION_DEPTH + 1);
        assert!(matches!(
            beyond.get("value"),
            Err(ObjectError::DelegationDepthExceeded { depth }) if depth == MAX_DELEGATION_DEPTH + 1
        ));
    }
}

#[test]
fn test_delegation_conflicts_rejected() {
    let mut registry = Registry::new();
    let result = registry
        .define_class("Clash")
        .attr("a", spec().handles(Delegates::list(["x"])).build().unwrap())
        .attr("b", spec().handles(Delegates::list(["x"])).build().unwrap())
        .done();

    assert_eq!(
        result.unwrap_err(),
        CompositionError::DelegationConflict {
            class: "Clash".into(),
            name: "x".into(),
        }
    );
}

#[test]
fn test_delegation_shadows_inherited_method() {
    let mut registry = Registry::new();
    registry
        .define_class("Target")
        .method("describe", |_, _| Ok(Value::from("target")))
        .done()
        .unwrap();
    registry
        .define_class("Base")
        .method("describe", |_, _| Ok(Value::from("base")))
        .done()
        .unwrap();
    let class = registry
        .define_class("Proxy")
        .extends("Base")
        .attr(
            "target",
            spec().handles(Delegates::list(["describe"])).build().unwrap(),
        )
        .done()
        .unwrap();

    let target = construct(registry.class("Target").unwrap(), Keywords::new()).unwrap();
    let proxy = construct(&class, kwargs! { "target" => Value::from(target) }).unwrap();

    assert!(matches!(class.member("describe"), Some(Member::Delegation(_))));
    assert_eq!(proxy.call("describe", &[]).unwrap(), Value::from("target"));
}

mod overrides {
    use super::*;
    use pretty_assertions::assert_eq;

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry
            .define_class("Target")
            .method("describe", |_, _| Ok(Value::from("target")))
            .done()
            .unwrap();
        registry
            .define_class("Proxy")
            .attr(
                "target",
                spec().handles(Delegates::list(["describe"])).build().unwrap(),
            )
            .done()
            .unwrap();
        registry
    }

    fn target(registry: &Registry) -> Value {
        Value::from(construct(registry.class("Target").unwrap(), Keywords::new()).unwrap())
    }

    #[test]
    fn test_subclass_method_replaces_inherited_delegation() {
        let mut registry = registry();
        let class = registry
            .define_class("Special")
            .extends("Proxy")
            .method("describe", |_, _| Ok(Value::from("special")))
            .done()
            .unwrap();

        let special = construct(&class, kwargs! { "target" => target(&registry) }).unwrap();

        assert!(matches!(class.member("describe"), Some(Member::Method(_))));
        assert_eq!(special.call("describe", &[]).unwrap(), Value::from("special"));
    }

    #[test]
    fn test_subclass_attribute_replaces_inherited_delegation() {
        let mut registry = registry();
        let class = registry
            .define_class("Special2")
            .extends("Proxy")
            .attr("describe", spec().default("own").build().unwrap())
            .done()
            .unwrap();

        let special = construct(&class, kwargs! { "target" => target(&registry) }).unwrap();

        assert!(matches!(class.member("describe"), Some(Member::Attribute(_))));
        assert_eq!(special.get("describe").unwrap(), Value::from("own"));
    }

    #[test]
    fn test_subclass_inherits_delegation() {
        // GIVEN a subclass redeclaring the source attribute without handles
        let mut registry = registry();
        let class = registry
            .define_class("Relabelled")
            .extends("Proxy")
            .attr("extra", AttrSpec::plain())
            .attr("target", spec().required().build().unwrap())
            .done()
            .unwrap();

        // THEN the inherited delegation still forwards through it
        let relabelled = construct(&class, kwargs! { "target" => target(&registry) }).unwrap();
        assert!(matches!(class.member("describe"), Some(Member::Delegation(_))));
        assert_eq!(relabelled.call("describe", &[]).unwrap(), Value::from("target"));
    }

    #[test]
    fn test_own_delegation_skips_role_method() {
        // GIVEN a role supplying a method the class delegates
        let mut registry = registry();
        registry
            .define_role("Describer")
            .method("describe", |_, _| Ok(Value::from("role")))
            .done()
            .unwrap();

        // WHEN the class consumes the role
        let class = registry
            .define_class("Wrapper")
            .with_role("Describer")
            .attr(
                "inner",
                spec().handles(Delegates::list(["describe"])).build().unwrap(),
            )
            .done()
            .unwrap();

        // THEN the delegation wins and the role is still consumed
        let wrapper = construct(&class, kwargs! { "inner" => target(&registry) }).unwrap();
        assert!(matches!(class.member("describe"), Some(Member::Delegation(_))));
        assert_eq!(wrapper.call("describe", &[]).unwrap(), Value::from("target"));
        assert!(class.does("Describer"));
    }

    #[test]
    fn test_own_delegation_still_conflicts_with_inherited_attribute() {
        let mut registry = registry();
        registry
            .define_class("Named")
            .attr("label", AttrSpec::plain())
            .done()
            .unwrap();
        let result = registry
            .define_class("Confused")
            .extends("Named")
            .attr(
                "inner",
                spec().handles(Delegates::list(["label"])).build().unwrap(),
            )
            .done();

        assert_eq!(
            result.unwrap_err(),
            CompositionError::DelegationConflict {
                class: "Confused".into(),
                name: "label".into(),
            }
        );
    }
}
