//! The class compiler.
//!
//! Turns a class body (own attributes, methods, modifiers, hooks, listed
//! bases and roles) into a sealed [`ClassDef`]. Runs once per class, in a
//! fixed order:
//!
//! 1. resolve consumed roles
//! 2. inject role attributes and methods for names the body does not define
//! 3. merge base tables (earlier bases win), then overlay the body
//! 4. finalize attributes: builders must name methods, named types must exist
//! 5. install delegations
//! 6. freeze the constructor keyword table
//! 7. apply method modifiers
//! 8. check role requirements
//!
//! Any failure aborts the whole definition.

use crate::attr::AttrSpec;
use crate::class::{Attribute, BuildArgsFn, BuildFn, Class, ClassDef, Delegation, Member};
use crate::error::{CompositionError, CompositionResult};
use crate::modifier::{Method, Modifier};
use crate::registry::Registry;
use crate::role::Role;
use antler_core::ClassId;
use indexmap::IndexMap;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::rc::Rc;

/// Everything declared directly in a class definition.
#[derive(Default)]
pub(crate) struct ClassBody {
    pub name: String,
    pub bases: Vec<String>,
    pub roles: Vec<String>,
    pub attributes: IndexMap<String, Rc<AttrSpec>>,
    pub methods: IndexMap<String, Method>,
    pub modifiers: Vec<Modifier>,
    pub build_args: Option<Rc<BuildArgsFn>>,
    pub build: Option<Rc<BuildFn>>,
}

pub(crate) fn compile(
    registry: &Registry,
    id: ClassId,
    body: ClassBody,
) -> CompositionResult<ClassDef> {
    let ClassBody {
        name,
        bases: base_names,
        roles: role_names,
        mut attributes,
        mut methods,
        modifiers,
        build_args,
        build,
    } = body;

    let roles = resolve_roles(registry, &name, &role_names)?;
    inject_roles(&roles, &mut attributes, &mut methods);
    let body = Body {
        attributes: attributes.clone(),
        methods: methods.keys().cloned().collect(),
    };

    let bases = resolve_bases(registry, &name, &base_names)?;
    let Merged {
        attributes: merged_attrs,
        methods: mut merged_methods,
        delegations: inherited,
    } = merge(&bases, attributes, methods);

    let layout = finalize_attributes(registry, &name, merged_attrs, &merged_methods)?;
    let delegations = install_delegations(&name, &layout, &body, inherited, &mut merged_methods)?;
    let init_args = freeze_init_args(&name, &layout)?;
    apply_modifiers(&name, modifiers, &mut merged_methods)?;
    check_requirements(&name, &roles, &merged_methods)?;

    let mut members: HashMap<String, Member> = HashMap::new();
    for attr in &layout {
        members.insert(attr.name.clone(), Member::Attribute(attr.index));
    }
    for (external, delegation) in delegations {
        members.insert(external, Member::Delegation(delegation));
    }
    for (method_name, method) in merged_methods {
        members.insert(method_name, Member::Method(method));
    }

    let mut ancestors: HashSet<String> = HashSet::new();
    ancestors.insert(name.clone());
    let mut role_set: BTreeSet<String> = roles.iter().map(|r| r.name().to_string()).collect();
    for base in &bases {
        ancestors.extend(base.ancestors.iter().cloned());
        role_set.extend(base.roles.iter().cloned());
    }

    let build_args = build_args.or_else(|| bases.iter().find_map(|b| b.build_args.clone()));
    let build = build.or_else(|| bases.iter().find_map(|b| b.build.clone()));

    tracing::debug!(
        class = %name,
        id = %id,
        attributes = layout.len(),
        members = members.len(),
        roles = role_set.len(),
        "class sealed"
    );

    Ok(ClassDef {
        id,
        name,
        bases,
        attributes: layout,
        members,
        init_args,
        ancestors,
        roles: role_set,
        build_args,
        build,
    })
}

fn resolve_roles(registry: &Registry, class: &str, names: &[String]) -> CompositionResult<Vec<Role>> {
    names
        .iter()
        .map(|role| match registry.role(role) {
            Some(found) => Ok(found.clone()),
            None if registry.class(role).is_some() => Err(CompositionError::NotARole {
                class: class.to_string(),
                name: role.clone(),
            }),
            None => Err(CompositionError::UnknownRole {
                class: class.to_string(),
                role: role.clone(),
            }),
        })
        .collect()
}

/// Role members fill in names the body leaves free. A name delegated by a
/// body attribute is not free. The first listed role supplying a name wins.
fn inject_roles(
    roles: &[Role],
    attributes: &mut IndexMap<String, Rc<AttrSpec>>,
    methods: &mut IndexMap<String, Method>,
) {
    let mut delegated: HashSet<String> = attributes
        .values()
        .flat_map(|spec| spec.delegates().pairs().map(|(external, _)| external.to_string()))
        .collect();

    for role in roles {
        for (name, spec) in &role.attributes {
            if !attributes.contains_key(name)
                && !methods.contains_key(name)
                && !delegated.contains(name)
            {
                tracing::trace!(role = %role.name(), attr = %name, "injecting role attribute");
                delegated.extend(spec.delegates().pairs().map(|(external, _)| external.to_string()));
                attributes.insert(name.clone(), spec.clone());
            }
        }
        for (name, method) in &role.methods {
            if !attributes.contains_key(name)
                && !methods.contains_key(name)
                && !delegated.contains(name)
            {
                tracing::trace!(role = %role.name(), method = %name, "injecting role method");
                methods.insert(name.clone(), method.clone());
            }
        }
    }
}

fn resolve_bases(registry: &Registry, class: &str, names: &[String]) -> CompositionResult<Vec<Class>> {
    names
        .iter()
        .map(|base| match registry.class(base) {
            Some(found) => Ok(found.clone()),
            None if registry.role(base).is_some() => Err(CompositionError::NotAClass {
                class: class.to_string(),
                name: base.clone(),
            }),
            None => Err(CompositionError::UnknownBase {
                class: class.to_string(),
                base: base.clone(),
            }),
        })
        .collect()
}

type AttrTable = IndexMap<String, Rc<AttrSpec>>;
type MethodTable = IndexMap<String, Method>;

/// An inherited delegated name, keyed by its source attribute's name. The
/// slot index is resolved again against the new layout.
#[derive(Debug, Clone)]
struct InheritedDelegation {
    source_name: String,
    target: String,
}

/// Names declared by the class body itself, after role injection.
struct Body {
    attributes: IndexMap<String, Rc<AttrSpec>>,
    methods: HashSet<String>,
}

struct Merged {
    attributes: AttrTable,
    methods: MethodTable,
    delegations: IndexMap<String, InheritedDelegation>,
}

/// Bases are laid down last to first so earlier bases overwrite later ones;
/// the body goes on top. A name is an attribute, a method or a delegation,
/// never more than one.
fn merge(bases: &[Class], own_attrs: AttrTable, own_methods: MethodTable) -> Merged {
    let mut attrs = AttrTable::new();
    let mut methods = MethodTable::new();
    let mut delegations: IndexMap<String, InheritedDelegation> = IndexMap::new();

    for base in bases.iter().rev() {
        for attr in base.attributes() {
            methods.shift_remove(&attr.name);
            delegations.shift_remove(&attr.name);
            attrs.insert(attr.name.clone(), attr.spec.clone());
        }
        for (name, member) in &base.members {
            match member {
                Member::Method(method) => {
                    attrs.shift_remove(name);
                    delegations.shift_remove(name);
                    methods.insert(name.clone(), method.clone());
                }
                Member::Delegation(link) => {
                    attrs.shift_remove(name);
                    methods.shift_remove(name);
                    delegations.insert(
                        name.clone(),
                        InheritedDelegation {
                            source_name: link.source_name.clone(),
                            target: link.target.clone(),
                        },
                    );
                }
                Member::Attribute(_) => {}
            }
        }
    }

    for (name, spec) in own_attrs {
        methods.shift_remove(&name);
        delegations.shift_remove(&name);
        attrs.insert(name, spec);
    }
    for (name, method) in own_methods {
        attrs.shift_remove(&name);
        delegations.shift_remove(&name);
        methods.insert(name, method);
    }

    Merged {
        attributes: attrs,
        methods,
        delegations,
    }
}

fn finalize_attributes(
    registry: &Registry,
    class: &str,
    attrs: AttrTable,
    methods: &MethodTable,
) -> CompositionResult<Vec<Attribute>> {
    let mut layout = Vec::with_capacity(attrs.len());

    for (index, (name, spec)) in attrs.iter().enumerate() {
        if let Some(builder) = spec.builder_name() {
            if !methods.contains_key(builder) {
                let err = if attrs.contains_key(builder) {
                    CompositionError::BuilderNotCallable {
                        class: class.to_string(),
                        attr: name.clone(),
                        builder: builder.to_string(),
                    }
                } else {
                    CompositionError::BuilderNotFound {
                        class: class.to_string(),
                        attr: name.clone(),
                        builder: builder.to_string(),
                    }
                };
                return Err(err);
            }
        }

        if let Some(ty) = spec.isa() {
            for type_name in ty.named_types() {
                let known = type_name == class
                    || registry.class(type_name).is_some()
                    || registry.role(type_name).is_some();
                if !known {
                    return Err(CompositionError::UnknownType {
                        class: class.to_string(),
                        attr: name.clone(),
                        type_name: type_name.to_string(),
                    });
                }
            }
        }

        layout.push(Attribute {
            name: name.clone(),
            index,
            spec: spec.clone(),
        });
    }

    Ok(layout)
}

/// Inherited delegations are kept unless the body shadowed them. Names
/// delegated by the body's own attributes may not collide with an attribute,
/// a body method or each other; they shadow inherited methods and
/// delegations.
fn install_delegations(
    class: &str,
    layout: &[Attribute],
    body: &Body,
    inherited: IndexMap<String, InheritedDelegation>,
    methods: &mut MethodTable,
) -> CompositionResult<IndexMap<String, Delegation>> {
    let slots: HashMap<&str, usize> = layout.iter().map(|a| (a.name.as_str(), a.index)).collect();
    let mut delegations: IndexMap<String, Delegation> = IndexMap::new();

    for (external, link) in inherited {
        let Some(&source) = slots.get(link.source_name.as_str()) else {
            tracing::trace!(class = %class, name = %external, "inherited delegation lost its source");
            continue;
        };
        delegations.insert(
            external,
            Delegation {
                source,
                source_name: link.source_name,
                target: link.target,
            },
        );
    }

    let mut own: HashSet<&str> = HashSet::new();
    for attr in layout {
        let Some(spec) = body.attributes.get(&attr.name) else {
            continue;
        };
        for (external, target) in spec.delegates().pairs() {
            if slots.contains_key(external) || body.methods.contains(external) || !own.insert(external) {
                return Err(CompositionError::DelegationConflict {
                    class: class.to_string(),
                    name: external.to_string(),
                });
            }
            methods.shift_remove(external);
            delegations.insert(
                external.to_string(),
                Delegation {
                    source: attr.index,
                    source_name: attr.name.clone(),
                    target: target.to_string(),
                },
            );
        }
    }

    Ok(delegations)
}

fn freeze_init_args(class: &str, layout: &[Attribute]) -> CompositionResult<IndexMap<String, usize>> {
    let mut init_args = IndexMap::new();
    for attr in layout {
        if let Some(keyword) = attr.spec.init_arg().resolve(&attr.name) {
            if init_args.insert(keyword.to_string(), attr.index).is_some() {
                return Err(CompositionError::DuplicateInitArg {
                    class: class.to_string(),
                    init_arg: keyword.to_string(),
                });
            }
        }
    }
    Ok(init_args)
}

/// Modifiers for one name are applied as one batch over the method the
/// class would otherwise expose, inherited or not.
fn apply_modifiers(class: &str, modifiers: Vec<Modifier>, methods: &mut MethodTable) -> CompositionResult<()> {
    let mut by_target: IndexMap<String, Vec<Modifier>> = IndexMap::new();
    for modifier in modifiers {
        by_target
            .entry(modifier.target().to_string())
            .or_default()
            .push(modifier);
    }

    for (target, batch) in by_target {
        let Some(current) = methods.get(&target) else {
            return Err(CompositionError::ModifierTargetMissing {
                class: class.to_string(),
                method: target,
            });
        };
        let wrapped = current.with_modifiers(&batch);
        tracing::trace!(class = %class, method = %target, layers = batch.len(), "modifiers applied");
        methods.insert(target, wrapped);
    }
    Ok(())
}

fn check_requirements(class: &str, roles: &[Role], methods: &MethodTable) -> CompositionResult<()> {
    for role in roles {
        for required in &role.requires {
            if !methods.contains_key(required) {
                return Err(CompositionError::MissingRequiredMethod {
                    class: class.to_string(),
                    role: role.name().to_string(),
                    method: required.clone(),
                });
            }
        }
    }
    Ok(())
}
