//! Compiled classes.
//!
//! A [`Class`] is the sealed output of the compiler: a fixed attribute layout
//! (slot index per attribute), a member table mapping every public name to an
//! attribute slot, a delegation or a method, the frozen constructor keyword
//! table, and the static ancestry and role sets used for `isa`/`does`.

use crate::attr::AttrSpec;
use crate::modifier::Method;
use antler_core::{CallArgs, ClassId, Keywords, ObjectRef, ObjectResult};
use indexmap::IndexMap;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

/// Rewrites constructor arguments into keyword form before attributes are
/// resolved.
pub type BuildArgsFn = dyn Fn(&Class, CallArgs) -> ObjectResult<Keywords>;

/// Runs after every attribute is settled, receiving unconsumed keywords.
pub type BuildFn = dyn Fn(&ObjectRef, Keywords) -> ObjectResult<()>;

/// An attribute in a compiled layout.
#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: String,
    /// Slot index in the instance layout.
    pub index: usize,
    pub spec: Rc<AttrSpec>,
}

/// A forwarding accessor: `name` on the owner resolves to `target` on the
/// object currently stored in the `source` slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delegation {
    pub source: usize,
    pub source_name: String,
    pub target: String,
}

/// What a public name on a class resolves to.
#[derive(Debug, Clone)]
pub enum Member {
    Attribute(usize),
    Delegation(Delegation),
    Method(Method),
}

/// Sealed class descriptor. Shared by every instance of the class.
pub struct ClassDef {
    pub(crate) id: ClassId,
    pub(crate) name: String,
    pub(crate) bases: Vec<Class>,
    pub(crate) attributes: Vec<Attribute>,
    pub(crate) members: HashMap<String, Member>,
    pub(crate) init_args: IndexMap<String, usize>,
    pub(crate) ancestors: HashSet<String>,
    pub(crate) roles: BTreeSet<String>,
    pub(crate) build_args: Option<Rc<BuildArgsFn>>,
    pub(crate) build: Option<Rc<BuildFn>>,
}

impl ClassDef {
    pub fn id(&self) -> ClassId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Direct bases, in declaration order.
    pub fn bases(&self) -> &[Class] {
        &self.bases
    }

    /// Attribute layout, in slot order.
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        match self.members.get(name) {
            Some(Member::Attribute(index)) => self.attributes.get(*index),
            _ => None,
        }
    }

    pub fn member(&self, name: &str) -> Option<&Member> {
        self.members.get(name)
    }

    pub fn method(&self, name: &str) -> Option<&Method> {
        match self.members.get(name) {
            Some(Member::Method(method)) => Some(method),
            _ => None,
        }
    }

    pub fn has_method(&self, name: &str) -> bool {
        self.method(name).is_some()
    }

    /// Slot claimed by a constructor keyword.
    pub fn init_arg(&self, keyword: &str) -> Option<usize> {
        self.init_args.get(keyword).copied()
    }

    /// Accepted constructor keywords.
    pub fn init_args(&self) -> impl Iterator<Item = &str> {
        self.init_args.keys().map(String::as_str)
    }

    /// Whether this class is `name` or inherits from it.
    pub fn is_subclass_of(&self, name: &str) -> bool {
        self.ancestors.contains(name)
    }

    /// Whether this class consumes `role`, directly or through a base.
    pub fn does(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    /// Class or role membership.
    pub fn isa(&self, type_name: &str) -> bool {
        self.is_subclass_of(type_name) || self.does(type_name)
    }

    /// Every role this class consumes, directly or through a base.
    pub fn roles(&self) -> impl Iterator<Item = &str> {
        self.roles.iter().map(String::as_str)
    }

    pub fn build_args_hook(&self) -> Option<&BuildArgsFn> {
        self.build_args.as_deref()
    }

    pub fn build_hook(&self) -> Option<&BuildFn> {
        self.build.as_deref()
    }
}

impl fmt::Debug for ClassDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassDef")
            .field("id", &self.id)
            .field("name", &self.name)
            .field(
                "bases",
                &self.bases.iter().map(|base| base.name()).collect::<Vec<_>>(),
            )
            .field("attributes", &self.attributes)
            .field("roles", &self.roles)
            .field("build_args", &self.build_args.is_some())
            .field("build", &self.build.is_some())
            .finish()
    }
}

/// Shared handle to a sealed class.
#[derive(Debug, Clone)]
pub struct Class(pub(crate) Rc<ClassDef>);

impl Class {
    pub fn ptr_eq(&self, other: &Class) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Deref for Class {
    type Target = ClassDef;

    fn deref(&self) -> &ClassDef {
        &self.0
    }
}

impl PartialEq for Class {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}
