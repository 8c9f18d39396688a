//! Builders for class and role definitions.
//!
//! A builder collects one definition body and seals it with `done()`. Nothing
//! is registered until `done()` succeeds.

use crate::attr::AttrSpec;
use crate::class::Class;
use crate::compiler::{compile, ClassBody};
use crate::error::{CompositionError, CompositionResult};
use crate::modifier::{Method, Modifier, Next};
use crate::registry::Registry;
use crate::role::{Role, RoleDef};
use antler_core::{CallArgs, ClassId, Keywords, ObjectRef, ObjectResult, RoleId, Value};
use indexmap::IndexMap;
use std::collections::BTreeSet;
use std::rc::Rc;

/// Builder for a class definition.
pub struct ClassBuilder<'a> {
    registry: &'a mut Registry,
    body: ClassBody,
}

impl<'a> ClassBuilder<'a> {
    pub(crate) fn new(registry: &'a mut Registry, name: String) -> Self {
        Self {
            registry,
            body: ClassBody {
                name,
                ..ClassBody::default()
            },
        }
    }

    /// Add a base class by name. Earlier bases take precedence.
    pub fn extends(mut self, base: impl Into<String>) -> Self {
        self.body.bases.push(base.into());
        self
    }

    /// Consume a role by name.
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.body.roles.push(role.into());
        self
    }

    /// Declare an attribute. Replaces an earlier member of the same name.
    pub fn attr(mut self, name: impl Into<String>, spec: AttrSpec) -> Self {
        let name = name.into();
        self.body.methods.shift_remove(&name);
        self.body.attributes.insert(name, Rc::new(spec));
        self
    }

    /// Define a method. Replaces an earlier member of the same name.
    pub fn method<F>(mut self, name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&ObjectRef, &[Value]) -> ObjectResult<Value> + 'static,
    {
        let name = name.into();
        self.body.attributes.shift_remove(&name);
        self.body.methods.insert(name, Method::new(body));
        self
    }

    /// Register a modifier built with [`crate::before`], [`crate::after`]
    /// or [`crate::around`].
    pub fn modifier(mut self, modifier: Modifier) -> Self {
        self.body.modifiers.push(modifier);
        self
    }

    pub fn before<F>(self, target: impl Into<String>, f: F) -> Self
    where
        F: Fn(&ObjectRef, &[Value]) -> ObjectResult<()> + 'static,
    {
        self.modifier(Modifier::before(target, f))
    }

    pub fn after<F>(self, target: impl Into<String>, f: F) -> Self
    where
        F: Fn(&ObjectRef, &[Value]) -> ObjectResult<()> + 'static,
    {
        self.modifier(Modifier::after(target, f))
    }

    pub fn around<F>(self, target: impl Into<String>, f: F) -> Self
    where
        F: Fn(&ObjectRef, Next<'_>, &[Value]) -> ObjectResult<Value> + 'static,
    {
        self.modifier(Modifier::around(target, f))
    }

    /// Install an argument remapping hook.
    pub fn build_args<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Class, CallArgs) -> ObjectResult<Keywords> + 'static,
    {
        self.body.build_args = Some(Rc::new(hook));
        self
    }

    /// Install a post-build hook. A class with a build hook accepts keywords
    /// that match no attribute and hands them to the hook.
    pub fn build<F>(mut self, hook: F) -> Self
    where
        F: Fn(&ObjectRef, Keywords) -> ObjectResult<()> + 'static,
    {
        self.body.build = Some(Rc::new(hook));
        self
    }

    /// Compile and register the class.
    pub fn done(self) -> CompositionResult<Class> {
        let name = self.body.name.clone();
        if self.registry.is_defined(&name) {
            return Err(CompositionError::DuplicateName(name));
        }
        let id = ClassId::new(self.registry.next_class_id);
        let class = Class(Rc::new(compile(self.registry, id, self.body)?));
        self.registry.next_class_id += 1;
        self.registry.classes.insert(name, class.clone());
        Ok(class)
    }
}

/// Builder for a role definition.
pub struct RoleBuilder<'a> {
    registry: &'a mut Registry,
    name: String,
    attributes: IndexMap<String, Rc<AttrSpec>>,
    methods: IndexMap<String, Method>,
    requires: BTreeSet<String>,
}

impl<'a> RoleBuilder<'a> {
    pub(crate) fn new(registry: &'a mut Registry, name: String) -> Self {
        Self {
            registry,
            name,
            attributes: IndexMap::new(),
            methods: IndexMap::new(),
            requires: BTreeSet::new(),
        }
    }

    pub fn attr(mut self, name: impl Into<String>, spec: AttrSpec) -> Self {
        let name = name.into();
        self.methods.shift_remove(&name);
        self.attributes.insert(name, Rc::new(spec));
        self
    }

    pub fn method<F>(mut self, name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&ObjectRef, &[Value]) -> ObjectResult<Value> + 'static,
    {
        let name = name.into();
        self.attributes.shift_remove(&name);
        self.methods.insert(name, Method::new(body));
        self
    }

    /// Require consuming classes to provide a method.
    pub fn requires(mut self, method: impl Into<String>) -> Self {
        self.requires.insert(method.into());
        self
    }

    /// Register the role.
    pub fn done(self) -> CompositionResult<Role> {
        if self.registry.is_defined(&self.name) {
            return Err(CompositionError::DuplicateName(self.name));
        }
        let id = RoleId::new(self.registry.next_role_id);
        self.registry.next_role_id += 1;

        let role = Role(Rc::new(RoleDef {
            id,
            name: self.name.clone(),
            attributes: self.attributes,
            methods: self.methods,
            requires: self.requires,
        }));
        tracing::debug!(role = %self.name, id = %id, "role registered");
        self.registry.roles.insert(self.name, role.clone());
        Ok(role)
    }
}
