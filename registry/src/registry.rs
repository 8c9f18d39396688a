//! The Registry - named classes and roles.

use crate::builder::{ClassBuilder, RoleBuilder};
use crate::class::Class;
use crate::role::Role;
use std::collections::HashMap;

/// The Registry owns every sealed class and role by name.
///
/// Definitions are added one at a time through [`Registry::define_class`]
/// and [`Registry::define_role`]; bases and roles must be registered before
/// anything that refers to them. Sealed entries never change.
#[derive(Debug, Default)]
pub struct Registry {
    pub(crate) next_class_id: u32,
    pub(crate) next_role_id: u32,
    pub(crate) classes: HashMap<String, Class>,
    pub(crate) roles: HashMap<String, Role>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a class definition.
    pub fn define_class(&mut self, name: impl Into<String>) -> ClassBuilder<'_> {
        ClassBuilder::new(self, name.into())
    }

    /// Start a role definition.
    pub fn define_role(&mut self, name: impl Into<String>) -> RoleBuilder<'_> {
        RoleBuilder::new(self, name.into())
    }

    // ==================== Lookups ====================

    pub fn class(&self, name: &str) -> Option<&Class> {
        self.classes.get(name)
    }

    pub fn role(&self, name: &str) -> Option<&Role> {
        self.roles.get(name)
    }

    /// Whether a class or role already uses `name`.
    pub fn is_defined(&self, name: &str) -> bool {
        self.classes.contains_key(name) || self.roles.contains_key(name)
    }

    pub fn all_classes(&self) -> impl Iterator<Item = &Class> {
        self.classes.values()
    }

    pub fn all_roles(&self) -> impl Iterator<Item = &Role> {
        self.roles.values()
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    pub fn role_count(&self) -> usize {
        self.roles.len()
    }
}
