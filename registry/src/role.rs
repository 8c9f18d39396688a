//! Role definitions.

use crate::attr::AttrSpec;
use crate::modifier::Method;
use antler_core::RoleId;
use indexmap::IndexMap;
use std::collections::BTreeSet;
use std::ops::Deref;
use std::rc::Rc;

/// A named, non-instantiable bundle of attributes and methods, plus the
/// method names a consuming class must provide.
#[derive(Debug)]
pub struct RoleDef {
    pub id: RoleId,
    pub name: String,
    pub attributes: IndexMap<String, Rc<AttrSpec>>,
    pub methods: IndexMap<String, Method>,
    pub requires: BTreeSet<String>,
}

impl RoleDef {
    pub fn attribute(&self, name: &str) -> Option<&AttrSpec> {
        self.attributes.get(name).map(Rc::as_ref)
    }

    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods.get(name)
    }

    pub fn requires(&self, method: &str) -> bool {
        self.requires.contains(method)
    }
}

/// Shared handle to a sealed role.
#[derive(Debug, Clone)]
pub struct Role(pub(crate) Rc<RoleDef>);

impl Role {
    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn id(&self) -> RoleId {
        self.0.id
    }
}

impl Deref for Role {
    type Target = RoleDef;

    fn deref(&self) -> &RoleDef {
        &self.0
    }
}
