//! Antler Registry
//!
//! Schema definition for managed objects. Attribute declarations, roles and
//! method modifiers are collected by builders and compiled into sealed
//! classes. The registry owns every sealed class and role by name.

mod attr;
mod builder;
mod class;
mod compiler;
mod error;
mod modifier;
mod options;
mod registry;
mod role;

pub use attr::{AttrSpec, AttrSpecBuilder, DefaultValue, Delegates, InitArg, Mode, ProducerFn};
pub use builder::{ClassBuilder, RoleBuilder};
pub use class::{Attribute, BuildArgsFn, BuildFn, Class, ClassDef, Delegation, Member};
pub use error::*;
pub use modifier::{
    after, around, before, Advice, AdviceFn, AroundFn, Method, MethodFn, Modifier, ModifierKind,
    Next,
};
pub use options::{json_to_value, AttrOptions};
pub use registry::Registry;
pub use role::{Role, RoleDef};
