//! The object capability trait.
//!
//! Everything the registry and the runtime need from a live instance goes
//! through [`Object`]: named reads, writes and deletes, method calls, and the
//! structural `isa`/`does` checks. Delegation forwards through this trait, so
//! chains of delegating objects compose without knowing each other's layout.

use crate::{ObjectResult, Value};
use std::fmt;
use std::rc::Rc;

/// Shared handle to a live object.
pub type ObjectRef = Rc<dyn Object>;

/// A live object with managed attributes and methods.
pub trait Object: fmt::Debug {
    /// Name of the object's class.
    fn class_name(&self) -> &str;

    /// Whether the object is an instance of the named class (subclasses
    /// included) or consumes the named role.
    fn isa(&self, type_name: &str) -> bool;

    /// Whether the object's class consumes the named role, directly or
    /// through a base class.
    fn does(&self, role: &str) -> bool;

    /// Read a named attribute (or delegated name).
    fn get(&self, name: &str) -> ObjectResult<Value>;

    /// Assign a named attribute (or delegated name).
    fn set(&self, name: &str, value: Value) -> ObjectResult<()>;

    /// Delete a named attribute (or delegated name).
    fn delete(&self, name: &str) -> ObjectResult<()>;

    /// Call a named method (or delegated name) with positional arguments.
    fn call(&self, name: &str, args: &[Value]) -> ObjectResult<Value>;

    /// Whether reading `name` would succeed.
    fn has(&self, name: &str) -> bool {
        self.get(name).is_ok()
    }
}
