//! Forwarding accessors.
//!
//! A delegated name resolves its target on every access: the source
//! attribute is read (materializing it if lazy) and the operation is
//! forwarded to whatever object it currently holds. Chains compose through
//! [`Object`], so a target may itself delegate.
//!
//! Cycles are not detected up front. Each forwarding hop increments a
//! per-thread depth counter, and exceeding [`MAX_DELEGATION_DEPTH`] fails the
//! access with [`ObjectError::DelegationDepthExceeded`].

use crate::instance::Instance;
use antler_core::{Object, ObjectError, ObjectRef, ObjectResult, Value};
use antler_registry::Delegation;
use std::cell::Cell;

/// Maximum nested forwarding hops before an access is abandoned.
///
/// The counter is per thread and only sees depth, not identity, so an
/// acyclic chain longer than this fails the same way a cycle does: the
/// hop past the limit returns [`ObjectError::DelegationDepthExceeded`].
pub const MAX_DELEGATION_DEPTH: usize = 64;

thread_local! {
    static DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// One level of forwarding. Released on drop.
struct Hop;

impl Hop {
    fn enter() -> ObjectResult<Self> {
        DEPTH.with(|depth| {
            let next = depth.get() + 1;
            if next > MAX_DELEGATION_DEPTH {
                return Err(ObjectError::DelegationDepthExceeded { depth: next });
            }
            depth.set(next);
            tracing::trace!(depth = next, "delegation hop");
            Ok(Hop)
        })
    }
}

impl Drop for Hop {
    fn drop(&mut self) {
        DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

/// The object currently stored in the link's source attribute.
fn target(owner: &Instance, link: &Delegation) -> ObjectResult<ObjectRef> {
    match owner.read(owner.attribute_at(link.source))? {
        Value::Object(obj) => Ok(obj),
        other => Err(ObjectError::not_an_object(
            &link.source_name,
            &link.target,
            other.type_name(),
        )),
    }
}

pub(crate) fn get(owner: &Instance, link: &Delegation) -> ObjectResult<Value> {
    let _hop = Hop::enter()?;
    target(owner, link)?.get(&link.target)
}

pub(crate) fn set(owner: &Instance, link: &Delegation, value: Value) -> ObjectResult<()> {
    let _hop = Hop::enter()?;
    target(owner, link)?.set(&link.target, value)
}

pub(crate) fn delete(owner: &Instance, link: &Delegation) -> ObjectResult<()> {
    let _hop = Hop::enter()?;
    target(owner, link)?.delete(&link.target)
}

/// Delegated methods run with the target as invocant.
pub(crate) fn call(owner: &Instance, link: &Delegation, args: &[Value]) -> ObjectResult<Value> {
    let _hop = Hop::enter()?;
    target(owner, link)?.call(&link.target, args)
}
