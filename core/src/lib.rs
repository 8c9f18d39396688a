//! Antler Core Types
//!
//! This crate provides the foundational types shared by the registry and the runtime:
//! - Identity types (ClassId, RoleId)
//! - Value types (the Value enum, including object references)
//! - The `Object` capability trait that every live instance implements
//! - Type predicates used by attribute type restrictions
//! - Constructor argument packaging (CallArgs, Keywords)
//! - Object access errors

mod args;
mod error;
mod id;
mod object;
mod types;
mod value;

pub use args::*;
pub use error::*;
pub use id::*;
pub use object::*;
pub use types::*;
pub use value::*;
