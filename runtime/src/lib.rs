//! Antler Runtime
//!
//! Live objects for compiled classes.
//!
//! Responsibilities:
//! - Construct instances in phase order (explicit, default, builder, required)
//! - Defer lazy defaults and builders to first read
//! - Enforce read-only mode and type restrictions on assignment
//! - Forward delegated names to the object held by the source attribute
//!
//! # Module Structure
//!
//! - `init` - construction and the initialization phases
//! - `instance` - slot storage and member dispatch
//! - `delegation` - forwarding accessors and the hop limit

mod delegation;
mod init;
mod instance;

pub use delegation::MAX_DELEGATION_DEPTH;
pub use init::{construct, new_object};
pub use instance::Instance;
