//! Declaration and composition errors.
//!
//! Both are raised while a schema is being defined, never while objects are
//! in use. A failed class definition leaves no class behind.

use thiserror::Error;

/// Result type for attribute declarations.
pub type DeclarationResult<T> = Result<T, DeclarationError>;

/// Result type for class and role compilation.
pub type CompositionResult<T> = Result<T, CompositionError>;

/// Invalid attribute options.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DeclarationError {
    #[error("mode must be one of 'ro', 'rw' (got '{0}')")]
    InvalidMode(String),

    #[error("unhashable default must be wrapped in a producer (got {0})")]
    UnhashableDefault(String),

    #[error("attribute default has bad type: expected {expected}, got {actual}")]
    DefaultTypeMismatch { expected: String, actual: String },

    #[error("builder must be a method name (got {0})")]
    BuilderNotString(String),

    #[error("init_arg must be a string or null (got {0})")]
    InitArgNotString(String),

    #[error("invalid type restriction: {0}")]
    InvalidType(String),

    #[error("invalid delegation list: {0}")]
    InvalidHandles(String),

    #[error("unrecognised option: {0}")]
    UnknownOption(String),

    #[error("invalid attribute options: {0}")]
    InvalidOptions(String),
}

/// Errors that can occur while compiling a class or role.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompositionError {
    #[error("Duplicate class or role name: {0}")]
    DuplicateName(String),

    #[error("Unknown base class '{base}' for class {class}")]
    UnknownBase { class: String, base: String },

    #[error("'{name}' is a role, not a class (listed as a base of {class})")]
    NotAClass { class: String, name: String },

    #[error("Unknown role '{role}' consumed by class {class}")]
    UnknownRole { class: String, role: String },

    #[error("'{name}' is not a role (consumed by class {class})")]
    NotARole { class: String, name: String },

    #[error("'{attr}' attribute builder method '{builder}' not found on class {class}")]
    BuilderNotFound {
        class: String,
        attr: String,
        builder: String,
    },

    #[error("'{attr}' attribute builder '{builder}' is not callable on class {class}")]
    BuilderNotCallable {
        class: String,
        attr: String,
        builder: String,
    },

    #[error("Unknown type '{type_name}' restricting attribute '{attr}' of class {class}")]
    UnknownType {
        class: String,
        attr: String,
        type_name: String,
    },

    #[error("Constructor argument '{init_arg}' is claimed by more than one attribute of class {class}")]
    DuplicateInitArg { class: String, init_arg: String },

    #[error("Delegated name '{name}' conflicts with a member of class {class}")]
    DelegationConflict { class: String, name: String },

    #[error("Method modifier targets unknown method '{method}' on class {class}")]
    ModifierTargetMissing { class: String, method: String },

    #[error("Class {class} does not implement method '{method}' required by role {role}")]
    MissingRequiredMethod {
        class: String,
        role: String,
        method: String,
    },
}

/// Any failure while defining a schema.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    #[error(transparent)]
    Declaration(#[from] DeclarationError),

    #[error(transparent)]
    Composition(#[from] CompositionError),
}
