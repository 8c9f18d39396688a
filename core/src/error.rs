//! Errors raised while constructing or using live objects.

use thiserror::Error;

/// Result type for object operations.
pub type ObjectResult<T> = Result<T, ObjectError>;

/// Broad classification of an [`ObjectError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing, unset, read-only or undeletable attributes.
    Attribute,
    /// Values or arguments of the wrong shape.
    Type,
    /// Resource exhaustion (unbounded delegation).
    Resource,
    /// Raised by user code (methods, hooks, producers) and passed through.
    User,
}

/// Errors that can occur while constructing or accessing an object.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ObjectError {
    #[error("'{class}' object '{attr}' attribute is not set")]
    NotSet { class: String, attr: String },

    #[error("'{class}' object '{attr}' attribute is read-only")]
    ReadOnly { class: String, attr: String },

    #[error("required attribute '{attr}' not provided for '{class}'")]
    RequiredMissing { class: String, attr: String },

    #[error("cannot delete required attribute '{attr}' of '{class}'")]
    CannotDeleteRequired { class: String, attr: String },

    #[error("'{attr}' attribute must be a {expected}, got {actual}")]
    TypeMismatch {
        attr: String,
        expected: String,
        actual: String,
    },

    #[error("'{class}' object has no member '{name}'")]
    NoSuchMember { class: String, name: String },

    #[error("'{class}' member '{name}' is a method, not an attribute")]
    NotAnAttribute { class: String, name: String },

    #[error("'{class}' member '{name}' is not callable")]
    NotCallable { class: String, name: String },

    #[error("cannot delegate '{name}' through '{attr}': value of type {actual} is not an object")]
    NotAnObject {
        attr: String,
        name: String,
        actual: String,
    },

    #[error("'{class}' got an unexpected keyword argument '{name}'")]
    UnexpectedKeyword { class: String, name: String },

    #[error("'{class}' takes no positional arguments ({count} given)")]
    UnexpectedPositional { class: String, count: usize },

    #[error("delegation depth exceeded ({depth} hops)")]
    DelegationDepthExceeded { depth: usize },

    #[error("{0}")]
    Custom(String),
}

impl ObjectError {
    pub fn not_set(class: impl Into<String>, attr: impl Into<String>) -> Self {
        Self::NotSet {
            class: class.into(),
            attr: attr.into(),
        }
    }

    pub fn read_only(class: impl Into<String>, attr: impl Into<String>) -> Self {
        Self::ReadOnly {
            class: class.into(),
            attr: attr.into(),
        }
    }

    pub fn required_missing(class: impl Into<String>, attr: impl Into<String>) -> Self {
        Self::RequiredMissing {
            class: class.into(),
            attr: attr.into(),
        }
    }

    pub fn cannot_delete_required(class: impl Into<String>, attr: impl Into<String>) -> Self {
        Self::CannotDeleteRequired {
            class: class.into(),
            attr: attr.into(),
        }
    }

    pub fn type_mismatch(
        attr: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch {
            attr: attr.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn no_such_member(class: impl Into<String>, name: impl Into<String>) -> Self {
        Self::NoSuchMember {
            class: class.into(),
            name: name.into(),
        }
    }

    pub fn not_an_attribute(class: impl Into<String>, name: impl Into<String>) -> Self {
        Self::NotAnAttribute {
            class: class.into(),
            name: name.into(),
        }
    }

    pub fn not_callable(class: impl Into<String>, name: impl Into<String>) -> Self {
        Self::NotCallable {
            class: class.into(),
            name: name.into(),
        }
    }

    pub fn not_an_object(
        attr: impl Into<String>,
        name: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::NotAnObject {
            attr: attr.into(),
            name: name.into(),
            actual: actual.into(),
        }
    }

    pub fn unexpected_keyword(class: impl Into<String>, name: impl Into<String>) -> Self {
        Self::UnexpectedKeyword {
            class: class.into(),
            name: name.into(),
        }
    }

    pub fn unexpected_positional(class: impl Into<String>, count: usize) -> Self {
        Self::UnexpectedPositional {
            class: class.into(),
            count,
        }
    }

    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom(message.into())
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotSet { .. }
            | Self::ReadOnly { .. }
            | Self::RequiredMissing { .. }
            | Self::CannotDeleteRequired { .. }
            | Self::NoSuchMember { .. }
            | Self::NotAnAttribute { .. }
            | Self::NotAnObject { .. } => ErrorKind::Attribute,
            Self::TypeMismatch { .. }
            | Self::NotCallable { .. }
            | Self::UnexpectedKeyword { .. }
            | Self::UnexpectedPositional { .. } => ErrorKind::Type,
            Self::DelegationDepthExceeded { .. } => ErrorKind::Resource,
            Self::Custom(_) => ErrorKind::User,
        }
    }

    /// Whether this is an AttributeError-class failure.
    pub fn is_attribute_error(&self) -> bool {
        self.kind() == ErrorKind::Attribute
    }

    /// Whether this is a TypeError-class failure.
    pub fn is_type_error(&self) -> bool {
        self.kind() == ErrorKind::Type
    }
}
