//! Type restrictions for attribute values.
//!
//! A [`TypeSpec`] is one type or a tuple of alternatives. Builtin kinds check
//! the value's variant; named types are checked structurally against the
//! object's class ancestry and role set. `Bool` is a subtype of `Int`.

use crate::Value;
use std::fmt;

/// A single type an attribute value may have.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    Bool,
    Int,
    Float,
    Str,
    List,
    Map,
    /// A class or role name.
    Named(String),
}

impl TypeRef {
    /// Parse a type name as used in declaration options.
    ///
    /// Lower-case builtin names map to builtin kinds; anything else is taken
    /// as a class or role name.
    pub fn parse(name: &str) -> Self {
        match name {
            "bool" => TypeRef::Bool,
            "int" => TypeRef::Int,
            "float" => TypeRef::Float,
            "str" => TypeRef::Str,
            "list" => TypeRef::List,
            "map" => TypeRef::Map,
            other => TypeRef::Named(other.to_string()),
        }
    }

    /// Create a named (class or role) type.
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named(name.into())
    }

    /// Check a value against this type. Subtypes are accepted.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (TypeRef::Bool, Value::Bool(_)) => true,
            (TypeRef::Int, Value::Int(_) | Value::Bool(_)) => true,
            (TypeRef::Float, Value::Float(_)) => true,
            (TypeRef::Str, Value::String(_)) => true,
            (TypeRef::List, Value::List(_)) => true,
            (TypeRef::Map, Value::Map(_)) => true,
            (TypeRef::Named(name), Value::Object(obj)) => obj.isa(name),
            _ => false,
        }
    }

    /// The class or role name, if this is a named type.
    pub fn as_named(&self) -> Option<&str> {
        match self {
            TypeRef::Named(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Bool => write!(f, "Bool"),
            TypeRef::Int => write!(f, "Int"),
            TypeRef::Float => write!(f, "Float"),
            TypeRef::Str => write!(f, "String"),
            TypeRef::List => write!(f, "List"),
            TypeRef::Map => write!(f, "Map"),
            TypeRef::Named(name) => write!(f, "{}", name),
        }
    }
}

/// A declared attribute type: one type or a tuple of alternatives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSpec {
    alternatives: Vec<TypeRef>,
}

impl TypeSpec {
    /// A single-type restriction.
    pub fn one(ty: TypeRef) -> Self {
        Self {
            alternatives: vec![ty],
        }
    }

    /// A tuple of alternatives. Returns `None` for an empty tuple.
    pub fn any_of(types: impl IntoIterator<Item = TypeRef>) -> Option<Self> {
        let alternatives: Vec<TypeRef> = types.into_iter().collect();
        if alternatives.is_empty() {
            None
        } else {
            Some(Self { alternatives })
        }
    }

    /// Check a value against the restriction.
    pub fn accepts(&self, value: &Value) -> bool {
        self.alternatives.iter().any(|ty| ty.accepts(value))
    }

    /// The alternatives, in declaration order.
    pub fn alternatives(&self) -> &[TypeRef] {
        &self.alternatives
    }

    /// Class or role names referenced by this restriction.
    pub fn named_types(&self) -> impl Iterator<Item = &str> {
        self.alternatives.iter().filter_map(TypeRef::as_named)
    }
}

impl From<TypeRef> for TypeSpec {
    fn from(ty: TypeRef) -> Self {
        TypeSpec::one(ty)
    }
}

impl fmt::Display for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.alternatives.len() == 1 {
            return write!(f, "{}", self.alternatives[0]);
        }
        write!(f, "(")?;
        for (i, ty) in self.alternatives.iter().enumerate() {
            if i > 0 {
                write!(f, " | ")?;
            }
            write!(f, "{}", ty)?;
        }
        write!(f, ")")
    }
}
