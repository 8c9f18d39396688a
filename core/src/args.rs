//! Constructor argument packaging.

use crate::Value;
use indexmap::IndexMap;

/// Keyword arguments, in the order they were supplied.
pub type Keywords = IndexMap<String, Value>;

/// Positional and keyword arguments passed to a class constructor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallArgs {
    pub positional: Vec<Value>,
    pub keywords: Keywords,
}

impl CallArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a positional argument.
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Add a keyword argument. A repeated name replaces the earlier value.
    pub fn kw(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.keywords.insert(name.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.keywords.is_empty()
    }
}

impl From<Keywords> for CallArgs {
    fn from(keywords: Keywords) -> Self {
        Self {
            positional: Vec::new(),
            keywords,
        }
    }
}

/// Helper macro to create keyword argument maps.
#[macro_export]
macro_rules! kwargs {
    () => {
        $crate::Keywords::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {
        {
            let mut map = $crate::Keywords::new();
            $(
                map.insert($key.to_string(), $crate::Value::from($value));
            )+
            map
        }
    };
}
