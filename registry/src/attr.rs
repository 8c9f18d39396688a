//! Attribute declarations.
//!
//! An [`AttrSpec`] is the immutable policy of one attribute: mode, laziness,
//! required-ness, default or builder, type restriction, delegations and the
//! constructor argument name. It is validated once, when declared, and shared
//! by every class that inherits or consumes it.

use crate::error::{DeclarationError, DeclarationResult};
use antler_core::{ObjectRef, ObjectResult, TypeSpec, Value};
use std::fmt;
use std::rc::Rc;

/// Produces a default value for an instance.
pub type ProducerFn = dyn Fn(&ObjectRef) -> ObjectResult<Value>;

/// Access mode of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Assignable only during construction.
    ReadOnly,
    /// Assignable at any time.
    #[default]
    ReadWrite,
}

impl Mode {
    /// Parse a declaration-option mode string (`"ro"` or `"rw"`).
    pub fn parse(mode: &str) -> DeclarationResult<Self> {
        match mode {
            "ro" => Ok(Mode::ReadOnly),
            "rw" => Ok(Mode::ReadWrite),
            other => Err(DeclarationError::InvalidMode(other.to_string())),
        }
    }
}

/// A declared default: a verbatim value or a producer invoked per instance.
#[derive(Clone)]
pub enum DefaultValue {
    Value(Value),
    Producer(Rc<ProducerFn>),
}

impl DefaultValue {
    pub fn is_producer(&self) -> bool {
        matches!(self, DefaultValue::Producer(_))
    }
}

impl fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultValue::Value(v) => f.debug_tuple("Value").field(v).finish(),
            DefaultValue::Producer(_) => f.write_str("Producer(<fn>)"),
        }
    }
}

/// How an attribute is initialised from constructor keywords.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InitArg {
    /// Use the attribute's own name.
    #[default]
    Name,
    /// Use a different keyword.
    Alias(String),
    /// The attribute cannot be set through the constructor.
    Disabled,
}

impl InitArg {
    /// The keyword accepted for an attribute called `attr_name`, if any.
    pub fn resolve<'a>(&'a self, attr_name: &'a str) -> Option<&'a str> {
        match self {
            InitArg::Name => Some(attr_name),
            InitArg::Alias(alias) => Some(alias),
            InitArg::Disabled => None,
        }
    }
}

/// Names forwarded to the value of an attribute, as `(external, target)` pairs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Delegates {
    pairs: Vec<(String, String)>,
}

impl Delegates {
    /// Sequence form: each name is forwarded under the same name.
    pub fn list<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let pairs = names
            .into_iter()
            .map(|name| {
                let name = name.into();
                (name.clone(), name)
            })
            .collect();
        Self { pairs }
    }

    /// Set form: like the sequence form, with duplicates removed.
    pub fn set<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names: Vec<String> = names.into_iter().map(Into::into).collect();
        names.sort();
        names.dedup();
        Self::list(names)
    }

    /// Mapping form: `external` on the owner forwards to `target` on the delegate.
    pub fn map<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let pairs = pairs
            .into_iter()
            .map(|(external, target)| (external.into(), target.into()))
            .collect();
        Self { pairs }
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// `(external, target)` pairs in declaration order.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(e, t)| (e.as_str(), t.as_str()))
    }
}

/// Validated attribute declaration.
#[derive(Debug, Clone, Default)]
pub struct AttrSpec {
    pub(crate) mode: Mode,
    pub(crate) required: bool,
    pub(crate) lazy: bool,
    pub(crate) default: Option<DefaultValue>,
    pub(crate) builder: Option<String>,
    pub(crate) isa: Option<TypeSpec>,
    pub(crate) init_arg: InitArg,
    pub(crate) delegates: Delegates,
}

impl AttrSpec {
    /// Start a declaration. Every option starts at its default.
    pub fn builder() -> AttrSpecBuilder {
        AttrSpecBuilder {
            spec: AttrSpec::default(),
        }
    }

    /// A read-write attribute with no default, builder or restriction.
    pub fn plain() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_read_only(&self) -> bool {
        self.mode == Mode::ReadOnly
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_lazy(&self) -> bool {
        self.lazy
    }

    pub fn default_value(&self) -> Option<&DefaultValue> {
        self.default.as_ref()
    }

    /// Name of the builder method, if any.
    pub fn builder_name(&self) -> Option<&str> {
        self.builder.as_deref()
    }

    /// Declared type restriction; `None` means unrestricted.
    pub fn isa(&self) -> Option<&TypeSpec> {
        self.isa.as_ref()
    }

    pub fn init_arg(&self) -> &InitArg {
        &self.init_arg
    }

    pub fn delegates(&self) -> &Delegates {
        &self.delegates
    }

    /// Whether `value` satisfies the declared type restriction.
    pub fn accepts(&self, value: &Value) -> bool {
        self.isa.as_ref().map_or(true, |ty| ty.accepts(value))
    }
}

/// Builder for an [`AttrSpec`].
#[derive(Debug)]
pub struct AttrSpecBuilder {
    spec: AttrSpec,
}

impl AttrSpecBuilder {
    pub fn mode(mut self, mode: Mode) -> Self {
        self.spec.mode = mode;
        self
    }

    pub fn read_only(self) -> Self {
        self.mode(Mode::ReadOnly)
    }

    pub fn read_write(self) -> Self {
        self.mode(Mode::ReadWrite)
    }

    pub fn required(mut self) -> Self {
        self.spec.required = true;
        self
    }

    pub fn lazy(mut self) -> Self {
        self.spec.lazy = true;
        self
    }

    /// A verbatim default. Must be hashable.
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.spec.default = Some(DefaultValue::Value(value.into()));
        self
    }

    /// A default produced from the instance being initialised.
    pub fn default_with<F>(mut self, producer: F) -> Self
    where
        F: Fn(&ObjectRef) -> ObjectResult<Value> + 'static,
    {
        self.spec.default = Some(DefaultValue::Producer(Rc::new(producer)));
        self
    }

    /// A default produced without looking at the instance.
    pub fn default_fn<F>(self, producer: F) -> Self
    where
        F: Fn() -> Value + 'static,
    {
        self.default_with(move |_| Ok(producer()))
    }

    /// Name of a method that computes the initial value.
    pub fn builder(mut self, method: impl Into<String>) -> Self {
        self.spec.builder = Some(method.into());
        self
    }

    pub fn isa(mut self, ty: impl Into<TypeSpec>) -> Self {
        self.spec.isa = Some(ty.into());
        self
    }

    pub fn handles(mut self, delegates: Delegates) -> Self {
        self.spec.delegates = delegates;
        self
    }

    /// Accept the constructor keyword `name` instead of the attribute name.
    pub fn init_arg(mut self, name: impl Into<String>) -> Self {
        self.spec.init_arg = InitArg::Alias(name.into());
        self
    }

    /// Do not accept any constructor keyword for this attribute.
    pub fn no_init_arg(mut self) -> Self {
        self.spec.init_arg = InitArg::Disabled;
        self
    }

    /// Validate and seal the declaration.
    pub fn build(self) -> DeclarationResult<AttrSpec> {
        let spec = self.spec;
        if let Some(DefaultValue::Value(value)) = &spec.default {
            if !value.is_hashable() {
                return Err(DeclarationError::UnhashableDefault(value.type_name()));
            }
            if let Some(ty) = &spec.isa {
                if !ty.accepts(value) {
                    return Err(DeclarationError::DefaultTypeMismatch {
                        expected: ty.to_string(),
                        actual: value.type_name(),
                    });
                }
            }
        }
        Ok(spec)
    }
}
