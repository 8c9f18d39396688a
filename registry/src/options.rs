//! Attribute declarations from loose option maps.
//!
//! Declarations may come from configuration rather than code. The options
//! object accepts the keys `mode`, `required`, `lazy`, `default`, `builder`,
//! `type`, `handles` and `init_arg`; anything else is rejected.
//!
//! ```json
//! { "mode": "ro", "type": ["int", "str"], "init_arg": "initial_x" }
//! ```

use crate::attr::{AttrSpec, Delegates, Mode};
use crate::error::{DeclarationError, DeclarationResult};
use antler_core::{TypeRef, TypeSpec, Value};
use serde::{Deserialize, Deserializer};
use serde_json::Value as Json;
use std::collections::BTreeMap;

/// Raw declaration options as they appear in configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AttrOptions {
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub required: Option<bool>,
    #[serde(default)]
    pub lazy: Option<bool>,
    /// `Some(Json::Null)` is an explicit null default, `None` is no default.
    #[serde(default, deserialize_with = "present")]
    pub default: Option<Json>,
    #[serde(default)]
    pub builder: Option<Json>,
    #[serde(default, rename = "type")]
    pub isa: Option<Json>,
    #[serde(default)]
    pub handles: Option<Json>,
    /// `Some(Json::Null)` disables the constructor keyword.
    #[serde(default, deserialize_with = "present")]
    pub init_arg: Option<Json>,
}

/// Keeps an explicit `null` distinct from an absent key.
fn present<'de, D>(deserializer: D) -> Result<Option<Json>, D::Error>
where
    D: Deserializer<'de>,
{
    Json::deserialize(deserializer).map(Some)
}

impl AttrOptions {
    /// Validate the options and produce a sealed declaration.
    pub fn into_spec(self) -> DeclarationResult<AttrSpec> {
        let mut builder = AttrSpec::builder();

        if let Some(mode) = &self.mode {
            builder = builder.mode(Mode::parse(mode)?);
        }
        if self.required == Some(true) {
            builder = builder.required();
        }
        if self.lazy == Some(true) {
            builder = builder.lazy();
        }
        if let Some(default) = &self.default {
            builder = builder.default(json_to_value(default));
        }
        match &self.builder {
            None | Some(Json::Null) => {}
            Some(Json::String(method)) => builder = builder.builder(method.clone()),
            Some(other) => return Err(DeclarationError::BuilderNotString(other.to_string())),
        }
        if let Some(ty) = parse_type(self.isa.as_ref())? {
            builder = builder.isa(ty);
        }
        if let Some(handles) = &self.handles {
            builder = builder.handles(parse_handles(handles)?);
        }
        match &self.init_arg {
            None => {}
            Some(Json::Null) => builder = builder.no_init_arg(),
            Some(Json::String(name)) => builder = builder.init_arg(name.clone()),
            Some(other) => return Err(DeclarationError::InitArgNotString(other.to_string())),
        }

        builder.build()
    }
}

impl AttrSpec {
    /// Declare an attribute from a JSON options document.
    pub fn from_json(options: &str) -> DeclarationResult<Self> {
        let options: AttrOptions = serde_json::from_str(options).map_err(options_error)?;
        options.into_spec()
    }

    /// Declare an attribute from an already parsed options object.
    pub fn from_options(options: Json) -> DeclarationResult<Self> {
        let options: AttrOptions = serde_json::from_value(options).map_err(options_error)?;
        options.into_spec()
    }
}

fn options_error(err: serde_json::Error) -> DeclarationError {
    let message = err.to_string();
    match message.strip_prefix("unknown field ") {
        Some(rest) => {
            let field = rest.split(',').next().unwrap_or(rest).trim_matches('`');
            DeclarationError::UnknownOption(field.to_string())
        }
        None => DeclarationError::InvalidOptions(message),
    }
}

fn parse_type(isa: Option<&Json>) -> DeclarationResult<Option<TypeSpec>> {
    match isa {
        None | Some(Json::Null) => Ok(None),
        Some(Json::String(name)) => Ok(Some(TypeRef::parse(name).into())),
        Some(Json::Array(names)) => {
            let types = names
                .iter()
                .map(|name| match name {
                    Json::String(name) => Ok(TypeRef::parse(name)),
                    other => Err(DeclarationError::InvalidType(other.to_string())),
                })
                .collect::<DeclarationResult<Vec<_>>>()?;
            TypeSpec::any_of(types)
                .map(Some)
                .ok_or_else(|| DeclarationError::InvalidType("empty type tuple".into()))
        }
        Some(other) => Err(DeclarationError::InvalidType(other.to_string())),
    }
}

fn parse_handles(handles: &Json) -> DeclarationResult<Delegates> {
    match handles {
        Json::Array(names) => {
            let names = names
                .iter()
                .map(|name| match name {
                    Json::String(name) => Ok(name.clone()),
                    other => Err(DeclarationError::InvalidHandles(other.to_string())),
                })
                .collect::<DeclarationResult<Vec<_>>>()?;
            Ok(Delegates::list(names))
        }
        Json::Object(pairs) => {
            let pairs = pairs
                .iter()
                .map(|(external, target)| match target {
                    Json::String(target) => Ok((external.clone(), target.clone())),
                    other => Err(DeclarationError::InvalidHandles(other.to_string())),
                })
                .collect::<DeclarationResult<Vec<_>>>()?;
            Ok(Delegates::map(pairs))
        }
        other => Err(DeclarationError::InvalidHandles(other.to_string())),
    }
}

/// Convert a JSON literal into a [`Value`].
pub fn json_to_value(json: &Json) -> Value {
    match json {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Bool(*b),
        Json::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        Json::String(s) => Value::String(s.clone()),
        Json::Array(items) => Value::List(items.iter().map(json_to_value).collect()),
        Json::Object(fields) => Value::Map(
            fields
                .iter()
                .map(|(k, v)| (k.clone(), json_to_value(v)))
                .collect::<BTreeMap<_, _>>(),
        ),
    }
}
