//! Declarative argument schemas and the validator that enforces them.
//!
//! Validation runs as a fixed sequence of passes over the whole argument
//! map, and the first failure wins:
//!
//! 1. required parameters are present (`null` counts as absent)
//! 2. no argument outside the schema
//! 3. every supplied value has the declared type
//! 4. enumerated parameters hold an allowed value
//! 5. pattern-constrained parameters match their format
//!
//! On success the caller gets [`ToolArgs`], which contains exactly the
//! schema's parameters with defaults filled in.

use crate::tools::error::ToolError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

static SLUG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.-]*$").expect("slug pattern is valid"));
static OPTION_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9_.:-]*$").expect("option name pattern is valid")
});
static VERSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9A-Za-z][0-9A-Za-z.+-]*$").expect("version pattern is valid"));

/// A rejected argument.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid argument '{field}': {reason}")]
pub struct ValidationError {
    /// Name of the offending argument.
    pub field: String,
    /// Human-readable reason.
    pub reason: String,
}

impl ValidationError {
    /// Creates a validation error for `field`.
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// JSON type a parameter accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    /// A JSON string.
    String,
    /// A JSON number without a fractional part.
    Integer,
    /// Any JSON number.
    Number,
    /// A JSON boolean.
    Boolean,
    /// A string, number, or boolean.
    Scalar,
}

impl ParamKind {
    fn accepts(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Number => value.is_number(),
            Self::Boolean => value.is_boolean(),
            Self::Scalar => value.is_string() || value.is_number() || value.is_boolean(),
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Scalar => "string, number or boolean",
        }
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Character-set constraint for string parameters that reach WP-CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Format {
    /// Plugin, theme and post type slugs.
    Slug,
    /// `wp_options` keys.
    OptionName,
    /// Release versions such as `6.4.2` or `1.0-beta+1`.
    Version,
}

impl Format {
    fn is_match(self, value: &str) -> bool {
        match self {
            Self::Slug => SLUG.is_match(value),
            Self::OptionName => OPTION_NAME.is_match(value),
            Self::Version => VERSION.is_match(value),
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Self::Slug => "must be a slug of letters, digits, '.', '_' or '-'",
            Self::OptionName => "must be an option name of letters, digits, '_', '.', ':' or '-'",
            Self::Version => "must be a version of letters, digits, '.', '+' or '-'",
        }
    }
}

/// Declaration of a single tool parameter.
#[derive(Debug, Clone, Serialize)]
pub struct ParamSpec {
    /// Argument key.
    pub name: &'static str,
    /// Accepted JSON type.
    #[serde(rename = "type")]
    pub kind: ParamKind,
    /// Whether the argument must be supplied.
    pub required: bool,
    /// Value used when an optional argument is absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Closed set of allowed string values.
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub allowed: Option<&'static [&'static str]>,
    /// Character-set constraint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<Format>,
}

impl ParamSpec {
    /// A parameter the caller must supply.
    #[must_use]
    pub fn required(name: &'static str, kind: ParamKind) -> Self {
        Self {
            name,
            kind,
            required: true,
            default: None,
            allowed: None,
            format: None,
        }
    }

    /// A parameter the caller may omit.
    #[must_use]
    pub fn optional(name: &'static str, kind: ParamKind) -> Self {
        Self {
            required: false,
            ..Self::required(name, kind)
        }
    }

    /// Sets the value used when the argument is absent.
    #[must_use]
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Restricts the argument to `values`.
    #[must_use]
    pub fn one_of(mut self, values: &'static [&'static str]) -> Self {
        self.allowed = Some(values);
        self
    }

    /// Requires the argument to match `format`.
    #[must_use]
    pub fn matching(mut self, format: Format) -> Self {
        self.format = Some(format);
        self
    }
}

/// The full parameter list of one tool.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct ToolSchema {
    params: Vec<ParamSpec>,
}

impl ToolSchema {
    /// A schema with no parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter.
    #[must_use]
    pub fn param(mut self, spec: ParamSpec) -> Self {
        self.params.push(spec);
        self
    }

    /// The declared parameters, in declaration order.
    #[must_use]
    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    fn spec(&self, name: &str) -> Option<&ParamSpec> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Checks `args` against the schema and returns the normalized arguments.
    ///
    /// Pure: never touches the filesystem or spawns anything.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found, in pass order.
    pub fn validate(&self, args: &Map<String, Value>) -> Result<ToolArgs, ValidationError> {
        let supplied = |name: &str| args.get(name).filter(|v| !v.is_null());

        for spec in self.params.iter().filter(|p| p.required) {
            if supplied(spec.name).is_none() {
                return Err(ValidationError::new(spec.name, "missing required argument"));
            }
        }

        if let Some(unknown) = args.keys().find(|key| self.spec(key).is_none()) {
            return Err(ValidationError::new(unknown.as_str(), "unexpected argument"));
        }

        for spec in &self.params {
            if let Some(value) = supplied(spec.name) {
                if !spec.kind.accepts(value) {
                    return Err(ValidationError::new(
                        spec.name,
                        format!("expected {}, got {}", spec.kind, json_type(value)),
                    ));
                }
            }
        }

        for spec in &self.params {
            if let (Some(allowed), Some(value)) = (spec.allowed, supplied(spec.name)) {
                let matches = value.as_str().is_some_and(|s| allowed.contains(&s));
                if !matches {
                    return Err(ValidationError::new(
                        spec.name,
                        format!("must be one of: {}", allowed.join(", ")),
                    ));
                }
            }
        }

        for spec in &self.params {
            if let (Some(format), Some(value)) = (spec.format, supplied(spec.name)) {
                if !value.as_str().is_some_and(|s| format.is_match(s)) {
                    return Err(ValidationError::new(spec.name, format.describe()));
                }
            }
        }

        let mut normalized = Map::new();
        for spec in &self.params {
            if let Some(value) = supplied(spec.name).or(spec.default.as_ref()) {
                normalized.insert(spec.name.to_string(), value.clone());
            }
        }
        Ok(ToolArgs(normalized))
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Arguments that passed validation.
///
/// Holds exactly the schema's parameters, with defaults applied. The typed
/// getters only fail if a handler asks for something its schema does not
/// declare, which is a programming error and surfaces as an internal error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolArgs(Map<String, Value>);

impl ToolArgs {
    /// Raw access to a value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// A string argument that the schema guarantees is present.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::Internal`] if the argument is absent or not a string.
    pub fn str(&self, name: &str) -> Result<&str, ToolError> {
        self.opt_str(name)
            .ok_or_else(|| ToolError::Internal(format!("argument '{name}' is not a string")))
    }

    /// An optional string argument.
    #[must_use]
    pub fn opt_str(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    /// A boolean argument, `false` when absent.
    #[must_use]
    pub fn flag(&self, name: &str) -> bool {
        self.0.get(name).and_then(Value::as_bool).unwrap_or(false)
    }

    /// The underlying map.
    #[must_use]
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}
