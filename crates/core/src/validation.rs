//! Declarative request validation with field-level error messages.
//!
//! A [`Schema`] is a static table of field paths and the [`Rule`]s each
//! must satisfy. Validation runs over the raw JSON body before it is
//! deserialized, so a wrong type in one field is reported against that
//! field instead of failing the whole body.
//!
//! Paths use dots for nesting and `[]` to apply rules to every element
//! of an array: `items[].quantity` reports as `items[2].quantity`.
//!
//! ```rust
//! use backline_core::validation::{FieldSpec, Rule, Schema};
//! use serde_json::json;
//!
//! const SCHEMA: Schema = Schema::new(&[
//!     FieldSpec { path: "name", rules: &[Rule::Required, Rule::NonBlank] },
//!     FieldSpec { path: "email", rules: &[Rule::Required, Rule::Email] },
//! ]);
//!
//! let errors = SCHEMA.validate(&json!({"name": " "})).unwrap_err();
//! assert_eq!(errors.len(), 2);
//! assert_eq!(errors.iter().next().map(|e| e.field.as_str()), Some("name"));
//! ```

use serde::Serialize;
use serde_json::Value;

use crate::types::Email;

/// A single field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Concrete path of the field (e.g. `customer.email`, `items[0].quantity`).
    pub field: String,
    /// Human readable message.
    pub message: String,
}

/// A non-empty collection of field errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(transparent)]
#[error("validation failed for {} field(s)", .0.len())]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    /// Create an empty collection.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Errors with a single entry.
    #[must_use]
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.push(field, message);
        errors
    }

    /// Record an error.
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Whether no errors were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of errors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate over recorded errors.
    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// Whether any error was recorded against `field`.
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }

    /// `Ok(())` when empty, `Err(self)` otherwise.
    ///
    /// # Errors
    ///
    /// Returns `self` when at least one error was recorded.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

/// A constraint on a single field.
#[derive(Debug, Clone, Copy)]
pub enum Rule {
    /// Must be present and not `null`. All other rules skip absent fields.
    Required,
    /// Must be a string.
    String,
    /// Must be a string with non-whitespace content.
    NonBlank,
    /// Must be a string of at most this many characters.
    MaxLength(usize),
    /// Must be a structurally valid email address.
    Email,
    /// Must be an object.
    Object,
    /// Must be a non-empty array.
    NonEmptyArray,
    /// Must be an integer of at least 1.
    PositiveInteger,
    /// Must be a number or a numeric string that is not negative.
    NonNegativeAmount,
    /// Must be a boolean.
    Boolean,
    /// Must be one of the listed strings.
    OneOf(&'static [&'static str]),
}

impl Rule {
    /// Check a present, non-null value. Returns the failure message.
    fn check(self, value: &Value) -> Option<String> {
        match self {
            Self::Required => None,
            Self::String => (!value.is_string()).then(|| "must be a string".to_string()),
            Self::NonBlank => match value.as_str() {
                Some(s) if !s.trim().is_empty() => None,
                Some(_) => Some("cannot be blank".to_string()),
                None => Some("must be a string".to_string()),
            },
            Self::MaxLength(max) => match value.as_str() {
                Some(s) if s.chars().count() <= max => None,
                Some(_) => Some(format!("must be at most {max} characters")),
                None => Some("must be a string".to_string()),
            },
            Self::Email => match value.as_str() {
                Some(s) => Email::parse(s).err().map(|e| e.to_string()),
                None => Some("must be a string".to_string()),
            },
            Self::Object => (!value.is_object()).then(|| "must be an object".to_string()),
            Self::NonEmptyArray => match value.as_array() {
                Some(items) if !items.is_empty() => None,
                Some(_) => Some("must not be empty".to_string()),
                None => Some("must be an array".to_string()),
            },
            Self::PositiveInteger => match value.as_u64() {
                Some(n) if n >= 1 && u32::try_from(n).is_ok() => None,
                _ => Some("must be a positive integer".to_string()),
            },
            Self::NonNegativeAmount => {
                let amount = match value {
                    Value::Number(n) => n.as_f64(),
                    Value::String(s) => s.trim().parse::<f64>().ok(),
                    _ => None,
                };
                match amount {
                    Some(a) if a.is_finite() && a >= 0.0 => None,
                    _ => Some("must be a non-negative amount".to_string()),
                }
            }
            Self::Boolean => (!value.is_boolean()).then(|| "must be a boolean".to_string()),
            Self::OneOf(allowed) => match value.as_str() {
                Some(s) if allowed.contains(&s) => None,
                _ => Some(format!("must be one of: {}", allowed.join(", "))),
            },
        }
    }
}

/// Rules for one field path.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// Field path, see the module docs for the syntax.
    pub path: &'static str,
    /// Rules checked in order; the first failure is reported.
    pub rules: &'static [Rule],
}

impl FieldSpec {
    fn validate_into(&self, root: &Value, errors: &mut FieldErrors) {
        for (field, value) in resolve(root, self.path) {
            let value = value.filter(|v| !v.is_null());
            let Some(value) = value else {
                if self.rules.iter().any(|r| matches!(r, Rule::Required)) {
                    errors.push(field, "is required");
                }
                continue;
            };

            if let Some(message) = self.rules.iter().find_map(|rule| rule.check(value)) {
                errors.push(field, message);
            }
        }
    }
}

/// A declarative validation schema.
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    fields: &'static [FieldSpec],
}

impl Schema {
    /// Build a schema from a static field table.
    #[must_use]
    pub const fn new(fields: &'static [FieldSpec]) -> Self {
        Self { fields }
    }

    /// Validate a JSON value, collecting every failing field.
    ///
    /// # Errors
    ///
    /// Returns all field errors when at least one field fails.
    pub fn validate(&self, value: &Value) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if !value.is_object() {
            errors.push("body", "must be a JSON object");
            return Err(errors);
        }
        for field in self.fields {
            field.validate_into(value, &mut errors);
        }
        errors.into_result()
    }
}

/// Expand a path into the concrete fields it addresses.
///
/// Only the last segment can resolve to an absent value. Fields under an
/// absent parent and array segments with no array behind them expand to
/// nothing; the parent carries its own rules.
fn resolve<'a>(root: &'a Value, path: &str) -> Vec<(String, Option<&'a Value>)> {
    let mut current: Vec<(String, Option<&'a Value>)> = vec![(String::new(), Some(root))];

    for segment in path.split('.') {
        let (name, each) = segment
            .strip_suffix("[]")
            .map_or((segment, false), |name| (name, true));

        let mut next = Vec::new();
        for (prefix, value) in current {
            // Children of an absent field are not checked
            let Some(value) = value.filter(|v| !v.is_null()) else {
                continue;
            };
            let field = if prefix.is_empty() {
                name.to_string()
            } else {
                format!("{prefix}.{name}")
            };
            let child = value.get(name);

            if each {
                if let Some(items) = child.and_then(Value::as_array) {
                    for (index, item) in items.iter().enumerate() {
                        next.push((format!("{field}[{index}]"), Some(item)));
                    }
                }
            } else {
                next.push((field, child));
            }
        }
        current = next;
    }

    current
}
