//! The user record and its request-body counterpart.
//!
//! A [`User`] is what the store holds and what every read returns. A
//! [`UserInput`] is what clients send on create and update; it is loosely
//! typed so that form submissions (where every value is a string) are cast
//! the same way as proper JSON numbers.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::error::{Error, Result};

/// A stored user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Store-assigned identifier, immutable after creation.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Age, any finite number.
    pub age: Number,
    /// Phone number, kept as text.
    pub mobile: String,
}

impl User {
    /// Build a user from an identifier and validated fields.
    #[must_use]
    pub fn new(id: impl Into<String>, fields: UserFields) -> Self {
        Self {
            id: id.into(),
            name: fields.name,
            age: fields.age,
            mobile: fields.mobile,
        }
    }

    /// The mutable part of this record.
    #[must_use]
    pub fn fields(&self) -> UserFields {
        UserFields {
            name: self.name.clone(),
            age: self.age.clone(),
            mobile: self.mobile.clone(),
        }
    }
}

/// Validated, strongly typed user fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserFields {
    /// Display name, never empty.
    pub name: String,
    /// Age, any finite number.
    pub age: Number,
    /// Phone number, never empty.
    pub mobile: String,
}

impl UserFields {
    /// Convenience constructor.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        age: impl Into<Number>,
        mobile: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            age: age.into(),
            mobile: mobile.into(),
        }
    }
}

impl From<UserFields> for UserInput {
    fn from(fields: UserFields) -> Self {
        Self {
            name: Some(Value::String(fields.name)),
            age: Some(Value::Number(fields.age)),
            mobile: Some(Value::String(fields.mobile)),
        }
    }
}

/// An unvalidated create/update body.
///
/// Unknown keys (including any `id`) are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserInput {
    /// Requested name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<Value>,
    /// Requested age; a number or a numeric string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<Value>,
    /// Requested mobile number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile: Option<Value>,
}

impl UserInput {
    /// Cast and check every required field.
    ///
    /// All problems are reported at once, in field order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if any field is missing, empty or of the
    /// wrong type.
    pub fn validate(&self) -> Result<UserFields> {
        let mut problems = Vec::new();

        let name = cast_text("name", self.name.as_ref()).map_err(|p| problems.push(p));
        let age = cast_age(self.age.as_ref()).map_err(|p| problems.push(p));
        let mobile = cast_text("mobile", self.mobile.as_ref()).map_err(|p| problems.push(p));

        match (name, age, mobile) {
            (Ok(name), Ok(age), Ok(mobile)) => Ok(UserFields { name, age, mobile }),
            _ => Err(Error::validation(format!(
                "user validation failed: {}",
                problems.join(", ")
            ))),
        }
    }
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

fn cast_text(field: &str, value: Option<&Value>) -> std::result::Result<String, String> {
    match value {
        _ if is_blank(value) => Err(format!("{field} is required")),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(other) => Err(format!("{field} must be text, got {other}")),
        None => Err(format!("{field} is required")),
    }
}

fn cast_age(value: Option<&Value>) -> std::result::Result<Number, String> {
    if is_blank(value) {
        return Err("age is required".to_string());
    }
    let parsed = match value {
        Some(Value::Number(n)) => Some(normalize(n.clone())),
        Some(Value::String(s)) => parse_number(s.trim()),
        _ => None,
    };
    parsed.ok_or_else(|| {
        let shown = value.map_or_else(String::new, ToString::to_string);
        format!("age must be a number, got {shown}")
    })
}

fn parse_number(text: &str) -> Option<Number> {
    if let Ok(n) = text.parse::<i64>() {
        return Some(n.into());
    }
    if let Ok(n) = text.parse::<u64>() {
        return Some(n.into());
    }
    text.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(normalize)
}

/// Integral floats such as `30.0` are stored and echoed as integers.
#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
pub(crate) fn normalize(n: Number) -> Number {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 9.0e15 => Number::from(f as i64),
        _ => n,
    }
}
