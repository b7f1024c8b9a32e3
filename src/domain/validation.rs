//! Declarative field constraints for form and request bodies.
//!
//! Each form type lists its constraints as a `&'static [FieldRule]` and exposes
//! its raw field values through [`FormSchema`]; [`validate`] checks any such
//! form and collects every failing field.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)+$")
        .expect("email pattern is valid")
});

/// Shape check applied after the length bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Email,
}

/// Constraints on a single named field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    pub field: &'static str,
    pub required: bool,
    pub min_len: Option<usize>,
    pub max_len: Option<usize>,
    pub kind: FieldKind,
}

impl FieldRule {
    pub const fn text(field: &'static str) -> Self {
        FieldRule {
            field,
            required: false,
            min_len: None,
            max_len: None,
            kind: FieldKind::Text,
        }
    }

    pub const fn email(field: &'static str) -> Self {
        FieldRule {
            kind: FieldKind::Email,
            ..FieldRule::text(field)
        }
    }

    pub const fn required(self) -> Self {
        FieldRule {
            required: true,
            ..self
        }
    }

    pub const fn min_len(self, min: usize) -> Self {
        FieldRule {
            min_len: Some(min),
            ..self
        }
    }

    pub const fn max_len(self, max: usize) -> Self {
        FieldRule {
            max_len: Some(max),
            ..self
        }
    }

    /// Check one value against this rule. Empty strings count as missing.
    pub fn check(&self, value: Option<&str>) -> Result<(), FieldError> {
        let value = value.map(str::trim).filter(|v| !v.is_empty());
        let Some(value) = value else {
            if self.required {
                return Err(self.error("This field is required."));
            }
            return Ok(());
        };

        let len = value.chars().count();
        if let Some(min) = self.min_len {
            if len < min {
                return Err(self.error(format!(
                    "Ensure this value has at least {} characters (it has {}).",
                    min, len
                )));
            }
        }
        if let Some(max) = self.max_len {
            if len > max {
                return Err(self.error(format!(
                    "Ensure this value has at most {} characters (it has {}).",
                    max, len
                )));
            }
        }
        if self.kind == FieldKind::Email && !EMAIL_RE.is_match(value) {
            return Err(self.error("Enter a valid email address."));
        }
        Ok(())
    }

    fn error(&self, message: impl Into<String>) -> FieldError {
        FieldError {
            field: self.field,
            message: message.into(),
        }
    }
}

/// A single failed constraint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Every constraint that failed for one form, in rule order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Error)]
#[error("{}", summarize(.0))]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    pub fn single(field: &'static str, message: impl Into<String>) -> Self {
        ValidationErrors(vec![FieldError {
            field,
            message: message.into(),
        }])
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn for_field(&self, field: &str) -> Option<&FieldError> {
        self.0.iter().find(|e| e.field == field)
    }

    /// All messages joined into one line, e.g. for an API error body.
    pub fn summary(&self) -> String {
        summarize(&self.0)
    }
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// A form whose fields are checked against a static rule set.
pub trait FormSchema {
    const RULES: &'static [FieldRule];

    /// Raw value of `field`, or `None` when the form has no such value.
    fn value(&self, field: &str) -> Option<&str>;
}

/// Validate `form` against its rules, collecting every failure.
pub fn validate<F: FormSchema>(form: &F) -> Result<(), ValidationErrors> {
    let errors: Vec<FieldError> = F::RULES
        .iter()
        .filter_map(|rule| rule.check(form.value(rule.field)).err())
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors(errors))
    }
}
