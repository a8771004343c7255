//! Error envelope returned for every rejected operation.

use std::collections::BTreeMap;
use std::fmt;

use charsheet_domain::DomainError;
use serde::{Deserialize, Serialize};
use validator::ValidationErrors;

// =============================================================================
// Field Errors
// =============================================================================

/// Messages keyed by the request field they belong to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

impl From<&ValidationErrors> for FieldErrors {
    fn from(errors: &ValidationErrors) -> Self {
        let mut out = Self::new();
        for (field, field_errors) in errors.field_errors() {
            for error in field_errors.iter() {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| error.code.to_string());
                out.add(field.to_string(), message);
            }
        }
        out
    }
}

impl From<ValidationErrors> for FieldErrors {
    fn from(errors: ValidationErrors) -> Self {
        Self::from(&errors)
    }
}

// =============================================================================
// Error Response
// =============================================================================

/// `{code, message, errors?}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Stable machine code such as `insufficient_funds`
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
}

impl ErrorResponse {
    pub const VALIDATION_FAILED: &'static str = "validation_failed";
    pub const NOT_FOUND: &'static str = "not_found";
    pub const INTERNAL_ERROR: &'static str = "internal_error";

    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            errors: None,
        }
    }

    pub fn validation(errors: FieldErrors) -> Self {
        Self {
            code: Self::VALIDATION_FAILED.to_string(),
            message: "The given data was invalid.".to_string(),
            errors: Some(errors),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(Self::NOT_FOUND, message)
    }

    /// Persistence and other unexpected failures. The message is generic so
    /// storage details never reach the caller.
    pub fn internal() -> Self {
        Self::new(Self::INTERNAL_ERROR, "An unexpected error occurred.")
    }
}

impl From<&DomainError> for ErrorResponse {
    fn from(err: &DomainError) -> Self {
        match err {
            DomainError::InvalidField { field, message } => {
                Self::validation(FieldErrors::single(field.as_str(), message.as_str()))
            }
            _ => Self::new(err.code(), err.to_string()),
        }
    }
}

impl From<DomainError> for ErrorResponse {
    fn from(err: DomainError) -> Self {
        Self::from(&err)
    }
}

impl From<ValidationErrors> for ErrorResponse {
    fn from(errors: ValidationErrors) -> Self {
        Self::validation(FieldErrors::from(&errors))
    }
}
