//! Unified error types for the domain layer
//!
//! Every rule violation the engine can report is a variant here, so adapters
//! never have to match on message strings. `code()` gives the stable
//! machine-checkable identifier that ends up in the wire error envelope.

use thiserror::Error;

use crate::value_objects::AmountParseError;

/// Unified error type for domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Validation failed (e.g., invalid field values)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A single input field was rejected
    #[error("Invalid {field}: {message}")]
    InvalidField { field: String, message: String },

    /// Entity not found
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Business rule violation
    #[error("Constraint violation: {0}")]
    Constraint(String),

    /// Parse error (for value objects)
    #[error("Parse error: {0}")]
    Parse(String),

    /// State transition not allowed
    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),

    /// Not enough total value across all denominations (copper units)
    #[error("Insufficient funds: requires {required} cp, {available} cp available")]
    InsufficientFunds { required: u64, available: u64 },

    /// All attunement slots are in use
    #[error("Attunement slots full: {current}/{max} items attuned")]
    AttunementSlotsFull { current: u32, max: u32 },

    /// The item does not require attunement
    #[error("Item does not require attunement: {0}")]
    NotAttunable(String),

    #[error("Cantrips cannot be prepared: {0}")]
    CannotPrepareCantrip(String),

    #[error("Cantrips are always prepared and cannot be unprepared: {0}")]
    CannotUnprepareCantrip(String),

    #[error("Always-prepared spells cannot be unprepared: {0}")]
    CannotUnprepareAlwaysPrepared(String),

    #[error("Spell is not known: {0}")]
    SpellNotKnown(String),

    #[error("Spell level {spell_level} exceeds the maximum castable level {max_level}")]
    SpellLevelTooHigh { spell_level: u8, max_level: u8 },

    #[error("Preparation limit reached: {limit} spells already prepared")]
    PreparationLimitReached { limit: u32 },
}

impl DomainError {
    /// Creates a validation error for business rule violations.
    ///
    /// # Example
    /// ```ignore
    /// if name.is_empty() {
    ///     return Err(DomainError::validation("Character name cannot be empty"));
    /// }
    /// ```
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Creates a validation error attributed to one input field.
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Create a constraint violation error
    pub fn constraint(msg: impl Into<String>) -> Self {
        Self::Constraint(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create an invalid state transition error
    pub fn invalid_state_transition(msg: impl Into<String>) -> Self {
        Self::InvalidStateTransition(msg.into())
    }

    pub fn insufficient_funds(required: u64, available: u64) -> Self {
        Self::InsufficientFunds {
            required,
            available,
        }
    }

    pub fn attunement_slots_full(current: u32, max: u32) -> Self {
        Self::AttunementSlotsFull { current, max }
    }

    /// Stable machine-checkable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) | Self::InvalidField { .. } | Self::Parse(_) => "validation_failed",
            Self::NotFound { .. } => "not_found",
            Self::Constraint(_) => "constraint_violation",
            Self::InvalidStateTransition(_) => "invalid_state_transition",
            Self::InsufficientFunds { .. } => "insufficient_funds",
            Self::AttunementSlotsFull { .. } => "attunement_slots_full",
            Self::NotAttunable(_) => "not_attunable",
            Self::CannotPrepareCantrip(_) => "cannot_prepare_cantrip",
            Self::CannotUnprepareCantrip(_) => "cannot_unprepare_cantrip",
            Self::CannotUnprepareAlwaysPrepared(_) => "cannot_unprepare_always_prepared",
            Self::SpellNotKnown(_) => "spell_not_known",
            Self::SpellLevelTooHigh { .. } => "spell_level_too_high",
            Self::PreparationLimitReached { .. } => "preparation_limit_reached",
        }
    }

    /// True for errors caused by malformed input rather than game rules.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::InvalidField { .. } | Self::Parse(_)
        )
    }

    /// The input field this error belongs to, when it has one.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::InvalidField { field, .. } => Some(field),
            _ => None,
        }
    }
}

impl From<AmountParseError> for DomainError {
    fn from(err: AmountParseError) -> Self {
        Self::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error() {
        let err = DomainError::validation("name cannot be empty");
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(err.to_string(), "Validation failed: name cannot be empty");
        assert!(err.is_validation());
    }

    #[test]
    fn test_invalid_field_error_keeps_field() {
        let err = DomainError::invalid_field("hp", "must be a signed integer");
        assert_eq!(err.field(), Some("hp"));
        assert_eq!(err.to_string(), "Invalid hp: must be a signed integer");
        assert_eq!(err.code(), "validation_failed");
    }

    #[test]
    fn test_not_found_error() {
        let err = DomainError::not_found("Character", "123e4567-e89b-12d3-a456-426614174000");
        assert!(matches!(err, DomainError::NotFound { .. }));
        assert!(err.to_string().contains("Character"));
        assert!(err.to_string().contains("123e4567"));
        assert!(!err.is_validation());
    }

    #[test]
    fn test_insufficient_funds_error() {
        let err = DomainError::insufficient_funds(150, 100);
        assert_eq!(err.code(), "insufficient_funds");
        assert_eq!(
            err.to_string(),
            "Insufficient funds: requires 150 cp, 100 cp available"
        );
    }

    #[test]
    fn test_attunement_slots_full_error() {
        let err = DomainError::attunement_slots_full(3, 3);
        assert_eq!(err.code(), "attunement_slots_full");
        assert_eq!(err.to_string(), "Attunement slots full: 3/3 items attuned");
    }

    #[test]
    fn test_from_amount_parse_error() {
        let domain_err: DomainError = AmountParseError::Empty.into();
        assert!(matches!(domain_err, DomainError::Parse(_)));
        assert!(domain_err.is_validation());
    }
}
