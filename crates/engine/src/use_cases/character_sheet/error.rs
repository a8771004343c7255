//! Character sheet operation errors.

use charsheet_domain::{CharacterId, DomainError};
use charsheet_shared::{ErrorResponse, FieldErrors};
use validator::ValidationErrors;

use crate::infrastructure::ports::RepoError;

/// Errors that can occur during character sheet operations.
///
/// Not-found cases for sub-records get their own variants so callers can
/// answer 404 without matching on the domain error's entity type.
#[derive(Debug, thiserror::Error)]
pub enum CharacterSheetError {
    #[error("Character not found: {0}")]
    CharacterNotFound(CharacterId),

    #[error("Equipment not found: {0}")]
    EquipmentNotFound(String),

    #[error("Counter not found: {0}")]
    CounterNotFound(String),

    #[error("Spell not found: {0}")]
    SpellNotFound(String),

    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    #[error("Domain error: {0}")]
    Domain(DomainError),

    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

impl CharacterSheetError {
    /// Machine code for logs and the wire envelope.
    pub fn code(&self) -> &'static str {
        match self {
            Self::CharacterNotFound(_)
            | Self::EquipmentNotFound(_)
            | Self::CounterNotFound(_)
            | Self::SpellNotFound(_) => ErrorResponse::NOT_FOUND,
            Self::Validation(_) => ErrorResponse::VALIDATION_FAILED,
            Self::Domain(err) => err.code(),
            Self::Repo(_) => ErrorResponse::INTERNAL_ERROR,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.code() == ErrorResponse::NOT_FOUND
    }
}

impl From<DomainError> for CharacterSheetError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::InvalidField { field, message } => {
                Self::Validation(FieldErrors::single(field, message))
            }
            DomainError::NotFound {
                entity_type: "equipment",
                id,
            } => Self::EquipmentNotFound(id),
            DomainError::NotFound {
                entity_type: "counter",
                id,
            } => Self::CounterNotFound(id),
            DomainError::NotFound {
                entity_type: "spell",
                id,
            } => Self::SpellNotFound(id),
            other => Self::Domain(other),
        }
    }
}

impl From<ValidationErrors> for CharacterSheetError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(FieldErrors::from(errors))
    }
}

impl From<&CharacterSheetError> for ErrorResponse {
    fn from(err: &CharacterSheetError) -> Self {
        match err {
            CharacterSheetError::CharacterNotFound(_)
            | CharacterSheetError::EquipmentNotFound(_)
            | CharacterSheetError::CounterNotFound(_)
            | CharacterSheetError::SpellNotFound(_) => ErrorResponse::not_found(err.to_string()),
            CharacterSheetError::Validation(errors) => ErrorResponse::validation(errors.clone()),
            CharacterSheetError::Domain(domain) => ErrorResponse::from(domain),
            CharacterSheetError::Repo(_) => ErrorResponse::internal(),
        }
    }
}
