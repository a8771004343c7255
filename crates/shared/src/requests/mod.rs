//! Request bodies for character sheet operations.
//!
//! Every request derives [`Validate`] for field-level checks (ranges, sign
//! syntax) and implements [`CharacterRequest`] to become a domain input once
//! those checks pass. Checks that span fields ("exactly one of spent or
//! action") happen in `into_input` and are reported against a field.

mod abilities;
mod inventory;
mod resources;
mod vitals;

use std::borrow::Cow;

use charsheet_domain::{DomainError, SignedAmount};
use validator::{Validate, ValidationError};

pub use abilities::{AbilityScoresInput, SetAbilityScoresRequest};
pub use inventory::{ApplyCurrencyRequest, SetAttunementRequest};
pub use resources::{
    RestRequest, SpellPreparationInput, SpellPreparationRequest, UpdateCounterRequest,
};
pub use vitals::{
    ApplyHitPointsRequest, DeathSaveMark, HitPointMethod, HitPointsInput, LevelUpHitPointsInput,
    LevelUpHitPointsRequest, RecordDeathSaveRequest, ReviveInput, ReviveRequest, SetDeadRequest,
    SetExhaustionRequest,
};

/// A validated request body that converts into domain input.
pub trait CharacterRequest: Validate {
    type Input;

    /// Convert after [`Validate::validate`] has passed.
    fn into_input(self) -> Result<Self::Input, DomainError>;
}

/// `"+N"`, `"-N"` or `"N"` with a bounded magnitude.
pub(crate) fn validate_signed_amount(value: &str) -> Result<(), ValidationError> {
    SignedAmount::parse(value).map(|_| ()).map_err(|err| {
        ValidationError::new("signed_amount").with_message(Cow::Owned(err.to_string()))
    })
}

/// Parse a field already checked by [`validate_signed_amount`], attributing
/// any failure to `field`.
pub(crate) fn parse_signed_amount(field: &str, value: &str) -> Result<SignedAmount, DomainError> {
    SignedAmount::parse(value).map_err(|err| DomainError::invalid_field(field, err.to_string()))
}

/// Narrow a range-checked integer into `u32`. Out-of-range values are a
/// field error, never clamped.
pub(crate) fn to_u32(field: &str, value: i64) -> Result<u32, DomainError> {
    u32::try_from(value)
        .map_err(|_| DomainError::invalid_field(field, "must be between 0 and 4294967295"))
}
