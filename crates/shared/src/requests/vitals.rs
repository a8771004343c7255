//! Hit points, death saves, exhaustion and resurrection.

use charsheet_domain::rules::DeathSaveInput;
use charsheet_domain::{DomainError, SignedAmount};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{parse_signed_amount, to_u32, validate_signed_amount, CharacterRequest};

// =============================================================================
// Hit Points
// =============================================================================

/// `{hp?: "+5" | "-5" | "5", temp_hp?: int >= 0}`. An empty body is a no-op.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ApplyHitPointsRequest {
    #[serde(default)]
    #[validate(custom(function = "validate_signed_amount"))]
    pub hp: Option<String>,
    #[serde(default)]
    #[validate(range(min = 0i64, max = 4294967295i64, message = "must be between 0 and 4294967295"))]
    pub temp_hp: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HitPointsInput {
    pub hp: Option<SignedAmount>,
    pub temp_hp: Option<u32>,
}

impl CharacterRequest for ApplyHitPointsRequest {
    type Input = HitPointsInput;

    fn into_input(self) -> Result<HitPointsInput, DomainError> {
        let hp = self
            .hp
            .as_deref()
            .map(|value| parse_signed_amount("hp", value))
            .transpose()?;
        Ok(HitPointsInput {
            hp,
            temp_hp: self.temp_hp.map(|v| to_u32("temp_hp", v)).transpose()?,
        })
    }
}

// =============================================================================
// Death Saves
// =============================================================================

/// Direct increment without a roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeathSaveMark {
    Success,
    Failure,
}

/// `{roll: 1-20} | {damage: int, is_critical?: bool} | {result: "success"|"failure"}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct RecordDeathSaveRequest {
    #[serde(default)]
    #[validate(range(min = 1, max = 20, message = "must be between 1 and 20"))]
    pub roll: Option<i64>,
    #[serde(default)]
    #[validate(range(min = 0, message = "must be a non-negative integer"))]
    pub damage: Option<i64>,
    #[serde(default)]
    pub is_critical: Option<bool>,
    #[serde(default)]
    pub result: Option<DeathSaveMark>,
}

impl CharacterRequest for RecordDeathSaveRequest {
    type Input = DeathSaveInput;

    fn into_input(self) -> Result<DeathSaveInput, DomainError> {
        match (self.roll, self.damage, self.result) {
            (Some(roll), None, None) => DeathSaveInput::roll(roll),
            (None, Some(_), None) => Ok(DeathSaveInput::Damage {
                critical: self.is_critical.unwrap_or(false),
            }),
            (None, None, Some(DeathSaveMark::Success)) => Ok(DeathSaveInput::Success),
            (None, None, Some(DeathSaveMark::Failure)) => Ok(DeathSaveInput::Failure),
            _ => Err(DomainError::invalid_field(
                "roll",
                "Provide exactly one of roll, damage or result.",
            )),
        }
    }
}

// =============================================================================
// Exhaustion and Death Flag
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct SetExhaustionRequest {
    #[validate(range(min = 0, max = 6, message = "must be between 0 and 6"))]
    pub level: i64,
}

impl CharacterRequest for SetExhaustionRequest {
    type Input = u8;

    fn into_input(self) -> Result<u8, DomainError> {
        u8::try_from(self.level)
            .map_err(|_| DomainError::invalid_field("level", "must be between 0 and 6"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct SetDeadRequest {
    pub is_dead: bool,
}

impl CharacterRequest for SetDeadRequest {
    type Input = bool;

    fn into_input(self) -> Result<bool, DomainError> {
        Ok(self.is_dead)
    }
}

/// `{hit_points?: int >= 1, clear_exhaustion?: bool}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ReviveRequest {
    #[serde(default)]
    #[validate(range(min = 1i64, max = 4294967295i64, message = "must be between 1 and 4294967295"))]
    pub hit_points: Option<i64>,
    #[serde(default)]
    pub clear_exhaustion: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviveInput {
    pub hit_points: Option<u32>,
    pub clear_exhaustion: bool,
}

impl CharacterRequest for ReviveRequest {
    type Input = ReviveInput;

    fn into_input(self) -> Result<ReviveInput, DomainError> {
        Ok(ReviveInput {
            hit_points: self.hit_points.map(|v| to_u32("hit_points", v)).transpose()?,
            clear_exhaustion: self.clear_exhaustion.unwrap_or(true),
        })
    }
}

// =============================================================================
// Level-up Hit Points
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HitPointMethod {
    Average,
    Roll,
}

/// `{class: slug, method: "average"|"roll", roll?: int}`. A `roll` method
/// without a value lets the engine roll the hit die.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct LevelUpHitPointsRequest {
    #[validate(length(min = 1, message = "is required"))]
    pub class: String,
    pub method: HitPointMethod,
    #[serde(default)]
    #[validate(range(min = 1i64, max = 4294967295i64, message = "must be between 1 and 4294967295"))]
    pub roll: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelUpHitPointsInput {
    pub class: String,
    pub method: HitPointMethod,
    /// Only meaningful for [`HitPointMethod::Roll`]
    pub roll: Option<u32>,
}

impl CharacterRequest for LevelUpHitPointsRequest {
    type Input = LevelUpHitPointsInput;

    fn into_input(self) -> Result<LevelUpHitPointsInput, DomainError> {
        Ok(LevelUpHitPointsInput {
            class: self.class.trim().to_string(),
            method: self.method,
            roll: match self.method {
                HitPointMethod::Roll => self.roll.map(|v| to_u32("roll", v)).transpose()?,
                HitPointMethod::Average => None,
            },
        })
    }
}
