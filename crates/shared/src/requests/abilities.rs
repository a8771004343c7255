//! Base ability scores.

use charsheet_domain::{AbilityScoreMethod, AbilityScores, DomainError};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::CharacterRequest;

/// `{method?, strength, dexterity, constitution, intelligence, wisdom,
/// charisma}`. Without `method` the character keeps its current one; the
/// per-method limits (3-20, standard array, point buy) are checked by the
/// domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct SetAbilityScoresRequest {
    #[serde(default)]
    pub method: Option<AbilityScoreMethod>,
    #[validate(range(min = 1, max = 30, message = "must be between 1 and 30"))]
    pub strength: i64,
    #[validate(range(min = 1, max = 30, message = "must be between 1 and 30"))]
    pub dexterity: i64,
    #[validate(range(min = 1, max = 30, message = "must be between 1 and 30"))]
    pub constitution: i64,
    #[validate(range(min = 1, max = 30, message = "must be between 1 and 30"))]
    pub intelligence: i64,
    #[validate(range(min = 1, max = 30, message = "must be between 1 and 30"))]
    pub wisdom: i64,
    #[validate(range(min = 1, max = 30, message = "must be between 1 and 30"))]
    pub charisma: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AbilityScoresInput {
    pub method: Option<AbilityScoreMethod>,
    pub scores: AbilityScores,
}

impl CharacterRequest for SetAbilityScoresRequest {
    type Input = AbilityScoresInput;

    fn into_input(self) -> Result<AbilityScoresInput, DomainError> {
        let score = |field: &str, value: i64| {
            i32::try_from(value)
                .map_err(|_| DomainError::invalid_field(field, "must be between 1 and 30"))
        };
        Ok(AbilityScoresInput {
            method: self.method,
            scores: AbilityScores::new(
                score("strength", self.strength)?,
                score("dexterity", self.dexterity)?,
                score("constitution", self.constitution)?,
                score("intelligence", self.intelligence)?,
                score("wisdom", self.wisdom)?,
                score("charisma", self.charisma)?,
            ),
        })
    }
}
