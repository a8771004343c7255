//! Class resource counters, rests and spell preparation.

use charsheet_domain::{CounterAction, CounterUpdate, DomainError, RestKind};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{to_u32, CharacterRequest};

/// `{spent: int >= 0}` or `{action: "use"|"restore"|"reset"}`, never both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct UpdateCounterRequest {
    #[serde(default)]
    #[validate(range(min = 0i64, max = 4294967295i64, message = "must be between 0 and 4294967295"))]
    pub spent: Option<i64>,
    #[serde(default)]
    pub action: Option<CounterAction>,
}

impl CharacterRequest for UpdateCounterRequest {
    type Input = CounterUpdate;

    fn into_input(self) -> Result<CounterUpdate, DomainError> {
        match (self.spent, self.action) {
            (Some(spent), None) => Ok(CounterUpdate::Spent(to_u32("spent", spent)?)),
            (None, Some(action)) => Ok(CounterUpdate::Action(action)),
            (Some(_), Some(_)) => Err(DomainError::invalid_field(
                "spent",
                "Provide either spent or action, not both.",
            )),
            (None, None) => Err(DomainError::invalid_field(
                "spent",
                "Either spent or action is required.",
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct RestRequest {
    #[serde(rename = "type")]
    pub kind: RestKind,
}

impl CharacterRequest for RestRequest {
    type Input = RestKind;

    fn into_input(self) -> Result<RestKind, DomainError> {
        Ok(self.kind)
    }
}

/// `{spell: slug, class?: slug}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct SpellPreparationRequest {
    #[validate(length(min = 1, message = "is required"))]
    pub spell: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "cannot be empty"))]
    pub class: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpellPreparationInput {
    pub spell: String,
    pub class: Option<String>,
}

impl CharacterRequest for SpellPreparationRequest {
    type Input = SpellPreparationInput;

    fn into_input(self) -> Result<SpellPreparationInput, DomainError> {
        Ok(SpellPreparationInput {
            spell: self.spell.trim().to_string(),
            class: self.class.map(|c| c.trim().to_string()),
        })
    }
}
