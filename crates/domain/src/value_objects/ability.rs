//! Ability scores - the six core attributes and their derived modifiers.
//!
//! Provides type safety for ability references instead of magic strings like "STR", "DEX".

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;

/// The six ability scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Ability {
    /// Strength - physical power
    Str,
    /// Dexterity - agility and reflexes
    Dex,
    /// Constitution - endurance and health
    Con,
    /// Intelligence - reasoning and memory
    Int,
    /// Wisdom - perception and insight
    Wis,
    /// Charisma - force of personality
    Cha,
}

impl Ability {
    pub const ALL: [Ability; 6] = [
        Self::Str,
        Self::Dex,
        Self::Con,
        Self::Int,
        Self::Wis,
        Self::Cha,
    ];

    /// Returns the short uppercase string representation (e.g., "STR", "DEX").
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Str => "STR",
            Self::Dex => "DEX",
            Self::Con => "CON",
            Self::Int => "INT",
            Self::Wis => "WIS",
            Self::Cha => "CHA",
        }
    }

    /// Returns the full name of the ability (e.g., "Strength", "Dexterity").
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Str => "Strength",
            Self::Dex => "Dexterity",
            Self::Con => "Constitution",
            Self::Int => "Intelligence",
            Self::Wis => "Wisdom",
            Self::Cha => "Charisma",
        }
    }
}

impl fmt::Display for Ability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Ability {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "STR" | "STRENGTH" => Ok(Self::Str),
            "DEX" | "DEXTERITY" => Ok(Self::Dex),
            "CON" | "CONSTITUTION" => Ok(Self::Con),
            "INT" | "INTELLIGENCE" => Ok(Self::Int),
            "WIS" | "WISDOM" => Ok(Self::Wis),
            "CHA" | "CHARISMA" => Ok(Self::Cha),
            _ => Err(DomainError::parse(format!("Unknown ability: {}", s))),
        }
    }
}

/// Ability modifier for a score: `floor((score - 10) / 2)`.
///
/// Rounds toward negative infinity, so 8 gives -1 and 9 gives -1.
#[inline]
pub fn ability_modifier(score: i32) -> i32 {
    (score - 10).div_euclid(2)
}

/// How the base scores were generated at character-build time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbilityScoreMethod {
    #[default]
    Manual,
    StandardArray,
    PointBuy,
}

const STANDARD_ARRAY: [i32; 6] = [15, 14, 13, 12, 10, 8];
const POINT_BUY_BUDGET: i32 = 27;

/// A full set of six scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityScores {
    pub strength: i32,
    pub dexterity: i32,
    pub constitution: i32,
    pub intelligence: i32,
    pub wisdom: i32,
    pub charisma: i32,
}

impl Default for AbilityScores {
    fn default() -> Self {
        Self::uniform(10)
    }
}

impl AbilityScores {
    pub fn new(
        strength: i32,
        dexterity: i32,
        constitution: i32,
        intelligence: i32,
        wisdom: i32,
        charisma: i32,
    ) -> Self {
        Self {
            strength,
            dexterity,
            constitution,
            intelligence,
            wisdom,
            charisma,
        }
    }

    pub fn uniform(score: i32) -> Self {
        Self::new(score, score, score, score, score, score)
    }

    pub fn get(&self, ability: Ability) -> i32 {
        match ability {
            Ability::Str => self.strength,
            Ability::Dex => self.dexterity,
            Ability::Con => self.constitution,
            Ability::Int => self.intelligence,
            Ability::Wis => self.wisdom,
            Ability::Cha => self.charisma,
        }
    }

    fn slot_mut(&mut self, ability: Ability) -> &mut i32 {
        match ability {
            Ability::Str => &mut self.strength,
            Ability::Dex => &mut self.dexterity,
            Ability::Con => &mut self.constitution,
            Ability::Int => &mut self.intelligence,
            Ability::Wis => &mut self.wisdom,
            Ability::Cha => &mut self.charisma,
        }
    }

    pub fn set(&mut self, ability: Ability, score: i32) {
        *self.slot_mut(ability) = score;
    }

    pub fn add(&mut self, ability: Ability, bonus: i32) {
        *self.slot_mut(ability) += bonus;
    }

    pub fn with(mut self, ability: Ability, score: i32) -> Self {
        self.set(ability, score);
        self
    }

    pub fn modifier(&self, ability: Ability) -> i32 {
        ability_modifier(self.get(ability))
    }

    /// Check base scores against the generation method's bounds.
    pub fn validate_base(&self, method: AbilityScoreMethod) -> Result<(), DomainError> {
        match method {
            AbilityScoreMethod::Manual => {
                for ability in Ability::ALL {
                    let score = self.get(ability);
                    if !(3..=20).contains(&score) {
                        return Err(DomainError::invalid_field(
                            ability.display_name().to_lowercase(),
                            format!("must be between 3 and 20, got {}", score),
                        ));
                    }
                }
                Ok(())
            }
            AbilityScoreMethod::StandardArray => {
                let mut scores: Vec<i32> = Ability::ALL.iter().map(|a| self.get(*a)).collect();
                scores.sort_unstable_by(|a, b| b.cmp(a));
                if scores != STANDARD_ARRAY {
                    return Err(DomainError::validation(
                        "Standard array scores must be exactly 15, 14, 13, 12, 10, 8",
                    ));
                }
                Ok(())
            }
            AbilityScoreMethod::PointBuy => {
                let mut spent = 0;
                for ability in Ability::ALL {
                    let score = self.get(ability);
                    let cost = point_buy_cost(score).ok_or_else(|| {
                        DomainError::invalid_field(
                            ability.display_name().to_lowercase(),
                            format!("point buy scores must be between 8 and 15, got {}", score),
                        )
                    })?;
                    spent += cost;
                }
                if spent > POINT_BUY_BUDGET {
                    return Err(DomainError::validation(format!(
                        "Point buy total {} exceeds budget of {}",
                        spent, POINT_BUY_BUDGET
                    )));
                }
                Ok(())
            }
        }
    }
}

fn point_buy_cost(score: i32) -> Option<i32> {
    match score {
        8 => Some(0),
        9 => Some(1),
        10 => Some(2),
        11 => Some(3),
        12 => Some(4),
        13 => Some(5),
        14 => Some(7),
        15 => Some(9),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modifier_floors_toward_negative_infinity() {
        assert_eq!(ability_modifier(1), -5);
        assert_eq!(ability_modifier(7), -2);
        assert_eq!(ability_modifier(8), -1);
        assert_eq!(ability_modifier(9), -1);
        assert_eq!(ability_modifier(10), 0);
        assert_eq!(ability_modifier(11), 0);
        assert_eq!(ability_modifier(18), 4);
        assert_eq!(ability_modifier(20), 5);
        assert_eq!(ability_modifier(30), 10);
    }

    #[test]
    fn ability_from_str_accepts_short_and_long_names() {
        assert_eq!("str".parse::<Ability>(), Ok(Ability::Str));
        assert_eq!("Dexterity".parse::<Ability>(), Ok(Ability::Dex));
        assert!("luck".parse::<Ability>().is_err());
    }

    #[test]
    fn ability_serializes_as_short_code() {
        assert_eq!(serde_json::to_string(&Ability::Dex).unwrap(), "\"DEX\"");
    }

    #[test]
    fn add_accumulates_bonuses() {
        let mut scores = AbilityScores::uniform(10);
        scores.add(Ability::Con, 2);
        scores.add(Ability::Con, 1);
        assert_eq!(scores.get(Ability::Con), 13);
        assert_eq!(scores.modifier(Ability::Con), 1);
    }

    mod base_validation {
        use super::*;

        #[test]
        fn manual_rejects_out_of_range() {
            let scores = AbilityScores::uniform(10).with(Ability::Wis, 21);
            let err = scores.validate_base(AbilityScoreMethod::Manual).unwrap_err();
            assert_eq!(err.field(), Some("wisdom"));
        }

        #[test]
        fn standard_array_accepts_any_permutation() {
            let scores = AbilityScores::new(8, 15, 14, 10, 13, 12);
            assert!(scores
                .validate_base(AbilityScoreMethod::StandardArray)
                .is_ok());
        }

        #[test]
        fn standard_array_rejects_other_values() {
            let scores = AbilityScores::new(15, 15, 14, 10, 13, 12);
            assert!(scores
                .validate_base(AbilityScoreMethod::StandardArray)
                .is_err());
        }

        #[test]
        fn point_buy_enforces_budget() {
            // 9 + 9 + 9 = 27 is exactly the budget
            let ok = AbilityScores::new(15, 15, 15, 8, 8, 8);
            assert!(ok.validate_base(AbilityScoreMethod::PointBuy).is_ok());

            let over = AbilityScores::new(15, 15, 15, 9, 8, 8);
            assert!(over.validate_base(AbilityScoreMethod::PointBuy).is_err());
        }

        #[test]
        fn point_buy_rejects_scores_above_fifteen() {
            let scores = AbilityScores::new(16, 8, 8, 8, 8, 8);
            let err = scores.validate_base(AbilityScoreMethod::PointBuy).unwrap_err();
            assert_eq!(err.field(), Some("strength"));
        }
    }
}
