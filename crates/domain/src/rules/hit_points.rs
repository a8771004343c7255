//! Hit point state, death saves and hit point progression.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::events::{DeathSaveOutcome, DeathSaveResult, HitPointChange, TempHpChange};
use crate::value_objects::SignedAmount;

pub const MAX_DEATH_SAVES: u8 = 3;
pub const MAX_EXHAUSTION_LEVEL: u8 = 6;
pub const EXHAUSTION_DEATH_WARNING: &str = "Level 6 exhaustion results in death";

/// Current, maximum and temporary hit points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HitPoints {
    pub current: u32,
    pub max: u32,
    pub temp: u32,
}

impl HitPoints {
    pub fn new(current: u32, max: u32) -> Self {
        Self {
            current: current.min(max),
            max,
            temp: 0,
        }
    }

    /// Apply a parsed `hp` field: `+N` heals, `-N` damages, `N` sets.
    pub fn apply(&mut self, change: SignedAmount) -> HitPointChange {
        let amount = clamp_u32(change.magnitude());
        match change {
            SignedAmount::Add(_) => self.heal(amount),
            SignedAmount::Subtract(_) => self.damage(amount),
            SignedAmount::Set(_) => self.set_current(amount),
        }
    }

    /// Temp HP absorbs first; the overflow hits current HP, floored at 0.
    pub fn damage(&mut self, amount: u32) -> HitPointChange {
        if amount == 0 {
            return HitPointChange::Unchanged;
        }
        let absorbed_by_temp = amount.min(self.temp);
        self.temp -= absorbed_by_temp;
        let dealt = (amount - absorbed_by_temp).min(self.current);
        self.current -= dealt;
        HitPointChange::Damaged {
            absorbed_by_temp,
            dealt,
            current: self.current,
        }
    }

    pub fn heal(&mut self, amount: u32) -> HitPointChange {
        if amount == 0 {
            return HitPointChange::Unchanged;
        }
        let before = self.current;
        self.current = self.current.saturating_add(amount).min(self.max);
        HitPointChange::Healed {
            amount: self.current - before,
            current: self.current,
            regained_consciousness: before == 0 && self.current > 0,
        }
    }

    pub fn set_current(&mut self, value: u32) -> HitPointChange {
        let from = self.current;
        self.current = value.min(self.max);
        HitPointChange::Set {
            from,
            to: self.current,
            regained_consciousness: from == 0 && self.current > 0,
        }
    }

    /// Higher wins; 0 clears.
    pub fn grant_temp(&mut self, value: u32) -> TempHpChange {
        let from = self.temp;
        if value == 0 {
            self.temp = 0;
            return TempHpChange::Cleared { from };
        }
        if value > from {
            self.temp = value;
            TempHpChange::Replaced { from, to: value }
        } else {
            TempHpChange::Kept { current: from }
        }
    }

    /// Raise both max and current HP.
    pub fn gain_max(&mut self, amount: u32) {
        self.max = self.max.saturating_add(amount);
        self.current = self.current.saturating_add(amount).min(self.max);
    }

    /// Shift max HP by `adjustment` after a CON modifier change, keeping max
    /// at 1 or more. A gain also raises current HP. A loss only caps current
    /// HP at the new max and keeps a conscious character on at least 1, so
    /// a character at 0 stays at 0.
    pub fn adjust_for_con_change(&mut self, adjustment: i32) {
        if adjustment == 0 || self.max == 0 {
            return;
        }
        let max = (i64::from(self.max) + i64::from(adjustment)).clamp(1, i64::from(u32::MAX));
        self.max = max as u32;
        if adjustment > 0 {
            self.current = self.current.saturating_add(adjustment.unsigned_abs()).min(self.max);
        } else if self.current > 0 {
            self.current = self.current.min(self.max).max(1);
        }
    }
}

fn clamp_u32(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

/// What a death save request reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeathSaveInput {
    /// A d20 roll, 1 through 20
    Roll(u8),
    /// Damage taken while at 0 HP; a critical hit counts twice
    Damage { critical: bool },
    Success,
    Failure,
}

impl DeathSaveInput {
    pub fn roll(value: i64) -> Result<Self, DomainError> {
        match u8::try_from(value) {
            Ok(roll @ 1..=20) => Ok(Self::Roll(roll)),
            _ => Err(DomainError::invalid_field("roll", "must be between 1 and 20")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeathSaves {
    pub successes: u8,
    pub failures: u8,
}

/// What the tracker decided; the aggregate applies HP and the dead flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeathSaveStep {
    pub result: DeathSaveResult,
    pub outcome: DeathSaveOutcome,
    /// Set when the character is back on 1 HP with counters cleared
    pub restores_one_hp: bool,
}

impl DeathSaves {
    #[inline]
    pub fn is_clear(&self) -> bool {
        self.successes == 0 && self.failures == 0
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Counters stay within 0..=3.
    pub fn record(&mut self, input: DeathSaveInput) -> DeathSaveStep {
        let (result, successes, failures) = match input {
            DeathSaveInput::Roll(20) => {
                self.reset();
                return DeathSaveStep {
                    result: DeathSaveResult::CriticalSuccess,
                    outcome: DeathSaveOutcome::Stable,
                    restores_one_hp: true,
                };
            }
            DeathSaveInput::Roll(1) => (DeathSaveResult::CriticalFailure, 0, 2),
            DeathSaveInput::Roll(roll) if roll >= 10 => (DeathSaveResult::Success, 1, 0),
            DeathSaveInput::Roll(_) => (DeathSaveResult::Failure, 0, 1),
            DeathSaveInput::Damage { critical: true } => (DeathSaveResult::CriticalDamage, 0, 2),
            DeathSaveInput::Damage { critical: false } => (DeathSaveResult::Damage, 0, 1),
            DeathSaveInput::Success => (DeathSaveResult::Success, 1, 0),
            DeathSaveInput::Failure => (DeathSaveResult::Failure, 0, 1),
        };

        self.successes = (self.successes + successes).min(MAX_DEATH_SAVES);
        self.failures = (self.failures + failures).min(MAX_DEATH_SAVES);

        if self.failures >= MAX_DEATH_SAVES {
            return DeathSaveStep {
                result,
                outcome: DeathSaveOutcome::Dead,
                restores_one_hp: false,
            };
        }
        if self.successes >= MAX_DEATH_SAVES {
            self.reset();
            return DeathSaveStep {
                result,
                outcome: DeathSaveOutcome::Stable,
                restores_one_hp: true,
            };
        }
        DeathSaveStep {
            result,
            outcome: DeathSaveOutcome::Pending,
            restores_one_hp: false,
        }
    }
}

// =============================================================================
// Progression
// =============================================================================

/// How hit points are gained on level-up. A `Rolled` value has already been
/// rolled (by the player or the engine's random source).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPointGainMethod {
    Average,
    Rolled(u32),
}

/// Level 1 maximum: the full hit die plus CON, never below 1.
pub fn starting_hit_points(hit_die: u8, con_modifier: i32) -> u32 {
    (i32::from(hit_die) + con_modifier).max(1) as u32
}

/// Hit points gained for one level in a class.
///
/// The die result plus CON is floored at 1, then `hit_points_per_level`
/// bonuses (Hill Dwarf toughness, the Tough feat) are added on top.
pub fn hit_point_gain(
    hit_die: u8,
    con_modifier: i32,
    method: HitPointGainMethod,
    per_level_bonus: i32,
) -> Result<u32, DomainError> {
    let die = u32::from(hit_die);
    let base = match method {
        HitPointGainMethod::Average => die / 2 + 1,
        HitPointGainMethod::Rolled(roll) if (1..=die).contains(&roll) => roll,
        HitPointGainMethod::Rolled(_) => {
            return Err(DomainError::invalid_field(
                "roll",
                format!("must be between 1 and {}", hit_die),
            ));
        }
    };
    let gain = (base as i32 + con_modifier).max(1) + per_level_bonus;
    Ok(gain.max(0) as u32)
}
