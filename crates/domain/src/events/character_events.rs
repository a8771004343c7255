//! Character sheet mutation outcomes
//!
//! These enums communicate what happened when character state was modified,
//! allowing callers to log and respond without re-deriving the change.

use serde::{Deserialize, Serialize};

use crate::entities::CharacterSpell;

/// Outcome of a net hit point change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPointChange {
    /// Damage absorbed by temp HP first, the rest by current HP
    Damaged {
        absorbed_by_temp: u32,
        dealt: u32,
        current: u32,
    },
    /// Healing applied, capped at max
    Healed {
        amount: u32,
        current: u32,
        regained_consciousness: bool,
    },
    /// Current HP replaced with an absolute value
    Set {
        from: u32,
        to: u32,
        regained_consciousness: bool,
    },
    /// Zero-magnitude heal or damage
    Unchanged,
}

impl HitPointChange {
    /// Whether the change took the character from 0 to positive HP.
    pub fn regained_consciousness(&self) -> bool {
        matches!(
            self,
            Self::Healed {
                regained_consciousness: true,
                ..
            } | Self::Set {
                regained_consciousness: true,
                ..
            }
        )
    }
}

/// Outcome of granting temporary hit points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TempHpChange {
    Replaced { from: u32, to: u32 },
    Cleared { from: u32 },
    /// The existing value was higher or equal
    Kept { current: u32 },
}

/// How a single death save was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeathSaveResult {
    Success,
    Failure,
    CriticalSuccess,
    CriticalFailure,
    Damage,
    CriticalDamage,
}

impl DeathSaveResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
            Self::CriticalSuccess => "critical_success",
            Self::CriticalFailure => "critical_failure",
            Self::Damage => "damage",
            Self::CriticalDamage => "critical_damage",
        }
    }
}

/// Where the character stands after a death save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeathSaveOutcome {
    Dead,
    Stable,
    Pending,
}

impl DeathSaveOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dead => "dead",
            Self::Stable => "stable",
            Self::Pending => "pending",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeathSaveRecorded {
    pub result: DeathSaveResult,
    pub outcome: DeathSaveOutcome,
    pub successes: u8,
    pub failures: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExhaustionChange {
    pub from: u8,
    pub to: u8,
    /// True only when this change caused death
    pub died: bool,
}

/// Outcome of an explicit dead-flag write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeadFlagChange {
    Died,
    Resurrected,
    Unchanged { is_dead: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Revived {
    pub hit_points: u32,
    pub exhaustion_cleared: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitPointsGained {
    pub gained: u32,
    pub max: u32,
    pub current: u32,
}

/// Outcome of replacing base ability scores. `hit_point_adjustment` is the
/// CON modifier change times total level, 0 when CON's modifier held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AbilityScoresChanged {
    pub con_modifier_change: i32,
    pub hit_point_adjustment: i32,
    pub max: u32,
    pub current: u32,
}

/// Outcome of toggling attunement on one equipment row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttunementChange {
    Attuned { used: u32, max: u32 },
    Released { used: u32 },
    Unchanged { is_attuned: bool },
}

/// Counters added, rescaled and dropped while syncing from the catalog
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CounterSync {
    pub added: Vec<String>,
    pub updated: Vec<String>,
    pub removed: Vec<String>,
}

impl CounterSync {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.updated.is_empty() && self.removed.is_empty()
    }
}

/// Outcome of a prepare or unprepare request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpellPreparationChange {
    /// A known row became prepared, or a new row was prepared from the class list
    Prepared(CharacterSpell),
    AlreadyPrepared(CharacterSpell),
    /// A learned row went back to known
    Unprepared(CharacterSpell),
    /// A row prepared straight from the class list was dropped
    Removed(CharacterSpell),
    AlreadyUnprepared(CharacterSpell),
}

impl SpellPreparationChange {
    pub fn spell(&self) -> &CharacterSpell {
        match self {
            Self::Prepared(spell)
            | Self::AlreadyPrepared(spell)
            | Self::Unprepared(spell)
            | Self::Removed(spell)
            | Self::AlreadyUnprepared(spell) => spell,
        }
    }

    pub fn is_change(&self) -> bool {
        matches!(self, Self::Prepared(_) | Self::Unprepared(_) | Self::Removed(_))
    }
}
