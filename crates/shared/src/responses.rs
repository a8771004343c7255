//! Response bodies for character sheet operations.
//!
//! Key names are part of the wire contract. Optional keys are omitted when
//! absent, never serialized as `null`.

use charsheet_domain::rules::{
    CounterSummary, DerivedStats, EXHAUSTION_DEATH_WARNING, MAX_EXHAUSTION_LEVEL,
};
use charsheet_domain::{
    AbilityScoreMethod, AbilityScores, AbilityScoresChanged, Character, CharacterSpell,
    CurrencyHoldings, DeathSaveOutcome, DeathSaveRecorded, DeathSaveResult, EquipmentId,
    EquipmentRecord, HitPointsGained, SpellSource, SpellStatus,
};
use serde::{Deserialize, Serialize};

/// Counter rows use the same shape on reads and writes.
pub type CounterResponse = CounterSummary;

/// The full derived sheet.
pub type DerivedStatsResponse = DerivedStats;

// =============================================================================
// Hit Points and Death State
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitPointsResponse {
    pub current_hit_points: u32,
    pub max_hit_points: u32,
    pub temp_hit_points: u32,
    pub death_save_successes: u8,
    pub death_save_failures: u8,
}

impl From<&Character> for HitPointsResponse {
    fn from(character: &Character) -> Self {
        let hp = character.hit_points();
        let saves = character.death_saves();
        Self {
            current_hit_points: hp.current,
            max_hit_points: hp.max,
            temp_hit_points: hp.temp,
            death_save_successes: saves.successes,
            death_save_failures: saves.failures,
        }
    }
}

/// New base scores and where the CON change left hit points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityScoresResponse {
    pub ability_score_method: AbilityScoreMethod,
    pub ability_scores: AbilityScores,
    pub hit_point_adjustment: i32,
    #[serde(flatten)]
    pub hit_points: HitPointsResponse,
}

impl AbilityScoresResponse {
    pub fn new(character: &Character, changed: AbilityScoresChanged) -> Self {
        Self {
            ability_score_method: character.ability_score_method(),
            ability_scores: *character.base_abilities(),
            hit_point_adjustment: changed.hit_point_adjustment,
            hit_points: HitPointsResponse::from(character),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviveResponse {
    #[serde(flatten)]
    pub hit_points: HitPointsResponse,
    pub is_dead: bool,
}

impl From<&Character> for ReviveResponse {
    fn from(character: &Character) -> Self {
        Self {
            hit_points: HitPointsResponse::from(character),
            is_dead: character.is_dead(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeathSaveResponse {
    pub death_save_failures: u8,
    pub death_save_successes: u8,
    pub outcome: DeathSaveOutcome,
    pub result: DeathSaveResult,
}

impl From<DeathSaveRecorded> for DeathSaveResponse {
    fn from(recorded: DeathSaveRecorded) -> Self {
        Self {
            death_save_failures: recorded.failures,
            death_save_successes: recorded.successes,
            outcome: recorded.outcome,
            result: recorded.result,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExhaustionResponse {
    pub level: u8,
    pub is_dead: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exhaustion_warning: Option<String>,
}

impl From<&Character> for ExhaustionResponse {
    fn from(character: &Character) -> Self {
        let level = character.exhaustion_level();
        Self {
            level,
            is_dead: character.is_dead(),
            exhaustion_warning: (level >= MAX_EXHAUSTION_LEVEL)
                .then(|| EXHAUSTION_DEATH_WARNING.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeadFlagResponse {
    pub is_dead: bool,
    pub death_save_successes: u8,
    pub death_save_failures: u8,
}

impl From<&Character> for DeadFlagResponse {
    fn from(character: &Character) -> Self {
        let saves = character.death_saves();
        Self {
            is_dead: character.is_dead(),
            death_save_successes: saves.successes,
            death_save_failures: saves.failures,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelUpHitPointsResponse {
    pub hp_gained: u32,
    pub max_hit_points: u32,
    pub current_hit_points: u32,
}

impl From<HitPointsGained> for LevelUpHitPointsResponse {
    fn from(gained: HitPointsGained) -> Self {
        Self {
            hp_gained: gained.gained,
            max_hit_points: gained.max,
            current_hit_points: gained.current,
        }
    }
}

// =============================================================================
// Inventory
// =============================================================================

/// Always all five keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyResponse {
    pub pp: u64,
    pub gp: u64,
    pub ep: u64,
    pub sp: u64,
    pub cp: u64,
}

impl From<CurrencyHoldings> for CurrencyResponse {
    fn from(holdings: CurrencyHoldings) -> Self {
        Self {
            pp: holdings.pp,
            gp: holdings.gp,
            ep: holdings.ep,
            sp: holdings.sp,
            cp: holdings.cp,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentResponse {
    pub id: EquipmentId,
    pub item_slug: String,
    pub quantity: u64,
    pub equipped: bool,
    pub is_attuned: bool,
}

impl From<&EquipmentRecord> for EquipmentResponse {
    fn from(record: &EquipmentRecord) -> Self {
        Self {
            id: record.id,
            item_slug: record.item_slug.clone(),
            quantity: record.quantity,
            equipped: record.equipped,
            is_attuned: record.is_attuned,
        }
    }
}

// =============================================================================
// Resources and Spells
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestResponse {
    pub counters_reset: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellResponse {
    pub spell: String,
    pub class: String,
    pub status: SpellStatus,
    pub source: SpellSource,
}

impl From<&CharacterSpell> for SpellResponse {
    fn from(spell: &CharacterSpell) -> Self {
        Self {
            spell: spell.spell_slug.clone(),
            class: spell.class_slug.clone(),
            status: spell.status,
            source: spell.source,
        }
    }
}
