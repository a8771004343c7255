//! Rule resolvers - pure functions from (character data, catalog) to numbers.
//!
//! Nothing in this module touches storage or the clock. The aggregate calls
//! into these for its mutations and [`derive_stats`] composes them for reads.

mod abilities;
mod attunement;
mod bonuses;
mod combat;
mod counters;
mod currency;
mod derived;
mod hit_points;
mod proficiency;
mod spell_slots;
mod spellcasting;

pub use abilities::{resolve_ability_scores, ResolvedAbilities};
pub use attunement::{
    attuned_count, can_attune, max_attunement_slots, AttunementSummary, DEFAULT_ATTUNEMENT_SLOTS,
};
pub use bonuses::{active_sources, SheetBonuses};
pub use combat::{
    armor_base, armor_class, saving_throws, shield_bonus, skill_bonus, skills,
    spellcasting_by_class, weapon_ability, weapon_stats, CombatContext, SavingThrow, SkillBonus,
    SpellcastingStats, WeaponStats,
};
pub use counters::{find_counter, granted_counters, sync_counters};
pub use currency::{apply_deltas, parse_deltas};
pub use derived::{
    derive_stats, AbilityScoreStat, CounterSummary, DerivedStats, EquipmentStats, HitDice,
    HitPointSummary, ItemCombatStats,
};
pub use hit_points::{
    hit_point_gain, starting_hit_points, DeathSaveInput, DeathSaveStep, DeathSaves,
    HitPointGainMethod, HitPoints, EXHAUSTION_DEATH_WARNING, MAX_DEATH_SAVES,
    MAX_EXHAUSTION_LEVEL,
};
pub use proficiency::{
    effective_proficiencies, find_skill_proficiency, find_weapon_proficiency, has_saving_throw,
    proficiency_bonus, saving_throw_slug,
};
pub use spell_slots::spell_slots;
pub use spellcasting::{
    preparation_limit, prepare_spell, prepared_count, unprepare_spell, PreparationContext,
};
