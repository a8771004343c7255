//! Character aggregate - the sheet the rules engine reads and mutates
//!
//! # Rustic DDD Design
//!
//! - **Private fields**: everything goes through accessors and mutation methods
//! - **Outcome enums**: mutations return what happened (`HitPointChange`,
//!   `DeathSaveRecorded`, ...) instead of bare booleans
//! - **Checked on load**: deserialization runs [`Character::validate`], so a
//!   stored snapshot that breaks an invariant never becomes an aggregate
//!
//! The read-only [`RuleCatalog`] is passed into every operation that needs
//! rule data; the aggregate never holds on to it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::catalog::RuleCatalog;
use crate::entities::{
    CharacterSpell, ClassAssignment, CounterUpdate, EquipmentRecord, GrantedProficiency,
    ResourceCounter, RestKind,
};
use crate::error::DomainError;
use crate::events::{
    AbilityScoresChanged, AttunementChange, CounterSync, DeadFlagChange, DeathSaveOutcome, DeathSaveRecorded,
    ExhaustionChange, HitPointChange, HitPointsGained, Revived, SpellPreparationChange,
    TempHpChange,
};
use crate::ids::{CharacterId, EquipmentId};
use crate::rules::{
    self, DeathSaveInput, DeathSaves, HitPointGainMethod, HitPoints, PreparationContext,
    ResolvedAbilities, SheetBonuses, MAX_DEATH_SAVES, MAX_EXHAUSTION_LEVEL,
};
use crate::value_objects::{
    Ability, AbilityScoreMethod, AbilityScores, CurrencyHoldings, Denomination, SignedAmount,
};

const MAX_NAME_LENGTH: usize = 200;
const MAX_CLASS_LEVEL: u8 = 20;

/// A player character sheet
///
/// # Invariants
///
/// - `name` is non-empty and at most 200 characters
/// - exactly one class assignment is primary whenever any class is assigned
/// - `current <= max` hit points, death save counters in `0..=3`,
///   exhaustion in `0..=6`
/// - `is_dead` implies three death save failures or exhaustion 6
///
/// # Example
///
/// ```
/// use chrono::Utc;
/// use charsheet_domain::aggregates::Character;
/// use charsheet_domain::value_objects::SignedAmount;
///
/// let mut character = Character::new("Tordek", Utc::now())
///     .unwrap()
///     .with_class("fighter", 1)
///     .with_hit_points(12, 12);
///
/// character.apply_hit_point_change(SignedAmount::parse("-5").unwrap());
/// assert_eq!(character.hit_points().current, 7);
/// assert_eq!(character.total_level(), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Character {
    // Identity
    id: CharacterId,
    name: String,

    // Build facts
    ability_score_method: AbilityScoreMethod,
    base_abilities: AbilityScores,
    race: Option<String>,
    background: Option<String>,
    classes: Vec<ClassAssignment>,
    feats: Vec<String>,
    conditions: Vec<String>,
    asi_choices_remaining: u8,
    armor_class_override: Option<i32>,

    // Hit point and death state
    hit_points: HitPoints,
    death_saves: DeathSaves,
    is_dead: bool,
    exhaustion_level: u8,

    // Owned sub-records
    proficiencies: Vec<GrantedProficiency>,
    equipment: Vec<EquipmentRecord>,
    counters: Vec<ResourceCounter>,
    spells: Vec<CharacterSpell>,

    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Character {
    // =========================================================================
    // Constructor
    // =========================================================================

    /// Create an empty level-0 sheet. The name is trimmed and must be
    /// non-empty.
    pub fn new(name: impl Into<String>, now: DateTime<Utc>) -> Result<Self, DomainError> {
        let name = validate_name(name.into())?;
        Ok(Self {
            id: CharacterId::new(),
            name,
            ability_score_method: AbilityScoreMethod::Manual,
            base_abilities: AbilityScores::default(),
            race: None,
            background: None,
            classes: Vec::new(),
            feats: Vec::new(),
            conditions: Vec::new(),
            asi_choices_remaining: 0,
            armor_class_override: None,
            hit_points: HitPoints::default(),
            death_saves: DeathSaves::default(),
            is_dead: false,
            exhaustion_level: 0,
            proficiencies: Vec::new(),
            equipment: Vec::new(),
            counters: Vec::new(),
            spells: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }

    // =========================================================================
    // Identity Accessors
    // =========================================================================

    #[inline]
    pub fn id(&self) -> CharacterId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[inline]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    // =========================================================================
    // Build Accessors
    // =========================================================================

    #[inline]
    pub fn ability_score_method(&self) -> AbilityScoreMethod {
        self.ability_score_method
    }

    #[inline]
    pub fn base_abilities(&self) -> &AbilityScores {
        &self.base_abilities
    }

    #[inline]
    pub fn race(&self) -> Option<&str> {
        self.race.as_deref()
    }

    #[inline]
    pub fn background(&self) -> Option<&str> {
        self.background.as_deref()
    }

    #[inline]
    pub fn classes(&self) -> &[ClassAssignment] {
        &self.classes
    }

    pub fn primary_class(&self) -> Option<&ClassAssignment> {
        self.classes.iter().find(|c| c.is_primary)
    }

    pub fn class_level(&self, class_slug: &str) -> Option<u8> {
        self.classes
            .iter()
            .find(|c| c.class == class_slug)
            .map(|c| c.level)
    }

    /// Sum of every class level.
    pub fn total_level(&self) -> u32 {
        self.classes.iter().map(|c| u32::from(c.level)).sum()
    }

    /// Feat slugs taken by the character.
    #[inline]
    pub fn feats(&self) -> &[String] {
        &self.feats
    }

    /// Slugs of conditions currently affecting the character.
    #[inline]
    pub fn conditions(&self) -> &[String] {
        &self.conditions
    }

    #[inline]
    pub fn asi_choices_remaining(&self) -> u8 {
        self.asi_choices_remaining
    }

    #[inline]
    pub fn armor_class_override(&self) -> Option<i32> {
        self.armor_class_override
    }

    // =========================================================================
    // Hit Point Accessors
    // =========================================================================

    #[inline]
    pub fn hit_points(&self) -> &HitPoints {
        &self.hit_points
    }

    #[inline]
    pub fn death_saves(&self) -> &DeathSaves {
        &self.death_saves
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.is_dead
    }

    #[inline]
    pub fn exhaustion_level(&self) -> u8 {
        self.exhaustion_level
    }

    // =========================================================================
    // Sub-record Accessors
    // =========================================================================

    #[inline]
    pub fn proficiencies(&self) -> &[GrantedProficiency] {
        &self.proficiencies
    }

    #[inline]
    pub fn equipment(&self) -> &[EquipmentRecord] {
        &self.equipment
    }

    pub fn equipment_record(&self, id: EquipmentId) -> Option<&EquipmentRecord> {
        self.equipment.iter().find(|e| e.id == id)
    }

    #[inline]
    pub fn counters(&self) -> &[ResourceCounter] {
        &self.counters
    }

    pub fn counter(&self, slug: &str) -> Option<&ResourceCounter> {
        rules::find_counter(&self.counters, slug)
    }

    #[inline]
    pub fn spells(&self) -> &[CharacterSpell] {
        &self.spells
    }

    /// Coin holdings read from the five currency item rows.
    pub fn currency(&self) -> CurrencyHoldings {
        let mut holdings = CurrencyHoldings::default();
        for record in &self.equipment {
            if let Some(denomination) = Denomination::from_item_slug(&record.item_slug) {
                holdings.set(
                    denomination,
                    holdings.get(denomination).saturating_add(record.quantity),
                );
            }
        }
        holdings
    }

    // =========================================================================
    // Rule Lookups
    // =========================================================================

    pub fn resolved_abilities(&self, catalog: &RuleCatalog) -> ResolvedAbilities {
        rules::resolve_ability_scores(&self.base_abilities, self.race(), catalog)
    }

    #[inline]
    pub fn proficiency_bonus(&self) -> i32 {
        rules::proficiency_bonus(self.total_level())
    }

    pub fn effective_proficiencies(&self, catalog: &RuleCatalog) -> Vec<GrantedProficiency> {
        rules::effective_proficiencies(
            &self.proficiencies,
            self.race(),
            &self.classes,
            &self.feats,
            catalog,
        )
    }

    pub fn max_attunement_slots(&self, catalog: &RuleCatalog, default_slots: u32) -> u32 {
        rules::max_attunement_slots(&self.classes, catalog, default_slots)
    }

    // =========================================================================
    // Builder Methods
    // =========================================================================

    pub fn with_id(mut self, id: CharacterId) -> Self {
        self.id = id;
        self
    }

    pub fn with_ability_scores(mut self, method: AbilityScoreMethod, scores: AbilityScores) -> Self {
        self.ability_score_method = method;
        self.base_abilities = scores;
        self
    }

    pub fn with_race(mut self, race: impl Into<String>) -> Self {
        self.race = Some(race.into());
        self
    }

    pub fn with_background(mut self, background: impl Into<String>) -> Self {
        self.background = Some(background.into());
        self
    }

    /// Add levels in a class. The first class added becomes the primary one.
    pub fn with_class(mut self, class: impl Into<String>, level: u8) -> Self {
        let mut assignment = ClassAssignment::new(class, level);
        assignment.is_primary = self.classes.is_empty();
        self.classes.push(assignment);
        self
    }

    /// Take a feat. Taking one twice changes nothing.
    pub fn with_feat(mut self, feat: impl Into<String>) -> Self {
        let feat = feat.into();
        if !self.feats.contains(&feat) {
            self.feats.push(feat);
        }
        self
    }

    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        let condition = condition.into();
        if !self.conditions.contains(&condition) {
            self.conditions.push(condition);
        }
        self
    }

    pub fn with_hit_points(mut self, current: u32, max: u32) -> Self {
        let temp = self.hit_points.temp;
        self.hit_points = HitPoints::new(current, max);
        self.hit_points.temp = temp;
        self
    }

    pub fn with_temp_hit_points(mut self, temp: u32) -> Self {
        self.hit_points.temp = temp;
        self
    }

    pub fn with_death_saves(mut self, successes: u8, failures: u8) -> Self {
        self.death_saves = DeathSaves {
            successes,
            failures,
        };
        self
    }

    pub fn with_proficiency(mut self, proficiency: GrantedProficiency) -> Self {
        self.proficiencies.push(proficiency);
        self
    }

    pub fn with_equipment(mut self, record: EquipmentRecord) -> Self {
        self.equipment.push(record);
        self
    }

    pub fn with_spell(mut self, spell: CharacterSpell) -> Self {
        self.spells.push(spell);
        self
    }

    pub fn with_counter(mut self, counter: ResourceCounter) -> Self {
        self.counters.push(counter);
        self
    }

    pub fn with_armor_class_override(mut self, armor_class: i32) -> Self {
        self.armor_class_override = Some(armor_class);
        self
    }

    pub fn with_asi_choices_remaining(mut self, choices: u8) -> Self {
        self.asi_choices_remaining = choices;
        self
    }

    // =========================================================================
    // Invariants
    // =========================================================================

    /// Check every cross-field invariant.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() || self.name.chars().count() > MAX_NAME_LENGTH {
            return Err(DomainError::invalid_field(
                "name",
                format!("must be 1 to {} characters", MAX_NAME_LENGTH),
            ));
        }

        self.base_abilities.validate_base(self.ability_score_method)?;

        if !self.classes.is_empty() {
            let primaries = self.classes.iter().filter(|c| c.is_primary).count();
            if primaries != 1 {
                return Err(DomainError::constraint(format!(
                    "Exactly one class must be primary, found {}",
                    primaries
                )));
            }
        }
        for (index, assignment) in self.classes.iter().enumerate() {
            if !(1..=MAX_CLASS_LEVEL).contains(&assignment.level) {
                return Err(DomainError::invalid_field(
                    "level",
                    format!("{} level must be between 1 and {}", assignment.class, MAX_CLASS_LEVEL),
                ));
            }
            if self.classes[..index].iter().any(|c| c.class == assignment.class) {
                return Err(DomainError::constraint(format!(
                    "Class assigned twice: {}",
                    assignment.class
                )));
            }
        }

        if self.hit_points.current > self.hit_points.max {
            return Err(DomainError::invalid_field(
                "current_hit_points",
                "cannot exceed max_hit_points",
            ));
        }
        if self.death_saves.successes > MAX_DEATH_SAVES || self.death_saves.failures > MAX_DEATH_SAVES
        {
            return Err(DomainError::validation("Death save counters must be between 0 and 3"));
        }
        if self.exhaustion_level > MAX_EXHAUSTION_LEVEL {
            return Err(DomainError::invalid_field("level", "must be between 0 and 6"));
        }
        if self.is_dead && !self.death_trigger_holds() {
            return Err(DomainError::constraint(
                "is_dead requires three death save failures or exhaustion level 6",
            ));
        }
        if let Some(counter) = self.counters.iter().find(|c| c.spent > c.max_uses) {
            return Err(DomainError::constraint(format!(
                "Counter {} has more spent uses than its maximum",
                counter.slug
            )));
        }
        Ok(())
    }

    fn death_trigger_holds(&self) -> bool {
        self.death_saves.failures >= MAX_DEATH_SAVES || self.exhaustion_level >= MAX_EXHAUSTION_LEVEL
    }

    // =========================================================================
    // Hit Points
    // =========================================================================

    /// Apply a net `hp` change. Going from 0 to positive HP clears the death
    /// save counters; it never clears `is_dead`.
    pub fn apply_hit_point_change(&mut self, change: SignedAmount) -> HitPointChange {
        let outcome = self.hit_points.apply(change);
        if outcome.regained_consciousness() {
            self.death_saves.reset();
        }
        outcome
    }

    pub fn grant_temp_hit_points(&mut self, value: u32) -> TempHpChange {
        self.hit_points.grant_temp(value)
    }

    /// Add one level's worth of hit points for a class the character has.
    pub fn gain_level_hit_points(
        &mut self,
        class_slug: &str,
        method: HitPointGainMethod,
        catalog: &RuleCatalog,
    ) -> Result<HitPointsGained, DomainError> {
        if self.class_level(class_slug).is_none() {
            return Err(DomainError::not_found("class", class_slug));
        }
        let class = catalog
            .class(class_slug)
            .ok_or_else(|| DomainError::not_found("class", class_slug))?;

        let con_modifier = self.resolved_abilities(catalog).modifier(Ability::Con);
        let per_level_bonus = SheetBonuses::for_character(self, catalog).hit_points_per_level;

        let gained = rules::hit_point_gain(class.hit_die, con_modifier, method, per_level_bonus)?;
        self.hit_points.gain_max(gained);

        Ok(HitPointsGained {
            gained,
            max: self.hit_points.max,
            current: self.hit_points.current,
        })
    }

    /// Replace the base ability scores.
    ///
    /// When the resolved CON modifier moves, max HP shifts by the change
    /// times total level (see [`HitPoints::adjust_for_con_change`]). Invalid
    /// scores leave the sheet untouched.
    pub fn set_ability_scores(
        &mut self,
        method: AbilityScoreMethod,
        scores: AbilityScores,
        catalog: &RuleCatalog,
    ) -> Result<AbilityScoresChanged, DomainError> {
        scores.validate_base(method)?;

        let old_modifier = self.resolved_abilities(catalog).modifier(Ability::Con);
        self.ability_score_method = method;
        self.base_abilities = scores;
        let new_modifier = self.resolved_abilities(catalog).modifier(Ability::Con);

        let con_modifier_change = new_modifier - old_modifier;
        let level = i32::try_from(self.total_level()).unwrap_or(i32::MAX);
        let hit_point_adjustment = con_modifier_change.saturating_mul(level);
        self.hit_points.adjust_for_con_change(hit_point_adjustment);

        Ok(AbilityScoresChanged {
            con_modifier_change,
            hit_point_adjustment,
            max: self.hit_points.max,
            current: self.hit_points.current,
        })
    }

    // =========================================================================
    // Death State
    // =========================================================================

    pub fn record_death_save(
        &mut self,
        input: DeathSaveInput,
    ) -> Result<DeathSaveRecorded, DomainError> {
        if self.is_dead {
            return Err(DomainError::invalid_state_transition(
                "Cannot record a death save for a dead character",
            ));
        }
        if self.hit_points.current > 0 {
            return Err(DomainError::invalid_state_transition(
                "Death saves are only made at 0 hit points",
            ));
        }

        let step = self.death_saves.record(input);
        match step.outcome {
            DeathSaveOutcome::Dead => self.is_dead = true,
            DeathSaveOutcome::Stable if step.restores_one_hp => {
                self.hit_points.set_current(1);
            }
            DeathSaveOutcome::Stable | DeathSaveOutcome::Pending => {}
        }

        Ok(DeathSaveRecorded {
            result: step.result,
            outcome: step.outcome,
            successes: self.death_saves.successes,
            failures: self.death_saves.failures,
        })
    }

    /// Zero both counters. A dead character has to be revived first, since
    /// the counters may be what keeps `is_dead` consistent.
    pub fn reset_death_saves(&mut self) -> Result<(), DomainError> {
        if self.is_dead {
            return Err(DomainError::invalid_state_transition(
                "Cannot reset death saves of a dead character",
            ));
        }
        self.death_saves.reset();
        Ok(())
    }

    /// Explicit dead flag. Clearing it always succeeds and keeps the counters;
    /// setting it needs a death trigger to hold.
    pub fn set_dead(&mut self, is_dead: bool) -> Result<DeadFlagChange, DomainError> {
        if is_dead == self.is_dead {
            return Ok(DeadFlagChange::Unchanged { is_dead });
        }
        if is_dead && !self.death_trigger_holds() {
            return Err(DomainError::invalid_state_transition(
                "A character can only be marked dead after three failed death saves or exhaustion level 6",
            ));
        }
        self.is_dead = is_dead;
        Ok(if is_dead {
            DeadFlagChange::Died
        } else {
            DeadFlagChange::Resurrected
        })
    }

    /// Set exhaustion. Level 6 kills. Lowering it never clears `is_dead`, so
    /// a character that died of exhaustion alone must be revived before the
    /// level can drop.
    pub fn set_exhaustion(&mut self, level: u8) -> Result<ExhaustionChange, DomainError> {
        if level > MAX_EXHAUSTION_LEVEL {
            return Err(DomainError::invalid_field("level", "must be between 0 and 6"));
        }
        if self.is_dead
            && level < MAX_EXHAUSTION_LEVEL
            && self.death_saves.failures < MAX_DEATH_SAVES
        {
            return Err(DomainError::invalid_state_transition(
                "Character died of exhaustion; revive before lowering exhaustion",
            ));
        }

        let from = self.exhaustion_level;
        self.exhaustion_level = level;
        let died = level == MAX_EXHAUSTION_LEVEL && !self.is_dead;
        if died {
            self.is_dead = true;
        }
        Ok(ExhaustionChange {
            from,
            to: level,
            died,
        })
    }

    pub fn revive(
        &mut self,
        hit_points: Option<u32>,
        clear_exhaustion: bool,
    ) -> Result<Revived, DomainError> {
        if !self.is_dead {
            return Err(DomainError::invalid_state_transition("Character is not dead"));
        }
        if hit_points == Some(0) {
            return Err(DomainError::invalid_field("hit_points", "must be at least 1"));
        }
        if !clear_exhaustion && self.exhaustion_level >= MAX_EXHAUSTION_LEVEL {
            return Err(DomainError::invalid_state_transition(
                "Cannot revive while exhaustion remains at level 6",
            ));
        }

        let exhaustion_cleared = clear_exhaustion && self.exhaustion_level > 0;
        if clear_exhaustion {
            self.exhaustion_level = 0;
        }
        self.hit_points.set_current(hit_points.unwrap_or(1));
        self.death_saves.reset();
        self.is_dead = false;

        Ok(Revived {
            hit_points: self.hit_points.current,
            exhaustion_cleared,
        })
    }

    // =========================================================================
    // Equipment
    // =========================================================================

    /// Toggle attunement on one equipment row. Equip state is untouched.
    pub fn set_attunement(
        &mut self,
        equipment_id: EquipmentId,
        attuned: bool,
        catalog: &RuleCatalog,
        default_slots: u32,
    ) -> Result<AttunementChange, DomainError> {
        let record = self
            .equipment_record(equipment_id)
            .ok_or_else(|| DomainError::not_found("equipment", equipment_id.to_string()))?;

        if record.is_attuned == attuned {
            return Ok(AttunementChange::Unchanged {
                is_attuned: attuned,
            });
        }

        if attuned {
            let item = catalog
                .item(&record.item_slug)
                .ok_or_else(|| DomainError::NotAttunable(record.item_slug.clone()))?;
            let max = self.max_attunement_slots(catalog, default_slots);
            rules::can_attune(&self.equipment, equipment_id, item, max)?;
            self.set_attuned_flag(equipment_id, true);
            Ok(AttunementChange::Attuned {
                used: rules::attuned_count(&self.equipment),
                max,
            })
        } else {
            self.set_attuned_flag(equipment_id, false);
            Ok(AttunementChange::Released {
                used: rules::attuned_count(&self.equipment),
            })
        }
    }

    fn set_attuned_flag(&mut self, equipment_id: EquipmentId, attuned: bool) {
        if let Some(record) = self.equipment.iter_mut().find(|e| e.id == equipment_id) {
            record.is_attuned = attuned;
        }
    }

    /// Apply signed currency deltas atomically and write the result back to
    /// the currency rows.
    pub fn apply_currency(
        &mut self,
        deltas: &[(Denomination, SignedAmount)],
    ) -> Result<CurrencyHoldings, DomainError> {
        let updated = rules::apply_deltas(&self.currency(), deltas)?;
        for denomination in Denomination::ALL {
            self.store_currency(denomination, updated.get(denomination));
        }
        Ok(updated)
    }

    /// One row per denomination: created on the first nonzero quantity,
    /// removed when it reaches zero.
    fn store_currency(&mut self, denomination: Denomination, quantity: u64) {
        let slug = denomination.item_slug();
        let mut seen = false;
        self.equipment.retain_mut(|record| {
            if record.item_slug != slug {
                return true;
            }
            if seen || quantity == 0 {
                return false;
            }
            seen = true;
            record.quantity = quantity;
            true
        });
        if !seen && quantity > 0 {
            self.equipment
                .push(EquipmentRecord::new(slug).with_quantity(quantity));
        }
    }

    // =========================================================================
    // Counters
    // =========================================================================

    pub fn sync_counters(&mut self, catalog: &RuleCatalog) -> CounterSync {
        rules::sync_counters(&mut self.counters, &self.classes, catalog)
    }

    pub fn update_counter(
        &mut self,
        slug: &str,
        update: CounterUpdate,
    ) -> Result<&ResourceCounter, DomainError> {
        let counter = self
            .counters
            .iter_mut()
            .find(|c| c.slug == slug)
            .ok_or_else(|| DomainError::not_found("counter", slug))?;
        counter.apply(update)?;
        Ok(counter)
    }

    /// Reset every counter the rest recovers. Returns how many were reset.
    pub fn rest(&mut self, kind: RestKind) -> u32 {
        let recovers = kind.recovers();
        let mut reset = 0;
        for counter in &mut self.counters {
            if counter.reset_on.is_some_and(|timing| recovers.contains(&timing)) {
                counter.spent = 0;
                reset += 1;
            }
        }
        reset
    }

    // =========================================================================
    // Spells
    // =========================================================================

    pub fn prepare_spell(
        &mut self,
        spell_slug: &str,
        class_slug: Option<&str>,
        catalog: &RuleCatalog,
    ) -> Result<SpellPreparationChange, DomainError> {
        let spell = catalog
            .spell(spell_slug)
            .ok_or_else(|| DomainError::not_found("spell", spell_slug))?;
        let abilities = self.resolved_abilities(catalog);
        let ctx = PreparationContext {
            classes: &self.classes,
            abilities: &abilities,
            catalog,
        };
        rules::prepare_spell(&mut self.spells, spell, class_slug, &ctx)
    }

    pub fn unprepare_spell(
        &mut self,
        spell_slug: &str,
        class_slug: Option<&str>,
        catalog: &RuleCatalog,
    ) -> Result<SpellPreparationChange, DomainError> {
        let spell = catalog
            .spell(spell_slug)
            .ok_or_else(|| DomainError::not_found("spell", spell_slug))?;
        rules::unprepare_spell(&mut self.spells, spell, class_slug)
    }

    // =========================================================================
    // Bookkeeping
    // =========================================================================

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

fn validate_name(name: String) -> Result<String, DomainError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(DomainError::invalid_field("name", "cannot be empty"));
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(DomainError::invalid_field(
            "name",
            format!("cannot exceed {} characters", MAX_NAME_LENGTH),
        ));
    }
    Ok(trimmed.to_string())
}

// ============================================================================
// Serde Implementation
// ============================================================================

/// Stored snapshot format
#[derive(Serialize, Deserialize)]
struct CharacterSnapshot {
    id: CharacterId,
    name: String,
    #[serde(default)]
    ability_score_method: AbilityScoreMethod,
    #[serde(default)]
    ability_scores: AbilityScores,
    #[serde(default)]
    race: Option<String>,
    #[serde(default)]
    background: Option<String>,
    #[serde(default)]
    classes: Vec<ClassAssignment>,
    #[serde(default)]
    feats: Vec<String>,
    #[serde(default)]
    conditions: Vec<String>,
    #[serde(default)]
    asi_choices_remaining: u8,
    #[serde(default)]
    armor_class_override: Option<i32>,
    #[serde(default)]
    current_hit_points: u32,
    #[serde(default)]
    max_hit_points: u32,
    #[serde(default)]
    temp_hit_points: u32,
    #[serde(default)]
    death_save_successes: u8,
    #[serde(default)]
    death_save_failures: u8,
    #[serde(default)]
    is_dead: bool,
    #[serde(default)]
    exhaustion_level: u8,
    #[serde(default)]
    proficiencies: Vec<GrantedProficiency>,
    #[serde(default)]
    equipment: Vec<EquipmentRecord>,
    #[serde(default)]
    counters: Vec<ResourceCounter>,
    #[serde(default)]
    spells: Vec<CharacterSpell>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Serialize for Character {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let snapshot = CharacterSnapshot {
            id: self.id,
            name: self.name.clone(),
            ability_score_method: self.ability_score_method,
            ability_scores: self.base_abilities,
            race: self.race.clone(),
            background: self.background.clone(),
            classes: self.classes.clone(),
            feats: self.feats.clone(),
            conditions: self.conditions.clone(),
            asi_choices_remaining: self.asi_choices_remaining,
            armor_class_override: self.armor_class_override,
            current_hit_points: self.hit_points.current,
            max_hit_points: self.hit_points.max,
            temp_hit_points: self.hit_points.temp,
            death_save_successes: self.death_saves.successes,
            death_save_failures: self.death_saves.failures,
            is_dead: self.is_dead,
            exhaustion_level: self.exhaustion_level,
            proficiencies: self.proficiencies.clone(),
            equipment: self.equipment.clone(),
            counters: self.counters.clone(),
            spells: self.spells.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        };
        snapshot.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Character {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let snapshot = CharacterSnapshot::deserialize(deserializer)?;

        let character = Character {
            id: snapshot.id,
            name: snapshot.name,
            ability_score_method: snapshot.ability_score_method,
            base_abilities: snapshot.ability_scores,
            race: snapshot.race,
            background: snapshot.background,
            classes: snapshot.classes,
            feats: snapshot.feats,
            conditions: snapshot.conditions,
            asi_choices_remaining: snapshot.asi_choices_remaining,
            armor_class_override: snapshot.armor_class_override,
            hit_points: HitPoints {
                current: snapshot.current_hit_points,
                max: snapshot.max_hit_points,
                temp: snapshot.temp_hit_points,
            },
            death_saves: DeathSaves {
                successes: snapshot.death_save_successes,
                failures: snapshot.death_save_failures,
            },
            is_dead: snapshot.is_dead,
            exhaustion_level: snapshot.exhaustion_level,
            proficiencies: snapshot.proficiencies,
            equipment: snapshot.equipment,
            counters: snapshot.counters,
            spells: snapshot.spells,
            created_at: snapshot.created_at,
            updated_at: snapshot.updated_at,
        };

        character.validate().map_err(serde::de::Error::custom)?;
        Ok(character)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{
        ClassDefinition, ItemDefinition, ItemKind, Modifier, ModifierCategory, RaceDefinition,
        RuleSource, SpellDefinition,
    };
    use crate::entities::{CounterAction, ResetTiming};
    use crate::events::DeathSaveResult;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    fn fighter() -> Character {
        Character::new("Tordek", fixed_time())
            .unwrap()
            .with_class("fighter", 1)
            .with_hit_points(40, 40)
    }

    fn amount(s: &str) -> SignedAmount {
        SignedAmount::parse(s).unwrap()
    }

    mod constructor {
        use super::*;

        #[test]
        fn new_trims_name_and_sets_defaults() {
            let character = Character::new("  Lidda  ", fixed_time()).unwrap();
            assert_eq!(character.name(), "Lidda");
            assert_eq!(character.total_level(), 0);
            assert!(!character.is_dead());
            assert_eq!(character.created_at(), fixed_time());
            assert_eq!(character.currency(), CurrencyHoldings::default());
        }

        #[test]
        fn empty_name_is_rejected() {
            let err = Character::new("   ", fixed_time()).unwrap_err();
            assert_eq!(err.field(), Some("name"));
        }

        #[test]
        fn first_class_becomes_primary() {
            let character = fighter().with_class("wizard", 3);
            assert_eq!(character.primary_class().unwrap().class, "fighter");
            assert_eq!(character.total_level(), 4);
            assert_eq!(character.proficiency_bonus(), 2);
        }
    }

    mod hit_points {
        use super::*;

        #[test]
        fn healing_from_zero_resets_death_saves() {
            let mut character = fighter().with_hit_points(0, 40).with_death_saves(2, 1);
            let change = character.apply_hit_point_change(amount("+5"));
            assert!(change.regained_consciousness());
            assert_eq!(character.death_saves(), &DeathSaves::default());
            assert_eq!(character.hit_points().current, 5);
        }

        #[test]
        fn setting_zero_keeps_death_saves() {
            let mut character = fighter().with_hit_points(0, 40).with_death_saves(1, 2);
            character.apply_hit_point_change(amount("0"));
            assert_eq!(
                character.death_saves(),
                &DeathSaves {
                    successes: 1,
                    failures: 2
                }
            );
        }

        #[test]
        fn healing_does_not_revive_the_dead() {
            let mut character = fighter().with_hit_points(0, 40).with_death_saves(0, 2);
            character.record_death_save(DeathSaveInput::Roll(4)).unwrap();
            assert!(character.is_dead());
            character.apply_hit_point_change(amount("+10"));
            assert!(character.is_dead());
        }

        #[test]
        fn temp_hp_higher_wins() {
            let mut character = fighter().with_temp_hit_points(5);
            character.grant_temp_hit_points(3);
            assert_eq!(character.hit_points().temp, 5);
            character.grant_temp_hit_points(9);
            assert_eq!(character.hit_points().temp, 9);
        }
    }

    mod death {
        use super::*;

        #[test]
        fn third_failure_kills() {
            let mut character = fighter().with_hit_points(0, 40).with_death_saves(0, 2);
            let recorded = character
                .record_death_save(DeathSaveInput::Roll(5))
                .unwrap();
            assert_eq!(recorded.outcome, DeathSaveOutcome::Dead);
            assert_eq!(recorded.failures, 3);
            assert!(character.is_dead());
        }

        #[test]
        fn natural_twenty_restores_one_hp() {
            let mut character = fighter().with_hit_points(0, 40).with_death_saves(1, 2);
            let recorded = character
                .record_death_save(DeathSaveInput::Roll(20))
                .unwrap();
            assert_eq!(recorded.result, DeathSaveResult::CriticalSuccess);
            assert_eq!(recorded.outcome, DeathSaveOutcome::Stable);
            assert_eq!(character.hit_points().current, 1);
            assert_eq!((recorded.successes, recorded.failures), (0, 0));
        }

        #[test]
        fn conscious_characters_cannot_roll() {
            let mut character = fighter().with_hit_points(30, 40);
            let err = character
                .record_death_save(DeathSaveInput::Roll(20))
                .unwrap_err();
            assert_eq!(err.code(), "invalid_state_transition");
            assert_eq!(character.hit_points().current, 30);
        }

        #[test]
        fn failures_at_positive_hp_never_kill() {
            let mut character = fighter().with_hit_points(30, 40);
            for _ in 0..3 {
                assert!(character.record_death_save(DeathSaveInput::Failure).is_err());
            }
            assert!(!character.is_dead());
            assert!(character.death_saves().is_clear());
        }

        #[test]
        fn dead_characters_cannot_roll() {
            let mut character = fighter().with_hit_points(0, 40).with_death_saves(0, 3);
            character.set_dead(true).unwrap();
            let err = character
                .record_death_save(DeathSaveInput::Roll(12))
                .unwrap_err();
            assert_eq!(err.code(), "invalid_state_transition");
        }

        #[test]
        fn set_dead_requires_a_trigger() {
            let mut character = fighter();
            assert!(character.set_dead(true).is_err());
            assert!(!character.is_dead());
        }

        #[test]
        fn clearing_dead_keeps_counters() {
            let mut character = fighter().with_hit_points(0, 40).with_death_saves(0, 3);
            character.set_dead(true).unwrap();
            assert_eq!(character.set_dead(false).unwrap(), DeadFlagChange::Resurrected);
            assert_eq!(character.death_saves().failures, 3);
        }

        #[test]
        fn exhaustion_six_kills() {
            let mut character = fighter();
            let change = character.set_exhaustion(6).unwrap();
            assert!(change.died);
            assert!(character.is_dead());
        }

        #[test]
        fn exhaustion_above_six_is_rejected() {
            let err = fighter().set_exhaustion(7).unwrap_err();
            assert_eq!(err.field(), Some("level"));
        }

        #[test]
        fn lowering_exhaustion_of_exhaustion_death_needs_revive() {
            let mut character = fighter();
            character.set_exhaustion(6).unwrap();
            assert!(character.set_exhaustion(3).is_err());
            assert!(character.is_dead());
        }

        #[test]
        fn revive_clears_exhaustion_and_counters() {
            let mut character = fighter().with_hit_points(0, 40).with_death_saves(1, 2);
            character.set_exhaustion(6).unwrap();

            let revived = character.revive(Some(99), true).unwrap();
            assert_eq!(revived.hit_points, 40);
            assert!(revived.exhaustion_cleared);
            assert!(!character.is_dead());
            assert_eq!(character.exhaustion_level(), 0);
            assert_eq!(character.death_saves(), &DeathSaves::default());
        }

        #[test]
        fn revive_requires_dead() {
            let err = fighter().revive(None, true).unwrap_err();
            assert_eq!(
                err,
                DomainError::invalid_state_transition("Character is not dead")
            );
        }

        #[test]
        fn revive_keeping_level_six_exhaustion_is_rejected() {
            let mut character = fighter();
            character.set_exhaustion(6).unwrap();
            assert!(character.revive(None, false).is_err());
            assert!(character.is_dead());
        }

        #[test]
        fn reset_death_saves_rejected_while_dead() {
            let mut character = fighter().with_hit_points(0, 40).with_death_saves(0, 3);
            character.set_dead(true).unwrap();
            assert!(character.reset_death_saves().is_err());
        }
    }

    mod equipment {
        use super::*;

        fn catalog() -> RuleCatalog {
            RuleCatalog::new()
                .with_item(
                    ItemDefinition::new("cloak-of-protection", "Cloak of Protection", ItemKind::Gear)
                        .with_attunement(),
                )
                .with_item(ItemDefinition::new("torch", "Torch", ItemKind::Gear))
        }

        #[test]
        fn attunement_survives_unequip() {
            let cloak = EquipmentRecord::new("cloak-of-protection").equipped();
            let id = cloak.id;
            let mut character = fighter().with_equipment(cloak);

            let change = character.set_attunement(id, true, &catalog(), 3).unwrap();
            assert_eq!(change, AttunementChange::Attuned { used: 1, max: 3 });
            assert!(character.equipment_record(id).unwrap().is_attuned);
        }

        #[test]
        fn missing_row_is_not_found() {
            let mut character = fighter();
            let err = character
                .set_attunement(EquipmentId::new(), true, &catalog(), 3)
                .unwrap_err();
            assert_eq!(err.code(), "not_found");
        }

        #[test]
        fn non_attunable_item_is_rejected() {
            let torch = EquipmentRecord::new("torch");
            let id = torch.id;
            let mut character = fighter().with_equipment(torch);
            let err = character.set_attunement(id, true, &catalog(), 3).unwrap_err();
            assert_eq!(err.code(), "not_attunable");
        }

        #[test]
        fn currency_rows_are_created_and_removed() {
            let mut character = fighter();
            let deltas = rules::parse_deltas([("gp", "+5"), ("cp", "+0")]).unwrap();
            character.apply_currency(&deltas).unwrap();
            assert_eq!(character.equipment().len(), 1);
            assert_eq!(character.currency().gp, 5);

            let deltas = rules::parse_deltas([("sp", "-50")]).unwrap();
            let holdings = character.apply_currency(&deltas).unwrap();
            assert_eq!(holdings, CurrencyHoldings::default());
            assert!(character.equipment().is_empty());
        }

        #[test]
        fn failed_currency_change_leaves_rows_alone() {
            let mut character =
                fighter().with_equipment(EquipmentRecord::new("gold-gp").with_quantity(1));
            let before = character.clone();
            let deltas = rules::parse_deltas([("cp", "-150")]).unwrap();
            assert!(character.apply_currency(&deltas).is_err());
            assert_eq!(character, before);
        }
    }

    mod progression_and_resources {
        use super::*;

        fn catalog() -> RuleCatalog {
            RuleCatalog::new()
                .with_race(RaceDefinition::new("dwarf", "Dwarf"))
                .with_race(RaceDefinition::new("hill-dwarf", "Hill Dwarf").with_parent("dwarf"))
                .with_modifier(Modifier::fixed(
                    RuleSource::race("dwarf"),
                    ModifierCategory::AbilityScore,
                    Some("CON"),
                    2,
                ))
                .with_modifier(Modifier::fixed(
                    RuleSource::race("hill-dwarf"),
                    ModifierCategory::HitPointsPerLevel,
                    None,
                    1,
                ))
                .with_modifier(Modifier::fixed(
                    RuleSource::feat("tough"),
                    ModifierCategory::HitPointsPerLevel,
                    None,
                    2,
                ))
                .with_class(
                    ClassDefinition::new("fighter", "Fighter", 10).with_counter(
                        crate::catalog::CounterDefinition::new(
                            "Second Wind",
                            1,
                            1,
                            Some(ResetTiming::ShortRest),
                        ),
                    ),
                )
                .with_spell(SpellDefinition::new("bless", "Bless", 1))
        }

        #[test]
        fn level_up_adds_con_and_race_bonus() {
            // CON 14 + 2 = 16 (+3); average d10 = 6; hill dwarf +1
            let mut character = fighter()
                .with_race("hill-dwarf")
                .with_ability_scores(
                    AbilityScoreMethod::Manual,
                    AbilityScores::uniform(10).with(Ability::Con, 14),
                );
            let gained = character
                .gain_level_hit_points("fighter", HitPointGainMethod::Average, &catalog())
                .unwrap();
            assert_eq!(gained.gained, 10);
            assert_eq!(gained.max, 50);
            assert_eq!(gained.current, 50);
        }

        #[test]
        fn level_up_adds_feat_bonus_on_top_of_race() {
            // average d10 = 6; CON 10 (+0); hill dwarf +1; tough +2
            let mut character = fighter().with_race("hill-dwarf").with_feat("tough");
            let gained = character
                .gain_level_hit_points("fighter", HitPointGainMethod::Average, &catalog())
                .unwrap();
            assert_eq!(gained.gained, 9);
            assert_eq!(gained.max, 49);
        }

        #[test]
        fn level_up_for_unassigned_class_is_not_found() {
            let err = fighter()
                .gain_level_hit_points("wizard", HitPointGainMethod::Average, &catalog())
                .unwrap_err();
            assert_eq!(err.code(), "not_found");
        }

        #[test]
        fn counters_sync_update_and_rest() {
            let mut character = fighter();
            let sync = character.sync_counters(&catalog());
            assert_eq!(sync.added, vec!["fighter:second-wind".to_string()]);

            let counter = character
                .update_counter("fighter:second-wind", CounterUpdate::Action(CounterAction::Use))
                .unwrap();
            assert_eq!(counter.current(), 0);

            let err = character
                .update_counter("fighter:second-wind", CounterUpdate::Action(CounterAction::Use))
                .unwrap_err();
            assert_eq!(err, DomainError::constraint("No uses remaining for this counter."));

            assert_eq!(character.rest(RestKind::Short), 1);
            assert_eq!(character.counter("fighter:second-wind").unwrap().current(), 1);
        }

        #[test]
        fn unknown_counter_is_not_found() {
            let mut character = fighter();
            let err = character
                .update_counter("monk:ki-points", CounterUpdate::Spent(1))
                .unwrap_err();
            assert_eq!(err.code(), "not_found");
        }

        #[test]
        fn unknown_spell_is_not_found() {
            let err = fighter()
                .prepare_spell("wish", None, &catalog())
                .unwrap_err();
            assert_eq!(err.code(), "not_found");
        }
    }

    mod ability_scores {
        use super::*;

        fn veteran() -> Character {
            Character::new("Tordek", fixed_time())
                .unwrap()
                .with_class("fighter", 5)
                .with_hit_points(30, 44)
        }

        #[test]
        fn con_increase_raises_hit_points_per_level() {
            let mut character = veteran();
            let changed = character
                .set_ability_scores(
                    AbilityScoreMethod::Manual,
                    AbilityScores::uniform(10).with(Ability::Con, 14),
                    &RuleCatalog::new(),
                )
                .unwrap();
            assert_eq!(changed.con_modifier_change, 2);
            assert_eq!(changed.hit_point_adjustment, 10);
            assert_eq!((changed.current, changed.max), (40, 54));
            assert_eq!(character.base_abilities().get(Ability::Con), 14);
        }

        #[test]
        fn con_decrease_lowers_max_and_caps_current() {
            let mut character = veteran().with_hit_points(44, 44);
            let changed = character
                .set_ability_scores(
                    AbilityScoreMethod::Manual,
                    AbilityScores::uniform(10).with(Ability::Con, 8),
                    &RuleCatalog::new(),
                )
                .unwrap();
            assert_eq!(changed.hit_point_adjustment, -5);
            assert_eq!(character.hit_points().max, 39);
            assert_eq!(character.hit_points().current, 39);
        }

        #[test]
        fn other_abilities_leave_hit_points_alone() {
            let mut character = veteran();
            let changed = character
                .set_ability_scores(
                    AbilityScoreMethod::Manual,
                    AbilityScores::uniform(10).with(Ability::Str, 18),
                    &RuleCatalog::new(),
                )
                .unwrap();
            assert_eq!(changed.hit_point_adjustment, 0);
            assert_eq!(character.hit_points().max, 44);
        }

        #[test]
        fn invalid_scores_change_nothing() {
            let mut character = veteran();
            let before = character.clone();
            let err = character
                .set_ability_scores(
                    AbilityScoreMethod::Manual,
                    AbilityScores::uniform(10).with(Ability::Con, 25),
                    &RuleCatalog::new(),
                )
                .unwrap_err();
            assert_eq!(err.field(), Some("constitution"));
            assert_eq!(character, before);
        }
    }

    mod serde_impl {
        use super::*;
        use serde_json::json;

        #[test]
        fn snapshot_uses_flat_hit_point_fields() {
            let character = fighter().with_temp_hit_points(3);
            let json = serde_json::to_value(&character).unwrap();
            assert_eq!(json["current_hit_points"], 40);
            assert_eq!(json["max_hit_points"], 40);
            assert_eq!(json["temp_hit_points"], 3);
            assert_eq!(json["classes"][0]["is_primary"], true);
        }

        #[test]
        fn round_trips_through_json() {
            let character = fighter()
                .with_race("elf")
                .with_feat("alert")
                .with_condition("poisoned");
            let json = serde_json::to_string(&character).unwrap();
            let back: Character = serde_json::from_str(&json).unwrap();
            assert_eq!(back, character);
        }

        #[test]
        fn invalid_snapshot_is_rejected() {
            let value = json!({
                "id": CharacterId::new(),
                "name": "Ghost",
                "is_dead": true,
                "created_at": "2024-01-01T00:00:00Z",
                "updated_at": "2024-01-01T00:00:00Z"
            });
            assert!(serde_json::from_value::<Character>(value).is_err());
        }
    }
}
