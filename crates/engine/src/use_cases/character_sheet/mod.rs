//! Character sheet use cases.
//!
//! Every write follows the same shape: validate the request body per field,
//! convert it to domain input, load the character, apply one aggregate
//! mutation, stamp and save, log. A request that fails validation never
//! loads the character, and a rule rejection never saves it.

mod abilities;
mod counters;
mod death_state;
mod derived_stats;
mod error;
mod inventory;
mod spells;
mod vitals;

pub use abilities::SetAbilityScores;
pub use counters::{Rest, SyncCounters, UpdateCounter};
pub use death_state::{RecordDeathSave, ResetDeathSaves, Revive, SetDead, SetExhaustion};
pub use derived_stats::GetDerivedStats;
pub use error::CharacterSheetError;
pub use inventory::{ApplyCurrency, SetAttunement};
pub use spells::{PrepareSpell, UnprepareSpell};
pub use vitals::{ApplyHitPoints, LevelUpHitPoints};

use std::sync::Arc;

use charsheet_domain::{Character, CharacterId};
use charsheet_shared::CharacterRequest;

use crate::infrastructure::ports::{CharacterRepo, ClockPort, RandomPort, RuleCatalogRepo};

/// Container for character sheet use cases.
pub struct CharacterSheetUseCases {
    pub apply_hit_points: Arc<ApplyHitPoints>,
    pub level_up_hit_points: Arc<LevelUpHitPoints>,
    pub set_ability_scores: Arc<SetAbilityScores>,
    pub record_death_save: Arc<RecordDeathSave>,
    pub reset_death_saves: Arc<ResetDeathSaves>,
    pub set_dead: Arc<SetDead>,
    pub set_exhaustion: Arc<SetExhaustion>,
    pub revive: Arc<Revive>,
    pub apply_currency: Arc<ApplyCurrency>,
    pub set_attunement: Arc<SetAttunement>,
    pub sync_counters: Arc<SyncCounters>,
    pub update_counter: Arc<UpdateCounter>,
    pub rest: Arc<Rest>,
    pub prepare_spell: Arc<PrepareSpell>,
    pub unprepare_spell: Arc<UnprepareSpell>,
    pub derived_stats: Arc<GetDerivedStats>,
}

impl CharacterSheetUseCases {
    pub fn new(
        characters: Arc<dyn CharacterRepo>,
        catalog: Arc<dyn RuleCatalogRepo>,
        clock: Arc<dyn ClockPort>,
        random: Arc<dyn RandomPort>,
        default_attunement_slots: u32,
    ) -> Self {
        let store = SheetStore::new(characters, clock);
        Self {
            apply_hit_points: Arc::new(ApplyHitPoints::new(store.clone())),
            level_up_hit_points: Arc::new(LevelUpHitPoints::new(
                store.clone(),
                catalog.clone(),
                random,
            )),
            set_ability_scores: Arc::new(SetAbilityScores::new(store.clone(), catalog.clone())),
            record_death_save: Arc::new(RecordDeathSave::new(store.clone())),
            reset_death_saves: Arc::new(ResetDeathSaves::new(store.clone())),
            set_dead: Arc::new(SetDead::new(store.clone())),
            set_exhaustion: Arc::new(SetExhaustion::new(store.clone())),
            revive: Arc::new(Revive::new(store.clone())),
            apply_currency: Arc::new(ApplyCurrency::new(store.clone())),
            set_attunement: Arc::new(SetAttunement::new(
                store.clone(),
                catalog.clone(),
                default_attunement_slots,
            )),
            sync_counters: Arc::new(SyncCounters::new(store.clone(), catalog.clone())),
            update_counter: Arc::new(UpdateCounter::new(store.clone())),
            rest: Arc::new(Rest::new(store.clone())),
            prepare_spell: Arc::new(PrepareSpell::new(store.clone(), catalog.clone())),
            unprepare_spell: Arc::new(UnprepareSpell::new(store.clone(), catalog.clone())),
            derived_stats: Arc::new(GetDerivedStats::new(
                store,
                catalog,
                default_attunement_slots,
            )),
        }
    }
}

// =============================================================================
// Shared plumbing
// =============================================================================

/// Load and save for one character, stamping `updated_at` on every write.
#[derive(Clone)]
pub struct SheetStore {
    characters: Arc<dyn CharacterRepo>,
    clock: Arc<dyn ClockPort>,
}

impl SheetStore {
    pub fn new(characters: Arc<dyn CharacterRepo>, clock: Arc<dyn ClockPort>) -> Self {
        Self { characters, clock }
    }

    pub async fn load(&self, id: CharacterId) -> Result<Character, CharacterSheetError> {
        self.characters
            .get(id)
            .await?
            .ok_or(CharacterSheetError::CharacterNotFound(id))
    }

    pub async fn save(&self, character: &mut Character) -> Result<(), CharacterSheetError> {
        character.touch(self.clock.now());
        self.characters.save(character).await?;
        Ok(())
    }
}

/// Run field validation, then the cross-field conversion.
fn accept<R: CharacterRequest>(request: R) -> Result<R::Input, CharacterSheetError> {
    request.validate()?;
    Ok(request.into_input()?)
}

/// Log a rejected request with its machine code and pass the error on.
fn rejected(
    operation: &'static str,
    character_id: CharacterId,
    err: impl Into<CharacterSheetError>,
) -> CharacterSheetError {
    let err = err.into();
    tracing::warn!(
        %character_id,
        operation,
        code = err.code(),
        error = %err,
        "Character sheet request rejected"
    );
    err
}
