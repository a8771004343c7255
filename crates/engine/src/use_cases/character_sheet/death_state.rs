//! Death saves, the dead flag, exhaustion and revival.

use charsheet_domain::{CharacterId, DeadFlagChange, DeathSaveOutcome};
use charsheet_shared::{
    DeadFlagResponse, DeathSaveResponse, ExhaustionResponse, HitPointsResponse,
    RecordDeathSaveRequest, ReviveRequest, ReviveResponse, SetDeadRequest, SetExhaustionRequest,
};

use super::{accept, rejected, CharacterSheetError, SheetStore};

pub struct RecordDeathSave {
    store: SheetStore,
}

impl RecordDeathSave {
    pub fn new(store: SheetStore) -> Self {
        Self { store }
    }

    pub async fn execute(
        &self,
        character_id: CharacterId,
        request: RecordDeathSaveRequest,
    ) -> Result<DeathSaveResponse, CharacterSheetError> {
        let fail = |e: CharacterSheetError| rejected("record_death_save", character_id, e);

        let input = accept(request).map_err(fail)?;
        let mut character = self.store.load(character_id).await?;
        let recorded = character
            .record_death_save(input)
            .map_err(|e| fail(e.into()))?;

        self.store.save(&mut character).await?;

        match recorded.outcome {
            DeathSaveOutcome::Dead => tracing::info!(
                %character_id,
                result = recorded.result.as_str(),
                death_save_failures = recorded.failures,
                "Character died from failed death saves"
            ),
            outcome => tracing::info!(
                %character_id,
                result = recorded.result.as_str(),
                outcome = outcome.as_str(),
                death_save_successes = recorded.successes,
                death_save_failures = recorded.failures,
                "Death save recorded"
            ),
        }
        Ok(DeathSaveResponse::from(recorded))
    }
}

/// Zero both death save counters of a living character.
pub struct ResetDeathSaves {
    store: SheetStore,
}

impl ResetDeathSaves {
    pub fn new(store: SheetStore) -> Self {
        Self { store }
    }

    pub async fn execute(
        &self,
        character_id: CharacterId,
    ) -> Result<HitPointsResponse, CharacterSheetError> {
        let mut character = self.store.load(character_id).await?;
        character
            .reset_death_saves()
            .map_err(|e| rejected("reset_death_saves", character_id, e))?;

        self.store.save(&mut character).await?;

        tracing::info!(%character_id, "Death saves reset");
        Ok(HitPointsResponse::from(&character))
    }
}

pub struct SetDead {
    store: SheetStore,
}

impl SetDead {
    pub fn new(store: SheetStore) -> Self {
        Self { store }
    }

    pub async fn execute(
        &self,
        character_id: CharacterId,
        request: SetDeadRequest,
    ) -> Result<DeadFlagResponse, CharacterSheetError> {
        let fail = |e: CharacterSheetError| rejected("set_dead", character_id, e);

        let is_dead = accept(request).map_err(fail)?;
        let mut character = self.store.load(character_id).await?;
        let change = character.set_dead(is_dead).map_err(|e| fail(e.into()))?;

        match change {
            DeadFlagChange::Unchanged { is_dead } => {
                tracing::debug!(%character_id, is_dead, "Dead flag already set");
            }
            DeadFlagChange::Died | DeadFlagChange::Resurrected => {
                self.store.save(&mut character).await?;
                tracing::info!(%character_id, is_dead, "Dead flag updated");
            }
        }
        Ok(DeadFlagResponse::from(&character))
    }
}

pub struct SetExhaustion {
    store: SheetStore,
}

impl SetExhaustion {
    pub fn new(store: SheetStore) -> Self {
        Self { store }
    }

    pub async fn execute(
        &self,
        character_id: CharacterId,
        request: SetExhaustionRequest,
    ) -> Result<ExhaustionResponse, CharacterSheetError> {
        let fail = |e: CharacterSheetError| rejected("set_exhaustion", character_id, e);

        let level = accept(request).map_err(fail)?;
        let mut character = self.store.load(character_id).await?;
        let change = character.set_exhaustion(level).map_err(|e| fail(e.into()))?;

        self.store.save(&mut character).await?;

        if change.died {
            tracing::info!(%character_id, level = change.to, "Character died from exhaustion");
        } else {
            tracing::info!(%character_id, from = change.from, level = change.to, "Exhaustion set");
        }
        Ok(ExhaustionResponse::from(&character))
    }
}

/// Bring a dead character back. HP defaults to 1 and exhaustion is cleared
/// unless the request keeps it.
pub struct Revive {
    store: SheetStore,
}

impl Revive {
    pub fn new(store: SheetStore) -> Self {
        Self { store }
    }

    pub async fn execute(
        &self,
        character_id: CharacterId,
        request: ReviveRequest,
    ) -> Result<ReviveResponse, CharacterSheetError> {
        let fail = |e: CharacterSheetError| rejected("revive", character_id, e);

        let input = accept(request).map_err(fail)?;
        let mut character = self.store.load(character_id).await?;
        let revived = character
            .revive(input.hit_points, input.clear_exhaustion)
            .map_err(|e| fail(e.into()))?;

        self.store.save(&mut character).await?;

        tracing::info!(
            %character_id,
            current_hit_points = revived.hit_points,
            exhaustion_cleared = revived.exhaustion_cleared,
            "Character revived"
        );
        Ok(ReviveResponse::from(&character))
    }
}
