//! Spell preparation.

use std::sync::Arc;

use charsheet_domain::{CharacterId, SpellPreparationChange, SpellStatus};
use charsheet_shared::{SpellPreparationRequest, SpellResponse};

use super::{accept, rejected, CharacterSheetError, SheetStore};
use crate::infrastructure::ports::RuleCatalogRepo;

/// Rows dropped on unprepare are reported as `known`; nothing remains prepared.
fn response(change: &SpellPreparationChange) -> SpellResponse {
    let mut response = SpellResponse::from(change.spell());
    if let SpellPreparationChange::Removed(_) = change {
        response.status = SpellStatus::Known;
    }
    response
}

pub struct PrepareSpell {
    store: SheetStore,
    catalog: Arc<dyn RuleCatalogRepo>,
}

impl PrepareSpell {
    pub fn new(store: SheetStore, catalog: Arc<dyn RuleCatalogRepo>) -> Self {
        Self { store, catalog }
    }

    pub async fn execute(
        &self,
        character_id: CharacterId,
        request: SpellPreparationRequest,
    ) -> Result<SpellResponse, CharacterSheetError> {
        let fail = |e: CharacterSheetError| rejected("prepare_spell", character_id, e);

        let input = accept(request).map_err(fail)?;
        let mut character = self.store.load(character_id).await?;
        let catalog = self.catalog.current().await;

        let change = character
            .prepare_spell(&input.spell, input.class.as_deref(), &catalog)
            .map_err(|e| fail(e.into()))?;

        if change.is_change() {
            self.store.save(&mut character).await?;
            let spell = change.spell();
            tracing::info!(
                %character_id,
                spell = %spell.spell_slug,
                class = %spell.class_slug,
                source = ?spell.source,
                "Spell prepared"
            );
        } else {
            tracing::debug!(%character_id, spell = %input.spell, "Spell already prepared");
        }
        Ok(response(&change))
    }
}

pub struct UnprepareSpell {
    store: SheetStore,
    catalog: Arc<dyn RuleCatalogRepo>,
}

impl UnprepareSpell {
    pub fn new(store: SheetStore, catalog: Arc<dyn RuleCatalogRepo>) -> Self {
        Self { store, catalog }
    }

    pub async fn execute(
        &self,
        character_id: CharacterId,
        request: SpellPreparationRequest,
    ) -> Result<SpellResponse, CharacterSheetError> {
        let fail = |e: CharacterSheetError| rejected("unprepare_spell", character_id, e);

        let input = accept(request).map_err(fail)?;
        let mut character = self.store.load(character_id).await?;
        let catalog = self.catalog.current().await;

        let change = character
            .unprepare_spell(&input.spell, input.class.as_deref(), &catalog)
            .map_err(|e| fail(e.into()))?;

        if change.is_change() {
            self.store.save(&mut character).await?;
            tracing::info!(
                %character_id,
                spell = %change.spell().spell_slug,
                removed = matches!(change, SpellPreparationChange::Removed(_)),
                "Spell unprepared"
            );
        } else {
            tracing::debug!(%character_id, spell = %input.spell, "Spell already unprepared");
        }
        Ok(response(&change))
    }
}
