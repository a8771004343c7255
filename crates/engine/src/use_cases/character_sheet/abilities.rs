//! Base ability score changes.

use std::sync::Arc;

use charsheet_domain::CharacterId;
use charsheet_shared::{AbilityScoresResponse, SetAbilityScoresRequest};

use super::{accept, rejected, CharacterSheetError, SheetStore};
use crate::infrastructure::ports::RuleCatalogRepo;

/// Replace the six base scores. A changed CON modifier moves max and
/// current hit points by the change times total level.
pub struct SetAbilityScores {
    store: SheetStore,
    catalog: Arc<dyn RuleCatalogRepo>,
}

impl SetAbilityScores {
    pub fn new(store: SheetStore, catalog: Arc<dyn RuleCatalogRepo>) -> Self {
        Self { store, catalog }
    }

    pub async fn execute(
        &self,
        character_id: CharacterId,
        request: SetAbilityScoresRequest,
    ) -> Result<AbilityScoresResponse, CharacterSheetError> {
        let fail = |e: CharacterSheetError| rejected("set_ability_scores", character_id, e);

        let input = accept(request).map_err(fail)?;
        let mut character = self.store.load(character_id).await?;
        let catalog = self.catalog.current().await;

        let method = input
            .method
            .unwrap_or_else(|| character.ability_score_method());
        let changed = character
            .set_ability_scores(method, input.scores, &catalog)
            .map_err(|e| fail(e.into()))?;

        self.store.save(&mut character).await?;

        tracing::info!(
            %character_id,
            method = ?method,
            con_modifier_change = changed.con_modifier_change,
            hit_point_adjustment = changed.hit_point_adjustment,
            max_hit_points = changed.max,
            "Ability scores set"
        );
        Ok(AbilityScoresResponse::new(&character, changed))
    }
}
