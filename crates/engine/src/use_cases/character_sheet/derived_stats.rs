//! Read-side derived sheet.

use std::sync::Arc;

use charsheet_domain::{derive_stats, CharacterId};
use charsheet_shared::DerivedStatsResponse;

use super::{CharacterSheetError, SheetStore};
use crate::infrastructure::ports::RuleCatalogRepo;

/// Recompute every derived number for one character. Never writes.
pub struct GetDerivedStats {
    store: SheetStore,
    catalog: Arc<dyn RuleCatalogRepo>,
    default_attunement_slots: u32,
}

impl GetDerivedStats {
    pub fn new(
        store: SheetStore,
        catalog: Arc<dyn RuleCatalogRepo>,
        default_attunement_slots: u32,
    ) -> Self {
        Self {
            store,
            catalog,
            default_attunement_slots,
        }
    }

    pub async fn execute(
        &self,
        character_id: CharacterId,
    ) -> Result<DerivedStatsResponse, CharacterSheetError> {
        let character = self.store.load(character_id).await?;
        let catalog = self.catalog.current().await;

        let stats = derive_stats(&character, &catalog, self.default_attunement_slots);
        tracing::debug!(
            %character_id,
            total_level = stats.total_level,
            armor_class = stats.armor_class,
            "Derived stats computed"
        );
        Ok(stats)
    }
}
