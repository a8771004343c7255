//! Hit point changes and level-up hit point gains.

use std::sync::Arc;

use charsheet_domain::rules::HitPointGainMethod;
use charsheet_domain::{CharacterId, DomainError, HitPointChange, TempHpChange};
use charsheet_shared::{
    ApplyHitPointsRequest, HitPointMethod, HitPointsResponse, LevelUpHitPointsRequest,
    LevelUpHitPointsResponse,
};

use super::{accept, rejected, CharacterSheetError, SheetStore};
use crate::infrastructure::ports::{RandomPort, RuleCatalogRepo};

/// Apply an `hp` delta and/or a temp HP grant.
///
/// `hp` is applied first so damage in the same request is absorbed by the
/// temp HP the character already had, not the new grant. An empty body
/// returns the current state without writing.
pub struct ApplyHitPoints {
    store: SheetStore,
}

impl ApplyHitPoints {
    pub fn new(store: SheetStore) -> Self {
        Self { store }
    }

    pub async fn execute(
        &self,
        character_id: CharacterId,
        request: ApplyHitPointsRequest,
    ) -> Result<HitPointsResponse, CharacterSheetError> {
        let input = accept(request).map_err(|e| rejected("apply_hit_points", character_id, e))?;
        let mut character = self.store.load(character_id).await?;

        if input.hp.is_none() && input.temp_hp.is_none() {
            return Ok(HitPointsResponse::from(&character));
        }

        if let Some(delta) = input.hp {
            match character.apply_hit_point_change(delta) {
                HitPointChange::Damaged {
                    absorbed_by_temp,
                    dealt,
                    current,
                } => tracing::info!(
                    %character_id,
                    absorbed_by_temp,
                    dealt,
                    current_hit_points = current,
                    "Damage applied"
                ),
                HitPointChange::Healed {
                    amount,
                    current,
                    regained_consciousness,
                } => tracing::info!(
                    %character_id,
                    amount,
                    current_hit_points = current,
                    regained_consciousness,
                    "Healing applied"
                ),
                HitPointChange::Set {
                    from,
                    to,
                    regained_consciousness,
                } => tracing::info!(
                    %character_id,
                    from,
                    current_hit_points = to,
                    regained_consciousness,
                    "Hit points set"
                ),
                HitPointChange::Unchanged => {
                    tracing::debug!(%character_id, "Zero hit point change")
                }
            }
        }

        if let Some(temp) = input.temp_hp {
            match character.grant_temp_hit_points(temp) {
                TempHpChange::Replaced { from, to } => {
                    tracing::info!(%character_id, from, temp_hit_points = to, "Temp HP replaced")
                }
                TempHpChange::Cleared { from } => {
                    tracing::info!(%character_id, from, "Temp HP cleared")
                }
                TempHpChange::Kept { current } => tracing::debug!(
                    %character_id,
                    temp_hit_points = current,
                    "Existing temp HP is higher, kept"
                ),
            }
        }

        self.store.save(&mut character).await?;
        Ok(HitPointsResponse::from(&character))
    }
}

/// Add one level's hit points for a class the character has. With
/// `method: roll` and no `roll`, the engine rolls the class hit die.
pub struct LevelUpHitPoints {
    store: SheetStore,
    catalog: Arc<dyn RuleCatalogRepo>,
    random: Arc<dyn RandomPort>,
}

impl LevelUpHitPoints {
    pub fn new(
        store: SheetStore,
        catalog: Arc<dyn RuleCatalogRepo>,
        random: Arc<dyn RandomPort>,
    ) -> Self {
        Self {
            store,
            catalog,
            random,
        }
    }

    pub async fn execute(
        &self,
        character_id: CharacterId,
        request: LevelUpHitPointsRequest,
    ) -> Result<LevelUpHitPointsResponse, CharacterSheetError> {
        let fail = |e: CharacterSheetError| rejected("level_up_hit_points", character_id, e);

        let input = accept(request).map_err(fail)?;
        let mut character = self.store.load(character_id).await?;
        let catalog = self.catalog.current().await;

        let method = match (input.method, input.roll) {
            (HitPointMethod::Average, _) => HitPointGainMethod::Average,
            (HitPointMethod::Roll, Some(roll)) => HitPointGainMethod::Rolled(roll),
            (HitPointMethod::Roll, None) => {
                let class = character
                    .class_level(&input.class)
                    .and_then(|_| catalog.class(&input.class))
                    .ok_or_else(|| {
                        fail(DomainError::not_found("class", input.class.as_str()).into())
                    })?;
                let roll = self.random.gen_range(1, i32::from(class.hit_die));
                tracing::debug!(%character_id, class = %input.class, roll, "Rolled hit die");
                HitPointGainMethod::Rolled(u32::try_from(roll.max(1)).unwrap_or(1))
            }
        };

        let gained = character
            .gain_level_hit_points(&input.class, method, &catalog)
            .map_err(|e| fail(e.into()))?;

        self.store.save(&mut character).await?;

        tracing::info!(
            %character_id,
            class = %input.class,
            hp_gained = gained.gained,
            max_hit_points = gained.max,
            "Level-up hit points gained"
        );
        Ok(LevelUpHitPointsResponse::from(gained))
    }
}
