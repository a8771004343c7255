//! Currency ledger and attunement.

use std::sync::Arc;

use charsheet_domain::{AttunementChange, CharacterId, EquipmentId};
use charsheet_shared::{
    ApplyCurrencyRequest, CurrencyResponse, EquipmentResponse, SetAttunementRequest,
};

use super::{accept, rejected, CharacterSheetError, SheetStore};
use crate::infrastructure::ports::RuleCatalogRepo;

/// Apply signed deltas to the five denominations as one unit. Either every
/// delta lands or none does.
pub struct ApplyCurrency {
    store: SheetStore,
}

impl ApplyCurrency {
    pub fn new(store: SheetStore) -> Self {
        Self { store }
    }

    pub async fn execute(
        &self,
        character_id: CharacterId,
        request: ApplyCurrencyRequest,
    ) -> Result<CurrencyResponse, CharacterSheetError> {
        let fail = |e: CharacterSheetError| rejected("apply_currency", character_id, e);

        let deltas = accept(request).map_err(fail)?;
        let mut character = self.store.load(character_id).await?;
        if deltas.iter().all(|(_, amount)| amount.is_noop()) {
            return Ok(CurrencyResponse::from(character.currency()));
        }

        let before = character.currency().total_copper();
        let holdings = character
            .apply_currency(&deltas)
            .map_err(|e| fail(e.into()))?;

        self.store.save(&mut character).await?;

        tracing::info!(
            %character_id,
            deltas = deltas.len(),
            copper_before = before,
            copper_after = holdings.total_copper(),
            "Currency updated"
        );
        Ok(CurrencyResponse::from(holdings))
    }
}

/// Toggle attunement on one equipment row. Equip state is left alone.
pub struct SetAttunement {
    store: SheetStore,
    catalog: Arc<dyn RuleCatalogRepo>,
    default_slots: u32,
}

impl SetAttunement {
    pub fn new(store: SheetStore, catalog: Arc<dyn RuleCatalogRepo>, default_slots: u32) -> Self {
        Self {
            store,
            catalog,
            default_slots,
        }
    }

    pub async fn execute(
        &self,
        character_id: CharacterId,
        equipment_id: EquipmentId,
        request: SetAttunementRequest,
    ) -> Result<EquipmentResponse, CharacterSheetError> {
        let fail = |e: CharacterSheetError| rejected("set_attunement", character_id, e);

        let attuned = accept(request).map_err(fail)?;
        let mut character = self.store.load(character_id).await?;
        let catalog = self.catalog.current().await;

        let change = character
            .set_attunement(equipment_id, attuned, &catalog, self.default_slots)
            .map_err(|e| fail(e.into()))?;

        match change {
            AttunementChange::Attuned { used, max } => {
                self.store.save(&mut character).await?;
                tracing::info!(%character_id, %equipment_id, used, max, "Item attuned");
            }
            AttunementChange::Released { used } => {
                self.store.save(&mut character).await?;
                tracing::info!(%character_id, %equipment_id, used, "Attunement released");
            }
            AttunementChange::Unchanged { is_attuned } => {
                tracing::debug!(%character_id, %equipment_id, is_attuned, "Attunement unchanged");
            }
        }

        character
            .equipment_record(equipment_id)
            .map(EquipmentResponse::from)
            .ok_or_else(|| CharacterSheetError::EquipmentNotFound(equipment_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::character_sheet::test_support::*;
    use charsheet_domain::catalog::{ItemDefinition, ItemKind};
    use charsheet_domain::entities::EquipmentRecord;
    use charsheet_domain::{Denomination, RuleCatalog};
    use serde_json::json;

    mod currency {
        use super::*;

        fn request(body: serde_json::Value) -> ApplyCurrencyRequest {
            serde_json::from_value(body).unwrap()
        }

        fn with_coins(slug: &str, quantity: u64) -> charsheet_domain::Character {
            character().with_equipment(EquipmentRecord::new(slug).with_quantity(quantity))
        }

        #[tokio::test]
        async fn subtraction_makes_change_from_gold() {
            let character = with_coins("gold-gp", 5);
            let id = character.id();
            let (repo, saved) = repo_with(character);
            let use_case = ApplyCurrency::new(store(repo));

            let response = use_case.execute(id, request(json!({"sp": "-10"}))).await.unwrap();

            assert_eq!(
                serde_json::to_value(response).unwrap(),
                json!({"pp": 0, "gp": 4, "ep": 0, "sp": 0, "cp": 0})
            );
            assert_eq!(saved.lock().unwrap()[0].currency().get(Denomination::Gp), 4);
        }

        #[tokio::test]
        async fn additions_fund_subtractions_in_the_same_request() {
            let character = character();
            let id = character.id();
            let (repo, _saved) = repo_with(character);
            let use_case = ApplyCurrency::new(store(repo));

            let response = use_case
                .execute(id, request(json!({"gp": "+10", "sp": "-50"})))
                .await
                .unwrap();

            assert_eq!(response.gp, 5);
            assert_eq!(response.sp, 0);
        }

        #[tokio::test]
        async fn insufficient_funds_leaves_holdings_untouched() {
            let character = with_coins("gold-gp", 1);
            let id = character.id();
            let use_case = ApplyCurrency::new(store(read_only_repo(character)));

            let err = use_case
                .execute(id, request(json!({"cp": "-150"})))
                .await
                .unwrap_err();

            assert_eq!(err.code(), "insufficient_funds");
        }

        #[tokio::test]
        async fn signed_zero_is_a_no_op() {
            let character = with_coins("silver-sp", 3);
            let id = character.id();
            let use_case = ApplyCurrency::new(store(read_only_repo(character)));

            let response = use_case
                .execute(id, request(json!({"sp": "-0", "gp": "+0"})))
                .await
                .unwrap();

            assert_eq!(response.sp, 3);
        }

        #[tokio::test]
        async fn unknown_denomination_is_rejected_by_key() {
            let use_case = ApplyCurrency::new(store(empty_repo()));

            let err = use_case
                .execute(CharacterId::new(), request(json!({"zz": "+1"})))
                .await
                .unwrap_err();

            let CharacterSheetError::Validation(errors) = err else {
                panic!("expected validation error");
            };
            assert!(errors.get("zz").is_some());
        }

        #[tokio::test]
        async fn oversized_amount_is_a_field_error() {
            let use_case = ApplyCurrency::new(store(empty_repo()));

            let err = use_case
                .execute(CharacterId::new(), request(json!({"gp": "+12345678901"})))
                .await
                .unwrap_err();

            let CharacterSheetError::Validation(errors) = err else {
                panic!("expected validation error");
            };
            assert!(errors.get("gp").is_some());
        }
    }

    mod attunement {
        use super::*;

        fn catalog() -> RuleCatalog {
            RuleCatalog::new()
                .with_item(ItemDefinition::new("ring-of-protection", "Ring of Protection", ItemKind::Gear).with_attunement())
                .with_item(ItemDefinition::new("cloak-of-elvenkind", "Cloak of Elvenkind", ItemKind::Gear).with_attunement())
                .with_item(ItemDefinition::new("rope", "Rope", ItemKind::Gear))
        }

        fn use_case(repo: crate::infrastructure::ports::MockCharacterRepo) -> SetAttunement {
            SetAttunement::new(store(repo), Arc::new(catalog_repo(catalog())), 3)
        }

        fn request(is_attuned: bool) -> SetAttunementRequest {
            SetAttunementRequest { is_attuned }
        }

        #[tokio::test]
        async fn attunes_an_attunable_item() {
            let ring = EquipmentRecord::new("ring-of-protection");
            let ring_id = ring.id;
            let character = character().with_equipment(ring);
            let id = character.id();
            let (repo, saved) = repo_with(character);

            let response = use_case(repo).execute(id, ring_id, request(true)).await.unwrap();

            assert!(response.is_attuned);
            assert!(!response.equipped);
            assert_eq!(saved.lock().unwrap().len(), 1);
        }

        #[tokio::test]
        async fn non_attunable_item_is_rejected() {
            let rope = EquipmentRecord::new("rope");
            let rope_id = rope.id;
            let character = character().with_equipment(rope);
            let id = character.id();

            let err = use_case(read_only_repo(character))
                .execute(id, rope_id, request(true))
                .await
                .unwrap_err();

            assert_eq!(err.code(), "not_attunable");
        }

        #[tokio::test]
        async fn fourth_item_exceeds_default_slots() {
            let cloak = EquipmentRecord::new("cloak-of-elvenkind");
            let cloak_id = cloak.id;
            let character = character()
                .with_equipment(EquipmentRecord::new("ring-of-protection").attuned())
                .with_equipment(EquipmentRecord::new("ring-of-protection").attuned())
                .with_equipment(EquipmentRecord::new("ring-of-protection").attuned())
                .with_equipment(cloak);
            let id = character.id();

            let err = use_case(read_only_repo(character))
                .execute(id, cloak_id, request(true))
                .await
                .unwrap_err();

            assert!(matches!(
                err,
                CharacterSheetError::Domain(charsheet_domain::DomainError::AttunementSlotsFull {
                    current: 3,
                    max: 3
                })
            ));
        }

        #[tokio::test]
        async fn unknown_equipment_is_not_found() {
            let character = character();
            let id = character.id();

            let err = use_case(read_only_repo(character))
                .execute(id, EquipmentId::new(), request(true))
                .await
                .unwrap_err();

            assert!(matches!(err, CharacterSheetError::EquipmentNotFound(_)));
        }

        #[tokio::test]
        async fn already_attuned_is_idempotent() {
            let ring = EquipmentRecord::new("ring-of-protection").attuned();
            let ring_id = ring.id;
            let character = character().with_equipment(ring);
            let id = character.id();

            let response = use_case(read_only_repo(character))
                .execute(id, ring_id, request(true))
                .await
                .unwrap();

            assert!(response.is_attuned);
        }
    }
}
