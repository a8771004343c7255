//! Class resource counters and rests.

use std::sync::Arc;

use charsheet_domain::CharacterId;
use charsheet_shared::{CounterResponse, RestRequest, RestResponse, UpdateCounterRequest};

use super::{accept, rejected, CharacterSheetError, SheetStore};
use crate::infrastructure::ports::RuleCatalogRepo;

/// Bring the character's counters in line with its class levels.
pub struct SyncCounters {
    store: SheetStore,
    catalog: Arc<dyn RuleCatalogRepo>,
}

impl SyncCounters {
    pub fn new(store: SheetStore, catalog: Arc<dyn RuleCatalogRepo>) -> Self {
        Self { store, catalog }
    }

    pub async fn execute(
        &self,
        character_id: CharacterId,
    ) -> Result<Vec<CounterResponse>, CharacterSheetError> {
        let mut character = self.store.load(character_id).await?;
        let catalog = self.catalog.current().await;

        let sync = character.sync_counters(&catalog);
        if !sync.is_empty() {
            self.store.save(&mut character).await?;
            tracing::info!(
                %character_id,
                added = ?sync.added,
                updated = ?sync.updated,
                removed = ?sync.removed,
                "Counters synced"
            );
        }

        Ok(character.counters().iter().map(CounterResponse::from).collect())
    }
}

pub struct UpdateCounter {
    store: SheetStore,
}

impl UpdateCounter {
    pub fn new(store: SheetStore) -> Self {
        Self { store }
    }

    pub async fn execute(
        &self,
        character_id: CharacterId,
        slug: &str,
        request: UpdateCounterRequest,
    ) -> Result<CounterResponse, CharacterSheetError> {
        let fail = |e: CharacterSheetError| rejected("update_counter", character_id, e);

        let update = accept(request).map_err(fail)?;
        let mut character = self.store.load(character_id).await?;
        let counter = character
            .update_counter(slug, update)
            .map(CounterResponse::from)
            .map_err(|e| fail(e.into()))?;

        self.store.save(&mut character).await?;

        tracing::info!(
            %character_id,
            counter = %counter.slug,
            current = counter.current,
            max = counter.max,
            "Counter updated"
        );
        Ok(counter)
    }
}

pub struct Rest {
    store: SheetStore,
}

impl Rest {
    pub fn new(store: SheetStore) -> Self {
        Self { store }
    }

    pub async fn execute(
        &self,
        character_id: CharacterId,
        request: RestRequest,
    ) -> Result<RestResponse, CharacterSheetError> {
        let kind = accept(request).map_err(|e| rejected("rest", character_id, e))?;
        let mut character = self.store.load(character_id).await?;

        let counters_reset = character.rest(kind);
        if counters_reset > 0 {
            self.store.save(&mut character).await?;
        }

        tracing::info!(%character_id, rest = ?kind, counters_reset, "Rest taken");
        Ok(RestResponse { counters_reset })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::character_sheet::test_support::*;
    use charsheet_domain::catalog::{ClassDefinition, CounterDefinition};
    use charsheet_domain::entities::{ResetTiming, ResourceCounter};
    use charsheet_domain::RuleCatalog;
    use serde_json::json;

    fn barbarian(level: u8) -> charsheet_domain::Character {
        charsheet_domain::Character::new("Grog", fixed_time())
            .unwrap()
            .with_class("barbarian", level)
            .with_hit_points(30, 30)
    }

    fn rage(spent: u32) -> ResourceCounter {
        let mut counter = ResourceCounter::new("barbarian", "Rage", 3, Some(ResetTiming::LongRest));
        counter.spent = spent;
        counter
    }

    mod sync {
        use super::*;

        fn catalog() -> RuleCatalog {
            RuleCatalog::new().with_class(
                ClassDefinition::new("barbarian", "Barbarian", 12)
                    .with_counter(CounterDefinition::new("Rage", 1, 2, Some(ResetTiming::LongRest)))
                    .with_counter(CounterDefinition::new("Rage", 3, 3, Some(ResetTiming::LongRest))),
            )
        }

        #[tokio::test]
        async fn adds_the_highest_definition_for_the_level() {
            let character = barbarian(4);
            let id = character.id();
            let (repo, saved) = repo_with(character);
            let use_case = SyncCounters::new(store(repo), Arc::new(catalog_repo(catalog())));

            let counters = use_case.execute(id).await.unwrap();

            assert_eq!(
                serde_json::to_value(&counters).unwrap(),
                json!([{
                    "slug": "barbarian:rage",
                    "name": "Rage",
                    "current": 3,
                    "max": 3,
                    "reset_on": "long_rest",
                }])
            );
            assert_eq!(saved.lock().unwrap().len(), 1);
        }

        #[tokio::test]
        async fn in_sync_counters_are_not_saved() {
            let character = barbarian(4).with_counter(rage(1));
            let id = character.id();
            let use_case = SyncCounters::new(
                store(read_only_repo(character)),
                Arc::new(catalog_repo(catalog())),
            );

            let counters = use_case.execute(id).await.unwrap();

            assert_eq!(counters[0].current, 2);
        }
    }

    mod update {
        use super::*;

        fn request(body: serde_json::Value) -> UpdateCounterRequest {
            serde_json::from_value(body).unwrap()
        }

        #[tokio::test]
        async fn use_spends_one() {
            let character = barbarian(3).with_counter(rage(0));
            let id = character.id();
            let (repo, _saved) = repo_with(character);
            let use_case = UpdateCounter::new(store(repo));

            let counter = use_case
                .execute(id, "barbarian:rage", request(json!({"action": "use"})))
                .await
                .unwrap();

            assert_eq!(counter.current, 2);
        }

        #[tokio::test]
        async fn use_with_nothing_left_is_rejected() {
            let character = barbarian(3).with_counter(rage(3));
            let id = character.id();
            let use_case = UpdateCounter::new(store(read_only_repo(character)));

            let err = use_case
                .execute(id, "barbarian:rage", request(json!({"action": "use"})))
                .await
                .unwrap_err();

            assert!(err.to_string().ends_with("No uses remaining for this counter."));
        }

        #[tokio::test]
        async fn spent_above_max_is_a_spent_field_error() {
            let character = barbarian(3).with_counter(rage(0));
            let id = character.id();
            let use_case = UpdateCounter::new(store(read_only_repo(character)));

            let err = use_case
                .execute(id, "barbarian:rage", request(json!({"spent": 4})))
                .await
                .unwrap_err();

            let CharacterSheetError::Validation(errors) = err else {
                panic!("expected validation error");
            };
            assert!(errors.get("spent").is_some());
        }

        #[tokio::test]
        async fn neither_spent_nor_action_is_rejected_before_loading() {
            let use_case = UpdateCounter::new(store(empty_repo()));

            let err = use_case
                .execute(CharacterId::new(), "barbarian:rage", request(json!({})))
                .await
                .unwrap_err();

            assert_eq!(err.code(), "validation_failed");
        }

        #[tokio::test]
        async fn foreign_slug_is_not_found() {
            let character = barbarian(3).with_counter(rage(0));
            let id = character.id();
            let use_case = UpdateCounter::new(store(read_only_repo(character)));

            let err = use_case
                .execute(id, "monk:ki-points", request(json!({"action": "reset"})))
                .await
                .unwrap_err();

            assert!(matches!(err, CharacterSheetError::CounterNotFound(ref slug) if slug == "monk:ki-points"));
        }
    }

    mod rest {
        use super::*;

        fn request(kind: &str) -> RestRequest {
            serde_json::from_value(json!({"type": kind})).unwrap()
        }

        #[tokio::test]
        async fn long_rest_resets_long_rest_counters() {
            let character = barbarian(3).with_counter(rage(2));
            let id = character.id();
            let (repo, saved) = repo_with(character);
            let use_case = Rest::new(store(repo));

            let response = use_case.execute(id, request("long")).await.unwrap();

            assert_eq!(response.counters_reset, 1);
            assert_eq!(saved.lock().unwrap()[0].counters()[0].spent, 0);
        }

        #[tokio::test]
        async fn short_rest_leaves_long_rest_counters() {
            let character = barbarian(3).with_counter(rage(2));
            let id = character.id();
            let use_case = Rest::new(store(read_only_repo(character)));

            let response = use_case.execute(id, request("short")).await.unwrap();

            assert_eq!(
                serde_json::to_value(response).unwrap(),
                json!({"counters_reset": 0})
            );
        }
    }
}
