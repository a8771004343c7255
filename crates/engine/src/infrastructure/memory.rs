//! In-memory adapters for the storage ports.
//!
//! Characters are held as JSON snapshots rather than live aggregates, so a
//! read goes through the same decode and invariant check as any other store.

use std::sync::Arc;

use async_trait::async_trait;
use charsheet_domain::{Character, CharacterId, RuleCatalog};
use dashmap::DashMap;
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::infrastructure::ports::{CharacterRepo, RepoError, RuleCatalogRepo};

#[derive(Default)]
pub struct InMemoryCharacterRepo {
    characters: DashMap<CharacterId, serde_json::Value>,
}

impl InMemoryCharacterRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }
}

fn decode(value: &serde_json::Value) -> Result<Character, RepoError> {
    Character::deserialize(value).map_err(RepoError::serialization)
}

#[async_trait]
impl CharacterRepo for InMemoryCharacterRepo {
    async fn get(&self, id: CharacterId) -> Result<Option<Character>, RepoError> {
        self.characters
            .get(&id)
            .map(|entry| decode(entry.value()))
            .transpose()
    }

    async fn save(&self, character: &Character) -> Result<(), RepoError> {
        let snapshot = serde_json::to_value(character).map_err(RepoError::serialization)?;
        self.characters.insert(character.id(), snapshot);
        Ok(())
    }

    async fn delete(&self, id: CharacterId) -> Result<(), RepoError> {
        self.characters
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| RepoError::not_found("character", id))
    }

    async fn list(&self) -> Result<Vec<Character>, RepoError> {
        let mut characters = self
            .characters
            .iter()
            .map(|entry| decode(entry.value()))
            .collect::<Result<Vec<_>, _>>()?;
        characters.sort_by(|a, b| a.name().cmp(b.name()).then(a.id().cmp(&b.id())));
        Ok(characters)
    }
}

/// Holds the current catalog behind a lock. Readers clone the `Arc`, so a
/// replace never disturbs a request already in flight.
pub struct InMemoryRuleCatalogRepo {
    catalog: RwLock<Arc<RuleCatalog>>,
}

impl InMemoryRuleCatalogRepo {
    pub fn new(catalog: RuleCatalog) -> Self {
        Self {
            catalog: RwLock::new(Arc::new(catalog)),
        }
    }
}

impl Default for InMemoryRuleCatalogRepo {
    fn default() -> Self {
        Self::new(RuleCatalog::new())
    }
}

#[async_trait]
impl RuleCatalogRepo for InMemoryRuleCatalogRepo {
    async fn current(&self) -> Arc<RuleCatalog> {
        Arc::clone(&*self.catalog.read().await)
    }

    async fn replace(&self, catalog: RuleCatalog) -> Result<(), RepoError> {
        *self.catalog.write().await = Arc::new(catalog);
        Ok(())
    }
}
