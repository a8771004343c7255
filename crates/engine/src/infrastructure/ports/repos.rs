//! Repository port traits for character and rule storage.

use std::sync::Arc;

use async_trait::async_trait;
use charsheet_domain::{Character, CharacterId, RuleCatalog};

use super::error::RepoError;

// =============================================================================
// Character Storage
// =============================================================================

/// Whole-aggregate persistence. `save` replaces the stored character, so a
/// use case that returns `Ok` has written every sub-record it touched.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CharacterRepo: Send + Sync {
    async fn get(&self, id: CharacterId) -> Result<Option<Character>, RepoError>;
    async fn save(&self, character: &Character) -> Result<(), RepoError>;
    async fn delete(&self, id: CharacterId) -> Result<(), RepoError>;
    async fn list(&self) -> Result<Vec<Character>, RepoError>;
}

// =============================================================================
// Rule Catalog
// =============================================================================

/// Read-only reference data. Use cases take one snapshot per request.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RuleCatalogRepo: Send + Sync {
    async fn current(&self) -> Arc<RuleCatalog>;
    async fn replace(&self, catalog: RuleCatalog) -> Result<(), RepoError>;
}
