//! JSON catalog and roster importer.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use charsheet_domain::{CatalogDocument, Character, DomainError, RuleCatalog};
use thiserror::Error;
use tokio::fs;

// Lowercase kebab-case, compiled once
static SLUG_PATTERN: OnceLock<Result<regex_lite::Regex, regex_lite::Error>> = OnceLock::new();

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("Invalid catalog: {0}")]
    Domain(#[from] DomainError),
    #[error("Invalid {kind} slug: {slug:?}")]
    InvalidSlug { kind: &'static str, slug: String },
    #[error("Duplicate {kind} slug: {slug}")]
    DuplicateSlug { kind: &'static str, slug: String },
    #[error("Duplicate character id in roster: {0}")]
    DuplicateCharacter(String),
    #[error("Slug pattern failed to compile: {0}")]
    Pattern(String),
}

/// Reads catalog and roster files from disk.
#[derive(Debug, Clone, Default)]
pub struct JsonImporter;

impl JsonImporter {
    pub fn new() -> Self {
        Self
    }

    /// Load and index a rule catalog. Every race, class, item and spell slug
    /// must be lowercase kebab-case and unique within its kind.
    pub async fn load_catalog(&self, path: &Path) -> Result<RuleCatalog, ImportError> {
        let content = read(path).await?;
        let document: CatalogDocument = serde_json::from_str(&content)?;
        check_slugs(&document)?;

        let catalog = RuleCatalog::from_document(document)?;
        tracing::info!(path = %path.display(), "Loaded rule catalog");
        Ok(catalog)
    }

    /// Load character snapshots. Each one is checked against the aggregate
    /// invariants while decoding.
    pub async fn load_roster(&self, path: &Path) -> Result<Vec<Character>, ImportError> {
        let content = read(path).await?;
        let characters: Vec<Character> = serde_json::from_str(&content)?;

        let mut seen = HashSet::new();
        for character in &characters {
            if !seen.insert(character.id()) {
                return Err(ImportError::DuplicateCharacter(character.id().to_string()));
            }
        }

        tracing::info!(
            path = %path.display(),
            count = characters.len(),
            "Loaded character roster"
        );
        Ok(characters)
    }
}

async fn read(path: &Path) -> Result<String, ImportError> {
    if !fs::try_exists(path).await? {
        return Err(ImportError::NotFound(path.to_path_buf()));
    }
    Ok(fs::read_to_string(path).await?)
}

fn slug_pattern() -> Result<&'static regex_lite::Regex, ImportError> {
    SLUG_PATTERN
        .get_or_init(|| regex_lite::Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$"))
        .as_ref()
        .map_err(|err| ImportError::Pattern(err.to_string()))
}

fn check_slugs(document: &CatalogDocument) -> Result<(), ImportError> {
    let pattern = slug_pattern()?;
    let groups: [(&'static str, Vec<&str>); 5] = [
        ("race", document.races.iter().map(|r| r.slug.as_str()).collect()),
        ("class", document.classes.iter().map(|c| c.slug.as_str()).collect()),
        ("feat", document.feats.iter().map(|f| f.slug.as_str()).collect()),
        ("item", document.items.iter().map(|i| i.slug.as_str()).collect()),
        ("spell", document.spells.iter().map(|s| s.slug.as_str()).collect()),
    ];

    for (kind, slugs) in groups {
        let mut seen = HashSet::new();
        for slug in slugs {
            if !pattern.is_match(slug) {
                return Err(ImportError::InvalidSlug {
                    kind,
                    slug: slug.to_string(),
                });
            }
            if !seen.insert(slug) {
                return Err(ImportError::DuplicateSlug {
                    kind,
                    slug: slug.to_string(),
                });
            }
        }
    }
    Ok(())
}
