//! Engine settings loaded from the environment.
//!
//! Every value has a default, so an empty environment yields a working
//! engine over an empty catalog. Invalid numbers are logged and ignored.

use std::path::PathBuf;

use charsheet_domain::DEFAULT_ATTUNEMENT_SLOTS;
use serde::{Deserialize, Serialize};

pub const CATALOG_PATH_VAR: &str = "CHARSHEET_CATALOG_PATH";
pub const ROSTER_PATH_VAR: &str = "CHARSHEET_ROSTER_PATH";
pub const LOG_FILTER_VAR: &str = "CHARSHEET_LOG_FILTER";
pub const ATTUNEMENT_SLOTS_VAR: &str = "CHARSHEET_DEFAULT_ATTUNEMENT_SLOTS";

pub const DEFAULT_LOG_FILTER: &str = "charsheet_engine=debug";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSettings {
    /// JSON rule catalog. An empty catalog is used when unset.
    pub catalog_path: Option<PathBuf>,
    /// JSON array of character snapshots loaded at startup.
    pub roster_path: Option<PathBuf>,
    pub log_filter: String,
    /// Slots available before any class feature raises the cap.
    pub default_attunement_slots: u32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            catalog_path: None,
            roster_path: None,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            default_attunement_slots: DEFAULT_ATTUNEMENT_SLOTS,
        }
    }
}

impl EngineSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut settings = Self {
            catalog_path: read(CATALOG_PATH_VAR).map(PathBuf::from),
            roster_path: read(ROSTER_PATH_VAR).map(PathBuf::from),
            log_filter: read(LOG_FILTER_VAR).unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
            default_attunement_slots: DEFAULT_ATTUNEMENT_SLOTS,
        };

        if let Some(val) = read(ATTUNEMENT_SLOTS_VAR) {
            match val.parse::<u32>() {
                Ok(slots) => {
                    settings.default_attunement_slots = slots;
                    tracing::info!(slots, "Applied {} environment variable", ATTUNEMENT_SLOTS_VAR);
                }
                Err(_) => {
                    tracing::warn!(
                        val = %val,
                        default = DEFAULT_ATTUNEMENT_SLOTS,
                        "{} is not a valid u32, ignoring",
                        ATTUNEMENT_SLOTS_VAR
                    );
                }
            }
        }

        settings
    }

    /// The filter the subscriber should start with, before full settings are
    /// read. `RUST_LOG` still wins over this in `main`.
    pub fn log_filter_from_env() -> String {
        std::env::var(LOG_FILTER_VAR)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string())
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.default_attunement_slots == 0 {
            return Err(format!("{} must be greater than 0", ATTUNEMENT_SLOTS_VAR));
        }
        if self.log_filter.trim().is_empty() {
            return Err(format!("{} cannot be empty", LOG_FILTER_VAR));
        }
        Ok(())
    }
}
