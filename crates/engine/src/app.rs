//! Application state and composition.

use std::sync::Arc;

use charsheet_domain::RuleCatalog;

use crate::infrastructure::{
    app_settings::EngineSettings,
    clock::{SystemClock, SystemRandom},
    memory::{InMemoryCharacterRepo, InMemoryRuleCatalogRepo},
    ports::{CharacterRepo, ClockPort, RandomPort, RuleCatalogRepo},
};
use crate::use_cases;

/// Main application state.
///
/// Holds the repositories and use cases. Ports are injected as trait objects
/// so tests can swap in fixed clocks and dice.
pub struct App {
    pub settings: EngineSettings,
    pub repositories: Repositories,
    pub use_cases: UseCases,
}

pub struct Repositories {
    pub characters: Arc<dyn CharacterRepo>,
    pub catalog: Arc<dyn RuleCatalogRepo>,
}

/// Container for all use cases.
pub struct UseCases {
    pub character_sheet: use_cases::CharacterSheetUseCases,
}

impl App {
    /// Wire every use case against the given ports.
    pub fn new(
        settings: EngineSettings,
        characters: Arc<dyn CharacterRepo>,
        catalog: Arc<dyn RuleCatalogRepo>,
        clock: Arc<dyn ClockPort>,
        random: Arc<dyn RandomPort>,
    ) -> Self {
        let character_sheet = use_cases::CharacterSheetUseCases::new(
            characters.clone(),
            catalog.clone(),
            clock,
            random,
            settings.default_attunement_slots,
        );

        Self {
            settings,
            repositories: Repositories {
                characters,
                catalog,
            },
            use_cases: UseCases { character_sheet },
        }
    }

    /// In-memory storage with the system clock and dice.
    pub fn in_memory(settings: EngineSettings, catalog: RuleCatalog) -> Self {
        Self::new(
            settings,
            Arc::new(InMemoryCharacterRepo::new()),
            Arc::new(InMemoryRuleCatalogRepo::new(catalog)),
            Arc::new(SystemClock::new()),
            Arc::new(SystemRandom::new()),
        )
    }
}
