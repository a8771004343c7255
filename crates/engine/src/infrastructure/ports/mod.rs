//! Port traits for infrastructure boundaries.
//!
//! These are the ONLY abstractions in the engine. Everything else is concrete types.
//! Ports exist for:
//! - Character storage (in-memory today, a database behind the HTTP layer)
//! - The rule catalog (loaded once, swapped on reload)
//! - Clock/Random (for testing)

mod error;
mod repos;
mod testing;

pub use error::RepoError;
pub use repos::{CharacterRepo, RuleCatalogRepo};
pub use testing::{ClockPort, RandomPort};

#[cfg(test)]
pub use repos::{MockCharacterRepo, MockRuleCatalogRepo};
#[cfg(test)]
pub use testing::{MockClockPort, MockRandomPort};
