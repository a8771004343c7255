//! Charsheet Engine library.
//!
//! Orchestrates character sheet operations over the rules in
//! `charsheet-domain`.
//!
//! ## Structure
//!
//! - `use_cases/` - one struct per operation, grouped by area
//! - `infrastructure/` - ports plus in-memory, clock and JSON import adapters
//! - `app` - application composition

pub mod app;
pub mod infrastructure;
pub mod use_cases;

pub use app::App;
