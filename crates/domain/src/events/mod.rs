//! Domain Events
//!
//! Return types from aggregate mutations, communicating what happened when
//! state was modified. The engine logs and maps them at the adapter boundary.

pub mod character_events;

pub use character_events::*;
