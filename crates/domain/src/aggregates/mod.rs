//! Aggregate roots - domain objects that own their related data
//!
//! Each aggregate:
//! - Has a unique identity
//! - Owns all its constituent parts (enforced by Rust ownership)
//! - Exposes behavior through methods, not public fields
//! - Returns outcome enums from mutations
//!
//! | Concern | How it is expressed |
//! |---------|---------------------|
//! | Encapsulation | Private fields + `#[inline]` accessors |
//! | Construction | `::new()` + `with_*` builder methods |
//! | Invariants | `validate()`, also run on deserialization |
//! | Change reporting | Outcome enums from `crate::events` |

pub mod character;

pub use character::Character;
