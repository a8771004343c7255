//! Use cases - operation orchestration over the character aggregate.

pub mod character_sheet;

pub use character_sheet::{CharacterSheetError, CharacterSheetUseCases};
