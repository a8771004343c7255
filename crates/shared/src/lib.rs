//! Charsheet wire contracts.
//!
//! Request bodies, response bodies and the error envelope for character sheet
//! operations. Requests validate their own fields and convert into domain
//! inputs; responses are built from domain outcomes. Key names here are part
//! of the observable contract, so they never change with internal renames.
//!
//! # Design Principles
//!
//! 1. **No business logic** - rule decisions live in `charsheet-domain`
//! 2. **Validation before mutation** - every request is checked per field
//!    before the engine loads a character

pub mod error;
pub mod requests;
pub mod responses;

pub use error::{ErrorResponse, FieldErrors};
pub use requests::{
    AbilityScoresInput, ApplyCurrencyRequest, ApplyHitPointsRequest, CharacterRequest,
    DeathSaveMark, HitPointMethod, HitPointsInput, LevelUpHitPointsInput,
    LevelUpHitPointsRequest, RecordDeathSaveRequest, RestRequest, ReviveInput, ReviveRequest,
    SetAbilityScoresRequest, SetAttunementRequest, SetDeadRequest, SetExhaustionRequest,
    SpellPreparationInput, SpellPreparationRequest, UpdateCounterRequest,
};
pub use responses::{
    AbilityScoresResponse, CounterResponse, CurrencyResponse, DeadFlagResponse,
    DeathSaveResponse, DerivedStatsResponse, EquipmentResponse, ExhaustionResponse,
    HitPointsResponse, LevelUpHitPointsResponse, RestResponse, ReviveResponse, SpellResponse,
};
