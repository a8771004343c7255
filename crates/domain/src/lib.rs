extern crate self as charsheet_domain;

pub mod aggregates;
pub mod catalog;
pub mod entities;
pub mod error;
pub mod events;
pub mod ids;
pub mod rules;
pub mod value_objects;

pub use aggregates::Character;
pub use catalog::{CatalogDocument, RuleCatalog};
pub use error::DomainError;
pub use ids::{CharacterId, EquipmentId};

pub use entities::{
    CharacterSpell, ClassAssignment, CounterAction, CounterUpdate, EquipmentRecord,
    GrantedProficiency, ProficiencyGrant, ProficiencyKind, ResetTiming, ResourceCounter, RestKind,
    SpellSource, SpellStatus,
};
pub use events::{
    AbilityScoresChanged, AttunementChange, CounterSync, DeadFlagChange, DeathSaveOutcome, DeathSaveRecorded,
    DeathSaveResult, ExhaustionChange, HitPointChange, HitPointsGained, Revived,
    SpellPreparationChange, TempHpChange,
};
pub use rules::{derive_stats, DerivedStats, DEFAULT_ATTUNEMENT_SLOTS};
pub use value_objects::{
    Ability, AbilityScoreMethod, AbilityScores, CurrencyHoldings, Denomination, SignedAmount,
    Skill,
};
