//! Sub-records owned by the character aggregate.
//!
//! These are simple data structs: the aggregate enforces the invariants that
//! span them (attunement count, preparation limits, counter ownership).

mod character_spell;
mod class_assignment;
mod counter;
mod equipment;
mod proficiency;

pub use character_spell::{CharacterSpell, SpellSource, SpellStatus};
pub use class_assignment::ClassAssignment;
pub use counter::{
    counter_slug, kebab, CounterAction, CounterUpdate, ResetTiming, ResourceCounter, RestKind,
};
pub use equipment::EquipmentRecord;
pub use proficiency::{GrantedProficiency, ProficiencyGrant, ProficiencyKind};
