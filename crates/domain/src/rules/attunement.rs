//! Attunement slot resolution.

use serde::{Deserialize, Serialize};

use crate::catalog::{ItemDefinition, ModifierCategory, RuleCatalog};
use crate::entities::{ClassAssignment, EquipmentRecord};
use crate::error::DomainError;
use crate::ids::EquipmentId;

pub const DEFAULT_ATTUNEMENT_SLOTS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttunementSummary {
    pub used: u32,
    pub max: u32,
}

/// Maximum attunement slots.
///
/// `attunement_max` modifiers are absolute values, not bonuses. Each class is
/// checked against its own level, so Fighter 10 / Artificer 10 only unlocks
/// the Artificer level 10 grant. The highest unlocked value replaces the
/// default only when it is larger.
pub fn max_attunement_slots(
    classes: &[ClassAssignment],
    catalog: &RuleCatalog,
    default_slots: u32,
) -> u32 {
    classes
        .iter()
        .flat_map(|assignment| {
            catalog.class_feature_modifiers(
                &assignment.class,
                assignment.level,
                ModifierCategory::AttunementMax,
            )
        })
        .map(|modifier| modifier.value.max(0) as u32)
        .fold(default_slots, u32::max)
}

pub fn attuned_count(equipment: &[EquipmentRecord]) -> u32 {
    equipment.iter().filter(|e| e.is_attuned).count() as u32
}

/// Check whether `record` may become attuned.
///
/// The record itself is left out of the count so re-attuning an already
/// attuned item never trips the limit.
pub fn can_attune(
    equipment: &[EquipmentRecord],
    record: EquipmentId,
    item: &ItemDefinition,
    max_slots: u32,
) -> Result<(), DomainError> {
    if !item.requires_attunement {
        return Err(DomainError::NotAttunable(item.name.clone()));
    }

    let current = equipment
        .iter()
        .filter(|e| e.is_attuned && e.id != record)
        .count() as u32;
    if current >= max_slots {
        return Err(DomainError::attunement_slots_full(current, max_slots));
    }
    Ok(())
}
