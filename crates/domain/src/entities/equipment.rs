use serde::{Deserialize, Serialize};

use crate::ids::EquipmentId;

/// One inventory row: an item, how many, and its equip/attune state.
///
/// Attunement is independent of `equipped`; moving an item in or out of
/// hand never changes `is_attuned`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentRecord {
    pub id: EquipmentId,
    pub item_slug: String,
    #[serde(default = "default_quantity")]
    pub quantity: u64,
    #[serde(default)]
    pub equipped: bool,
    #[serde(default)]
    pub is_attuned: bool,
}

fn default_quantity() -> u64 {
    1
}

impl EquipmentRecord {
    pub fn new(item_slug: impl Into<String>) -> Self {
        Self {
            id: EquipmentId::new(),
            item_slug: item_slug.into(),
            quantity: 1,
            equipped: false,
            is_attuned: false,
        }
    }

    pub fn with_id(mut self, id: EquipmentId) -> Self {
        self.id = id;
        self
    }

    pub fn with_quantity(mut self, quantity: u64) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn equipped(mut self) -> Self {
        self.equipped = true;
        self
    }

    pub fn attuned(mut self) -> Self {
        self.is_attuned = true;
        self
    }
}
