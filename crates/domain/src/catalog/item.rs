//! Item definitions - weapons, armor, shields and everything else.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDefinition {
    pub slug: String,
    pub name: String,
    #[serde(flatten)]
    pub kind: ItemKind,
    #[serde(default)]
    pub requires_attunement: bool,
    /// Enhancement bonus (+1 longsword, +2 shield, ...)
    #[serde(default)]
    pub magic_bonus: i32,
}

impl ItemDefinition {
    pub fn new(slug: impl Into<String>, name: impl Into<String>, kind: ItemKind) -> Self {
        Self {
            slug: slug.into(),
            name: name.into(),
            kind,
            requires_attunement: false,
            magic_bonus: 0,
        }
    }

    pub fn with_attunement(mut self) -> Self {
        self.requires_attunement = true;
        self
    }

    pub fn with_magic_bonus(mut self, bonus: i32) -> Self {
        self.magic_bonus = bonus;
        self
    }

    pub fn weapon(&self) -> Option<&WeaponProperties> {
        match &self.kind {
            ItemKind::Weapon(props) => Some(props),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ItemKind {
    Weapon(WeaponProperties),
    Armor(ArmorProperties),
    Shield { armor_class_bonus: i32 },
    Gear,
    Currency,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WeaponProperties {
    #[serde(default)]
    pub ranged: bool,
    #[serde(default)]
    pub finesse: bool,
    /// Proficiency slugs that cover this weapon, most specific first
    /// (e.g. `["longsword", "martial-weapons"]`)
    #[serde(default)]
    pub proficiency_types: Vec<String>,
}

impl WeaponProperties {
    pub fn melee(proficiency_types: &[&str]) -> Self {
        Self {
            ranged: false,
            finesse: false,
            proficiency_types: proficiency_types.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn ranged(proficiency_types: &[&str]) -> Self {
        Self {
            ranged: true,
            ..Self::melee(proficiency_types)
        }
    }

    pub fn finesse(proficiency_types: &[&str]) -> Self {
        Self {
            finesse: true,
            ..Self::melee(proficiency_types)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArmorCategory {
    Light,
    Medium,
    Heavy,
}

impl ArmorCategory {
    /// Cap on the DEX modifier added to armor class.
    pub fn dex_cap(&self) -> Option<i32> {
        match self {
            Self::Light => None,
            Self::Medium => Some(2),
            Self::Heavy => Some(0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArmorProperties {
    pub category: ArmorCategory,
    pub base_ac: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_flattened_weapon_kind() {
        let json = r#"{
            "slug": "rapier",
            "name": "Rapier",
            "type": "weapon",
            "finesse": true,
            "proficiency_types": ["rapier", "martial-weapons"]
        }"#;
        let item: ItemDefinition = serde_json::from_str(json).unwrap();
        let weapon = item.weapon().unwrap();
        assert!(weapon.finesse);
        assert!(!weapon.ranged);
        assert!(!item.requires_attunement);
        assert_eq!(item.magic_bonus, 0);
    }

    #[test]
    fn deserializes_armor_and_shield() {
        let armor: ItemDefinition = serde_json::from_str(
            r#"{"slug": "half-plate", "name": "Half Plate", "type": "armor", "category": "medium", "base_ac": 15}"#,
        )
        .unwrap();
        assert_eq!(
            armor.kind,
            ItemKind::Armor(ArmorProperties {
                category: ArmorCategory::Medium,
                base_ac: 15
            })
        );

        let shield: ItemDefinition = serde_json::from_str(
            r#"{"slug": "shield", "name": "Shield", "type": "shield", "armor_class_bonus": 2, "magic_bonus": 1}"#,
        )
        .unwrap();
        assert_eq!(shield.kind, ItemKind::Shield { armor_class_bonus: 2 });
        assert_eq!(shield.magic_bonus, 1);
    }

    #[test]
    fn dex_cap_by_armor_category() {
        assert_eq!(ArmorCategory::Light.dex_cap(), None);
        assert_eq!(ArmorCategory::Medium.dex_cap(), Some(2));
        assert_eq!(ArmorCategory::Heavy.dex_cap(), Some(0));
    }
}
