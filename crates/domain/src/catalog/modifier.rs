//! Modifier store entries - typed bonuses attached to rule sources.
//!
//! A modifier never knows what kind of thing granted it beyond its
//! [`RuleSource`]. Resolution code filters on [`ModifierCategory`] only.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of rule source a modifier is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleSourceKind {
    Race,
    Class,
    ClassFeature,
    Feat,
    Item,
    Condition,
}

impl RuleSourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Race => "race",
            Self::Class => "class",
            Self::ClassFeature => "class_feature",
            Self::Feat => "feat",
            Self::Item => "item",
            Self::Condition => "condition",
        }
    }
}

/// Polymorphic reference to whatever granted a modifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RuleSource {
    pub kind: RuleSourceKind,
    pub id: String,
}

impl RuleSource {
    pub fn new(kind: RuleSourceKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }

    pub fn race(slug: impl Into<String>) -> Self {
        Self::new(RuleSourceKind::Race, slug)
    }

    pub fn class(slug: impl Into<String>) -> Self {
        Self::new(RuleSourceKind::Class, slug)
    }

    pub fn class_feature(slug: impl Into<String>) -> Self {
        Self::new(RuleSourceKind::ClassFeature, slug)
    }

    pub fn feat(slug: impl Into<String>) -> Self {
        Self::new(RuleSourceKind::Feat, slug)
    }

    pub fn item(slug: impl Into<String>) -> Self {
        Self::new(RuleSourceKind::Item, slug)
    }

    pub fn condition(slug: impl Into<String>) -> Self {
        Self::new(RuleSourceKind::Condition, slug)
    }
}

impl fmt::Display for RuleSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.as_str(), self.id)
    }
}

/// What a modifier adjusts.
///
/// Additive categories (`armor_class`, `initiative`, `speed`, `skill`,
/// `saving_throw`, `hit_points_per_level`) sum across every active source.
/// `skill` targets a skill slug and `saving_throw` an ability code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModifierCategory {
    AbilityScore,
    Skill,
    SavingThrow,
    /// Absolute replacement for the attunement slot count
    AttunementMax,
    HitPointsPerLevel,
    ArmorClass,
    Initiative,
    Speed,
    /// Categories this engine does not resolve
    #[serde(other)]
    Other,
}

impl ModifierCategory {
    /// Categories whose fixed modifiers must name a target.
    pub fn requires_target(&self) -> bool {
        matches!(self, Self::AbilityScore | Self::Skill | Self::SavingThrow)
    }
}

/// Player-choice metadata for modifiers resolved at build time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifierChoice {
    pub choice_count: u8,
    #[serde(default)]
    pub constraint: Option<String>,
}

/// A single typed bonus.
///
/// Fixed modifiers (`choice == None`) of a targeted category always carry a
/// `target`. Choice modifiers are resolved into player selections elsewhere
/// and contribute nothing here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifier {
    pub source: RuleSource,
    pub category: ModifierCategory,
    #[serde(default)]
    pub target: Option<String>,
    pub value: i32,
    #[serde(default)]
    pub choice: Option<ModifierChoice>,
}

impl Modifier {
    pub fn fixed(
        source: RuleSource,
        category: ModifierCategory,
        target: Option<&str>,
        value: i32,
    ) -> Self {
        Self {
            source,
            category,
            target: target.map(str::to_string),
            value,
            choice: None,
        }
    }

    pub fn choice(
        source: RuleSource,
        category: ModifierCategory,
        value: i32,
        choice_count: u8,
    ) -> Self {
        Self {
            source,
            category,
            target: None,
            value,
            choice: Some(ModifierChoice {
                choice_count,
                constraint: None,
            }),
        }
    }

    #[inline]
    pub fn is_choice(&self) -> bool {
        self.choice.is_some()
    }

    /// A fixed modifier of a targeted category with no target is malformed.
    pub fn is_well_formed(&self) -> bool {
        self.is_choice() || !self.category.requires_target() || self.target.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_category_deserializes_as_other() {
        let category: ModifierCategory = serde_json::from_str("\"damage_resistance\"").unwrap();
        assert_eq!(category, ModifierCategory::Other);
    }

    #[test]
    fn fixed_ability_modifier_needs_target() {
        let source = RuleSource::race("dwarf");
        let ok = Modifier::fixed(source.clone(), ModifierCategory::AbilityScore, Some("CON"), 2);
        let missing = Modifier::fixed(source.clone(), ModifierCategory::AbilityScore, None, 2);
        let untargeted = Modifier::fixed(source, ModifierCategory::AttunementMax, None, 4);

        assert!(ok.is_well_formed());
        assert!(!missing.is_well_formed());
        assert!(untargeted.is_well_formed());
    }

    #[test]
    fn choice_modifiers_are_well_formed_without_target() {
        let m = Modifier::choice(RuleSource::race("half-elf"), ModifierCategory::AbilityScore, 1, 2);
        assert!(m.is_choice());
        assert!(m.is_well_formed());
    }

    #[test]
    fn rule_source_displays_kind_and_id() {
        let source = RuleSource::class_feature("artificer-magic-item-adept");
        assert_eq!(source.to_string(), "class_feature:artificer-magic-item-adept");
    }
}
