//! Flat bonuses from every rule source a character currently draws on.
//!
//! Resolution filters on [`ModifierCategory`] only; the source kind decides
//! whether a source is active, never what its modifiers mean.

use std::collections::BTreeMap;

use crate::aggregates::Character;
use crate::catalog::{ModifierCategory, RuleCatalog, RuleSource};
use crate::value_objects::{Ability, Skill};

/// Rule sources whose modifiers apply right now, in this order:
///
/// - race, then parent race
/// - each assigned class, and the class features its level has unlocked
/// - feats
/// - equipped items, counting items that need attunement only while attuned
/// - active conditions
///
/// Unknown races, classes and items are skipped. Feats and conditions are
/// keyed by slug alone, so they need no catalog entry to carry modifiers.
pub fn active_sources(character: &Character, catalog: &RuleCatalog) -> Vec<RuleSource> {
    let mut sources: Vec<RuleSource> = character
        .race()
        .map(|race| catalog.race_chain(race))
        .unwrap_or_default()
        .into_iter()
        .map(|race| RuleSource::race(race.slug.as_str()))
        .collect();

    for assignment in character.classes() {
        let Some(class) = catalog.class(&assignment.class) else {
            continue;
        };
        sources.push(RuleSource::class(class.slug.as_str()));
        sources.extend(
            class
                .features_up_to(assignment.level)
                .map(|feature| RuleSource::class_feature(feature.slug.as_str())),
        );
    }

    sources.extend(character.feats().iter().map(|feat| RuleSource::feat(feat.as_str())));

    sources.extend(
        character
            .equipment()
            .iter()
            .filter(|record| record.equipped)
            .filter_map(|record| {
                let item = catalog.item(&record.item_slug)?;
                (!item.requires_attunement || record.is_attuned)
                    .then(|| RuleSource::item(item.slug.as_str()))
            }),
    );

    sources.extend(
        character
            .conditions()
            .iter()
            .map(|condition| RuleSource::condition(condition.as_str())),
    );

    sources
}

/// Sums of the additive modifier categories.
///
/// Ability scores and attunement have their own resolvers and are not
/// collected here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetBonuses {
    pub armor_class: i32,
    pub initiative: i32,
    pub speed: i32,
    pub hit_points_per_level: i32,
    pub saving_throws: BTreeMap<Ability, i32>,
    pub skills: BTreeMap<Skill, i32>,
}

impl SheetBonuses {
    /// Fold the fixed modifiers of `sources`. Choice modifiers and
    /// unparseable targets contribute nothing.
    pub fn collect(sources: &[RuleSource], catalog: &RuleCatalog) -> Self {
        let mut bonuses = Self::default();
        let fixed = sources
            .iter()
            .flat_map(|source| catalog.modifiers_for(source))
            .filter(|modifier| !modifier.is_choice());

        for modifier in fixed {
            let target = modifier.target.as_deref();
            match modifier.category {
                ModifierCategory::ArmorClass => bonuses.armor_class += modifier.value,
                ModifierCategory::Initiative => bonuses.initiative += modifier.value,
                ModifierCategory::Speed => bonuses.speed += modifier.value,
                ModifierCategory::HitPointsPerLevel => {
                    bonuses.hit_points_per_level += modifier.value
                }
                ModifierCategory::SavingThrow => {
                    if let Some(ability) = target.and_then(|t| t.parse::<Ability>().ok()) {
                        *bonuses.saving_throws.entry(ability).or_default() += modifier.value;
                    }
                }
                ModifierCategory::Skill => {
                    if let Some(skill) = target.and_then(|t| t.parse::<Skill>().ok()) {
                        *bonuses.skills.entry(skill).or_default() += modifier.value;
                    }
                }
                ModifierCategory::AbilityScore
                | ModifierCategory::AttunementMax
                | ModifierCategory::Other => {}
            }
        }
        bonuses
    }

    /// Bonuses from everything `character` currently has.
    pub fn for_character(character: &Character, catalog: &RuleCatalog) -> Self {
        Self::collect(&active_sources(character, catalog), catalog)
    }

    #[inline]
    pub fn saving_throw(&self, ability: Ability) -> i32 {
        self.saving_throws.get(&ability).copied().unwrap_or(0)
    }

    #[inline]
    pub fn skill(&self, skill: Skill) -> i32 {
        self.skills.get(&skill).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ClassDefinition, ItemDefinition, ItemKind, Modifier, RaceDefinition};
    use crate::entities::EquipmentRecord;
    use chrono::{TimeZone, Utc};

    fn catalog() -> RuleCatalog {
        let fixed = |source: RuleSource, category, target: Option<&str>, value| {
            Modifier::fixed(source, category, target, value)
        };
        RuleCatalog::new()
            .with_race(RaceDefinition::new("elf", "Elf"))
            .with_race(RaceDefinition::new("wood-elf", "Wood Elf").with_parent("elf"))
            .with_class(
                ClassDefinition::new("monk", "Monk", 8)
                    .with_feature("unarmored-movement", "Unarmored Movement", 2),
            )
            .with_item(
                ItemDefinition::new("ring-of-protection", "Ring of Protection", ItemKind::Gear)
                    .with_attunement(),
            )
            .with_item(ItemDefinition::new("cloak-of-elvenkind", "Cloak", ItemKind::Gear))
            .with_modifier(fixed(RuleSource::race("wood-elf"), ModifierCategory::Speed, None, 5))
            .with_modifier(fixed(
                RuleSource::class_feature("unarmored-movement"),
                ModifierCategory::Speed,
                None,
                10,
            ))
            .with_modifier(fixed(RuleSource::feat("alert"), ModifierCategory::Initiative, None, 5))
            .with_modifier(fixed(
                RuleSource::feat("tough"),
                ModifierCategory::HitPointsPerLevel,
                None,
                2,
            ))
            .with_modifier(fixed(
                RuleSource::item("ring-of-protection"),
                ModifierCategory::ArmorClass,
                None,
                1,
            ))
            .with_modifier(fixed(
                RuleSource::item("ring-of-protection"),
                ModifierCategory::SavingThrow,
                Some("WIS"),
                1,
            ))
            .with_modifier(fixed(
                RuleSource::item("cloak-of-elvenkind"),
                ModifierCategory::Skill,
                Some("stealth"),
                2,
            ))
            .with_modifier(fixed(
                RuleSource::condition("slowed"),
                ModifierCategory::ArmorClass,
                None,
                -2,
            ))
            .with_modifier(Modifier::choice(RuleSource::feat("alert"), ModifierCategory::Skill, 1, 1))
    }

    fn monk(level: u8) -> Character {
        Character::new("Ember", Utc.timestamp_opt(1_700_000_000, 0).unwrap())
            .unwrap()
            .with_race("wood-elf")
            .with_class("monk", level)
    }

    #[test]
    fn sources_follow_race_class_feat_item_condition_order() {
        let character = monk(2)
            .with_feat("alert")
            .with_equipment(EquipmentRecord::new("cloak-of-elvenkind").equipped())
            .with_condition("slowed");
        let sources: Vec<String> = active_sources(&character, &catalog())
            .iter()
            .map(RuleSource::to_string)
            .collect();
        assert_eq!(
            sources,
            vec![
                "race:wood-elf",
                "race:elf",
                "class:monk",
                "class_feature:unarmored-movement",
                "feat:alert",
                "item:cloak-of-elvenkind",
                "condition:slowed",
            ]
        );
    }

    #[test]
    fn locked_features_and_unattuned_items_stay_inactive() {
        let character = monk(1)
            .with_equipment(EquipmentRecord::new("ring-of-protection").equipped())
            .with_equipment(EquipmentRecord::new("cloak-of-elvenkind"));
        let bonuses = SheetBonuses::for_character(&character, &catalog());
        assert_eq!(bonuses.speed, 5);
        assert_eq!(bonuses.armor_class, 0);
        assert_eq!(bonuses.skill(Skill::Stealth), 0);
    }

    #[test]
    fn sums_every_additive_category() {
        let character = monk(2)
            .with_feat("alert")
            .with_feat("tough")
            .with_equipment(EquipmentRecord::new("ring-of-protection").equipped().attuned())
            .with_equipment(EquipmentRecord::new("cloak-of-elvenkind").equipped())
            .with_condition("slowed");
        let bonuses = SheetBonuses::for_character(&character, &catalog());

        assert_eq!(bonuses.speed, 15);
        assert_eq!(bonuses.initiative, 5);
        assert_eq!(bonuses.hit_points_per_level, 2);
        assert_eq!(bonuses.armor_class, 1 - 2);
        assert_eq!(bonuses.saving_throw(Ability::Wis), 1);
        assert_eq!(bonuses.saving_throw(Ability::Str), 0);
        assert_eq!(bonuses.skill(Skill::Stealth), 2);
        assert_eq!(bonuses.skills.len(), 1, "choice modifiers are skipped");
    }

    #[test]
    fn unknown_targets_are_ignored() {
        let catalog = RuleCatalog::new().with_modifier(Modifier::fixed(
            RuleSource::feat("odd"),
            ModifierCategory::Skill,
            Some("basket-weaving"),
            3,
        ));
        let bonuses = SheetBonuses::collect(&[RuleSource::feat("odd")], &catalog);
        assert!(bonuses.skills.is_empty());
    }
}
