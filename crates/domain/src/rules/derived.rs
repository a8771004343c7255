//! The full derived sheet, recomputed on every read.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::attunement::{attuned_count, AttunementSummary};
use super::bonuses::SheetBonuses;
use super::combat::{
    armor_base, armor_class, saving_throws, shield_bonus, skill_bonus, skills,
    spellcasting_by_class, weapon_stats, CombatContext, SavingThrow, SkillBonus,
    SpellcastingStats, WeaponStats,
};
use crate::aggregates::Character;
use crate::catalog::{ItemDefinition, ItemKind, RuleCatalog};
use crate::entities::{EquipmentRecord, ResetTiming, ResourceCounter};
use crate::ids::{CharacterId, EquipmentId};
use crate::value_objects::{Ability, CurrencyHoldings, Denomination, Skill};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityScoreStat {
    pub score: i32,
    pub modifier: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitPointSummary {
    pub current_hit_points: u32,
    pub max_hit_points: u32,
    pub temp_hit_points: u32,
    pub death_save_successes: u8,
    pub death_save_failures: u8,
    pub is_dead: bool,
    pub exhaustion_level: u8,
}

impl From<&Character> for HitPointSummary {
    fn from(character: &Character) -> Self {
        let hp = character.hit_points();
        let saves = character.death_saves();
        Self {
            current_hit_points: hp.current,
            max_hit_points: hp.max,
            temp_hit_points: hp.temp,
            death_save_successes: saves.successes,
            death_save_failures: saves.failures,
            is_dead: character.is_dead(),
            exhaustion_level: character.exhaustion_level(),
        }
    }
}

/// Hit dice of one class: die size and how many the class level grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitDice {
    pub die: u8,
    pub total: u32,
}

/// Base walking speed when the race sets none.
const DEFAULT_SPEED: u32 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterSummary {
    pub slug: String,
    pub name: String,
    pub current: u32,
    pub max: u32,
    pub reset_on: Option<ResetTiming>,
}

impl From<&ResourceCounter> for CounterSummary {
    fn from(counter: &ResourceCounter) -> Self {
        Self {
            slug: counter.slug.clone(),
            name: counter.name.clone(),
            current: counter.current(),
            max: counter.max_uses,
            reset_on: counter.reset_on,
        }
    }
}

/// Combat fields an equipped item contributes. Serialized flat into its row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ItemCombatStats {
    Weapon(WeaponStats),
    Armor { armor_class: i32 },
    Shield { armor_class_bonus: i32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EquipmentStats {
    pub id: EquipmentId,
    pub item_slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub quantity: u64,
    pub equipped: bool,
    pub is_attuned: bool,
    /// Absent unless the row is an equipped weapon, armor or shield
    #[serde(flatten)]
    pub combat: Option<ItemCombatStats>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DerivedStats {
    pub character_id: CharacterId,
    pub name: String,
    pub total_level: u32,
    pub proficiency_bonus: i32,
    pub ability_scores: BTreeMap<Ability, AbilityScoreStat>,
    pub armor_class: i32,
    pub initiative: i32,
    /// Walking speed in feet
    pub speed: i32,
    pub saving_throws: BTreeMap<Ability, SavingThrow>,
    pub skills: BTreeMap<Skill, SkillBonus>,
    pub passive_perception: i32,
    pub passive_investigation: i32,
    pub passive_insight: i32,
    /// Keyed by class slug; non-casting classes are absent
    pub spellcasting: BTreeMap<String, SpellcastingStats>,
    pub hit_points: HitPointSummary,
    /// Keyed by class slug; classes missing from the catalog are absent
    pub hit_dice: BTreeMap<String, HitDice>,
    pub currency: CurrencyHoldings,
    pub attunement: AttunementSummary,
    pub counters: Vec<CounterSummary>,
    pub equipment: Vec<EquipmentStats>,
}

fn combat_stats(
    record: &EquipmentRecord,
    item: Option<&ItemDefinition>,
    ctx: &CombatContext<'_>,
) -> Option<ItemCombatStats> {
    if !record.equipped {
        return None;
    }
    let item = item?;
    match &item.kind {
        ItemKind::Weapon(_) => weapon_stats(item, ctx).map(ItemCombatStats::Weapon),
        ItemKind::Armor(_) => armor_base(item, ctx.abilities.modifier(Ability::Dex))
            .map(|armor_class| ItemCombatStats::Armor { armor_class }),
        ItemKind::Shield { .. } => shield_bonus(item)
            .map(|armor_class_bonus| ItemCombatStats::Shield { armor_class_bonus }),
        ItemKind::Gear | ItemKind::Currency => None,
    }
}

/// Compute every read-side number for a character. Pure: nothing on the
/// character changes, and unknown catalog references contribute nothing.
pub fn derive_stats(
    character: &Character,
    catalog: &RuleCatalog,
    default_attunement_slots: u32,
) -> DerivedStats {
    let abilities = character.resolved_abilities(catalog);
    let proficiencies = character.effective_proficiencies(catalog);
    let bonuses = SheetBonuses::for_character(character, catalog);
    let ctx = CombatContext {
        abilities: &abilities,
        proficiency_bonus: character.proficiency_bonus(),
        proficiencies: &proficiencies,
        bonuses: &bonuses,
    };
    let dex = abilities.modifier(Ability::Dex);

    let ability_scores = Ability::ALL
        .into_iter()
        .map(|ability| {
            (
                ability,
                AbilityScoreStat {
                    score: abilities.score(ability),
                    modifier: abilities.modifier(ability),
                },
            )
        })
        .collect();

    let equipped_items = character
        .equipment()
        .iter()
        .filter(|record| record.equipped)
        .filter_map(|record| catalog.item(&record.item_slug));

    let equipment = character
        .equipment()
        .iter()
        .filter(|record| Denomination::from_item_slug(&record.item_slug).is_none())
        .map(|record| {
            let item = catalog.item(&record.item_slug);
            EquipmentStats {
                id: record.id,
                item_slug: record.item_slug.clone(),
                name: item.map(|i| i.name.clone()),
                quantity: record.quantity,
                equipped: record.equipped,
                is_attuned: record.is_attuned,
                combat: combat_stats(record, item, &ctx),
            }
        })
        .collect();

    let hit_dice = character
        .classes()
        .iter()
        .filter_map(|assignment| {
            let class = catalog.class(&assignment.class)?;
            Some((
                assignment.class.clone(),
                HitDice {
                    die: class.hit_die,
                    total: u32::from(assignment.level),
                },
            ))
        })
        .collect();

    let base_speed = character
        .race()
        .map(|race| catalog.race_chain(race))
        .unwrap_or_default()
        .into_iter()
        .find_map(|race| race.speed)
        .unwrap_or(DEFAULT_SPEED);
    let passive = |skill| 10 + skill_bonus(skill, &ctx).modifier;

    DerivedStats {
        character_id: character.id(),
        name: character.name().to_string(),
        total_level: character.total_level(),
        proficiency_bonus: ctx.proficiency_bonus,
        ability_scores,
        armor_class: armor_class(
            equipped_items,
            dex,
            bonuses.armor_class,
            character.armor_class_override(),
        ),
        initiative: dex + bonuses.initiative,
        speed: i32::try_from(base_speed)
            .unwrap_or(i32::MAX)
            .saturating_add(bonuses.speed)
            .max(0),
        saving_throws: saving_throws(&ctx),
        skills: skills(&ctx),
        passive_perception: passive(Skill::Perception),
        passive_investigation: passive(Skill::Investigation),
        passive_insight: passive(Skill::Insight),
        spellcasting: spellcasting_by_class(character.classes(), character.spells(), &ctx, catalog),
        hit_points: HitPointSummary::from(character),
        hit_dice,
        currency: character.currency(),
        attunement: AttunementSummary {
            used: attuned_count(character.equipment()),
            max: character.max_attunement_slots(catalog, default_attunement_slots),
        },
        counters: character.counters().iter().map(CounterSummary::from).collect(),
        equipment,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{
        ArmorCategory, ArmorProperties, CasterType, ClassDefinition, FeatDefinition, Modifier,
        ModifierCategory, RaceDefinition, RuleSource, SpellAccess, SpellcastingDefinition,
        WeaponProperties,
    };
    use crate::entities::ProficiencyGrant;
    use crate::value_objects::{AbilityScoreMethod, AbilityScores};
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn catalog() -> RuleCatalog {
        RuleCatalog::new()
            .with_race(RaceDefinition::new("elf", "Elf"))
            .with_modifier(Modifier::fixed(
                RuleSource::race("elf"),
                ModifierCategory::AbilityScore,
                Some("DEX"),
                2,
            ))
            .with_class(
                ClassDefinition::new("fighter", "Fighter", 10)
                    .with_proficiency(ProficiencyGrant::weapon("martial-weapons"))
                    .with_saving_throws([Ability::Str, Ability::Con]),
            )
            .with_class(ClassDefinition::new("wizard", "Wizard", 6).with_spellcasting(
                SpellcastingDefinition::new(Ability::Int, CasterType::Full, SpellAccess::Spellbook),
            ))
            .with_item(ItemDefinition::new(
                "rapier",
                "Rapier",
                ItemKind::Weapon(WeaponProperties::finesse(&["rapier", "martial-weapons"])),
            ))
            .with_item(ItemDefinition::new(
                "studded-leather",
                "Studded Leather",
                ItemKind::Armor(ArmorProperties {
                    category: ArmorCategory::Light,
                    base_ac: 12,
                }),
            ))
            .with_item(ItemDefinition::new("rope", "Rope", ItemKind::Gear))
    }

    fn character() -> Character {
        Character::new("Soveliss", Utc.timestamp_opt(1_700_000_000, 0).unwrap())
            .unwrap()
            .with_race("elf")
            .with_ability_scores(
                AbilityScoreMethod::Manual,
                AbilityScores::new(10, 14, 12, 16, 12, 8),
            )
            .with_class("fighter", 3)
            .with_class("wizard", 2)
            .with_hit_points(30, 34)
            .with_equipment(EquipmentRecord::new("rapier").equipped())
            .with_equipment(EquipmentRecord::new("studded-leather").equipped())
            .with_equipment(EquipmentRecord::new("rope"))
            .with_equipment(EquipmentRecord::new("gold-gp").with_quantity(12))
    }

    #[test]
    fn derives_core_numbers() {
        let stats = derive_stats(&character(), &catalog(), 3);
        assert_eq!(stats.total_level, 5);
        assert_eq!(stats.proficiency_bonus, 3);
        assert_eq!(stats.ability_scores[&Ability::Dex].score, 16);
        assert_eq!(stats.ability_scores[&Ability::Cha].modifier, -1);
        assert_eq!(stats.armor_class, 12 + 3);
        assert_eq!(stats.initiative, 3);
        assert_eq!(stats.saving_throws[&Ability::Str].modifier, 3);
        assert_eq!(stats.passive_perception, 11);
        assert_eq!(stats.currency.gp, 12);
        assert_eq!(stats.attunement, AttunementSummary { used: 0, max: 3 });
    }

    #[test]
    fn spellcasting_is_keyed_by_class() {
        let stats = derive_stats(&character(), &catalog(), 3);
        assert_eq!(stats.spellcasting.len(), 1);
        assert_eq!(stats.spellcasting["wizard"].dc, 8 + 3 + 3);
        assert_eq!(stats.spellcasting["wizard"].spell_slots, BTreeMap::from([(1, 3)]));
    }

    #[test]
    fn passive_scores_speed_and_hit_dice() {
        let stats = derive_stats(&character(), &catalog(), 3);
        assert_eq!(stats.passive_perception, 11);
        assert_eq!(stats.passive_investigation, 13);
        assert_eq!(stats.passive_insight, 11);
        assert_eq!(stats.speed, 30);
        assert_eq!(stats.hit_dice["fighter"], HitDice { die: 10, total: 3 });
        assert_eq!(stats.hit_dice["wizard"], HitDice { die: 6, total: 2 });
    }

    #[test]
    fn feats_items_and_conditions_feed_the_sheet() {
        let catalog = catalog()
            .with_race(RaceDefinition::new("wood-elf", "Wood Elf").with_parent("elf").with_speed(35))
            .with_feat(
                FeatDefinition::new("resilient-wisdom", "Resilient (Wisdom)")
                    .with_proficiency(ProficiencyGrant::saving_throw(Ability::Wis)),
            )
            .with_item(
                ItemDefinition::new("ring-of-protection", "Ring of Protection", ItemKind::Gear)
                    .with_attunement(),
            )
            .with_modifier(Modifier::fixed(
                RuleSource::feat("alert"),
                ModifierCategory::Initiative,
                None,
                5,
            ))
            .with_modifier(Modifier::fixed(
                RuleSource::item("ring-of-protection"),
                ModifierCategory::ArmorClass,
                None,
                1,
            ))
            .with_modifier(Modifier::fixed(
                RuleSource::item("ring-of-protection"),
                ModifierCategory::SavingThrow,
                Some("WIS"),
                1,
            ))
            .with_modifier(Modifier::fixed(
                RuleSource::condition("grappled"),
                ModifierCategory::Speed,
                None,
                -35,
            ));
        let character = character()
            .with_race("wood-elf")
            .with_feat("alert")
            .with_feat("resilient-wisdom")
            .with_equipment(EquipmentRecord::new("ring-of-protection").equipped().attuned());

        let stats = derive_stats(&character, &catalog, 3);
        assert_eq!(stats.initiative, 3 + 5);
        assert_eq!(stats.armor_class, 12 + 3 + 1);
        assert!(stats.saving_throws[&Ability::Wis].proficient);
        assert_eq!(stats.saving_throws[&Ability::Wis].modifier, 1 + 3 + 1);
        assert_eq!(stats.speed, 35);

        let grappled = derive_stats(&character.with_condition("grappled"), &catalog, 3);
        assert_eq!(grappled.speed, 0);
    }

    #[test]
    fn only_equipped_combat_items_carry_combat_keys() {
        let stats = derive_stats(&character(), &catalog(), 3);
        let json = serde_json::to_value(&stats).unwrap();
        let rows = json["equipment"].as_array().unwrap();

        assert_eq!(rows.len(), 3, "currency rows are not equipment");
        assert_eq!(rows[0]["attack_bonus"], 6);
        assert_eq!(rows[0]["ability_used"], "DEX");
        assert_eq!(rows[0]["proficiency_source"], "Fighter");
        assert_eq!(rows[1]["armor_class"], 15);
        assert!(rows[2].get("attack_bonus").is_none());
        assert!(rows[2].get("armor_class").is_none());
    }

    #[test]
    fn unequipped_weapon_has_no_combat_keys() {
        let character = Character::new("Lidda", Utc.timestamp_opt(1_700_000_000, 0).unwrap())
            .unwrap()
            .with_equipment(EquipmentRecord::new("rapier"));
        let stats = derive_stats(&character, &catalog(), 3);
        let row = serde_json::to_value(&stats.equipment[0]).unwrap();
        assert!(row.get("attack_bonus").is_none());
        assert_eq!(row["item_slug"], json!("rapier"));
    }

    #[test]
    fn maps_serialize_with_wire_keys() {
        let stats = derive_stats(&character(), &catalog(), 3);
        let json = serde_json::to_value(&stats).unwrap();
        assert!(json["ability_scores"].get("STR").is_some());
        assert!(json["skills"].get("sleight-of-hand").is_some());
        assert_eq!(json["hit_points"]["current_hit_points"], 30);
    }
}
