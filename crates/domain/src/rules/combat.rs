//! Combat statistics - weapon attacks, per-class spellcasting, armor class,
//! saving throws and skills.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::abilities::ResolvedAbilities;
use super::bonuses::SheetBonuses;
use super::proficiency::{find_skill_proficiency, find_weapon_proficiency, has_saving_throw};
use super::spell_slots::spell_slots;
use super::spellcasting::{preparation_limit, prepared_count};
use crate::catalog::{CasterType, ItemDefinition, ItemKind, RuleCatalog, WeaponProperties};
use crate::entities::{CharacterSpell, ClassAssignment, GrantedProficiency};
use crate::value_objects::{Ability, Skill};

/// Everything the calculators need about the character, resolved once.
#[derive(Debug, Clone, Copy)]
pub struct CombatContext<'a> {
    pub abilities: &'a ResolvedAbilities,
    pub proficiency_bonus: i32,
    pub proficiencies: &'a [GrantedProficiency],
    pub bonuses: &'a SheetBonuses,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponStats {
    pub attack_bonus: i32,
    pub damage_bonus: i32,
    pub ability_used: Ability,
    pub is_proficient: bool,
    /// Label of the grant that made the character proficient
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proficiency_source: Option<String>,
}

/// Ranged weapons use DEX. Finesse weapons use the higher of STR and DEX,
/// with STR winning ties. Everything else uses STR.
pub fn weapon_ability(weapon: &WeaponProperties, abilities: &ResolvedAbilities) -> Ability {
    if weapon.ranged {
        Ability::Dex
    } else if weapon.finesse && abilities.modifier(Ability::Dex) > abilities.modifier(Ability::Str)
    {
        Ability::Dex
    } else {
        Ability::Str
    }
}

/// Attack and damage bonuses for an item, or `None` if it is not a weapon.
pub fn weapon_stats(item: &ItemDefinition, ctx: &CombatContext<'_>) -> Option<WeaponStats> {
    let weapon = item.weapon()?;
    let ability_used = weapon_ability(weapon, ctx.abilities);
    let ability_modifier = ctx.abilities.modifier(ability_used);
    let proficiency = find_weapon_proficiency(ctx.proficiencies, weapon);
    let is_proficient = proficiency.is_some();

    let proficiency_part = if is_proficient { ctx.proficiency_bonus } else { 0 };

    Some(WeaponStats {
        attack_bonus: ability_modifier + proficiency_part + item.magic_bonus,
        damage_bonus: ability_modifier + item.magic_bonus,
        ability_used,
        is_proficient,
        proficiency_source: proficiency.map(|p| p.source.clone()),
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellcastingStats {
    pub ability: Ability,
    pub dc: i32,
    pub attack_bonus: i32,
    pub caster_type: CasterType,
    /// Maximum slots by spell level. Pact casters have one entry.
    pub spell_slots: BTreeMap<u8, u32>,
    /// `None` for classes that do not prepare spells
    pub preparation_limit: Option<u32>,
    pub prepared_spell_count: u32,
}

/// Spell statistics for every class with a spellcasting ability, keyed by
/// class slug. Non-casting classes are left out, so a single-class fighter
/// gets an empty map. Slots and the preparation limit use each class's own
/// level.
pub fn spellcasting_by_class(
    classes: &[ClassAssignment],
    spells: &[CharacterSpell],
    ctx: &CombatContext<'_>,
    catalog: &RuleCatalog,
) -> BTreeMap<String, SpellcastingStats> {
    classes
        .iter()
        .filter_map(|assignment| {
            let spellcasting = catalog.class(&assignment.class)?.spellcasting?;
            let modifier = ctx.abilities.modifier(spellcasting.ability);
            Some((
                assignment.class.clone(),
                SpellcastingStats {
                    ability: spellcasting.ability,
                    dc: 8 + ctx.proficiency_bonus + modifier,
                    attack_bonus: ctx.proficiency_bonus + modifier,
                    caster_type: spellcasting.caster_type,
                    spell_slots: spell_slots(spellcasting.caster_type, assignment.level),
                    preparation_limit: preparation_limit(&spellcasting, assignment.level, modifier),
                    prepared_spell_count: prepared_count(spells, &assignment.class),
                },
            ))
        })
        .collect()
}

/// Armor class contribution of a single armor item, before shields.
pub fn armor_base(item: &ItemDefinition, dex_modifier: i32) -> Option<i32> {
    let ItemKind::Armor(armor) = &item.kind else {
        return None;
    };
    let dex_part = match armor.category.dex_cap() {
        Some(cap) => dex_modifier.min(cap),
        None => dex_modifier,
    };
    Some(armor.base_ac + dex_part + item.magic_bonus)
}

pub fn shield_bonus(item: &ItemDefinition) -> Option<i32> {
    match item.kind {
        ItemKind::Shield { armor_class_bonus } => Some(armor_class_bonus + item.magic_bonus),
        _ => None,
    }
}

/// Armor class from equipped items.
///
/// Unarmored is 10 + DEX. The best equipped armor replaces that, the best
/// equipped shield adds on top, then `bonus` from `armor_class` modifiers.
/// An explicit override wins outright.
pub fn armor_class<'a>(
    equipped: impl IntoIterator<Item = &'a ItemDefinition>,
    dex_modifier: i32,
    bonus: i32,
    override_value: Option<i32>,
) -> i32 {
    if let Some(value) = override_value {
        return value;
    }

    let mut best_armor: Option<i32> = None;
    let mut best_shield: Option<i32> = None;
    for item in equipped {
        if let Some(ac) = armor_base(item, dex_modifier) {
            best_armor = Some(best_armor.map_or(ac, |b| b.max(ac)));
        }
        if let Some(bonus) = shield_bonus(item) {
            best_shield = Some(best_shield.map_or(bonus, |b| b.max(bonus)));
        }
    }

    best_armor.unwrap_or(10 + dex_modifier) + best_shield.unwrap_or(0) + bonus
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavingThrow {
    pub modifier: i32,
    pub proficient: bool,
}

pub fn saving_throws(ctx: &CombatContext<'_>) -> BTreeMap<Ability, SavingThrow> {
    Ability::ALL
        .into_iter()
        .map(|ability| {
            let proficient = has_saving_throw(ctx.proficiencies, ability);
            let bonus = if proficient { ctx.proficiency_bonus } else { 0 };
            (
                ability,
                SavingThrow {
                    modifier: ctx.abilities.modifier(ability)
                        + bonus
                        + ctx.bonuses.saving_throw(ability),
                    proficient,
                },
            )
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillBonus {
    pub ability: Ability,
    pub modifier: i32,
    pub proficient: bool,
    pub expertise: bool,
}

pub fn skill_bonus(skill: Skill, ctx: &CombatContext<'_>) -> SkillBonus {
    let ability = skill.ability();
    let grant = find_skill_proficiency(ctx.proficiencies, skill);
    let expertise = grant.is_some_and(|g| g.expertise);
    let bonus = match grant {
        Some(_) if expertise => ctx.proficiency_bonus * 2,
        Some(_) => ctx.proficiency_bonus,
        None => 0,
    };
    SkillBonus {
        ability,
        modifier: ctx.abilities.modifier(ability) + bonus + ctx.bonuses.skill(skill),
        proficient: grant.is_some(),
        expertise,
    }
}

pub fn skills(ctx: &CombatContext<'_>) -> BTreeMap<Skill, SkillBonus> {
    Skill::ALL
        .into_iter()
        .map(|skill| (skill, skill_bonus(skill, ctx)))
        .collect()
}
