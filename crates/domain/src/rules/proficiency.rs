//! Proficiency bonus and the character's effective proficiency set.

use crate::catalog::{RuleCatalog, WeaponProperties};
use crate::entities::{ClassAssignment, GrantedProficiency, ProficiencyKind};
use crate::value_objects::{Ability, Skill};

/// Proficiency bonus by total character level.
///
/// | Level | Bonus |
/// |-------|-------|
/// | 1-4   | +2    |
/// | 5-8   | +3    |
/// | 9-12  | +4    |
/// | 13-16 | +5    |
/// | 17-20 | +6    |
pub fn proficiency_bonus(total_level: u32) -> i32 {
    let level = total_level.clamp(1, 20) as i32;
    (level - 1) / 4 + 2
}

/// Saving throw proficiency slug for an ability ("str", "dex", ...).
pub fn saving_throw_slug(ability: Ability) -> String {
    ability.as_str().to_lowercase()
}

/// Every proficiency the character holds, in lookup order: rows recorded on
/// the character, then race grants (subrace before parent), then class
/// grants (primary class full list, other classes their multiclass list),
/// then feat grants such as a Resilient feat's saving throw.
pub fn effective_proficiencies(
    own: &[GrantedProficiency],
    race: Option<&str>,
    classes: &[ClassAssignment],
    feats: &[String],
    catalog: &RuleCatalog,
) -> Vec<GrantedProficiency> {
    let mut set: Vec<GrantedProficiency> = own.to_vec();

    if let Some(race) = race {
        for race_def in catalog.race_chain(race) {
            set.extend(
                race_def
                    .proficiencies
                    .iter()
                    .map(|grant| GrantedProficiency::from_grant(grant, race_def.name.as_str())),
            );
        }
    }

    let ordered = classes
        .iter()
        .filter(|c| c.is_primary)
        .chain(classes.iter().filter(|c| !c.is_primary));
    for assignment in ordered {
        let Some(class) = catalog.class(&assignment.class) else {
            continue;
        };
        let grants = if assignment.is_primary {
            &class.proficiencies
        } else {
            &class.multiclass_proficiencies
        };
        set.extend(
            grants
                .iter()
                .map(|grant| GrantedProficiency::from_grant(grant, class.name.as_str())),
        );
        if assignment.is_primary {
            set.extend(class.saving_throws.iter().map(|ability| {
                GrantedProficiency::new(
                    ProficiencyKind::SavingThrow,
                    saving_throw_slug(*ability),
                    class.name.as_str(),
                )
            }));
        }
    }

    for feat in feats.iter().filter_map(|slug| catalog.feat(slug)) {
        set.extend(
            feat.proficiencies
                .iter()
                .map(|grant| GrantedProficiency::from_grant(grant, feat.name.as_str())),
        );
    }

    set
}

/// First weapon proficiency covering any of the weapon's proficiency types.
pub fn find_weapon_proficiency<'a>(
    set: &'a [GrantedProficiency],
    weapon: &WeaponProperties,
) -> Option<&'a GrantedProficiency> {
    set.iter().find(|p| {
        p.kind == ProficiencyKind::Weapon
            && weapon
                .proficiency_types
                .iter()
                .any(|t| t.eq_ignore_ascii_case(&p.slug))
    })
}

/// Skill proficiency, preferring an expertise row when several grant it.
pub fn find_skill_proficiency(
    set: &[GrantedProficiency],
    skill: Skill,
) -> Option<&GrantedProficiency> {
    let mut matches = set
        .iter()
        .filter(|p| p.kind == ProficiencyKind::Skill && p.slug == skill.slug());
    let first = matches.next()?;
    if first.expertise {
        return Some(first);
    }
    matches.find(|p| p.expertise).or(Some(first))
}

pub fn has_saving_throw(set: &[GrantedProficiency], ability: Ability) -> bool {
    let slug = saving_throw_slug(ability);
    set.iter()
        .any(|p| p.kind == ProficiencyKind::SavingThrow && p.slug == slug)
}
