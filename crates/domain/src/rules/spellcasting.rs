//! Spell preparation against per-class limits.

use super::abilities::ResolvedAbilities;
use crate::catalog::{RuleCatalog, SpellAccess, SpellDefinition, SpellcastingDefinition};
use crate::entities::{CharacterSpell, ClassAssignment, SpellSource, SpellStatus};
use crate::error::DomainError;
use crate::events::SpellPreparationChange;

/// Everything preparation needs to know about the character.
#[derive(Debug, Clone, Copy)]
pub struct PreparationContext<'a> {
    pub classes: &'a [ClassAssignment],
    pub abilities: &'a ResolvedAbilities,
    pub catalog: &'a RuleCatalog,
}

impl<'a> PreparationContext<'a> {
    fn caster(&self, class_slug: &str) -> Option<(&'a ClassAssignment, SpellcastingDefinition)> {
        let assignment = self.classes.iter().find(|c| c.class == class_slug)?;
        let spellcasting = self.catalog.class(class_slug)?.spellcasting?;
        Some((assignment, spellcasting))
    }

    /// Assigned casting classes, primary first.
    fn casters(self) -> impl Iterator<Item = (&'a ClassAssignment, SpellcastingDefinition)> + 'a {
        self.classes
            .iter()
            .filter(|c| c.is_primary)
            .chain(self.classes.iter().filter(|c| !c.is_primary))
            .filter_map(move |assignment| {
                let spellcasting = self.catalog.class(&assignment.class)?.spellcasting?;
                Some((assignment, spellcasting))
            })
    }
}

/// Prepared-spell limit for a class, or `None` when the class does not
/// prepare (known casters, or no formula configured).
pub fn preparation_limit(
    spellcasting: &SpellcastingDefinition,
    class_level: u8,
    ability_modifier: i32,
) -> Option<u32> {
    if spellcasting.access == SpellAccess::Known {
        return None;
    }
    spellcasting
        .preparation
        .map(|formula| formula.limit(class_level, ability_modifier))
}

/// Prepared (not always-prepared) spells counted against a class's limit.
pub fn prepared_count(spells: &[CharacterSpell], class_slug: &str) -> u32 {
    spells
        .iter()
        .filter(|s| s.class_slug == class_slug && s.status == SpellStatus::Prepared)
        .count() as u32
}

fn check_limit(
    spells: &[CharacterSpell],
    class_slug: &str,
    ctx: &PreparationContext<'_>,
) -> Result<(), DomainError> {
    let Some((assignment, spellcasting)) = ctx.caster(class_slug) else {
        return Ok(());
    };
    let modifier = ctx.abilities.modifier(spellcasting.ability);
    let Some(limit) = preparation_limit(&spellcasting, assignment.level, modifier) else {
        return Ok(());
    };

    if prepared_count(spells, class_slug) >= limit {
        return Err(DomainError::PreparationLimitReached { limit });
    }
    Ok(())
}

pub fn prepare_spell(
    spells: &mut Vec<CharacterSpell>,
    spell: &SpellDefinition,
    class_slug: Option<&str>,
    ctx: &PreparationContext<'_>,
) -> Result<SpellPreparationChange, DomainError> {
    if spell.is_cantrip() {
        return Err(DomainError::CannotPrepareCantrip(spell.slug.clone()));
    }
    if let Some(class) = class_slug {
        if !ctx.classes.iter().any(|c| c.class == class) {
            return Err(DomainError::not_found("class", class));
        }
    }

    let on_row = |row: &CharacterSpell| {
        row.spell_slug == spell.slug && class_slug.map_or(true, |c| row.class_slug == c)
    };

    if let Some(row) = spells.iter().find(|r| on_row(r) && r.status.is_prepared()) {
        return Ok(SpellPreparationChange::AlreadyPrepared(row.clone()));
    }

    if let Some(index) = spells.iter().position(on_row) {
        let class = spells[index].class_slug.clone();
        check_limit(spells, &class, ctx)?;
        spells[index].status = SpellStatus::Prepared;
        return Ok(SpellPreparationChange::Prepared(spells[index].clone()));
    }

    // Not on the sheet: prepare straight from a class list.
    let mut too_high = None;
    for (assignment, spellcasting) in ctx.casters() {
        if class_slug.is_some_and(|c| c != assignment.class)
            || spellcasting.access != SpellAccess::Prepared
            || !spell.on_class_list(&assignment.class)
        {
            continue;
        }
        let max_level = spellcasting.caster_type.max_spell_level(assignment.level);
        if spell.level > max_level {
            too_high.get_or_insert(DomainError::SpellLevelTooHigh {
                spell_level: spell.level,
                max_level,
            });
            continue;
        }
        check_limit(spells, &assignment.class, ctx)?;

        let row = CharacterSpell {
            spell_slug: spell.slug.clone(),
            class_slug: assignment.class.clone(),
            status: SpellStatus::Prepared,
            source: SpellSource::PreparedFromList,
        };
        spells.push(row.clone());
        return Ok(SpellPreparationChange::Prepared(row));
    }

    Err(too_high.unwrap_or_else(|| DomainError::SpellNotKnown(spell.slug.clone())))
}

pub fn unprepare_spell(
    spells: &mut Vec<CharacterSpell>,
    spell: &SpellDefinition,
    class_slug: Option<&str>,
) -> Result<SpellPreparationChange, DomainError> {
    if spell.is_cantrip() {
        return Err(DomainError::CannotUnprepareCantrip(spell.slug.clone()));
    }

    let on_row = |row: &CharacterSpell| {
        row.spell_slug == spell.slug && class_slug.map_or(true, |c| row.class_slug == c)
    };

    if spells
        .iter()
        .any(|r| on_row(r) && r.status == SpellStatus::AlwaysPrepared)
    {
        return Err(DomainError::CannotUnprepareAlwaysPrepared(spell.slug.clone()));
    }

    match spells
        .iter()
        .position(|r| on_row(r) && r.status == SpellStatus::Prepared)
    {
        Some(index) if spells[index].source == SpellSource::PreparedFromList => {
            Ok(SpellPreparationChange::Removed(spells.remove(index)))
        }
        Some(index) => {
            spells[index].status = SpellStatus::Known;
            Ok(SpellPreparationChange::Unprepared(spells[index].clone()))
        }
        None => spells
            .iter()
            .find(|r| on_row(r))
            .cloned()
            .map(SpellPreparationChange::AlreadyUnprepared)
            .ok_or_else(|| DomainError::SpellNotKnown(spell.slug.clone())),
    }
}
