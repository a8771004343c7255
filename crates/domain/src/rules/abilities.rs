//! Ability score resolution - base scores plus race and subrace bonuses.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::{ModifierCategory, RuleCatalog};
use crate::value_objects::{Ability, AbilityScores};

/// Final scores after every applicable fixed modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedAbilities {
    pub scores: AbilityScores,
}

impl ResolvedAbilities {
    #[inline]
    pub fn score(&self, ability: Ability) -> i32 {
        self.scores.get(ability)
    }

    #[inline]
    pub fn modifier(&self, ability: Ability) -> i32 {
        self.scores.modifier(ability)
    }

    /// Modifiers keyed by ability, in STR..CHA order.
    pub fn modifiers(&self) -> BTreeMap<Ability, i32> {
        Ability::ALL
            .into_iter()
            .map(|ability| (ability, self.modifier(ability)))
            .collect()
    }
}

/// Fold race (and parent race) ability bonuses into the base scores.
///
/// Only fixed modifiers apply. Choice modifiers ("+1 to two of your choice")
/// stay unresolved until the player makes the choice elsewhere. A missing or
/// dangling race contributes nothing, as does a modifier whose target is not
/// an ability.
pub fn resolve_ability_scores(
    base: &AbilityScores,
    race: Option<&str>,
    catalog: &RuleCatalog,
) -> ResolvedAbilities {
    let mut scores = *base;

    if let Some(race) = race {
        for modifier in catalog.race_modifiers(race, ModifierCategory::AbilityScore) {
            let Some(ability) = modifier
                .target
                .as_deref()
                .and_then(|target| target.parse::<Ability>().ok())
            else {
                continue;
            };
            scores.add(ability, modifier.value);
        }
    }

    ResolvedAbilities { scores }
}
