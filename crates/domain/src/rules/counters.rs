//! Class resource counters derived from the catalog.

use std::collections::BTreeMap;

use crate::catalog::{CounterDefinition, RuleCatalog};
use crate::entities::{counter_slug, ClassAssignment, ResourceCounter};
use crate::events::CounterSync;

/// Counters every assigned class grants at its current level. For each
/// counter name, the highest-level definition at or below the class level
/// wins (Rage goes from 2 to 3 uses at barbarian level 3).
pub fn granted_counters(classes: &[ClassAssignment], catalog: &RuleCatalog) -> Vec<ResourceCounter> {
    let mut counters = Vec::new();
    for assignment in classes {
        let Some(class) = catalog.class(&assignment.class) else {
            continue;
        };

        let mut best: BTreeMap<&str, &CounterDefinition> = BTreeMap::new();
        for definition in class.counters.iter().filter(|c| c.level <= assignment.level) {
            best.entry(definition.name.as_str())
                .and_modify(|current| {
                    if definition.level > current.level {
                        *current = definition;
                    }
                })
                .or_insert(definition);
        }

        counters.extend(best.into_values().map(|definition| {
            ResourceCounter::new(
                class.slug.as_str(),
                definition.name.as_str(),
                definition.uses,
                definition.reset_on,
            )
        }));
    }
    counters
}

/// Bring stored counters in line with what the classes grant.
///
/// Existing counters keep their spent uses, capped at the new maximum.
/// Counters whose class no longer grants them are dropped.
pub fn sync_counters(
    stored: &mut Vec<ResourceCounter>,
    classes: &[ClassAssignment],
    catalog: &RuleCatalog,
) -> CounterSync {
    let granted = granted_counters(classes, catalog);
    let mut sync = CounterSync::default();

    stored.retain(|counter| {
        let keep = granted.iter().any(|g| g.slug == counter.slug);
        if !keep {
            sync.removed.push(counter.slug.clone());
        }
        keep
    });

    for grant in granted {
        match stored.iter_mut().find(|c| c.slug == grant.slug) {
            Some(existing) => {
                if existing.max_uses != grant.max_uses || existing.reset_on != grant.reset_on {
                    existing.rescale(grant.max_uses, grant.reset_on);
                    sync.updated.push(existing.slug.clone());
                }
            }
            None => {
                sync.added.push(grant.slug.clone());
                stored.push(grant);
            }
        }
    }

    sync
}

pub fn find_counter<'a>(stored: &'a [ResourceCounter], slug: &str) -> Option<&'a ResourceCounter> {
    stored.iter().find(|c| c.slug == slug)
}
