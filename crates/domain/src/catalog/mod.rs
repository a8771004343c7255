//! Rule catalog - read-only reference content the resolvers consult.
//!
//! The catalog is loaded once per request (or once at startup) and passed in
//! explicitly. Nothing here is mutated by character operations.
//!
//! # Lookups
//!
//! - [`RuleCatalog::modifiers_for`] - modifiers attached to one rule source
//! - [`RuleCatalog::race_chain`] - a race followed by its parent, if any
//! - [`RuleCatalog::race_modifiers`] - fixed modifiers from both race layers
//! - [`RuleCatalog::class_feature_modifiers`] - modifiers of features unlocked by a class level

mod class;
mod feat;
mod item;
mod modifier;
mod race;
mod spell;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub use class::{
    CasterType, ClassDefinition, ClassFeatureDefinition, CounterDefinition, PreparationFormula,
    SpellAccess, SpellcastingDefinition,
};
pub use feat::FeatDefinition;
pub use item::{ArmorCategory, ArmorProperties, ItemDefinition, ItemKind, WeaponProperties};
pub use modifier::{Modifier, ModifierCategory, ModifierChoice, RuleSource, RuleSourceKind};
pub use race::RaceDefinition;
pub use spell::SpellDefinition;

use crate::error::DomainError;

/// Serialized form of a catalog, as authored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogDocument {
    #[serde(default)]
    pub races: Vec<RaceDefinition>,
    #[serde(default)]
    pub classes: Vec<ClassDefinition>,
    #[serde(default)]
    pub feats: Vec<FeatDefinition>,
    #[serde(default)]
    pub items: Vec<ItemDefinition>,
    #[serde(default)]
    pub spells: Vec<SpellDefinition>,
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
}

/// Indexed catalog of rule sources and their modifiers.
#[derive(Debug, Clone, Default)]
pub struct RuleCatalog {
    races: HashMap<String, RaceDefinition>,
    classes: HashMap<String, ClassDefinition>,
    feats: HashMap<String, FeatDefinition>,
    items: HashMap<String, ItemDefinition>,
    spells: HashMap<String, SpellDefinition>,
    modifiers: HashMap<RuleSource, Vec<Modifier>>,
}

impl RuleCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an indexed catalog, rejecting malformed modifiers.
    pub fn from_document(document: CatalogDocument) -> Result<Self, DomainError> {
        let mut catalog = Self::new();
        for race in document.races {
            catalog = catalog.with_race(race);
        }
        for class in document.classes {
            catalog = catalog.with_class(class);
        }
        for feat in document.feats {
            catalog = catalog.with_feat(feat);
        }
        for item in document.items {
            catalog = catalog.with_item(item);
        }
        for spell in document.spells {
            catalog = catalog.with_spell(spell);
        }
        for modifier in document.modifiers {
            if !modifier.is_well_formed() {
                return Err(DomainError::validation(format!(
                    "Fixed {:?} modifier on {} has no target",
                    modifier.category, modifier.source
                )));
            }
            catalog = catalog.with_modifier(modifier);
        }
        Ok(catalog)
    }

    /// Flatten back to the authored form. Entries are sorted by slug so the
    /// output is stable.
    pub fn to_document(&self) -> CatalogDocument {
        fn sorted<T: Clone>(map: &HashMap<String, T>) -> Vec<T> {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            keys.into_iter().filter_map(|k| map.get(k).cloned()).collect()
        }

        let mut sources: Vec<&RuleSource> = self.modifiers.keys().collect();
        sources.sort_by_key(|s| s.to_string());

        CatalogDocument {
            races: sorted(&self.races),
            classes: sorted(&self.classes),
            feats: sorted(&self.feats),
            items: sorted(&self.items),
            spells: sorted(&self.spells),
            modifiers: sources
                .into_iter()
                .flat_map(|s| self.modifiers_for(s).iter().cloned())
                .collect(),
        }
    }

    // =========================================================================
    // Builders
    // =========================================================================

    pub fn with_race(mut self, race: RaceDefinition) -> Self {
        self.races.insert(race.slug.clone(), race);
        self
    }

    pub fn with_class(mut self, class: ClassDefinition) -> Self {
        self.classes.insert(class.slug.clone(), class);
        self
    }

    pub fn with_feat(mut self, feat: FeatDefinition) -> Self {
        self.feats.insert(feat.slug.clone(), feat);
        self
    }

    pub fn with_item(mut self, item: ItemDefinition) -> Self {
        self.items.insert(item.slug.clone(), item);
        self
    }

    pub fn with_spell(mut self, spell: SpellDefinition) -> Self {
        self.spells.insert(spell.slug.clone(), spell);
        self
    }

    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        self.modifiers
            .entry(modifier.source.clone())
            .or_default()
            .push(modifier);
        self
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    pub fn race(&self, slug: &str) -> Option<&RaceDefinition> {
        self.races.get(slug)
    }

    pub fn class(&self, slug: &str) -> Option<&ClassDefinition> {
        self.classes.get(slug)
    }

    pub fn feat(&self, slug: &str) -> Option<&FeatDefinition> {
        self.feats.get(slug)
    }

    pub fn item(&self, slug: &str) -> Option<&ItemDefinition> {
        self.items.get(slug)
    }

    pub fn spell(&self, slug: &str) -> Option<&SpellDefinition> {
        self.spells.get(slug)
    }

    pub fn modifiers_for(&self, source: &RuleSource) -> &[Modifier] {
        self.modifiers.get(source).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The race itself, then its parent. Inheritance is one level deep, so
    /// the walk stops after the parent. A dangling slug yields nothing, and a
    /// race naming itself as parent appears once.
    pub fn race_chain(&self, slug: &str) -> Vec<&RaceDefinition> {
        let Some(race) = self.race(slug) else {
            return Vec::new();
        };
        let mut chain = vec![race];
        if let Some(parent) = race
            .parent
            .as_deref()
            .filter(|p| *p != race.slug)
            .and_then(|p| self.race(p))
        {
            chain.push(parent);
        }
        chain
    }

    /// Fixed (non-choice) modifiers of a category from a race and its parent.
    /// Both layers contribute; the subrace does not override the parent.
    pub fn race_modifiers<'a>(
        &'a self,
        slug: &str,
        category: ModifierCategory,
    ) -> impl Iterator<Item = &'a Modifier> + 'a {
        self.race_chain(slug)
            .into_iter()
            .flat_map(move |race| self.modifiers_for(&RuleSource::race(race.slug.as_str())))
            .filter(move |m| m.category == category && !m.is_choice())
    }

    /// Fixed modifiers of a category granted by the features a class has
    /// unlocked at `class_level`.
    pub fn class_feature_modifiers<'a>(
        &'a self,
        class_slug: &str,
        class_level: u8,
        category: ModifierCategory,
    ) -> impl Iterator<Item = &'a Modifier> + 'a {
        self.class(class_slug)
            .into_iter()
            .flat_map(move |class| class.features_up_to(class_level))
            .flat_map(move |feature| {
                self.modifiers_for(&RuleSource::class_feature(feature.slug.as_str()))
            })
            .filter(move |m| m.category == category && !m.is_choice())
    }
}
