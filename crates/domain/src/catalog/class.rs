//! Class definitions - hit dice, granted proficiencies, leveled features,
//! resource counters and spellcasting configuration.

use serde::{Deserialize, Serialize};

use crate::entities::{ProficiencyGrant, ResetTiming};
use crate::value_objects::Ability;

/// A class as authored in the catalog.
///
/// # Simple Data Struct
///
/// Catalog content is read-only context for the resolvers. Any combination of
/// values is valid; unknown references simply contribute nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDefinition {
    pub slug: String,
    pub name: String,
    /// Hit die size (6, 8, 10 or 12)
    pub hit_die: u8,
    /// Saving throws granted when this is the primary class
    #[serde(default)]
    pub saving_throws: Vec<Ability>,
    /// Proficiencies granted when this is the primary class
    #[serde(default)]
    pub proficiencies: Vec<ProficiencyGrant>,
    /// Reduced proficiency set granted when multiclassing into this class
    #[serde(default)]
    pub multiclass_proficiencies: Vec<ProficiencyGrant>,
    #[serde(default)]
    pub features: Vec<ClassFeatureDefinition>,
    #[serde(default)]
    pub counters: Vec<CounterDefinition>,
    #[serde(default)]
    pub spellcasting: Option<SpellcastingDefinition>,
}

impl ClassDefinition {
    pub fn new(slug: impl Into<String>, name: impl Into<String>, hit_die: u8) -> Self {
        Self {
            slug: slug.into(),
            name: name.into(),
            hit_die,
            saving_throws: Vec::new(),
            proficiencies: Vec::new(),
            multiclass_proficiencies: Vec::new(),
            features: Vec::new(),
            counters: Vec::new(),
            spellcasting: None,
        }
    }

    pub fn with_saving_throws(mut self, abilities: impl IntoIterator<Item = Ability>) -> Self {
        self.saving_throws = abilities.into_iter().collect();
        self
    }

    pub fn with_proficiency(mut self, grant: ProficiencyGrant) -> Self {
        self.proficiencies.push(grant);
        self
    }

    pub fn with_multiclass_proficiency(mut self, grant: ProficiencyGrant) -> Self {
        self.multiclass_proficiencies.push(grant);
        self
    }

    pub fn with_feature(mut self, slug: impl Into<String>, name: impl Into<String>, level: u8) -> Self {
        self.features.push(ClassFeatureDefinition {
            slug: slug.into(),
            name: name.into(),
            level,
        });
        self
    }

    pub fn with_counter(mut self, counter: CounterDefinition) -> Self {
        self.counters.push(counter);
        self
    }

    pub fn with_spellcasting(mut self, spellcasting: SpellcastingDefinition) -> Self {
        self.spellcasting = Some(spellcasting);
        self
    }

    /// Features unlocked at or below the given class level.
    pub fn features_up_to(&self, level: u8) -> impl Iterator<Item = &ClassFeatureDefinition> {
        self.features.iter().filter(move |f| f.level <= level)
    }
}

/// A named feature gained at a class level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassFeatureDefinition {
    pub slug: String,
    pub name: String,
    pub level: u8,
}

/// A limited-use resource gained at a class level (Rage, Ki Points, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterDefinition {
    pub name: String,
    pub level: u8,
    pub uses: u32,
    #[serde(default)]
    pub reset_on: Option<ResetTiming>,
}

impl CounterDefinition {
    pub fn new(name: impl Into<String>, level: u8, uses: u32, reset_on: Option<ResetTiming>) -> Self {
        Self {
            name: name.into(),
            level,
            uses,
            reset_on,
        }
    }
}

/// Spell progression speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CasterType {
    Full,
    Half,
    Third,
    Pact,
}

impl CasterType {
    /// Highest spell level castable at a class level.
    pub fn max_spell_level(&self, class_level: u8) -> u8 {
        let level = class_level.max(1);
        match self {
            Self::Full => level.div_ceil(2).min(9),
            Self::Half => level.div_ceil(4).min(5),
            Self::Third => level.div_ceil(6).min(4),
            Self::Pact => level.div_ceil(2).min(5),
        }
    }
}

/// How a spell becomes eligible to be prepared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpellAccess {
    /// Prepares from the whole class list (cleric, druid, paladin)
    Prepared,
    /// Casts from a fixed set of known spells (bard, sorcerer, warlock)
    Known,
    /// Prepares from spells copied into a spellbook (wizard)
    Spellbook,
}

/// Formula for the number of spells a class can have prepared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreparationFormula {
    LevelPlusModifier,
    HalfLevelPlusModifier,
}

impl PreparationFormula {
    /// Preparation limit, never below 1.
    pub fn limit(&self, class_level: u8, ability_modifier: i32) -> u32 {
        let level = i32::from(class_level);
        let raw = match self {
            Self::LevelPlusModifier => level + ability_modifier,
            Self::HalfLevelPlusModifier => level / 2 + ability_modifier,
        };
        raw.max(1) as u32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellcastingDefinition {
    pub ability: Ability,
    pub caster_type: CasterType,
    pub access: SpellAccess,
    #[serde(default)]
    pub preparation: Option<PreparationFormula>,
}

impl SpellcastingDefinition {
    pub fn new(ability: Ability, caster_type: CasterType, access: SpellAccess) -> Self {
        Self {
            ability,
            caster_type,
            access,
            preparation: None,
        }
    }

    pub fn with_preparation(mut self, formula: PreparationFormula) -> Self {
        self.preparation = Some(formula);
        self
    }
}
