use serde::{Deserialize, Serialize};

use crate::value_objects::Ability;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProficiencyKind {
    Weapon,
    Armor,
    Skill,
    Tool,
    SavingThrow,
}

/// A proficiency as a rule source grants it (no provenance yet).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProficiencyGrant {
    pub kind: ProficiencyKind,
    pub slug: String,
}

impl ProficiencyGrant {
    pub fn new(kind: ProficiencyKind, slug: impl Into<String>) -> Self {
        Self {
            kind,
            slug: slug.into(),
        }
    }

    pub fn weapon(slug: impl Into<String>) -> Self {
        Self::new(ProficiencyKind::Weapon, slug)
    }

    pub fn skill(slug: impl Into<String>) -> Self {
        Self::new(ProficiencyKind::Skill, slug)
    }

    /// Saving throws use the lowercase ability code as slug ("con").
    pub fn saving_throw(ability: Ability) -> Self {
        Self::new(ProficiencyKind::SavingThrow, ability.as_str().to_lowercase())
    }
}

/// A proficiency held by a character, with the label of whatever granted it.
///
/// `source` answers "why are you proficient" and is shown as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantedProficiency {
    pub kind: ProficiencyKind,
    pub slug: String,
    pub source: String,
    /// Double proficiency bonus (skills only)
    #[serde(default)]
    pub expertise: bool,
}

impl GrantedProficiency {
    pub fn new(kind: ProficiencyKind, slug: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            kind,
            slug: slug.into(),
            source: source.into(),
            expertise: false,
        }
    }

    pub fn from_grant(grant: &ProficiencyGrant, source: impl Into<String>) -> Self {
        Self::new(grant.kind, grant.slug.clone(), source)
    }

    pub fn with_expertise(mut self) -> Self {
        self.expertise = true;
        self
    }
}
