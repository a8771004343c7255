use serde::{Deserialize, Serialize};

use crate::entities::ProficiencyGrant;

/// A feat. Numeric effects (Tough's hit points, Alert's initiative) live in
/// the modifier store under a `feat` source; grants here are proficiencies,
/// such as the saving throw a Resilient feat adds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatDefinition {
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub proficiencies: Vec<ProficiencyGrant>,
}

impl FeatDefinition {
    pub fn new(slug: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            name: name.into(),
            proficiencies: Vec::new(),
        }
    }

    pub fn with_proficiency(mut self, grant: ProficiencyGrant) -> Self {
        self.proficiencies.push(grant);
        self
    }
}
