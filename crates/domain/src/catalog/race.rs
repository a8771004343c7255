use serde::{Deserialize, Serialize};

use crate::entities::ProficiencyGrant;

/// A race or subrace. Subraces point at their parent through `parent`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaceDefinition {
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub parent: Option<String>,
    /// Walking speed in feet. A subrace without one inherits its parent's.
    #[serde(default)]
    pub speed: Option<u32>,
    #[serde(default)]
    pub proficiencies: Vec<ProficiencyGrant>,
}

impl RaceDefinition {
    pub fn new(slug: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            name: name.into(),
            parent: None,
            speed: None,
            proficiencies: Vec::new(),
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_speed(mut self, speed: u32) -> Self {
        self.speed = Some(speed);
        self
    }

    pub fn with_proficiency(mut self, grant: ProficiencyGrant) -> Self {
        self.proficiencies.push(grant);
        self
    }
}
