use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellDefinition {
    pub slug: String,
    pub name: String,
    /// 0 for cantrips
    pub level: u8,
    /// Class slugs whose spell list includes this spell
    #[serde(default)]
    pub classes: Vec<String>,
}

impl SpellDefinition {
    pub fn new(slug: impl Into<String>, name: impl Into<String>, level: u8) -> Self {
        Self {
            slug: slug.into(),
            name: name.into(),
            level,
            classes: Vec::new(),
        }
    }

    pub fn for_classes(mut self, classes: &[&str]) -> Self {
        self.classes = classes.iter().map(|c| c.to_string()).collect();
        self
    }

    #[inline]
    pub fn is_cantrip(&self) -> bool {
        self.level == 0
    }

    pub fn on_class_list(&self, class_slug: &str) -> bool {
        self.classes.iter().any(|c| c == class_slug)
    }
}
