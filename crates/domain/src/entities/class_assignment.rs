use serde::{Deserialize, Serialize};

/// Levels a character has in one class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassAssignment {
    pub class: String,
    pub level: u8,
    #[serde(default)]
    pub is_primary: bool,
    #[serde(default)]
    pub subclass: Option<String>,
}

impl ClassAssignment {
    pub fn new(class: impl Into<String>, level: u8) -> Self {
        Self {
            class: class.into(),
            level,
            is_primary: false,
            subclass: None,
        }
    }

    pub fn primary(class: impl Into<String>, level: u8) -> Self {
        Self {
            is_primary: true,
            ..Self::new(class, level)
        }
    }

    pub fn with_subclass(mut self, subclass: impl Into<String>) -> Self {
        self.subclass = Some(subclass.into());
        self
    }
}
