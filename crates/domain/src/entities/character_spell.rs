use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpellStatus {
    Known,
    Prepared,
    AlwaysPrepared,
}

impl SpellStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Known => "known",
            Self::Prepared => "prepared",
            Self::AlwaysPrepared => "always_prepared",
        }
    }

    #[inline]
    pub fn is_prepared(&self) -> bool {
        matches!(self, Self::Prepared | Self::AlwaysPrepared)
    }
}

/// How the row came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpellSource {
    /// Learned or copied into a spellbook
    Learned,
    /// Prepared straight from the class list; removed again when unprepared
    PreparedFromList,
    /// Granted by a feature (domain spells, oath spells, ...)
    Granted,
}

/// A spell on a character's sheet, tied to the class that casts it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterSpell {
    pub spell_slug: String,
    pub class_slug: String,
    pub status: SpellStatus,
    pub source: SpellSource,
}

impl CharacterSpell {
    pub fn known(spell_slug: impl Into<String>, class_slug: impl Into<String>) -> Self {
        Self {
            spell_slug: spell_slug.into(),
            class_slug: class_slug.into(),
            status: SpellStatus::Known,
            source: SpellSource::Learned,
        }
    }

    pub fn always_prepared(spell_slug: impl Into<String>, class_slug: impl Into<String>) -> Self {
        Self {
            spell_slug: spell_slug.into(),
            class_slug: class_slug.into(),
            status: SpellStatus::AlwaysPrepared,
            source: SpellSource::Granted,
        }
    }

    pub fn prepared(mut self) -> Self {
        self.status = SpellStatus::Prepared;
        self
    }
}
