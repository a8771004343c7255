//! Limited-use resource counters (Rage, Ki Points, Channel Divinity, ...).

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// When a counter recovers its uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetTiming {
    ShortRest,
    LongRest,
    Dawn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestKind {
    Short,
    Long,
}

impl RestKind {
    /// Reset timings recovered by this rest.
    pub fn recovers(&self) -> &'static [ResetTiming] {
        match self {
            Self::Short => &[ResetTiming::ShortRest],
            Self::Long => &[ResetTiming::ShortRest, ResetTiming::LongRest, ResetTiming::Dawn],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CounterAction {
    Use,
    Restore,
    Reset,
}

/// Either an absolute spent value or a relative action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterUpdate {
    Spent(u32),
    Action(CounterAction),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceCounter {
    /// `"{source_slug}:{kebab-name}"`, unique per character
    pub slug: String,
    pub name: String,
    pub source_slug: String,
    pub max_uses: u32,
    #[serde(default)]
    pub spent: u32,
    #[serde(default)]
    pub reset_on: Option<ResetTiming>,
}

impl ResourceCounter {
    pub fn new(
        source_slug: impl Into<String>,
        name: impl Into<String>,
        max_uses: u32,
        reset_on: Option<ResetTiming>,
    ) -> Self {
        let source_slug = source_slug.into();
        let name = name.into();
        Self {
            slug: counter_slug(&source_slug, &name),
            name,
            source_slug,
            max_uses,
            spent: 0,
            reset_on,
        }
    }

    /// Uses remaining.
    #[inline]
    pub fn current(&self) -> u32 {
        self.max_uses.saturating_sub(self.spent)
    }

    pub fn apply(&mut self, update: CounterUpdate) -> Result<(), DomainError> {
        match update {
            CounterUpdate::Spent(spent) => {
                if spent > self.max_uses {
                    return Err(DomainError::invalid_field(
                        "spent",
                        format!("must be between 0 and {}", self.max_uses),
                    ));
                }
                self.spent = spent;
            }
            CounterUpdate::Action(CounterAction::Use) => {
                if self.current() == 0 {
                    return Err(DomainError::constraint("No uses remaining for this counter."));
                }
                self.spent += 1;
            }
            CounterUpdate::Action(CounterAction::Restore) => {
                if self.spent == 0 {
                    return Err(DomainError::constraint("Counter is already at maximum."));
                }
                self.spent -= 1;
            }
            CounterUpdate::Action(CounterAction::Reset) => self.spent = 0,
        }
        Ok(())
    }

    /// Apply a new maximum, capping spent uses so `current` never goes negative.
    pub fn rescale(&mut self, max_uses: u32, reset_on: Option<ResetTiming>) {
        self.max_uses = max_uses;
        self.reset_on = reset_on;
        self.spent = self.spent.min(max_uses);
    }
}

/// Lowercase, alphanumeric runs joined by single dashes.
pub fn kebab(name: &str) -> String {
    name.to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

pub fn counter_slug(source_slug: &str, name: &str) -> String {
    format!("{}:{}", source_slug, kebab(name))
}
