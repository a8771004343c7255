//! Coin denominations and per-character holdings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;

/// The five coin denominations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Denomination {
    Pp,
    Gp,
    Ep,
    Sp,
    Cp,
}

impl Denomination {
    /// All denominations, most valuable first.
    pub const ALL: [Denomination; 5] = [Self::Pp, Self::Gp, Self::Ep, Self::Sp, Self::Cp];

    /// Value in copper pieces.
    pub fn copper_value(&self) -> u64 {
        match self {
            Self::Pp => 1000,
            Self::Gp => 100,
            Self::Ep => 50,
            Self::Sp => 10,
            Self::Cp => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pp => "pp",
            Self::Gp => "gp",
            Self::Ep => "ep",
            Self::Sp => "sp",
            Self::Cp => "cp",
        }
    }

    /// Slug of the inventory item that stores this denomination.
    pub fn item_slug(&self) -> &'static str {
        match self {
            Self::Pp => "platinum-pp",
            Self::Gp => "gold-gp",
            Self::Ep => "electrum-ep",
            Self::Sp => "silver-sp",
            Self::Cp => "copper-cp",
        }
    }

    pub fn from_item_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.item_slug() == slug)
    }
}

impl fmt::Display for Denomination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Denomination {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pp" => Ok(Self::Pp),
            "gp" => Ok(Self::Gp),
            "ep" => Ok(Self::Ep),
            "sp" => Ok(Self::Sp),
            "cp" => Ok(Self::Cp),
            _ => Err(DomainError::invalid_field(s, "unknown currency denomination")),
        }
    }
}

/// Five independent coin counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CurrencyHoldings {
    pub pp: u64,
    pub gp: u64,
    pub ep: u64,
    pub sp: u64,
    pub cp: u64,
}

impl CurrencyHoldings {
    pub fn get(&self, denomination: Denomination) -> u64 {
        match denomination {
            Denomination::Pp => self.pp,
            Denomination::Gp => self.gp,
            Denomination::Ep => self.ep,
            Denomination::Sp => self.sp,
            Denomination::Cp => self.cp,
        }
    }

    pub fn set(&mut self, denomination: Denomination, quantity: u64) {
        match denomination {
            Denomination::Pp => self.pp = quantity,
            Denomination::Gp => self.gp = quantity,
            Denomination::Ep => self.ep = quantity,
            Denomination::Sp => self.sp = quantity,
            Denomination::Cp => self.cp = quantity,
        }
    }

    pub fn with(mut self, denomination: Denomination, quantity: u64) -> Self {
        self.set(denomination, quantity);
        self
    }

    /// Total value in copper pieces.
    pub fn total_copper(&self) -> u64 {
        Denomination::ALL
            .iter()
            .map(|d| self.get(*d).saturating_mul(d.copper_value()))
            .fold(0u64, u64::saturating_add)
    }
}
