//! Signed amount strings used by hit point and currency requests.
//!
//! - `"+N"` adds N
//! - `"-N"` subtracts N
//! - `"N"` sets the value to N

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Longest accepted magnitude, in digits.
pub const MAX_AMOUNT_DIGITS: usize = 9;

/// Errors that can occur when parsing a signed amount
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountParseError {
    #[error("Empty amount")]
    Empty,
    #[error("Amount has more than one sign: {0}")]
    MultipleSigns(String),
    #[error("Amount is not a whole number: {0}")]
    NotNumeric(String),
    #[error("Amount exceeds {max} digits")]
    TooLarge { max: usize },
}

/// A parsed signed amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "op", content = "amount", rename_all = "snake_case")]
pub enum SignedAmount {
    Add(u64),
    Subtract(u64),
    Set(u64),
}

impl SignedAmount {
    /// Parse `"+N"`, `"-N"` or `"N"` where N has at most [`MAX_AMOUNT_DIGITS`] digits.
    pub fn parse(input: &str) -> Result<Self, AmountParseError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(AmountParseError::Empty);
        }

        let (sign, digits) = match input.as_bytes()[0] {
            b'+' => (Some('+'), &input[1..]),
            b'-' => (Some('-'), &input[1..]),
            _ => (None, input),
        };

        if digits.starts_with(['+', '-']) {
            return Err(AmountParseError::MultipleSigns(input.to_string()));
        }
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AmountParseError::NotNumeric(input.to_string()));
        }
        if digits.len() > MAX_AMOUNT_DIGITS {
            return Err(AmountParseError::TooLarge {
                max: MAX_AMOUNT_DIGITS,
            });
        }

        let magnitude: u64 = digits
            .parse()
            .map_err(|_| AmountParseError::NotNumeric(input.to_string()))?;

        Ok(match sign {
            Some('+') => Self::Add(magnitude),
            Some(_) => Self::Subtract(magnitude),
            None => Self::Set(magnitude),
        })
    }

    pub fn magnitude(&self) -> u64 {
        match self {
            Self::Add(n) | Self::Subtract(n) | Self::Set(n) => *n,
        }
    }

    pub fn is_subtraction(&self) -> bool {
        matches!(self, Self::Subtract(_))
    }

    /// `+0` and `-0` leave any value unchanged.
    pub fn is_noop(&self) -> bool {
        matches!(self, Self::Add(0) | Self::Subtract(0))
    }
}

impl FromStr for SignedAmount {
    type Err = AmountParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for SignedAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add(n) => write!(f, "+{}", n),
            Self::Subtract(n) => write!(f, "-{}", n),
            Self::Set(n) => write!(f, "{}", n),
        }
    }
}
