//! Value objects - immutable rule vocabulary shared by the catalog and the aggregate.

mod ability;
mod currency;
mod signed_amount;
mod skill;

pub use ability::{ability_modifier, Ability, AbilityScoreMethod, AbilityScores};
pub use currency::{CurrencyHoldings, Denomination};
pub use signed_amount::{AmountParseError, SignedAmount, MAX_AMOUNT_DIGITS};
pub use skill::Skill;
