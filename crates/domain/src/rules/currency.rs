//! Currency ledger - signed deltas with automatic change making.
//!
//! Additions and absolute sets are committed to a working copy first, so
//! "add gold, spend silver" can spend the gold just added. Each subtraction
//! then takes what its denomination holds and breaks the nearest higher
//! denomination for the rest, converting only as many coins as the shortfall
//! needs. The original holdings are only replaced when every delta succeeds.

use crate::error::DomainError;
use crate::value_objects::{CurrencyHoldings, Denomination, SignedAmount};

/// Parse wire fields (`"gp" => "-10"`) into typed deltas, attributing errors
/// to the offending field.
pub fn parse_deltas<'a>(
    fields: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> Result<Vec<(Denomination, SignedAmount)>, DomainError> {
    fields
        .into_iter()
        .map(|(key, value)| {
            let denomination: Denomination = key.parse()?;
            let amount = SignedAmount::parse(value)
                .map_err(|e| DomainError::invalid_field(key, e.to_string()))?;
            Ok((denomination, amount))
        })
        .collect()
}

/// Apply every delta atomically.
///
/// # Errors
///
/// `InsufficientFunds` when the holdings (after additions) are worth less
/// than all subtractions together, or when a subtraction can only be covered
/// by lower denominations, which are never consolidated upward.
pub fn apply_deltas(
    holdings: &CurrencyHoldings,
    deltas: &[(Denomination, SignedAmount)],
) -> Result<CurrencyHoldings, DomainError> {
    let mut ordered = deltas.to_vec();
    ordered.sort_by_key(|(denomination, _)| *denomination);

    let mut working = *holdings;
    for (denomination, amount) in &ordered {
        match amount {
            SignedAmount::Add(n) => {
                working.set(*denomination, working.get(*denomination).saturating_add(*n))
            }
            SignedAmount::Set(n) => working.set(*denomination, *n),
            SignedAmount::Subtract(_) => {}
        }
    }

    let required = ordered
        .iter()
        .filter(|(_, amount)| amount.is_subtraction())
        .map(|(d, amount)| amount.magnitude().saturating_mul(d.copper_value()))
        .fold(0u64, u64::saturating_add);
    let available = working.total_copper();
    if required > available {
        return Err(DomainError::insufficient_funds(required, available));
    }

    for (denomination, amount) in &ordered {
        if let SignedAmount::Subtract(n) = amount {
            spend(&mut working, *denomination, *n)?;
        }
    }

    Ok(working)
}

fn spend(
    working: &mut CurrencyHoldings,
    target: Denomination,
    amount: u64,
) -> Result<(), DomainError> {
    loop {
        let have = working.get(target);
        if have >= amount {
            working.set(target, have - amount);
            return Ok(());
        }
        if !make_change(working, target, amount - have) {
            return Err(DomainError::insufficient_funds(
                amount.saturating_mul(target.copper_value()),
                value_at_or_above(working, target),
            ));
        }
    }
}

/// Break coins of the nearest higher denomination that has any, one step
/// down toward `target`. Returns false when nothing above `target` is held.
fn make_change(working: &mut CurrencyHoldings, target: Denomination, shortfall: u64) -> bool {
    let Some(source) = Denomination::ALL
        .into_iter()
        .rev()
        .filter(|d| d.copper_value() > target.copper_value())
        .find(|d| working.get(*d) > 0)
    else {
        return false;
    };

    let (lower, rate) = step_down(source, target);
    let needed_copper = shortfall.saturating_mul(target.copper_value());
    let coins = working
        .get(source)
        .min(needed_copper.div_ceil(source.copper_value()));

    working.set(source, working.get(source) - coins);
    working.set(lower, working.get(lower).saturating_add(coins.saturating_mul(rate)));
    true
}

/// The next denomination down from `source` on the way to `target`, and how
/// many of it one `source` coin is worth. Gold only breaks into electrum when
/// electrum is what is being spent.
fn step_down(source: Denomination, target: Denomination) -> (Denomination, u64) {
    match source {
        Denomination::Pp => (Denomination::Gp, 10),
        Denomination::Gp if target == Denomination::Ep => (Denomination::Ep, 2),
        Denomination::Gp => (Denomination::Sp, 10),
        Denomination::Ep => (Denomination::Sp, 5),
        Denomination::Sp | Denomination::Cp => (Denomination::Cp, 10),
    }
}

fn value_at_or_above(working: &CurrencyHoldings, target: Denomination) -> u64 {
    Denomination::ALL
        .into_iter()
        .filter(|d| d.copper_value() >= target.copper_value())
        .map(|d| working.get(d).saturating_mul(d.copper_value()))
        .fold(0u64, u64::saturating_add)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn holdings(pp: u64, gp: u64, ep: u64, sp: u64, cp: u64) -> CurrencyHoldings {
        CurrencyHoldings { pp, gp, ep, sp, cp }
    }

    fn deltas(fields: &[(&str, &str)]) -> Vec<(Denomination, SignedAmount)> {
        parse_deltas(fields.iter().copied()).unwrap()
    }

    mod making_change {
        use super::*;

        #[test]
        fn gold_breaks_into_silver() {
            let result =
                apply_deltas(&holdings(0, 5, 0, 0, 0), &deltas(&[("sp", "-10")])).unwrap();
            assert_eq!(result, holdings(0, 4, 0, 0, 0));
        }

        #[test]
        fn change_stays_in_the_lower_denomination() {
            let result =
                apply_deltas(&holdings(0, 5, 0, 0, 0), &deltas(&[("cp", "-50")])).unwrap();
            assert_eq!(result, holdings(0, 4, 0, 5, 0));
        }

        #[test]
        fn platinum_cascades_through_gold() {
            let result =
                apply_deltas(&holdings(1, 0, 0, 0, 0), &deltas(&[("sp", "-5")])).unwrap();
            assert_eq!(result, holdings(0, 9, 0, 5, 0));
        }

        #[test]
        fn only_breaks_what_is_needed() {
            let result =
                apply_deltas(&holdings(0, 0, 0, 5, 0), &deltas(&[("cp", "-20")])).unwrap();
            assert_eq!(result, holdings(0, 0, 0, 3, 0));
        }

        #[test]
        fn electrum_is_the_nearest_source_for_silver() {
            let result =
                apply_deltas(&holdings(0, 3, 2, 0, 0), &deltas(&[("sp", "-5")])).unwrap();
            assert_eq!(result, holdings(0, 3, 1, 0, 0));
        }

        #[test]
        fn gold_breaks_into_electrum_when_spending_electrum() {
            let result =
                apply_deltas(&holdings(0, 1, 0, 0, 0), &deltas(&[("ep", "-1")])).unwrap();
            assert_eq!(result, holdings(0, 0, 1, 0, 0));
        }

        #[test]
        fn existing_coins_are_used_before_breaking() {
            let result =
                apply_deltas(&holdings(0, 5, 0, 3, 0), &deltas(&[("sp", "-7")])).unwrap();
            assert_eq!(result, holdings(0, 4, 0, 6, 0));
        }

        #[test]
        fn value_is_conserved() {
            let before = holdings(2, 3, 1, 4, 7);
            let after = apply_deltas(&before, &deltas(&[("cp", "-1234")])).unwrap();
            assert_eq!(before.total_copper() - 1234, after.total_copper());
        }
    }

    mod ordering_and_atomicity {
        use super::*;

        #[test]
        fn additions_fund_subtractions() {
            let result = apply_deltas(
                &CurrencyHoldings::default(),
                &deltas(&[("sp", "-50"), ("gp", "+10")]),
            )
            .unwrap();
            assert_eq!(result, holdings(0, 5, 0, 0, 0));
        }

        #[test]
        fn insufficient_total_rejects_everything() {
            let before = holdings(0, 1, 0, 0, 0);
            let err = apply_deltas(&before, &deltas(&[("cp", "-150")])).unwrap_err();
            assert_eq!(err, DomainError::insufficient_funds(150, 100));
        }

        #[test]
        fn mixed_request_applies_in_full() {
            let before = holdings(0, 100, 0, 50, 0);
            let result = apply_deltas(
                &before,
                &deltas(&[("gp", "-10"), ("sp", "+20"), ("cp", "100")]),
            )
            .unwrap();
            assert_eq!(result, holdings(0, 90, 0, 70, 100));
        }

        #[test]
        fn lower_denominations_are_never_consolidated() {
            let before = holdings(0, 0, 0, 0, 500);
            let err = apply_deltas(&before, &deltas(&[("gp", "-1")])).unwrap_err();
            assert_eq!(err, DomainError::insufficient_funds(100, 0));
        }

        #[test]
        fn zero_deltas_are_identity() {
            let before = holdings(1, 2, 3, 4, 5);
            let result =
                apply_deltas(&before, &deltas(&[("gp", "+0"), ("cp", "-0")])).unwrap();
            assert_eq!(result, before);
        }

        #[test]
        fn absolute_set_replaces() {
            let result =
                apply_deltas(&holdings(0, 7, 0, 0, 0), &deltas(&[("gp", "2")])).unwrap();
            assert_eq!(result.gp, 2);
        }
    }

    mod parsing {
        use super::*;

        #[test]
        fn unknown_key_is_field_error() {
            let err = parse_deltas([("xp", "+1")]).unwrap_err();
            assert_eq!(err.field(), Some("xp"));
        }

        #[test]
        fn malformed_value_is_attributed_to_its_field() {
            let err = parse_deltas([("gp", "--5")]).unwrap_err();
            assert_eq!(err.field(), Some("gp"));
        }

        #[test]
        fn oversized_magnitude_is_rejected() {
            assert!(parse_deltas([("cp", "+1234567890")]).is_err());
        }
    }
}
