//! Property-based tests for conversion, clamping and settlement.
//!
//! These laws must hold for every rate table and balance the dashboard can
//! produce, not just the handful of values in the scenario tests.

use proptest::prelude::*;
use rust_decimal::Decimal;
use tally_core::money::round_amount;
use tally_core::{
    BalanceGuard, Currency, CurrencyConverter, CurrencyRateTable, Evaluation, EvaluationMode,
    EvaluationRequest, ReconciliationService,
};

// =============================================================================
// Generators
// =============================================================================

/// Amounts from 0.00 to 1,000,000,000.00 in cents.
fn arb_amount() -> impl Strategy<Value = Decimal> {
    (0i64..100_000_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Positive balances from 0.01 to 10,000,000.00.
fn arb_remaining() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Rates from 0.0100 to 20.0000.
fn arb_rate() -> impl Strategy<Value = Decimal> {
    (100i64..=200_000i64).prop_map(|r| Decimal::new(r, 4))
}

fn arb_rates() -> impl Strategy<Value = CurrencyRateTable> {
    (arb_rate(), arb_rate()).prop_map(|(mop, cny)| CurrencyRateTable::new(mop, cny).unwrap())
}

fn arb_foreign_currency() -> impl Strategy<Value = Currency> {
    prop_oneof![Just(Currency::Mop), Just(Currency::Cny)]
}

fn arb_currency() -> impl Strategy<Value = Currency> {
    prop_oneof![Just(Currency::Hkd), Just(Currency::Mop), Just(Currency::Cny)]
}

// =============================================================================
// Property Tests
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Converting out of HKD and back lands within a cent of the start.
    #[test]
    fn prop_round_trip_law(x in arb_amount(), currency in arb_foreign_currency(), rates in arb_rates()) {
        let converter = CurrencyConverter::new(&rates);
        let back = converter.to_hkd(converter.from_hkd(x, currency), currency);

        prop_assert!((back - x).abs() < Decimal::new(1, 2), "{} came back as {}", x, back);
    }

    /// Clamping twice is the same as clamping once.
    #[test]
    fn prop_clamp_idempotence(a in arb_amount(), r in arb_amount()) {
        let guard = BalanceGuard::default();
        let once = guard.clamp(a, r).clamped_amount_hkd;
        let twice = guard.clamp(once, r).clamped_amount_hkd;

        prop_assert_eq!(once, twice);
    }

    /// A clamped amount never exceeds the remaining balance and stays non-negative.
    #[test]
    fn prop_clamp_monotonic_non_negative(a in arb_amount(), r in arb_amount()) {
        let clamped = BalanceGuard::default().clamp(a, r).clamped_amount_hkd;

        prop_assert!(clamped <= r);
        prop_assert!(clamped >= Decimal::ZERO);
    }

    /// The remaining balance always settles itself; a whole dollar short never does.
    #[test]
    fn prop_settlement_boundary(r in arb_remaining()) {
        let guard = BalanceGuard::default();

        prop_assert!(guard.is_full_settlement(r, r));
        if r > Decimal::ONE {
            prop_assert!(!guard.is_full_settlement(r - Decimal::ONE, r));
        }
    }

    /// Whatever is typed, the normalized HKD amount fits inside the balance.
    #[test]
    fn prop_evaluate_never_exceeds_remaining(
        a in arb_amount(),
        r in arb_remaining(),
        currency in arb_currency(),
        rates in arb_rates(),
    ) {
        let service = ReconciliationService::default();
        let maximum = service.max_allowed(r, currency, &rates);
        prop_assume!(!maximum.is_zero());

        let request = EvaluationRequest::new(a.to_string(), currency, Some(r));
        let evaluation = service.evaluate(&request, &rates, EvaluationMode::Blur).unwrap();

        let Evaluation::Normalized(tx) = evaluation else {
            return Err(TestCaseError::fail("blur of a valid amount must normalize"));
        };
        prop_assert!(tx.amount_hkd <= r);
        prop_assert_eq!(tx.amount_hkd, round_amount(tx.amount_hkd));
        prop_assert_eq!(tx.warning.is_some() || tx.value() == round_amount(a), true);
        if tx.warning.is_some() {
            prop_assert_eq!(tx.value(), maximum);
            prop_assert!(round_amount(a) > maximum);
        }
    }

    /// Blurring the normalized amount again changes nothing and clamps nothing.
    #[test]
    fn prop_evaluate_is_a_fixed_point(
        a in arb_amount(),
        r in arb_remaining(),
        currency in arb_currency(),
        rates in arb_rates(),
    ) {
        let service = ReconciliationService::default();
        prop_assume!(!service.max_allowed(r, currency, &rates).is_zero());

        let first = service
            .evaluate(&EvaluationRequest::new(a.to_string(), currency, Some(r)), &rates, EvaluationMode::Blur)
            .unwrap();
        let Some(first) = first.normalized() else {
            return Err(TestCaseError::fail("blur of a valid amount must normalize"));
        };

        let second = service
            .evaluate(
                &EvaluationRequest::new(first.normalized_amount.clone(), currency, Some(r)),
                &rates,
                EvaluationMode::Blur,
            )
            .unwrap();
        let Some(second) = second.normalized() else {
            return Err(TestCaseError::fail("re-evaluation must normalize"));
        };

        prop_assert_eq!(&second.normalized_amount, &first.normalized_amount);
        prop_assert_eq!(second.amount_hkd, first.amount_hkd);
        prop_assert_eq!(second.partial, first.partial);
        prop_assert!(second.warning.is_none());
    }
}
