//! # Balance Module
//!
//! Keeps every transaction inside the invoice's remaining balance.
//!
//! ## Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  remaining = 1000.00 HKD                                                │
//! │                                                                         │
//! │  amount   0 ─────────────── 999.99 ─┬─ 1000.00 ─┬── 1165.05 ──►         │
//! │           │     partial            │   full    │   clamped to 1000.00  │
//! │           └────────────────────────┘           └──────────────────────  │
//! │                                                                         │
//! │  full  ⇔  |amount - remaining| < ε   (ε = 0.01 HKD by default)          │
//! │  remaining <= 0  ⇒  not settleable, nothing may be recorded             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All amounts here are HKD and already rounded to 2 dp by the caller.

use rust_decimal::Decimal;

use crate::error::ValidationError;
use crate::validation::validate_epsilon;
use crate::SETTLEMENT_EPSILON;

/// Result of [`BalanceGuard::clamp`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClampOutcome {
    pub clamped_amount_hkd: Decimal,
    pub was_clamped: bool,
}

/// Clamp and settlement checks against a remaining HKD balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceGuard {
    epsilon: Decimal,
}

impl Default for BalanceGuard {
    fn default() -> Self {
        BalanceGuard {
            epsilon: SETTLEMENT_EPSILON,
        }
    }
}

impl BalanceGuard {
    /// Creates a guard with a custom full-settlement tolerance.
    pub fn new(epsilon: Decimal) -> Result<Self, ValidationError> {
        validate_epsilon(epsilon)?;
        Ok(BalanceGuard { epsilon })
    }

    #[inline]
    pub const fn epsilon(&self) -> Decimal {
        self.epsilon
    }

    /// Caps `amount_hkd` at `remaining_hkd`.
    ///
    /// Negative amounts never get here; they are rejected while parsing.
    pub fn clamp(&self, amount_hkd: Decimal, remaining_hkd: Decimal) -> ClampOutcome {
        if amount_hkd > remaining_hkd {
            ClampOutcome {
                clamped_amount_hkd: remaining_hkd,
                was_clamped: true,
            }
        } else {
            ClampOutcome {
                clamped_amount_hkd: amount_hkd,
                was_clamped: false,
            }
        }
    }

    /// True when `amount_hkd` settles the invoice, within epsilon.
    pub fn is_full_settlement(&self, amount_hkd: Decimal, remaining_hkd: Decimal) -> bool {
        (amount_hkd - remaining_hkd).abs() < self.epsilon
    }

    /// False once the invoice has nothing left to pay or deliver.
    #[inline]
    pub fn is_settleable(&self, remaining_hkd: Decimal) -> bool {
        remaining_hkd > Decimal::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_clamp_over_remaining() {
        let guard = BalanceGuard::default();
        let outcome = guard.clamp(dec!(1165.05), dec!(1000.00));

        assert_eq!(outcome.clamped_amount_hkd, dec!(1000.00));
        assert!(outcome.was_clamped);
    }

    #[test]
    fn test_clamp_within_remaining() {
        let guard = BalanceGuard::default();

        let outcome = guard.clamp(dec!(200), dec!(500));
        assert_eq!(outcome.clamped_amount_hkd, dec!(200));
        assert!(!outcome.was_clamped);

        // Exactly the remaining amount is not a clamp.
        assert!(!guard.clamp(dec!(500), dec!(500)).was_clamped);
    }

    #[test]
    fn test_full_settlement_epsilon() {
        let guard = BalanceGuard::default();

        assert!(guard.is_full_settlement(dec!(500.00), dec!(500.00)));
        assert!(guard.is_full_settlement(dec!(499.995), dec!(500.00)));
        assert!(!guard.is_full_settlement(dec!(499.99), dec!(500.00)));
        assert!(!guard.is_full_settlement(dec!(200.00), dec!(500.00)));
    }

    #[test]
    fn test_is_settleable() {
        let guard = BalanceGuard::default();

        assert!(guard.is_settleable(dec!(0.01)));
        assert!(!guard.is_settleable(dec!(0)));
        assert!(!guard.is_settleable(dec!(-5)));
    }

    #[test]
    fn test_custom_epsilon() {
        let guard = BalanceGuard::new(dec!(0.05)).unwrap();
        assert_eq!(guard.epsilon(), dec!(0.05));
        assert!(guard.is_full_settlement(dec!(99.96), dec!(100)));

        assert!(BalanceGuard::new(dec!(0)).is_err());
    }
}
