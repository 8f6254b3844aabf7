//! # Converter Module
//!
//! Pure conversion between HKD and MOP/CNY.
//!
//! ```text
//!            from_hkd (× rate)
//!   HKD  ─────────────────────►  MOP / CNY
//!        ◄─────────────────────
//!            to_hkd   (÷ rate)
//! ```
//!
//! No rounding happens here. Callers round once, at the edge where an amount
//! is compared, displayed or submitted (see [`crate::money::round_amount`]).

use rust_decimal::Decimal;

use crate::money::Currency;
use crate::rates::CurrencyRateTable;

/// Converts amounts using one rate table snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrencyConverter {
    rates: CurrencyRateTable,
}

impl CurrencyConverter {
    pub fn new(rates: &CurrencyRateTable) -> Self {
        CurrencyConverter { rates: *rates }
    }

    /// HKD → `target`.
    ///
    /// Saturates at `Decimal::MAX` instead of overflowing; accepted amounts
    /// and rates never get there.
    pub fn from_hkd(&self, amount_hkd: Decimal, target: Currency) -> Decimal {
        match target {
            Currency::Hkd => amount_hkd,
            _ => amount_hkd.saturating_mul(self.rates.rate_for(target)),
        }
    }

    /// `source` → HKD.
    pub fn to_hkd(&self, amount: Decimal, source: Currency) -> Decimal {
        match source {
            Currency::Hkd => amount,
            _ => amount
                .checked_div(self.rates.rate_for(source))
                .unwrap_or(Decimal::MAX),
        }
    }

    /// `from` → `to`, pivoting through HKD.
    pub fn convert(&self, amount: Decimal, from: Currency, to: Currency) -> Decimal {
        if from == to {
            return amount;
        }
        self.from_hkd(self.to_hkd(amount, from), to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::round_amount;
    use rust_decimal_macros::dec;

    fn converter() -> CurrencyConverter {
        CurrencyConverter::new(&CurrencyRateTable::default())
    }

    #[test]
    fn test_hkd_is_identity() {
        let c = converter();
        assert_eq!(c.from_hkd(dec!(123.45), Currency::Hkd), dec!(123.45));
        assert_eq!(c.to_hkd(dec!(123.45), Currency::Hkd), dec!(123.45));
    }

    #[test]
    fn test_from_hkd() {
        let c = converter();
        assert_eq!(c.from_hkd(dec!(1000), Currency::Mop), dec!(1030));
        assert_eq!(c.from_hkd(dec!(1000), Currency::Cny), dec!(930));
    }

    #[test]
    fn test_to_hkd_is_unrounded() {
        let c = converter();
        let hkd = c.to_hkd(dec!(1200), Currency::Mop);
        assert!(hkd > dec!(1165.048) && hkd < dec!(1165.049));
        assert_eq!(round_amount(hkd), dec!(1165.05));

        assert_eq!(round_amount(c.to_hkd(dec!(100), Currency::Cny)), dec!(107.53));
    }

    #[test]
    fn test_convert_pivots_through_hkd() {
        let c = converter();
        assert_eq!(c.convert(dec!(1030), Currency::Mop, Currency::Cny), dec!(930));
        assert_eq!(c.convert(dec!(42), Currency::Cny, Currency::Cny), dec!(42));
    }
}
