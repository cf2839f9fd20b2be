//! One-time conversion of a receipt amount into the base currency
//!
//! Conversion happens when a record is written and never again; a failed
//! lookup still produces a record, stored in its original currency.

use tracing::warn;

use crate::models::{CurrencyCode, Money};
use crate::rates::RateProvider;

/// Outcome of converting one amount
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    /// Amount to store
    pub amount: Money,
    /// Currency the stored amount is in
    pub currency: CurrencyCode,
    /// Audit text for the record
    pub note: String,
}

/// Convert `amount` from `from` into `base`
pub fn convert_to_base<R: RateProvider + ?Sized>(
    amount: Money,
    from: &CurrencyCode,
    base: &CurrencyCode,
    rates: &R,
) -> Conversion {
    if from == base {
        return Conversion {
            amount,
            currency: base.clone(),
            note: "No conversion needed".to_string(),
        };
    }

    let reason = match rates.rate(from, base) {
        Ok(rate) => match amount.convert(rate) {
            Some(converted) => {
                return Conversion {
                    amount: converted,
                    currency: base.clone(),
                    note: format!(
                        "Converted at 1 {} = {} {}",
                        from,
                        rate.round_dp(6).normalize(),
                        base
                    ),
                };
            }
            None => "converted amount out of range".to_string(),
        },
        Err(e) => e.to_string(),
    };

    warn!(%from, %base, %reason, "storing expense unconverted");
    Conversion {
        amount,
        currency: from.clone(),
        note: format!("Rate unavailable ({}); stored in {}", reason, from),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rates::RatesTable;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn code(s: &str) -> CurrencyCode {
        CurrencyCode::parse(s).unwrap()
    }

    fn rates() -> RatesTable {
        RatesTable::new(code("HKD")).with_rate(code("JPY"), Decimal::from_str("0.052").unwrap())
    }

    #[test]
    fn test_same_currency() {
        let c = convert_to_base(Money::from_cents(1000), &code("HKD"), &code("HKD"), &rates());
        assert_eq!(c.amount.cents(), 1000);
        assert_eq!(c.note, "No conversion needed");
        assert_eq!(c.currency, code("HKD"));
    }

    #[test]
    fn test_converted() {
        let c = convert_to_base(Money::from_cents(128000), &code("JPY"), &code("HKD"), &rates());
        assert_eq!(c.amount.cents(), 6656);
        assert_eq!(c.currency, code("HKD"));
        assert_eq!(c.note, "Converted at 1 JPY = 0.052 HKD");
    }

    #[test]
    fn test_rate_unavailable_keeps_original() {
        let c = convert_to_base(Money::from_cents(2500), &code("EUR"), &code("HKD"), &rates());
        assert_eq!(c.amount.cents(), 2500);
        assert_eq!(c.currency, code("EUR"));
        assert_ne!(c.currency, code("HKD"));
        assert!(c.note.starts_with("Rate unavailable ("));
        assert!(c.note.ends_with("stored in EUR"));
    }
}
