//! Receipt intake from OCR / LLM extraction
//!
//! Extraction output is untrusted: every field may be missing, mistyped or
//! decorated with currency symbols. [`coerce_guess`] turns it into a clean
//! [`ReceiptCandidate`] with documented defaults, or rejects it outright when
//! there is nothing usable in it.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{LedgerError, LedgerResult};
use crate::models::{CurrencyCode, Money};

/// Shop name used when the receipt does not show one
pub const UNKNOWN_SHOP: &str = "Unknown";

/// Raw structured guess returned by the extraction service
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptGuess {
    #[serde(default, alias = "shop", deserialize_with = "loose_text")]
    pub shop_name: Option<String>,
    #[serde(default, alias = "total", deserialize_with = "loose_text")]
    pub total_amount: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub currency: Option<String>,
    #[serde(default, alias = "date", deserialize_with = "loose_text")]
    pub transaction_date: Option<String>,
}

/// Accept strings and numbers; anything else counts as missing
fn loose_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Source of receipt guesses
pub trait ReceiptExtractor {
    /// Extract a guess from a receipt payload
    fn extract(&self, payload: &[u8]) -> LedgerResult<ReceiptGuess>;
}

/// Extractor for a reply already produced by an external model
///
/// The payload is the model's answer text, which should contain one JSON
/// object (a surrounding markdown fence is tolerated).
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonReplyExtractor;

impl ReceiptExtractor for JsonReplyExtractor {
    fn extract(&self, payload: &[u8]) -> LedgerResult<ReceiptGuess> {
        let text = std::str::from_utf8(payload)
            .map_err(|_| LedgerError::Ocr("reply is not valid UTF-8".into()))?;
        parse_guess(text)
    }
}

/// Parse a model reply into a [`ReceiptGuess`]
pub fn parse_guess(reply: &str) -> LedgerResult<ReceiptGuess> {
    let start = reply.find('{');
    let end = reply.rfind('}');
    let json = match (start, end) {
        (Some(start), Some(end)) if start < end => &reply[start..=end],
        _ => return Err(LedgerError::Ocr("reply contains no JSON object".into())),
    };
    serde_json::from_str(json).map_err(|e| LedgerError::Ocr(format!("reply is not valid JSON: {}", e)))
}

/// A receipt ready to become an expense
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptCandidate {
    pub shop: String,
    pub amount: Money,
    pub currency: CurrencyCode,
    pub date: NaiveDate,
    /// Names of fields that fell back to a default
    pub defaulted: Vec<&'static str>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("null"))
}

/// Read an amount as printed on a receipt
///
/// Text before the first digit and after the last one is dropped, as are
/// spaces. The last `.` or `,` is the decimal point when one or two digits
/// follow it; every other separator groups thousands.
pub fn coerce_amount(text: &str) -> Option<Money> {
    let first = text.find(|c: char| c.is_ascii_digit())?;
    let last = text.rfind(|c: char| c.is_ascii_digit())?;
    if text[..first].trim_end().ends_with('-') {
        return None;
    }

    let is_separator = |c: char| c == '.' || c == ',';
    let number: String = text[first..=last]
        .chars()
        .filter(|c| c.is_ascii_digit() || is_separator(*c))
        .collect();
    let digits = |s: &str| s.chars().filter(char::is_ascii_digit).collect::<String>();

    let normalized = match number.rfind(is_separator) {
        Some(pos) if number.len() - pos <= 3 => {
            format!("{}.{}", digits(&number[..pos]), &number[pos + 1..])
        }
        _ => digits(&number),
    };

    Money::parse(&normalized).ok()
}

/// Currency symbol or code printed alongside an amount, e.g. `HK$` in
/// `HK$ 88.00`
pub fn currency_in_amount(text: &str) -> Option<CurrencyCode> {
    let marker: String = text
        .chars()
        .filter(|c| !(c.is_ascii_digit() || c.is_whitespace() || matches!(c, '.' | ',' | '-')))
        .collect();
    if marker.chars().any(|c| c.is_ascii_lowercase()) {
        return None;
    }
    CurrencyCode::from_symbol_or_code(&marker)
}

/// Read a receipt date in any of the common layouts
pub fn coerce_date(text: &str) -> Option<NaiveDate> {
    const FORMATS: [&str; 5] = ["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d", "%d/%m/%Y", "%d-%m-%Y"];
    let text = text.trim();
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
}

/// Validate and coerce a guess
///
/// Defaults: shop `Unknown`, amount `0.00`, currency `base`, date `today`.
/// A missing currency is first looked for next to the amount.
/// A guess with neither a shop name nor an amount is rejected.
pub fn coerce_guess(
    guess: &ReceiptGuess,
    base: &CurrencyCode,
    today: NaiveDate,
) -> LedgerResult<ReceiptCandidate> {
    let mut defaulted = Vec::new();

    let shop = non_blank(&guess.shop_name).map(str::to_string);
    let amount = non_blank(&guess.total_amount).and_then(coerce_amount);

    if shop.is_none() && amount.is_none() {
        return Err(LedgerError::Ocr(
            "no shop name or total could be read from the receipt".into(),
        ));
    }

    let shop = shop.unwrap_or_else(|| {
        defaulted.push("shop");
        UNKNOWN_SHOP.to_string()
    });

    let amount = amount.unwrap_or_else(|| {
        defaulted.push("amount");
        Money::zero()
    });

    let currency = non_blank(&guess.currency)
        .and_then(CurrencyCode::from_symbol_or_code)
        .or_else(|| non_blank(&guess.total_amount).and_then(currency_in_amount))
        .unwrap_or_else(|| {
            defaulted.push("currency");
            base.clone()
        });

    let date = non_blank(&guess.transaction_date)
        .and_then(coerce_date)
        .unwrap_or_else(|| {
            defaulted.push("date");
            today
        });

    Ok(ReceiptCandidate {
        shop,
        amount,
        currency,
        date,
        defaulted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hkd() -> CurrencyCode {
        CurrencyCode::from_static("HKD")
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, 1).unwrap()
    }

    #[test]
    fn test_parse_fenced_reply() {
        let reply = "```json\n{\"shop_name\": \"Lawson\", \"total_amount\": 1280, \"currency\": \"JPY\", \"transaction_date\": \"2025-04-30\"}\n```";
        let guess = parse_guess(reply).unwrap();

        assert_eq!(guess.shop_name.as_deref(), Some("Lawson"));
        assert_eq!(guess.total_amount.as_deref(), Some("1280"));
        assert_eq!(guess.transaction_date.as_deref(), Some("2025-04-30"));
    }

    #[test]
    fn test_parse_rejects_non_json() {
        assert!(matches!(parse_guess("sorry, I can't read that"), Err(LedgerError::Ocr(_))));
        assert!(matches!(parse_guess("{not json}"), Err(LedgerError::Ocr(_))));
    }

    #[test]
    fn test_loose_types() {
        let guess = parse_guess(r#"{"shop": ["a"], "total": "HK$ 1,234.50", "currency": null}"#).unwrap();
        assert_eq!(guess.shop_name, None);
        assert_eq!(guess.total_amount.as_deref(), Some("HK$ 1,234.50"));
        assert_eq!(guess.currency, None);
    }

    #[test]
    fn test_coerce_amount() {
        assert_eq!(coerce_amount("HK$ 1,234.50").unwrap().cents(), 123450);
        assert_eq!(coerce_amount("¥1280").unwrap().cents(), 128000);
        assert_eq!(coerce_amount("12,50 €").unwrap().cents(), 1250);
        assert_eq!(coerce_amount("1,234").unwrap().cents(), 123400);
        assert_eq!(coerce_amount("-5.00"), None);
        assert_eq!(coerce_amount("free"), None);
    }

    #[test]
    fn test_coerce_amount_separators() {
        assert_eq!(coerce_amount("1.234,50").unwrap().cents(), 123450);
        assert_eq!(coerce_amount("1 234,50 €").unwrap().cents(), 123450);
        assert_eq!(coerce_amount("1,234,567.8").unwrap().cents(), 123456780);
        assert_eq!(coerce_amount("Rs. 100").unwrap().cents(), 10000);
        assert_eq!(coerce_amount("Total: 45.20.").unwrap().cents(), 4520);
        assert_eq!(coerce_amount("1.234").unwrap().cents(), 123400);
        assert_eq!(coerce_amount("$ -3"), None);
    }

    #[test]
    fn test_currency_in_amount() {
        assert_eq!(currency_in_amount("HK$ 88.00"), Some(hkd()));
        assert_eq!(currency_in_amount("12,50 €").unwrap().as_str(), "EUR");
        assert_eq!(currency_in_amount("JPY 1280").unwrap().as_str(), "JPY");
        assert_eq!(currency_in_amount("88.00"), None);
        assert_eq!(currency_in_amount("Tax 12"), None);

        let guess = ReceiptGuess {
            shop_name: Some("Lawson".into()),
            total_amount: Some("¥1,280".into()),
            currency: None,
            transaction_date: None,
        };
        let candidate = coerce_guess(&guess, &hkd(), today()).unwrap();
        assert_eq!(candidate.currency.as_str(), "JPY");
        assert_eq!(candidate.amount.cents(), 128000);
        assert_eq!(candidate.defaulted, vec!["date"]);
    }

    #[test]
    fn test_coerce_date() {
        let expected = NaiveDate::from_ymd_opt(2025, 4, 30).unwrap();
        assert_eq!(coerce_date("2025-04-30"), Some(expected));
        assert_eq!(coerce_date("2025/04/30"), Some(expected));
        assert_eq!(coerce_date("30/04/2025"), Some(expected));
        assert_eq!(coerce_date("yesterday"), None);
    }

    #[test]
    fn test_full_guess() {
        let guess = ReceiptGuess {
            shop_name: Some(" Lawson ".into()),
            total_amount: Some("1280".into()),
            currency: Some("¥".into()),
            transaction_date: Some("2025-04-30".into()),
        };
        let candidate = coerce_guess(&guess, &hkd(), today()).unwrap();

        assert_eq!(candidate.shop, "Lawson");
        assert_eq!(candidate.amount.cents(), 128000);
        assert_eq!(candidate.currency.as_str(), "JPY");
        assert!(candidate.defaulted.is_empty());
    }

    #[test]
    fn test_missing_fields_default() {
        let guess = ReceiptGuess {
            shop_name: None,
            total_amount: Some("45.2".into()),
            currency: Some("dollars".into()),
            transaction_date: Some("null".into()),
        };
        let candidate = coerce_guess(&guess, &hkd(), today()).unwrap();

        assert_eq!(candidate.shop, UNKNOWN_SHOP);
        assert_eq!(candidate.amount.cents(), 4520);
        assert_eq!(candidate.currency, hkd());
        assert_eq!(candidate.date, today());
        assert_eq!(candidate.defaulted, vec!["shop", "currency", "date"]);
    }

    #[test]
    fn test_amount_defaults_to_zero_when_shop_present() {
        let guess = ReceiptGuess {
            shop_name: Some("Park'n Shop".into()),
            total_amount: Some("illegible".into()),
            ..Default::default()
        };
        let candidate = coerce_guess(&guess, &hkd(), today()).unwrap();
        assert!(candidate.amount.is_zero());
        assert!(candidate.defaulted.contains(&"amount"));
    }

    #[test]
    fn test_unusable_guess_rejected() {
        let err = coerce_guess(&ReceiptGuess::default(), &hkd(), today()).unwrap_err();
        assert!(matches!(err, LedgerError::Ocr(_)));
    }

    #[test]
    fn test_json_reply_extractor() {
        let guess = JsonReplyExtractor
            .extract(br#"{"shop_name": "Circle K", "total_amount": "12.00"}"#)
            .unwrap();
        assert_eq!(guess.shop_name.as_deref(), Some("Circle K"));
        assert!(JsonReplyExtractor.extract(&[0xff, 0xfe]).is_err());
    }
}
