//! Exchange-rate providers
//!
//! The live rate lookup is an external collaborator behind [`RateProvider`].
//! [`RatesFileProvider`] reads a user-maintained `rates.json`, and
//! [`CachedRateProvider`] keeps fetched rates for a bounded time window.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{LedgerError, LedgerResult};
use crate::models::CurrencyCode;
use crate::storage::read_text;

/// Source of exchange rates
pub trait RateProvider {
    /// Units of `to` for one unit of `from`; always positive on success
    fn rate(&self, from: &CurrencyCode, to: &CurrencyCode) -> LedgerResult<Decimal>;
}

fn unavailable(from: &CurrencyCode, to: &CurrencyCode, reason: impl Into<String>) -> LedgerError {
    LedgerError::RateUnavailable {
        from: from.to_string(),
        to: to.to_string(),
        reason: reason.into(),
    }
}

/// A table of rates quoted against one currency
///
/// `rates[X]` is how many units of `base` one unit of `X` buys. Cross
/// rates go through the base.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatesTable {
    pub base: CurrencyCode,
    #[serde(default)]
    pub rates: BTreeMap<CurrencyCode, Decimal>,
}

impl RatesTable {
    pub fn new(base: CurrencyCode) -> Self {
        Self {
            base,
            rates: BTreeMap::new(),
        }
    }

    pub fn with_rate(mut self, code: CurrencyCode, units_of_base: Decimal) -> Self {
        self.rates.insert(code, units_of_base);
        self
    }

    fn in_base(&self, code: &CurrencyCode) -> Option<Decimal> {
        if code == &self.base {
            return Some(Decimal::ONE);
        }
        self.rates
            .get(code)
            .copied()
            .filter(|r| r.is_sign_positive() && !r.is_zero())
    }

    /// Look up a rate, `None` if either side is missing from the table
    pub fn lookup(&self, from: &CurrencyCode, to: &CurrencyCode) -> Option<Decimal> {
        let from_in_base = self.in_base(from)?;
        let to_in_base = self.in_base(to)?;
        from_in_base.checked_div(to_in_base)
    }
}

impl RateProvider for RatesTable {
    fn rate(&self, from: &CurrencyCode, to: &CurrencyCode) -> LedgerResult<Decimal> {
        self.lookup(from, to)
            .ok_or_else(|| unavailable(from, to, "no rate in table"))
    }
}

/// Reads `rates.json` on every lookup
pub struct RatesFileProvider {
    path: PathBuf,
}

impl RatesFileProvider {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn load(&self) -> Result<RatesTable, String> {
        let text = read_text(&self.path)
            .map_err(|e| e.to_string())?
            .ok_or_else(|| format!("{} not found", self.path.display()))?;
        serde_json::from_str(&text).map_err(|e| format!("{} is invalid: {}", self.path.display(), e))
    }
}

impl RateProvider for RatesFileProvider {
    fn rate(&self, from: &CurrencyCode, to: &CurrencyCode) -> LedgerResult<Decimal> {
        let table = self.load().map_err(|reason| unavailable(from, to, reason))?;
        table.rate(from, to)
    }
}

struct CachedRate {
    rate: Decimal,
    fetched_at: Instant,
}

/// Memoises successful lookups for `ttl`; failures are never cached
pub struct CachedRateProvider<P> {
    inner: P,
    ttl: Duration,
    entries: Mutex<HashMap<(CurrencyCode, CurrencyCode), CachedRate>>,
}

impl<P: RateProvider> CachedRateProvider<P> {
    pub fn new(inner: P, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn rate_at(&self, from: &CurrencyCode, to: &CurrencyCode, now: Instant) -> LedgerResult<Decimal> {
        let key = (from.clone(), to.clone());
        {
            let entries = self
                .entries
                .lock()
                .map_err(|e| LedgerError::Storage(format!("Failed to acquire rate cache: {}", e)))?;
            if let Some(cached) = entries.get(&key) {
                if now.saturating_duration_since(cached.fetched_at) < self.ttl {
                    return Ok(cached.rate);
                }
            }
        }

        debug!(%from, %to, "fetching exchange rate");
        let rate = self.inner.rate(from, to)?;

        let mut entries = self
            .entries
            .lock()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire rate cache: {}", e)))?;
        entries.insert(
            key,
            CachedRate {
                rate,
                fetched_at: now,
            },
        );
        Ok(rate)
    }
}

impl<P: RateProvider> RateProvider for CachedRateProvider<P> {
    fn rate(&self, from: &CurrencyCode, to: &CurrencyCode) -> LedgerResult<Decimal> {
        self.rate_at(from, to, Instant::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    fn code(s: &str) -> CurrencyCode {
        CurrencyCode::parse(s).unwrap()
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn table() -> RatesTable {
        RatesTable::new(code("HKD"))
            .with_rate(code("JPY"), dec("0.05"))
            .with_rate(code("USD"), dec("7.8"))
            .with_rate(code("XXX"), dec("0"))
    }

    struct Counting {
        calls: AtomicUsize,
        fail: bool,
    }

    impl RateProvider for Counting {
        fn rate(&self, from: &CurrencyCode, to: &CurrencyCode) -> LedgerResult<Decimal> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(unavailable(from, to, "offline"))
            } else {
                Ok(dec("2"))
            }
        }
    }

    #[test]
    fn test_table_lookup() {
        let t = table();
        assert_eq!(t.lookup(&code("JPY"), &code("HKD")), Some(dec("0.05")));
        assert_eq!(t.lookup(&code("HKD"), &code("USD")).unwrap().round_dp(4), dec("0.1282"));
        assert_eq!(t.lookup(&code("USD"), &code("JPY")), Some(dec("156")));
        assert_eq!(t.lookup(&code("EUR"), &code("HKD")), None);
        assert_eq!(t.lookup(&code("XXX"), &code("HKD")), None);
    }

    #[test]
    fn test_rates_file_provider() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("rates.json");
        let provider = RatesFileProvider::new(path.clone());

        let err = provider.rate(&code("JPY"), &code("HKD")).unwrap_err();
        assert!(matches!(err, LedgerError::RateUnavailable { .. }));

        std::fs::write(&path, r#"{"base": "HKD", "rates": {"JPY": "0.052"}}"#).unwrap();
        assert_eq!(provider.rate(&code("JPY"), &code("HKD")).unwrap(), dec("0.052"));

        std::fs::write(&path, "not json").unwrap();
        assert!(provider.rate(&code("JPY"), &code("HKD")).is_err());
    }

    #[test]
    fn test_cache_hits_within_ttl_and_refetches_after() {
        let cache = CachedRateProvider::new(
            Counting {
                calls: AtomicUsize::new(0),
                fail: false,
            },
            Duration::from_secs(3600),
        );
        let start = Instant::now();

        cache.rate_at(&code("JPY"), &code("HKD"), start).unwrap();
        cache
            .rate_at(&code("JPY"), &code("HKD"), start + Duration::from_secs(60))
            .unwrap();
        assert_eq!(cache.inner.calls.load(Ordering::SeqCst), 1);

        cache
            .rate_at(&code("JPY"), &code("HKD"), start + Duration::from_secs(3601))
            .unwrap();
        assert_eq!(cache.inner.calls.load(Ordering::SeqCst), 2);

        // different pair is a separate entry
        cache
            .rate_at(&code("USD"), &code("HKD"), start + Duration::from_secs(3601))
            .unwrap();
        assert_eq!(cache.inner.calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_cache_does_not_keep_failures() {
        let cache = CachedRateProvider::new(
            Counting {
                calls: AtomicUsize::new(0),
                fail: true,
            },
            Duration::from_secs(3600),
        );

        assert!(cache.rate(&code("JPY"), &code("HKD")).is_err());
        assert!(cache.rate(&code("JPY"), &code("HKD")).is_err());
        assert_eq!(cache.inner.calls.load(Ordering::SeqCst), 2);
    }
}
