// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use chrono::{DateTime, Local};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::FetchError;
use crate::models::Currency;

/// Built-in rates against USD, indexed like [`Currency::ALL`].
pub const DEFAULT_RATES: [f64; 8] = [
    1.0,   // USD
    0.85,  // EUR
    110.0, // JPY
    6.5,   // CNY
    4.2,   // MYR
    28.0,  // TWD
    1.35,  // SGD
    0.75,  // GBP
];

pub const OFFLINE_LABEL: &str = "Default rates (offline)";
pub const ONLINE_LABEL: &str = "Online rates";

/// Timestamp fields tried in order when labelling a remote payload.
const TIMESTAMP_FIELDS: [&str; 2] = ["time_last_update_utc", "date"];

/// The full set of rates in use, plus where they came from.
///
/// Every currency always has a usable rate; the table is only ever
/// replaced as a whole.
#[derive(Debug, Clone, PartialEq)]
pub struct RateTable {
    rates: [f64; 8],
    as_of: String,
    live: bool,
    fetched_at: Option<DateTime<Local>>,
}

impl Default for RateTable {
    fn default() -> Self {
        Self {
            rates: DEFAULT_RATES,
            as_of: OFFLINE_LABEL.to_string(),
            live: false,
            fetched_at: None,
        }
    }
}

impl RateTable {
    /// Build a table from remotely obtained rates.
    ///
    /// Unusable entries (zero, negative, NaN, infinite) fall back to the
    /// default rate for that currency, and the base currency stays at 1.0.
    pub fn live(rates: [f64; 8], as_of: impl Into<String>) -> Self {
        let mut sanitized = rates;
        for currency in Currency::ALL {
            let i = currency.index();
            if currency == Currency::BASE {
                sanitized[i] = 1.0;
            } else if !is_usable_rate(sanitized[i]) {
                sanitized[i] = default_rate(currency);
            }
        }

        Self {
            rates: sanitized,
            as_of: as_of.into(),
            live: true,
            fetched_at: Some(Local::now()),
        }
    }

    pub fn rate(&self, currency: Currency) -> f64 {
        self.rates[currency.index()]
    }

    pub fn rates(&self) -> [f64; 8] {
        self.rates
    }

    /// Provenance label, e.g. "Online rates Tue, 01 Oct 2024 00:02:31 +0000".
    pub fn as_of(&self) -> &str {
        &self.as_of
    }

    pub fn is_live(&self) -> bool {
        self.live
    }

    pub fn fetched_at(&self) -> Option<DateTime<Local>> {
        self.fetched_at
    }

    pub fn iter(&self) -> impl Iterator<Item = (Currency, f64)> + '_ {
        Currency::ALL.into_iter().map(move |c| (c, self.rate(c)))
    }
}

/// Default rate for a single currency, used when a remote payload omits it.
pub fn default_rate(currency: Currency) -> f64 {
    DEFAULT_RATES[currency.index()]
}

fn is_usable_rate(rate: f64) -> bool {
    rate.is_finite() && rate > 0.0
}

/// Turn a raw response body into a live rate table.
///
/// Currencies missing from the payload keep their default rate; only a
/// payload that cannot be understood at all is rejected.
pub fn parse_rates(body: &[u8]) -> Result<RateTable, FetchError> {
    if body.is_empty() {
        return Err(FetchError::EmptyResponse);
    }

    if body.first() != Some(&b'{') {
        return Err(FetchError::NotJson);
    }

    let root: Value = serde_json::from_slice(body).map_err(FetchError::Parse)?;
    let as_of = provenance_label(&root);

    let remote = root
        .get("rates")
        .and_then(Value::as_object)
        .ok_or(FetchError::MissingRatesField)?;

    let mut rates = DEFAULT_RATES;
    let mut found = 0;
    for currency in Currency::ALL {
        match remote.get(currency.code()).and_then(Value::as_f64) {
            Some(rate) if is_usable_rate(rate) => {
                rates[currency.index()] = rate;
                found += 1;
                debug!(currency = currency.code(), rate, "Parsed rate");
            }
            Some(rate) => {
                warn!(
                    currency = currency.code(),
                    rate,
                    fallback = default_rate(currency),
                    "Unusable rate in response, using default"
                );
            }
            None => {
                warn!(
                    currency = currency.code(),
                    fallback = default_rate(currency),
                    "Rate missing from response, using default"
                );
            }
        }
    }
    debug!(found, total = Currency::ALL.len(), "Parsed remote rates");

    Ok(RateTable::live(rates, as_of))
}

fn provenance_label(root: &Value) -> String {
    let stamp = TIMESTAMP_FIELDS
        .iter()
        .find_map(|field| match root.get(*field)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        });

    match stamp {
        Some(stamp) => format!("{} {}", ONLINE_LABEL, stamp),
        None => ONLINE_LABEL.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const FULL_PAYLOAD: &str = r#"{
        "result": "success",
        "time_last_update_utc": "Tue, 01 Oct 2024 00:02:31 +0000",
        "base_code": "USD",
        "rates": {
            "USD": 1, "EUR": 0.8968, "JPY": 143.65, "CNY": 7.0183,
            "MYR": 4.1234, "TWD": 31.62, "SGD": 1.2826, "GBP": 0.7476,
            "CHF": 0.8459
        }
    }"#;

    #[test]
    fn test_default_table() {
        let table = RateTable::default();
        assert!(!table.is_live());
        assert_eq!(table.as_of(), OFFLINE_LABEL);
        assert_eq!(table.rate(Currency::Usd), 1.0);
        assert_eq!(table.rate(Currency::Eur), 0.85);
        assert_eq!(table.rate(Currency::Gbp), 0.75);
        assert!(table.fetched_at().is_none());
        assert_eq!(table.iter().count(), 8);
    }

    #[test]
    fn test_parse_full_payload() {
        let table = parse_rates(FULL_PAYLOAD.as_bytes()).unwrap();
        assert!(table.is_live());
        assert!(table.fetched_at().is_some());
        assert_eq!(table.as_of(), "Online rates Tue, 01 Oct 2024 00:02:31 +0000");
        assert_relative_eq!(table.rate(Currency::Eur), 0.8968);
        assert_relative_eq!(table.rate(Currency::Jpy), 143.65);
        assert_relative_eq!(table.rate(Currency::Twd), 31.62);
    }

    #[test]
    fn test_missing_currency_uses_default() {
        let body = br#"{"date": "2024-10-01", "rates": {"USD": 1.0, "JPY": 150.0}}"#;
        let table = parse_rates(body).unwrap();

        assert!(table.is_live());
        assert_eq!(table.as_of(), "Online rates 2024-10-01");
        assert_eq!(table.rate(Currency::Eur), default_rate(Currency::Eur));
        assert_eq!(table.rate(Currency::Gbp), default_rate(Currency::Gbp));
        assert_eq!(table.rate(Currency::Jpy), 150.0);
    }

    #[test]
    fn test_zero_and_non_numeric_rates_use_default() {
        let body = br#"{"rates": {"EUR": 0, "JPY": "150", "CNY": -7.1, "SGD": 1.3}}"#;
        let table = parse_rates(body).unwrap();

        assert_eq!(table.rate(Currency::Eur), 0.85);
        assert_eq!(table.rate(Currency::Jpy), 110.0);
        assert_eq!(table.rate(Currency::Cny), 6.5);
        assert_eq!(table.rate(Currency::Sgd), 1.3);
    }

    #[test]
    fn test_timestamp_field_preference() {
        let both = br#"{"time_last_update_utc": "first", "date": "second", "rates": {}}"#;
        assert_eq!(parse_rates(both).unwrap().as_of(), "Online rates first");

        let neither = br#"{"rates": {}}"#;
        assert_eq!(parse_rates(neither).unwrap().as_of(), ONLINE_LABEL);

        let numeric = br#"{"date": 1727740951, "rates": {}}"#;
        assert_eq!(parse_rates(numeric).unwrap().as_of(), "Online rates 1727740951");

        let null_first = br#"{"time_last_update_utc": null, "date": "2024-10-01", "rates": {}}"#;
        assert_eq!(parse_rates(null_first).unwrap().as_of(), "Online rates 2024-10-01");

        let object_first = br#"{"time_last_update_utc": {}, "date": 20241001, "rates": {}}"#;
        assert_eq!(parse_rates(object_first).unwrap().as_of(), "Online rates 20241001");
    }

    #[test]
    fn test_rejected_bodies() {
        assert!(matches!(parse_rates(b""), Err(FetchError::EmptyResponse)));
        assert!(matches!(parse_rates(b"<html></html>"), Err(FetchError::NotJson)));
        assert!(matches!(parse_rates(b"[1, 2]"), Err(FetchError::NotJson)));
        assert!(matches!(parse_rates(b"   "), Err(FetchError::NotJson)));
        assert!(matches!(parse_rates(b" {\"rates\": {}}"), Err(FetchError::NotJson)));
        assert!(matches!(parse_rates(b"\n{\"rates\": {}}"), Err(FetchError::NotJson)));
        assert!(matches!(parse_rates(b"{\"rates\": "), Err(FetchError::Parse(_))));
        assert!(matches!(
            parse_rates(br#"{"result": "error"}"#),
            Err(FetchError::MissingRatesField)
        ));
        assert!(matches!(
            parse_rates(br#"{"rates": [1.0, 0.85]}"#),
            Err(FetchError::MissingRatesField)
        ));
    }

    #[test]
    fn test_base_currency_pinned() {
        let body = br#"{"rates": {"USD": 1.02}}"#;
        assert_eq!(parse_rates(body).unwrap().rate(Currency::Usd), 1.0);
    }
}
