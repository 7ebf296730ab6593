// SPDX-FileCopyrightText: 2025 Joost van der Laan
// SPDX-License-Identifier: AGPL-3.0-only

use std::time::Duration;
use tracing::{debug, info, warn};

use crate::api::RateSource;
use crate::config::Config;
use crate::error::FetchError;
use crate::models::{parse_rates, RateTable};

/// Result of one refresh attempt.
pub type FetchOutcome = Result<RateTable, FetchError>;

/// Where to fetch rates from and how long to wait for each endpoint.
#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub endpoints: Vec<String>,
    pub timeout: Duration,
}

impl From<&Config> for FetchSettings {
    fn from(config: &Config) -> Self {
        Self {
            endpoints: config.endpoints.clone(),
            timeout: config.timeout(),
        }
    }
}

/// Fetch, validate and parse the current exchange rates.
///
/// Endpoints are tried in order, moving on only when one cannot be reached.
/// A body that arrives but cannot be used ends the attempt.
pub async fn fetch_rates(source: &dyn RateSource, settings: &FetchSettings) -> FetchOutcome {
    let mut last_error = String::from("no endpoints configured");

    for url in &settings.endpoints {
        debug!(url = %url, "Fetching exchange rates");
        let body = match tokio::time::timeout(settings.timeout, source.fetch(url)).await {
            Ok(Ok(body)) => body,
            Ok(Err(e)) => {
                warn!(url = %url, error = %format!("{e:#}"), "Rate endpoint failed");
                last_error = format!("{url}: {e:#}");
                continue;
            }
            Err(_) => {
                warn!(url = %url, timeout = ?settings.timeout, "Rate endpoint timed out");
                last_error = format!("{url}: timed out after {:?}", settings.timeout);
                continue;
            }
        };

        debug!(url = %url, bytes = body.len(), "Received rate response");
        let table = parse_rates(&body)?;
        info!(url = %url, as_of = table.as_of(), "✅ Exchange rates fetched");
        return Ok(table);
    }

    Err(FetchError::Network(last_error))
}
