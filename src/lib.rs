// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

//! Four-function calculator and currency converter with background rate
//! refreshes.

pub mod api;
pub mod app;
pub mod calculator;
pub mod config;
pub mod error;
pub mod exchange_rates;
pub mod models;
pub mod refresh;
pub mod terminal;

pub use app::{AppState, Conversion, RateStatus, UiSink};
pub use calculator::{Calculator, Key, Operator};
pub use error::{FetchError, InputError};
pub use exchange_rates::{fetch_rates, FetchOutcome, FetchSettings};
pub use models::{convert_currency, Currency, RateTable};
pub use refresh::{refresh_channel, RateRefresher, RefreshHandle, RefreshInbox, RefreshReport};
