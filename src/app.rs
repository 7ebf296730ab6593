// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

//! Application state owned by the UI context.

use std::fmt;
use tracing::{debug, info};

use crate::calculator::{Calculator, Key};
use crate::error::InputError;
use crate::models::{convert_currency, Currency, RateTable};
use crate::refresh::{RateRefresher, RefreshHandle, RefreshReport};

/// Callbacks the presentation layer implements to redraw.
pub trait UiSink {
    fn on_display_changed(&mut self, text: &str);
    fn on_conversion_result(&mut self, result: Result<&Conversion, &InputError>);
    fn on_rate_status_changed(&mut self, as_of: &str, status: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateStatus {
    Offline,
    Updating,
    Updated,
    UpdateFailed,
}

impl RateStatus {
    pub fn text(self) -> &'static str {
        match self {
            RateStatus::Offline => "Status: using offline rates",
            RateStatus::Updating => "Status: updating rates...",
            RateStatus::Updated => "Status: updated.",
            RateStatus::UpdateFailed => "Status: update failed, using previous/default rates.",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Conversion {
    pub amount: f64,
    pub from: Currency,
    pub to: Currency,
    pub result: f64,
}

impl fmt::Display for Conversion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4} {}", self.result, self.to)
    }
}

/// Everything the UI shows: calculator, rates and converter selection.
#[derive(Debug, Clone)]
pub struct AppState {
    calculator: Calculator,
    rates: RateTable,
    status: RateStatus,
    from: Option<Currency>,
    to: Option<Currency>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            calculator: Calculator::new(),
            rates: RateTable::default(),
            status: RateStatus::Offline,
            from: Some(Currency::Usd),
            to: Some(Currency::Eur),
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calculator(&self) -> &Calculator {
        &self.calculator
    }

    pub fn rates(&self) -> &RateTable {
        &self.rates
    }

    pub fn status(&self) -> RateStatus {
        self.status
    }

    pub fn selection(&self) -> (Option<Currency>, Option<Currency>) {
        (self.from, self.to)
    }

    /// Handle a calculator button and redraw the display.
    pub fn press(&mut self, label: &str, ui: &mut impl UiSink) -> Result<(), InputError> {
        let key = Key::from_label(label)?;
        self.calculator.press(key);
        ui.on_display_changed(&self.calculator.display());
        Ok(())
    }

    pub fn select_from(&mut self, currency: Option<Currency>) {
        self.from = currency;
    }

    pub fn select_to(&mut self, currency: Option<Currency>) {
        self.to = currency;
    }

    pub fn swap(&mut self) {
        std::mem::swap(&mut self.from, &mut self.to);
    }

    /// Convert a typed amount between the selected currencies.
    pub fn convert(&self, amount_text: &str) -> Result<Conversion, InputError> {
        let amount_text = amount_text.trim();
        let amount: f64 = amount_text
            .parse()
            .ok()
            .filter(|a: &f64| a.is_finite())
            .ok_or_else(|| InputError::InvalidAmount(amount_text.to_string()))?;

        let (from, to) = match (self.from, self.to) {
            (Some(from), Some(to)) => (from, to),
            _ => return Err(InputError::UnselectedCurrency),
        };

        Ok(Conversion {
            amount,
            from,
            to,
            result: convert_currency(amount, from, to, &self.rates),
        })
    }

    /// Run a conversion and report it to the UI.
    pub fn convert_and_show(&self, amount_text: &str, ui: &mut impl UiSink) {
        let result = self.convert(amount_text);
        ui.on_conversion_result(result.as_ref());
    }

    pub fn as_of_text(&self) -> String {
        if self.rates.is_live() {
            format!("Rates as of: {} (live)", self.rates.as_of())
        } else {
            format!("Rates as of: {}", self.rates.as_of())
        }
    }

    pub fn show_rate_status(&self, ui: &mut impl UiSink) {
        ui.on_rate_status_changed(&self.as_of_text(), self.status.text());
    }

    /// Kick off a background refresh and mark the rates as updating.
    pub fn begin_refresh(
        &mut self,
        refresher: &RateRefresher,
        ui: &mut impl UiSink,
    ) -> RefreshHandle {
        self.status = RateStatus::Updating;
        self.show_rate_status(ui);
        refresher.trigger_refresh()
    }

    /// Apply a delivered refresh. Success replaces the whole table; failure
    /// leaves the current one in force.
    pub fn apply_refresh(&mut self, report: RefreshReport, ui: &mut impl UiSink) {
        match report.outcome {
            Ok(table) => {
                info!(attempt = report.attempt, as_of = table.as_of(), "Applying refreshed rates");
                self.rates = table;
                self.status = RateStatus::Updated;
            }
            Err(e) => {
                debug!(attempt = report.attempt, reason = %e, "Keeping current rates");
                self.status = RateStatus::UpdateFailed;
            }
        }
        self.show_rate_status(ui);
    }
}
