// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use std::fmt;
use std::str::FromStr;

use crate::error::InputError;
use crate::models::RateTable;

/// Supported currencies, in display order. The position in this list is the
/// currency's identity and the index into a [`RateTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Currency {
    Usd,
    Eur,
    Jpy,
    Cny,
    Myr,
    Twd,
    Sgd,
    Gbp,
}

impl Currency {
    pub const ALL: [Currency; 8] = [
        Currency::Usd,
        Currency::Eur,
        Currency::Jpy,
        Currency::Cny,
        Currency::Myr,
        Currency::Twd,
        Currency::Sgd,
        Currency::Gbp,
    ];

    /// The base currency all rates are expressed against.
    pub const BASE: Currency = Currency::Usd;

    pub fn code(self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Jpy => "JPY",
            Currency::Cny => "CNY",
            Currency::Myr => "MYR",
            Currency::Twd => "TWD",
            Currency::Sgd => "SGD",
            Currency::Gbp => "GBP",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Currency::Usd => "US Dollar",
            Currency::Eur => "Euro",
            Currency::Jpy => "Japanese Yen",
            Currency::Cny => "Chinese Yuan",
            Currency::Myr => "Malaysian Ringgit",
            Currency::Twd => "New Taiwan Dollar",
            Currency::Sgd => "Singapore Dollar",
            Currency::Gbp => "British Pound",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Look up a currency by its position, as a combo box selection would.
    pub fn from_index(index: usize) -> Option<Currency> {
        Self::ALL.get(index).copied()
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.code())
    }
}

impl FromStr for Currency {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.code().eq_ignore_ascii_case(code))
            .ok_or_else(|| InputError::UnknownCurrency(code.to_string()))
    }
}

/// Convert an amount from one currency to another using the rate table.
///
/// Both rates are relative to the base currency, so the cross rate is
/// `to / from`. Identical currencies return the amount untouched.
pub fn convert_currency(amount: f64, from: Currency, to: Currency, table: &RateTable) -> f64 {
    if from == to {
        return amount;
    }

    amount * (table.rate(to) / table.rate(from))
}
