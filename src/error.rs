// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

//! Error types for the rate pipeline and user input.

use thiserror::Error;

/// Reasons a rate refresh can fail.
///
/// The `Display` output is the short reason shown to the user; the
/// underlying detail (if any) is kept for logging.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport failure, timeout or non-success HTTP status on every endpoint.
    #[error("network error")]
    Network(String),

    #[error("empty response")]
    EmptyResponse,

    /// Body does not start with a JSON object delimiter.
    #[error("not JSON")]
    NotJson,

    #[error("parse error")]
    Parse(#[source] serde_json::Error),

    #[error("missing rates field")]
    MissingRatesField,
}

impl FetchError {
    /// True for responses that arrived but could not be understood.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::NotJson | Self::Parse(_))
    }

    /// Transport detail for network failures, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Network(detail) => Some(detail),
            _ => None,
        }
    }
}

/// Invalid user input, surfaced immediately and never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("please enter a valid number")]
    InvalidAmount(String),

    #[error("please select a valid currency")]
    UnselectedCurrency,

    #[error("unknown currency: {0}")]
    UnknownCurrency(String),

    #[error("unknown key: {0}")]
    UnknownKey(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_reasons() {
        assert_eq!(FetchError::Network("timed out".into()).to_string(), "network error");
        assert_eq!(FetchError::EmptyResponse.to_string(), "empty response");
        assert_eq!(FetchError::NotJson.to_string(), "not JSON");
        assert_eq!(FetchError::MissingRatesField.to_string(), "missing rates field");

        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(FetchError::Parse(parse).to_string(), "parse error");
    }

    #[test]
    fn test_malformed_grouping() {
        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(FetchError::NotJson.is_malformed());
        assert!(FetchError::Parse(parse).is_malformed());
        assert!(!FetchError::EmptyResponse.is_malformed());
        assert!(!FetchError::MissingRatesField.is_malformed());
        assert_eq!(FetchError::Network("dns".into()).detail(), Some("dns"));
    }
}
