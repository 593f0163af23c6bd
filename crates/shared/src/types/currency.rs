//! Currency codes.

use serde::{Deserialize, Serialize};

/// ISO 4217 style currency code (e.g., "RUB", "USD").
///
/// Codes are stored upper-cased so that comparisons are case-insensitive.
/// The set of valid codes is owned by the exchange rate provider, not by
/// this type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Creates a currency code, trimming and upper-casing the input.
    #[must_use]
    pub fn new(code: &str) -> Self {
        Self(code.trim().to_uppercase())
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the code is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CurrencyCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_code_normalizes_case() {
        assert_eq!(CurrencyCode::new("usd"), CurrencyCode::new("USD"));
        assert_eq!(CurrencyCode::new(" eur ").as_str(), "EUR");
        assert!(CurrencyCode::new("").is_empty());
    }
}
