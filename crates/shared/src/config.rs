//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Money movement rules.
    #[serde(default)]
    pub ledger: LedgerSettings,
    /// Idempotency fast-path cache configuration.
    #[serde(default)]
    pub idempotency: IdempotencySettings,
    /// Currency exchange service configuration.
    #[serde(default)]
    pub exchange: ExchangeSettings,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// How long to wait for a pooled connection, in seconds.
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_acquire_timeout() -> u64 {
    5
}

/// Money movement rules, kept as raw strings until validated by the core.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerSettings {
    /// Smallest amount an operation may move, as a decimal string.
    #[serde(default = "default_min_monetary_unit")]
    pub min_monetary_unit: String,
    /// Maximum number of digits left of the decimal point.
    #[serde(default = "default_max_whole_digits")]
    pub max_whole_digits: u32,
    /// Maximum number of digits right of the decimal point.
    #[serde(default = "default_max_fractional_digits")]
    pub max_fractional_digits: u32,
    /// Currency balances are stored in.
    #[serde(default = "default_native_currency")]
    pub native_currency: String,
    /// Deadline applied to each operation, in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_min_monetary_unit() -> String {
    "0.01".to_string()
}

fn default_max_whole_digits() -> u32 {
    15
}

fn default_max_fractional_digits() -> u32 {
    2
}

fn default_native_currency() -> String {
    "RUB".to_string()
}

fn default_request_timeout() -> u64 {
    5
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            min_monetary_unit: default_min_monetary_unit(),
            max_whole_digits: default_max_whole_digits(),
            max_fractional_digits: default_max_fractional_digits(),
            native_currency: default_native_currency(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Idempotency fast-path cache configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct IdempotencySettings {
    /// How long a used token stays in the cache, in seconds.
    #[serde(default = "default_key_ttl")]
    pub key_ttl_secs: u64,
    /// Maximum number of tokens kept in the cache.
    #[serde(default = "default_cache_capacity")]
    pub max_capacity: u64,
}

fn default_key_ttl() -> u64 {
    30
}

fn default_cache_capacity() -> u64 {
    100_000
}

impl Default for IdempotencySettings {
    fn default() -> Self {
        Self {
            key_ttl_secs: default_key_ttl(),
            max_capacity: default_cache_capacity(),
        }
    }
}

/// Currency exchange service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ExchangeSettings {
    /// Endpoint returning the latest rates; `?base=<CODE>` is appended.
    #[serde(default = "default_exchange_url")]
    pub base_url: String,
    /// Timeout for a single rates request, in seconds.
    #[serde(default = "default_exchange_timeout")]
    pub request_timeout_secs: u64,
    /// How long fetched rates are reused, in seconds.
    #[serde(default = "default_rates_ttl")]
    pub rates_ttl_secs: u64,
}

fn default_exchange_url() -> String {
    "https://api.exchangeratesapi.io/latest".to_string()
}

fn default_exchange_timeout() -> u64 {
    5
}

fn default_rates_ttl() -> u64 {
    86_400 // 1 day
}

impl Default for ExchangeSettings {
    fn default() -> Self {
        Self {
            base_url: default_exchange_url(),
            request_timeout_secs: default_exchange_timeout(),
            rates_ttl_secs: default_rates_ttl(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("WALLET").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_from_environment() {
        temp_env::with_vars(
            [
                ("WALLET__DATABASE__URL", Some("postgres://localhost/wallet")),
                ("WALLET__LEDGER__MAX_WHOLE_DIGITS", Some("12")),
                ("WALLET__LEDGER__NATIVE_CURRENCY", Some("USD")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.database.url, "postgres://localhost/wallet");
                assert_eq!(config.database.max_connections, 10);
                assert_eq!(config.ledger.max_whole_digits, 12);
                assert_eq!(config.ledger.native_currency, "USD");
                assert_eq!(config.ledger.min_monetary_unit, "0.01");
                assert_eq!(config.idempotency.key_ttl_secs, 30);
                assert_eq!(config.exchange.rates_ttl_secs, 86_400);
            },
        );
    }

    #[test]
    fn test_missing_database_url_fails() {
        temp_env::with_vars_unset(["WALLET__DATABASE__URL"], || {
            assert!(AppConfig::load().is_err());
        });
    }

    #[test]
    fn test_ledger_defaults() {
        let settings = LedgerSettings::default();
        assert_eq!(settings.max_whole_digits, 15);
        assert_eq!(settings.max_fractional_digits, 2);
        assert_eq!(settings.native_currency, "RUB");
    }
}
