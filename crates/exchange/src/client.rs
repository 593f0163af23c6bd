use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use reqwest::Url;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, error, info};
use wallet_core::currency::{ConversionError, CurrencyConverter, ExchangeRates};
use wallet_shared::config::ExchangeSettings;
use wallet_shared::types::CurrencyCode;

use crate::error::ExchangeError;

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

/// Converter backed by a remote rates endpoint.
///
/// The endpoint is queried as `GET <base_url>?base=<native>` and must answer
/// with `{"base": .., "date": .., "rates": {..}}`. Non-success answers carry
/// `{"error": ..}`.
#[derive(Clone)]
pub struct HttpCurrencyConverter {
    http: reqwest::Client,
    endpoint: Url,
    base: CurrencyCode,
    rates: Cache<CurrencyCode, Arc<ExchangeRates>>,
}

impl HttpCurrencyConverter {
    /// Creates a converter quoting against `base`.
    pub fn new(
        base_url: &str,
        base: CurrencyCode,
        request_timeout: Duration,
        rates_ttl: Duration,
    ) -> Result<Self, ExchangeError> {
        let mut endpoint = Url::parse(base_url).map_err(|e| ExchangeError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        endpoint.query_pairs_mut().append_pair("base", base.as_str());

        let http = reqwest::Client::builder().timeout(request_timeout).build()?;
        let rates = Cache::builder()
            .max_capacity(1)
            .time_to_live(rates_ttl)
            .build();

        Ok(Self {
            http,
            endpoint,
            base,
            rates,
        })
    }

    /// Creates a converter from the `exchange` config section.
    pub fn from_settings(
        settings: &ExchangeSettings,
        base: CurrencyCode,
    ) -> Result<Self, ExchangeError> {
        Self::new(
            &settings.base_url,
            base,
            Duration::from_secs(settings.request_timeout_secs),
            Duration::from_secs(settings.rates_ttl_secs),
        )
    }

    /// Full request URL, including the `base` parameter.
    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Drops the cached snapshot so the next conversion refetches.
    pub async fn invalidate(&self) {
        self.rates.invalidate(&self.base).await;
    }

    /// Current rates, fetched at most once per TTL.
    ///
    /// Concurrent callers on a cold cache share a single request.
    async fn current_rates(&self) -> Result<Arc<ExchangeRates>, ConversionError> {
        self.rates
            .try_get_with(self.base.clone(), self.fetch())
            .await
            .map_err(|e| (*e).clone())
    }

    async fn fetch(&self) -> Result<Arc<ExchangeRates>, ConversionError> {
        info!(endpoint = %self.endpoint, "Fetching exchange rates");

        let res = self
            .http
            .get(self.endpoint.clone())
            .send()
            .await
            .map_err(|e| self.unavailable("request failed", &e))?;
        let status = res.status();
        let body = res
            .bytes()
            .await
            .map_err(|e| self.unavailable("failed to read response body", &e))?;

        if !status.is_success() {
            let reason = serde_json::from_slice::<ErrorResponse>(&body)
                .map(|err| err.error)
                .unwrap_or_else(|_| format!("unexpected status {status}"));
            error!(
                endpoint = %self.endpoint,
                %status,
                %reason,
                "Exchange service returned an error"
            );
            return Err(ConversionError::Unavailable(reason));
        }

        let rates: ExchangeRates = serde_json::from_slice(&body)
            .map_err(|e| self.unavailable("malformed rates body", &e))?;
        if rates.base != self.base {
            error!(
                expected = %self.base,
                got = %rates.base,
                "Exchange service quoted another base"
            );
            return Err(ConversionError::Unavailable(format!(
                "rates quoted against {} instead of {}",
                rates.base, self.base
            )));
        }

        debug!(date = ?rates.date, currencies = rates.rates.len(), "Exchange rates updated");
        Ok(Arc::new(rates))
    }

    fn unavailable(&self, what: &str, err: &dyn std::error::Error) -> ConversionError {
        error!(endpoint = %self.endpoint, error = %err, "{what}");
        ConversionError::Unavailable(format!("{what}: {err}"))
    }
}

impl fmt::Debug for HttpCurrencyConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpCurrencyConverter")
            .field("endpoint", &self.endpoint.as_str())
            .field("base", &self.base)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl CurrencyConverter for HttpCurrencyConverter {
    async fn convert(
        &self,
        amount: Decimal,
        target: &CurrencyCode,
    ) -> Result<Decimal, ConversionError> {
        if *target == self.base {
            return Ok(amount);
        }
        self.current_rates().await?.convert(amount, target)
    }
}
