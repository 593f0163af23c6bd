use thiserror::Error;

/// Errors building an exchange client.
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// The configured endpoint is not a valid URL.
    #[error("invalid exchange endpoint {url}: {reason}")]
    InvalidUrl {
        /// Endpoint as configured.
        url: String,
        /// Parser message.
        reason: String,
    },

    /// The HTTP client could not be built.
    #[error("http client error: {0}")]
    Client(#[from] reqwest::Error),
}
