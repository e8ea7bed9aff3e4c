use reqwest::Client;
use std::time::Duration;

use crate::errors::RecapError;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Builds the outbound HTTP client.
///
/// Only the connect phase is bounded; a completion stream may run for as
/// long as the provider keeps generating.
///
/// # Errors
///
/// Returns an error if the TLS backend cannot be initialised.
pub fn http_client() -> Result<Client, RecapError> {
    Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .build()
        .map_err(|e| RecapError::HttpError(format!("Failed to build HTTP client: {e}")))
}
