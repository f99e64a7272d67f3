// Adapters layer: concrete HTTP implementations of the domain ports.

pub mod fixer;
pub mod rest_countries;

use crate::utils::error::{Result, TravelError};
use std::time::Duration;

pub(crate) fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| TravelError::ConfigError {
            message: format!("Failed to build HTTP client: {}", e),
        })
}

/// The URL is stripped because it may carry the access key.
pub(crate) fn transport_error(e: reqwest::Error) -> TravelError {
    if e.is_timeout() {
        TravelError::unreachable("request timed out")
    } else {
        TravelError::unreachable(format!("request failed: {}", e.without_url()))
    }
}
