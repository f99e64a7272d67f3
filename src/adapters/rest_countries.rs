use crate::adapters::{build_client, transport_error};
use crate::domain::model::{CurrencyCode, CurrencyInfo};
use crate::domain::ports::CurrencyDirectory;
use crate::utils::error::{Result, TravelError};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::time::Duration;
use url::Url;

pub const DEFAULT_ENDPOINT: &str = "https://restcountries.com/v3.1";

#[derive(Debug, Deserialize)]
struct CountryName {
    #[serde(default)]
    common: String,
    #[serde(default)]
    official: String,
}

#[derive(Debug, Deserialize)]
struct CountryEntry {
    name: Option<CountryName>,
    /// Keyed by ISO code, in the provider's order.
    currencies: Option<Map<String, Value>>,
}

impl CountryEntry {
    fn is_named(&self, wanted: &str) -> bool {
        self.name.as_ref().is_some_and(|n| {
            n.common.eq_ignore_ascii_case(wanted) || n.official.eq_ignore_ascii_case(wanted)
        })
    }
}

/// Directory backed by the REST Countries `name` endpoint.
pub struct RestCountriesDirectory {
    client: Client,
    endpoint: String,
}

impl RestCountriesDirectory {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            endpoint: endpoint.into(),
        })
    }

    fn lookup_url(&self, country: &str) -> Result<Url> {
        let mut url = Url::parse(&self.endpoint).map_err(|e| TravelError::InvalidConfigValueError {
            field: "directory.endpoint".to_string(),
            value: self.endpoint.clone(),
            reason: e.to_string(),
        })?;

        url.path_segments_mut()
            .map_err(|_| TravelError::InvalidConfigValueError {
                field: "directory.endpoint".to_string(),
                value: self.endpoint.clone(),
                reason: "URL cannot have path segments".to_string(),
            })?
            .pop_if_empty()
            .push("name")
            .push(country);

        Ok(url)
    }
}

#[async_trait]
impl CurrencyDirectory for RestCountriesDirectory {
    async fn lookup_currency(&self, country_name: &str) -> Result<CurrencyInfo> {
        let not_found = || TravelError::NotFound {
            country: country_name.to_string(),
        };

        let wanted = country_name.trim();
        if wanted.is_empty() {
            return Err(not_found());
        }

        let url = self.lookup_url(wanted)?;
        tracing::debug!("Looking up '{}' at {}", wanted, url);

        let response = self.client.get(url).send().await.map_err(transport_error)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(not_found());
        }
        if !status.is_success() {
            return Err(TravelError::SourceUnreachable {
                message: format!("HTTP {} from country directory", status),
                payload: response.json::<Value>().await.ok(),
            });
        }

        let entries: Vec<CountryEntry> = response.json().await.map_err(|e| {
            TravelError::unreachable(format!("invalid country directory body: {}", e))
        })?;

        // Name search is fuzzy; prefer an exact name hit over the first result.
        let entry = entries
            .iter()
            .find(|entry| entry.is_named(wanted))
            .or_else(|| entries.first())
            .ok_or_else(not_found)?;

        let Some((code, details)) = entry.currencies.as_ref().and_then(|c| c.iter().next()) else {
            tracing::warn!("No currency information for '{}'", wanted);
            return Err(not_found());
        };

        let code = CurrencyCode::parse(code)?;
        let name = details
            .get("name")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| code.to_string());

        Ok(CurrencyInfo { code, name })
    }
}
