use crate::adapters::{build_client, transport_error};
use crate::domain::model::{CurrencyCode, RateTable};
use crate::domain::ports::RateSource;
use crate::utils::error::{Result, TravelError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "http://data.fixer.io/api/latest";

/// Fixer-style `latest` endpoint: `{success, base, rates, timestamp}`.
pub struct FixerRateSource {
    client: Client,
    endpoint: String,
}

impl FixerRateSource {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl RateSource for FixerRateSource {
    async fn fetch_table(&self, access_key: &str) -> Result<RateTable> {
        tracing::debug!("Requesting rate table from {}", self.endpoint);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("access_key", access_key)])
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        tracing::debug!("Rate source response status: {}", status);

        if !status.is_success() {
            let payload = response.json::<Value>().await.ok();
            return Err(TravelError::SourceUnreachable {
                message: format!("HTTP {}", status),
                payload,
            });
        }

        let body: Value = response.json().await.map_err(|e| {
            TravelError::unreachable(format!("invalid response body: {}", e.without_url()))
        })?;

        parse_table(body)
    }
}

fn parse_table(body: Value) -> Result<RateTable> {
    if !body.get("success").and_then(Value::as_bool).unwrap_or(false) {
        let payload = body.get("error").cloned().unwrap_or(body);
        return Err(TravelError::SourceUnreachable {
            message: "provider returned an error".to_string(),
            payload: Some(payload),
        });
    }

    let Some(rates_obj) = body.get("rates").and_then(Value::as_object) else {
        return Err(TravelError::SourceUnreachable {
            message: "response has no rates table".to_string(),
            payload: Some(body),
        });
    };

    let rates: HashMap<String, f64> = rates_obj
        .iter()
        .filter_map(|(code, rate)| rate.as_f64().map(|r| (code.clone(), r)))
        .collect();

    let Some(base) = body
        .get("base")
        .and_then(Value::as_str)
        .and_then(|code| CurrencyCode::parse(code).ok())
    else {
        return Err(TravelError::SourceUnreachable {
            message: "response has no valid base currency".to_string(),
            payload: Some(body),
        });
    };

    let fetched_at = body
        .get("timestamp")
        .and_then(Value::as_i64)
        .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0))
        .unwrap_or_else(Utc::now);

    Ok(RateTable {
        base,
        rates,
        fetched_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn source(server: &MockServer) -> FixerRateSource {
        FixerRateSource::new(server.url("/api/latest"), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_table_success() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/latest")
                .query_param("access_key", "secret");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!({
                    "success": true,
                    "timestamp": 1_700_000_000,
                    "base": "EUR",
                    "date": "2023-11-14",
                    "rates": {"ILS": 4.05, "JPY": 161.2, "USD": 1.07}
                }));
        });

        let table = source(&server).fetch_table("secret").await.unwrap();

        api_mock.assert();
        assert_eq!(table.base.as_str(), "EUR");
        assert_eq!(table.rates.len(), 3);
        assert_eq!(table.rates["JPY"], 161.2);
        assert_eq!(table.fetched_at.timestamp(), 1_700_000_000);
    }

    #[tokio::test]
    async fn test_provider_error_attaches_payload() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/api/latest");
            then.status(200).json_body(json!({
                "success": false,
                "error": {"code": 101, "type": "invalid_access_key"}
            }));
        });

        let err = source(&server).fetch_table("wrong").await.unwrap_err();

        api_mock.assert();
        match err {
            TravelError::SourceUnreachable { payload, .. } => {
                assert_eq!(payload, Some(json!({"code": 101, "type": "invalid_access_key"})));
            }
            other => panic!("expected SourceUnreachable, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_http_failure_is_unreachable() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/api/latest");
            then.status(500);
        });

        let err = source(&server).fetch_table("secret").await.unwrap_err();

        api_mock.assert();
        assert!(matches!(err, TravelError::SourceUnreachable { ref message, .. } if message.contains("500")));
    }

    #[tokio::test]
    async fn test_timeout_is_unreachable() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/latest");
            then.status(200)
                .delay(Duration::from_millis(500))
                .json_body(json!({"success": true, "base": "EUR", "rates": {}}));
        });

        let source =
            FixerRateSource::new(server.url("/api/latest"), Duration::from_millis(50)).unwrap();
        let err = source.fetch_table("secret").await.unwrap_err();

        assert!(matches!(err, TravelError::SourceUnreachable { .. }));
        assert!(!err.to_string().contains("secret"));
    }

    #[test]
    fn test_parse_table_without_rates() {
        let err = parse_table(json!({"success": true, "base": "EUR"})).unwrap_err();
        assert!(matches!(err, TravelError::SourceUnreachable { .. }));
    }

    #[test]
    fn test_parse_table_without_base() {
        for body in [
            json!({"success": true, "rates": {"USD": 1.07}}),
            json!({"success": true, "base": "eu", "rates": {"USD": 1.07}}),
        ] {
            match parse_table(body.clone()).unwrap_err() {
                TravelError::SourceUnreachable { payload, .. } => assert_eq!(payload, Some(body)),
                other => panic!("expected SourceUnreachable, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_parse_table_skips_non_numeric_rates() {
        let table = parse_table(json!({
            "success": true,
            "base": "EUR",
            "rates": {"USD": 1.07, "BAD": "n/a"}
        }))
        .unwrap();

        assert_eq!(table.rates.len(), 1);
        assert!(table.rates.contains_key("USD"));
    }
}
