use crate::core::rates::ExchangeRateResolver;
use crate::domain::model::TravelResult;
use crate::domain::ports::{CurrencyDirectory, RateSource};
use crate::utils::error::Result;
use std::sync::Arc;

/// Travel currency lookups from a fixed country of origin.
pub struct TravelInfoService<R: RateSource> {
    country_from: String,
    directory: Arc<dyn CurrencyDirectory>,
    resolver: Arc<ExchangeRateResolver<R>>,
}

impl<R: RateSource> TravelInfoService<R> {
    pub fn new(
        country_from: impl Into<String>,
        directory: Arc<dyn CurrencyDirectory>,
        resolver: Arc<ExchangeRateResolver<R>>,
    ) -> Self {
        Self {
            country_from: country_from.into(),
            directory,
            resolver,
        }
    }

    pub fn country_from(&self) -> &str {
        &self.country_from
    }

    /// Currency of `country_to` and the rate from the origin currency.
    ///
    /// Both countries are looked up on every call. Any failed lookup aborts
    /// the whole query.
    pub async fn get_info(&self, country_to: &str) -> Result<TravelResult> {
        tracing::debug!("Travel info {} -> {}", self.country_from, country_to);

        let origin = self.directory.lookup_currency(&self.country_from).await?;
        let destination = self.directory.lookup_currency(country_to).await?;

        let exchange_rate = self
            .resolver
            .get_exchange_rate(origin.code.as_str(), destination.code.as_str())
            .await?;

        Ok(TravelResult {
            country_from: self.country_from.clone(),
            country_to: country_to.to_string(),
            code_from: origin.code,
            code_to: destination.code,
            currency_name: destination.name,
            exchange_rate,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::directory::StaticDirectory;
    use crate::core::rates::ResolverConfig;
    use crate::domain::model::{CurrencyCode, CurrencyInfo, RateTable};
    use crate::utils::error::TravelError;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingSource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl RateSource for Arc<CountingSource> {
        async fn fetch_table(&self, _access_key: &str) -> Result<RateTable> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(RateTable {
                base: CurrencyCode::parse("EUR").unwrap(),
                rates: [("ILS".to_string(), 0.27), ("JPY".to_string(), 11.0)]
                    .into_iter()
                    .collect(),
                fetched_at: Utc::now(),
            })
        }
    }

    fn info(code: &str, name: &str) -> CurrencyInfo {
        CurrencyInfo {
            code: CurrencyCode::parse(code).unwrap(),
            name: name.to_string(),
        }
    }

    fn service(source: &Arc<CountingSource>) -> TravelInfoService<Arc<CountingSource>> {
        let directory = StaticDirectory::empty()
            .with_entry("Israel", info("ILS", "Shekel"))
            .with_entry("Japan", info("JPY", "Yen"))
            .with_entry("Atlantis", info("XAT", "Atlantean crown"));
        let resolver = ExchangeRateResolver::new(
            Arc::clone(source),
            ResolverConfig {
                access_key: Some("key".to_string()),
                ..ResolverConfig::default()
            },
        );

        TravelInfoService::new("Israel", Arc::new(directory), Arc::new(resolver))
    }

    #[tokio::test]
    async fn test_get_info_israel_to_japan() {
        let source = Arc::new(CountingSource::default());
        let result = service(&source).get_info("Japan").await.unwrap();

        assert_eq!(result.country_from, "Israel");
        assert_eq!(result.country_to, "Japan");
        assert_eq!(result.code_from.as_str(), "ILS");
        assert_eq!(result.code_to.as_str(), "JPY");
        assert_eq!(result.currency_name, "Yen");
        assert!((result.exchange_rate - 11.0 / 0.27).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_unknown_destination_names_country() {
        let source = Arc::new(CountingSource::default());
        let err = service(&source).get_info("UnknownCountry").await.unwrap_err();

        assert!(matches!(err, TravelError::NotFound { .. }));
        assert!(err.to_string().contains("UnknownCountry"));
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_rate_gap_yields_no_result() {
        let source = Arc::new(CountingSource::default());
        let err = service(&source).get_info("Atlantis").await.unwrap_err();

        assert!(matches!(err, TravelError::RateUnavailable { ref code } if code == "XAT"));
    }

    #[tokio::test]
    async fn test_domestic_trip_needs_no_rates() {
        let source = Arc::new(CountingSource::default());
        let result = service(&source).get_info("israel").await.unwrap();

        assert_eq!(result.exchange_rate, 1.0);
        assert_eq!(result.country_to, "israel");
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_repeated_queries_reuse_rate_table() {
        let source = Arc::new(CountingSource::default());
        let service = service(&source);

        service.get_info("Japan").await.unwrap();
        service.get_info("Japan").await.unwrap();

        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }
}
