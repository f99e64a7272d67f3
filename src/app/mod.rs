use crate::adapters::fixer::FixerRateSource;
use crate::adapters::rest_countries::RestCountriesDirectory;
use crate::config::{DirectorySource, TravelConfig};
use crate::core::directory::ChainDirectory;
use crate::core::rates::ExchangeRateResolver;
use crate::core::travel::TravelInfoService;
use crate::domain::ports::CurrencyDirectory;
use crate::utils::error::Result;
use std::sync::Arc;

pub fn build_directory(config: &TravelConfig) -> Result<Arc<dyn CurrencyDirectory>> {
    let directory: Arc<dyn CurrencyDirectory> = match config.directory.source {
        DirectorySource::Static => Arc::new(config.static_directory()?),
        DirectorySource::Rest => Arc::new(RestCountriesDirectory::new(
            config.directory.endpoint.clone(),
            config.directory_timeout(),
        )?),
        DirectorySource::Hybrid => Arc::new(
            ChainDirectory::new()
                .with(Arc::new(config.static_directory()?))
                .with(Arc::new(RestCountriesDirectory::new(
                    config.directory.endpoint.clone(),
                    config.directory_timeout(),
                )?)),
        ),
    };

    tracing::debug!("Currency directory: {:?}", config.directory.source);
    Ok(directory)
}

pub fn build_resolver(config: &TravelConfig) -> Result<ExchangeRateResolver<FixerRateSource>> {
    let source = FixerRateSource::new(config.rates.endpoint.clone(), config.rates_timeout())?;
    let resolver_config = config.resolver_config();

    if resolver_config.access_key.is_none() {
        tracing::warn!("No rates access key configured; cross-currency lookups will fail");
    }

    Ok(ExchangeRateResolver::new(source, resolver_config))
}

/// Full service from configuration. The resolver, and with it the rate
/// cache, is created here once and shared by every query.
pub fn build_service(config: &TravelConfig) -> Result<TravelInfoService<FixerRateSource>> {
    Ok(TravelInfoService::new(
        config.travel.country_from.clone(),
        build_directory(config)?,
        Arc::new(build_resolver(config)?),
    ))
}
