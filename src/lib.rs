pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use app::build_service;
pub use config::TravelConfig;
pub use crate::core::directory::{ChainDirectory, StaticDirectory, TextDirectory};
pub use crate::core::extract::{extract_json, extract_json_keys};
pub use crate::core::rates::{ExchangeRateResolver, ResolverConfig};
pub use crate::core::travel::TravelInfoService;
pub use domain::model::{
    CurrencyCode, CurrencyInfo, ExtractedRecord, ExtractionSpec, RateQuote, RateTable,
    TravelResult,
};
pub use utils::error::{Result, TravelError};
