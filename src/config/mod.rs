pub mod toml_config;

pub use toml_config::{DirectorySource, TravelConfig};

#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "travel-fx")]
#[command(about = "Destination currency and exchange rate for a trip")]
pub struct CliConfig {
    /// Destination countries
    #[arg(required = true)]
    pub destinations: Vec<String>,

    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Country of origin, overrides travel.country_from
    #[arg(long)]
    pub from: Option<String>,

    /// Currency directory backend, overrides directory.source
    #[arg(long, value_enum)]
    pub directory: Option<DirectorySource>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log as JSON lines")]
    pub json_logs: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// File configuration (or defaults) with command-line overrides applied.
    pub fn load(&self) -> crate::utils::error::Result<TravelConfig> {
        let mut config = match &self.config {
            Some(path) => TravelConfig::from_file(path)?,
            None => TravelConfig::default(),
        };

        if let Some(from) = &self.from {
            config.travel.country_from = from.clone();
        }
        if let Some(source) = self.directory {
            config.directory.source = source;
        }

        Ok(config)
    }
}
