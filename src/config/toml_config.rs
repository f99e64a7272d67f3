use crate::adapters::{fixer, rest_countries};
use crate::core::directory::StaticDirectory;
use crate::core::rates::{ResolverConfig, CREDENTIAL_NAME};
use crate::domain::model::{CurrencyCode, CurrencyInfo};
use crate::utils::error::{Result, TravelError};
use crate::utils::validation::{
    validate_non_empty_string, validate_range, validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TravelConfig {
    pub travel: TravelSection,
    pub rates: RatesConfig,
    pub directory: DirectoryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TravelSection {
    pub country_from: String,
}

impl Default for TravelSection {
    fn default() -> Self {
        Self {
            country_from: "Israel".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RatesConfig {
    pub endpoint: String,
    pub access_key: Option<String>,
    pub timeout_seconds: u64,
    pub cache_ttl_seconds: u64,
    pub retry_attempts: u32,
    pub retry_delay_ms: u64,
}

impl Default for RatesConfig {
    fn default() -> Self {
        Self {
            endpoint: fixer::DEFAULT_ENDPOINT.to_string(),
            access_key: None,
            timeout_seconds: 10,
            cache_ttl_seconds: 3600,
            retry_attempts: 1,
            retry_delay_ms: 500,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum DirectorySource {
    /// Bundled table plus `[directory.entries]`.
    #[default]
    Static,
    /// REST Countries lookups.
    Rest,
    /// Static table first, REST Countries for the rest.
    Hybrid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryConfig {
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoryConfig {
    pub source: DirectorySource,
    pub endpoint: String,
    pub timeout_seconds: u64,
    pub entries: BTreeMap<String, EntryConfig>,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            source: DirectorySource::Static,
            endpoint: rest_countries::DEFAULT_ENDPOINT.to_string(),
            timeout_seconds: 10,
            entries: BTreeMap::new(),
        }
    }
}

impl TravelConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(TravelError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| TravelError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replace `${VAR}` with the variable's value. Unset variables are left
    /// as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| TravelError::ConfigError {
            message: format!("substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// Access key from the file, else `FIXER_API_KEY`. An unsubstituted
    /// `${...}` placeholder counts as unset.
    pub fn access_key(&self) -> Option<String> {
        let from_file = self
            .rates
            .access_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty() && !key.starts_with("${"))
            .map(str::to_string);

        from_file.or_else(|| {
            std::env::var(CREDENTIAL_NAME)
                .ok()
                .filter(|key| !key.trim().is_empty())
        })
    }

    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig {
            access_key: self.access_key(),
            cache_ttl: Duration::from_secs(self.rates.cache_ttl_seconds),
            retry_attempts: self.rates.retry_attempts,
            retry_delay: Duration::from_millis(self.rates.retry_delay_ms),
        }
    }

    pub fn rates_timeout(&self) -> Duration {
        Duration::from_secs(self.rates.timeout_seconds)
    }

    pub fn directory_timeout(&self) -> Duration {
        Duration::from_secs(self.directory.timeout_seconds)
    }

    /// Bundled table with the configured entries layered on top.
    pub fn static_directory(&self) -> Result<StaticDirectory> {
        let mut directory = StaticDirectory::bundled();
        for (country, entry) in &self.directory.entries {
            directory.insert(
                country,
                CurrencyInfo {
                    code: CurrencyCode::parse(&entry.code)?,
                    name: entry.name.clone(),
                },
            );
        }
        Ok(directory)
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_non_empty_string("travel.country_from", &self.travel.country_from)?;

        validate_url("rates.endpoint", &self.rates.endpoint)?;
        validate_range("rates.timeout_seconds", self.rates.timeout_seconds, 1, 300)?;
        validate_range("rates.cache_ttl_seconds", self.rates.cache_ttl_seconds, 0, 86_400)?;
        validate_range("rates.retry_attempts", self.rates.retry_attempts, 0, 1)?;
        validate_range("rates.retry_delay_ms", self.rates.retry_delay_ms, 0, 60_000)?;

        if self.directory.source != DirectorySource::Static {
            validate_url("directory.endpoint", &self.directory.endpoint)?;
            validate_range("directory.timeout_seconds", self.directory.timeout_seconds, 1, 300)?;
        }

        for (country, entry) in &self.directory.entries {
            validate_non_empty_string("directory.entries", country)?;
            validate_non_empty_string(&format!("directory.entries.{}.name", country), &entry.name)?;
            CurrencyCode::parse(&entry.code).map_err(|_| TravelError::InvalidConfigValueError {
                field: format!("directory.entries.{}.code", country),
                value: entry.code.clone(),
                reason: "must be three uppercase letters".to_string(),
            })?;
        }

        Ok(())
    }
}

impl Validate for TravelConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
