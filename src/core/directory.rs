use crate::core::extract::extract_json_keys;
use crate::domain::model::{CurrencyCode, CurrencyInfo};
use crate::domain::ports::{AnswerSource, CurrencyDirectory};
use crate::utils::error::{Result, TravelError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// (country, ISO code, display name)
const BUNDLED_CURRENCIES: &[(&str, &str, &str)] = &[
    ("Argentina", "ARS", "Argentine peso"),
    ("Australia", "AUD", "Australian dollar"),
    ("Austria", "EUR", "Euro"),
    ("Belgium", "EUR", "Euro"),
    ("Brazil", "BRL", "Brazilian real"),
    ("Bulgaria", "BGN", "Bulgarian lev"),
    ("Canada", "CAD", "Canadian dollar"),
    ("Chile", "CLP", "Chilean peso"),
    ("China", "CNY", "Chinese yuan"),
    ("Colombia", "COP", "Colombian peso"),
    ("Czechia", "CZK", "Czech koruna"),
    ("Denmark", "DKK", "Danish krone"),
    ("Egypt", "EGP", "Egyptian pound"),
    ("Finland", "EUR", "Euro"),
    ("France", "EUR", "Euro"),
    ("Georgia", "GEL", "Georgian lari"),
    ("Germany", "EUR", "Euro"),
    ("Greece", "EUR", "Euro"),
    ("Hungary", "HUF", "Hungarian forint"),
    ("Iceland", "ISK", "Icelandic króna"),
    ("India", "INR", "Indian rupee"),
    ("Indonesia", "IDR", "Indonesian rupiah"),
    ("Ireland", "EUR", "Euro"),
    ("Israel", "ILS", "Israeli new shekel"),
    ("Italy", "EUR", "Euro"),
    ("Japan", "JPY", "Japanese yen"),
    ("Jordan", "JOD", "Jordanian dinar"),
    ("Mexico", "MXN", "Mexican peso"),
    ("Morocco", "MAD", "Moroccan dirham"),
    ("Netherlands", "EUR", "Euro"),
    ("New Zealand", "NZD", "New Zealand dollar"),
    ("Norway", "NOK", "Norwegian krone"),
    ("Peru", "PEN", "Peruvian sol"),
    ("Philippines", "PHP", "Philippine peso"),
    ("Poland", "PLN", "Polish złoty"),
    ("Portugal", "EUR", "Euro"),
    ("Romania", "RON", "Romanian leu"),
    ("Singapore", "SGD", "Singapore dollar"),
    ("South Africa", "ZAR", "South African rand"),
    ("South Korea", "KRW", "South Korean won"),
    ("Spain", "EUR", "Euro"),
    ("Sweden", "SEK", "Swedish krona"),
    ("Switzerland", "CHF", "Swiss franc"),
    ("Thailand", "THB", "Thai baht"),
    ("Turkey", "TRY", "Turkish lira"),
    ("United Arab Emirates", "AED", "United Arab Emirates dirham"),
    ("United Kingdom", "GBP", "British pound"),
    ("United States", "USD", "United States dollar"),
    ("Vietnam", "VND", "Vietnamese đồng"),
];

fn normalize_country(name: &str) -> String {
    name.trim().to_lowercase()
}

/// In-memory table keyed by lowercased, trimmed country name.
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    entries: HashMap<String, CurrencyInfo>,
}

impl StaticDirectory {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Directory preloaded with the bundled country table.
    pub fn bundled() -> Self {
        let mut directory = Self::empty();
        for (country, code, name) in BUNDLED_CURRENCIES {
            match CurrencyCode::parse(code) {
                Ok(code) => directory.insert(
                    country,
                    CurrencyInfo {
                        code,
                        name: name.to_string(),
                    },
                ),
                Err(e) => {
                    debug_assert!(false, "bundled row for {} is invalid: {}", country, e);
                    tracing::error!("Skipping bundled row for {}: {}", country, e);
                }
            }
        }
        directory
    }

    /// Adds or replaces the entry for `country`.
    pub fn insert(&mut self, country: &str, info: CurrencyInfo) {
        self.entries.insert(normalize_country(country), info);
    }

    pub fn with_entry(mut self, country: &str, info: CurrencyInfo) -> Self {
        self.insert(country, info);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl CurrencyDirectory for StaticDirectory {
    async fn lookup_currency(&self, country_name: &str) -> Result<CurrencyInfo> {
        self.entries
            .get(&normalize_country(country_name))
            .cloned()
            .ok_or_else(|| TravelError::NotFound {
                country: country_name.to_string(),
            })
    }
}

/// Asks an [`AnswerSource`] for the currency and pulls the JSON answer out
/// of whatever text comes back.
pub struct TextDirectory<A: AnswerSource> {
    source: A,
}

impl<A: AnswerSource> TextDirectory<A> {
    pub const REQUIRED_PROPERTIES: [&'static str; 2] = ["country", "currency_code"];

    pub fn new(source: A) -> Self {
        Self { source }
    }

    pub fn prompt_for(country_name: &str) -> String {
        format!("currency of {}", country_name.trim())
    }
}

#[async_trait]
impl<A: AnswerSource> CurrencyDirectory for TextDirectory<A> {
    async fn lookup_currency(&self, country_name: &str) -> Result<CurrencyInfo> {
        let answer = self.source.answer(&Self::prompt_for(country_name)).await?;

        let Some(record) = extract_json_keys(&answer, &Self::REQUIRED_PROPERTIES) else {
            tracing::debug!("No currency JSON in answer for '{}'", country_name.trim());
            return Err(TravelError::NotFound {
                country: country_name.to_string(),
            });
        };

        let raw_code = record
            .get_str("currency_code")
            .ok_or_else(|| TravelError::InvalidCode {
                code: record
                    .get("currency_code")
                    .map(|v| v.to_string())
                    .unwrap_or_default(),
            })?;
        let code = CurrencyCode::parse(raw_code)?;

        let name = match record.get_str("currency_name") {
            Some(name) if !name.trim().is_empty() => name.to_string(),
            _ => {
                tracing::warn!(
                    "Answer for '{}' has no currency_name, using code {}",
                    country_name.trim(),
                    code
                );
                code.to_string()
            }
        };

        Ok(CurrencyInfo { code, name })
    }
}

/// Tries each directory in order. Only `NotFound` moves on to the next one;
/// any other failure is returned as is.
#[derive(Clone, Default)]
pub struct ChainDirectory {
    directories: Vec<Arc<dyn CurrencyDirectory>>,
}

impl ChainDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, directory: Arc<dyn CurrencyDirectory>) -> Self {
        self.directories.push(directory);
        self
    }

    pub fn len(&self) -> usize {
        self.directories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directories.is_empty()
    }
}

#[async_trait]
impl CurrencyDirectory for ChainDirectory {
    async fn lookup_currency(&self, country_name: &str) -> Result<CurrencyInfo> {
        for (index, directory) in self.directories.iter().enumerate() {
            match directory.lookup_currency(country_name).await {
                Err(TravelError::NotFound { .. }) => {
                    tracing::debug!(
                        "Directory #{} has no entry for '{}'",
                        index,
                        country_name.trim()
                    );
                }
                other => return other,
            }
        }

        Err(TravelError::NotFound {
            country: country_name.to_string(),
        })
    }
}
