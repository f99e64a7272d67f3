use crate::utils::error::{Result, TravelError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Ordered, duplicate-free set of keys a JSON fragment must carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionSpec {
    properties: Vec<String>,
}

impl ExtractionSpec {
    /// Returns `None` for an empty list or one with duplicate names.
    pub fn new<I, S>(properties: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let properties: Vec<String> = properties.into_iter().map(Into::into).collect();
        if properties.is_empty() {
            return None;
        }

        let mut seen = HashSet::new();
        if !properties.iter().all(|p| seen.insert(p.as_str())) {
            return None;
        }

        Some(Self { properties })
    }

    pub fn properties(&self) -> &[String] {
        &self.properties
    }

    pub fn is_satisfied_by(&self, object: &Map<String, Value>) -> bool {
        self.properties.iter().all(|p| object.contains_key(p))
    }

    /// Superset match with no extra keys.
    pub fn matches_exactly(&self, object: &Map<String, Value>) -> bool {
        object.len() == self.properties.len() && self.is_satisfied_by(object)
    }
}

/// A JSON object recovered from free text. Read-only once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ExtractedRecord(Map<String, Value>);

impl ExtractedRecord {
    pub(crate) fn new(object: Map<String, Value>) -> Self {
        Self(object)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

/// Three uppercase ASCII letters, e.g. `ILS`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn parse(code: &str) -> Result<Self> {
        if code.len() == 3 && code.bytes().all(|b| b.is_ascii_uppercase()) {
            Ok(Self(code.to_string()))
        } else {
            Err(TravelError::InvalidCode {
                code: code.to_string(),
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = TravelError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyInfo {
    pub code: CurrencyCode,
    pub name: String,
}

/// A provider's whole published table, relative to `base`.
#[derive(Debug, Clone, PartialEq)]
pub struct RateTable {
    pub base: CurrencyCode,
    pub rates: HashMap<String, f64>,
    pub fetched_at: DateTime<Utc>,
}

impl RateTable {
    /// Rate of `code` against the table base. The base itself is 1.0 even
    /// when the provider leaves it out of `rates`.
    pub fn rate_for(&self, code: &CurrencyCode) -> Result<f64> {
        match self.rates.get(code.as_str()) {
            Some(rate) if rate.is_finite() && *rate > 0.0 => Ok(*rate),
            None if *code == self.base => Ok(1.0),
            _ => Err(TravelError::RateUnavailable {
                code: code.to_string(),
            }),
        }
    }

    pub fn cross_rate(&self, from: &CurrencyCode, to: &CurrencyCode) -> Result<f64> {
        let rate_from = self.rate_for(from)?;
        let rate_to = self.rate_for(to)?;
        Ok(rate_to / rate_from)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateQuote {
    pub code_from: CurrencyCode,
    pub code_to: CurrencyCode,
    pub rate: f64,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelResult {
    pub country_from: String,
    pub country_to: String,
    pub code_from: CurrencyCode,
    pub code_to: CurrencyCode,
    pub currency_name: String,
    pub exchange_rate: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table(base: &str, rates: &[(&str, f64)]) -> RateTable {
        RateTable {
            base: CurrencyCode::parse(base).unwrap(),
            rates: rates.iter().map(|(c, r)| (c.to_string(), *r)).collect(),
            fetched_at: Utc::now(),
        }
    }

    #[test]
    fn test_extraction_spec_rejects_empty_and_duplicates() {
        assert!(ExtractionSpec::new(Vec::<String>::new()).is_none());
        assert!(ExtractionSpec::new(["tool", "tool"]).is_none());

        let spec = ExtractionSpec::new(["tool", "arguments"]).unwrap();
        assert_eq!(spec.properties(), &["tool".to_string(), "arguments".to_string()]);
    }

    #[test]
    fn test_extraction_spec_matching() {
        let spec = ExtractionSpec::new(["a", "b"]).unwrap();
        let exact = json!({"a": 1, "b": 2});
        let wider = json!({"a": 1, "b": 2, "c": 3});
        let partial = json!({"a": 1});

        assert!(spec.matches_exactly(exact.as_object().unwrap()));
        assert!(spec.is_satisfied_by(wider.as_object().unwrap()));
        assert!(!spec.matches_exactly(wider.as_object().unwrap()));
        assert!(!spec.is_satisfied_by(partial.as_object().unwrap()));
    }

    #[test]
    fn test_currency_code_parse() {
        assert_eq!(CurrencyCode::parse("JPY").unwrap().as_str(), "JPY");
        for bad in ["", "jpy", "JP", "JPYY", "J1Y", "ÉUR"] {
            assert!(
                matches!(CurrencyCode::parse(bad), Err(TravelError::InvalidCode { .. })),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_currency_code_serde() {
        let code: CurrencyCode = serde_json::from_str("\"EUR\"").unwrap();
        assert_eq!(code.as_str(), "EUR");
        assert_eq!(serde_json::to_string(&code).unwrap(), "\"EUR\"");
        assert!(serde_json::from_str::<CurrencyCode>("\"eur\"").is_err());
    }

    #[test]
    fn test_cross_rate() {
        let t = table("EUR", &[("ILS", 0.27), ("JPY", 11.0)]);
        let ils = CurrencyCode::parse("ILS").unwrap();
        let jpy = CurrencyCode::parse("JPY").unwrap();

        let rate = t.cross_rate(&ils, &jpy).unwrap();
        assert!((rate - 11.0 / 0.27).abs() < 1e-9);
    }

    #[test]
    fn test_base_currency_defaults_to_one() {
        let t = table("EUR", &[("USD", 1.1)]);
        let eur = CurrencyCode::parse("EUR").unwrap();
        let usd = CurrencyCode::parse("USD").unwrap();

        assert_eq!(t.rate_for(&eur).unwrap(), 1.0);
        assert!((t.cross_rate(&eur, &usd).unwrap() - 1.1).abs() < 1e-12);
    }

    #[test]
    fn test_missing_or_bogus_rate_is_unavailable() {
        let t = table("EUR", &[("XAU", 0.0), ("XAG", f64::NAN)]);
        for code in ["GBP", "XAU", "XAG"] {
            let code = CurrencyCode::parse(code).unwrap();
            assert!(matches!(
                t.rate_for(&code),
                Err(TravelError::RateUnavailable { .. })
            ));
        }
    }

    #[test]
    fn test_travel_result_json_shape() {
        let result = TravelResult {
            country_from: "Israel".to_string(),
            country_to: "Japan".to_string(),
            code_from: CurrencyCode::parse("ILS").unwrap(),
            code_to: CurrencyCode::parse("JPY").unwrap(),
            currency_name: "Yen".to_string(),
            exchange_rate: 40.74,
        };

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(
            value,
            json!({
                "country_from": "Israel",
                "country_to": "Japan",
                "code_from": "ILS",
                "code_to": "JPY",
                "currency_name": "Yen",
                "exchange_rate": 40.74
            })
        );
    }
}
