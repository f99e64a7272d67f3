use crate::domain::model::{CurrencyInfo, RateTable};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Country name to currency. Unknown countries are `TravelError::NotFound`.
#[async_trait]
pub trait CurrencyDirectory: Send + Sync {
    async fn lookup_currency(&self, country_name: &str) -> Result<CurrencyInfo>;
}

/// A provider publishing all rates against one base currency.
#[async_trait]
pub trait RateSource: Send + Sync {
    async fn fetch_table(&self, access_key: &str) -> Result<RateTable>;
}

/// Free-text question/answer backend, e.g. a language model.
#[async_trait]
pub trait AnswerSource: Send + Sync {
    async fn answer(&self, prompt: &str) -> Result<String>;
}
