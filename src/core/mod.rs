pub mod directory;
pub mod extract;
pub mod rates;
pub mod travel;

pub use crate::domain::model::{CurrencyCode, CurrencyInfo, RateQuote, RateTable, TravelResult};
pub use crate::domain::ports::{AnswerSource, CurrencyDirectory, RateSource};
pub use crate::utils::error::Result;
