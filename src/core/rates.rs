use crate::domain::model::{CurrencyCode, RateQuote, RateTable};
use crate::domain::ports::RateSource;
use crate::utils::error::{Result, TravelError};
use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};

pub const CREDENTIAL_NAME: &str = "FIXER_API_KEY";

#[derive(Debug, Clone)]
pub struct ResolverConfig {
    pub access_key: Option<String>,
    pub cache_ttl: Duration,
    /// Extra attempts after a `SourceUnreachable` failure. At most 1.
    pub retry_attempts: u32,
    pub retry_delay: Duration,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            access_key: None,
            cache_ttl: Duration::from_secs(3600),
            retry_attempts: 1,
            retry_delay: Duration::from_millis(500),
        }
    }
}

struct CachedTable {
    table: Arc<RateTable>,
    /// `None` when the TTL is too large to represent; such a table never expires.
    expires_at: Option<Instant>,
}

impl CachedTable {
    fn is_fresh(&self) -> bool {
        self.expires_at.map_or(true, |at| Instant::now() < at)
    }
}

/// Cross rates from a single-base provider, with one cached copy of the
/// provider's whole table.
///
/// Readers share the `RwLock`; a stale cache is refreshed under `refresh`.
/// Every finished refresh bumps `generation` and leaves its outcome in
/// `refresh`, so callers that queued behind it take that outcome, table or
/// error, instead of fetching again.
pub struct ExchangeRateResolver<R: RateSource> {
    source: R,
    config: ResolverConfig,
    cache: RwLock<Option<CachedTable>>,
    refresh: Mutex<Option<Result<Arc<RateTable>>>>,
    generation: AtomicU64,
}

impl<R: RateSource> ExchangeRateResolver<R> {
    pub fn new(source: R, config: ResolverConfig) -> Self {
        Self {
            source,
            config,
            cache: RwLock::new(None),
            refresh: Mutex::new(None),
            generation: AtomicU64::new(0),
        }
    }

    pub async fn get_exchange_rate(&self, code_from: &str, code_to: &str) -> Result<f64> {
        Ok(self.quote(code_from, code_to).await?.rate)
    }

    pub async fn quote(&self, code_from: &str, code_to: &str) -> Result<RateQuote> {
        let code_from = CurrencyCode::parse(code_from)?;
        let code_to = CurrencyCode::parse(code_to)?;

        if code_from == code_to {
            return Ok(RateQuote {
                code_from,
                code_to,
                rate: 1.0,
                fetched_at: Utc::now(),
            });
        }

        let access_key = self.access_key()?;
        let table = self.current_table(access_key).await?;
        let rate = table.cross_rate(&code_from, &code_to)?;

        tracing::debug!("Rate {}->{} = {} (base {})", code_from, code_to, rate, table.base);

        Ok(RateQuote {
            code_from,
            code_to,
            rate,
            fetched_at: table.fetched_at,
        })
    }

    /// Drops the cached table; the next lookup fetches again.
    pub async fn invalidate(&self) {
        *self.cache.write().await = None;
    }

    /// Base currency of the cached table, if one is still fresh.
    pub async fn cached_base(&self) -> Option<CurrencyCode> {
        self.fresh_table().await.map(|table| table.base.clone())
    }

    fn access_key(&self) -> Result<&str> {
        self.config
            .access_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| TravelError::MissingCredential {
                name: CREDENTIAL_NAME.to_string(),
            })
    }

    async fn fresh_table(&self) -> Option<Arc<RateTable>> {
        let cache = self.cache.read().await;
        cache
            .as_ref()
            .filter(|cached| cached.is_fresh())
            .map(|cached| Arc::clone(&cached.table))
    }

    async fn current_table(&self, access_key: &str) -> Result<Arc<RateTable>> {
        if let Some(table) = self.fresh_table().await {
            tracing::debug!("Rate table cache hit (base {})", table.base);
            return Ok(table);
        }

        let seen = self.generation.load(Ordering::SeqCst);
        let mut last = self.refresh.lock().await;

        // A refresh finished while we waited for the lock.
        if self.generation.load(Ordering::SeqCst) != seen {
            match last.as_ref() {
                Some(Ok(table)) => {
                    tracing::debug!("Rate table refreshed by a concurrent caller");
                    return Ok(Arc::clone(table));
                }
                Some(Err(e)) => {
                    tracing::debug!("Concurrent rate refresh failed: {}", e);
                    return Err(e.duplicate());
                }
                None => {}
            }
        }

        if let Some(table) = self.fresh_table().await {
            return Ok(table);
        }

        let outcome = self.fetch_with_retry(access_key).await.map(Arc::new);
        let result = match &outcome {
            Ok(table) => {
                tracing::info!(
                    "Fetched rate table: base {}, {} currencies",
                    table.base,
                    table.rates.len()
                );
                *self.cache.write().await = Some(CachedTable {
                    table: Arc::clone(table),
                    expires_at: Instant::now().checked_add(self.config.cache_ttl),
                });
                Ok(Arc::clone(table))
            }
            Err(e) => Err(e.duplicate()),
        };

        *last = Some(outcome);
        self.generation.fetch_add(1, Ordering::SeqCst);
        result
    }

    async fn fetch_with_retry(&self, access_key: &str) -> Result<RateTable> {
        let max_retries = self.config.retry_attempts.min(1);
        let mut attempt = 0;

        loop {
            match self.source.fetch_table(access_key).await {
                Ok(table) => return Ok(table),
                Err(e) if e.is_retryable() && attempt < max_retries => {
                    attempt += 1;
                    tracing::warn!(
                        "Rate source failed ({}), retrying in {:?}",
                        e,
                        self.config.retry_delay
                    );
                    tokio::time::sleep(self.config.retry_delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
