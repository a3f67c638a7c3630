//! The lookup pipeline.
//!
//! validate → cache lookup → (fetch → decode → extract → cache write) → envelope
//!
//! Every stage is awaited in sequence. Failures are converted into an
//! [`Envelope`] at the top; nothing is retried.

use chrono::NaiveDate;
use ogtag_client::{Extractor, FetchClient, FetchConfig, OpenGraphExtractor};
use ogtag_core::{AppConfig, CacheDb, CacheKey, Envelope, Error, InvocationResponse, TagMap};

use crate::request;

/// Process-wide collaborators, built once at startup.
pub struct AppContext {
    config: AppConfig,
    cache: CacheDb,
    fetcher: FetchClient,
    extractor: Box<dyn Extractor>,
}

impl AppContext {
    pub fn new(config: AppConfig, cache: CacheDb, fetcher: FetchClient) -> Self {
        Self { config, cache, fetcher, extractor: Box::new(OpenGraphExtractor::new()) }
    }

    /// Open the cache at `config.db_path` and build the HTTP client.
    pub async fn from_config(config: AppConfig) -> Result<Self, Error> {
        let cache = CacheDb::open(&config.db_path).await?;
        let fetcher = FetchClient::new(FetchConfig::from(&config))?;
        Ok(Self::new(config, cache, fetcher))
    }

    #[cfg(test)]
    pub fn with_extractor(mut self, extractor: impl Extractor + 'static) -> Self {
        self.extractor = Box::new(extractor);
        self
    }

    /// Day used for cache keys of requests arriving now.
    pub fn today(&self) -> NaiveDate {
        self.config.today()
    }
}

/// Handle one invocation from its raw request body.
pub async fn handle(ctx: &AppContext, body: Option<&str>) -> InvocationResponse {
    handle_on(ctx, body, ctx.today()).await.into_response()
}

/// Handle one invocation as if it arrived on `day`.
pub async fn handle_on(ctx: &AppContext, body: Option<&str>, day: NaiveDate) -> Envelope {
    let result = match request::target_url(body) {
        Ok(url) => lookup(ctx, &url, day).await,
        Err(e) => Err(e),
    };

    if let Err(e) = &result {
        tracing::warn!(error = %e, code = e.error_code(), "lookup failed");
    }

    result.into()
}

/// Cached or freshly extracted tags for `url` on `day`.
pub async fn lookup(ctx: &AppContext, url: &str, day: NaiveDate) -> Result<TagMap, Error> {
    let key = CacheKey::new(day, url);

    if let Some(record) = ctx.cache.get_record(&key).await? {
        tracing::info!(key = %key, "cache hit");
        return Ok(record.tag);
    }

    tracing::info!(key = %key, "cache miss, fetching page");

    let page = ctx.fetcher.fetch_text(url).await?;
    let tags: TagMap = ctx.extractor.extract(&page.text)?.into();

    ctx.cache.put_record(&key, &tags).await?;
    tracing::debug!(key = %key, tags = tags.len(), "stored tags");

    Ok(tags)
}
