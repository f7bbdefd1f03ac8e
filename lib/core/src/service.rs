//! Recommendation service: the single entry point used by the API layer.
//!
//! The service owns one [`CorpusIndex`] for its whole lifetime. Encoder calls
//! run on tokio's blocking pool under a deadline; encoders that cannot be
//! called concurrently are funnelled through a single-permit semaphore.

use crate::{CatalogItem, CorpusIndex, Encoder, Error, RankOptions, Ranker, Result, ScoredResult};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

/// Runtime settings for a [`RecommendationService`]
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub default_top_n: usize,
    pub encode_timeout: Duration,
    pub build_timeout: Duration,
    /// Upper bound on simultaneous encoder calls. `None` means unbounded for
    /// concurrency-safe encoders and 1 otherwise.
    pub max_concurrent_encodes: Option<usize>,
    pub rank: RankOptions,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            default_top_n: 5,
            encode_timeout: Duration::from_secs(30),
            build_timeout: Duration::from_secs(300),
            max_concurrent_encodes: None,
            rank: RankOptions::default(),
        }
    }
}

pub struct RecommendationService {
    index: Arc<CorpusIndex>,
    encoder: Arc<dyn Encoder>,
    ranker: Ranker,
    encode_gate: Option<Arc<Semaphore>>,
    config: ServiceConfig,
}

impl RecommendationService {
    /// Build the corpus index from `items` and start serving.
    ///
    /// This is the only place the catalog gets encoded.
    pub async fn start(
        items: Vec<CatalogItem>,
        encoder: Arc<dyn Encoder>,
        config: ServiceConfig,
    ) -> Result<Self> {
        let encode_gate = encode_gate(encoder.as_ref(), &config)?;
        info!(
            "Building corpus index for {} items with {}",
            items.len(),
            encoder.model_name()
        );

        let build_encoder = encoder.clone();
        let index = run_encoder(encode_gate.as_ref(), config.build_timeout, move || {
            CorpusIndex::build(items, build_encoder.as_ref())
        })
        .await?;

        Ok(Self::assemble(Arc::new(index), encoder, encode_gate, config))
    }

    /// Serve from an index built elsewhere.
    pub fn with_index(
        index: Arc<CorpusIndex>,
        encoder: Arc<dyn Encoder>,
        config: ServiceConfig,
    ) -> Result<Self> {
        if encoder.dimension() != index.dim() {
            return Err(Error::InvalidDimension {
                expected: index.dim(),
                actual: encoder.dimension(),
            });
        }
        if encoder.model_name() != index.model_name() {
            warn!(
                "Encoder model {} differs from index model {}",
                encoder.model_name(),
                index.model_name()
            );
        }
        let encode_gate = encode_gate(encoder.as_ref(), &config)?;
        Ok(Self::assemble(index, encoder, encode_gate, config))
    }

    fn assemble(
        index: Arc<CorpusIndex>,
        encoder: Arc<dyn Encoder>,
        encode_gate: Option<Arc<Semaphore>>,
        config: ServiceConfig,
    ) -> Self {
        info!(
            "Recommendation service ready: {} items, model {}, encode timeout {:?}",
            index.len(),
            encoder.model_name(),
            config.encode_timeout
        );
        Self {
            index,
            encoder,
            ranker: Ranker::new(config.rank.clone()),
            encode_gate,
            config,
        }
    }

    /// Rank the catalog against a free-text query.
    pub async fn recommend(&self, query: &str, top_n: usize) -> Result<Vec<ScoredResult>> {
        if query.trim().is_empty() {
            return Err(Error::InvalidArgument("query must not be empty".to_string()));
        }
        if top_n == 0 {
            return Err(Error::InvalidArgument("top_n must be at least 1".to_string()));
        }

        let started = Instant::now();
        let encoder = self.encoder.clone();
        let text = query.to_string();
        let query_vector = run_encoder(
            self.encode_gate.as_ref(),
            self.config.encode_timeout,
            move || encoder.encode(&text),
        )
        .await
        .map_err(|e| {
            warn!("Query encoding failed: {}", e);
            e
        })?;

        let results = self.ranker.rank(&query_vector, &self.index, top_n)?;
        debug!(
            "Recommended {} of {} items in {:?}",
            results.len(),
            self.index.len(),
            started.elapsed()
        );
        Ok(results)
    }

    /// [`recommend`](Self::recommend) with the configured default result count
    pub async fn recommend_default(&self, query: &str) -> Result<Vec<ScoredResult>> {
        self.recommend(query, self.config.default_top_n).await
    }

    pub fn index(&self) -> &Arc<CorpusIndex> {
        &self.index
    }

    pub fn encoder_model(&self) -> &str {
        self.encoder.model_name()
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// End the service lifecycle, releasing the index and encoder.
    pub fn shutdown(self) {
        info!(
            "Recommendation service shutting down ({} items released)",
            self.index.len()
        );
    }
}

fn encode_gate(encoder: &dyn Encoder, config: &ServiceConfig) -> Result<Option<Arc<Semaphore>>> {
    let permits = match config.max_concurrent_encodes {
        Some(0) => {
            return Err(Error::InvalidArgument(
                "max_concurrent_encodes must be at least 1".to_string(),
            ))
        }
        Some(limit) if limit > Semaphore::MAX_PERMITS => {
            return Err(Error::InvalidArgument(format!(
                "max_concurrent_encodes must be at most {}",
                Semaphore::MAX_PERMITS
            )))
        }
        Some(limit) if !encoder.supports_concurrency() => Some(limit.min(1)),
        Some(limit) => Some(limit),
        None if !encoder.supports_concurrency() => Some(1),
        None => None,
    };
    Ok(permits.map(|n| Arc::new(Semaphore::new(n))))
}

/// Run a blocking encoder call on the blocking pool, bounded by `deadline`.
///
/// Waiting for a permit counts against the same deadline. A call that times out
/// keeps its permit until the encoder actually returns.
async fn run_encoder<T, F>(gate: Option<&Arc<Semaphore>>, deadline: Duration, f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    let call = async move {
        let permit = match gate {
            Some(semaphore) => Some(
                semaphore
                    .clone()
                    .acquire_owned()
                    .await
                    .map_err(|e| Error::Internal(format!("encoder queue closed: {}", e)))?,
            ),
            None => None,
        };

        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            f()
        })
        .await
        .map_err(|e| Error::Internal(format!("encoder task failed: {}", e)))?
    };

    tokio::time::timeout(deadline, call)
        .await
        .map_err(|_| Error::EncodingTimeout(deadline))?
}
