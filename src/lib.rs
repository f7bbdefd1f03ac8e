//! # SkillMatch
//!
//! Recommends assessment products from a catalog for a free-text job
//! description or query.
//!
//! Every catalog description is embedded once at start-up; each query is
//! embedded with the same encoder and the catalog is ranked by cosine
//! similarity, ties broken by catalog order.
//!
//! ## Quick Start
//!
//! ### As a Server
//!
//! ```bash
//! skillmatch --catalog data/products.csv --http-port 8080
//! curl -X POST localhost:8080/recommend -H 'content-type: application/json' \
//!      -d '{"query": "graduate analyst with strong numeracy", "top_n": 3}'
//! ```
//!
//! ### As a Library
//!
//! ```rust,no_run
//! use skillmatch::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn run() -> skillmatch::Result<()> {
//! let items = vec![
//!     CatalogItem::new(1u64, "Numerical Reasoning", "Measures numerical ability"),
//!     CatalogItem::new(2u64, "Leadership Potential", "Assesses leadership potential"),
//! ];
//! let service =
//!     RecommendationService::start(items, Arc::new(HashingEncoder::new()), ServiceConfig::default())
//!         .await?;
//!
//! for result in service.recommend("numeric aptitude test", 1).await? {
//!     println!("{} ({:.2})", result.item.name, result.score);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Crate Structure
//!
//! - [`skillmatch-core`](https://docs.rs/skillmatch-core) - Encoder trait, corpus index, ranker, service
//! - [`skillmatch-encoder`](https://docs.rs/skillmatch-encoder) - Feature-hashing and Ollama encoders
//! - [`skillmatch-catalog`](https://docs.rs/skillmatch-catalog) - CSV/JSON catalog loading, sample questions
//! - [`skillmatch-api`](https://docs.rs/skillmatch-api) - REST API

// Re-export core types
pub use skillmatch_core::{
    rank, CatalogItem, CorpusIndex, Encoder, Error, ItemId, RankOptions, Ranker,
    RecommendationService, Result, ScoredResult, ServiceConfig, Vector,
};

// Re-export encoders
pub use skillmatch_encoder::{HashingEncoder, OllamaConfig, OllamaEncoder};

// Re-export catalog
pub use skillmatch_catalog::{CatalogError, CatalogLoader, SampleQuestionBook, SampleView};

// Re-export API
pub use skillmatch_api::RestApi;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        CatalogItem, CorpusIndex, Encoder, Error, ItemId, RankOptions, Ranker,
        RecommendationService, Result, ScoredResult, ServiceConfig, Vector,
        HashingEncoder, OllamaConfig, OllamaEncoder,
        CatalogLoader, SampleQuestionBook, SampleView,
        RestApi,
    };
}

/// SIMD-optimized vector operations
pub mod simd {
    pub use skillmatch_core::simd::{dot_product_simd, norm_simd};
}
