//! # SkillMatch Core
//!
//! Core library for the SkillMatch assessment recommender.
//!
//! This crate provides the retrieval-and-ranking engine:
//!
//! - [`Vector`] - Dense embedding vector with SIMD cosine similarity
//! - [`CatalogItem`] - An assessment product with a stable [`ItemId`]
//! - [`Encoder`] - Interface to the text embedding model
//! - [`CorpusIndex`] - Catalog items paired with their pre-computed embeddings
//! - [`Ranker`] - Exhaustive cosine ranking with deterministic tie-breaking
//! - [`RecommendationService`] - `recommend(query, top_n)` over a prebuilt index
//!
//! ## Example
//!
//! ```rust
//! use skillmatch_core::{CatalogItem, CorpusIndex, Vector, rank};
//!
//! let items = vec![
//!     CatalogItem::new(1u64, "Numerical Reasoning", "numbers"),
//!     CatalogItem::new(2u64, "Leadership Survey", "people"),
//! ];
//! let embeddings = vec![Vector::new(vec![1.0, 0.0]), Vector::new(vec![0.0, 1.0])];
//! let index = CorpusIndex::from_parts(items, embeddings, "fixture").unwrap();
//!
//! let results = rank(&Vector::new(vec![0.9, 0.1]), &index, 1).unwrap();
//! assert_eq!(results[0].item.name, "Numerical Reasoning");
//! ```

pub mod encoder;
pub mod error;
pub mod index;
pub mod item;
pub mod ranker;
pub mod service;
pub mod vector;

/// SIMD-optimized vector operations
///
/// Provides hardware-accelerated dot products:
/// - AVX2/FMA on x86_64
/// - NEON on ARM64/Apple Silicon
pub mod simd;

pub use encoder::Encoder;
pub use error::{Error, Result};
pub use index::CorpusIndex;
pub use item::{CatalogItem, ItemId};
pub use ranker::{rank, RankOptions, Ranker, ScoredResult};
pub use service::{RecommendationService, ServiceConfig};
pub use vector::Vector;
