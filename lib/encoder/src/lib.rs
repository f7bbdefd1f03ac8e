//! # SkillMatch Encoder
//!
//! Implementations of [`skillmatch_core::Encoder`].
//!
//! - [`HashingEncoder`] - offline, deterministic feature hashing of words and
//!   character trigrams. No model files, no network.
//! - [`OllamaEncoder`] - sentence embeddings served by a local Ollama instance
//!   (e.g. `all-minilm`, 384 dimensions).
//!
//! ## Example
//!
//! ```rust
//! use skillmatch_core::Encoder;
//! use skillmatch_encoder::HashingEncoder;
//!
//! let encoder = HashingEncoder::builder().dimension(256).build().unwrap();
//! let v = encoder.encode("numerical reasoning").unwrap();
//! assert_eq!(v.dim(), 256);
//! ```

pub mod hashing;
pub mod ollama;

pub use hashing::{HashingEncoder, HashingEncoderBuilder, DEFAULT_DIMENSION};
pub use ollama::{OllamaConfig, OllamaEncoder};
