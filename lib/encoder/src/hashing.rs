//! Feature-hashing text encoder
//!
//! Maps text into a fixed-size vector without any model files: every word and
//! every character trigram is hashed to a signed bucket. Texts that share words
//! or word fragments ("numeric" / "numerical") end up with overlapping buckets,
//! which is enough lexical-semantic signal for catalog descriptions.

use ahash::RandomState;
use skillmatch_core::{Encoder, Error, Result, Vector};
use std::hash::BuildHasher;

/// Default vector length. Large enough that bucket collisions stay rare for short descriptions.
pub const DEFAULT_DIMENSION: usize = 2048;

pub const DEFAULT_WORD_WEIGHT: f32 = 2.0;
pub const DEFAULT_TRIGRAM_WEIGHT: f32 = 1.0;

// Fixed seeds keep vectors identical across runs of the same binary
const HASH_SEEDS: [u64; 4] = [
    0x5151_c0de_2024_0001,
    0x9e37_79b9_7f4a_7c15,
    0xc2b2_ae3d_27d4_eb4f,
    0x1656_67b1_9e37_79f9,
];

const WORD_FEATURE: u8 = 0;
const TRIGRAM_FEATURE: u8 = 1;

#[derive(Debug, Clone)]
pub struct HashingEncoder {
    dim: usize,
    word_weight: f32,
    trigram_weight: f32,
    model_name: String,
    hasher: RandomState,
}

impl HashingEncoder {
    /// Encoder with the default dimension and weights
    pub fn new() -> Self {
        Self::with_settings(DEFAULT_DIMENSION, DEFAULT_WORD_WEIGHT, DEFAULT_TRIGRAM_WEIGHT)
    }

    pub fn builder() -> HashingEncoderBuilder {
        HashingEncoderBuilder::default()
    }

    fn with_settings(dim: usize, word_weight: f32, trigram_weight: f32) -> Self {
        Self {
            dim,
            word_weight,
            trigram_weight,
            model_name: format!("hashing-w{}-t{}-d{}", word_weight, trigram_weight, dim),
            hasher: RandomState::with_seeds(HASH_SEEDS[0], HASH_SEEDS[1], HASH_SEEDS[2], HASH_SEEDS[3]),
        }
    }

    /// Embed one text. Text without any alphanumeric token maps to the zero vector.
    pub fn embed(&self, text: &str) -> Vector {
        let mut components = vec![0.0f32; self.dim];

        for token in tokenize(text) {
            self.add_feature(&mut components, WORD_FEATURE, &token, self.word_weight);
            for trigram in trigrams(&token) {
                self.add_feature(&mut components, TRIGRAM_FEATURE, &trigram, self.trigram_weight);
            }
        }

        let mut vector = Vector::new(components);
        vector.normalize();
        vector
    }

    fn add_feature(&self, components: &mut [f32], kind: u8, feature: &str, weight: f32) {
        let hash = self.hasher.hash_one((kind, feature));
        let bucket = (hash % self.dim as u64) as usize;
        // top bit picks the sign so colliding features tend to cancel out
        let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
        components[bucket] += sign * weight;
    }
}

impl Default for HashingEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Encoder for HashingEncoder {
    fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vector>> {
        Ok(texts.iter().map(|text| self.embed(text)).collect())
    }

    fn encode(&self, text: &str) -> Result<Vector> {
        Ok(self.embed(text))
    }

    fn dimension(&self) -> usize {
        self.dim
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

/// Builder for a [`HashingEncoder`] with custom settings
#[derive(Debug, Clone)]
pub struct HashingEncoderBuilder {
    dim: usize,
    word_weight: f32,
    trigram_weight: f32,
}

impl Default for HashingEncoderBuilder {
    fn default() -> Self {
        Self {
            dim: DEFAULT_DIMENSION,
            word_weight: DEFAULT_WORD_WEIGHT,
            trigram_weight: DEFAULT_TRIGRAM_WEIGHT,
        }
    }
}

impl HashingEncoderBuilder {
    pub fn dimension(mut self, dim: usize) -> Self {
        self.dim = dim;
        self
    }

    pub fn word_weight(mut self, weight: f32) -> Self {
        self.word_weight = weight;
        self
    }

    pub fn trigram_weight(mut self, weight: f32) -> Self {
        self.trigram_weight = weight;
        self
    }

    pub fn build(self) -> Result<HashingEncoder> {
        if self.dim == 0 {
            return Err(Error::InvalidArgument("encoder dimension must be at least 1".to_string()));
        }
        let weights_ok = |w: f32| w.is_finite() && w >= 0.0;
        if !weights_ok(self.word_weight) || !weights_ok(self.trigram_weight) {
            return Err(Error::InvalidArgument(
                "feature weights must be finite and non-negative".to_string(),
            ));
        }
        if self.word_weight == 0.0 && self.trigram_weight == 0.0 {
            return Err(Error::InvalidArgument("at least one feature weight must be positive".to_string()));
        }
        Ok(HashingEncoder::with_settings(self.dim, self.word_weight, self.trigram_weight))
    }
}

/// Lower-cased alphanumeric runs
fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(|token| token.to_lowercase())
}

/// Character trigrams of a token padded with two spaces on each side
fn trigrams(token: &str) -> Vec<String> {
    let padded: Vec<char> = format!("  {}  ", token).chars().collect();
    padded.windows(3).map(|w| w.iter().collect()).collect()
}
