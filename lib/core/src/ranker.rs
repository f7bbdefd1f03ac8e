//! Exhaustive cosine ranking over a [`CorpusIndex`].
//!
//! Every query is compared against every item; catalogs in this domain hold
//! hundreds to low thousands of products, so a linear scan is both exact and
//! fast. An approximate index would slot in behind [`Ranker::rank`] if catalogs
//! ever outgrow that.

use crate::{CatalogItem, CorpusIndex, Error, Result, Vector};
use rayon::prelude::*;
use serde::Serialize;

/// Scores closer than this are treated as equal and ordered by catalog position
pub const DEFAULT_TIE_TOLERANCE: f64 = 1e-9;

/// Catalogs at least this large are scored on the rayon pool
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 4096;

/// A catalog item with its similarity to the query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredResult {
    pub item: CatalogItem,
    /// Cosine similarity in `[-1, 1]`
    pub score: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankOptions {
    pub tie_tolerance: f64,
    /// Skip results whose embedding has at least this cosine similarity with an
    /// already selected result. `None` keeps near-duplicates.
    pub dedup_threshold: Option<f32>,
    pub parallel_threshold: usize,
}

impl Default for RankOptions {
    fn default() -> Self {
        Self {
            tie_tolerance: DEFAULT_TIE_TOLERANCE,
            dedup_threshold: None,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Ranker {
    options: RankOptions,
}

/// Rank with default options
pub fn rank(query: &Vector, index: &CorpusIndex, top_n: usize) -> Result<Vec<ScoredResult>> {
    Ranker::default().rank(query, index, top_n)
}

impl Ranker {
    pub fn new(options: RankOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RankOptions {
        &self.options
    }

    /// Top `top_n` items by descending cosine similarity.
    ///
    /// Returns `min(top_n, index.len())` results (fewer only when dedup is on).
    /// Equal scores keep catalog order, so identical queries always produce
    /// identical output. Scores are non-increasing up to `tie_tolerance`.
    pub fn rank(&self, query: &Vector, index: &CorpusIndex, top_n: usize) -> Result<Vec<ScoredResult>> {
        if top_n == 0 {
            return Err(Error::InvalidArgument("top_n must be at least 1".to_string()));
        }
        if query.dim() != index.dim() {
            return Err(Error::InvalidDimension {
                expected: index.dim(),
                actual: query.dim(),
            });
        }

        let mut scored = self.score_all(query, index);

        // (score desc, position asc) is a total order, so the sort is deterministic
        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        self.order_near_ties(&mut scored);

        let selected = match self.options.dedup_threshold {
            Some(threshold) => select_distinct(&scored, index, top_n, threshold),
            None => scored.into_iter().take(top_n).collect(),
        };

        Ok(selected
            .into_iter()
            .map(|(position, score)| ScoredResult {
                item: index.items()[position].clone(),
                score,
            })
            .collect())
    }

    fn score_all(&self, query: &Vector, index: &CorpusIndex) -> Vec<(usize, f32)> {
        let embeddings = index.embeddings();
        if embeddings.len() >= self.options.parallel_threshold {
            embeddings
                .par_iter()
                .enumerate()
                .map(|(position, embedding)| (position, query.cosine_similarity(embedding)))
                .collect()
        } else {
            embeddings
                .iter()
                .enumerate()
                .map(|(position, embedding)| (position, query.cosine_similarity(embedding)))
                .collect()
        }
    }

    /// Scores within `tie_tolerance` of the highest score in their run count as
    /// tied and are put back in catalog order. Each item keeps its own score.
    fn order_near_ties(&self, scored: &mut [(usize, f32)]) {
        let tolerance = self.options.tie_tolerance;
        if tolerance <= 0.0 {
            return;
        }

        let mut start = 0;
        while start < scored.len() {
            let anchor = f64::from(scored[start].1);
            let mut end = start + 1;
            while end < scored.len() && anchor - f64::from(scored[end].1) < tolerance {
                end += 1;
            }
            if end - start > 1 {
                scored[start..end].sort_by_key(|(position, _)| *position);
            }
            start = end;
        }
    }
}

fn select_distinct(
    scored: &[(usize, f32)],
    index: &CorpusIndex,
    top_n: usize,
    threshold: f32,
) -> Vec<(usize, f32)> {
    let embeddings = index.embeddings();
    let mut selected: Vec<(usize, f32)> = Vec::with_capacity(top_n.min(scored.len()));

    for &(position, score) in scored {
        if selected.len() == top_n {
            break;
        }
        let candidate = &embeddings[position];
        let near_duplicate = selected
            .iter()
            .any(|(kept, _)| embeddings[*kept].cosine_similarity(candidate) >= threshold);
        if !near_duplicate {
            selected.push((position, score));
        }
    }

    selected
}
