use crate::{CatalogItem, Encoder, Error, Result, Vector};
use ahash::AHashSet;
use std::time::Instant;
use tracing::{debug, info};

/// Immutable snapshot of a catalog and its embeddings.
///
/// `items[i]` is described by `embeddings[i]`. The index is built once per catalog
/// load and then shared read-only (behind an `Arc`) by every query.
#[derive(Debug, Clone)]
pub struct CorpusIndex {
    items: Vec<CatalogItem>,
    embeddings: Vec<Vector>,
    dim: usize,
    model_name: String,
}

impl CorpusIndex {
    /// Embed every item description with a single batched encoder call.
    pub fn build(items: Vec<CatalogItem>, encoder: &dyn Encoder) -> Result<Self> {
        if items.is_empty() {
            return Err(Error::EmptyCatalog);
        }
        check_unique_ids(&items)?;

        let started = Instant::now();
        let descriptions: Vec<String> = items.iter().map(|item| item.description.clone()).collect();
        debug!(
            "Encoding {} catalog descriptions with {}",
            descriptions.len(),
            encoder.model_name()
        );
        let embeddings = encoder.encode_batch(&descriptions)?;

        if embeddings.len() != items.len() {
            return Err(Error::Encoding(format!(
                "encoder returned {} vectors for {} catalog items",
                embeddings.len(),
                items.len()
            )));
        }

        let index = Self::assemble(items, embeddings, encoder.dimension(), encoder.model_name())?;
        info!(
            "Corpus index built: {} items, dim {}, model {}, {:?}",
            index.len(),
            index.dim,
            index.model_name,
            started.elapsed()
        );
        Ok(index)
    }

    /// Assemble an index from embeddings computed elsewhere (fixtures, host-side caches).
    pub fn from_parts(
        items: Vec<CatalogItem>,
        embeddings: Vec<Vector>,
        model_name: impl Into<String>,
    ) -> Result<Self> {
        if items.is_empty() {
            return Err(Error::EmptyCatalog);
        }
        check_unique_ids(&items)?;
        if embeddings.len() != items.len() {
            return Err(Error::InvalidArgument(format!(
                "{} embeddings supplied for {} items",
                embeddings.len(),
                items.len()
            )));
        }
        let dim = embeddings[0].dim();
        Self::assemble(items, embeddings, dim, &model_name.into())
    }

    fn assemble(
        items: Vec<CatalogItem>,
        embeddings: Vec<Vector>,
        dim: usize,
        model_name: &str,
    ) -> Result<Self> {
        if let Some(bad) = embeddings.iter().find(|v| v.dim() != dim) {
            return Err(Error::InvalidDimension {
                expected: dim,
                actual: bad.dim(),
            });
        }

        Ok(Self {
            items,
            embeddings,
            dim,
            model_name: model_name.to_string(),
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Always false for a successfully built index
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    pub fn embeddings(&self) -> &[Vector] {
        &self.embeddings
    }

    /// Item and embedding at a catalog position
    pub fn get(&self, position: usize) -> Option<(&CatalogItem, &Vector)> {
        Some((self.items.get(position)?, self.embeddings.get(position)?))
    }

    /// Look up an item by the string form of its id
    pub fn find(&self, id: &str) -> Option<&CatalogItem> {
        self.items.iter().find(|item| item.id.to_string() == id)
    }

    /// Items with their embeddings, in catalog order
    pub fn iter(&self) -> impl Iterator<Item = (&CatalogItem, &Vector)> + '_ {
        self.items.iter().zip(self.embeddings.iter())
    }
}

fn check_unique_ids(items: &[CatalogItem]) -> Result<()> {
    let mut seen = AHashSet::with_capacity(items.len());
    for item in items {
        if !seen.insert(&item.id) {
            return Err(Error::DuplicateItem(item.id.to_string()));
        }
    }
    Ok(())
}
