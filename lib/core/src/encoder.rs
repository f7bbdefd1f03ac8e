//! Text-to-vector encoder interface.
//!
//! The core never embeds text itself; it consumes an [`Encoder`] supplied by the
//! host (see `skillmatch-encoder` for the bundled implementations).

use crate::{Error, Result, Vector};
use std::sync::Arc;

/// Maps text to fixed-dimension embedding vectors.
///
/// Implementations must be deterministic for a fixed configuration: the same
/// text always yields the same vector. Calls are blocking; the service runs
/// them on a blocking pool under a deadline.
pub trait Encoder: Send + Sync {
    /// Embed a batch of texts. Returns exactly one vector per input, in input order.
    fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vector>>;

    /// Embed a single text.
    fn encode(&self, text: &str) -> Result<Vector> {
        let mut vectors = self.encode_batch(&[text.to_string()])?;
        if vectors.len() != 1 {
            return Err(Error::Encoding(format!(
                "expected 1 vector for a single text, encoder returned {}",
                vectors.len()
            )));
        }
        Ok(vectors.remove(0))
    }

    /// Length of every vector this encoder produces
    fn dimension(&self) -> usize;

    /// Identifies the model configuration; vectors from different models are not comparable
    fn model_name(&self) -> &str;

    /// Whether `encode`/`encode_batch` may be invoked from several threads at once.
    /// When false the service funnels calls through a single-permit queue.
    fn supports_concurrency(&self) -> bool {
        true
    }
}

impl<E: Encoder + ?Sized> Encoder for Arc<E> {
    fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vector>> {
        (**self).encode_batch(texts)
    }

    fn encode(&self, text: &str) -> Result<Vector> {
        (**self).encode(text)
    }

    fn dimension(&self) -> usize {
        (**self).dimension()
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }

    fn supports_concurrency(&self) -> bool {
        (**self).supports_concurrency()
    }
}
