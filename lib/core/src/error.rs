use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Catalog is empty: at least one item is required to build an index")]
    EmptyCatalog,

    #[error("Duplicate catalog item id: {0}")]
    DuplicateItem(String),

    #[error("Invalid vector dimension: expected {expected}, got {actual}")]
    InvalidDimension { expected: usize, actual: usize },

    #[error("Embedding model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Encoder did not respond within {0:?}")]
    EncodingTimeout(Duration),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// True for failures that originate in the encoder rather than in the caller's input.
    pub fn is_encoder_failure(&self) -> bool {
        matches!(
            self,
            Error::ModelUnavailable(_)
                | Error::Encoding(_)
                | Error::EncodingTimeout(_)
                | Error::InvalidDimension { .. }
        )
    }
}
