use thiserror::Error;

pub type Result<T> = std::result::Result<T, CatalogError>;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing required column '{column}' (available: {available})")]
    MissingColumn { column: String, available: String },

    #[error("Duplicate item id: {0}")]
    DuplicateId(String),

    #[error("Unsupported catalog format: {0}")]
    UnsupportedFormat(String),
}
