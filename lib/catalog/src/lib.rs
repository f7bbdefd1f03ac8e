//! # SkillMatch Catalog
//!
//! Everything that feeds the recommendation core from the outside:
//!
//! - [`CatalogLoader`] turns a CSV or JSON product file into [`CatalogItem`]s
//! - [`SampleQuestionBook`] maps a product category to illustrative questions
//!
//! [`CatalogItem`]: skillmatch_core::CatalogItem

pub mod error;
pub mod loader;
pub mod samples;

pub use error::{CatalogError, Result};
pub use loader::CatalogLoader;
pub use samples::{SampleQuestionBook, SampleView};
