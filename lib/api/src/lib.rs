//! # SkillMatch API
//!
//! REST surface over a [`skillmatch_core::RecommendationService`].
//!
//! | Method | Path | |
//! |--------|------|-|
//! | `POST` | `/recommend` | `{"query", "top_n"?}` → ranked assessments |
//! | `GET` | `/health` | item count, model and dimension |
//! | `GET` | `/items/{id}/sample-questions?show=bool` | sample questions for one item |

pub mod rest;

pub use rest::RestApi;
