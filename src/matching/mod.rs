//! Hybrid name matching.
//!
//! A [`NameCatalog`] holds the candidate names and their embeddings, computed once at startup
//! from the names persisted by [`NameStore`]. [`HybridRanker`] scores a query against every
//! candidate with two independent signals:
//!
//! - **semantic**: cosine similarity of the query and candidate embeddings
//! - **lexical**: [`lexical_ratio`] of the lower-cased strings
//!
//! and combines them with [`ScoreWeights`](crate::constants::ScoreWeights) (0.6 / 0.4 by
//! default). Scores are rounded to three decimals only after sorting.

pub mod catalog;
pub mod error;
pub mod lexical;
pub mod ranker;
pub mod types;


pub use catalog::{CandidateName, DEFAULT_NAMES, NameCatalog, NameStore};
pub use error::{CatalogError, MatchError};
pub use lexical::lexical_ratio;
pub use ranker::{HybridRanker, cosine_similarity};
pub use types::{MatchResult, RankedResponse};
