//! Request and response bodies of the HTTP API.

use serde::{Deserialize, Serialize};

use crate::matching::{MatchResult, RankedResponse};

#[derive(Debug, Clone, Deserialize)]
pub struct MatchNamesRequest {
    pub name: String,
    #[serde(default)]
    pub top_k: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NameMatch {
    pub name: String,
    /// Combined score.
    pub score: f32,
}

impl From<&MatchResult> for NameMatch {
    fn from(m: &MatchResult) -> Self {
        Self {
            name: m.name.clone(),
            score: m.combined_score,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchNamesResponse {
    /// The name exactly as the client sent it (not trimmed).
    pub input_name: String,
    pub best_match: NameMatch,
    pub all_matches: Vec<NameMatch>,
}

impl MatchNamesResponse {
    pub fn new(input_name: String, ranked: &RankedResponse) -> Self {
        Self {
            input_name,
            best_match: NameMatch::from(&ranked.best_match),
            all_matches: ranked.all_matches.iter().map(NameMatch::from).collect(),
        }
    }
}

fn default_use_fallback() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecipeRequest {
    pub ingredients: String,
    #[serde(default = "default_use_fallback")]
    pub use_fallback: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeResponse {
    pub recipe: String,
    pub generated_by: String,
}
