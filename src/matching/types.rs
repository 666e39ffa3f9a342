use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
/// One ranked candidate with its component scores (each rounded for presentation).
pub struct MatchResult {
    pub name: String,
    /// `semantic_weight * semantic_score + lexical_weight * lexical_score`.
    pub combined_score: f32,
    /// Cosine similarity of the embeddings, clamped into `[0, 1]`.
    pub semantic_score: f32,
    /// Character-level ratio of the lower-cased strings.
    pub lexical_score: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
/// Matches ordered by descending combined score; `best_match` is the first of them.
pub struct RankedResponse {
    pub best_match: MatchResult,
    pub all_matches: Vec<MatchResult>,
}

impl RankedResponse {
    /// Returns `None` when `all_matches` is empty.
    pub fn from_matches(all_matches: Vec<MatchResult>) -> Option<Self> {
        let best_match = all_matches.first()?.clone();
        Some(Self {
            best_match,
            all_matches,
        })
    }

    pub fn len(&self) -> usize {
        self.all_matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all_matches.is_empty()
    }
}
