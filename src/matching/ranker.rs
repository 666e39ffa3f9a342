use std::sync::Arc;

use tracing::debug;

use crate::constants::{DEFAULT_TOP_K, ScoreWeights, round_score};
use crate::embedding::{EmbeddingError, TextEmbedder};

use super::catalog::NameCatalog;
use super::error::MatchError;
use super::lexical::lexical_ratio;
use super::types::{MatchResult, RankedResponse};

/// Ranks catalog names against a query by embedding and character similarity.
pub struct HybridRanker {
    catalog: Arc<NameCatalog>,
    embedder: Arc<dyn TextEmbedder>,
    weights: ScoreWeights,
}

impl std::fmt::Debug for HybridRanker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HybridRanker")
            .field("catalog_size", &self.catalog.len())
            .field("embedding_dim", &self.catalog.embedding_dim())
            .field("weights", &self.weights)
            .finish()
    }
}

struct Scored {
    index: usize,
    combined: f32,
    semantic: f32,
    lexical: f32,
}

impl HybridRanker {
    /// Pairs a catalog with the embedder that produced its vectors.
    pub fn new(
        catalog: Arc<NameCatalog>,
        embedder: Arc<dyn TextEmbedder>,
    ) -> Result<Self, MatchError> {
        Self::with_weights(catalog, embedder, ScoreWeights::default())
    }

    pub fn with_weights(
        catalog: Arc<NameCatalog>,
        embedder: Arc<dyn TextEmbedder>,
        weights: ScoreWeights,
    ) -> Result<Self, MatchError> {
        weights
            .validate()
            .map_err(|reason| MatchError::InvalidInput { reason })?;

        if embedder.embedding_dim() != catalog.embedding_dim() {
            return Err(MatchError::DimensionMismatch {
                expected: catalog.embedding_dim(),
                actual: embedder.embedding_dim(),
            });
        }

        Ok(Self {
            catalog,
            embedder,
            weights,
        })
    }

    pub fn catalog(&self) -> &NameCatalog {
        &self.catalog
    }

    pub fn weights(&self) -> ScoreWeights {
        self.weights
    }

    pub fn is_embedder_stub(&self) -> bool {
        self.embedder.is_stub()
    }

    /// [`rank`](Self::rank) with the default of 5 matches.
    pub fn rank_default(&self, query: &str) -> Result<RankedResponse, MatchError> {
        self.rank(query, DEFAULT_TOP_K)
    }

    /// Scores every candidate and returns the best `top_k` (fewer if the catalog is smaller).
    ///
    /// The caller rejects empty queries. Ordering is descending by combined score; equal scores
    /// keep catalog order. Every call recomputes all scores, nothing is cached between calls.
    pub fn rank(&self, query: &str, top_k: usize) -> Result<RankedResponse, MatchError> {
        if top_k == 0 {
            return Err(MatchError::InvalidInput {
                reason: "top_k must be greater than 0".to_string(),
            });
        }

        let query_embedding = self.embedder.embed(query)?;
        if query_embedding.len() != self.catalog.embedding_dim() {
            return Err(MatchError::DimensionMismatch {
                expected: self.catalog.embedding_dim(),
                actual: query_embedding.len(),
            });
        }
        if !query_embedding.iter().all(|v| v.is_finite()) {
            return Err(MatchError::Embedding(EmbeddingError::InferenceFailed {
                reason: "query embedding contains non-finite values".to_string(),
            }));
        }

        let query_lower = query.to_lowercase();

        let mut scored: Vec<Scored> = self
            .catalog
            .candidates()
            .iter()
            .enumerate()
            .map(|(index, candidate)| {
                let semantic =
                    cosine_similarity(&query_embedding, candidate.embedding()).clamp(0.0, 1.0);
                let lexical = lexical_ratio(&query_lower, &candidate.text().to_lowercase());
                Scored {
                    index,
                    combined: self.weights.combine(semantic, lexical),
                    semantic,
                    lexical,
                }
            })
            .collect();

        // `sort_by` is stable, which keeps catalog order among equal scores.
        scored.sort_by(|a, b| b.combined.total_cmp(&a.combined));
        scored.truncate(top_k);

        let candidates = self.catalog.candidates();
        let matches: Vec<MatchResult> = scored
            .into_iter()
            .map(|s| MatchResult {
                name: candidates[s.index].text().to_string(),
                combined_score: round_score(s.combined),
                semantic_score: round_score(s.semantic),
                lexical_score: round_score(s.lexical),
            })
            .collect();

        debug!(
            query_len = query.len(),
            returned = matches.len(),
            top_score = matches.first().map(|m| m.combined_score),
            "Ranked catalog"
        );

        // The catalog is never empty and top_k >= 1, so there is at least one match.
        RankedResponse::from_matches(matches).ok_or_else(|| MatchError::InvalidInput {
            reason: "catalog produced no matches".to_string(),
        })
    }
}

/// Cosine similarity; `0.0` for mismatched lengths, zero vectors or overflowing products.
#[inline]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let (dot, norm_a_sq, norm_b_sq) = a
        .iter()
        .zip(b.iter())
        .fold((0.0f32, 0.0f32, 0.0f32), |(dot, na, nb), (&av, &bv)| {
            (dot + av * bv, na + av * av, nb + bv * bv)
        });

    let norm_a = norm_a_sq.sqrt();
    let norm_b = norm_b_sq.sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    let cosine = dot / (norm_a * norm_b);
    if cosine.is_finite() { cosine } else { 0.0 }
}
