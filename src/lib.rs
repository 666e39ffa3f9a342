//! Namechef library crate (used by the server binary and integration tests).
//!
//! Two independent capabilities behind one small HTTP API:
//!
//! ## Name matching
//! - [`NameStore`] - persisted `{"names": [...]}` document, bootstrapped with defaults
//! - [`NameCatalog`] - candidate names with precomputed embeddings
//! - [`HybridRanker`] - semantic (cosine) + lexical (edit ratio) ranking
//! - [`NameEncoder`] - BERT sentence encoder, or a deterministic stub
//!
//! ## Recipe generation
//! - [`RecipeGenerator`] - Llama causal LM with an optional merged LoRA adapter
//! - [`GuardedPipeline`] - prompt, generate, validate, fall back
//! - [`KeywordFallback`] - keyword-indexed canned recipes
//!
//! ## Serving
//! - [`Config`] - environment-backed settings
//! - [`gateway`] - Axum router and handlers
//!
//! ## Test/Mock Support
//! [`MockGenerator`] is available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod config;
pub mod constants;
pub mod embedding;
pub mod gateway;
pub mod generation;
pub mod matching;
pub mod recipe;

pub use config::{Config, ConfigError};
pub use constants::{DecodingParams, ScoreWeights};
pub use embedding::{
    ENCODER_EMBEDDING_DIM, ENCODER_MAX_SEQ_LEN, EmbeddingError, EncoderConfig, NameEncoder,
    TextEmbedder,
};
pub use gateway::{
    AppState, GatewayError, NAMECHEF_STATUS_HEADER, create_router_with_state,
};
#[cfg(any(test, feature = "mock"))]
pub use generation::MockGenerator;
pub use generation::{
    GenerationError, GeneratorConfig, ModelTier, RecipeGenerator, TextGenerator,
};
pub use matching::{
    CatalogError, HybridRanker, MatchError, MatchResult, NameCatalog, NameStore, RankedResponse,
    lexical_ratio,
};
pub use recipe::{
    FallbackError, FallbackSource, GenerationOutcome, GuardedPipeline, KeywordFallback,
    RecipeSource, is_valid_recipe,
};
