//! Embedding + model utilities.
//!
//! - [`encoder`] turns names into fixed-length vectors for the ranker.
//! - [`TextEmbedder`] is the seam the ranker depends on, so tests can swap in fakes.

/// BERT sentence encoder (mean pooling).
pub mod bert;
/// Device selection (CPU / Metal / CUDA).
pub mod device;
/// Name encoder with real and stub backends.
pub mod encoder;
mod error;
/// Tokenizer loading helpers.
pub mod utils;

pub use encoder::{ENCODER_EMBEDDING_DIM, ENCODER_MAX_SEQ_LEN, EncoderConfig, NameEncoder};
pub use error::EmbeddingError;

/// Maps a string to a fixed-length vector.
///
/// Implementations must be deterministic for a given model: the same text always yields the
/// same vector, and every vector has [`embedding_dim`](TextEmbedder::embedding_dim) entries.
pub trait TextEmbedder: Send + Sync {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        texts.iter().map(|text| self.embed(text)).collect()
    }

    fn embedding_dim(&self) -> usize;

    /// `true` when vectors come from the hash stub rather than a model.
    fn is_stub(&self) -> bool {
        false
    }
}
