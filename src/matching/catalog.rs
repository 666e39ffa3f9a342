//! Candidate names: the persisted document and the embedded, immutable catalog.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::embedding::TextEmbedder;

use super::error::CatalogError;

/// Names written out on first start when no document exists yet.
pub const DEFAULT_NAMES: [&str; 50] = [
    "Geetha", "Geeta", "Gita", "Gitu", "Gitanjali", "Priya", "Priyanka", "Priyam", "Priyanshu",
    "Amit", "Amitabh", "Amith", "Amita", "Rajesh", "Raja", "Raju", "Rajeev", "Rajiv", "Suresh",
    "Suri", "Suraj", "Surya", "Mohammed", "Mohammad", "Muhammad", "Muhammed", "Aisha", "Ayesha",
    "Aysha", "Aiesha", "Krishna", "Krish", "Krishnan", "Karthik", "Kartik", "Lakshmi", "Laxmi",
    "Lakshman", "Deepak", "Dipak", "Deepika", "Dipika", "Sandeep", "Sandip", "Sanjay", "Sanjiv",
    "Ramesh", "Ram", "Raman", "Rama",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct NamesDocument {
    names: Vec<String>,
}

/// Reads the `{"names": [...]}` document, writing the defaults on first use.
#[derive(Debug, Clone)]
pub struct NameStore {
    path: PathBuf,
}

impl NameStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the stored names, bootstrapping the file with [`DEFAULT_NAMES`] if absent.
    ///
    /// An existing document is never rewritten, even if it differs from the defaults.
    pub fn load_or_bootstrap(&self) -> Result<Vec<String>, CatalogError> {
        if self.path.exists() {
            return self.load();
        }

        let names: Vec<String> = DEFAULT_NAMES.iter().map(|s| s.to_string()).collect();
        self.write(&names)?;

        info!(
            path = %self.path.display(),
            count = names.len(),
            "Bootstrapped name catalog with defaults"
        );

        Ok(names)
    }

    /// Reads the document; fails if it is missing or malformed.
    pub fn load(&self) -> Result<Vec<String>, CatalogError> {
        let content = std::fs::read_to_string(&self.path).map_err(|source| CatalogError::Io {
            path: self.path.clone(),
            source,
        })?;

        let document: NamesDocument =
            serde_json::from_str(&content).map_err(|source| CatalogError::Parse {
                path: self.path.clone(),
                source,
            })?;

        debug!(path = %self.path.display(), count = document.names.len(), "Loaded names");
        Ok(document.names)
    }

    fn write(&self, names: &[String]) -> Result<(), CatalogError> {
        let io_err = |source| CatalogError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }

        let document = NamesDocument {
            names: names.to_vec(),
        };
        let json = serde_json::to_string_pretty(&document).map_err(|source| {
            CatalogError::Parse {
                path: self.path.clone(),
                source,
            }
        })?;

        std::fs::write(&self.path, json).map_err(io_err)
    }
}

/// A catalog entry with its precomputed embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateName {
    text: String,
    embedding: Vec<f32>,
}

impl CandidateName {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn embedding(&self) -> &[f32] {
        &self.embedding
    }
}

/// Ordered, immutable list of candidates, all embedded with the same model.
#[derive(Debug, Clone)]
pub struct NameCatalog {
    candidates: Vec<CandidateName>,
    embedding_dim: usize,
}

impl NameCatalog {
    /// Embeds every name once. Order is preserved and is the ranker's tie-break.
    pub fn build(names: Vec<String>, embedder: &dyn TextEmbedder) -> Result<Self, CatalogError> {
        if names.is_empty() {
            return Err(CatalogError::Empty);
        }

        let embedding_dim = embedder.embedding_dim();
        let texts: Vec<&str> = names.iter().map(String::as_str).collect();
        let embeddings = embedder.embed_batch(&texts)?;
        if embeddings.len() != names.len() {
            return Err(CatalogError::BatchSizeMismatch {
                expected: names.len(),
                actual: embeddings.len(),
            });
        }

        let candidates = names
            .into_iter()
            .zip(embeddings)
            .map(|(text, embedding)| {
                if embedding.len() != embedding_dim {
                    return Err(CatalogError::DimensionMismatch {
                        name: text,
                        expected: embedding_dim,
                        actual: embedding.len(),
                    });
                }
                if !embedding.iter().all(|v| v.is_finite()) {
                    return Err(CatalogError::NonFiniteEmbedding { name: text });
                }
                Ok(CandidateName { text, embedding })
            })
            .collect::<Result<Vec<_>, _>>()?;

        info!(
            count = candidates.len(),
            embedding_dim, "Pre-computed catalog embeddings"
        );

        Ok(Self {
            candidates,
            embedding_dim,
        })
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn embedding_dim(&self) -> usize {
        self.embedding_dim
    }

    pub fn candidates(&self) -> &[CandidateName] {
        &self.candidates
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.candidates.iter().map(|c| c.text.as_str())
    }
}
