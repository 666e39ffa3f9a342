//! Text generation for the recipe pipeline.
//!
//! [`RecipeGenerator`] is loaded once at startup and picks the best tier it can:
//!
//! 1. base model with the LoRA adapter merged in ([`ModelTier::Adapter`])
//! 2. base model alone, after any adapter failure ([`ModelTier::Base`])
//! 3. a stub that echoes the prompt, when no base model is configured ([`ModelTier::Stub`])
//!
//! The tier never changes after load. A base model that fails to load is a startup error.

pub mod config;
pub mod error;
pub mod llama;
pub mod lora;
#[cfg(any(test, feature = "mock"))]
pub mod mock;


use std::path::Path;

use candle_core::Device;
use tracing::{info, warn};

pub use config::{ENV_ADAPTER_PATH, ENV_BASE_MODEL_PATH, GeneratorConfig};
pub use error::GenerationError;
pub use llama::CausalLm;
pub use lora::{LoraAdapter, LoraConfig};
#[cfg(any(test, feature = "mock"))]
pub use mock::MockGenerator;

use crate::constants::DecodingParams;
use crate::embedding::device::select_device;
use crate::embedding::utils::load_first_tokenizer;

/// Prompt in, decoded sequence out.
///
/// The returned text is the full decoded sequence (prompt included, special tokens removed);
/// the caller extracts the completion.
pub trait TextGenerator: Send + Sync {
    fn generate(&self, prompt: &str, params: &DecodingParams) -> Result<String, GenerationError>;

    fn tier(&self) -> ModelTier;
}

/// Which weights back a generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelTier {
    Adapter,
    Base,
    Stub,
}

impl ModelTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelTier::Adapter => "adapter",
            ModelTier::Base => "base",
            ModelTier::Stub => "stub",
        }
    }

    pub fn is_stub(&self) -> bool {
        matches!(self, ModelTier::Stub)
    }
}

impl std::fmt::Display for ModelTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

enum GeneratorBackend {
    Model(Box<CausalLm>),
    Stub,
}

pub struct RecipeGenerator {
    backend: GeneratorBackend,
    tier: ModelTier,
    config: GeneratorConfig,
}

impl std::fmt::Debug for RecipeGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("RecipeGenerator");
        s.field("tier", &self.tier).field("config", &self.config);
        if let GeneratorBackend::Model(model) = &self.backend {
            s.field("model", model);
        }
        s.finish()
    }
}

impl RecipeGenerator {
    /// Loads the adapter tier, degrading to the base model on any adapter error.
    pub fn load_with_fallback(config: GeneratorConfig) -> Result<Self, GenerationError> {
        if let Err(reason) = config.validate() {
            return Err(GenerationError::InvalidConfig { reason });
        }

        let Some(base_dir) = config.base_model_dir.clone() else {
            warn!("No base model configured, recipe generation runs as a stub");
            return Ok(Self::stub_with_config(config));
        };

        let device = select_device("generator")?;

        if let Some(adapter_dir) = config.adapter_dir.clone() {
            match Self::load_model(&base_dir, Some(&adapter_dir), &config.eos_token, &device) {
                Ok(model) => {
                    info!(adapter = %adapter_dir.display(), "Adapter-augmented model ready");
                    return Ok(Self {
                        backend: GeneratorBackend::Model(Box::new(model)),
                        tier: ModelTier::Adapter,
                        config,
                    });
                }
                Err(e) => {
                    warn!(
                        adapter = %adapter_dir.display(),
                        error = %e,
                        "Adapter load failed, falling back to base model"
                    );
                }
            }
        }

        let model = Self::load_model(&base_dir, None, &config.eos_token, &device)?;
        info!(base = %base_dir.display(), "Base model ready");

        Ok(Self {
            backend: GeneratorBackend::Model(Box::new(model)),
            tier: ModelTier::Base,
            config,
        })
    }

    pub fn stub() -> Self {
        Self::stub_with_config(GeneratorConfig::stub())
    }

    fn stub_with_config(config: GeneratorConfig) -> Self {
        Self {
            backend: GeneratorBackend::Stub,
            tier: ModelTier::Stub,
            config,
        }
    }

    fn load_model(
        base_dir: &Path,
        adapter_dir: Option<&Path>,
        eos_token: &str,
        device: &Device,
    ) -> Result<CausalLm, GenerationError> {
        let adapter = adapter_dir
            .map(|dir| LoraAdapter::load(dir, device))
            .transpose()?;

        let tokenizer_dirs: Vec<&Path> = adapter_dir.into_iter().chain([base_dir]).collect();
        let tokenizer = load_first_tokenizer(&tokenizer_dirs)?;

        CausalLm::load(base_dir, adapter.as_ref(), tokenizer, eos_token, device)
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }
}

impl TextGenerator for RecipeGenerator {
    fn generate(&self, prompt: &str, params: &DecodingParams) -> Result<String, GenerationError> {
        if let Err(reason) = params.validate() {
            return Err(GenerationError::InvalidConfig { reason });
        }

        match &self.backend {
            GeneratorBackend::Model(model) => model.generate(prompt, params),
            GeneratorBackend::Stub => Ok(prompt.to_string()),
        }
    }

    fn tier(&self) -> ModelTier {
        self.tier
    }
}
