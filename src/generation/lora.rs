//! LoRA adapters merged into dense weights before the model is built.
//!
//! A PEFT adapter directory holds `adapter_config.json` and `adapter_model.safetensors`.
//! Every adapted linear layer `X` contributes a pair
//! `base_model.model.X.lora_A.weight` (`r x in`) and `base_model.model.X.lora_B.weight`
//! (`out x r`); merging replaces `X.weight` with `W + scale * B @ A`.

use std::collections::HashMap;
use std::path::Path;

use candle_core::{Device, Tensor};
use serde::Deserialize;
use tracing::{debug, info};

use super::error::GenerationError;

pub const ADAPTER_CONFIG_FILENAME: &str = "adapter_config.json";
pub const ADAPTER_WEIGHTS_FILENAME: &str = "adapter_model.safetensors";

const PEFT_PREFIX: &str = "base_model.model.";
const LORA_A_SUFFIX: &str = ".lora_A.weight";
const LORA_B_SUFFIX: &str = ".lora_B.weight";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoraConfig {
    pub r: usize,
    pub lora_alpha: f64,
    #[serde(default)]
    pub target_modules: Vec<String>,
    #[serde(default)]
    pub use_rslora: bool,
}

impl LoraConfig {
    pub fn from_file(path: &Path) -> Result<Self, GenerationError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| GenerationError::AdapterLoadFailed {
                reason: format!("cannot read {}: {}", path.display(), e),
            })?;
        let config: Self =
            serde_json::from_str(&content).map_err(|e| GenerationError::AdapterLoadFailed {
                reason: format!("invalid {}: {}", path.display(), e),
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), GenerationError> {
        if self.r == 0 {
            return Err(GenerationError::AdapterLoadFailed {
                reason: "adapter rank r must be greater than 0".to_string(),
            });
        }
        if !self.lora_alpha.is_finite() {
            return Err(GenerationError::AdapterLoadFailed {
                reason: format!("lora_alpha must be finite, got {}", self.lora_alpha),
            });
        }
        Ok(())
    }

    /// `alpha / r`, or `alpha / sqrt(r)` for rank-stabilised adapters.
    pub fn scale(&self) -> f64 {
        if self.use_rslora {
            self.lora_alpha / (self.r as f64).sqrt()
        } else {
            self.lora_alpha / self.r as f64
        }
    }
}

/// A parsed adapter ready to be merged.
#[derive(Debug)]
pub struct LoraAdapter {
    config: LoraConfig,
    tensors: HashMap<String, Tensor>,
}

impl LoraAdapter {
    /// Reads config and weights from a PEFT adapter directory.
    pub fn load(dir: &Path, device: &Device) -> Result<Self, GenerationError> {
        if !dir.is_dir() {
            return Err(GenerationError::AdapterLoadFailed {
                reason: format!("adapter directory not found: {}", dir.display()),
            });
        }

        let config = LoraConfig::from_file(&dir.join(ADAPTER_CONFIG_FILENAME))?;

        let weights_path = dir.join(ADAPTER_WEIGHTS_FILENAME);
        let tensors = candle_core::safetensors::load(&weights_path, device).map_err(|e| {
            GenerationError::AdapterLoadFailed {
                reason: format!("cannot read {}: {}", weights_path.display(), e),
            }
        })?;

        debug!(
            adapter = %dir.display(),
            r = config.r,
            alpha = config.lora_alpha,
            tensors = tensors.len(),
            "Read LoRA adapter"
        );

        Ok(Self::from_parts(config, tensors))
    }

    pub fn from_parts(config: LoraConfig, tensors: HashMap<String, Tensor>) -> Self {
        Self { config, tensors }
    }

    pub fn config(&self) -> &LoraConfig {
        &self.config
    }

    /// Merges every `lora_A`/`lora_B` pair into `weights`; returns the number of layers merged.
    ///
    /// Fails without touching `weights` if a pair is incomplete, a target layer is missing or
    /// the shapes disagree.
    pub fn merge_into(
        &self,
        weights: &mut HashMap<String, Tensor>,
    ) -> Result<usize, GenerationError> {
        let scale = self.config.scale();
        let mut merged: Vec<(String, Tensor)> = Vec::new();

        let mut a_keys: Vec<&String> = self
            .tensors
            .keys()
            .filter(|k| k.ends_with(LORA_A_SUFFIX))
            .collect();
        a_keys.sort();

        for a_key in a_keys {
            let layer = &a_key[..a_key.len() - LORA_A_SUFFIX.len()];
            let b_key = format!("{layer}{LORA_B_SUFFIX}");
            let base_key = format!("{}.weight", layer.strip_prefix(PEFT_PREFIX).unwrap_or(layer));

            let lora_a = &self.tensors[a_key];
            let lora_b = self
                .tensors
                .get(&b_key)
                .ok_or_else(|| GenerationError::AdapterLoadFailed {
                    reason: format!("missing {b_key} for {a_key}"),
                })?;
            let base = weights
                .get(&base_key)
                .ok_or_else(|| GenerationError::AdapterLoadFailed {
                    reason: format!("adapter targets unknown weight {base_key}"),
                })?;

            let delta = lora_b
                .to_dtype(base.dtype())?
                .matmul(&lora_a.to_dtype(base.dtype())?)?;
            if delta.dims() != base.dims() {
                return Err(GenerationError::AdapterLoadFailed {
                    reason: format!(
                        "shape mismatch for {base_key}: weight {:?}, delta {:?}",
                        base.dims(),
                        delta.dims()
                    ),
                });
            }

            let updated = (base + (delta * scale)?)?;
            merged.push((base_key, updated));
        }

        if merged.is_empty() {
            return Err(GenerationError::AdapterLoadFailed {
                reason: "adapter contains no LoRA weight pairs".to_string(),
            });
        }

        let count = merged.len();
        for (key, tensor) in merged {
            weights.insert(key, tensor);
        }

        info!(layers = count, scale, "Merged LoRA adapter into base weights");
        Ok(count)
    }
}
