//! Llama-family causal LM with sampled decoding.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::generation::{LogitsProcessor, Sampling};
use candle_transformers::models::llama::{Cache, Config, Llama, LlamaConfig};
use candle_transformers::utils::apply_repeat_penalty;
use tokenizers::Tokenizer;
use tracing::{debug, info};

use crate::constants::DecodingParams;

use super::error::GenerationError;
use super::lora::LoraAdapter;

/// A loaded model plus the tokenizer and device it runs with.
pub struct CausalLm {
    model: Llama,
    config: Config,
    tokenizer: Tokenizer,
    device: Device,
    eos_token_id: u32,
}

impl std::fmt::Debug for CausalLm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CausalLm")
            .field("device", &format!("{:?}", self.device))
            .field("hidden_size", &self.config.hidden_size)
            .field("layers", &self.config.num_hidden_layers)
            .field("eos_token_id", &self.eos_token_id)
            .finish()
    }
}

/// Lists `*.safetensors` shards in `dir`, sorted by file name.
pub fn weight_files(dir: &Path) -> Result<Vec<PathBuf>, GenerationError> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "safetensors"))
        .collect();
    files.sort();

    if files.is_empty() {
        return Err(GenerationError::ModelLoadFailed {
            reason: format!("no .safetensors files in {}", dir.display()),
        });
    }
    Ok(files)
}

impl CausalLm {
    /// Builds the model from `model_dir`, optionally merging `adapter` first.
    pub fn load(
        model_dir: &Path,
        adapter: Option<&LoraAdapter>,
        tokenizer: Tokenizer,
        eos_token: &str,
        device: &Device,
    ) -> Result<Self, GenerationError> {
        if !model_dir.is_dir() {
            return Err(GenerationError::ModelNotFound {
                path: model_dir.to_path_buf(),
            });
        }

        let config_path = model_dir.join("config.json");
        let config_str = std::fs::read_to_string(&config_path).map_err(|e| {
            GenerationError::ModelLoadFailed {
                reason: format!("cannot read {}: {}", config_path.display(), e),
            }
        })?;
        let llama_config: LlamaConfig =
            serde_json::from_str(&config_str).map_err(|e| GenerationError::ModelLoadFailed {
                reason: format!("invalid {}: {}", config_path.display(), e),
            })?;
        let config = llama_config.into_config(false);

        let mut weights: HashMap<String, Tensor> = HashMap::new();
        for file in weight_files(model_dir)? {
            let shard = candle_core::safetensors::load(&file, device).map_err(|e| {
                GenerationError::ModelLoadFailed {
                    reason: format!("cannot read {}: {}", file.display(), e),
                }
            })?;
            weights.extend(shard);
        }

        if let Some(adapter) = adapter {
            adapter.merge_into(&mut weights)?;
        }

        let vb = VarBuilder::from_tensors(weights, DType::F32, device);
        let model = Llama::load(vb, &config).map_err(|e| GenerationError::ModelLoadFailed {
            reason: format!("failed to build llama model: {}", e),
        })?;

        let eos_token_id =
            tokenizer
                .token_to_id(eos_token)
                .ok_or_else(|| GenerationError::InvalidConfig {
                    reason: format!("end token {eos_token:?} is not in the vocabulary"),
                })?;

        info!(
            model_dir = %model_dir.display(),
            layers = config.num_hidden_layers,
            adapter = adapter.is_some(),
            "Generation model loaded"
        );

        Ok(Self {
            model,
            config,
            tokenizer,
            device: device.clone(),
            eos_token_id,
        })
    }

    /// Samples a continuation of `prompt` and returns the decoded prompt plus continuation.
    ///
    /// Every call draws a fresh seed, so two calls with the same prompt may differ.
    pub fn generate(
        &self,
        prompt: &str,
        params: &DecodingParams,
    ) -> Result<String, GenerationError> {
        let encoding =
            self.tokenizer
                .encode(prompt, true)
                .map_err(|e| GenerationError::TokenizationFailed {
                    reason: e.to_string(),
                })?;

        let mut tokens: Vec<u32> = encoding.get_ids().to_vec();
        tokens.truncate(params.prompt_max_tokens);
        if tokens.is_empty() {
            return Err(GenerationError::TokenizationFailed {
                reason: "prompt produced no tokens".to_string(),
            });
        }
        let prompt_len = tokens.len();

        let mut cache = Cache::new(true, DType::F32, &self.config, &self.device)?;
        let mut sampler = LogitsProcessor::from_sampling(
            rand::random::<u64>(),
            Sampling::TopKThenTopP {
                k: params.top_k,
                p: params.top_p,
                temperature: params.temperature,
            },
        );

        let mut index_pos = 0;
        for step in 0..params.max_new_tokens {
            let context = if step == 0 {
                &tokens[..]
            } else {
                &tokens[tokens.len() - 1..]
            };
            let input = Tensor::new(context, &self.device)?.unsqueeze(0)?;
            let logits = self
                .model
                .forward(&input, index_pos, &mut cache)?
                .squeeze(0)?
                .to_dtype(DType::F32)?;
            index_pos += context.len();

            let logits = if params.repetition_penalty == 1.0 {
                logits
            } else {
                apply_repeat_penalty(&logits, params.repetition_penalty, &tokens)?
            };
            let logits = if step < params.min_new_tokens {
                suppress_token(&logits, self.eos_token_id)?
            } else {
                logits
            };

            let next = sampler.sample(&logits)?;
            tokens.push(next);
            if next == self.eos_token_id {
                break;
            }
        }

        debug!(
            prompt_tokens = prompt_len,
            new_tokens = tokens.len() - prompt_len,
            "Decoding finished"
        );

        self.tokenizer
            .decode(&tokens, true)
            .map_err(|e| GenerationError::TokenizationFailed {
                reason: e.to_string(),
            })
    }
}

/// Sets one logit to negative infinity so it cannot be sampled.
pub(crate) fn suppress_token(logits: &Tensor, token: u32) -> candle_core::Result<Tensor> {
    let mut values = logits.to_vec1::<f32>()?;
    if let Some(value) = values.get_mut(token as usize) {
        *value = f32::NEG_INFINITY;
    }
    Tensor::new(values, logits.device())
}
