use std::path::PathBuf;

use crate::constants::DEFAULT_EOS_TOKEN;

pub const ENV_BASE_MODEL_PATH: &str = "NAMECHEF_BASE_MODEL_PATH";
pub const ENV_ADAPTER_PATH: &str = "NAMECHEF_ADAPTER_PATH";

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    /// Causal LM directory (`config.json`, `tokenizer.json`, `*.safetensors`).
    /// `None` selects the stub generator.
    pub base_model_dir: Option<PathBuf>,

    /// LoRA adapter directory merged into the base weights at load time.
    pub adapter_dir: Option<PathBuf>,

    /// Token that ends generation once the minimum length has been reached.
    pub eos_token: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self::stub()
    }
}

impl GeneratorConfig {
    pub fn new<P: Into<PathBuf>>(base_model_dir: P) -> Self {
        Self {
            base_model_dir: Some(base_model_dir.into()),
            adapter_dir: None,
            eos_token: DEFAULT_EOS_TOKEN.to_string(),
        }
    }

    pub fn stub() -> Self {
        Self {
            base_model_dir: None,
            adapter_dir: None,
            eos_token: DEFAULT_EOS_TOKEN.to_string(),
        }
    }

    pub fn with_adapter<P: Into<PathBuf>>(mut self, adapter_dir: P) -> Self {
        self.adapter_dir = Some(adapter_dir.into());
        self
    }

    pub fn with_eos_token(mut self, eos_token: impl Into<String>) -> Self {
        self.eos_token = eos_token.into();
        self
    }

    pub fn is_stub(&self) -> bool {
        self.base_model_dir.is_none()
    }

    /// The adapter directory is not checked here; a broken adapter degrades to the base model.
    pub fn validate(&self) -> Result<(), String> {
        if self.eos_token.is_empty() {
            return Err("eos_token cannot be empty".to_string());
        }

        if let Some(ref path) = self.base_model_dir
            && path.as_os_str().is_empty()
        {
            return Err("base_model_dir cannot be empty when provided".to_string());
        }

        Ok(())
    }

    pub fn from_env() -> Self {
        let read_path = |name: &str| {
            std::env::var(name)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
        };

        Self {
            base_model_dir: read_path(ENV_BASE_MODEL_PATH),
            adapter_dir: read_path(ENV_ADAPTER_PATH),
            eos_token: DEFAULT_EOS_TOKEN.to_string(),
        }
    }
}
