//! Environment-backed configuration.
//!
//! Most settings have defaults. Override with `NAMECHEF_*` environment variables.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{DEFAULT_TOP_K, NAMES_FILENAME};

/// Server configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `NAMECHEF_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port. Default: `8000`.
    pub port: u16,

    /// IP address to bind to. Default: `0.0.0.0`.
    pub bind_addr: IpAddr,

    /// Directory holding the persisted name catalog. Default: `./data`.
    pub data_dir: PathBuf,

    /// Sentence-encoder model directory (BERT + tokenizer). Stub encoder when unset.
    pub embedder_path: Option<PathBuf>,

    /// Base causal-LM directory. Stub generator when unset.
    pub base_model_path: Option<PathBuf>,

    /// LoRA adapter directory merged on top of the base model.
    pub adapter_path: Option<PathBuf>,

    /// JSON file replacing the built-in fallback recipes.
    pub fallback_recipes_path: Option<PathBuf>,

    /// Upper bound on a single request's inference time. Default: 300s.
    pub request_timeout: Duration,

    /// Matches returned when the request does not specify `top_k`. Default: `5`.
    pub default_top_k: usize,
}

/// Default request timeout used when `NAMECHEF_REQUEST_TIMEOUT_SECS` is not set.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 300;

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8000,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(0, 0, 0, 0)),
            data_dir: PathBuf::from("./data"),
            embedder_path: None,
            base_model_path: None,
            adapter_path: None,
            fallback_recipes_path: None,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            default_top_k: DEFAULT_TOP_K,
        }
    }
}

impl Config {
    const ENV_PORT: &'static str = "NAMECHEF_PORT";
    const ENV_BIND_ADDR: &'static str = "NAMECHEF_BIND_ADDR";
    const ENV_DATA_DIR: &'static str = "NAMECHEF_DATA_DIR";
    const ENV_EMBEDDER_PATH: &'static str = "NAMECHEF_EMBEDDER_PATH";
    const ENV_BASE_MODEL_PATH: &'static str = "NAMECHEF_BASE_MODEL_PATH";
    const ENV_ADAPTER_PATH: &'static str = "NAMECHEF_ADAPTER_PATH";
    const ENV_FALLBACK_RECIPES: &'static str = "NAMECHEF_FALLBACK_RECIPES";
    const ENV_REQUEST_TIMEOUT_SECS: &'static str = "NAMECHEF_REQUEST_TIMEOUT_SECS";
    const ENV_TOP_K: &'static str = "NAMECHEF_TOP_K";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = Self::parse_port_from_env(defaults.port)?;
        let bind_addr = Self::parse_bind_addr_from_env(defaults.bind_addr)?;
        let data_dir = Self::parse_path_from_env(Self::ENV_DATA_DIR, defaults.data_dir);
        let embedder_path = Self::parse_optional_path_from_env(Self::ENV_EMBEDDER_PATH);
        let base_model_path = Self::parse_optional_path_from_env(Self::ENV_BASE_MODEL_PATH);
        let adapter_path = Self::parse_optional_path_from_env(Self::ENV_ADAPTER_PATH);
        let fallback_recipes_path = Self::parse_optional_path_from_env(Self::ENV_FALLBACK_RECIPES);
        let request_timeout = Duration::from_secs(Self::parse_u64_from_env(
            Self::ENV_REQUEST_TIMEOUT_SECS,
            DEFAULT_REQUEST_TIMEOUT_SECS,
        ));
        let default_top_k =
            Self::parse_u64_from_env(Self::ENV_TOP_K, defaults.default_top_k as u64) as usize;

        Ok(Self {
            port,
            bind_addr,
            data_dir,
            embedder_path,
            base_model_path,
            adapter_path,
            fallback_recipes_path,
            request_timeout,
            default_top_k,
        })
    }

    /// Validates paths and basic invariants (does not create directories).
    ///
    /// The adapter path is not checked: a missing or broken adapter degrades to the base model.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.data_dir.exists() && !self.data_dir.is_dir() {
            return Err(ConfigError::NotADirectory {
                path: self.data_dir.clone(),
            });
        }

        for path in [&self.embedder_path, &self.base_model_path]
            .into_iter()
            .flatten()
        {
            if !path.exists() {
                return Err(ConfigError::PathNotFound { path: path.clone() });
            }
            if !path.is_dir() {
                return Err(ConfigError::NotADirectory { path: path.clone() });
            }
        }

        if let Some(ref path) = self.fallback_recipes_path {
            if !path.exists() {
                return Err(ConfigError::PathNotFound { path: path.clone() });
            }
            if !path.is_file() {
                return Err(ConfigError::NotAFile { path: path.clone() });
            }
        }

        if self.request_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_REQUEST_TIMEOUT_SECS,
                reason: "timeout must be greater than 0".to_string(),
            });
        }

        if self.default_top_k == 0 {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_TOP_K,
                reason: "top_k must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    /// Location of the persisted candidate-name document.
    pub fn names_path(&self) -> PathBuf {
        self.data_dir.join(NAMES_FILENAME)
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        match env::var(Self::ENV_PORT) {
            Ok(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Ok(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            Err(_) => Ok(default),
        }
    }

    fn parse_path_from_env(var_name: &str, default: PathBuf) -> PathBuf {
        env::var(var_name).map(PathBuf::from).unwrap_or(default)
    }

    fn parse_optional_path_from_env(var_name: &str) -> Option<PathBuf> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    }

    fn parse_u64_from_env(var_name: &str, default: u64) -> u64 {
        env::var(var_name)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }
}
