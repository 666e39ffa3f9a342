use candle_core::Device;

#[cfg(any(feature = "metal", feature = "cuda"))]
use tracing::{info, warn};

#[cfg(not(any(feature = "metal", feature = "cuda")))]
use tracing::debug;

use super::error::EmbeddingError;

/// Selects the compute device for `component` based on enabled features (falls back to CPU).
///
/// The encoder and the generator each call this once at load time.
#[cfg(any(feature = "metal", feature = "cuda"))]
pub fn select_device(component: &str) -> Result<Device, EmbeddingError> {
    let mut failures: Vec<String> = Vec::new();

    #[cfg(feature = "metal")]
    {
        match Device::new_metal(0) {
            Ok(device) => {
                info!(component, "Using Metal GPU acceleration");
                return Ok(device);
            }
            Err(e) => {
                let msg = e.to_string();
                warn!(component, error = %msg, "Metal device unavailable");
                failures.push(format!("metal failed: {msg}"));
            }
        }
    }

    #[cfg(feature = "cuda")]
    {
        match Device::new_cuda(0) {
            Ok(device) => {
                info!(component, "Using CUDA GPU acceleration");
                return Ok(device);
            }
            Err(e) => {
                let msg = e.to_string();
                warn!(component, error = %msg, "CUDA device unavailable");
                failures.push(format!("cuda failed: {msg}"));
            }
        }
    }

    let reason = if failures.is_empty() {
        "no GPU device available".to_string()
    } else {
        failures.join("; ")
    };

    warn!(component, reason = %reason, "Falling back to CPU device");
    Ok(Device::Cpu)
}

/// Selects the compute device for `component` (CPU only in this build).
#[cfg(not(any(feature = "metal", feature = "cuda")))]
pub fn select_device(component: &str) -> Result<Device, EmbeddingError> {
    debug!(component, "No GPU features enabled, using CPU");
    Ok(Device::Cpu)
}
