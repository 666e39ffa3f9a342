use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use crate::constants::DEFAULT_TOP_K;
use crate::generation::ModelTier;
use crate::matching::HybridRanker;
use crate::recipe::GuardedPipeline;

use super::DEFAULT_REQUEST_TIMEOUT;

#[derive(Clone)]
pub struct AppState {
    pub ranker: Arc<HybridRanker>,

    pub pipeline: Arc<GuardedPipeline>,

    /// Held for the whole of a generation call, so at most one runs at a time.
    pub generation_gate: Arc<Mutex<()>>,

    pub request_timeout: Duration,

    pub default_top_k: usize,
}

impl AppState {
    pub fn new(ranker: Arc<HybridRanker>, pipeline: Arc<GuardedPipeline>) -> Self {
        Self {
            ranker,
            pipeline,
            generation_gate: Arc::new(Mutex::new(())),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            default_top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_default_top_k(mut self, top_k: usize) -> Self {
        self.default_top_k = top_k;
        self
    }

    pub fn generator_tier(&self) -> ModelTier {
        self.pipeline.generator_tier()
    }
}
