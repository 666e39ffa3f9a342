//! Scripted generator for tests.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::constants::DecodingParams;

use super::error::GenerationError;
use super::{ModelTier, TextGenerator};

#[derive(Debug, Clone)]
enum MockReply {
    Text(String),
    Fail(String),
    Echo,
}

/// Generator returning a fixed reply, an error, or the prompt itself.
///
/// Clones share call history, so a test can keep one handle while the pipeline owns another.
#[derive(Debug, Clone)]
pub struct MockGenerator {
    reply: MockReply,
    tier: ModelTier,
    delay: Option<Duration>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl MockGenerator {
    fn with_reply(reply: MockReply) -> Self {
        Self {
            reply,
            tier: ModelTier::Adapter,
            delay: None,
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Replies with `prompt + completion`, the way a decoder returns the whole sequence.
    pub fn completing(completion: impl Into<String>) -> Self {
        Self::with_reply(MockReply::Text(completion.into()))
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_reply(MockReply::Fail(message.into()))
    }

    pub fn echo() -> Self {
        Self::with_reply(MockReply::Echo)
    }

    pub fn with_tier(mut self, tier: ModelTier) -> Self {
        self.tier = tier;
        self
    }

    /// Blocks the calling thread for `delay` before replying.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

impl TextGenerator for MockGenerator {
    fn generate(&self, prompt: &str, _params: &DecodingParams) -> Result<String, GenerationError> {
        self.prompts.lock().push(prompt.to_string());

        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }

        match &self.reply {
            MockReply::Text(completion) => Ok(format!("{prompt} {completion}")),
            MockReply::Fail(message) => Err(GenerationError::InferenceFailed {
                reason: message.clone(),
            }),
            MockReply::Echo => Ok(prompt.to_string()),
        }
    }

    fn tier(&self) -> ModelTier {
        self.tier
    }
}
