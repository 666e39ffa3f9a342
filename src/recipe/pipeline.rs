use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::constants::DecodingParams;
use crate::generation::{ModelTier, TextGenerator};

use super::fallback::FallbackSource;
use super::prompt::{build_prompt, canonicalize_ingredients, extract_recipe};
use super::types::{GenerationAttempt, GenerationOutcome, RecipeSource};
use super::validator::assess;

/// Error reported when validation rejects the text and fallback is disabled.
pub const INVALID_RECIPE_ERROR: &str = "Generated invalid recipe";

/// Prompt, generate, validate, and fall back when the output cannot be trusted.
///
/// Synchronous and lock-free; callers that share one model serialise calls themselves.
pub struct GuardedPipeline {
    generator: Arc<dyn TextGenerator>,
    fallback: Arc<dyn FallbackSource>,
    params: DecodingParams,
}

impl std::fmt::Debug for GuardedPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuardedPipeline")
            .field("tier", &self.generator.tier())
            .field("params", &self.params)
            .finish()
    }
}

impl GuardedPipeline {
    pub fn new(generator: Arc<dyn TextGenerator>, fallback: Arc<dyn FallbackSource>) -> Self {
        Self {
            generator,
            fallback,
            params: DecodingParams::default(),
        }
    }

    pub fn with_params(mut self, params: DecodingParams) -> Self {
        self.params = params;
        self
    }

    pub fn params(&self) -> &DecodingParams {
        &self.params
    }

    pub fn generator_tier(&self) -> ModelTier {
        self.generator.tier()
    }

    /// Never returns an error: every failure path ends in a fallback recipe or a failed
    /// [`GenerationOutcome`].
    pub fn generate_recipe(&self, raw_ingredients: &str, use_fallback: bool) -> GenerationOutcome {
        let ingredients_text = canonicalize_ingredients(raw_ingredients);
        let prompt = build_prompt(&ingredients_text);

        info!(ingredients = %ingredients_text, "Generating recipe");

        let attempt = self.attempt(&prompt);
        debug!(
            status = attempt.debug_status(),
            accepted = attempt.is_accepted(),
            tier = %self.generator.tier(),
            "Generation attempt finished"
        );
        self.resolve(attempt, ingredients_text, use_fallback)
    }

    fn attempt(&self, prompt: &str) -> GenerationAttempt {
        let decoded = match self.generator.generate(prompt, &self.params) {
            Ok(decoded) => decoded,
            Err(e) => {
                return GenerationAttempt::CollaboratorFailure {
                    detail: e.to_string(),
                };
            }
        };

        let recipe = extract_recipe(&decoded);
        let verdict = assess(recipe);
        match verdict.reason() {
            None => GenerationAttempt::Accepted(recipe.to_string()),
            Some(reason) => GenerationAttempt::Rejected { reason },
        }
    }

    fn resolve(
        &self,
        attempt: GenerationAttempt,
        ingredients_text: String,
        use_fallback: bool,
    ) -> GenerationOutcome {
        let failure = match attempt {
            GenerationAttempt::Accepted(recipe) => {
                return GenerationOutcome::generated(ingredients_text, recipe);
            }
            GenerationAttempt::Rejected { reason } => {
                info!(%reason, use_fallback, "Generated text is not a recipe");
                INVALID_RECIPE_ERROR.to_string()
            }
            GenerationAttempt::CollaboratorFailure { detail } => {
                warn!(error = %detail, use_fallback, "Recipe generation failed");
                detail
            }
        };

        if !use_fallback {
            return GenerationOutcome::failed(ingredients_text, failure, RecipeSource::Generated);
        }

        match self.fallback.lookup(&ingredients_text) {
            Ok(recipe) => {
                info!(title = %recipe.title, "Serving fallback recipe");
                GenerationOutcome::fallback(ingredients_text, recipe.recipe)
            }
            Err(e) => {
                warn!(error = %e, "Fallback lookup failed");
                GenerationOutcome::failed(ingredients_text, e.to_string(), RecipeSource::Fallback)
            }
        }
    }
}
