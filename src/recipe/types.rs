use serde::Serialize;

use crate::generation::ModelTier;

/// Which path produced a recipe (or attempted to).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecipeSource {
    Generated,
    Fallback,
}

impl RecipeSource {
    /// Label reported to API clients.
    pub fn generated_by(&self, tier: ModelTier) -> &'static str {
        match (self, tier) {
            (RecipeSource::Fallback, _) => "keyword-fallback",
            (RecipeSource::Generated, ModelTier::Adapter) => "recipe-bot-lora",
            (RecipeSource::Generated, ModelTier::Base) => "recipe-bot-base",
            (RecipeSource::Generated, ModelTier::Stub) => "recipe-bot-stub",
        }
    }
}

/// Result of one generation request.
///
/// A successful outcome always carries a recipe and no error; a failed one carries an error
/// and no recipe. The constructors are the only way to build one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationOutcome {
    success: bool,
    ingredients_text: String,
    recipe: Option<String>,
    error: Option<String>,
    source: RecipeSource,
}

impl GenerationOutcome {
    pub fn generated(ingredients_text: String, recipe: String) -> Self {
        Self::succeeded(ingredients_text, recipe, RecipeSource::Generated)
    }

    pub fn fallback(ingredients_text: String, recipe: String) -> Self {
        Self::succeeded(ingredients_text, recipe, RecipeSource::Fallback)
    }

    pub fn failed(ingredients_text: String, error: String, source: RecipeSource) -> Self {
        Self {
            success: false,
            ingredients_text,
            recipe: None,
            error: Some(error),
            source,
        }
    }

    fn succeeded(ingredients_text: String, recipe: String, source: RecipeSource) -> Self {
        Self {
            success: true,
            ingredients_text,
            recipe: Some(recipe),
            error: None,
            source,
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Canonical `", "`-joined ingredient list the prompt was built from.
    pub fn ingredients_text(&self) -> &str {
        &self.ingredients_text
    }

    pub fn recipe(&self) -> Option<&str> {
        self.recipe.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn source(&self) -> RecipeSource {
        self.source
    }

    /// `Ok(recipe)` on success, `Err(error)` otherwise.
    pub fn into_result(self) -> Result<String, String> {
        match self.recipe {
            Some(recipe) if self.success => Ok(recipe),
            _ => Err(self
                .error
                .unwrap_or_else(|| "generation produced no recipe".to_string())),
        }
    }
}

/// What came back from the generation collaborator, before the fallback decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationAttempt {
    /// Passed validation.
    Accepted(String),
    /// Generated, but the validator rejected it.
    Rejected { reason: String },
    /// The generator itself failed.
    CollaboratorFailure { detail: String },
}

impl GenerationAttempt {
    pub fn is_accepted(&self) -> bool {
        matches!(self, GenerationAttempt::Accepted(_))
    }

    pub fn debug_status(&self) -> &'static str {
        match self {
            GenerationAttempt::Accepted(_) => "accepted",
            GenerationAttempt::Rejected { .. } => "rejected",
            GenerationAttempt::CollaboratorFailure { .. } => "collaborator_failure",
        }
    }
}
