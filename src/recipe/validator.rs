//! Heuristic check that generated text reads like a recipe.

use crate::constants::{COOKING_ACTIONS, MIN_COOKING_ACTIONS, MIN_RECIPE_CHARS};

/// Outcome of [`assess`], with the first failing rule when the text is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecipeVerdict {
    Valid,
    /// Fewer than [`MIN_RECIPE_CHARS`] characters.
    TooShort { chars: usize },
    /// Mentions neither ingredients nor instructions.
    MissingSections,
    /// Fewer than [`MIN_COOKING_ACTIONS`] distinct cooking actions.
    TooFewActions { found: usize },
}

impl RecipeVerdict {
    pub fn is_valid(&self) -> bool {
        matches!(self, RecipeVerdict::Valid)
    }

    pub fn reason(&self) -> Option<String> {
        match self {
            RecipeVerdict::Valid => None,
            RecipeVerdict::TooShort { chars } => Some(format!(
                "text too short ({chars} < {MIN_RECIPE_CHARS} characters)"
            )),
            RecipeVerdict::MissingSections => {
                Some("no ingredients or instructions section".to_string())
            }
            RecipeVerdict::TooFewActions { found } => Some(format!(
                "only {found} cooking action(s), need {MIN_COOKING_ACTIONS}"
            )),
        }
    }
}

impl std::fmt::Display for RecipeVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.reason() {
            None => f.write_str("valid recipe"),
            Some(reason) => f.write_str(&reason),
        }
    }
}

/// Length is counted in characters. Section and action words match as case-insensitive
/// substrings, so "added" counts as "add" and "ingredients" as "ingredient".
pub fn assess(text: &str) -> RecipeVerdict {
    let chars = text.chars().count();
    if chars < MIN_RECIPE_CHARS {
        return RecipeVerdict::TooShort { chars };
    }

    let lower = text.to_lowercase();

    if !lower.contains("ingredient") && !lower.contains("instruction") {
        return RecipeVerdict::MissingSections;
    }

    let found = COOKING_ACTIONS
        .iter()
        .filter(|action| lower.contains(*action))
        .count();
    if found < MIN_COOKING_ACTIONS {
        return RecipeVerdict::TooFewActions { found };
    }

    RecipeVerdict::Valid
}

pub fn is_valid_recipe(text: &str) -> bool {
    assess(text).is_valid()
}
