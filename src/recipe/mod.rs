//! Guarded recipe generation.
//!
//! The raw ingredient string is canonicalised and wrapped in the instruction prompt, the
//! generator's output is checked by the [`validator`], and anything that fails (a rejected
//! text or a generator error) is replaced by a [`FallbackSource`] recipe unless the caller
//! disabled fallback.

pub mod fallback;
pub mod pipeline;
pub mod prompt;
pub mod types;
pub mod validator;


pub use fallback::{FallbackError, FallbackRecipe, FallbackSource, KeywordFallback};
pub use pipeline::{GuardedPipeline, INVALID_RECIPE_ERROR};
pub use prompt::{build_prompt, canonicalize_ingredients, extract_recipe};
pub use types::{GenerationAttempt, GenerationOutcome, RecipeSource};
pub use validator::{RecipeVerdict, assess, is_valid_recipe};
