//! Cross-cutting, shared constants.
//!
//! Scoring weights and decoding hyperparameters live here as named values so they can be
//! tuned without touching ranking or pipeline logic. Prefer [`ScoreWeights`] and
//! [`DecodingParams`] at runtime; the bare constants are their defaults.

/// Weight of the embedding cosine similarity in the combined score.
pub const SEMANTIC_WEIGHT: f32 = 0.6;

/// Weight of the lexical ratio in the combined score.
pub const LEXICAL_WEIGHT: f32 = 0.4;

/// Number of matches returned when the caller does not ask for a specific count.
pub const DEFAULT_TOP_K: usize = 5;

/// Decimal digits kept on presented scores.
pub const SCORE_DECIMALS: i32 = 3;

/// Prompt tokens kept before generation (longer prompts are truncated).
pub const PROMPT_MAX_TOKENS: usize = 512;

pub const DEFAULT_MAX_NEW_TOKENS: usize = 150;
pub const DEFAULT_MIN_NEW_TOKENS: usize = 50;
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_TOP_P: f64 = 0.9;
pub const DEFAULT_SAMPLING_TOP_K: usize = 50;
pub const DEFAULT_REPETITION_PENALTY: f32 = 1.2;

/// End-of-sequence token of the Llama-family tokenizer.
pub const DEFAULT_EOS_TOKEN: &str = "</s>";

/// Generated text shorter than this (in characters) is never a recipe.
pub const MIN_RECIPE_CHARS: usize = 100;

/// Distinct cooking actions a recipe must mention.
pub const MIN_COOKING_ACTIONS: usize = 2;

/// Cooking actions looked for (substring, case-insensitive).
pub const COOKING_ACTIONS: [&str; 9] = [
    "cook", "heat", "add", "mix", "stir", "serve", "bake", "fry", "boil",
];

/// Closes the instruction block in the prompt; generated text follows it.
pub const INSTRUCTION_DELIMITER: &str = "[/INST]";

/// Name of the persisted candidate-name document inside the data directory.
pub const NAMES_FILENAME: &str = "names.json";

/// Weights combining the semantic and lexical signals.
///
/// The combined score stays in `[0, 1]` as long as the weights are non-negative and sum to 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreWeights {
    pub semantic: f32,
    pub lexical: f32,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            semantic: SEMANTIC_WEIGHT,
            lexical: LEXICAL_WEIGHT,
        }
    }
}

impl ScoreWeights {
    pub fn new(semantic: f32, lexical: f32) -> Self {
        Self { semantic, lexical }
    }

    /// Returns an error message if the weights are negative or do not sum to 1.
    pub fn validate(&self) -> Result<(), String> {
        if self.semantic < 0.0 || self.lexical < 0.0 {
            return Err(format!(
                "weights must be non-negative, got semantic={} lexical={}",
                self.semantic, self.lexical
            ));
        }
        let sum = self.semantic + self.lexical;
        if (sum - 1.0).abs() > 1e-6 {
            return Err(format!("weights must sum to 1.0, got {}", sum));
        }
        Ok(())
    }

    #[inline]
    pub fn combine(&self, semantic: f32, lexical: f32) -> f32 {
        self.semantic * semantic + self.lexical * lexical
    }
}

/// Decoding parameters handed to the generation model.
///
/// These are part of the generation contract: sampling is always on, the seed is never fixed,
/// and decoding stops at the end token once `min_new_tokens` have been produced.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodingParams {
    pub max_new_tokens: usize,
    pub min_new_tokens: usize,
    pub temperature: f64,
    pub top_p: f64,
    pub top_k: usize,
    pub repetition_penalty: f32,
    pub prompt_max_tokens: usize,
}

impl Default for DecodingParams {
    fn default() -> Self {
        Self {
            max_new_tokens: DEFAULT_MAX_NEW_TOKENS,
            min_new_tokens: DEFAULT_MIN_NEW_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            top_p: DEFAULT_TOP_P,
            top_k: DEFAULT_SAMPLING_TOP_K,
            repetition_penalty: DEFAULT_REPETITION_PENALTY,
            prompt_max_tokens: PROMPT_MAX_TOKENS,
        }
    }
}

impl DecodingParams {
    pub fn validate(&self) -> Result<(), String> {
        if self.max_new_tokens == 0 {
            return Err("max_new_tokens must be greater than 0".to_string());
        }
        if self.min_new_tokens > self.max_new_tokens {
            return Err(format!(
                "min_new_tokens ({}) exceeds max_new_tokens ({})",
                self.min_new_tokens, self.max_new_tokens
            ));
        }
        if self.temperature <= 0.0 {
            return Err(format!(
                "temperature must be positive, got {}",
                self.temperature
            ));
        }
        if !(0.0..=1.0).contains(&self.top_p) || self.top_p == 0.0 {
            return Err(format!("top_p must be in (0, 1], got {}", self.top_p));
        }
        if self.top_k == 0 {
            return Err("top_k must be greater than 0".to_string());
        }
        if self.repetition_penalty <= 0.0 {
            return Err(format!(
                "repetition_penalty must be positive, got {}",
                self.repetition_penalty
            ));
        }
        Ok(())
    }
}

/// Rounds a score to [`SCORE_DECIMALS`] digits.
#[inline]
pub fn round_score(value: f32) -> f32 {
    let factor = 10f32.powi(SCORE_DECIMALS);
    (value * factor).round() / factor
}
