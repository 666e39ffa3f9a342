use crate::constants::INSTRUCTION_DELIMITER;

/// Splits on commas, trims each token and rejoins with `", "`.
///
/// Empty tokens are kept: `"egg,,onion"` becomes `"egg, , onion"`.
pub fn canonicalize_ingredients(raw: &str) -> String {
    raw.split(',').map(str::trim).collect::<Vec<_>>().join(", ")
}

/// Instruction prompt the recipe model was fine-tuned on.
pub fn build_prompt(canonical_ingredients: &str) -> String {
    format!(
        "<s>[INST] Suggest a recipe using the following ingredients:\n{canonical_ingredients} {INSTRUCTION_DELIMITER}"
    )
}

/// Text after the first `[/INST]`, trimmed; the whole text trimmed if the marker is absent.
pub fn extract_recipe(decoded: &str) -> &str {
    match decoded.split_once(INSTRUCTION_DELIMITER) {
        Some((_, completion)) => completion.trim(),
        None => decoded.trim(),
    }
}
