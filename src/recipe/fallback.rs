//! Canned recipes served when generation cannot be trusted.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum FallbackError {
    #[error("no ingredients to look up")]
    NoIngredients,

    #[error("failed to read fallback recipes from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid fallback recipes in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid fallback recipe store: {reason}")]
    InvalidStore { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackRecipe {
    pub title: String,
    pub keywords: Vec<String>,
    pub recipe: String,
}

/// Deterministic recipe lookup by ingredient list.
pub trait FallbackSource: Send + Sync {
    /// `ingredients` is the canonical comma-separated list.
    fn lookup(&self, ingredients: &str) -> Result<FallbackRecipe, FallbackError>;
}

#[derive(Debug, Deserialize)]
struct RecipeDocument {
    recipes: Vec<FallbackRecipe>,
}

/// Keyword-indexed store; the recipe sharing the most keywords with the ingredients wins.
#[derive(Debug, Clone)]
pub struct KeywordFallback {
    recipes: Vec<FallbackRecipe>,
}

impl Default for KeywordFallback {
    fn default() -> Self {
        Self::builtin()
    }
}

impl KeywordFallback {
    pub fn builtin() -> Self {
        let recipes = BUILTIN_RECIPES
            .iter()
            .map(|(title, keywords, recipe)| FallbackRecipe {
                title: title.to_string(),
                keywords: keywords.iter().map(|k| k.to_string()).collect(),
                recipe: recipe.to_string(),
            })
            .collect();
        Self { recipes }
    }

    /// Keywords are lower-cased and trimmed; every recipe needs a title, a body and at least
    /// one keyword.
    pub fn new(recipes: Vec<FallbackRecipe>) -> Result<Self, FallbackError> {
        if recipes.is_empty() {
            return Err(FallbackError::InvalidStore {
                reason: "no recipes".to_string(),
            });
        }

        let recipes = recipes
            .into_iter()
            .map(|mut r| {
                r.keywords = r
                    .keywords
                    .iter()
                    .map(|k| k.trim().to_lowercase())
                    .filter(|k| !k.is_empty())
                    .collect();
                if r.title.trim().is_empty() || r.recipe.trim().is_empty() {
                    return Err(FallbackError::InvalidStore {
                        reason: "recipe with empty title or body".to_string(),
                    });
                }
                if r.keywords.is_empty() {
                    return Err(FallbackError::InvalidStore {
                        reason: format!("recipe {:?} has no keywords", r.title),
                    });
                }
                Ok(r)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { recipes })
    }

    /// Reads `{"recipes": [{"title", "keywords", "recipe"}]}`, replacing the built-ins.
    pub fn from_file(path: &Path) -> Result<Self, FallbackError> {
        let content = std::fs::read_to_string(path).map_err(|source| FallbackError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let document: RecipeDocument =
            serde_json::from_str(&content).map_err(|source| FallbackError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        let store = Self::new(document.recipes)?;
        info!(path = %path.display(), count = store.len(), "Loaded fallback recipes");
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    pub fn recipes(&self) -> &[FallbackRecipe] {
        &self.recipes
    }
}

fn ingredient_words(ingredients: &[String]) -> Vec<&str> {
    ingredients
        .iter()
        .flat_map(|i| i.split(|c: char| !c.is_alphanumeric()))
        .filter(|w| !w.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn keyword_matches(keyword: &str, word: &str) -> bool {
    word == keyword
        || word
            .strip_prefix(keyword)
            .is_some_and(|rest| rest == "s" || rest == "es")
}

/// Number of distinct keywords matched, each ingredient word counting for at most one keyword.
///
/// "oats" matches both "oat" and "oats"; as a single word it still scores 1.
fn keyword_score(keywords: &[String], words: &[&str]) -> usize {
    let mut distinct: Vec<&str> = Vec::with_capacity(keywords.len());
    for keyword in keywords {
        if !distinct.contains(&keyword.as_str()) {
            distinct.push(keyword);
        }
    }

    let mut owner: Vec<Option<usize>> = vec![None; words.len()];
    let mut score = 0;
    for k in 0..distinct.len() {
        let mut visited = vec![false; words.len()];
        if assign_word(k, &distinct, words, &mut owner, &mut visited) {
            score += 1;
        }
    }
    score
}

/// Augmenting-path step: finds a word for keyword `k`, moving earlier assignments if needed.
fn assign_word(
    k: usize,
    keywords: &[&str],
    words: &[&str],
    owner: &mut [Option<usize>],
    visited: &mut [bool],
) -> bool {
    for (w, word) in words.iter().enumerate() {
        if visited[w] || !keyword_matches(keywords[k], word) {
            continue;
        }
        visited[w] = true;

        let current = owner[w];
        let free = match current {
            None => true,
            Some(other) => assign_word(other, keywords, words, owner, visited),
        };
        if free {
            owner[w] = Some(k);
            return true;
        }
    }
    false
}

fn generic_recipe(ingredients: &[String]) -> FallbackRecipe {
    let list = ingredients.join(", ");
    let items: String = ingredients.iter().map(|i| format!("- {i}\n")).collect();

    FallbackRecipe {
        title: "Simple Pan Skillet".to_string(),
        keywords: Vec::new(),
        recipe: format!(
            "Simple Pan Skillet\n\n\
             Ingredients:\n{items}- 1 tbsp oil\n- Salt and pepper to taste\n\n\
             Instructions:\n\
             1. Heat the oil in a wide pan over medium heat.\n\
             2. Add the {list} and cook, stirring often, until tender and lightly browned.\n\
             3. Season with salt and pepper and mix well.\n\
             4. Serve hot."
        ),
    }
}

impl FallbackSource for KeywordFallback {
    fn lookup(&self, ingredients: &str) -> Result<FallbackRecipe, FallbackError> {
        let items: Vec<String> = ingredients
            .split(',')
            .map(|i| i.trim().to_lowercase())
            .filter(|i| !i.is_empty())
            .collect();
        if items.is_empty() {
            return Err(FallbackError::NoIngredients);
        }

        let words = ingredient_words(&items);

        let mut best: Option<(usize, &FallbackRecipe)> = None;
        for recipe in &self.recipes {
            let score = keyword_score(&recipe.keywords, &words);
            // Strictly greater, so the earliest recipe keeps a tie.
            if score > 0 && best.is_none_or(|(top, _)| score > top) {
                best = Some((score, recipe));
            }
        }

        match best {
            Some((score, recipe)) => {
                debug!(title = %recipe.title, score, "Matched fallback recipe");
                Ok(recipe.clone())
            }
            None => {
                debug!(ingredients = items.len(), "No keyword match, using generic recipe");
                Ok(generic_recipe(&items))
            }
        }
    }
}

const BUILTIN_RECIPES: &[(&str, &[&str], &str)] = &[
    (
        "Chicken Fried Rice",
        &["chicken", "rice"],
        "Chicken Fried Rice\n\n\
         Ingredients:\n- 2 cups cooked rice\n- 1 chicken breast, diced\n- 2 eggs\n\
         - 1 onion, chopped\n- 2 tbsp soy sauce\n- 1 tbsp oil\n\n\
         Instructions:\n\
         1. Heat the oil in a wok and fry the chicken until cooked through.\n\
         2. Add the onion and stir for two minutes.\n\
         3. Push everything aside, scramble the eggs, then mix in the rice.\n\
         4. Add the soy sauce, stir well and serve hot.",
    ),
    (
        "Masala Omelette",
        &["egg", "onion", "tomato", "chili"],
        "Masala Omelette\n\n\
         Ingredients:\n- 3 eggs\n- 1 small onion, finely chopped\n- 1 tomato, chopped\n\
         - 1 green chili, minced\n- Salt to taste\n- 1 tsp butter\n\n\
         Instructions:\n\
         1. Beat the eggs with salt, then mix in the onion, tomato and chili.\n\
         2. Heat the butter in a pan over medium heat.\n\
         3. Pour in the eggs and cook until the edges set, then fold.\n\
         4. Serve warm with toast.",
    ),
    (
        "Tomato Garlic Pasta",
        &["pasta", "tomato", "garlic", "basil", "spaghetti"],
        "Tomato Garlic Pasta\n\n\
         Ingredients:\n- 200 g pasta\n- 4 tomatoes, chopped\n- 3 garlic cloves, sliced\n\
         - 2 tbsp olive oil\n- A handful of basil\n- Salt to taste\n\n\
         Instructions:\n\
         1. Boil the pasta in salted water until al dente, then drain.\n\
         2. Heat the olive oil and gently fry the garlic.\n\
         3. Add the tomatoes and cook until saucy.\n\
         4. Stir in the pasta and basil and serve.",
    ),
    (
        "Jeera Aloo",
        &["potato", "cumin", "aloo"],
        "Jeera Aloo\n\n\
         Ingredients:\n- 4 potatoes, boiled and cubed\n- 1 tsp cumin seeds\n\
         - 1/2 tsp turmeric\n- 1 tsp chili powder\n- 2 tbsp oil\n- Coriander leaves\n\n\
         Instructions:\n\
         1. Heat the oil and add the cumin seeds until they sizzle.\n\
         2. Add the potatoes with turmeric and chili powder.\n\
         3. Stir and cook for 5 to 7 minutes until golden.\n\
         4. Mix in the coriander and serve.",
    ),
    (
        "Paneer Bhurji",
        &["paneer", "capsicum", "peas"],
        "Paneer Bhurji\n\n\
         Ingredients:\n- 200 g paneer, crumbled\n- 1 onion, chopped\n- 1 capsicum, diced\n\
         - 1/2 cup peas\n- 1/2 tsp garam masala\n- 1 tbsp ghee\n\n\
         Instructions:\n\
         1. Heat the ghee and fry the onion until soft.\n\
         2. Add the capsicum and peas and cook for three minutes.\n\
         3. Mix in the paneer and garam masala and stir for two minutes.\n\
         4. Serve with roti or bread.",
    ),
    (
        "Simple Dal",
        &["lentil", "dal", "moong", "masoor"],
        "Simple Dal\n\n\
         Ingredients:\n- 1 cup lentils, rinsed\n- 3 cups water\n- 1/2 tsp turmeric\n\
         - 1 tsp cumin seeds\n- 2 garlic cloves\n- 1 tbsp ghee\n- Salt to taste\n\n\
         Instructions:\n\
         1. Boil the lentils with water and turmeric until soft.\n\
         2. Heat the ghee, add cumin and garlic and fry until fragrant.\n\
         3. Pour the tempering over the dal and stir.\n\
         4. Season with salt and serve with rice.",
    ),
    (
        "Vegetable Stir Fry",
        &["carrot", "broccoli", "cabbage", "beans", "vegetable", "mushroom"],
        "Vegetable Stir Fry\n\n\
         Ingredients:\n- 2 cups mixed vegetables, sliced\n- 2 garlic cloves\n\
         - 1 tbsp soy sauce\n- 1 tsp sesame oil\n- 1 tbsp oil\n\n\
         Instructions:\n\
         1. Heat the oil in a wok over high heat.\n\
         2. Add the garlic and the firmest vegetables first, then the rest.\n\
         3. Stir fry for 4 to 5 minutes until crisp-tender.\n\
         4. Mix in the soy sauce and sesame oil and serve immediately.",
    ),
    (
        "Banana Oat Pancakes",
        &["banana", "oat", "milk"],
        "Banana Oat Pancakes\n\n\
         Ingredients:\n- 1 ripe banana\n- 1 cup oats\n- 1 egg\n- 1/2 cup milk\n\
         - 1 tsp baking powder\n- Butter for the pan\n\n\
         Instructions:\n\
         1. Blend the banana, oats, egg, milk and baking powder into a batter.\n\
         2. Heat a little butter in a pan.\n\
         3. Add spoonfuls of batter and cook until bubbles form, then flip.\n\
         4. Serve with honey or fruit.",
    ),
];
