//! Recipe-to-pantry matching and recommendation rules.

use crate::models::{Ingredient, Recipe};
use crate::store::eq_ignore_case;

use super::{
    DismissedSet, Suggestion, SuggestionKind, HIGH_AVAILABILITY_THRESHOLD, QUICK_RECIPE_MINUTES,
};

/// How well a recipe matches the user's pantry.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeMatch {
    pub recipe_id: String,
    /// `round(available / total * 100)`.
    pub match_percentage: u32,
    /// Recipe ingredient names the user lacks, or holds in
    /// insufficient quantity.
    pub missing: Vec<String>,
}

/// Scores every recipe against the pantry.
///
/// An ingredient counts as available when the pantry holds an item with
/// the exact same name (case-insensitive) in at least the required
/// quantity. Units are not converted; same-named items are assumed to
/// share a unit.
pub fn match_recipes(recipes: &[Recipe], pantry: &[Ingredient]) -> Vec<RecipeMatch> {
    recipes
        .iter()
        .map(|recipe| {
            let total = recipe.ingredients.len();
            let mut missing = Vec::new();

            for needed in &recipe.ingredients {
                let held = pantry
                    .iter()
                    .find(|item| eq_ignore_case(&item.name, &needed.name));
                match held {
                    Some(item) if item.quantity >= needed.amount => {}
                    _ => missing.push(needed.name.clone()),
                }
            }

            let available = total - missing.len();
            let match_percentage = if total == 0 {
                100
            } else {
                (available as f64 / total as f64 * 100.0).round() as u32
            };

            RecipeMatch {
                recipe_id: recipe.id.clone(),
                match_percentage,
                missing,
            }
        })
        .collect()
}

/// Derives recipe suggestions from the fixed rule table:
/// high pantry availability and quick total time.
pub fn recipe_insights(
    recipes: &[Recipe],
    pantry: &[Ingredient],
    dismissed: &DismissedSet,
) -> Vec<Suggestion> {
    let matches = match_recipes(recipes, pantry);
    let mut suggestions = Vec::new();

    for (recipe, scored) in recipes.iter().zip(&matches) {
        if recipe.archived {
            continue;
        }

        if !recipe.ingredients.is_empty()
            && scored.match_percentage >= HIGH_AVAILABILITY_THRESHOLD
        {
            let suggestion = Suggestion::new(
                SuggestionKind::HighAvailability,
                &recipe.id,
                format!(
                    "You have {}% of the ingredients for {}",
                    scored.match_percentage, recipe.title
                ),
            );
            if !dismissed.is_dismissed(&suggestion.id) {
                suggestions.push(suggestion);
            }
        }

        let total_time = recipe.total_time();
        if total_time > 0 && total_time <= QUICK_RECIPE_MINUTES {
            let suggestion = Suggestion::new(
                SuggestionKind::QuickRecipe,
                &recipe.id,
                format!("{} is ready in {} minutes", recipe.title, total_time),
            );
            if !dismissed.is_dismissed(&suggestion.id) {
                suggestions.push(suggestion);
            }
        }
    }

    suggestions
}
