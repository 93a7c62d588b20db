//! Recipe store instantiation: filters, sort keys and recommendation
//! generation.

use std::cmp::Ordering;

use crate::gateway::EntityGateway;
use crate::insights::{match_recipes, RecipeMatch};
use crate::models::{Difficulty, Ingredient, MealType, Recipe};

use super::collection::CollectionStore;
use super::view::{
    compare_f64, compare_str, eq_ignore_case, search_matches, tags_match, FilterSpec, SortKey,
};

/// Live recipe collection for one user.
pub type RecipeStore<G> = CollectionStore<Recipe, G, RecipeFilters, RecipeSortKey>;

/// Filter configuration for the recipe browser.
///
/// Archived recipes are hidden unless `include_archived` is set; every
/// other dimension is inactive at its `Default` sentinel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipeFilters {
    /// Substring match against title, description and cuisine.
    pub search: String,
    pub difficulty: Option<Difficulty>,
    /// Exact cuisine match, case-insensitive. Empty string is inactive.
    pub cuisine: String,
    pub meal_type: Option<MealType>,
    /// Total minutes (prep + cook + rest) at most this.
    pub max_total_time: Option<i32>,
    pub tags: Vec<String>,
    pub dietary: Vec<String>,
    pub favorites_only: bool,
    pub include_archived: bool,
}

impl FilterSpec<Recipe> for RecipeFilters {
    fn matches(&self, item: &Recipe) -> bool {
        if item.archived && !self.include_archived {
            return false;
        }
        if !search_matches(
            &self.search,
            &[&item.title, &item.description, &item.cuisine],
        ) {
            return false;
        }
        if let Some(difficulty) = self.difficulty {
            if item.difficulty != difficulty {
                return false;
            }
        }
        if !self.cuisine.is_empty() && !eq_ignore_case(&item.cuisine, &self.cuisine) {
            return false;
        }
        if let Some(meal_type) = self.meal_type {
            if !item.meal_types.contains(&meal_type) {
                return false;
            }
        }
        if let Some(max) = self.max_total_time {
            if item.total_time() > max {
                return false;
            }
        }
        if !tags_match(&self.tags, &item.tags) {
            return false;
        }
        if !tags_match(&self.dietary, &item.dietary) {
            return false;
        }
        if self.favorites_only && !item.favorite {
            return false;
        }
        true
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RecipeSortKey {
    #[default]
    Title,
    Difficulty,
    TotalTime,
    Rating,
    CreatedAt,
}

impl SortKey<Recipe> for RecipeSortKey {
    fn compare(&self, a: &Recipe, b: &Recipe) -> Ordering {
        match self {
            RecipeSortKey::Title => compare_str(&a.title, &b.title),
            RecipeSortKey::Difficulty => a.difficulty.cmp(&b.difficulty),
            RecipeSortKey::TotalTime => a.total_time().cmp(&b.total_time()),
            RecipeSortKey::Rating => compare_f64(a.rating, b.rating),
            RecipeSortKey::CreatedAt => a.created_at.cmp(&b.created_at),
        }
    }
}

impl<G: EntityGateway<Recipe>> RecipeStore<G> {
    /// Scores every mirrored recipe against the user's pantry.
    /// Pure derivation; see [`match_recipes`] for the scoring rules.
    pub fn recommendations(&self, pantry: &[Ingredient]) -> Vec<RecipeMatch> {
        match_recipes(&self.items(), pantry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Entity, RecipeDraft};

    fn make(title: &str) -> Recipe {
        Recipe::from_draft(format!("id-{}", title), RecipeDraft::new(title))
    }

    #[test]
    fn test_archived_hidden_by_default() {
        let mut recipe = make("Old stew");
        recipe.archived = true;

        let filters = RecipeFilters::default();
        assert!(!filters.matches(&recipe));

        let filters = RecipeFilters {
            include_archived: true,
            ..Default::default()
        };
        assert!(filters.matches(&recipe));
    }

    #[test]
    fn test_max_total_time() {
        let mut recipe = make("Quick salad");
        recipe.prep_time = 10;
        recipe.cook_time = 15;

        let filters = RecipeFilters {
            max_total_time: Some(30),
            ..Default::default()
        };
        assert!(filters.matches(&recipe));

        recipe.rest_time = 10;
        assert!(!filters.matches(&recipe));
    }

    #[test]
    fn test_meal_type_constraint() {
        let mut recipe = make("Pancakes");
        recipe.meal_types = vec![MealType::Breakfast];

        let filters = RecipeFilters {
            meal_type: Some(MealType::Dinner),
            ..Default::default()
        };
        assert!(!filters.matches(&recipe));

        let filters = RecipeFilters {
            meal_type: Some(MealType::Breakfast),
            ..Default::default()
        };
        assert!(filters.matches(&recipe));
    }

    #[test]
    fn test_favorites_only() {
        let recipe = make("Soup");
        let filters = RecipeFilters {
            favorites_only: true,
            ..Default::default()
        };
        assert!(!filters.matches(&recipe));
    }

    #[test]
    fn test_sort_by_difficulty() {
        let mut easy = make("a");
        easy.difficulty = Difficulty::Easy;
        let mut hard = make("b");
        hard.difficulty = Difficulty::Hard;
        assert_eq!(
            RecipeSortKey::Difficulty.compare(&easy, &hard),
            Ordering::Less
        );
    }
}
