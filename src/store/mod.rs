//! Live collection stores: one generic mirror-and-derive utility,
//! instantiated per entity type.

mod collection;
mod ingredients;
mod meal_plans;
mod recipes;
mod shopping_lists;
mod view;

pub use collection::{CollectionStore, SyncPhase};
pub use ingredients::{IngredientFilters, IngredientSortKey, IngredientStore};
pub use meal_plans::{MealPlanFilters, MealPlanSortKey, MealPlanStore};
pub use recipes::{RecipeFilters, RecipeSortKey, RecipeStore};
pub use shopping_lists::{ShoppingListFilters, ShoppingListSortKey, ShoppingListStore};
pub use view::{
    compare_f64, compare_option, compare_str, eq_ignore_case, filter_and_sort, search_matches,
    tags_match, FilterSpec, SortDirection, SortKey, SortOptions,
};
