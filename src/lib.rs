//! Larder Core Library
//!
//! Live-synchronized collections for a meal planning app: entity models,
//! pluggable persistence gateways, filtering/sorting stores and a
//! rule-based suggestion engine.

pub mod config;
pub mod error;
pub mod gateway;
pub mod insights;
pub mod models;
pub mod store;

pub use config::{Config, ConfigError, ConfigSource, ConfigValue, PersistenceMode, RemoteConfig};
pub use error::{GatewayError, StoreError};
pub use gateway::{
    CollectionEvent, EntityGateway, InMemoryGateway, RemoteGateway, Subscription,
};
pub use insights::{
    ingredient_insights, match_recipes, meal_plan_insights, recipe_insights, DismissedSet,
    RecipeMatch, Suggestion, SuggestionKind,
};
pub use models::{
    Entity, Ingredient, IngredientDraft, IngredientPatch, MealPlan, MealPlanDraft, MealSlot,
    MealType, Recipe, RecipeDraft, RecipeIngredient, ShoppingList, ShoppingListDraft,
    ShoppingListItem, StorageLocation,
};
pub use store::{
    CollectionStore, IngredientFilters, IngredientSortKey, IngredientStore, MealPlanFilters,
    MealPlanStore, RecipeFilters, RecipeSortKey, RecipeStore, ShoppingListFilters,
    ShoppingListStore, SortDirection, SortOptions, SyncPhase,
};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
