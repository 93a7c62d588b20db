//! Entity models shared across the store and gateway layers.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;

mod ingredient;
mod meal_plan;
mod meal_type;
mod recipe;
mod shopping_list;

pub use ingredient::{Ingredient, IngredientDraft, IngredientPatch, StorageLocation};
pub use meal_plan::{
    generate_week_slots, saturday_of_week, slot_id, sunday_of_week, MealPlan, MealPlanDraft,
    MealPlanPatch, MealSlot,
};
pub use meal_type::MealType;
pub use recipe::{
    Difficulty, Nutrition, Recipe, RecipeDraft, RecipeIngredient, RecipePatch,
};
pub use shopping_list::{ShoppingList, ShoppingListDraft, ShoppingListItem, ShoppingListPatch};

/// A synchronized collection entity.
///
/// Each entity type declares its creation draft and partial-update patch,
/// plus the nouns used in error messages and remote collection paths.
/// `from_draft` and `apply_patch` are the single source of entity
/// construction logic, shared by the in-memory and remote strategies so
/// the two cannot drift apart.
pub trait Entity:
    Clone + Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    type Draft: Clone + Debug + Serialize + Send + 'static;
    type Patch: Clone + Debug + Serialize + Send + 'static;

    /// Singular noun for mutation error messages ("ingredient").
    const NOUN: &'static str;
    /// Plural noun for load errors and remote paths ("ingredients").
    const COLLECTION: &'static str;

    fn id(&self) -> &str;

    /// Builds a full entity from a draft, with a server-assigned id.
    fn from_draft(id: String, draft: Self::Draft) -> Self;

    /// Applies a partial update in place, bumping `updated_at`.
    fn apply_patch(&mut self, patch: &Self::Patch);
}
