//! Ingredient store instantiation: filters and sort keys.

use std::cmp::Ordering;

use chrono::Utc;

use crate::models::{Ingredient, StorageLocation};

use super::collection::CollectionStore;
use super::view::{
    compare_f64, compare_option, compare_str, eq_ignore_case, search_matches, tags_match,
    FilterSpec, SortKey,
};

/// Live ingredient collection for one user.
pub type IngredientStore<G> =
    CollectionStore<Ingredient, G, IngredientFilters, IngredientSortKey>;

/// Filter configuration for the pantry view.
///
/// Sentinels: empty `search`/`category` strings, `location: None`
/// (the old `"all"` value) and an empty tag set are inactive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngredientFilters {
    /// Substring match against name, custom name and category.
    pub search: String,
    pub location: Option<StorageLocation>,
    /// Exact category match, case-insensitive.
    pub category: String,
    /// Every selected tag must be present.
    pub tags: Vec<String>,
    /// Only items expiring within this many days of today.
    pub expiring_within_days: Option<i64>,
}

impl FilterSpec<Ingredient> for IngredientFilters {
    fn matches(&self, item: &Ingredient) -> bool {
        if !search_matches(
            &self.search,
            &[&item.name, item.display_name(), &item.category],
        ) {
            return false;
        }
        if let Some(location) = self.location {
            if item.location != location {
                return false;
            }
        }
        if !self.category.is_empty() && !eq_ignore_case(&item.category, &self.category) {
            return false;
        }
        if !tags_match(&self.tags, &item.tags) {
            return false;
        }
        if let Some(days) = self.expiring_within_days {
            let today = Utc::now().date_naive();
            match item.days_until_expiration(today) {
                Some(left) if left <= days => {}
                _ => return false,
            }
        }
        true
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IngredientSortKey {
    #[default]
    Name,
    Quantity,
    Category,
    BoughtDate,
    ExpirationDate,
}

impl SortKey<Ingredient> for IngredientSortKey {
    fn compare(&self, a: &Ingredient, b: &Ingredient) -> Ordering {
        match self {
            IngredientSortKey::Name => compare_str(a.display_name(), b.display_name()),
            IngredientSortKey::Quantity => compare_f64(a.quantity, b.quantity),
            IngredientSortKey::Category => compare_str(&a.category, &b.category),
            IngredientSortKey::BoughtDate => a.bought_date.cmp(&b.bought_date),
            IngredientSortKey::ExpirationDate => {
                compare_option(&a.expiration_date, &b.expiration_date)
            }
        }
    }
}
