//! Shopping list store instantiation and item-level operations.
//!
//! Item edits clone the mirrored list, apply the model method (which
//! keeps the estimated-cost aggregate correct) and write the full item
//! list back as a patch.

use std::cmp::Ordering;

use crate::error::StoreError;
use crate::gateway::EntityGateway;
use crate::models::{ShoppingList, ShoppingListItem, ShoppingListPatch};

use super::collection::CollectionStore;
use super::view::{compare_f64, compare_str, search_matches, FilterSpec, SortKey};

/// Live shopping list collection for one user.
pub type ShoppingListStore<G> =
    CollectionStore<ShoppingList, G, ShoppingListFilters, ShoppingListSortKey>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShoppingListFilters {
    /// Substring match against the list name. Empty string is inactive.
    pub search: String,
    /// Only lists that still have something to buy.
    pub open_only: bool,
}

impl FilterSpec<ShoppingList> for ShoppingListFilters {
    fn matches(&self, item: &ShoppingList) -> bool {
        if !search_matches(&self.search, &[&item.name]) {
            return false;
        }
        if self.open_only && item.unpurchased_count() == 0 {
            return false;
        }
        true
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ShoppingListSortKey {
    #[default]
    Name,
    CreatedAt,
    EstimatedCost,
}

impl SortKey<ShoppingList> for ShoppingListSortKey {
    fn compare(&self, a: &ShoppingList, b: &ShoppingList) -> Ordering {
        match self {
            ShoppingListSortKey::Name => compare_str(&a.name, &b.name),
            ShoppingListSortKey::CreatedAt => a.created_at.cmp(&b.created_at),
            ShoppingListSortKey::EstimatedCost => compare_f64(a.estimated_cost, b.estimated_cost),
        }
    }
}

impl<G: EntityGateway<ShoppingList>> ShoppingListStore<G> {
    pub async fn add_item(
        &self,
        list_id: &str,
        item: ShoppingListItem,
    ) -> Result<(), StoreError> {
        self.edit_list(list_id, move |list| {
            list.add_item(item);
            Ok(())
        })
        .await
    }

    pub async fn remove_item(&self, list_id: &str, item_id: &str) -> Result<(), StoreError> {
        self.edit_list(list_id, move |list| {
            if list.remove_item(item_id) {
                Ok(())
            } else {
                Err(StoreError::NotFound {
                    kind: "shopping item",
                    id: item_id.to_string(),
                })
            }
        })
        .await
    }

    /// Flips an item's purchased flag. Returns the new state.
    pub async fn toggle_purchased(
        &self,
        list_id: &str,
        item_id: &str,
    ) -> Result<bool, StoreError> {
        let mut purchased = false;
        self.edit_list(list_id, |list| {
            purchased = list
                .toggle_purchased(item_id)
                .ok_or_else(|| StoreError::NotFound {
                    kind: "shopping item",
                    id: item_id.to_string(),
                })?;
            Ok(())
        })
        .await?;
        Ok(purchased)
    }

    pub async fn set_item_cost(
        &self,
        list_id: &str,
        item_id: &str,
        cost: f64,
    ) -> Result<(), StoreError> {
        self.edit_list(list_id, move |list| {
            if list.set_item_cost(item_id, cost) {
                Ok(())
            } else {
                Err(StoreError::NotFound {
                    kind: "shopping item",
                    id: item_id.to_string(),
                })
            }
        })
        .await
    }

    async fn edit_list(
        &self,
        list_id: &str,
        edit: impl FnOnce(&mut ShoppingList) -> Result<(), StoreError>,
    ) -> Result<(), StoreError> {
        let mut list = self
            .items()
            .into_iter()
            .find(|l| l.id == list_id)
            .ok_or_else(|| StoreError::NotFound {
                kind: "shopping list",
                id: list_id.to_string(),
            })?;
        edit(&mut list)?;

        self.update(
            list_id,
            ShoppingListPatch {
                items: Some(list.items),
                ..Default::default()
            },
        )
        .await
    }
}
