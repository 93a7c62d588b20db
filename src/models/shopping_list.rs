//! Shopping lists with a derived cost aggregate.
//!
//! `estimated_cost` must always equal the sum of item costs. Every
//! mutation path goes through the methods here, which recompute it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::Entity;

/// One line on a shopping list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShoppingListItem {
    pub id: String,
    pub name: String,
    pub category: String,
    pub amount: f64,
    pub unit: String,
    /// Estimated or user-provided cost for the full amount.
    pub cost: f64,
    pub purchased: bool,
    pub notes: String,
    /// Recipes this item was aggregated from, if any.
    pub source_recipe_ids: Vec<String>,
}

impl ShoppingListItem {
    pub fn new(id: impl Into<String>, name: impl Into<String>, amount: f64, unit: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: String::new(),
            amount,
            unit: unit.into(),
            cost: 0.0,
            purchased: false,
            notes: String::new(),
            source_recipe_ids: Vec::new(),
        }
    }

    pub fn with_cost(mut self, cost: f64) -> Self {
        self.cost = cost;
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }
}

impl fmt::Display for ShoppingListItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let check = if self.purchased { "[x]" } else { "[ ]" };
        if self.unit.is_empty() {
            write!(f, "{} {:<20} {}", check, self.name, self.amount)
        } else {
            write!(f, "{} {:<20} {} {}", check, self.name, self.amount, self.unit)
        }
    }
}

/// A named shopping list owned by a single user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShoppingList {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub items: Vec<ShoppingListItem>,
    /// Always the sum of item costs; maintained by the mutation methods.
    pub estimated_cost: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ShoppingList {
    fn recompute_cost(&mut self) {
        self.estimated_cost = self.items.iter().map(|i| i.cost).sum();
    }

    pub fn item(&self, item_id: &str) -> Option<&ShoppingListItem> {
        self.items.iter().find(|i| i.id == item_id)
    }

    pub fn add_item(&mut self, item: ShoppingListItem) {
        self.items.push(item);
        self.recompute_cost();
        self.updated_at = Utc::now();
    }

    /// Removes an item by id. Returns true if an item was removed.
    pub fn remove_item(&mut self, item_id: &str) -> bool {
        let len_before = self.items.len();
        self.items.retain(|i| i.id != item_id);
        if self.items.len() != len_before {
            self.recompute_cost();
            self.updated_at = Utc::now();
            true
        } else {
            false
        }
    }

    /// Flips the purchased flag for an item. Returns the new state,
    /// or `None` when the item does not exist.
    pub fn toggle_purchased(&mut self, item_id: &str) -> Option<bool> {
        let item = self.items.iter_mut().find(|i| i.id == item_id)?;
        item.purchased = !item.purchased;
        self.updated_at = Utc::now();
        Some(item.purchased)
    }

    /// Replaces an item's cost estimate. Returns false when no item matches.
    pub fn set_item_cost(&mut self, item_id: &str, cost: f64) -> bool {
        match self.items.iter_mut().find(|i| i.id == item_id) {
            Some(item) => {
                item.cost = cost;
                self.recompute_cost();
                self.updated_at = Utc::now();
                true
            }
            None => false,
        }
    }

    pub fn unpurchased_count(&self) -> usize {
        self.items.iter().filter(|i| !i.purchased).count()
    }
}

impl fmt::Display for ShoppingList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} (est. {:.2})", self.name, self.estimated_cost)?;
        for item in &self.items {
            writeln!(f, "  {}", item)?;
        }
        Ok(())
    }
}

/// Payload for creating a new shopping list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShoppingListDraft {
    pub user_id: String,
    pub name: String,
    pub items: Vec<ShoppingListItem>,
}

impl ShoppingListDraft {
    pub fn new(user_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            name: name.into(),
            items: Vec::new(),
        }
    }
}

/// Partial update for an existing shopping list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShoppingListPatch {
    pub name: Option<String>,
    pub items: Option<Vec<ShoppingListItem>>,
}

impl Entity for ShoppingList {
    type Draft = ShoppingListDraft;
    type Patch = ShoppingListPatch;

    const NOUN: &'static str = "shopping list";
    const COLLECTION: &'static str = "shopping lists";

    fn id(&self) -> &str {
        &self.id
    }

    fn from_draft(id: String, draft: ShoppingListDraft) -> Self {
        let now = Utc::now();
        let mut list = Self {
            id,
            user_id: draft.user_id,
            name: draft.name,
            items: draft.items,
            estimated_cost: 0.0,
            created_at: now,
            updated_at: now,
        };
        list.recompute_cost();
        list
    }

    fn apply_patch(&mut self, patch: &ShoppingListPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(items) = &patch.items {
            self.items = items.clone();
        }
        self.recompute_cost();
        self.updated_at = Utc::now();
    }
}
