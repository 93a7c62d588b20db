//! Rule-based suggestion engine.
//!
//! Every function here is a pure derivation over current entity lists:
//! fixed threshold rules, no stored state, no side effects. Suggestions
//! carry deterministic ids so they de-duplicate across recomputation
//! and can be dismissed for the session.

use std::collections::HashSet;
use std::fmt;

mod ingredients;
mod meal_plans;
mod recipes;

pub use ingredients::ingredient_insights;
pub use meal_plans::meal_plan_insights;
pub use recipes::{match_recipes, recipe_insights, RecipeMatch};

/// Days-to-expiration threshold for the "expiring soon" rule.
pub const EXPIRING_SOON_DAYS: i64 = 3;
/// Match percentage at or above which a recipe counts as makeable.
pub const HIGH_AVAILABILITY_THRESHOLD: u32 = 80;
/// Total minutes at or below which a recipe counts as quick.
pub const QUICK_RECIPE_MINUTES: i32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SuggestionKind {
    Expired,
    ExpiringSoon,
    HighAvailability,
    QuickRecipe,
    UnderPlannedWeek,
}

impl fmt::Display for SuggestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SuggestionKind::Expired => write!(f, "expired"),
            SuggestionKind::ExpiringSoon => write!(f, "expiring-soon"),
            SuggestionKind::HighAvailability => write!(f, "high-availability"),
            SuggestionKind::QuickRecipe => write!(f, "quick-recipe"),
            SuggestionKind::UnderPlannedWeek => write!(f, "under-planned-week"),
        }
    }
}

/// A dismissible, deterministically-derived recommendation.
#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    /// `"<kind>-<subject id>"`; stable across recomputation.
    pub id: String,
    pub kind: SuggestionKind,
    pub message: String,
    /// The entity this suggestion is about.
    pub related_id: String,
}

impl Suggestion {
    pub fn new(kind: SuggestionKind, related_id: impl Into<String>, message: impl Into<String>) -> Self {
        let related_id = related_id.into();
        Self {
            id: format!("{}-{}", kind, related_id),
            kind,
            message: message.into(),
            related_id,
        }
    }
}

/// Session-local set of dismissed suggestion ids.
///
/// Never persisted: suggestions are meant to resurface after a fresh
/// session, so the set resets with the process.
#[derive(Debug, Clone, Default)]
pub struct DismissedSet {
    ids: HashSet<String>,
}

impl DismissedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dismiss(&mut self, id: impl Into<String>) {
        self.ids.insert(id.into());
    }

    pub fn is_dismissed(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn reset(&mut self) {
        self.ids.clear();
    }
}
