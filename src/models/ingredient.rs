use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::Entity;

/// Where an ingredient is stored in the kitchen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageLocation {
    Fridge,
    Freezer,
    Pantry,
    Counter,
    Other,
}

impl fmt::Display for StorageLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageLocation::Fridge => write!(f, "fridge"),
            StorageLocation::Freezer => write!(f, "freezer"),
            StorageLocation::Pantry => write!(f, "pantry"),
            StorageLocation::Counter => write!(f, "counter"),
            StorageLocation::Other => write!(f, "other"),
        }
    }
}

impl FromStr for StorageLocation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fridge" => Ok(StorageLocation::Fridge),
            "freezer" => Ok(StorageLocation::Freezer),
            "pantry" => Ok(StorageLocation::Pantry),
            "counter" => Ok(StorageLocation::Counter),
            "other" => Ok(StorageLocation::Other),
            _ => Err(format!(
                "Unknown storage location '{}'. Expected fridge, freezer, pantry, counter or other",
                s
            )),
        }
    }
}

/// A pantry ingredient owned by a single user.
///
/// Quantities are never negative; the constructor and patch path clamp
/// to zero rather than reject.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ingredient {
    pub id: String,
    pub name: String,
    /// Optional user-facing override for the name.
    pub custom_name: Option<String>,
    pub quantity: f64,
    pub unit: String,
    pub location: StorageLocation,
    pub category: String,
    pub tags: Vec<String>,
    pub notes: String,
    pub bought_date: NaiveDate,
    pub expiration_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Ingredient {
    /// The name shown to the user (custom name wins when set).
    pub fn display_name(&self) -> &str {
        self.custom_name.as_deref().unwrap_or(&self.name)
    }

    /// Days until expiration relative to `today`. Negative when already
    /// expired, `None` when no expiration date is set.
    pub fn days_until_expiration(&self, today: NaiveDate) -> Option<i64> {
        self.expiration_date
            .map(|exp| (exp - today).num_days())
    }
}

impl fmt::Display for Ingredient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.unit.is_empty() {
            write!(f, "{} {}", self.quantity, self.display_name())
        } else {
            write!(f, "{} {} {}", self.quantity, self.unit, self.display_name())
        }
    }
}

/// Payload for creating a new ingredient.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngredientDraft {
    pub name: String,
    pub custom_name: Option<String>,
    pub quantity: f64,
    pub unit: String,
    pub location: Option<StorageLocation>,
    pub category: String,
    pub tags: Vec<String>,
    pub notes: String,
    pub expiration_date: Option<NaiveDate>,
}

impl IngredientDraft {
    pub fn new(name: impl Into<String>, quantity: f64, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quantity,
            unit: unit.into(),
            ..Default::default()
        }
    }

    pub fn with_location(mut self, location: StorageLocation) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_expiration(mut self, date: NaiveDate) -> Self {
        self.expiration_date = Some(date);
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }
}

/// Partial update for an existing ingredient. `None` fields are untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngredientPatch {
    pub name: Option<String>,
    pub custom_name: Option<Option<String>>,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub location: Option<StorageLocation>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub notes: Option<String>,
    pub expiration_date: Option<Option<NaiveDate>>,
}

impl Entity for Ingredient {
    type Draft = IngredientDraft;
    type Patch = IngredientPatch;

    const NOUN: &'static str = "ingredient";
    const COLLECTION: &'static str = "ingredients";

    fn id(&self) -> &str {
        &self.id
    }

    fn from_draft(id: String, draft: IngredientDraft) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: draft.name,
            custom_name: draft.custom_name,
            quantity: draft.quantity.max(0.0),
            unit: draft.unit,
            location: draft.location.unwrap_or(StorageLocation::Pantry),
            category: draft.category,
            tags: draft.tags,
            notes: draft.notes,
            bought_date: now.date_naive(),
            expiration_date: draft.expiration_date,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_patch(&mut self, patch: &IngredientPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(custom_name) = &patch.custom_name {
            self.custom_name = custom_name.clone();
        }
        if let Some(quantity) = patch.quantity {
            self.quantity = quantity.max(0.0);
        }
        if let Some(unit) = &patch.unit {
            self.unit = unit.clone();
        }
        if let Some(location) = patch.location {
            self.location = location;
        }
        if let Some(category) = &patch.category {
            self.category = category.clone();
        }
        if let Some(tags) = &patch.tags {
            self.tags = tags.clone();
        }
        if let Some(notes) = &patch.notes {
            self.notes = notes.clone();
        }
        if let Some(expiration) = &patch.expiration_date {
            self.expiration_date = *expiration;
        }
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make(name: &str, qty: f64) -> Ingredient {
        Ingredient::from_draft("i1".into(), IngredientDraft::new(name, qty, "g"))
    }

    #[test]
    fn test_from_draft_defaults() {
        let ingredient = make("flour", 500.0);
        assert_eq!(ingredient.name, "flour");
        assert_eq!(ingredient.quantity, 500.0);
        assert_eq!(ingredient.location, StorageLocation::Pantry);
        assert!(ingredient.tags.is_empty());
        assert!(ingredient.expiration_date.is_none());
    }

    #[test]
    fn test_quantity_clamped_to_zero() {
        let ingredient = make("flour", -2.0);
        assert_eq!(ingredient.quantity, 0.0);

        let mut ingredient = make("flour", 5.0);
        ingredient.apply_patch(&IngredientPatch {
            quantity: Some(-1.0),
            ..Default::default()
        });
        assert_eq!(ingredient.quantity, 0.0);
    }

    #[test]
    fn test_display_name_prefers_custom() {
        let mut ingredient = make("tomato", 3.0);
        assert_eq!(ingredient.display_name(), "tomato");
        ingredient.custom_name = Some("garden tomatoes".into());
        assert_eq!(ingredient.display_name(), "garden tomatoes");
    }

    #[test]
    fn test_days_until_expiration() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        let mut ingredient = make("milk", 1.0);
        assert_eq!(ingredient.days_until_expiration(today), None);

        ingredient.expiration_date = NaiveDate::from_ymd_opt(2026, 3, 12);
        assert_eq!(ingredient.days_until_expiration(today), Some(2));

        ingredient.expiration_date = NaiveDate::from_ymd_opt(2026, 3, 8);
        assert_eq!(ingredient.days_until_expiration(today), Some(-2));
    }

    #[test]
    fn test_patch_clears_expiration() {
        let mut ingredient = make("milk", 1.0);
        ingredient.expiration_date = NaiveDate::from_ymd_opt(2026, 3, 12);
        ingredient.apply_patch(&IngredientPatch {
            expiration_date: Some(None),
            ..Default::default()
        });
        assert!(ingredient.expiration_date.is_none());
    }

    #[test]
    fn test_location_from_str() {
        assert_eq!(
            StorageLocation::from_str("Fridge").unwrap(),
            StorageLocation::Fridge
        );
        assert!(StorageLocation::from_str("garage").is_err());
    }

    #[test]
    fn test_json_roundtrip() {
        let ingredient = make("sugar", 1.5);
        let json = serde_json::to_string(&ingredient).unwrap();
        let parsed: Ingredient = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, ingredient);
    }
}
