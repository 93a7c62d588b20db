use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{Entity, MealType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Medium => write!(f, "medium"),
            Difficulty::Hard => write!(f, "hard"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(format!(
                "Unknown difficulty '{}'. Expected easy, medium or hard",
                s
            )),
        }
    }
}

/// One line of a recipe's ingredient list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecipeIngredient {
    pub name: String,
    pub amount: f64,
    pub unit: String,
    pub category: String,
}

impl RecipeIngredient {
    pub fn new(name: impl Into<String>, amount: f64, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            amount,
            unit: unit.into(),
            category: String::new(),
        }
    }
}

/// Per-serving nutrition summary.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Nutrition {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

/// A recipe with timing, ingredient list and metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recipe {
    pub id: String,
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    pub difficulty: Difficulty,
    pub cuisine: String,
    pub meal_types: Vec<MealType>,
    /// Minutes.
    pub prep_time: i32,
    pub cook_time: i32,
    pub rest_time: i32,
    pub servings: i32,
    pub ingredients: Vec<RecipeIngredient>,
    pub instructions: Vec<String>,
    pub nutrition: Option<Nutrition>,
    pub tags: Vec<String>,
    pub dietary: Vec<String>,
    pub rating: f64,
    pub rating_count: u32,
    pub is_public: bool,
    pub cook_count: u32,
    pub favorite: bool,
    pub archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Recipe {
    /// Total minutes including resting time.
    pub fn total_time(&self) -> i32 {
        self.prep_time + self.cook_time + self.rest_time
    }
}

impl fmt::Display for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(f, "{}", "=".repeat(self.title.len()))?;
        writeln!(f, "Difficulty: {}", self.difficulty)?;
        writeln!(f, "Time: {} min", self.total_time())?;
        writeln!(f, "Servings: {}", self.servings)?;
        if !self.ingredients.is_empty() {
            writeln!(f, "\nIngredients:")?;
            for ingredient in &self.ingredients {
                writeln!(
                    f,
                    "  - {} {} {}",
                    ingredient.amount, ingredient.unit, ingredient.name
                )?;
            }
        }
        Ok(())
    }
}

/// Payload for creating a new recipe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeDraft {
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    pub difficulty: Difficulty,
    pub cuisine: String,
    pub meal_types: Vec<MealType>,
    pub prep_time: i32,
    pub cook_time: i32,
    pub rest_time: i32,
    pub servings: i32,
    pub ingredients: Vec<RecipeIngredient>,
    pub instructions: Vec<String>,
    pub nutrition: Option<Nutrition>,
    pub tags: Vec<String>,
    pub dietary: Vec<String>,
    pub is_public: bool,
}

impl RecipeDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            image_url: None,
            difficulty: Difficulty::Easy,
            cuisine: String::new(),
            meal_types: Vec::new(),
            prep_time: 0,
            cook_time: 0,
            rest_time: 0,
            servings: 1,
            ingredients: Vec::new(),
            instructions: Vec::new(),
            nutrition: None,
            tags: Vec::new(),
            dietary: Vec::new(),
            is_public: false,
        }
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn with_times(mut self, prep: i32, cook: i32) -> Self {
        self.prep_time = prep;
        self.cook_time = cook;
        self
    }

    pub fn with_ingredients(mut self, ingredients: Vec<RecipeIngredient>) -> Self {
        self.ingredients = ingredients;
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_cuisine(mut self, cuisine: impl Into<String>) -> Self {
        self.cuisine = cuisine.into();
        self
    }
}

/// Partial update for an existing recipe.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecipePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub cuisine: Option<String>,
    pub meal_types: Option<Vec<MealType>>,
    pub prep_time: Option<i32>,
    pub cook_time: Option<i32>,
    pub rest_time: Option<i32>,
    pub servings: Option<i32>,
    pub ingredients: Option<Vec<RecipeIngredient>>,
    pub instructions: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub dietary: Option<Vec<String>>,
    pub favorite: Option<bool>,
    pub archived: Option<bool>,
    pub cook_count: Option<u32>,
}

impl Entity for Recipe {
    type Draft = RecipeDraft;
    type Patch = RecipePatch;

    const NOUN: &'static str = "recipe";
    const COLLECTION: &'static str = "recipes";

    fn id(&self) -> &str {
        &self.id
    }

    fn from_draft(id: String, draft: RecipeDraft) -> Self {
        let now = Utc::now();
        Self {
            id,
            title: draft.title,
            description: draft.description,
            image_url: draft.image_url,
            difficulty: draft.difficulty,
            cuisine: draft.cuisine,
            meal_types: draft.meal_types,
            prep_time: draft.prep_time,
            cook_time: draft.cook_time,
            rest_time: draft.rest_time,
            servings: draft.servings,
            ingredients: draft.ingredients,
            instructions: draft.instructions,
            nutrition: draft.nutrition,
            tags: draft.tags,
            dietary: draft.dietary,
            rating: 0.0,
            rating_count: 0,
            is_public: draft.is_public,
            cook_count: 0,
            favorite: false,
            archived: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_patch(&mut self, patch: &RecipePatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(difficulty) = patch.difficulty {
            self.difficulty = difficulty;
        }
        if let Some(cuisine) = &patch.cuisine {
            self.cuisine = cuisine.clone();
        }
        if let Some(meal_types) = &patch.meal_types {
            self.meal_types = meal_types.clone();
        }
        if let Some(prep) = patch.prep_time {
            self.prep_time = prep;
        }
        if let Some(cook) = patch.cook_time {
            self.cook_time = cook;
        }
        if let Some(rest) = patch.rest_time {
            self.rest_time = rest;
        }
        if let Some(servings) = patch.servings {
            self.servings = servings;
        }
        if let Some(ingredients) = &patch.ingredients {
            self.ingredients = ingredients.clone();
        }
        if let Some(instructions) = &patch.instructions {
            self.instructions = instructions.clone();
        }
        if let Some(tags) = &patch.tags {
            self.tags = tags.clone();
        }
        if let Some(dietary) = &patch.dietary {
            self.dietary = dietary.clone();
        }
        if let Some(favorite) = patch.favorite {
            self.favorite = favorite;
        }
        if let Some(archived) = patch.archived {
            self.archived = archived;
        }
        if let Some(cook_count) = patch.cook_count {
            self.cook_count = cook_count;
        }
        self.updated_at = Utc::now();
    }
}
