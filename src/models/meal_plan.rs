use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{Entity, MealType};

/// Returns the Sunday at or before the given date.
///
/// All week-keyed lookups compare these normalized dates, so the write
/// and read paths must both go through this function.
pub fn sunday_of_week(date: NaiveDate) -> NaiveDate {
    let days_since_sunday = date.weekday().num_days_from_sunday();
    date - Duration::days(days_since_sunday as i64)
}

/// Returns the Saturday that ends the week containing the given date.
pub fn saturday_of_week(date: NaiveDate) -> NaiveDate {
    sunday_of_week(date) + Duration::days(6)
}

/// Builds the deterministic slot id for a date and meal type.
///
/// Slot ids must be recomputable from (date, meal type) alone so that
/// assignment and removal can address a slot without a prior round-trip.
pub fn slot_id(date: NaiveDate, meal_type: MealType) -> String {
    format!("{}-{}", date.format("%Y-%m-%d"), meal_type)
}

/// Generates the 28 empty slots for a week: 7 days x 4 meal types,
/// starting at `week_start` (expected to be a Sunday).
pub fn generate_week_slots(week_start: NaiveDate) -> Vec<MealSlot> {
    let mut slots = Vec::with_capacity(28);
    for day in 0..7 {
        let date = week_start + Duration::days(day);
        for meal_type in MealType::ALL {
            slots.push(MealSlot::empty(date, meal_type));
        }
    }
    slots
}

/// One slot in a week plan: a day and meal type, optionally holding an
/// assigned recipe. Slots are created empty when a week plan is generated
/// and only ever cleared, never deleted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MealSlot {
    pub id: String,
    pub date: NaiveDate,
    pub meal_type: MealType,
    pub recipe_id: Option<String>,
    pub servings: Option<i32>,
    pub notes: String,
}

impl MealSlot {
    pub fn empty(date: NaiveDate, meal_type: MealType) -> Self {
        Self {
            id: slot_id(date, meal_type),
            date,
            meal_type,
            recipe_id: None,
            servings: None,
            notes: String::new(),
        }
    }

    pub fn assign(&mut self, recipe_id: impl Into<String>, servings: i32) {
        self.recipe_id = Some(recipe_id.into());
        self.servings = Some(servings);
    }

    /// Clears the assignment but keeps the notes.
    pub fn clear(&mut self) {
        self.recipe_id = None;
        self.servings = None;
    }

    pub fn is_empty(&self) -> bool {
        self.recipe_id.is_none()
    }
}

/// A user's plan for one week, keyed by its normalized Sunday start date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MealPlan {
    pub id: String,
    pub user_id: String,
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub slots: Vec<MealSlot>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MealPlan {
    pub fn slot(&self, slot_id: &str) -> Option<&MealSlot> {
        self.slots.iter().find(|s| s.id == slot_id)
    }

    pub fn slot_mut(&mut self, slot_id: &str) -> Option<&mut MealSlot> {
        self.slots.iter_mut().find(|s| s.id == slot_id)
    }

    /// True when this plan covers the week containing `date`.
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.week_start == sunday_of_week(date)
    }

    pub fn empty_slots(&self, meal_type: MealType) -> usize {
        self.slots
            .iter()
            .filter(|s| s.meal_type == meal_type && s.is_empty())
            .count()
    }
}

impl fmt::Display for MealPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let planned = self.slots.iter().filter(|s| !s.is_empty()).count();
        write!(
            f,
            "Week of {} ({}/{} slots planned)",
            self.week_start.format("%b %d, %Y"),
            planned,
            self.slots.len()
        )
    }
}

/// Payload for creating a new week plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealPlanDraft {
    pub user_id: String,
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub slots: Vec<MealSlot>,
}

impl MealPlanDraft {
    /// Builds an empty plan draft for the week containing `date`.
    /// The week start is normalized to its Sunday.
    pub fn for_week(user_id: impl Into<String>, date: NaiveDate) -> Self {
        let week_start = sunday_of_week(date);
        Self {
            user_id: user_id.into(),
            week_start,
            week_end: week_start + Duration::days(6),
            slots: generate_week_slots(week_start),
        }
    }
}

/// Partial update for an existing meal plan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MealPlanPatch {
    pub slots: Option<Vec<MealSlot>>,
}

impl Entity for MealPlan {
    type Draft = MealPlanDraft;
    type Patch = MealPlanPatch;

    const NOUN: &'static str = "meal plan";
    const COLLECTION: &'static str = "meal plans";

    fn id(&self) -> &str {
        &self.id
    }

    fn from_draft(id: String, draft: MealPlanDraft) -> Self {
        let now = Utc::now();
        Self {
            id,
            user_id: draft.user_id,
            week_start: draft.week_start,
            week_end: draft.week_end,
            slots: draft.slots,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_patch(&mut self, patch: &MealPlanPatch) {
        if let Some(slots) = &patch.slots {
            self.slots = slots.clone();
        }
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_sunday_of_week() {
        // 2026-03-11 is a Wednesday; the preceding Sunday is 2026-03-08.
        assert_eq!(sunday_of_week(date(2026, 3, 11)), date(2026, 3, 8));
        // A Sunday normalizes to itself.
        assert_eq!(sunday_of_week(date(2026, 3, 8)), date(2026, 3, 8));
        // Saturday belongs to the week that started six days earlier.
        assert_eq!(sunday_of_week(date(2026, 3, 14)), date(2026, 3, 8));
    }

    #[test]
    fn test_saturday_of_week() {
        assert_eq!(saturday_of_week(date(2026, 3, 11)), date(2026, 3, 14));
    }

    #[test]
    fn test_generate_week_slots() {
        let slots = generate_week_slots(date(2026, 3, 8));
        assert_eq!(slots.len(), 28);
        assert!(slots.iter().all(|s| s.is_empty()));

        // Deterministic ids, recomputable without a round-trip.
        assert_eq!(slots[0].id, "2026-03-08-breakfast");
        assert_eq!(slots[27].id, "2026-03-14-snack");

        let unique: std::collections::HashSet<&str> =
            slots.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(unique.len(), 28);
    }

    #[test]
    fn test_slot_assign_and_clear() {
        let mut slot = MealSlot::empty(date(2026, 3, 9), MealType::Dinner);
        slot.notes = "leftovers ok".into();
        slot.assign("recipe-1", 4);
        assert_eq!(slot.recipe_id.as_deref(), Some("recipe-1"));
        assert_eq!(slot.servings, Some(4));
        assert!(!slot.is_empty());

        slot.clear();
        assert!(slot.is_empty());
        assert!(slot.servings.is_none());
        assert_eq!(slot.notes, "leftovers ok");
    }

    #[test]
    fn test_plan_covers_week() {
        let draft = MealPlanDraft::for_week("u1", date(2026, 3, 11));
        let plan = MealPlan::from_draft("p1".into(), draft);
        assert_eq!(plan.week_start, date(2026, 3, 8));
        assert_eq!(plan.week_end, date(2026, 3, 14));
        assert!(plan.covers(date(2026, 3, 10)));
        assert!(!plan.covers(date(2026, 3, 15)));
    }

    #[test]
    fn test_slot_lookup_by_id() {
        let draft = MealPlanDraft::for_week("u1", date(2026, 3, 8));
        let mut plan = MealPlan::from_draft("p1".into(), draft);
        let id = slot_id(date(2026, 3, 9), MealType::Lunch);
        plan.slot_mut(&id).unwrap().assign("r9", 2);
        assert_eq!(plan.slot(&id).unwrap().recipe_id.as_deref(), Some("r9"));
    }

    #[test]
    fn test_empty_slot_count() {
        let draft = MealPlanDraft::for_week("u1", date(2026, 3, 8));
        let mut plan = MealPlan::from_draft("p1".into(), draft);
        assert_eq!(plan.empty_slots(MealType::Dinner), 7);
        let id = slot_id(date(2026, 3, 9), MealType::Dinner);
        plan.slot_mut(&id).unwrap().assign("r1", 2);
        assert_eq!(plan.empty_slots(MealType::Dinner), 6);
    }
}
