//! Meal plan store instantiation and slot-level operations.
//!
//! Week identity is the normalized Sunday start date; every lookup and
//! write goes through [`sunday_of_week`] so the two paths cannot drift.

use std::cmp::Ordering;

use chrono::NaiveDate;

use crate::error::StoreError;
use crate::gateway::EntityGateway;
use crate::models::{
    sunday_of_week, Entity, MealPlan, MealPlanDraft, MealPlanPatch, MealSlot,
};

use super::collection::CollectionStore;
use super::view::{FilterSpec, SortKey};

/// Live meal plan collection for one user.
pub type MealPlanStore<G> = CollectionStore<MealPlan, G, MealPlanFilters, MealPlanSortKey>;

/// Filter configuration for meal plans. The only dimension is the week,
/// normalized to its Sunday; `None` is the inactive sentinel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MealPlanFilters {
    pub week_of: Option<NaiveDate>,
}

impl FilterSpec<MealPlan> for MealPlanFilters {
    fn matches(&self, item: &MealPlan) -> bool {
        match self.week_of {
            Some(date) => item.week_start == sunday_of_week(date),
            None => true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MealPlanSortKey {
    #[default]
    WeekStart,
    CreatedAt,
}

impl SortKey<MealPlan> for MealPlanSortKey {
    fn compare(&self, a: &MealPlan, b: &MealPlan) -> Ordering {
        match self {
            MealPlanSortKey::WeekStart => a.week_start.cmp(&b.week_start),
            MealPlanSortKey::CreatedAt => a.created_at.cmp(&b.created_at),
        }
    }
}

impl<G: EntityGateway<MealPlan>> MealPlanStore<G> {
    /// The mirrored plan covering the week that contains `date`, if any.
    pub fn week_plan(&self, date: NaiveDate) -> Option<MealPlan> {
        self.items().into_iter().find(|p| p.covers(date))
    }

    /// Returns the plan for the week containing `date`, creating an
    /// empty 28-slot plan when none exists yet.
    ///
    /// Safe to call repeatedly for the same week: the lookup runs
    /// against a fresh snapshot, so sequential calls return the same
    /// plan id. Two racing calls for the same week can still create
    /// duplicates; nothing server-side enforces uniqueness.
    pub async fn load_or_create_week_plan(
        &self,
        date: NaiveDate,
    ) -> Result<MealPlan, StoreError> {
        let user = self.require_user()?;
        let week_start = sunday_of_week(date);

        self.load().await?;
        if let Some(existing) = self
            .items()
            .into_iter()
            .find(|p| p.week_start == week_start)
        {
            return Ok(existing);
        }

        tracing::debug!(week = %week_start, "creating week plan");
        let draft = MealPlanDraft::for_week(user.clone(), week_start);
        match self.gateway().create(&user, draft.clone()).await {
            Ok(id) => {
                self.clear_error();
                Ok(MealPlan::from_draft(id, draft))
            }
            Err(e) => Err(self.fail("add", MealPlan::NOUN, e)),
        }
    }

    /// Assigns a recipe to a slot, addressed by its deterministic id.
    pub async fn assign_recipe(
        &self,
        plan_id: &str,
        slot_id: &str,
        recipe_id: &str,
        servings: i32,
    ) -> Result<(), StoreError> {
        self.edit_slot(plan_id, slot_id, |slot| {
            slot.assign(recipe_id, servings);
        })
        .await
    }

    /// Clears a slot's assignment. The slot itself is never deleted.
    pub async fn clear_slot(&self, plan_id: &str, slot_id: &str) -> Result<(), StoreError> {
        self.edit_slot(plan_id, slot_id, |slot| slot.clear()).await
    }

    pub async fn set_slot_notes(
        &self,
        plan_id: &str,
        slot_id: &str,
        notes: impl Into<String>,
    ) -> Result<(), StoreError> {
        let notes = notes.into();
        self.edit_slot(plan_id, slot_id, move |slot| {
            slot.notes = notes;
        })
        .await
    }

    /// Edits one slot of a mirrored plan and writes the whole slot list
    /// back as a patch. The next snapshot is authoritative.
    async fn edit_slot(
        &self,
        plan_id: &str,
        slot_id: &str,
        edit: impl FnOnce(&mut MealSlot),
    ) -> Result<(), StoreError> {
        let mut plan = self
            .items()
            .into_iter()
            .find(|p| p.id == plan_id)
            .ok_or_else(|| StoreError::NotFound {
                kind: "meal plan",
                id: plan_id.to_string(),
            })?;
        let slot = plan
            .slot_mut(slot_id)
            .ok_or_else(|| StoreError::NotFound {
                kind: "meal slot",
                id: slot_id.to_string(),
            })?;
        edit(slot);

        self.update(
            plan_id,
            MealPlanPatch {
                slots: Some(plan.slots),
            },
        )
        .await
    }
}
