//! Planning-coverage nudges for the current week.

use crate::models::{MealPlan, MealType};

use super::{DismissedSet, Suggestion, SuggestionKind};

/// Flags a week plan whose dinners are mostly unplanned.
///
/// The rule counts dinner slots only; breakfast and snack gaps are
/// normal and never worth nagging about.
pub fn meal_plan_insights(plan: &MealPlan, dismissed: &DismissedSet) -> Vec<Suggestion> {
    let mut suggestions = Vec::new();

    let empty_dinners = plan.empty_slots(MealType::Dinner);
    if empty_dinners >= 4 {
        let suggestion = Suggestion::new(
            SuggestionKind::UnderPlannedWeek,
            &plan.id,
            format!(
                "{} of 7 dinners for the week of {} are still unplanned",
                empty_dinners,
                plan.week_start.format("%b %d")
            ),
        );
        if !dismissed.is_dismissed(&suggestion.id) {
            suggestions.push(suggestion);
        }
    }

    suggestions
}
