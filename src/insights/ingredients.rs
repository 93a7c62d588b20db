//! Expiration alerts over the pantry.

use chrono::NaiveDate;

use crate::models::Ingredient;

use super::{DismissedSet, Suggestion, SuggestionKind, EXPIRING_SOON_DAYS};

/// Derives expiration alerts for the current pantry.
///
/// One suggestion per ingredient at most: an expired item does not also
/// count as expiring soon.
pub fn ingredient_insights(
    items: &[Ingredient],
    today: NaiveDate,
    dismissed: &DismissedSet,
) -> Vec<Suggestion> {
    let mut suggestions = Vec::new();

    for item in items {
        let Some(days_left) = item.days_until_expiration(today) else {
            continue;
        };

        let suggestion = if days_left < 0 {
            Suggestion::new(
                SuggestionKind::Expired,
                &item.id,
                format!(
                    "{} expired {} day(s) ago",
                    item.display_name(),
                    -days_left
                ),
            )
        } else if days_left <= EXPIRING_SOON_DAYS {
            let when = if days_left == 0 {
                "today".to_string()
            } else {
                format!("in {} day(s)", days_left)
            };
            Suggestion::new(
                SuggestionKind::ExpiringSoon,
                &item.id,
                format!("{} expires {}", item.display_name(), when),
            )
        } else {
            continue;
        };

        if !dismissed.is_dismissed(&suggestion.id) {
            suggestions.push(suggestion);
        }
    }

    suggestions
}
