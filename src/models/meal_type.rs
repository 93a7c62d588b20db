use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The four meal slots a day is divided into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    /// All meal types in the order slots are generated for a day.
    pub const ALL: [MealType; 4] = [
        MealType::Breakfast,
        MealType::Lunch,
        MealType::Dinner,
        MealType::Snack,
    ];
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MealType::Breakfast => write!(f, "breakfast"),
            MealType::Lunch => write!(f, "lunch"),
            MealType::Dinner => write!(f, "dinner"),
            MealType::Snack => write!(f, "snack"),
        }
    }
}

impl FromStr for MealType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "breakfast" => Ok(MealType::Breakfast),
            "lunch" => Ok(MealType::Lunch),
            "dinner" => Ok(MealType::Dinner),
            "snack" => Ok(MealType::Snack),
            _ => Err(format!(
                "Unknown meal type '{}'. Expected breakfast, lunch, dinner or snack",
                s
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_matches_serde() {
        for meal_type in MealType::ALL {
            let json = serde_json::to_string(&meal_type).unwrap();
            assert_eq!(json, format!("\"{}\"", meal_type));
        }
    }

    #[test]
    fn test_from_str() {
        assert_eq!(MealType::from_str("dinner").unwrap(), MealType::Dinner);
        assert_eq!(MealType::from_str("BREAKFAST").unwrap(), MealType::Breakfast);
        assert!(MealType::from_str("brunch").is_err());
    }

    #[test]
    fn test_all_order() {
        assert_eq!(MealType::ALL[0], MealType::Breakfast);
        assert_eq!(MealType::ALL.len(), 4);
    }
}
