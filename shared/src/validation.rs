//! Input validation helpers
//!
//! The insert and patch contracts derive `validator::Validate`. This module
//! reduces a `ValidationErrors` tree to the single field-level error the API
//! reports, with a user-facing label for the field.

use std::borrow::Cow;
use validator::{ValidationErrors, ValidationErrorsKind};

// ============================================================================
// User-Friendly Field Labels
// ============================================================================

/// Map wire field names (camelCase) to user-friendly display labels
pub fn get_field_display_label(field_name: &str) -> &str {
    match field_name {
        "username" => "Username",
        "password" => "Password",
        "name" => "Name",
        "weight" => "Weight",
        "weightGoal" => "Weight Goal",
        "dailyCalories" => "Daily Calories",
        "proteinTarget" => "Protein Target",
        "workoutsPerWeek" => "Workouts per Week",
        "workoutsCount" => "Number of Workouts",
        "duration" => "Duration",
        "calories" => "Calories",
        "protein" => "Protein",
        "carbs" => "Carbs",
        "fat" => "Fat",
        "quantity" => "Quantity",
        "totalCalories" => "Total Calories",
        "totalProtein" => "Total Protein",
        "totalCarbs" => "Total Carbs",
        "totalFat" => "Total Fat",
        _ => field_name,
    }
}

/// Validation error with field context
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Path of the offending field, e.g. `foodItems[0].calories`
    pub field: String,
    pub message: String,
    pub display_label: String,
}

impl ValidationError {
    pub fn new(field: &str, message: &str) -> Self {
        let leaf = field.rsplit('.').next().unwrap_or(field);
        let leaf = leaf.split('[').next().unwrap_or(leaf);
        Self {
            field: field.to_string(),
            message: message.to_string(),
            display_label: get_field_display_label(leaf).to_string(),
        }
    }

    /// Format as user-friendly error message
    pub fn user_message(&self) -> String {
        format!("{}: {}", self.display_label, self.message)
    }
}

/// snake_case struct field to the camelCase wire name
fn wire_name(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

fn describe(error: &validator::ValidationError) -> String {
    match &error.message {
        Some(Cow::Borrowed(m)) => (*m).to_string(),
        Some(Cow::Owned(m)) => m.clone(),
        None => format!("failed {} check", error.code),
    }
}

/// First error of a `ValidationErrors` tree, in field-name order
///
/// Nested structs and lists are walked so an error inside an embedded meal
/// item is reported with its full path.
pub fn first_error(errors: &ValidationErrors) -> Option<ValidationError> {
    first_error_at("", errors)
}

fn first_error_at(prefix: &str, errors: &ValidationErrors) -> Option<ValidationError> {
    let map = errors.errors();
    let mut fields: Vec<_> = map.keys().collect();
    fields.sort();

    for field in fields {
        let path = if prefix.is_empty() {
            wire_name(field)
        } else {
            format!("{}.{}", prefix, wire_name(field))
        };
        let found = match &map[field] {
            ValidationErrorsKind::Field(list) => list
                .first()
                .map(|e| ValidationError::new(&path, &describe(e))),
            ValidationErrorsKind::Struct(inner) => first_error_at(&path, inner),
            ValidationErrorsKind::List(items) => items
                .iter()
                .find_map(|(idx, inner)| first_error_at(&format!("{}[{}]", path, idx), inner)),
        };
        if found.is_some() {
            return found;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MealFoodItem, MealType};
    use crate::types::{NewMealLog, NewWorkoutProgram};
    use crate::models::Difficulty;
    use validator::Validate;

    #[test]
    fn test_field_display_labels() {
        assert_eq!(get_field_display_label("workoutsCount"), "Number of Workouts");
        assert_eq!(get_field_display_label("dailyCalories"), "Daily Calories");
        assert_eq!(get_field_display_label("unknown_field"), "unknown_field");
    }

    #[test]
    fn test_validation_error_label_uses_leaf() {
        let err = ValidationError::new("foodItems[0].calories", "must not be negative");
        assert_eq!(err.display_label, "Calories");
        assert_eq!(err.user_message(), "Calories: must not be negative");
    }

    #[test]
    fn test_first_error_reports_wire_field() {
        let new = NewWorkoutProgram {
            user_id: 1,
            name: "Split".to_string(),
            description: None,
            difficulty: Difficulty::Advanced,
            workouts_count: 0,
            tags: vec![],
        };
        let errors = new.validate().unwrap_err();
        let err = first_error(&errors).unwrap();
        assert_eq!(err.field, "workoutsCount");
        assert_eq!(err.message, "must be at least 1");
    }

    #[test]
    fn test_first_error_walks_nested_items() {
        let new = NewMealLog {
            user_id: 1,
            meal_type: MealType::Dinner,
            food_items: vec![MealFoodItem {
                id: 3,
                quantity: 1.0,
                name: "Chicken Breast".to_string(),
                calories: -5,
                protein: 31.0,
                carbs: 0.0,
                fat: 3.6,
            }],
            total_calories: 165,
            total_protein: 31.0,
            total_carbs: 0.0,
            total_fat: 3.6,
        };
        let errors = new.validate().unwrap_err();
        let err = first_error(&errors).unwrap();
        assert_eq!(err.field, "foodItems[0].calories");
    }

    #[test]
    fn test_wire_name() {
        assert_eq!(wire_name("weight_goal"), "weightGoal");
        assert_eq!(wire_name("name"), "name");
    }
}
