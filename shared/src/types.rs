//! API request and response types
//!
//! Insert contracts (`New*`), partial-update contracts (`*Patch`) and the
//! list filters shared by the REST layer and the local mirror.

use crate::models::{Difficulty, MealFoodItem, MealType, WorkoutStatus};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

// ============================================================================
// Insert contracts
// ============================================================================

/// Create user request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    #[validate(length(min = 1, max = 64, message = "must be between 1 and 64 characters"))]
    pub username: String,
    #[validate(length(min = 1, max = 128, message = "must be between 1 and 128 characters"))]
    pub password: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub name: String,
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub weight: Option<f64>,
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub weight_goal: Option<f64>,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub daily_calories: Option<i32>,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub protein_target: Option<i32>,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub workouts_per_week: Option<i32>,
    pub profile_type: Option<String>,
}

/// Create workout program request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewWorkoutProgram {
    pub user_id: i32,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub name: String,
    pub description: Option<String>,
    pub difficulty: Difficulty,
    #[validate(range(min = 1, message = "must be at least 1"))]
    pub workouts_count: i32,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Create workout request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewWorkout {
    pub program_id: i32,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub name: String,
    pub description: Option<String>,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub duration: Option<i32>,
    #[serde(default)]
    pub status: WorkoutStatus,
    pub scheduled_day: Option<String>,
}

/// Create exercise request
///
/// `sets` and `reps` are expected to be at least 1 but are not enforced.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewExercise {
    pub workout_id: i32,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub name: String,
    pub description: Option<String>,
    pub sets: Option<i32>,
    pub reps: Option<i32>,
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub weight: Option<f64>,
    #[serde(default)]
    pub completed: bool,
    pub notes: Option<String>,
}

/// Create food item request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewFoodItem {
    pub user_id: i32,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub name: String,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub calories: i32,
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub protein: f64,
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub carbs: f64,
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub fat: f64,
    pub serving_size: Option<String>,
    pub barcode: Option<String>,
}

/// Create meal log request; `date` is stamped by the store
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewMealLog {
    pub user_id: i32,
    pub meal_type: MealType,
    #[validate(nested)]
    pub food_items: Vec<MealFoodItem>,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub total_calories: i32,
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub total_protein: f64,
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub total_carbs: f64,
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub total_fat: f64,
}

/// Create progress log request; `date` is stamped by the store
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewProgressLog {
    pub user_id: i32,
    pub weight: Option<f64>,
    pub calories_consumed: Option<i32>,
    pub protein_consumed: Option<f64>,
    pub carbs_consumed: Option<f64>,
    pub fat_consumed: Option<f64>,
    pub workouts_completed: Option<i32>,
    pub exercises_completed: Option<i32>,
}

// ============================================================================
// Partial updates
// ============================================================================

// Nullable columns take `Option<Option<T>>`: a missing key keeps the stored
// value, an explicit `null` clears it.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Partial user update
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 64, message = "must be between 1 and 64 characters"))]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 128, message = "must be between 1 and 128 characters"))]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "must not be empty"))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub weight: Option<Option<f64>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub weight_goal: Option<Option<f64>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0, message = "must not be negative"))]
    pub daily_calories: Option<Option<i32>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0, message = "must not be negative"))]
    pub protein_target: Option<Option<i32>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0, message = "must not be negative"))]
    pub workouts_per_week: Option<Option<i32>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub profile_type: Option<Option<String>>,
}

/// Partial workout program update
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutProgramPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "must not be empty"))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, message = "must be at least 1"))]
    pub workouts_count: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

/// Partial workout update
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub program_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "must not be empty"))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0, message = "must not be negative"))]
    pub duration: Option<Option<i32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<WorkoutStatus>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub scheduled_day: Option<Option<String>>,
}

/// Partial exercise update
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ExercisePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workout_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "must not be empty"))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub sets: Option<Option<i32>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub reps: Option<Option<i32>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub weight: Option<Option<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub notes: Option<Option<String>>,
}

/// Partial food item update
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FoodItemPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "must not be empty"))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0, message = "must not be negative"))]
    pub calories: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub protein: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub carbs: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub fat: Option<f64>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub serving_size: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub barcode: Option<Option<String>>,
}

/// Partial meal log update
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MealLogPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meal_type: Option<MealType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub food_items: Option<Vec<MealFoodItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0, message = "must not be negative"))]
    pub total_calories: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub total_protein: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub total_carbs: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub total_fat: Option<f64>,
}

/// Partial progress log update
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProgressLogPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i32>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub weight: Option<Option<f64>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub calories_consumed: Option<Option<i32>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub protein_consumed: Option<Option<f64>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub carbs_consumed: Option<Option<f64>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub fat_consumed: Option<Option<f64>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub workouts_completed: Option<Option<i32>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub exercises_completed: Option<Option<i32>>,
}

// ============================================================================
// List filters (query strings)
// ============================================================================

/// Users are looked up by username only
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// `?userId=`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ByUser {
    pub user_id: i32,
}

/// `?programId=`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ByProgram {
    pub program_id: i32,
}

/// `?workoutId=`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ByWorkout {
    pub workout_id: i32,
}

/// Food items by owner and/or barcode
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodItemFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,
}

/// `?userId=&date=` with an optional calendar-day filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealLogFilter {
    pub user_id: i32,
    #[serde(
        default,
        deserialize_with = "day::deserialize_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<NaiveDate>,
}

/// `?userId=&startDate=&endDate=` with an inclusive day range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressLogFilter {
    pub user_id: i32,
    #[serde(
        default,
        deserialize_with = "day::deserialize_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub start_date: Option<NaiveDate>,
    #[serde(
        default,
        deserialize_with = "day::deserialize_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_date: Option<NaiveDate>,
}

/// Calendar-day parsing for query filters
///
/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp (reduced to its UTC day).
pub mod day {
    use crate::errors::ModelError;
    use chrono::{DateTime, NaiveDate, Utc};
    use serde::{Deserialize, Deserializer};

    pub fn parse(raw: &str) -> Result<NaiveDate, ModelError> {
        let raw = raw.trim();
        if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            return Ok(date);
        }
        DateTime::parse_from_rfc3339(raw)
            .map(|ts| ts.with_timezone(&Utc).date_naive())
            .map_err(|_| ModelError::InvalidDate(raw.to_string()))
    }

    pub fn deserialize_opt<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(raw) if raw.trim().is_empty() => Ok(None),
            Some(raw) => parse(&raw).map(Some).map_err(serde::de::Error::custom),
        }
    }
}

// ============================================================================
// Product catalog
// ============================================================================

/// Product returned by the barcode lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogProduct {
    pub name: String,
    pub calories: i32,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub serving_size: String,
}

impl CatalogProduct {
    /// Turn a scanned product into a food item for the user's database
    pub fn to_new_food_item(&self, user_id: i32, barcode: Option<String>) -> NewFoodItem {
        NewFoodItem {
            user_id,
            name: self.name.clone(),
            calories: self.calories,
            protein: self.protein,
            carbs: self.carbs,
            fat: self.fat,
            serving_size: Some(self.serving_size.clone()),
            barcode,
        }
    }
}

/// One food search hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodSearchResult {
    pub id: String,
    #[serde(flatten)]
    pub product: CatalogProduct,
}

/// `GET /api/food-search` response body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodSearchResponse {
    pub results: Vec<FoodSearchResult>,
}

/// `GET /api/food-search` query
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FoodSearchQuery {
    pub query: Option<String>,
}
