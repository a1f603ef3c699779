//! Data models for the FitForge application
//!
//! These are the stored shapes of the seven entity types. The JSON form
//! (camelCase) is the REST wire format and the local mirror's record format.

use crate::errors::ModelError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

/// Default profile type assigned to new users
pub const DEFAULT_PROFILE_TYPE: &str = "Fitness Enthusiast";

// ============================================================================
// Enumerations
// ============================================================================

/// Workout program difficulty
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[serde(alias = "Beginner")]
    Beginner,
    #[serde(alias = "Intermediate")]
    Intermediate,
    #[serde(alias = "Advanced")]
    Advanced,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "beginner" => Ok(Difficulty::Beginner),
            "intermediate" => Ok(Difficulty::Intermediate),
            "advanced" => Ok(Difficulty::Advanced),
            _ => Err(ModelError::unknown("difficulty", s)),
        }
    }
}

/// Lifecycle of a single workout
///
/// The expected progression is `not_started -> in_progress -> completed`,
/// but any transition is accepted by the stores.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum WorkoutStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

impl WorkoutStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkoutStatus::NotStarted => "not_started",
            WorkoutStatus::InProgress => "in_progress",
            WorkoutStatus::Completed => "completed",
        }
    }

    /// Whether moving to `next` keeps the forward-only progression
    pub fn is_forward_transition(&self, next: WorkoutStatus) -> bool {
        next.rank() >= self.rank()
    }

    fn rank(&self) -> u8 {
        match self {
            WorkoutStatus::NotStarted => 0,
            WorkoutStatus::InProgress => 1,
            WorkoutStatus::Completed => 2,
        }
    }
}

impl fmt::Display for WorkoutStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkoutStatus {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_started" => Ok(WorkoutStatus::NotStarted),
            "in_progress" => Ok(WorkoutStatus::InProgress),
            "completed" => Ok(WorkoutStatus::Completed),
            _ => Err(ModelError::unknown("workout status", s)),
        }
    }
}

/// Meal slot of a meal log
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum MealType {
    #[serde(alias = "breakfast")]
    Breakfast,
    #[serde(alias = "lunch")]
    Lunch,
    #[serde(alias = "dinner")]
    Dinner,
    #[serde(alias = "snack")]
    Snack,
}

impl MealType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "Breakfast",
            MealType::Lunch => "Lunch",
            MealType::Dinner => "Dinner",
            MealType::Snack => "Snack",
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MealType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "breakfast" => Ok(MealType::Breakfast),
            "lunch" => Ok(MealType::Lunch),
            "dinner" => Ok(MealType::Dinner),
            "snack" => Ok(MealType::Snack),
            _ => Err(ModelError::unknown("meal type", s)),
        }
    }
}

// ============================================================================
// Entities
// ============================================================================

/// User account and nutrition/training targets
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i32,
    pub username: String,
    /// Never leaves the server: skipped on serialization, empty when absent
    #[serde(skip_serializing, default)]
    pub password: String,
    pub name: String,
    pub weight: Option<f64>,
    pub weight_goal: Option<f64>,
    pub daily_calories: Option<i32>,
    pub protein_target: Option<i32>,
    pub workouts_per_week: Option<i32>,
    pub profile_type: Option<String>,
}

/// A training plan owned by a user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutProgram {
    pub id: i32,
    pub user_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub difficulty: Difficulty,
    pub workouts_count: i32,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// A scheduled session inside a program
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Workout {
    pub id: i32,
    pub program_id: i32,
    pub name: String,
    pub description: Option<String>,
    /// Planned length in minutes
    pub duration: Option<i32>,
    #[serde(default)]
    pub status: WorkoutStatus,
    pub scheduled_day: Option<String>,
}

/// An exercise performed within a workout
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: i32,
    pub workout_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub sets: Option<i32>,
    pub reps: Option<i32>,
    pub weight: Option<f64>,
    #[serde(default)]
    pub completed: bool,
    pub notes: Option<String>,
}

/// A food in the user's personal database
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FoodItem {
    pub id: i32,
    pub user_id: i32,
    pub name: String,
    pub calories: i32,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub serving_size: Option<String>,
    pub barcode: Option<String>,
}

/// Denormalized food entry embedded in a meal log
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MealFoodItem {
    pub id: i32,
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub quantity: f64,
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
}

/// A logged meal with caller-computed macro totals
///
/// The totals are stored as given. They are not re-derived from
/// `food_items`; see [`MealLog::totals_mismatch`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MealLog {
    pub id: i32,
    pub user_id: i32,
    pub date: DateTime<Utc>,
    pub meal_type: MealType,
    pub food_items: Vec<MealFoodItem>,
    pub total_calories: i32,
    pub total_protein: f64,
    pub total_carbs: f64,
    pub total_fat: f64,
}

/// Daily progress snapshot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProgressLog {
    pub id: i32,
    pub user_id: i32,
    pub date: DateTime<Utc>,
    pub weight: Option<f64>,
    pub calories_consumed: Option<i32>,
    pub protein_consumed: Option<f64>,
    pub carbs_consumed: Option<f64>,
    pub fat_consumed: Option<f64>,
    pub workouts_completed: Option<i32>,
    pub exercises_completed: Option<i32>,
}
