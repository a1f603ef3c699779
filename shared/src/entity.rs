//! Generic entity contract
//!
//! Every stored record type implements [`Entity`], which ties it to its
//! insert contract, its partial update and its list filter. The server
//! repositories and the local mirror are written once against this trait.

use crate::errors::ModelError;
use crate::models::{
    Exercise, FoodItem, MealLog, ProgressLog, User, Workout, WorkoutProgram, DEFAULT_PROFILE_TYPE,
};
use crate::types::*;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

/// The seven entity stores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    #[serde(rename = "userProfile")]
    Users,
    #[serde(rename = "workoutPrograms")]
    WorkoutPrograms,
    #[serde(rename = "workouts")]
    Workouts,
    #[serde(rename = "exercises")]
    Exercises,
    #[serde(rename = "foodItems")]
    FoodItems,
    #[serde(rename = "mealLogs")]
    MealLogs,
    #[serde(rename = "progressLogs")]
    ProgressLogs,
}

impl EntityKind {
    /// Parents before children, the order replay prefers when timestamps tie
    pub const ALL: [EntityKind; 7] = [
        EntityKind::Users,
        EntityKind::WorkoutPrograms,
        EntityKind::Workouts,
        EntityKind::Exercises,
        EntityKind::FoodItems,
        EntityKind::MealLogs,
        EntityKind::ProgressLogs,
    ];

    /// Name of the local store (also the pending-operation `storeName`)
    pub fn store_name(&self) -> &'static str {
        match self {
            EntityKind::Users => "userProfile",
            EntityKind::WorkoutPrograms => "workoutPrograms",
            EntityKind::Workouts => "workouts",
            EntityKind::Exercises => "exercises",
            EntityKind::FoodItems => "foodItems",
            EntityKind::MealLogs => "mealLogs",
            EntityKind::ProgressLogs => "progressLogs",
        }
    }

    /// REST collection segment under `/api`
    pub fn api_path(&self) -> &'static str {
        match self {
            EntityKind::Users => "users",
            EntityKind::WorkoutPrograms => "workout-programs",
            EntityKind::Workouts => "workouts",
            EntityKind::Exercises => "exercises",
            EntityKind::FoodItems => "food-items",
            EntityKind::MealLogs => "meal-logs",
            EntityKind::ProgressLogs => "progress-logs",
        }
    }

    /// Human label used in messages ("Workout not found")
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Users => "User",
            EntityKind::WorkoutPrograms => "Workout program",
            EntityKind::Workouts => "Workout",
            EntityKind::Exercises => "Exercise",
            EntityKind::FoodItems => "Food item",
            EntityKind::MealLogs => "Meal log",
            EntityKind::ProgressLogs => "Progress log",
        }
    }

    /// Secondary indexes kept by both stores
    pub fn indexes(&self) -> &'static [&'static str] {
        match self {
            EntityKind::Users => &["username"],
            EntityKind::WorkoutPrograms => &["userId"],
            EntityKind::Workouts => &["programId"],
            EntityKind::Exercises => &["workoutId"],
            EntityKind::FoodItems => &["userId", "barcode"],
            EntityKind::MealLogs => &["userId", "date"],
            EntityKind::ProgressLogs => &["userId", "date"],
        }
    }

    /// Owner references: JSON field and the store it points into
    pub fn foreign_keys(&self) -> &'static [(&'static str, EntityKind)] {
        match self {
            EntityKind::Users => &[],
            EntityKind::WorkoutPrograms => &[("userId", EntityKind::Users)],
            EntityKind::Workouts => &[("programId", EntityKind::WorkoutPrograms)],
            EntityKind::Exercises => &[("workoutId", EntityKind::Workouts)],
            EntityKind::FoodItems => &[("userId", EntityKind::Users)],
            EntityKind::MealLogs => &[("userId", EntityKind::Users)],
            EntityKind::ProgressLogs => &[("userId", EntityKind::Users)],
        }
    }

    /// Position in [`EntityKind::ALL`]
    pub fn ordinal(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.store_name())
    }
}

impl FromStr for EntityKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityKind::ALL
            .into_iter()
            .find(|kind| kind.store_name() == s)
            .ok_or_else(|| ModelError::unknown("store", s))
    }
}

/// Value looked up through a secondary index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IndexValue {
    Int(i64),
    Text(String),
}

impl From<i32> for IndexValue {
    fn from(v: i32) -> Self {
        IndexValue::Int(v as i64)
    }
}

impl From<&str> for IndexValue {
    fn from(v: &str) -> Self {
        IndexValue::Text(v.to_string())
    }
}

impl From<String> for IndexValue {
    fn from(v: String) -> Self {
        IndexValue::Text(v)
    }
}

/// Secondary index lookup: `index == value`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexQuery {
    pub index: String,
    pub value: IndexValue,
}

impl IndexQuery {
    pub fn new(index: impl Into<String>, value: impl Into<IndexValue>) -> Self {
        Self {
            index: index.into(),
            value: value.into(),
        }
    }
}

/// A stored record type
pub trait Entity:
    Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    type New: Validate + Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static;
    type Patch: Validate
        + Default
        + Clone
        + fmt::Debug
        + Serialize
        + DeserializeOwned
        + Send
        + Sync
        + 'static;
    type Filter: Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static;

    const KIND: EntityKind;

    fn id(&self) -> i32;

    fn with_id(self, id: i32) -> Self;

    /// Build the stored record; `now` stamps `createdAt` / `date`
    fn from_new(id: i32, new: Self::New, now: DateTime<Utc>) -> Self;

    /// Shallow merge: present fields overwrite, absent ones are kept
    fn apply(&mut self, patch: Self::Patch);

    fn matches(&self, filter: &Self::Filter) -> bool;

    /// The index a store should scan for this filter, if any
    fn owner_index(filter: &Self::Filter) -> Option<IndexQuery>;

    /// Value that must be unique across the store
    fn unique_key(&self) -> Option<&str> {
        None
    }
}

/// Nullable fields pass `Option<Option<T>>`, so `Some(None)` clears them
fn merge<T>(slot: &mut T, value: Option<T>) {
    if let Some(v) = value {
        *slot = v;
    }
}

impl Entity for User {
    type New = NewUser;
    type Patch = UserPatch;
    type Filter = UserFilter;

    const KIND: EntityKind = EntityKind::Users;

    fn id(&self) -> i32 {
        self.id
    }

    fn with_id(mut self, id: i32) -> Self {
        self.id = id;
        self
    }

    fn from_new(id: i32, new: NewUser, _now: DateTime<Utc>) -> Self {
        User {
            id,
            username: new.username,
            password: new.password,
            name: new.name,
            weight: new.weight,
            weight_goal: new.weight_goal,
            daily_calories: new.daily_calories,
            protein_target: new.protein_target,
            workouts_per_week: new.workouts_per_week,
            profile_type: new
                .profile_type
                .or_else(|| Some(DEFAULT_PROFILE_TYPE.to_string())),
        }
    }

    fn apply(&mut self, patch: UserPatch) {
        merge(&mut self.username, patch.username);
        merge(&mut self.password, patch.password);
        merge(&mut self.name, patch.name);
        merge(&mut self.weight, patch.weight);
        merge(&mut self.weight_goal, patch.weight_goal);
        merge(&mut self.daily_calories, patch.daily_calories);
        merge(&mut self.protein_target, patch.protein_target);
        merge(&mut self.workouts_per_week, patch.workouts_per_week);
        merge(&mut self.profile_type, patch.profile_type);
    }

    fn matches(&self, filter: &UserFilter) -> bool {
        filter
            .username
            .as_deref()
            .map_or(true, |username| self.username == username)
    }

    fn owner_index(filter: &UserFilter) -> Option<IndexQuery> {
        filter
            .username
            .as_deref()
            .map(|username| IndexQuery::new("username", username))
    }

    fn unique_key(&self) -> Option<&str> {
        Some(&self.username)
    }
}

impl Entity for WorkoutProgram {
    type New = NewWorkoutProgram;
    type Patch = WorkoutProgramPatch;
    type Filter = ByUser;

    const KIND: EntityKind = EntityKind::WorkoutPrograms;

    fn id(&self) -> i32 {
        self.id
    }

    fn with_id(mut self, id: i32) -> Self {
        self.id = id;
        self
    }

    fn from_new(id: i32, new: NewWorkoutProgram, now: DateTime<Utc>) -> Self {
        WorkoutProgram {
            id,
            user_id: new.user_id,
            name: new.name,
            description: new.description,
            difficulty: new.difficulty,
            workouts_count: new.workouts_count,
            tags: new.tags,
            created_at: now,
        }
    }

    fn apply(&mut self, patch: WorkoutProgramPatch) {
        merge(&mut self.user_id, patch.user_id);
        merge(&mut self.name, patch.name);
        merge(&mut self.description, patch.description);
        merge(&mut self.difficulty, patch.difficulty);
        merge(&mut self.workouts_count, patch.workouts_count);
        merge(&mut self.tags, patch.tags);
    }

    fn matches(&self, filter: &ByUser) -> bool {
        self.user_id == filter.user_id
    }

    fn owner_index(filter: &ByUser) -> Option<IndexQuery> {
        Some(IndexQuery::new("userId", filter.user_id))
    }
}

impl Entity for Workout {
    type New = NewWorkout;
    type Patch = WorkoutPatch;
    type Filter = ByProgram;

    const KIND: EntityKind = EntityKind::Workouts;

    fn id(&self) -> i32 {
        self.id
    }

    fn with_id(mut self, id: i32) -> Self {
        self.id = id;
        self
    }

    fn from_new(id: i32, new: NewWorkout, _now: DateTime<Utc>) -> Self {
        Workout {
            id,
            program_id: new.program_id,
            name: new.name,
            description: new.description,
            duration: new.duration,
            status: new.status,
            scheduled_day: new.scheduled_day,
        }
    }

    fn apply(&mut self, patch: WorkoutPatch) {
        merge(&mut self.program_id, patch.program_id);
        merge(&mut self.name, patch.name);
        merge(&mut self.description, patch.description);
        merge(&mut self.duration, patch.duration);
        merge(&mut self.status, patch.status);
        merge(&mut self.scheduled_day, patch.scheduled_day);
    }

    fn matches(&self, filter: &ByProgram) -> bool {
        self.program_id == filter.program_id
    }

    fn owner_index(filter: &ByProgram) -> Option<IndexQuery> {
        Some(IndexQuery::new("programId", filter.program_id))
    }
}

impl Entity for Exercise {
    type New = NewExercise;
    type Patch = ExercisePatch;
    type Filter = ByWorkout;

    const KIND: EntityKind = EntityKind::Exercises;

    fn id(&self) -> i32 {
        self.id
    }

    fn with_id(mut self, id: i32) -> Self {
        self.id = id;
        self
    }

    fn from_new(id: i32, new: NewExercise, _now: DateTime<Utc>) -> Self {
        Exercise {
            id,
            workout_id: new.workout_id,
            name: new.name,
            description: new.description,
            sets: new.sets,
            reps: new.reps,
            weight: new.weight,
            completed: new.completed,
            notes: new.notes,
        }
    }

    fn apply(&mut self, patch: ExercisePatch) {
        merge(&mut self.workout_id, patch.workout_id);
        merge(&mut self.name, patch.name);
        merge(&mut self.description, patch.description);
        merge(&mut self.sets, patch.sets);
        merge(&mut self.reps, patch.reps);
        merge(&mut self.weight, patch.weight);
        merge(&mut self.completed, patch.completed);
        merge(&mut self.notes, patch.notes);
    }

    fn matches(&self, filter: &ByWorkout) -> bool {
        self.workout_id == filter.workout_id
    }

    fn owner_index(filter: &ByWorkout) -> Option<IndexQuery> {
        Some(IndexQuery::new("workoutId", filter.workout_id))
    }
}

impl Entity for FoodItem {
    type New = NewFoodItem;
    type Patch = FoodItemPatch;
    type Filter = FoodItemFilter;

    const KIND: EntityKind = EntityKind::FoodItems;

    fn id(&self) -> i32 {
        self.id
    }

    fn with_id(mut self, id: i32) -> Self {
        self.id = id;
        self
    }

    fn from_new(id: i32, new: NewFoodItem, _now: DateTime<Utc>) -> Self {
        FoodItem {
            id,
            user_id: new.user_id,
            name: new.name,
            calories: new.calories,
            protein: new.protein,
            carbs: new.carbs,
            fat: new.fat,
            serving_size: new.serving_size,
            barcode: new.barcode,
        }
    }

    fn apply(&mut self, patch: FoodItemPatch) {
        merge(&mut self.user_id, patch.user_id);
        merge(&mut self.name, patch.name);
        merge(&mut self.calories, patch.calories);
        merge(&mut self.protein, patch.protein);
        merge(&mut self.carbs, patch.carbs);
        merge(&mut self.fat, patch.fat);
        merge(&mut self.serving_size, patch.serving_size);
        merge(&mut self.barcode, patch.barcode);
    }

    fn matches(&self, filter: &FoodItemFilter) -> bool {
        let owner = filter.user_id.map_or(true, |id| self.user_id == id);
        let barcode = filter
            .barcode
            .as_deref()
            .map_or(true, |code| self.barcode.as_deref() == Some(code));
        owner && barcode
    }

    fn owner_index(filter: &FoodItemFilter) -> Option<IndexQuery> {
        match (filter.user_id, filter.barcode.as_deref()) {
            (Some(user_id), _) => Some(IndexQuery::new("userId", user_id)),
            (None, Some(code)) => Some(IndexQuery::new("barcode", code)),
            (None, None) => None,
        }
    }
}

impl Entity for MealLog {
    type New = NewMealLog;
    type Patch = MealLogPatch;
    type Filter = MealLogFilter;

    const KIND: EntityKind = EntityKind::MealLogs;

    fn id(&self) -> i32 {
        self.id
    }

    fn with_id(mut self, id: i32) -> Self {
        self.id = id;
        self
    }

    fn from_new(id: i32, new: NewMealLog, now: DateTime<Utc>) -> Self {
        MealLog {
            id,
            user_id: new.user_id,
            date: now,
            meal_type: new.meal_type,
            food_items: new.food_items,
            total_calories: new.total_calories,
            total_protein: new.total_protein,
            total_carbs: new.total_carbs,
            total_fat: new.total_fat,
        }
    }

    fn apply(&mut self, patch: MealLogPatch) {
        merge(&mut self.user_id, patch.user_id);
        merge(&mut self.meal_type, patch.meal_type);
        merge(&mut self.food_items, patch.food_items);
        merge(&mut self.total_calories, patch.total_calories);
        merge(&mut self.total_protein, patch.total_protein);
        merge(&mut self.total_carbs, patch.total_carbs);
        merge(&mut self.total_fat, patch.total_fat);
    }

    fn matches(&self, filter: &MealLogFilter) -> bool {
        self.user_id == filter.user_id
            && filter
                .date
                .map_or(true, |day| self.date.date_naive() == day)
    }

    fn owner_index(filter: &MealLogFilter) -> Option<IndexQuery> {
        Some(IndexQuery::new("userId", filter.user_id))
    }
}

impl Entity for ProgressLog {
    type New = NewProgressLog;
    type Patch = ProgressLogPatch;
    type Filter = ProgressLogFilter;

    const KIND: EntityKind = EntityKind::ProgressLogs;

    fn id(&self) -> i32 {
        self.id
    }

    fn with_id(mut self, id: i32) -> Self {
        self.id = id;
        self
    }

    fn from_new(id: i32, new: NewProgressLog, now: DateTime<Utc>) -> Self {
        ProgressLog {
            id,
            user_id: new.user_id,
            date: now,
            weight: new.weight,
            calories_consumed: new.calories_consumed,
            protein_consumed: new.protein_consumed,
            carbs_consumed: new.carbs_consumed,
            fat_consumed: new.fat_consumed,
            workouts_completed: new.workouts_completed,
            exercises_completed: new.exercises_completed,
        }
    }

    fn apply(&mut self, patch: ProgressLogPatch) {
        merge(&mut self.user_id, patch.user_id);
        merge(&mut self.weight, patch.weight);
        merge(&mut self.calories_consumed, patch.calories_consumed);
        merge(&mut self.protein_consumed, patch.protein_consumed);
        merge(&mut self.carbs_consumed, patch.carbs_consumed);
        merge(&mut self.fat_consumed, patch.fat_consumed);
        merge(&mut self.workouts_completed, patch.workouts_completed);
        merge(&mut self.exercises_completed, patch.exercises_completed);
    }

    fn matches(&self, filter: &ProgressLogFilter) -> bool {
        let day = self.date.date_naive();
        self.user_id == filter.user_id
            && filter.start_date.map_or(true, |start| day >= start)
            && filter.end_date.map_or(true, |end| day <= end)
    }

    fn owner_index(filter: &ProgressLogFilter) -> Option<IndexQuery> {
        Some(IndexQuery::new("userId", filter.user_id))
    }
}
