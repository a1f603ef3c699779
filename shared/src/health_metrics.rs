//! Nutrition and training metrics
//!
//! Pure calculations behind the dashboard: progress rings, daily macro
//! totals, workout completion, calorie needs and macro splits.

use crate::models::{Exercise, MealFoodItem, MealLog};
use serde::{Deserialize, Serialize};

/// Tolerance when comparing stored meal totals against their items
const TOTALS_EPSILON: f64 = 0.05;

// ============================================================================
// Progress
// ============================================================================

/// Percentage of `target` reached, rounded and capped at 100
///
/// Returns 0 when the target is 0.
pub fn calculate_percentage(value: f64, target: f64) -> u32 {
    if target == 0.0 {
        return 0;
    }
    let pct = ((value / target) * 100.0).round();
    pct.clamp(0.0, 100.0) as u32
}

/// Share of completed exercises as a rounded percentage, 0 for an empty workout
pub fn workout_progress(exercises: &[Exercise]) -> u32 {
    if exercises.is_empty() {
        return 0;
    }
    let done = exercises.iter().filter(|e| e.completed).count();
    ((done as f64 / exercises.len() as f64) * 100.0).round() as u32
}

/// Format a planned workout length ("45 mins", "1 hr", "1 hr 30 mins")
pub fn format_workout_duration(minutes: u32) -> String {
    if minutes < 60 {
        return format!("{} mins", minutes);
    }
    let hours = minutes / 60;
    let mins = minutes % 60;
    if mins > 0 {
        format!("{} hr {} mins", hours, mins)
    } else {
        format!("{} hr", hours)
    }
}

// ============================================================================
// Macro totals
// ============================================================================

/// Calories and macronutrients summed over meals or items
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MacroTotals {
    pub calories: i32,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl MacroTotals {
    /// Sum the embedded items of a meal, each scaled by its quantity
    pub fn from_items(items: &[MealFoodItem]) -> Self {
        items.iter().fold(MacroTotals::default(), |acc, item| MacroTotals {
            calories: acc.calories + (item.calories as f64 * item.quantity).round() as i32,
            protein: acc.protein + item.protein * item.quantity,
            carbs: acc.carbs + item.carbs * item.quantity,
            fat: acc.fat + item.fat * item.quantity,
        })
    }

    fn of_meal(meal: &MealLog) -> Self {
        MacroTotals {
            calories: meal.total_calories,
            protein: meal.total_protein,
            carbs: meal.total_carbs,
            fat: meal.total_fat,
        }
    }
}

/// Sum the stored totals of a day's meals
pub fn daily_totals(meals: &[MealLog]) -> MacroTotals {
    meals.iter().fold(MacroTotals::default(), |acc, meal| {
        let m = MacroTotals::of_meal(meal);
        MacroTotals {
            calories: acc.calories + m.calories,
            protein: acc.protein + m.protein,
            carbs: acc.carbs + m.carbs,
            fat: acc.fat + m.fat,
        }
    })
}

/// Stored totals that disagree with the embedded items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TotalsMismatch {
    pub stored: MacroTotals,
    pub computed: MacroTotals,
}

impl MealLog {
    /// Compare the caller-maintained totals against the item sum
    ///
    /// Meant for warnings only; stores accept mismatched totals.
    pub fn totals_mismatch(&self) -> Option<TotalsMismatch> {
        let stored = MacroTotals::of_meal(self);
        let computed = MacroTotals::from_items(&self.food_items);
        let close = |a: f64, b: f64| (a - b).abs() <= TOTALS_EPSILON;

        let agrees = stored.calories == computed.calories
            && close(stored.protein, computed.protein)
            && close(stored.carbs, computed.carbs)
            && close(stored.fat, computed.fat);
        if agrees {
            None
        } else {
            Some(TotalsMismatch { stored, computed })
        }
    }
}

// ============================================================================
// Energy needs
// ============================================================================

/// Biological sex for BMR calculation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BiologicalSex {
    Male,
    Female,
}

/// Activity level for daily calorie needs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum ActivityLevel {
    /// Little or no exercise
    Sedentary,
    /// Light exercise 1-3 days/week
    #[default]
    LightlyActive,
    /// Moderate exercise 3-5 days/week
    ModeratelyActive,
    /// Hard exercise 6-7 days/week
    VeryActive,
    /// Very hard exercise, physical job
    ExtraActive,
}

impl ActivityLevel {
    pub fn multiplier(&self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::LightlyActive => 1.375,
            ActivityLevel::ModeratelyActive => 1.55,
            ActivityLevel::VeryActive => 1.725,
            ActivityLevel::ExtraActive => 1.9,
        }
    }
}

/// Basal metabolic rate (Mifflin-St Jeor), weight in kg and height in cm
pub fn calculate_bmr(weight_kg: f64, height_cm: f64, age_years: u32, sex: BiologicalSex) -> f64 {
    let base = 10.0 * weight_kg + 6.25 * height_cm - 5.0 * age_years as f64;
    match sex {
        BiologicalSex::Male => base + 5.0,
        BiologicalSex::Female => base - 161.0,
    }
}

/// Daily calorie needs for an activity level, rounded
pub fn calculate_daily_calories(bmr: f64, activity: ActivityLevel) -> i32 {
    (bmr * activity.multiplier()).round() as i32
}

/// Direction of the user's weight goal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightGoal {
    Lose,
    Maintain,
    Gain,
}

impl WeightGoal {
    /// Protein / carbs / fat share of calories
    fn split(&self) -> (f64, f64, f64) {
        match self {
            WeightGoal::Lose => (0.4, 0.3, 0.3),
            WeightGoal::Maintain => (0.3, 0.4, 0.3),
            WeightGoal::Gain => (0.3, 0.5, 0.2),
        }
    }
}

/// Recommended grams per macronutrient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroTargets {
    pub protein: u32,
    pub carbs: u32,
    pub fat: u32,
}

/// Split a calorie budget into macro grams (4/4/9 kcal per gram)
pub fn calculate_macros(calories: f64, goal: WeightGoal) -> MacroTargets {
    let (protein, carbs, fat) = goal.split();
    MacroTargets {
        protein: (calories * protein / 4.0).round() as u32,
        carbs: (calories * carbs / 4.0).round() as u32,
        fat: (calories * fat / 9.0).round() as u32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MealType;
    use chrono::Utc;
    use proptest::prelude::*;

    fn item(name: &str, calories: i32, protein: f64, carbs: f64, fat: f64) -> MealFoodItem {
        MealFoodItem {
            id: 1,
            quantity: 1.0,
            name: name.to_string(),
            calories,
            protein,
            carbs,
            fat,
        }
    }

    fn breakfast() -> MealLog {
        MealLog {
            id: 1,
            user_id: 1,
            date: Utc::now(),
            meal_type: MealType::Breakfast,
            food_items: vec![
                item("Eggs", 180, 12.0, 2.0, 14.0),
                item("Avocado Toast", 220, 6.0, 22.0, 12.0),
            ],
            total_calories: 400,
            total_protein: 18.0,
            total_carbs: 24.0,
            total_fat: 26.0,
        }
    }

    fn exercise(completed: bool) -> Exercise {
        Exercise {
            id: 1,
            workout_id: 1,
            name: "Bench Press".to_string(),
            description: None,
            sets: Some(4),
            reps: Some(10),
            weight: Some(135.0),
            completed,
            notes: None,
        }
    }

    // =========================================================================
    // Progress Tests
    // =========================================================================

    #[test]
    fn test_percentage() {
        assert_eq!(calculate_percentage(1500.0, 2000.0), 75);
        assert_eq!(calculate_percentage(2500.0, 2000.0), 100);
        assert_eq!(calculate_percentage(10.0, 0.0), 0);
    }

    #[test]
    fn test_workout_progress() {
        assert_eq!(workout_progress(&[]), 0);
        assert_eq!(workout_progress(&[exercise(true), exercise(false)]), 50);
        assert_eq!(workout_progress(&[exercise(true), exercise(true)]), 100);
        assert_eq!(
            workout_progress(&[exercise(true), exercise(false), exercise(false)]),
            33
        );
    }

    #[test]
    fn test_format_workout_duration() {
        assert_eq!(format_workout_duration(45), "45 mins");
        assert_eq!(format_workout_duration(60), "1 hr");
        assert_eq!(format_workout_duration(90), "1 hr 30 mins");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Property: percentage never exceeds 100
        #[test]
        fn prop_percentage_bounded(value in 0.0f64..100_000.0, target in 0.0f64..10_000.0) {
            prop_assert!(calculate_percentage(value, target) <= 100);
        }
    }

    // =========================================================================
    // Totals Tests
    // =========================================================================

    #[test]
    fn test_daily_totals() {
        let mut lunch = breakfast();
        lunch.meal_type = MealType::Lunch;
        lunch.food_items = vec![item("Chicken Breast", 165, 31.0, 0.0, 3.6)];
        lunch.total_calories = 165;
        lunch.total_protein = 31.0;
        lunch.total_carbs = 0.0;
        lunch.total_fat = 3.6;

        let totals = daily_totals(&[breakfast(), lunch]);
        assert_eq!(totals.calories, 565);
        assert!((totals.protein - 49.0).abs() < 1e-9);
        assert!((totals.fat - 29.6).abs() < 1e-9);
    }

    #[test]
    fn test_totals_mismatch() {
        let meal = breakfast();
        assert!(meal.totals_mismatch().is_none());

        let mut off = meal;
        off.total_calories = 999;
        let mismatch = off.totals_mismatch().unwrap();
        assert_eq!(mismatch.computed.calories, 400);
        assert_eq!(mismatch.stored.calories, 999);
    }

    #[test]
    fn test_from_items_scales_by_quantity() {
        let mut eggs = item("Eggs", 180, 12.0, 2.0, 14.0);
        eggs.quantity = 2.0;
        let totals = MacroTotals::from_items(&[eggs]);
        assert_eq!(totals.calories, 360);
        assert!((totals.protein - 24.0).abs() < 1e-9);
    }

    // =========================================================================
    // Energy Tests
    // =========================================================================

    #[test]
    fn test_bmr_mifflin() {
        // 30yo male, 80kg, 180cm -> 1780
        let bmr = calculate_bmr(80.0, 180.0, 30, BiologicalSex::Male);
        assert!((bmr - 1780.0).abs() < 1e-9);

        let bmr = calculate_bmr(60.0, 165.0, 30, BiologicalSex::Female);
        assert!((bmr - 1320.25).abs() < 1e-9);
    }

    #[test]
    fn test_daily_calories() {
        assert_eq!(calculate_daily_calories(1780.0, ActivityLevel::ModeratelyActive), 2759);
        assert_eq!(calculate_daily_calories(1000.0, ActivityLevel::Sedentary), 1200);
    }

    #[test]
    fn test_macros_by_goal() {
        assert_eq!(
            calculate_macros(2000.0, WeightGoal::Lose),
            MacroTargets { protein: 200, carbs: 150, fat: 67 }
        );
        assert_eq!(
            calculate_macros(2000.0, WeightGoal::Maintain),
            MacroTargets { protein: 150, carbs: 200, fat: 67 }
        );
        assert_eq!(
            calculate_macros(2000.0, WeightGoal::Gain),
            MacroTargets { protein: 150, carbs: 250, fat: 44 }
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Property: Male BMR > Female BMR (same stats)
        #[test]
        fn prop_male_bmr_higher(
            weight in 50.0f64..100.0,
            height in 160.0f64..190.0,
            age in 20u32..60
        ) {
            let male = calculate_bmr(weight, height, age, BiologicalSex::Male);
            let female = calculate_bmr(weight, height, age, BiologicalSex::Female);
            prop_assert!(male > female);
        }

        /// Property: more activity never lowers the calorie need
        #[test]
        fn prop_activity_monotonic(bmr in 800.0f64..3000.0) {
            let low = calculate_daily_calories(bmr, ActivityLevel::Sedentary);
            let high = calculate_daily_calories(bmr, ActivityLevel::ExtraActive);
            prop_assert!(high > low);
        }
    }
}
