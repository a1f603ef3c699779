//! FitForge WASM Module
//!
//! Browser bindings for the progress and nutrition metrics shared with the
//! server. Structured inputs and outputs cross the boundary as JSON text in
//! the same camelCase shape as the REST API.

use fitforge_shared::{ActivityLevel, BiologicalSex, Exercise, MealLog, WeightGoal};
use serde::de::DeserializeOwned;
use serde::Serialize;
use wasm_bindgen::prelude::*;

fn parse<T: DeserializeOwned>(json: &str) -> Result<T, String> {
    serde_json::from_str(json).map_err(|e| e.to_string())
}

/// Enum from its wire name, e.g. `"veryActive"` or `"lose"`
fn parse_name<T: DeserializeOwned>(name: &str) -> Result<T, String> {
    serde_json::from_value(serde_json::Value::String(name.to_string()))
        .map_err(|_| format!("unknown value '{}'", name))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| e.to_string())
}

fn progress_of(exercises_json: &str) -> Result<u32, String> {
    let exercises: Vec<Exercise> = parse(exercises_json)?;
    Ok(fitforge_shared::workout_progress(&exercises))
}

fn totals_of(meals_json: &str) -> Result<String, String> {
    let meals: Vec<MealLog> = parse(meals_json)?;
    to_json(&fitforge_shared::daily_totals(&meals))
}

fn daily_calories(bmr: f64, activity: &str) -> Result<i32, String> {
    let level: ActivityLevel = parse_name(activity)?;
    Ok(fitforge_shared::calculate_daily_calories(bmr, level))
}

fn macros(calories: f64, goal: &str) -> Result<String, String> {
    let goal: WeightGoal = parse_name(goal)?;
    to_json(&fitforge_shared::calculate_macros(calories, goal))
}

/// `value / target` as a whole percentage capped at 100
#[wasm_bindgen(js_name = calculatePercentage)]
pub fn calculate_percentage(value: f64, target: f64) -> u32 {
    fitforge_shared::calculate_percentage(value, target)
}

/// Completed exercises over total, from a JSON array of exercises
#[wasm_bindgen(js_name = workoutProgress)]
pub fn workout_progress(exercises_json: &str) -> Result<u32, JsError> {
    progress_of(exercises_json).map_err(|e| JsError::new(&e))
}

/// Summed calories and macros of a JSON array of meal logs
#[wasm_bindgen(js_name = dailyTotals)]
pub fn daily_totals(meals_json: &str) -> Result<String, JsError> {
    totals_of(meals_json).map_err(|e| JsError::new(&e))
}

#[wasm_bindgen(js_name = formatWorkoutDuration)]
pub fn format_workout_duration(minutes: u32) -> String {
    fitforge_shared::format_workout_duration(minutes)
}

/// Basal metabolic rate (Mifflin-St Jeor)
#[wasm_bindgen(js_name = calculateBmr)]
pub fn calculate_bmr(weight_kg: f64, height_cm: f64, age_years: u32, is_male: bool) -> f64 {
    let sex = if is_male {
        BiologicalSex::Male
    } else {
        BiologicalSex::Female
    };
    fitforge_shared::calculate_bmr(weight_kg, height_cm, age_years, sex)
}

#[wasm_bindgen(js_name = calculateDailyCalories)]
pub fn calculate_daily_calories(bmr: f64, activity: &str) -> Result<i32, JsError> {
    daily_calories(bmr, activity).map_err(|e| JsError::new(&e))
}

/// Macro grams for a calorie budget as `{"protein","carbs","fat"}` JSON
#[wasm_bindgen(js_name = calculateMacros)]
pub fn calculate_macros(calories: f64, goal: &str) -> Result<String, JsError> {
    macros(calories, goal).map_err(|e| JsError::new(&e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_from_json() {
        let exercises = r#"[
            {"id": 1, "workoutId": 1, "name": "Bench Press", "completed": true},
            {"id": 2, "workoutId": 1, "name": "Push-ups", "completed": false}
        ]"#;
        assert_eq!(progress_of(exercises).unwrap(), 50);
        assert_eq!(progress_of("[]").unwrap(), 0);
        assert!(progress_of("{").is_err());
    }

    #[test]
    fn test_totals_from_json() {
        let meals = r#"[{
            "id": 1, "userId": 1, "date": "2024-06-04T08:00:00Z", "mealType": "Breakfast",
            "foodItems": [], "totalCalories": 400, "totalProtein": 18,
            "totalCarbs": 24, "totalFat": 26
        }]"#;
        let totals: serde_json::Value = serde_json::from_str(&totals_of(meals).unwrap()).unwrap();
        assert_eq!(totals["calories"], 400);
    }

    #[test]
    fn test_named_inputs() {
        assert_eq!(daily_calories(1000.0, "sedentary").unwrap(), 1200);
        assert!(daily_calories(1000.0, "couch").is_err());

        let targets: serde_json::Value =
            serde_json::from_str(&macros(2000.0, "maintain").unwrap()).unwrap();
        assert_eq!(targets["protein"], 150);
        assert_eq!(targets["carbs"], 200);
    }

    #[test]
    fn test_plain_exports() {
        assert_eq!(calculate_percentage(50.0, 200.0), 25);
        assert_eq!(format_workout_duration(90), "1 hr 30 mins");
        assert!((calculate_bmr(80.0, 180.0, 30, true) - 1780.0).abs() < 0.01);
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    #[wasm_bindgen_test]
    fn test_exports_across_boundary() {
        assert_eq!(workout_progress("[]").ok(), Some(0));
        assert!(calculate_macros(2000.0, "bulk").is_err());
    }
}
