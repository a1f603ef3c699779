//! Demo data loaded into a fresh in-memory store

use crate::services::PasswordService;
use chrono::Utc;
use fitforge_shared::{
    Difficulty, Exercise, FoodItem, MealFoodItem, MealLog, MealType, ProgressLog, User, Workout,
    WorkoutProgram, WorkoutStatus, DEFAULT_PROFILE_TYPE,
};

pub(crate) struct SeedData {
    pub users: Vec<User>,
    pub workout_programs: Vec<WorkoutProgram>,
    pub workouts: Vec<Workout>,
    pub exercises: Vec<Exercise>,
    pub food_items: Vec<FoodItem>,
    pub meal_logs: Vec<MealLog>,
    pub progress_logs: Vec<ProgressLog>,
}

fn food(
    id: i32,
    name: &str,
    calories: i32,
    protein: f64,
    carbs: f64,
    fat: f64,
    serving: &str,
) -> FoodItem {
    FoodItem {
        id,
        user_id: 1,
        name: name.to_string(),
        calories,
        protein,
        carbs,
        fat,
        serving_size: Some(serving.to_string()),
        barcode: Some(String::new()),
    }
}

fn portion(item: &FoodItem) -> MealFoodItem {
    MealFoodItem {
        id: item.id,
        quantity: 1.0,
        name: item.name.clone(),
        calories: item.calories,
        protein: item.protein,
        carbs: item.carbs,
        fat: item.fat,
    }
}

/// One demo user (`demo` / `password`) with programs, a workout in progress
/// and today's breakfast and lunch
pub(crate) fn demo_data() -> anyhow::Result<SeedData> {
    let now = Utc::now();

    let users = vec![User {
        id: 1,
        username: "demo".to_string(),
        password: PasswordService::hash("password")?,
        name: "Alex Johnson".to_string(),
        weight: Some(180.0),
        weight_goal: Some(175.0),
        daily_calories: Some(2000),
        protein_target: Some(150),
        workouts_per_week: Some(4),
        profile_type: Some(DEFAULT_PROFILE_TYPE.to_string()),
    }];

    let workout_programs = vec![
        WorkoutProgram {
            id: 1,
            user_id: 1,
            name: "5-Day Split".to_string(),
            description: Some("Advanced workout program".to_string()),
            difficulty: Difficulty::Advanced,
            workouts_count: 5,
            tags: ["Chest & Triceps", "Back & Biceps", "Legs", "Shoulders"]
                .map(String::from)
                .to_vec(),
            created_at: now,
        },
        WorkoutProgram {
            id: 2,
            user_id: 1,
            name: "Full Body".to_string(),
            description: Some("Beginner workout program".to_string()),
            difficulty: Difficulty::Beginner,
            workouts_count: 3,
            tags: ["Monday", "Wednesday", "Friday"].map(String::from).to_vec(),
            created_at: now,
        },
    ];

    let workouts = vec![Workout {
        id: 1,
        program_id: 1,
        name: "Upper Body".to_string(),
        description: Some("Focus on chest and triceps".to_string()),
        duration: Some(45),
        status: WorkoutStatus::InProgress,
        scheduled_day: Some("Monday".to_string()),
    }];

    let exercises = vec![
        Exercise {
            id: 1,
            workout_id: 1,
            name: "Bench Press".to_string(),
            description: Some("Barbell bench press".to_string()),
            sets: Some(4),
            reps: Some(10),
            weight: Some(135.0),
            completed: true,
            notes: Some(String::new()),
        },
        Exercise {
            id: 2,
            workout_id: 1,
            name: "Push-ups".to_string(),
            description: Some("Standard push-ups".to_string()),
            sets: Some(3),
            reps: Some(15),
            weight: Some(0.0),
            completed: true,
            notes: Some(String::new()),
        },
    ];

    let eggs = food(1, "Eggs", 180, 12.0, 2.0, 14.0, "2 large eggs");
    let toast = food(2, "Avocado Toast", 220, 6.0, 22.0, 12.0, "1 slice, 1/2 avocado");
    let chicken = food(3, "Chicken Breast", 165, 31.0, 0.0, 3.6, "100g");

    let meal_logs = vec![
        MealLog {
            id: 1,
            user_id: 1,
            date: now,
            meal_type: MealType::Breakfast,
            food_items: vec![portion(&eggs), portion(&toast)],
            total_calories: 400,
            total_protein: 18.0,
            total_carbs: 24.0,
            total_fat: 26.0,
        },
        MealLog {
            id: 2,
            user_id: 1,
            date: now,
            meal_type: MealType::Lunch,
            food_items: vec![portion(&chicken)],
            total_calories: 165,
            total_protein: 31.0,
            total_carbs: 0.0,
            total_fat: 3.6,
        },
    ];

    Ok(SeedData {
        users,
        workout_programs,
        workouts,
        exercises,
        food_items: vec![eggs, toast, chicken],
        meal_logs,
        progress_logs: Vec::new(),
    })
}
