//! PostgreSQL repository
//!
//! One generic [`PgRepository`] serves every entity type. Each entity
//! describes its table through [`PgEntity`]: the column values it writes,
//! the conditions its list filter turns into, and how to read a row back.
//! Updates load the row under `FOR UPDATE`, merge the patch in Rust and
//! write every column back, so both backends share one merge rule.

use super::{Repository, StoreError, StoreResult};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use fitforge_shared::{
    ByProgram, ByUser, ByWorkout, Entity, Exercise, FoodItem, FoodItemFilter, MealFoodItem,
    MealLog, MealLogFilter, ModelError, ProgressLog, ProgressLogFilter, User, UserFilter, Workout,
    WorkoutProgram,
};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use std::marker::PhantomData;
use std::str::FromStr;
use tracing::debug;

/// A bindable column value
#[derive(Debug, Clone)]
pub enum SqlValue {
    Int(Option<i32>),
    Float(Option<f64>),
    Text(Option<String>),
    Bool(bool),
    Timestamp(DateTime<Utc>),
    Json(serde_json::Value),
    TextArray(Vec<String>),
}

impl SqlValue {
    fn bind(self, qb: &mut QueryBuilder<'_, Postgres>) {
        match self {
            SqlValue::Int(v) => qb.push_bind(v),
            SqlValue::Float(v) => qb.push_bind(v),
            SqlValue::Text(v) => qb.push_bind(v),
            SqlValue::Bool(v) => qb.push_bind(v),
            SqlValue::Timestamp(v) => qb.push_bind(v),
            SqlValue::Json(v) => qb.push_bind(Json(v)),
            SqlValue::TextArray(v) => qb.push_bind(v),
        };
    }
}

/// A list filter condition
#[derive(Debug, Clone)]
pub enum Condition {
    Eq(&'static str, SqlValue),
    /// Timestamp column falls on this UTC day
    OnDay(&'static str, NaiveDate),
    FromDay(&'static str, NaiveDate),
    UntilDay(&'static str, NaiveDate),
}

impl Condition {
    fn push(self, qb: &mut QueryBuilder<'_, Postgres>) {
        qb.push(" AND ");
        match self {
            Condition::Eq(col, value) => {
                qb.push(col).push(" = ");
                value.bind(qb);
            }
            Condition::OnDay(col, day) => {
                qb.push(format!("({} AT TIME ZONE 'UTC')::date = ", col))
                    .push_bind(day);
            }
            Condition::FromDay(col, day) => {
                qb.push(format!("({} AT TIME ZONE 'UTC')::date >= ", col))
                    .push_bind(day);
            }
            Condition::UntilDay(col, day) => {
                qb.push(format!("({} AT TIME ZONE 'UTC')::date <= ", col))
                    .push_bind(day);
            }
        }
    }
}

/// Table mapping for an entity type
pub trait PgEntity: Entity {
    const TABLE: &'static str;

    /// Every column except `id`
    fn values(&self) -> Vec<(&'static str, SqlValue)>;

    fn conditions(filter: &Self::Filter) -> Vec<Condition>;

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error>;
}

fn parse_column<T>(row: &PgRow, column: &str) -> Result<T, sqlx::Error>
where
    T: FromStr<Err = ModelError>,
{
    let raw: String = row.try_get(column)?;
    raw.parse()
        .map_err(|e: ModelError| sqlx::Error::Decode(Box::new(e)))
}

fn classify(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return StoreError::Conflict(db.message().to_string());
        }
    }
    StoreError::Backend(err)
}

/// Repository over one table
pub struct PgRepository<E> {
    pool: PgPool,
    _entity: PhantomData<fn() -> E>,
}

impl<E: PgEntity> PgRepository<E> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _entity: PhantomData,
        }
    }
}

#[async_trait]
impl<E: PgEntity> Repository<E> for PgRepository<E> {
    async fn create(&self, new: E::New) -> StoreResult<E> {
        let draft = E::from_new(0, new, Utc::now());
        let values = draft.values();

        let mut qb = QueryBuilder::<Postgres>::new(format!("INSERT INTO {} (", E::TABLE));
        let columns: Vec<&str> = values.iter().map(|(col, _)| *col).collect();
        qb.push(columns.join(", ")).push(") VALUES (");
        for (i, (_, value)) in values.into_iter().enumerate() {
            if i > 0 {
                qb.push(", ");
            }
            value.bind(&mut qb);
        }
        qb.push(") RETURNING id");

        let id: i32 = qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(classify)?;
        debug!(store = %E::KIND, id, "Created row");
        Ok(draft.with_id(id))
    }

    async fn get(&self, id: i32) -> StoreResult<Option<E>> {
        let row = sqlx::query(&format!("SELECT * FROM {} WHERE id = $1", E::TABLE))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(E::from_row).transpose()?)
    }

    async fn list(&self, filter: &E::Filter) -> StoreResult<Vec<E>> {
        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT * FROM {} WHERE TRUE", E::TABLE));
        for condition in E::conditions(filter) {
            condition.push(&mut qb);
        }
        qb.push(" ORDER BY id");

        let rows = qb.build().fetch_all(&self.pool).await?;
        Ok(rows
            .iter()
            .map(E::from_row)
            .collect::<Result<Vec<E>, sqlx::Error>>()?)
    }

    async fn update(&self, id: i32, patch: E::Patch) -> StoreResult<Option<E>> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(&format!(
            "SELECT * FROM {} WHERE id = $1 FOR UPDATE",
            E::TABLE
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(row) = row else {
            return Ok(None);
        };

        let mut entity = E::from_row(&row)?;
        entity.apply(patch);

        let mut qb = QueryBuilder::<Postgres>::new(format!("UPDATE {} SET ", E::TABLE));
        for (i, (col, value)) in entity.values().into_iter().enumerate() {
            if i > 0 {
                qb.push(", ");
            }
            qb.push(col).push(" = ");
            value.bind(&mut qb);
        }
        qb.push(" WHERE id = ").push_bind(id);
        qb.build().execute(&mut *tx).await.map_err(classify)?;

        tx.commit().await?;
        debug!(store = %E::KIND, id, "Updated row");
        Ok(Some(entity))
    }

    async fn delete(&self, id: i32) -> StoreResult<bool> {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE id = $1", E::TABLE))
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

// ============================================================================
// Table mappings
// ============================================================================

impl PgEntity for User {
    const TABLE: &'static str = "users";

    fn values(&self) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("username", SqlValue::Text(Some(self.username.clone()))),
            ("password", SqlValue::Text(Some(self.password.clone()))),
            ("name", SqlValue::Text(Some(self.name.clone()))),
            ("weight", SqlValue::Float(self.weight)),
            ("weight_goal", SqlValue::Float(self.weight_goal)),
            ("daily_calories", SqlValue::Int(self.daily_calories)),
            ("protein_target", SqlValue::Int(self.protein_target)),
            ("workouts_per_week", SqlValue::Int(self.workouts_per_week)),
            ("profile_type", SqlValue::Text(self.profile_type.clone())),
        ]
    }

    fn conditions(filter: &UserFilter) -> Vec<Condition> {
        filter
            .username
            .iter()
            .map(|u| Condition::Eq("username", SqlValue::Text(Some(u.clone()))))
            .collect()
    }

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(User {
            id: row.try_get("id")?,
            username: row.try_get("username")?,
            password: row.try_get("password")?,
            name: row.try_get("name")?,
            weight: row.try_get("weight")?,
            weight_goal: row.try_get("weight_goal")?,
            daily_calories: row.try_get("daily_calories")?,
            protein_target: row.try_get("protein_target")?,
            workouts_per_week: row.try_get("workouts_per_week")?,
            profile_type: row.try_get("profile_type")?,
        })
    }
}

impl PgEntity for WorkoutProgram {
    const TABLE: &'static str = "workout_programs";

    fn values(&self) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("user_id", SqlValue::Int(Some(self.user_id))),
            ("name", SqlValue::Text(Some(self.name.clone()))),
            ("description", SqlValue::Text(self.description.clone())),
            ("difficulty", SqlValue::Text(Some(self.difficulty.to_string()))),
            ("workouts_count", SqlValue::Int(Some(self.workouts_count))),
            ("tags", SqlValue::TextArray(self.tags.clone())),
            ("created_at", SqlValue::Timestamp(self.created_at)),
        ]
    }

    fn conditions(filter: &ByUser) -> Vec<Condition> {
        vec![Condition::Eq("user_id", SqlValue::Int(Some(filter.user_id)))]
    }

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(WorkoutProgram {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            difficulty: parse_column(row, "difficulty")?,
            workouts_count: row.try_get("workouts_count")?,
            tags: row.try_get("tags")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

impl PgEntity for Workout {
    const TABLE: &'static str = "workouts";

    fn values(&self) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("program_id", SqlValue::Int(Some(self.program_id))),
            ("name", SqlValue::Text(Some(self.name.clone()))),
            ("description", SqlValue::Text(self.description.clone())),
            ("duration", SqlValue::Int(self.duration)),
            ("status", SqlValue::Text(Some(self.status.to_string()))),
            ("scheduled_day", SqlValue::Text(self.scheduled_day.clone())),
        ]
    }

    fn conditions(filter: &ByProgram) -> Vec<Condition> {
        vec![Condition::Eq("program_id", SqlValue::Int(Some(filter.program_id)))]
    }

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Workout {
            id: row.try_get("id")?,
            program_id: row.try_get("program_id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            duration: row.try_get("duration")?,
            status: parse_column(row, "status")?,
            scheduled_day: row.try_get("scheduled_day")?,
        })
    }
}

impl PgEntity for Exercise {
    const TABLE: &'static str = "exercises";

    fn values(&self) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("workout_id", SqlValue::Int(Some(self.workout_id))),
            ("name", SqlValue::Text(Some(self.name.clone()))),
            ("description", SqlValue::Text(self.description.clone())),
            ("sets", SqlValue::Int(self.sets)),
            ("reps", SqlValue::Int(self.reps)),
            ("weight", SqlValue::Float(self.weight)),
            ("completed", SqlValue::Bool(self.completed)),
            ("notes", SqlValue::Text(self.notes.clone())),
        ]
    }

    fn conditions(filter: &ByWorkout) -> Vec<Condition> {
        vec![Condition::Eq("workout_id", SqlValue::Int(Some(filter.workout_id)))]
    }

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Exercise {
            id: row.try_get("id")?,
            workout_id: row.try_get("workout_id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            sets: row.try_get("sets")?,
            reps: row.try_get("reps")?,
            weight: row.try_get("weight")?,
            completed: row.try_get("completed")?,
            notes: row.try_get("notes")?,
        })
    }
}

impl PgEntity for FoodItem {
    const TABLE: &'static str = "food_items";

    fn values(&self) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("user_id", SqlValue::Int(Some(self.user_id))),
            ("name", SqlValue::Text(Some(self.name.clone()))),
            ("calories", SqlValue::Int(Some(self.calories))),
            ("protein", SqlValue::Float(Some(self.protein))),
            ("carbs", SqlValue::Float(Some(self.carbs))),
            ("fat", SqlValue::Float(Some(self.fat))),
            ("serving_size", SqlValue::Text(self.serving_size.clone())),
            ("barcode", SqlValue::Text(self.barcode.clone())),
        ]
    }

    fn conditions(filter: &FoodItemFilter) -> Vec<Condition> {
        let mut conditions = Vec::new();
        if let Some(user_id) = filter.user_id {
            conditions.push(Condition::Eq("user_id", SqlValue::Int(Some(user_id))));
        }
        if let Some(code) = &filter.barcode {
            conditions.push(Condition::Eq("barcode", SqlValue::Text(Some(code.clone()))));
        }
        conditions
    }

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(FoodItem {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            name: row.try_get("name")?,
            calories: row.try_get("calories")?,
            protein: row.try_get("protein")?,
            carbs: row.try_get("carbs")?,
            fat: row.try_get("fat")?,
            serving_size: row.try_get("serving_size")?,
            barcode: row.try_get("barcode")?,
        })
    }
}

impl PgEntity for MealLog {
    const TABLE: &'static str = "meal_logs";

    fn values(&self) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("user_id", SqlValue::Int(Some(self.user_id))),
            ("date", SqlValue::Timestamp(self.date)),
            ("meal_type", SqlValue::Text(Some(self.meal_type.to_string()))),
            (
                "food_items",
                SqlValue::Json(serde_json::to_value(&self.food_items).unwrap_or_default()),
            ),
            ("total_calories", SqlValue::Int(Some(self.total_calories))),
            ("total_protein", SqlValue::Float(Some(self.total_protein))),
            ("total_carbs", SqlValue::Float(Some(self.total_carbs))),
            ("total_fat", SqlValue::Float(Some(self.total_fat))),
        ]
    }

    fn conditions(filter: &MealLogFilter) -> Vec<Condition> {
        let mut conditions = vec![Condition::Eq("user_id", SqlValue::Int(Some(filter.user_id)))];
        if let Some(day) = filter.date {
            conditions.push(Condition::OnDay("date", day));
        }
        conditions
    }

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        let Json(food_items): Json<Vec<MealFoodItem>> = row.try_get("food_items")?;
        Ok(MealLog {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            date: row.try_get("date")?,
            meal_type: parse_column(row, "meal_type")?,
            food_items,
            total_calories: row.try_get("total_calories")?,
            total_protein: row.try_get("total_protein")?,
            total_carbs: row.try_get("total_carbs")?,
            total_fat: row.try_get("total_fat")?,
        })
    }
}

impl PgEntity for ProgressLog {
    const TABLE: &'static str = "progress_logs";

    fn values(&self) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("user_id", SqlValue::Int(Some(self.user_id))),
            ("date", SqlValue::Timestamp(self.date)),
            ("weight", SqlValue::Float(self.weight)),
            ("calories_consumed", SqlValue::Int(self.calories_consumed)),
            ("protein_consumed", SqlValue::Float(self.protein_consumed)),
            ("carbs_consumed", SqlValue::Float(self.carbs_consumed)),
            ("fat_consumed", SqlValue::Float(self.fat_consumed)),
            ("workouts_completed", SqlValue::Int(self.workouts_completed)),
            ("exercises_completed", SqlValue::Int(self.exercises_completed)),
        ]
    }

    fn conditions(filter: &ProgressLogFilter) -> Vec<Condition> {
        let mut conditions = vec![Condition::Eq("user_id", SqlValue::Int(Some(filter.user_id)))];
        if let Some(start) = filter.start_date {
            conditions.push(Condition::FromDay("date", start));
        }
        if let Some(end) = filter.end_date {
            conditions.push(Condition::UntilDay("date", end));
        }
        conditions
    }

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(ProgressLog {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            date: row.try_get("date")?,
            weight: row.try_get("weight")?,
            calories_consumed: row.try_get("calories_consumed")?,
            protein_consumed: row.try_get("protein_consumed")?,
            carbs_consumed: row.try_get("carbs_consumed")?,
            fat_consumed: row.try_get("fat_consumed")?,
            workouts_completed: row.try_get("workouts_completed")?,
            exercises_completed: row.try_get("exercises_completed")?,
        })
    }
}
