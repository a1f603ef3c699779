//! Server data store
//!
//! [`Store`] is the authoritative repository object: one [`Repository`] per
//! entity type, constructed once at startup and handed to request handlers
//! through [`AppState`](crate::state::AppState). The backing implementation
//! is chosen by configuration.

use async_trait::async_trait;
use fitforge_shared::{
    Entity, Exercise, FoodItem, MealLog, ProgressLog, User, Workout, WorkoutProgram,
};
use sqlx::PgPool;
use std::sync::Arc;
use thiserror::Error;

pub mod memory;
pub mod postgres;
mod seed;

pub use memory::MemoryRepository;
pub use postgres::{PgEntity, PgRepository};

/// Store failures other than "not found"
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Storage backend error")]
    Backend(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// CRUD contract shared by every entity type
///
/// Absent ids are reported as `None` / `false`, never as errors.
#[async_trait]
pub trait Repository<E: Entity>: Send + Sync {
    /// Assign the next id, stamp creation time and store
    async fn create(&self, new: E::New) -> StoreResult<E>;

    async fn get(&self, id: i32) -> StoreResult<Option<E>>;

    /// Entities matching the filter, in id order
    async fn list(&self, filter: &E::Filter) -> StoreResult<Vec<E>>;

    /// Shallow-merge the patch into the stored entity
    async fn update(&self, id: i32, patch: E::Patch) -> StoreResult<Option<E>>;

    async fn delete(&self, id: i32) -> StoreResult<bool>;
}

/// Access to the repository of one entity type
pub trait HasRepository<E: Entity> {
    fn repository(&self) -> &Arc<dyn Repository<E>>;
}

#[derive(Clone)]
enum Backing {
    Memory,
    Postgres(PgPool),
}

/// The repository object for all seven entity types
#[derive(Clone)]
pub struct Store {
    users: Arc<dyn Repository<User>>,
    workout_programs: Arc<dyn Repository<WorkoutProgram>>,
    workouts: Arc<dyn Repository<Workout>>,
    exercises: Arc<dyn Repository<Exercise>>,
    food_items: Arc<dyn Repository<FoodItem>>,
    meal_logs: Arc<dyn Repository<MealLog>>,
    progress_logs: Arc<dyn Repository<ProgressLog>>,
    backing: Backing,
}

impl Store {
    /// In-memory store loaded with the demo data set
    pub fn seeded() -> anyhow::Result<Self> {
        let seed = seed::demo_data()?;
        Ok(Self {
            users: Arc::new(MemoryRepository::with_rows(seed.users)),
            workout_programs: Arc::new(MemoryRepository::with_rows(seed.workout_programs)),
            workouts: Arc::new(MemoryRepository::with_rows(seed.workouts)),
            exercises: Arc::new(MemoryRepository::with_rows(seed.exercises)),
            food_items: Arc::new(MemoryRepository::with_rows(seed.food_items)),
            meal_logs: Arc::new(MemoryRepository::with_rows(seed.meal_logs)),
            progress_logs: Arc::new(MemoryRepository::with_rows(seed.progress_logs)),
            backing: Backing::Memory,
        })
    }

    /// Empty in-memory store
    pub fn memory() -> Self {
        Self {
            users: Arc::new(MemoryRepository::<User>::new()),
            workout_programs: Arc::new(MemoryRepository::<WorkoutProgram>::new()),
            workouts: Arc::new(MemoryRepository::<Workout>::new()),
            exercises: Arc::new(MemoryRepository::<Exercise>::new()),
            food_items: Arc::new(MemoryRepository::<FoodItem>::new()),
            meal_logs: Arc::new(MemoryRepository::<MealLog>::new()),
            progress_logs: Arc::new(MemoryRepository::<ProgressLog>::new()),
            backing: Backing::Memory,
        }
    }

    /// Store over a migrated PostgreSQL database
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PgRepository::<User>::new(pool.clone())),
            workout_programs: Arc::new(PgRepository::<WorkoutProgram>::new(pool.clone())),
            workouts: Arc::new(PgRepository::<Workout>::new(pool.clone())),
            exercises: Arc::new(PgRepository::<Exercise>::new(pool.clone())),
            food_items: Arc::new(PgRepository::<FoodItem>::new(pool.clone())),
            meal_logs: Arc::new(PgRepository::<MealLog>::new(pool.clone())),
            progress_logs: Arc::new(PgRepository::<ProgressLog>::new(pool.clone())),
            backing: Backing::Postgres(pool),
        }
    }

    /// Repository for entity type `E`
    pub fn repo<E: Entity>(&self) -> &dyn Repository<E>
    where
        Self: HasRepository<E>,
    {
        &**<Self as HasRepository<E>>::repository(self)
    }

    pub fn backend_name(&self) -> &'static str {
        match self.backing {
            Backing::Memory => "memory",
            Backing::Postgres(_) => "postgres",
        }
    }

    /// Check the backing storage is reachable
    pub async fn health_check(&self) -> anyhow::Result<()> {
        match &self.backing {
            Backing::Memory => Ok(()),
            Backing::Postgres(pool) => crate::db::health_check(pool).await,
        }
    }
}

macro_rules! has_repository {
    ($($entity:ty => $field:ident),* $(,)?) => {
        $(
            impl HasRepository<$entity> for Store {
                fn repository(&self) -> &Arc<dyn Repository<$entity>> {
                    &self.$field
                }
            }
        )*
    };
}

has_repository! {
    User => users,
    WorkoutProgram => workout_programs,
    Workout => workouts,
    Exercise => exercises,
    FoodItem => food_items,
    MealLog => meal_logs,
    ProgressLog => progress_logs,
}
