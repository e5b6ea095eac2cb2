use std::fmt;

use chrono::{DateTime, Utc};

use crate::{
    CreateError, DeleteError, ExerciseID, MuscleGroup, Property, ReadError, UpdateError, UserID,
    id::string_id,
};

/// Ordering: `read_workouts` returns the most recently created workout first,
/// `read_completed_workouts` the most recently completed one.
#[allow(async_fn_in_trait)]
pub trait WorkoutRepository {
    async fn read_workouts(
        &self,
        user_id: &UserID,
        statuses: &[WorkoutStatus],
    ) -> Result<Vec<Workout>, ReadError>;
    async fn read_completed_workouts(&self, user_id: &UserID) -> Result<Vec<Workout>, ReadError>;
    async fn create_workout(&self, workout: Workout) -> Result<Workout, CreateError>;
    async fn modify_workout(
        &self,
        id: &WorkoutID,
        status: WorkoutStatus,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<Workout, UpdateError>;
    async fn delete_workout(&self, id: &WorkoutID) -> Result<WorkoutID, DeleteError>;
}

/// Ordering: `read_workout_exercises` returns the exercises by `order_index`.
#[allow(async_fn_in_trait)]
pub trait WorkoutExerciseRepository {
    async fn read_workout_exercises(
        &self,
        workout_id: &WorkoutID,
    ) -> Result<Vec<WorkoutExercise>, ReadError>;
    async fn create_workout_exercise(
        &self,
        workout_exercise: WorkoutExercise,
    ) -> Result<WorkoutExercise, CreateError>;
    async fn modify_workout_exercise(
        &self,
        id: &WorkoutExerciseID,
        exercise_id: Option<ExerciseID>,
        weight_achieved: Option<bool>,
    ) -> Result<WorkoutExercise, UpdateError>;
    async fn delete_workout_exercise(
        &self,
        id: &WorkoutExerciseID,
    ) -> Result<WorkoutExerciseID, DeleteError>;
}

string_id!(WorkoutID, "workout");
string_id!(WorkoutExerciseID, "workout_exercise");

#[derive(Debug, Clone, PartialEq)]
pub struct Workout {
    pub id: WorkoutID,
    pub user_id: UserID,
    pub name: String,
    pub muscle_groups: Vec<MuscleGroup>,
    pub status: WorkoutStatus,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Workout {
    #[must_use]
    pub fn planned(user_id: UserID, muscle_groups: Vec<MuscleGroup>, now: DateTime<Utc>) -> Self {
        Self {
            id: WorkoutID::generate(),
            user_id,
            name: Workout::default_name(&muscle_groups),
            muscle_groups,
            status: WorkoutStatus::Planned,
            created_at: now,
            completed_at: None,
        }
    }

    #[must_use]
    pub fn default_name(muscle_groups: &[MuscleGroup]) -> String {
        format!(
            "Тренировка {}",
            muscle_groups
                .iter()
                .map(|m| m.name())
                .collect::<Vec<_>>()
                .join(", ")
        )
    }

    /// The single muscle group kept for readers of the old record format.
    #[must_use]
    pub fn legacy_muscle_group(&self) -> Option<MuscleGroup> {
        self.muscle_groups.first().copied()
    }
}

/// Lifecycle of a workout. Transitions only move forward.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub enum WorkoutStatus {
    #[default]
    Planned,
    Active,
    Completed,
}

impl WorkoutStatus {
    #[must_use]
    pub fn can_transition_to(self, next: WorkoutStatus) -> bool {
        next > self
    }

    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            WorkoutStatus::Planned => "planned",
            WorkoutStatus::Active => "active",
            WorkoutStatus::Completed => "completed",
        }
    }
}

impl TryFrom<&str> for WorkoutStatus {
    type Error = WorkoutStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "planned" => Ok(WorkoutStatus::Planned),
            "active" => Ok(WorkoutStatus::Active),
            "completed" => Ok(WorkoutStatus::Completed),
            _ => Err(WorkoutStatusError::Unknown(value.to_string())),
        }
    }
}

impl fmt::Display for WorkoutStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum WorkoutStatusError {
    #[error("Unknown workout status: {0:?}")]
    Unknown(String),
}

/// Position of an exercise within a workout.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutExercise {
    pub id: WorkoutExerciseID,
    pub workout_id: WorkoutID,
    pub exercise_id: ExerciseID,
    pub order_index: u32,
    /// Seeded from the latest progress record of the exercise.
    pub current_weight: f32,
    pub weight_achieved: bool,
    pub created_at: DateTime<Utc>,
}

impl WorkoutExercise {
    #[must_use]
    pub fn new(
        workout_id: WorkoutID,
        exercise_id: ExerciseID,
        order_index: u32,
        current_weight: f32,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: WorkoutExerciseID::generate(),
            workout_id,
            exercise_id,
            order_index,
            current_weight,
            weight_achieved: false,
            created_at: now,
        }
    }
}
