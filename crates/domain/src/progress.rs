use chrono::{DateTime, Utc};

use crate::{CreateError, DeleteError, ExerciseID, ReadError, UserID, id::string_id};

/// Progress records are append-only. `delete_exercise_progress` only exists to
/// undo records of a completion that failed halfway.
///
/// Ordering: `read_exercise_progress` returns the most recent record first.
#[allow(async_fn_in_trait)]
pub trait ExerciseProgressRepository {
    async fn read_exercise_progress(
        &self,
        user_id: &UserID,
        exercise_id: Option<&ExerciseID>,
        limit: Option<usize>,
    ) -> Result<Vec<ExerciseProgress>, ReadError>;
    async fn create_exercise_progress(
        &self,
        progress: ExerciseProgress,
    ) -> Result<ExerciseProgress, CreateError>;
    async fn delete_exercise_progress(
        &self,
        id: &ExerciseProgressID,
    ) -> Result<ExerciseProgressID, DeleteError>;
}

string_id!(ExerciseProgressID, "progress");

#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseProgress {
    pub id: ExerciseProgressID,
    pub user_id: UserID,
    pub exercise_id: ExerciseID,
    /// Mean set weight of the exercise in one completed workout.
    pub weight: f32,
    pub achieved: bool,
    pub workout_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl ExerciseProgress {
    #[must_use]
    pub fn new(
        user_id: UserID,
        exercise_id: ExerciseID,
        weight: f32,
        achieved: bool,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ExerciseProgressID::generate(),
            user_id,
            exercise_id,
            weight,
            achieved,
            workout_date: now,
            created_at: now,
        }
    }
}
