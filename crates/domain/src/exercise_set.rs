use chrono::{DateTime, Utc};

use crate::{
    CreateError, DeleteError, Exercise, ReadError, UpdateError, WorkoutExercise,
    WorkoutExerciseID, id::string_id,
};

/// Ordering: `read_exercise_sets` returns the sets by `set_number`.
#[allow(async_fn_in_trait)]
pub trait ExerciseSetRepository {
    async fn read_exercise_sets(
        &self,
        workout_exercise_id: &WorkoutExerciseID,
    ) -> Result<Vec<ExerciseSet>, ReadError>;
    async fn create_exercise_set(&self, set: ExerciseSet) -> Result<ExerciseSet, CreateError>;
    async fn modify_exercise_set(
        &self,
        id: &ExerciseSetID,
        weight: Option<f32>,
        completed: Option<bool>,
    ) -> Result<ExerciseSet, UpdateError>;
    async fn delete_exercise_set(&self, id: &ExerciseSetID) -> Result<ExerciseSetID, DeleteError>;
}

string_id!(ExerciseSetID, "set");

/// One tracked set. Only `weight` and `completed` change after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseSet {
    pub id: ExerciseSetID,
    pub workout_exercise_id: WorkoutExerciseID,
    /// 1-based
    pub set_number: u32,
    pub reps: u32,
    pub weight: f32,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl ExerciseSet {
    #[must_use]
    pub fn volume(&self) -> f32 {
        #[allow(clippy::cast_precision_loss)]
        let reps = self.reps as f32;
        self.weight * reps
    }
}

/// The sets to create when a workout exercise is visited for the first time.
///
/// Reps are copied from the exercise definition, the weight from the weight
/// the workout exercise was seeded with.
#[must_use]
pub fn initial_sets(
    workout_exercise: &WorkoutExercise,
    exercise: &Exercise,
    now: DateTime<Utc>,
) -> Vec<ExerciseSet> {
    (1..=u32::from(exercise.sets))
        .map(|set_number| ExerciseSet {
            id: ExerciseSetID::generate(),
            workout_exercise_id: workout_exercise.id.clone(),
            set_number,
            reps: u32::from(exercise.reps),
            weight: workout_exercise.current_weight,
            completed: false,
            created_at: now,
        })
        .collect()
}

/// Mean weight of the given sets, `None` without sets.
#[must_use]
pub fn avg_weight(sets: &[ExerciseSet]) -> Option<f32> {
    if sets.is_empty() {
        None
    } else {
        #[allow(clippy::cast_precision_loss)]
        Some(sets.iter().map(|s| s.weight).sum::<f32>() / sets.len() as f32)
    }
}

/// Whether every set is completed. An exercise without sets is never achieved.
#[must_use]
pub fn all_completed(sets: &[ExerciseSet]) -> bool {
    !sets.is_empty() && sets.iter().all(|s| s.completed)
}
