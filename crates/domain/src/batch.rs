use log::{debug, warn};

use crate::{
    ExerciseProgressID, ExerciseProgressRepository, ExerciseSetID, ExerciseSetRepository,
    WorkoutExerciseID, WorkoutExerciseRepository, WorkoutID, WorkoutRepository,
};

/// Undo step for one write of a multi-row operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Compensation {
    DeleteWorkout(WorkoutID),
    DeleteWorkoutExercise(WorkoutExerciseID),
    DeleteExerciseSet(ExerciseSetID),
    DeleteExerciseProgress(ExerciseProgressID),
    RestoreWeightAchieved(WorkoutExerciseID, bool),
}

/// Multi-row write that is either applied completely or not at all.
///
/// The store has no transactions. Every successful write records how to undo
/// it, and on failure the recorded steps are applied in reverse order.
#[derive(Debug, Default)]
pub struct Batch {
    compensations: Vec<Compensation>,
}

impl Batch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, compensation: Compensation) {
        self.compensations.push(compensation);
    }

    #[must_use]
    pub fn compensations(&self) -> &[Compensation] {
        &self.compensations
    }

    pub fn commit(self) {
        debug!("committed batch of {} writes", self.compensations.len());
    }

    /// Undo all recorded writes, newest first.
    ///
    /// A failing undo step is logged and does not stop the remaining steps.
    pub async fn rollback<R>(self, repository: &R)
    where
        R: WorkoutRepository
            + WorkoutExerciseRepository
            + ExerciseSetRepository
            + ExerciseProgressRepository,
    {
        for compensation in self.compensations.into_iter().rev() {
            let result = match &compensation {
                Compensation::DeleteWorkout(id) => repository
                    .delete_workout(id)
                    .await
                    .map(|_| ())
                    .map_err(|err| err.to_string()),
                Compensation::DeleteWorkoutExercise(id) => repository
                    .delete_workout_exercise(id)
                    .await
                    .map(|_| ())
                    .map_err(|err| err.to_string()),
                Compensation::DeleteExerciseSet(id) => repository
                    .delete_exercise_set(id)
                    .await
                    .map(|_| ())
                    .map_err(|err| err.to_string()),
                Compensation::DeleteExerciseProgress(id) => repository
                    .delete_exercise_progress(id)
                    .await
                    .map(|_| ())
                    .map_err(|err| err.to_string()),
                Compensation::RestoreWeightAchieved(id, weight_achieved) => repository
                    .modify_workout_exercise(id, None, Some(*weight_achieved))
                    .await
                    .map(|_| ())
                    .map_err(|err| err.to_string()),
            };
            if let Err(err) = result {
                warn!("failed to undo {compensation:?}: {err}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_record() {
        let mut batch = Batch::new();
        batch.record(Compensation::DeleteWorkout("w1".into()));
        batch.record(Compensation::DeleteWorkoutExercise("we1".into()));
        assert_eq!(
            batch.compensations(),
            &[
                Compensation::DeleteWorkout("w1".into()),
                Compensation::DeleteWorkoutExercise("we1".into())
            ]
        );
    }
}
