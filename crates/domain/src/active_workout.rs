//! Execution of a single workout
//!
//! A [`WorkoutSession`] holds everything that is shown while a workout is
//! performed: the workout, its exercises joined with their definitions, the
//! position of the current exercise, the sets of the current exercise and the
//! rest timer. Every operation of [`WorkoutSessionService`] takes the session
//! explicitly.

use crate::{
    CreateError, DeleteError, Exercise, ExerciseID, ExerciseSet, ExerciseSetID, ReadError,
    RestTimer, UpdateError, UserID, Workout, WorkoutExercise, WorkoutStatus, all_completed,
    avg_weight,
};

#[allow(async_fn_in_trait)]
pub trait WorkoutSessionService {
    /// Workouts that can be performed, most recently created first.
    async fn planned_workouts(&self, user_id: &UserID) -> Result<Vec<Workout>, ReadError>;
    /// Resume the active workout or start the most recently planned one.
    async fn load_workout_session(
        &self,
        user_id: &UserID,
    ) -> Result<Option<WorkoutSession>, SessionError>;
    async fn start_workout(&self, workout: Workout) -> Result<WorkoutSession, SessionError>;
    /// Load the sets of the current exercise, creating them on the first visit.
    async fn visit_exercise(&self, session: &mut WorkoutSession) -> Result<(), SessionError>;
    async fn toggle_set(
        &self,
        session: &mut WorkoutSession,
        set_id: &ExerciseSetID,
    ) -> Result<(), SessionError>;
    async fn set_weight(
        &self,
        session: &mut WorkoutSession,
        set_id: &ExerciseSetID,
        input: &str,
    ) -> Result<(), SessionError>;
    async fn go_to_exercise(
        &self,
        session: &mut WorkoutSession,
        index: usize,
    ) -> Result<(), SessionError>;
    async fn next_exercise(&self, session: &mut WorkoutSession) -> Result<(), SessionError> {
        let index = session.cursor().saturating_add(1);
        self.go_to_exercise(session, index).await
    }
    async fn previous_exercise(&self, session: &mut WorkoutSession) -> Result<(), SessionError> {
        let index = session.cursor().saturating_sub(1);
        self.go_to_exercise(session, index).await
    }
    async fn substitution_candidates(
        &self,
        session: &WorkoutSession,
    ) -> Result<Vec<Exercise>, SessionError>;
    /// Replace the current exercise, discarding its sets.
    async fn substitute_exercise(
        &self,
        session: &mut WorkoutSession,
        replacement: Exercise,
    ) -> Result<(), SessionError>;
    /// Record the progress of all exercises and mark the workout as completed.
    ///
    /// Either all records are written or, on failure, none of them.
    async fn complete_workout(&self, session: &mut WorkoutSession)
    -> Result<Workout, SessionError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionExercise {
    pub workout_exercise: WorkoutExercise,
    pub exercise: Exercise,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutSession {
    pub workout: Workout,
    pub exercises: Vec<SessionExercise>,
    cursor: usize,
    /// Sets of the current exercise, ordered by set number.
    pub sets: Vec<ExerciseSet>,
    pub timer: RestTimer,
}

impl WorkoutSession {
    #[must_use]
    pub fn new(workout: Workout, exercises: Vec<SessionExercise>) -> Self {
        Self {
            workout,
            exercises,
            cursor: 0,
            sets: vec![],
            timer: RestTimer::default(),
        }
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn current(&self) -> Option<&SessionExercise> {
        self.exercises.get(self.cursor)
    }

    pub fn current_mut(&mut self) -> Option<&mut SessionExercise> {
        self.exercises.get_mut(self.cursor)
    }

    /// 1-based position of the current exercise and the number of exercises.
    #[must_use]
    pub fn position(&self) -> (usize, usize) {
        if self.exercises.is_empty() {
            (0, 0)
        } else {
            (self.cursor + 1, self.exercises.len())
        }
    }

    #[must_use]
    pub fn completed_sets(&self) -> usize {
        self.sets.iter().filter(|s| s.completed).count()
    }

    #[must_use]
    pub fn is_first(&self) -> bool {
        self.cursor == 0
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.cursor + 1 >= self.exercises.len()
    }

    /// Move the cursor to the clamped index and reset the rest timer.
    ///
    /// Returns whether the cursor moved. The sets are cleared in that case.
    pub fn move_to(&mut self, index: usize) -> bool {
        let index = index.min(self.exercises.len().saturating_sub(1));
        self.timer.reset();
        if index == self.cursor {
            return false;
        }
        self.cursor = index;
        self.sets.clear();
        true
    }

    pub fn set_mut(&mut self, id: &ExerciseSetID) -> Result<&mut ExerciseSet, SessionError> {
        self.sets
            .iter_mut()
            .find(|s| s.id == *id)
            .ok_or_else(|| SessionError::UnknownSet(id.clone()))
    }

    #[must_use]
    pub fn contains_exercise(&self, exercise_id: &ExerciseID) -> bool {
        self.exercises
            .iter()
            .any(|e| e.workout_exercise.exercise_id == *exercise_id)
    }

    /// Catalog exercises that may replace the current exercise.
    #[must_use]
    pub fn substitution_candidates<'a>(&self, catalog: &'a [Exercise]) -> Vec<&'a Exercise> {
        let Some(current) = self.current() else {
            return vec![];
        };
        catalog
            .iter()
            .filter(|e| {
                current.exercise.is_interchangeable_with(e) && !self.contains_exercise(&e.id)
            })
            .collect()
    }
}

/// Progress of one workout exercise at the time the workout is completed.
#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseResult {
    pub weight: f32,
    pub achieved: bool,
}

impl ExerciseResult {
    /// Without sets the seeded weight is recorded and the exercise is not
    /// achieved.
    #[must_use]
    pub fn new(workout_exercise: &WorkoutExercise, sets: &[ExerciseSet]) -> Self {
        Self {
            weight: avg_weight(sets).unwrap_or(workout_exercise.current_weight),
            achieved: all_completed(sets),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum SessionError {
    #[error("Workout has no exercises")]
    NoExercise,
    #[error("Unknown set {0}")]
    UnknownSet(ExerciseSetID),
    #[error("{0} cannot replace the current exercise")]
    InvalidSubstitute(ExerciseID),
    #[error("Workout cannot change from {0} to {1}")]
    InvalidTransition(WorkoutStatus, WorkoutStatus),
    #[error(transparent)]
    Read(#[from] ReadError),
    #[error(transparent)]
    Create(#[from] CreateError),
    #[error(transparent)]
    Update(#[from] UpdateError),
    #[error(transparent)]
    Delete(#[from] DeleteError),
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use crate::{ExerciseType, MuscleGroup, Name, Reps, Sets, WeightType};

    use super::*;

    fn exercise(id: &str, muscle_group: MuscleGroup, exercise_type: ExerciseType) -> Exercise {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        Exercise {
            id: id.into(),
            user_id: "u1".into(),
            name: Name::new(id).unwrap(),
            muscle_group,
            weight_type: WeightType::Weighted,
            exercise_type,
            sets: Sets::new(3).unwrap(),
            reps: Reps::new(10).unwrap(),
            technique: None,
            equipment_setup: None,
            equipment_name: None,
            equipment_photo: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn set(set_number: u32, weight: f32, completed: bool) -> ExerciseSet {
        ExerciseSet {
            id: format!("s{set_number}").into(),
            workout_exercise_id: "we1".into(),
            set_number,
            reps: 10,
            weight,
            completed,
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap(),
        }
    }

    fn session(exercises: &[Exercise]) -> WorkoutSession {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        let workout = Workout::planned("u1".into(), vec![MuscleGroup::Chest], now);
        let exercises = exercises
            .iter()
            .enumerate()
            .map(|(i, e)| SessionExercise {
                workout_exercise: WorkoutExercise::new(
                    workout.id.clone(),
                    e.id.clone(),
                    u32::try_from(i).unwrap(),
                    40.0,
                    now,
                ),
                exercise: e.clone(),
            })
            .collect();
        WorkoutSession::new(workout, exercises)
    }

    #[rstest]
    #[case(0, 1, 1)]
    #[case(0, 2, 2)]
    #[case(2, 3, 2)]
    #[case(1, 0, 0)]
    #[case(0, 100, 2)]
    fn test_move_to_clamps(#[case] start: usize, #[case] index: usize, #[case] expected: usize) {
        let catalog = [
            exercise("bench", MuscleGroup::Chest, ExerciseType::Main),
            exercise("dips", MuscleGroup::Chest, ExerciseType::Auxiliary),
            exercise("fly", MuscleGroup::Chest, ExerciseType::Isolation),
        ];
        let mut session = session(&catalog);
        session.move_to(start);
        session.move_to(index);
        assert_eq!(session.cursor(), expected);
    }

    #[test]
    fn test_move_to_resets_timer() {
        let catalog = [exercise("bench", MuscleGroup::Chest, ExerciseType::Main)];
        let mut session = session(&catalog);
        session.sets = vec![set(1, 40.0, true)];
        session.timer.start();
        session.timer.tick();

        assert!(!session.move_to(1));

        assert_eq!(session.cursor(), 0);
        assert_eq!(session.timer, RestTimer::default());
        assert_eq!(session.sets.len(), 1);
    }

    #[test]
    fn test_move_to_without_exercises() {
        let mut session = session(&[]);
        assert!(!session.move_to(3));
        assert_eq!(session.cursor(), 0);
        assert_eq!(session.current(), None);
        assert_eq!(session.position(), (0, 0));
    }

    #[test]
    fn test_position() {
        let catalog = [
            exercise("bench", MuscleGroup::Chest, ExerciseType::Main),
            exercise("fly", MuscleGroup::Chest, ExerciseType::Isolation),
        ];
        let mut session = session(&catalog);
        assert_eq!(session.position(), (1, 2));
        assert!(session.is_first());
        assert!(session.move_to(1));
        assert_eq!(session.position(), (2, 2));
        assert!(session.is_last());
    }

    #[test]
    fn test_set_mut() {
        let mut session = session(&[exercise("bench", MuscleGroup::Chest, ExerciseType::Main)]);
        session.sets = vec![set(1, 40.0, false), set(2, 40.0, false)];

        session.set_mut(&"s2".into()).unwrap().completed = true;
        assert_eq!(session.completed_sets(), 1);

        assert!(matches!(
            session.set_mut(&"s3".into()),
            Err(SessionError::UnknownSet(id)) if id == ExerciseSetID::from("s3")
        ));
    }

    #[test]
    fn test_substitution_candidates() {
        let catalog = vec![
            exercise("bench", MuscleGroup::Chest, ExerciseType::Main),
            exercise("incline", MuscleGroup::Chest, ExerciseType::Main),
            exercise("floor", MuscleGroup::Chest, ExerciseType::Main),
            exercise("dips", MuscleGroup::Chest, ExerciseType::Auxiliary),
            exercise("row", MuscleGroup::Back, ExerciseType::Main),
        ];
        let session = session(&[catalog[0].clone(), catalog[1].clone()]);

        assert_eq!(
            session
                .substitution_candidates(&catalog)
                .iter()
                .map(|e| e.id.as_str())
                .collect::<Vec<_>>(),
            vec!["floor"]
        );
    }

    #[rstest]
    #[case(&[], 40.0, false)]
    #[case(&[set(1, 50.0, true), set(2, 52.5, true), set(3, 55.0, true)], 52.5, true)]
    #[case(&[set(1, 50.0, true), set(2, 50.0, false)], 50.0, false)]
    fn test_exercise_result(
        #[case] sets: &[ExerciseSet],
        #[case] weight: f32,
        #[case] achieved: bool,
    ) {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        let workout_exercise = WorkoutExercise::new("w1".into(), "e1".into(), 0, 40.0, now);
        let result = ExerciseResult::new(&workout_exercise, sets);
        assert_approx_eq!(result.weight, weight);
        assert_eq!(result.achieved, achieved);
    }
}
