use chrono::Utc;
use futures_util::future::join_all;
use log::{debug, error, warn};

use crate::{
    Batch, Compensation, CreateError, DeleteError, Exercise, ExerciseDraft, ExerciseID,
    ExerciseProgress, ExerciseProgressRepository, ExerciseRepository, ExerciseResult,
    ExerciseService, ExerciseSet, ExerciseSetID, ExerciseSetRepository, GeneratorError, History,
    HistoryService, ReadError, SessionError, SessionExercise, SessionRepository, SessionService,
    Settings, SettingsRepository, SettingsService, UpdateError, User, UserID, Workout,
    WorkoutDetails, WorkoutExercise, WorkoutExerciseDetails, WorkoutExerciseID,
    WorkoutExerciseRepository, WorkoutGeneratorService, WorkoutPlan, WorkoutRepository,
    WorkoutSession, WorkoutSessionService, WorkoutStatus, initial_sets, parse_weight,
};

pub struct Service<R> {
    repository: R,
}

impl<R> Service<R> {
    #[must_use]
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    #[must_use]
    pub fn repository(&self) -> &R {
        &self.repository
    }
}

macro_rules! log_on_error {
    ($func: expr, $error: ident, $action: literal, $entity: literal) => {{
        let result = $func.await;
        match result {
            Ok(_) => {}
            Err(ref err) => match err {
                $error::Storage(crate::StorageError::NoConnection) => {
                    debug!("failed to {} {}: {err}", $action, $entity);
                }
                _ => {
                    error!("failed to {} {}: {err}", $action, $entity);
                }
            },
        }
        result
    }};
}

impl<R: SessionRepository> SessionService for Service<R> {
    async fn get_session(&self) -> Result<User, ReadError> {
        log_on_error!(
            self.repository.current_user(),
            ReadError,
            "get",
            "session"
        )
    }

    async fn request_session(&self, user: User) -> Result<User, ReadError> {
        log_on_error!(
            self.repository.login(user),
            ReadError,
            "request",
            "session"
        )
    }

    async fn delete_session(&self) -> Result<(), DeleteError> {
        log_on_error!(
            self.repository.logout(),
            DeleteError,
            "delete",
            "session"
        )
    }
}

impl<R: SettingsRepository> SettingsService for Service<R> {
    async fn get_settings(&self) -> Result<Settings, String> {
        let result = self.repository.read_settings().await;
        if let Err(ref err) = result {
            error!("failed to get settings: {err}");
        }
        result
    }

    async fn set_settings(&self, settings: Settings) -> Result<(), String> {
        let result = self.repository.write_settings(settings).await;
        if let Err(ref err) = result {
            error!("failed to set settings: {err}");
        }
        result
    }
}

impl<R: ExerciseRepository> ExerciseService for Service<R> {
    async fn get_exercises(&self, user_id: &UserID) -> Result<Vec<Exercise>, ReadError> {
        log_on_error!(
            self.repository.read_exercises(user_id),
            ReadError,
            "get",
            "exercises"
        )
    }

    async fn get_exercise(&self, id: &ExerciseID) -> Result<Exercise, ReadError> {
        log_on_error!(
            self.repository.read_exercise(id),
            ReadError,
            "get",
            "exercise"
        )
    }

    async fn create_exercise(
        &self,
        user_id: &UserID,
        draft: ExerciseDraft,
    ) -> Result<Exercise, CreateError> {
        log_on_error!(
            self.repository.create_exercise(Exercise::from_draft(
                user_id.clone(),
                draft,
                Utc::now()
            )),
            CreateError,
            "create",
            "exercise"
        )
    }

    async fn replace_exercise(&self, exercise: Exercise) -> Result<Exercise, UpdateError> {
        let exercise = Exercise {
            updated_at: Utc::now(),
            ..exercise
        };
        log_on_error!(
            self.repository.replace_exercise(exercise),
            UpdateError,
            "replace",
            "exercise"
        )
    }

    async fn delete_exercise(&self, id: &ExerciseID) -> Result<ExerciseID, DeleteError> {
        log_on_error!(
            self.repository.delete_exercise(id),
            DeleteError,
            "delete",
            "exercise"
        )
    }
}

impl<R> Service<R>
where
    R: WorkoutRepository + WorkoutExerciseRepository + ExerciseProgressRepository,
{
    async fn latest_weight(
        &self,
        user_id: &UserID,
        exercise_id: &ExerciseID,
    ) -> Result<f32, ReadError> {
        let progress = log_on_error!(
            self.repository
                .read_exercise_progress(user_id, Some(exercise_id), Some(1)),
            ReadError,
            "get",
            "exercise progress"
        )?;
        Ok(progress.first().map_or(0.0, |p| p.weight))
    }

    async fn write_plan(
        &self,
        user_id: &UserID,
        plan: WorkoutPlan,
        batch: &mut Batch,
    ) -> Result<Workout, GeneratorError> {
        let mut weights = Vec::with_capacity(plan.exercise_ids.len());
        for exercise_id in &plan.exercise_ids {
            weights.push(self.latest_weight(user_id, exercise_id).await?);
        }

        let now = Utc::now();
        let workout = log_on_error!(
            self.repository.create_workout(Workout::planned(
                user_id.clone(),
                plan.muscle_groups,
                now
            )),
            CreateError,
            "create",
            "workout"
        )?;
        batch.record(Compensation::DeleteWorkout(workout.id.clone()));

        for (order_index, (exercise_id, weight)) in
            (0..).zip(plan.exercise_ids.into_iter().zip(weights))
        {
            let workout_exercise = log_on_error!(
                self.repository.create_workout_exercise(WorkoutExercise::new(
                    workout.id.clone(),
                    exercise_id,
                    order_index,
                    weight,
                    now
                )),
                CreateError,
                "create",
                "workout exercise"
            )?;
            batch.record(Compensation::DeleteWorkoutExercise(workout_exercise.id));
        }

        Ok(workout)
    }
}

impl<R> WorkoutGeneratorService for Service<R>
where
    R: WorkoutRepository
        + WorkoutExerciseRepository
        + ExerciseSetRepository
        + ExerciseProgressRepository,
{
    async fn save_workout(
        &self,
        user_id: &UserID,
        plan: WorkoutPlan,
    ) -> Result<Workout, GeneratorError> {
        let mut batch = Batch::new();
        match self.write_plan(user_id, plan, &mut batch).await {
            Ok(workout) => {
                batch.commit();
                Ok(workout)
            }
            Err(err) => {
                warn!("failed to save workout, undoing partial writes: {err}");
                batch.rollback(&self.repository).await;
                Err(err)
            }
        }
    }
}

impl<R> Service<R>
where
    R: WorkoutRepository
        + WorkoutExerciseRepository
        + ExerciseSetRepository
        + ExerciseProgressRepository
        + ExerciseRepository,
{
    async fn write_completion(
        &self,
        session: &WorkoutSession,
        batch: &mut Batch,
    ) -> Result<(Workout, Vec<bool>), SessionError> {
        let now = Utc::now();
        let mut achieved = Vec::with_capacity(session.exercises.len());

        for entry in &session.exercises {
            let workout_exercise = &entry.workout_exercise;
            let sets = log_on_error!(
                self.repository.read_exercise_sets(&workout_exercise.id),
                ReadError,
                "get",
                "exercise sets"
            )?;
            let result = ExerciseResult::new(workout_exercise, &sets);

            let progress = log_on_error!(
                self.repository
                    .create_exercise_progress(ExerciseProgress::new(
                        session.workout.user_id.clone(),
                        workout_exercise.exercise_id.clone(),
                        result.weight,
                        result.achieved,
                        now,
                    )),
                CreateError,
                "create",
                "exercise progress"
            )?;
            batch.record(Compensation::DeleteExerciseProgress(progress.id));

            log_on_error!(
                self.repository.modify_workout_exercise(
                    &workout_exercise.id,
                    None,
                    Some(result.achieved)
                ),
                UpdateError,
                "modify",
                "workout exercise"
            )?;
            batch.record(Compensation::RestoreWeightAchieved(
                workout_exercise.id.clone(),
                workout_exercise.weight_achieved,
            ));
            achieved.push(result.achieved);
        }

        let workout = log_on_error!(
            self.repository.modify_workout(
                &session.workout.id,
                WorkoutStatus::Completed,
                Some(now)
            ),
            UpdateError,
            "modify",
            "workout"
        )?;

        Ok((workout, achieved))
    }

    async fn write_sets(
        &self,
        entry: &SessionExercise,
        batch: &mut Batch,
    ) -> Result<Vec<ExerciseSet>, CreateError> {
        let mut sets = vec![];
        for set in initial_sets(&entry.workout_exercise, &entry.exercise, Utc::now()) {
            let set = log_on_error!(
                self.repository.create_exercise_set(set),
                CreateError,
                "create",
                "exercise set"
            )?;
            batch.record(Compensation::DeleteExerciseSet(set.id.clone()));
            sets.push(set);
        }
        Ok(sets)
    }

    async fn delete_sets(
        &self,
        workout_exercise_id: &WorkoutExerciseID,
    ) -> Result<(), SessionError> {
        let sets = log_on_error!(
            self.repository.read_exercise_sets(workout_exercise_id),
            ReadError,
            "get",
            "exercise sets"
        )?;
        for set in sets {
            log_on_error!(
                self.repository.delete_exercise_set(&set.id),
                DeleteError,
                "delete",
                "exercise set"
            )?;
        }
        Ok(())
    }
}

impl<R> WorkoutSessionService for Service<R>
where
    R: WorkoutRepository
        + WorkoutExerciseRepository
        + ExerciseSetRepository
        + ExerciseProgressRepository
        + ExerciseRepository,
{
    async fn planned_workouts(&self, user_id: &UserID) -> Result<Vec<Workout>, ReadError> {
        log_on_error!(
            self.repository
                .read_workouts(user_id, &[WorkoutStatus::Planned, WorkoutStatus::Active]),
            ReadError,
            "get",
            "workouts"
        )
    }

    async fn load_workout_session(
        &self,
        user_id: &UserID,
    ) -> Result<Option<WorkoutSession>, SessionError> {
        let mut workouts = self.planned_workouts(user_id).await?;
        let index = workouts
            .iter()
            .position(|w| w.status == WorkoutStatus::Active)
            .or_else(|| {
                workouts
                    .iter()
                    .position(|w| w.status == WorkoutStatus::Planned)
            });
        match index {
            Some(index) => Ok(Some(self.start_workout(workouts.swap_remove(index)).await?)),
            None => Ok(None),
        }
    }

    async fn start_workout(&self, workout: Workout) -> Result<WorkoutSession, SessionError> {
        let workout = match workout.status {
            WorkoutStatus::Active => workout,
            WorkoutStatus::Planned => log_on_error!(
                self.repository
                    .modify_workout(&workout.id, WorkoutStatus::Active, None),
                UpdateError,
                "start",
                "workout"
            )?,
            WorkoutStatus::Completed => {
                return Err(SessionError::InvalidTransition(
                    WorkoutStatus::Completed,
                    WorkoutStatus::Active,
                ));
            }
        };

        let workout_exercises = log_on_error!(
            self.repository.read_workout_exercises(&workout.id),
            ReadError,
            "get",
            "workout exercises"
        )?;
        let catalog = log_on_error!(
            self.repository.read_exercises(&workout.user_id),
            ReadError,
            "get",
            "exercises"
        )?;

        let mut exercises = Vec::with_capacity(workout_exercises.len());
        for workout_exercise in workout_exercises {
            match catalog
                .iter()
                .find(|e| e.id == workout_exercise.exercise_id)
            {
                Some(exercise) => exercises.push(SessionExercise {
                    workout_exercise,
                    exercise: exercise.clone(),
                }),
                None => warn!(
                    "skipping workout exercise {} referencing missing exercise {}",
                    workout_exercise.id, workout_exercise.exercise_id
                ),
            }
        }

        let mut session = WorkoutSession::new(workout, exercises);
        self.visit_exercise(&mut session).await?;
        Ok(session)
    }

    async fn visit_exercise(&self, session: &mut WorkoutSession) -> Result<(), SessionError> {
        let Some(current) = session.current() else {
            return Ok(());
        };
        let mut sets = log_on_error!(
            self.repository
                .read_exercise_sets(&current.workout_exercise.id),
            ReadError,
            "get",
            "exercise sets"
        )?;
        if sets.is_empty() {
            let mut batch = Batch::new();
            match self.write_sets(current, &mut batch).await {
                Ok(created) => {
                    batch.commit();
                    sets = created;
                }
                Err(err) => {
                    warn!("failed to create exercise sets, undoing partial writes: {err}");
                    batch.rollback(&self.repository).await;
                    return Err(err.into());
                }
            }
        }
        session.sets = sets;
        Ok(())
    }

    async fn toggle_set(
        &self,
        session: &mut WorkoutSession,
        set_id: &ExerciseSetID,
    ) -> Result<(), SessionError> {
        let completed = !session.set_mut(set_id)?.completed;
        let set = log_on_error!(
            self.repository
                .modify_exercise_set(set_id, None, Some(completed)),
            UpdateError,
            "modify",
            "exercise set"
        )?;
        *session.set_mut(set_id)? = set;
        Ok(())
    }

    async fn set_weight(
        &self,
        session: &mut WorkoutSession,
        set_id: &ExerciseSetID,
        input: &str,
    ) -> Result<(), SessionError> {
        session.set_mut(set_id)?;
        let set = log_on_error!(
            self.repository
                .modify_exercise_set(set_id, Some(parse_weight(input)), None),
            UpdateError,
            "modify",
            "exercise set"
        )?;
        *session.set_mut(set_id)? = set;
        Ok(())
    }

    async fn go_to_exercise(
        &self,
        session: &mut WorkoutSession,
        index: usize,
    ) -> Result<(), SessionError> {
        if session.move_to(index) {
            self.visit_exercise(session).await?;
        }
        Ok(())
    }

    async fn substitution_candidates(
        &self,
        session: &WorkoutSession,
    ) -> Result<Vec<Exercise>, SessionError> {
        let catalog = log_on_error!(
            self.repository.read_exercises(&session.workout.user_id),
            ReadError,
            "get",
            "exercises"
        )?;
        Ok(session
            .substitution_candidates(&catalog)
            .into_iter()
            .cloned()
            .collect())
    }

    async fn substitute_exercise(
        &self,
        session: &mut WorkoutSession,
        replacement: Exercise,
    ) -> Result<(), SessionError> {
        let current = session.current().ok_or(SessionError::NoExercise)?;
        if !current.exercise.is_interchangeable_with(&replacement)
            || session.contains_exercise(&replacement.id)
        {
            return Err(SessionError::InvalidSubstitute(replacement.id));
        }
        let workout_exercise_id = current.workout_exercise.id.clone();

        let workout_exercise = log_on_error!(
            self.repository.modify_workout_exercise(
                &workout_exercise_id,
                Some(replacement.id.clone()),
                None
            ),
            UpdateError,
            "modify",
            "workout exercise"
        )?;
        if let Some(current) = session.current_mut() {
            *current = SessionExercise {
                workout_exercise,
                exercise: replacement,
            };
        }
        session.sets.clear();

        if let Err(err) = self.delete_sets(&workout_exercise_id).await {
            warn!("failed to remove sets of replaced exercise: {err}");
            if let Ok(sets) = self.repository.read_exercise_sets(&workout_exercise_id).await {
                session.sets = sets;
            }
            return Err(err);
        }
        self.visit_exercise(session).await
    }

    async fn complete_workout(
        &self,
        session: &mut WorkoutSession,
    ) -> Result<Workout, SessionError> {
        if !session
            .workout
            .status
            .can_transition_to(WorkoutStatus::Completed)
        {
            return Err(SessionError::InvalidTransition(
                session.workout.status,
                WorkoutStatus::Completed,
            ));
        }

        let mut batch = Batch::new();
        match self.write_completion(session, &mut batch).await {
            Ok((workout, achieved)) => {
                batch.commit();
                for (entry, achieved) in session.exercises.iter_mut().zip(achieved) {
                    entry.workout_exercise.weight_achieved = achieved;
                }
                session.workout = workout.clone();
                Ok(workout)
            }
            Err(err) => {
                warn!("failed to complete workout, undoing partial writes: {err}");
                batch.rollback(&self.repository).await;
                Err(err)
            }
        }
    }
}

impl<R> Service<R>
where
    R: WorkoutExerciseRepository + ExerciseSetRepository,
{
    async fn workout_details(
        &self,
        workout: Workout,
        catalog: &[Exercise],
    ) -> Result<WorkoutDetails, ReadError> {
        let workout_exercises = log_on_error!(
            self.repository.read_workout_exercises(&workout.id),
            ReadError,
            "get",
            "workout exercises"
        )?;
        let mut exercises = Vec::with_capacity(workout_exercises.len());
        for workout_exercise in workout_exercises {
            let sets = log_on_error!(
                self.repository.read_exercise_sets(&workout_exercise.id),
                ReadError,
                "get",
                "exercise sets"
            )?;
            exercises.push(WorkoutExerciseDetails {
                exercise: catalog
                    .iter()
                    .find(|e| e.id == workout_exercise.exercise_id)
                    .cloned(),
                workout_exercise,
                sets,
            });
        }
        Ok(WorkoutDetails { workout, exercises })
    }
}

impl<R> HistoryService for Service<R>
where
    R: WorkoutRepository
        + WorkoutExerciseRepository
        + ExerciseSetRepository
        + ExerciseProgressRepository
        + ExerciseRepository,
{
    async fn get_history(&self, user_id: &UserID) -> Result<History, ReadError> {
        let workouts = log_on_error!(
            self.repository.read_completed_workouts(user_id),
            ReadError,
            "get",
            "completed workouts"
        )?;
        let catalog = log_on_error!(
            self.repository.read_exercises(user_id),
            ReadError,
            "get",
            "exercises"
        )?;
        let progress = log_on_error!(
            self.repository.read_exercise_progress(user_id, None, None),
            ReadError,
            "get",
            "exercise progress"
        )?;
        let workouts = join_all(
            workouts
                .into_iter()
                .map(|workout| self.workout_details(workout, &catalog)),
        )
        .await
        .into_iter()
        .collect::<Result<Vec<_>, _>>()?;
        Ok(History { workouts, progress })
    }
}
