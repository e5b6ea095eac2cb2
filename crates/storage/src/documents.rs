use chrono::{DateTime, Utc};
use gymbook_domain as domain;
use serde_json::Value;

use crate::{
    document::{Document, DocumentStore, Order, Query, StoreError},
    records::{
        ExerciseProgressRecord, ExerciseRecord, ExerciseSetRecord, Record,
        WorkoutExerciseRecord, WorkoutRecord, flag, from_document, from_documents, to_document,
    },
};

/// Repositories of all domain entities on top of a document store.
pub struct Documents<S> {
    store: S,
}

impl<S: DocumentStore> Documents<S> {
    #[must_use]
    pub fn new(store: S) -> Self {
        Self { store }
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    async fn list<R: Record>(&self, query: &Query) -> Result<Vec<R::Entity>, StoreError> {
        let documents = self.store.list(R::COLLECTION, query).await?;
        Ok(from_documents::<R>(documents))
    }

    async fn get<R: Record>(&self, id: &str) -> Result<R::Entity, StoreError> {
        from_document::<R>(self.store.get(R::COLLECTION, id).await?)
    }

    async fn create<R: Record>(&self, entity: &R::Entity) -> Result<R::Entity, StoreError> {
        let document = to_document::<R>(entity)?;
        from_document::<R>(self.store.create(R::COLLECTION, document).await?)
    }

    async fn update<R: Record>(
        &self,
        id: &str,
        changes: Document,
    ) -> Result<R::Entity, StoreError> {
        from_document::<R>(self.store.update(R::COLLECTION, id, changes).await?)
    }

    async fn delete<R: Record>(&self, id: &str) -> Result<(), StoreError> {
        self.store.delete(R::COLLECTION, id).await
    }
}

fn changes<const N: usize>(fields: [(&str, Option<Value>); N]) -> Document {
    fields
        .into_iter()
        .filter_map(|(field, value)| value.map(|v| (field.to_string(), v)))
        .collect()
}

impl<S: DocumentStore> domain::ExerciseRepository for Documents<S> {
    async fn read_exercises(
        &self,
        user_id: &domain::UserID,
    ) -> Result<Vec<domain::Exercise>, domain::ReadError> {
        Ok(self
            .list::<ExerciseRecord>(
                &Query::new()
                    .eq("userId", user_id.as_str())
                    .order_by("createdAt", Order::Desc),
            )
            .await?)
    }

    async fn read_exercise(
        &self,
        id: &domain::ExerciseID,
    ) -> Result<domain::Exercise, domain::ReadError> {
        Ok(self.get::<ExerciseRecord>(id).await?)
    }

    async fn create_exercise(
        &self,
        exercise: domain::Exercise,
    ) -> Result<domain::Exercise, domain::CreateError> {
        Ok(self.create::<ExerciseRecord>(&exercise).await?)
    }

    async fn replace_exercise(
        &self,
        exercise: domain::Exercise,
    ) -> Result<domain::Exercise, domain::UpdateError> {
        let document = to_document::<ExerciseRecord>(&exercise)?;
        Ok(self.update::<ExerciseRecord>(&exercise.id, document).await?)
    }

    async fn delete_exercise(
        &self,
        id: &domain::ExerciseID,
    ) -> Result<domain::ExerciseID, domain::DeleteError> {
        self.delete::<ExerciseRecord>(id).await?;
        Ok(id.clone())
    }
}

impl<S: DocumentStore> domain::WorkoutRepository for Documents<S> {
    /// An empty list of statuses selects workouts of any status.
    async fn read_workouts(
        &self,
        user_id: &domain::UserID,
        statuses: &[domain::WorkoutStatus],
    ) -> Result<Vec<domain::Workout>, domain::ReadError> {
        let mut query = Query::new().eq("userId", user_id.as_str());
        if !statuses.is_empty() {
            query = query.is_in("status", statuses.iter().map(|s| s.key()));
        }
        Ok(self
            .list::<WorkoutRecord>(&query.order_by("createdAt", Order::Desc))
            .await?)
    }

    async fn read_completed_workouts(
        &self,
        user_id: &domain::UserID,
    ) -> Result<Vec<domain::Workout>, domain::ReadError> {
        Ok(self
            .list::<WorkoutRecord>(
                &Query::new()
                    .eq("userId", user_id.as_str())
                    .eq("status", domain::WorkoutStatus::Completed.key())
                    .order_by("completedAt", Order::Desc),
            )
            .await?)
    }

    async fn create_workout(
        &self,
        workout: domain::Workout,
    ) -> Result<domain::Workout, domain::CreateError> {
        Ok(self.create::<WorkoutRecord>(&workout).await?)
    }

    async fn modify_workout(
        &self,
        id: &domain::WorkoutID,
        status: domain::WorkoutStatus,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<domain::Workout, domain::UpdateError> {
        let completed_at = completed_at
            .map(|time| serde_json::to_value(time).map_err(StoreError::from))
            .transpose()?;
        Ok(self
            .update::<WorkoutRecord>(
                id,
                changes([
                    ("status", Some(Value::from(status.key()))),
                    ("completedAt", completed_at),
                ]),
            )
            .await?)
    }

    async fn delete_workout(
        &self,
        id: &domain::WorkoutID,
    ) -> Result<domain::WorkoutID, domain::DeleteError> {
        self.delete::<WorkoutRecord>(id).await?;
        Ok(id.clone())
    }
}

impl<S: DocumentStore> domain::WorkoutExerciseRepository for Documents<S> {
    async fn read_workout_exercises(
        &self,
        workout_id: &domain::WorkoutID,
    ) -> Result<Vec<domain::WorkoutExercise>, domain::ReadError> {
        Ok(self
            .list::<WorkoutExerciseRecord>(
                &Query::new()
                    .eq("workoutId", workout_id.as_str())
                    .order_by("orderIndex", Order::Asc),
            )
            .await?)
    }

    async fn create_workout_exercise(
        &self,
        workout_exercise: domain::WorkoutExercise,
    ) -> Result<domain::WorkoutExercise, domain::CreateError> {
        Ok(self
            .create::<WorkoutExerciseRecord>(&workout_exercise)
            .await?)
    }

    async fn modify_workout_exercise(
        &self,
        id: &domain::WorkoutExerciseID,
        exercise_id: Option<domain::ExerciseID>,
        weight_achieved: Option<bool>,
    ) -> Result<domain::WorkoutExercise, domain::UpdateError> {
        Ok(self
            .update::<WorkoutExerciseRecord>(
                id,
                changes([
                    ("exerciseId", exercise_id.map(|id| Value::from(String::from(id)))),
                    ("weightAchieved", weight_achieved.map(flag::value)),
                ]),
            )
            .await?)
    }

    async fn delete_workout_exercise(
        &self,
        id: &domain::WorkoutExerciseID,
    ) -> Result<domain::WorkoutExerciseID, domain::DeleteError> {
        self.delete::<WorkoutExerciseRecord>(id).await?;
        Ok(id.clone())
    }
}

impl<S: DocumentStore> domain::ExerciseSetRepository for Documents<S> {
    async fn read_exercise_sets(
        &self,
        workout_exercise_id: &domain::WorkoutExerciseID,
    ) -> Result<Vec<domain::ExerciseSet>, domain::ReadError> {
        Ok(self
            .list::<ExerciseSetRecord>(
                &Query::new()
                    .eq("workoutExerciseId", workout_exercise_id.as_str())
                    .order_by("setNumber", Order::Asc),
            )
            .await?)
    }

    async fn create_exercise_set(
        &self,
        set: domain::ExerciseSet,
    ) -> Result<domain::ExerciseSet, domain::CreateError> {
        Ok(self.create::<ExerciseSetRecord>(&set).await?)
    }

    async fn modify_exercise_set(
        &self,
        id: &domain::ExerciseSetID,
        weight: Option<f32>,
        completed: Option<bool>,
    ) -> Result<domain::ExerciseSet, domain::UpdateError> {
        Ok(self
            .update::<ExerciseSetRecord>(
                id,
                changes([
                    ("weight", weight.map(Value::from)),
                    ("completed", completed.map(flag::value)),
                ]),
            )
            .await?)
    }

    async fn delete_exercise_set(
        &self,
        id: &domain::ExerciseSetID,
    ) -> Result<domain::ExerciseSetID, domain::DeleteError> {
        self.delete::<ExerciseSetRecord>(id).await?;
        Ok(id.clone())
    }
}

impl<S: DocumentStore> domain::ExerciseProgressRepository for Documents<S> {
    async fn read_exercise_progress(
        &self,
        user_id: &domain::UserID,
        exercise_id: Option<&domain::ExerciseID>,
        limit: Option<usize>,
    ) -> Result<Vec<domain::ExerciseProgress>, domain::ReadError> {
        let mut query = Query::new().eq("userId", user_id.as_str());
        if let Some(exercise_id) = exercise_id {
            query = query.eq("exerciseId", exercise_id.as_str());
        }
        query = query.order_by("workoutDate", Order::Desc);
        if let Some(limit) = limit {
            query = query.limit(limit);
        }
        Ok(self.list::<ExerciseProgressRecord>(&query).await?)
    }

    async fn create_exercise_progress(
        &self,
        progress: domain::ExerciseProgress,
    ) -> Result<domain::ExerciseProgress, domain::CreateError> {
        Ok(self.create::<ExerciseProgressRecord>(&progress).await?)
    }

    async fn delete_exercise_progress(
        &self,
        id: &domain::ExerciseProgressID,
    ) -> Result<domain::ExerciseProgressID, domain::DeleteError> {
        self.delete::<ExerciseProgressRecord>(id).await?;
        Ok(id.clone())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use gymbook_domain::{
        ExerciseProgressRepository, ExerciseRepository, ExerciseSetRepository,
        WorkoutExerciseRepository, WorkoutRepository,
    };
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use crate::{document::Collection, memory::MemoryStore, tests::data::*};

    use super::*;

    async fn documents() -> Documents<MemoryStore> {
        let documents = Documents::new(MemoryStore::new());
        documents.create_exercise(EXERCISE.clone()).await.unwrap();
        documents.create_exercise(EXERCISE_2.clone()).await.unwrap();
        documents.create_workout(WORKOUT.clone()).await.unwrap();
        documents.create_workout(COMPLETED_WORKOUT.clone()).await.unwrap();
        for workout_exercise in WORKOUT_EXERCISES.iter() {
            documents
                .create_workout_exercise(workout_exercise.clone())
                .await
                .unwrap();
        }
        for progress in PROGRESS.iter() {
            documents
                .create_exercise_progress(progress.clone())
                .await
                .unwrap();
        }
        documents
    }

    #[tokio::test]
    async fn test_read_exercises() {
        let documents = documents().await;
        assert_eq!(
            documents.read_exercises(&USER.id).await.unwrap(),
            vec![EXERCISE_2.clone(), EXERCISE.clone()]
        );
        assert!(
            documents
                .read_exercises(&"other".into())
                .await
                .unwrap()
                .is_empty()
        );
        assert_eq!(
            documents.read_exercise(&EXERCISE.id).await.unwrap(),
            *EXERCISE
        );
        assert!(matches!(
            documents.read_exercise(&"missing".into()).await,
            Err(domain::ReadError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_replace_and_delete_exercise() {
        let documents = documents().await;
        let mut exercise = EXERCISE.clone();
        exercise.reps = domain::Reps::new(12).unwrap();
        exercise.technique = None;

        assert_eq!(
            documents.replace_exercise(exercise.clone()).await.unwrap(),
            exercise
        );
        assert_eq!(
            documents.delete_exercise(&EXERCISE.id).await.unwrap(),
            EXERCISE.id
        );
        assert!(matches!(
            documents.delete_exercise(&EXERCISE.id).await,
            Err(domain::DeleteError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_read_workouts() {
        let documents = documents().await;
        assert_eq!(
            documents
                .read_workouts(
                    &USER.id,
                    &[domain::WorkoutStatus::Planned, domain::WorkoutStatus::Active]
                )
                .await
                .unwrap(),
            vec![WORKOUT.clone()]
        );
        assert_eq!(
            documents.read_workouts(&USER.id, &[]).await.unwrap(),
            vec![WORKOUT.clone(), COMPLETED_WORKOUT.clone()]
        );
        assert_eq!(
            documents.read_completed_workouts(&USER.id).await.unwrap(),
            vec![COMPLETED_WORKOUT.clone()]
        );
    }

    #[tokio::test]
    async fn test_modify_workout() {
        let documents = documents().await;
        let completed_at = Utc.with_ymd_and_hms(2024, 3, 5, 18, 0, 0).unwrap();

        let workout = documents
            .modify_workout(&WORKOUT.id, domain::WorkoutStatus::Active, None)
            .await
            .unwrap();
        assert_eq!(workout.status, domain::WorkoutStatus::Active);
        assert_eq!(workout.completed_at, None);

        let workout = documents
            .modify_workout(
                &WORKOUT.id,
                domain::WorkoutStatus::Completed,
                Some(completed_at),
            )
            .await
            .unwrap();
        assert_eq!(workout.status, domain::WorkoutStatus::Completed);
        assert_eq!(workout.completed_at, Some(completed_at));
        assert_eq!(workout.muscle_groups, WORKOUT.muscle_groups);
    }

    #[tokio::test]
    async fn test_workout_exercises() {
        let documents = documents().await;
        assert_eq!(
            documents.read_workout_exercises(&WORKOUT.id).await.unwrap(),
            vec![WORKOUT_EXERCISES[0].clone(), WORKOUT_EXERCISES[1].clone()]
        );

        let workout_exercise = documents
            .modify_workout_exercise(&WORKOUT_EXERCISES[0].id, None, Some(true))
            .await
            .unwrap();
        assert!(workout_exercise.weight_achieved);
        assert_eq!(workout_exercise.exercise_id, WORKOUT_EXERCISES[0].exercise_id);
        let stored = documents.store().documents(Collection::WorkoutExercises);
        assert_eq!(stored[0].get("weightAchieved"), Some(&json!(1)));

        let workout_exercise = documents
            .modify_workout_exercise(&WORKOUT_EXERCISES[0].id, Some(EXERCISE_3.id.clone()), None)
            .await
            .unwrap();
        assert_eq!(workout_exercise.exercise_id, EXERCISE_3.id);
        assert!(workout_exercise.weight_achieved);
    }

    #[tokio::test]
    async fn test_exercise_sets() {
        let documents = documents().await;
        let workout_exercise = &WORKOUT_EXERCISES[0];
        let sets = domain::initial_sets(workout_exercise, &EXERCISE, EXERCISE.created_at);
        for set in sets.iter().rev() {
            documents.create_exercise_set(set.clone()).await.unwrap();
        }

        assert_eq!(
            documents
                .read_exercise_sets(&workout_exercise.id)
                .await
                .unwrap(),
            sets
        );

        let set = documents
            .modify_exercise_set(&sets[1].id, Some(52.5), Some(true))
            .await
            .unwrap();
        assert_eq!(set.weight, 52.5);
        assert!(set.completed);

        let set = documents
            .modify_exercise_set(&sets[1].id, None, Some(false))
            .await
            .unwrap();
        assert_eq!(set.weight, 52.5);
        assert!(!set.completed);

        documents.delete_exercise_set(&sets[1].id).await.unwrap();
        assert_eq!(
            documents
                .read_exercise_sets(&workout_exercise.id)
                .await
                .unwrap()
                .len(),
            sets.len() - 1
        );
    }

    #[tokio::test]
    async fn test_read_exercise_progress() {
        let documents = documents().await;
        assert_eq!(
            documents
                .read_exercise_progress(&USER.id, None, None)
                .await
                .unwrap(),
            vec![PROGRESS[2].clone(), PROGRESS[1].clone(), PROGRESS[0].clone()]
        );
        assert_eq!(
            documents
                .read_exercise_progress(&USER.id, Some(&EXERCISE.id), Some(1))
                .await
                .unwrap(),
            vec![PROGRESS[1].clone()]
        );
        assert!(
            documents
                .read_exercise_progress(&USER.id, Some(&EXERCISE_3.id), None)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_invalid_documents_are_skipped() {
        let documents = documents().await;
        let mut document = to_document::<ExerciseRecord>(&EXERCISE_3).unwrap();
        document.insert("sets".to_string(), json!(0));
        documents.store().insert(Collection::Exercises, document);

        assert_eq!(documents.read_exercises(&USER.id).await.unwrap().len(), 2);
    }
}
