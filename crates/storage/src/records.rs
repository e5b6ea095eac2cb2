//! Stored representation of the domain entities
//!
//! Field names follow the backend. Boolean fields are stored as `0`/`1`.
//! Workouts store their muscle groups as a serialized list together with the
//! single muscle group of the old format.

use chrono::{DateTime, Utc};
use gymbook_domain as domain;
use log::warn;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::document::{Collection, Document, StoreError};

pub trait Record: Serialize + DeserializeOwned {
    type Entity;

    const COLLECTION: Collection;

    fn from_entity(entity: &Self::Entity) -> Self;
    fn into_entity(self) -> Result<Self::Entity, RecordError>;
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum RecordError {
    #[error("invalid {0}: {1}")]
    Invalid(&'static str, String),
}

pub fn to_document<R: Record>(entity: &R::Entity) -> Result<Document, StoreError> {
    match serde_json::to_value(R::from_entity(entity))? {
        Value::Object(document) => Ok(document),
        value => Err(StoreError::InvalidDocument(value.to_string())),
    }
}

pub fn from_document<R: Record>(document: Document) -> Result<R::Entity, StoreError> {
    serde_json::from_value::<R>(Value::Object(document))?
        .into_entity()
        .map_err(|err| StoreError::InvalidDocument(err.to_string()))
}

/// Decode all documents, skipping the ones that cannot be decoded.
pub fn from_documents<R: Record>(documents: Vec<Document>) -> Vec<R::Entity> {
    documents
        .into_iter()
        .filter_map(|document| {
            let id = document.get("id").cloned().unwrap_or(Value::Null);
            match from_document::<R>(document) {
                Ok(entity) => Some(entity),
                Err(err) => {
                    warn!("skipping {} document {id}: {err}", R::COLLECTION);
                    None
                }
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseRecord {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub muscle_group: String,
    pub weight_type: String,
    pub exercise_type: String,
    pub sets: u32,
    pub reps: u32,
    #[serde(default)]
    pub technique: Option<String>,
    #[serde(default)]
    pub equipment_setup: Option<String>,
    #[serde(default)]
    pub equipment_name: Option<String>,
    #[serde(default)]
    pub equipment_photo: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for ExerciseRecord {
    type Entity = domain::Exercise;

    const COLLECTION: Collection = Collection::Exercises;

    fn from_entity(exercise: &domain::Exercise) -> Self {
        use domain::Property;
        Self {
            id: exercise.id.to_string(),
            user_id: exercise.user_id.to_string(),
            name: exercise.name.to_string(),
            muscle_group: exercise.muscle_group.name().to_string(),
            weight_type: exercise.weight_type.key().to_string(),
            exercise_type: exercise.exercise_type.key().to_string(),
            sets: u32::from(exercise.sets),
            reps: u32::from(exercise.reps),
            technique: exercise.technique.clone(),
            equipment_setup: exercise.equipment_setup.clone(),
            equipment_name: exercise.equipment_name.clone(),
            equipment_photo: exercise.equipment_photo.clone(),
            created_at: exercise.created_at,
            updated_at: exercise.updated_at,
        }
    }

    fn into_entity(self) -> Result<domain::Exercise, RecordError> {
        Ok(domain::Exercise {
            id: self.id.into(),
            user_id: self.user_id.into(),
            name: domain::Name::new(&self.name)
                .map_err(|err| RecordError::Invalid("name", err.to_string()))?,
            muscle_group: domain::MuscleGroup::try_from(self.muscle_group.as_str())
                .map_err(|err| RecordError::Invalid("muscle group", err.to_string()))?,
            weight_type: domain::WeightType::try_from(self.weight_type.as_str())
                .map_err(|err| RecordError::Invalid("weight type", err.to_string()))?,
            exercise_type: domain::ExerciseType::try_from(self.exercise_type.as_str())
                .map_err(|err| RecordError::Invalid("exercise type", err.to_string()))?,
            sets: domain::Sets::new(self.sets)
                .map_err(|err| RecordError::Invalid("sets", err.to_string()))?,
            reps: domain::Reps::new(self.reps)
                .map_err(|err| RecordError::Invalid("reps", err.to_string()))?,
            technique: self.technique,
            equipment_setup: self.equipment_setup,
            equipment_name: self.equipment_name,
            equipment_photo: self.equipment_photo,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutRecord {
    pub id: String,
    pub user_id: String,
    pub name: String,
    /// A list, or a list serialized as string.
    #[serde(default)]
    pub muscle_groups: Value,
    #[serde(default)]
    pub muscle_group: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Record for WorkoutRecord {
    type Entity = domain::Workout;

    const COLLECTION: Collection = Collection::Workouts;

    fn from_entity(workout: &domain::Workout) -> Self {
        use domain::Property;
        let muscle_groups = workout
            .muscle_groups
            .iter()
            .map(|m| Value::from(m.name()))
            .collect::<Vec<_>>();
        Self {
            id: workout.id.to_string(),
            user_id: workout.user_id.to_string(),
            name: workout.name.clone(),
            muscle_groups: Value::String(Value::Array(muscle_groups).to_string()),
            muscle_group: Some(
                workout
                    .legacy_muscle_group()
                    .map(|m| m.name().to_string())
                    .unwrap_or_default(),
            ),
            status: workout.status.key().to_string(),
            created_at: workout.created_at,
            completed_at: workout.completed_at,
        }
    }

    fn into_entity(self) -> Result<domain::Workout, RecordError> {
        Ok(domain::Workout {
            muscle_groups: decode_muscle_groups(&self.muscle_groups, self.muscle_group.as_deref()),
            id: self.id.into(),
            user_id: self.user_id.into(),
            name: self.name,
            status: domain::WorkoutStatus::try_from(self.status.as_str())
                .map_err(|err| RecordError::Invalid("status", err.to_string()))?,
            created_at: self.created_at,
            completed_at: self.completed_at,
        })
    }
}

/// Muscle groups of a stored workout.
///
/// Accepts a list, a list serialized as string or, if neither is present, the
/// single muscle group of the old format. Unknown labels are dropped.
#[must_use]
pub fn decode_muscle_groups(value: &Value, legacy: Option<&str>) -> Vec<domain::MuscleGroup> {
    let labels = match value {
        Value::Array(values) => values
            .iter()
            .filter_map(|v| v.as_str().map(ToString::to_string))
            .collect::<Vec<_>>(),
        Value::String(text) => match serde_json::from_str::<Vec<String>>(text) {
            Ok(labels) => labels,
            Err(err) => {
                warn!("failed to decode muscle groups {text:?}: {err}");
                vec![]
            }
        },
        _ => vec![],
    };
    let labels = if labels.is_empty() {
        legacy
            .filter(|l| !l.trim().is_empty())
            .map(|l| vec![l.to_string()])
            .unwrap_or_default()
    } else {
        labels
    };
    let mut result = vec![];
    for label in labels {
        match domain::MuscleGroup::try_from(label.as_str()) {
            Ok(muscle_group) if !result.contains(&muscle_group) => result.push(muscle_group),
            Ok(_) => {}
            Err(err) => warn!("dropping muscle group: {err}"),
        }
    }
    result
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutExerciseRecord {
    pub id: String,
    pub workout_id: String,
    pub exercise_id: String,
    pub order_index: u32,
    #[serde(default)]
    pub current_weight: f32,
    #[serde(with = "flag", default)]
    pub weight_achieved: bool,
    pub created_at: DateTime<Utc>,
}

impl Record for WorkoutExerciseRecord {
    type Entity = domain::WorkoutExercise;

    const COLLECTION: Collection = Collection::WorkoutExercises;

    fn from_entity(workout_exercise: &domain::WorkoutExercise) -> Self {
        Self {
            id: workout_exercise.id.to_string(),
            workout_id: workout_exercise.workout_id.to_string(),
            exercise_id: workout_exercise.exercise_id.to_string(),
            order_index: workout_exercise.order_index,
            current_weight: workout_exercise.current_weight,
            weight_achieved: workout_exercise.weight_achieved,
            created_at: workout_exercise.created_at,
        }
    }

    fn into_entity(self) -> Result<domain::WorkoutExercise, RecordError> {
        Ok(domain::WorkoutExercise {
            id: self.id.into(),
            workout_id: self.workout_id.into(),
            exercise_id: self.exercise_id.into(),
            order_index: self.order_index,
            current_weight: self.current_weight,
            weight_achieved: self.weight_achieved,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseSetRecord {
    pub id: String,
    pub workout_exercise_id: String,
    pub set_number: u32,
    pub reps: u32,
    pub weight: f32,
    #[serde(with = "flag", default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl Record for ExerciseSetRecord {
    type Entity = domain::ExerciseSet;

    const COLLECTION: Collection = Collection::ExerciseSets;

    fn from_entity(set: &domain::ExerciseSet) -> Self {
        Self {
            id: set.id.to_string(),
            workout_exercise_id: set.workout_exercise_id.to_string(),
            set_number: set.set_number,
            reps: set.reps,
            weight: set.weight,
            completed: set.completed,
            created_at: set.created_at,
        }
    }

    fn into_entity(self) -> Result<domain::ExerciseSet, RecordError> {
        if self.set_number == 0 {
            return Err(RecordError::Invalid("set number", "0".to_string()));
        }
        Ok(domain::ExerciseSet {
            id: self.id.into(),
            workout_exercise_id: self.workout_exercise_id.into(),
            set_number: self.set_number,
            reps: self.reps,
            weight: self.weight,
            completed: self.completed,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseProgressRecord {
    pub id: String,
    pub user_id: String,
    pub exercise_id: String,
    pub weight: f32,
    #[serde(with = "flag", default)]
    pub achieved: bool,
    pub workout_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Record for ExerciseProgressRecord {
    type Entity = domain::ExerciseProgress;

    const COLLECTION: Collection = Collection::ExerciseProgress;

    fn from_entity(progress: &domain::ExerciseProgress) -> Self {
        Self {
            id: progress.id.to_string(),
            user_id: progress.user_id.to_string(),
            exercise_id: progress.exercise_id.to_string(),
            weight: progress.weight,
            achieved: progress.achieved,
            workout_date: progress.workout_date,
            created_at: progress.created_at,
        }
    }

    fn into_entity(self) -> Result<domain::ExerciseProgress, RecordError> {
        Ok(domain::ExerciseProgress {
            id: self.id.into(),
            user_id: self.user_id.into(),
            exercise_id: self.exercise_id.into(),
            weight: self.weight,
            achieved: self.achieved,
            workout_date: self.workout_date,
            created_at: self.created_at,
        })
    }
}

/// Boolean stored as `0`/`1`.
///
/// Numbers, booleans and numeric strings are read; any value above zero is
/// true.
pub mod flag {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};
    use serde_json::Value;

    #[allow(clippy::trivially_copy_pass_by_ref)]
    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Bool(value) => Ok(value),
            Value::Number(value) => Ok(value.as_f64().is_some_and(|v| v > 0.0)),
            Value::String(value) => value
                .trim()
                .parse::<f64>()
                .map(|v| v > 0.0)
                .map_err(|_| D::Error::custom(format!("invalid flag {value:?}"))),
            Value::Null => Ok(false),
            value => Err(D::Error::custom(format!("invalid flag {value}"))),
        }
    }

    /// The stored value of a flag.
    #[must_use]
    pub fn value(flag: bool) -> Value {
        Value::from(u8::from(flag))
    }
}
