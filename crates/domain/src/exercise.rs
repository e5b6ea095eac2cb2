use std::{collections::BTreeMap, slice::Iter};

use chrono::{DateTime, Utc};

use crate::{
    CreateError, DeleteError, Name, ReadError, Reps, Sets, Settings, UpdateError, UserID,
    ValidationError, id::string_id,
};

#[allow(async_fn_in_trait)]
pub trait ExerciseService {
    async fn get_exercises(&self, user_id: &UserID) -> Result<Vec<Exercise>, ReadError>;
    async fn get_exercise(&self, id: &ExerciseID) -> Result<Exercise, ReadError>;
    async fn create_exercise(
        &self,
        user_id: &UserID,
        draft: ExerciseDraft,
    ) -> Result<Exercise, CreateError>;
    async fn replace_exercise(&self, exercise: Exercise) -> Result<Exercise, UpdateError>;
    async fn delete_exercise(&self, id: &ExerciseID) -> Result<ExerciseID, DeleteError>;

    fn validate_exercise_name(&self, name: &str) -> Result<Name, ValidationError> {
        Name::new(name).map_err(|err| ValidationError::Other(err.into()))
    }

    fn validate_sets(&self, sets: &str) -> Result<Sets, ValidationError> {
        Sets::try_from(sets).map_err(|err| ValidationError::Other(err.into()))
    }

    fn validate_reps(&self, reps: &str) -> Result<Reps, ValidationError> {
        Reps::try_from(reps).map_err(|err| ValidationError::Other(err.into()))
    }
}

/// Ordering: `read_exercises` returns the newest exercise first.
#[allow(async_fn_in_trait)]
pub trait ExerciseRepository {
    async fn read_exercises(&self, user_id: &UserID) -> Result<Vec<Exercise>, ReadError>;
    async fn read_exercise(&self, id: &ExerciseID) -> Result<Exercise, ReadError>;
    async fn create_exercise(&self, exercise: Exercise) -> Result<Exercise, CreateError>;
    async fn replace_exercise(&self, exercise: Exercise) -> Result<Exercise, UpdateError>;
    async fn delete_exercise(&self, id: &ExerciseID) -> Result<ExerciseID, DeleteError>;
}

string_id!(ExerciseID, "exercise");

#[derive(Debug, Clone, PartialEq)]
pub struct Exercise {
    pub id: ExerciseID,
    pub user_id: UserID,
    pub name: Name,
    pub muscle_group: MuscleGroup,
    pub weight_type: WeightType,
    pub exercise_type: ExerciseType,
    pub sets: Sets,
    pub reps: Reps,
    pub technique: Option<String>,
    pub equipment_setup: Option<String>,
    pub equipment_name: Option<String>,
    pub equipment_photo: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Exercise {
    #[must_use]
    pub fn from_draft(user_id: UserID, draft: ExerciseDraft, now: DateTime<Utc>) -> Self {
        Self {
            id: ExerciseID::generate(),
            user_id,
            name: draft.name,
            muscle_group: draft.muscle_group,
            weight_type: draft.weight_type,
            exercise_type: draft.exercise_type,
            sets: draft.sets,
            reps: draft.reps,
            technique: non_empty(draft.technique),
            equipment_setup: non_empty(draft.equipment_setup),
            equipment_name: non_empty(draft.equipment_name),
            equipment_photo: non_empty(draft.equipment_photo),
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether `other` may stand in for this exercise within a workout.
    #[must_use]
    pub fn is_interchangeable_with(&self, other: &Exercise) -> bool {
        self.id != other.id
            && self.muscle_group == other.muscle_group
            && self.exercise_type == other.exercise_type
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// The user-editable part of an exercise.
#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseDraft {
    pub name: Name,
    pub muscle_group: MuscleGroup,
    pub weight_type: WeightType,
    pub exercise_type: ExerciseType,
    pub sets: Sets,
    pub reps: Reps,
    pub technique: Option<String>,
    pub equipment_setup: Option<String>,
    pub equipment_name: Option<String>,
    pub equipment_photo: Option<String>,
}

impl ExerciseDraft {
    #[must_use]
    pub fn new(name: Name, muscle_group: MuscleGroup, settings: &Settings) -> Self {
        Self {
            name,
            muscle_group,
            weight_type: settings.default_weight_type,
            exercise_type: settings.default_exercise_type,
            sets: settings.default_sets,
            reps: settings.default_reps,
            technique: None,
            equipment_setup: None,
            equipment_name: None,
            equipment_photo: None,
        }
    }

    /// Overwrite the editable fields of an existing exercise.
    pub fn apply(self, exercise: &mut Exercise, now: DateTime<Utc>) {
        exercise.name = self.name;
        exercise.muscle_group = self.muscle_group;
        exercise.weight_type = self.weight_type;
        exercise.exercise_type = self.exercise_type;
        exercise.sets = self.sets;
        exercise.reps = self.reps;
        exercise.technique = non_empty(self.technique);
        exercise.equipment_setup = non_empty(self.equipment_setup);
        exercise.equipment_name = non_empty(self.equipment_name);
        exercise.equipment_photo = non_empty(self.equipment_photo);
        exercise.updated_at = now;
    }
}

impl From<&Exercise> for ExerciseDraft {
    fn from(value: &Exercise) -> Self {
        Self {
            name: value.name.clone(),
            muscle_group: value.muscle_group,
            weight_type: value.weight_type,
            exercise_type: value.exercise_type,
            sets: value.sets,
            reps: value.reps,
            technique: value.technique.clone(),
            equipment_setup: value.equipment_setup.clone(),
            equipment_name: value.equipment_name.clone(),
            equipment_photo: value.equipment_photo.clone(),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub enum MuscleGroup {
    Chest,
    Back,
    Shoulders,
    Biceps,
    Triceps,
    Legs,
    Abs,
    Forearms,
}

impl Property for MuscleGroup {
    fn iter() -> Iter<'static, MuscleGroup> {
        static MUSCLE_GROUPS: [MuscleGroup; 8] = [
            MuscleGroup::Chest,
            MuscleGroup::Back,
            MuscleGroup::Shoulders,
            MuscleGroup::Biceps,
            MuscleGroup::Triceps,
            MuscleGroup::Legs,
            MuscleGroup::Abs,
            MuscleGroup::Forearms,
        ];
        MUSCLE_GROUPS.iter()
    }

    /// The label is also the persisted value.
    fn name(self) -> &'static str {
        match self {
            MuscleGroup::Chest => "Грудь",
            MuscleGroup::Back => "Спина",
            MuscleGroup::Shoulders => "Плечи",
            MuscleGroup::Biceps => "Бицепс",
            MuscleGroup::Triceps => "Трицепс",
            MuscleGroup::Legs => "Ноги",
            MuscleGroup::Abs => "Пресс",
            MuscleGroup::Forearms => "Предплечья",
        }
    }
}

impl TryFrom<&str> for MuscleGroup {
    type Error = MuscleGroupError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        MuscleGroup::iter()
            .find(|m| m.name() == value.trim())
            .copied()
            .ok_or_else(|| MuscleGroupError::Unknown(value.to_string()))
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum MuscleGroupError {
    #[error("Unknown muscle group: {0:?}")]
    Unknown(String),
}

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub enum WeightType {
    Bodyweight,
    Assisted,
    #[default]
    Weighted,
}

impl WeightType {
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            WeightType::Bodyweight => "bodyweight",
            WeightType::Assisted => "assisted",
            WeightType::Weighted => "weighted",
        }
    }
}

impl Property for WeightType {
    fn iter() -> Iter<'static, WeightType> {
        static WEIGHT_TYPES: [WeightType; 3] = [
            WeightType::Bodyweight,
            WeightType::Assisted,
            WeightType::Weighted,
        ];
        WEIGHT_TYPES.iter()
    }

    fn name(self) -> &'static str {
        match self {
            WeightType::Bodyweight => "Свой вес",
            WeightType::Assisted => "Антивес",
            WeightType::Weighted => "Доп. вес",
        }
    }
}

impl TryFrom<&str> for WeightType {
    type Error = PropertyError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        WeightType::iter()
            .find(|t| t.key() == value)
            .copied()
            .ok_or_else(|| PropertyError::Unknown("weight type", value.to_string()))
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub enum ExerciseType {
    #[default]
    Main,
    Auxiliary,
    Isolation,
}

impl ExerciseType {
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            ExerciseType::Main => "main",
            ExerciseType::Auxiliary => "auxiliary",
            ExerciseType::Isolation => "isolation",
        }
    }
}

impl Property for ExerciseType {
    fn iter() -> Iter<'static, ExerciseType> {
        static EXERCISE_TYPES: [ExerciseType; 3] = [
            ExerciseType::Main,
            ExerciseType::Auxiliary,
            ExerciseType::Isolation,
        ];
        EXERCISE_TYPES.iter()
    }

    fn name(self) -> &'static str {
        match self {
            ExerciseType::Main => "Основное",
            ExerciseType::Auxiliary => "Вспомогательное",
            ExerciseType::Isolation => "Изолированное",
        }
    }
}

impl TryFrom<&str> for ExerciseType {
    type Error = PropertyError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        ExerciseType::iter()
            .find(|t| t.key() == value)
            .copied()
            .ok_or_else(|| PropertyError::Unknown("exercise type", value.to_string()))
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum PropertyError {
    #[error("Unknown {0}: {1:?}")]
    Unknown(&'static str, String),
}

#[derive(Default, PartialEq)]
pub struct ExerciseFilter {
    pub name: String,
    pub muscle_group: Option<MuscleGroup>,
}

impl ExerciseFilter {
    #[must_use]
    pub fn exercises<'a>(
        &self,
        exercises: impl Iterator<Item = &'a Exercise>,
    ) -> Vec<&'a Exercise> {
        exercises
            .filter(|e| {
                e.name.matches(&self.name)
                    && self.muscle_group.is_none_or(|m| e.muscle_group == m)
            })
            .collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.trim().is_empty() && self.muscle_group.is_none()
    }

    /// Number of exercises per muscle group, in catalog order.
    #[must_use]
    pub fn muscle_group_counts(exercises: &[Exercise]) -> Vec<(MuscleGroup, usize)> {
        let counts = exercises
            .iter()
            .fold(BTreeMap::<MuscleGroup, usize>::new(), |mut counts, e| {
                *counts.entry(e.muscle_group).or_default() += 1;
                counts
            });
        MuscleGroup::iter()
            .map(|m| (*m, counts.get(m).copied().unwrap_or_default()))
            .collect()
    }

    pub fn toggle_muscle_group(&mut self, muscle_group: MuscleGroup) {
        if self.muscle_group == Some(muscle_group) {
            self.muscle_group = None;
        } else {
            self.muscle_group = Some(muscle_group);
        }
    }
}

pub trait Property: Clone + Copy + Sized {
    fn iter() -> Iter<'static, Self>;
    fn name(self) -> &'static str;
}
