//! Workout generation
//!
//! A workout is put together in two steps: first the muscle groups are chosen,
//! then for each muscle group the exercises. The random mode picks exercises
//! by muscle group and exercise type instead. Both produce a [`WorkoutPlan`]
//! that is persisted by [`WorkoutGeneratorService::save_workout`].

use std::collections::BTreeMap;

use rand::{
    Rng,
    seq::{IndexedRandom, SliceRandom},
};

use crate::{
    CreateError, Exercise, ExerciseID, ExerciseType, MuscleGroup, Property, ReadError, UserID,
    Workout,
};

#[allow(async_fn_in_trait)]
pub trait WorkoutGeneratorService {
    /// Persist a plan as a new planned workout.
    ///
    /// Either the workout and all of its exercises are stored or, if any write
    /// fails, none of them.
    async fn save_workout(
        &self,
        user_id: &UserID,
        plan: WorkoutPlan,
    ) -> Result<Workout, GeneratorError>;

    /// Save the current selection and reset the generator.
    async fn commit(
        &self,
        user_id: &UserID,
        generator: &mut WorkoutGenerator,
    ) -> Result<Workout, GeneratorError> {
        let workout = self.save_workout(user_id, generator.plan()?).await?;
        generator.finish();
        Ok(workout)
    }
}

pub const MAX_RANDOM_EXERCISES: usize = 6;

#[derive(Debug, Clone, Default, PartialEq)]
pub enum WorkoutGenerator {
    #[default]
    Idle,
    SelectingMuscleGroups {
        muscle_groups: Vec<MuscleGroup>,
    },
    SelectingExercises {
        buckets: Vec<SelectionBucket>,
    },
}

/// Selected exercises of one muscle group.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionBucket {
    pub muscle_group: MuscleGroup,
    pub expanded: bool,
    pub selected: Vec<ExerciseID>,
}

impl SelectionBucket {
    fn new(muscle_group: MuscleGroup) -> Self {
        Self {
            muscle_group,
            expanded: true,
            selected: vec![],
        }
    }

    #[must_use]
    pub fn contains(&self, exercise_id: &ExerciseID) -> bool {
        self.selected.contains(exercise_id)
    }

    /// The catalog exercises of this muscle group, grouped by exercise type.
    #[must_use]
    pub fn exercises_by_type<'a>(
        &self,
        catalog: &'a [Exercise],
    ) -> BTreeMap<ExerciseType, Vec<&'a Exercise>> {
        catalog
            .iter()
            .filter(|e| e.muscle_group == self.muscle_group)
            .fold(BTreeMap::new(), |mut result, e| {
                result
                    .entry(e.exercise_type)
                    .or_insert_with(Vec::new)
                    .push(e);
                result
            })
    }
}

impl WorkoutGenerator {
    #[must_use]
    pub fn muscle_groups(&self) -> Vec<MuscleGroup> {
        match self {
            WorkoutGenerator::Idle => vec![],
            WorkoutGenerator::SelectingMuscleGroups { muscle_groups } => muscle_groups.clone(),
            WorkoutGenerator::SelectingExercises { buckets } => {
                buckets.iter().map(|b| b.muscle_group).collect()
            }
        }
    }

    /// Muscle groups that can still be added, in catalog order.
    #[must_use]
    pub fn available_muscle_groups(&self) -> Vec<MuscleGroup> {
        let selected = self.muscle_groups();
        MuscleGroup::iter()
            .copied()
            .filter(|m| !selected.contains(m))
            .collect()
    }

    pub fn add_muscle_group(&mut self, muscle_group: MuscleGroup) -> Result<(), GeneratorError> {
        match self {
            WorkoutGenerator::Idle => {
                *self = WorkoutGenerator::SelectingMuscleGroups {
                    muscle_groups: vec![muscle_group],
                };
                Ok(())
            }
            WorkoutGenerator::SelectingMuscleGroups { muscle_groups } => {
                if muscle_groups.contains(&muscle_group) {
                    return Err(GeneratorError::DuplicateMuscleGroup(muscle_group));
                }
                muscle_groups.push(muscle_group);
                Ok(())
            }
            WorkoutGenerator::SelectingExercises { .. } => Err(GeneratorError::InvalidState),
        }
    }

    pub fn remove_muscle_group(&mut self, muscle_group: MuscleGroup) -> Result<(), GeneratorError> {
        match self {
            WorkoutGenerator::Idle => Ok(()),
            WorkoutGenerator::SelectingMuscleGroups { muscle_groups } => {
                muscle_groups.retain(|m| *m != muscle_group);
                Ok(())
            }
            WorkoutGenerator::SelectingExercises { .. } => Err(GeneratorError::InvalidState),
        }
    }

    /// Proceed to the exercise selection with one empty, expanded bucket per
    /// muscle group.
    pub fn select_exercises(&mut self) -> Result<(), GeneratorError> {
        match self {
            WorkoutGenerator::SelectingMuscleGroups { muscle_groups }
                if !muscle_groups.is_empty() =>
            {
                *self = WorkoutGenerator::SelectingExercises {
                    buckets: muscle_groups
                        .iter()
                        .map(|m| SelectionBucket::new(*m))
                        .collect(),
                };
                Ok(())
            }
            WorkoutGenerator::Idle | WorkoutGenerator::SelectingMuscleGroups { .. } => {
                Err(GeneratorError::NoMuscleGroups)
            }
            WorkoutGenerator::SelectingExercises { .. } => Err(GeneratorError::InvalidState),
        }
    }

    /// Return to the muscle group selection, discarding all selected exercises.
    pub fn back(&mut self) {
        if let WorkoutGenerator::SelectingExercises { buckets } = self {
            *self = WorkoutGenerator::SelectingMuscleGroups {
                muscle_groups: buckets.iter().map(|b| b.muscle_group).collect(),
            };
        }
    }

    #[must_use]
    pub fn buckets(&self) -> &[SelectionBucket] {
        match self {
            WorkoutGenerator::SelectingExercises { buckets } => buckets,
            WorkoutGenerator::Idle | WorkoutGenerator::SelectingMuscleGroups { .. } => &[],
        }
    }

    /// Toggle the exercise in the bucket of its own muscle group and return
    /// whether it is selected afterwards.
    pub fn toggle_exercise(&mut self, exercise: &Exercise) -> Result<bool, GeneratorError> {
        let bucket = self.bucket_mut(exercise.muscle_group)?;
        if let Some(position) = bucket.selected.iter().position(|id| *id == exercise.id) {
            bucket.selected.remove(position);
            Ok(false)
        } else {
            bucket.selected.push(exercise.id.clone());
            Ok(true)
        }
    }

    pub fn toggle_expanded(&mut self, muscle_group: MuscleGroup) -> Result<(), GeneratorError> {
        let bucket = self.bucket_mut(muscle_group)?;
        bucket.expanded = !bucket.expanded;
        Ok(())
    }

    #[must_use]
    pub fn selected_count(&self) -> usize {
        self.buckets().iter().map(|b| b.selected.len()).sum()
    }

    /// The exercises in bucket order, then in the order they were selected.
    pub fn plan(&self) -> Result<WorkoutPlan, GeneratorError> {
        match self {
            WorkoutGenerator::SelectingExercises { buckets } => {
                if self.selected_count() == 0 {
                    return Err(GeneratorError::NoExercisesSelected);
                }
                Ok(WorkoutPlan {
                    muscle_groups: buckets.iter().map(|b| b.muscle_group).collect(),
                    exercise_ids: buckets
                        .iter()
                        .flat_map(|b| b.selected.iter().cloned())
                        .collect(),
                })
            }
            WorkoutGenerator::Idle | WorkoutGenerator::SelectingMuscleGroups { .. } => {
                Err(GeneratorError::NoExercisesSelected)
            }
        }
    }

    /// Called after the plan has been saved.
    pub fn finish(&mut self) {
        *self = WorkoutGenerator::Idle;
    }

    fn bucket_mut(
        &mut self,
        muscle_group: MuscleGroup,
    ) -> Result<&mut SelectionBucket, GeneratorError> {
        match self {
            WorkoutGenerator::SelectingExercises { buckets } => buckets
                .iter_mut()
                .find(|b| b.muscle_group == muscle_group)
                .ok_or(GeneratorError::UnknownMuscleGroup(muscle_group)),
            WorkoutGenerator::Idle | WorkoutGenerator::SelectingMuscleGroups { .. } => {
                Err(GeneratorError::InvalidState)
            }
        }
    }
}

/// Ordered exercise list of a workout that is about to be created.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutPlan {
    pub muscle_groups: Vec<MuscleGroup>,
    pub exercise_ids: Vec<ExerciseID>,
}

impl WorkoutPlan {
    #[must_use]
    pub fn from_exercises(muscle_groups: Vec<MuscleGroup>, exercises: &[&Exercise]) -> Self {
        Self {
            muscle_groups,
            exercise_ids: exercises.iter().map(|e| e.id.clone()).collect(),
        }
    }

    #[must_use]
    pub fn name(&self) -> String {
        Workout::default_name(&self.muscle_groups)
    }
}

/// Catalog exercises matching any of the muscle groups and exercise types.
#[must_use]
pub fn available_exercises<'a>(
    catalog: &'a [Exercise],
    muscle_groups: &[MuscleGroup],
    exercise_types: &[ExerciseType],
) -> Vec<&'a Exercise> {
    catalog
        .iter()
        .filter(|e| {
            muscle_groups.contains(&e.muscle_group) && exercise_types.contains(&e.exercise_type)
        })
        .collect()
}

#[must_use]
pub fn available_count(
    catalog: &[Exercise],
    muscle_groups: &[MuscleGroup],
    exercise_types: &[ExerciseType],
) -> usize {
    available_exercises(catalog, muscle_groups, exercise_types).len()
}

/// Pick up to `count` random exercises matching the muscle groups and types.
///
/// `count` is clamped to `1..=MAX_RANDOM_EXERCISES`.
pub fn random_workout<'a, R: Rng + ?Sized>(
    catalog: &'a [Exercise],
    muscle_groups: &[MuscleGroup],
    exercise_types: &[ExerciseType],
    count: usize,
    rng: &mut R,
) -> Vec<&'a Exercise> {
    let mut exercises = available_exercises(catalog, muscle_groups, exercise_types);
    exercises.shuffle(rng);
    exercises.truncate(count.clamp(1, MAX_RANDOM_EXERCISES));
    exercises
}

/// A random replacement for the exercise at `index`.
///
/// Candidates share muscle group and exercise type with the replaced exercise
/// and are not part of `workout` yet.
pub fn random_replacement<'a, R: Rng + ?Sized>(
    catalog: &'a [Exercise],
    workout: &[&'a Exercise],
    index: usize,
    rng: &mut R,
) -> Option<&'a Exercise> {
    let current = workout.get(index)?;
    catalog
        .iter()
        .filter(|e| {
            current.is_interchangeable_with(e) && !workout.iter().any(|w| w.id == e.id)
        })
        .collect::<Vec<_>>()
        .choose(rng)
        .copied()
}

#[derive(thiserror::Error, Debug)]
pub enum GeneratorError {
    #[error("Select at least one muscle group")]
    NoMuscleGroups,
    #[error("Select at least one exercise")]
    NoExercisesSelected,
    #[error("Muscle group {} is already selected", .0.name())]
    DuplicateMuscleGroup(MuscleGroup),
    #[error("Muscle group {} is not selected", .0.name())]
    UnknownMuscleGroup(MuscleGroup),
    #[error("Operation not possible in the current step")]
    InvalidState,
    #[error(transparent)]
    Read(#[from] ReadError),
    #[error(transparent)]
    Create(#[from] CreateError),
}
