use std::sync::LazyLock;

use chrono::{DateTime, TimeZone, Utc};
use gymbook_domain as domain;

fn time(month: u32, day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, month, day, hour, 0, 0).unwrap()
}

pub static USER: LazyLock<domain::User> =
    LazyLock::new(|| domain::User::new("user_1", Some("alice@example.com")));

pub static EXERCISES: LazyLock<Vec<domain::Exercise>> = LazyLock::new(|| {
    vec![
        EXERCISE.clone(),
        EXERCISE_2.clone(),
        EXERCISE_3.clone(),
        EXERCISE_4.clone(),
    ]
});

pub static EXERCISE: LazyLock<domain::Exercise> = LazyLock::new(|| domain::Exercise {
    id: "exercise_bench".into(),
    user_id: USER.id.clone(),
    name: domain::Name::new("Жим лежа").unwrap(),
    muscle_group: domain::MuscleGroup::Chest,
    weight_type: domain::WeightType::Weighted,
    exercise_type: domain::ExerciseType::Main,
    sets: domain::Sets::new(3).unwrap(),
    reps: domain::Reps::new(10).unwrap(),
    technique: Some("Лопатки сведены".to_string()),
    equipment_setup: None,
    equipment_name: None,
    equipment_photo: None,
    created_at: time(3, 1, 10),
    updated_at: time(3, 1, 10),
});

pub static EXERCISE_2: LazyLock<domain::Exercise> = LazyLock::new(|| domain::Exercise {
    id: "exercise_fly".into(),
    name: domain::Name::new("Разводка гантелей").unwrap(),
    exercise_type: domain::ExerciseType::Isolation,
    reps: domain::Reps::new(12).unwrap(),
    technique: None,
    equipment_name: Some("Гантели".to_string()),
    created_at: time(3, 1, 11),
    updated_at: time(3, 1, 11),
    ..EXERCISE.clone()
});

pub static EXERCISE_3: LazyLock<domain::Exercise> = LazyLock::new(|| domain::Exercise {
    id: "exercise_incline".into(),
    name: domain::Name::new("Жим на наклонной скамье").unwrap(),
    technique: None,
    created_at: time(3, 1, 12),
    updated_at: time(3, 1, 12),
    ..EXERCISE.clone()
});

pub static EXERCISE_4: LazyLock<domain::Exercise> = LazyLock::new(|| domain::Exercise {
    id: "exercise_dips".into(),
    name: domain::Name::new("Отжимания на брусьях").unwrap(),
    muscle_group: domain::MuscleGroup::Triceps,
    weight_type: domain::WeightType::Bodyweight,
    exercise_type: domain::ExerciseType::Auxiliary,
    technique: None,
    created_at: time(3, 1, 13),
    updated_at: time(3, 1, 13),
    ..EXERCISE.clone()
});

pub static WORKOUT: LazyLock<domain::Workout> = LazyLock::new(|| domain::Workout {
    id: "workout_chest".into(),
    user_id: USER.id.clone(),
    name: "Тренировка Грудь, Трицепс".to_string(),
    muscle_groups: vec![domain::MuscleGroup::Chest, domain::MuscleGroup::Triceps],
    status: domain::WorkoutStatus::Planned,
    created_at: time(3, 5, 9),
    completed_at: None,
});

pub static COMPLETED_WORKOUT: LazyLock<domain::Workout> = LazyLock::new(|| domain::Workout {
    id: "workout_chest_old".into(),
    name: "Тренировка Грудь".to_string(),
    muscle_groups: vec![domain::MuscleGroup::Chest],
    status: domain::WorkoutStatus::Completed,
    created_at: time(3, 2, 9),
    completed_at: Some(time(3, 2, 10)),
    ..WORKOUT.clone()
});

pub static WORKOUT_EXERCISES: LazyLock<Vec<domain::WorkoutExercise>> = LazyLock::new(|| {
    vec![
        domain::WorkoutExercise {
            id: "workout_exercise_1".into(),
            workout_id: WORKOUT.id.clone(),
            exercise_id: EXERCISE.id.clone(),
            order_index: 0,
            current_weight: 52.5,
            weight_achieved: false,
            created_at: time(3, 5, 9),
        },
        domain::WorkoutExercise {
            id: "workout_exercise_2".into(),
            workout_id: WORKOUT.id.clone(),
            exercise_id: EXERCISE_2.id.clone(),
            order_index: 1,
            current_weight: 12.0,
            weight_achieved: false,
            created_at: time(3, 5, 9),
        },
        domain::WorkoutExercise {
            id: "workout_exercise_3".into(),
            workout_id: COMPLETED_WORKOUT.id.clone(),
            exercise_id: EXERCISE.id.clone(),
            order_index: 0,
            current_weight: 50.0,
            weight_achieved: true,
            created_at: time(3, 2, 9),
        },
    ]
});

pub static PROGRESS: LazyLock<Vec<domain::ExerciseProgress>> = LazyLock::new(|| {
    vec![
        domain::ExerciseProgress {
            id: "progress_1".into(),
            user_id: USER.id.clone(),
            exercise_id: EXERCISE.id.clone(),
            weight: 50.0,
            achieved: true,
            workout_date: time(2, 20, 10),
            created_at: time(2, 20, 10),
        },
        domain::ExerciseProgress {
            id: "progress_2".into(),
            user_id: USER.id.clone(),
            exercise_id: EXERCISE.id.clone(),
            weight: 52.5,
            achieved: true,
            workout_date: time(3, 2, 10),
            created_at: time(3, 2, 10),
        },
        domain::ExerciseProgress {
            id: "progress_3".into(),
            user_id: USER.id.clone(),
            exercise_id: EXERCISE_2.id.clone(),
            weight: 12.0,
            achieved: false,
            workout_date: time(3, 3, 10),
            created_at: time(3, 3, 10),
        },
    ]
});
