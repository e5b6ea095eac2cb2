use chrono::{DateTime, Utc};

use crate::{
    Exercise, ExerciseID, ExerciseProgress, ExerciseSet, ReadError, UserID, Workout,
    WorkoutExercise,
};

#[allow(async_fn_in_trait)]
pub trait HistoryService {
    /// Completed workouts with their exercises and sets, most recently
    /// completed first, and all progress records of the user, newest first.
    async fn get_history(&self, user_id: &UserID) -> Result<History, ReadError>;
}

pub const DEFAULT_TREND_WINDOW: usize = 5;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct History {
    pub workouts: Vec<WorkoutDetails>,
    pub progress: Vec<ExerciseProgress>,
}

impl History {
    #[must_use]
    pub fn total_stats(&self) -> TotalStats {
        TotalStats::new(self.workouts.iter().map(WorkoutDetails::stats))
    }

    #[must_use]
    pub fn trend(&self, exercise_id: &ExerciseID, window: usize) -> Option<Trend> {
        progress_trend(&self.progress, exercise_id, window)
    }

    /// Exercises with at least one progress record, most recently trained
    /// first.
    #[must_use]
    pub fn tracked_exercises(&self) -> Vec<&ExerciseID> {
        let mut result: Vec<&ExerciseID> = vec![];
        for p in &self.progress {
            if !result.contains(&&p.exercise_id) {
                result.push(&p.exercise_id);
            }
        }
        result
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutDetails {
    pub workout: Workout,
    pub exercises: Vec<WorkoutExerciseDetails>,
}

impl WorkoutDetails {
    #[must_use]
    pub fn stats(&self) -> WorkoutStats {
        WorkoutStats::new(&self.exercises)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutExerciseDetails {
    pub workout_exercise: WorkoutExercise,
    /// `None` if the exercise definition was deleted after the workout.
    pub exercise: Option<Exercise>,
    pub sets: Vec<ExerciseSet>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkoutStats {
    pub total_sets: usize,
    pub completed_sets: usize,
    /// Sum of weight times reps over all sets, rounded.
    pub total_weight: i64,
    pub achieved_exercises: usize,
    /// Percentage of completed sets, 0 without sets.
    pub completion_rate: u32,
}

impl WorkoutStats {
    #[must_use]
    pub fn new(exercises: &[WorkoutExerciseDetails]) -> Self {
        let sets = exercises.iter().flat_map(|e| e.sets.iter());
        let total_sets = sets.clone().count();
        let completed_sets = sets.clone().filter(|s| s.completed).count();
        #[allow(clippy::cast_possible_truncation)]
        let total_weight = sets.map(ExerciseSet::volume).sum::<f32>().round() as i64;
        Self {
            total_sets,
            completed_sets,
            total_weight,
            achieved_exercises: exercises
                .iter()
                .filter(|e| e.workout_exercise.weight_achieved)
                .count(),
            completion_rate: percentage(completed_sets, total_sets),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TotalStats {
    pub workouts: usize,
    pub total_sets: usize,
    pub total_weight: i64,
    /// Mean of the completion rates of all workouts, 0 without workouts.
    pub avg_completion: u32,
}

impl TotalStats {
    pub fn new(stats: impl Iterator<Item = WorkoutStats>) -> Self {
        let (result, rate_sum) = stats.fold(
            (TotalStats::default(), 0_u64),
            |(mut result, rate_sum), s| {
                result.workouts += 1;
                result.total_sets += s.total_sets;
                result.total_weight += s.total_weight;
                (result, rate_sum + u64::from(s.completion_rate))
            },
        );
        if result.workouts == 0 {
            return result;
        }
        #[allow(
            clippy::cast_precision_loss,
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss
        )]
        let avg_completion = (rate_sum as f64 / result.workouts as f64).round() as u32;
        TotalStats {
            avg_completion,
            ..result
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendDirection {
    Up,
    Down,
    Stable,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trend {
    pub direction: TrendDirection,
    /// Absolute weight difference between the first and the last point.
    pub change: f32,
    /// Chronological.
    pub points: Vec<(DateTime<Utc>, f32)>,
}

/// Trend of the latest `window` progress records of an exercise.
///
/// `progress` must be ordered newest first. Fewer than two records give no
/// trend.
#[must_use]
pub fn progress_trend(
    progress: &[ExerciseProgress],
    exercise_id: &ExerciseID,
    window: usize,
) -> Option<Trend> {
    let mut points = progress
        .iter()
        .filter(|p| p.exercise_id == *exercise_id)
        .take(window)
        .map(|p| (p.workout_date, p.weight))
        .collect::<Vec<_>>();
    points.reverse();
    if points.len() < 2 {
        return None;
    }
    let first = points.first()?.1;
    let last = points.last()?.1;
    let direction = if last > first {
        TrendDirection::Up
    } else if last < first {
        TrendDirection::Down
    } else {
        TrendDirection::Stable
    };
    Some(Trend {
        direction,
        change: (last - first).abs(),
        points,
    })
}

fn percentage(part: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    let result = (100.0 * part as f64 / total as f64).round() as u32;
    result
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn date(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, 10, 0, 0).unwrap()
    }

    fn set(set_number: u32, weight: f32, reps: u32, completed: bool) -> ExerciseSet {
        ExerciseSet {
            id: format!("s{set_number}").into(),
            workout_exercise_id: "we1".into(),
            set_number,
            reps,
            weight,
            completed,
            created_at: date(1),
        }
    }

    fn details(weight_achieved: bool, sets: Vec<ExerciseSet>) -> WorkoutExerciseDetails {
        let mut workout_exercise = WorkoutExercise::new("w1".into(), "e1".into(), 0, 0.0, date(1));
        workout_exercise.weight_achieved = weight_achieved;
        WorkoutExerciseDetails {
            workout_exercise,
            exercise: None,
            sets,
        }
    }

    fn progress(exercise_id: &str, day: u32, weight: f32) -> ExerciseProgress {
        ExerciseProgress {
            id: format!("p{day}").into(),
            user_id: "u1".into(),
            exercise_id: exercise_id.into(),
            weight,
            achieved: true,
            workout_date: date(day),
            created_at: date(day),
        }
    }

    fn workout(exercises: Vec<WorkoutExerciseDetails>) -> WorkoutDetails {
        WorkoutDetails {
            workout: Workout::planned("u1".into(), vec![], date(1)),
            exercises,
        }
    }

    #[test]
    fn test_workout_stats() {
        let stats = WorkoutStats::new(&[
            details(
                true,
                vec![
                    set(1, 50.0, 10, true),
                    set(2, 50.0, 10, true),
                    set(3, 52.5, 8, true),
                ],
            ),
            details(false, vec![set(1, 12.25, 12, true), set(2, 12.25, 12, false)]),
        ]);

        assert_eq!(
            stats,
            WorkoutStats {
                total_sets: 5,
                completed_sets: 4,
                total_weight: 1714,
                achieved_exercises: 1,
                completion_rate: 80,
            }
        );
    }

    #[test]
    fn test_workout_stats_without_sets() {
        let stats = WorkoutStats::new(&[details(false, vec![])]);
        assert_eq!(stats.total_sets, 0);
        assert_eq!(stats.completion_rate, 0);
        assert_eq!(stats.total_weight, 0);
    }

    #[rstest]
    #[case(1, 3, 33)]
    #[case(2, 3, 67)]
    #[case(3, 3, 100)]
    #[case(0, 0, 0)]
    fn test_percentage(#[case] part: usize, #[case] total: usize, #[case] expected: u32) {
        assert_eq!(percentage(part, total), expected);
    }

    #[test]
    fn test_total_stats() {
        let history = History {
            workouts: vec![
                workout(vec![details(true, vec![set(1, 10.0, 10, true)])]),
                workout(vec![details(
                    false,
                    vec![
                        set(1, 10.0, 10, true),
                        set(2, 10.0, 10, false),
                        set(3, 10.0, 10, false),
                    ],
                )]),
            ],
            progress: vec![],
        };

        assert_eq!(
            history.total_stats(),
            TotalStats {
                workouts: 2,
                total_sets: 4,
                total_weight: 400,
                avg_completion: 67,
            }
        );
    }

    #[test]
    fn test_total_stats_without_workouts() {
        assert_eq!(History::default().total_stats(), TotalStats::default());
    }

    #[test]
    fn test_progress_trend_up() {
        let progress = (1..=7)
            .rev()
            .map(|day| progress("e1", day, 40.0 + day as f32 * 2.5))
            .chain([progress("e2", 8, 100.0)])
            .collect::<Vec<_>>();

        let trend = progress_trend(&progress, &"e1".into(), DEFAULT_TREND_WINDOW).unwrap();

        assert_eq!(trend.direction, TrendDirection::Up);
        assert_approx_eq!(trend.change, 10.0);
        assert_eq!(
            trend.points.iter().map(|(d, _)| *d).collect::<Vec<_>>(),
            (3..=7).map(date).collect::<Vec<_>>()
        );
    }

    #[rstest]
    #[case(60.0, 50.0, TrendDirection::Down, 10.0)]
    #[case(50.0, 50.0, TrendDirection::Stable, 0.0)]
    #[case(50.0, 52.5, TrendDirection::Up, 2.5)]
    fn test_progress_trend_direction(
        #[case] first: f32,
        #[case] last: f32,
        #[case] direction: TrendDirection,
        #[case] change: f32,
    ) {
        let progress = vec![progress("e1", 2, last), progress("e1", 1, first)];
        let trend = progress_trend(&progress, &"e1".into(), 5).unwrap();
        assert_eq!(trend.direction, direction);
        assert_approx_eq!(trend.change, change);
    }

    #[test]
    fn test_progress_trend_single_point() {
        let progress = vec![progress("e1", 1, 50.0), progress("e2", 2, 60.0)];
        assert_eq!(progress_trend(&progress, &"e1".into(), 5), None);
        assert_eq!(progress_trend(&progress, &"e3".into(), 5), None);
    }

    #[test]
    fn test_tracked_exercises() {
        let history = History {
            workouts: vec![],
            progress: vec![
                progress("e2", 3, 10.0),
                progress("e1", 2, 10.0),
                progress("e2", 1, 10.0),
            ],
        };
        assert_eq!(
            history
                .tracked_exercises()
                .iter()
                .map(|id| id.as_str())
                .collect::<Vec<_>>(),
            vec!["e2", "e1"]
        );
    }
}
