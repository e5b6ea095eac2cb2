use crate::{ExerciseType, Reps, Sets, WeightType};

#[allow(async_fn_in_trait)]
pub trait SettingsService {
    async fn get_settings(&self) -> Result<Settings, String>;
    async fn set_settings(&self, settings: Settings) -> Result<(), String>;
}

#[allow(async_fn_in_trait)]
pub trait SettingsRepository {
    async fn read_settings(&self) -> Result<Settings, String>;
    async fn write_settings(&self, settings: Settings) -> Result<(), String>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settings {
    pub default_sets: Sets,
    pub default_reps: Reps,
    pub default_weight_type: WeightType,
    pub default_exercise_type: ExerciseType,
    /// Number of most recent progress records considered for a trend.
    pub trend_window: usize,
    /// Rest time in seconds after which the rest timer is considered elapsed.
    pub rest_target: u32,
}

impl Settings {
    #[must_use]
    pub fn rest_elapsed(&self, seconds: u32) -> bool {
        self.rest_target > 0 && seconds >= self.rest_target
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_sets: Sets::default(),
            default_reps: Reps::default(),
            default_weight_type: WeightType::default(),
            default_exercise_type: ExerciseType::default(),
            trend_window: 5,
            rest_target: 90,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[test]
    fn test_settings_default() {
        let settings = Settings::default();
        assert_eq!(u32::from(settings.default_sets), 3);
        assert_eq!(u32::from(settings.default_reps), 10);
        assert_eq!(settings.default_weight_type, WeightType::Weighted);
        assert_eq!(settings.default_exercise_type, ExerciseType::Main);
        assert_eq!(settings.trend_window, 5);
    }

    #[rstest]
    #[case(90, 0, false)]
    #[case(90, 89, false)]
    #[case(90, 90, true)]
    #[case(90, 120, true)]
    #[case(0, 120, false)]
    fn test_settings_rest_elapsed(
        #[case] rest_target: u32,
        #[case] seconds: u32,
        #[case] expected: bool,
    ) {
        let settings = Settings {
            rest_target,
            ..Settings::default()
        };
        assert_eq!(settings.rest_elapsed(seconds), expected);
    }
}
