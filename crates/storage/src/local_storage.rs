use std::{
    collections::VecDeque,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use gymbook_domain as domain;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use crate::log;

const KEY_SETTINGS: &str = "settings";
const KEY_LOG: &str = "log";

/// Key-value store persisted as a single JSON object in a file.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    path: PathBuf,
}

#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("key not found: {0}")]
    KeyNotFound(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
}

impl LocalStorage {
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T, StorageError> {
        let value = self
            .read()?
            .remove(key)
            .ok_or_else(|| StorageError::KeyNotFound(key.to_string()))?;
        Ok(serde_json::from_value(value)?)
    }

    pub fn set<T: Serialize>(&self, key: &str, value: T) -> Result<(), StorageError> {
        let mut values = self.read()?;
        values.insert(key.to_string(), serde_json::to_value(value)?);
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_vec(&values)?)?;
        Ok(())
    }

    fn read(&self) -> Result<Map<String, Value>, StorageError> {
        match fs::read(&self.path) {
            Ok(content) => Ok(serde_json::from_slice(&content)?),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Map::new()),
            Err(err) => Err(err.into()),
        }
    }
}

pub struct UI {
    storage: LocalStorage,
}

impl UI {
    #[must_use]
    pub fn new(storage: LocalStorage) -> Self {
        Self { storage }
    }
}

impl domain::SettingsRepository for UI {
    async fn read_settings(&self) -> Result<domain::Settings, String> {
        match self.storage.get::<SettingsRecord>(KEY_SETTINGS) {
            Ok(settings) => settings.try_into(),
            Err(StorageError::KeyNotFound(_)) => Ok(domain::Settings::default()),
            Err(err) => Err(err.to_string()),
        }
    }

    async fn write_settings(&self, settings: domain::Settings) -> Result<(), String> {
        self.storage
            .set(KEY_SETTINGS, SettingsRecord::from(settings))
            .map_err(|err| err.to_string())
    }
}

pub struct Log {
    storage: LocalStorage,
}

impl Log {
    #[must_use]
    pub fn new(storage: LocalStorage) -> Self {
        Self { storage }
    }
}

impl log::Repository for Log {
    fn read_entries(&self) -> Result<VecDeque<log::Entry>, log::Error> {
        match self.storage.get(KEY_LOG) {
            Ok(entries) => Ok(entries),
            Err(StorageError::KeyNotFound(_)) => Ok(VecDeque::new()),
            Err(err) => Err(log::Error::Unknown(err.to_string())),
        }
    }

    fn write_entry(&self, entry: log::Entry) -> Result<(), log::Error> {
        let mut entries = self.read_entries()?;
        log::append(&mut entries, entry);
        self.storage
            .set(KEY_LOG, entries)
            .map_err(|err| log::Error::Unknown(err.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct SettingsRecord {
    default_sets: u32,
    default_reps: u32,
    default_weight_type: String,
    default_exercise_type: String,
    trend_window: usize,
    rest_target: u32,
}

impl Default for SettingsRecord {
    fn default() -> Self {
        domain::Settings::default().into()
    }
}

impl From<domain::Settings> for SettingsRecord {
    fn from(settings: domain::Settings) -> Self {
        Self {
            default_sets: settings.default_sets.into(),
            default_reps: settings.default_reps.into(),
            default_weight_type: settings.default_weight_type.key().to_string(),
            default_exercise_type: settings.default_exercise_type.key().to_string(),
            trend_window: settings.trend_window,
            rest_target: settings.rest_target,
        }
    }
}

impl TryFrom<SettingsRecord> for domain::Settings {
    type Error = String;

    fn try_from(record: SettingsRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            default_sets: domain::Sets::new(record.default_sets).map_err(|err| err.to_string())?,
            default_reps: domain::Reps::new(record.default_reps).map_err(|err| err.to_string())?,
            default_weight_type: domain::WeightType::try_from(record.default_weight_type.as_str())
                .map_err(|err| err.to_string())?,
            default_exercise_type: domain::ExerciseType::try_from(
                record.default_exercise_type.as_str(),
            )
            .map_err(|err| err.to_string())?,
            trend_window: record.trend_window.max(2),
            rest_target: record.rest_target,
        })
    }
}

#[cfg(test)]
mod tests {
    use gymbook_domain::SettingsRepository;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn storage(dir: &tempfile::TempDir) -> LocalStorage {
        LocalStorage::new(dir.path().join("gymbook").join("storage.json"))
    }

    #[test]
    fn test_get_and_set() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(&dir);

        assert!(matches!(
            storage.get::<u32>("a"),
            Err(StorageError::KeyNotFound(key)) if key == "a"
        ));
        storage.set("a", 1).unwrap();
        storage.set("b", "x").unwrap();
        assert_eq!(storage.get::<u32>("a").unwrap(), 1);
        assert_eq!(storage.get::<String>("b").unwrap(), "x");
        assert!(matches!(storage.get::<u32>("b"), Err(StorageError::Serde(_))));
    }

    #[tokio::test]
    async fn test_settings() {
        let dir = tempfile::tempdir().unwrap();
        let ui = UI::new(storage(&dir));
        assert_eq!(ui.read_settings().await.unwrap(), domain::Settings::default());

        let settings = domain::Settings {
            default_sets: domain::Sets::new(4).unwrap(),
            default_weight_type: domain::WeightType::Bodyweight,
            trend_window: 8,
            rest_target: 120,
            ..domain::Settings::default()
        };
        ui.write_settings(settings).await.unwrap();
        assert_eq!(ui.read_settings().await.unwrap(), settings);
        assert_eq!(
            storage(&dir).get::<Value>(KEY_SETTINGS).unwrap()["default_weight_type"],
            json!("bodyweight")
        );
    }

    #[tokio::test]
    async fn test_partial_and_invalid_settings() {
        let dir = tempfile::tempdir().unwrap();
        let ui = UI::new(storage(&dir));

        storage(&dir)
            .set(KEY_SETTINGS, json!({"rest_target": 60}))
            .unwrap();
        assert_eq!(
            ui.read_settings().await.unwrap(),
            domain::Settings {
                rest_target: 60,
                ..domain::Settings::default()
            }
        );

        storage(&dir)
            .set(KEY_SETTINGS, json!({"default_sets": 0}))
            .unwrap();
        assert!(ui.read_settings().await.is_err());
    }

    #[test]
    fn test_log() {
        use crate::log::Repository;

        let dir = tempfile::tempdir().unwrap();
        let repository = Log::new(storage(&dir));
        assert!(repository.read_entries().unwrap().is_empty());

        for message in ["a", "b"] {
            repository
                .write_entry(log::Entry::new(::log::Level::Info, message.to_string()))
                .unwrap();
        }
        let entries = repository.read_entries().unwrap();
        assert_eq!(
            entries.iter().map(|e| e.message.as_str()).collect::<Vec<_>>(),
            vec!["b", "a"]
        );
        assert_eq!(entries[0].level, ::log::Level::Info);
    }
}
