//! Application logger
//!
//! Records are written to standard error and appended to a log repository,
//! which keeps the most recent entries for display in the app.

use std::{
    collections::VecDeque,
    io::Write,
    sync::{Arc, Mutex},
};

use chrono::Local;
use log::{Level, LevelFilter, Metadata, Record, SetLoggerError};
use serde::{Deserialize, Serialize};

pub const MAX_ENTRIES: usize = 100;

pub static LOG: Mutex<Option<Arc<Mutex<dyn Repository>>>> = Mutex::new(None);

#[allow(clippy::missing_errors_doc)]
pub trait Repository: Send + Sync + 'static {
    fn read_entries(&self) -> Result<VecDeque<Entry>, Error>;
    fn write_entry(&self, entry: Entry) -> Result<(), Error>;
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("{0}")]
    Unknown(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub time: String,
    #[serde(with = "LevelDef")]
    pub level: Level,
    pub message: String,
}

impl Entry {
    #[must_use]
    pub fn new(level: Level, message: String) -> Self {
        Self {
            time: Local::now().format("%b %d %H:%M:%S").to_string(),
            level,
            message,
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(remote = "Level")]
pub enum LevelDef {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Newest entries first, at most [`MAX_ENTRIES`].
pub fn append(entries: &mut VecDeque<Entry>, entry: Entry) {
    entries.push_front(entry);
    entries.truncate(MAX_ENTRIES);
}

/// Entries of the installed log repository.
///
/// # Errors
///
/// Returns an error if no repository is installed or it cannot be read.
pub fn entries() -> Result<VecDeque<Entry>, Error> {
    let log = LOG
        .lock()
        .map_err(|err| Error::Unknown(err.to_string()))?
        .clone()
        .ok_or_else(|| Error::Unknown("logger not initialized".to_string()))?;
    log.lock()
        .map_err(|err| Error::Unknown(err.to_string()))?
        .read_entries()
}

static LOGGER: Logger = Logger;

/// # Errors
///
/// Returns an error if the logger has already been initialized.
pub fn init(storage: Arc<Mutex<dyn Repository>>) -> Result<(), SetLoggerError> {
    if let Ok(mut log) = LOG.lock() {
        *log = Some(storage);
    }
    log::set_logger(&LOGGER).map(|()| log::set_max_level(LevelFilter::Trace))
}

struct Logger;

impl log::Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Trace
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let entry = Entry::new(record.level(), record.args().to_string());
        let _ = writeln!(
            std::io::stderr(),
            "{} {:<5} {}",
            entry.time,
            entry.level,
            entry.message
        );
        if let Ok(log) = LOG.lock() {
            if let Some(Ok(repository)) = log.as_ref().map(|log| log.lock()) {
                let _ = repository.write_entry(entry);
            }
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}
