// src/storage/mod.rs
pub mod report;

use std::fs;
use std::path::{Path, PathBuf};

use crate::lectio::models::{ScheduleResponse, WeekSchedule};
use crate::utils::error::StorageError;

pub use report::render_report;

pub struct StorageManager {
    base_dir: PathBuf,
}

impl StorageManager {
    /// Creates a new StorageManager with the specified base directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(StorageError::IoError)?;
        }

        Ok(Self { base_dir: base_path })
    }

    /// `<base>/<year>/week-<NN>/`, created on demand.
    pub fn week_dir(&self, schedule: &WeekSchedule) -> Result<PathBuf, StorageError> {
        let target_dir = self
            .base_dir
            .join(schedule.year.to_string())
            .join(format!("week-{:02}", schedule.week_number));

        if !target_dir.exists() {
            fs::create_dir_all(&target_dir).map_err(StorageError::IoError)?;
        }
        Ok(target_dir)
    }

    /// Writes the response envelope as pretty JSON to `schedule.json`.
    pub fn save_schedule(&self, response: &ScheduleResponse) -> Result<PathBuf, StorageError> {
        let file_path = self.week_dir(&response.schedule)?.join("schedule.json");

        let json = serde_json::to_string_pretty(response)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;
        fs::write(&file_path, json).map_err(StorageError::IoError)?;

        tracing::info!("Saved schedule to {}", file_path.display());
        Ok(file_path)
    }

    /// Writes the plain-text report to `schedule.txt`.
    pub fn save_report(&self, schedule: &WeekSchedule) -> Result<PathBuf, StorageError> {
        let file_path = self.week_dir(schedule)?.join("schedule.txt");
        fs::write(&file_path, render_report(schedule)).map_err(StorageError::IoError)?;

        tracing::info!("Saved report to {}", file_path.display());
        Ok(file_path)
    }

    /// Reads back a previously saved envelope, if there is one.
    pub fn load_schedule(&self, year: i32, week_number: u32) -> Result<Option<ScheduleResponse>, StorageError> {
        let file_path = self
            .base_dir
            .join(year.to_string())
            .join(format!("week-{:02}", week_number))
            .join("schedule.json");
        if !file_path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&file_path).map_err(StorageError::IoError)?;
        serde_json::from_str(&json)
            .map(Some)
            .map_err(|e| StorageError::SerializationError(e.to_string()))
    }

    /// True when the saved envelope for the same week carries the response's hash.
    pub fn is_unchanged(&self, response: &ScheduleResponse) -> Result<bool, StorageError> {
        let schedule = &response.schedule;
        let saved = self.load_schedule(schedule.year, schedule.week_number)?;
        Ok(saved.is_some_and(|saved| response.is_not_modified(&saved.next_hash)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::extract;
    use crate::extractors::test_fixtures::WEEK_PAGE;

    fn temp_base(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("lectio_storage_{}_{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_save_and_load_schedule() {
        let base = temp_base("roundtrip");
        let storage = StorageManager::new(&base).unwrap();
        let response = ScheduleResponse::at(extract(WEEK_PAGE).unwrap(), 1_700_000_000_000);

        let path = storage.save_schedule(&response).unwrap();
        assert_eq!(path, base.join("2024").join("week-10").join("schedule.json"));

        let loaded = storage.load_schedule(2024, 10).unwrap();
        assert_eq!(loaded, Some(response));
        assert_eq!(storage.load_schedule(2024, 11).unwrap(), None);

        fs::remove_dir_all(&base).unwrap();
    }

    #[test]
    fn test_unchanged_compares_saved_hash() {
        let base = temp_base("unchanged");
        let storage = StorageManager::new(&base).unwrap();
        let schedule = extract(WEEK_PAGE).unwrap();
        let first = ScheduleResponse::at(schedule.clone(), 1);

        assert!(!storage.is_unchanged(&first).unwrap(), "nothing saved yet");
        storage.save_schedule(&first).unwrap();
        assert!(storage.is_unchanged(&ScheduleResponse::at(schedule.clone(), 2)).unwrap());

        let mut changed = schedule;
        changed.summary.total_classes += 1;
        assert!(!storage.is_unchanged(&ScheduleResponse::at(changed, 3)).unwrap());

        fs::remove_dir_all(&base).unwrap();
    }

    #[test]
    fn test_save_report() {
        let base = temp_base("report");
        let storage = StorageManager::new(&base).unwrap();
        let schedule = extract(WEEK_PAGE).unwrap();

        let path = storage.save_report(&schedule).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("Uge 10 - 2024"));

        fs::remove_dir_all(&base).unwrap();
    }

    #[test]
    fn test_corrupt_file_is_serialization_error() {
        let base = temp_base("corrupt");
        let storage = StorageManager::new(&base).unwrap();
        let dir = base.join("2024").join("week-10");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("schedule.json"), "{not json").unwrap();

        let result = storage.load_schedule(2024, 10);
        assert!(matches!(result, Err(StorageError::SerializationError(_))));

        fs::remove_dir_all(&base).unwrap();
    }
}
