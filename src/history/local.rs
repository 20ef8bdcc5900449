use atomic_write_file::AtomicWriteFile;
use fd_lock::RwLock;
use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use super::error::HistoryError;
use super::types::{HistoryLog, HistoryRecord};

/// Get the default history file path (~/.config/sunan-radar/history.json)
pub fn default_history_path() -> PathBuf {
    crate::config::get_config_dir().join("history.json")
}

/// Load the history log from a JSON file
///
/// If the file doesn't exist, returns a new empty log.
/// If the file exists but has an unsupported version, returns an error.
pub fn load_history(path: &Path) -> Result<HistoryLog, HistoryError> {
    if !path.exists() {
        return Ok(HistoryLog::new());
    }

    let file = File::open(path).map_err(|e| HistoryError::io(path, e))?;
    let log: HistoryLog = serde_json::from_reader(file)?;

    if log.version != HistoryLog::VERSION {
        return Err(HistoryError::UnsupportedVersion(log.version));
    }

    Ok(log)
}

/// Save the history log atomically
///
/// The file is replaced in one step, so a crash never leaves half a document.
/// Creates the parent directory if it doesn't exist.
pub fn save_history(path: &Path, log: &HistoryLog) -> Result<(), HistoryError> {
    ensure_parent_dir(path)?;

    let mut file = AtomicWriteFile::open(path).map_err(|e| HistoryError::io(path, e))?;
    serde_json::to_writer_pretty(&mut file, log)?;
    file.commit().map_err(|e| HistoryError::io(path, e))?;

    Ok(())
}

/// Append one record, keeping every existing one.
///
/// Load, push and replace run under an exclusive lock on a sibling
/// `<file>.lock`, so concurrent appenders (threads or processes) never
/// overwrite each other's rows.
pub fn append_record(path: &Path, record: HistoryRecord) -> Result<(), HistoryError> {
    ensure_parent_dir(path)?;

    let lock_path = lock_path(path);
    let lock_file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(&lock_path)
        .map_err(|e| HistoryError::io(&lock_path, e))?;
    let mut lock = RwLock::new(lock_file);
    let _guard = lock.write().map_err(|e| HistoryError::io(&lock_path, e))?;

    let mut log = load_history(path)?;
    log.append(record);
    save_history(path, &log)
}

/// `history.json` -> `history.json.lock`
fn lock_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".lock");
    PathBuf::from(name)
}

fn ensure_parent_dir(path: &Path) -> Result<(), HistoryError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| HistoryError::io(parent, e))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{Diagnosis, ScoreResult};
    use chrono::NaiveDate;

    fn record(name: &str, effectiveness: f64) -> HistoryRecord {
        let result = ScoreResult {
            effectiveness,
            immunity: 60.0,
            cohesion: 50.0,
            diagnosis: Diagnosis::Balanced,
            actions: vec![],
        };
        let at = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        HistoryRecord::from_result(name, &result, at)
    }

    #[test]
    fn test_load_missing_file_returns_empty() {
        let dir = tempfile::tempdir().unwrap();
        let log = load_history(&dir.path().join("missing.json")).unwrap();
        assert_eq!(log.version, 1);
        assert!(log.records.is_empty());
    }

    #[test]
    fn test_append_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("history.json");

        append_record(&path, record("amina", 40.0)).unwrap();
        append_record(&path, record("yusuf", 70.0)).unwrap();
        append_record(&path, record("amina", 90.0)).unwrap();

        let log = load_history(&path).unwrap();
        assert_eq!(log.records.len(), 3);
        assert_eq!(log.records[0].display_name, "amina");
        assert_eq!(log.records[1].display_name, "yusuf");
        assert_eq!(log.records[2].effectiveness, 90.0);
    }

    #[test]
    fn test_concurrent_appends_keep_every_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");

        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let path = path.clone();
                std::thread::spawn(move || {
                    for i in 0..25 {
                        let name = format!("worker-{}", worker);
                        append_record(&path, record(&name, i as f64)).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let log = load_history(&path).unwrap();
        assert_eq!(log.records.len(), 200);
        for worker in 0..8 {
            let name = format!("worker-{}", worker);
            let mine: Vec<f64> = log
                .records
                .iter()
                .filter(|r| r.display_name == name)
                .map(|r| r.effectiveness)
                .collect();
            // Each worker's rows land in submission order
            assert_eq!(mine, (0..25).map(|i| i as f64).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_lock_file_sits_next_to_history() {
        assert_eq!(
            lock_path(Path::new("/tmp/radar/history.json")),
            PathBuf::from("/tmp/radar/history.json.lock")
        );
    }

    #[test]
    fn test_unsupported_version_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        std::fs::write(&path, r#"{"version": 7, "records": []}"#).unwrap();

        match load_history(&path) {
            Err(HistoryError::UnsupportedVersion(7)) => {}
            other => panic!("expected UnsupportedVersion, got {:?}", other),
        }
    }

    #[test]
    fn test_corrupt_file_is_an_error_not_a_reset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(matches!(load_history(&path), Err(HistoryError::Json(_))));
        assert!(append_record(&path, record("amina", 50.0)).is_err());
        // The original bytes are untouched
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "not json");
    }
}
