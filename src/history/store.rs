use anyhow::{Context, Result};
use std::path::PathBuf;

use super::error::HistoryError;
use super::local;
use super::remote::RemoteStore;
use super::types::HistoryRecord;
use crate::config::{HistoryBackend, HistoryConfig};

/// Append-only history backend selected by the config.
#[derive(Debug, Clone)]
pub enum HistoryStore {
    Local(PathBuf),
    Remote(RemoteStore),
    Disabled,
}

impl HistoryStore {
    pub fn from_config(config: &HistoryConfig) -> Result<Self> {
        match config.backend {
            HistoryBackend::Local => Ok(HistoryStore::Local(config.resolved_path())),
            HistoryBackend::Remote => {
                let endpoint = config
                    .endpoint
                    .clone()
                    .context("history.endpoint is required for the remote backend")?;
                let store = RemoteStore::new(
                    endpoint,
                    config.timeout()?,
                    config.token(),
                    config.max_retries(),
                )?;
                Ok(HistoryStore::Remote(store))
            }
            HistoryBackend::Disabled => Ok(HistoryStore::Disabled),
        }
    }

    /// Human readable location, for status lines.
    pub fn describe(&self) -> String {
        match self {
            HistoryStore::Local(path) => path.display().to_string(),
            HistoryStore::Remote(remote) => remote.endpoint().to_string(),
            HistoryStore::Disabled => "disabled".to_string(),
        }
    }

    pub async fn append(&self, record: HistoryRecord) -> Result<(), HistoryError> {
        match self {
            HistoryStore::Local(path) => {
                let path = path.clone();
                // File I/O runs off the async runtime
                tokio::task::spawn_blocking(move || local::append_record(&path, record))
                    .await
                    .map_err(|e| HistoryError::Task(e.to_string()))?
            }
            HistoryStore::Remote(remote) => remote.append(&record).await,
            HistoryStore::Disabled => Err(HistoryError::Disabled),
        }
    }

    pub async fn load(&self) -> Result<Vec<HistoryRecord>, HistoryError> {
        match self {
            HistoryStore::Local(path) => {
                let path = path.clone();
                tokio::task::spawn_blocking(move || local::load_history(&path).map(|log| log.records))
                    .await
                    .map_err(|e| HistoryError::Task(e.to_string()))?
            }
            HistoryStore::Remote(remote) => remote.load().await,
            HistoryStore::Disabled => Err(HistoryError::Disabled),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{Diagnosis, ScoreResult};

    fn result() -> ScoreResult {
        ScoreResult {
            effectiveness: 55.5,
            immunity: 48.0,
            cohesion: 60.0,
            diagnosis: Diagnosis::Balanced,
            actions: vec![],
        }
    }

    #[tokio::test]
    async fn test_local_store_append_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::Local(dir.path().join("history.json"));

        store.append(HistoryRecord::now("amina", &result())).await.unwrap();
        store.append(HistoryRecord::now("yusuf", &result())).await.unwrap();

        let records = store.load().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].display_name, "yusuf");
    }

    #[tokio::test]
    async fn test_disabled_store_refuses() {
        let store = HistoryStore::Disabled;
        assert!(matches!(
            store.append(HistoryRecord::now("amina", &result())).await,
            Err(HistoryError::Disabled)
        ));
        assert!(matches!(store.load().await, Err(HistoryError::Disabled)));
    }

    #[test]
    fn test_from_config_local() {
        let config = HistoryConfig {
            path: Some(PathBuf::from("/tmp/radar/history.json")),
            ..HistoryConfig::default()
        };
        let store = HistoryStore::from_config(&config).unwrap();
        assert_eq!(store.describe(), "/tmp/radar/history.json");
    }

    #[test]
    fn test_from_config_remote_requires_endpoint() {
        let config = HistoryConfig {
            backend: HistoryBackend::Remote,
            ..HistoryConfig::default()
        };
        assert!(HistoryStore::from_config(&config).is_err());
    }
}
