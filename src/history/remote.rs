use serde::Deserialize;
use std::time::Duration;
use tokio_retry::{strategy::ExponentialBackoff, RetryIf};

use super::error::HistoryError;
use super::types::HistoryRecord;

/// Client for a tabular web endpoint (for example a spreadsheet web app).
///
/// `POST` appends one row as `{"values": [...]}`; `GET` returns every row as
/// `{"values": [[...], ...]}`.
#[derive(Debug, Clone)]
pub struct RemoteStore {
    client: reqwest::Client,
    endpoint: String,
    token: Option<String>,
    max_retries: usize,
}

#[derive(Debug, Deserialize)]
struct RowsResponse {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

impl RemoteStore {
    pub fn new(
        endpoint: impl Into<String>,
        timeout: Duration,
        token: Option<String>,
        max_retries: usize,
    ) -> Result<Self, HistoryError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("sunan-radar/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| HistoryError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            token,
            max_retries,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Exponential backoff: 100ms, 200ms, 400ms ... capped at 5s
    fn retry_strategy(&self) -> impl Iterator<Item = Duration> {
        ExponentialBackoff::from_millis(2)
            .factor(50)
            .max_delay(Duration::from_secs(5))
            .take(self.max_retries)
    }

    fn request(&self, method: reqwest::Method) -> reqwest::RequestBuilder {
        let builder = self.client.request(method, &self.endpoint);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Append one row. Retried on transient failures, so a row that landed
    /// before a timeout can be written twice.
    pub async fn append(&self, record: &HistoryRecord) -> Result<(), HistoryError> {
        let body = serde_json::json!({ "values": record.to_row() });
        let body = &body;

        RetryIf::spawn(
            self.retry_strategy(),
            || async {
                let response = self
                    .request(reqwest::Method::POST)
                    .json(body)
                    .send()
                    .await?;
                response.error_for_status()?;
                Ok::<(), HistoryError>(())
            },
            |e: &HistoryError| {
                let retry = e.is_retryable();
                if retry {
                    tracing::warn!("append to {} failed, retrying: {}", self.endpoint, e);
                }
                retry
            },
        )
        .await?;

        tracing::debug!("appended row for {} to {}", record.display_name, self.endpoint);
        Ok(())
    }

    /// Read every row. Rows that do not parse are skipped with a warning.
    pub async fn load(&self) -> Result<Vec<HistoryRecord>, HistoryError> {
        let rows: RowsResponse = RetryIf::spawn(
            self.retry_strategy(),
            || async {
                let response = self
                    .request(reqwest::Method::GET)
                    .send()
                    .await?
                    .error_for_status()?;
                Ok::<RowsResponse, HistoryError>(response.json().await?)
            },
            |e: &HistoryError| e.is_retryable(),
        )
        .await?;

        let mut records = Vec::with_capacity(rows.values.len());
        let mut skipped = 0usize;
        for (i, row) in rows.values.iter().enumerate() {
            if i == 0 && HistoryRecord::is_header_row(row) {
                continue;
            }
            match HistoryRecord::from_row(row) {
                Ok(record) => records.push(record),
                Err(e) => {
                    skipped += 1;
                    tracing::warn!("skipping history row {}: {}", i + 1, e);
                }
            }
        }

        tracing::debug!(
            "loaded {} rows from {} ({} skipped)",
            records.len(),
            self.endpoint,
            skipped
        );
        Ok(records)
    }
}
