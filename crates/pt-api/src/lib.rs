//! HTTP client for the product tracker record service.
//!
//! The record service owns persistence: it stores completed records, keeps
//! the CSV file they are exported to, and computes daily statistics. This
//! crate only speaks its REST interface:
//!
//! | method | path                | purpose                          |
//! |--------|---------------------|----------------------------------|
//! | POST   | `/records`          | store a completed record         |
//! | GET    | `/records/count`    | total number of records          |
//! | GET    | `/records/stats`    | daily statistics                 |
//! | POST   | `/records/recreate` | rewrite the underlying CSV file  |
//! | GET    | `/records/export`   | download the CSV file            |

use std::fmt;
use std::time::Duration;

use chrono::NaiveDate;
use pt_core::CompletedRecord;
use reqwest::StatusCode;
use reqwest::header::CONTENT_DISPOSITION;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// File name used for exports when the server does not provide one.
pub const DEFAULT_EXPORT_FILENAME: &str = "records.csv";

/// Record service client errors.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The configured base URL could not be parsed.
    #[error("invalid base URL {url}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    /// Failed to build HTTP client.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    /// HTTP request failed.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The service answered with a non-success status.
    #[error("record service returned {status}: {body}")]
    Status { status: StatusCode, body: String },
    /// Failed to parse response.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Daily statistics computed by the record service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyStats {
    pub total_products: u64,
    pub average_duration: f64,
    pub optimal_time_count: u64,
    pub over_time_count: u64,
    pub today_date: NaiveDate,
}

/// A downloaded CSV export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    pub filename: String,
    pub content: Vec<u8>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CountResponse {
    total_count: u64,
}

/// Record service client.
///
/// Cloning is cheap; clones share the underlying connection pool, which lets
/// callers move a clone into a spawned task per submission.
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Creates a client with an explicit per-request timeout.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let base_url = base_url.into();
        reqwest::Url::parse(&base_url).map_err(|err| ApiError::InvalidBaseUrl {
            url: base_url.clone(),
            reason: err.to_string(),
        })?;

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ApiError::ClientBuild)?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Stores a completed record.
    pub async fn submit_record(&self, record: &CompletedRecord) -> Result<(), ApiError> {
        tracing::debug!(barcode = %record.barcode, "submitting record");
        let response = self
            .http
            .post(self.endpoint("/records"))
            .json(record)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    /// Returns the total number of stored records.
    pub async fn count(&self) -> Result<u64, ApiError> {
        let response = self.http.get(self.endpoint("/records/count")).send().await?;
        let body = check_status(response).await?.text().await?;
        let payload: CountResponse = parse_json(&body)?;
        Ok(payload.total_count)
    }

    /// Returns today's statistics.
    pub async fn stats(&self) -> Result<DailyStats, ApiError> {
        let response = self.http.get(self.endpoint("/records/stats")).send().await?;
        let body = check_status(response).await?.text().await?;
        parse_json(&body)
    }

    /// Asks the service to rewrite its record storage.
    pub async fn recreate(&self) -> Result<(), ApiError> {
        let response = self
            .http
            .post(self.endpoint("/records/recreate"))
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    /// Downloads the CSV export.
    ///
    /// Returns `None` when the service has nothing to export yet (204).
    pub async fn export(&self) -> Result<Option<CsvExport>, ApiError> {
        let response = self.http.get(self.endpoint("/records/export")).send().await?;
        let response = check_status(response).await?;
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let filename = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .and_then(filename_from_disposition)
            .unwrap_or_else(|| DEFAULT_EXPORT_FILENAME.to_string());
        let content = response.bytes().await?.to_vec();

        Ok(Some(CsvExport { filename, content }))
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::Status { status, body })
}

fn parse_json<T: serde::de::DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|err| ApiError::InvalidResponse(err.to_string()))
}

/// Extracts the file name from an `attachment; filename=...` header value.
///
/// Path components are stripped so a hostile header cannot point outside the
/// download directory.
fn filename_from_disposition(value: &str) -> Option<String> {
    let raw = value
        .split(';')
        .map(str::trim)
        .find_map(|part| part.strip_prefix("filename="))?;
    let unquoted = raw.trim_matches('"');
    let name = unquoted.rsplit(['/', '\\']).next()?.trim();
    if name.is_empty() || name == "." || name == ".." {
        return None;
    }
    Some(name.to_string())
}
