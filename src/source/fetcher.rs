//! Data sources for the initial, one-shot record load.
//!
//! The animator only sees the [`DataSource`] trait. Two implementations
//! are provided: an HTTP endpoint (reqwest) and a local JSON file.

use crate::error::{RaceError, RaceResult};
use crate::models::Record;
use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

/// Default endpoint: daily tonnage aggregated by date and destination country.
pub const DEFAULT_DATA_URL: &str =
    "https://api.russiafossiltracker.com/v0/counter?aggregate_by=date,destination_country";

/// One-shot provider of raw records.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Human-readable origin (URL or path), used in logs and reports.
    fn describe(&self) -> String;

    /// Load every record. Called exactly once per run.
    async fn fetch_records(&self) -> RaceResult<Vec<Record>>;
}

/// Accepted payload shapes: a bare array or `{"data": [...]}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum Payload {
    Wrapped { data: Vec<Record> },
    Bare(Vec<Record>),
}

/// Decode a JSON body into records.
pub fn decode_records(body: &str) -> RaceResult<Vec<Record>> {
    let payload: Payload = serde_json::from_str(body)
        .map_err(|e| RaceError::data_source(format!("invalid records payload: {}", e)))?;

    Ok(match payload {
        Payload::Wrapped { data } => data,
        Payload::Bare(records) => records,
    })
}

/// Fetches records with a single HTTP GET.
pub struct HttpSource {
    url: String,
    client: reqwest::Client,
    show_progress: bool,
}

impl HttpSource {
    pub fn new(
        url: impl Into<String>,
        timeout_seconds: u64,
        show_progress: bool,
    ) -> RaceResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| RaceError::data_source(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            url: url.into(),
            client,
            show_progress,
        })
    }

    fn spinner(&self) -> Option<ProgressBar> {
        if !self.show_progress {
            return None;
        }

        let pb = ProgressBar::new_spinner();
        if let Ok(style) =
            ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed}] {msg}")
        {
            pb.set_style(style);
        }
        pb.set_message(format!("Fetching {}", self.url));
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    }

    async fn request(&self) -> RaceResult<Vec<Record>> {
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RaceError::data_source(format!(
                "HTTP {} from {}: {}",
                status, self.url, body
            )));
        }

        let body = response.text().await?;
        debug!("Received {} bytes", body.len());
        decode_records(&body)
    }
}

#[async_trait]
impl DataSource for HttpSource {
    fn describe(&self) -> String {
        self.url.clone()
    }

    async fn fetch_records(&self) -> RaceResult<Vec<Record>> {
        info!("Fetching records from {}", self.url);
        let spinner = self.spinner();

        let result = self.request().await;

        if let Some(pb) = spinner {
            match &result {
                Ok(records) => {
                    pb.finish_with_message(format!("Fetched {} records", records.len()))
                }
                Err(_) => pb.abandon_with_message("Fetch failed"),
            }
        }

        let records = result?;
        info!("Fetched {} records", records.len());
        Ok(records)
    }
}

/// Reads records from a local JSON file.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl DataSource for FileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn fetch_records(&self) -> RaceResult<Vec<Record>> {
        info!("Reading records from {}", self.path.display());

        let body = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            RaceError::data_source(format!("failed to read {}: {}", self.path.display(), e))
        })?;

        let records = decode_records(&body)?;
        info!("Loaded {} records", records.len());
        Ok(records)
    }
}
