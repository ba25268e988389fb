//! Data models for the bar chart race.
//!
//! This module contains the core data structures shared by the data
//! source, the ranking engine, the animator and the report writer.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A ranked participant, e.g. a destination country.
pub type Entity = String;

/// One raw record as delivered by the data source.
///
/// Only the three fields below are read; anything else in the payload is ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    /// ISO-8601 date or date-time string.
    pub date: String,
    /// Entity the value belongs to.
    pub destination_country: String,
    /// Value for this (date, entity) pair. `null` counts as 0.
    #[serde(default)]
    pub value_tonne: Option<f64>,
}

/// One time sample mapping entities to values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    /// Date of the sample (sub-frames carry their interval's start date).
    pub date: NaiveDateTime,
    /// Values by entity. Absent entities read as 0.
    pub values: HashMap<Entity, f64>,
}

impl Bucket {
    /// Creates an empty bucket for the given date.
    pub fn new(date: NaiveDateTime) -> Self {
        Self {
            date,
            values: HashMap::new(),
        }
    }

    /// Returns the value for an entity, defaulting to 0.
    pub fn value(&self, entity: &str) -> f64 {
        self.values.get(entity).copied().unwrap_or(0.0)
    }
}

/// An entity's position in one ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedEntry {
    pub entity: Entity,
    pub value: f64,
    /// 0-based rank; everything at or beyond capacity shares `rank == capacity`.
    pub rank: usize,
}

/// Per-entity transition state for one animation step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub prev: RankedEntry,
    pub current: RankedEntry,
    pub next: RankedEntry,
}

/// Outcome of a completed animation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Number of real (date) buckets loaded.
    pub buckets: usize,
    /// Number of interpolated frames animated.
    pub frames: usize,
    /// Entity set in first-appearance order.
    pub entities: Vec<Entity>,
    /// Ranking of the last animated frame (empty when nothing was animated).
    pub final_ranking: Vec<RankedEntry>,
}

/// What a recording sink captured for one step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordedFrame {
    pub step: usize,
    pub date: NaiveDateTime,
    /// Upper bound of the value axis for this step.
    pub domain_max: f64,
    /// Visible (top-K) entries of the current ranking.
    pub visible: Vec<RankedEntry>,
}

/// Metadata about a report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Where the data came from (URL or file path).
    pub source: String,
    pub generated_at: DateTime<Utc>,
    pub capacity: usize,
    pub frames_per_interval: usize,
    pub buckets: usize,
    pub frames: usize,
    pub entities: usize,
    pub duration_seconds: f64,
}

/// Report of a finished run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    pub final_standings: Vec<RankedEntry>,
    pub frames: Vec<RecordedFrame>,
}
