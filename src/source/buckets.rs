//! Grouping raw records into date buckets.

use crate::error::{RaceError, RaceResult};
use crate::models::{Bucket, Entity, Record};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// Records grouped by date, plus the entity set in first-appearance order.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub entities: Vec<Entity>,
    /// Buckets in ascending date order.
    pub buckets: Vec<Bucket>,
}

/// Parse an ISO-8601 date or date-time.
///
/// Offsets are dropped so the calendar date stays the one written in the data.
pub fn parse_date(raw: &str) -> RaceResult<NaiveDateTime> {
    let trimmed = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.naive_local());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(dt);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN));
    }

    Err(RaceError::data_format(format!("unparseable date '{}'", raw)))
}

/// Group records by (date, entity) into ascending date buckets.
///
/// The first record for a (date, entity) key wins; a null value counts as 0.
/// Any unparseable date fails the whole dataset.
pub fn bucketize(records: &[Record]) -> RaceResult<Dataset> {
    let mut entities = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut by_date: BTreeMap<NaiveDateTime, Bucket> = BTreeMap::new();

    for record in records {
        let date = parse_date(&record.date)?;
        let entity = record.destination_country.as_str();

        if seen.insert(entity) {
            entities.push(entity.to_string());
        }

        let bucket = by_date.entry(date).or_insert_with(|| Bucket::new(date));
        if bucket.values.contains_key(entity) {
            debug!("Ignoring duplicate record for {} on {}", entity, record.date);
            continue;
        }
        bucket
            .values
            .insert(entity.to_string(), record.value_tonne.unwrap_or(0.0));
    }

    Ok(Dataset {
        entities,
        buckets: by_date.into_values().collect(),
    })
}
