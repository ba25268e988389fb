//! Ranking of one bucket.

use crate::models::{Bucket, Entity, RankedEntry};

/// Rank every entity of `entities` by its value in `bucket`, highest first.
///
/// The sort is stable, so equal values keep the order of `entities`.
/// Positions at or beyond `capacity` all get `rank == capacity`.
pub fn rank(bucket: &Bucket, entities: &[Entity], capacity: usize) -> Vec<RankedEntry> {
    let mut ranked: Vec<RankedEntry> = entities
        .iter()
        .map(|entity| RankedEntry {
            entity: entity.clone(),
            value: bucket.value(entity),
            rank: 0,
        })
        .collect();

    ranked.sort_by(|a, b| b.value.total_cmp(&a.value));

    for (index, entry) in ranked.iter_mut().enumerate() {
        entry.rank = index.min(capacity);
    }

    ranked
}
