//! Cumulative running totals.

use crate::models::{Bucket, Entity};

/// Turn per-bucket values into running totals, in place.
///
/// Buckets must already be in ascending date order. Every entity ends up
/// with an explicit value in every bucket after the first; absent values
/// count as 0.
pub fn accumulate(buckets: &mut [Bucket], entities: &[Entity]) {
    for entity in entities {
        for i in 1..buckets.len() {
            let total = buckets[i].value(entity) + buckets[i - 1].value(entity);
            buckets[i].values.insert(entity.clone(), total);
        }
    }
}
