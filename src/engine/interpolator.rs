//! Synthetic sub-frames between consecutive buckets.

use crate::models::{Bucket, Entity};
use std::collections::HashMap;

/// Expand cumulative buckets into `frames_per_interval` linear sub-frames
/// per consecutive pair.
///
/// Sub-frame `k` of interval `i` sits at `t = k / frames_per_interval`
/// between `buckets[i]` and `buckets[i + 1]` and is labeled with
/// `buckets[i].date`. The final bucket never gets a frame of its own, so
/// fewer than two buckets produce no frames.
pub fn interpolate_frames(
    buckets: &[Bucket],
    entities: &[Entity],
    frames_per_interval: usize,
) -> Vec<Bucket> {
    let mut frames = Vec::with_capacity(buckets.len().saturating_sub(1) * frames_per_interval);

    for pair in buckets.windows(2) {
        let (start, end) = (&pair[0], &pair[1]);

        for k in 0..frames_per_interval {
            let t = k as f64 / frames_per_interval as f64;
            let values: HashMap<Entity, f64> = entities
                .iter()
                .map(|entity| (entity.clone(), lerp(start.value(entity), end.value(entity), t)))
                .collect();

            frames.push(Bucket {
                date: start.date,
                values,
            });
        }
    }

    frames
}

/// Linear interpolation; `t == 0` returns `start` exactly.
fn lerp(start: f64, end: f64, t: f64) -> f64 {
    if t == 0.0 {
        return start;
    }
    start * (1.0 - t) + end * t
}
