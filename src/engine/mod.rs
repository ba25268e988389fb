//! Ranking and interpolation engine.
//!
//! Pure, synchronous transforms from date buckets to ranked animation
//! frames, plus the per-entity history the animator keeps between steps.

pub mod aggregator;
pub mod history;
pub mod interpolator;
pub mod ranker;

pub use aggregator::accumulate;
pub use history::HistoryTracker;
pub use interpolator::interpolate_frames;
