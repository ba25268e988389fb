//! Loading raw records and turning them into date buckets.

pub mod buckets;
pub mod fetcher;

pub use buckets::{bucketize, Dataset};
pub use fetcher::{DataSource, FileSource, HttpSource, DEFAULT_DATA_URL};
