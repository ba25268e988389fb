//! Report generation for finished runs.

pub mod generator;

pub use generator::*;
