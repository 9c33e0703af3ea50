//! Upstream event source. Hands captured messages to the pipeline as batches.

pub mod json_batch;

pub use json_batch::{load_batch, parse_batch};
