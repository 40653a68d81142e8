//! Built-in mergers.

pub mod json;

pub use json::{JsonMerger, MergeStrategy};
