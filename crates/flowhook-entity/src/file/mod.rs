//! File attachment metadata for file-backed exports.

pub mod model;

pub use model::{File, FileMeta};
