//! Destination submission results.

pub mod response;

pub use response::ImportResponse;
