//! Core type definitions used across the Flowhook workspace.

pub mod id;

pub use id::*;
