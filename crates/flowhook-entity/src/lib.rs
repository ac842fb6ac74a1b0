//! # flowhook-entity
//!
//! Value objects the host constructs immediately before invoking a hook:
//! error records, jobs and their ancestry table, the options envelope,
//! destination import responses and file metadata. None of them outlive a
//! single hook invocation. All entities derive `Debug`, `Clone`,
//! `Serialize` and `Deserialize` with the camelCase field names user
//! scripts see.

pub mod error;
pub mod file;
pub mod import;
pub mod job;
pub mod options;

pub use error::{ErrorRecord, ImportError};
pub use file::{File, FileMeta};
pub use import::ImportResponse;
pub use job::{Job, JobTable};
pub use options::{DeltaMembers, DeltaWindow, ExportOptions, ImportOptions, Options, Settings};
