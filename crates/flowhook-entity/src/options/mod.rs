//! The options envelope shared by every import/export hook.

pub mod delta;
pub mod model;
pub mod settings;

pub use delta::{DeltaMembers, DeltaWindow};
pub use model::{ExportOptions, ImportOptions, Options};
pub use settings::Settings;
