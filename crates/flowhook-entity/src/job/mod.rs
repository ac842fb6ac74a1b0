//! Running jobs and their ancestry.

pub mod model;
pub mod table;

pub use model::Job;
pub use table::JobTable;
