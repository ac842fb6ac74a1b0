//! File models.

use serde::{Deserialize, Serialize};

/// A file attached to the data record at the same index of a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct File {
    /// Meta information about the file.
    pub file_meta: FileMeta,
}

/// Meta information about an attached file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMeta {
    /// The name of the file.
    pub filename: String,
}

impl File {
    /// Create a file entry from its name.
    pub fn named(filename: impl Into<String>) -> Self {
        Self {
            file_meta: FileMeta {
                filename: filename.into(),
            },
        }
    }

    /// The file name.
    pub fn filename(&self) -> &str {
        &self.file_meta.filename
    }
}
