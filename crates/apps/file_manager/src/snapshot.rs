//! Cached directory listings accumulated across navigation.

use admin_host::{join_path, DirectoryRecord};
use serde_json::Value;
use view_binder::AdminError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Directory records from the latest listing response.
pub struct DirectorySnapshot {
    records: Vec<DirectoryRecord>,
}

impl DirectorySnapshot {
    /// Builds a snapshot from records.
    pub fn new(records: Vec<DirectoryRecord>) -> Self {
        Self { records }
    }

    /// Decodes the `JS.listdir` payload.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Parse`] when the payload is not a list of directory records.
    pub fn from_listing(listing: &Value) -> Result<Self, AdminError> {
        let records = serde_json::from_value(listing.clone())?;
        Ok(Self { records })
    }

    /// All records in arrival order.
    pub fn records(&self) -> &[DirectoryRecord] {
        &self.records
    }

    /// Record for `path`. Duplicates resolve to the last one received.
    pub fn record(&self, path: &str) -> Option<&DirectoryRecord> {
        self.records.iter().rev().find(|record| record.path == path)
    }

    /// Full paths of files whose directory starts with `prefix`, compared case-insensitively.
    pub fn files_under(&self, prefix: &str) -> Vec<String> {
        let prefix = prefix.to_lowercase();
        self.records
            .iter()
            .filter(|record| record.path.to_lowercase().starts_with(&prefix))
            .flat_map(|record| {
                record
                    .content
                    .iter()
                    .filter(|entry| !entry.is_dir)
                    .map(|entry| join_path(&record.path, &entry.name))
            })
            .collect()
    }
}
