//! Run-identifying snapshot id persisted to a sentinel file.

use std::fmt;
use std::fs;
use std::path::Path;

use tracing::info;
use uuid::Uuid;

use crate::error::{Error, Result};

/// Identifier tagging every crawl performed against one sentinel file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotId(String);

impl SnapshotId {
    /// Returns the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Snapshot id plus whether this call created it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// The persisted identifier.
    pub id: SnapshotId,
    /// True when the sentinel file did not exist before this run.
    pub created: bool,
}

/// Reads the snapshot id at `path`, creating it on first use.
///
/// An existing file is never rewritten; an existing but blank file is an error.
pub fn load_or_create(path: &Path) -> Result<Snapshot> {
    if path.is_file() {
        let raw = fs::read_to_string(path)?;
        let id = raw.trim();
        if id.is_empty() {
            return Err(Error::Snapshot(format!(
                "{} exists but holds no identifier",
                path.display()
            )));
        }
        info!(snapshot = id, "using existing snapshot id");
        return Ok(Snapshot {
            id: SnapshotId(id.to_string()),
            created: false,
        });
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let id = Uuid::new_v4().to_string();
    fs::write(path, &id)?;
    info!(snapshot = %id, "created snapshot id");
    Ok(Snapshot {
        id: SnapshotId(id),
        created: true,
    })
}
