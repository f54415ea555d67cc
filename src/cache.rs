//! JSON snapshot persistence for the [`Database`].
//!
//! A snapshot doubles as the acquisition cache: callers check for one with
//! [`load_cached`] before contacting the service at all. Writes go through
//! a sibling temp file and a rename, so a failed save never leaves a
//! partially written snapshot behind.

use std::path::Path;
use tokio::fs;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::model::Database;

/// Load a persisted database, or `None` when no snapshot exists at `path`.
pub async fn load_cached(path: &Path) -> Result<Option<Database>> {
    if !path.exists() {
        debug!(path = %path.display(), "no database snapshot");
        return Ok(None);
    }

    let content = fs::read_to_string(path)
        .await
        .map_err(|source| Error::Persistence { path: path.to_path_buf(), source })?;
    let db: Database = serde_json::from_str(&content)
        .map_err(|source| Error::Snapshot { path: path.to_path_buf(), source })?;

    info!(
        path = %path.display(),
        systems = db.systems.len(),
        agencies = db.agencies.len(),
        "loaded database snapshot"
    );
    Ok(Some(db))
}

/// Persist the database as pretty-printed JSON, atomically.
pub async fn save(db: &Database, path: &Path) -> Result<()> {
    let content = serde_json::to_string_pretty(db)
        .map_err(|source| Error::Snapshot { path: path.to_path_buf(), source })?;

    let tmp = match path.file_name() {
        Some(name) => {
            let mut tmp_name = name.to_os_string();
            tmp_name.push(".tmp");
            path.with_file_name(tmp_name)
        }
        None => {
            return Err(Error::Persistence {
                path: path.to_path_buf(),
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "snapshot path has no file name",
                ),
            });
        }
    };

    fs::write(&tmp, content)
        .await
        .map_err(|source| Error::Persistence { path: tmp.clone(), source })?;
    fs::rename(&tmp, path)
        .await
        .map_err(|source| Error::Persistence { path: path.to_path_buf(), source })?;

    debug!(
        path = %path.display(),
        systems = db.systems.len(),
        agencies = db.agencies.len(),
        "saved database snapshot"
    );
    Ok(())
}
