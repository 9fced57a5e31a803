use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

use crate::error::{Error, Result};
use crate::models::{AnalysisSnapshot, ScanSnapshot};

/// Write a snapshot atomically: serialize into a temp file in the target
/// directory, then rename over the destination. A failed run never
/// clobbers the previous snapshot.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let parent = path.parent().filter(|p| !p.as_os_str().is_empty());
    if let Some(dir) = parent {
        std::fs::create_dir_all(dir)?;
    }

    let mut tmpfile = match parent {
        Some(dir) => NamedTempFile::new_in(dir),
        None => NamedTempFile::new_in("."),
    }
    .map_err(|e| Error::Io(format!("Failed to create temp file: {}", e)))?;

    let body = serde_json::to_string_pretty(value)?;
    tmpfile.write_all(body.as_bytes())?;

    tmpfile
        .persist(path)
        .map_err(|e| Error::Io(format!("Failed to persist {}: {}", path.display(), e)))?;

    Ok(())
}

fn load_json<T: DeserializeOwned>(path: &Path, hint: &str) -> Result<T> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::Config(format!("{} not found - {}", path.display(), hint))
        } else {
            Error::Io(format!("Failed to read {}: {}", path.display(), e))
        }
    })?;

    serde_json::from_str(&content)
        .map_err(|e| Error::Parse(format!("Corrupt snapshot {}: {}", path.display(), e)))
}

pub fn load_scan_snapshot(path: &Path) -> Result<ScanSnapshot> {
    load_json(path, "run `takane scan` first")
}

pub fn load_analysis_snapshot(path: &Path) -> Result<AnalysisSnapshot> {
    load_json(path, "run `takane analyze` first")
}
