//! On-disk format of the tracking store.
//!
//! A single JSON document, rewritten in full at the end of each run:
//!
//! ```json
//! {
//!   "version": "1.0",
//!   "organization": "acme",
//!   "artifact_id": "shop",
//!   "models": {
//!     "Pet": {
//!       "file_path": "/work/shop/src/main/java/com/acme/shop/model/dto/Pet.java",
//!       "package": "com.acme.shop.model.dto",
//!       "custom_dir": "dto",
//!       "java_class_name": "Pet"
//!     }
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{LocationEntry, TrackingError};

/// Format version written into every store.
pub const STORE_VERSION: &str = "1.0";

/// The persisted document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingFile {
    pub version: String,
    pub organization: String,
    pub artifact_id: String,
    /// Keyed by type name; a `BTreeMap` keeps the file diff-stable.
    #[serde(default)]
    pub models: BTreeMap<String, LocationEntry>,
}

/// What was found at the store path.
#[derive(Debug)]
pub enum StoreRead {
    /// No file, or an empty one.
    Missing,
    /// A well-formed document.
    Loaded(TrackingFile),
    /// A file that is not a valid store. Carries the reason.
    Corrupt(String),
}

/// Read the store at `path`.
///
/// # Errors
/// Returns [`TrackingError::Read`] for I/O failures other than a missing
/// file. Malformed content is not an error; it is reported as
/// [`StoreRead::Corrupt`].
pub fn read(path: &Path) -> Result<StoreRead, TrackingError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(StoreRead::Missing),
        Err(e) if e.kind() == ErrorKind::InvalidData => {
            return Ok(StoreRead::Corrupt(format!("not UTF-8: {e}")));
        }
        Err(source) => {
            return Err(TrackingError::Read {
                path: path.to_owned(),
                source,
            });
        }
    };

    if contents.trim().is_empty() {
        return Ok(StoreRead::Missing);
    }
    Ok(serde_json::from_str(&contents).map_or_else(
        |e| StoreRead::Corrupt(e.to_string()),
        StoreRead::Loaded,
    ))
}

/// Write `file` to `path` atomically (temp file, fsync, rename), creating the
/// parent directory if needed.
///
/// # Errors
/// Returns [`TrackingError::Write`] if any step fails, or
/// [`TrackingError::Serialize`] if the document cannot be encoded.
pub fn write_atomic(path: &Path, file: &TrackingFile) -> Result<(), TrackingError> {
    let mut json = serde_json::to_string_pretty(file).map_err(TrackingError::Serialize)?;
    json.push('\n');

    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_owned(),
        _ => PathBuf::from("."),
    };
    let write_err = |target: &Path, source: std::io::Error| TrackingError::Write {
        path: target.to_owned(),
        source,
    };

    fs::create_dir_all(&dir).map_err(|e| write_err(&dir, e))?;

    let file_name = path
        .file_name()
        .map_or_else(|| "tracking".into(), |n| n.to_string_lossy().into_owned());
    let tmp_path = dir.join(format!(".{file_name}.tmp"));

    let mut tmp = fs::File::create(&tmp_path).map_err(|e| write_err(&tmp_path, e))?;
    tmp.write_all(json.as_bytes()).map_err(|e| write_err(&tmp_path, e))?;
    tmp.sync_all().map_err(|e| write_err(&tmp_path, e))?;
    drop(tmp);

    fs::rename(&tmp_path, path).map_err(|e| write_err(path, e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TrackingFile {
        let mut models = BTreeMap::new();
        models.insert(
            "Pet".to_owned(),
            LocationEntry {
                file_path: PathBuf::from("/out/src/main/java/com/acme/shop/model/dto/Pet.java"),
                package: "com.acme.shop.model.dto".to_owned(),
                custom_dir: Some("dto".to_owned()),
                java_class_name: "Pet".to_owned(),
            },
        );
        models.insert(
            "Order".to_owned(),
            LocationEntry {
                file_path: PathBuf::from("/out/src/main/java/com/acme/shop/model/Order.java"),
                package: "com.acme.shop.model".to_owned(),
                custom_dir: None,
                java_class_name: "Order".to_owned(),
            },
        );
        TrackingFile {
            version: STORE_VERSION.to_owned(),
            organization: "acme".to_owned(),
            artifact_id: "shop".to_owned(),
            models,
        }
    }

    #[test]
    fn write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("tracking.json");
        write_atomic(&path, &sample()).unwrap();

        match read(&path).unwrap() {
            StoreRead::Loaded(file) => assert_eq!(file, sample()),
            other => panic!("expected loaded store, got {other:?}"),
        }
        assert!(!dir.path().join("nested").join(".tracking.json.tmp").exists());
    }

    #[test]
    fn absent_custom_dir_is_omitted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tracking.json");
        write_atomic(&path, &sample()).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text.matches("custom_dir").count(), 1);
        // Models are sorted by name.
        assert!(text.find("\"Order\"").unwrap() < text.find("\"Pet\"").unwrap());
    }

    #[test]
    fn missing_and_empty_files_read_as_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tracking.json");
        assert!(matches!(read(&path).unwrap(), StoreRead::Missing));
        fs::write(&path, "  \n").unwrap();
        assert!(matches!(read(&path).unwrap(), StoreRead::Missing));
    }

    #[test]
    fn malformed_file_reads_as_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tracking.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(read(&path).unwrap(), StoreRead::Corrupt(_)));
        fs::write(&path, "{\"models\": {}}").unwrap();
        assert!(matches!(read(&path).unwrap(), StoreRead::Corrupt(_)));
    }
}
