//! # File I/O Module
//!
//! JSON load/save helpers for snapshots, clash requests and reports.
//!
//! - **Atomic saves**: write to a `.tmp` sibling, sync, rename over the target
//! - **Version validation**: snapshot files must match the schema major version
//!
//! ## Example
//!
//! ```rust,no_run
//! use trestle_core::file_io::{load_snapshot, save_json};
//! use std::path::Path;
//!
//! let snapshot = load_snapshot(Path::new("rack.json"))?;
//! save_json(&snapshot, Path::new("rack-copy.json"))?;
//! # Ok::<(), trestle_core::errors::EngineError>(())
//! ```

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::errors::{EngineError, EngineResult};
use crate::snapshot::{ClashRequest, ModelSnapshot, Snapshot, SCHEMA_VERSION};

/// Serialize `value` as pretty JSON and write it atomically.
///
/// The JSON goes to `<path>.tmp` first and is renamed over `path` once it is
/// synced, so an interrupted save never leaves a truncated file behind.
pub fn save_json<T: Serialize>(value: &T, path: &Path) -> EngineResult<()> {
    let json = serde_json::to_string_pretty(value)?;
    let tmp_path = tmp_path_for(path);

    let tmp_error = |operation: &str, e: std::io::Error| {
        EngineError::file_error(operation, tmp_path.display().to_string(), e.to_string())
    };

    let mut tmp_file = File::create(&tmp_path).map_err(|e| tmp_error("create temp file", e))?;
    tmp_file
        .write_all(json.as_bytes())
        .map_err(|e| tmp_error("write temp file", e))?;
    tmp_file.sync_all().map_err(|e| tmp_error("sync temp file", e))?;
    drop(tmp_file);

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        EngineError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;

    debug!(path = %path.display(), bytes = json.len(), "saved json");
    Ok(())
}

/// Read and parse a JSON file.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> EngineResult<T> {
    let contents = fs::read_to_string(path)
        .map_err(|e| EngineError::file_error("read", path.display().to_string(), e.to_string()))?;
    serde_json::from_str(&contents).map_err(|e| EngineError::SerializationError {
        reason: format!("Invalid JSON in {}: {}", path.display(), e),
    })
}

/// Load a snapshot and check its schema version.
pub fn load_snapshot(path: &Path) -> EngineResult<Snapshot> {
    let snapshot: Snapshot = load_json(path)?;
    validate_version(&snapshot.version)?;
    Ok(snapshot)
}

/// Load a single model's elements.
///
/// Accepts either a bare model object or a snapshot holding exactly one model.
pub fn load_model(path: &Path) -> EngineResult<ModelSnapshot> {
    let value: serde_json::Value = load_json(path)?;
    if value.get("models").is_some() {
        let snapshot: Snapshot = serde_json::from_value(value)?;
        validate_version(&snapshot.version)?;
        let count = snapshot.models.len();
        let mut models = snapshot.models.into_iter();
        return match (models.next(), count) {
            (Some(model), 1) => Ok(model),
            _ => Err(EngineError::invalid_input(
                "models",
                count.to_string(),
                "Expected exactly one model in the snapshot",
            )),
        };
    }
    Ok(serde_json::from_value(value)?)
}

/// Load a clash request and check both snapshots' schema versions.
pub fn load_clash_request(path: &Path) -> EngineResult<ClashRequest> {
    let request: ClashRequest = load_json(path)?;
    validate_version(&request.project.version)?;
    validate_version(&request.process.version)?;
    Ok(request)
}

fn tmp_path_for(path: &Path) -> std::path::PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Check a file's schema version against [`SCHEMA_VERSION`].
///
/// Major versions must match. While the schema is 0.x, a file with a newer
/// minor version is rejected as well.
pub fn validate_version(file_version: &str) -> EngineResult<()> {
    let mismatch = || EngineError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: SCHEMA_VERSION.to_string(),
    };
    let parse = |v: &str| -> Option<Vec<u32>> { v.split('.').map(|p| p.parse().ok()).collect() };

    let file = parse(file_version).filter(|p| !p.is_empty()).ok_or_else(mismatch)?;
    let current = parse(SCHEMA_VERSION).ok_or_else(mismatch)?;

    if file[0] != current[0] {
        return Err(mismatch());
    }
    if current[0] == 0 && file.get(1).copied().unwrap_or(0) > current.get(1).copied().unwrap_or(0) {
        return Err(mismatch());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{Element, ElementKind};
    use crate::geometry::Point3;
    use crate::snapshot::Discipline;
    use tempfile::tempdir;

    fn rack() -> Snapshot {
        let beam = Element::new(
            "B1",
            ElementKind::Beam,
            Point3::new(0.0, 3.0, 0.0),
            Point3::new(6.0, 3.0, 0.0),
        );
        Snapshot::new()
            .with_model(ModelSnapshot::new("Rack", Discipline::Structural).with_element(beam))
    }

    #[test]
    fn test_save_and_load_snapshot() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rack.json");

        save_json(&rack(), &path).unwrap();
        let loaded = load_snapshot(&path).unwrap();
        assert_eq!(loaded, rack());
    }

    #[test]
    fn test_atomic_save_leaves_no_tmp_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rack.json");
        save_json(&rack(), &path).unwrap();

        assert!(path.exists());
        assert!(!dir.path().join("rack.json.tmp").exists());
    }

    #[test]
    fn test_load_model_from_either_shape() {
        let dir = tempdir().unwrap();
        let snapshot_path = dir.path().join("snapshot.json");
        let model_path = dir.path().join("model.json");
        save_json(&rack(), &snapshot_path).unwrap();
        save_json(&rack().models[0], &model_path).unwrap();

        assert_eq!(load_model(&snapshot_path).unwrap().name, "Rack");
        assert_eq!(load_model(&model_path).unwrap().element_count(), 1);

        let two = rack().with_model(ModelSnapshot::new("Other", Discipline::Piping));
        save_json(&two, &snapshot_path).unwrap();
        assert!(load_model(&snapshot_path).is_err());
    }

    #[test]
    fn test_newer_schema_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("future.json");
        fs::write(&path, r#"{ "version": "1.0.0", "models": [] }"#).unwrap();

        let err = load_snapshot(&path).unwrap_err();
        assert_eq!(err.error_code(), "VERSION_MISMATCH");
    }

    #[test]
    fn test_version_validation() {
        assert!(validate_version(SCHEMA_VERSION).is_ok());
        assert!(validate_version("0.1.7").is_ok());
        assert!(validate_version("0.0.9").is_ok());
        assert!(validate_version("0.2.0").is_err());
        assert!(validate_version("2.0.0").is_err());
        assert!(validate_version("draft").is_err());
    }

    #[test]
    fn test_missing_file_and_bad_json() {
        let dir = tempdir().unwrap();
        let missing = load_json::<Snapshot>(&dir.path().join("nope.json")).unwrap_err();
        assert_eq!(missing.error_code(), "FILE_ERROR");

        let path = dir.path().join("bad.json");
        fs::write(&path, "{ not json").unwrap();
        let bad = load_json::<Snapshot>(&path).unwrap_err();
        assert_eq!(bad.error_code(), "SERIALIZATION_ERROR");
    }

    #[test]
    fn test_load_clash_request() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("request.json");
        let request = ClashRequest::new(rack(), Snapshot::new());
        save_json(&request, &path).unwrap();
        assert_eq!(load_clash_request(&path).unwrap().element_count(), 1);
    }
}
