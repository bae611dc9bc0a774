//! Interpretation dataset loading.
//!
//! The dataset is an opaque JSON blob merged verbatim into responses —
//! house writeups, yoga descriptions, whatever the deployment ships.
//! The core never interprets it, and a missing or unparsable file
//! degrades to an empty object rather than failing the request.

use std::path::Path;

use serde_json::Value;

use crate::KundliError;

/// Environment variable naming the dataset file.
pub const DATASET_PATH_VAR: &str = "KUNDLI_DATASET_PATH";

/// Fallback path relative to the working directory.
pub const DEFAULT_DATASET_PATH: &str = "data/kundli_dataset.json";

/// Strict load, surfacing IO and parse problems.
pub fn try_load(path: &Path) -> Result<Value, KundliError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| KundliError::Dataset(format!("{}: {e}", path.display())))?;
    serde_json::from_str(&raw)
        .map_err(|e| KundliError::Dataset(format!("{}: {e}", path.display())))
}

/// Load with degradation: any failure logs a warning and yields `{}`.
pub fn load(path: &Path) -> Value {
    match try_load(path) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("dataset degraded to empty: {e}");
            Value::Object(serde_json::Map::new())
        }
    }
}

/// Load from `KUNDLI_DATASET_PATH`, falling back to the default path.
pub fn load_from_env() -> Value {
    let path = std::env::var(DATASET_PATH_VAR).unwrap_or_else(|_| DEFAULT_DATASET_PATH.to_string());
    load(Path::new(&path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_valid_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"houses": {{"1": {{"about": "self"}}}}}}"#).unwrap();
        let value = load(file.path());
        assert_eq!(value["houses"]["1"]["about"], "self");
    }

    #[test]
    fn missing_file_degrades_to_empty_object() {
        let value = load(Path::new("/nonexistent/kundli_dataset.json"));
        assert_eq!(value, Value::Object(serde_json::Map::new()));
    }

    #[test]
    fn malformed_json_degrades_to_empty_object() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json at all").unwrap();
        let value = load(file.path());
        assert!(value.as_object().unwrap().is_empty());
    }

    #[test]
    fn try_load_reports_the_failure() {
        let err = try_load(Path::new("/nonexistent/kundli_dataset.json")).unwrap_err();
        assert!(matches!(err, KundliError::Dataset(_)));
    }
}
