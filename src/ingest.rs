//! History file loading and run-id detection

use crate::record::RawJobRecord;
use regex::Regex;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, IngestError>;

/// Load an HTCondor history dump: a JSON array of flat job objects.
pub fn load_history(path: &Path) -> Result<Vec<RawJobRecord>> {
    let text = std::fs::read_to_string(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let records: Vec<RawJobRecord> =
        serde_json::from_str(&text).map_err(|source| IngestError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    tracing::debug!(count = records.len(), ?path, "loaded history records");
    Ok(records)
}

/// Extract the run id from a history filename, e.g.
/// `condor_history_944143.json` -> `944143`.
pub fn extract_run_id(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    // First run of digits in the stem.
    let re = Regex::new(r"(\d+)").ok()?;
    re.captures(stem).map(|c| c[1].to_string())
}

/// Default artifact directory for a history file: `analysis_<run id>`, or
/// `analysis_output` when no id can be detected.
pub fn default_output_dir(history: &Path) -> PathBuf {
    match extract_run_id(history) {
        Some(id) => PathBuf::from(format!("analysis_{}", id)),
        None => PathBuf::from("analysis_output"),
    }
}
