use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::domain::whitelist::WhitelistResult;
use crate::ports::sink::{ResultSink, SinkError};

/// Writes the result as two-space indented JSON.
///
/// The JSON is staged in a uniquely named temporary file next to the target
/// and persisted over `path` only once it is complete. A failed write removes
/// the staged file and leaves `path` untouched.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn staging_dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }
}

impl ResultSink for JsonFileSink {
    fn write(&self, result: &WhitelistResult) -> Result<(), SinkError> {
        let json = serde_json::to_string_pretty(result)?;

        // Dropping the temp file on any error below deletes it.
        let mut staged = NamedTempFile::new_in(self.staging_dir())?;
        staged.write_all(json.as_bytes())?;
        staged.as_file().sync_all()?;
        staged.persist(&self.path).map_err(|e| e.error)?;

        debug!(path = %self.path.display(), "wrote whitelist result");
        Ok(())
    }
}

/// Read a previously written result file.
pub fn load_result(path: &Path) -> Result<WhitelistResult, SinkError> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::allocation::AllocationRecord;
    use crate::domain::merkle::DuplicatePolicy;
    use alloy_primitives::{Address, U256};

    fn sample() -> WhitelistResult {
        let records = [
            AllocationRecord::new(Address::repeat_byte(0xAA), U256::from(100u64)),
            AllocationRecord::new(Address::repeat_byte(0xBB), U256::from(200u64)),
        ];
        WhitelistResult::generate(&records, DuplicatePolicy::Reject).unwrap()
    }

    fn entries(dir: &Path) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect();
        paths.sort();
        paths
    }

    #[test]
    fn test_write_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("whitelist.json");
        let sink = JsonFileSink::new(&path);

        let result = sample();
        sink.write(&result).unwrap();

        assert_eq!(load_result(&path).unwrap(), result);
        assert_eq!(entries(dir.path()), vec![path]);
    }

    #[test]
    fn test_output_is_pretty_printed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("whitelist.json");
        JsonFileSink::new(&path).write(&sample()).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let first_key = "    \"0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa\": {";
        assert!(text.starts_with("{\n  \"merkleRoot\": \"0x"));
        assert!(text.contains("\n  \"addresses\": {\n"));
        assert!(text.contains(first_key));
        assert!(text.contains("\"proofs\": ["));
        assert!(text.contains("\"allocation\": \"100\""));
    }

    #[test]
    fn test_rewrite_replaces_previous_result() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("whitelist.json");
        fs::write(&path, "stale").unwrap();

        JsonFileSink::new(&path).write(&sample()).unwrap();
        assert_eq!(load_result(&path).unwrap(), sample());
    }

    #[test]
    fn test_unrelated_tmp_file_is_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("whitelist.json");
        let neighbour = dir.path().join("whitelist.json.tmp");
        fs::write(&neighbour, "keep me").unwrap();

        JsonFileSink::new(&path).write(&sample()).unwrap();
        assert_eq!(fs::read_to_string(&neighbour).unwrap(), "keep me");
    }

    #[test]
    fn test_write_to_missing_directory_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("whitelist.json");
        let sink = JsonFileSink::new(&path);

        assert!(matches!(sink.write(&sample()), Err(SinkError::Io(_))));
        assert!(!path.exists());
        assert!(entries(dir.path()).is_empty());
    }

    #[test]
    fn test_failed_persist_removes_staged_file() {
        let dir = tempfile::tempdir().unwrap();
        // A non-empty directory at the target path cannot be replaced by a file.
        let path = dir.path().join("whitelist.json");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("occupied"), "x").unwrap();

        let err = JsonFileSink::new(&path).write(&sample()).unwrap_err();
        assert!(matches!(err, SinkError::Io(_)));
        assert_eq!(entries(dir.path()), vec![path]);
    }

    #[test]
    fn test_bare_file_name_stages_in_current_dir() {
        let sink = JsonFileSink::new("whitelist.json");
        assert_eq!(sink.staging_dir(), Path::new("."));
    }

    #[test]
    fn test_load_rejects_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{\"merkleRoot\": 42}").unwrap();
        assert!(matches!(load_result(&path), Err(SinkError::Json(_))));
    }
}
