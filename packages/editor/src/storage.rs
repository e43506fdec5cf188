//! # Key-Value Storage
//!
//! Client-local persistence for editor data such as presets. Values are
//! JSON blobs addressed by string keys, scoped to one editing user.

use crate::EditorError;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<Value>, EditorError>;

    fn set(&mut self, key: &str, value: &Value) -> Result<(), EditorError>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryKv {
    entries: HashMap<String, Value>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKv {
    fn get(&self, key: &str) -> Result<Option<Value>, EditorError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &Value) -> Result<(), EditorError> {
        self.entries.insert(key.to_string(), value.clone());
        Ok(())
    }
}

/// One `<key>.json` file per key inside a directory
#[derive(Debug, Clone)]
pub struct FileKv {
    dir: PathBuf,
}

impl FileKv {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.json", file))
    }
}

impl KeyValueStore for FileKv {
    fn get(&self, key: &str) -> Result<Option<Value>, EditorError> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        match serde_json::from_str(&content) {
            Ok(value) => Ok(Some(value)),
            Err(err) => {
                warn!(path = %path.display(), "ignoring unreadable value: {}", err);
                Ok(None)
            }
        }
    }

    fn set(&mut self, key: &str, value: &Value) -> Result<(), EditorError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        fs::write(&path, serde_json::to_string_pretty(value)?)?;
        debug!(path = %path.display(), "stored {}", key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_memory_kv() {
        let mut kv = MemoryKv::new();
        assert!(kv.get("a").unwrap().is_none());

        kv.set("a", &json!([1, 2])).unwrap();
        assert_eq!(kv.get("a").unwrap(), Some(json!([1, 2])));
    }

    #[test]
    fn test_file_kv_creates_directory() {
        let dir = TempDir::new().unwrap();
        let mut kv = FileKv::new(dir.path().join("presets"));

        kv.set("visual-builder/v1", &json!({ "x": 1 })).unwrap();
        assert!(dir.path().join("presets").join("visual-builder_v1.json").exists());
        assert_eq!(kv.get("visual-builder/v1").unwrap(), Some(json!({ "x": 1 })));
        assert!(kv.get("missing").unwrap().is_none());
    }

    #[test]
    fn test_file_kv_corrupt_value_reads_as_missing() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("broken.json"), "{ not json").unwrap();

        let kv = FileKv::new(dir.path());
        assert!(kv.get("broken").unwrap().is_none());
    }
}
