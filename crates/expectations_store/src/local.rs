//! Local directory backend.

use crate::keys::{validate_key, validate_prefix};
use crate::{Result, StoreBackend, StoreError};
use async_trait::async_trait;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;
use tracing::debug;

const EXTENSION: &str = "json";

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Stores each document as a pretty-printed JSON file under a root directory.
///
/// The key `expectations/yellow_trips` maps to
/// `<root>/expectations/yellow_trips.json`. Writes go to a temporary file in
/// the same directory and are renamed into place, so readers never observe a
/// partially written document.
#[derive(Debug, Clone)]
pub struct LocalDirectoryBackend {
    root: PathBuf,
}

impl LocalDirectoryBackend {
    /// Creates a backend rooted at the directory. The directory is created on
    /// first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let segments = validate_key(key)?;
        let (last, parents) = segments
            .split_last()
            .ok_or_else(|| StoreError::InvalidKey(key.to_string()))?;
        let mut path = self.root.clone();
        for segment in parents {
            path.push(segment);
        }
        path.push(format!("{}.{}", last, EXTENSION));
        Ok(path)
    }

    fn not_found(key: &str) -> impl FnOnce(std::io::Error) -> StoreError + '_ {
        move |err| match err.kind() {
            ErrorKind::NotFound => StoreError::NotFound(key.to_string()),
            _ => StoreError::Io(err),
        }
    }
}

#[async_trait]
impl StoreBackend for LocalDirectoryBackend {
    async fn save(&self, key: &str, document: &Value) -> Result<()> {
        let path = self.path_for(key)?;
        let parent = path.parent().unwrap_or(self.root.as_path());
        fs::create_dir_all(parent).await?;

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| StoreError::InvalidKey(key.to_string()))?;
        let temp = parent.join(format!(
            ".{}.{}-{}.tmp",
            file_name,
            std::process::id(),
            TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));

        let bytes = serde_json::to_vec_pretty(document)?;
        fs::write(&temp, &bytes).await?;
        if let Err(err) = fs::rename(&temp, &path).await {
            let _ = fs::remove_file(&temp).await;
            return Err(err.into());
        }

        debug!("Saved '{}' to {}", key, path.display());
        Ok(())
    }

    async fn load(&self, key: &str) -> Result<Value> {
        let path = self.path_for(key)?;
        let bytes = fs::read(&path).await.map_err(Self::not_found(key))?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        fs::remove_file(&path).await.map_err(Self::not_found(key))?;
        debug!("Deleted '{}'", key);
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let prefix_segments = validate_prefix(prefix)?;
        let mut start = self.root.clone();
        for segment in &prefix_segments {
            start.push(segment);
        }

        let mut keys = Vec::new();
        let mut pending = vec![start];
        while let Some(dir) = pending.pop() {
            let mut entries = match fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(err) if err.kind() == ErrorKind::NotFound => continue,
                Err(err) => return Err(err.into()),
            };
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                if entry.file_type().await?.is_dir() {
                    pending.push(path);
                } else if let Some(key) = self.key_for(&path) {
                    keys.push(key);
                }
            }
        }

        keys.sort();
        Ok(keys)
    }

    fn describe(&self) -> String {
        format!("local directory {}", self.root.display())
    }
}

impl LocalDirectoryBackend {
    /// Maps a document file back to its key. Temporary and foreign files
    /// yield `None`.
    fn key_for(&self, path: &Path) -> Option<String> {
        if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
            return None;
        }
        let relative = path.strip_prefix(&self.root).ok()?.with_extension("");
        let segments: Vec<&str> = relative
            .components()
            .map(|c| c.as_os_str().to_str())
            .collect::<Option<_>>()?;
        if segments.iter().any(|s| s.starts_with('.')) {
            return None;
        }
        Some(segments.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[tokio::test]
    async fn test_save_writes_pretty_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let backend = LocalDirectoryBackend::new(dir.path());

        backend
            .save("expectations/yellow_trips", &json!({"name": "yellow_trips"}))
            .await
            .unwrap();

        let path = dir.path().join("expectations").join("yellow_trips.json");
        let content = std::fs::read_to_string(path).unwrap();
        assert_eq!(content, "{\n  \"name\": \"yellow_trips\"\n}");
    }

    #[tokio::test]
    async fn test_no_temp_files_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let backend = LocalDirectoryBackend::new(dir.path());
        for i in 0..3 {
            backend
                .save("expectations/trips", &json!({ "revision": i }))
                .await
                .unwrap();
        }

        let files: Vec<_> = std::fs::read_dir(dir.path().join("expectations"))
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(files, vec!["trips.json".to_string()]);
        assert_eq!(
            backend.load("expectations/trips").await.unwrap(),
            json!({"revision": 2})
        );
    }

    #[tokio::test]
    async fn test_list_ignores_foreign_files() {
        let dir = tempfile::tempdir().unwrap();
        let backend = LocalDirectoryBackend::new(dir.path());
        backend.save("expectations/a", &json!({})).await.unwrap();
        std::fs::write(dir.path().join("expectations").join("notes.txt"), "hi").unwrap();
        std::fs::write(dir.path().join("expectations").join(".b.json.1-1.tmp"), "{").unwrap();

        assert_eq!(backend.list("").await.unwrap(), vec!["expectations/a"]);
    }

    #[tokio::test]
    async fn test_missing_root_lists_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let backend = LocalDirectoryBackend::new(dir.path().join("not-created-yet"));
        assert!(backend.list("expectations").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_dotted_key_keeps_its_name() {
        let dir = tempfile::tempdir().unwrap();
        let backend = LocalDirectoryBackend::new(dir.path());
        backend.save("expectations/trips.v2", &json!({})).await.unwrap();
        assert!(dir.path().join("expectations").join("trips.v2.json").exists());
        assert_eq!(backend.list("").await.unwrap(), vec!["expectations/trips.v2"]);
    }

    #[tokio::test]
    async fn test_traversal_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let backend = LocalDirectoryBackend::new(dir.path());
        let err = backend.save("../escape", &json!({})).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidKey(_)));
    }
}
