//! Document Store: the two flat directories behind a narrow key-value
//! interface.
//!
//! Keys are caller-supplied filenames, values are file bytes. There are
//! exactly three operations — list the request keys, resolve a request key
//! to a readable path, and write an analysis by key — so the storage layer
//! can later be swapped for a real store without touching the HTTP surface
//! or the prompt builder.
//!
//! Saved analyses have no metadata and no versioning: writing an existing
//! key overwrites it, last write wins.
//!
//! Filenames are validated before touching the filesystem. The reference
//! implementation joined caller input straight into a path; that behaviour
//! is undefined for names like `../secret` and is not reproduced here.

use crate::error::AuditError;
use std::path::{Path, PathBuf};
use tracing::info;

/// Flat-directory store for request documents and saved analyses.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    requests_dir: PathBuf,
    results_dir: PathBuf,
}

impl DocumentStore {
    pub fn new(requests_dir: impl Into<PathBuf>, results_dir: impl Into<PathBuf>) -> Self {
        Self {
            requests_dir: requests_dir.into(),
            results_dir: results_dir.into(),
        }
    }

    /// Create both directories if absent. Called once at startup so the
    /// service starts clean on an empty deployment.
    pub async fn ensure_dirs(&self) -> Result<(), AuditError> {
        for dir in [&self.requests_dir, &self.results_dir] {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| AuditError::Storage {
                    path: dir.clone(),
                    source: e,
                })?;
        }
        Ok(())
    }

    pub fn requests_dir(&self) -> &Path {
        &self.requests_dir
    }

    pub fn results_dir(&self) -> &Path {
        &self.results_dir
    }

    /// List the filenames present in the request directory.
    ///
    /// No filtering by file type; whatever was uploaded is listed. Sorted
    /// so the listing is stable across platforms.
    pub async fn list(&self) -> Result<Vec<String>, AuditError> {
        let mut entries =
            tokio::fs::read_dir(&self.requests_dir)
                .await
                .map_err(|e| AuditError::Storage {
                    path: self.requests_dir.clone(),
                    source: e,
                })?;

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| AuditError::Storage {
            path: self.requests_dir.clone(),
            source: e,
        })? {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }

    /// Resolve a request filename to its path, failing with
    /// [`AuditError::DocumentNotFound`] if no such file exists.
    pub fn resolve_request(&self, name: &str) -> Result<PathBuf, AuditError> {
        validate_name(name)?;
        let path = self.requests_dir.join(name);
        if !path.is_file() {
            return Err(AuditError::DocumentNotFound {
                name: name.to_string(),
            });
        }
        Ok(path)
    }

    /// Write `content` verbatim under `name` in the results directory,
    /// overwriting any previous value.
    pub async fn save(&self, name: &str, content: &str) -> Result<(), AuditError> {
        validate_name(name)?;
        let path = self.results_dir.join(name);
        tokio::fs::write(&path, content)
            .await
            .map_err(|e| AuditError::Storage {
                path: path.clone(),
                source: e,
            })?;
        info!("saved analysis to '{}'", path.display());
        Ok(())
    }
}

/// Reject names that cannot serve as flat keys: empty strings, path
/// separators, NUL, and the `.`/`..` components.
fn validate_name(name: &str) -> Result<(), AuditError> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
        || name.contains('\0');
    if invalid {
        return Err(AuditError::InvalidFilename {
            name: name.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> DocumentStore {
        DocumentStore::new(dir.path().join("analise"), dir.path().join("resultados"))
    }

    #[tokio::test]
    async fn save_then_read_returns_exactly_the_saved_content() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.ensure_dirs().await.unwrap();

        store.save("result.txt", "OK").await.unwrap();
        let on_disk = std::fs::read_to_string(store.results_dir().join("result.txt")).unwrap();
        assert_eq!(on_disk, "OK");

        // Last write wins, no merging.
        store.save("result.txt", "OK v2").await.unwrap();
        let on_disk = std::fs::read_to_string(store.results_dir().join("result.txt")).unwrap();
        assert_eq!(on_disk, "OK v2");
    }

    #[tokio::test]
    async fn listing_includes_an_added_file_exactly_once() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.ensure_dirs().await.unwrap();

        std::fs::write(store.requests_dir().join("request_123.pdf"), b"%PDF-").unwrap();
        let names = store.list().await.unwrap();
        assert_eq!(
            names
                .iter()
                .filter(|n| n.as_str() == "request_123.pdf")
                .count(),
            1
        );
    }

    #[tokio::test]
    async fn resolving_a_missing_request_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.ensure_dirs().await.unwrap();

        let err = store.resolve_request("missing.pdf").unwrap_err();
        assert!(matches!(err, AuditError::DocumentNotFound { .. }));
    }

    #[tokio::test]
    async fn traversal_names_are_rejected_before_touching_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.ensure_dirs().await.unwrap();

        for bad in ["../escape.txt", "a/b.txt", "a\\b.txt", "", ".", ".."] {
            let err = store.save(bad, "x").await.unwrap_err();
            assert!(
                matches!(err, AuditError::InvalidFilename { .. }),
                "accepted: {bad:?}"
            );
            let err = store.resolve_request(bad).unwrap_err();
            assert!(matches!(err, AuditError::InvalidFilename { .. }));
        }
        // Nothing escaped the results dir.
        assert!(!dir.path().join("escape.txt").exists());
    }
}
