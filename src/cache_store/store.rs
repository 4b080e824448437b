//! Filesystem-backed success and error namespaces for one run
//!
//! Layout:
//! ```text
//! <cache_root>/<run_label>/<normalized-key>.json        success artifacts
//! <error_cache_root>/<run_label>/<normalized-key>.html  error artifacts
//! ```
//!
//! The success namespace is the checkpoint: a key with a `.json` file is done
//! and will never be fetched again by a run over the same label.

use log::{debug, error, info, warn};
use std::io::Write;
use std::path::{Path, PathBuf};

use super::artifact::SuccessArtifact;
use super::counters::RunCounters;
use super::key::NormalizedKey;
use crate::error::{FetchError, FetchResult};

const SUCCESS_EXTENSION: &str = "json";
const ERROR_EXTENSION: &str = "html";

/// Persistent key to artifact store with a parallel error store
///
/// Cloning is cheap and every clone shares the same [`RunCounters`].
/// Mutating operations never fail from the caller's point of view: I/O errors
/// are logged and the run carries on.
#[derive(Debug, Clone)]
pub struct CacheStore {
    run_label: String,
    success_dir: PathBuf,
    error_dir: PathBuf,
    counters: RunCounters,
}

impl CacheStore {
    /// Create the store and its run-scoped directories
    ///
    /// # Errors
    /// Returns `FetchError::Persistence` if a namespace directory cannot be created.
    pub fn new(
        cache_root: impl AsRef<Path>,
        error_cache_root: impl AsRef<Path>,
        run_label: impl Into<String>,
    ) -> FetchResult<Self> {
        let run_label = run_label.into();
        let success_dir = cache_root.as_ref().join(&run_label);
        let error_dir = error_cache_root.as_ref().join(&run_label);

        for dir in [&success_dir, &error_dir] {
            std::fs::create_dir_all(dir).map_err(|source| FetchError::Persistence {
                path: dir.clone(),
                source,
            })?;
        }

        debug!(
            target: "batchfetch::cache",
            "Cache ready for run {run_label:?}: {} / {}",
            success_dir.display(),
            error_dir.display()
        );

        Ok(Self {
            run_label,
            success_dir,
            error_dir,
            counters: RunCounters::new(),
        })
    }

    #[must_use]
    pub fn run_label(&self) -> &str {
        &self.run_label
    }

    #[must_use]
    pub fn success_dir(&self) -> &Path {
        &self.success_dir
    }

    #[must_use]
    pub fn error_dir(&self) -> &Path {
        &self.error_dir
    }

    #[must_use]
    pub fn counters(&self) -> &RunCounters {
        &self.counters
    }

    /// Path of the success artifact for `key`, or `None` for an empty key
    #[must_use]
    pub fn success_path(&self, key: &str) -> Option<PathBuf> {
        let key = NormalizedKey::new(key);
        (!key.is_empty()).then(|| self.success_dir.join(key.file_name(SUCCESS_EXTENSION)))
    }

    /// Path of the error artifact for `key`, or `None` for an empty key
    #[must_use]
    pub fn error_path(&self, key: &str) -> Option<PathBuf> {
        let key = NormalizedKey::new(key);
        (!key.is_empty()).then(|| self.error_dir.join(key.file_name(ERROR_EXTENSION)))
    }

    /// Whether a success artifact exists for `key`
    #[must_use]
    pub fn exists(&self, key: &str) -> bool {
        self.success_path(key).is_some_and(|path| path.is_file())
    }

    /// Whether an error artifact exists for `key`
    #[must_use]
    pub fn error_exists(&self, key: &str) -> bool {
        self.error_path(key).is_some_and(|path| path.is_file())
    }

    /// Persist a success artifact, replacing any previous one for the key
    ///
    /// No-op for empty keys. The success counter is incremented even if the
    /// write fails, since the fetch itself did succeed.
    pub fn save(&self, key: &str, artifact: &SuccessArtifact) {
        let Some(path) = self.success_path(key) else {
            debug!(target: "batchfetch::cache", "Ignoring save for empty key");
            return;
        };

        let result = serde_json::to_vec_pretty(artifact)
            .map_err(|e| FetchError::Persistence {
                path: path.clone(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
            })
            .and_then(|bytes| write_atomic(&path, &bytes));

        let count = self.counters.increment_successes();
        match result {
            Ok(()) => info!(
                target: "batchfetch::cache",
                "Saved OK: {:?} ({count})",
                NormalizedKey::new(key).as_str()
            ),
            Err(e) => error!(target: "batchfetch::cache", "Exception saving cache for key {key:?}: {e}"),
        }
    }

    /// Persist an error artifact (blocked page markup or a failure description)
    ///
    /// No-op for empty keys. The error counter is incremented even if the
    /// write fails so the circuit breaker still sees the failure.
    pub fn save_error(&self, key: &str, blob: &str) {
        let Some(path) = self.error_path(key) else {
            debug!(target: "batchfetch::cache", "Ignoring error save for empty key");
            return;
        };

        let result = write_atomic(&path, blob.as_bytes());

        let count = self.counters.increment_errors();
        match result {
            Ok(()) => info!(
                target: "batchfetch::cache",
                "Saved ERROR: {:?} ({count})",
                NormalizedKey::new(key).as_str()
            ),
            Err(e) => error!(
                target: "batchfetch::cache",
                "Exception saving error cache for key {key:?}: {e}"
            ),
        }
    }

    /// Load the success artifact for `key`
    ///
    /// Returns `None` if there is none or if the stored file cannot be parsed.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<SuccessArtifact> {
        let path = self.success_path(key)?;
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                error!(target: "batchfetch::cache", "Exception reading cache for key {key:?}: {e}");
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(artifact) => Some(artifact),
            Err(e) => {
                warn!(
                    target: "batchfetch::cache",
                    "Corrupt cache artifact {}: {e}",
                    path.display()
                );
                None
            }
        }
    }

    /// Load the error artifact for `key`
    #[must_use]
    pub fn get_error(&self, key: &str) -> Option<String> {
        let path = self.error_path(key)?;
        match std::fs::read_to_string(&path) {
            Ok(blob) => Some(blob),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                error!(
                    target: "batchfetch::cache",
                    "Exception reading error cache for key {key:?}: {e}"
                );
                None
            }
        }
    }
}

/// Write through a temp file in the target directory, then rename over the target.
///
/// Creates the namespace directory if it was removed since construction. A
/// reader never observes a half-written artifact.
fn write_atomic(path: &Path, bytes: &[u8]) -> FetchResult<()> {
    let persistence = |source: std::io::Error| FetchError::Persistence {
        path: path.to_path_buf(),
        source,
    };

    let dir = path
        .parent()
        .ok_or_else(|| persistence(std::io::Error::other("artifact path has no parent")))?;
    std::fs::create_dir_all(dir).map_err(persistence)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(persistence)?;
    tmp.write_all(bytes).map_err(persistence)?;
    tmp.flush().map_err(persistence)?;
    tmp.persist(path).map_err(|e| persistence(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> CacheStore {
        CacheStore::new(dir.path().join("cache"), dir.path().join("error_cache"), "run").unwrap()
    }

    #[test]
    fn test_new_creates_run_directories() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        assert!(dir.path().join("cache/run").is_dir());
        assert!(dir.path().join("error_cache/run").is_dir());
        assert_eq!(store.run_label(), "run");
    }

    #[test]
    fn test_save_recreates_missing_namespace() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        std::fs::remove_dir_all(store.success_dir()).unwrap();

        store.save("k", &SuccessArtifact::new("u", "c"));
        assert!(store.exists("k"));
    }

    #[test]
    fn test_error_artifact_is_raw_text() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.save_error("a/b", "<html>captcha</html>");

        let raw = std::fs::read_to_string(dir.path().join("error_cache/run/ab.html")).unwrap();
        assert_eq!(raw, "<html>captcha</html>");
        assert_eq!(store.get_error("a/b").as_deref(), Some("<html>captcha</html>"));
        assert!(!store.exists("a/b"));
    }

    #[test]
    fn test_corrupt_artifact_reads_as_absent() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        std::fs::write(store.success_dir().join("bad.json"), "{not json").unwrap();

        assert!(store.exists("bad"));
        assert_eq!(store.get("bad"), None);
    }

    #[test]
    fn test_failed_write_still_counts() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        // A directory where the artifact file should go makes the rename fail
        std::fs::create_dir_all(store.error_dir().join("k.html")).unwrap();

        store.save_error("k", "boom");
        assert_eq!(store.counters().errors(), 1);
    }
}
