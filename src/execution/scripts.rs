//! Script store
//!
//! Server-side routine sources, keyed by name. The `multiquery` routine
//! ships bundled; additional routines load from an ordered search path of
//! directories, first match wins. Loaded sources are cached for the
//! lifetime of the store (not the process) and carry a SHA-256 content
//! digest so a backend can identify exactly which routine revision it was
//! handed.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use sha2::{Digest, Sha256};
use tracing::debug;

use super::errors::{ExecutionError, ExecutionResult};

/// Name of the batched-query routine
pub const MULTIQUERY_ROUTINE: &str = "multiquery";

/// Bundled source of the batched-query routine
pub const MULTIQUERY_SOURCE: &str = include_str!("../../scripts/multiquery.js");

/// A loaded server-side routine
#[derive(Debug, Clone)]
pub struct Script {
    /// Routine name (file basename without extension)
    pub name: String,
    /// Source text sent to the remote primitive
    pub source: String,
    /// SHA-256 hex digest of the source
    pub digest: String,
}

impl Script {
    /// Creates a script, computing its content digest
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        let source = source.into();
        let digest = format!("{:x}", Sha256::digest(source.as_bytes()));
        Self {
            name: name.into(),
            source,
            digest,
        }
    }
}

/// Named routine sources with a per-store cache
#[derive(Debug)]
pub struct ScriptStore {
    dirs: Vec<PathBuf>,
    cache: RwLock<HashMap<String, Arc<Script>>>,
}

impl ScriptStore {
    /// Creates a store holding only the bundled routines
    pub fn bundled() -> Self {
        let multiquery = Arc::new(Script::new(MULTIQUERY_ROUTINE, MULTIQUERY_SOURCE));
        let mut cache = HashMap::new();
        cache.insert(multiquery.name.clone(), multiquery);
        Self {
            dirs: Vec::new(),
            cache: RwLock::new(cache),
        }
    }

    /// Creates a store that also searches the given directories, in order
    pub fn with_dirs(dirs: impl IntoIterator<Item = PathBuf>) -> Self {
        let mut store = Self::bundled();
        store.dirs.extend(dirs);
        store
    }

    /// Appends a directory to the search path
    pub fn add_dir(&mut self, dir: impl AsRef<Path>) {
        self.dirs.push(dir.as_ref().to_path_buf());
    }

    /// Returns the script with the given name.
    ///
    /// Bundled and previously-loaded scripts come from the cache; otherwise
    /// each directory is searched in order for `<name>.js` and the first
    /// match is loaded and cached.
    pub fn code_for(&self, name: &str) -> ExecutionResult<Arc<Script>> {
        {
            let cache = self
                .cache
                .read()
                .map_err(|_| ExecutionError::Failure("script cache lock poisoned".into()))?;
            if let Some(script) = cache.get(name) {
                return Ok(Arc::clone(script));
            }
        }

        if self.dirs.is_empty() {
            return Err(ExecutionError::NoScriptDirectory);
        }

        let path = self
            .dirs
            .iter()
            .map(|dir| dir.join(format!("{name}.js")))
            .find(|candidate| candidate.exists())
            .ok_or_else(|| ExecutionError::ScriptNotFound(name.to_string()))?;

        let source = fs::read_to_string(&path)?;
        let script = Arc::new(Script::new(name, source));
        debug!(script = name, digest = %script.digest, "loaded script");

        let mut cache = self
            .cache
            .write()
            .map_err(|_| ExecutionError::Failure("script cache lock poisoned".into()))?;
        let entry = cache.entry(name.to_string()).or_insert(script);
        Ok(Arc::clone(entry))
    }
}

impl Default for ScriptStore {
    fn default() -> Self {
        Self::bundled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_bundled_multiquery_available() {
        let store = ScriptStore::bundled();
        let script = store.code_for(MULTIQUERY_ROUTINE).unwrap();

        assert_eq!(script.name, "multiquery");
        assert!(script.source.contains("function multiquery"));
    }

    #[test]
    fn test_unknown_script_without_dirs() {
        let store = ScriptStore::bundled();
        assert!(matches!(
            store.code_for("nope"),
            Err(ExecutionError::NoScriptDirectory)
        ));
    }

    #[test]
    fn test_unknown_script_with_dirs() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = ScriptStore::with_dirs([tmp.path().to_path_buf()]);

        assert!(matches!(
            store.code_for("nope"),
            Err(ExecutionError::ScriptNotFound(name)) if name == "nope"
        ));
    }

    #[test]
    fn test_first_matching_dir_wins() {
        let first = tempfile::TempDir::new().unwrap();
        let second = tempfile::TempDir::new().unwrap();
        fs::write(first.path().join("tally.js"), "function tally() { return 1; }").unwrap();
        fs::write(second.path().join("tally.js"), "function tally() { return 2; }").unwrap();

        let store =
            ScriptStore::with_dirs([first.path().to_path_buf(), second.path().to_path_buf()]);
        let script = store.code_for("tally").unwrap();

        assert!(script.source.contains("return 1"));
    }

    #[test]
    fn test_cache_serves_first_read_content() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("tally.js");
        fs::write(&path, "function tally() { return 1; }").unwrap();

        let store = ScriptStore::with_dirs([tmp.path().to_path_buf()]);
        let first = store.code_for("tally").unwrap();

        let mut file = fs::OpenOptions::new().write(true).open(&path).unwrap();
        file.write_all(b"function tally() { return 9; }").unwrap();
        drop(file);

        let second = store.code_for("tally").unwrap();
        assert_eq!(first.digest, second.digest);
        assert!(second.source.contains("return 1"));
    }

    #[test]
    fn test_digest_is_stable() {
        let a = Script::new("x", "code");
        let b = Script::new("x", "code");
        assert_eq!(a.digest, b.digest);
        assert_ne!(a.digest, Script::new("x", "other").digest);
    }
}
