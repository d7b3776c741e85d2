/*
 * memory.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * InMemoryRuntime: a fully virtual file system and environment.
 *
 * Used by tests and by embedders that assemble configuration from data they
 * already hold. Nothing here touches the host.
 */

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::traits::{RuntimeError, RuntimeResult, SystemRuntime};

/// Runtime backed by in-memory maps.
///
/// Thread safety: Uses RwLock to satisfy Send + Sync trait bounds.
#[derive(Debug, Default)]
pub struct InMemoryRuntime {
    files: RwLock<HashMap<PathBuf, Vec<u8>>>,
    env: RwLock<HashMap<String, String>>,
}

impl InMemoryRuntime {
    /// Create an empty runtime: no files, no environment variables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`InMemoryRuntime::add_file`].
    pub fn with_file(self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) -> Self {
        self.add_file(path, contents);
        self
    }

    /// Builder form of [`InMemoryRuntime::set_env`].
    pub fn with_env(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_env(name, value);
        self
    }

    /// Add or replace a file.
    pub fn add_file(&self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) {
        let mut files = self.files.write().unwrap_or_else(|e| e.into_inner());
        files.insert(path.into(), contents.into());
    }

    /// Remove a file. Returns true if the file existed.
    pub fn remove_file(&self, path: &Path) -> bool {
        let mut files = self.files.write().unwrap_or_else(|e| e.into_inner());
        files.remove(path).is_some()
    }

    /// Set an environment variable.
    pub fn set_env(&self, name: impl Into<String>, value: impl Into<String>) {
        let mut env = self.env.write().unwrap_or_else(|e| e.into_inner());
        env.insert(name.into(), value.into());
    }

    /// Unset an environment variable.
    pub fn remove_env(&self, name: &str) {
        let mut env = self.env.write().unwrap_or_else(|e| e.into_inner());
        env.remove(name);
    }
}

impl SystemRuntime for InMemoryRuntime {
    fn file_read(&self, path: &Path) -> RuntimeResult<Vec<u8>> {
        let files = self.files.read().unwrap_or_else(|e| e.into_inner());
        files
            .get(path)
            .cloned()
            .ok_or_else(|| RuntimeError::NotFound(path.to_path_buf()))
    }

    fn env_get(&self, name: &str) -> RuntimeResult<Option<String>> {
        let env = self.env.read().unwrap_or_else(|e| e.into_inner());
        Ok(env.get(name).cloned())
    }

    fn env_all(&self) -> RuntimeResult<HashMap<String, String>> {
        let env = self.env.read().unwrap_or_else(|e| e.into_inner());
        Ok(env.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_files_roundtrip() {
        let rt = InMemoryRuntime::new().with_file("/cfg/a.ini", "[s]\nk=v\n");

        assert_eq!(
            rt.file_read_string(Path::new("/cfg/a.ini")).unwrap(),
            "[s]\nk=v\n"
        );
        assert!(rt.remove_file(Path::new("/cfg/a.ini")));
        assert!(matches!(
            rt.file_read(Path::new("/cfg/a.ini")),
            Err(RuntimeError::NotFound(_))
        ));
    }

    #[test]
    fn test_environment() {
        let rt = InMemoryRuntime::new().with_env("CONFIG_TEST_ENV", "test-value");

        assert_eq!(
            rt.env_get("CONFIG_TEST_ENV").unwrap().as_deref(),
            Some("test-value")
        );
        assert_eq!(rt.env_get("UNDEFINED_ENV").unwrap(), None);

        rt.remove_env("CONFIG_TEST_ENV");
        assert!(rt.env_all().unwrap().is_empty());
    }
}
