/*
 * native.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * NativeRuntime: process file system and environment through std.
 */

use std::collections::HashMap;
use std::io;
use std::path::Path;

use crate::traits::{RuntimeError, RuntimeResult, SystemRuntime};

/// Runtime with full access to the host file system and process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeRuntime;

impl NativeRuntime {
    pub fn new() -> Self {
        Self
    }
}

impl SystemRuntime for NativeRuntime {
    fn file_read(&self, path: &Path) -> RuntimeResult<Vec<u8>> {
        std::fs::read(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => RuntimeError::NotFound(path.to_path_buf()),
            _ => RuntimeError::Io(e),
        })
    }

    fn env_get(&self, name: &str) -> RuntimeResult<Option<String>> {
        match std::env::var(name) {
            Ok(value) => Ok(Some(value)),
            Err(std::env::VarError::NotPresent) => Ok(None),
            // Set, but not unicode: surface the lossy form rather than pretend it is unset
            Err(std::env::VarError::NotUnicode(raw)) => {
                Ok(Some(raw.to_string_lossy().into_owned()))
            }
        }
    }

    fn env_all(&self) -> RuntimeResult<HashMap<String, String>> {
        Ok(std::env::vars_os()
            .map(|(k, v)| {
                (
                    k.to_string_lossy().into_owned(),
                    v.to_string_lossy().into_owned(),
                )
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.ini");
        std::fs::write(&path, "[a]\nb=1\n").unwrap();

        let rt = NativeRuntime::new();
        assert_eq!(rt.file_read_string(&path).unwrap(), "[a]\nb=1\n");
    }

    #[test]
    fn test_read_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.yml");

        let err = NativeRuntime::new().file_read(&path).unwrap_err();
        match err {
            RuntimeError::NotFound(p) => assert_eq!(p, path),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_unset_variable_is_none() {
        let rt = NativeRuntime::new();
        assert_eq!(
            rt.env_get("STRATA_SURELY_UNSET_VARIABLE_7f3a").unwrap(),
            None
        );
    }

    #[test]
    fn test_env_all_contains_path_like_entries() {
        // PATH is not guaranteed everywhere, so only check consistency with env_get
        let rt = NativeRuntime::new();
        let all = rt.env_all().unwrap();
        for (key, value) in all.iter().take(5) {
            assert_eq!(rt.env_get(key).unwrap().as_deref(), Some(value.as_str()));
        }
    }
}
