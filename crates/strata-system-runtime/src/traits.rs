/*
 * traits.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Defines the SystemRuntime trait and supporting types for the runtime abstraction layer.
 *
 * Configuration loaders never touch std::fs or std::env directly. They receive a
 * SystemRuntime so that file contents and environment variables can be supplied
 * by the process (NativeRuntime), by a test (InMemoryRuntime), or by a layered
 * combination of both (EnvOverlayRuntime).
 */

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for runtime operations
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Errors that can occur during runtime operations
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The requested file does not exist
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The file exists but is not valid UTF-8
    #[error("Invalid UTF-8 in file: {}", .0.display())]
    InvalidUtf8(PathBuf),

    /// Operation not supported on this runtime
    #[error("Operation not supported: {0}")]
    NotSupported(String),
}

/// Trait defining the system operations configuration loading depends on.
///
/// Implementations must be shareable across threads; every method takes `&self`.
pub trait SystemRuntime: Send + Sync {
    // ═══════════════════════════════════════════════════════════════════════
    // FILE OPERATIONS
    // ═══════════════════════════════════════════════════════════════════════

    /// Read entire file contents as bytes.
    fn file_read(&self, path: &Path) -> RuntimeResult<Vec<u8>>;

    /// Read file as string with UTF-8 encoding.
    ///
    /// Default implementation reads bytes and converts to string.
    fn file_read_string(&self, path: &Path) -> RuntimeResult<String> {
        let bytes = self.file_read(path)?;
        String::from_utf8(bytes).map_err(|_| RuntimeError::InvalidUtf8(path.to_path_buf()))
    }

    // ═══════════════════════════════════════════════════════════════════════
    // ENVIRONMENT
    // ═══════════════════════════════════════════════════════════════════════

    /// Get single environment variable.
    ///
    /// `Ok(None)` means the variable is not set. Errors are reserved for
    /// runtimes that cannot answer at all.
    fn env_get(&self, name: &str) -> RuntimeResult<Option<String>>;

    /// Get all environment variables.
    fn env_all(&self) -> RuntimeResult<HashMap<String, String>>;

    /// Look up a variable, treating lookup failures as "not set".
    fn env_lookup(&self, name: &str) -> Option<String> {
        match self.env_get(name) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(variable = name, error = %err, "Environment lookup failed");
                None
            }
        }
    }
}

impl<R: SystemRuntime + ?Sized> SystemRuntime for &R {
    fn file_read(&self, path: &Path) -> RuntimeResult<Vec<u8>> {
        (**self).file_read(path)
    }

    fn env_get(&self, name: &str) -> RuntimeResult<Option<String>> {
        (**self).env_get(name)
    }

    fn env_all(&self) -> RuntimeResult<HashMap<String, String>> {
        (**self).env_all()
    }
}

impl<R: SystemRuntime + ?Sized> SystemRuntime for std::sync::Arc<R> {
    fn file_read(&self, path: &Path) -> RuntimeResult<Vec<u8>> {
        (**self).file_read(path)
    }

    fn env_get(&self, name: &str) -> RuntimeResult<Option<String>> {
        (**self).env_get(name)
    }

    fn env_all(&self) -> RuntimeResult<HashMap<String, String>> {
        (**self).env_all()
    }
}
