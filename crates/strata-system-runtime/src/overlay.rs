/*
 * overlay.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * EnvOverlayRuntime: decorator that layers explicit environment variables
 * over any inner runtime.
 *
 * File access is delegated unchanged. Environment lookups consult the overlay
 * first; variables listed as hidden are reported as unset even if the inner
 * runtime has them.
 */

use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::traits::{RuntimeResult, SystemRuntime};

/// Decorator that overrides environment variables of an inner runtime.
pub struct EnvOverlayRuntime<R: SystemRuntime> {
    inner: R,
    vars: HashMap<String, String>,
    hidden: HashSet<String>,
}

impl<R: SystemRuntime> EnvOverlayRuntime<R> {
    /// Create a new overlay wrapping the given runtime.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            vars: HashMap::new(),
            hidden: HashSet::new(),
        }
    }

    /// Define (or redefine) a variable.
    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.hidden.remove(&name);
        self.vars.insert(name, value.into());
        self
    }

    /// Make a variable appear unset.
    pub fn without_var(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.vars.remove(&name);
        self.hidden.insert(name);
        self
    }

    /// Access the wrapped runtime.
    pub fn inner(&self) -> &R {
        &self.inner
    }
}

impl<R: SystemRuntime> SystemRuntime for EnvOverlayRuntime<R> {
    fn file_read(&self, path: &Path) -> RuntimeResult<Vec<u8>> {
        self.inner.file_read(path)
    }

    fn env_get(&self, name: &str) -> RuntimeResult<Option<String>> {
        if self.hidden.contains(name) {
            return Ok(None);
        }
        if let Some(value) = self.vars.get(name) {
            return Ok(Some(value.clone()));
        }
        self.inner.env_get(name)
    }

    fn env_all(&self) -> RuntimeResult<HashMap<String, String>> {
        let mut all = self.inner.env_all()?;
        all.retain(|k, _| !self.hidden.contains(k));
        all.extend(self.vars.iter().map(|(k, v)| (k.clone(), v.clone())));
        Ok(all)
    }
}
