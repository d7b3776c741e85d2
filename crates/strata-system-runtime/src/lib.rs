/*
 * strata-system-runtime
 * Copyright (c) 2025 Posit, PBC
 *
 * Runtime abstraction layer for configuration loading.
 *
 * Loaders read files and environment variables through the SystemRuntime
 * trait instead of process-global state:
 *
 * - NativeRuntime: the host file system and process environment
 * - InMemoryRuntime: virtual files and variables (tests, embedders)
 * - EnvOverlayRuntime: explicit variables layered over another runtime (decorator pattern)
 */

mod memory;
mod native;
mod overlay;
mod traits;

pub use traits::{RuntimeError, RuntimeResult, SystemRuntime};

pub use memory::InMemoryRuntime;
pub use native::NativeRuntime;
pub use overlay::EnvOverlayRuntime;

/// Create a default runtime for the current process.
pub fn default_runtime() -> NativeRuntime {
    NativeRuntime::new()
}
