//! Error types for the flash engine
//!
//! Every sub-component reports failure through one of these enums rather
//! than raising through the orchestrator; the orchestrator alone maps
//! stage results to a terminal session outcome.

use std::path::PathBuf;

use thiserror::Error;

/// Failures of a bounded external tool invocation
#[derive(Debug, Error)]
pub enum ToolError {
    /// Executable not present on this host
    #[error("{program} not found in PATH")]
    NotFound { program: String },

    /// Child did not exit before the deadline and was killed
    #[error("{program} timed out after {seconds}s")]
    Timeout { program: String, seconds: u64 },

    /// Spawn or wait failed for another reason
    #[error("failed to run {program}: {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// USB backend failure on the primary discovery path
#[derive(Debug, Error)]
#[error("USB backend error: {0}")]
pub struct UsbError(pub String);

/// Firmware transfer failures
#[derive(Debug, Error)]
pub enum TransferError {
    /// Image file absent at transfer time
    #[error("firmware image not found: {}", .0.display())]
    MissingFirmware(PathBuf),

    /// Image file exists but has no content
    #[error("firmware image is empty: {}", .0.display())]
    EmptyFirmware(PathBuf),

    /// Programming utility could not run (missing executable, timeout, io)
    #[error(transparent)]
    Tool(#[from] ToolError),

    /// Programming utility ran and reported failure
    #[error("load failed: {stderr}")]
    LoadFailed { stderr: String },
}

/// Post-flash verification failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum VerifyFailure {
    /// A bootloader device is visible but no runtime device
    #[error("device is still in bootloader mode")]
    StuckInBootloader,

    /// No matching device visible at all
    #[error("device not detected after flashing")]
    NotDetected,
}

/// Compile-step failures
#[derive(Debug, Error)]
pub enum BuildError {
    /// Configured build directory does not exist
    #[error("build directory not found: {}", .0.display())]
    MissingBuildDir(PathBuf),

    /// Build tool could not run (missing executable, timeout, io)
    #[error(transparent)]
    Tool(#[from] ToolError),

    /// Build tool ran and reported failure
    #[error("compilation failed: {stderr}")]
    Failed { stderr: String },

    /// Build finished but the expected image was not produced
    #[error("build produced no image at {}", .0.display())]
    MissingImage(PathBuf),
}

/// Watch-mode configuration failures
#[derive(Debug, Error)]
pub enum WatchError {
    /// Built without the watcher backend, or the capability is absent
    #[error("file watching support is not available")]
    Unavailable,

    /// Watcher backend refused the watch
    #[error("failed to watch {}: {message}", .path.display())]
    Backend { path: PathBuf, message: String },
}
