//! External programming utility
//!
//! The engine never speaks the picoboot protocol itself; it drives the
//! stock `picotool` binary as a subprocess. [`Programmer`] is the seam
//! test doubles substitute for the real thing.

use std::path::Path;
use std::time::Duration;

use crate::config::FlashConfig;
use crate::error::ToolError;
use crate::tool::{run_tool, ToolOutput};

/// Operations consumed from the external programming utility
///
/// Every method is a bounded, blocking subprocess call. Missing
/// executable and timeout surface as [`ToolError`] values, never as
/// panics; callers decide whether a fallback exists.
pub trait Programmer {
    /// Device introspection (`info -a`), used by fallback discovery
    fn info(&self) -> Result<ToolOutput, ToolError>;

    /// Force a reboot into the bootloader (`reboot -f`)
    fn reboot_to_bootloader(&self) -> Result<ToolOutput, ToolError>;

    /// Reboot into application firmware (`reboot`)
    fn reboot_to_runtime(&self) -> Result<ToolOutput, ToolError>;

    /// Transfer a firmware image (`load <file>`)
    fn load(&self, image: &Path) -> Result<ToolOutput, ToolError>;
}

/// `picotool` subprocess wrapper
pub struct Picotool {
    program: String,
    probe_timeout: Duration,
    reboot_timeout: Duration,
    load_timeout: Duration,
}

impl Picotool {
    pub fn new(config: &FlashConfig) -> Self {
        Self {
            program: config.picotool.clone(),
            probe_timeout: config.probe_timeout,
            reboot_timeout: config.reboot_timeout,
            load_timeout: config.load_timeout,
        }
    }
}

impl Programmer for Picotool {
    fn info(&self) -> Result<ToolOutput, ToolError> {
        run_tool(&self.program, &["info", "-a"], self.probe_timeout)
    }

    fn reboot_to_bootloader(&self) -> Result<ToolOutput, ToolError> {
        run_tool(&self.program, &["reboot", "-f"], self.reboot_timeout)
    }

    fn reboot_to_runtime(&self) -> Result<ToolOutput, ToolError> {
        run_tool(&self.program, &["reboot"], self.reboot_timeout)
    }

    fn load(&self, image: &Path) -> Result<ToolOutput, ToolError> {
        let image = image.to_string_lossy();
        run_tool(&self.program, &["load", image.as_ref()], self.load_timeout)
    }
}
