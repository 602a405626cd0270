//! Engine configuration
//!
//! Device identifiers, timeouts, and tool names live in one immutable
//! value handed by reference to each component at construction. Nothing
//! in the engine reads process-wide state, so tests can substitute
//! different identifiers or timeouts freely.

use std::path::PathBuf;
use std::time::Duration;

/// Configuration for one flash engine instance
///
/// The defaults target the Raspberry Pi Pico: VID `0x2E8A` with PID
/// `0x0003` ("RP2 Boot") in bootloader mode and PID `0x000A`
/// ("Pico CDC") in runtime mode, driven through the stock `picotool`
/// binary and a `make`-based firmware build tree.
#[derive(Debug, Clone)]
pub struct FlashConfig {
    /// USB vendor ID of the board
    pub vendor_id: u16,
    /// Product ID reported in bootloader mode
    pub bootloader_pid: u16,
    /// Product ID reported by application firmware
    pub runtime_pid: u16,

    /// Programming utility executable
    pub picotool: String,
    /// Build tool executable
    pub make: String,

    /// Directory holding the make build tree
    pub build_dir: PathBuf,
    /// Source tree watched in watch mode
    pub source_dir: PathBuf,
    /// Target built when none is named
    pub default_target: String,
    /// Parallel build jobs
    pub build_jobs: u32,

    /// Bound on the fallback introspection probe
    pub probe_timeout: Duration,
    /// Bound on reboot subcommands
    pub reboot_timeout: Duration,
    /// Bound on the firmware load operation
    pub load_timeout: Duration,
    /// Bound on the external build step
    pub build_timeout: Duration,

    /// Wait after an operation that re-enumerates the bus
    pub settle_delay: Duration,
    /// Wait before the post-flash discovery pass
    pub verify_delay: Duration,
    /// Window for manual bootloader entry
    pub manual_wait: Duration,
    /// Tick for discovery polling loops
    pub poll_interval: Duration,
    /// Collapse window for watch-mode triggers
    pub debounce_window: Duration,
}

impl Default for FlashConfig {
    fn default() -> Self {
        Self {
            vendor_id: 0x2E8A,
            bootloader_pid: 0x0003,
            runtime_pid: 0x000A,
            picotool: "picotool".to_string(),
            make: "make".to_string(),
            build_dir: PathBuf::from("build"),
            source_dir: PathBuf::from("src"),
            default_target: "blinky".to_string(),
            build_jobs: 4,
            probe_timeout: Duration::from_secs(5),
            reboot_timeout: Duration::from_secs(10),
            load_timeout: Duration::from_secs(30),
            build_timeout: Duration::from_secs(120),
            settle_delay: Duration::from_secs(2),
            verify_delay: Duration::from_secs(3),
            manual_wait: Duration::from_secs(30),
            poll_interval: Duration::from_secs(1),
            debounce_window: Duration::from_secs(2),
        }
    }
}

impl FlashConfig {
    /// Conventional image path for a build target
    pub fn image_path(&self, target: &str) -> PathBuf {
        self.build_dir.join(format!("{target}.uf2"))
    }

    /// Image path for the default target
    pub fn default_image_path(&self) -> PathBuf {
        self.image_path(&self.default_target)
    }
}

/// Optional backends available to this build on this host
///
/// Computed once at startup and threaded through explicitly; discovery
/// and the forcer branch on these flags rather than on backend errors
/// caught at the point of use.
#[derive(Debug, Clone, Copy)]
pub struct Capabilities {
    /// Direct USB enumeration and hardware reset
    pub usb: bool,
    /// File-system watching for watch mode
    pub watch: bool,
}

impl Capabilities {
    /// Probe the optional backends once.
    ///
    /// USB requires both the compiled-in backend and a working stack on
    /// this host; a failed probe degrades discovery to the fallback
    /// path and disables the hardware-reset strategy.
    pub fn detect() -> Self {
        Self {
            usb: usb_available(),
            watch: cfg!(feature = "watch"),
        }
    }

    /// All backends absent; discovery runs fallback-only.
    pub fn none() -> Self {
        Self {
            usb: false,
            watch: false,
        }
    }
}

#[cfg(feature = "usb")]
fn usb_available() -> bool {
    crate::usb::stack_available()
}

#[cfg(not(feature = "usb"))]
fn usb_available() -> bool {
    false
}
