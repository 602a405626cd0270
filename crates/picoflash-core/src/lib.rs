//! picoflash-core - Flash orchestration engine for the Raspberry Pi Pico
//!
//! Implements the automated flash pipeline: device discovery,
//! bootloader forcing, firmware transfer, and post-flash verification,
//! plus the make-based build step and the debounced watch loop that
//! re-triggers it.
//!
//! The engine is deliberately synchronous: every external interaction
//! (USB enumeration, picotool, make) is a blocking call bounded by an
//! explicit timeout from [`FlashConfig`]. Sub-components report
//! classifications instead of raising; the [`Orchestrator`] is the one
//! place stage results become a terminal [`Outcome`].
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use picoflash_core::{
//!     AbortFlag, Capabilities, FlashConfig, Orchestrator, Picotool, SystemProbe,
//! };
//!
//! let config = FlashConfig::default();
//! let caps = Capabilities::detect();
//! let picotool = Picotool::new(&config);
//! let probe = SystemProbe::new(&config, caps, &picotool);
//! let orchestrator = Orchestrator::new(&config, caps, &picotool, &probe, AbortFlag::new());
//!
//! let session = orchestrator.run(Path::new("build/blinky.uf2"));
//! std::process::exit(if session.outcome.is_success() { 0 } else { 1 });
//! ```

pub mod abort;
pub mod builder;
pub mod config;
pub mod device;
pub mod discovery;
pub mod error;
pub mod forcer;
pub mod orchestrator;
pub mod picotool;
pub mod tool;
pub mod transfer;
#[cfg(feature = "usb")]
pub mod usb;
pub mod verifier;
#[cfg(feature = "watch")]
pub mod watch;

#[cfg(test)]
mod testutil;

pub use abort::AbortFlag;
pub use builder::Builder;
pub use config::{Capabilities, FlashConfig};
pub use device::{DeviceDescriptor, DeviceIdentity, DeviceMode};
pub use discovery::{DeviceProbe, SystemProbe};
pub use error::{BuildError, ToolError, TransferError, UsbError, VerifyFailure, WatchError};
pub use orchestrator::{FlashSession, Orchestrator, Outcome};
pub use picotool::{Picotool, Programmer};
pub use tool::{run_tool, run_tool_in, ToolOutput};
pub use transfer::Transfer;
pub use verifier::Verifier;
