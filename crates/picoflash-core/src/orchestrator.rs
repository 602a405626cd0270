//! Flash orchestration
//!
//! The top-level state machine: discover, route, force the bootloader
//! when needed, transfer, verify. This is the single place where stage
//! results are mapped to a terminal session outcome; every stage below
//! it reports a classification instead of raising.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::abort::AbortFlag;
use crate::builder::Builder;
use crate::config::{Capabilities, FlashConfig};
use crate::device::{any_in_mode, DeviceMode};
use crate::discovery::DeviceProbe;
use crate::error::{BuildError, TransferError, VerifyFailure};
use crate::forcer::Forcer;
use crate::picotool::Programmer;
use crate::transfer::Transfer;
use crate::verifier::Verifier;

/// Terminal result of one flash session
#[derive(Debug)]
pub enum Outcome {
    /// Image transferred and the device came back in runtime mode
    Success,
    /// Image transferred but verification failed; the image is already
    /// committed to flash, so this still counts as overall success
    SuccessUnverified(VerifyFailure),
    /// Nothing attached matching the known identifiers
    NoDevice,
    /// Every bootloader-forcing strategy exhausted
    BootloaderUnreachable,
    /// Transfer failed, including a missing or empty image
    TransferFailed(TransferError),
    /// Compile step failed before any device interaction
    BuildFailed(BuildError),
}

impl Outcome {
    /// Whether the session maps to exit code 0
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success | Outcome::SuccessUnverified(_))
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Success => write!(f, "success"),
            Outcome::SuccessUnverified(failure) => {
                write!(f, "flashed but unverified: {}", failure)
            }
            Outcome::NoDevice => write!(f, "no device found"),
            Outcome::BootloaderUnreachable => write!(f, "bootloader unreachable"),
            Outcome::TransferFailed(e) => write!(f, "transfer failed: {}", e),
            Outcome::BuildFailed(e) => write!(f, "build failed: {}", e),
        }
    }
}

/// One orchestrator invocation, never spanning more than one physical
/// flash attempt
#[derive(Debug)]
pub struct FlashSession {
    pub firmware_path: PathBuf,
    pub target_name: Option<String>,
    pub outcome: Outcome,
}

pub struct Orchestrator<'a, P: Programmer, D: DeviceProbe> {
    config: &'a FlashConfig,
    caps: Capabilities,
    programmer: &'a P,
    probe: &'a D,
    abort: AbortFlag,
}

impl<'a, P: Programmer, D: DeviceProbe> Orchestrator<'a, P, D> {
    pub fn new(
        config: &'a FlashConfig,
        caps: Capabilities,
        programmer: &'a P,
        probe: &'a D,
        abort: AbortFlag,
    ) -> Self {
        Self {
            config,
            caps,
            programmer,
            probe,
            abort,
        }
    }

    /// Run one end-to-end flash attempt against `image`
    pub fn run(&self, image: &Path) -> FlashSession {
        let outcome = self.run_stages(image);
        match &outcome {
            Outcome::Success => log::info!("Automated flashing successful"),
            Outcome::SuccessUnverified(failure) => {
                log::warn!("Flash completed but verification failed: {}", failure)
            }
            other => log::error!("Flash failed: {}", other),
        }
        FlashSession {
            firmware_path: image.to_path_buf(),
            target_name: None,
            outcome,
        }
    }

    /// Compile `target`, then flash the resulting image
    ///
    /// Build failure short-circuits before any device interaction.
    pub fn build_and_run(&self, target: &str) -> FlashSession {
        match Builder::new(self.config).build(target) {
            Ok(image) => {
                let mut session = self.run(&image);
                session.target_name = Some(target.to_string());
                session
            }
            Err(e) => {
                log::error!("Build failed: {}", e);
                FlashSession {
                    firmware_path: self.config.image_path(target),
                    target_name: Some(target.to_string()),
                    outcome: Outcome::BuildFailed(e),
                }
            }
        }
    }

    fn run_stages(&self, image: &Path) -> Outcome {
        // DETECT
        log::info!("Starting automated flash process");
        let devices = self.probe.discover();

        // ROUTE
        if any_in_mode(&devices, DeviceMode::Bootloader) {
            log::info!("Device found in bootloader mode");
        } else if any_in_mode(&devices, DeviceMode::Runtime) {
            log::info!("Device found in runtime mode, forcing bootloader");
            let forcer = Forcer::new(
                self.config,
                self.caps,
                self.programmer,
                self.probe,
                self.abort.clone(),
            );
            if !forcer.force_bootloader() {
                return Outcome::BootloaderUnreachable;
            }
        } else {
            return Outcome::NoDevice;
        }

        // TRANSFER
        if let Err(e) = Transfer::new(self.programmer).flash(image) {
            return Outcome::TransferFailed(e);
        }

        // VERIFY
        match Verifier::new(self.config, self.probe).verify() {
            Ok(()) => Outcome::Success,
            Err(failure) => Outcome::SuccessUnverified(failure),
        }
    }
}
