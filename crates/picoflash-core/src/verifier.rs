//! Post-flash verification
//!
//! A device running its new firmware re-enumerates as a runtime device
//! shortly after the transfer. One settle delay, one discovery pass,
//! three-way classification. A verification failure never retracts the
//! transfer itself; the orchestrator keeps the distinction.

use std::thread;

use crate::config::FlashConfig;
use crate::device::{any_in_mode, DeviceMode};
use crate::discovery::DeviceProbe;
use crate::error::VerifyFailure;

pub struct Verifier<'a, D: DeviceProbe> {
    config: &'a FlashConfig,
    probe: &'a D,
}

impl<'a, D: DeviceProbe> Verifier<'a, D> {
    pub fn new(config: &'a FlashConfig, probe: &'a D) -> Self {
        Self { config, probe }
    }

    /// Classify the post-flash device state
    pub fn verify(&self) -> Result<(), VerifyFailure> {
        log::info!("Verifying flash operation");
        thread::sleep(self.config.verify_delay);

        let devices = self.probe.discover();
        if any_in_mode(&devices, DeviceMode::Runtime) {
            log::info!("Device is running the new firmware");
            Ok(())
        } else if any_in_mode(&devices, DeviceMode::Bootloader) {
            Err(VerifyFailure::StuckInBootloader)
        } else {
            Err(VerifyFailure::NotDetected)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{bootloader_dev, runtime_dev, test_config, FakeProbe};

    #[test]
    fn test_runtime_device_verifies() {
        let config = test_config();
        let probe = FakeProbe::always(vec![runtime_dev()]);
        assert!(Verifier::new(&config, &probe).verify().is_ok());
    }

    #[test]
    fn test_bootloader_only_is_stuck() {
        let config = test_config();
        let probe = FakeProbe::always(vec![bootloader_dev()]);
        assert_eq!(
            Verifier::new(&config, &probe).verify(),
            Err(VerifyFailure::StuckInBootloader)
        );
    }

    #[test]
    fn test_runtime_wins_over_bootloader() {
        let config = test_config();
        let probe = FakeProbe::always(vec![bootloader_dev(), runtime_dev()]);
        assert!(Verifier::new(&config, &probe).verify().is_ok());
    }

    #[test]
    fn test_no_device_detected() {
        let config = test_config();
        let probe = FakeProbe::always(Vec::new());
        assert_eq!(
            Verifier::new(&config, &probe).verify(),
            Err(VerifyFailure::NotDetected)
        );
    }
}
