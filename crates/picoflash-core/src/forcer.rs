//! Bootloader forcing
//!
//! Drives a runtime-mode device into the bootloader with an ordered
//! chain of best-effort strategies: soft reboot command, hardware USB
//! reset, then a bounded wait for manual intervention. Each strategy is
//! followed by a settle delay and a discovery re-check; the chain stops
//! at the first strategy after which a bootloader-mode device is
//! visible. No strategy failure is fatal on its own.

use std::thread;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::abort::AbortFlag;
use crate::config::{Capabilities, FlashConfig};
use crate::device::{any_in_mode, DeviceMode};
use crate::discovery::DeviceProbe;
use crate::picotool::Programmer;

#[cfg_attr(not(feature = "usb"), allow(dead_code))]
pub struct Forcer<'a, P: Programmer, D: DeviceProbe> {
    config: &'a FlashConfig,
    caps: Capabilities,
    programmer: &'a P,
    probe: &'a D,
    abort: AbortFlag,
}

impl<'a, P: Programmer, D: DeviceProbe> Forcer<'a, P, D> {
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

    /// Run the full strategy chain
    ///
    /// Returns true once a bootloader-mode device is visible; false
    /// when every strategy is exhausted.
    pub fn force_bootloader(&self) -> bool {
        log::info!("Attempting to force bootloader mode");

        if self.try_soft_reboot() && self.settled_check() {
            return true;
        }
        if self.try_usb_reset() && self.settled_check() {
            return true;
        }
        self.wait_for_manual_entry()
    }

    /// Strategy 1: ask the running firmware to reboot into the bootloader
    fn try_soft_reboot(&self) -> bool {
        match self.programmer.reboot_to_bootloader() {
            Ok(out) if out.success() => {
                log::info!("Soft reboot command accepted");
                true
            }
            Ok(out) => {
                log::warn!("Soft reboot refused: {}", out.stderr_trimmed());
                false
            }
            Err(e) => {
                log::warn!("Soft reboot unavailable: {}", e);
                false
            }
        }
    }

    /// Strategy 2: hardware port reset on every runtime-mode device
    #[cfg(feature = "usb")]
    fn try_usb_reset(&self) -> bool {
        if !self.caps.usb {
            log::debug!("USB reset strategy skipped: stack unavailable");
            return false;
        }
        crate::usb::reset_runtime_devices(self.config) > 0
    }

    #[cfg(not(feature = "usb"))]
    fn try_usb_reset(&self) -> bool {
        log::debug!("USB reset strategy skipped: stack unavailable");
        false
    }

    /// Strategy 3: operator instructions plus bounded polling
    fn wait_for_manual_entry(&self) -> bool {
        log::warn!("Automatic bootloader entry failed");
        log::warn!("Enter bootloader mode manually:");
        log::warn!("  1. Disconnect the USB cable");
        log::warn!("  2. Hold the BOOTSEL button");
        log::warn!("  3. Reconnect the USB cable");
        log::warn!("  4. Release the BOOTSEL button");

        let total_secs = self.config.manual_wait.as_secs();
        log::info!("Waiting up to {}s for bootloader mode", total_secs);

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message("Waiting for bootloader mode...");
        spinner.enable_steady_tick(Duration::from_millis(100));

        let tick = self.config.poll_interval.max(Duration::from_millis(1));
        let ticks = (self.config.manual_wait.as_millis() / tick.as_millis()).max(1) as u64;

        for elapsed in 0..ticks {
            if self.abort.is_set() {
                spinner.finish_and_clear();
                log::info!("Aborted while waiting for bootloader mode");
                return false;
            }
            if self.bootloader_visible() {
                spinner.finish_and_clear();
                log::info!("Bootloader mode detected");
                return true;
            }
            if elapsed > 0 && elapsed % 5 == 0 {
                spinner.set_message(format!(
                    "Still waiting... ({}s remaining)",
                    total_secs.saturating_sub(elapsed)
                ));
            }
            thread::sleep(tick);
        }

        spinner.finish_and_clear();
        log::error!("Timed out waiting for bootloader mode");
        false
    }

    fn settled_check(&self) -> bool {
        thread::sleep(self.config.settle_delay);
        self.bootloader_visible()
    }

    fn bootloader_visible(&self) -> bool {
        any_in_mode(&self.probe.discover(), DeviceMode::Bootloader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{bootloader_dev, test_config, FakePicotool, FakeProbe, Scripted};
    use std::time::Instant;

    #[test]
    fn test_stops_at_first_successful_strategy() {
        let config = test_config();
        let fake = FakePicotool::new();
        // Bootloader visible on the re-check right after the soft reboot.
        let probe = FakeProbe::always(vec![bootloader_dev()]);

        let forcer = Forcer::new(
            &config,
            Capabilities::none(),
            &fake,
            &probe,
            AbortFlag::new(),
        );
        assert!(forcer.force_bootloader());
        assert_eq!(fake.calls(), vec!["reboot_to_bootloader"]);
    }

    #[test]
    fn test_failed_strategy_does_not_abandon_chain() {
        let config = test_config();
        let mut fake = FakePicotool::new();
        fake.reboot_to_bootloader = Scripted::NotFound;
        // Nothing visible at first; the device shows up while the manual
        // wait is polling.
        let probe = FakeProbe::new(vec![vec![], vec![bootloader_dev()]]);

        let forcer = Forcer::new(
            &config,
            Capabilities::none(),
            &fake,
            &probe,
            AbortFlag::new(),
        );
        assert!(forcer.force_bootloader());
    }

    #[test]
    fn test_manual_wait_times_out() {
        let config = test_config();
        let mut fake = FakePicotool::new();
        fake.reboot_to_bootloader = Scripted::Timeout;
        let probe = FakeProbe::always(Vec::new());

        let started = Instant::now();
        let forcer = Forcer::new(
            &config,
            Capabilities::none(),
            &fake,
            &probe,
            AbortFlag::new(),
        );
        assert!(!forcer.force_bootloader());
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_abort_ends_manual_wait() {
        let config = test_config();
        let mut fake = FakePicotool::new();
        fake.reboot_to_bootloader = Scripted::NotFound;
        let probe = FakeProbe::always(Vec::new());

        let abort = AbortFlag::new();
        abort.set();
        let forcer = Forcer::new(&config, Capabilities::none(), &fake, &probe, abort);
        assert!(!forcer.force_bootloader());
    }
}
