//! Device discovery
//!
//! Classifies attached devices as bootloader-mode or runtime-mode. The
//! primary path enumerates the USB stack directly; when the stack is
//! absent or errors, an external `picotool info` probe stands in. The
//! fallback can only see a bootloader-mode device, so runtime presence
//! is reported as absent there rather than inferred.

use crate::config::{Capabilities, FlashConfig};
use crate::device::{DeviceDescriptor, DeviceIdentity, DeviceMode};
use crate::picotool::Programmer;

/// Marker in `picotool info` output indicating a connected device
const FALLBACK_MARKER: &str = "RP2040";

/// A source of device observations
///
/// Implementations never block past the probe bound and never fail:
/// "nothing attached" is an empty vec. Each call produces fresh
/// descriptors; callers must not reuse an earlier snapshot across a
/// mode transition.
pub trait DeviceProbe {
    fn discover(&self) -> Vec<DeviceDescriptor>;
}

/// Production probe: USB enumeration with a picotool fallback
#[cfg_attr(not(feature = "usb"), allow(dead_code))]
pub struct SystemProbe<'a, P: Programmer> {
    config: &'a FlashConfig,
    caps: Capabilities,
    programmer: &'a P,
}

impl<'a, P: Programmer> SystemProbe<'a, P> {
    pub fn new(config: &'a FlashConfig, caps: Capabilities, programmer: &'a P) -> Self {
        Self {
            config,
            caps,
            programmer,
        }
    }

    #[cfg(feature = "usb")]
    fn discover_usb(&self) -> Option<Vec<DeviceDescriptor>> {
        if !self.caps.usb {
            return None;
        }
        match crate::usb::enumerate(self.config) {
            Ok(devices) => Some(devices),
            Err(e) => {
                log::warn!("USB enumeration failed, falling back to picotool: {}", e);
                None
            }
        }
    }

    #[cfg(not(feature = "usb"))]
    fn discover_usb(&self) -> Option<Vec<DeviceDescriptor>> {
        None
    }

    fn discover_fallback(&self) -> Vec<DeviceDescriptor> {
        match self.programmer.info() {
            Ok(out) if out.success() && out.stdout.contains(FALLBACK_MARKER) => {
                vec![DeviceDescriptor {
                    mode: DeviceMode::Bootloader,
                    identity: DeviceIdentity::Fallback,
                }]
            }
            Ok(_) => Vec::new(),
            Err(e) => {
                log::warn!("Fallback probe unavailable: {}", e);
                Vec::new()
            }
        }
    }
}

impl<P: Programmer> DeviceProbe for SystemProbe<'_, P> {
    fn discover(&self) -> Vec<DeviceDescriptor> {
        if let Some(devices) = self.discover_usb() {
            return devices;
        }
        self.discover_fallback()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{test_config, FakePicotool, Scripted};
    use crate::tool::ToolOutput;

    fn fallback_probe<'a>(
        fake: &'a FakePicotool,
        config: &'a FlashConfig,
    ) -> SystemProbe<'a, FakePicotool> {
        SystemProbe::new(config, Capabilities::none(), fake)
    }

    #[test]
    fn test_fallback_reports_bootloader_on_marker() {
        let config = test_config();
        let mut fake = FakePicotool::new();
        fake.info = Scripted::Ok(ToolOutput::ok("RP2040 device in BOOTSEL mode"));

        let devices = fallback_probe(&fake, &config).discover();
        assert_eq!(devices.len(), 1);
        assert!(devices[0].is_bootloader());
        assert_eq!(devices[0].identity, DeviceIdentity::Fallback);
    }

    #[test]
    fn test_fallback_without_marker_is_empty() {
        let config = test_config();
        let mut fake = FakePicotool::new();
        fake.info = Scripted::Ok(ToolOutput::ok("no accessible devices"));

        assert!(fallback_probe(&fake, &config).discover().is_empty());
    }

    #[test]
    fn test_fallback_failed_exit_is_empty() {
        let config = test_config();
        let mut fake = FakePicotool::new();
        // Marker text on a nonzero exit must not count as a device.
        fake.info = Scripted::Ok(ToolOutput {
            status: ToolOutput::exit_status(1),
            stdout: "RP2040 device".to_string(),
            stderr: String::new(),
        });

        assert!(fallback_probe(&fake, &config).discover().is_empty());
    }

    #[test]
    fn test_fallback_missing_tool_is_empty_not_error() {
        let config = test_config();
        let mut fake = FakePicotool::new();
        fake.info = Scripted::NotFound;

        assert!(fallback_probe(&fake, &config).discover().is_empty());
    }
}
