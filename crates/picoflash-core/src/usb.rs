//! USB stack access
//!
//! Thin layer over `nusb`: enumerate the two known VID/PID pairs and
//! issue best-effort port resets on runtime-mode devices. Enumeration
//! is read-only; the reset is the only operation with a side effect.

use crate::config::FlashConfig;
use crate::device::{DeviceDescriptor, DeviceIdentity, DeviceMode};
use crate::error::UsbError;

/// Whether the USB stack is usable on this host at all
pub fn stack_available() -> bool {
    match nusb::list_devices() {
        Ok(_) => true,
        Err(e) => {
            log::warn!("USB stack unavailable: {}", e);
            false
        }
    }
}

/// Enumerate attached devices matching the configured identifiers
pub fn enumerate(config: &FlashConfig) -> Result<Vec<DeviceDescriptor>, UsbError> {
    let devices = nusb::list_devices().map_err(|e| UsbError(e.to_string()))?;

    let mut found = Vec::new();
    for info in devices {
        if info.vendor_id() != config.vendor_id {
            continue;
        }
        let mode = if info.product_id() == config.bootloader_pid {
            DeviceMode::Bootloader
        } else if info.product_id() == config.runtime_pid {
            DeviceMode::Runtime
        } else {
            continue;
        };

        log::debug!(
            "Found {:?} device at bus {} address {}",
            mode,
            info.bus_number(),
            info.device_address()
        );
        found.push(DeviceDescriptor {
            mode,
            identity: DeviceIdentity::Usb {
                vendor_id: info.vendor_id(),
                product_id: info.product_id(),
                bus: info.bus_number(),
                address: info.device_address(),
            },
        });
    }
    Ok(found)
}

/// Issue a port reset on every runtime-mode device
///
/// Individual open or reset failures are logged and skipped; iteration
/// continues. Returns the number of devices successfully reset.
pub fn reset_runtime_devices(config: &FlashConfig) -> usize {
    let infos = match nusb::list_devices() {
        Ok(infos) => infos,
        Err(e) => {
            log::warn!("USB enumeration failed: {}", e);
            return 0;
        }
    };

    let mut count = 0;
    for info in infos {
        if info.vendor_id() != config.vendor_id || info.product_id() != config.runtime_pid {
            continue;
        }
        match info.open() {
            Ok(device) => match device.reset() {
                Ok(()) => {
                    log::info!(
                        "USB reset issued at bus {} address {}",
                        info.bus_number(),
                        info.device_address()
                    );
                    count += 1;
                }
                Err(e) => log::warn!(
                    "USB reset failed at bus {} address {}: {}",
                    info.bus_number(),
                    info.device_address(),
                    e
                ),
            },
            Err(e) => log::warn!("Failed to open device for reset: {}", e),
        }
    }
    count
}
