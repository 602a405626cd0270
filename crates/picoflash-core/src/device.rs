//! Device observation types
//!
//! A [`DeviceDescriptor`] is one point-in-time observation of an attached
//! board, produced by a discovery pass. Descriptors are never cached or
//! reused across stages: a mode transition re-enumerates the device on
//! the bus, so any earlier observation is stale.

/// Mode an attached device was observed in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceMode {
    /// BOOTSEL mode, accepting a new firmware image
    Bootloader,
    /// Executing previously flashed application firmware
    Runtime,
}

/// Where an observation came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceIdentity {
    /// Direct USB enumeration
    Usb {
        vendor_id: u16,
        product_id: u16,
        bus: u8,
        address: u8,
    },
    /// Seen through the picotool fallback path, no structured identity
    Fallback,
}

/// One observation of an attached device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceDescriptor {
    pub mode: DeviceMode,
    pub identity: DeviceIdentity,
}

impl DeviceDescriptor {
    pub fn is_bootloader(&self) -> bool {
        self.mode == DeviceMode::Bootloader
    }

    pub fn is_runtime(&self) -> bool {
        self.mode == DeviceMode::Runtime
    }
}

/// True when any descriptor in `devices` is in `mode`
pub fn any_in_mode(devices: &[DeviceDescriptor], mode: DeviceMode) -> bool {
    devices.iter().any(|d| d.mode == mode)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_helpers() {
        let dev = DeviceDescriptor {
            mode: DeviceMode::Bootloader,
            identity: DeviceIdentity::Fallback,
        };
        assert!(dev.is_bootloader());
        assert!(!dev.is_runtime());
    }

    #[test]
    fn test_any_in_mode() {
        let devices = vec![
            DeviceDescriptor {
                mode: DeviceMode::Runtime,
                identity: DeviceIdentity::Usb {
                    vendor_id: 0x2E8A,
                    product_id: 0x000A,
                    bus: 1,
                    address: 4,
                },
            },
        ];
        assert!(any_in_mode(&devices, DeviceMode::Runtime));
        assert!(!any_in_mode(&devices, DeviceMode::Bootloader));
        assert!(!any_in_mode(&[], DeviceMode::Runtime));
    }
}
