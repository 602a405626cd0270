//! Shared test doubles for the engine seams
//!
//! `FakeProbe` scripts discovery snapshots; `FakePicotool` scripts the
//! external programming utility and records the calls made against it.

use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use crate::config::FlashConfig;
use crate::device::{DeviceDescriptor, DeviceIdentity, DeviceMode};
use crate::discovery::DeviceProbe;
use crate::error::ToolError;
use crate::picotool::Programmer;
use crate::tool::ToolOutput;

/// Config with millisecond-scale waits so chain tests stay fast
pub(crate) fn test_config() -> FlashConfig {
    FlashConfig {
        settle_delay: Duration::from_millis(1),
        verify_delay: Duration::from_millis(1),
        manual_wait: Duration::from_millis(10),
        poll_interval: Duration::from_millis(2),
        debounce_window: Duration::from_millis(50),
        ..FlashConfig::default()
    }
}

pub(crate) fn bootloader_dev() -> DeviceDescriptor {
    DeviceDescriptor {
        mode: DeviceMode::Bootloader,
        identity: DeviceIdentity::Fallback,
    }
}

pub(crate) fn runtime_dev() -> DeviceDescriptor {
    DeviceDescriptor {
        mode: DeviceMode::Runtime,
        identity: DeviceIdentity::Usb {
            vendor_id: 0x2E8A,
            product_id: 0x000A,
            bus: 1,
            address: 4,
        },
    }
}

/// Probe returning scripted snapshots in order, repeating the last one
pub(crate) struct FakeProbe {
    snapshots: Mutex<Vec<Vec<DeviceDescriptor>>>,
}

impl FakeProbe {
    pub(crate) fn new(snapshots: Vec<Vec<DeviceDescriptor>>) -> Self {
        Self {
            snapshots: Mutex::new(snapshots),
        }
    }

    pub(crate) fn always(devices: Vec<DeviceDescriptor>) -> Self {
        Self::new(vec![devices])
    }
}

impl DeviceProbe for FakeProbe {
    fn discover(&self) -> Vec<DeviceDescriptor> {
        let mut snapshots = self.snapshots.lock().unwrap();
        if snapshots.len() > 1 {
            snapshots.remove(0)
        } else {
            snapshots.first().cloned().unwrap_or_default()
        }
    }
}

/// Scripted result for one programmer operation
#[derive(Clone)]
pub(crate) enum Scripted {
    Ok(ToolOutput),
    NotFound,
    Timeout,
}

impl Scripted {
    fn produce(&self) -> Result<ToolOutput, ToolError> {
        match self {
            Scripted::Ok(out) => Ok(out.clone()),
            Scripted::NotFound => Err(ToolError::NotFound {
                program: "picotool".to_string(),
            }),
            Scripted::Timeout => Err(ToolError::Timeout {
                program: "picotool".to_string(),
                seconds: 1,
            }),
        }
    }
}

/// Programmer double recording calls in order
pub(crate) struct FakePicotool {
    pub(crate) info: Scripted,
    pub(crate) reboot_to_bootloader: Scripted,
    pub(crate) reboot_to_runtime: Scripted,
    pub(crate) load: Scripted,
    calls: Mutex<Vec<&'static str>>,
}

impl FakePicotool {
    /// Every operation succeeds with empty output
    pub(crate) fn new() -> Self {
        Self {
            info: Scripted::Ok(ToolOutput::ok("")),
            reboot_to_bootloader: Scripted::Ok(ToolOutput::ok("")),
            reboot_to_runtime: Scripted::Ok(ToolOutput::ok("")),
            load: Scripted::Ok(ToolOutput::ok("")),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, name: &'static str) {
        self.calls.lock().unwrap().push(name);
    }
}

impl Programmer for FakePicotool {
    fn info(&self) -> Result<ToolOutput, ToolError> {
        self.record("info");
        self.info.produce()
    }

    fn reboot_to_bootloader(&self) -> Result<ToolOutput, ToolError> {
        self.record("reboot_to_bootloader");
        self.reboot_to_bootloader.produce()
    }

    fn reboot_to_runtime(&self) -> Result<ToolOutput, ToolError> {
        self.record("reboot_to_runtime");
        self.reboot_to_runtime.produce()
    }

    fn load(&self, _image: &Path) -> Result<ToolOutput, ToolError> {
        self.record("load");
        self.load.produce()
    }
}
