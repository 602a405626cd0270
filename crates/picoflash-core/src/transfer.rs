//! Firmware transfer
//!
//! Ships an image to a device already in bootloader mode through the
//! external programming utility, then makes a best-effort reboot into
//! the new firmware. Once the load succeeds the image is committed to
//! flash; nothing after that point can retract the transfer.

use std::path::Path;

use crate::error::TransferError;
use crate::picotool::Programmer;

pub struct Transfer<'a, P: Programmer> {
    programmer: &'a P,
}

impl<'a, P: Programmer> Transfer<'a, P> {
    pub fn new(programmer: &'a P) -> Self {
        Self { programmer }
    }

    /// Transfer `image` to the device
    ///
    /// The image must exist and be non-empty at call time; both checks
    /// run immediately before the load so an earlier check cannot mask
    /// a file deleted in the meantime. No subprocess is spawned when
    /// the precondition fails.
    pub fn flash(&self, image: &Path) -> Result<(), TransferError> {
        let meta = std::fs::metadata(image)
            .map_err(|_| TransferError::MissingFirmware(image.to_path_buf()))?;
        if !meta.is_file() {
            return Err(TransferError::MissingFirmware(image.to_path_buf()));
        }
        if meta.len() == 0 {
            return Err(TransferError::EmptyFirmware(image.to_path_buf()));
        }

        log::info!(
            "Flashing {} ({:.1} KiB)",
            image.display(),
            meta.len() as f64 / 1024.0
        );

        let out = self.programmer.load(image)?;
        if !out.success() {
            return Err(TransferError::LoadFailed {
                stderr: out.stderr_trimmed().to_string(),
            });
        }
        log::info!("Firmware loaded successfully");

        // The image is committed at this point; a failed reboot only
        // means the operator may have to power-cycle.
        match self.programmer.reboot_to_runtime() {
            Ok(out) if out.success() => log::info!("Device rebooted into new firmware"),
            Ok(out) => log::warn!(
                "Reboot failed, but firmware was loaded: {}",
                out.stderr_trimmed()
            ),
            Err(e) => log::warn!("Reboot failed, but firmware was loaded: {}", e),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ToolError;
    use crate::testutil::{FakePicotool, Scripted};
    use crate::tool::ToolOutput;
    use std::io::Write;

    fn image_file(content: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content).unwrap();
        file
    }

    #[test]
    fn test_missing_image_spawns_nothing() {
        let fake = FakePicotool::new();
        let err = Transfer::new(&fake)
            .flash(Path::new("/nonexistent/fw.uf2"))
            .unwrap_err();
        assert!(matches!(err, TransferError::MissingFirmware(_)));
        assert!(fake.calls().is_empty());
    }

    #[test]
    fn test_empty_image_spawns_nothing() {
        let fake = FakePicotool::new();
        let file = image_file(b"");
        let err = Transfer::new(&fake).flash(file.path()).unwrap_err();
        assert!(matches!(err, TransferError::EmptyFirmware(_)));
        assert!(fake.calls().is_empty());
    }

    #[test]
    fn test_successful_load_then_reboot() {
        let fake = FakePicotool::new();
        let file = image_file(b"uf2 image data");
        Transfer::new(&fake).flash(file.path()).unwrap();
        assert_eq!(fake.calls(), vec!["load", "reboot_to_runtime"]);
    }

    #[test]
    fn test_reboot_failure_does_not_fail_transfer() {
        let mut fake = FakePicotool::new();
        fake.reboot_to_runtime = Scripted::Ok(ToolOutput::failed(1, "device busy"));
        let file = image_file(b"uf2 image data");
        assert!(Transfer::new(&fake).flash(file.path()).is_ok());
    }

    #[test]
    fn test_load_failure_surfaces_stderr() {
        let mut fake = FakePicotool::new();
        fake.load = Scripted::Ok(ToolOutput::failed(1, "ERROR: device not in BOOTSEL mode\n"));
        let file = image_file(b"uf2 image data");
        let err = Transfer::new(&fake).flash(file.path()).unwrap_err();
        match err {
            TransferError::LoadFailed { stderr } => {
                assert_eq!(stderr, "ERROR: device not in BOOTSEL mode");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_load_timeout_is_distinct() {
        let mut fake = FakePicotool::new();
        fake.load = Scripted::Timeout;
        let file = image_file(b"uf2 image data");
        let err = Transfer::new(&fake).flash(file.path()).unwrap_err();
        assert!(matches!(
            err,
            TransferError::Tool(ToolError::Timeout { .. })
        ));
    }
}
