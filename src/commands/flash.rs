//! Flash command implementation

use std::path::Path;

use picoflash_core::{
    AbortFlag, Capabilities, FlashConfig, FlashSession, Orchestrator, Outcome, Picotool,
    SystemProbe,
};

/// Run one flash session against `file` (or the default image)
pub fn run(
    config: &FlashConfig,
    caps: Capabilities,
    file: Option<&Path>,
) -> Result<i32, Box<dyn std::error::Error>> {
    let image = file
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config.default_image_path());

    let picotool = Picotool::new(config);
    let probe = SystemProbe::new(config, caps, &picotool);
    let orchestrator = Orchestrator::new(config, caps, &picotool, &probe, AbortFlag::new());

    let session = orchestrator.run(&image);
    Ok(report(&session))
}

/// Print the terminal outcome and map it to the process exit code
///
/// Unverified-but-transferred counts as success: the image is already
/// committed to flash.
pub fn report(session: &FlashSession) -> i32 {
    match &session.outcome {
        Outcome::Success => {
            println!("Flash complete: {}", session.firmware_path.display());
            0
        }
        Outcome::SuccessUnverified(failure) => {
            println!(
                "Flash complete: {} (unverified: {})",
                session.firmware_path.display(),
                failure
            );
            0
        }
        Outcome::NoDevice => {
            eprintln!("No Pico devices found");
            1
        }
        Outcome::BootloaderUnreachable => {
            eprintln!("Failed to enter bootloader mode");
            1
        }
        Outcome::TransferFailed(e) => {
            eprintln!("Transfer failed: {}", e);
            1
        }
        Outcome::BuildFailed(e) => {
            eprintln!("Build failed: {}", e);
            1
        }
    }
}
