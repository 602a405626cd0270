//! Compile-then-flash command implementation

use picoflash_core::{AbortFlag, Capabilities, FlashConfig, Orchestrator, Picotool, SystemProbe};

use super::flash::report;

/// Compile `target` (or the default), then flash the result
pub fn run(
    config: &FlashConfig,
    caps: Capabilities,
    target: Option<&str>,
) -> Result<i32, Box<dyn std::error::Error>> {
    let target = target.unwrap_or(&config.default_target);

    let picotool = Picotool::new(config);
    let probe = SystemProbe::new(config, caps, &picotool);
    let orchestrator = Orchestrator::new(config, caps, &picotool, &probe, AbortFlag::new());

    let session = orchestrator.build_and_run(target);
    Ok(report(&session))
}
