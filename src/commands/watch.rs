//! Watch command implementation
//!
//! Without the `watch` feature the subcommand still exists and reports
//! a configuration error instead of crashing.

use picoflash_core::{Capabilities, FlashConfig};

#[cfg(feature = "watch")]
pub fn run(
    config: &FlashConfig,
    caps: Capabilities,
    target: Option<&str>,
) -> Result<i32, Box<dyn std::error::Error>> {
    use picoflash_core::{watch, AbortFlag, Orchestrator, Picotool, SystemProbe};

    let target = target.unwrap_or(&config.default_target).to_string();

    log::info!("Watch mode: flashing {} on source changes", target);
    log::info!("Press Ctrl+C to stop");

    // The worker outlives this stack frame, so it owns its own copies.
    let run_config = config.clone();
    watch::run(config, caps, AbortFlag::new(), move || {
        let picotool = Picotool::new(&run_config);
        let probe = SystemProbe::new(&run_config, caps, &picotool);
        let orchestrator =
            Orchestrator::new(&run_config, caps, &picotool, &probe, AbortFlag::new());

        let session = orchestrator.build_and_run(&target);
        if session.outcome.is_success() {
            log::info!("Auto-flash completed");
        } else {
            log::error!("Auto-flash failed: {}", session.outcome);
        }
    })?;

    Ok(0)
}

#[cfg(not(feature = "watch"))]
pub fn run(
    _config: &FlashConfig,
    _caps: Capabilities,
    _target: Option<&str>,
) -> Result<i32, Box<dyn std::error::Error>> {
    Err(picoflash_core::WatchError::Unavailable.into())
}
