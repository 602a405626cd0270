//! picoflash - Automated firmware flashing for the Raspberry Pi Pico
//!
//! Detects the mode of an attached Pico, forces it into the bootloader
//! when needed, transfers a UF2 image with picotool, and verifies the
//! board came back up running the new firmware. A watch mode rebuilds
//! and reflashes on source changes.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use picoflash_core::{Capabilities, FlashConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Set log level based on verbosity
    match cli.verbose {
        0 => {} // default (info)
        1 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    }

    let config = FlashConfig::default();
    let caps = Capabilities::detect();
    log::debug!("Capabilities: usb={} watch={}", caps.usb, caps.watch);

    let code = match cli.command {
        Commands::Flash { file } => commands::flash::run(&config, caps, file.as_deref())?,
        Commands::Build { target } => commands::build::run(&config, caps, target.as_deref())?,
        Commands::Watch { target } => commands::watch::run(&config, caps, target.as_deref())?,
    };

    std::process::exit(code);
}
