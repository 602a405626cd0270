//! CLI argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "picoflash")]
#[command(author, version, about = "Automated Raspberry Pi Pico flashing", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Flash a firmware image to an attached Pico
    Flash {
        /// UF2 image to flash (defaults to the built default target)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Compile a target, then flash the result
    Build {
        /// Target name to compile
        #[arg(short, long)]
        target: Option<String>,
    },

    /// Watch the source tree, rebuilding and flashing on changes
    Watch {
        /// Target name to compile on each change
        #[arg(short, long)]
        target: Option<String>,
    },
}
