use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "xrlab",
    about = "XR Lab interaction runtime driver",
    version
)]
pub struct Cli {
    /// Config file to use instead of the discovered .xrlab/config.toml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Log at debug level
    #[arg(long, global = true)]
    pub debug: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Replay a recorded input trace (.toml events or .xrf snapshots)
    Replay {
        /// Path to the trace file
        trace: PathBuf,
        /// Print a line for every frame, not only frames that did something
        #[arg(long)]
        verbose: bool,
    },
    /// Convert a point between world space and miniature space
    #[command(allow_negative_numbers = true)]
    Map {
        x: f32,
        y: f32,
        z: f32,
        /// Treat the point as miniature space and map it back to the world
        #[arg(long)]
        inverse: bool,
        /// Miniature scale, overriding the config
        #[arg(long)]
        scale: Option<f32>,
    },
    /// Manage the session config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Write the default config to .xrlab/config.toml
    Init {
        /// Write to the user config directory instead
        #[arg(long)]
        global: bool,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the effective config and where it came from
    Show,
}
