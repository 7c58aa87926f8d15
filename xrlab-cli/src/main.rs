mod cli;
mod commands;
mod project;
mod replay_log;

use clap::Parser;
use env_logger::Env;
use glam::Vec3;

use cli::{Cli, Command, ConfigAction};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level)).init();

    match cli.command {
        Command::Replay { trace, verbose } => {
            let loaded = project::load_config(cli.config.as_deref())?;
            log::debug!("config from {}", loaded.source);
            commands::replay_cmd::run(&trace, loaded.config, verbose)
        }
        Command::Map {
            x,
            y,
            z,
            inverse,
            scale,
        } => {
            let loaded = project::load_config(cli.config.as_deref())?;
            commands::map_cmd::run(Vec3::new(x, y, z), inverse, scale, &loaded.config)
        }
        Command::Config { action } => match action {
            ConfigAction::Init { global, force } => commands::config_cmd::init(global, force),
            ConfigAction::Show => {
                let loaded = project::load_config(cli.config.as_deref())?;
                commands::config_cmd::show(&loaded)
            }
        },
    }
}
