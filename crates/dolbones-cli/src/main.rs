mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use dolbones_core::InspectConfig;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use cli::{Args, Command};
use commands::Session;

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose > 0 { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(format!("dolbones={}", level).parse()?)
                .add_directive(format!("dolbones_core={}", level).parse()?),
        )
        .init();

    // Load config
    let config = match InspectConfig::load(&args.config) {
        Ok(c) => {
            info!("Loaded config from {:?}", args.config);
            c
        }
        Err(e) if e.is_not_found() => InspectConfig::default(),
        Err(e) => {
            warn!("Failed to load config: {}, using defaults", e);
            InspectConfig::default()
        }
    };

    let session = Session::new(config, args.pid);

    match args.command {
        Command::Fighter { slot, json } => commands::fighter::run(&session, slot, json),
        Command::Skeleton {
            slot,
            max_nodes,
            max_depth,
            json,
        } => commands::skeleton::run(&session, slot, max_nodes, max_depth, json),
        Command::Jobj { address, json } => commands::jobj::run(&session, &address, json),
        Command::Read {
            address,
            layout,
            floats,
        } => commands::read::run(&session, &address, &layout, floats.as_deref()),
        Command::Hexdump { address, size } => commands::hexdump::run(&session, &address, size),
        Command::Draw { slot } => commands::draw::run(&session, slot),
        Command::Validate { log, slot } => commands::validate::run(&session, &log, slot),
        Command::Replay { file, head, json } => commands::replay::run(&file, head, json),
    }
}
