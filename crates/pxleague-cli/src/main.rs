mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use cli::{Args, Command};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let args = Args::parse();

    // Default to warn when RUST_LOG is unset
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("pxleague=warn,pxleague_core=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match args.command {
        Command::Import {
            dir,
            season,
            options,
            output,
        } => commands::import::run(&dir, season.as_deref(), options.as_deref(), output.as_deref()),
        Command::Inspect { file, json } => commands::inspect::run(&file, json),
        Command::Dump {
            file,
            name_only,
            limit,
        } => commands::dump::run(&file, name_only, limit),
    }
}
