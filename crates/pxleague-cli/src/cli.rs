//! CLI argument definitions for pxleague.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "pxleague")]
#[command(about = "Legacy league table decoder and importer", version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Import a directory of legacy tables into a season dataset
    Import {
        /// Directory containing Division.DB, Team.DB, Match.DB, ...
        dir: String,
        /// Name of the season receiving the data
        #[arg(long, env = "PXLEAGUE_SEASON")]
        season: Option<String>,
        /// Import options file (TOML)
        #[arg(long, value_name = "FILE")]
        options: Option<String>,
        /// Output file path (JSON); stdout when omitted
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Show the header of one table file
    Inspect {
        /// Table file path
        file: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print decoded rows of one table file as JSON lines
    Dump {
        /// Table file path
        file: String,
        /// Recover only the ID and a scanned label from each record
        #[arg(long)]
        name_only: bool,
        /// Maximum number of rows
        #[arg(long)]
        limit: Option<usize>,
    },
}
