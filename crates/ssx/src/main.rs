// crates/ssx/src/main.rs

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

mod commands;
mod logging;

use commands::{
    combine::CombineArgs, filter_dose::FilterDoseArgs, find_hits::FindHitsArgs,
    split_sequence::SplitSequenceArgs,
};

/// Post-processing tools for serial crystallography experiment lists
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log debug detail (overridden by RUST_LOG)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    /// Emit JSON log lines on stderr
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Keep the sweeps that look like crystal hits
    FindHits(FindHitsArgs),
    /// Truncate every sweep to a window of images counted from its start
    FilterDose(FilterDoseArgs),
    /// Chop a single long sweep into equal-width sweeps
    SplitSequence(SplitSequenceArgs),
    /// Make every experiment share one beam, detector and goniometer
    Combine(CombineArgs),
}

impl Command {
    fn log_file(&self) -> std::path::PathBuf {
        match self {
            Command::FindHits(args) => args.common.log_file("ssx.find_hits.log"),
            Command::FilterDose(args) => args.common.log_file("ssx.filter_dose.log"),
            Command::SplitSequence(args) => args.common.log_file("ssx.split_sequence.log"),
            Command::Combine(args) => args.common.log_file("ssx.combine.log"),
        }
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    logging::init(&cli.command.log_file(), cli.verbose, cli.json)?;

    match cli.command {
        Command::FindHits(args) => commands::find_hits::run(args),
        Command::FilterDose(args) => commands::filter_dose::run(args),
        Command::SplitSequence(args) => commands::split_sequence::run(args),
        Command::Combine(args) => commands::combine::run(args),
    }
}
