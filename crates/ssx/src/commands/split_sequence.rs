// crates/ssx/src/commands/split_sequence.rs

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use ssx_core::config::SplitParams;
use ssx_core::split_sequence::{sole_experiment, split_sequence};

use super::{read_experiments, CommonArgs, StagedOutputs};

#[derive(Args, Debug)]
pub struct SplitSequenceArgs {
    /// Experiment list holding exactly one sweep
    pub experiments: PathBuf,
    /// Number of images per oscillation
    #[arg(long)]
    pub nimages: Option<usize>,
    #[arg(long, default_value = "imported.expt")]
    pub output_experiments: PathBuf,
    #[command(flatten)]
    pub common: CommonArgs,
}

pub fn run(args: SplitSequenceArgs) -> Result<()> {
    let params: SplitParams = args.common.resolve(|params: &mut SplitParams| {
        if args.nimages.is_some() {
            params.nimages = args.nimages;
        }
    })?;

    let experiments = read_experiments(&args.experiments)?;
    let sweeps = split_sequence(sole_experiment(&experiments)?, &params)?;

    let mut outputs = StagedOutputs::default();
    outputs.experiments(&args.output_experiments, &sweeps)?;
    outputs.commit()
}
