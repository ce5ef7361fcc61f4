// crates/ssx/src/commands/combine.rs

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use ssx_core::combine::combine_models;
use ssx_core::config::CombineParams;

use super::{read_experiments, CommonArgs, StagedOutputs};

#[derive(Args, Debug)]
pub struct CombineArgs {
    /// Experiment list to combine
    pub experiments: PathBuf,
    /// Position of the experiment providing the shared models
    #[arg(long)]
    pub model: Option<usize>,
    #[arg(long, default_value = "combined.expt")]
    pub output_experiments: PathBuf,
    #[command(flatten)]
    pub common: CommonArgs,
}

pub fn run(args: CombineArgs) -> Result<()> {
    let params: CombineParams = args.common.resolve(|params: &mut CombineParams| {
        if let Some(model) = args.model {
            params.model = model;
        }
    })?;

    let experiments = read_experiments(&args.experiments)?;
    let combined = combine_models(&experiments, &params)?;

    let mut outputs = StagedOutputs::default();
    outputs.experiments(&args.output_experiments, &combined)?;
    outputs.commit()
}
