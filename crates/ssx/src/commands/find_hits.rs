// crates/ssx/src/commands/find_hits.rs

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use ssx_core::config::FindHitsParams;
use ssx_core::find_hits::find_hits;
use tracing::debug;

use super::{read_experiments, read_reflections, CommonArgs, StagedOutputs};

#[derive(Args, Debug)]
pub struct FindHitsArgs {
    /// Experiment list to screen
    pub experiments: PathBuf,
    /// Reflection table matching the experiment list
    pub reflections: PathBuf,
    /// Minimum number of spots per sweep
    #[arg(long)]
    pub minspots: Option<usize>,
    /// Maximum number of spots per sweep
    #[arg(long)]
    pub maxspots: Option<usize>,
    /// Maximum sigma_m in degrees
    #[arg(long)]
    pub mosaicity_cutoff: Option<f64>,
    #[arg(long, default_value = "hits.expt")]
    pub output_experiments: PathBuf,
    #[arg(long, default_value = "hits.refl")]
    pub output_reflections: PathBuf,
    #[command(flatten)]
    pub common: CommonArgs,
}

pub fn run(args: FindHitsArgs) -> Result<()> {
    let params: FindHitsParams = args.common.resolve(|params: &mut FindHitsParams| {
        if let Some(minspots) = args.minspots {
            params.minspots = minspots;
        }
        if let Some(maxspots) = args.maxspots {
            params.maxspots = maxspots;
        }
        if let Some(cutoff) = args.mosaicity_cutoff {
            params.mosaicity_cutoff = cutoff;
        }
    })?;

    let experiments = read_experiments(&args.experiments)?;
    let reflections = read_reflections(&args.reflections)?;

    let selection = find_hits(&experiments, &reflections, &params)?;
    for (position, verdict) in selection.verdicts.iter().enumerate() {
        debug!("Experiment {position}: {verdict}");
    }

    let mut outputs = StagedOutputs::default();
    outputs.experiments(&args.output_experiments, &selection.experiments)?;
    outputs.reflections(&args.output_reflections, &selection.reflections)?;
    outputs.commit()
}
