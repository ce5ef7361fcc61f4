// crates/ssx/src/commands/filter_dose.rs

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use ssx_core::config::FilterDoseParams;
use ssx_core::filter_dose::filter_dose;
use tracing::info;

use super::{read_experiments, read_reflections, CommonArgs, StagedOutputs};

#[derive(Args, Debug)]
pub struct FilterDoseArgs {
    /// Experiment list to truncate
    pub experiments: PathBuf,
    /// Reflection table matching the experiment list
    pub reflections: PathBuf,
    /// Image window MIN,MAX counted from the first image of each sweep
    #[arg(long, value_name = "MIN,MAX", value_parser = parse_dose)]
    pub dose: Option<[u32; 2]>,
    #[arg(long, default_value = "filtered.expt")]
    pub output_experiments: PathBuf,
    #[arg(long, default_value = "filtered.refl")]
    pub output_reflections: PathBuf,
    #[command(flatten)]
    pub common: CommonArgs,
}

fn parse_dose(value: &str) -> Result<[u32; 2], String> {
    let (min, max) = value
        .split_once(',')
        .ok_or_else(|| format!("expected MIN,MAX, got '{value}'"))?;
    let parse = |part: &str| {
        part.trim()
            .parse::<u32>()
            .map_err(|err| format!("invalid image offset '{part}': {err}"))
    };
    Ok([parse(min)?, parse(max)?])
}

pub fn run(args: FilterDoseArgs) -> Result<()> {
    let params: FilterDoseParams = args.common.resolve(|params: &mut FilterDoseParams| {
        if args.dose.is_some() {
            params.dose = args.dose;
        }
    })?;

    let experiments = read_experiments(&args.experiments)?;
    let reflections = read_reflections(&args.reflections)?;

    let slice = filter_dose(&experiments, &reflections, &params)?;
    for (position, window) in slice.windows.iter().enumerate() {
        match window {
            Some(images) => info!("Experiment {position}: images {images}"),
            None => info!("Experiment {position}: no images"),
        }
    }

    let mut outputs = StagedOutputs::default();
    outputs.experiments(&args.output_experiments, &slice.experiments)?;
    outputs.reflections(&args.output_reflections, &slice.reflections)?;
    outputs.commit()
}
