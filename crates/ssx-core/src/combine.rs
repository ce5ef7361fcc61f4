use ssx_model::{Experiment, ExperimentList};
use tracing::info;

use crate::config::CombineParams;
use crate::error::Result;

/// Points every experiment at the beam, detector and goniometer instances of the experiment
/// at `params.model`. Everything else an experiment holds is carried over as is.
pub fn combine_models(experiments: &ExperimentList, params: &CombineParams) -> Result<ExperimentList> {
    let position = params.reference_position(experiments.len())?;
    let reference = &experiments[position];

    let combined: ExperimentList = experiments
        .iter()
        .map(|experiment| Experiment {
            beam: reference.beam.clone(),
            detector: reference.detector.clone(),
            goniometer: reference.goniometer.clone(),
            ..experiment.clone()
        })
        .collect();

    info!(
        "Combined {} experiments onto the instrument models of experiment {}",
        combined.len(),
        position
    );
    Ok(combined)
}
