use std::sync::Arc;

use ssx_model::{Experiment, ExperimentList};
use tracing::{debug, info, warn};

use crate::config::SplitParams;
use crate::error::{Result, SsxError};

/// The only experiment of `experiments`.
pub fn sole_experiment(experiments: &ExperimentList) -> Result<&Experiment> {
    match experiments.as_slice() {
        [experiment] => Ok(experiment),
        others => Err(SsxError::ExpectedSingleExperiment {
            found: others.len(),
        }),
    }
}

/// Cuts one sweep into consecutive sweeps of `nimages` images (the last may be shorter),
/// identified "1", "2", ... Every sweep shares the source's beam, detector, goniometer and
/// crystal, and reports the oscillation of the first sweep so that all of them start at the
/// same rotation angle.
pub fn split_sequence(experiment: &Experiment, params: &SplitParams) -> Result<ExperimentList> {
    let chunk = params.chunk_size()?;
    let scan = experiment
        .scan
        .as_ref()
        .ok_or(SsxError::MissingScan { position: 0 })?;
    let total_images = scan.num_images();

    if let Some(imageset) = &experiment.imageset {
        if imageset.len() != total_images {
            return Err(SsxError::ImageSetMismatch {
                position: 0,
                imageset_images: imageset.len(),
                scan_images: total_images,
            });
        }
    }

    let reference = scan.slice(0..chunk.min(total_images))?.oscillation();

    let mut sweeps = ExperimentList::with_capacity(total_images.div_ceil(chunk));
    for (index, start) in (0..total_images).step_by(chunk).enumerate() {
        let local = start..(start + chunk).min(total_images);

        let mut sweep_scan = scan.slice(local.clone())?;
        sweep_scan.set_oscillation(reference);

        let imageset = experiment
            .imageset
            .as_ref()
            .map(|imageset| imageset.slice(local))
            .transpose()?;

        if let Some(first_image) = imageset
            .as_ref()
            .and_then(|imageset| imageset.path_for(imageset.image_range().first()))
        {
            debug!("Sweep {} starts at {}", index + 1, first_image);
        }

        sweeps.push(Experiment {
            identifier: (index + 1).to_string(),
            beam: experiment.beam.as_ref().map(Arc::clone),
            detector: experiment.detector.as_ref().map(Arc::clone),
            goniometer: experiment.goniometer.as_ref().map(Arc::clone),
            scan: Some(sweep_scan),
            imageset,
            crystal: experiment.crystal.as_ref().map(Arc::clone),
            profile: None,
        });
    }

    if sweeps.is_empty() {
        warn!("Sequence has no images; no sweeps produced");
    }
    info!(
        "Chopped sequence of {} images into {} sweeps of {} images each",
        total_images,
        sweeps.len(),
        chunk
    );

    Ok(sweeps)
}
