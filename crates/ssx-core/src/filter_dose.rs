use ssx_model::{frame_to_image, ExperimentList, ImageRange, ReflectionTable};
use tracing::{debug, info, warn};

use crate::config::FilterDoseParams;
use crate::error::{Result, SsxError};

/// Image offsets counted from the first image of each sweep: offset 1 is the sweep's first
/// image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DoseWindow {
    min: u32,
    max: u32,
}

impl DoseWindow {
    pub fn new(min: u32, max: u32) -> Result<Self> {
        if min > max {
            return Err(SsxError::config(
                "dose",
                format!("dose_min={min} exceeds dose_max={max}, the window is empty for every experiment"),
            ));
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> u32 {
        self.min
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    /// Absolute bounds `(lo, hi)` clamped to `available`:
    /// `lo = max(min + first - 1, first)`, `hi = min(max + first - 1, last)`.
    pub fn bounds(&self, available: &ImageRange) -> (u64, u64) {
        let first = u64::from(available.first());
        let last = u64::from(available.last());
        let lo = (u64::from(self.min) + first - 1).max(first);
        let hi = (u64::from(self.max) + first - 1).min(last);
        (lo, hi)
    }

    /// The absolute image range selected from `available`, or `None` when the window misses
    /// every image.
    pub fn image_range_for(&self, available: &ImageRange) -> Result<Option<ImageRange>> {
        let (lo, hi) = self.bounds(available);
        if lo > hi {
            return Ok(None);
        }
        Ok(Some(ImageRange::new(lo as u32, hi as u32)?))
    }

    /// Empty range placed where the window starts, used when nothing of `available` is kept.
    fn empty_range_for(&self, available: &ImageRange) -> Result<ImageRange> {
        let (lo, _) = self.bounds(available);
        let anchor = lo.min(u64::from(available.last()) + 1);
        Ok(ImageRange::empty_at(anchor as u32)?)
    }
}

#[derive(Debug, Clone)]
pub struct DoseSlice {
    pub experiments: ExperimentList,
    pub reflections: ReflectionTable,
    /// Absolute image range kept for each experiment, `None` where the window kept nothing.
    pub windows: Vec<Option<ImageRange>>,
}

/// Truncates every experiment to the images inside the dose window and drops reflections
/// recorded outside it. Experiments are never removed; one the window misses entirely is
/// left with an empty scan and image set.
pub fn filter_dose(
    experiments: &ExperimentList,
    reflections: &ReflectionTable,
    params: &FilterDoseParams,
) -> Result<DoseSlice> {
    let window = params.window()?;
    let rows_by_experiment = reflections.rows_by_experiment(experiments.len())?;
    let frames = reflections.frames()?;

    let mut sliced = ExperimentList::with_capacity(experiments.len());
    let mut windows = Vec::with_capacity(experiments.len());
    let mut keep_rows = Vec::new();

    for (position, (experiment, rows)) in experiments.iter().zip(&rows_by_experiment).enumerate() {
        let scan = experiment
            .scan
            .as_ref()
            .ok_or(SsxError::MissingScan { position })?;
        let available = scan.image_range();
        let images = window.image_range_for(&available)?;

        let target = match images {
            Some(images) => {
                debug!(position, %available, %images, "dose window");
                images
            }
            None => {
                warn!(
                    position,
                    %available,
                    "dose window [{}, {}] selects no images; experiment left empty",
                    window.min(),
                    window.max()
                );
                window.empty_range_for(&available)?
            }
        };

        let mut truncated = experiment.clone();
        truncated.scan = Some(scan.sliced_to_images(&target)?);
        truncated.imageset = experiment
            .imageset
            .as_ref()
            .map(|imageset| imageset.slice_images(&target))
            .transpose()?;
        sliced.push(truncated);

        for &row in rows {
            let z = frames[row];
            match images {
                Some(images) if images.contains_frame(z) => keep_rows.push(row),
                _ => debug!(
                    position,
                    row,
                    image = frame_to_image(z),
                    "reflection outside dose window"
                ),
            }
        }
        windows.push(images);
    }

    let kept = reflections.take(&keep_rows)?;

    if let Some(stats) = reflections.frame_stats()? {
        info!("Frame coordinates before dose filter: {stats}");
    }
    if let Some(stats) = kept.frame_stats()? {
        info!("Frame coordinates after dose filter: {stats}");
    }
    info!(
        "{} reflections out of {} remaining after filtering for dose",
        kept.len(),
        reflections.len()
    );

    Ok(DoseSlice {
        experiments: sliced,
        reflections: kept,
        windows,
    })
}
