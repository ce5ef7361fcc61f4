use std::fmt;

use ssx_model::{Experiment, ExperimentList, ReflectionFlags, ReflectionTable};
use tracing::{info, warn};

use crate::config::FindHitsParams;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Verdict {
    Kept { new_position: usize, spots: usize },
    MosaicityAboveCutoff { sigma_m: f64 },
    TooFewSpots { spots: usize },
    TooManySpots { spots: usize },
}

impl Verdict {
    pub fn is_kept(&self) -> bool {
        matches!(self, Verdict::Kept { .. })
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Kept {
                new_position,
                spots,
            } => write!(f, "kept as experiment {new_position} with {spots} spots"),
            Verdict::MosaicityAboveCutoff { sigma_m } => {
                write!(f, "rejected: mosaicity {sigma_m} above cutoff")
            }
            Verdict::TooFewSpots { spots } => write!(
                f,
                "rejected: {spots} is fewer than the minimum number of spots"
            ),
            Verdict::TooManySpots { spots } => write!(
                f,
                "rejected: {spots} exceeds the maximum number of spots"
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HitSelection {
    pub experiments: ExperimentList,
    pub reflections: ReflectionTable,
    /// One verdict per input experiment, in input order.
    pub verdicts: Vec<Verdict>,
    /// Whether only indexed reflections were counted.
    pub indexed_only: bool,
}

impl HitSelection {
    pub fn hit_count(&self) -> usize {
        self.experiments.len()
    }

    pub fn hit_rate(&self) -> f64 {
        if self.verdicts.is_empty() {
            0.0
        } else {
            self.hit_count() as f64 / self.verdicts.len() as f64
        }
    }
}

/// Mosaicity is checked first, then the closed spot-count range `[minspots, maxspots]`.
fn judge(experiment: &Experiment, spots: usize, params: &FindHitsParams) -> Option<Verdict> {
    if let Some(profile) = &experiment.profile {
        if profile.sigma_m() > params.mosaicity_cutoff {
            return Some(Verdict::MosaicityAboveCutoff {
                sigma_m: profile.sigma_m(),
            });
        }
    }
    if spots < params.minspots {
        return Some(Verdict::TooFewSpots { spots });
    }
    if spots > params.maxspots {
        return Some(Verdict::TooManySpots { spots });
    }
    None
}

/// Keeps the experiments that pass the mosaicity and spot-count checks and renumbers them,
/// with their reflections, to consecutive positions from 0 in their original order.
///
/// When any reflection is flagged as indexed, only indexed reflections are counted and kept,
/// for every experiment alike. Owners are checked on the counted rows only, so unindexed
/// rows without an experiment (`id = -1`) are dropped rather than rejected.
pub fn find_hits(
    experiments: &ExperimentList,
    reflections: &ReflectionTable,
    params: &FindHitsParams,
) -> Result<HitSelection> {
    params.validate()?;

    let n_indexed = reflections.count_flagged(ReflectionFlags::INDEXED)?;
    let indexed_only = n_indexed > 0;
    let candidates = if indexed_only {
        info!(
            "Keeping indexed reflections only ({} / {})",
            n_indexed,
            reflections.len()
        );
        reflections.select_flagged(ReflectionFlags::INDEXED)?
    } else {
        info!("These are unindexed reflections");
        reflections.clone()
    };

    let rows_by_experiment = candidates.rows_by_experiment(experiments.len())?;

    let mut kept = ExperimentList::new();
    let mut keep_rows = Vec::new();
    let mut new_ids = Vec::new();
    let mut verdicts = Vec::with_capacity(experiments.len());

    for (position, (experiment, rows)) in experiments.iter().zip(&rows_by_experiment).enumerate() {
        let spots = rows.len();
        let verdict = match judge(experiment, spots, params) {
            Some(rejection) => {
                info!("Experiment {position} {rejection}");
                rejection
            }
            None => {
                let new_position = kept.len();
                keep_rows.extend_from_slice(rows);
                new_ids.extend(std::iter::repeat(new_position as i32).take(spots));
                kept.push(experiment.clone());
                Verdict::Kept {
                    new_position,
                    spots,
                }
            }
        };
        verdicts.push(verdict);
    }

    let kept_reflections = candidates.take(&keep_rows)?.with_ids(new_ids)?;

    let selection = HitSelection {
        experiments: kept,
        reflections: kept_reflections,
        verdicts,
        indexed_only,
    };

    if selection.hit_count() == 0 {
        warn!("No experiments passed the hit criteria");
    }
    info!(
        "Found {} hits ({}/{} = {:.1}%)",
        selection.hit_count(),
        selection.hit_count(),
        experiments.len(),
        selection.hit_rate() * 100.0
    );

    Ok(selection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ssx_model::Profile;

    fn with_sigma_m(sigma_m: f64) -> Experiment {
        Experiment::new("x").with_profile(Profile {
            sigma_b: 0.01,
            sigma_m,
        })
    }

    #[test]
    fn spot_range_is_closed() {
        let params = FindHitsParams {
            minspots: 10,
            maxspots: 10,
            mosaicity_cutoff: 1.0,
        };
        let experiment = Experiment::new("x");
        assert_eq!(judge(&experiment, 10, &params), None);
        assert_eq!(
            judge(&experiment, 9, &params),
            Some(Verdict::TooFewSpots { spots: 9 })
        );
        assert_eq!(
            judge(&experiment, 11, &params),
            Some(Verdict::TooManySpots { spots: 11 })
        );
    }

    #[test]
    fn mosaicity_is_reported_before_spot_counts() {
        let params = FindHitsParams::default();
        assert_eq!(
            judge(&with_sigma_m(1.5), 0, &params),
            Some(Verdict::MosaicityAboveCutoff { sigma_m: 1.5 })
        );
        assert_eq!(judge(&with_sigma_m(1.0), 50, &params), None);
    }

    #[test]
    fn missing_profile_never_fails_mosaicity() {
        let params = FindHitsParams {
            mosaicity_cutoff: 0.0,
            ..FindHitsParams::default()
        };
        assert_eq!(judge(&Experiment::new("x"), 50, &params), None);
    }
}
