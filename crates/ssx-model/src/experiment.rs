use std::ops::Index;
use std::sync::Arc;

use crate::models::{Beam, Crystal, Detector, Goniometer, Profile};
use crate::scan::{ImageSet, Scan};

/// One rotation sweep. Instrument models and the crystal are shared through `Arc`; replacing
/// a model means replacing the reference, never mutating through it.
#[derive(Debug, Clone, Default)]
pub struct Experiment {
    pub identifier: String,
    pub beam: Option<Arc<Beam>>,
    pub detector: Option<Arc<Detector>>,
    pub goniometer: Option<Arc<Goniometer>>,
    pub scan: Option<Scan>,
    pub imageset: Option<ImageSet>,
    pub crystal: Option<Arc<Crystal>>,
    pub profile: Option<Profile>,
}

impl Experiment {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            ..Self::default()
        }
    }

    pub fn with_beam(mut self, beam: Arc<Beam>) -> Self {
        self.beam = Some(beam);
        self
    }

    pub fn with_detector(mut self, detector: Arc<Detector>) -> Self {
        self.detector = Some(detector);
        self
    }

    pub fn with_goniometer(mut self, goniometer: Arc<Goniometer>) -> Self {
        self.goniometer = Some(goniometer);
        self
    }

    pub fn with_scan(mut self, scan: Scan) -> Self {
        self.scan = Some(scan);
        self
    }

    pub fn with_imageset(mut self, imageset: ImageSet) -> Self {
        self.imageset = Some(imageset);
        self
    }

    pub fn with_crystal(mut self, crystal: Arc<Crystal>) -> Self {
        self.crystal = Some(crystal);
        self
    }

    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.profile = Some(profile);
        self
    }

    /// True when both experiments hold the same beam, detector and goniometer instances.
    pub fn shares_instrument_with(&self, other: &Experiment) -> bool {
        same_instance(&self.beam, &other.beam)
            && same_instance(&self.detector, &other.detector)
            && same_instance(&self.goniometer, &other.goniometer)
    }
}

pub fn same_instance<T>(a: &Option<Arc<T>>, b: &Option<Arc<T>>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => Arc::ptr_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}

/// Ordered experiments. An experiment's position in the list is the key reflections use to
/// refer to it, so positions are always `0..len`.
#[derive(Debug, Clone, Default)]
pub struct ExperimentList {
    experiments: Vec<Experiment>,
}

impl ExperimentList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            experiments: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, experiment: Experiment) {
        self.experiments.push(experiment);
    }

    pub fn len(&self) -> usize {
        self.experiments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.experiments.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&Experiment> {
        self.experiments.get(position)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Experiment> {
        self.experiments.iter()
    }

    pub fn as_slice(&self) -> &[Experiment] {
        &self.experiments
    }

    pub fn identifiers(&self) -> Vec<&str> {
        self.experiments
            .iter()
            .map(|experiment| experiment.identifier.as_str())
            .collect()
    }
}

impl Index<usize> for ExperimentList {
    type Output = Experiment;

    fn index(&self, position: usize) -> &Self::Output {
        &self.experiments[position]
    }
}

impl FromIterator<Experiment> for ExperimentList {
    fn from_iter<I: IntoIterator<Item = Experiment>>(iter: I) -> Self {
        Self {
            experiments: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for ExperimentList {
    type Item = Experiment;
    type IntoIter = std::vec::IntoIter<Experiment>;

    fn into_iter(self) -> Self::IntoIter {
        self.experiments.into_iter()
    }
}

impl<'a> IntoIterator for &'a ExperimentList {
    type Item = &'a Experiment;
    type IntoIter = std::slice::Iter<'a, Experiment>;

    fn into_iter(self) -> Self::IntoIter {
        self.experiments.iter()
    }
}
