//! On-disk formats: experiment lists as JSON documents with shared models stored once and
//! referenced by index, reflection tables as Parquet.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::sync::Arc;

use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::experiment::{Experiment, ExperimentList};
use crate::models::{Beam, Crystal, Detector, Goniometer, Profile};
use crate::reflections::ReflectionTable;
use crate::scan::{ImageSet, Scan};

const DOCUMENT_ID: &str = "ExperimentList";

#[derive(Debug, Serialize, Deserialize)]
struct ExperimentListDocument {
    #[serde(rename = "__id__")]
    document_id: String,
    experiment: Vec<ExperimentEntry>,
    #[serde(default)]
    beam: Vec<Arc<Beam>>,
    #[serde(default)]
    detector: Vec<Arc<Detector>>,
    #[serde(default)]
    goniometer: Vec<Arc<Goniometer>>,
    #[serde(default)]
    crystal: Vec<Arc<Crystal>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ExperimentEntry {
    identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    beam: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    detector: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    goniometer: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    crystal: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    scan: Option<Scan>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    imageset: Option<ImageSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    profile: Option<Profile>,
}

/// Assigns one list slot per distinct model instance, keyed by `Arc` identity.
struct Interner<T> {
    models: Vec<Arc<T>>,
    slots: HashMap<*const T, usize>,
}

impl<T> Interner<T> {
    fn new() -> Self {
        Self {
            models: Vec::new(),
            slots: HashMap::new(),
        }
    }

    fn intern(&mut self, model: Option<&Arc<T>>) -> Option<usize> {
        let model = model?;
        let key = Arc::as_ptr(model);
        if let Some(slot) = self.slots.get(&key) {
            return Some(*slot);
        }
        let slot = self.models.len();
        self.models.push(Arc::clone(model));
        self.slots.insert(key, slot);
        Some(slot)
    }
}

fn resolve<T>(
    models: &[Arc<T>],
    index: Option<usize>,
    kind: &'static str,
    position: usize,
) -> Result<Option<Arc<T>>, ModelError> {
    let Some(index) = index else {
        return Ok(None);
    };
    models
        .get(index)
        .map(|model| Some(Arc::clone(model)))
        .ok_or(ModelError::ModelIndex {
            kind,
            position,
            index,
            available: models.len(),
        })
}

impl ExperimentList {
    fn to_document(&self) -> ExperimentListDocument {
        let mut beams = Interner::new();
        let mut detectors = Interner::new();
        let mut goniometers = Interner::new();
        let mut crystals = Interner::new();

        let experiment = self
            .iter()
            .map(|experiment| ExperimentEntry {
                identifier: experiment.identifier.clone(),
                beam: beams.intern(experiment.beam.as_ref()),
                detector: detectors.intern(experiment.detector.as_ref()),
                goniometer: goniometers.intern(experiment.goniometer.as_ref()),
                crystal: crystals.intern(experiment.crystal.as_ref()),
                scan: experiment.scan.clone(),
                imageset: experiment.imageset.clone(),
                profile: experiment.profile,
            })
            .collect();

        ExperimentListDocument {
            document_id: DOCUMENT_ID.to_string(),
            experiment,
            beam: beams.models,
            detector: detectors.models,
            goniometer: goniometers.models,
            crystal: crystals.models,
        }
    }

    fn from_document(document: ExperimentListDocument) -> Result<Self, ModelError> {
        if document.document_id != DOCUMENT_ID {
            return Err(ModelError::DocumentType(document.document_id));
        }

        let mut experiments = ExperimentList::with_capacity(document.experiment.len());
        for (position, entry) in document.experiment.into_iter().enumerate() {
            if let Some(scan) = &entry.scan {
                scan.validate()?;
            }
            experiments.push(Experiment {
                identifier: entry.identifier,
                beam: resolve(&document.beam, entry.beam, "beam", position)?,
                detector: resolve(&document.detector, entry.detector, "detector", position)?,
                goniometer: resolve(
                    &document.goniometer,
                    entry.goniometer,
                    "goniometer",
                    position,
                )?,
                scan: entry.scan,
                imageset: entry.imageset,
                crystal: resolve(&document.crystal, entry.crystal, "crystal", position)?,
                profile: entry.profile,
            });
        }
        Ok(experiments)
    }

    pub fn to_writer<W: Write>(&self, writer: W) -> Result<(), ModelError> {
        serde_json::to_writer_pretty(writer, &self.to_document())?;
        Ok(())
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ModelError> {
        let document: ExperimentListDocument = serde_json::from_reader(reader)?;
        Self::from_document(document)
    }
}

pub fn read_experiments(path: &Path) -> Result<ExperimentList, ModelError> {
    let file = File::open(path)?;
    ExperimentList::from_reader(BufReader::new(file))
}

pub fn write_experiments(path: &Path, experiments: &ExperimentList) -> Result<(), ModelError> {
    let mut writer = BufWriter::new(File::create(path)?);
    experiments.to_writer(&mut writer)?;
    writer.flush()?;
    Ok(())
}

pub fn read_reflections(path: &Path) -> Result<ReflectionTable, ModelError> {
    let file = File::open(path)?;
    let df = ParquetReader::new(file).finish()?;
    ReflectionTable::new(df)
}

pub fn write_reflections(path: &Path, reflections: &ReflectionTable) -> Result<(), ModelError> {
    let file = File::create(path)?;
    let mut df = reflections.df().clone();
    ParquetWriter::new(file).finish(&mut df)?;
    Ok(())
}
