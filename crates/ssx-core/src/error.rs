// crates/ssx-core/src/error.rs

use ssx_model::ModelError;
use thiserror::Error;

/// Broad classes of failure; every one aborts the run before any output is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A parameter is malformed or out of range.
    Configuration,
    /// The input collections disagree with each other or with what the transform needs.
    InputConsistency,
    /// Reading or writing storage failed.
    Io,
}

#[derive(Error, Debug)]
pub enum SsxError {
    #[error("invalid parameter {name}: {reason}")]
    Config { name: &'static str, reason: String },

    #[error("model={index} is not a valid experiment position (input has {len} experiments)")]
    ModelIndexOutOfRange { index: usize, len: usize },

    #[error("expected exactly one experiment, found {found}")]
    ExpectedSingleExperiment { found: usize },

    #[error("experiment {position} has no scan")]
    MissingScan { position: usize },

    #[error("experiment {position} image set spans {imageset_images} images but its scan spans {scan_images}")]
    ImageSetMismatch {
        position: usize,
        imageset_images: usize,
        scan_images: usize,
    },

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("parameter file could not be parsed: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("parameters could not be serialized: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SsxError {
    pub fn config(name: &'static str, reason: impl Into<String>) -> Self {
        SsxError::Config {
            name,
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            SsxError::Config { .. }
            | SsxError::ModelIndexOutOfRange { .. }
            | SsxError::TomlDe(_)
            | SsxError::TomlSer(_) => ErrorKind::Configuration,
            SsxError::ExpectedSingleExperiment { .. }
            | SsxError::MissingScan { .. }
            | SsxError::ImageSetMismatch { .. } => ErrorKind::InputConsistency,
            SsxError::Model(err) if err.is_consistency_error() => ErrorKind::InputConsistency,
            SsxError::Model(_) | SsxError::Io(_) => ErrorKind::Io,
        }
    }
}

pub type Result<T> = std::result::Result<T, SsxError>;
