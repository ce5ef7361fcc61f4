//! Tool parameters. Each struct can be read from a TOML parameter file; fields left out keep
//! their defaults.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SsxError};
use crate::filter_dose::DoseWindow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FindHitsParams {
    /// Minimum number of spots per sweep.
    pub minspots: usize,
    /// Maximum number of spots per sweep.
    pub maxspots: usize,
    /// Maximum sigma_m in degrees, applied when a fitted profile model is available.
    pub mosaicity_cutoff: f64,
}

impl Default for FindHitsParams {
    fn default() -> Self {
        Self {
            minspots: 20,
            maxspots: 100_000,
            mosaicity_cutoff: 1.0,
        }
    }
}

impl FindHitsParams {
    pub fn validate(&self) -> Result<()> {
        if !self.mosaicity_cutoff.is_finite() || self.mosaicity_cutoff < 0.0 {
            return Err(SsxError::config(
                "mosaicity_cutoff",
                format!("must be a finite value >= 0, got {}", self.mosaicity_cutoff),
            ));
        }
        if self.maxspots < self.minspots {
            return Err(SsxError::config(
                "maxspots",
                format!(
                    "maxspots={} is below minspots={}",
                    self.maxspots, self.minspots
                ),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterDoseParams {
    /// Image offsets `[min, max]` relative to the first image of each sweep.
    pub dose: Option<[u32; 2]>,
}

impl FilterDoseParams {
    pub fn window(&self) -> Result<DoseWindow> {
        let [min, max] = self
            .dose
            .ok_or_else(|| SsxError::config("dose", "must be set"))?;
        DoseWindow::new(min, max)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SplitParams {
    /// Number of images per oscillation.
    pub nimages: Option<usize>,
}

impl SplitParams {
    pub fn chunk_size(&self) -> Result<usize> {
        match self.nimages {
            None => Err(SsxError::config("nimages", "must be set")),
            Some(0) => Err(SsxError::config("nimages", "must be at least 1")),
            Some(n) => Ok(n),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CombineParams {
    /// Position of the experiment whose models become the shared reference.
    pub model: usize,
}

impl CombineParams {
    pub fn reference_position(&self, len: usize) -> Result<usize> {
        if self.model >= len {
            return Err(SsxError::ModelIndexOutOfRange {
                index: self.model,
                len,
            });
        }
        Ok(self.model)
    }
}

/// Reads parameters from a TOML file, or returns the defaults when no file is given.
pub fn load_params<P>(path: Option<&Path>) -> Result<P>
where
    P: DeserializeOwned + Default,
{
    let Some(path) = path else {
        return Ok(P::default());
    };
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// `key = value` lines for every parameter that differs from its default.
pub fn modified_parameters<P>(params: &P) -> Result<Vec<String>>
where
    P: Serialize + Default,
{
    let current = toml::Value::try_from(params)?;
    let defaults = toml::Value::try_from(P::default())?;
    let (Some(current), Some(defaults)) = (current.as_table(), defaults.as_table()) else {
        return Ok(Vec::new());
    };
    Ok(current
        .iter()
        .filter(|(key, value)| defaults.get(key.as_str()) != Some(*value))
        .map(|(key, value)| format!("{key} = {value}"))
        .collect())
}
