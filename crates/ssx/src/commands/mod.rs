// crates/ssx/src/commands/mod.rs

pub mod combine;
pub mod filter_dose;
pub mod find_hits;
pub mod split_sequence;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use serde::de::DeserializeOwned;
use serde::Serialize;
use ssx_core::config::{load_params, modified_parameters};
use ssx_model::{ExperimentList, ReflectionTable};
use tempfile::NamedTempFile;
use tracing::info;

/// Options every subcommand accepts.
#[derive(Args, Debug, Default)]
pub struct CommonArgs {
    /// TOML parameter file; command-line flags override its values
    #[arg(long, value_name = "FILE")]
    pub params: Option<PathBuf>,
    /// Log file (defaults to ssx.<command>.log)
    #[arg(long, value_name = "FILE")]
    pub log: Option<PathBuf>,
}

impl CommonArgs {
    pub fn log_file(&self, default: &str) -> PathBuf {
        self.log.clone().unwrap_or_else(|| PathBuf::from(default))
    }

    /// Parameters from `--params` (or defaults), with `overrides` applied on top.
    pub fn resolve<P>(&self, overrides: impl FnOnce(&mut P)) -> Result<P>
    where
        P: Serialize + DeserializeOwned + Default,
    {
        let mut params: P = load_params(self.params.as_deref()).with_context(|| {
            format!(
                "failed to load parameters from {}",
                self.params
                    .as_deref()
                    .map(|path| path.display().to_string())
                    .unwrap_or_default()
            )
        })?;
        overrides(&mut params);

        let modified = modified_parameters(&params)?;
        if !modified.is_empty() {
            info!("The following parameters have been modified:");
            for line in &modified {
                info!("  {line}");
            }
        }
        Ok(params)
    }
}

pub fn read_experiments(path: &Path) -> Result<ExperimentList> {
    let experiments = ssx_model::read_experiments(path)
        .with_context(|| format!("failed to read experiments from {}", path.display()))?;
    info!("Loaded {} experiments from {}", experiments.len(), path.display());
    Ok(experiments)
}

pub fn read_reflections(path: &Path) -> Result<ReflectionTable> {
    let reflections = ssx_model::read_reflections(path)
        .with_context(|| format!("failed to read reflections from {}", path.display()))?;
    info!("Loaded {} reflections from {}", reflections.len(), path.display());
    Ok(reflections)
}

/// Outputs written beside their destinations and moved into place together by `commit`, so a
/// failed write leaves every destination untouched.
#[derive(Default)]
pub struct StagedOutputs {
    staged: Vec<(NamedTempFile, PathBuf)>,
}

impl StagedOutputs {
    pub fn experiments(&mut self, path: &Path, experiments: &ExperimentList) -> Result<()> {
        info!("Saving {} experiments to {}", experiments.len(), path.display());
        let file = staging_file(path)?;
        ssx_model::write_experiments(file.path(), experiments)
            .with_context(|| format!("failed to write experiments to {}", path.display()))?;
        self.staged.push((file, path.to_path_buf()));
        Ok(())
    }

    pub fn reflections(&mut self, path: &Path, reflections: &ReflectionTable) -> Result<()> {
        info!("Saving {} reflections to {}", reflections.len(), path.display());
        let file = staging_file(path)?;
        ssx_model::write_reflections(file.path(), reflections)
            .with_context(|| format!("failed to write reflections to {}", path.display()))?;
        self.staged.push((file, path.to_path_buf()));
        Ok(())
    }

    pub fn commit(self) -> Result<()> {
        for (file, path) in self.staged {
            file.persist(&path)
                .with_context(|| format!("failed to move output into place at {}", path.display()))?;
        }
        Ok(())
    }
}

fn staging_file(path: &Path) -> Result<NamedTempFile> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    NamedTempFile::new_in(dir)
        .with_context(|| format!("failed to create a staging file in {}", dir.display()))
}
