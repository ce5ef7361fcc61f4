use serde::{Deserialize, Serialize};

/// Incident beam. Shared between experiments through `Arc`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Beam {
    pub wavelength: f64,
    pub direction: [f64; 3],
    #[serde(default)]
    pub divergence: f64,
    #[serde(default)]
    pub sigma_divergence: f64,
}

impl Beam {
    pub fn new(wavelength: f64, direction: [f64; 3]) -> Self {
        Self {
            wavelength,
            direction,
            divergence: 0.0,
            sigma_divergence: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Panel {
    pub name: String,
    pub origin: [f64; 3],
    pub fast_axis: [f64; 3],
    pub slow_axis: [f64; 3],
    pub pixel_size: [f64; 2],
    pub image_size: [u32; 2],
    #[serde(default)]
    pub trusted_range: Option<[f64; 2]>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detector {
    pub panels: Vec<Panel>,
}

impl Detector {
    pub fn single_panel(panel: Panel) -> Self {
        Self {
            panels: vec![panel],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goniometer {
    pub rotation_axis: [f64; 3],
    #[serde(default = "identity_matrix")]
    pub fixed_rotation: [f64; 9],
    #[serde(default = "identity_matrix")]
    pub setting_rotation: [f64; 9],
}

impl Goniometer {
    pub fn new(rotation_axis: [f64; 3]) -> Self {
        Self {
            rotation_axis,
            fixed_rotation: identity_matrix(),
            setting_rotation: identity_matrix(),
        }
    }
}

/// Per-experiment lattice model, possibly shared by the sweeps cut from one sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Crystal {
    pub unit_cell: [f64; 6],
    pub space_group: String,
    pub a_matrix: [f64; 9],
}

/// Reflection profile model; `sigma_m` is the fitted mosaicity in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub sigma_b: f64,
    pub sigma_m: f64,
}

impl Profile {
    pub fn sigma_m(&self) -> f64 {
        self.sigma_m
    }
}

fn identity_matrix() -> [f64; 9] {
    [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]
}
