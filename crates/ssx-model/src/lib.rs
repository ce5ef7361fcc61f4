pub mod errors;
pub mod experiment;
pub mod frames;
pub mod models;
pub mod reflections;
pub mod scan;
pub mod serialization;

pub use errors::ModelError;
pub use experiment::{same_instance, Experiment, ExperimentList};
pub use frames::{frame_to_image, ArrayRange, ImageRange};
pub use models::{Beam, Crystal, Detector, Goniometer, Panel, Profile};
pub use reflections::{FrameStats, ReflectionFlags, ReflectionTable};
pub use scan::{ImageSet, Oscillation, Scan};
pub use serialization::{read_experiments, read_reflections, write_experiments, write_reflections};
