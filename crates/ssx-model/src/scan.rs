use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::frames::{ArrayRange, ImageRange};

/// Rotation of the first image and per-image rotation width, both in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Oscillation {
    pub start: f64,
    pub width: f64,
}

impl Oscillation {
    pub fn new(start: f64, width: f64) -> Self {
        Self { start, width }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scan {
    image_range: ImageRange,
    oscillation: Oscillation,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    exposure_times: Vec<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    epochs: Vec<f64>,
}

impl Scan {
    pub fn new(image_range: ImageRange, oscillation: Oscillation) -> Self {
        Self {
            image_range,
            oscillation,
            exposure_times: Vec::new(),
            epochs: Vec::new(),
        }
    }

    pub fn with_exposure_times(mut self, exposure_times: Vec<f64>) -> Result<Self, ModelError> {
        self.exposure_times = exposure_times;
        self.validate()?;
        Ok(self)
    }

    pub fn with_epochs(mut self, epochs: Vec<f64>) -> Result<Self, ModelError> {
        self.epochs = epochs;
        self.validate()?;
        Ok(self)
    }

    /// Checks that per-image arrays are either absent or one entry per image.
    pub fn validate(&self) -> Result<(), ModelError> {
        let expected = self.num_images();
        for (field, values) in [
            ("exposure_times", &self.exposure_times),
            ("epochs", &self.epochs),
        ] {
            if !values.is_empty() && values.len() != expected {
                return Err(ModelError::PerImageLength {
                    field,
                    expected,
                    found: values.len(),
                });
            }
        }
        Ok(())
    }

    pub fn image_range(&self) -> ImageRange {
        self.image_range
    }

    pub fn array_range(&self) -> ArrayRange {
        self.image_range.array_range()
    }

    pub fn num_images(&self) -> usize {
        self.image_range.len()
    }

    pub fn is_empty(&self) -> bool {
        self.image_range.is_empty()
    }

    pub fn oscillation(&self) -> Oscillation {
        self.oscillation
    }

    pub fn set_oscillation(&mut self, oscillation: Oscillation) {
        self.oscillation = oscillation;
    }

    pub fn exposure_times(&self) -> &[f64] {
        &self.exposure_times
    }

    pub fn epochs(&self) -> &[f64] {
        &self.epochs
    }

    /// Rotation angles at the start of the first image and the end of the last one.
    pub fn angle_range(&self) -> (f64, f64) {
        let Oscillation { start, width } = self.oscillation;
        (start, start + width * self.num_images() as f64)
    }

    /// Truncates to the local half-open index range `local`. The oscillation start moves with
    /// the first retained image.
    pub fn slice(&self, local: Range<usize>) -> Result<Scan, ModelError> {
        let image_range = self.image_range.local_slice(local.clone())?;
        let oscillation = Oscillation {
            start: self.oscillation.start + local.start as f64 * self.oscillation.width,
            width: self.oscillation.width,
        };
        Ok(Scan {
            image_range,
            oscillation,
            exposure_times: slice_per_image(&self.exposure_times, &local),
            epochs: slice_per_image(&self.epochs, &local),
        })
    }

    /// Truncates to the 1-based inclusive image range `images`.
    pub fn sliced_to_images(&self, images: &ImageRange) -> Result<Scan, ModelError> {
        let local = self.image_range.local_indices(images)?;
        self.slice(local)
    }
}

fn slice_per_image(values: &[f64], local: &Range<usize>) -> Vec<f64> {
    if values.is_empty() {
        Vec::new()
    } else {
        values[local.clone()].to_vec()
    }
}

/// A contiguous run of raw detector frames, addressed by image number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSet {
    template: String,
    image_range: ImageRange,
}

impl ImageSet {
    pub fn new(template: impl Into<String>, image_range: ImageRange) -> Self {
        Self {
            template: template.into(),
            image_range,
        }
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn image_range(&self) -> ImageRange {
        self.image_range
    }

    pub fn len(&self) -> usize {
        self.image_range.len()
    }

    pub fn is_empty(&self) -> bool {
        self.image_range.is_empty()
    }

    /// Frames at local half-open indices `local`.
    pub fn slice(&self, local: Range<usize>) -> Result<ImageSet, ModelError> {
        let len = self.len();
        let image_range =
            self.image_range
                .local_slice(local.clone())
                .map_err(|_| ModelError::SliceOutOfBounds {
                    what: "image set",
                    start: local.start,
                    end: local.end,
                    len,
                })?;
        Ok(ImageSet {
            template: self.template.clone(),
            image_range,
        })
    }

    /// Frames with 1-based image numbers in the inclusive range `images`.
    pub fn slice_images(&self, images: &ImageRange) -> Result<ImageSet, ModelError> {
        if !self.image_range.contains_range(images) {
            return Err(ModelError::ImagesOutOfRange {
                what: "image set",
                requested: *images,
                available: self.image_range,
            });
        }
        Ok(ImageSet {
            template: self.template.clone(),
            image_range: *images,
        })
    }

    /// File path of one image: the first run of `#` in the template is replaced by the
    /// zero-padded image number. Container formats without a `#` return the template itself.
    pub fn path_for(&self, image: u32) -> Option<String> {
        if !self.image_range.contains(image) {
            return None;
        }
        let Some(start) = self.template.find('#') else {
            return Some(self.template.clone());
        };
        let width = self.template[start..]
            .bytes()
            .take_while(|byte| *byte == b'#')
            .count();
        Some(format!(
            "{}{:0width$}{}",
            &self.template[..start],
            image,
            &self.template[start + width..],
            width = width
        ))
    }
}
