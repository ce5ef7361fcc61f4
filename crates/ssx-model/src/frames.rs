//! Conversions between the two frame-numbering conventions used by scans, image sets and
//! reflections.
//!
//! * An [`ImageRange`] counts images from 1 and includes both ends: `[first, last]`.
//! * An [`ArrayRange`] counts array slots from 0 and excludes the end: `[start, end)`. For an
//!   image range `[first, last]` it is `[first - 1, last)`, so image `n` occupies the array
//!   slot `n - 1` and a spot observed on image `n` has a frame coordinate `z` in `[n - 1, n)`.
//!
//! Local indices are offsets from the first image of a range and are what slicing operations
//! take; they are half-open like array ranges.

use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "[u32; 2]", try_from = "[u32; 2]")]
pub struct ImageRange {
    first: u32,
    last: u32,
}

impl ImageRange {
    pub fn new(first: u32, last: u32) -> Result<Self, ModelError> {
        if first == 0 || u64::from(last) + 1 < u64::from(first) {
            return Err(ModelError::InvalidImageRange { first, last });
        }
        Ok(Self { first, last })
    }

    /// An empty range positioned just before image `first`.
    pub fn empty_at(first: u32) -> Result<Self, ModelError> {
        Self::new(first, first.saturating_sub(1))
    }

    pub fn first(&self) -> u32 {
        self.first
    }

    pub fn last(&self) -> u32 {
        self.last
    }

    pub fn len(&self) -> usize {
        (u64::from(self.last) + 1 - u64::from(self.first)) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, image: u32) -> bool {
        image >= self.first && image <= self.last
    }

    pub fn contains_range(&self, other: &ImageRange) -> bool {
        other.first >= self.first && other.last <= self.last
    }

    pub fn array_range(&self) -> ArrayRange {
        ArrayRange {
            start: self.first - 1,
            end: self.last,
        }
    }

    /// True when a frame coordinate lies on one of the images of this range.
    pub fn contains_frame(&self, z: f64) -> bool {
        let array = self.array_range();
        z >= f64::from(array.start) && z < f64::from(array.end)
    }

    /// Local half-open indices `[beg, end)` of `sub` within this range, computed as
    /// `beg = sub.first - 1 - array_start` and `end = sub.last - array_start`.
    pub fn local_indices(&self, sub: &ImageRange) -> Result<Range<usize>, ModelError> {
        if !self.contains_range(sub) {
            return Err(ModelError::ImagesOutOfRange {
                what: "image range",
                requested: *sub,
                available: *self,
            });
        }
        let array_start = self.array_range().start as usize;
        let beg = sub.first as usize - 1 - array_start;
        let end = sub.last as usize - array_start;
        Ok(beg..end)
    }

    /// The image range covered by the local half-open slice `local`.
    pub fn local_slice(&self, local: Range<usize>) -> Result<ImageRange, ModelError> {
        let len = self.len();
        if local.start > local.end || local.end > len {
            return Err(ModelError::SliceOutOfBounds {
                what: "image range",
                start: local.start,
                end: local.end,
                len,
            });
        }
        let first = u64::from(self.first) + local.start as u64;
        let last = u64::from(self.first) + local.end as u64 - 1;
        Self::new(first as u32, last as u32)
    }
}

impl fmt::Display for ImageRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.first, self.last)
    }
}

impl From<ImageRange> for [u32; 2] {
    fn from(range: ImageRange) -> Self {
        [range.first, range.last]
    }
}

impl TryFrom<[u32; 2]> for ImageRange {
    type Error = ModelError;

    fn try_from(value: [u32; 2]) -> Result<Self, Self::Error> {
        ImageRange::new(value[0], value[1])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArrayRange {
    pub start: u32,
    pub end: u32,
}

impl ArrayRange {
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn image_range(&self) -> Result<ImageRange, ModelError> {
        ImageRange::new(self.start + 1, self.end)
    }
}

/// Image number (1-based) on which a frame coordinate lies.
pub fn frame_to_image(z: f64) -> i64 {
    z.floor() as i64 + 1
}
