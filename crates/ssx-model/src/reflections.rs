use std::fmt;
use std::ops::BitOr;

use polars::prelude::*;

use crate::errors::ModelError;

pub const ID_COLUMN: &str = "id";
pub const FLAGS_COLUMN: &str = "flags";
pub const XYZOBS_PX_COLUMNS: [&str; 3] = ["xyzobs.px.x", "xyzobs.px.y", "xyzobs.px.z"];

/// Bits of the reflection `flags` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReflectionFlags(u64);

impl ReflectionFlags {
    pub const PREDICTED: Self = Self(1 << 0);
    pub const OBSERVED: Self = Self(1 << 1);
    pub const INDEXED: Self = Self(1 << 2);
    pub const USED_IN_REFINEMENT: Self = Self(1 << 3);
    pub const STRONG: Self = Self(1 << 5);
    pub const INTEGRATED_SUM: Self = Self(1 << 8);
    pub const INTEGRATED_PRF: Self = Self(1 << 9);

    pub const fn bits(self) -> u64 {
        self.0
    }

    pub const fn empty() -> Self {
        Self(0)
    }

    pub fn is_set_in(self, flags: u64) -> bool {
        flags & self.0 == self.0
    }
}

impl BitOr for ReflectionFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl fmt::Display for FrameStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "min {:.3}, max {:.3}, mean {:.3}",
            self.min, self.max, self.mean
        )
    }
}

/// Observed spots. Each row belongs to the experiment whose position equals its `id`; the
/// third `xyzobs.px` component is the frame coordinate in array-range units. Columns beyond
/// the required ones ride along through every selection.
#[derive(Debug, Clone)]
pub struct ReflectionTable {
    df: DataFrame,
}

impl ReflectionTable {
    pub fn new(df: DataFrame) -> Result<Self, ModelError> {
        require_column(&df, ID_COLUMN, &DataType::Int32)?;
        require_column(&df, FLAGS_COLUMN, &DataType::UInt64)?;
        for column in XYZOBS_PX_COLUMNS {
            require_column(&df, column, &DataType::Float64)?;
        }
        Ok(Self { df })
    }

    pub fn from_columns(
        ids: Vec<i32>,
        xyzobs_px: &[[f64; 3]],
        flags: Vec<u64>,
    ) -> Result<Self, ModelError> {
        let component = |axis: usize| -> Vec<f64> { xyzobs_px.iter().map(|xyz| xyz[axis]).collect() };
        let df = DataFrame::new(vec![
            Series::new(ID_COLUMN.into(), ids).into(),
            Series::new(FLAGS_COLUMN.into(), flags).into(),
            Series::new(XYZOBS_PX_COLUMNS[0].into(), component(0)).into(),
            Series::new(XYZOBS_PX_COLUMNS[1].into(), component(1)).into(),
            Series::new(XYZOBS_PX_COLUMNS[2].into(), component(2)).into(),
        ])?;
        Self::new(df)
    }

    pub fn len(&self) -> usize {
        self.df.height()
    }

    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    pub fn df(&self) -> &DataFrame {
        &self.df
    }

    pub fn ids(&self) -> Result<Vec<i32>, ModelError> {
        let ca = self.df.column(ID_COLUMN)?.i32()?;
        ca.into_iter()
            .enumerate()
            .map(|(row, value)| value.ok_or(ModelError::NullValue { column: ID_COLUMN, row }))
            .collect()
    }

    pub fn flags(&self) -> Result<Vec<u64>, ModelError> {
        let ca = self.df.column(FLAGS_COLUMN)?.u64()?;
        ca.into_iter()
            .enumerate()
            .map(|(row, value)| {
                value.ok_or(ModelError::NullValue {
                    column: FLAGS_COLUMN,
                    row,
                })
            })
            .collect()
    }

    /// Frame coordinates (`xyzobs.px.z`).
    pub fn frames(&self) -> Result<Vec<f64>, ModelError> {
        let column = XYZOBS_PX_COLUMNS[2];
        let ca = self.df.column(column)?.f64()?;
        ca.into_iter()
            .enumerate()
            .map(|(row, value)| value.ok_or(ModelError::NullValue { column, row }))
            .collect()
    }

    pub fn count_flagged(&self, flag: ReflectionFlags) -> Result<usize, ModelError> {
        Ok(self
            .flags()?
            .into_iter()
            .filter(|bits| flag.is_set_in(*bits))
            .count())
    }

    pub fn select(&self, mask: &[bool]) -> Result<Self, ModelError> {
        let mask = BooleanChunked::new("mask".into(), mask);
        Ok(Self {
            df: self.df.filter(&mask)?,
        })
    }

    pub fn select_flagged(&self, flag: ReflectionFlags) -> Result<Self, ModelError> {
        let mask: Vec<bool> = self
            .flags()?
            .into_iter()
            .map(|bits| flag.is_set_in(bits))
            .collect();
        self.select(&mask)
    }

    /// Gathers `rows` in the given order.
    pub fn take(&self, rows: &[usize]) -> Result<Self, ModelError> {
        let indices: Vec<IdxSize> = rows.iter().map(|row| *row as IdxSize).collect();
        let indices = IdxCa::new("rows".into(), indices);
        Ok(Self {
            df: self.df.take(&indices)?,
        })
    }

    /// Replaces the owner column; `ids` must have one entry per row.
    pub fn with_ids(&self, ids: Vec<i32>) -> Result<Self, ModelError> {
        if ids.len() != self.len() {
            return Err(ModelError::Column {
                column: ID_COLUMN,
                reason: format!("{} replacement ids for {} rows", ids.len(), self.len()),
            });
        }
        let mut df = self.df.clone();
        df.with_column(Series::new(ID_COLUMN.into(), ids))?;
        Ok(Self { df })
    }

    /// Row indices grouped by owning position, each group in table order. Fails on the first
    /// row whose owner is not a position in a collection of `n_experiments` experiments.
    pub fn rows_by_experiment(&self, n_experiments: usize) -> Result<Vec<Vec<usize>>, ModelError> {
        let mut groups = vec![Vec::new(); n_experiments];
        for (row, owner_id) in self.ids()?.into_iter().enumerate() {
            let group = usize::try_from(owner_id)
                .ok()
                .and_then(|position| groups.get_mut(position))
                .ok_or(ModelError::DanglingReflection {
                    row,
                    owner_id,
                    n_experiments,
                })?;
            group.push(row);
        }
        Ok(groups)
    }

    pub fn frame_stats(&self) -> Result<Option<FrameStats>, ModelError> {
        let frames = self.frames()?;
        if frames.is_empty() {
            return Ok(None);
        }
        let (min, max, sum) = frames.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY, 0.0),
            |(min, max, sum), z| (min.min(*z), max.max(*z), sum + z),
        );
        Ok(Some(FrameStats {
            min,
            max,
            mean: sum / frames.len() as f64,
        }))
    }
}

fn require_column(
    df: &DataFrame,
    column: &'static str,
    dtype: &DataType,
) -> Result<(), ModelError> {
    let found = df.column(column).map_err(|_| ModelError::Column {
        column,
        reason: "missing".to_string(),
    })?;
    if found.dtype() != dtype {
        return Err(ModelError::Column {
            column,
            reason: format!("expected {dtype}, found {}", found.dtype()),
        });
    }
    Ok(())
}
