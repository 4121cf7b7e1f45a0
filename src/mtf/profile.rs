use std::{fmt, ops::Deref};

use nalgebra::DMatrix;

use super::MtfError;

/// Image location as (row, column)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PickPoint {
    pub row: usize,
    pub column: usize,
}
impl PickPoint {
    pub fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }
}
impl Default for PickPoint {
    fn default() -> Self {
        Self::new(1400, 1400)
    }
}
impl fmt::Display for PickPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(row: {}, column: {})", self.row, self.column)
    }
}

/// Profile direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Along a row
    Horizontal,
    /// Along a column
    Vertical,
}
impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Orientation::Horizontal => write!(f, "horizontal"),
            Orientation::Vertical => write!(f, "vertical"),
        }
    }
}

/// Intensities along one row or one column of an image
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeProfile {
    orientation: Orientation,
    /// Row index of an horizontal profile, column index of a vertical one
    position: usize,
    values: Vec<f64>,
}
impl EdgeProfile {
    pub fn new(orientation: Orientation, position: usize, values: Vec<f64>) -> Self {
        Self {
            orientation,
            position,
            values,
        }
    }
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }
    pub fn position(&self) -> usize {
        self.position
    }
    /// Profile (min,max) values
    pub fn range(&self) -> Option<(f64, f64)> {
        use itertools::Itertools;
        self.values.iter().copied().minmax().into_option()
    }
}
impl Deref for EdgeProfile {
    type Target = [f64];

    fn deref(&self) -> &Self::Target {
        &self.values
    }
}

/// Horizontal and vertical profiles through a pick point
#[derive(Debug, Clone, PartialEq)]
pub struct Profiles {
    pub pick: PickPoint,
    pub horizontal: EdgeProfile,
    pub vertical: EdgeProfile,
}
impl Profiles {
    pub fn get(&self, orientation: Orientation) -> &EdgeProfile {
        match orientation {
            Orientation::Horizontal => &self.horizontal,
            Orientation::Vertical => &self.vertical,
        }
    }
}

/// Extracts the row and the column of `image` crossing at `pick`
pub fn extract_profiles(image: &DMatrix<f64>, pick: PickPoint) -> Result<Profiles, MtfError> {
    let (height, width) = image.shape();
    if pick.row >= height || pick.column >= width {
        return Err(MtfError::OutOfBounds {
            pick,
            height,
            width,
        });
    }
    Ok(Profiles {
        pick,
        horizontal: EdgeProfile::new(
            Orientation::Horizontal,
            pick.row,
            image.row(pick.row).iter().copied().collect(),
        ),
        vertical: EdgeProfile::new(
            Orientation::Vertical,
            pick.column,
            image.column(pick.column).iter().copied().collect(),
        ),
    })
}
