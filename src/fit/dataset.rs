//! Datasets and fit ranges.

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::error::{AnafitError, Result};

/// Ordered `(x, y)` pairs.
///
/// x values may be unsorted or repeated. A dataset is an immutable snapshot;
/// fits keep their own copy.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    x: Array1<f64>,
    y: Array1<f64>,
}

impl Dataset {
    /// Build a dataset from its two columns.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if the columns differ in length.
    pub fn new(x: Array1<f64>, y: Array1<f64>) -> Result<Self> {
        if x.len() != y.len() {
            return Err(AnafitError::InvalidInput(format!(
                "x has {} values but y has {}",
                x.len(),
                y.len()
            )));
        }
        Ok(Self { x, y })
    }

    /// Build a dataset from points.
    pub fn from_points(points: &[(f64, f64)]) -> Self {
        Self {
            x: points.iter().map(|p| p.0).collect(),
            y: points.iter().map(|p| p.1).collect(),
        }
    }

    pub fn x(&self) -> &Array1<f64> {
        &self.x
    }

    pub fn y(&self) -> &Array1<f64> {
        &self.y
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Iterate over the points in order.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.x.iter().copied().zip(self.y.iter().copied())
    }

    /// The points whose x lies strictly inside `range`, in their original
    /// order. `None` keeps every point.
    pub fn filter(&self, range: Option<FitRange>) -> Dataset {
        match range {
            None => self.clone(),
            Some(range) => {
                let (x, y): (Vec<f64>, Vec<f64>) =
                    self.points().filter(|(x, _)| range.contains(*x)).unzip();
                Self {
                    x: Array1::from(x),
                    y: Array1::from(y),
                }
            }
        }
    }

    /// Smallest and largest x, ignoring NaN. `None` when no x is a number.
    pub fn x_bounds(&self) -> Option<(f64, f64)> {
        self.x
            .iter()
            .copied()
            .filter(|x| !x.is_nan())
            .fold(None, |bounds, x| match bounds {
                None => Some((x, x)),
                Some((lo, hi)) => Some((lo.min(x), hi.max(x))),
            })
    }
}

/// An open x interval `xmin < x < xmax`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitRange {
    pub xmin: f64,
    pub xmax: f64,
}

impl FitRange {
    pub fn new(xmin: f64, xmax: f64) -> Self {
        Self { xmin, xmax }
    }

    /// Whether `x` lies strictly between the bounds.
    pub fn contains(&self, x: f64) -> bool {
        self.xmin < x && x < self.xmax
    }
}

impl From<(f64, f64)> for FitRange {
    fn from((xmin, xmax): (f64, f64)) -> Self {
        Self::new(xmin, xmax)
    }
}
