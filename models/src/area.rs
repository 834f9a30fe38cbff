//! Simulation areas.

use crate::{check, Error};
use adhoc_simulator::Coordinates;
use std::fmt;

/// A rectangular simulation area with its origin at `(0, 0)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Area {
    width: f64,
    height: f64,
}

impl Area {
    pub fn rectangle(width: f64, height: f64) -> Result<Self, Error> {
        check("width", "finite and > 0", width, |v| v.is_finite() && v > 0.0)?;
        check("height", "finite and > 0", height, |v| {
            v.is_finite() && v > 0.0
        })?;
        Ok(Self { width, height })
    }

    pub fn square(side: f64) -> Result<Self, Error> {
        check("side", "finite and > 0", side, |v| v.is_finite() && v > 0.0)?;
        Ok(Self {
            width: side,
            height: side,
        })
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// Returns true if `point` lies inside the area (borders included).
    pub fn within(&self, point: Coordinates) -> bool {
        (0.0..=self.width).contains(&point.x) && (0.0..=self.height).contains(&point.y)
    }

    /// The point of the area closest to `point`.
    pub fn clamp(&self, point: Coordinates) -> Coordinates {
        Coordinates::new(point.x.clamp(0.0, self.width), point.y.clamp(0.0, self.height))
    }
}

impl fmt::Display for Area {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}
