//! Geometric primitives for annotation rendering.
//!
//! The analysis service reports field locations as flat lists of
//! alternating x/y coordinates. This module converts those lists into
//! ordered 2-D points, validating shape on the way.

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::core::errors::DocLensError;

/// The smallest flat coordinate list that describes a polygon: three
/// vertices, two numbers each.
pub const MIN_POLYGON_COORDS: usize = 6;

/// A 2D point with floating-point coordinates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Point {
    /// X-coordinate of the point.
    pub x: f32,
    /// Y-coordinate of the point.
    pub y: f32,
}

impl Point {
    /// Creates a new point with the given coordinates.
    #[inline]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

/// Converts a flat coordinate list into an ordered sequence of points.
///
/// Consecutive pairs become one vertex each, preserving input order.
/// Winding order is the caller's concern and is not validated.
///
/// # Errors
///
/// Returns [`DocLensError::InvalidGeometry`] when the list has an odd
/// length or fewer than [`MIN_POLYGON_COORDS`] numbers. No partial output
/// is ever produced.
pub fn extract_points(flat_coords: &[f32]) -> Result<Vec<Point>, DocLensError> {
    if flat_coords.len() < MIN_POLYGON_COORDS || flat_coords.len() % 2 != 0 {
        return Err(DocLensError::InvalidGeometry {
            coordinate_count: flat_coords.len(),
        });
    }

    Ok(flat_coords
        .iter()
        .copied()
        .tuples()
        .map(|(x, y)| Point::new(x, y))
        .collect())
}
