//! Query helpers for the grid.
//!
//! A radius query is answered in two steps: a square [`CellSpan`] that is a
//! superset of the circle is swept cell by cell, then members are filtered by
//! exact squared distance. Cost is proportional to the swept area rather than
//! to the number of entities in the world.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::cell::CellCoord;

/// Circular proximity query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RadiusQuery {
    /// Center of the query circle
    pub center: Vec2,
    /// Radius of the query circle (inclusive)
    pub radius: f32,
}

impl RadiusQuery {
    /// Create a new radius query.
    #[must_use]
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }

    /// True if the query can match anything at all.
    ///
    /// Negative, NaN or infinite-center queries match nothing.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.radius >= 0.0 && self.center.is_finite()
    }

    /// Squared radius.
    #[must_use]
    pub fn radius_sq(&self) -> f32 {
        self.radius * self.radius
    }

    /// Exact membership test (distance <= radius).
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        self.center.distance_squared(point) <= self.radius_sq()
    }

    /// Number of cells the sweep extends from the center cell on each side.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn cell_radius(&self, cell_size: f32) -> i32 {
        // Float-to-int casts saturate, so an unbounded radius simply covers the grid.
        (self.radius / cell_size).ceil() as i32
    }
}

/// Inclusive rectangular range of cell coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellSpan {
    /// Lowest corner (inclusive)
    pub min: CellCoord,
    /// Highest corner (inclusive)
    pub max: CellCoord,
}

impl CellSpan {
    /// Square span of `radius` cells around `center`.
    #[must_use]
    pub fn around(center: CellCoord, radius: i32) -> Self {
        let radius = radius.max(0);
        Self {
            min: center.offset(-radius, -radius),
            max: center.offset(radius, radius),
        }
    }

    /// Intersect with a grid of `cols x rows` cells.
    ///
    /// Returns `None` when nothing of the span lies inside the grid.
    #[must_use]
    pub fn clamped_to(self, cols: i32, rows: i32) -> Option<Self> {
        let min = CellCoord::new(self.min.x.max(0), self.min.y.max(0));
        let max = CellCoord::new(self.max.x.min(cols - 1), self.max.y.min(rows - 1));
        if min.x > max.x || min.y > max.y {
            return None;
        }
        Some(Self { min, max })
    }

    /// True if `cell` lies inside the span.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        cell.x >= self.min.x && cell.x <= self.max.x && cell.y >= self.min.y && cell.y <= self.max.y
    }

    /// Number of cells covered.
    #[must_use]
    pub fn cell_count(&self) -> u64 {
        let w = u64::from(self.max.x.abs_diff(self.min.x)) + 1;
        let h = u64::from(self.max.y.abs_diff(self.min.y)) + 1;
        w * h
    }

    /// Iterate cells row by row.
    pub fn iter(&self) -> impl Iterator<Item = CellCoord> {
        let Self { min, max } = *self;
        (min.y..=max.y).flat_map(move |y| (min.x..=max.x).map(move |x| CellCoord::new(x, y)))
    }
}
