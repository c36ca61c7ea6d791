//! # Horde Grid
//!
//! Uniform-cell spatial index for bounded 2D worlds.
//!
//! The world `[0, width) x [0, height)` is partitioned into square cells of a
//! fixed size. Entities register a back-reference (a key) in the cell that
//! contains their position, which makes the two hot queries of a crowded
//! arena cheap:
//!
//! - **Occupancy**: "is anyone other than me in this cell?" for movement and
//!   spawn placement
//! - **Proximity**: "who is within `r` of this point?" for area damage and
//!   contact checks, costing O(cells swept + candidates) instead of O(n)
//!
//! The grid never owns entities. Callers implement [`SpatialEntity`] and keep
//! the grid in sync by calling [`GridIndex::insert`], [`GridIndex::relocate`]
//! and [`GridIndex::remove`].
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use horde_grid::{GridBounds, GridIndex};
//!
//! let mut grid: GridIndex<u64> = GridIndex::new(GridBounds::new(120.0, 120.0), 3.0)?;
//! grid.insert(&mut enemy);
//!
//! // Every enemy within the aura radius, sorted by key
//! let hits = grid.elements_in_radius(player_position, 3.0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cell;
pub mod hash;
pub mod index;
pub mod query;
pub mod stats;

// Re-exports for convenience
pub use cell::{CellCoord, GridCell, GridKey, GridMember};
pub use hash::hash_grid;
pub use index::{GridIndex, SpatialEntity, MAX_CELLS};
pub use query::{CellSpan, RadiusQuery};
pub use stats::GridStats;

use glam::Vec2;
use thiserror::Error;

/// Errors raised when building a grid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    /// Cell size or world bounds cannot produce a valid grid.
    #[error("invalid grid configuration: {0}")]
    InvalidConfig(&'static str),
}

/// Axis-aligned world rectangle anchored at the origin.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GridBounds {
    /// Extent along x
    pub width: f32,
    /// Extent along y
    pub height: f32,
}

impl GridBounds {
    /// Create bounds covering `[0, width) x [0, height)`.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Get the size of the bounds.
    #[must_use]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// Get the center of the bounds.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.size() * 0.5
    }

    /// Check if a point is inside the bounds (upper edges exclusive).
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= 0.0 && point.y >= 0.0 && point.x < self.width && point.y < self.height
    }

    /// Closest point inside the bounds (upper edges inclusive).
    #[must_use]
    pub fn clamp(&self, point: Vec2) -> Vec2 {
        Vec2::new(point.x.clamp(0.0, self.width), point.y.clamp(0.0, self.height))
    }
}

impl Default for GridBounds {
    fn default() -> Self {
        Self::new(120.0, 120.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_contains() {
        let bounds = GridBounds::new(10.0, 10.0);
        assert!(bounds.contains(Vec2::ZERO));
        assert!(bounds.contains(Vec2::new(9.9, 4.0)));
        assert!(!bounds.contains(Vec2::new(10.0, 0.0)));
        assert!(!bounds.contains(Vec2::new(-0.1, 5.0)));
    }

    #[test]
    fn test_bounds_clamp() {
        let bounds = GridBounds::new(10.0, 20.0);
        assert_eq!(bounds.clamp(Vec2::new(-3.0, 25.0)), Vec2::new(0.0, 20.0));
        assert_eq!(bounds.center(), Vec2::new(5.0, 10.0));
    }

    #[test]
    fn test_error_message() {
        let err = GridError::InvalidConfig("cell_size must be positive and finite");
        assert_eq!(
            err.to_string(),
            "invalid grid configuration: cell_size must be positive and finite"
        );
    }
}
