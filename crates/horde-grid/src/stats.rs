//! Occupancy statistics.
//!
//! Cheap summaries of how crowded the grid is, used for logging and to pick
//! a cell size that keeps per-cell occupancy low.

use serde::{Deserialize, Serialize};

use crate::cell::GridKey;
use crate::index::GridIndex;

/// Snapshot of grid occupancy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GridStats {
    /// Total number of cells
    pub cells: usize,
    /// Cells holding at least one member
    pub occupied_cells: usize,
    /// Total number of members
    pub members: usize,
    /// Largest member count of any single cell
    pub max_per_cell: usize,
}

impl GridStats {
    /// Collect statistics from `grid`.
    #[must_use]
    pub fn collect<K: GridKey>(grid: &GridIndex<K>) -> Self {
        grid.iter_cells().fold(
            Self {
                cells: grid.cell_count(),
                ..Self::default()
            },
            |mut acc, (_, cell)| {
                if !cell.is_empty() {
                    acc.occupied_cells += 1;
                    acc.members += cell.len();
                    acc.max_per_cell = acc.max_per_cell.max(cell.len());
                }
                acc
            },
        )
    }

    /// Mean members per occupied cell (0 when empty).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn mean_occupancy(&self) -> f32 {
        if self.occupied_cells == 0 {
            0.0
        } else {
            self.members as f32 / self.occupied_cells as f32
        }
    }

    /// Fraction of cells holding at least one member.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn fill_ratio(&self) -> f32 {
        if self.cells == 0 {
            0.0
        } else {
            self.occupied_cells as f32 / self.cells as f32
        }
    }
}
