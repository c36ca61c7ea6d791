//! State hashing for determinism verification.
//!
//! Two grids that received the same sequence of operations produce the same
//! hash. Cells are visited in row-major order and members sorted by key, so
//! the (unspecified) order inside a cell does not leak into the hash.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::cell::GridKey;
use crate::index::GridIndex;

/// Compute a deterministic hash of grid state.
///
/// This hash includes:
/// - Cell size and dimensions
/// - Every occupied cell with its members and their stored positions
#[must_use]
pub fn hash_grid<K: GridKey>(grid: &GridIndex<K>) -> u64 {
    let mut hasher = DefaultHasher::new();
    write_grid(grid, &mut hasher);
    hasher.finish()
}

/// Feed grid state into an existing hasher.
///
/// Used when the grid is one part of a larger state hash.
pub fn write_grid<K: GridKey, H: Hasher>(grid: &GridIndex<K>, hasher: &mut H) {
    // Floats as bits to avoid float comparison issues
    grid.cell_size().to_bits().hash(hasher);
    grid.dimensions().hash(hasher);
    grid.len().hash(hasher);

    for (coord, cell) in grid.iter_cells() {
        if cell.is_empty() {
            continue;
        }
        coord.hash(hasher);

        let mut members: Vec<_> = cell.members().to_vec();
        members.sort_unstable_by_key(|m| m.key);
        for member in members {
            member.key.hash(hasher);
            member.position.x.to_bits().hash(hasher);
            member.position.y.to_bits().hash(hasher);
        }
    }
}
