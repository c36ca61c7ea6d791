//! The uniform grid index.
//!
//! [`GridIndex`] partitions a bounded 2D world into square cells of a fixed
//! size. Entities are registered by key at their current position and keep a
//! cached copy of the cell they were registered in (see [`SpatialEntity`]),
//! which makes removal O(cell occupancy) without any reverse lookup table.
//!
//! # Boundary Policy
//!
//! - Positions never fall outside the grid: each axis is floor-divided by the
//!   cell size and clamped to the valid range, so a position beyond the world
//!   edge is treated as occupying the boundary cell.
//! - Cell coordinates, on the other hand, can name cells that do not exist.
//!   Reads of such cells return nothing, while [`GridIndex::is_occupied`]
//!   reports them as blocked.
//!
//! # Example
//!
//! ```
//! use glam::Vec2;
//! use horde_grid::{CellCoord, GridBounds, GridIndex, SpatialEntity};
//!
//! struct Marker {
//!     id: u32,
//!     position: Vec2,
//!     cell: Option<CellCoord>,
//! }
//!
//! impl SpatialEntity for Marker {
//!     type Key = u32;
//!     fn key(&self) -> u32 { self.id }
//!     fn position(&self) -> Vec2 { self.position }
//!     fn current_cell(&self) -> Option<CellCoord> { self.cell }
//!     fn set_current_cell(&mut self, cell: Option<CellCoord>) { self.cell = cell; }
//! }
//!
//! let mut grid = GridIndex::new(GridBounds::new(30.0, 30.0), 3.0).unwrap();
//! let mut marker = Marker { id: 1, position: Vec2::new(4.0, 7.0), cell: None };
//!
//! grid.insert(&mut marker);
//! assert_eq!(marker.cell, Some(CellCoord::new(1, 2)));
//! assert_eq!(grid.elements_in_radius(Vec2::new(5.0, 5.0), 3.0), vec![1]);
//!
//! grid.remove(&mut marker);
//! assert!(grid.is_empty());
//! ```

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cell::{CellCoord, GridCell, GridKey};
use crate::query::{CellSpan, RadiusQuery};
use crate::stats::GridStats;
use crate::{GridBounds, GridError};

/// Upper bound on the number of cells a grid may allocate.
pub const MAX_CELLS: usize = 1 << 24;

/// Anything that can be tracked by the grid.
///
/// The grid stores only [`SpatialEntity::Key`] back-references; the entity
/// keeps the authoritative position and caches the cell it was last
/// registered in. The grid updates that cache on every insert, relocate and
/// remove, so the two sides never disagree.
pub trait SpatialEntity {
    /// Back-reference type stored in cells.
    type Key: GridKey;

    /// Stable key identifying this entity.
    fn key(&self) -> Self::Key;

    /// Current world position.
    fn position(&self) -> Vec2;

    /// Cell the entity is registered in, if any.
    fn current_cell(&self) -> Option<CellCoord>;

    /// Overwrite the cached cell. Called by the grid only.
    fn set_current_cell(&mut self, cell: Option<CellCoord>);
}

/// Uniform-cell spatial partition over `[0, width) x [0, height)`.
///
/// Cells are allocated once at construction and never destroyed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridIndex<K> {
    bounds: GridBounds,
    cell_size: f32,
    cols: i32,
    rows: i32,
    /// Row-major dense storage, `cols * rows` entries.
    cells: Vec<GridCell<K>>,
    /// Total number of members across all cells.
    len: usize,
}

impl<K: GridKey> GridIndex<K> {
    /// Create a grid covering `bounds` with square cells of `cell_size`.
    ///
    /// The number of cells per axis is `floor(extent / cell_size)`; any
    /// remainder strip is folded into the last row/column by clamping.
    ///
    /// # Errors
    ///
    /// [`GridError::InvalidConfig`] if the cell size or bounds are not
    /// positive and finite, if the world is smaller than one cell, or if the
    /// grid would exceed [`MAX_CELLS`].
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn new(bounds: GridBounds, cell_size: f32) -> Result<Self, GridError> {
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(GridError::InvalidConfig("cell_size must be positive and finite"));
        }
        if !(bounds.width.is_finite() && bounds.height.is_finite()) {
            return Err(GridError::InvalidConfig("world bounds must be finite"));
        }

        let cols_f = (bounds.width / cell_size).floor();
        let rows_f = (bounds.height / cell_size).floor();
        if cols_f < 1.0 || rows_f < 1.0 {
            return Err(GridError::InvalidConfig("world must be at least one cell in each axis"));
        }
        if cols_f * rows_f > MAX_CELLS as f32 {
            return Err(GridError::InvalidConfig("grid exceeds maximum cell count"));
        }

        let cols = cols_f as i32;
        let rows = rows_f as i32;
        let count = cols as usize * rows as usize;

        debug!(cols, rows, cell_size, "grid initialized");

        Ok(Self {
            bounds,
            cell_size,
            cols,
            rows,
            cells: (0..count).map(|_| GridCell::new()).collect(),
            len: 0,
        })
    }

    // ========================================================================
    // Geometry
    // ========================================================================

    /// World bounds the grid was sized for.
    #[must_use]
    pub fn bounds(&self) -> GridBounds {
        self.bounds
    }

    /// Edge length of a cell.
    #[must_use]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Number of cells as `(columns, rows)`.
    #[must_use]
    pub fn dimensions(&self) -> (i32, i32) {
        (self.cols, self.rows)
    }

    /// Total number of cells.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Cell containing `position`, clamped to the grid.
    ///
    /// Pure and idempotent. NaN coordinates map to column/row 0.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn cell_of(&self, position: Vec2) -> CellCoord {
        // `as` saturates and maps NaN to 0, so the clamp is always well defined.
        let cx = (position.x / self.cell_size).floor() as i32;
        let cy = (position.y / self.cell_size).floor() as i32;
        CellCoord::new(cx.clamp(0, self.cols - 1), cy.clamp(0, self.rows - 1))
    }

    /// True if `cell` names a cell of this grid.
    #[must_use]
    pub fn contains_cell(&self, cell: CellCoord) -> bool {
        cell.x >= 0 && cell.y >= 0 && cell.x < self.cols && cell.y < self.rows
    }

    /// World-space center of `cell` (whether or not the cell exists).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn cell_center(&self, cell: CellCoord) -> Vec2 {
        Vec2::new(
            (cell.x as f32 + 0.5) * self.cell_size,
            (cell.y as f32 + 0.5) * self.cell_size,
        )
    }

    #[allow(clippy::cast_sign_loss)]
    fn cell_index(&self, cell: CellCoord) -> Option<usize> {
        if self.contains_cell(cell) {
            Some(cell.y as usize * self.cols as usize + cell.x as usize)
        } else {
            None
        }
    }

    /// Borrow a cell, `None` if it does not exist.
    #[must_use]
    pub fn cell(&self, cell: CellCoord) -> Option<&GridCell<K>> {
        self.cell_index(cell).map(|idx| &self.cells[idx])
    }

    fn cell_mut(&mut self, cell: CellCoord) -> Option<&mut GridCell<K>> {
        self.cell_index(cell).map(move |idx| &mut self.cells[idx])
    }

    /// Iterate over every cell with its coordinate, row by row.
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn iter_cells(&self) -> impl Iterator<Item = (CellCoord, &GridCell<K>)> + '_ {
        let cols = self.cols as usize;
        self.cells.iter().enumerate().map(move |(idx, cell)| {
            let coord = CellCoord::new((idx % cols) as i32, (idx / cols) as i32);
            (coord, cell)
        })
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Register `entity` in the cell containing its position.
    ///
    /// If the entity is already registered in a different cell it is moved;
    /// an entity is never a member of two cells. Registering again in the
    /// same cell only refreshes the stored position.
    ///
    /// Returns `false` (and changes nothing) if the computed cell does not
    /// exist, which clamping makes unreachable in practice.
    pub fn insert<E>(&mut self, entity: &mut E) -> bool
    where
        E: SpatialEntity<Key = K>,
    {
        let key = entity.key();
        let position = entity.position();
        let target = self.cell_of(position);

        if self.cell_index(target).is_none() {
            warn!(?key, %target, "insert into missing cell ignored");
            return false;
        }

        if let Some(previous) = entity.current_cell() {
            if previous != target {
                self.detach(previous, key);
            }
        }

        if let Some(cell) = self.cell_mut(target) {
            if cell.insert(key, position) {
                self.len += 1;
            }
        }
        entity.set_current_cell(Some(target));
        true
    }

    /// Deregister `entity` from its cached cell.
    ///
    /// The cached cell is cleared. No-op if the entity has no cached cell or
    /// the cell does not exist. Returns `true` if a membership was removed.
    pub fn remove<E>(&mut self, entity: &mut E) -> bool
    where
        E: SpatialEntity<Key = K>,
    {
        let Some(cell) = entity.current_cell() else {
            return false;
        };
        entity.set_current_cell(None);
        self.detach(cell, entity.key())
    }

    /// Sync the grid after `entity` moved.
    ///
    /// Entities that are not registered are left alone; moving something that
    /// is parked must not put it back on the grid. Returns `true` if the
    /// entity changed cell.
    pub fn relocate<E>(&mut self, entity: &mut E) -> bool
    where
        E: SpatialEntity<Key = K>,
    {
        let Some(current) = entity.current_cell() else {
            return false;
        };
        let target = self.cell_of(entity.position());
        if current == target {
            let key = entity.key();
            let position = entity.position();
            let refreshed = self
                .cell_mut(current)
                .is_some_and(|cell| cell.update_position(key, position));
            if !refreshed {
                // Cache said we were here but the cell disagrees; repair.
                self.insert(entity);
            }
            return false;
        }
        self.insert(entity)
    }

    /// Drop every membership.
    ///
    /// Cached cells held by entities are not touched; the next insert,
    /// relocate or remove on such an entity repairs itself.
    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            cell.clear();
        }
        self.len = 0;
    }

    fn detach(&mut self, cell: CellCoord, key: K) -> bool {
        let removed = self.cell_mut(cell).is_some_and(|c| c.remove(key));
        if removed {
            self.len -= 1;
        }
        removed
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Number of registered members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// True if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// True if `key` is registered in `cell`.
    #[must_use]
    pub fn contains(&self, cell: CellCoord, key: K) -> bool {
        self.cell(cell).is_some_and(|c| c.contains(key))
    }

    /// Occupancy test used for movement and spawn placement.
    ///
    /// A cell is occupied iff it does not exist (boundary blocking) or it has
    /// at least one member other than `ignoring`.
    #[must_use]
    pub fn is_occupied(&self, cell: CellCoord, ignoring: Option<K>) -> bool {
        match self.cell(cell) {
            None => true,
            Some(c) => c.has_member_other_than(ignoring),
        }
    }

    /// Occupancy of the cell containing `position`.
    #[must_use]
    pub fn is_position_blocked(&self, position: Vec2, ignoring: Option<K>) -> bool {
        self.is_occupied(self.cell_of(position), ignoring)
    }

    /// Keys registered in `cell`, sorted. Empty if the cell does not exist.
    #[must_use]
    pub fn elements_in_cell(&self, cell: CellCoord) -> Vec<K> {
        let mut keys: Vec<K> = self.cell(cell).map(|c| c.keys().collect()).unwrap_or_default();
        keys.sort_unstable();
        keys
    }

    /// Cells a radius query around `center` has to visit.
    ///
    /// `None` when the query is invalid or misses the grid entirely.
    #[must_use]
    pub fn swept_cells(&self, query: &RadiusQuery) -> Option<CellSpan> {
        if !query.is_valid() {
            return None;
        }
        let center = self.cell_of(query.center);
        CellSpan::around(center, query.cell_radius(self.cell_size)).clamped_to(self.cols, self.rows)
    }

    /// Visit every member within `radius` of `center` (inclusive).
    ///
    /// Allocation free; visiting order is unspecified.
    pub fn for_each_in_radius<F>(&self, center: Vec2, radius: f32, mut visit: F)
    where
        F: FnMut(K, Vec2),
    {
        let query = RadiusQuery::new(center, radius);
        let Some(span) = self.swept_cells(&query) else {
            return;
        };
        for coord in span.iter() {
            let Some(cell) = self.cell(coord) else {
                continue;
            };
            for member in cell.members() {
                if query.contains(member.position) {
                    visit(member.key, member.position);
                }
            }
        }
    }

    /// Keys within `radius` of `center` (inclusive), sorted.
    #[must_use]
    pub fn elements_in_radius(&self, center: Vec2, radius: f32) -> Vec<K> {
        let mut keys = Vec::new();
        self.for_each_in_radius(center, radius, |key, _| keys.push(key));
        keys.sort_unstable();
        keys
    }

    /// Occupancy statistics.
    #[must_use]
    pub fn stats(&self) -> GridStats {
        GridStats::collect(self)
    }
}

// =============================================================================
// Tests
// =============================================================================
