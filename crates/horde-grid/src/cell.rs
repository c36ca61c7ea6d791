//! Grid cells and their coordinates.
//!
//! A [`GridCell`] is a bucket of back-references ([`GridMember`]s) to entities
//! owned elsewhere. The grid never owns entities; it only records which key
//! sits where so that proximity and occupancy queries can skip most of the
//! world.

use std::fmt;
use std::hash::Hash;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Bound for anything usable as a back-reference inside the grid.
///
/// Keys are small copyable handles (entity ids). `Ord` is required so query
/// results can be returned in a deterministic order.
pub trait GridKey: Copy + Eq + Ord + Hash + fmt::Debug {}

impl<T> GridKey for T where T: Copy + Eq + Ord + Hash + fmt::Debug {}

/// Integer coordinate of a cell.
///
/// Coordinates are signed so that radius sweeps can step past the grid edge;
/// such coordinates simply name cells that do not exist.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CellCoord {
    /// Column index
    pub x: i32,
    /// Row index
    pub y: i32,
}

impl CellCoord {
    /// Create a coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Coordinate shifted by `(dx, dy)` cells.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }

    /// Chebyshev (king-move) distance between two cells.
    #[must_use]
    pub fn chebyshev_distance(self, other: Self) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A key recorded in a cell together with the position it was registered at.
///
/// The stored position is what radius queries filter against, so movers must
/// call `GridIndex::relocate` after changing position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridMember<K> {
    /// Back-reference to the owning entity
    pub key: K,
    /// Last position reported for the entity
    pub position: Vec2,
}

/// A single bucket of the uniform grid.
///
/// Membership order is insertion order with swap-removal, i.e. unspecified.
/// A key never appears twice in the same cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridCell<K> {
    members: Vec<GridMember<K>>,
}

impl<K> Default for GridCell<K> {
    fn default() -> Self {
        Self {
            members: Vec::new(),
        }
    }
}

impl<K: GridKey> GridCell<K> {
    /// Create an empty cell.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// True if the cell holds no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// All members, in unspecified order.
    #[must_use]
    pub fn members(&self) -> &[GridMember<K>] {
        &self.members
    }

    /// Iterate over member keys.
    pub fn keys(&self) -> impl Iterator<Item = K> + '_ {
        self.members.iter().map(|m| m.key)
    }

    /// True if `key` is a member.
    #[must_use]
    pub fn contains(&self, key: K) -> bool {
        self.members.iter().any(|m| m.key == key)
    }

    /// Add `key` at `position`.
    ///
    /// Returns `false` if the key was already present, in which case only its
    /// stored position is refreshed.
    pub fn insert(&mut self, key: K, position: Vec2) -> bool {
        if let Some(member) = self.members.iter_mut().find(|m| m.key == key) {
            member.position = position;
            return false;
        }
        self.members.push(GridMember { key, position });
        true
    }

    /// Remove `key`. Returns `true` if it was present.
    pub fn remove(&mut self, key: K) -> bool {
        match self.members.iter().position(|m| m.key == key) {
            Some(idx) => {
                self.members.swap_remove(idx);
                true
            }
            None => false,
        }
    }

    /// Update the stored position of `key`. Returns `false` if absent.
    pub fn update_position(&mut self, key: K, position: Vec2) -> bool {
        match self.members.iter_mut().find(|m| m.key == key) {
            Some(member) => {
                member.position = position;
                true
            }
            None => false,
        }
    }

    /// True if at least one member is not `ignoring`.
    ///
    /// With `ignoring == None` this is simply "non-empty".
    #[must_use]
    pub fn has_member_other_than(&self, ignoring: Option<K>) -> bool {
        match ignoring {
            None => !self.members.is_empty(),
            Some(ignored) => self.members.iter().any(|m| m.key != ignored),
        }
    }

    /// Drop every member.
    pub fn clear(&mut self) {
        self.members.clear();
    }
}
