//! Entity module for the arena simulation.
//!
//! This module provides the core entity types:
//! - [`EntityId`]: Unique identifier for pooled instances
//! - [`EntityHandle`]: Generation-checked reference to an active instance
//! - [`CategoryId`]: Name of a pool category (`"fast_enemy"`, `"direction_arrow"`)
//! - [`EntityTag`]: Kind classification selecting which systems run on an entity
//! - [`EntityInner`]: Type-safe storage for kind-specific components
//! - [`Entity`]: The complete entity container
//!
//! # Example
//!
//! ```
//! use horde_core::entity::{CategoryId, Entity, EntityId, EntityTag};
//! use horde_core::entity::components::EnemyStats;
//!
//! let enemy = Entity::new_enemy(
//!     EntityId::new(42),
//!     CategoryId::new("fast_enemy"),
//!     EnemyStats::new(10.0, 4.0, 3.0, 1),
//! );
//!
//! assert_eq!(enemy.id().as_u64(), 42);
//! assert_eq!(enemy.tag(), EntityTag::Enemy);
//! ```

pub mod components;

use glam::Vec2;
use horde_grid::{CellCoord, SpatialEntity};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::pool::{Lifecycle, PooledEntity};

pub use components::{EnemyComponents, EnemyStats, ProjectileComponents, TransformState};

/// Unique identifier for an entity.
///
/// `EntityId` is a newtype wrapper around `u64`. Ids are assigned by the pool
/// when it constructs an instance, increase monotonically across all
/// categories and are never reused, even after the instance is recycled.
///
/// # Ordering
///
/// Entity IDs are ordered by their numeric value, which is used to ensure
/// deterministic iteration order across all entities.
///
/// # Example
///
/// ```
/// use horde_core::entity::EntityId;
///
/// let id1 = EntityId::new(1);
/// let id2 = EntityId::new(2);
///
/// assert!(id1 < id2);
/// assert_eq!(id1.as_u64(), 1);
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    /// Creates a new `EntityId` from a raw `u64` value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw `u64` value of this identifier.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for EntityId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

impl From<EntityId> for u64 {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

/// Reference to one use of a pooled instance.
///
/// The pool bumps an instance's generation every time it is released, so a
/// handle kept past its release no longer matches and every operation through
/// it is a no-op. Handles order by id first, which is the deterministic
/// processing order.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityHandle {
    /// Instance id
    pub id: EntityId,
    /// Generation at the time the handle was issued
    pub generation: u32,
}

impl EntityHandle {
    /// Creates a handle.
    #[must_use]
    pub const fn new(id: EntityId, generation: u32) -> Self {
        Self { id, generation }
    }
}

impl fmt::Debug for EntityHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityHandle({}v{})", self.id.0, self.generation)
    }
}

impl fmt::Display for EntityHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.id.0, self.generation)
    }
}

/// Name of a pool category.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(String);

impl CategoryId {
    /// Creates a category id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CategoryId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for CategoryId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Entity kind tag for system selection.
///
/// - `Enemy`: chases the player, occupies grid cells, can be damaged
/// - `Projectile`: flies straight, reads the grid to find hits
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityTag {
    /// Hostile unit chasing the player
    Enemy,
    /// Player-fired projectile
    Projectile,
}

impl fmt::Display for EntityTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enemy => write!(f, "Enemy"),
            Self::Projectile => write!(f, "Projectile"),
        }
    }
}

/// Type-safe storage for kind-specific components.
///
/// The variant always matches the entity's [`EntityTag`]; [`Entity`] derives
/// its tag from this enum so the two cannot disagree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EntityInner {
    /// Enemy components (stats)
    Enemy(EnemyComponents),
    /// Projectile components (flight, damage)
    Projectile(ProjectileComponents),
}

impl EntityInner {
    /// Returns the corresponding `EntityTag` for this inner storage.
    #[must_use]
    pub const fn tag(&self) -> EntityTag {
        match self {
            Self::Enemy(_) => EntityTag::Enemy,
            Self::Projectile(_) => EntityTag::Projectile,
        }
    }

    /// Returns a reference to the enemy components, if this is an enemy.
    #[must_use]
    pub const fn as_enemy(&self) -> Option<&EnemyComponents> {
        match self {
            Self::Enemy(components) => Some(components),
            Self::Projectile(_) => None,
        }
    }

    /// Returns a mutable reference to the enemy components, if this is an enemy.
    #[must_use]
    pub fn as_enemy_mut(&mut self) -> Option<&mut EnemyComponents> {
        match self {
            Self::Enemy(components) => Some(components),
            Self::Projectile(_) => None,
        }
    }

    /// Returns a reference to the projectile components, if this is a projectile.
    #[must_use]
    pub const fn as_projectile(&self) -> Option<&ProjectileComponents> {
        match self {
            Self::Projectile(components) => Some(components),
            Self::Enemy(_) => None,
        }
    }

    /// Returns a mutable reference to the projectile components, if this is a projectile.
    #[must_use]
    pub fn as_projectile_mut(&mut self) -> Option<&mut ProjectileComponents> {
        match self {
            Self::Projectile(components) => Some(components),
            Self::Enemy(_) => None,
        }
    }

    /// Reset per-use state before the instance goes back into play.
    fn reset_for_reuse(&mut self) {
        match self {
            Self::Enemy(enemy) => enemy.stats.restore(),
            Self::Projectile(projectile) => projectile.last_checked_cell = None,
        }
    }
}

/// A pooled entity in the arena.
///
/// An `Entity` combines:
/// - A unique [`EntityId`] and the [`CategoryId`] it was built for
/// - A [`Lifecycle`] tracking parked/active state, generation and auto-release
/// - The cell it is registered in, kept in sync by the grid
/// - A [`TransformState`] and kind-specific [`EntityInner`] components
///
/// # Example
///
/// ```
/// use horde_core::entity::{CategoryId, Entity, EntityId};
/// use horde_core::entity::components::ProjectileComponents;
///
/// let arrow = Entity::new_projectile(
///     EntityId::new(1),
///     CategoryId::new("direction_arrow"),
///     ProjectileComponents::default(),
/// );
///
/// assert!(arrow.is_projectile());
/// assert!(!arrow.is_enemy());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    id: EntityId,
    category: CategoryId,
    lifecycle: Lifecycle,
    current_cell: Option<CellCoord>,
    /// Position and facing
    pub transform: TransformState,
    inner: EntityInner,
}

impl Entity {
    /// Creates a new parked entity.
    ///
    /// # Arguments
    ///
    /// * `id` - Unique identifier assigned by the pool
    /// * `category` - Pool category the instance belongs to
    /// * `inner` - Kind-specific component storage
    #[must_use]
    pub fn new(id: EntityId, category: CategoryId, inner: EntityInner) -> Self {
        Self {
            id,
            category,
            lifecycle: Lifecycle::new(),
            current_cell: None,
            transform: TransformState::default(),
            inner,
        }
    }

    /// Creates a new parked enemy.
    #[must_use]
    pub fn new_enemy(id: EntityId, category: CategoryId, stats: EnemyStats) -> Self {
        Self::new(id, category, EntityInner::Enemy(EnemyComponents::new(stats)))
    }

    /// Creates a new parked projectile.
    #[must_use]
    pub fn new_projectile(
        id: EntityId,
        category: CategoryId,
        components: ProjectileComponents,
    ) -> Self {
        Self::new(id, category, EntityInner::Projectile(components))
    }

    /// Returns the entity's unique identifier.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Returns the entity's kind tag.
    #[must_use]
    pub const fn tag(&self) -> EntityTag {
        self.inner.tag()
    }

    /// World position.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.transform.position
    }

    /// Returns a reference to the entity's inner component storage.
    #[must_use]
    pub const fn inner(&self) -> &EntityInner {
        &self.inner
    }

    /// Returns a mutable reference to the entity's inner component storage.
    #[must_use]
    pub fn inner_mut(&mut self) -> &mut EntityInner {
        &mut self.inner
    }

    /// Returns `true` if this entity is an enemy.
    #[must_use]
    pub const fn is_enemy(&self) -> bool {
        matches!(self.inner, EntityInner::Enemy(_))
    }

    /// Returns `true` if this entity is a projectile.
    #[must_use]
    pub const fn is_projectile(&self) -> bool {
        matches!(self.inner, EntityInner::Projectile(_))
    }

    /// Returns the enemy components if this is an enemy, `None` otherwise.
    #[must_use]
    pub const fn as_enemy(&self) -> Option<&EnemyComponents> {
        self.inner.as_enemy()
    }

    /// Returns mutable enemy components if this is an enemy, `None` otherwise.
    #[must_use]
    pub fn as_enemy_mut(&mut self) -> Option<&mut EnemyComponents> {
        self.inner.as_enemy_mut()
    }

    /// Returns the projectile components if this is a projectile, `None` otherwise.
    #[must_use]
    pub const fn as_projectile(&self) -> Option<&ProjectileComponents> {
        self.inner.as_projectile()
    }

    /// Returns mutable projectile components if this is a projectile, `None` otherwise.
    #[must_use]
    pub fn as_projectile_mut(&mut self) -> Option<&mut ProjectileComponents> {
        self.inner.as_projectile_mut()
    }
}

impl SpatialEntity for Entity {
    type Key = EntityId;

    fn key(&self) -> EntityId {
        self.id
    }

    fn position(&self) -> Vec2 {
        self.transform.position
    }

    fn current_cell(&self) -> Option<CellCoord> {
        self.current_cell
    }

    fn set_current_cell(&mut self, cell: Option<CellCoord>) {
        self.current_cell = cell;
    }
}

impl PooledEntity for Entity {
    fn category(&self) -> &CategoryId {
        &self.category
    }

    fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    fn lifecycle_mut(&mut self) -> &mut Lifecycle {
        &mut self.lifecycle
    }

    fn set_position(&mut self, position: Vec2) {
        self.transform.position = position;
    }

    fn occupies_grid(&self) -> bool {
        self.is_enemy()
    }

    fn on_acquire(&mut self, auto_release: Option<f32>) {
        self.inner.reset_for_reuse();
        self.lifecycle.activate(auto_release);
    }
}
