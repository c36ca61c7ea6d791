//! Pooled entity storage.
//!
//! [`EntityPool`] owns every instance ever constructed for a session and
//! recycles them per category instead of allocating on each spawn. It is the
//! only place that moves instances between the parked and active states, and
//! it keeps the grid in step: an instance is deregistered from the grid
//! before it becomes eligible for reacquisition.
//!
//! Callers refer to active instances through [`EntityHandle`]s. A handle
//! stops resolving the moment its instance is released, which is what makes
//! "use after release" a silent no-op instead of a corruption.
//!
//! # Example
//!
//! ```
//! use glam::Vec2;
//! use horde_core::config::CategoryConfig;
//! use horde_core::entity::{CategoryId, Entity, EnemyStats};
//! use horde_core::pool::{EntityPool, Released};
//! use horde_grid::{GridBounds, GridIndex};
//!
//! let mut grid = GridIndex::new(GridBounds::new(30.0, 30.0), 3.0).unwrap();
//! let mut pool = EntityPool::new();
//! pool.register(CategoryConfig::new("fast_enemy", 2, 4), |id, category: &CategoryId| {
//!     Entity::new_enemy(id, category.clone(), EnemyStats::default())
//! })
//! .unwrap();
//!
//! let category = CategoryId::new("fast_enemy");
//! let handle = pool.spawn_at(&category, Vec2::new(4.0, 4.0), &mut grid).unwrap();
//! assert_eq!(grid.len(), 1);
//!
//! assert_eq!(pool.release(&category, handle, &mut grid), Ok(Released::Parked));
//! assert!(grid.is_empty());
//! assert!(pool.get(handle).is_none());
//! ```

pub mod lifecycle;

use std::collections::BTreeMap;
use std::fmt;

use glam::Vec2;
use horde_grid::GridIndex;
use tracing::{debug, error, warn};

use crate::config::CategoryConfig;
use crate::entity::{CategoryId, EntityHandle, EntityId};
use crate::error::PoolError;

pub use lifecycle::{Lifecycle, LifecycleState, PooledEntity};

/// Builds a fresh instance for a category.
pub type Factory<E> = Box<dyn FnMut(EntityId, &CategoryId) -> E>;

/// Result of a release that did not fail.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Released {
    /// The instance was active and is now parked.
    Parked,
    /// The handle was stale or the instance already parked; nothing changed.
    AlreadyParked,
}

/// Bookkeeping for one category.
struct CategoryPool<E> {
    config: CategoryConfig,
    factory: Factory<E>,
    /// LIFO stack of parked instance ids.
    parked: Vec<EntityId>,
    /// Every instance ever constructed for this category.
    created: Vec<EntityId>,
}

impl<E> CategoryPool<E> {
    fn live(&self) -> usize {
        self.created.len() - self.parked.len()
    }
}

/// Per-category object pool for entities.
///
/// Instances are stored in a `BTreeMap` keyed by id so every sweep (timers,
/// shutdown, active listings) runs in ascending id order.
pub struct EntityPool<E> {
    next_id: u64,
    entities: BTreeMap<EntityId, E>,
    categories: BTreeMap<CategoryId, CategoryPool<E>>,
}

impl<E> fmt::Debug for EntityPool<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (id, pool) in &self.categories {
            map.entry(
                &id.as_str(),
                &format!(
                    "{} created, {} parked, max {}",
                    pool.created.len(),
                    pool.parked.len(),
                    pool.config.max_capacity
                ),
            );
        }
        map.finish()
    }
}

impl<E: PooledEntity> Default for EntityPool<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: PooledEntity> EntityPool<E> {
    /// Creates an empty pool with no categories.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: 0,
            entities: BTreeMap::new(),
            categories: BTreeMap::new(),
        }
    }

    // ========================================================================
    // Setup
    // ========================================================================

    /// Register a category and pre-warm `initial_capacity` parked instances.
    ///
    /// Pre-warmed instances are constructed and parked without ever touching
    /// the grid.
    ///
    /// # Errors
    ///
    /// - [`PoolError::InvalidConfig`] if capacities or the timer are invalid
    /// - [`PoolError::DuplicateCategory`] if the id is already registered
    pub fn register<F>(&mut self, config: CategoryConfig, factory: F) -> Result<(), PoolError>
    where
        F: FnMut(EntityId, &CategoryId) -> E + 'static,
    {
        config.check().map_err(PoolError::InvalidConfig)?;
        if self.categories.contains_key(&config.id) {
            return Err(PoolError::DuplicateCategory(config.id));
        }

        let category = config.id.clone();
        let mut pool = CategoryPool {
            factory: Box::new(factory),
            parked: Vec::with_capacity(config.initial_capacity),
            created: Vec::with_capacity(config.initial_capacity),
            config,
        };

        for _ in 0..pool.config.initial_capacity {
            let id = construct(&mut self.next_id, &mut self.entities, &mut pool, &category);
            pool.parked.push(id);
        }

        debug!(
            %category,
            initial = pool.config.initial_capacity,
            max = pool.config.max_capacity,
            "pool category registered"
        );
        self.categories.insert(category, pool);
        Ok(())
    }

    /// Register several categories sharing one factory.
    ///
    /// Stops at the first failure; categories registered before it stay.
    ///
    /// # Errors
    ///
    /// As [`EntityPool::register`].
    pub fn initialize<'a, I, F>(&mut self, configs: I, factory: F) -> Result<(), PoolError>
    where
        I: IntoIterator<Item = &'a CategoryConfig>,
        F: FnMut(EntityId, &CategoryId) -> E + Clone + 'static,
    {
        for config in configs {
            self.register(config.clone(), factory.clone())?;
        }
        Ok(())
    }

    // ========================================================================
    // Acquire / Release
    // ========================================================================

    /// Check out an instance of `category`.
    ///
    /// Reuses the most recently parked instance, else constructs a new one if
    /// the category is below its maximum. The instance is activated (timer
    /// armed if configured) but not placed on the grid; see
    /// [`EntityPool::spawn_at`].
    ///
    /// # Errors
    ///
    /// - [`PoolError::ConfigMissing`] for an unknown category
    /// - [`PoolError::Exhausted`] if every instance is live
    pub fn acquire(&mut self, category: &CategoryId) -> Result<EntityHandle, PoolError> {
        let pool = self
            .categories
            .get_mut(category)
            .ok_or_else(|| PoolError::ConfigMissing(category.clone()))?;

        let id = match pool.parked.pop() {
            Some(id) => id,
            None if pool.created.len() < pool.config.max_capacity => {
                construct(&mut self.next_id, &mut self.entities, pool, category)
            }
            None => {
                return Err(PoolError::Exhausted {
                    category: category.clone(),
                    max: pool.config.max_capacity,
                });
            }
        };
        let auto_release = pool.config.auto_release();

        let entity = self.entities.get_mut(&id).ok_or_else(|| PoolError::InvalidRelease {
            id,
            category: category.clone(),
        })?;
        entity.on_acquire(auto_release);
        Ok(entity.handle())
    }

    /// Acquire, move to `position` and register in the grid.
    ///
    /// Instances whose [`PooledEntity::occupies_grid`] is false are placed
    /// but not registered.
    ///
    /// # Errors
    ///
    /// As [`EntityPool::acquire`].
    pub fn spawn_at(
        &mut self,
        category: &CategoryId,
        position: Vec2,
        grid: &mut GridIndex<EntityId>,
    ) -> Result<EntityHandle, PoolError> {
        let handle = self.acquire(category)?;
        if let Some(entity) = self.entities.get_mut(&handle.id) {
            entity.set_position(position);
            if entity.occupies_grid() {
                grid.insert(entity);
            }
        }
        Ok(handle)
    }

    /// Return an instance to `category`.
    ///
    /// The instance is removed from the grid, its timer disarmed and its
    /// generation bumped, then it is parked.
    ///
    /// # Errors
    ///
    /// [`PoolError::InvalidRelease`] if the id is unknown or belongs to a
    /// different category. The pool is left untouched. This is logged at
    /// error level and returned in every build profile; there is no debug
    /// assertion, so callers must handle the error.
    pub fn release(
        &mut self,
        category: &CategoryId,
        handle: EntityHandle,
        grid: &mut GridIndex<EntityId>,
    ) -> Result<Released, PoolError> {
        let invalid = || PoolError::InvalidRelease {
            id: handle.id,
            category: category.clone(),
        };

        let Some(entity) = self.entities.get_mut(&handle.id) else {
            error!(%handle, %category, "release of unknown entity");
            return Err(invalid());
        };
        if entity.category() != category {
            error!(%handle, %category, actual = %entity.category(), "release to wrong category");
            return Err(invalid());
        }
        let Some(pool) = self.categories.get_mut(category) else {
            error!(%handle, %category, "release to unregistered category");
            return Err(invalid());
        };

        if entity.generation() != handle.generation || !entity.is_active() {
            warn!(%handle, %category, "stale or double release ignored");
            return Ok(Released::AlreadyParked);
        }

        grid.remove(entity);
        entity.on_release();
        pool.parked.push(handle.id);
        Ok(Released::Parked)
    }

    /// Release using the instance's own category.
    ///
    /// # Errors
    ///
    /// [`PoolError::InvalidRelease`] if the id is unknown.
    pub fn despawn(
        &mut self,
        handle: EntityHandle,
        grid: &mut GridIndex<EntityId>,
    ) -> Result<Released, PoolError> {
        let Some(category) = self.entities.get(&handle.id).map(|e| e.category().clone()) else {
            error!(%handle, "despawn of unknown entity");
            return Err(PoolError::InvalidRelease {
                id: handle.id,
                category: CategoryId::new(""),
            });
        };
        self.release(&category, handle, grid)
    }

    /// Advance auto-release timers of active instances by `dt`.
    ///
    /// Expired instances are released exactly as by [`EntityPool::release`];
    /// their (now stale) handles are returned in ascending id order.
    pub fn tick(&mut self, dt: f32, grid: &mut GridIndex<EntityId>) -> Vec<EntityHandle> {
        let expired: Vec<EntityHandle> = self
            .entities
            .values_mut()
            .filter_map(|e| e.lifecycle_mut().advance_timer(dt).then(|| e.handle()))
            .collect();

        for &handle in &expired {
            if let Err(err) = self.despawn(handle, grid) {
                error!(%handle, %err, "auto-release failed");
            }
        }
        if !expired.is_empty() {
            debug!(count = expired.len(), "auto-released");
        }
        expired
    }

    /// Release every live instance of `category`. Returns how many.
    pub fn clear_category(&mut self, category: &CategoryId, grid: &mut GridIndex<EntityId>) -> usize {
        let live: Vec<EntityHandle> = self
            .entities
            .values()
            .filter(|e| e.is_active() && e.category() == category)
            .map(PooledEntity::handle)
            .collect();
        live.into_iter()
            .filter(|&h| matches!(self.release(category, h, grid), Ok(Released::Parked)))
            .count()
    }

    /// Release everything, destroy every instance and forget all categories.
    ///
    /// Terminal: the pool is empty afterwards and old handles resolve to
    /// nothing. Returns the number of instances destroyed.
    pub fn shutdown(&mut self, grid: &mut GridIndex<EntityId>) -> usize {
        for handle in self.active_handles() {
            if let Err(err) = self.despawn(handle, grid) {
                error!(%handle, %err, "release during shutdown failed");
            }
        }
        let destroyed = self.entities.len();
        for entity in self.entities.values_mut() {
            entity.on_destroy();
        }
        self.entities.clear();
        self.categories.clear();
        debug!(destroyed, "pool shut down");
        destroyed
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// The active instance behind `handle`.
    #[must_use]
    pub fn get(&self, handle: EntityHandle) -> Option<&E> {
        self.entities
            .get(&handle.id)
            .filter(|e| e.is_active() && e.generation() == handle.generation)
    }

    /// Mutable access to the active instance behind `handle`.
    ///
    /// Callers that move the instance must sync the grid.
    #[must_use]
    pub fn get_mut(&mut self, handle: EntityHandle) -> Option<&mut E> {
        self.entities
            .get_mut(&handle.id)
            .filter(|e| e.is_active() && e.generation() == handle.generation)
    }

    /// Any instance by id, parked or active.
    #[must_use]
    pub fn get_by_id(&self, id: EntityId) -> Option<&E> {
        self.entities.get(&id)
    }

    /// The active instance with this id, whatever its generation.
    #[must_use]
    pub fn get_active_mut(&mut self, id: EntityId) -> Option<&mut E> {
        self.entities.get_mut(&id).filter(|e| e.is_active())
    }

    /// Current handle of the active instance with this id.
    #[must_use]
    pub fn handle_of(&self, id: EntityId) -> Option<EntityHandle> {
        self.entities
            .get(&id)
            .filter(|e| e.is_active())
            .map(PooledEntity::handle)
    }

    /// True if `handle` still refers to an active instance.
    #[must_use]
    pub fn is_active(&self, handle: EntityHandle) -> bool {
        self.get(handle).is_some()
    }

    /// Instances of `category` currently in play (0 if unknown).
    #[must_use]
    pub fn live_count(&self, category: &CategoryId) -> usize {
        self.categories.get(category).map_or(0, CategoryPool::live)
    }

    /// Parked instances of `category` (0 if unknown).
    #[must_use]
    pub fn parked_count(&self, category: &CategoryId) -> usize {
        self.categories.get(category).map_or(0, |p| p.parked.len())
    }

    /// Instances ever constructed for `category` (0 if unknown).
    #[must_use]
    pub fn created_count(&self, category: &CategoryId) -> usize {
        self.categories.get(category).map_or(0, |p| p.created.len())
    }

    /// Instances in play across all categories.
    #[must_use]
    pub fn total_live(&self) -> usize {
        self.categories.values().map(CategoryPool::live).sum()
    }

    /// Handles of every active instance, ascending by id.
    #[must_use]
    pub fn active_handles(&self) -> Vec<EntityHandle> {
        self.iter_active().map(PooledEntity::handle).collect()
    }

    /// Ids of every active instance, ascending.
    #[must_use]
    pub fn active_ids_sorted(&self) -> Vec<EntityId> {
        self.iter_active().map(|e| e.key()).collect()
    }

    /// Iterate active instances, ascending by id.
    pub fn iter_active(&self) -> impl Iterator<Item = &E> + '_ {
        self.entities.values().filter(|e| e.is_active())
    }

    /// Registered categories, sorted.
    pub fn categories(&self) -> impl Iterator<Item = &CategoryId> + '_ {
        self.categories.keys()
    }

    /// Configuration of a registered category.
    #[must_use]
    pub fn category_config(&self, category: &CategoryId) -> Option<&CategoryConfig> {
        self.categories.get(category).map(|p| &p.config)
    }
}

/// Construct a new instance for `pool` with the next free id.
fn construct<E: PooledEntity>(
    next_id: &mut u64,
    entities: &mut BTreeMap<EntityId, E>,
    pool: &mut CategoryPool<E>,
    category: &CategoryId,
) -> EntityId {
    let id = EntityId::new(*next_id);
    *next_id += 1;
    let entity = (pool.factory)(id, category);
    debug_assert_eq!(entity.key(), id, "factory must use the id it is given");
    entities.insert(id, entity);
    pool.created.push(id);
    id
}
