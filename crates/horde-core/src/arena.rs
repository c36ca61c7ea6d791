//! Arena: the grid and the entity pool, owned together.
//!
//! The Arena is the container every system works against. It owns:
//! - the [`GridIndex`] of enemy positions
//! - the [`EntityPool`] of every enemy and projectile instance
//!
//! Systems receive `&mut Arena` instead of reaching for a global, so a
//! second arena in the same process (or a test) never shares state.
//!
//! # Grid Synchronization
//!
//! Positions change through [`Arena::relocate`], which keeps the grid in
//! step. Moving an entity through [`Arena::get_mut`] skips the grid; the
//! caller must then call [`Arena::relocate`] with the final position.
//!
//! # Example
//!
//! ```
//! use glam::Vec2;
//! use horde_core::arena::Arena;
//! use horde_core::config::ArenaConfig;
//! use horde_core::entity::CategoryId;
//!
//! let mut arena = Arena::from_config(&ArenaConfig::default()).unwrap();
//!
//! let fast = CategoryId::new("fast_enemy");
//! let handle = arena.spawn_at(&fast, Vec2::new(10.0, 10.0)).unwrap();
//!
//! assert!(arena.is_position_blocked(Vec2::new(10.5, 10.5), None));
//! assert!(!arena.is_position_blocked(Vec2::new(10.5, 10.5), Some(handle.id)));
//! assert_eq!(arena.query_radius(Vec2::new(10.0, 10.0), 1.0), vec![handle.id]);
//! ```

use std::collections::BTreeMap;

use glam::Vec2;
use horde_grid::{GridError, GridIndex};
use tracing::debug;

use crate::config::{ArenaConfig, CategoryConfig, GridConfig};
use crate::entity::{CategoryId, EnemyStats, Entity, EntityHandle, EntityId, ProjectileComponents};
use crate::error::{ConfigError, PoolError, SpawnError};
use crate::pool::{EntityPool, PooledEntity, Released};

// =============================================================================
// Blueprints
// =============================================================================

/// Template the pool factory stamps new instances from.
#[derive(Debug, Clone, PartialEq)]
pub enum Blueprint {
    /// Enemy with these stats at full health
    Enemy(EnemyStats),
    /// Projectile with this speed and damage
    Projectile(ProjectileComponents),
}

impl Blueprint {
    /// Build a parked instance.
    #[must_use]
    pub fn instantiate(&self, id: EntityId, category: CategoryId) -> Entity {
        match self {
            Self::Enemy(stats) => Entity::new_enemy(id, category, *stats),
            Self::Projectile(components) => Entity::new_projectile(id, category, components.clone()),
        }
    }
}

/// Blueprints for every enemy and the projectile category of `config`.
#[must_use]
pub fn blueprints(config: &ArenaConfig) -> BTreeMap<CategoryId, Blueprint> {
    let mut map: BTreeMap<CategoryId, Blueprint> = config
        .enemies
        .iter()
        .map(|enemy| {
            let stats = EnemyStats::new(
                enemy.health,
                enemy.move_speed,
                enemy.damage,
                enemy.experience_drop,
            );
            (enemy.id.clone(), Blueprint::Enemy(stats))
        })
        .collect();
    map.insert(
        config.shoot.category_id.clone(),
        Blueprint::Projectile(ProjectileComponents::new(
            Vec2::X,
            config.shoot.projectile_speed,
            config.shoot.base_damage,
        )),
    );
    map
}

// =============================================================================
// Arena
// =============================================================================

/// Owner of the spatial grid and the entity pool.
#[derive(Debug)]
pub struct Arena {
    grid: GridIndex<EntityId>,
    pool: EntityPool<Entity>,
}

impl Arena {
    /// Creates an arena with an empty grid and no pool categories.
    ///
    /// # Errors
    ///
    /// [`GridError::InvalidConfig`] if the grid geometry is unusable.
    pub fn new(grid: &GridConfig) -> Result<Self, GridError> {
        Ok(Self {
            grid: GridIndex::new(grid.bounds(), grid.cell_size)?,
            pool: EntityPool::new(),
        })
    }

    /// Creates an arena with every category of `config` registered.
    ///
    /// # Errors
    ///
    /// Grid or pool setup failures, wrapped in [`ConfigError`].
    pub fn from_config(config: &ArenaConfig) -> Result<Self, ConfigError> {
        let mut arena = Self::new(&config.grid)?;
        arena.initialize_pools(&config.categories, &blueprints(config))?;
        Ok(arena)
    }

    /// Register pool categories, each stamped from its blueprint.
    ///
    /// # Errors
    ///
    /// - [`PoolError::InvalidConfig`] if a category has no blueprint
    /// - anything [`EntityPool::register`] reports
    pub fn initialize_pools(
        &mut self,
        categories: &[CategoryConfig],
        blueprints: &BTreeMap<CategoryId, Blueprint>,
    ) -> Result<(), PoolError> {
        for config in categories {
            let blueprint = blueprints.get(&config.id).cloned().ok_or_else(|| {
                PoolError::InvalidConfig(format!("category `{}` has no blueprint", config.id))
            })?;
            self.pool.register(config.clone(), move |id, category: &CategoryId| {
                blueprint.instantiate(id, category.clone())
            })?;
        }
        debug!(categories = categories.len(), "pools initialized");
        Ok(())
    }

    // =========================================================================
    // Spawning
    // =========================================================================

    /// Acquire an instance of `category`, place it and register it.
    ///
    /// # Errors
    ///
    /// - [`SpawnError::InvalidPosition`] for NaN or infinite coordinates
    /// - [`SpawnError::Pool`] if the pool cannot provide an instance
    pub fn spawn_at(
        &mut self,
        category: &CategoryId,
        position: Vec2,
    ) -> Result<EntityHandle, SpawnError> {
        if !position.is_finite() {
            return Err(SpawnError::InvalidPosition(position));
        }
        Ok(self.pool.spawn_at(category, position, &mut self.grid)?)
    }

    /// Return an instance to its pool.
    ///
    /// # Errors
    ///
    /// [`PoolError::InvalidRelease`] if the id was never issued.
    pub fn despawn(&mut self, handle: EntityHandle) -> Result<Released, PoolError> {
        self.pool.despawn(handle, &mut self.grid)
    }

    /// Move an active instance and sync the grid.
    ///
    /// Returns `false` if the handle is stale.
    pub fn relocate(&mut self, handle: EntityHandle, position: Vec2) -> bool {
        let Some(entity) = self.pool.get_mut(handle) else {
            return false;
        };
        entity.set_position(position);
        if entity.occupies_grid() {
            self.grid.relocate(entity);
        }
        true
    }

    /// Advance auto-release timers; returns the handles that expired.
    pub fn tick_auto_release(&mut self, dt: f32) -> Vec<EntityHandle> {
        self.pool.tick(dt, &mut self.grid)
    }

    /// Release every active enemy. Returns how many.
    pub fn clear_enemies(&mut self) -> usize {
        let enemies: Vec<EntityHandle> = self
            .pool
            .iter_active()
            .filter(|e| e.is_enemy())
            .map(PooledEntity::handle)
            .collect();
        enemies
            .into_iter()
            .filter(|&h| matches!(self.despawn(h), Ok(Released::Parked)))
            .count()
    }

    /// Release and destroy everything. Returns instances destroyed.
    pub fn shutdown(&mut self) -> usize {
        self.pool.shutdown(&mut self.grid)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Ids registered within `radius` of `center`, ascending.
    #[must_use]
    pub fn query_radius(&self, center: Vec2, radius: f32) -> Vec<EntityId> {
        self.grid.elements_in_radius(center, radius)
    }

    /// Handles of live enemies within `radius` of `center`, ascending by id.
    #[must_use]
    pub fn enemies_in_radius(&self, center: Vec2, radius: f32) -> Vec<EntityHandle> {
        self.query_radius(center, radius)
            .into_iter()
            .filter_map(|id| self.pool.handle_of(id))
            .filter(|&h| self.is_live_enemy(h))
            .collect()
    }

    /// True if `position`'s cell holds anything other than `ignoring`.
    #[must_use]
    pub fn is_position_blocked(&self, position: Vec2, ignoring: Option<EntityId>) -> bool {
        self.grid.is_position_blocked(position, ignoring)
    }

    /// True if `handle` is an active enemy with health left.
    #[must_use]
    pub fn is_live_enemy(&self, handle: EntityHandle) -> bool {
        self.get(handle)
            .and_then(Entity::as_enemy)
            .is_some_and(|enemy| enemy.stats.is_alive())
    }

    /// The active entity behind `handle`.
    #[must_use]
    pub fn get(&self, handle: EntityHandle) -> Option<&Entity> {
        self.pool.get(handle)
    }

    /// Mutable access to the active entity behind `handle`.
    ///
    /// Position changes made here are not seen by the grid until
    /// [`Arena::relocate`] is called.
    #[must_use]
    pub fn get_mut(&mut self, handle: EntityHandle) -> Option<&mut Entity> {
        self.pool.get_mut(handle)
    }

    /// Handles of active entities matching `filter`, ascending by id.
    pub fn handles_where<F>(&self, filter: F) -> Vec<EntityHandle>
    where
        F: Fn(&Entity) -> bool,
    {
        self.pool
            .iter_active()
            .filter(|e| filter(e))
            .map(PooledEntity::handle)
            .collect()
    }

    /// Active enemies.
    #[must_use]
    pub fn enemy_count(&self) -> usize {
        self.pool.iter_active().filter(|e| e.is_enemy()).count()
    }

    /// Active projectiles.
    #[must_use]
    pub fn projectile_count(&self) -> usize {
        self.pool.iter_active().filter(|e| e.is_projectile()).count()
    }

    /// The spatial grid.
    #[must_use]
    pub fn grid(&self) -> &GridIndex<EntityId> {
        &self.grid
    }

    /// The entity pool.
    #[must_use]
    pub fn pool(&self) -> &EntityPool<Entity> {
        &self.pool
    }

    /// Split borrow for callers that drive the pool against the grid.
    pub fn parts_mut(&mut self) -> (&mut EntityPool<Entity>, &mut GridIndex<EntityId>) {
        (&mut self.pool, &mut self.grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use horde_grid::SpatialEntity;

    fn arena() -> Arena {
        Arena::from_config(&ArenaConfig::default()).unwrap()
    }

    fn fast() -> CategoryId {
        CategoryId::new("fast_enemy")
    }

    fn arrow() -> CategoryId {
        CategoryId::new("direction_arrow")
    }

    mod setup_tests {
        use super::*;

        #[test]
        fn default_config_registers_all_categories() {
            let arena = arena();
            let names: Vec<_> = arena.pool().categories().map(CategoryId::as_str).collect();
            assert_eq!(names, vec!["direction_arrow", "fast_enemy", "slow_enemy"]);
            assert_eq!(arena.pool().parked_count(&fast()), 10);
        }

        #[test]
        fn instances_carry_their_balance() {
            let mut arena = arena();
            let h = arena.spawn_at(&CategoryId::new("slow_enemy"), Vec2::new(5.0, 5.0)).unwrap();
            let stats = arena.get(h).unwrap().as_enemy().unwrap().stats;
            assert_eq!(stats.health, 20.0);
            assert_eq!(stats.damage, 10.0);
        }

        #[test]
        fn category_without_blueprint_rejected() {
            let mut arena = Arena::new(&GridConfig::default()).unwrap();
            let err = arena.initialize_pools(&[CategoryConfig::new("ghost", 0, 1)], &BTreeMap::new());
            assert!(matches!(err, Err(PoolError::InvalidConfig(_))));
        }

        #[test]
        fn bad_grid_rejected() {
            let grid = GridConfig {
                cell_size: 0.0,
                ..GridConfig::default()
            };
            assert!(Arena::new(&grid).is_err());
        }
    }

    mod spawn_tests {
        use super::*;

        #[test]
        fn enemies_block_projectiles_do_not() {
            let mut arena = arena();
            let p = Vec2::new(20.0, 20.0);
            arena.spawn_at(&arrow(), p).unwrap();
            assert!(!arena.is_position_blocked(p, None));

            arena.spawn_at(&fast(), p).unwrap();
            assert!(arena.is_position_blocked(p, None));
        }

        #[test]
        fn non_finite_position_rejected() {
            let mut arena = arena();
            let err = arena.spawn_at(&fast(), Vec2::new(f32::NAN, 1.0));
            assert!(matches!(err, Err(SpawnError::InvalidPosition(_))));
            assert_eq!(arena.pool().total_live(), 0);
        }

        #[test]
        fn despawn_frees_cell() {
            let mut arena = arena();
            let p = Vec2::new(20.0, 20.0);
            let h = arena.spawn_at(&fast(), p).unwrap();
            assert_eq!(arena.despawn(h), Ok(Released::Parked));
            assert!(!arena.is_position_blocked(p, None));
            assert_eq!(arena.despawn(h), Ok(Released::AlreadyParked));
        }

        #[test]
        fn clear_enemies_keeps_projectiles() {
            let mut arena = arena();
            arena.spawn_at(&fast(), Vec2::new(10.0, 10.0)).unwrap();
            arena.spawn_at(&fast(), Vec2::new(30.0, 10.0)).unwrap();
            arena.spawn_at(&arrow(), Vec2::new(50.0, 10.0)).unwrap();

            assert_eq!(arena.clear_enemies(), 2);
            assert_eq!(arena.enemy_count(), 0);
            assert_eq!(arena.projectile_count(), 1);
            assert!(arena.grid().is_empty());
        }
    }

    mod relocate_tests {
        use super::*;

        #[test]
        fn relocate_moves_grid_membership() {
            let mut arena = arena();
            let h = arena.spawn_at(&fast(), Vec2::new(10.0, 10.0)).unwrap();

            assert!(arena.relocate(h, Vec2::new(40.0, 40.0)));

            assert!(!arena.is_position_blocked(Vec2::new(10.0, 10.0), None));
            assert!(arena.is_position_blocked(Vec2::new(40.0, 40.0), None));
            let entity = arena.get(h).unwrap();
            assert_eq!(entity.current_cell(), Some(arena.grid().cell_of(Vec2::new(40.0, 40.0))));
        }

        #[test]
        fn stale_handle_does_not_move() {
            let mut arena = arena();
            let h = arena.spawn_at(&fast(), Vec2::new(10.0, 10.0)).unwrap();
            arena.despawn(h).unwrap();
            assert!(!arena.relocate(h, Vec2::new(40.0, 40.0)));
            assert!(arena.grid().is_empty());
        }

        #[test]
        fn projectile_relocates_off_grid() {
            let mut arena = arena();
            let h = arena.spawn_at(&arrow(), Vec2::new(10.0, 10.0)).unwrap();
            assert!(arena.relocate(h, Vec2::new(12.0, 10.0)));
            assert_eq!(arena.get(h).unwrap().position(), Vec2::new(12.0, 10.0));
            assert!(arena.grid().is_empty());
        }
    }

    mod query_tests {
        use super::*;

        #[test]
        fn enemies_in_radius_sorted_and_filtered() {
            let mut arena = arena();
            let a = arena.spawn_at(&fast(), Vec2::new(10.0, 10.0)).unwrap();
            let b = arena.spawn_at(&fast(), Vec2::new(12.0, 10.0)).unwrap();
            arena.spawn_at(&fast(), Vec2::new(30.0, 10.0)).unwrap();
            arena.spawn_at(&arrow(), Vec2::new(11.0, 10.0)).unwrap();

            let mut expected = vec![a, b];
            expected.sort();
            assert_eq!(arena.enemies_in_radius(Vec2::new(11.0, 10.0), 2.0), expected);
        }

        #[test]
        fn auto_release_expires_projectiles() {
            let mut arena = arena();
            let h = arena.spawn_at(&arrow(), Vec2::new(10.0, 10.0)).unwrap();
            assert!(arena.tick_auto_release(2.5).is_empty());
            assert_eq!(arena.tick_auto_release(0.5), vec![h]);
            assert_eq!(arena.projectile_count(), 0);
        }
    }
}
