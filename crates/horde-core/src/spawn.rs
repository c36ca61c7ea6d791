//! Timed, weighted spawning around a reference point.
//!
//! The [`SpawnCoordinator`] makes at most one spawn attempt per interval.
//! An attempt picks a category from the weight table, a point on the ring of
//! `spawn_radius` around the reference point (normally the player), and
//! places an instance there unless the point's cell is occupied. A blocked
//! or failed attempt is simply skipped; the next interval tries again.
//!
//! The live ceiling counts only entities the coordinator spawned itself and
//! that are still active. Instances placed directly through the pool or
//! the arena share the pool's capacity but never count toward the ceiling.

use std::f32::consts::TAU;

use glam::Vec2;
use horde_grid::GridIndex;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, trace};

use crate::config::SpawnConfig;
use crate::entity::{CategoryId, EntityHandle, EntityId};
use crate::error::{PoolError, SelectError};
use crate::pool::{EntityPool, PooledEntity, Released};
use crate::selector::WeightedSelector;
use crate::timer::Countdown;

/// Why an attempt did not spawn anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// `max_live_entities` spawned entities are alive.
    CeilingReached,
    /// The weight table is empty.
    NoCandidates,
    /// The chosen point's cell is occupied.
    Occupied,
    /// The chosen category has no free instance.
    Exhausted(CategoryId),
    /// The chosen category is not registered with the pool.
    ConfigMissing(CategoryId),
}

/// What one [`SpawnCoordinator::tick`] did.
#[derive(Debug, Clone, PartialEq)]
pub enum SpawnOutcome {
    /// Spawning is switched off.
    Disabled,
    /// The interval has not elapsed yet.
    Waiting,
    /// An attempt was due but did not spawn.
    Skipped(SkipReason),
    /// An entity was placed.
    Spawned {
        /// Handle of the new entity
        handle: EntityHandle,
        /// Its category
        category: CategoryId,
        /// Where it was placed
        position: Vec2,
    },
}

impl SpawnOutcome {
    /// Handle of the spawned entity, if any.
    #[must_use]
    pub fn spawned(&self) -> Option<EntityHandle> {
        match self {
            Self::Spawned { handle, .. } => Some(*handle),
            _ => None,
        }
    }
}

/// Drives periodic spawning.
///
/// `max_live_entities` caps this coordinator's own spawns, not the total
/// population of the pool.
#[derive(Debug, Clone)]
pub struct SpawnCoordinator {
    config: SpawnConfig,
    selector: WeightedSelector,
    rng: ChaCha8Rng,
    timer: Countdown,
    enabled: bool,
    /// Handles of entities this coordinator spawned and believes alive.
    live: Vec<EntityHandle>,
}

impl SpawnCoordinator {
    /// Creates an enabled coordinator whose first attempt is one interval away.
    ///
    /// # Arguments
    ///
    /// * `config` - Weight table, placement and cadence
    /// * `seed` - Seed for category and placement draws
    #[must_use]
    pub fn new(config: SpawnConfig, seed: u64) -> Self {
        Self {
            selector: WeightedSelector::from_table(&config.entries),
            timer: Countdown::new(config.spawn_interval_seconds),
            config,
            rng: ChaCha8Rng::seed_from_u64(seed),
            enabled: true,
            live: Vec::new(),
        }
    }

    /// Swap in a new config and rebuild the weight cache.
    ///
    /// A running countdown longer than the new interval is shortened to it.
    pub fn reload(&mut self, config: SpawnConfig) {
        self.selector.rebuild(&config.entries);
        self.timer.cap(config.spawn_interval_seconds);
        self.config = config;
    }

    /// Current config.
    #[must_use]
    pub fn config(&self) -> &SpawnConfig {
        &self.config
    }

    /// Cached weight table.
    #[must_use]
    pub fn selector(&self) -> &WeightedSelector {
        &self.selector
    }

    /// Resume spawning; the next attempt is one full interval away.
    pub fn enable(&mut self) {
        self.enabled = true;
        self.timer.restart(self.config.spawn_interval_seconds);
    }

    /// Stop spawning and reset the countdown.
    pub fn disable(&mut self) {
        self.enabled = false;
        self.timer.restart(self.config.spawn_interval_seconds);
    }

    /// True while spawning is on.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Seconds until the next attempt is due.
    #[must_use]
    pub fn time_until_next(&self) -> f32 {
        self.timer.remaining()
    }

    /// Spawned entities still alive, as of the last tick or clear.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Handles of spawned entities believed alive.
    #[must_use]
    pub fn live_handles(&self) -> &[EntityHandle] {
        &self.live
    }

    /// Forget handles whose entity was released since it was spawned.
    pub fn cleanup<E: PooledEntity>(&mut self, pool: &EntityPool<E>) {
        self.live.retain(|&h| pool.is_active(h));
    }

    /// Advance the countdown and attempt a spawn if one is due.
    ///
    /// When the live ceiling is reached the countdown is not reset, so the
    /// spawn happens on the first tick with room. Only handles in
    /// [`SpawnCoordinator::live_handles`] count toward the ceiling.
    pub fn tick<E: PooledEntity>(
        &mut self,
        dt: f32,
        reference_point: Vec2,
        pool: &mut EntityPool<E>,
        grid: &mut GridIndex<EntityId>,
    ) -> SpawnOutcome {
        if !self.enabled {
            return SpawnOutcome::Disabled;
        }
        self.cleanup(pool);

        if !self.timer.advance(dt) {
            return SpawnOutcome::Waiting;
        }
        if self.live.len() >= self.config.max_live_entities {
            trace!(live = self.live.len(), "spawn ceiling reached");
            return SpawnOutcome::Skipped(SkipReason::CeilingReached);
        }

        self.timer.restart(self.config.spawn_interval_seconds);
        let outcome = self.attempt(reference_point, pool, grid);
        if let SpawnOutcome::Skipped(reason) = &outcome {
            debug!(?reason, "spawn attempt skipped");
        }
        outcome
    }

    fn attempt<E: PooledEntity>(
        &mut self,
        reference_point: Vec2,
        pool: &mut EntityPool<E>,
        grid: &mut GridIndex<EntityId>,
    ) -> SpawnOutcome {
        let category = match self.selector.select(&mut self.rng) {
            Ok(category) => category.clone(),
            Err(SelectError::NoCandidates) => {
                return SpawnOutcome::Skipped(SkipReason::NoCandidates);
            }
        };

        let position = self.ring_point(reference_point);
        if grid.is_position_blocked(position, None) {
            return SpawnOutcome::Skipped(SkipReason::Occupied);
        }

        match pool.spawn_at(&category, position, grid) {
            Ok(handle) => {
                self.live.push(handle);
                debug!(%handle, %category, x = position.x, y = position.y, "spawned");
                SpawnOutcome::Spawned {
                    handle,
                    category,
                    position,
                }
            }
            Err(PoolError::Exhausted { category, .. }) => {
                SpawnOutcome::Skipped(SkipReason::Exhausted(category))
            }
            Err(_) => SpawnOutcome::Skipped(SkipReason::ConfigMissing(category)),
        }
    }

    /// Uniform point on the spawn ring around `center`.
    fn ring_point(&mut self, center: Vec2) -> Vec2 {
        let angle = self.rng.gen_range(0.0..TAU);
        center + Vec2::from_angle(angle) * self.config.spawn_radius
    }

    /// Release every entity this coordinator spawned. Returns how many.
    pub fn clear_all<E: PooledEntity>(
        &mut self,
        pool: &mut EntityPool<E>,
        grid: &mut GridIndex<EntityId>,
    ) -> usize {
        let released = self
            .live
            .drain(..)
            .filter(|&h| matches!(pool.despawn(h, grid), Ok(Released::Parked)))
            .count();
        debug!(released, "cleared spawned entities");
        released
    }
}
