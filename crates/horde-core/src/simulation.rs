//! Simulation module with the fixed-phase step loop.
//!
//! The `Simulation` owns the [`Arena`], the [`Player`], the
//! [`SpawnCoordinator`] and the timed player abilities, and advances them all
//! in one deterministic order per [`Simulation::step`]:
//!
//! 1. **CLEANUP**: expire auto-release timers, forget released spawns
//! 2. **SPAWN**: at most one spawn attempt around the player
//! 3. **SYSTEMS**: player movement, enemy movement, shooting, projectiles,
//!    aura, contact damage. Releases caused here take effect immediately.
//! 4. **ADVANCE**: tick counter and elapsed time
//!
//! # Determinism
//!
//! Given the same config, seed, `dt` sequence and steering inputs, two
//! simulations produce the same [`Simulation::state_hash`] after every step:
//! - Entities are iterated in ID order (via `BTreeMap`)
//! - Spatial queries return ids sorted
//! - All randomness comes from one `ChaCha8Rng` seeded from the master seed
//!
//! # Example
//!
//! ```
//! use glam::Vec2;
//! use horde_core::config::ArenaConfig;
//! use horde_core::simulation::Simulation;
//!
//! let mut sim = Simulation::new(ArenaConfig::default(), 42).unwrap();
//! sim.set_player_direction(Vec2::X);
//!
//! for _ in 0..60 {
//!     sim.step(1.0 / 60.0);
//! }
//!
//! assert_eq!(sim.tick(), 60);
//! assert!(sim.arena().enemy_count() > 0);
//! ```

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

use bitflags::bitflags;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::arena::Arena;
use crate::config::ArenaConfig;
use crate::entity::EntityInner;
use crate::error::ConfigError;
use crate::player::Player;
use crate::pool::PooledEntity;
use crate::report::StepReport;
use crate::spawn::SpawnCoordinator;
use crate::systems::{step_enemies, step_projectiles, ContactDamage, DamageAura, ShootAbility};

bitflags! {
    /// Systems that can be switched on and off at runtime.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct SystemFlags: u8 {
        /// Timed spawning around the player
        const SPAWNING = 1 << 0;
        /// Player follows its steering input
        const PLAYER_MOVEMENT = 1 << 1;
        /// Enemies chase the player
        const ENEMY_MOVEMENT = 1 << 2;
        /// Projectile weapon
        const SHOOTING = 1 << 3;
        /// Damage aura
        const AURA = 1 << 4;
        /// Enemies hurt the player on contact
        const CONTACT_DAMAGE = 1 << 5;
    }
}

// =============================================================================
// Simulation
// =============================================================================

/// The main simulation orchestrator.
///
/// `Simulation` manages:
/// - The arena (grid and pools)
/// - The player and its abilities
/// - The spawner, seeded from the master seed
/// - Which systems are enabled
pub struct Simulation {
    config: ArenaConfig,
    arena: Arena,
    player: Player,
    spawner: SpawnCoordinator,
    weapon: ShootAbility,
    aura: DamageAura,
    contact: ContactDamage,
    enabled: SystemFlags,
    tick: u64,
    elapsed: f64,
    master_seed: u64,
}

impl fmt::Debug for Simulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulation")
            .field("tick", &self.tick)
            .field("elapsed", &self.elapsed)
            .field("master_seed", &self.master_seed)
            .field("enabled", &self.enabled)
            .field("player", &self.player)
            .field("enemies", &self.arena.enemy_count())
            .field("projectiles", &self.arena.projectile_count())
            .field("pool", self.arena.pool())
            .finish_non_exhaustive()
    }
}

impl Simulation {
    /// Creates a simulation from a validated config.
    ///
    /// The player starts at the centre of the world, every system enabled.
    ///
    /// # Arguments
    ///
    /// * `config` - Complete session configuration
    /// * `seed` - Master seed for spawn selection and placement
    ///
    /// # Errors
    ///
    /// [`ConfigError`] if the config fails validation or the arena cannot be
    /// built from it.
    pub fn new(config: ArenaConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        let arena = Arena::from_config(&config)?;
        let player = Player::new(config.grid.bounds().center(), &config.player);
        info!(seed, categories = config.categories.len(), "simulation created");

        Ok(Self {
            arena,
            player,
            spawner: SpawnCoordinator::new(config.spawn.clone(), seed),
            weapon: ShootAbility::new(&config.shoot),
            aura: DamageAura::new(config.aura),
            contact: ContactDamage::new(&config.player),
            enabled: SystemFlags::all(),
            tick: 0,
            elapsed: 0.0,
            master_seed: seed,
            config,
        })
    }

    /// Advance the simulation by `dt` seconds.
    ///
    /// Negative or non-finite `dt` is treated as zero.
    pub fn step(&mut self, dt: f32) -> StepReport {
        let dt = if dt.is_finite() && dt >= 0.0 {
            dt
        } else {
            warn!(dt, "invalid time step, using 0");
            0.0
        };
        let mut report = StepReport::new(self.tick);

        // PHASE 1: CLEANUP
        report.auto_released = self.arena.tick_auto_release(dt);
        self.spawner.cleanup(self.arena.pool());

        // PHASE 2: SPAWN
        let (pool, grid) = self.arena.parts_mut();
        report
            .spawned
            .extend(self.spawner.tick(dt, self.player.position(), pool, grid).spawned());

        // PHASE 3: SYSTEMS
        self.run_systems(dt, &mut report);

        // PHASE 4: ADVANCE
        self.tick += 1;
        self.elapsed += f64::from(dt);
        if !report.is_quiet() {
            debug!(
                tick = report.tick,
                spawned = report.spawned.len(),
                kills = report.kills.len(),
                shots = report.shots_fired,
                "step"
            );
        }
        report
    }

    fn run_systems(&mut self, dt: f32, report: &mut StepReport) {
        let player_alive = self.player.is_alive();

        if player_alive && self.enabled.contains(SystemFlags::PLAYER_MOVEMENT) {
            self.player.step(dt, &self.config.grid.bounds());
        }
        if self.enabled.contains(SystemFlags::ENEMY_MOVEMENT) {
            step_enemies(&mut self.arena, self.player.position(), dt);
        }
        if player_alive {
            let shot = self.weapon.tick(
                &mut self.arena,
                self.player.position(),
                self.player.move_direction(),
                dt,
            );
            if shot.is_some() {
                report.shots_fired += 1;
            }
        }

        let (hits, kills) = step_projectiles(&mut self.arena, dt);
        report.hits = hits;
        report.kills = kills;

        if player_alive {
            report
                .kills
                .extend(self.aura.tick(&mut self.arena, self.player.position(), dt));
        }
        if let Some(hit) = self.contact.tick(&self.arena, &mut self.player, dt) {
            report.player_damage_taken = hit.damage;
            report.player_died = hit.killed;
            if hit.killed {
                info!(tick = self.tick, "player died");
            }
        }
    }

    // =========================================================================
    // Control
    // =========================================================================

    /// Set the player's steering input.
    pub fn set_player_direction(&mut self, direction: Vec2) {
        self.player.set_move_input(direction);
    }

    /// Switch systems on or off.
    ///
    /// Timed systems reset their countdown when switched off: spawning to a
    /// full interval, the abilities and contact damage to zero so they act on
    /// their first tick back.
    pub fn set_systems_enabled(&mut self, systems: SystemFlags, enabled: bool) {
        self.enabled.set(systems, enabled);
        if systems.contains(SystemFlags::SPAWNING) {
            if enabled {
                self.spawner.enable();
            } else {
                self.spawner.disable();
            }
        }
        if systems.contains(SystemFlags::SHOOTING) {
            self.weapon.set_enabled(enabled);
        }
        if systems.contains(SystemFlags::AURA) {
            self.aura.set_enabled(enabled);
        }
        if systems.contains(SystemFlags::CONTACT_DAMAGE) {
            self.contact.set_enabled(enabled);
        }
        debug!(?systems, enabled, "systems toggled");
    }

    /// Systems currently enabled.
    #[must_use]
    pub fn enabled_systems(&self) -> SystemFlags {
        self.enabled
    }

    /// Release every enemy. Returns how many.
    pub fn clear_enemies(&mut self) -> usize {
        let cleared = self.arena.clear_enemies();
        self.spawner.cleanup(self.arena.pool());
        cleared
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Returns a reference to the arena.
    #[must_use]
    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    /// Returns a mutable reference to the arena, for scripted setups.
    pub fn arena_mut(&mut self) -> &mut Arena {
        &mut self.arena
    }

    /// Returns the player.
    #[must_use]
    pub fn player(&self) -> &Player {
        &self.player
    }

    /// Returns the spawner.
    #[must_use]
    pub fn spawner(&self) -> &SpawnCoordinator {
        &self.spawner
    }

    /// Returns the session config.
    #[must_use]
    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    /// Number of completed steps.
    #[must_use]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Simulated seconds.
    #[must_use]
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Returns the master seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.master_seed
    }

    /// Compute a deterministic hash of simulation state.
    ///
    /// Covers the tick, the player, every active entity (id, generation,
    /// category, position, per-kind state) and the grid.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.tick.hash(&mut hasher);

        let p = self.player.position();
        p.x.to_bits().hash(&mut hasher);
        p.y.to_bits().hash(&mut hasher);
        self.player.stats().health.to_bits().hash(&mut hasher);

        for entity in self.arena.pool().iter_active() {
            entity.id().hash(&mut hasher);
            entity.generation().hash(&mut hasher);
            entity.category().hash(&mut hasher);
            let pos = entity.position();
            pos.x.to_bits().hash(&mut hasher);
            pos.y.to_bits().hash(&mut hasher);
            match entity.inner() {
                EntityInner::Enemy(enemy) => {
                    enemy.stats.health.to_bits().hash(&mut hasher);
                }
                EntityInner::Projectile(projectile) => {
                    projectile.direction.x.to_bits().hash(&mut hasher);
                    projectile.direction.y.to_bits().hash(&mut hasher);
                    projectile.last_checked_cell.hash(&mut hasher);
                }
            }
        }

        horde_grid::hash::write_grid(self.arena.grid(), &mut hasher);
        hasher.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::CategoryId;

    const DT: f32 = 1.0 / 60.0;

    fn sim() -> Simulation {
        Simulation::new(ArenaConfig::default(), 42).unwrap()
    }

    mod creation_tests {
        use super::*;

        #[test]
        fn new_creates_simulation() {
            let sim = sim();
            assert_eq!(sim.tick(), 0);
            assert_eq!(sim.seed(), 42);
            assert_eq!(sim.player().position(), Vec2::new(60.0, 60.0));
            assert_eq!(sim.enabled_systems(), SystemFlags::all());
            assert_eq!(sim.arena().enemy_count(), 0);
        }

        #[test]
        fn invalid_config_rejected() {
            let mut config = ArenaConfig::default();
            config.spawn.spawn_radius = -1.0;
            assert!(matches!(Simulation::new(config, 1), Err(ConfigError::Invalid(_))));
        }
    }

    mod step_tests {
        use super::*;

        #[test]
        fn step_advances_tick_and_time() {
            let mut sim = sim();
            let report = sim.step(0.5);
            assert_eq!(report.tick, 0);
            assert_eq!(sim.tick(), 1);
            assert!((sim.elapsed() - 0.5).abs() < 1e-9);
        }

        #[test]
        fn invalid_dt_is_zero() {
            let mut sim = sim();
            sim.step(f32::NAN);
            sim.step(-1.0);
            assert_eq!(sim.elapsed(), 0.0);
            assert_eq!(sim.tick(), 2);
        }

        #[test]
        fn spawns_on_the_ring_around_player() {
            let mut sim = sim();
            sim.set_systems_enabled(SystemFlags::ENEMY_MOVEMENT, false);
            let report = sim.step(0.3);
            let handle = report.spawned[0];
            let pos = sim.arena().get(handle).unwrap().position();
            assert!((pos.distance(sim.player().position()) - 40.0).abs() < 1e-3);
        }

        #[test]
        fn live_ceiling_holds() {
            let mut sim = sim();
            sim.set_systems_enabled(SystemFlags::all() - SystemFlags::SPAWNING, false);
            for _ in 0..200 {
                sim.step(0.3);
            }
            assert!(sim.spawner().live_count() <= 30);
            assert!(sim.arena().enemy_count() <= 30);
            assert!(sim.arena().enemy_count() > 20);
        }

        #[test]
        fn moving_player_shoots() {
            let mut sim = sim();
            sim.set_player_direction(Vec2::X);
            let report = sim.step(DT);
            assert_eq!(report.shots_fired, 1);
            assert_eq!(sim.arena().projectile_count(), 1);
        }

        #[test]
        fn idle_player_does_not_shoot() {
            let mut sim = sim();
            for _ in 0..30 {
                assert_eq!(sim.step(DT).shots_fired, 0);
            }
        }
    }

    mod toggle_tests {
        use super::*;

        #[test]
        fn disabled_spawning_spawns_nothing() {
            let mut sim = sim();
            sim.set_systems_enabled(SystemFlags::SPAWNING, false);
            for _ in 0..100 {
                assert!(sim.step(0.1).spawned.is_empty());
            }
            assert_eq!(sim.arena().enemy_count(), 0);
        }

        #[test]
        fn reenabled_spawning_waits_full_interval() {
            let mut sim = sim();
            sim.step(0.2);
            sim.set_systems_enabled(SystemFlags::SPAWNING, false);
            sim.set_systems_enabled(SystemFlags::SPAWNING, true);
            assert!(sim.step(0.15).spawned.is_empty());
            assert_eq!(sim.step(0.15).spawned.len(), 1);
        }

        #[test]
        fn frozen_enemies_stay_put() {
            let mut sim = sim();
            sim.set_systems_enabled(SystemFlags::all() - SystemFlags::SPAWNING, false);
            let h = sim
                .arena_mut()
                .spawn_at(&CategoryId::new("slow_enemy"), Vec2::new(70.0, 60.0))
                .unwrap();
            sim.step(1.0);
            assert_eq!(sim.arena().get(h).unwrap().position(), Vec2::new(70.0, 60.0));
        }

        #[test]
        fn clear_enemies_empties_grid() {
            let mut sim = sim();
            for _ in 0..10 {
                sim.step(0.3);
            }
            let before = sim.arena().enemy_count();
            assert!(before > 0);
            assert_eq!(sim.clear_enemies(), before);
            assert!(sim.arena().grid().is_empty());
            assert_eq!(sim.spawner().live_count(), 0);
        }
    }

    mod combat_tests {
        use super::*;

        #[test]
        fn aura_kills_enemy_next_to_player() {
            let mut sim = sim();
            sim.set_systems_enabled(SystemFlags::SPAWNING | SystemFlags::ENEMY_MOVEMENT, false);
            let center = sim.player().position();
            let h = sim
                .arena_mut()
                .spawn_at(&CategoryId::new("fast_enemy"), center + Vec2::new(2.0, 0.0))
                .unwrap();

            let mut kills = Vec::new();
            for _ in 0..150 {
                kills.extend(sim.step(DT).kills);
            }

            assert_eq!(kills.len(), 1);
            assert_eq!(kills[0].handle, h);
            assert!(sim.arena().get(h).is_none());
        }

        #[test]
        fn contact_damage_hurts_player() {
            let mut sim = sim();
            sim.set_systems_enabled(
                SystemFlags::SPAWNING | SystemFlags::ENEMY_MOVEMENT | SystemFlags::AURA,
                false,
            );
            let center = sim.player().position();
            sim.arena_mut()
                .spawn_at(&CategoryId::new("slow_enemy"), center + Vec2::new(0.5, 0.0))
                .unwrap();

            let report = sim.step(DT);

            assert_eq!(report.player_damage_taken, 10.0);
            assert_eq!(sim.player().stats().health, 90.0);
        }

        #[test]
        fn player_death_is_reported_once() {
            let mut config = ArenaConfig::default();
            config.player.max_health = 5.0;
            let mut sim = Simulation::new(config, 7).unwrap();
            sim.set_systems_enabled(
                SystemFlags::SPAWNING | SystemFlags::ENEMY_MOVEMENT | SystemFlags::AURA,
                false,
            );
            let center = sim.player().position();
            sim.arena_mut()
                .spawn_at(&CategoryId::new("slow_enemy"), center)
                .unwrap();

            assert!(sim.step(DT).player_died);
            for _ in 0..120 {
                assert!(!sim.step(DT).player_died);
            }
            assert!(!sim.player().is_alive());
        }
    }
}
