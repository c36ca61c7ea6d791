//! Test helper functions for setting up simulations and entities.
//!
//! This module provides factory functions and setup utilities that make
//! writing tests more ergonomic and consistent.

use glam::Vec2;

use crate::config::ArenaConfig;
use crate::entity::{CategoryId, EntityHandle};
use crate::simulation::{Simulation, SystemFlags};

/// Fixed time step used by the scenario tests.
pub const DT: f32 = 1.0 / 60.0;

// =============================================================================
// Test Scenario Setup
// =============================================================================

/// A simulation with the default config and the given seed.
pub fn default_sim(seed: u64) -> Simulation {
    Simulation::new(ArenaConfig::default(), seed).expect("default config is valid")
}

/// A simulation where only the listed systems run.
///
/// Handy for scripting a scene by hand without the spawner interfering.
pub fn sim_with_only(systems: SystemFlags) -> Simulation {
    let mut sim = default_sim(1);
    sim.set_systems_enabled(SystemFlags::all() - systems, false);
    sim
}

/// Place an enemy of `category` at an offset from the player.
pub fn spawn_near_player(sim: &mut Simulation, category: &str, offset: Vec2) -> EntityHandle {
    let at = sim.player().position() + offset;
    sim.arena_mut()
        .spawn_at(&CategoryId::new(category), at)
        .expect("spawn in test scene")
}

/// Run `steps` fixed steps with a steering input schedule.
///
/// `steer(i)` is the input applied before step `i`. Returns the state hash
/// after every step.
pub fn run_scripted<F>(sim: &mut Simulation, steps: usize, steer: F) -> Vec<u64>
where
    F: Fn(usize) -> Vec2,
{
    (0..steps)
        .map(|i| {
            sim.set_player_direction(steer(i));
            sim.step(DT);
            sim.state_hash()
        })
        .collect()
}

/// Steering that walks a slow square around the arena centre.
pub fn square_walk(i: usize) -> Vec2 {
    match (i / 90) % 4 {
        0 => Vec2::X,
        1 => Vec2::Y,
        2 => Vec2::NEG_X,
        _ => Vec2::NEG_Y,
    }
}

// =============================================================================
// State Accessors
// =============================================================================

/// Health of the enemy behind `handle`, if it is still alive.
pub fn enemy_health(sim: &Simulation, handle: EntityHandle) -> Option<f32> {
    sim.arena()
        .get(handle)
        .and_then(|e| e.as_enemy())
        .map(|e| e.stats.health)
}

/// Position of the entity behind `handle`.
pub fn position_of(sim: &Simulation, handle: EntityHandle) -> Option<Vec2> {
    sim.arena().get(handle).map(crate::entity::Entity::position)
}
