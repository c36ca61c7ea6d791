//! # Horde Core
//!
//! Real-time arena simulation core: pooled entities, weighted spawning and
//! the systems that move and damage a horde around a single player.
//!
//! ## Architecture
//!
//! - **Pool**: [`EntityPool`] recycles instances per category, with optional
//!   timed auto-release and generation-checked handles
//! - **Grid**: [`horde_grid::GridIndex`] answers occupancy and radius queries;
//!   the pool keeps it in step on every acquire, move and release
//! - **Spawning**: [`SpawnCoordinator`] picks a category with a
//!   [`WeightedSelector`] and places it on a ring around the player
//! - **Systems**: movement, shooting, projectiles, aura and contact damage,
//!   run in a fixed order by [`Simulation::step`]
//!
//! ## Usage
//!
//! ```rust
//! use glam::Vec2;
//! use horde_core::{ArenaConfig, Simulation};
//!
//! let mut sim = Simulation::new(ArenaConfig::default(), 7).unwrap();
//! sim.set_player_direction(Vec2::new(1.0, 1.0));
//! let report = sim.step(1.0 / 60.0);
//! assert_eq!(report.tick, 0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Re-export the grid for spatial queries
pub use horde_grid;

pub mod arena;
pub mod config;
pub mod entity;
pub mod error;
pub mod player;
pub mod pool;
pub mod report;
pub mod selector;
pub mod simulation;
pub mod spawn;
pub mod systems;
pub mod timer;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use arena::Arena;
pub use config::ArenaConfig;
pub use entity::{CategoryId, Entity, EntityHandle, EntityId};
pub use error::{ConfigError, PoolError, SelectError, SpawnError};
pub use player::Player;
pub use pool::{EntityPool, PooledEntity, Released};
pub use report::StepReport;
pub use selector::WeightedSelector;
pub use simulation::{Simulation, SystemFlags};
pub use spawn::{SpawnCoordinator, SpawnOutcome};
pub use timer::Countdown;
