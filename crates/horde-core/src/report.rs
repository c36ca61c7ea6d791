//! What happened during one simulation step.
//!
//! Systems return these values instead of raising events; the
//! [`crate::simulation::Simulation`] gathers them into a [`StepReport`].

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::entity::{CategoryId, EntityHandle};

/// An enemy was killed and released.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kill {
    /// Handle the enemy had while alive (stale now)
    pub handle: EntityHandle,
    /// Its category
    pub category: CategoryId,
    /// Where it died
    pub position: Vec2,
    /// Experience it was worth
    pub experience: u32,
}

/// A projectile struck an enemy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    /// The projectile, released on impact
    pub projectile: EntityHandle,
    /// The enemy struck
    pub target: EntityHandle,
    /// Damage dealt
    pub damage: f32,
}

/// Summary of one [`crate::simulation::Simulation::step`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepReport {
    /// Tick number this report describes (0 for the first step)
    pub tick: u64,
    /// Entities placed by the spawner
    pub spawned: Vec<EntityHandle>,
    /// Entities released by their auto-release timer
    pub auto_released: Vec<EntityHandle>,
    /// Projectile impacts
    pub hits: Vec<Hit>,
    /// Enemies killed, by any cause
    pub kills: Vec<Kill>,
    /// Projectiles launched
    pub shots_fired: u32,
    /// Contact damage applied to the player
    pub player_damage_taken: f32,
    /// The player died during this step
    pub player_died: bool,
}

impl StepReport {
    /// Empty report for `tick`.
    #[must_use]
    pub fn new(tick: u64) -> Self {
        Self {
            tick,
            ..Self::default()
        }
    }

    /// Sum of experience from this step's kills.
    #[must_use]
    pub fn experience_gained(&self) -> u32 {
        self.kills.iter().map(|k| k.experience).sum()
    }

    /// True if nothing observable happened.
    #[must_use]
    pub fn is_quiet(&self) -> bool {
        self.spawned.is_empty()
            && self.auto_released.is_empty()
            && self.hits.is_empty()
            && self.kills.is_empty()
            && self.shots_fired == 0
            && self.player_damage_taken == 0.0
    }
}
