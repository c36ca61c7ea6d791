//! Component structs for entity types.
//!
//! The component structs hold all per-kind state for an entity. Values that
//! come from balance data (max health, speed, damage) are fixed when the pool
//! constructs the instance; per-use state (current health, last checked cell)
//! is reset every time the instance is acquired.

use glam::Vec2;
use horde_grid::CellCoord;
use serde::{Deserialize, Serialize};

/// Position and facing of an entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TransformState {
    /// World position
    pub position: Vec2,
    /// Facing in radians, counter-clockwise from +x
    pub heading: f32,
}

impl TransformState {
    /// Creates a transform at `position` facing `heading`.
    #[must_use]
    pub const fn new(position: Vec2, heading: f32) -> Self {
        Self { position, heading }
    }

    /// Turn to face along `direction`. Zero directions keep the old heading.
    pub fn face(&mut self, direction: Vec2) {
        if direction != Vec2::ZERO {
            self.heading = direction.y.atan2(direction.x);
        }
    }
}

/// Health and combat values of an enemy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemyStats {
    /// Health restored on every acquire
    pub max_health: f32,
    /// Current health, never below zero
    pub health: f32,
    /// World units per second
    pub move_speed: f32,
    /// Damage dealt to the player per contact tick
    pub damage: f32,
    /// Experience reported when killed
    pub experience_drop: u32,
}

impl EnemyStats {
    /// Creates full-health stats.
    #[must_use]
    pub const fn new(max_health: f32, move_speed: f32, damage: f32, experience_drop: u32) -> Self {
        Self {
            max_health,
            health: max_health,
            move_speed,
            damage,
            experience_drop,
        }
    }

    /// True while health is above zero.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    /// Subtract `amount`, clamping at zero.
    ///
    /// Returns `true` if this call killed the enemy. Damage to a dead enemy
    /// is ignored.
    pub fn take_damage(&mut self, amount: f32) -> bool {
        if !self.is_alive() {
            return false;
        }
        self.health = (self.health - amount).max(0.0);
        !self.is_alive()
    }

    /// Restore full health.
    pub fn restore(&mut self) {
        self.health = self.max_health;
    }
}

impl Default for EnemyStats {
    fn default() -> Self {
        Self::new(10.0, 2.0, 5.0, 1)
    }
}

/// Components for Enemy entities.
///
/// Enemies chase the player, occupy grid cells and block each other.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnemyComponents {
    /// Health and combat values
    pub stats: EnemyStats,
}

impl EnemyComponents {
    /// Creates enemy components from stats.
    #[must_use]
    pub const fn new(stats: EnemyStats) -> Self {
        Self { stats }
    }
}

/// Components for Projectile entities.
///
/// Projectiles fly in a straight line and are not registered in the grid;
/// they only read it to find something to hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectileComponents {
    /// Unit flight direction
    pub direction: Vec2,
    /// World units per second
    pub speed: f32,
    /// Damage applied on hit
    pub damage: f32,
    /// Cell checked for hits on the previous move, if any
    pub last_checked_cell: Option<CellCoord>,
}

impl ProjectileComponents {
    /// Creates a projectile flying along `direction` (normalized here).
    #[must_use]
    pub fn new(direction: Vec2, speed: f32, damage: f32) -> Self {
        Self {
            direction: direction.normalize_or_zero(),
            speed,
            damage,
            last_checked_cell: None,
        }
    }

    /// Aim along `direction` and forget the last checked cell.
    pub fn launch(&mut self, direction: Vec2) {
        self.direction = direction.normalize_or_zero();
        self.last_checked_cell = None;
    }

    /// Displacement over `dt` seconds.
    #[must_use]
    pub fn velocity_step(&self, dt: f32) -> Vec2 {
        self.direction * self.speed * dt
    }
}

impl Default for ProjectileComponents {
    fn default() -> Self {
        Self::new(Vec2::X, 17.0, 10.0)
    }
}
