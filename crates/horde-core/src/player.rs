//! The player: steered by input, chased by enemies.
//!
//! The player is not pooled and never registered in the grid. Enemies read
//! its position as their target; contact damage and abilities are centred
//! on it.

use glam::Vec2;
use horde_grid::GridBounds;
use serde::{Deserialize, Serialize};

use crate::config::PlayerConfig;

/// Inputs shorter than this (squared) leave the player standing still.
pub const MIN_INPUT_SQ: f32 = 0.01;

/// Player health and speed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    /// Health ceiling
    pub max_health: f32,
    /// Current health, never below zero
    pub health: f32,
    /// World units per second
    pub move_speed: f32,
}

impl PlayerStats {
    /// Full-health stats from config.
    #[must_use]
    pub fn from_config(config: &PlayerConfig) -> Self {
        Self {
            max_health: config.max_health,
            health: config.max_health,
            move_speed: config.move_speed,
        }
    }
}

/// The player character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    position: Vec2,
    move_input: Vec2,
    stats: PlayerStats,
}

impl Player {
    /// Creates a full-health player at `position` standing still.
    #[must_use]
    pub fn new(position: Vec2, config: &PlayerConfig) -> Self {
        Self {
            position,
            move_input: Vec2::ZERO,
            stats: PlayerStats::from_config(config),
        }
    }

    /// World position.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Health and speed.
    #[must_use]
    pub const fn stats(&self) -> &PlayerStats {
        &self.stats
    }

    /// Raw steering input as last set.
    #[must_use]
    pub const fn move_input(&self) -> Vec2 {
        self.move_input
    }

    /// Unit direction the player is steering in, or `None` when idle.
    #[must_use]
    pub fn move_direction(&self) -> Option<Vec2> {
        (self.move_input.length_squared() >= MIN_INPUT_SQ).then(|| self.move_input.normalize())
    }

    /// Set the steering input. Non-finite input counts as idle.
    pub fn set_move_input(&mut self, input: Vec2) {
        self.move_input = if input.is_finite() { input } else { Vec2::ZERO };
    }

    /// Move along the steering input for `dt` seconds, staying in `bounds`.
    ///
    /// Dead players do not move.
    pub fn step(&mut self, dt: f32, bounds: &GridBounds) {
        if !self.is_alive() {
            return;
        }
        if let Some(direction) = self.move_direction() {
            self.position = bounds.clamp(self.position + direction * self.stats.move_speed * dt);
        }
    }

    /// True while health is above zero.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.stats.health > 0.0
    }

    /// Subtract `amount`, clamping at zero.
    ///
    /// Returns `true` if this call killed the player. Damage to a dead
    /// player is ignored.
    pub fn take_damage(&mut self, amount: f32) -> bool {
        if !self.is_alive() {
            return false;
        }
        self.stats.health = (self.stats.health - amount).max(0.0);
        !self.is_alive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player() -> Player {
        Player::new(Vec2::new(60.0, 60.0), &PlayerConfig::default())
    }

    const BOUNDS: GridBounds = GridBounds::new(120.0, 120.0);

    #[test]
    fn idle_input_does_not_move() {
        let mut p = player();
        p.set_move_input(Vec2::new(0.05, 0.0));
        p.step(1.0, &BOUNDS);
        assert_eq!(p.position(), Vec2::new(60.0, 60.0));
        assert!(p.move_direction().is_none());
    }

    #[test]
    fn input_is_normalized() {
        let mut p = player();
        p.set_move_input(Vec2::new(10.0, 0.0));
        p.step(1.0, &BOUNDS);
        assert_eq!(p.position(), Vec2::new(65.0, 60.0));
    }

    #[test]
    fn movement_is_clamped_to_world() {
        let mut p = player();
        p.set_move_input(Vec2::new(-1.0, 0.0));
        p.step(100.0, &BOUNDS);
        assert_eq!(p.position(), Vec2::new(0.0, 60.0));
    }

    #[test]
    fn nan_input_is_idle() {
        let mut p = player();
        p.set_move_input(Vec2::new(f32::NAN, 1.0));
        assert_eq!(p.move_input(), Vec2::ZERO);
    }

    #[test]
    fn damage_clamps_and_kills_once() {
        let mut p = player();
        assert!(!p.take_damage(60.0));
        assert!(p.take_damage(60.0));
        assert_eq!(p.stats().health, 0.0);
        assert!(!p.take_damage(10.0));
        assert!(!p.is_alive());
    }

    #[test]
    fn dead_player_stays_put() {
        let mut p = player();
        p.take_damage(1000.0);
        p.set_move_input(Vec2::X);
        p.step(1.0, &BOUNDS);
        assert_eq!(p.position(), Vec2::new(60.0, 60.0));
    }
}
