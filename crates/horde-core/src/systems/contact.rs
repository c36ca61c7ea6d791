//! Contact damage: enemies touching the player hurt it.

use glam::Vec2;
use tracing::debug;

use crate::arena::Arena;
use crate::config::PlayerConfig;
use crate::player::Player;
use crate::timer::Countdown;

/// Periodically sums the damage of enemies within `damage_radius` of the
/// player and applies it.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactDamage {
    radius: f32,
    interval: f32,
    timer: Countdown,
    enabled: bool,
}

/// One contact damage tick that found enemies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactHit {
    /// Damage applied to the player
    pub damage: f32,
    /// Enemies that contributed
    pub attackers: usize,
    /// The player died from it
    pub killed: bool,
}

impl ContactDamage {
    /// Damage is checked on the first tick.
    #[must_use]
    pub fn new(config: &PlayerConfig) -> Self {
        Self {
            radius: config.damage_radius,
            interval: config.damage_interval,
            timer: Countdown::elapsed(),
            enabled: true,
        }
    }

    /// Switch on or off. Switching off resets the timer.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.timer.finish();
        }
    }

    /// True while switched on.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Advance the timer and apply contact damage when it runs out.
    ///
    /// The timer is frozen while the player is dead.
    pub fn tick(&mut self, arena: &Arena, player: &mut Player, dt: f32) -> Option<ContactHit> {
        if !self.enabled || !player.is_alive() {
            return None;
        }
        if !self.timer.advance(dt) {
            return None;
        }
        self.timer.restart(self.interval);

        let (damage, attackers) = contact_damage(arena, player.position(), self.radius);
        if damage <= 0.0 {
            return None;
        }
        let killed = player.take_damage(damage);
        debug!(damage, attackers, health = player.stats().health, "player took contact damage");
        Some(ContactHit {
            damage,
            attackers,
            killed,
        })
    }
}

/// Total damage and number of live enemies within `radius` of `center`.
fn contact_damage(arena: &Arena, center: Vec2, radius: f32) -> (f32, usize) {
    arena
        .enemies_in_radius(center, radius)
        .into_iter()
        .filter_map(|h| arena.get(h).and_then(|e| e.as_enemy()))
        .fold((0.0, 0), |(sum, n), enemy| (sum + enemy.stats.damage, n + 1))
}
