//! The player's projectile weapon.

use glam::Vec2;
use tracing::{trace, warn};

use crate::arena::Arena;
use crate::config::ShootConfig;
use crate::entity::{CategoryId, Entity, EntityHandle};
use crate::timer::Countdown;

/// Fires a projectile along the player's steering direction whenever the
/// cooldown allows.
///
/// The cooldown restarts only when a shot actually leaves: standing still or
/// an exhausted projectile pool keeps the weapon ready for the next tick.
#[derive(Debug, Clone, PartialEq)]
pub struct ShootAbility {
    category: CategoryId,
    damage: f32,
    speed: f32,
    cooldown: f32,
    timer: Countdown,
    enabled: bool,
}

impl ShootAbility {
    /// A ready weapon.
    #[must_use]
    pub fn new(config: &ShootConfig) -> Self {
        Self {
            category: config.category_id.clone(),
            damage: config.base_damage,
            speed: config.projectile_speed,
            cooldown: config.attack_cooldown,
            timer: Countdown::elapsed(),
            enabled: true,
        }
    }

    /// Switch on or off. Switching off clears the cooldown.
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

    /// True if the next tick may fire.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.timer.is_done()
    }

    /// Count the cooldown down and fire if possible.
    ///
    /// `direction` is the player's steering direction, `None` when idle.
    pub fn tick(
        &mut self,
        arena: &mut Arena,
        origin: Vec2,
        direction: Option<Vec2>,
        dt: f32,
    ) -> Option<EntityHandle> {
        if !self.enabled {
            return None;
        }
        if !self.timer.is_done() {
            self.timer.advance(dt);
        }
        if !self.is_ready() {
            return None;
        }
        let direction = direction?;

        let handle = match arena.spawn_at(&self.category, origin) {
            Ok(handle) => handle,
            Err(err) => {
                warn!(category = %self.category, %err, "shot skipped");
                return None;
            }
        };
        if let Some(projectile) = arena.get_mut(handle).and_then(Entity::as_projectile_mut) {
            projectile.speed = self.speed;
            projectile.damage = self.damage;
            projectile.launch(direction);
        }
        if let Some(entity) = arena.get_mut(handle) {
            entity.transform.face(direction);
        }
        self.timer.restart(self.cooldown);
        trace!(%handle, "shot fired");
        Some(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ArenaConfig, CategoryConfig};

    fn setup() -> (Arena, ShootAbility) {
        let config = ArenaConfig::default();
        let arena = Arena::from_config(&config).unwrap();
        (arena, ShootAbility::new(&config.shoot))
    }

    const ORIGIN: Vec2 = Vec2::new(60.0, 60.0);

    #[test]
    fn fires_immediately_then_waits() {
        let (mut arena, mut weapon) = setup();

        let shot = weapon.tick(&mut arena, ORIGIN, Some(Vec2::X), 0.1).unwrap();
        let projectile = arena.get(shot).unwrap().as_projectile().unwrap();
        assert_eq!(projectile.direction, Vec2::X);
        assert_eq!(projectile.speed, 17.0);

        assert!(weapon.tick(&mut arena, ORIGIN, Some(Vec2::X), 0.2).is_none());
        assert!(weapon.tick(&mut arena, ORIGIN, Some(Vec2::X), 0.3).is_some());
    }

    #[test]
    fn frame_rate_steps_refire_on_cooldown_tick() {
        let (mut arena, mut weapon) = setup();
        let dt: f32 = 1.0 / 60.0;

        let shots: Vec<usize> = (1..=60)
            .filter(|_| weapon.tick(&mut arena, ORIGIN, Some(Vec2::X), dt).is_some())
            .collect();

        // 0.45 s cooldown = 27 steps.
        assert_eq!(shots, vec![1, 28, 55]);
    }

    #[test]
    fn idle_player_keeps_weapon_ready() {
        let (mut arena, mut weapon) = setup();
        assert!(weapon.tick(&mut arena, ORIGIN, None, 0.1).is_none());
        assert!(weapon.is_ready());
        assert!(weapon.tick(&mut arena, ORIGIN, Some(Vec2::Y), 0.0).is_some());
    }

    #[test]
    fn exhausted_pool_skips_without_cooldown() {
        let mut config = ArenaConfig::default();
        config.categories[2] = CategoryConfig::new("direction_arrow", 0, 0);
        let mut arena = Arena::from_config(&config).unwrap();
        let mut weapon = ShootAbility::new(&config.shoot);

        assert!(weapon.tick(&mut arena, ORIGIN, Some(Vec2::X), 0.1).is_none());
        assert!(weapon.is_ready());
    }

    #[test]
    fn disable_clears_cooldown() {
        let (mut arena, mut weapon) = setup();
        weapon.tick(&mut arena, ORIGIN, Some(Vec2::X), 0.1).unwrap();
        weapon.set_enabled(false);
        assert!(weapon.tick(&mut arena, ORIGIN, Some(Vec2::X), 0.1).is_none());
        weapon.set_enabled(true);
        assert!(weapon.tick(&mut arena, ORIGIN, Some(Vec2::X), 0.0).is_some());
    }
}
