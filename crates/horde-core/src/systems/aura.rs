//! Damage aura around the player.

use glam::Vec2;

use crate::arena::Arena;
use crate::config::AuraConfig;
use crate::report::Kill;
use crate::systems::combat::apply_enemy_damage;
use crate::timer::Countdown;

/// Pulses damage to every enemy within `radius` of the player.
///
/// The first pulse lands on the first tick; later pulses every
/// `attack_cooldown` seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct DamageAura {
    config: AuraConfig,
    timer: Countdown,
    enabled: bool,
}

impl DamageAura {
    /// An aura that pulses on its first tick.
    #[must_use]
    pub fn new(config: AuraConfig) -> Self {
        Self {
            config,
            timer: Countdown::elapsed(),
            enabled: true,
        }
    }

    /// Switch on or off. Switching off resets the timer, so the aura pulses
    /// right away when switched back on.
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

    /// Advance the timer; on a pulse damage everything in range.
    ///
    /// Returns the kills, empty between pulses.
    pub fn tick(&mut self, arena: &mut Arena, center: Vec2, dt: f32) -> Vec<Kill> {
        if !self.enabled {
            return Vec::new();
        }
        if !self.timer.advance(dt) {
            return Vec::new();
        }
        self.timer.restart(self.config.attack_cooldown);

        arena
            .enemies_in_radius(center, self.config.radius)
            .into_iter()
            .filter_map(|target| apply_enemy_damage(arena, target, self.config.base_damage))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ArenaConfig;
    use crate::entity::CategoryId;

    const CENTER: Vec2 = Vec2::new(60.0, 60.0);

    fn setup() -> Arena {
        Arena::from_config(&ArenaConfig::default()).unwrap()
    }

    fn health(arena: &Arena, h: crate::entity::EntityHandle) -> f32 {
        arena.get(h).unwrap().as_enemy().unwrap().stats.health
    }

    #[test]
    fn pulses_on_first_tick_then_on_cooldown() {
        let mut arena = setup();
        let near = arena.spawn_at(&CategoryId::new("slow_enemy"), CENTER + Vec2::X).unwrap();
        let far = arena.spawn_at(&CategoryId::new("slow_enemy"), CENTER + Vec2::X * 10.0).unwrap();
        let mut aura = DamageAura::new(AuraConfig::default());

        aura.tick(&mut arena, CENTER, 0.05);
        assert_eq!(health(&arena, near), 19.0);
        assert_eq!(health(&arena, far), 20.0);

        aura.tick(&mut arena, CENTER, 0.1);
        assert_eq!(health(&arena, near), 19.0);
        aura.tick(&mut arena, CENTER, 0.1);
        assert_eq!(health(&arena, near), 18.0);
    }

    #[test]
    fn lethal_pulse_reports_kills() {
        let mut arena = setup();
        arena.spawn_at(&CategoryId::new("fast_enemy"), CENTER + Vec2::Y).unwrap();
        arena.spawn_at(&CategoryId::new("fast_enemy"), CENTER - Vec2::Y * 2.5).unwrap();
        let mut aura = DamageAura::new(AuraConfig {
            base_damage: 50.0,
            ..AuraConfig::default()
        });

        let kills = aura.tick(&mut arena, CENTER, 0.016);
        assert_eq!(kills.len(), 2);
        assert_eq!(arena.enemy_count(), 0);
    }

    #[test]
    fn frame_rate_steps_pulse_on_cooldown_tick() {
        let mut arena = setup();
        let h = arena.spawn_at(&CategoryId::new("slow_enemy"), CENTER).unwrap();
        let mut aura = DamageAura::new(AuraConfig::default());
        let dt: f32 = 1.0 / 60.0;

        aura.tick(&mut arena, CENTER, dt);
        for _ in 0..11 {
            aura.tick(&mut arena, CENTER, dt);
        }
        assert_eq!(health(&arena, h), 19.0);

        // 12 steps of 1/60 s add up to the 0.2 s cooldown.
        aura.tick(&mut arena, CENTER, dt);
        assert_eq!(health(&arena, h), 18.0);
    }

    #[test]
    fn reenable_pulses_immediately() {
        let mut arena = setup();
        let h = arena.spawn_at(&CategoryId::new("slow_enemy"), CENTER).unwrap();
        let mut aura = DamageAura::new(AuraConfig::default());
        aura.tick(&mut arena, CENTER, 0.01);

        aura.set_enabled(false);
        aura.tick(&mut arena, CENTER, 1.0);
        assert_eq!(health(&arena, h), 19.0);

        aura.set_enabled(true);
        aura.tick(&mut arena, CENTER, 0.01);
        assert_eq!(health(&arena, h), 18.0);
    }
}
