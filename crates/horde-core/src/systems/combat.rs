//! Damage to enemies.

use tracing::{debug, error};

use crate::arena::Arena;
use crate::entity::EntityHandle;
use crate::pool::PooledEntity;
use crate::report::Kill;

/// Apply `amount` of damage to the enemy behind `target`.
///
/// Health is clamped at zero. The blow that takes it there releases the
/// enemy immediately and yields a [`Kill`]. Stale handles, projectiles and
/// already-dead enemies are ignored.
pub fn apply_enemy_damage(arena: &mut Arena, target: EntityHandle, amount: f32) -> Option<Kill> {
    let entity = arena.get_mut(target)?;
    let position = entity.position();
    let category = entity.category().clone();
    let stats = &mut entity.as_enemy_mut()?.stats;
    if !stats.take_damage(amount) {
        return None;
    }
    let experience = stats.experience_drop;

    if let Err(err) = arena.despawn(target) {
        error!(%target, %err, "failed to release killed enemy");
    }
    debug!(%target, %category, experience, "enemy killed");
    Some(Kill {
        handle: target,
        category,
        position,
        experience,
    })
}
