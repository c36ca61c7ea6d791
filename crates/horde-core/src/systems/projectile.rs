//! Projectile flight and impact.
//!
//! Projectiles are not in the grid; they read it. After each move a
//! projectile looks at the cell it is in, but only when that cell differs
//! from the one it looked at last, so a slow projectile does not hit the same
//! cell twice. The first live enemy in an occupied cell (ascending id) takes
//! the damage and the projectile is released on the spot.

use horde_grid::CellCoord;
use tracing::error;

use crate::arena::Arena;
use crate::entity::{Entity, EntityHandle};
use crate::report::{Hit, Kill};
use crate::systems::combat::apply_enemy_damage;

/// Advance every active projectile by `dt` and resolve impacts.
///
/// Returns the hits in projectile id order, plus the kills they caused.
pub fn step_projectiles(arena: &mut Arena, dt: f32) -> (Vec<Hit>, Vec<Kill>) {
    let mut hits = Vec::new();
    let mut kills = Vec::new();

    for handle in arena.handles_where(Entity::is_projectile) {
        let Some((next, damage)) = arena.get(handle).and_then(|e| {
            e.as_projectile()
                .map(|p| (e.position() + p.velocity_step(dt), p.damage))
        }) else {
            continue;
        };
        let cell = arena.grid().cell_of(next);

        let Some(projectile) = arena.get_mut(handle).and_then(Entity::as_projectile_mut) else {
            continue;
        };
        let entered_new_cell = projectile.last_checked_cell != Some(cell);
        projectile.last_checked_cell = Some(cell);
        arena.relocate(handle, next);

        if !entered_new_cell || !arena.grid().is_occupied(cell, None) {
            continue;
        }
        let Some(target) = first_live_enemy(arena, cell) else {
            continue;
        };

        kills.extend(apply_enemy_damage(arena, target, damage));
        if let Err(err) = arena.despawn(handle) {
            error!(%handle, %err, "failed to release projectile after hit");
        }
        hits.push(Hit {
            projectile: handle,
            target,
            damage,
        });
    }
    (hits, kills)
}

fn first_live_enemy(arena: &Arena, cell: CellCoord) -> Option<EntityHandle> {
    arena
        .grid()
        .elements_in_cell(cell)
        .into_iter()
        .filter_map(|id| arena.pool().handle_of(id))
        .find(|&h| arena.is_live_enemy(h))
}
