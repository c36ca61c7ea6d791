//! Enemy pursuit.

use glam::Vec2;

use crate::arena::Arena;
use crate::entity::Entity;

/// Move every live enemy toward `target` by `move_speed * dt`.
///
/// Enemies run in ascending id order. An enemy only moves if the cell it
/// would enter is free of other enemies; otherwise it waits this tick.
/// Returns how many enemies moved.
pub fn step_enemies(arena: &mut Arena, target: Vec2, dt: f32) -> usize {
    let mut moved = 0;
    for handle in arena.handles_where(Entity::is_enemy) {
        let Some(entity) = arena.get_mut(handle) else {
            continue;
        };
        let Some(speed) = entity
            .as_enemy()
            .filter(|e| e.stats.is_alive())
            .map(|e| e.stats.move_speed)
        else {
            continue;
        };

        let position = entity.position();
        let direction = (target - position).normalize_or_zero();
        entity.transform.face(direction);
        let next = position + direction * speed * dt;
        if next == position || arena.is_position_blocked(next, Some(handle.id)) {
            continue;
        }
        if arena.relocate(handle, next) {
            moved += 1;
        }
    }
    moved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ArenaConfig;
    use crate::entity::CategoryId;
    use horde_grid::SpatialEntity;

    fn arena() -> Arena {
        Arena::from_config(&ArenaConfig::default()).unwrap()
    }

    fn slow() -> CategoryId {
        CategoryId::new("slow_enemy")
    }

    #[test]
    fn enemy_walks_toward_target() {
        let mut arena = arena();
        let h = arena.spawn_at(&slow(), Vec2::new(10.0, 10.0)).unwrap();

        assert_eq!(step_enemies(&mut arena, Vec2::new(30.0, 10.0), 0.5), 1);

        let entity = arena.get(h).unwrap();
        assert!((entity.position() - Vec2::new(11.0, 10.0)).length() < 1e-5);
        assert_eq!(entity.current_cell(), Some(arena.grid().cell_of(Vec2::new(11.0, 10.0))));
    }

    #[test]
    fn crossing_cells_updates_grid() {
        let mut arena = arena();
        let h = arena.spawn_at(&slow(), Vec2::new(2.9, 1.0)).unwrap();

        step_enemies(&mut arena, Vec2::new(30.0, 1.0), 0.5);

        let entity = arena.get(h).unwrap();
        assert!(arena.grid().contains(arena.grid().cell_of(entity.position()), h.id));
        assert!(!arena.is_position_blocked(Vec2::new(1.0, 1.0), None));
    }

    #[test]
    fn blocked_cell_stops_enemy() {
        let mut arena = arena();
        let mover = arena.spawn_at(&slow(), Vec2::new(5.9, 1.0)).unwrap();
        let wall = arena.spawn_at(&slow(), Vec2::new(7.0, 1.0)).unwrap();

        // The wall stands on the target, so it never moves.
        step_enemies(&mut arena, Vec2::new(7.0, 1.0), 0.5);

        let mover_pos = arena.get(mover).unwrap().position();
        assert_eq!(mover_pos, Vec2::new(5.9, 1.0));
        assert!(arena.get(wall).is_some());
    }

    #[test]
    fn enemy_at_target_stays() {
        let mut arena = arena();
        let h = arena.spawn_at(&slow(), Vec2::new(10.0, 10.0)).unwrap();
        assert_eq!(step_enemies(&mut arena, Vec2::new(10.0, 10.0), 1.0), 0);
        assert_eq!(arena.get(h).unwrap().position(), Vec2::new(10.0, 10.0));
    }

    #[test]
    fn projectiles_are_not_moved() {
        let mut arena = arena();
        let p = arena.spawn_at(&CategoryId::new("direction_arrow"), Vec2::new(10.0, 10.0)).unwrap();
        assert_eq!(step_enemies(&mut arena, Vec2::new(30.0, 10.0), 1.0), 0);
        assert_eq!(arena.get(p).unwrap().position(), Vec2::new(10.0, 10.0));
    }
}
