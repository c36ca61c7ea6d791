//! Per-tick gameplay systems.
//!
//! Each system is a function or a small timer struct that works against an
//! [`crate::arena::Arena`] passed in by the caller. Systems report what they
//! did through return values; [`crate::simulation::Simulation`] runs them in
//! a fixed order and collects the results.
//!
//! | System | Runs | Effect |
//! |--------|------|--------|
//! | [`movement::step_enemies`] | every tick | enemies chase the player, blocked by occupied cells |
//! | [`weapon::ShootAbility`] | on cooldown | fires a projectile along the steering direction |
//! | [`projectile::step_projectiles`] | every tick | projectiles fly and hit the first enemy in a new cell |
//! | [`aura::DamageAura`] | on cooldown | damages every enemy near the player |
//! | [`contact::ContactDamage`] | on interval | enemies near the player damage it |

pub mod aura;
pub mod combat;
pub mod contact;
pub mod movement;
pub mod projectile;
pub mod weapon;

pub use aura::DamageAura;
pub use combat::apply_enemy_damage;
pub use contact::{ContactDamage, ContactHit};
pub use movement::step_enemies;
pub use projectile::step_projectiles;
pub use weapon::ShootAbility;
