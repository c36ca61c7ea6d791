//! horde-harness: run a headless arena session and print a summary.
//!
//! Usage:
//!   cargo run --bin horde-harness -- [steps] [seed] [config.json]
//! Example:
//!   `RUST_LOG=horde_core=debug cargo run --bin horde-harness -- 3600 42`
//!
//! The player walks a square around the arena centre. With the same
//! arguments the printed state hash is identical on every run.

use anyhow::{Context, Result};
use glam::Vec2;
use horde_core::{ArenaConfig, Simulation};
use tracing::info;
use tracing_subscriber::EnvFilter;

const DT: f32 = 1.0 / 60.0;
const DEFAULT_STEPS: usize = 3600;
const DEFAULT_SEED: u64 = 42;

/// Seconds spent walking each side of the square.
const LEG_SECONDS: f32 = 2.0;

fn steering(step: usize) -> Vec2 {
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss
    )]
    let leg = ((step as f32 * DT) / LEG_SECONDS) as usize;
    match leg % 4 {
        0 => Vec2::X,
        1 => Vec2::Y,
        2 => Vec2::NEG_X,
        _ => Vec2::NEG_Y,
    }
}

fn load_config(path: Option<&str>) -> Result<ArenaConfig> {
    let Some(path) = path else {
        return Ok(ArenaConfig::default());
    };
    let json = std::fs::read_to_string(path).with_context(|| format!("read config '{path}'"))?;
    ArenaConfig::from_json_str(&json).with_context(|| format!("parse config '{path}'"))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("horde_harness=info".parse()?),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let steps = match args.first() {
        Some(s) => s.parse().with_context(|| format!("invalid step count '{s}'"))?,
        None => DEFAULT_STEPS,
    };
    let seed = match args.get(1) {
        Some(s) => s.parse().with_context(|| format!("invalid seed '{s}'"))?,
        None => DEFAULT_SEED,
    };
    let config = load_config(args.get(2).map(String::as_str))?;

    let mut sim = Simulation::new(config, seed).context("build simulation")?;
    info!(steps, seed, "starting session");

    let mut spawned = 0usize;
    let mut kills = 0usize;
    let mut experience = 0u32;
    let mut shots = 0u32;
    let mut expired = 0usize;
    let mut damage_taken = 0.0f32;

    for step in 0..steps {
        sim.set_player_direction(steering(step));
        let report = sim.step(DT);

        spawned += report.spawned.len();
        kills += report.kills.len();
        experience += report.experience_gained();
        shots += report.shots_fired;
        expired += report.auto_released.len();
        damage_taken += report.player_damage_taken;

        if report.player_died {
            info!(tick = report.tick, "player died, stopping");
            break;
        }
    }

    let arena = sim.arena();
    info!(
        ticks = sim.tick(),
        elapsed = sim.elapsed(),
        spawned,
        kills,
        experience,
        shots,
        expired,
        damage_taken,
        health = sim.player().stats().health,
        enemies = arena.enemy_count(),
        projectiles = arena.projectile_count(),
        "session finished"
    );
    println!("{:016x}", sim.state_hash());
    Ok(())
}
