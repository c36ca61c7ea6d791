//! Arena configuration.
//!
//! [`ArenaConfig`] gathers every tunable of a session: grid geometry, pool
//! categories, the spawn weight table and the balance numbers of enemies,
//! the player and its abilities. It is plain serde data; JSON only appears at
//! the boundary through [`ArenaConfig::from_json_str`].
//!
//! Missing sections fall back to [`ArenaConfig::default`], the stock balance.
//!
//! # Example
//!
//! ```
//! use horde_core::config::ArenaConfig;
//!
//! let config = ArenaConfig::from_json_str(r#"{ "grid": { "cell_size": 2.0, "width": 60.0, "height": 60.0 } }"#).unwrap();
//! assert_eq!(config.grid.cell_size, 2.0);
//! assert_eq!(config.spawn.max_live_entities, 30);
//! ```

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::entity::CategoryId;
use crate::error::ConfigError;

/// Upper bound on the sum of spawn weights.
pub const MAX_TOTAL_WEIGHT: u64 = 1 << 20;

/// World and cell geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    /// Edge length of a cell
    pub cell_size: f32,
    /// World extent along x
    pub width: f32,
    /// World extent along y
    pub height: f32,
}

impl GridConfig {
    /// World bounds for the grid.
    #[must_use]
    pub fn bounds(&self) -> horde_grid::GridBounds {
        horde_grid::GridBounds::new(self.width, self.height)
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            cell_size: 3.0,
            width: 120.0,
            height: 120.0,
        }
    }
}

/// Capacity and timing of one pool category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryConfig {
    /// Category name
    pub id: CategoryId,
    /// Instances constructed up front
    pub initial_capacity: usize,
    /// Hard cap on instances ever constructed
    pub max_capacity: usize,
    /// Seconds until an acquired instance releases itself (0 = never)
    #[serde(default)]
    pub auto_release_seconds: f32,
}

impl CategoryConfig {
    /// Creates a category without auto-release.
    #[must_use]
    pub fn new(id: impl Into<CategoryId>, initial_capacity: usize, max_capacity: usize) -> Self {
        Self {
            id: id.into(),
            initial_capacity,
            max_capacity,
            auto_release_seconds: 0.0,
        }
    }

    /// Sets the auto-release delay.
    #[must_use]
    pub fn with_auto_release(mut self, seconds: f32) -> Self {
        self.auto_release_seconds = seconds;
        self
    }

    /// Auto-release delay if enabled.
    #[must_use]
    pub fn auto_release(&self) -> Option<f32> {
        (self.auto_release_seconds > 0.0).then_some(self.auto_release_seconds)
    }

    /// Check capacities and timer.
    ///
    /// # Errors
    ///
    /// A message describing the first problem found.
    pub fn check(&self) -> Result<(), String> {
        if self.max_capacity < self.initial_capacity {
            return Err(format!(
                "category `{}`: max_capacity {} below initial_capacity {}",
                self.id, self.max_capacity, self.initial_capacity
            ));
        }
        if !(self.auto_release_seconds.is_finite() && self.auto_release_seconds >= 0.0) {
            return Err(format!(
                "category `{}`: auto_release_seconds must be finite and >= 0",
                self.id
            ));
        }
        Ok(())
    }
}

/// One row of the spawn weight table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnWeight {
    /// Category to spawn
    pub category_id: CategoryId,
    /// Relative weight
    pub weight: u32,
}

impl SpawnWeight {
    /// Creates a table row.
    #[must_use]
    pub fn new(category_id: impl Into<CategoryId>, weight: u32) -> Self {
        Self {
            category_id: category_id.into(),
            weight,
        }
    }
}

/// Spawn cadence, placement and weight table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnConfig {
    /// Categories and their relative weights
    pub entries: Vec<SpawnWeight>,
    /// Distance from the reference point at which entities appear
    pub spawn_radius: f32,
    /// Seconds between spawn attempts
    pub spawn_interval_seconds: f32,
    /// No spawn while this many spawned entities are alive
    pub max_live_entities: usize,
}

impl SpawnConfig {
    /// Sum of all weights.
    #[must_use]
    pub fn total_weight(&self) -> u64 {
        self.entries.iter().map(|e| u64::from(e.weight)).sum()
    }
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            entries: vec![SpawnWeight::new("fast_enemy", 70), SpawnWeight::new("slow_enemy", 30)],
            spawn_radius: 40.0,
            spawn_interval_seconds: 0.3,
            max_live_entities: 30,
        }
    }
}

/// Balance of one enemy kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyConfig {
    /// Category the enemy is pooled under
    pub id: CategoryId,
    /// Maximum health
    pub health: f32,
    /// World units per second
    pub move_speed: f32,
    /// Contact damage per player damage tick
    pub damage: f32,
    /// Experience reported on kill
    pub experience_drop: u32,
}

/// Player balance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Starting and maximum health
    pub max_health: f32,
    /// World units per second
    pub move_speed: f32,
    /// Enemies within this distance deal contact damage
    pub damage_radius: f32,
    /// Seconds between contact damage ticks
    pub damage_interval: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            max_health: 100.0,
            move_speed: 5.0,
            damage_radius: 1.0,
            damage_interval: 1.0,
        }
    }
}

/// Projectile-firing ability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShootConfig {
    /// Projectile pool category
    pub category_id: CategoryId,
    /// Damage per hit
    pub base_damage: f32,
    /// Seconds between shots
    pub attack_cooldown: f32,
    /// Projectile speed in world units per second
    pub projectile_speed: f32,
}

impl Default for ShootConfig {
    fn default() -> Self {
        Self {
            category_id: CategoryId::new("direction_arrow"),
            base_damage: 10.0,
            attack_cooldown: 0.45,
            projectile_speed: 17.0,
        }
    }
}

/// Damage aura around the player.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AuraConfig {
    /// Damage per pulse to each enemy in range
    pub base_damage: f32,
    /// Seconds between pulses
    pub attack_cooldown: f32,
    /// Pulse radius
    pub radius: f32,
}

impl Default for AuraConfig {
    fn default() -> Self {
        Self {
            base_damage: 1.0,
            attack_cooldown: 0.2,
            radius: 3.0,
        }
    }
}

/// Complete session configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Grid geometry
    pub grid: GridConfig,
    /// Pool categories
    pub categories: Vec<CategoryConfig>,
    /// Spawner settings
    pub spawn: SpawnConfig,
    /// Enemy balance, one entry per enemy category
    pub enemies: Vec<EnemyConfig>,
    /// Player balance
    pub player: PlayerConfig,
    /// Shooting ability
    pub shoot: ShootConfig,
    /// Aura ability
    pub aura: AuraConfig,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            categories: vec![
                CategoryConfig::new("fast_enemy", 10, 100),
                CategoryConfig::new("slow_enemy", 10, 100),
                CategoryConfig::new("direction_arrow", 10, 50).with_auto_release(3.0),
            ],
            spawn: SpawnConfig::default(),
            enemies: vec![
                EnemyConfig {
                    id: CategoryId::new("fast_enemy"),
                    health: 10.0,
                    move_speed: 4.0,
                    damage: 3.0,
                    experience_drop: 1,
                },
                EnemyConfig {
                    id: CategoryId::new("slow_enemy"),
                    health: 20.0,
                    move_speed: 2.0,
                    damage: 10.0,
                    experience_drop: 1,
                },
            ],
            player: PlayerConfig::default(),
            shoot: ShootConfig::default(),
            aura: AuraConfig::default(),
        }
    }
}

fn positive(name: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!("{name} must be positive, got {value}")))
    }
}

fn non_negative(name: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!("{name} must be >= 0, got {value}")))
    }
}

impl ArenaConfig {
    /// Parse and validate a JSON config.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] for malformed JSON, otherwise whatever
    /// [`ArenaConfig::validate`] reports.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty JSON.
    ///
    /// # Errors
    ///
    /// Only if serialization itself fails.
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check ranges and cross references.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] for out-of-range values and duplicates,
    /// [`ConfigError::Missing`] for references to undeclared categories.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("grid.cell_size", self.grid.cell_size)?;
        positive("grid.width", self.grid.width)?;
        positive("grid.height", self.grid.height)?;

        let mut seen = BTreeSet::new();
        for category in &self.categories {
            category.check().map_err(ConfigError::Invalid)?;
            if !seen.insert(&category.id) {
                return Err(ConfigError::Invalid(format!(
                    "category `{}` declared twice",
                    category.id
                )));
            }
        }

        positive("spawn.spawn_radius", self.spawn.spawn_radius)?;
        positive("spawn.spawn_interval_seconds", self.spawn.spawn_interval_seconds)?;
        for entry in &self.spawn.entries {
            if entry.weight == 0 {
                return Err(ConfigError::Invalid(format!(
                    "spawn weight of `{}` must be >= 1",
                    entry.category_id
                )));
            }
            self.category(&entry.category_id)?;
            self.enemy(&entry.category_id)?;
        }
        if self.spawn.total_weight() > MAX_TOTAL_WEIGHT {
            return Err(ConfigError::Invalid(format!(
                "spawn weights sum to more than {MAX_TOTAL_WEIGHT}"
            )));
        }

        let mut enemy_ids = BTreeSet::new();
        for enemy in &self.enemies {
            if !enemy_ids.insert(&enemy.id) {
                return Err(ConfigError::Invalid(format!("enemy `{}` declared twice", enemy.id)));
            }
            self.category(&enemy.id)?;
            positive("enemy.health", enemy.health)?;
            non_negative("enemy.move_speed", enemy.move_speed)?;
            non_negative("enemy.damage", enemy.damage)?;
        }

        positive("player.max_health", self.player.max_health)?;
        non_negative("player.move_speed", self.player.move_speed)?;
        non_negative("player.damage_radius", self.player.damage_radius)?;
        positive("player.damage_interval", self.player.damage_interval)?;

        self.category(&self.shoot.category_id)?;
        if enemy_ids.contains(&self.shoot.category_id) {
            return Err(ConfigError::Invalid(format!(
                "projectile category `{}` is also an enemy",
                self.shoot.category_id
            )));
        }
        non_negative("shoot.base_damage", self.shoot.base_damage)?;
        positive("shoot.attack_cooldown", self.shoot.attack_cooldown)?;
        non_negative("shoot.projectile_speed", self.shoot.projectile_speed)?;

        non_negative("aura.base_damage", self.aura.base_damage)?;
        positive("aura.attack_cooldown", self.aura.attack_cooldown)?;
        non_negative("aura.radius", self.aura.radius)?;

        Ok(())
    }

    /// Look up a pool category.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Missing`] if no category has this id.
    pub fn category(&self, id: &CategoryId) -> Result<&CategoryConfig, ConfigError> {
        self.categories
            .iter()
            .find(|c| &c.id == id)
            .ok_or_else(|| ConfigError::Missing {
                kind: "category",
                id: id.to_string(),
            })
    }

    /// Look up enemy balance.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Missing`] if no enemy has this id.
    pub fn enemy(&self, id: &CategoryId) -> Result<&EnemyConfig, ConfigError> {
        self.enemies
            .iter()
            .find(|e| &e.id == id)
            .ok_or_else(|| ConfigError::Missing {
                kind: "enemy",
                id: id.to_string(),
            })
    }
}
