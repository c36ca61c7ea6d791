//! Error types for the simulation core.
//!
//! Every fallible operation returns one of these enums. Conditions that are
//! part of normal play (an occupied spawn cell, a stale handle) are not
//! errors; they show up as outcome values and `tracing` events instead.

use glam::Vec2;
use thiserror::Error;

use crate::entity::{CategoryId, EntityId};

/// Failures of [`crate::pool::EntityPool`] operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PoolError {
    /// No category with this id was registered.
    #[error("no pool registered for category `{0}`")]
    ConfigMissing(CategoryId),

    /// Every instance of the category is in play.
    #[error("pool `{category}` exhausted ({max} live)")]
    Exhausted {
        /// Category that ran out
        category: CategoryId,
        /// Its configured maximum
        max: usize,
    },

    /// The id is unknown to the pool or belongs to a different category.
    #[error("entity {id} cannot be released to category `{category}`")]
    InvalidRelease {
        /// Offending instance
        id: EntityId,
        /// Category it was released to
        category: CategoryId,
    },

    /// A category with this id is already registered.
    #[error("category `{0}` registered twice")]
    DuplicateCategory(CategoryId),

    /// Capacity or timer settings make no sense.
    #[error("invalid pool configuration: {0}")]
    InvalidConfig(String),
}

/// Failures of [`crate::selector::WeightedSelector::select`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SelectError {
    /// The weight table has no entry with a positive weight.
    #[error("weight table has no candidates")]
    NoCandidates,
}

/// Failures of [`crate::arena::Arena::spawn_at`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpawnError {
    /// The pool could not provide an instance.
    #[error(transparent)]
    Pool(#[from] PoolError),

    /// The requested position has a non-finite coordinate.
    #[error("cannot spawn at non-finite position {0}")]
    InvalidPosition(Vec2),
}

/// Failures loading or validating an [`crate::config::ArenaConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A referenced entry does not exist.
    #[error("{kind} `{id}` not found in config")]
    Missing {
        /// What was looked up ("category", "enemy")
        kind: &'static str,
        /// The id that was not found
        id: String,
    },

    /// A value is out of range or inconsistent with another.
    #[error("invalid config: {0}")]
    Invalid(String),

    /// The JSON text could not be parsed.
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The grid cannot be built from the config.
    #[error(transparent)]
    Grid(#[from] horde_grid::GridError),

    /// The pools cannot be built from the config.
    #[error(transparent)]
    Pool(#[from] PoolError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offender() {
        let err = PoolError::Exhausted {
            category: CategoryId::new("fast_enemy"),
            max: 2,
        };
        assert_eq!(err.to_string(), "pool `fast_enemy` exhausted (2 live)");

        let err = ConfigError::Missing {
            kind: "category",
            id: "ghost".into(),
        };
        assert_eq!(err.to_string(), "category `ghost` not found in config");
    }

    #[test]
    fn spawn_error_wraps_pool_error() {
        let err: SpawnError = PoolError::ConfigMissing(CategoryId::new("x")).into();
        assert_eq!(err.to_string(), "no pool registered for category `x`");
    }
}
