//! Per-instance lifecycle of pooled entities.
//!
//! Every pooled instance embeds a [`Lifecycle`] recording whether it is
//! parked or in play, the generation used to detect stale handles, and the
//! optional auto-release countdown.
//!
//! ```text
//! Parked --acquire--> Active[timer?] --release | expiry | despawn--> Parked
//! (any) --shutdown--> Destroyed
//! ```

use glam::Vec2;
use horde_grid::SpatialEntity;
use serde::{Deserialize, Serialize};

use crate::entity::{CategoryId, EntityHandle, EntityId};
use crate::timer::Countdown;

/// Where an instance is in its pooled life.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LifecycleState {
    /// In the pool: not in the grid, no armed timer, not updated per tick.
    #[default]
    Parked,
    /// Checked out and part of the simulation.
    Active,
    /// Torn down by pool shutdown. Terminal.
    Destroyed,
}

/// Lifecycle bookkeeping embedded in every pooled instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Lifecycle {
    state: LifecycleState,
    generation: u32,
    auto_release: Option<Countdown>,
}

impl Lifecycle {
    /// A fresh, parked lifecycle at generation 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> LifecycleState {
        self.state
    }

    /// True while checked out.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state == LifecycleState::Active
    }

    /// Generation; bumped on every release.
    #[must_use]
    pub const fn generation(&self) -> u32 {
        self.generation
    }

    /// Armed auto-release countdown, if any.
    #[must_use]
    pub const fn auto_release(&self) -> Option<&Countdown> {
        self.auto_release.as_ref()
    }

    /// Mutable access to the countdown slot.
    pub fn auto_release_mut(&mut self) -> &mut Option<Countdown> {
        &mut self.auto_release
    }

    /// Parked -> Active. Disarms any leftover timer, then arms a new one if
    /// `auto_release` is a positive duration.
    pub fn activate(&mut self, auto_release: Option<f32>) {
        self.state = LifecycleState::Active;
        self.auto_release = auto_release.filter(|s| *s > 0.0).map(Countdown::new);
    }

    /// Active -> Parked. Disarms the timer and invalidates outstanding handles.
    pub fn park(&mut self) {
        self.state = LifecycleState::Parked;
        self.auto_release = None;
        self.generation = self.generation.wrapping_add(1);
    }

    /// Terminal teardown.
    pub fn destroy(&mut self) {
        self.state = LifecycleState::Destroyed;
        self.auto_release = None;
    }

    /// Advance the armed timer by `dt`.
    ///
    /// Returns `true` exactly once, on the tick the countdown expires; the
    /// timer is disarmed at that point so it cannot fire again.
    pub fn advance_timer(&mut self, dt: f32) -> bool {
        if !self.is_active() {
            return false;
        }
        let expired = self.auto_release.as_mut().is_some_and(|t| t.advance(dt));
        if expired {
            self.auto_release = None;
        }
        expired
    }
}

/// Contract between the pool and the instances it manages.
///
/// Instances are also [`SpatialEntity`]s keyed by [`EntityId`], so the pool
/// can deregister them from the grid on release.
pub trait PooledEntity: SpatialEntity<Key = EntityId> {
    /// Category the instance was created for. Never changes.
    fn category(&self) -> &CategoryId;

    /// Lifecycle bookkeeping.
    fn lifecycle(&self) -> &Lifecycle;

    /// Mutable lifecycle bookkeeping.
    fn lifecycle_mut(&mut self) -> &mut Lifecycle;

    /// Move the instance. The caller syncs the grid.
    fn set_position(&mut self, position: Vec2);

    /// Whether active instances are registered in the grid.
    fn occupies_grid(&self) -> bool {
        true
    }

    /// Called when checked out. Implementations reset per-use state and must
    /// forward to [`Lifecycle::activate`].
    fn on_acquire(&mut self, auto_release: Option<f32>) {
        self.lifecycle_mut().activate(auto_release);
    }

    /// Called when returned, after grid deregistration. Implementations must
    /// forward to [`Lifecycle::park`].
    fn on_release(&mut self) {
        self.lifecycle_mut().park();
    }

    /// Called once at pool shutdown.
    fn on_destroy(&mut self) {
        self.lifecycle_mut().destroy();
    }

    /// Current generation.
    fn generation(&self) -> u32 {
        self.lifecycle().generation()
    }

    /// True while checked out.
    fn is_active(&self) -> bool {
        self.lifecycle().is_active()
    }

    /// Handle valid until the next release.
    fn handle(&self) -> EntityHandle {
        EntityHandle::new(self.key(), self.generation())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activate_arms_only_positive_timers() {
        let mut life = Lifecycle::new();
        life.activate(Some(0.0));
        assert!(life.is_active());
        assert!(life.auto_release().is_none());

        life.park();
        life.activate(None);
        assert!(life.auto_release().is_none());

        life.park();
        life.activate(Some(2.0));
        assert_eq!(life.auto_release().map(Countdown::remaining), Some(2.0));
    }

    #[test]
    fn park_bumps_generation_and_disarms() {
        let mut life = Lifecycle::new();
        life.activate(Some(1.0));
        life.park();

        assert_eq!(life.state(), LifecycleState::Parked);
        assert_eq!(life.generation(), 1);
        assert!(life.auto_release().is_none());
    }

    #[test]
    fn timer_fires_once() {
        let mut life = Lifecycle::new();
        life.activate(Some(1.0));

        assert!(!life.advance_timer(0.5));
        assert!(life.advance_timer(0.5));
        assert!(!life.advance_timer(0.5));
    }

    #[test]
    fn parked_timer_never_fires() {
        let mut life = Lifecycle::new();
        life.activate(Some(1.0));
        life.park();
        assert!(!life.advance_timer(10.0));
    }

    #[test]
    fn reacquire_rearms_fresh_timer() {
        let mut life = Lifecycle::new();
        life.activate(Some(1.0));
        life.advance_timer(0.9);
        life.park();
        life.activate(Some(1.0));
        assert_eq!(life.auto_release().map(Countdown::remaining), Some(1.0));
    }
}
