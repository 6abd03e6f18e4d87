//! Per-session context shared by the gameplay systems.
//!
//! Holds the one-shot flags and cross-system notifications that the original
//! design kept as globals. Everything here resets with `Session::reset` when a
//! new session begins, so nothing outlives a playthrough by accident.

use crate::level::ColliderId;
use bevy::prelude::Resource;

#[derive(Resource, Default, Debug)]
pub struct Session {
    /// One-shot latch for the trap warning dialog. Set on the first trap
    /// contact of the session and never cleared until `reset`.
    has_trapped: bool,
    /// Switches pressed this tick, drained by level scripting.
    pub pressed_switches: Vec<ColliderId>,
    /// Set when the final trigger volume fires the ending narration.
    pub final_reached: bool,
}

impl Session {
    /// Claim the trap warning. Returns `true` exactly once per session.
    pub fn first_trap(&mut self) -> bool {
        !std::mem::replace(&mut self.has_trapped, true)
    }

    #[must_use]
    pub fn has_trapped(&self) -> bool {
        self.has_trapped
    }

    /// Start a fresh session: clears every latch and pending notification.
    pub fn reset(&mut self) {
        *self = Session::default();
    }
}
