//! Player components and systems (locomotion, vertical motion, collision
//! response, death/respawn, camera follow).
//!
//! The `Player` component is the single owner of gameplay movement state.
//! Input systems write intent into it during `Update`, the fixed tick in
//! `movement::player_fixed_tick` folds that intent into one displacement and
//! applies it through `Level::move_body`, and the resulting contacts feed the
//! classifier in `collision`. The core steps are plain functions over
//! `&mut Player` so tests and benches drive them without an `App`.

pub mod camera;
pub mod collision;
pub mod movement;
pub mod physics;
pub mod respawn;

use crate::level::ColliderId;
use bevy::prelude::*;

pub use camera::*;
pub use collision::*;
pub use movement::*;
pub use physics::*;
pub use respawn::*;

/// Half extents of the collision body used for sweeps and trigger overlap.
pub const BODY_HALF_EXTENTS: Vec3 = Vec3::new(0.35, 0.9, 0.35);

/// Contacts with |normal.y| at or above this are floors/ceilings; everything
/// else counts as a wall.
pub const VERTICAL_NORMAL_MIN: f32 = 0.99;

/// Mutually exclusive locomotion modes. `AutoMoving` covers both wall-jump
/// launches and any externally commanded forced movement; `Rolling` is its
/// own mode so the two can never control the body in the same tick.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum MotionMode {
    #[default]
    Idle,
    Seeking,
    Rolling,
    AutoMoving,
}

/// Component tracking all movement state for the player.
#[derive(Component, Clone, Debug)]
pub struct Player {
    pub mode: MotionMode,
    /// Horizontal movement target. Only meaningful while `seek_pending`.
    pub destination: Vec3,
    /// Whether a seek target is outstanding. Survives a roll, so an
    /// interrupted walk resumes when the roll ends.
    pub seek_pending: bool,
    /// Unit facing/movement direction; last direction the player moved in.
    pub direction: Vec3,
    /// Speed used while `Rolling` or `AutoMoving`.
    pub auto_move_speed: f32,
    /// Time left on the current roll. Zero when not rolling.
    pub roll_remaining: f32,
    pub vertical_speed: f32,
    /// One-tick jump latch: set on key-down while grounded, consumed by the
    /// next fixed tick's ground check.
    pub jump_queued: bool,
    pub grounded: bool,
    pub touched_wall: bool,
    /// Normal of the last wall contact; the wall-jump launch direction.
    pub wall_normal: Vec3,
    /// Set by trap volumes; suppresses jump and wall-jump input.
    pub trapped: bool,
    /// Time left on the death sequence. Zero when alive.
    pub death_remaining: f32,
    /// Last upward-facing solid the player stood on, by collider id. The id
    /// is resolved through the level on respawn rather than held as a
    /// reference, so a level reload cannot leave it dangling.
    pub last_ground: Option<ColliderId>,
    /// Height recorded every frame the player is not dying; the camera
    /// follows this instead of the raw transform so hazard falls do not drag
    /// the view down.
    pub last_good_y: f32,
}

impl Player {
    #[must_use]
    pub fn new(spawn: Vec3) -> Self {
        Player {
            mode: MotionMode::Idle,
            destination: spawn,
            seek_pending: false,
            direction: Vec3::Z,
            auto_move_speed: 0.0,
            roll_remaining: 0.0,
            vertical_speed: 0.0,
            jump_queued: false,
            grounded: false,
            touched_wall: false,
            wall_normal: Vec3::Z,
            trapped: false,
            death_remaining: 0.0,
            last_ground: None,
            last_good_y: spawn.y,
        }
    }

    #[must_use]
    pub fn dying(&self) -> bool {
        self.death_remaining > 0.0
    }

    #[must_use]
    pub fn rolling(&self) -> bool {
        self.mode == MotionMode::Rolling
    }
}
