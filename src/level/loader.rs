//! Level loading and hot-reloading.
//!
//! Levels are RON files in `data/levels` describing the spawn point, solid
//! colliders and trigger volumes. The first file that parses becomes the
//! active level; an empty directory yields an empty level at the origin.
//! Reloading rebuilds the `Level` resource from scratch, which also resets
//! trigger consumption — useful while laying out a level, wrong for saves.

use crate::level::{Aabb, Level, SurfaceTag, TriggerKind};
use crate::ron_loader::{load_ron_files, setup_ron_watcher};
use bevy::math::Vec3;
use bevy::prelude::{Res, ResMut, Resource};
use serde::{Deserialize, Serialize};

pub const LEVELS_DIR: &str = "data/levels";

/// On-disk collider description. Coordinates are plain arrays so level files
/// stay independent of the math library.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColliderData {
    pub min: [f32; 3],
    pub max: [f32; 3],
    #[serde(default)]
    pub tag: SurfaceTag,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerData {
    pub min: [f32; 3],
    pub max: [f32; 3],
    pub kind: TriggerKind,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LevelData {
    #[serde(default)]
    pub spawn: [f32; 3],
    #[serde(default)]
    pub colliders: Vec<ColliderData>,
    #[serde(default)]
    pub triggers: Vec<TriggerData>,
}

impl From<LevelData> for Level {
    fn from(data: LevelData) -> Self {
        let mut level = Level::new(Vec3::from_array(data.spawn));
        for c in data.colliders {
            level.add_collider(
                Aabb::new(Vec3::from_array(c.min), Vec3::from_array(c.max)),
                c.tag,
            );
        }
        for t in data.triggers {
            level.add_trigger(
                Aabb::new(Vec3::from_array(t.min), Vec3::from_array(t.max)),
                t.kind,
            );
        }
        level
    }
}

#[derive(Resource)]
pub struct LevelWatcher(pub crate::ron::RonWatcher);

impl LevelWatcher {
    #[must_use]
    pub fn stub() -> Self {
        LevelWatcher(crate::ron::RonWatcher::stub())
    }
}

/// Load the active level from `path`. The first `.ron` file that parses wins.
#[must_use]
pub fn load_level_from_dir(path: &str) -> Level {
    load_ron_files::<LevelData>(path)
        .into_iter()
        .next()
        .map(Level::from)
        .unwrap_or_default()
}

/// Create a watcher over the levels directory (hot-reload).
///
/// # Errors
/// Propagates the `notify::Error` from watcher setup; callers fall back to
/// `LevelWatcher::stub()`.
pub fn setup_level_watcher(path: &str) -> Result<LevelWatcher, notify::Error> {
    setup_ron_watcher(path).map(LevelWatcher)
}

/// Swap in a freshly parsed level when the watcher reports a change.
#[allow(clippy::needless_pass_by_value)]
pub fn check_level_changes(watcher: Res<LevelWatcher>, mut level: ResMut<Level>) {
    if watcher.0.take_changed() {
        println!("Level changed, reloading...");
        *level = load_level_from_dir(LEVELS_DIR);
    }
}
