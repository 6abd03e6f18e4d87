//! Settings loading and hot-reloading.
//!
//! Settings are read from RON files in `data/settings`. If several files are
//! present the first one that parses wins; if none parse, defaults are used.
//! A `SettingsWatcher` resource flips when the directory changes and the
//! `check_settings_changes` system swaps the live `Settings` resource.

use crate::ron_loader::{load_ron_files, setup_ron_watcher};
use crate::settings::Settings;
use bevy::prelude::{Res, ResMut, Resource};

pub const SETTINGS_DIR: &str = "data/settings";

#[derive(Resource)]
pub struct SettingsWatcher(pub crate::ron::RonWatcher);

impl SettingsWatcher {
    #[must_use]
    pub fn stub() -> Self {
        SettingsWatcher(crate::ron::RonWatcher::stub())
    }
}

/// Load settings from `path` (a directory). Falls back to `Settings::defaults`
/// when no file parses.
#[must_use]
pub fn load_settings_from_dir(path: &str) -> Settings {
    load_ron_files(path)
        .into_iter()
        .next()
        .unwrap_or_else(Settings::defaults)
}

/// Create a watcher over the settings directory for hot-reload.
///
/// # Errors
/// Propagates the `notify::Error` from watcher setup; callers fall back to
/// `SettingsWatcher::stub()`.
pub fn setup_settings_watcher(path: &str) -> Result<SettingsWatcher, notify::Error> {
    setup_ron_watcher(path).map(SettingsWatcher)
}

/// Reload the `Settings` resource when the watcher reports a change.
#[allow(clippy::needless_pass_by_value)]
pub fn check_settings_changes(watcher: Res<SettingsWatcher>, mut settings: ResMut<Settings>) {
    if watcher.0.take_changed() {
        println!("Settings changed, reloading...");
        *settings = load_settings_from_dir(SETTINGS_DIR);
    }
}
