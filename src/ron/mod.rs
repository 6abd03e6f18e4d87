//! RON file loading and change watching.
//!
//! Gameplay data (settings, levels) is kept as RON files under `data/` and
//! reloaded at runtime when edited. The watcher only flips a shared boolean;
//! the actual reload happens in whatever `Update` system owns the resource,
//! so file events never touch game state from the notify thread.

use bevy::prelude::Resource;
use notify::{Config, RecommendedWatcher, RecursiveMode, Watcher};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

/// Shared dirty flag plus the watcher handle that keeps it alive.
#[derive(Resource)]
pub struct RonWatcher {
    changed: Arc<Mutex<bool>>,
    _watcher: Option<RecommendedWatcher>,
}

impl RonWatcher {
    /// A watcher with no OS backing. Used as a fallback when watcher creation
    /// fails (missing directory, unsupported platform); `take_changed` then
    /// always reports `false`.
    #[must_use]
    pub fn stub() -> Self {
        RonWatcher {
            changed: Arc::new(Mutex::new(false)),
            _watcher: None,
        }
    }

    /// Read and clear the dirty flag.
    pub fn take_changed(&self) -> bool {
        let mut flag = self
            .changed
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        std::mem::take(&mut *flag)
    }
}

/// Deserialize every `.ron` file in `path` into a `T`, in directory order.
///
/// Files that fail to parse are skipped with a message on stderr; a missing
/// directory yields an empty vec. Callers decide what "no files" means
/// (usually: fall back to defaults).
#[must_use]
pub fn load_ron_files<T: DeserializeOwned>(path: &str) -> Vec<T> {
    let mut items = Vec::new();

    let Ok(entries) = std::fs::read_dir(path) else {
        return items;
    };
    for entry in entries.flatten() {
        let file = entry.path();
        if file.extension().is_none_or(|ext| ext != "ron") {
            continue;
        }
        let Ok(content) = std::fs::read_to_string(&file) else {
            continue;
        };
        match ron::from_str::<T>(&content) {
            Ok(item) => items.push(item),
            Err(e) => eprintln!("Failed to parse {}: {e:?}", file.display()),
        }
    }

    items
}

/// Watch `path` for `.ron` edits and set the shared flag when one lands.
///
/// Create and modify events both count (editors that write via a temp file
/// show up as creates). Events outside the watched directory are ignored.
///
/// # Errors
/// Returns a `notify::Error` if the watcher cannot be created or the path
/// cannot be registered.
pub fn setup_ron_watcher(path: &str) -> Result<RonWatcher, notify::Error> {
    let changed = Arc::new(Mutex::new(false));
    let flag = changed.clone();
    let watched: PathBuf = std::fs::canonicalize(path).unwrap_or_else(|_| PathBuf::from(path));

    let mut watcher: RecommendedWatcher = Watcher::new(
        move |res: Result<notify::Event, notify::Error>| match res {
            Ok(event) => {
                use notify::EventKind;
                if !matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                    return;
                }
                let relevant = event.paths.iter().any(|p| {
                    std::fs::canonicalize(p)
                        .unwrap_or_else(|_| p.clone())
                        .starts_with(&watched)
                });
                if relevant {
                    *flag.lock().unwrap_or_else(PoisonError::into_inner) = true;
                }
            }
            Err(e) => eprintln!("Watch error: {e:?}"),
        },
        Config::default(),
    )?;

    watcher.watch(Path::new(path), RecursiveMode::NonRecursive)?;
    Ok(RonWatcher {
        changed,
        _watcher: Some(watcher),
    })
}
