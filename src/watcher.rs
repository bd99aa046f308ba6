// src/watcher.rs

use anyhow::{Context, Result};
use notify::event::{AccessKind, AccessMode, EventKind};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};

use std::path::{Path, PathBuf};

/// Keeps an inotify watch alive; dropping it removes the watch.
pub struct FileChangeWatcher {
    path: PathBuf,
    _watcher: RecommendedWatcher,
}

impl FileChangeWatcher {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Calls `on_change` after each close-after-write on `path`.
///
/// The callback runs on the notify backend's thread, so it should only hand
/// the notification over to the thread that owns the application state.
pub fn watch<F>(path: &Path, on_change: F) -> Result<FileChangeWatcher>
where
    F: Fn(&Path) + Send + 'static,
{
    let target = path.to_path_buf();
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
        match res {
            Ok(event) => {
                if is_close_write(&event.kind) {
                    tracing::trace!(?event, "governor file written");
                    on_change(&target);
                }
            }
            Err(e) => tracing::warn!("watch error: {}", e),
        }
    })
    .context("failed to initialise file watcher")?;

    watcher
        .watch(path, RecursiveMode::NonRecursive)
        .with_context(|| format!("failed to watch {}", path.display()))?;

    tracing::debug!(path = %path.display(), "watching for governor changes");
    Ok(FileChangeWatcher {
        path: path.to_path_buf(),
        _watcher: watcher,
    })
}

pub fn is_close_write(kind: &EventKind) -> bool {
    matches!(kind, EventKind::Access(AccessKind::Close(AccessMode::Write)))
}
