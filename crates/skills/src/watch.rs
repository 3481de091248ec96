//! Filesystem watching for the skill roots, used to rescan on change.

use crate::types::{Result, SkillError};
use notify::{Event, RecursiveMode, Watcher};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;
use tracing::debug;

/// Events arriving within this window of each other are reported as one change.
pub const SETTLE_WINDOW: Duration = Duration::from_millis(300);

/// A directory to watch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchTarget {
    pub path: PathBuf,
    /// Watch the whole subtree rather than direct children only
    pub recursive: bool,
}

impl WatchTarget {
    pub fn recursive(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), recursive: true }
    }

    pub fn shallow(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), recursive: false }
    }
}

pub struct SkillWatcher {
    _watcher: Box<dyn Watcher + Send + Sync>,
    changes: Receiver<Vec<PathBuf>>,
}

impl SkillWatcher {
    /// Start watching every target that exists. Missing targets are skipped.
    pub fn new(targets: &[WatchTarget]) -> Result<Self> {
        let (tx, changes) = mpsc::channel();

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            if let Ok(event) = res
                && (event.kind.is_modify() || event.kind.is_create() || event.kind.is_remove())
            {
                let _ = tx.send(event.paths);
            }
        })
        .map_err(|e| SkillError::Watcher(e.to_string()))?;

        for target in targets.iter().filter(|t| t.path.exists()) {
            let mode = if target.recursive { RecursiveMode::Recursive } else { RecursiveMode::NonRecursive };
            watcher
                .watch(&target.path, mode)
                .map_err(|e| SkillError::Watcher(format!("{}: {}", target.path.display(), e)))?;
            debug!(path = %target.path.display(), recursive = target.recursive, "watching");
        }

        Ok(Self { _watcher: Box::new(watcher), changes })
    }

    /// Block until something changes, then wait for the burst to settle.
    ///
    /// Returns every path touched during the burst, or `None` once the
    /// watcher has shut down.
    pub fn wait(&self) -> Option<Vec<PathBuf>> {
        let mut paths = self.changes.recv().ok()?;
        self.settle(&mut paths);
        Some(paths)
    }

    /// Like [`SkillWatcher::wait`] but gives up after `timeout` with an empty list.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<Vec<PathBuf>> {
        match self.changes.recv_timeout(timeout) {
            Ok(mut paths) => {
                self.settle(&mut paths);
                Some(paths)
            }
            Err(RecvTimeoutError::Timeout) => Some(Vec::new()),
            Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    fn settle(&self, paths: &mut Vec<PathBuf>) {
        while let Ok(more) = self.changes.recv_timeout(SETTLE_WINDOW) {
            paths.extend(more);
        }
        paths.sort();
        paths.dedup();
    }
}
