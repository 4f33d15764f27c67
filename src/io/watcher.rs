use std::path::{Path, PathBuf};
use std::sync::mpsc;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, warn};

use crate::io::board_io::BOARD_FILE;

/// Watches `kanban/` for changes to board.json made by other processes
/// (a `cshift mv` in another shell, a sync job, an editor).
pub struct BoardWatcher {
    _watcher: RecommendedWatcher,
    rx: mpsc::Receiver<PathBuf>,
}

impl BoardWatcher {
    pub fn start(kanban_dir: &Path) -> Result<Self, notify::Error> {
        let (tx, rx) = mpsc::channel();
        let board_path = kanban_dir.join(BOARD_FILE);

        let mut watcher = RecommendedWatcher::new(
            move |result: Result<Event, notify::Error>| {
                let event = match result {
                    Ok(event) => event,
                    Err(e) => {
                        warn!(error = %e, "file watcher error");
                        return;
                    }
                };
                if !matches!(
                    event.kind,
                    EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
                ) {
                    return;
                }
                // Atomic saves land as a rename onto board.json; temp files are ignored
                if let Some(path) = event.paths.into_iter().find(|p| *p == board_path) {
                    let _ = tx.send(path);
                }
            },
            Config::default(),
        )?;

        watcher.watch(kanban_dir, RecursiveMode::NonRecursive)?;
        debug!(dir = %kanban_dir.display(), "watching board directory");
        Ok(BoardWatcher {
            _watcher: watcher,
            rx,
        })
    }

    /// Drain pending notifications. True if board.json changed since the
    /// last call.
    pub fn poll(&self) -> bool {
        let mut changed = false;
        while self.rx.try_recv().is_ok() {
            changed = true;
        }
        changed
    }
}
