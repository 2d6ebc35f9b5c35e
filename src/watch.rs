use std::path::Path;
use std::sync::mpsc::{self, Receiver};

use anyhow::{Context, Result};
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};

/// Notifies when the board database is written, by this or another process.
pub struct StoreWatcher {
    _watcher: RecommendedWatcher,
    rx: Receiver<()>,
}

/// Whether a changed file belongs to the database: the file itself or one of
/// SQLite's companions (`-wal`, `-shm`, `-journal`).
fn is_db_file(path: &Path, db_filename: &str) -> bool {
    path.file_name()
        .map(|f| f.to_string_lossy().starts_with(db_filename))
        .unwrap_or(false)
}

impl StoreWatcher {
    /// Watches the parent directory of `db_path`, since SQLite writes through
    /// companion files rather than the database file alone.
    pub fn new(db_path: &str) -> Result<Self> {
        let (tx, rx) = mpsc::channel();
        let path = Path::new(db_path);
        let db_filename = path
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            let Ok(event) = res else { return };
            // Reads from any process fire access events; only writes matter.
            if matches!(event.kind, EventKind::Access(_)) {
                return;
            }
            if event.paths.iter().any(|p| is_db_file(p, &db_filename)) {
                let _ = tx.send(());
            }
        })
        .context("failed to create file watcher")?;

        let watch_path = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        watcher
            .watch(watch_path, RecursiveMode::NonRecursive)
            .with_context(|| format!("failed to watch {}", watch_path.display()))?;

        Ok(Self {
            _watcher: watcher,
            rx,
        })
    }

    /// True if anything changed since the last call. Never blocks; pending
    /// events are coalesced into one.
    pub fn changed(&self) -> bool {
        let mut any = false;
        while self.rx.try_recv().is_ok() {
            any = true;
        }
        any
    }
}
