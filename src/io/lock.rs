use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::debug;

const LOCK_FILE: &str = ".lock";

/// Advisory lock on a `kanban/` directory, held while board.json is written.
///
/// The TUI and the CLI both take it, so their writes never interleave.
/// Released on drop. The lock file is never removed; unlinking a file
/// other processes may be waiting on breaks mutual exclusion.
pub struct BoardLock {
    _file: File,
}

#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("could not create lock file at {path}: {source}")]
    Create {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("timed out waiting for {path}: another cshift process is writing the board")]
    Timeout { path: PathBuf },
}

impl BoardLock {
    /// Take the lock, retrying every 10ms for up to `timeout`
    pub fn acquire(kanban_dir: &Path, timeout: Duration) -> Result<Self, LockError> {
        let path = kanban_dir.join(LOCK_FILE);
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(|source| LockError::Create {
                path: path.clone(),
                source,
            })?;

        let deadline = Instant::now() + timeout;
        while try_lock(&file).is_err() {
            if Instant::now() >= deadline {
                return Err(LockError::Timeout { path });
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        debug!(path = %path.display(), "board lock acquired");
        Ok(BoardLock { _file: file })
    }

    /// Acquire with the default 5 second timeout
    pub fn acquire_default(kanban_dir: &Path) -> Result<Self, LockError> {
        Self::acquire(kanban_dir, Duration::from_secs(5))
    }
}

#[cfg(unix)]
fn try_lock(file: &File) -> std::io::Result<()> {
    use std::os::unix::io::AsRawFd;
    let rc = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) };
    if rc == 0 {
        Ok(())
    } else {
        Err(std::io::Error::last_os_error())
    }
}

#[cfg(not(unix))]
fn try_lock(_file: &File) -> std::io::Result<()> {
    Ok(())
}
