//! Keep to one running gridcal per user.
//!
//! The lock file holds the pid of the process that owns it, so a second
//! instance can say which one to look for.

use anyhow::{Context, Result};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, Write};
use std::path::{Path, PathBuf};

/// Held for the life of the session. Dropping it releases the lock.
pub struct InstanceLock {
    _file: File,
    path: PathBuf,
}

impl InstanceLock {
    /// Lock `gridcal.lock` in the runtime directory.
    pub fn acquire() -> Result<Self> {
        let dir = gridcal_core::config::runtime_dir()?;
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        Self::acquire_at(&dir.join("gridcal.lock"))
    }

    pub fn acquire_at(path: &Path) -> Result<Self> {
        // No truncate: the file may belong to a running instance
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .with_context(|| format!("Failed to open lock file {}", path.display()))?;

        if file.try_lock_exclusive().is_err() {
            let mut owner = String::new();
            let _ = file.read_to_string(&mut owner);
            let owner = match owner.trim() {
                "" => String::new(),
                pid => format!(" (pid {})", pid),
            };
            anyhow::bail!(
                "gridcal is already running in another terminal{}.\n\
                If you believe this is an error, remove: {}",
                owner,
                path.display()
            );
        }

        file.set_len(0)?;
        file.rewind()?;
        write!(file, "{}", std::process::id())?;
        file.flush()?;

        Ok(InstanceLock {
            _file: file,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
