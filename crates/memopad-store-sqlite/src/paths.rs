//! On-disk layout of a memo pad: one working directory holding the store file and at
//! most one backup, a whole-file copy at `<store>.backup`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};

pub const DEFAULT_STORE_NAME: &str = "memos.db";
pub const BACKUP_SUFFIX: &str = "backup";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorePaths {
    pub working_dir: PathBuf,
    pub store: PathBuf,
    pub backup: PathBuf,
}

impl StorePaths {
    #[must_use]
    pub fn new(working_dir: impl Into<PathBuf>, store_name: &str) -> Self {
        let working_dir = working_dir.into();
        let store = working_dir.join(store_name);
        let backup = backup_path_for(&store);
        Self { working_dir, store, backup }
    }

    #[must_use]
    pub fn store_exists(&self) -> bool {
        self.store.is_file()
    }

    #[must_use]
    pub fn backup_exists(&self) -> bool {
        self.backup.is_file()
    }

    /// Create the working directory if it is missing.
    ///
    /// # Errors
    /// Returns an error when the directory cannot be created.
    pub fn ensure_working_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.working_dir).with_context(|| {
            format!("failed to create working directory {}", self.working_dir.display())
        })
    }

    /// Copy the store file over the backup, replacing any previous backup.
    ///
    /// # Errors
    /// Returns an error when the store is missing or the copy fails.
    pub fn copy_store_to_backup(&self) -> Result<u64> {
        if !self.store_exists() {
            return Err(anyhow!("store file does not exist: {}", self.store.display()));
        }
        let bytes = fs::copy(&self.store, &self.backup).with_context(|| {
            format!(
                "failed to copy store {} to backup {}",
                self.store.display(),
                self.backup.display()
            )
        })?;
        tracing::info!(backup = %self.backup.display(), bytes, "store copied to backup");
        Ok(bytes)
    }

    /// Copy the backup over the store file, replacing it wholesale.
    ///
    /// # Errors
    /// Returns an error when the backup is missing or the copy fails.
    pub fn copy_backup_to_store(&self) -> Result<u64> {
        if !self.backup_exists() {
            return Err(anyhow!("backup file does not exist: {}", self.backup.display()));
        }
        self.ensure_working_dir()?;
        let bytes = fs::copy(&self.backup, &self.store).with_context(|| {
            format!(
                "failed to restore store {} from backup {}",
                self.store.display(),
                self.backup.display()
            )
        })?;
        tracing::info!(store = %self.store.display(), bytes, "store restored from backup");
        Ok(bytes)
    }

    /// Delete the store file. Returns `false` when there was nothing to delete.
    ///
    /// # Errors
    /// Returns an error when the file exists but cannot be removed.
    pub fn remove_store(&self) -> Result<bool> {
        remove_file_if_exists(&self.store)
    }

    /// # Errors
    /// Returns an error when the file exists but cannot be removed.
    pub fn remove_backup(&self) -> Result<bool> {
        remove_file_if_exists(&self.backup)
    }

    /// Entries of the working directory other than the store and its backup. A missing
    /// directory has none.
    ///
    /// # Errors
    /// Returns an error when the directory exists but cannot be listed.
    pub fn foreign_entries(&self) -> Result<Vec<PathBuf>> {
        if !self.working_dir.is_dir() {
            return Ok(Vec::new());
        }
        let entries = fs::read_dir(&self.working_dir).with_context(|| {
            format!("failed to list working directory {}", self.working_dir.display())
        })?;

        let mut foreign = Vec::new();
        for entry in entries {
            let path = entry
                .with_context(|| format!("failed to read {}", self.working_dir.display()))?
                .path();
            if path != self.store && path != self.backup {
                foreign.push(path);
            }
        }
        foreign.sort();
        Ok(foreign)
    }

    /// Remove the (now empty) working directory.
    ///
    /// # Errors
    /// Returns an error when the directory still holds other files or cannot be removed.
    pub fn remove_working_dir(&self) -> Result<bool> {
        if !self.working_dir.exists() {
            return Ok(false);
        }
        fs::remove_dir(&self.working_dir).with_context(|| {
            format!("failed to remove working directory {}", self.working_dir.display())
        })?;
        Ok(true)
    }
}

/// Sibling backup path: `memos.db` -> `memos.db.backup`.
#[must_use]
pub fn backup_path_for(store: &Path) -> PathBuf {
    let mut name = store.file_name().map(std::ffi::OsStr::to_os_string).unwrap_or_default();
    name.push(".");
    name.push(BACKUP_SUFFIX);
    store.with_file_name(name)
}

fn remove_file_if_exists(path: &Path) -> Result<bool> {
    if !path.is_file() {
        return Ok(false);
    }
    fs::remove_file(path).with_context(|| format!("failed to remove {}", path.display()))?;
    Ok(true)
}
