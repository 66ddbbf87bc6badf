//! Timestamped snapshots of target files
//!
//! Every snapshot lands in one flat directory as
//! `<basename>.<YYYYMMDD_HHMMSS>.bak`. Retention is global across targets:
//! after each snapshot only the newest `max_count` backups are kept.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use chrono::Local;
use deck_fs::{FileEntry, FileSystem};
use serde::Serialize;

use crate::{Error, Result};

/// Extension shared by every backup file.
pub const BACKUP_EXTENSION: &str = "bak";

/// Retention used when nothing else is configured.
pub const DEFAULT_MAX_BACKUPS: usize = 10;

/// A backup file on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupFile {
    pub path: PathBuf,
    pub file_name: String,
    #[serde(serialize_with = "serialize_system_time")]
    pub created: SystemTime,
    pub size: u64,
}

impl BackupFile {
    fn from_entry(entry: FileEntry) -> Option<Self> {
        let file_name = entry.file_name()?.to_string();
        Some(Self {
            path: entry.path,
            file_name,
            created: entry.created,
            size: entry.len,
        })
    }

    /// Local creation time formatted for display.
    pub fn created_display(&self) -> String {
        chrono::DateTime::<Local>::from(self.created)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
    }
}

fn serialize_system_time<S: serde::Serializer>(
    time: &SystemTime,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&chrono::DateTime::<chrono::Utc>::from(*time).to_rfc3339())
}

/// Creates, prunes, lists and restores backups in one directory.
#[derive(Debug, Clone)]
pub struct BackupRotator {
    fs: Arc<dyn FileSystem>,
    backup_dir: PathBuf,
    max_count: usize,
}

impl BackupRotator {
    pub fn new(fs: Arc<dyn FileSystem>, backup_dir: impl Into<PathBuf>, max_count: usize) -> Self {
        Self {
            fs,
            backup_dir: backup_dir.into(),
            max_count,
        }
    }

    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    pub fn max_count(&self) -> usize {
        self.max_count
    }

    /// Copy `path` into the backup directory, then prune.
    ///
    /// Returns `Ok(None)` without touching anything when `path` does not
    /// exist. Any failure is returned so the caller can abort its write.
    pub fn snapshot(&self, path: &Path) -> Result<Option<PathBuf>> {
        if !self.fs.exists(path) {
            tracing::debug!(path = %path.display(), "nothing to back up");
            return Ok(None);
        }

        let base = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "file".to_string());

        self.fs.create_dir_all(&self.backup_dir)?;
        let dest = self.unused_name(&base, &Local::now().format("%Y%m%d_%H%M%S").to_string());
        self.fs.copy(path, &dest)?;
        tracing::info!(source = %path.display(), backup = %dest.display(), "created backup");

        self.prune(self.max_count)?;
        Ok(Some(dest))
    }

    /// `<base>.<stamp>.bak`, or `<base>.<stamp>-N.bak` if taken.
    fn unused_name(&self, base: &str, stamp: &str) -> PathBuf {
        let first = self
            .backup_dir
            .join(format!("{base}.{stamp}.{BACKUP_EXTENSION}"));
        if !self.fs.exists(&first) {
            return first;
        }
        (1..)
            .map(|n| {
                self.backup_dir
                    .join(format!("{base}.{stamp}-{n}.{BACKUP_EXTENSION}"))
            })
            .find(|candidate| !self.fs.exists(candidate))
            .unwrap_or(first)
    }

    /// Delete all but the newest `max_count` backups. Returns what was removed.
    pub fn prune(&self, max_count: usize) -> Result<Vec<PathBuf>> {
        let backups = self.list()?;
        let mut removed = Vec::new();

        for backup in backups.into_iter().skip(max_count) {
            self.fs.remove_file(&backup.path)?;
            tracing::debug!(backup = %backup.path.display(), "pruned backup");
            removed.push(backup.path);
        }

        if !removed.is_empty() {
            tracing::info!(removed = removed.len(), kept = max_count, "pruned old backups");
        }
        Ok(removed)
    }

    /// Every backup, newest first.
    pub fn list(&self) -> Result<Vec<BackupFile>> {
        let entries = match self.fs.list_dir(&self.backup_dir) {
            Ok(entries) => entries,
            Err(e) if e.is_not_found() => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut backups: Vec<BackupFile> = entries
            .into_iter()
            .filter(|e| {
                e.path
                    .extension()
                    .is_some_and(|ext| ext == BACKUP_EXTENSION)
            })
            .filter_map(BackupFile::from_entry)
            .collect();

        backups.sort_by(|a, b| {
            b.created
                .cmp(&a.created)
                .then_with(|| b.file_name.cmp(&a.file_name))
        });
        Ok(backups)
    }

    /// Backups taken of files named like `target`, newest first.
    pub fn list_for(&self, target: &Path) -> Result<Vec<BackupFile>> {
        let Some(base) = target.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            return Ok(Vec::new());
        };
        let prefix = format!("{base}.");
        Ok(self
            .list()?
            .into_iter()
            .filter(|b| b.file_name.starts_with(&prefix))
            .collect())
    }

    /// Resolve a backup given by file name or full path.
    pub fn resolve(&self, name_or_path: &Path) -> Result<PathBuf> {
        let candidate = if name_or_path.components().count() == 1 {
            self.backup_dir.join(name_or_path)
        } else {
            name_or_path.to_path_buf()
        };

        let inside = candidate.parent() == Some(self.backup_dir.as_path());
        let is_backup = candidate
            .extension()
            .is_some_and(|ext| ext == BACKUP_EXTENSION);
        if !inside || !is_backup {
            return Err(Error::NotABackup { path: candidate });
        }
        if !self.fs.exists(&candidate) {
            return Err(Error::FileNotFound { path: candidate });
        }
        Ok(candidate)
    }

    pub fn delete(&self, backup: &Path) -> Result<()> {
        let path = self.resolve(backup)?;
        self.fs.remove_file(&path)?;
        tracing::info!(backup = %path.display(), "deleted backup");
        Ok(())
    }

    /// Overwrite `target` with `backup`, snapshotting `target` first.
    ///
    /// Only for targets the current user can write; the synchronizer routes
    /// privileged targets through its own writer instead.
    pub fn restore(&self, backup: &Path, target: &Path) -> Result<Option<PathBuf>> {
        let backup = self.resolve(backup)?;
        let content = self.fs.read_to_string(&backup)?;
        let snapshot = self.snapshot(target)?;
        self.fs.write_atomic(target, content.as_bytes())?;
        tracing::info!(backup = %backup.display(), target = %target.display(), "restored backup");
        Ok(snapshot)
    }
}
