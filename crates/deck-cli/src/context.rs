//! Per-invocation state: where the data lives and the loaded document
//!
//! Every command loads the document once, works on it in memory and saves
//! it back when it changed something.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use deck_core::{
    BackupRotator, DataPaths, Document, DocumentStore, HostsSynchronizer, Settings,
    ShellPrivilegedWriter, ShellSynchronizer,
};
use deck_fs::{FileSystem, OsFileSystem};

use crate::error::Result;

#[derive(Debug)]
pub struct Context {
    fs: Arc<dyn FileSystem>,
    paths: DataPaths,
    store: DocumentStore,
    pub document: Document,
}

impl Context {
    /// Load from `data_dir`, or from the platform data directory.
    pub fn load(data_dir: Option<&Path>) -> Result<Self> {
        let paths = match data_dir {
            Some(dir) => DataPaths::new(dir),
            None => DataPaths::platform_default()?,
        };
        Self::with_fs(Arc::new(OsFileSystem::new()), paths)
    }

    pub fn with_fs(fs: Arc<dyn FileSystem>, paths: DataPaths) -> Result<Self> {
        let store = DocumentStore::new(fs.clone(), paths.document());
        let document = store.load()?;
        tracing::debug!(data_dir = %paths.root().display(), "loaded document");
        Ok(Self {
            fs,
            paths,
            store,
            document,
        })
    }

    pub fn save(&mut self) -> Result<()> {
        self.store.save(&mut self.document)?;
        Ok(())
    }

    pub fn fs(&self) -> &dyn FileSystem {
        self.fs.as_ref()
    }

    pub fn paths(&self) -> &DataPaths {
        &self.paths
    }

    pub fn settings(&self) -> &Settings {
        &self.document.settings
    }

    pub fn shell_target(&self) -> PathBuf {
        self.settings().shell_config_path(self.fs())
    }

    pub fn hosts_target(&self) -> PathBuf {
        self.settings().hosts_file_path.clone()
    }

    pub fn backups(&self) -> BackupRotator {
        BackupRotator::new(
            self.fs.clone(),
            self.paths.backups(),
            self.settings().max_backup_count,
        )
    }

    pub fn shell_sync(&self) -> ShellSynchronizer {
        ShellSynchronizer::shell(self.shell_target(), self.fs.clone(), self.backups())
            .with_auto_backup(self.settings().auto_backup)
    }

    pub fn hosts_sync(&self) -> HostsSynchronizer {
        let settings = self.settings();
        let privileged =
            ShellPrivilegedWriter::new(settings.elevation, settings.flush_command());
        HostsSynchronizer::hosts(
            self.hosts_target(),
            self.fs.clone(),
            self.backups(),
            Arc::new(privileged),
        )
        .with_auto_backup(settings.auto_backup)
    }
}
