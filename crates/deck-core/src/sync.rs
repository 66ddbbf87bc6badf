//! Read-modify-write of a target file's managed section
//!
//! [`ConfigSynchronizer`] runs one transaction per call: snapshot the target,
//! render the enabled groups, splice the result into the current content and
//! write it back through a [`TargetWriter`]. The shell flavor writes directly;
//! the hosts flavor stages the content and hands it to a
//! [`PrivilegedWriter`], then flushes the resolver cache.

use std::fmt;
use std::io::Write;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use deck_blocks::{
    DEFAULT_PRODUCT, ExternalDeclaration, Markers, line_at, remove_line, render, scan, splice,
};
use deck_fs::FileSystem;
use serde::Serialize;
use similar::TextDiff;
use uuid::Uuid;

use crate::backup::BackupRotator;
use crate::model::{EnvGroup, HostGroup, ManagedGroup};
use crate::privilege::PrivilegedWriter;
use crate::{Error, Result};

/// Outcome of a write to a target file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub target: PathBuf,
    /// Snapshot taken before the first write, if any.
    pub backup: Option<PathBuf>,
    pub bytes_written: usize,
    /// Human-readable steps that were performed.
    pub actions: Vec<String>,
    /// Non-fatal failures, such as a resolver flush that did not run.
    pub warnings: Vec<String>,
}

impl SyncReport {
    fn new(target: &Path) -> Self {
        Self {
            target: target.to_path_buf(),
            backup: None,
            bytes_written: 0,
            actions: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Fold a later report for the same target into this one.
    fn merge(mut self, later: SyncReport) -> Self {
        self.backup = self.backup.or(later.backup);
        self.bytes_written = later.bytes_written;
        self.actions.extend(later.actions);
        self.warnings.extend(later.warnings);
        self
    }
}

/// What a sync would change, computed without side effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncPreview {
    pub target: PathBuf,
    pub before: String,
    pub after: String,
}

impl SyncPreview {
    pub fn is_unchanged(&self) -> bool {
        self.before == self.after
    }

    /// Unified diff of the target, empty when nothing changes.
    pub fn unified_diff(&self) -> String {
        if self.is_unchanged() {
            return String::new();
        }
        let name = self.target.display().to_string();
        TextDiff::from_lines(&self.before, &self.after)
            .unified_diff()
            .context_radius(3)
            .header(&format!("{name} (current)"), &format!("{name} (synced)"))
            .to_string()
    }

    /// `(inserted, deleted)` line counts.
    pub fn line_changes(&self) -> (usize, usize) {
        let diff = TextDiff::from_lines(&self.before, &self.after);
        diff.iter_all_changes()
            .fold((0, 0), |(ins, del), change| match change.tag() {
                similar::ChangeTag::Insert => (ins + 1, del),
                similar::ChangeTag::Delete => (ins, del + 1),
                similar::ChangeTag::Equal => (ins, del),
            })
    }
}

/// Final step of a transaction: put content at the target.
pub trait TargetWriter: Send + Sync + fmt::Debug {
    fn write(&self, target: &Path, content: &str) -> Result<()>;

    /// Side effect after a successful write. Failures are reported as
    /// warnings, never as errors.
    fn after_write(&self) -> Result<()> {
        Ok(())
    }
}

/// Atomic write through the [`FileSystem`].
#[derive(Debug, Clone)]
pub struct DirectWriter {
    fs: Arc<dyn FileSystem>,
}

impl DirectWriter {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }
}

impl TargetWriter for DirectWriter {
    fn write(&self, target: &Path, content: &str) -> Result<()> {
        self.fs
            .write_atomic(target, content.as_bytes())
            .map_err(|e| match e {
                deck_fs::Error::PermissionDenied { path } => Error::PermissionDenied { path },
                other => other.into(),
            })
    }
}

/// Stage to a private temp file, then let a [`PrivilegedWriter`] install it.
#[derive(Debug, Clone)]
pub struct PrivilegedTargetWriter {
    privileged: Arc<dyn PrivilegedWriter>,
    staging_dir: Option<PathBuf>,
}

impl PrivilegedTargetWriter {
    pub fn new(privileged: Arc<dyn PrivilegedWriter>) -> Self {
        Self {
            privileged,
            staging_dir: None,
        }
    }

    /// Stage in `dir` instead of the system temp directory.
    pub fn with_staging_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_dir = Some(dir.into());
        self
    }
}

impl TargetWriter for PrivilegedTargetWriter {
    fn write(&self, target: &Path, content: &str) -> Result<()> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("envdeck_hosts_");
        let mut staged = match &self.staging_dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        staged.write_all(content.as_bytes())?;
        staged.as_file().sync_all()?;

        let staged = staged.into_temp_path();
        let result = self.privileged.replace_file(&staged, target);

        // The privileged command deletes the staged file on success.
        if let Err(e) = staged.close()
            && e.kind() != std::io::ErrorKind::NotFound
        {
            tracing::debug!(error = %e, "could not remove staged file");
        }
        result
    }

    fn after_write(&self) -> Result<()> {
        self.privileged.flush_resolver_cache()
    }
}

/// Keeps one target file's managed section in step with a list of groups.
#[derive(Debug)]
pub struct ConfigSynchronizer<G> {
    markers: Markers,
    target: PathBuf,
    fs: Arc<dyn FileSystem>,
    backups: BackupRotator,
    auto_backup: bool,
    writer: Box<dyn TargetWriter>,
    _family: PhantomData<fn() -> G>,
}

/// Synchronizer for shell startup scripts.
pub type ShellSynchronizer = ConfigSynchronizer<EnvGroup>;

/// Synchronizer for the hosts file.
pub type HostsSynchronizer = ConfigSynchronizer<HostGroup>;

impl ConfigSynchronizer<EnvGroup> {
    /// Shell flavor: writes go straight through `fs`.
    pub fn shell(target: impl Into<PathBuf>, fs: Arc<dyn FileSystem>, backups: BackupRotator) -> Self {
        let writer = Box::new(DirectWriter::new(fs.clone()));
        Self::new(target, fs, backups, writer)
    }
}

impl ConfigSynchronizer<HostGroup> {
    /// Hosts flavor: writes are staged and installed by `privileged`.
    pub fn hosts(
        target: impl Into<PathBuf>,
        fs: Arc<dyn FileSystem>,
        backups: BackupRotator,
        privileged: Arc<dyn PrivilegedWriter>,
    ) -> Self {
        let writer = Box::new(PrivilegedTargetWriter::new(privileged));
        Self::new(target, fs, backups, writer)
    }
}

impl<G: ManagedGroup> ConfigSynchronizer<G> {
    pub fn new(
        target: impl Into<PathBuf>,
        fs: Arc<dyn FileSystem>,
        backups: BackupRotator,
        writer: Box<dyn TargetWriter>,
    ) -> Self {
        Self {
            markers: Markers::new(DEFAULT_PRODUCT, G::FAMILY),
            target: target.into(),
            fs,
            backups,
            auto_backup: true,
            writer,
            _family: PhantomData,
        }
    }

    /// Whether [`sync`](Self::sync) snapshots the target first. On by default.
    pub fn with_auto_backup(mut self, enabled: bool) -> Self {
        self.auto_backup = enabled;
        self
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    pub fn markers(&self) -> &Markers {
        &self.markers
    }

    pub fn backups(&self) -> &BackupRotator {
        &self.backups
    }

    /// Current content of the target; a missing file reads as empty.
    pub fn read_target(&self) -> Result<String> {
        Ok(self.fs.read_optional(&self.target)?.unwrap_or_default())
    }

    /// Project the enabled `groups` into the target file.
    pub fn sync(&self, groups: &[G]) -> Result<SyncReport> {
        let backup = if self.auto_backup {
            self.backups.snapshot(&self.target)?
        } else {
            None
        };

        let original = self.read_target()?;
        let section = render(&self.markers, groups);
        let updated = splice(&self.markers, &original, &section);

        let enabled = groups.iter().filter(|g| g.is_enabled()).count();
        let action = if section.is_empty() {
            "removed managed section".to_string()
        } else {
            format!("rendered {enabled} enabled group(s)")
        };
        self.commit(&updated, backup, action)
    }

    /// What [`sync`](Self::sync) would write, without writing.
    pub fn preview(&self, groups: &[G]) -> Result<SyncPreview> {
        let before = self.read_target()?;
        let after = splice(&self.markers, &before, &render(&self.markers, groups));
        Ok(SyncPreview {
            target: self.target.clone(),
            before,
            after,
        })
    }

    /// Declarations in the target that live outside the managed section.
    pub fn scan_external(&self) -> Result<Vec<ExternalDeclaration>> {
        Ok(scan(&self.markers, &self.read_target()?))
    }

    /// Delete one line of the target, always snapshotting it first.
    ///
    /// With `expected_raw`, the line must still read exactly that, so a file
    /// edited since it was scanned is never cut in the wrong place.
    pub fn remove_external(&self, line_number: usize, expected_raw: Option<&str>) -> Result<SyncReport> {
        let content = self
            .fs
            .read_optional(&self.target)?
            .ok_or_else(|| Error::FileNotFound {
                path: self.target.clone(),
            })?;

        let updated =
            remove_line(&content, line_number).map_err(|e| Error::from_blocks(&self.target, e))?;
        if let Some(expected) = expected_raw
            && line_at(&content, line_number) != Some(expected)
        {
            return Err(Error::StaleDeclaration {
                path: self.target.clone(),
                line: line_number,
            });
        }

        let backup = self.backups.snapshot(&self.target)?;
        self.commit(&updated, backup, format!("removed line {line_number}"))
    }

    /// Move an external declaration under management.
    ///
    /// The source line is removed from the target, the declaration is
    /// appended to the group with id `group_id`, and the target is synced.
    pub fn migrate(
        &self,
        groups: &mut [G],
        group_id: Uuid,
        declaration: &ExternalDeclaration,
    ) -> Result<SyncReport> {
        let idx = groups
            .iter()
            .position(|g| g.id() == group_id)
            .ok_or_else(|| Error::GroupNotFound(group_id.to_string()))?;
        let item = G::item_from_declaration(declaration)?;

        let removed =
            self.remove_external(declaration.line_number, Some(&declaration.raw_line))?;

        let group = &mut groups[idx];
        group.items_mut().push(item);
        group.touch();
        tracing::info!(
            key = %declaration.key,
            group = group.name(),
            "migrated external declaration"
        );

        let synced = self.sync(groups)?;
        Ok(removed.merge(synced))
    }

    /// Write a backup's content over the target through this flavor's writer.
    ///
    /// The current target is snapshotted first regardless of the auto-backup
    /// setting.
    pub fn restore(&self, backup: &Path) -> Result<SyncReport> {
        let backup = self.backups.resolve(backup)?;
        let content = self.fs.read_to_string(&backup)?;
        let snapshot = self.backups.snapshot(&self.target)?;
        self.commit(
            &content,
            snapshot,
            format!("restored {}", backup.display()),
        )
    }

    fn commit(&self, content: &str, backup: Option<PathBuf>, action: String) -> Result<SyncReport> {
        let mut report = SyncReport::new(&self.target);
        if let Some(path) = &backup {
            report.actions.push(format!("backed up to {}", path.display()));
        }
        report.backup = backup;
        report.actions.push(action);

        self.writer.write(&self.target, content)?;
        report.bytes_written = content.len();
        report
            .actions
            .push(format!("wrote {} bytes to {}", content.len(), self.target.display()));
        tracing::info!(
            target = %self.target.display(),
            bytes = content.len(),
            family = %self.markers.family(),
            "wrote target"
        );

        if let Err(e) = self.writer.after_write() {
            tracing::warn!(error = %e, "post-write step failed");
            report.warnings.push(format!("resolver cache flush failed: {e}"));
        }
        Ok(report)
    }
}
