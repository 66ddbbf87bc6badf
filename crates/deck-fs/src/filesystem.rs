//! The `FileSystem` capability
//!
//! Services never touch `std::fs` directly; they receive an
//! `Arc<dyn FileSystem>` so that tests can substitute [`MemoryFileSystem`].

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, SystemTime};

use crate::{Error, Result, io};

/// A regular file found by [`FileSystem::list_dir`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub path: PathBuf,
    /// Creation time, or modification time where the platform does not
    /// record creation.
    pub created: SystemTime,
    pub len: u64,
}

impl FileEntry {
    /// The final path component as UTF-8, if it is valid UTF-8.
    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|n| n.to_str())
    }
}

/// File operations needed by the synchronization engine.
pub trait FileSystem: Send + Sync + fmt::Debug {
    /// Read a UTF-8 file. A missing file is [`Error::NotFound`].
    fn read_to_string(&self, path: &Path) -> Result<String>;

    fn exists(&self, path: &Path) -> bool;

    /// Replace `path` with `content` in one step, creating parent directories.
    fn write_atomic(&self, path: &Path, content: &[u8]) -> Result<()>;

    /// Copy `from` to `to`, overwriting `to`.
    fn copy(&self, from: &Path, to: &Path) -> Result<()>;

    fn remove_file(&self, path: &Path) -> Result<()>;

    fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Regular files directly inside `dir`, in no particular order.
    fn list_dir(&self, dir: &Path) -> Result<Vec<FileEntry>>;

    /// Read a file, treating a missing file as `None`.
    fn read_optional(&self, path: &Path) -> Result<Option<String>> {
        match self.read_to_string(path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// The real filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsFileSystem;

impl OsFileSystem {
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for OsFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        io::read_text(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn write_atomic(&self, path: &Path, content: &[u8]) -> Result<()> {
        io::write_atomic(path, content)
    }

    fn copy(&self, from: &Path, to: &Path) -> Result<()> {
        fs::copy(from, to).map_err(|e| Error::io(from, e))?;
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        fs::remove_file(path).map_err(|e| Error::io(path, e))
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path).map_err(|e| Error::io(path, e))
    }

    fn list_dir(&self, dir: &Path) -> Result<Vec<FileEntry>> {
        let mut entries = Vec::new();

        for entry in fs::read_dir(dir).map_err(|e| Error::io(dir, e))? {
            let entry = entry.map_err(|e| Error::io(dir, e))?;
            let path = entry.path();
            let metadata = entry.metadata().map_err(|e| Error::io(&path, e))?;
            if !metadata.is_file() {
                continue;
            }

            let created = metadata
                .created()
                .or_else(|_| metadata.modified())
                .map_err(|e| Error::io(&path, e))?;

            entries.push(FileEntry {
                path,
                created,
                len: metadata.len(),
            });
        }

        Ok(entries)
    }
}

#[derive(Debug, Clone)]
struct MemFile {
    content: Vec<u8>,
    created: SystemTime,
}

#[derive(Debug, Default)]
struct MemState {
    files: BTreeMap<PathBuf, MemFile>,
    dirs: BTreeSet<PathBuf>,
    denied: Vec<PathBuf>,
    clock: u64,
}

impl MemState {
    /// Every write gets a strictly later creation time than the previous one.
    fn tick(&mut self) -> SystemTime {
        self.clock += 1;
        SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000 + self.clock)
    }

    fn add_dirs(&mut self, path: &Path) {
        for ancestor in path.ancestors() {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            self.dirs.insert(ancestor.to_path_buf());
        }
    }

    fn check_writable(&self, path: &Path) -> Result<()> {
        if self.denied.iter().any(|d| path.starts_with(d)) {
            return Err(Error::PermissionDenied {
                path: path.to_path_buf(),
            });
        }
        Ok(())
    }

    fn put(&mut self, path: &Path, content: Vec<u8>) {
        if let Some(parent) = path.parent() {
            self.add_dirs(parent);
        }
        let created = self.tick();
        self.files
            .insert(path.to_path_buf(), MemFile { content, created });
    }
}

/// An in-memory filesystem.
///
/// Paths are compared literally; no normalization is performed. Creation
/// times start at a fixed epoch and advance by one second per write, so
/// ordering by creation time always matches write order.
#[derive(Debug, Default)]
pub struct MemoryFileSystem {
    state: Mutex<MemState>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style helper that seeds a file.
    pub fn with_file(self, path: impl AsRef<Path>, content: impl Into<String>) -> Self {
        self.lock()
            .put(path.as_ref(), content.into().into_bytes());
        self
    }

    /// Make every write, copy or removal under `prefix` fail with
    /// [`Error::PermissionDenied`].
    pub fn deny_writes(&self, prefix: impl Into<PathBuf>) {
        self.lock().denied.push(prefix.into());
    }

    /// Paths of all files currently stored.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.lock().files.keys().cloned().collect()
    }

    fn lock(&self) -> MutexGuard<'_, MemState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl FileSystem for MemoryFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        let state = self.lock();
        let file = state.files.get(path).ok_or_else(|| Error::NotFound {
            path: path.to_path_buf(),
        })?;
        String::from_utf8(file.content.clone()).map_err(|e| {
            Error::io(
                path,
                std::io::Error::new(std::io::ErrorKind::InvalidData, e),
            )
        })
    }

    fn exists(&self, path: &Path) -> bool {
        let state = self.lock();
        state.files.contains_key(path) || state.dirs.contains(path)
    }

    fn write_atomic(&self, path: &Path, content: &[u8]) -> Result<()> {
        let mut state = self.lock();
        state.check_writable(path)?;
        state.put(path, content.to_vec());
        Ok(())
    }

    fn copy(&self, from: &Path, to: &Path) -> Result<()> {
        let mut state = self.lock();
        state.check_writable(to)?;
        let content = state
            .files
            .get(from)
            .map(|f| f.content.clone())
            .ok_or_else(|| Error::NotFound {
                path: from.to_path_buf(),
            })?;
        match to.parent() {
            Some(parent) if !parent.as_os_str().is_empty() && !state.dirs.contains(parent) => {
                Err(Error::NotFound {
                    path: parent.to_path_buf(),
                })
            }
            _ => {
                state.put(to, content);
                Ok(())
            }
        }
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        let mut state = self.lock();
        state.check_writable(path)?;
        state
            .files
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| Error::NotFound {
                path: path.to_path_buf(),
            })
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        let mut state = self.lock();
        state.check_writable(path)?;
        state.add_dirs(path);
        Ok(())
    }

    fn list_dir(&self, dir: &Path) -> Result<Vec<FileEntry>> {
        let state = self.lock();
        if !state.dirs.contains(dir) {
            return Err(Error::NotFound {
                path: dir.to_path_buf(),
            });
        }

        Ok(state
            .files
            .iter()
            .filter(|(path, _)| path.parent() == Some(dir))
            .map(|(path, file)| FileEntry {
                path: path.clone(),
                created: file.created,
                len: file.content.len() as u64,
            })
            .collect())
    }
}
