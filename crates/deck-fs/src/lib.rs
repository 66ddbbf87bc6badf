//! Filesystem abstraction for EnvDeck
//!
//! Provides the [`FileSystem`] capability that every service in `deck-core`
//! receives at construction time, safe atomic I/O for real files, and a
//! format-agnostic [`ConfigStore`] for documents.
//!
//! Two implementations of [`FileSystem`] ship with the crate:
//!
//! - [`OsFileSystem`]: the real filesystem, writes go through [`io::write_atomic`]
//! - [`MemoryFileSystem`]: an in-process map of paths to contents, used by tests

pub mod config;
pub mod error;
pub mod filesystem;
pub mod io;

pub use config::ConfigStore;
pub use error::{Error, Result};
pub use filesystem::{FileEntry, FileSystem, MemoryFileSystem, OsFileSystem};
