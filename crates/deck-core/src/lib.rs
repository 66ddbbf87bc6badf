//! Core layer of EnvDeck
//!
//! This crate owns everything between the text codecs in `deck-blocks` and
//! the command-line front end:
//!
//! - **Model**: variable and host groups, and the [`ManagedGroup`] trait both implement
//! - **GroupList**: add, remove, reorder and duplicate groups while keeping `order` dense
//! - **Conflicts**: keys or hostnames declared by more than one enabled group
//! - **Backups**: timestamped snapshots of target files with bounded retention
//! - **ConfigSynchronizer**: the backup, render, splice and write transaction
//! - **Document**: persisted groups and [`Settings`], plus import and export
//!
//! # Architecture
//!
//! ```text
//!          deck-cli
//!              |
//!          deck-core
//!              |
//!      +-------+-------+
//!      |               |
//!   deck-fs       deck-blocks
//! ```

pub mod backup;
pub mod conflict;
pub mod document;
pub mod error;
pub mod groups;
pub mod interchange;
pub mod model;
pub mod privilege;
pub mod settings;
pub mod sync;

pub use deck_blocks::validators;

pub use backup::{BackupFile, BackupRotator, DEFAULT_MAX_BACKUPS};
pub use conflict::{ConflictInfo, Contributor, Declares, detect, is_duplicate_in_group};
pub use document::{DataPaths, Document, DocumentStore, SCHEMA_VERSION};
pub use error::{Error, Result};
pub use groups::GroupList;
pub use model::{EnvGroup, HostEntry, HostGroup, ManagedGroup, Variable};
pub use privilege::{Elevation, PrivilegedWriter, ShellPrivilegedWriter};
pub use settings::{Settings, ShellType};
pub use sync::{
    ConfigSynchronizer, DirectWriter, HostsSynchronizer, PrivilegedTargetWriter,
    ShellSynchronizer, SyncPreview, SyncReport, TargetWriter,
};

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn error_file_not_found_displays_path() {
        let error = Error::FileNotFound {
            path: PathBuf::from("/home/u/.zshrc"),
        };
        let display = error.to_string();
        assert!(
            display.contains("/home/u/.zshrc"),
            "Error display should contain the path, got: {}",
            display
        );
    }

    #[test]
    fn fs_errors_convert_transparently() {
        let inner = deck_fs::Error::NotFound {
            path: PathBuf::from("/missing"),
        };
        let expected = inner.to_string();
        let error: Error = inner.into();
        assert_eq!(error.to_string(), expected);
    }
}
