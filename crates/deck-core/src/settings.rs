//! User settings stored alongside the groups

use std::fmt;
use std::path::{Path, PathBuf};

use deck_fs::FileSystem;
use serde::{Deserialize, Serialize};

use crate::backup::DEFAULT_MAX_BACKUPS;
use crate::privilege::{Elevation, default_flush_command};

/// Retention bounds accepted for `max_backup_count`.
pub const MIN_BACKUPS: usize = 5;
pub const MAX_BACKUPS: usize = 20;

/// Default hosts file location.
pub const DEFAULT_HOSTS_PATH: &str = "/etc/hosts";

/// Which shell's startup script receives the variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShellType {
    Bash,
    Zsh,
}

impl ShellType {
    /// Guess from `$SHELL`, preferring zsh when unknown.
    pub fn detect() -> Self {
        Self::from_shell_path(&std::env::var("SHELL").unwrap_or_default())
    }

    pub fn from_shell_path(shell: &str) -> Self {
        if shell.contains("zsh") {
            Self::Zsh
        } else if shell.contains("bash") {
            Self::Bash
        } else {
            Self::Zsh
        }
    }

    /// `~/.zshrc` for zsh; `~/.bashrc` for bash, or `~/.bash_profile` when
    /// there is no `.bashrc`.
    pub fn default_config_path(&self, home: &Path, fs: &dyn FileSystem) -> PathBuf {
        match self {
            Self::Zsh => home.join(".zshrc"),
            Self::Bash => {
                let bashrc = home.join(".bashrc");
                if fs.exists(&bashrc) {
                    bashrc
                } else {
                    home.join(".bash_profile")
                }
            }
        }
    }
}

impl fmt::Display for ShellType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Bash => "bash",
            Self::Zsh => "zsh",
        })
    }
}

/// Persisted preferences. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub shell_type: ShellType,
    /// Explicit shell startup script; `None` follows [`ShellType`].
    pub config_file_path: Option<PathBuf>,
    pub hosts_file_path: PathBuf,
    pub auto_backup: bool,
    pub max_backup_count: usize,
    pub enable_conflict_detection: bool,
    pub export_includes_disabled_groups: bool,
    pub elevation: Elevation,
    /// Resolver flush script; `None` uses the platform default.
    pub flush_command: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            shell_type: ShellType::detect(),
            config_file_path: None,
            hosts_file_path: PathBuf::from(DEFAULT_HOSTS_PATH),
            auto_backup: true,
            max_backup_count: DEFAULT_MAX_BACKUPS,
            enable_conflict_detection: true,
            export_includes_disabled_groups: false,
            elevation: Elevation::default(),
            flush_command: None,
        }
    }
}

impl Settings {
    /// Clamp values loaded from disk into their accepted ranges.
    pub fn normalize(&mut self) {
        self.max_backup_count = self.max_backup_count.clamp(MIN_BACKUPS, MAX_BACKUPS);
    }

    pub fn set_max_backup_count(&mut self, count: usize) {
        self.max_backup_count = count.clamp(MIN_BACKUPS, MAX_BACKUPS);
    }

    /// The shell startup script to manage.
    pub fn shell_config_path(&self, fs: &dyn FileSystem) -> PathBuf {
        if let Some(path) = &self.config_file_path {
            return path.clone();
        }
        let home = dirs::home_dir().unwrap_or_default();
        self.shell_type.default_config_path(&home, fs)
    }

    pub fn flush_command(&self) -> &str {
        self.flush_command
            .as_deref()
            .unwrap_or_else(|| default_flush_command())
    }
}
