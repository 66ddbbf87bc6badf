//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

/// EnvDeck - Keep environment variables and hosts entries in named groups
#[derive(Parser, Debug)]
#[command(name = "envdeck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory holding data.json and backups
    #[arg(long, global = true, env = "ENVDECK_DATA_DIR", value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Show targets, groups, conflicts and backups at a glance
    Status {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Write enabled groups into the shell startup script and hosts file
    ///
    /// Without --shell or --hosts both targets are synced. Targets whose
    /// content would not change are left alone.
    Sync {
        /// Only sync the shell startup script
        #[arg(long, conflicts_with = "hosts")]
        shell: bool,

        /// Only sync the hosts file
        #[arg(long)]
        hosts: bool,

        /// Show what would change without writing
        #[arg(long)]
        dry_run: bool,
    },

    /// Show the diff a sync would apply
    Diff {
        /// Diff the hosts file instead of the shell startup script
        #[arg(long)]
        hosts: bool,
    },

    /// List keys or hostnames declared by more than one enabled group
    Conflicts {
        /// Check host groups instead of variable groups
        #[arg(long)]
        hosts: bool,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// List declarations outside the managed section
    Scan {
        /// Scan the hosts file instead of the shell startup script
        #[arg(long)]
        hosts: bool,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Move an external declaration into a group
    ///
    /// Examples:
    ///   envdeck scan                       # find line numbers
    ///   envdeck migrate 12 --group Work    # move line 12 into Work
    Migrate {
        /// Line number reported by `envdeck scan`
        line: usize,

        /// Group name or id prefix to move the declaration into
        #[arg(short, long)]
        group: String,

        /// Migrate from the hosts file
        #[arg(long)]
        hosts: bool,
    },

    /// Delete one line from a target file, after backing it up
    RemoveLine {
        /// 1-based line number
        line: usize,

        /// Edit the hosts file instead of the shell startup script
        #[arg(long)]
        hosts: bool,
    },

    /// Manage groups
    Group {
        #[command(subcommand)]
        action: GroupAction,
    },

    /// Manage variables in a group
    Var {
        #[command(subcommand)]
        action: VarAction,
    },

    /// Manage entries in a host group
    Host {
        #[command(subcommand)]
        action: HostAction,
    },

    /// Manage backups of target files
    Backup {
        #[command(subcommand)]
        action: BackupAction,
    },

    /// Export groups
    ///
    /// Examples:
    ///   envdeck export -o groups.json
    ///   envdeck export --format shell --group Work
    ///   envdeck export --format hosts --include-disabled
    Export {
        /// Output format
        #[arg(long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,

        /// Export host groups (implied by --format hosts)
        #[arg(long)]
        hosts: bool,

        /// Export only this group
        #[arg(short, long)]
        group: Option<String>,

        /// Include disabled groups
        #[arg(long)]
        include_disabled: bool,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Import groups; imported groups start disabled
    Import {
        /// File to read
        file: PathBuf,

        /// Input format
        #[arg(long, value_enum, default_value_t = ImportFormat::Json)]
        format: ImportFormat,

        /// Import host groups (implied by --format hosts)
        #[arg(long)]
        hosts: bool,

        /// Group name for a hosts-format import
        #[arg(long, default_value = "Imported")]
        name: String,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Group actions
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum GroupAction {
    /// List groups in order
    List {
        #[arg(long)]
        hosts: bool,
    },

    /// Create a new, disabled group
    Add {
        name: String,

        #[arg(short, long, default_value = "")]
        description: String,

        #[arg(long)]
        hosts: bool,
    },

    /// Delete a group
    Remove {
        /// Group name or id prefix
        group: String,

        #[arg(long)]
        hosts: bool,
    },

    /// Enable a group
    Enable {
        group: String,

        #[arg(long)]
        hosts: bool,
    },

    /// Disable a group
    Disable {
        group: String,

        #[arg(long)]
        hosts: bool,
    },

    /// Move a group to a new position (0 is first)
    Move {
        group: String,

        position: usize,

        #[arg(long)]
        hosts: bool,
    },

    /// Copy a group; the copy starts disabled
    Duplicate {
        group: String,

        #[arg(long)]
        hosts: bool,
    },
}

impl GroupAction {
    pub fn hosts(&self) -> bool {
        match self {
            Self::List { hosts }
            | Self::Add { hosts, .. }
            | Self::Remove { hosts, .. }
            | Self::Enable { hosts, .. }
            | Self::Disable { hosts, .. }
            | Self::Move { hosts, .. }
            | Self::Duplicate { hosts, .. } => *hosts,
        }
    }
}

/// Variable actions
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum VarAction {
    /// Add a variable, or update it if the group already has the key
    Set {
        group: String,
        key: String,
        value: String,

        /// Mask the value in listings
        #[arg(long)]
        sensitive: bool,
    },

    /// Remove a variable from a group
    Unset { group: String, key: String },
}

/// Host entry actions
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum HostAction {
    /// Add an `ip hostname` mapping to a group
    Add {
        group: String,
        ip: String,
        hostname: String,

        #[arg(short, long, default_value = "")]
        comment: String,
    },

    /// Remove a hostname from a group
    Remove { group: String, hostname: String },
}

/// Backup actions
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum BackupAction {
    /// List backups, newest first
    List {
        #[arg(long)]
        json: bool,
    },

    /// Write a backup back over the file it was taken from
    Restore {
        /// Backup file name or path
        backup: PathBuf,
    },

    /// Delete all but the newest backups
    Prune {
        /// How many to keep (defaults to the configured maximum)
        #[arg(long)]
        keep: Option<usize>,
    },

    /// Delete one backup
    Delete { backup: PathBuf },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Versioned JSON document
    Json,
    /// Bash script for one variable group
    Shell,
    /// Hosts-file fragment
    Hosts,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    Json,
    Hosts,
}
