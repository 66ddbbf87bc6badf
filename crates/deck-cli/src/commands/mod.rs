//! Command implementations for deck-cli

pub mod backup;
pub mod conflicts;
pub mod external;
pub mod group;
pub mod interchange;
pub mod items;
pub mod status;
pub mod sync;

pub use backup::run_backup;
pub use conflicts::run_conflicts;
pub use external::{run_migrate, run_remove_line, run_scan};
pub use group::run_group;
pub use interchange::{run_export, run_import};
pub use items::{run_host, run_var};
pub use status::run_status;
pub use sync::{run_diff, run_sync};

use colored::Colorize;
use deck_core::SyncReport;

/// Human name of the target family selected by a `--hosts` flag.
pub(crate) fn family_label(hosts: bool) -> &'static str {
    if hosts { "hosts" } else { "shell" }
}

/// Print what a write did, including non-fatal warnings.
pub(crate) fn print_report(report: &SyncReport) {
    for action in &report.actions {
        println!("   {} {}", "+".green(), action);
    }
    for warning in &report.warnings {
        println!("   {} {}", "!".yellow(), warning.yellow());
    }
}
