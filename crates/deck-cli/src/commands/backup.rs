//! Backup command implementations

use std::path::Path;

use colored::Colorize;

use super::print_report;
use crate::cli::BackupAction;
use crate::context::Context;
use crate::error::Result;

/// Run a backup subcommand
pub fn run_backup(ctx: &Context, action: BackupAction) -> Result<()> {
    let rotator = ctx.backups();
    match action {
        BackupAction::List { json } => {
            let backups = rotator.list()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&backups)?);
                return Ok(());
            }
            if backups.is_empty() {
                println!("  {}", "No backups".dimmed());
                return Ok(());
            }
            println!(
                "{} {} backup(s) in {} (keeping {}):",
                "=>".blue().bold(),
                backups.len(),
                rotator.backup_dir().display().to_string().cyan(),
                rotator.max_count()
            );
            for backup in &backups {
                println!(
                    "  {}  {}  {}",
                    backup.created_display().dimmed(),
                    backup.file_name,
                    format!("{} bytes", backup.size).dimmed()
                );
            }
        }
        BackupAction::Restore { backup } => {
            let path = rotator.resolve(&backup)?;
            let report = if is_hosts_backup(ctx, &path) {
                ctx.hosts_sync().restore(&path)?
            } else {
                ctx.shell_sync().restore(&path)?
            };
            print_report(&report);
            println!(
                "{} Restored {}.",
                "OK".green().bold(),
                report.target.display().to_string().cyan()
            );
        }
        BackupAction::Prune { keep } => {
            let keep = keep.unwrap_or(rotator.max_count());
            let removed = rotator.prune(keep)?;
            println!(
                "{} Removed {} backup(s), kept at most {}.",
                "OK".green().bold(),
                removed.len(),
                keep
            );
        }
        BackupAction::Delete { backup } => {
            rotator.delete(&backup)?;
            println!("{} Deleted {}.", "OK".green().bold(), backup.display());
        }
    }
    Ok(())
}

/// Backups are named after the file they were taken from.
fn is_hosts_backup(ctx: &Context, backup: &Path) -> bool {
    let hosts = ctx.hosts_target();
    let (Some(base), Some(name)) = (hosts.file_name(), backup.file_name()) else {
        return false;
    };
    name.to_string_lossy()
        .starts_with(&format!("{}.", base.to_string_lossy()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::run_sync;
    use crate::context::test_support::temp_context;

    #[test]
    fn test_restore_shell_backup() {
        let (temp, mut ctx) = temp_context();
        let rc = temp.path().join(".zshrc");
        std::fs::write(&rc, "original\n").unwrap();
        ctx.document.groups[0].is_enabled = true;
        run_sync(&ctx, true, false, false).unwrap();

        let backups = ctx.backups().list().unwrap();
        assert_eq!(backups.len(), 1);
        assert!(!is_hosts_backup(&ctx, &backups[0].path));

        run_backup(
            &ctx,
            BackupAction::Restore {
                backup: backups[0].file_name.clone().into(),
            },
        )
        .unwrap();
        assert_eq!(std::fs::read_to_string(&rc).unwrap(), "original\n");
        assert_eq!(ctx.backups().list().unwrap().len(), 2);
    }

    #[test]
    fn test_prune_and_delete() {
        let (temp, ctx) = temp_context();
        let rc = temp.path().join(".zshrc");
        std::fs::write(&rc, "x\n").unwrap();
        let rotator = ctx.backups();
        let first = rotator.snapshot(&rc).unwrap().unwrap();
        rotator.snapshot(&rc).unwrap();

        run_backup(&ctx, BackupAction::List { json: true }).unwrap();
        run_backup(&ctx, BackupAction::Delete { backup: first }).unwrap();
        assert_eq!(rotator.list().unwrap().len(), 1);

        run_backup(&ctx, BackupAction::Prune { keep: Some(0) }).unwrap();
        assert!(rotator.list().unwrap().is_empty());
    }

    #[test]
    fn test_hosts_backup_detection() {
        let (temp, ctx) = temp_context();
        let backup = temp.path().join("data/backups/hosts.20240501_120000.bak");
        assert!(is_hosts_backup(&ctx, &backup));
    }
}
