//! Sync and diff command implementations

use colored::Colorize;
use deck_core::{ConfigSynchronizer, Declares, detect};

use super::{family_label, print_report};
use crate::context::Context;
use crate::error::Result;

/// Run the sync command
///
/// With neither flag set, both targets are synced.
pub fn run_sync(ctx: &Context, shell: bool, hosts: bool, dry_run: bool) -> Result<()> {
    let both = !shell && !hosts;
    let check_conflicts = ctx.settings().enable_conflict_detection;

    if shell || both {
        sync_target(
            &ctx.shell_sync(),
            &ctx.document.groups,
            family_label(false),
            dry_run,
            check_conflicts,
        )?;
    }
    if hosts || both {
        sync_target(
            &ctx.hosts_sync(),
            &ctx.document.hosts_groups,
            family_label(true),
            dry_run,
            check_conflicts,
        )?;
    }
    Ok(())
}

fn sync_target<G: Declares>(
    sync: &ConfigSynchronizer<G>,
    groups: &[G],
    label: &str,
    dry_run: bool,
    check_conflicts: bool,
) -> Result<()> {
    println!(
        "{} Syncing {} target {}",
        "=>".blue().bold(),
        label,
        sync.target().display().to_string().cyan()
    );

    if check_conflicts {
        let conflicts = detect(groups);
        if !conflicts.is_empty() {
            println!(
                "   {} {} conflicting key(s); the last group in order wins. See {}.",
                "!".yellow(),
                conflicts.len(),
                "envdeck conflicts".cyan()
            );
        }
    }

    let preview = sync.preview(groups)?;
    if preview.is_unchanged() {
        println!("{} Already up to date.", "OK".green().bold());
        return Ok(());
    }

    let (inserted, deleted) = preview.line_changes();
    if dry_run {
        println!(
            "{} Would write {} line(s) and remove {} line(s).",
            "DRY RUN".yellow().bold(),
            inserted,
            deleted
        );
        return Ok(());
    }

    let report = sync.sync(groups)?;
    print_report(&report);
    println!(
        "{} {} target synced (+{} -{}).",
        "OK".green().bold(),
        label,
        inserted,
        deleted
    );
    Ok(())
}

/// Run the diff command
pub fn run_diff(ctx: &Context, hosts: bool) -> Result<()> {
    let preview = if hosts {
        ctx.hosts_sync().preview(&ctx.document.hosts_groups)?
    } else {
        ctx.shell_sync().preview(&ctx.document.groups)?
    };

    if preview.is_unchanged() {
        println!(
            "{} {} is in sync.",
            "OK".green().bold(),
            preview.target.display()
        );
        return Ok(());
    }

    for line in preview.unified_diff().lines() {
        if line.starts_with("+++") || line.starts_with("---") {
            println!("{}", line.bold());
        } else if line.starts_with('+') {
            println!("{}", line.green());
        } else if line.starts_with('-') {
            println!("{}", line.red());
        } else if line.starts_with("@@") {
            println!("{}", line.cyan());
        } else {
            println!("{}", line);
        }
    }
    Ok(())
}
