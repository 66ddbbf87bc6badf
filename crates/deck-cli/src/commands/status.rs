//! Status command implementation

use std::path::PathBuf;

use colored::Colorize;
use deck_blocks::locate;
use deck_core::{ConfigSynchronizer, Declares, detect};
use serde::Serialize;
use serde_json::json;

use crate::context::Context;
use crate::error::Result;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TargetStatus {
    path: PathBuf,
    exists: bool,
    managed_section: bool,
    in_sync: bool,
    groups: usize,
    enabled_groups: usize,
    external_declarations: usize,
    conflicts: Option<usize>,
}

fn target_status<G: Declares>(
    ctx: &Context,
    sync: &ConfigSynchronizer<G>,
    groups: &[G],
) -> Result<TargetStatus> {
    let content = sync.read_target()?;
    Ok(TargetStatus {
        path: sync.target().to_path_buf(),
        exists: ctx.fs().exists(sync.target()),
        managed_section: locate(sync.markers(), &content).is_some_and(|s| s.end_line.is_some()),
        in_sync: sync.preview(groups)?.is_unchanged(),
        groups: groups.len(),
        enabled_groups: groups.iter().filter(|g| g.is_enabled()).count(),
        external_declarations: sync.scan_external()?.len(),
        conflicts: ctx
            .settings()
            .enable_conflict_detection
            .then(|| detect(groups).len()),
    })
}

/// Run the status command
pub fn run_status(ctx: &Context, json: bool) -> Result<()> {
    let shell = target_status(ctx, &ctx.shell_sync(), &ctx.document.groups)?;
    let hosts = target_status(ctx, &ctx.hosts_sync(), &ctx.document.hosts_groups)?;
    let backups = ctx.backups().list()?.len();

    if json {
        let value = json!({
            "dataDir": ctx.paths().root(),
            "shellType": ctx.settings().shell_type.to_string(),
            "shell": shell,
            "hosts": hosts,
            "backups": backups,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("{}", "EnvDeck Status".bold());
    println!();
    println!("{}:  {}", "Data".dimmed(), ctx.paths().root().display());
    println!("{}:  {}", "Shell".dimmed(), ctx.settings().shell_type.to_string().cyan());
    println!();

    print_target("Shell startup script", &shell);
    print_target("Hosts file", &hosts);

    println!(
        "{}: {} (keeping {})",
        "Backups".bold(),
        backups,
        ctx.settings().max_backup_count
    );
    Ok(())
}

fn print_target(title: &str, status: &TargetStatus) {
    println!("{}: {}", title.bold(), status.path.display().to_string().cyan());

    let state = if !status.exists {
        "missing".yellow()
    } else if status.in_sync {
        "in sync".green()
    } else {
        "out of sync".yellow()
    };
    println!("  {} {}", "state:".dimmed(), state);
    println!(
        "  {} {} of {} enabled",
        "groups:".dimmed(),
        status.enabled_groups,
        status.groups
    );
    if status.external_declarations > 0 {
        println!(
            "  {} {} outside the managed section (see {})",
            "external:".dimmed(),
            status.external_declarations,
            "envdeck scan".cyan()
        );
    }
    if let Some(conflicts) = status.conflicts
        && conflicts > 0
    {
        println!(
            "  {} {} (see {})",
            "conflicts:".dimmed(),
            conflicts.to_string().yellow(),
            "envdeck conflicts".cyan()
        );
    }
    println!();
}
