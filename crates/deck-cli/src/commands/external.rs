//! Scan, migrate and remove-line command implementations
//!
//! These commands deal with declarations written into a target file by hand,
//! outside the managed section.

use colored::Colorize;
use deck_blocks::{ExternalDeclaration, line_at};
use deck_core::{ConfigSynchronizer, GroupList, ManagedGroup};
use serde_json::json;

use super::{family_label, print_report};
use crate::context::Context;
use crate::error::{CliError, Result};

/// Run the scan command
pub fn run_scan(ctx: &Context, hosts: bool, json: bool) -> Result<()> {
    let (target, found) = if hosts {
        let sync = ctx.hosts_sync();
        (sync.target().to_path_buf(), sync.scan_external()?)
    } else {
        let sync = ctx.shell_sync();
        (sync.target().to_path_buf(), sync.scan_external()?)
    };

    if json {
        let items: Vec<_> = found.iter().map(|d| declaration_json(d, hosts)).collect();
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    if found.is_empty() {
        println!(
            "{} No declarations outside the managed section of {}.",
            "OK".green().bold(),
            target.display()
        );
        return Ok(());
    }

    println!(
        "{} {} external declaration(s) in {}:",
        "=>".blue().bold(),
        found.len(),
        target.display().to_string().cyan()
    );
    for decl in &found {
        let line = format!("{:>5}", decl.line_number);
        let comment = decl
            .comment
            .as_deref()
            .map(|c| format!(" # {c}").dimmed().to_string())
            .unwrap_or_default();
        if hosts {
            println!("  {}  {} {}{}", line.dimmed(), decl.key, decl.value.cyan(), comment);
        } else {
            println!("  {}  {}={}", line.dimmed(), decl.key.cyan(), decl.value);
        }
    }
    println!();
    println!(
        "Run {} to move one into a group.",
        "envdeck migrate <line> --group <name>".cyan()
    );
    Ok(())
}

fn declaration_json(decl: &ExternalDeclaration, hosts: bool) -> serde_json::Value {
    if hosts {
        json!({
            "line": decl.line_number,
            "ip": decl.key,
            "hostname": decl.value,
            "comment": decl.comment,
            "raw": decl.raw_line,
        })
    } else {
        json!({
            "line": decl.line_number,
            "key": decl.key,
            "value": decl.value,
            "raw": decl.raw_line,
        })
    }
}

/// Run the migrate command
pub fn run_migrate(ctx: &mut Context, line: usize, group: &str, hosts: bool) -> Result<()> {
    if hosts {
        let sync = ctx.hosts_sync();
        migrate(&sync, &mut ctx.document.hosts_groups, line, group, hosts)?;
    } else {
        let sync = ctx.shell_sync();
        migrate(&sync, &mut ctx.document.groups, line, group, hosts)?;
    }
    ctx.save()
}

fn migrate<G: ManagedGroup>(
    sync: &ConfigSynchronizer<G>,
    groups: &mut Vec<G>,
    line: usize,
    selector: &str,
    hosts: bool,
) -> Result<()> {
    let decl = sync
        .scan_external()?
        .into_iter()
        .find(|d| d.line_number == line)
        .ok_or_else(|| {
            CliError::user(format!(
                "No {} declaration on line {}. Run `envdeck scan{}` to list them.",
                family_label(hosts),
                line,
                if hosts { " --hosts" } else { "" }
            ))
        })?;
    let group_id = GroupList::new(groups).get(selector)?.id();

    let report = sync.migrate(groups, group_id, &decl)?;
    print_report(&report);
    println!(
        "{} Moved {} into {}.",
        "OK".green().bold(),
        decl.raw_line.trim().cyan(),
        selector
    );
    Ok(())
}

/// Run the remove-line command
pub fn run_remove_line(ctx: &Context, line: usize, hosts: bool) -> Result<()> {
    if hosts {
        remove_line(&ctx.hosts_sync(), line)
    } else {
        remove_line(&ctx.shell_sync(), line)
    }
}

fn remove_line<G: ManagedGroup>(sync: &ConfigSynchronizer<G>, line: usize) -> Result<()> {
    let content = sync.read_target()?;
    let raw = line_at(&content, line).map(str::to_string);
    if let Some(raw) = &raw {
        println!("{} Removing line {}: {}", "=>".blue().bold(), line, raw.dimmed());
    }

    let report = sync.remove_external(line, raw.as_deref())?;
    print_report(&report);
    println!("{} Line {} removed.", "OK".green().bold(), line);
    Ok(())
}
