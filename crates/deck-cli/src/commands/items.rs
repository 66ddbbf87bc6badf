//! Var and host command implementations

use chrono::Utc;
use colored::Colorize;
use deck_core::{
    GroupList, HostEntry, ManagedGroup, Variable, detect, is_duplicate_in_group,
};

use crate::cli::{HostAction, VarAction};
use crate::context::Context;
use crate::error::{CliError, Result};

/// Run a var subcommand
pub fn run_var(ctx: &mut Context, action: VarAction) -> Result<()> {
    match action {
        VarAction::Set {
            group,
            key,
            value,
            sensitive,
        } => {
            let candidate = Variable {
                is_sensitive: sensitive,
                ..Variable::new(key, value)
            };
            candidate.validate()?;

            let mut list = GroupList::new(&mut ctx.document.groups);
            let target = list.get_mut(&group)?;
            match target.variables.iter_mut().find(|v| v.key == candidate.key) {
                Some(existing) => {
                    existing.value = candidate.value.clone();
                    existing.is_sensitive = candidate.is_sensitive;
                    existing.updated_at = Utc::now();
                    println!("{} Updated {} in {}.", "OK".green().bold(), candidate.key.cyan(), target.name);
                }
                None => {
                    println!("{} Added {} to {}.", "OK".green().bold(), candidate.key.cyan(), target.name);
                    target.variables.push(candidate.clone());
                }
            }
            target.touch();

            if ctx.settings().enable_conflict_detection
                && let Some(conflict) = detect(&ctx.document.groups)
                    .into_iter()
                    .find(|c| c.key == candidate.key)
            {
                println!(
                    "   {} {} is also set by another enabled group; {} wins.",
                    "!".yellow(),
                    candidate.key,
                    conflict.effective.group_name.cyan()
                );
            }
        }
        VarAction::Unset { group, key } => {
            let mut list = GroupList::new(&mut ctx.document.groups);
            let target = list.get_mut(&group)?;
            let before = target.variables.len();
            target.variables.retain(|v| v.key != key);
            if target.variables.len() == before {
                return Err(CliError::user(format!("{} has no variable {}", target.name, key)));
            }
            target.touch();
            println!("{} Removed {} from {}.", "OK".green().bold(), key.cyan(), target.name);
        }
    }

    ctx.save()?;
    println!("Run {} to apply.", "envdeck sync --shell".cyan());
    Ok(())
}

/// Run a host subcommand
pub fn run_host(ctx: &mut Context, action: HostAction) -> Result<()> {
    match action {
        HostAction::Add {
            group,
            ip,
            hostname,
            comment,
        } => {
            let entry = HostEntry::new(ip, hostname, comment);
            entry.validate()?;

            let mut list = GroupList::new(&mut ctx.document.hosts_groups);
            let target = list.get_mut(&group)?;
            if is_duplicate_in_group(&entry.hostname, &*target, None) {
                return Err(CliError::user(format!(
                    "{} already maps {}",
                    target.name, entry.hostname
                )));
            }
            println!(
                "{} Added {} to {}.",
                "OK".green().bold(),
                entry.hosts_line().cyan(),
                target.name
            );
            target.entries.push(entry);
            target.touch();
        }
        HostAction::Remove { group, hostname } => {
            let mut list = GroupList::new(&mut ctx.document.hosts_groups);
            let target = list.get_mut(&group)?;
            let before = target.entries.len();
            target.entries.retain(|e| e.hostname != hostname);
            if target.entries.len() == before {
                return Err(CliError::user(format!("{} has no entry for {}", target.name, hostname)));
            }
            target.touch();
            println!("{} Removed {} from {}.", "OK".green().bold(), hostname.cyan(), target.name);
        }
    }

    ctx.save()?;
    println!("Run {} to apply.", "envdeck sync --hosts".cyan());
    Ok(())
}
