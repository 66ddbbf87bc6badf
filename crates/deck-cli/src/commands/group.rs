//! Group command implementations

use colored::Colorize;
use deck_core::{GroupList, ManagedGroup};

use crate::cli::GroupAction;
use crate::context::Context;
use crate::error::Result;

/// Run a group subcommand
///
/// Structural edits are saved to the document only; `envdeck sync` applies
/// them to the target files.
pub fn run_group(ctx: &mut Context, action: GroupAction) -> Result<()> {
    let changed = if action.hosts() {
        apply(&mut ctx.document.hosts_groups, &action)?
    } else {
        apply(&mut ctx.document.groups, &action)?
    };

    if changed {
        ctx.save()?;
        println!("Run {} to apply.", "envdeck sync".cyan());
    }
    Ok(())
}

/// Returns whether the group list changed.
fn apply<G: ManagedGroup>(groups: &mut Vec<G>, action: &GroupAction) -> Result<bool> {
    let mut list = GroupList::new(groups);

    match action {
        GroupAction::List { .. } => {
            print_groups(list.as_slice());
            return Ok(false);
        }
        GroupAction::Add {
            name, description, ..
        } => {
            let group = list.add(name, description)?;
            println!("{} Added group {} (disabled).", "OK".green().bold(), group.name().cyan());
        }
        GroupAction::Remove { group, .. } => {
            let removed = list.remove(group)?;
            println!("{} Removed group {}.", "OK".green().bold(), removed.name().cyan());
        }
        GroupAction::Enable { group, .. } => {
            let group = list.set_enabled(group, true)?;
            println!("{} Enabled {}.", "OK".green().bold(), group.name().cyan());
        }
        GroupAction::Disable { group, .. } => {
            let group = list.set_enabled(group, false)?;
            println!("{} Disabled {}.", "OK".green().bold(), group.name().cyan());
        }
        GroupAction::Move {
            group, position, ..
        } => {
            list.move_to(group, *position)?;
            println!("{} Moved {}.", "OK".green().bold(), group.cyan());
            print_groups(list.as_slice());
        }
        GroupAction::Duplicate { group, .. } => {
            let copy = list.duplicate(group)?;
            println!("{} Created {} (disabled).", "OK".green().bold(), copy.name().cyan());
        }
    }
    Ok(true)
}

fn print_groups<G: ManagedGroup>(groups: &[G]) {
    if groups.is_empty() {
        println!("  {} (use {} to add)", "None".dimmed(), "envdeck group add".cyan());
        return;
    }
    for group in groups {
        let state = if group.is_enabled() {
            "on ".green()
        } else {
            "off".dimmed()
        };
        let id = group.id().to_string();
        println!(
            "  {:>2}  {}  {}  {} {}",
            group.order(),
            state,
            id[..8].dimmed(),
            group.name().cyan(),
            format!("({} item(s))", group.items().len()).dimmed()
        );
    }
}
