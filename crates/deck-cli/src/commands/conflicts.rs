//! Conflicts command implementation

use colored::Colorize;
use deck_core::{ConflictInfo, detect};

use crate::context::Context;
use crate::error::Result;

/// Run the conflicts command
pub fn run_conflicts(ctx: &Context, hosts: bool, json: bool) -> Result<()> {
    let conflicts = if hosts {
        detect(&ctx.document.hosts_groups)
    } else {
        detect(&ctx.document.groups)
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&conflicts)?);
        return Ok(());
    }

    if conflicts.is_empty() {
        println!("{} No conflicts.", "OK".green().bold());
        return Ok(());
    }

    let noun = if hosts { "hostname" } else { "key" };
    println!(
        "{} {} conflicting {}(s):",
        "CONFLICT".yellow().bold(),
        conflicts.len(),
        noun
    );
    for conflict in &conflicts {
        print_conflict(conflict);
    }
    Ok(())
}

fn print_conflict(conflict: &ConflictInfo) {
    println!();
    println!("  {}", conflict.key.cyan().bold());
    for contributor in &conflict.affected {
        let marker = if contributor == &conflict.effective {
            "*".green().to_string()
        } else {
            " ".to_string()
        };
        println!(
            "   {} {} = {} {}",
            marker,
            contributor.group_name,
            contributor.value,
            format!("(order {})", contributor.order).dimmed()
        );
    }
    println!(
        "   effective: {}",
        conflict.effective_value().green()
    );
}
