//! Export and import command implementations

use std::path::Path;

use chrono::Local;
use colored::Colorize;
use deck_core::interchange::{
    export_env_json, export_hosts_json, hosts_from_text, hosts_text, import_env_json,
    import_hosts_json, prepare_imported, shell_script,
};
use deck_core::{GroupList, ManagedGroup};

use crate::cli::{ExportFormat, ImportFormat};
use crate::context::Context;
use crate::error::{CliError, Result};

/// Run the export command
pub fn run_export(
    ctx: &mut Context,
    format: ExportFormat,
    hosts: bool,
    group: Option<&str>,
    include_disabled: bool,
    output: Option<&Path>,
) -> Result<()> {
    let include_disabled = include_disabled
        || group.is_some()
        || ctx.settings().export_includes_disabled_groups;
    let now = Local::now().naive_local();

    let text = match format {
        ExportFormat::Shell => {
            let selector = group.ok_or_else(|| {
                CliError::user("--format shell exports one group; pass --group <name>")
            })?;
            let group = GroupList::new(&mut ctx.document.groups).get(selector)?.clone();
            shell_script(&group, now)
        }
        ExportFormat::Hosts => {
            let groups = selected(&mut ctx.document.hosts_groups, group)?;
            let groups: Vec<_> = groups
                .into_iter()
                .filter(|g| include_disabled || g.is_enabled)
                .collect();
            hosts_text(&groups, now)
        }
        ExportFormat::Json if hosts => {
            let groups = selected(&mut ctx.document.hosts_groups, group)?;
            export_hosts_json(&groups, include_disabled)?
        }
        ExportFormat::Json => {
            let groups = selected(&mut ctx.document.groups, group)?;
            export_env_json(&groups, include_disabled)?
        }
    };

    match output {
        Some(path) => {
            ctx.fs().write_atomic(path, text.as_bytes())?;
            eprintln!("{} Exported to {}.", "OK".green().bold(), path.display());
        }
        None => println!("{text}"),
    }
    Ok(())
}

/// Every group, or just the one `selector` names.
fn selected<G: ManagedGroup>(groups: &mut Vec<G>, selector: Option<&str>) -> Result<Vec<G>> {
    let list = GroupList::new(groups);
    Ok(match selector {
        Some(selector) => vec![list.get(selector)?.clone()],
        None => list.as_slice().to_vec(),
    })
}

/// Run the import command
pub fn run_import(
    ctx: &mut Context,
    file: &Path,
    format: ImportFormat,
    hosts: bool,
    name: &str,
) -> Result<()> {
    let content = ctx.fs().read_to_string(file)?;

    let added = match format {
        ImportFormat::Hosts => {
            let group = hosts_from_text(&content, name)?;
            let entries = group.entries.len();
            GroupList::new(&mut ctx.document.hosts_groups).extend([group]);
            println!("   {} {} entries into {}", "+".green(), entries, name.cyan());
            1
        }
        ImportFormat::Json if hosts => {
            let groups = prepare_imported(import_hosts_json(&content)?);
            GroupList::new(&mut ctx.document.hosts_groups).extend(groups)
        }
        ImportFormat::Json => {
            let groups = prepare_imported(import_env_json(&content)?);
            GroupList::new(&mut ctx.document.groups).extend(groups)
        }
    };

    ctx.save()?;
    println!(
        "{} Imported {} group(s), all disabled. Enable them with {}.",
        "OK".green().bold(),
        added,
        "envdeck group enable".cyan()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::test_support::temp_context;

    #[test]
    fn test_export_then_import_json() {
        let (temp, mut ctx) = temp_context();
        let file = temp.path().join("groups.json");

        run_export(&mut ctx, ExportFormat::Json, false, None, true, Some(file.as_path())).unwrap();
        run_import(&mut ctx, &file, ImportFormat::Json, false, "unused").unwrap();

        let groups = &ctx.document.groups;
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[1].name, "Sample Group");
        assert_ne!(groups[0].id, groups[1].id);
        assert_eq!(groups[1].order, 1);
    }

    #[test]
    fn test_shell_export_needs_group() {
        let (temp, mut ctx) = temp_context();
        let file = temp.path().join("out.sh");
        assert!(run_export(&mut ctx, ExportFormat::Shell, false, None, false, Some(file.as_path())).is_err());

        run_export(
            &mut ctx,
            ExportFormat::Shell,
            false,
            Some("Sample Group"),
            false,
            Some(file.as_path()),
        )
        .unwrap();
        let script = std::fs::read_to_string(&file).unwrap();
        assert!(script.starts_with("#!/bin/bash\n# EnvDeck Export: Sample Group\n"));
        assert!(script.ends_with("export EXAMPLE_VAR=\"example_value\""));
    }

    #[test]
    fn test_import_hosts_format() {
        let (temp, mut ctx) = temp_context();
        let file = temp.path().join("hosts.txt");
        std::fs::write(&file, "10.0.0.1 a.lan b.lan # pair\n").unwrap();

        run_import(&mut ctx, &file, ImportFormat::Hosts, true, "lan").unwrap();

        let group = &ctx.document.hosts_groups[0];
        assert_eq!(group.name, "lan");
        assert_eq!(group.entries.len(), 2);
        assert_eq!(group.entries[0].comment, "pair");
        assert!(!group.is_enabled);
    }

    #[test]
    fn test_import_rejects_future_schema() {
        let (temp, mut ctx) = temp_context();
        let file = temp.path().join("future.json");
        std::fs::write(
            &file,
            r#"{"version":"3.0","exportDate":"2030-01-01T00:00:00Z","groups":[]}"#,
        )
        .unwrap();

        let err = run_import(&mut ctx, &file, ImportFormat::Json, false, "x").unwrap_err();
        assert!(err.to_string().contains("Unsupported schema version"));
        assert_eq!(ctx.document.groups.len(), 1);
    }
}
