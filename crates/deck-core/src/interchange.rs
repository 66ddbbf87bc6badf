//! Moving groups in and out of EnvDeck
//!
//! JSON exports carry the same group layout as the document, wrapped in a
//! versioned envelope. Two plain-text formats exist for sharing with people
//! who do not run EnvDeck: a shell script for one variable group and a
//! hosts-file fragment for host groups.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::document::SCHEMA_VERSION;
use crate::model::{EnvGroup, HostEntry, HostGroup, ManagedGroup, validate_group_name};
use crate::{Error, Result};

/// Timestamp layout of the `# Generated:` header line.
const GENERATED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Prefix marking a disabled entry in a hosts-format export.
pub const DISABLED_PREFIX: &str = "# [disabled] ";

/// Envelope of a variable-group export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvExport {
    pub version: String,
    pub export_date: DateTime<Utc>,
    pub groups: Vec<EnvGroup>,
}

/// Envelope of a host-group export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostsExport {
    pub version: String,
    pub export_date: DateTime<Utc>,
    pub hosts_groups: Vec<HostGroup>,
}

#[derive(Deserialize)]
struct VersionProbe {
    version: String,
}

fn selected<G: ManagedGroup>(groups: &[G], include_disabled: bool) -> Vec<G> {
    groups
        .iter()
        .filter(|g| include_disabled || g.is_enabled())
        .cloned()
        .collect()
}

/// Reject anything not written with the current schema before decoding the rest.
fn check_version(text: &str) -> Result<()> {
    let probe: VersionProbe = serde_json::from_str(text)?;
    if probe.version != SCHEMA_VERSION {
        return Err(Error::UnsupportedSchemaVersion {
            found: probe.version,
            expected: SCHEMA_VERSION.to_string(),
        });
    }
    Ok(())
}

pub fn export_env_json(groups: &[EnvGroup], include_disabled: bool) -> Result<String> {
    let envelope = EnvExport {
        version: SCHEMA_VERSION.to_string(),
        export_date: Utc::now(),
        groups: selected(groups, include_disabled),
    };
    Ok(serde_json::to_string_pretty(&envelope)?)
}

pub fn export_hosts_json(groups: &[HostGroup], include_disabled: bool) -> Result<String> {
    let envelope = HostsExport {
        version: SCHEMA_VERSION.to_string(),
        export_date: Utc::now(),
        hosts_groups: selected(groups, include_disabled),
    };
    Ok(serde_json::to_string_pretty(&envelope)?)
}

/// Decode a variable-group export. Any invalid group rejects the whole file.
pub fn import_env_json(text: &str) -> Result<Vec<EnvGroup>> {
    check_version(text)?;
    let envelope: EnvExport = serde_json::from_str(text)?;
    for group in &envelope.groups {
        validate_group_name(&group.name)?;
        group.variables.iter().try_for_each(|v| v.validate())?;
    }
    Ok(envelope.groups)
}

/// Decode a host-group export. Any invalid group rejects the whole file.
pub fn import_hosts_json(text: &str) -> Result<Vec<HostGroup>> {
    check_version(text)?;
    let envelope: HostsExport = serde_json::from_str(text)?;
    for group in &envelope.hosts_groups {
        validate_group_name(&group.name)?;
        group.entries.iter().try_for_each(|e| e.validate())?;
    }
    Ok(envelope.hosts_groups)
}

/// Give imported groups fresh ids and leave them disabled.
///
/// Append the result with [`crate::GroupList::extend`] to keep `order` dense.
pub fn prepare_imported<G: ManagedGroup>(groups: Vec<G>) -> Vec<G> {
    groups
        .into_iter()
        .map(|group| {
            let mut fresh = group.fork();
            fresh.set_enabled(false);
            fresh
        })
        .collect()
}

/// A standalone `bash` script exporting one group's variables.
pub fn shell_script(group: &EnvGroup, generated_at: NaiveDateTime) -> String {
    let mut lines = vec![
        "#!/bin/bash".to_string(),
        format!("# EnvDeck Export: {}", group.name),
    ];
    if !group.description.is_empty() {
        lines.push(format!("# Description: {}", group.description));
    }
    lines.push(format!(
        "# Generated: {}",
        generated_at.format(GENERATED_FORMAT)
    ));
    lines.push(String::new());
    lines.extend(
        group
            .variables
            .iter()
            .map(|v| deck_blocks::export_line(&v.key, &v.value)),
    );
    lines.join("\n")
}

/// A hosts-file fragment listing every entry of `groups`.
///
/// Disabled entries stay visible but commented out.
pub fn hosts_text(groups: &[HostGroup], generated_at: NaiveDateTime) -> String {
    let mut lines = vec![
        "# EnvDeck Hosts Export".to_string(),
        format!("# Generated: {}", generated_at.format(GENERATED_FORMAT)),
        String::new(),
    ];
    for group in groups {
        lines.push(format!("# === {} ===", group.name));
        if !group.description.is_empty() {
            lines.push(format!("# {}", group.description));
        }
        for entry in &group.entries {
            if entry.is_enabled {
                lines.push(entry.hosts_line());
            } else {
                lines.push(format!("{DISABLED_PREFIX}{}", entry.hosts_line()));
            }
        }
        lines.push(String::new());
    }
    lines.join("\n")
}

/// Build a group named `group_name` from hosts-file text.
///
/// A line naming several hostnames yields one entry per hostname; its
/// comment goes on the first. Comment lines, including disabled entries
/// from [`hosts_text`], are skipped, as are mappings that fail validation.
pub fn hosts_from_text(content: &str, group_name: &str) -> Result<HostGroup> {
    validate_group_name(group_name)?;
    let mut group = HostGroup::create(group_name, "");

    for (idx, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let (mapping, comment) = match trimmed.split_once('#') {
            Some((mapping, comment)) => (mapping, comment.trim()),
            None => (trimmed, ""),
        };

        let mut fields = mapping.split_whitespace();
        let Some(ip) = fields.next() else { continue };
        for (n, hostname) in fields.enumerate() {
            let entry = HostEntry::new(ip, hostname, if n == 0 { comment } else { "" });
            match entry.validate() {
                Ok(()) => group.entries.push(entry),
                Err(e) => tracing::debug!(line = idx + 1, error = %e, "skipping hosts line"),
            }
        }
    }
    Ok(group)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::groups::GroupList;
    use crate::model::Variable;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn at_noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .and_then(|d| d.and_hms_opt(12, 30, 0))
            .unwrap()
    }

    fn env_group(name: &str, enabled: bool) -> EnvGroup {
        let mut group = EnvGroup::create(name, "");
        group.is_enabled = enabled;
        group.variables.push(Variable::new("KEY", "value"));
        group
    }

    #[test]
    fn test_env_json_skips_disabled_by_default() {
        let groups = vec![env_group("on", true), env_group("off", false)];

        let text = export_env_json(&groups, false).unwrap();
        let imported = import_env_json(&text).unwrap();
        assert_eq!(imported.len(), 1);
        assert_eq!(imported[0].name, "on");

        let text = export_env_json(&groups, true).unwrap();
        assert_eq!(import_env_json(&text).unwrap().len(), 2);
    }

    #[test]
    fn test_envelope_field_names() {
        let text = export_hosts_json(&[], true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["version"], "1.0");
        assert!(value["exportDate"].is_string());
        assert!(value["hostsGroups"].is_array());
    }

    #[test]
    fn test_unknown_version_rejected() {
        let text = r#"{"version": "2.0", "exportDate": "2024-05-01T00:00:00Z", "groups": []}"#;
        match import_env_json(text) {
            Err(Error::UnsupportedSchemaVersion { found, expected }) => {
                assert_eq!(found, "2.0");
                assert_eq!(expected, "1.0");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_invalid_variable_rejects_whole_import() {
        let mut bad = env_group("bad", true);
        bad.variables.push(Variable::new("9LIVES", "x"));
        let text = export_env_json(&[env_group("good", true), bad], true).unwrap();
        assert!(matches!(
            import_env_json(&text),
            Err(Error::Validation { .. })
        ));
    }

    #[test]
    fn test_imported_groups_are_fresh_disabled_and_appended() {
        let mut existing = vec![env_group("mine", true)];
        let incoming = vec![env_group("theirs", true)];
        let incoming_id = incoming[0].id;

        let mut list = GroupList::new(&mut existing);
        let added = list.extend(prepare_imported(incoming));

        assert_eq!(added, 1);
        let imported = &list.as_slice()[1];
        assert_ne!(imported.id, incoming_id);
        assert!(!imported.is_enabled);
        assert_eq!(imported.order, 1);
    }

    #[test]
    fn test_shell_script_layout() {
        let mut group = EnvGroup::create("work", "Work laptop");
        group.variables.push(Variable::new("PRICE", "$5"));
        assert_eq!(
            shell_script(&group, at_noon()),
            "#!/bin/bash\n\
             # EnvDeck Export: work\n\
             # Description: Work laptop\n\
             # Generated: 2024-05-01 12:30:00\n\
             \n\
             export PRICE=\"\\$5\""
        );
    }

    #[test]
    fn test_hosts_text_marks_disabled_entries() {
        let mut group = HostGroup::create("dev", "local services");
        group.entries.push(HostEntry::new("127.0.0.1", "api.local", ""));
        let mut off = HostEntry::new("127.0.0.1", "old.local", "legacy");
        off.is_enabled = false;
        group.entries.push(off);

        let text = hosts_text(&[group], at_noon());
        assert_eq!(
            text,
            "# EnvDeck Hosts Export\n\
             # Generated: 2024-05-01 12:30:00\n\
             \n\
             # === dev ===\n\
             # local services\n\
             127.0.0.1 api.local\n\
             # [disabled] 127.0.0.1 old.local # legacy\n"
        );
    }

    #[test]
    fn test_hosts_import_expands_hostnames() {
        let content = "# comment\n\
                       10.0.0.5  nas.lan  files.lan # home # server\n\
                       \n\
                       # [disabled] 10.0.0.6 old.lan\n\
                       10.0.0.7\n\
                       999.1.1.1 broken.lan\n\
                       ::1\tlocalhost6\n";
        let group = hosts_from_text(content, "Imported").unwrap();

        let lines: Vec<String> = group.entries.iter().map(HostEntry::hosts_line).collect();
        assert_eq!(
            lines,
            vec![
                "10.0.0.5 nas.lan # home # server",
                "10.0.0.5 files.lan",
                "::1 localhost6",
            ]
        );
        assert!(!group.is_enabled);
    }

    #[test]
    fn test_hosts_import_checks_group_name() {
        assert!(hosts_from_text("", "a/b").is_err());
    }
}
