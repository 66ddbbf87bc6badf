//! Rendering and splicing of the managed section.

use uuid::Uuid;

use crate::markers::{Markers, is_marker_line};

/// A group that can contribute lines to a managed section.
pub trait SectionGroup {
    fn id(&self) -> Uuid;
    fn name(&self) -> &str;
    fn is_enabled(&self) -> bool;
    /// Position among its siblings; lower renders first.
    fn order(&self) -> usize;
    /// The projected lines for this group's eligible items.
    fn section_lines(&self) -> Vec<String>;
}

/// Render the enabled groups into a complete managed section.
///
/// Groups are emitted in ascending `order`. Returns an empty string when no
/// group is enabled, which [`splice`] treats as "remove the section".
pub fn render<G: SectionGroup>(markers: &Markers, groups: &[G]) -> String {
    let mut enabled: Vec<&G> = groups.iter().filter(|g| g.is_enabled()).collect();
    if enabled.is_empty() {
        return String::new();
    }
    enabled.sort_by_key(|g| g.order());

    let mut lines = vec![
        markers.section_start().to_string(),
        markers.warning().to_string(),
        String::new(),
    ];

    for group in enabled {
        lines.push(markers.group_start(group.id(), group.name()));
        lines.extend(group.section_lines());
        lines.push(markers.group_end(group.id(), group.name()));
        lines.push(String::new());
    }

    lines.push(markers.section_end().to_string());

    tracing::trace!(family = %markers.family(), lines = lines.len(), "rendered managed section");
    lines.join("\n")
}

/// Replace the managed section in `original` with `section`.
///
/// Lines from the start marker through the end marker are dropped and
/// `section` is inserted once where the start marker was. All other lines
/// are kept verbatim and in order. Without an existing section, a non-empty
/// `section` is appended after a blank line; an empty one leaves `original`
/// untouched.
///
/// A start marker with no end marker after it is dropped on its own and the
/// lines following it are kept.
pub fn splice(markers: &Markers, original: &str, section: &str) -> String {
    if original.is_empty() {
        return section.to_string();
    }

    let lines: Vec<&str> = original.split('\n').collect();
    let mut result: Vec<&str> = Vec::with_capacity(lines.len() + 1);
    let mut in_section = false;
    let mut found = false;

    for (idx, &line) in lines.iter().enumerate() {
        if is_marker_line(line, markers.section_start()) {
            in_section = lines[idx + 1..]
                .iter()
                .any(|l| is_marker_line(l, markers.section_end()));
            if !found && !section.is_empty() {
                result.push(section);
            }
            found = true;
            continue;
        }

        if is_marker_line(line, markers.section_end()) {
            in_section = false;
            continue;
        }

        if !in_section {
            result.push(line);
        }
    }

    if !found && !section.is_empty() {
        result.push("");
        result.push(section);
    }

    result.join("\n")
}

/// Escape a value for use inside double quotes in a POSIX shell.
///
/// Backslash is escaped first so the backslashes introduced for `"`, `$`
/// and `` ` `` are not escaped a second time.
pub fn escape_value(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('$', "\\$")
        .replace('`', "\\`")
}

/// `export KEY="<escaped value>"`
pub fn export_line(key: &str, value: &str) -> String {
    format!("export {}=\"{}\"", key, escape_value(value))
}

/// `<ip> <hostname>` with ` # <comment>` when the comment is non-empty.
pub fn hosts_line(ip: &str, hostname: &str, comment: &str) -> String {
    if comment.is_empty() {
        format!("{ip} {hostname}")
    } else {
        format!("{ip} {hostname} # {comment}")
    }
}
