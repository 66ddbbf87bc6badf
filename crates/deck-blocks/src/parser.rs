//! Recovery of unmanaged declarations from a target file.
//!
//! A user's rc file or hosts file usually already carries `export` lines and
//! host mappings that predate EnvDeck. [`scan`] finds them so they can be
//! shown, migrated into a group, or removed with [`remove_line`].

use crate::error::{Error, Result};
use crate::markers::{Family, Markers, is_marker_line};
use crate::validators::is_valid_env_key;

/// A declaration found outside the managed section.
///
/// For the variables family `key` is the variable name and `value` the
/// unquoted value. For the hosts family `key` is the IP address and `value`
/// the hostname.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalDeclaration {
    pub key: String,
    pub value: String,
    /// Trailing `# comment` text of a hosts line, trimmed.
    pub comment: Option<String>,
    /// The source line exactly as it appears in the file.
    pub raw_line: String,
    /// 1-based line number of `raw_line`.
    pub line_number: usize,
    pub in_managed_section: bool,
}

/// Find every declaration that lives outside the managed section.
///
/// Section boundaries are detected the same way [`crate::splice`] detects
/// them, so a start marker without a matching end marker only hides itself.
/// Malformed lines are skipped silently.
pub fn scan(markers: &Markers, content: &str) -> Vec<ExternalDeclaration> {
    let lines: Vec<&str> = content.split('\n').collect();
    let mut declarations = Vec::new();
    let mut in_section = false;

    for (idx, &line) in lines.iter().enumerate() {
        if is_marker_line(line, markers.section_start()) {
            in_section = lines[idx + 1..]
                .iter()
                .any(|l| is_marker_line(l, markers.section_end()));
            continue;
        }
        if is_marker_line(line, markers.section_end()) {
            in_section = false;
            continue;
        }
        if in_section {
            continue;
        }

        let parsed = match markers.family() {
            Family::Variables => parse_export(line),
            Family::Hosts => parse_hosts(line),
        };

        if let Some((key, value, comment)) = parsed {
            declarations.push(ExternalDeclaration {
                key,
                value,
                comment,
                raw_line: line.to_string(),
                line_number: idx + 1,
                in_managed_section: false,
            });
        }
    }

    tracing::debug!(
        family = %markers.family(),
        found = declarations.len(),
        "scanned for external declarations"
    );
    declarations
}

type Parsed = (String, String, Option<String>);

fn parse_export(line: &str) -> Option<Parsed> {
    let rest = line.trim().strip_prefix("export ")?.trim_start();
    let (key, value) = rest.split_once('=')?;
    let key = key.trim();
    if !is_valid_env_key(key) {
        return None;
    }
    Some((key.to_string(), unquote(value.trim()), None))
}

fn unquote(value: &str) -> String {
    if value.len() > 1 {
        if let Some(inner) = value.strip_prefix('"').and_then(|v| v.strip_suffix('"')) {
            return inner
                .replace("\\\\", "\\")
                .replace("\\\"", "\"")
                .replace("\\$", "$")
                .replace("\\`", "`");
        }
        if let Some(inner) = value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')) {
            return inner.to_string();
        }
    }
    value.to_string()
}

fn parse_hosts(line: &str) -> Option<Parsed> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }

    let (main, comment) = match trimmed.split_once('#') {
        Some((main, comment)) => (main, Some(comment.trim())),
        None => (trimmed, None),
    };

    let mut tokens = main.split_whitespace();
    let ip = tokens.next()?;
    let hostname = tokens.next()?;

    Some((
        ip.to_string(),
        hostname.to_string(),
        comment.filter(|c| !c.is_empty()).map(str::to_string),
    ))
}

/// Delete the 1-based line `line_number` and rejoin the rest with `\n`.
pub fn remove_line(content: &str, line_number: usize) -> Result<String> {
    let mut lines: Vec<&str> = content.split('\n').collect();
    if line_number == 0 || line_number > lines.len() {
        return Err(Error::InvalidLineNumber {
            line: line_number,
            line_count: lines.len(),
        });
    }
    lines.remove(line_number - 1);
    Ok(lines.join("\n"))
}

/// The 1-based line `line_number`, if it exists.
pub fn line_at(content: &str, line_number: usize) -> Option<&str> {
    line_number
        .checked_sub(1)
        .and_then(|idx| content.split('\n').nth(idx))
}
