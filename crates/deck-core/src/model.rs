//! Groups and the items they project into a target file
//!
//! Two families share one shape: an [`EnvGroup`] holds [`Variable`]s that
//! become `export` lines, a [`HostGroup`] holds [`HostEntry`]s that become
//! hosts-file lines. Field names serialize in camelCase so documents and
//! exports stay readable by other tools that use the same layout.

use chrono::{DateTime, Utc};
use deck_blocks::validators::{
    is_valid_env_key, is_valid_env_value, is_valid_group_name, is_valid_hostname, is_valid_ip,
};
use deck_blocks::{ExternalDeclaration, Family, SectionGroup, export_line, hosts_line};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Suffix appended to the name of a duplicated group.
pub const COPY_SUFFIX: &str = " (copy)";

fn default_true() -> bool {
    true
}

/// A single environment variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variable {
    pub id: Uuid,
    pub key: String,
    pub value: String,
    /// Only affects how the value is displayed, never what is written.
    #[serde(default)]
    pub is_sensitive: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Variable {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            key: key.into(),
            value: value.into(),
            is_sensitive: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !is_valid_env_key(&self.key) {
            return Err(Error::validation(
                "key",
                format!(
                    "{:?} must start with a letter or underscore and contain only letters, digits and underscores (1-255 chars)",
                    self.key
                ),
            ));
        }
        if !is_valid_env_value(&self.value) {
            return Err(Error::validation(
                "value",
                format!("value of {} exceeds 10000 characters", self.key),
            ));
        }
        Ok(())
    }
}

/// One `ip hostname` mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostEntry {
    pub id: Uuid,
    pub ip: String,
    pub hostname: String,
    #[serde(default)]
    pub comment: String,
    /// A disabled entry is skipped even when its group is enabled.
    #[serde(default = "default_true")]
    pub is_enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl HostEntry {
    pub fn new(
        ip: impl Into<String>,
        hostname: impl Into<String>,
        comment: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            ip: ip.into(),
            hostname: hostname.into(),
            comment: comment.into(),
            is_enabled: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// The line this entry contributes to the hosts file.
    pub fn hosts_line(&self) -> String {
        hosts_line(&self.ip, &self.hostname, &self.comment)
    }

    pub fn validate(&self) -> Result<()> {
        if !is_valid_ip(&self.ip) {
            return Err(Error::validation(
                "ip",
                format!("{:?} is not an IPv4 or IPv6 address", self.ip),
            ));
        }
        if !is_valid_hostname(&self.hostname) {
            return Err(Error::validation(
                "hostname",
                format!("{:?} is not a valid hostname", self.hostname),
            ));
        }
        Ok(())
    }
}

/// A named, orderable set of variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvGroup {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_enabled: bool,
    #[serde(default)]
    pub variables: Vec<Variable>,
    #[serde(default)]
    pub order: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A named, orderable set of host entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostGroup {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_enabled: bool,
    #[serde(default)]
    pub entries: Vec<HostEntry>,
    #[serde(default)]
    pub order: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl HostGroup {
    pub fn enabled_entry_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_enabled).count()
    }
}

/// Behaviour shared by both group families.
///
/// Structural edits ([`crate::GroupList`]), synchronization and migration are
/// written once against this trait.
pub trait ManagedGroup: SectionGroup + Clone {
    type Item: Clone;

    /// Which managed section this group renders into.
    const FAMILY: Family;

    /// A new, disabled, empty group.
    fn create(name: &str, description: &str) -> Self;

    fn items(&self) -> &[Self::Item];
    fn items_mut(&mut self) -> &mut Vec<Self::Item>;

    fn rename(&mut self, name: String);
    fn set_enabled(&mut self, enabled: bool);
    fn set_order(&mut self, order: usize);

    /// Bump `updated_at`.
    fn touch(&mut self);

    /// Deep copy with fresh ids and timestamps for the group and its items.
    fn fork(&self) -> Self;

    /// Turn a scanned line into an item for this family.
    fn item_from_declaration(decl: &ExternalDeclaration) -> Result<Self::Item>;
}

impl SectionGroup for EnvGroup {
    fn id(&self) -> Uuid {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn is_enabled(&self) -> bool {
        self.is_enabled
    }

    fn order(&self) -> usize {
        self.order
    }

    fn section_lines(&self) -> Vec<String> {
        self.variables
            .iter()
            .map(|v| export_line(&v.key, &v.value))
            .collect()
    }
}

impl ManagedGroup for EnvGroup {
    type Item = Variable;
    const FAMILY: Family = Family::Variables;

    fn create(name: &str, description: &str) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: description.to_string(),
            is_enabled: false,
            variables: Vec::new(),
            order: 0,
            created_at: now,
            updated_at: now,
        }
    }

    fn items(&self) -> &[Variable] {
        &self.variables
    }

    fn items_mut(&mut self) -> &mut Vec<Variable> {
        &mut self.variables
    }

    fn rename(&mut self, name: String) {
        self.name = name;
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.is_enabled = enabled;
    }

    fn set_order(&mut self, order: usize) {
        self.order = order;
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    fn fork(&self) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            variables: self
                .variables
                .iter()
                .map(|v| Variable {
                    id: Uuid::new_v4(),
                    created_at: now,
                    updated_at: now,
                    ..v.clone()
                })
                .collect(),
            created_at: now,
            updated_at: now,
            ..self.clone()
        }
    }

    fn item_from_declaration(decl: &ExternalDeclaration) -> Result<Variable> {
        let variable = Variable::new(&decl.key, &decl.value);
        variable.validate()?;
        Ok(variable)
    }
}

impl SectionGroup for HostGroup {
    fn id(&self) -> Uuid {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn is_enabled(&self) -> bool {
        self.is_enabled
    }

    fn order(&self) -> usize {
        self.order
    }

    fn section_lines(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|e| e.is_enabled)
            .map(HostEntry::hosts_line)
            .collect()
    }
}

impl ManagedGroup for HostGroup {
    type Item = HostEntry;
    const FAMILY: Family = Family::Hosts;

    fn create(name: &str, description: &str) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: description.to_string(),
            is_enabled: false,
            entries: Vec::new(),
            order: 0,
            created_at: now,
            updated_at: now,
        }
    }

    fn items(&self) -> &[HostEntry] {
        &self.entries
    }

    fn items_mut(&mut self) -> &mut Vec<HostEntry> {
        &mut self.entries
    }

    fn rename(&mut self, name: String) {
        self.name = name;
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.is_enabled = enabled;
    }

    fn set_order(&mut self, order: usize) {
        self.order = order;
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    fn fork(&self) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            entries: self
                .entries
                .iter()
                .map(|e| HostEntry {
                    id: Uuid::new_v4(),
                    created_at: now,
                    updated_at: now,
                    ..e.clone()
                })
                .collect(),
            created_at: now,
            updated_at: now,
            ..self.clone()
        }
    }

    fn item_from_declaration(decl: &ExternalDeclaration) -> Result<HostEntry> {
        let entry = HostEntry::new(
            &decl.key,
            &decl.value,
            decl.comment.clone().unwrap_or_default(),
        );
        entry.validate()?;
        Ok(entry)
    }
}

/// Check a group name: 1-50 characters, none of `/`, `\`, `:`.
pub fn validate_group_name(name: &str) -> Result<()> {
    if is_valid_group_name(name) {
        Ok(())
    } else {
        Err(Error::validation(
            "group name",
            format!("{name:?} must be 1-50 characters without '/', '\\' or ':'"),
        ))
    }
}
