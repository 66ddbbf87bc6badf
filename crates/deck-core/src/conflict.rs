//! Cross-group conflict detection
//!
//! A conflict is a key (or hostname) declared by more than one enabled
//! group. The group with the highest `order` is rendered last, so its value
//! is the one the shell or resolver ends up using.

use std::collections::BTreeMap;

use serde::Serialize;
use uuid::Uuid;

use crate::model::{EnvGroup, HostGroup, ManagedGroup};

/// One group's claim on a conflicting key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Contributor {
    pub group_id: Uuid,
    pub group_name: String,
    pub order: usize,
    pub value: String,
}

/// A key declared by several enabled groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictInfo {
    /// Variable name, or hostname for the hosts family.
    pub key: String,
    /// Every declaration, sorted by group order.
    pub affected: Vec<Contributor>,
    /// The declaration that takes effect.
    pub effective: Contributor,
}

impl ConflictInfo {
    pub fn effective_value(&self) -> &str {
        &self.effective.value
    }

    pub fn affected_group_ids(&self) -> Vec<Uuid> {
        let mut ids: Vec<Uuid> = self.affected.iter().map(|c| c.group_id).collect();
        ids.dedup();
        ids
    }
}

/// How a group family takes part in conflict detection.
pub trait Declares: ManagedGroup {
    /// Whether contributors that agree on the value still conflict.
    const IDENTICAL_VALUES_CONFLICT: bool;

    /// `(key, value)` pairs this group declares when enabled.
    fn declarations(&self) -> Vec<(&str, &str)>;

    /// Item id and key of every item, enabled or not.
    fn item_keys(&self) -> Vec<(Uuid, &str)>;
}

impl Declares for EnvGroup {
    const IDENTICAL_VALUES_CONFLICT: bool = true;

    fn declarations(&self) -> Vec<(&str, &str)> {
        self.variables
            .iter()
            .map(|v| (v.key.as_str(), v.value.as_str()))
            .collect()
    }

    fn item_keys(&self) -> Vec<(Uuid, &str)> {
        self.variables.iter().map(|v| (v.id, v.key.as_str())).collect()
    }
}

impl Declares for HostGroup {
    const IDENTICAL_VALUES_CONFLICT: bool = false;

    /// Hostname to IP, enabled entries only.
    fn declarations(&self) -> Vec<(&str, &str)> {
        self.entries
            .iter()
            .filter(|e| e.is_enabled)
            .map(|e| (e.hostname.as_str(), e.ip.as_str()))
            .collect()
    }

    fn item_keys(&self) -> Vec<(Uuid, &str)> {
        self.entries
            .iter()
            .map(|e| (e.id, e.hostname.as_str()))
            .collect()
    }
}

/// Find every conflict among the enabled groups, sorted by key.
///
/// Variables conflict whenever a key appears more than once. Host entries
/// conflict only when the contributors disagree on the IP.
pub fn detect<G: Declares>(groups: &[G]) -> Vec<ConflictInfo> {
    let mut by_key: BTreeMap<&str, Vec<Contributor>> = BTreeMap::new();

    for group in groups.iter().filter(|g| g.is_enabled()) {
        for (key, value) in group.declarations() {
            by_key.entry(key).or_default().push(Contributor {
                group_id: group.id(),
                group_name: group.name().to_string(),
                order: group.order(),
                value: value.to_string(),
            });
        }
    }

    let conflicts: Vec<ConflictInfo> = by_key
        .into_iter()
        .filter(|(_, contributors)| contributors.len() > 1)
        .filter(|(_, contributors)| {
            G::IDENTICAL_VALUES_CONFLICT
                || contributors.iter().any(|c| c.value != contributors[0].value)
        })
        .filter_map(|(key, mut affected)| {
            affected.sort_by_key(|c| c.order);
            let effective = affected.last()?.clone();
            Some(ConflictInfo {
                key: key.to_string(),
                affected,
                effective,
            })
        })
        .collect();

    tracing::debug!(family = %G::FAMILY, conflicts = conflicts.len(), "conflict scan finished");
    conflicts
}

/// True if `group` already holds `key` in an item other than `excluding`.
///
/// Disabled host entries count: this guards edits inside one group, not
/// what gets rendered.
pub fn is_duplicate_in_group<G: Declares>(key: &str, group: &G, excluding: Option<Uuid>) -> bool {
    group.item_keys().into_iter().any(|(id, k)| k == key && Some(id) != excluding)
}
