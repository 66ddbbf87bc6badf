//! Structural edits on an ordered list of groups
//!
//! Every mutation that adds, removes or reorders groups leaves `order`
//! dense (`0..n`) and equal to each group's position in the list.

use uuid::Uuid;

use crate::model::{COPY_SUFFIX, ManagedGroup, validate_group_name};
use crate::{Error, Result};

/// Shortest id prefix accepted as a group selector.
const MIN_ID_PREFIX: usize = 4;

/// Mutable view over a document's groups of one family.
#[derive(Debug)]
pub struct GroupList<'a, G> {
    groups: &'a mut Vec<G>,
}

impl<'a, G: ManagedGroup> GroupList<'a, G> {
    /// Wrap `groups`, sorting them by `order` and renumbering.
    pub fn new(groups: &'a mut Vec<G>) -> Self {
        groups.sort_by_key(|g| g.order());
        let mut list = Self { groups };
        list.renumber();
        list
    }

    pub fn as_slice(&self) -> &[G] {
        self.groups
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Position of the group named `selector`, or whose id starts with it.
    ///
    /// An exact name wins over an id prefix. Id prefixes are matched case
    /// insensitively and must be unambiguous.
    pub fn position(&self, selector: &str) -> Result<usize> {
        if let Some(idx) = self.groups.iter().position(|g| g.name() == selector) {
            return Ok(idx);
        }

        if let Ok(id) = Uuid::parse_str(selector)
            && let Some(idx) = self.groups.iter().position(|g| g.id() == id)
        {
            return Ok(idx);
        }

        let needle = selector.to_ascii_lowercase();
        if needle.len() >= MIN_ID_PREFIX {
            let mut hits = self
                .groups
                .iter()
                .enumerate()
                .filter(|(_, g)| g.id().hyphenated().to_string().starts_with(&needle));
            if let (Some((idx, _)), None) = (hits.next(), hits.next()) {
                return Ok(idx);
            }
        }

        Err(Error::GroupNotFound(selector.to_string()))
    }

    pub fn get(&self, selector: &str) -> Result<&G> {
        let idx = self.position(selector)?;
        Ok(&self.groups[idx])
    }

    pub fn get_mut(&mut self, selector: &str) -> Result<&mut G> {
        let idx = self.position(selector)?;
        Ok(&mut self.groups[idx])
    }

    pub fn find_by_id(&self, id: Uuid) -> Option<&G> {
        self.groups.iter().find(|g| g.id() == id)
    }

    /// Append a new disabled group.
    pub fn add(&mut self, name: &str, description: &str) -> Result<&mut G> {
        validate_group_name(name)?;
        let mut group = G::create(name, description);
        group.set_order(self.groups.len());
        self.groups.push(group);
        tracing::debug!(group = name, family = %G::FAMILY, "added group");
        let last = self.groups.len() - 1;
        Ok(&mut self.groups[last])
    }

    pub fn remove(&mut self, selector: &str) -> Result<G> {
        let idx = self.position(selector)?;
        let removed = self.groups.remove(idx);
        self.renumber();
        tracing::debug!(group = removed.name(), family = %G::FAMILY, "removed group");
        Ok(removed)
    }

    /// Move a group to `position`, clamped to the end of the list.
    pub fn move_to(&mut self, selector: &str, position: usize) -> Result<()> {
        let idx = self.position(selector)?;
        let group = self.groups.remove(idx);
        let position = position.min(self.groups.len());
        self.groups.insert(position, group);
        self.renumber();
        Ok(())
    }

    /// Append a disabled copy with fresh ids and a `" (copy)"` name suffix.
    pub fn duplicate(&mut self, selector: &str) -> Result<&G> {
        let idx = self.position(selector)?;
        let mut copy = self.groups[idx].fork();
        let name = format!("{}{}", copy.name(), COPY_SUFFIX);
        copy.rename(name);
        copy.set_enabled(false);
        copy.set_order(self.groups.len());
        self.groups.push(copy);
        let last = self.groups.len() - 1;
        Ok(&self.groups[last])
    }

    pub fn set_enabled(&mut self, selector: &str, enabled: bool) -> Result<&G> {
        let idx = self.position(selector)?;
        let group = &mut self.groups[idx];
        group.set_enabled(enabled);
        group.touch();
        Ok(group)
    }

    /// Append groups as they are, assigning orders after the existing ones.
    pub fn extend(&mut self, groups: impl IntoIterator<Item = G>) -> usize {
        let before = self.groups.len();
        self.groups.extend(groups);
        self.renumber();
        self.groups.len() - before
    }

    fn renumber(&mut self) {
        for (idx, group) in self.groups.iter_mut().enumerate() {
            group.set_order(idx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EnvGroup, HostGroup, Variable};
    use pretty_assertions::assert_eq;

    fn names<G: ManagedGroup>(groups: &[G]) -> Vec<(String, usize)> {
        groups
            .iter()
            .map(|g| (g.name().to_string(), g.order()))
            .collect()
    }

    fn three() -> Vec<EnvGroup> {
        let mut groups = Vec::new();
        let mut list = GroupList::new(&mut groups);
        for name in ["a", "b", "c"] {
            list.add(name, "").unwrap();
        }
        groups
    }

    #[test]
    fn test_new_sorts_and_renumbers() {
        let mut groups = three();
        groups[0].order = 10;
        groups[1].order = 3;
        groups[2].order = 7;
        let list = GroupList::new(&mut groups);
        assert_eq!(
            names(list.as_slice()),
            vec![("b".into(), 0), ("c".into(), 1), ("a".into(), 2)]
        );
    }

    #[test]
    fn test_remove_keeps_order_dense() {
        let mut groups = three();
        let mut list = GroupList::new(&mut groups);
        list.remove("b").unwrap();
        assert_eq!(names(list.as_slice()), vec![("a".into(), 0), ("c".into(), 1)]);
    }

    #[test]
    fn test_move_to_clamps() {
        let mut groups = three();
        let mut list = GroupList::new(&mut groups);
        list.move_to("a", 99).unwrap();
        assert_eq!(
            names(list.as_slice()),
            vec![("b".into(), 0), ("c".into(), 1), ("a".into(), 2)]
        );
        list.move_to("a", 0).unwrap();
        assert_eq!(names(list.as_slice())[0], ("a".into(), 0));
    }

    #[test]
    fn test_duplicate_is_disabled_copy() {
        let mut groups = three();
        groups[0].is_enabled = true;
        groups[0].variables.push(Variable::new("K", "v"));
        let original_var = groups[0].variables[0].id;

        let mut list = GroupList::new(&mut groups);
        let copy = list.duplicate("a").unwrap().clone();

        assert_eq!(copy.name, "a (copy)");
        assert!(!copy.is_enabled);
        assert_eq!(copy.order, 3);
        assert_ne!(copy.variables[0].id, original_var);
    }

    #[test]
    fn test_add_rejects_bad_name() {
        let mut groups: Vec<HostGroup> = Vec::new();
        let mut list = GroupList::new(&mut groups);
        assert!(matches!(list.add("a/b", ""), Err(Error::Validation { .. })));
        assert!(list.is_empty());
    }

    #[test]
    fn test_position_by_id_prefix() {
        let mut groups = three();
        let id = groups[1].id.hyphenated().to_string();
        let list = GroupList::new(&mut groups);

        assert_eq!(list.position(&id).unwrap(), 1);
        assert_eq!(list.position(&id[..8].to_uppercase()).unwrap(), 1);
        assert!(matches!(list.position("zzz"), Err(Error::GroupNotFound(_))));
    }

    #[test]
    fn test_extend_appends_after_existing() {
        let mut groups = three();
        let mut list = GroupList::new(&mut groups);
        let added = list.extend(vec![EnvGroup::create("x", ""), EnvGroup::create("y", "")]);
        assert_eq!(added, 2);
        assert_eq!(names(list.as_slice())[4], ("y".into(), 4));
    }
}
