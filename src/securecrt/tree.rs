// ABOUTME: Output tree produced by the SecureCRT importer: host entries nested inside labelled groups
// ABOUTME: Groups keep source order, overwrite duplicate labels in place and serialize with a __group marker

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::ops::Deref;

/// Key that tags a nested mapping as a group rather than a host.
pub const GROUP_MARKER: &str = "__group";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HostEntry {
    pub label: String,
    pub hostname: String,
    pub port: String,
    pub username: Option<String>,
}

impl HostEntry {
    pub fn new(label: String, hostname: String, port: String, username: Option<String>) -> Self {
        Self {
            label,
            hostname,
            port,
            username,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TreeEntry {
    Host(HostEntry),
    Group(SessionGroup),
}

impl TreeEntry {
    pub fn as_host(&self) -> Option<&HostEntry> {
        match self {
            TreeEntry::Host(host) => Some(host),
            TreeEntry::Group(_) => None,
        }
    }

    pub fn as_group(&self) -> Option<&SessionGroup> {
        match self {
            TreeEntry::Group(group) => Some(group),
            TreeEntry::Host(_) => None,
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, TreeEntry::Group(_))
    }
}

impl Serialize for TreeEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TreeEntry::Host(host) => host.serialize(serializer),
            TreeEntry::Group(group) => group.serialize(serializer),
        }
    }
}

/// Ordered label -> entry container.
///
/// Labels are unique: inserting an existing label replaces the old entry
/// but keeps its original position.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionGroup {
    entries: Vec<(String, TreeEntry)>,
}

impl SessionGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `entry` under `label`, returning the entry it replaced.
    pub fn insert(&mut self, label: String, entry: TreeEntry) -> Option<TreeEntry> {
        match self.entries.iter_mut().find(|(existing, _)| *existing == label) {
            Some((_, slot)) => Some(std::mem::replace(slot, entry)),
            None => {
                self.entries.push((label, entry));
                None
            }
        }
    }

    pub fn get(&self, label: &str) -> Option<&TreeEntry> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == label)
            .map(|(_, entry)| entry)
    }

    pub fn get_mut(&mut self, label: &str) -> Option<&mut TreeEntry> {
        self.entries
            .iter_mut()
            .find(|(existing, _)| existing == label)
            .map(|(_, entry)| entry)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TreeEntry)> {
        self.entries.iter().map(|(label, entry)| (label.as_str(), entry))
    }

    pub fn labels(&self) -> Vec<&str> {
        self.entries.iter().map(|(label, _)| label.as_str()).collect()
    }

    /// Number of hosts in this group and all nested groups.
    pub fn host_count(&self) -> usize {
        self.entries
            .iter()
            .map(|(_, entry)| match entry {
                TreeEntry::Host(_) => 1,
                TreeEntry::Group(group) => group.host_count(),
            })
            .sum()
    }

    /// Number of nested groups, at any depth.
    pub fn group_count(&self) -> usize {
        self.entries
            .iter()
            .map(|(_, entry)| match entry {
                TreeEntry::Host(_) => 0,
                TreeEntry::Group(group) => 1 + group.group_count(),
            })
            .sum()
    }

    fn serialize_entries<M: SerializeMap>(&self, map: &mut M) -> Result<(), M::Error> {
        for (label, entry) in &self.entries {
            map.serialize_entry(label, entry)?;
        }
        Ok(())
    }
}

impl Serialize for SessionGroup {
    /// Children labelled like the marker are left out; the key is taken.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let children: Vec<_> = self
            .entries
            .iter()
            .filter(|(label, _)| {
                let reserved = label == GROUP_MARKER;
                if reserved {
                    tracing::warn!("Dropping session '{}' from group output: name is reserved", label);
                }
                !reserved
            })
            .collect();

        let mut map = serializer.serialize_map(Some(children.len() + 1))?;
        map.serialize_entry(GROUP_MARKER, &true)?;
        for (label, entry) in children {
            map.serialize_entry(label, entry)?;
        }
        map.end()
    }
}

/// Top level of an import. Serializes as a plain mapping without the group marker.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HostTree {
    root: SessionGroup,
}

impl HostTree {
    pub fn new(root: SessionGroup) -> Self {
        Self { root }
    }

    pub fn into_root(self) -> SessionGroup {
        self.root
    }
}

impl Deref for HostTree {
    type Target = SessionGroup;

    fn deref(&self) -> &SessionGroup {
        &self.root
    }
}

impl Serialize for HostTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.root.len()))?;
        self.root.serialize_entries(&mut map)?;
        map.end()
    }
}
