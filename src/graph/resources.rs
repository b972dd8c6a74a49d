//! Ordered, namespace-indexed storage for normalized resources.

use serde_yaml::Value;
use std::collections::{btree_map::Entry as BTreeEntry, BTreeMap};

use crate::properties::{Resource, ResourceKey};

/// A resource together with the document it was normalized from. The document is kept so
/// that relationship extraction can run after the full stream is consumed.
#[derive(Debug, Clone)]
pub struct ResourceEntry {
    pub resource: Resource,
    pub(crate) document: Value,
}

/// All resources of one run, in first-appearance order of their identity keys.
///
/// A later resource with the same key replaces the earlier one in place, so iteration order
/// stays stable while field values follow last-write-wins.
#[derive(Debug, Clone, Default)]
pub struct ResourceSet {
    entries: Vec<ResourceEntry>,
    index: BTreeMap<ResourceKey, usize>,
    namespaces: BTreeMap<String, Vec<usize>>,
}

impl ResourceSet {
    pub fn new() -> Self {
        ResourceSet::default()
    }

    /// Insert a resource, returning the resource it replaced, if any.
    pub fn insert(&mut self, resource: Resource, document: Value) -> Option<Resource> {
        let entry = ResourceEntry { resource, document };
        match self.index.entry(entry.resource.key()) {
            BTreeEntry::Occupied(slot) => {
                let previous = std::mem::replace(&mut self.entries[*slot.get()], entry);
                Some(previous.resource)
            }
            BTreeEntry::Vacant(slot) => {
                let position = self.entries.len();
                slot.insert(position);
                self.namespaces
                    .entry(entry.resource.namespace.clone())
                    .or_default()
                    .push(position);
                self.entries.push(entry);
                None
            }
        }
    }

    pub fn get(&self, key: &ResourceKey) -> Option<&Resource> {
        self.index.get(key).map(|idx| &self.entries[*idx].resource)
    }

    pub fn contains(&self, key: &ResourceKey) -> bool {
        self.index.contains_key(key)
    }

    /// Position of a key in iteration order.
    pub fn position(&self, key: &ResourceKey) -> Option<usize> {
        self.index.get(key).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Resource> {
        self.entries.iter().map(|entry| &entry.resource)
    }

    pub fn entries(&self) -> impl Iterator<Item = &ResourceEntry> {
        self.entries.iter()
    }

    /// Resources of one namespace, in iteration order.
    pub fn in_namespace<'a>(&'a self, namespace: &str) -> impl Iterator<Item = &'a Resource> {
        self.namespaces
            .get(namespace)
            .into_iter()
            .flatten()
            .map(|idx| &self.entries[*idx].resource)
    }

    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.namespaces.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<Resource> for ResourceSet {
    fn from_iter<T: IntoIterator<Item = Resource>>(iter: T) -> Self {
        let mut set = ResourceSet::new();
        for resource in iter {
            set.insert(resource, Value::Null);
        }
        set
    }
}
