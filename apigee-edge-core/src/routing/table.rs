//! Ordered route table

use super::route::RouteEntry;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Route name to entry, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteTable {
    routes: Vec<(String, RouteEntry)>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a route. An existing route of the same name is replaced and the
    /// new entry goes to the end.
    pub fn add(&mut self, name: impl Into<String>, entry: RouteEntry) {
        let name = name.into();
        self.remove(&name);
        self.routes.push((name, entry));
    }

    pub fn remove(&mut self, name: &str) -> Option<RouteEntry> {
        let index = self.routes.iter().position(|(existing, _)| existing == name)?;
        Some(self.routes.remove(index).1)
    }

    pub fn get(&self, name: &str) -> Option<&RouteEntry> {
        self.routes
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, entry)| entry)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut RouteEntry> {
        self.routes
            .iter_mut()
            .find(|(existing, _)| existing == name)
            .map(|(_, entry)| entry)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> Vec<&str> {
        self.routes.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RouteEntry)> {
        self.routes.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl Serialize for RouteTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.routes.len()))?;
        for (name, entry) in &self.routes {
            map.serialize_entry(name, entry)?;
        }
        map.end()
    }
}
