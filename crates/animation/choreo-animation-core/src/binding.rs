//! Name-to-object resolution for declarative definitions.
//!
//! Definitions refer to objects by name. Hosts map those names to the
//! [`ObjectId`]s their substrate uses by passing a resolver to the loader.

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::ids::ObjectId;

/// Resolves target names to object ids.
pub trait ObjectResolver {
    fn resolve(&mut self, name: &str) -> Option<ObjectId>;
}

impl ObjectResolver for HashMap<String, ObjectId> {
    fn resolve(&mut self, name: &str) -> Option<ObjectId> {
        self.get(name).copied()
    }
}

/// Ordered name table.
#[derive(Clone, Debug, Default)]
pub struct ObjectTable {
    rows: IndexMap<String, ObjectId>,
}

impl ObjectTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to `object`, returning the previous binding.
    pub fn register(&mut self, name: impl Into<String>, object: ObjectId) -> Option<ObjectId> {
        self.rows.insert(name.into(), object)
    }

    pub fn get(&self, name: &str) -> Option<ObjectId> {
        self.rows.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl ObjectResolver for ObjectTable {
    fn resolve(&mut self, name: &str) -> Option<ObjectId> {
        self.get(name)
    }
}
