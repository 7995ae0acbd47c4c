//! Declaration registry and futures set.
//!
//! The registry is the arena every descriptor lives in, plus an
//! insertion-ordered index of named declarations. Insertion order is
//! semantically meaningful: it is the default emission order and the
//! tie-break when several forward references compete for a root's
//! single dependency slot.
//!
//! Both the registry and the futures set are caller-owned — one pair
//! per translation run, never shared across runs.

use std::collections::{HashMap, HashSet};

use crate::descriptor::{DescriptorId, Kind, TypeDescriptor};

/// Insertion-ordered store of one descriptor per named declaration,
/// backed by an arena holding every descriptor (named or anonymous).
#[derive(Debug, Default)]
pub struct Registry {
    arena: Vec<TypeDescriptor>,
    names: HashMap<String, DescriptorId>,
    order: Vec<DescriptorId>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh descriptor in the arena.
    pub fn alloc(&mut self, kind: Kind, parent: Option<DescriptorId>) -> DescriptorId {
        let id = DescriptorId(self.arena.len() as u32);
        self.arena.push(TypeDescriptor::new(id, kind, parent));
        id
    }

    pub fn get(&self, id: DescriptorId) -> &TypeDescriptor {
        &self.arena[id.0 as usize]
    }

    pub fn get_mut(&mut self, id: DescriptorId) -> &mut TypeDescriptor {
        &mut self.arena[id.0 as usize]
    }

    /// Look up a named declaration's descriptor.
    pub fn lookup(&self, name: &str) -> Option<DescriptorId> {
        self.names.get(name).copied()
    }

    /// Whether a named declaration exists.
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    /// Bind a name to a descriptor, appending to the insertion order.
    ///
    /// Callers look up before binding, so a name is bound at most once;
    /// a rebind of an existing name is ignored.
    pub fn bind(&mut self, name: &str, id: DescriptorId) {
        if self.names.contains_key(name) {
            return;
        }
        self.names.insert(name.to_string(), id);
        self.order.push(id);
        self.get_mut(id).name = Some(name.to_string());
    }

    /// Position of a named descriptor in insertion order.
    pub fn insertion_index(&self, id: DescriptorId) -> Option<usize> {
        self.order.iter().position(|&d| d == id)
    }

    /// Named declarations, in insertion order.
    pub fn named(&self) -> impl Iterator<Item = DescriptorId> + '_ {
        self.order.iter().copied()
    }

    /// Number of named declarations.
    pub fn named_len(&self) -> usize {
        self.order.len()
    }

    /// Total number of descriptors in the arena.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }
}

/// Names referenced by indirection before their owning declaration has
/// been fully resolved.
#[derive(Debug, Default)]
pub struct Futures {
    names: HashSet<String>,
}

impl Futures {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str) {
        self.names.insert(name.to_string());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
