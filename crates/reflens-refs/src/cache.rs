//! Per-object reference lists.
//!
//! The first query for an object id scans the registry once and keeps the
//! sorted result. Lists are never dropped: a reload compacts each one in place
//! so a [`RefListHandle`] obtained earlier keeps describing the same id.

use std::collections::HashMap;

use tracing::debug;

use crate::error::{RefError, Result};
use crate::registry::Registry;
use crate::types::{compare_refs, exact_string, RefHandle, RefListHandle, Reference};

/// The references pointing at one object id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RefList {
    id: String,
    refs: Vec<RefHandle>,
}

impl RefList {
    /// The object id this list is keyed on.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn len(&self) -> usize {
        self.refs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }

    pub fn handles(&self) -> &[RefHandle] {
        &self.refs
    }

    /// Resolve the list against the registry that built it.
    pub fn iter<'a>(&'a self, registry: &'a Registry) -> impl Iterator<Item = &'a Reference> + 'a {
        self.refs.iter().map(move |handle| registry.get(*handle))
    }
}

/// Lazily built lists keyed by object id.
#[derive(Debug, Default)]
pub struct RefListCache {
    lists: Vec<RefList>,
    by_id: HashMap<String, RefListHandle>,
}

impl RefListCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of lists built so far.
    pub fn len(&self) -> usize {
        self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    pub fn list(&self, handle: RefListHandle) -> &RefList {
        &self.lists[handle.0]
    }

    /// Return the list for `id`, building it on first use.
    ///
    /// An id nothing points at yields `None` unless a list for it was built
    /// earlier and has since been emptied by a reload.
    pub fn get(&mut self, registry: &Registry, id: &str) -> Result<Option<RefListHandle>> {
        if let Some(handle) = self.by_id.get(id) {
            return Ok(Some(*handle));
        }

        let mut refs = Vec::new();
        for handle in registry.handles_at(id) {
            refs.try_reserve(1)
                .map_err(RefError::alloc("reference list"))?;
            refs.push(handle);
        }
        if refs.is_empty() {
            return Ok(None);
        }
        refs.sort_by(|a, b| compare_refs(registry.get(*a), registry.get(*b)));

        let key = exact_string(id)?;
        self.lists
            .try_reserve(1)
            .map_err(RefError::alloc("reference list table"))?;
        self.by_id
            .try_reserve(1)
            .map_err(RefError::alloc("reference list index"))?;

        let handle = RefListHandle(self.lists.len());
        debug!(id, refs = refs.len(), "built ref list");
        self.lists.push(RefList {
            id: key.clone(),
            refs,
        });
        self.by_id.insert(key, handle);
        Ok(Some(handle))
    }

    /// Drop entries whose id no longer matches their list, keeping order.
    ///
    /// Returns the number of entries removed across all lists.
    pub fn prune_all(&mut self, registry: &Registry) -> usize {
        let mut removed = 0;
        for list in &mut self.lists {
            let before = list.refs.len();
            let id = &list.id;
            list.refs.retain(|handle| registry.get(*handle).id() == id);
            removed += before - list.refs.len();
        }
        if removed > 0 {
            debug!(removed, "compacted ref lists");
        }
        removed
    }
}
