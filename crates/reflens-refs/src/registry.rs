//! The reference registry.
//!
//! Entries live in an append-only arena and are never removed: an entry that a
//! reload did not confirm has its id blanked instead, so every [`RefHandle`]
//! handed out stays valid. A separate index vector holds the display order.

use std::ops::ControlFlow;

use tracing::debug;

use crate::error::{RefError, Result};
use crate::names::ClassifiedRef;
use crate::types::{compare_refs, exact_string, truncate_id, IdentityKey, RefHandle, Reference};

/// Ordered collection of every reference seen so far.
#[derive(Debug, Default)]
pub struct Registry {
    entries: Vec<Reference>,
    order: Vec<RefHandle>,
    head: Option<RefHandle>,
    /// Set between `mark_all_stale` and the end of the pass.
    syncing: bool,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries, including blanked ones.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve a handle issued by this registry.
    pub fn get(&self, handle: RefHandle) -> &Reference {
        &self.entries[handle.0]
    }

    /// Look up the entry with the given identity, live or blanked.
    pub fn find(&self, key: &IdentityKey) -> Option<RefHandle> {
        self.entries
            .iter()
            .position(|entry| entry.key == *key)
            .map(RefHandle)
    }

    fn find_matching(&self, replace: bool, key: &str) -> Option<RefHandle> {
        self.entries
            .iter()
            .position(|entry| match &entry.key {
                IdentityKey::Replaced(k) => replace && k == key,
                IdentityKey::Name(k) => !replace && k == key,
            })
            .map(RefHandle)
    }

    /// Insert a classified line, or refresh the entry with the same identity.
    ///
    /// Refreshing overwrites kind and id, which is how branch movement and the
    /// peeled tag id are picked up. Once a peeled line has set a tag during the
    /// current pass, a plain line for the same tag leaves it alone. On error
    /// nothing has been modified.
    pub fn upsert(&mut self, line: &ClassifiedRef<'_>) -> Result<RefHandle> {
        let replace = line.kind.is_replace();
        let id = truncate_id(line.id);
        let key = if replace { id } else { line.name };

        let handle = match self.find_matching(replace, key) {
            Some(handle) => {
                let entry = &self.entries[handle.0];
                let keep_peeled = self.syncing
                    && entry.valid
                    && entry.kind.is_peeled_tag()
                    && line.kind.is_annotated_tag();
                if !keep_peeled {
                    let new_id = exact_string(id)?;
                    let replaced_by = line
                        .replaced_by
                        .map(|r| exact_string(truncate_id(r)))
                        .transpose()?;
                    let entry = &mut self.entries[handle.0];
                    entry.id = new_id;
                    entry.kind = line.kind;
                    entry.replaced_by = replaced_by;
                }
                self.entries[handle.0].valid = true;
                handle
            }
            None => {
                let entry = Reference::try_new(id, line.name, line.kind, line.replaced_by)?;
                self.entries
                    .try_reserve(1)
                    .map_err(RefError::alloc("reference registry"))?;
                self.order
                    .try_reserve(1)
                    .map_err(RefError::alloc("reference order"))?;
                let handle = RefHandle(self.entries.len());
                self.entries.push(entry);
                self.order.push(handle);
                handle
            }
        };

        if self.entries[handle.0].is_head() {
            self.head = Some(handle);
        }
        Ok(handle)
    }

    /// Flag every entry as unconfirmed and start a reload pass.
    pub fn mark_all_stale(&mut self) {
        self.syncing = true;
        for entry in &mut self.entries {
            entry.valid = false;
        }
    }

    /// Blank the id of every entry the reload did not confirm.
    ///
    /// Returns the number of entries that went stale in this pass, which ends
    /// the pass.
    pub fn prune_stale(&mut self) -> usize {
        self.syncing = false;
        let mut pruned = 0;
        for entry in self.entries.iter_mut().filter(|e| !e.valid) {
            if !entry.id.is_empty() {
                debug!(name = %entry.name, id = %entry.id, "pruning stale ref");
                pruned += 1;
            }
            entry.id.clear();
        }
        pruned
    }

    /// End a pass without pruning, after a failed reload.
    pub(crate) fn abandon_pass(&mut self) {
        self.syncing = false;
    }

    /// Re-sort the display order.
    pub fn sort_all(&mut self) {
        let entries = &self.entries;
        self.order
            .sort_by(|a, b| compare_refs(&entries[a.0], &entries[b.0]));
    }

    /// Live entries in display order.
    pub fn iter(&self) -> impl Iterator<Item = &Reference> + '_ {
        self.order
            .iter()
            .map(|handle| &self.entries[handle.0])
            .filter(|entry| entry.is_live())
    }

    /// Visit live entries in display order until the visitor breaks.
    pub fn for_each<'a, F>(&'a self, mut visit: F)
    where
        F: FnMut(&'a Reference) -> ControlFlow<()>,
    {
        for entry in self.iter() {
            if visit(entry).is_break() {
                break;
            }
        }
    }

    /// Handles of live entries pointing at `id`, in arena order.
    pub(crate) fn handles_at<'a>(&'a self, id: &'a str) -> impl Iterator<Item = RefHandle> + 'a {
        self.entries
            .iter()
            .enumerate()
            .filter(move |(_, entry)| entry.is_live() && entry.id == id)
            .map(|(pos, _)| RefHandle(pos))
    }

    /// The entry for the checked-out branch or detached HEAD, if any.
    pub fn head(&self) -> Option<&Reference> {
        self.head.map(|handle| &self.entries[handle.0])
    }

    pub(crate) fn head_handle(&self) -> Option<RefHandle> {
        self.head
    }

    pub(crate) fn set_head(&mut self, head: Option<RefHandle>) {
        self.head = head;
    }
}
