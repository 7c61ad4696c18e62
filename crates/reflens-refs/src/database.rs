//! The reference database: registry, list cache and reload coordination.
//!
//! A reload runs as a fixed pipeline, each step total over the collection:
//!
//! 1. resolve the symbolic HEAD if it is not known yet
//! 2. fetch the listing (a failure here leaves everything untouched)
//! 3. clear the HEAD slot and mark every entry stale
//! 4. classify and upsert each listed line
//! 5. blank entries that were not confirmed
//! 6. compact every cached list
//! 7. re-sort the registry

use std::ops::ControlFlow;

use tracing::{debug, warn};

use crate::cache::{RefList, RefListCache};
use crate::config::RepoConfig;
use crate::error::Result;
use crate::names::{classify, short_head_name, Classification, RefContext};
use crate::registry::Registry;
use crate::traits::{parse_line, RefSource};
use crate::types::{RefListHandle, Reference};

/// In-memory view of a repository's references, kept in sync with a
/// [`RefSource`].
#[derive(Debug)]
pub struct RefDatabase<S> {
    source: S,
    repo: RepoConfig,
    registry: Registry,
    cache: RefListCache,
    loaded: bool,
}

impl<S: RefSource> RefDatabase<S> {
    /// Create an empty database. Nothing is read until [`load`](Self::load).
    pub fn new(source: S, repo: RepoConfig) -> Self {
        Self {
            source,
            repo,
            registry: Registry::new(),
            cache: RefListCache::new(),
            loaded: false,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn repo(&self) -> &RepoConfig {
        &self.repo
    }

    /// Short name of the checked-out branch, empty when detached or unknown.
    pub fn head_name(&self) -> &str {
        &self.repo.head
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn cache(&self) -> &RefListCache {
        &self.cache
    }

    /// Whether a load has succeeded at least once.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Synchronize with the source.
    ///
    /// Without `force`, only the first successful call does any work. With
    /// `force`, the remembered head name is dropped and resolved again.
    pub fn load(&mut self, force: bool) -> Result<()> {
        if force {
            self.repo.head.clear();
        } else if self.loaded {
            return Ok(());
        }

        self.reload()?;
        self.loaded = true;
        Ok(())
    }

    fn reload(&mut self) -> Result<()> {
        let Some(git_dir) = self.repo.git_dir.clone() else {
            debug!("no repository configured; nothing to load");
            return Ok(());
        };

        if self.repo.head.is_empty() {
            if let Some(target) = self.source.symbolic_head(&git_dir)? {
                self.repo.head = short_head_name(&target).to_string();
            }
        }

        let listing = self.source.list_refs(&git_dir).inspect_err(|e| {
            warn!(git_dir = %git_dir.display(), error = %e, "cannot list references");
        })?;

        let previous_head = self.registry.head_handle();
        self.registry.set_head(None);
        self.registry.mark_all_stale();

        let ctx = RefContext::new(&self.repo.remote, &self.repo.head);
        let mut lines = 0usize;
        for (id, name) in listing.lines().filter_map(parse_line) {
            if let Err(e) = ingest(&mut self.registry, id, name, &ctx) {
                self.registry.abandon_pass();
                if self.registry.head_handle().is_none() {
                    self.registry.set_head(previous_head);
                }
                return Err(e);
            }
            lines += 1;
        }

        let pruned = self.registry.prune_stale();
        let compacted = self.cache.prune_all(&self.registry);
        self.registry.sort_all();

        debug!(
            lines,
            refs = self.registry.len(),
            pruned,
            compacted,
            head = %self.repo.head,
            "references reloaded"
        );
        Ok(())
    }

    /// Record one reference learned out of band.
    ///
    /// Staleness tracking and cached lists are left alone until the next
    /// reload.
    pub fn add(&mut self, id: &str, name: &str, remote: &str, head: &str) -> Result<()> {
        ingest(&mut self.registry, id, name, &RefContext::new(remote, head))
    }

    /// Visit live references in display order until the visitor breaks.
    pub fn for_each<'a, F>(&'a self, visit: F)
    where
        F: FnMut(&'a Reference) -> ControlFlow<()>,
    {
        self.registry.for_each(visit)
    }

    /// Live references in display order.
    pub fn iter(&self) -> impl Iterator<Item = &Reference> + '_ {
        self.registry.iter()
    }

    /// The checked-out branch or detached HEAD entry.
    pub fn head(&self) -> Option<&Reference> {
        self.registry.head()
    }

    /// Handle of the cached list for `id`, building it on first use.
    pub fn ref_list(&mut self, id: &str) -> Result<Option<RefListHandle>> {
        self.cache.get(&self.registry, id)
    }

    /// A list previously returned by [`ref_list`](Self::ref_list).
    pub fn list(&self, handle: RefListHandle) -> &RefList {
        self.cache.list(handle)
    }

    /// Resolve a cached list to its references.
    pub fn list_refs(&self, handle: RefListHandle) -> impl Iterator<Item = &Reference> + '_ {
        self.cache.list(handle).iter(&self.registry)
    }

    /// References pointing at `id`, in display order; empty when none do.
    pub fn refs_at(&mut self, id: &str) -> Result<Vec<&Reference>> {
        let refs = match self.cache.get(&self.registry, id)? {
            Some(handle) => self.cache.list(handle).iter(&self.registry).collect(),
            None => Vec::new(),
        };
        Ok(refs)
    }
}

fn ingest(registry: &mut Registry, id: &str, name: &str, ctx: &RefContext<'_>) -> Result<()> {
    match classify(id, name, ctx) {
        Classification::Ref(line) => registry.upsert(&line).map(|_| ()),
        Classification::Ignored => Ok(()),
    }
}
