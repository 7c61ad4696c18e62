//! In-memory reference source for tests and embedding.
//!
//! [`InMemoryRefSource`] serves a fixed listing and symbolic HEAD held behind
//! `RwLock`s, so a test can swap the listing between reloads. It counts how
//! often the listing was requested.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};

use crate::error::{RefError, Result};
use crate::traits::RefSource;

/// An in-memory implementation of [`RefSource`].
#[derive(Debug, Default)]
pub struct InMemoryRefSource {
    listing: RwLock<String>,
    head: RwLock<Option<String>>,
    unavailable: RwLock<bool>,
    list_calls: AtomicUsize,
    head_calls: AtomicUsize,
}

impl InMemoryRefSource {
    /// Create a source with an empty listing and a detached HEAD.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a source serving `lines`, joined with newlines.
    pub fn with_lines<I, L>(lines: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: AsRef<str>,
    {
        let source = Self::new();
        source.set_lines(lines);
        source
    }

    /// Replace the listing.
    pub fn set_lines<I, L>(&self, lines: I)
    where
        I: IntoIterator<Item = L>,
        L: AsRef<str>,
    {
        let mut listing = String::new();
        for line in lines {
            listing.push_str(line.as_ref());
            listing.push('\n');
        }
        *self.listing.write().unwrap_or_else(PoisonError::into_inner) = listing;
    }

    /// Set the symbolic HEAD target, e.g. `Some("refs/heads/main")`.
    pub fn set_head(&self, target: Option<&str>) {
        *self.head.write().unwrap_or_else(PoisonError::into_inner) = target.map(str::to_string);
    }

    /// Make the listing fail as if the command could not be run.
    pub fn set_unavailable(&self, unavailable: bool) {
        *self.unavailable.write().unwrap_or_else(PoisonError::into_inner) = unavailable;
    }

    /// How many times the listing was requested.
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// How many times the symbolic HEAD was queried.
    pub fn head_calls(&self) -> usize {
        self.head_calls.load(Ordering::SeqCst)
    }
}

impl RefSource for InMemoryRefSource {
    fn symbolic_head(&self, _git_dir: &Path) -> Result<Option<String>> {
        self.head_calls.fetch_add(1, Ordering::SeqCst);
        let head = self.head.read().map_err(|e| poisoned("head", e))?;
        Ok(head.clone())
    }

    fn list_refs(&self, _git_dir: &Path) -> Result<String> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if *self.unavailable.read().map_err(|e| poisoned("listing", e))? {
            return Err(RefError::SourceUnavailable {
                command: "in-memory".into(),
                reason: "marked unavailable".into(),
            });
        }
        let listing = self.listing.read().map_err(|e| poisoned("listing", e))?;
        Ok(listing.clone())
    }
}

fn poisoned<E: std::fmt::Display>(command: &str, e: E) -> RefError {
    RefError::SourceUnavailable {
        command: format!("in-memory {command}"),
        reason: format!("lock poisoned: {e}"),
    }
}
