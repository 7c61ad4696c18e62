//! Reference registry for a git repository.
//!
//! This crate keeps an in-memory registry of a repository's references
//! (branches, tags, remote-tracking refs, replacement refs and HEAD), keeps it
//! in sync with a `git ls-remote` style listing, and answers "which refs point
//! at this object?" from a per-id cache.
//!
//! # Architecture
//!
//! - **Classification** maps a full ref name to a [`RefKind`] and a short
//!   display name. Peeled tag lines (`^{}`) carry the commit a tag points to.
//! - **Registry** owns every [`Reference`] in an append-only arena. Entries
//!   are deduplicated by name, or by the replaced object id for replacement
//!   refs, and are blanked rather than removed when they disappear.
//! - **List cache** keeps one sorted [`RefList`] per queried object id and
//!   compacts it in place after every reload.
//! - **Database** drives reloads against a [`RefSource`] and tracks HEAD.
//!
//! # Modules
//!
//! - [`error`]: Error types for ref operations
//! - [`types`]: [`Reference`], [`RefKind`] and the display order
//! - [`names`]: Ref name classification
//! - [`registry`]: The [`Registry`] arena
//! - [`cache`]: The [`RefListCache`]
//! - [`traits`]: The [`RefSource`] trait and listing line parser
//! - [`git`]: [`GitCommandSource`], backed by the git CLI
//! - [`memory`]: [`InMemoryRefSource`] for tests
//! - [`config`]: Repository and source configuration
//! - [`database`]: The [`RefDatabase`] coordinator

pub mod cache;
pub mod config;
pub mod database;
pub mod error;
pub mod git;
pub mod memory;
pub mod names;
pub mod registry;
pub mod traits;
pub mod types;

pub use cache::{RefList, RefListCache};
pub use config::{Config, RepoConfig, SourceConfig};
pub use database::RefDatabase;
pub use error::{RefError, Result};
pub use git::GitCommandSource;
pub use memory::InMemoryRefSource;
pub use names::{classify, Classification, ClassifiedRef, RefContext};
pub use registry::Registry;
pub use traits::{parse_line, RefSource};
pub use types::{compare_refs, IdentityKey, RefHandle, RefKind, RefListHandle, Reference};
