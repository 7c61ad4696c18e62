//! Core reference types.
//!
//! A [`Reference`] is one entry of the registry: an object id, a short display
//! name and a [`RefKind`] describing which namespace it came from. Entries are
//! addressed by [`RefHandle`], an index into the append-only registry arena, so
//! cached views can hold them across reloads.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::{RefError, Result};

/// Maximum number of characters kept from an object id.
pub const MAX_ID_LEN: usize = 40;

/// Display name shared by every replacement ref.
pub const REPLACED_NAME: &str = "replaced";

/// Which namespace a reference came from, with its per-kind flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RefKind {
    /// `refs/tags/*`. `peeled` marks the `^{}` line carrying the dereferenced
    /// commit id.
    Tag { peeled: bool },
    /// `refs/remotes/*`. `tracked` marks the entry whose short name equals the
    /// configured remote name exactly.
    Remote { tracked: bool },
    /// `refs/replace/*`.
    Replace,
    /// `refs/heads/*`. `head` marks the checked-out branch.
    Branch { head: bool },
    /// A literal `HEAD` line while no symbolic head is known.
    DetachedHead,
    /// Anything else, kept under its full name.
    Other,
}

impl RefKind {
    pub fn is_tag(self) -> bool {
        matches!(self, RefKind::Tag { .. })
    }

    /// Tag line without the peel suffix.
    pub fn is_annotated_tag(self) -> bool {
        matches!(self, RefKind::Tag { peeled: false })
    }

    pub fn is_peeled_tag(self) -> bool {
        matches!(self, RefKind::Tag { peeled: true })
    }

    pub fn is_remote(self) -> bool {
        matches!(self, RefKind::Remote { .. })
    }

    pub fn is_tracked_remote_head(self) -> bool {
        matches!(self, RefKind::Remote { tracked: true })
    }

    pub fn is_replace(self) -> bool {
        matches!(self, RefKind::Replace)
    }

    pub fn is_head(self) -> bool {
        matches!(self, RefKind::Branch { head: true } | RefKind::DetachedHead)
    }
}

/// The key deciding whether an incoming line updates an existing entry.
///
/// Replacement refs all share the display name `"replaced"`, so they are
/// keyed by the object they replace instead.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IdentityKey {
    Name(String),
    Replaced(String),
}

/// Stable index of a registry entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RefHandle(pub(crate) usize);

/// Stable index of a cached reference list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RefListHandle(pub(crate) usize);

/// A reference known to the registry.
///
/// An empty `id` means the entry was not confirmed by the latest reload; such
/// entries are never yielded by iteration or list queries.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Reference {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) kind: RefKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) replaced_by: Option<String>,
    #[serde(skip)]
    pub(crate) key: IdentityKey,
    #[serde(skip)]
    pub(crate) valid: bool,
}

impl Reference {
    /// Build an entry, allocating the strings to fit exactly.
    pub(crate) fn try_new(
        id: &str,
        name: &str,
        kind: RefKind,
        replaced_by: Option<&str>,
    ) -> Result<Self> {
        let id = truncate_id(id);
        let key = if kind.is_replace() {
            IdentityKey::Replaced(exact_string(id)?)
        } else {
            IdentityKey::Name(exact_string(name)?)
        };
        Ok(Self {
            id: exact_string(id)?,
            name: exact_string(name)?,
            kind,
            replaced_by: replaced_by.map(|r| exact_string(truncate_id(r))).transpose()?,
            key,
            valid: true,
        })
    }

    /// Object id this reference points at; empty once pruned.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Short display name (e.g. `main`, `v1.0`, `origin/main`, `replaced`).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> RefKind {
        self.kind
    }

    /// For replacement refs, the id of the object substituted in.
    pub fn replaced_by(&self) -> Option<&str> {
        self.replaced_by.as_deref()
    }

    pub fn identity(&self) -> &IdentityKey {
        &self.key
    }

    /// Returns `true` unless the entry was blanked by a reload.
    pub fn is_live(&self) -> bool {
        !self.id.is_empty()
    }

    pub fn is_tag(&self) -> bool {
        self.kind.is_tag()
    }

    pub fn is_annotated_tag(&self) -> bool {
        self.kind.is_annotated_tag()
    }

    pub fn is_remote(&self) -> bool {
        self.kind.is_remote()
    }

    pub fn is_tracked_remote_head(&self) -> bool {
        self.kind.is_tracked_remote_head()
    }

    pub fn is_replace(&self) -> bool {
        self.kind.is_replace()
    }

    pub fn is_head(&self) -> bool {
        self.kind.is_head()
    }
}

/// The display order shared by the registry and every cached list.
///
/// Tags come first (annotated before peeled), followed by the head, the
/// tracked remote head and replacements. Remotes sort after everything else.
/// Remaining ties are broken by name and then by identity key, so distinct
/// entries never compare equal.
pub fn compare_refs(a: &Reference, b: &Reference) -> Ordering {
    b.is_tag()
        .cmp(&a.is_tag())
        .then_with(|| b.is_annotated_tag().cmp(&a.is_annotated_tag()))
        .then_with(|| b.is_head().cmp(&a.is_head()))
        .then_with(|| b.is_tracked_remote_head().cmp(&a.is_tracked_remote_head()))
        .then_with(|| b.is_replace().cmp(&a.is_replace()))
        // Order remotes last.
        .then_with(|| a.is_remote().cmp(&b.is_remote()))
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.key.cmp(&b.key))
}

/// Copy `s` into a string of exactly its length, reporting allocation failure.
pub(crate) fn exact_string(s: &str) -> Result<String> {
    let mut out = String::new();
    out.try_reserve_exact(s.len())
        .map_err(RefError::alloc("reference string"))?;
    out.push_str(s);
    Ok(out)
}

/// Cut an object id to at most [`MAX_ID_LEN`] characters.
pub(crate) fn truncate_id(id: &str) -> &str {
    match id.char_indices().nth(MAX_ID_LEN) {
        Some((end, _)) => &id[..end],
        None => id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference(name: &str, kind: RefKind) -> Reference {
        Reference::try_new("abcd", name, kind, None).unwrap()
    }

    #[test]
    fn kind_flags() {
        assert!(RefKind::Tag { peeled: false }.is_annotated_tag());
        assert!(!RefKind::Tag { peeled: true }.is_annotated_tag());
        assert!(RefKind::Tag { peeled: true }.is_tag());
        assert!(RefKind::DetachedHead.is_head());
        assert!(RefKind::Branch { head: true }.is_head());
        assert!(!RefKind::Branch { head: false }.is_head());
        assert!(RefKind::Remote { tracked: true }.is_remote());
        assert!(!RefKind::Other.is_remote());
    }

    #[test]
    fn replacement_keyed_by_id() {
        let r = Reference::try_new("aaaa", REPLACED_NAME, RefKind::Replace, Some("gggg")).unwrap();
        assert_eq!(r.identity(), &IdentityKey::Replaced("aaaa".into()));
        assert_eq!(r.replaced_by(), Some("gggg"));

        let b = reference("main", RefKind::Branch { head: false });
        assert_eq!(b.identity(), &IdentityKey::Name("main".into()));
    }

    #[test]
    fn ids_are_truncated() {
        let long = "0123456789abcdef0123456789abcdef01234567ffff";
        let r = Reference::try_new(long, "x", RefKind::Other, None).unwrap();
        assert_eq!(r.id().len(), MAX_ID_LEN);
        assert_eq!(r.id(), &long[..MAX_ID_LEN]);
        assert_eq!(truncate_id("abc"), "abc");
    }

    #[test]
    fn ordering_by_kind() {
        let tag = reference("z-tag", RefKind::Tag { peeled: true });
        let ltag = reference("z-ltag", RefKind::Tag { peeled: false });
        let head = reference("z-head", RefKind::Branch { head: true });
        let tracked = reference("z-tracked", RefKind::Remote { tracked: true });
        let replace = reference(REPLACED_NAME, RefKind::Replace);
        let branch = reference("a-branch", RefKind::Branch { head: false });
        let remote = reference("a-remote", RefKind::Remote { tracked: false });

        let mut all = vec![remote, branch, replace, tracked, head, tag, ltag];
        all.sort_by(compare_refs);
        let names: Vec<&str> = all.iter().map(|r| r.name()).collect();
        assert_eq!(
            names,
            ["z-ltag", "z-tag", "z-head", "z-tracked", REPLACED_NAME, "a-branch", "a-remote"]
        );
    }
}
