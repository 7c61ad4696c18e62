//! Reference name classification.
//!
//! A listing line carries a full ref name such as `refs/heads/main`. The
//! classifier maps it to a [`RefKind`], the short display name and the id the
//! registry should record. Prefix rules are tried in order:
//!
//! 1. `refs/tags/<X>`: tag; a trailing `^{}` marks the peeled commit id
//! 2. `refs/remotes/<X>`: remote; tracked when `<X>` equals the remote name
//! 3. `refs/replace/<X>`: replacement; `<X>` becomes the recorded id
//! 4. `refs/heads/<X>`: branch; head when `<X>` equals the head name
//!
//! then the literal `HEAD`, and finally everything else under its full name.

use crate::types::{RefKind, REPLACED_NAME};

pub const TAGS_PREFIX: &str = "refs/tags/";
pub const REMOTES_PREFIX: &str = "refs/remotes/";
pub const REPLACE_PREFIX: &str = "refs/replace/";
pub const HEADS_PREFIX: &str = "refs/heads/";
pub const PEELED_SUFFIX: &str = "^{}";
pub const HEAD: &str = "HEAD";

/// Names the classifier compares against.
#[derive(Clone, Copy, Debug, Default)]
pub struct RefContext<'a> {
    /// Remote (tracking) name; an exact match flags the tracked remote head.
    pub remote: &'a str,
    /// Short name of the checked-out branch, empty when unknown or detached.
    pub head: &'a str,
}

impl<'a> RefContext<'a> {
    pub fn new(remote: &'a str, head: &'a str) -> Self {
        Self { remote, head }
    }
}

/// A classified listing line, borrowing from the input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClassifiedRef<'a> {
    pub kind: RefKind,
    pub name: &'a str,
    pub id: &'a str,
    /// For replacements, the id supplied on the line.
    pub replaced_by: Option<&'a str>,
}

/// Outcome of classifying one line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Classification<'a> {
    Ref(ClassifiedRef<'a>),
    /// A `HEAD` line while the symbolic head is already known.
    Ignored,
}

type PrefixRule = for<'a> fn(&'a str, &'a str, &RefContext<'_>) -> Classification<'a>;

const PREFIX_RULES: [(&str, PrefixRule); 4] = [
    (TAGS_PREFIX, classify_tag),
    (REMOTES_PREFIX, classify_remote),
    (REPLACE_PREFIX, classify_replace),
    (HEADS_PREFIX, classify_branch),
];

/// Classify a full ref name with the id it was listed with.
///
/// # Examples
///
/// ```
/// use reflens_refs::names::{classify, Classification, RefContext};
/// use reflens_refs::RefKind;
///
/// let ctx = RefContext::new("origin", "main");
/// let Classification::Ref(r) = classify("aaaa", "refs/heads/main", &ctx) else {
///     panic!("branch lines are never ignored");
/// };
/// assert_eq!(r.name, "main");
/// assert_eq!(r.kind, RefKind::Branch { head: true });
/// ```
pub fn classify<'a>(id: &'a str, name: &'a str, ctx: &RefContext<'_>) -> Classification<'a> {
    for (prefix, rule) in PREFIX_RULES {
        if let Some(rest) = name.strip_prefix(prefix) {
            return rule(id, rest, ctx);
        }
    }

    if name == HEAD {
        // HEAD is listed as a plain ref while detached, e.g. during a rebase.
        if !ctx.head.is_empty() {
            return Classification::Ignored;
        }
        return plain(RefKind::DetachedHead, name, id);
    }

    plain(RefKind::Other, name, id)
}

fn plain<'a>(kind: RefKind, name: &'a str, id: &'a str) -> Classification<'a> {
    Classification::Ref(ClassifiedRef {
        kind,
        name,
        id,
        replaced_by: None,
    })
}

fn classify_tag<'a>(id: &'a str, rest: &'a str, _ctx: &RefContext<'_>) -> Classification<'a> {
    match rest.strip_suffix(PEELED_SUFFIX) {
        Some(name) => plain(RefKind::Tag { peeled: true }, name, id),
        None => plain(RefKind::Tag { peeled: false }, rest, id),
    }
}

fn classify_remote<'a>(id: &'a str, rest: &'a str, ctx: &RefContext<'_>) -> Classification<'a> {
    let tracked = rest == ctx.remote;
    plain(RefKind::Remote { tracked }, rest, id)
}

fn classify_replace<'a>(id: &'a str, rest: &'a str, _ctx: &RefContext<'_>) -> Classification<'a> {
    Classification::Ref(ClassifiedRef {
        kind: RefKind::Replace,
        name: REPLACED_NAME,
        id: rest,
        replaced_by: Some(id),
    })
}

fn classify_branch<'a>(id: &'a str, rest: &'a str, ctx: &RefContext<'_>) -> Classification<'a> {
    let head = rest == ctx.head;
    plain(RefKind::Branch { head }, rest, id)
}

/// Strip `refs/heads/` from a symbolic-ref target, leaving other targets as is.
pub fn short_head_name(target: &str) -> &str {
    target.strip_prefix(HEADS_PREFIX).unwrap_or(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classified<'a>(id: &'a str, name: &'a str, ctx: &RefContext<'_>) -> ClassifiedRef<'a> {
        match classify(id, name, ctx) {
            Classification::Ref(r) => r,
            Classification::Ignored => panic!("{name} was ignored"),
        }
    }

    #[test]
    fn annotated_tag() {
        let r = classified("cccc", "refs/tags/v1", &RefContext::default());
        assert_eq!(r.kind, RefKind::Tag { peeled: false });
        assert_eq!(r.name, "v1");
        assert_eq!(r.id, "cccc");
    }

    #[test]
    fn peeled_tag_strips_suffix() {
        let r = classified("bbbb", "refs/tags/v1^{}", &RefContext::default());
        assert_eq!(r.kind, RefKind::Tag { peeled: true });
        assert_eq!(r.name, "v1");
        assert_eq!(r.id, "bbbb");
    }

    #[test]
    fn tracked_remote_head_is_exact_match() {
        let ctx = RefContext::new("origin", "");
        let r = classified("dddd", "refs/remotes/origin", &ctx);
        assert_eq!(r.kind, RefKind::Remote { tracked: true });
        assert_eq!(r.name, "origin");

        let r = classified("eeee", "refs/remotes/origin/feature", &ctx);
        assert_eq!(r.kind, RefKind::Remote { tracked: false });
        assert_eq!(r.name, "origin/feature");
    }

    #[test]
    fn replacement_uses_replaced_object_as_id() {
        let r = classified("ffff", "refs/replace/aaaa", &RefContext::default());
        assert_eq!(r.kind, RefKind::Replace);
        assert_eq!(r.name, REPLACED_NAME);
        assert_eq!(r.id, "aaaa");
        assert_eq!(r.replaced_by, Some("ffff"));
    }

    #[test]
    fn branch_head_flag() {
        let ctx = RefContext::new("", "main");
        assert_eq!(
            classified("aaaa", "refs/heads/main", &ctx).kind,
            RefKind::Branch { head: true }
        );
        assert_eq!(
            classified("aaaa", "refs/heads/main2", &ctx).kind,
            RefKind::Branch { head: false }
        );
        assert_eq!(
            classified("aaaa", "refs/heads/mai", &ctx).kind,
            RefKind::Branch { head: false }
        );
    }

    #[test]
    fn head_line_ignored_when_symbolic_head_known() {
        let ctx = RefContext::new("", "main");
        assert_eq!(classify("aaaa", "HEAD", &ctx), Classification::Ignored);
    }

    #[test]
    fn detached_head() {
        let r = classified("aaaa", "HEAD", &RefContext::default());
        assert_eq!(r.kind, RefKind::DetachedHead);
        assert_eq!(r.name, "HEAD");
    }

    #[test]
    fn unknown_names_kept_whole() {
        let r = classified("aaaa", "refs/notes/commits", &RefContext::default());
        assert_eq!(r.kind, RefKind::Other);
        assert_eq!(r.name, "refs/notes/commits");

        let r = classified("aaaa", "", &RefContext::default());
        assert_eq!(r.kind, RefKind::Other);
        assert_eq!(r.name, "");
    }

    #[test]
    fn tags_win_over_later_rules() {
        // A tag named like a branch path is still a tag.
        let r = classified("aaaa", "refs/tags/refs/heads/main", &RefContext::new("", "main"));
        assert_eq!(r.kind, RefKind::Tag { peeled: false });
        assert_eq!(r.name, "refs/heads/main");
    }

    #[test]
    fn short_head_names() {
        assert_eq!(short_head_name("refs/heads/main"), "main");
        assert_eq!(short_head_name("refs/heads/feature/x"), "feature/x");
        assert_eq!(short_head_name("refs/remotes/origin/main"), "refs/remotes/origin/main");
    }
}
