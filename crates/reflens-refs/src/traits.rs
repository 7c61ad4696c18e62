//! The [`RefSource`] trait: where reference listings come from.
//!
//! The database never enumerates references itself. It asks a source for the
//! repository's symbolic HEAD and for a line-oriented listing of
//! `<hex-id>\t<full-ref-name>` records, as printed by `git ls-remote`.

use std::path::Path;

use crate::error::Result;

/// Authoritative origin of reference listings.
pub trait RefSource {
    /// Target of the symbolic HEAD (e.g. `refs/heads/main`).
    ///
    /// Returns `Ok(None)` when HEAD is detached or cannot be resolved; that is
    /// not an error.
    fn symbolic_head(&self, git_dir: &Path) -> Result<Option<String>>;

    /// The full reference listing.
    ///
    /// Fails with [`RefError::SourceUnavailable`](crate::RefError::SourceUnavailable)
    /// only when the listing could not be produced at all.
    fn list_refs(&self, git_dir: &Path) -> Result<String>;
}

impl<S: RefSource + ?Sized> RefSource for &S {
    fn symbolic_head(&self, git_dir: &Path) -> Result<Option<String>> {
        (**self).symbolic_head(git_dir)
    }

    fn list_refs(&self, git_dir: &Path) -> Result<String> {
        (**self).list_refs(git_dir)
    }
}

impl<S: RefSource + ?Sized> RefSource for Box<S> {
    fn symbolic_head(&self, git_dir: &Path) -> Result<Option<String>> {
        (**self).symbolic_head(git_dir)
    }

    fn list_refs(&self, git_dir: &Path) -> Result<String> {
        (**self).list_refs(git_dir)
    }
}

/// Split one listing line into `(id, name)` at the first TAB.
///
/// A trailing `\r` is dropped and blank lines yield `None`. A line without a
/// TAB is kept whole as the id with an empty name.
pub fn parse_line(line: &str) -> Option<(&str, &str)> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    if line.trim().is_empty() {
        return None;
    }
    Some(line.split_once('\t').unwrap_or((line, "")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tab_separated_lines() {
        assert_eq!(
            parse_line("aaaa\trefs/heads/main"),
            Some(("aaaa", "refs/heads/main"))
        );
        assert_eq!(
            parse_line("aaaa\trefs/heads/main\r"),
            Some(("aaaa", "refs/heads/main"))
        );
    }

    #[test]
    fn splits_on_first_tab_only() {
        assert_eq!(parse_line("aaaa\tname\twith tab"), Some(("aaaa", "name\twith tab")));
    }

    #[test]
    fn malformed_lines_are_kept() {
        assert_eq!(parse_line("garbage"), Some(("garbage", "")));
        assert_eq!(parse_line(""), None);
        assert_eq!(parse_line("   "), None);
    }
}
