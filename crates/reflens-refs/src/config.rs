//! Repository and source configuration.
//!
//! Both structs are `#[serde(default)]`, so a TOML file only needs the keys it
//! changes:
//!
//! ```toml
//! [repo]
//! git_dir = "/src/project"
//! remote = "origin/main"
//!
//! [source]
//! git = "/usr/bin/git"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{RefError, Result};

/// Which repository to read and the names used to flag HEAD entries.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepoConfig {
    /// Repository passed to the listing command. `None` makes loading a no-op.
    pub git_dir: Option<PathBuf>,
    /// Remote name compared against `refs/remotes/<X>` to flag the tracked
    /// remote head.
    pub remote: String,
    /// Short name of the checked-out branch if already known. Cleared by a
    /// forced reload.
    pub head: String,
}

/// How the external commands are run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// The git program.
    pub git: String,
    /// Environment variable replacing the whole `ls-remote` command line.
    pub ls_remote_var: String,
    /// Environment variable replacing the whole `symbolic-ref` command line.
    pub symbolic_ref_var: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            git: "git".into(),
            ls_remote_var: "REFLENS_LS_REMOTE".into(),
            symbolic_ref_var: "REFLENS_SYMBOLIC_REF".into(),
        }
    }
}

/// Top-level configuration file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub repo: RepoConfig,
    pub source: SourceConfig,
}

impl Config {
    /// Parse a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| RefError::Config(e.to_string()))
    }

    /// Read and parse a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config() {
        let c = Config::default();
        assert!(c.repo.git_dir.is_none());
        assert!(c.repo.remote.is_empty());
        assert!(c.repo.head.is_empty());
        assert_eq!(c.source.git, "git");
        assert_eq!(c.source.ls_remote_var, "REFLENS_LS_REMOTE");
        assert_eq!(c.source.symbolic_ref_var, "REFLENS_SYMBOLIC_REF");
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let c = Config::from_toml_str(
            r#"
            [repo]
            git_dir = "/src/project"
            remote = "origin"
            "#,
        )
        .unwrap();
        assert_eq!(c.repo.git_dir, Some(PathBuf::from("/src/project")));
        assert_eq!(c.repo.remote, "origin");
        assert_eq!(c.source, SourceConfig::default());
    }

    #[test]
    fn invalid_toml_is_config_error() {
        let err = Config::from_toml_str("[repo\nremote = 1").unwrap_err();
        assert!(matches!(err, RefError::Config(_)));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[source]\ngit = \"/opt/git/bin/git\"").unwrap();

        let c = Config::load(file.path()).unwrap();
        assert_eq!(c.source.git, "/opt/git/bin/git");
        assert_eq!(c.repo, RepoConfig::default());
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, RefError::Io(_)));
    }
}
