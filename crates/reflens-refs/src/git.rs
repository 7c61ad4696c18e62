//! [`RefSource`] backed by the `git` command line.

use std::ffi::OsString;
use std::path::Path;
use std::process::{Command, Output};

use tracing::{debug, warn};

use crate::config::SourceConfig;
use crate::error::{RefError, Result};
use crate::traits::RefSource;

/// Runs `git symbolic-ref HEAD` and `git ls-remote <dir>`.
///
/// Either command line can be replaced wholesale through an environment
/// variable named in [`SourceConfig`]. The variables are read once, when the
/// source is built.
#[derive(Clone, Debug)]
pub struct GitCommandSource {
    git: String,
    symbolic_ref_override: Option<Vec<String>>,
    ls_remote_override: Option<Vec<String>>,
}

impl GitCommandSource {
    /// Build a source, consulting the override variables.
    pub fn new(config: &SourceConfig) -> Result<Self> {
        Ok(Self {
            git: config.git.clone(),
            symbolic_ref_override: argv_from_env(&config.symbolic_ref_var)?,
            ls_remote_override: argv_from_env(&config.ls_remote_var)?,
        })
    }

    /// Build a source that ignores the environment.
    pub fn with_program(git: impl Into<String>) -> Self {
        Self {
            git: git.into(),
            symbolic_ref_override: None,
            ls_remote_override: None,
        }
    }

    fn symbolic_ref_argv(&self, git_dir: &Path) -> Vec<OsString> {
        match &self.symbolic_ref_override {
            Some(argv) => argv.iter().map(OsString::from).collect(),
            None => vec![
                self.git.clone().into(),
                "-C".into(),
                git_dir.into(),
                "symbolic-ref".into(),
                "HEAD".into(),
            ],
        }
    }

    fn ls_remote_argv(&self, git_dir: &Path) -> Vec<OsString> {
        match &self.ls_remote_override {
            Some(argv) => argv.iter().map(OsString::from).collect(),
            None => vec![self.git.clone().into(), "ls-remote".into(), git_dir.into()],
        }
    }
}

impl Default for GitCommandSource {
    fn default() -> Self {
        Self::with_program("git")
    }
}

impl RefSource for GitCommandSource {
    fn symbolic_head(&self, git_dir: &Path) -> Result<Option<String>> {
        let argv = self.symbolic_ref_argv(git_dir);
        let output = match run(&argv) {
            Ok(output) => output,
            Err(e) => {
                warn!(command = %display_argv(&argv), error = %e, "cannot resolve symbolic HEAD");
                return Ok(None);
            }
        };
        if !output.status.success() {
            debug!(status = %output.status, "HEAD is not a symbolic ref");
            return Ok(None);
        }
        let target = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok((!target.is_empty()).then_some(target))
    }

    fn list_refs(&self, git_dir: &Path) -> Result<String> {
        let argv = self.ls_remote_argv(git_dir);
        let output = run(&argv).map_err(|e| RefError::SourceUnavailable {
            command: display_argv(&argv),
            reason: e.to_string(),
        })?;
        if !output.status.success() {
            return Err(RefError::SourceUnavailable {
                command: display_argv(&argv),
                reason: format!(
                    "{}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

fn run(argv: &[OsString]) -> std::io::Result<Output> {
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command"))?;
    Command::new(program).args(args).output()
}

fn display_argv(argv: &[OsString]) -> String {
    argv.iter()
        .map(|arg| arg.to_string_lossy())
        .collect::<Vec<_>>()
        .join(" ")
}

fn argv_from_env(var: &str) -> Result<Option<Vec<String>>> {
    match std::env::var(var) {
        Ok(value) => split_argv(var, &value).map(Some),
        Err(_) => Ok(None),
    }
}

/// Split an override value on whitespace.
fn split_argv(var: &str, value: &str) -> Result<Vec<String>> {
    let argv: Vec<String> = value.split_whitespace().map(str::to_string).collect();
    if argv.is_empty() {
        return Err(RefError::InvalidCommand { var: var.into() });
    }
    Ok(argv)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MISSING: &str = "reflens-test-no-such-program";

    #[test]
    fn default_command_lines() {
        let source = GitCommandSource::default();
        let dir = Path::new("/src/project");
        assert_eq!(
            display_argv(&source.ls_remote_argv(dir)),
            "git ls-remote /src/project"
        );
        assert_eq!(
            display_argv(&source.symbolic_ref_argv(dir)),
            "git -C /src/project symbolic-ref HEAD"
        );
    }

    #[test]
    fn override_replaces_whole_command() {
        let source = GitCommandSource {
            git: "git".into(),
            symbolic_ref_override: None,
            ls_remote_override: Some(split_argv("V", "cat  refs.txt").unwrap()),
        };
        assert_eq!(
            display_argv(&source.ls_remote_argv(Path::new("ignored"))),
            "cat refs.txt"
        );
    }

    #[test]
    fn blank_override_is_rejected() {
        let err = split_argv("REFLENS_LS_REMOTE", "   ").unwrap_err();
        assert!(matches!(err, RefError::InvalidCommand { ref var } if var == "REFLENS_LS_REMOTE"));
    }

    #[test]
    fn missing_program_makes_listing_unavailable() {
        let source = GitCommandSource::with_program(MISSING);
        let err = source.list_refs(Path::new(".")).unwrap_err();
        match err {
            RefError::SourceUnavailable { command, .. } => {
                assert!(command.starts_with(MISSING));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_program_leaves_head_unresolved() {
        let source = GitCommandSource::with_program(MISSING);
        assert_eq!(source.symbolic_head(Path::new(".")).unwrap(), None);
    }
}
