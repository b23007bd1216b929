use std::path::Path;

use git2::Repository;

use crate::error::{DeployError, Result};
use crate::git::{filter_tag_refs, SourceControl};
use crate::process::Invocation;

/// Real source control over the `git` CLI.
///
/// Remote access goes through `git` itself so `~/.ssh/config`, the SSH agent
/// and credential helpers apply exactly as they do for a manual clone. The
/// resulting checkout is read back with `git2`.
#[derive(Debug, Clone)]
pub struct GitSourceControl {
    git_program: String,
}

impl GitSourceControl {
    pub fn new() -> Self {
        GitSourceControl {
            git_program: "git".to_string(),
        }
    }

    /// Use a specific `git` binary.
    pub fn with_git_program(program: impl Into<String>) -> Self {
        GitSourceControl {
            git_program: program.into(),
        }
    }

    fn git(&self) -> Invocation {
        Invocation::new(&self.git_program)
    }
}

impl Default for GitSourceControl {
    fn default() -> Self {
        Self::new()
    }
}

/// Ref names from `git ls-remote` output (`<oid>\t<ref>` per line).
fn ls_remote_refs(stdout: &str) -> Vec<&str> {
    stdout
        .lines()
        .filter_map(|line| line.split_whitespace().nth(1))
        .collect()
}

/// Short id of the commit checked out in `checkout`.
pub fn checkout_commit(checkout: &Path) -> Result<String> {
    let repo = Repository::open(checkout)?;
    let commit = repo.head()?.peel_to_commit()?;
    let short = commit.as_object().short_id()?;
    Ok(short.as_str().unwrap_or_default().to_string())
}

impl SourceControl for GitSourceControl {
    fn list_tags(&self, url: &str) -> Result<Vec<String>> {
        tracing::debug!(url, "listing remote tags");

        let output = self
            .git()
            .args(["ls-remote", "--tags", url])
            .run()
            .map_err(|e| match e {
                DeployError::Command { stderr, .. } => {
                    DeployError::remote(format!("Cannot reach '{}': {}", url, stderr))
                }
                other => other,
            })?;

        let tags = filter_tag_refs(ls_remote_refs(&output.stdout));
        tracing::debug!(url, count = tags.len(), "remote tags listed");
        Ok(tags)
    }

    fn shallow_clone(&self, url: &str, tag: &str, dest: &Path) -> Result<()> {
        self.git()
            .args(["clone", "-q", "--depth", "1", "--branch", tag, url])
            .arg(dest)
            .run()
            .map_err(|e| match e {
                DeployError::Command { stderr, .. } => DeployError::remote(format!(
                    "Cloning '{}' at {} failed: {}",
                    url, tag, stderr
                )),
                other => other,
            })?;

        let commit = checkout_commit(dest)?;
        tracing::info!(url, tag, commit = %commit, "checked out");
        Ok(())
    }
}
