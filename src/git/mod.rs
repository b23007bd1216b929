//! Source control abstraction layer
//!
//! This module provides a trait-based abstraction over the two remote git
//! operations a deployment needs, allowing for a real implementation and a
//! mock implementation for testing.
//!
//! # Overview
//!
//! - [repository::GitSourceControl]: `git ls-remote` and `git clone` through
//!   the `git` CLI, checkout read back with `git2`
//! - [mock::MockSourceControl]: canned tags per URL, records clones
//!
//! ```rust
//! # use portal_deploy::git::SourceControl;
//! # fn example<S: SourceControl>(scm: &S) -> portal_deploy::Result<()> {
//! let tags = scm.list_tags("git@bitbucket.org:employeeportal/backend.git")?;
//! # Ok(())
//! # }
//! ```

pub mod mock;
pub mod repository;

pub use mock::MockSourceControl;
pub use repository::GitSourceControl;

use std::path::Path;

use crate::domain::tag::MIN_TAG_LEN;
use crate::error::Result;

/// Remote git operations used by the deployment workflow.
///
/// ## Error Handling
///
/// An unreachable remote or a failed authentication is reported as
/// [crate::error::DeployError::Remote]; a reachable repository without tags
/// yields an empty list.
pub trait SourceControl: Send + Sync {
    /// List tag names exposed by a remote, in the order the remote lists them.
    ///
    /// Only names of at least six characters (`v1.0.0`) are returned, with
    /// the `refs/tags/` prefix and the peeled `^{}` suffix removed.
    fn list_tags(&self, url: &str) -> Result<Vec<String>>;

    /// Clone `url` at `tag` into `dest` with a depth of one.
    ///
    /// `dest` must not exist yet.
    fn shallow_clone(&self, url: &str, tag: &str, dest: &Path) -> Result<()>;
}

/// Reduce remote ref names to tag names.
///
/// Keeps `refs/tags/*`, strips the prefix and the `^{}` suffix of peeled
/// annotated tags, drops duplicates (first occurrence wins) and names shorter
/// than a minimal version tag.
pub fn filter_tag_refs<I, S>(ref_names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut tags: Vec<String> = Vec::new();

    for ref_name in ref_names {
        let Some(tag) = ref_name.as_ref().strip_prefix("refs/tags/") else {
            continue;
        };
        let tag = tag.strip_suffix("^{}").unwrap_or(tag);

        if tag.len() < MIN_TAG_LEN {
            continue;
        }
        if !tags.iter().any(|seen| seen == tag) {
            tags.push(tag.to_string());
        }
    }

    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_keeps_only_tags() {
        let refs = [
            "HEAD",
            "refs/heads/main",
            "refs/tags/v1.0.0",
            "refs/pull/1/head",
        ];
        assert_eq!(filter_tag_refs(refs), vec!["v1.0.0".to_string()]);
    }

    #[test]
    fn test_filter_merges_peeled_annotated_tags() {
        let refs = ["refs/tags/v1.0.0", "refs/tags/v1.0.0^{}", "refs/tags/v1.1.0^{}"];
        assert_eq!(
            filter_tag_refs(refs),
            vec!["v1.0.0".to_string(), "v1.1.0".to_string()]
        );
    }

    #[test]
    fn test_filter_drops_short_names() {
        let refs = ["refs/tags/v1.0", "refs/tags/v1.0.0", "refs/tags/rc"];
        assert_eq!(filter_tag_refs(refs), vec!["v1.0.0".to_string()]);
    }

    #[test]
    fn test_filter_keeps_listing_order() {
        let refs = ["refs/tags/v2.0.0", "refs/tags/v1.0.0", "refs/tags/v1.5.0"];
        assert_eq!(
            filter_tag_refs(refs),
            vec![
                "v2.0.0".to_string(),
                "v1.0.0".to_string(),
                "v1.5.0".to_string()
            ]
        );
    }

    #[test]
    fn test_filter_empty_listing() {
        assert!(filter_tag_refs(Vec::<String>::new()).is_empty());
    }
}
