use std::collections::BTreeSet;

use crate::domain::VersionTag;
use crate::error::{DeployError, Result};

/// A remote repository and the version tags it exposes, in listing order.
#[derive(Debug, Clone, PartialEq)]
pub struct RepositoryRef {
    pub name: String,
    pub url: String,
    pub tags: Vec<VersionTag>,
}

impl RepositoryRef {
    /// Build from raw tag names, splitting well-formed tags from rejected ones.
    ///
    /// Returns the repository plus the names that could not be parsed.
    pub fn from_listing(
        name: impl Into<String>,
        url: impl Into<String>,
        raw_tags: &[String],
    ) -> (Self, Vec<String>) {
        let mut tags = Vec::with_capacity(raw_tags.len());
        let mut rejected = Vec::new();

        for raw in raw_tags {
            match VersionTag::parse(raw) {
                Ok(tag) => tags.push(tag),
                Err(_) => rejected.push(raw.clone()),
            }
        }

        let repo = RepositoryRef {
            name: name.into(),
            url: url.into(),
            tags,
        };
        (repo, rejected)
    }

    pub fn major_versions(&self) -> BTreeSet<u64> {
        major_versions(&self.tags)
    }

    pub fn latest_for_major(&self, major: u64) -> Result<&VersionTag> {
        latest_for_major(major, &self.tags).map_err(|_| {
            DeployError::version(format!(
                "No {} tag found for major version {}",
                self.name, major
            ))
        })
    }
}

/// A major version both repositories can deploy, with the tag chosen on each side.
#[derive(Debug, Clone, PartialEq)]
pub struct MajorVersionChoice {
    pub major: u64,
    pub frontend: VersionTag,
    pub backend: VersionTag,
}

impl MajorVersionChoice {
    pub fn label(&self) -> String {
        format_choice_label(&self.backend, &self.frontend)
    }
}

/// Major version numbers present in `tags`.
pub fn major_versions(tags: &[VersionTag]) -> BTreeSet<u64> {
    tags.iter().map(VersionTag::major).collect()
}

/// Major versions present in both tag sets.
pub fn common_majors(frontend: &[VersionTag], backend: &[VersionTag]) -> BTreeSet<u64> {
    major_versions(frontend)
        .intersection(&major_versions(backend))
        .copied()
        .collect()
}

/// The last tag in listing order whose major component is `major`.
///
/// Listing order is what the remote returns, so `v1.10.0` only wins over
/// `v1.9.0` when it is listed after it.
pub fn latest_for_major(major: u64, tags: &[VersionTag]) -> Result<&VersionTag> {
    tags.iter()
        .rev()
        .find(|tag| tag.major() == major)
        .ok_or_else(|| DeployError::version(format!("No tag found for major version {}", major)))
}

/// Menu label for a resolved version pair.
pub fn format_choice_label(backend: &VersionTag, frontend: &VersionTag) -> String {
    format!("backend ver: {} - frontend ver: {}", backend, frontend)
}
