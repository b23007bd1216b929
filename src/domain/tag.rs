use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

use crate::error::{DeployError, Result};

/// Shortest tag name that can carry a version (`v1.0.0`).
pub const MIN_TAG_LEN: usize = 6;

fn version_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?P<prefix>[A-Za-z]+)(?P<major>\d+)\.(?P<rest>\d+\.\d+.*)$")
            .expect("version tag pattern is valid")
    })
}

/// A release tag such as `v2.1.0`, with its major component extracted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionTag {
    name: String,
    major: u64,
}

impl VersionTag {
    /// Parse a tag name of the form `<letters><major>.<minor>.<patch>`.
    pub fn parse(name: &str) -> Result<Self> {
        let captures = version_pattern().captures(name).ok_or_else(|| {
            DeployError::version(format!(
                "'{}' does not look like <prefix><major>.<minor>.<patch>",
                name
            ))
        })?;

        let major = captures["major"].parse::<u64>().map_err(|_| {
            DeployError::version(format!("Invalid major version in '{}'", name))
        })?;

        Ok(VersionTag {
            name: name.to_string(),
            major,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn major(&self) -> u64 {
        self.major
    }

    /// Semantic version of the numeric part, if it is strictly semver.
    ///
    /// `v1.2.3` -> `1.2.3`, `v1.2.3-rc.1` -> `1.2.3-rc.1`, `v1.2.3.4` -> `None`.
    pub fn semver(&self) -> Option<semver::Version> {
        let numeric = self.name.trim_start_matches(|c: char| c.is_ascii_alphabetic());
        semver::Version::parse(numeric).ok()
    }
}

impl fmt::Display for VersionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
