use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{DeployError, Result};
use crate::git::{filter_tag_refs, SourceControl};

/// A clone requested from [MockSourceControl].
#[derive(Debug, Clone, PartialEq)]
pub struct CloneRecord {
    pub url: String,
    pub tag: String,
    pub dest: PathBuf,
}

/// Mock source control for testing without network access
///
/// Tags are registered per URL in listing order. Clones are recorded and
/// materialised as empty directories so later filesystem steps see a checkout.
pub struct MockSourceControl {
    tags: HashMap<String, Vec<String>>,
    unreachable: Vec<String>,
    failing_clones: Vec<String>,
    clone_files: HashMap<String, Vec<String>>,
    clones: Mutex<Vec<CloneRecord>>,
}

impl MockSourceControl {
    /// Create a new mock without any repositories
    pub fn new() -> Self {
        MockSourceControl {
            tags: HashMap::new(),
            unreachable: Vec::new(),
            failing_clones: Vec::new(),
            clone_files: HashMap::new(),
            clones: Mutex::new(Vec::new()),
        }
    }

    /// Register the tags a remote lists, in listing order
    pub fn with_tags(mut self, url: impl Into<String>, tags: &[&str]) -> Self {
        self.tags
            .insert(url.into(), tags.iter().map(|t| t.to_string()).collect());
        self
    }

    /// Make listing and cloning `url` fail as an unreachable remote
    pub fn with_unreachable(mut self, url: impl Into<String>) -> Self {
        self.unreachable.push(url.into());
        self
    }

    /// Keep listing `url` but fail every clone of it
    pub fn with_failing_clone(mut self, url: impl Into<String>) -> Self {
        self.failing_clones.push(url.into());
        self
    }

    /// Files (relative paths) created in every checkout of `url`
    pub fn with_clone_files(mut self, url: impl Into<String>, files: &[&str]) -> Self {
        self.clone_files
            .insert(url.into(), files.iter().map(|f| f.to_string()).collect());
        self
    }

    /// Clones performed so far, in order
    pub fn clones(&self) -> Vec<CloneRecord> {
        self.clones
            .lock()
            .map(|clones| clones.clone())
            .unwrap_or_default()
    }

    fn check_reachable(&self, url: &str) -> Result<()> {
        if self.unreachable.iter().any(|u| u == url) {
            return Err(DeployError::remote(format!("Cannot reach '{}'", url)));
        }
        Ok(())
    }
}

impl Default for MockSourceControl {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceControl for MockSourceControl {
    fn list_tags(&self, url: &str) -> Result<Vec<String>> {
        self.check_reachable(url)?;
        let refs = self
            .tags
            .get(url)
            .map(|tags| tags.iter().map(|t| format!("refs/tags/{}", t)).collect())
            .unwrap_or_else(Vec::new);
        Ok(filter_tag_refs(refs))
    }

    fn shallow_clone(&self, url: &str, tag: &str, dest: &Path) -> Result<()> {
        self.check_reachable(url)?;

        if self.failing_clones.iter().any(|u| u == url) {
            return Err(DeployError::remote(format!(
                "Cloning '{}' at {} failed",
                url, tag
            )));
        }

        let known = self
            .tags
            .get(url)
            .is_some_and(|tags| tags.iter().any(|t| t == tag));
        if !known {
            return Err(DeployError::remote(format!(
                "Remote branch {} not found in '{}'",
                tag, url
            )));
        }

        fs::create_dir_all(dest)?;
        for file in self.clone_files.get(url).into_iter().flatten() {
            let path = dest.join(file);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, b"")?;
        }

        if let Ok(mut clones) = self.clones.lock() {
            clones.push(CloneRecord {
                url: url.to_string(),
                tag: tag.to_string(),
                dest: dest.to_path_buf(),
            });
        }
        Ok(())
    }
}
