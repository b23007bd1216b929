use std::fmt;
use std::path::PathBuf;

use crate::boundary::BoundaryWarning;
use crate::domain::MajorVersionChoice;

/// Where a database dump is restored from.
#[derive(Debug, Clone, PartialEq)]
pub enum DumpSource {
    /// A dump directory on the local filesystem.
    Local(PathBuf),
    /// An entry of the dump archive checkout, a directory or a `.zip` file.
    Archive(PathBuf),
}

impl DumpSource {
    pub fn path(&self) -> &PathBuf {
        match self {
            DumpSource::Local(path) | DumpSource::Archive(path) => path,
        }
    }

    pub fn is_zip(&self) -> bool {
        self.path()
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"))
    }
}

impl fmt::Display for DumpSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DumpSource::Local(path) => write!(f, "{}", path.display()),
            DumpSource::Archive(path) => write!(f, "archive entry {}", path.display()),
        }
    }
}

/// What happened during one `deploy` run.
#[derive(Debug, Clone, PartialEq)]
pub struct DeploymentSession {
    pub choice: MajorVersionChoice,
    pub rebuild: bool,
    pub migrations_applied: bool,
    pub restored_dump: Option<DumpSource>,
    pub warnings: Vec<BoundaryWarning>,
}

impl DeploymentSession {
    pub fn new(choice: MajorVersionChoice) -> Self {
        DeploymentSession {
            choice,
            rebuild: false,
            migrations_applied: false,
            restored_dump: None,
            warnings: Vec::new(),
        }
    }
}

/// What happened during one `destroy` run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DestroyReport {
    pub images_pruned: bool,
    pub workdir_cleaned: bool,
    pub warnings: Vec<BoundaryWarning>,
}
