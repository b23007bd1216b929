use std::fmt;
use std::path::PathBuf;

/// Non-fatal issues met while resolving versions or running the workflow.
/// These are reported to the user and the run continues.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryWarning {
    /// A remote tag that does not look like `<prefix><major>.<minor>.<patch>`
    UnparsableTag { repository: String, tag: String },
    /// The listing-order pick for a major is not its highest semantic version
    ListingOrderMismatch {
        repository: String,
        major: u64,
        picked: String,
        highest: String,
    },
    /// The prepared env file for a checkout does not exist
    MissingEnvFile { repository: String, path: PathBuf },
    /// An external step failed and the workflow carried on
    StepFailed { step: String, reason: String },
}

impl BoundaryWarning {
    pub fn step_failed(step: impl Into<String>, reason: impl fmt::Display) -> Self {
        BoundaryWarning::StepFailed {
            step: step.into(),
            reason: reason.to_string(),
        }
    }
}

impl fmt::Display for BoundaryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryWarning::UnparsableTag { repository, tag } => {
                write!(f, "Ignoring {} tag '{}': not a version tag", repository, tag)
            }
            BoundaryWarning::ListingOrderMismatch {
                repository,
                major,
                picked,
                highest,
            } => write!(
                f,
                "Using {} tag '{}' for major {} (listed last), but '{}' is higher",
                repository, picked, major, highest
            ),
            BoundaryWarning::MissingEnvFile { repository, path } => write!(
                f,
                "Env file '{}' for {} not found; checkout has no .env",
                path.display(),
                repository
            ),
            BoundaryWarning::StepFailed { step, reason } => {
                write!(f, "{} failed, continuing: {}", step, reason)
            }
        }
    }
}
