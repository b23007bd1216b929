use thiserror::Error;

/// Unified error type for portal-deploy operations
#[derive(Error, Debug)]
pub enum DeployError {
    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Pre-flight check failed: {0}")]
    Preflight(String),

    #[error("Remote operation failed: {0}")]
    Remote(String),

    #[error("Version error: {0}")]
    Version(String),

    #[error("No compatible version found between frontend and backend")]
    NoCompatibleVersion,

    #[error("Command `{command}` failed with exit code {}: {stderr}", describe_code(.code))]
    Command {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("Failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Stack is not healthy: expected {expected} running services, found {running}")]
    Unhealthy { expected: usize, running: usize },

    #[error("Prompt error: {0}")]
    Prompt(String),

    #[error("Aborted.")]
    Aborted,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn describe_code(code: &Option<i32>) -> String {
    code.map_or_else(|| "none".to_string(), |c| c.to_string())
}

/// Convenience type alias for Results in portal-deploy
pub type Result<T> = std::result::Result<T, DeployError>;

impl DeployError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        DeployError::Config(msg.into())
    }

    /// Create a pre-flight error with context
    pub fn preflight(msg: impl Into<String>) -> Self {
        DeployError::Preflight(msg.into())
    }

    /// Create a remote error with context
    pub fn remote(msg: impl Into<String>) -> Self {
        DeployError::Remote(msg.into())
    }

    /// Create a version error with context
    pub fn version(msg: impl Into<String>) -> Self {
        DeployError::Version(msg.into())
    }

    /// Create a prompt error with context
    pub fn prompt(msg: impl Into<String>) -> Self {
        DeployError::Prompt(msg.into())
    }
}
