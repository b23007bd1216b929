//! Container stack abstraction layer
//!
//! [ContainerStack] covers everything the workflow asks of the container
//! engine: health of the engine itself, the compose lifecycle, and access to
//! the database container.
//!
//! - [compose::ComposeStack]: drives the compose CLI and `docker`
//! - [mock::MockStack]: records mutating calls for tests

pub mod compose;
pub mod mock;

pub use compose::ComposeStack;
pub use mock::{MockStack, StackCall};

use std::path::Path;

use crate::error::Result;

/// Operations on the application stack and its database container.
pub trait ContainerStack {
    /// Fails if the container engine does not answer.
    fn engine_reachable(&self) -> Result<()>;

    /// Fails if the orchestration CLI is not installed.
    fn orchestrator_installed(&self) -> Result<()>;

    /// Stop and remove the stack's containers.
    fn down(&self) -> Result<()>;

    /// Start the stack detached, rebuilding images first when `rebuild` is set.
    fn up(&self, rebuild: bool) -> Result<()>;

    /// Number of stack services currently running.
    fn running_services(&self) -> Result<usize>;

    /// Evaluate a statement with the database shell inside the database container.
    fn exec_shell(&self, script: &str) -> Result<()>;

    /// Copy `dump_dir` into the database container and restore it, dropping
    /// existing collections.
    fn restore_dump(&self, dump_dir: &Path) -> Result<()>;

    /// Remove all local images.
    fn prune_images(&self) -> Result<()>;
}
