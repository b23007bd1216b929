use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};

use crate::docker::ContainerStack;
use crate::error::{DeployError, Result};

/// A mutating call received by [MockStack].
#[derive(Debug, Clone, PartialEq)]
pub enum StackCall {
    Down,
    Up { rebuild: bool },
    ExecShell(String),
    RestoreDump(PathBuf),
    PruneImages,
}

impl StackCall {
    fn kind(&self) -> &'static str {
        match self {
            StackCall::Down => "down",
            StackCall::Up { .. } => "up",
            StackCall::ExecShell(_) => "exec",
            StackCall::RestoreDump(_) => "restore",
            StackCall::PruneImages => "prune",
        }
    }
}

/// Mock stack for testing without a container engine
///
/// Records every mutating call. Pre-flight checks and `running_services` are
/// answered from configuration and not recorded.
pub struct MockStack {
    calls: RefCell<Vec<StackCall>>,
    failing: Vec<&'static str>,
    engine_up: bool,
    orchestrator_present: bool,
    running: Cell<usize>,
    running_after_up: usize,
}

impl MockStack {
    /// A healthy stack that reports `running_after_up` services once started
    pub fn new(running_after_up: usize) -> Self {
        MockStack {
            calls: RefCell::new(Vec::new()),
            failing: Vec::new(),
            engine_up: true,
            orchestrator_present: true,
            running: Cell::new(0),
            running_after_up,
        }
    }

    /// Make calls of one kind (`down`, `up`, `exec`, `restore`, `prune`) fail
    pub fn failing(mut self, kind: &'static str) -> Self {
        self.failing.push(kind);
        self
    }

    pub fn with_engine_down(mut self) -> Self {
        self.engine_up = false;
        self
    }

    pub fn without_orchestrator(mut self) -> Self {
        self.orchestrator_present = false;
        self
    }

    /// Mutating calls received so far, in order
    pub fn calls(&self) -> Vec<StackCall> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: StackCall) -> Result<()> {
        let kind = call.kind();
        self.calls.borrow_mut().push(call);
        if self.failing.contains(&kind) {
            return Err(DeployError::Command {
                command: format!("mock {}", kind),
                code: Some(1),
                stderr: format!("{} failed", kind),
            });
        }
        Ok(())
    }
}

impl ContainerStack for MockStack {
    fn engine_reachable(&self) -> Result<()> {
        if self.engine_up {
            Ok(())
        } else {
            Err(DeployError::preflight("Docker not running"))
        }
    }

    fn orchestrator_installed(&self) -> Result<()> {
        if self.orchestrator_present {
            Ok(())
        } else {
            Err(DeployError::preflight("docker-compose not installed"))
        }
    }

    fn down(&self) -> Result<()> {
        self.record(StackCall::Down)?;
        self.running.set(0);
        Ok(())
    }

    fn up(&self, rebuild: bool) -> Result<()> {
        self.record(StackCall::Up { rebuild })?;
        self.running.set(self.running_after_up);
        Ok(())
    }

    fn running_services(&self) -> Result<usize> {
        Ok(self.running.get())
    }

    fn exec_shell(&self, script: &str) -> Result<()> {
        self.record(StackCall::ExecShell(script.to_string()))
    }

    fn restore_dump(&self, dump_dir: &Path) -> Result<()> {
        self.record(StackCall::RestoreDump(dump_dir.to_path_buf()))
    }

    fn prune_images(&self) -> Result<()> {
        self.record(StackCall::PruneImages)
    }
}
