use std::path::{Path, PathBuf};

use crate::config::{Config, DatabaseConfig, StackConfig};
use crate::docker::ContainerStack;
use crate::error::{DeployError, Result};
use crate::process::Invocation;

/// Path of the dump inside the database container.
const CONTAINER_DUMP_PATH: &str = "/dump";

/// Real stack backed by the compose CLI and the `docker` binary.
#[derive(Debug, Clone)]
pub struct ComposeStack {
    stack: StackConfig,
    database: DatabaseConfig,
    workdir: PathBuf,
    docker_program: String,
}

impl ComposeStack {
    pub fn new(config: &Config) -> Self {
        ComposeStack {
            stack: config.stack.clone(),
            database: config.database.clone(),
            workdir: config.workdir.clone(),
            docker_program: "docker".to_string(),
        }
    }

    fn compose(&self) -> Result<Invocation> {
        Ok(Invocation::from_prefix(&self.stack.compose_command)?
            .arg("-f")
            .arg(&self.stack.compose_file)
            .current_dir(&self.workdir))
    }

    fn docker(&self) -> Invocation {
        Invocation::new(&self.docker_program)
    }
}

impl ContainerStack for ComposeStack {
    fn engine_reachable(&self) -> Result<()> {
        self.docker()
            .arg("info")
            .run()
            .map(|_| ())
            .map_err(|e| DeployError::preflight(format!("Docker not running: {}", e)))
    }

    fn orchestrator_installed(&self) -> Result<()> {
        Invocation::from_prefix(&self.stack.compose_command)?
            .arg("--version")
            .run()
            .map(|_| ())
            .map_err(|e| {
                DeployError::preflight(format!(
                    "{} not installed: {}",
                    self.stack.compose_command.join(" "),
                    e
                ))
            })
    }

    fn down(&self) -> Result<()> {
        self.compose()?.arg("down").run()?;
        Ok(())
    }

    fn up(&self, rebuild: bool) -> Result<()> {
        let mut invocation = self.compose()?.args(["up", "-d"]);
        if rebuild {
            invocation = invocation.arg("--build");
        }
        invocation.run()?;
        Ok(())
    }

    fn running_services(&self) -> Result<usize> {
        let output = self
            .compose()?
            .args(["ps", "--services", "--filter", "status=running"])
            .run()?;
        Ok(output.lines().len())
    }

    fn exec_shell(&self, script: &str) -> Result<()> {
        self.docker()
            .args([
                "exec",
                self.database.container.as_str(),
                self.database.shell.as_str(),
                self.database.uri.as_str(),
                "--quiet",
                "--eval",
                script,
            ])
            .run()?;
        Ok(())
    }

    fn restore_dump(&self, dump_dir: &Path) -> Result<()> {
        let target = format!("{}:{}", self.database.container, CONTAINER_DUMP_PATH);
        self.docker().arg("cp").arg(dump_dir).arg(target).run()?;

        self.docker()
            .args([
                "exec",
                self.database.container.as_str(),
                self.database.restore_tool.as_str(),
                "--username",
                self.database.username.as_str(),
                "--password",
                self.database.password.as_str(),
                "--authenticationDatabase",
                self.database.auth_database.as_str(),
                "--db",
                self.database.name.as_str(),
                "--drop",
                CONTAINER_DUMP_PATH,
            ])
            .run()?;
        Ok(())
    }

    fn prune_images(&self) -> Result<()> {
        let listing = self.docker().args(["images", "-q"]).run()?;
        let mut ids = listing.lines();
        ids.sort_unstable();
        ids.dedup();
        if ids.is_empty() {
            tracing::debug!("no images to remove");
            return Ok(());
        }
        self.docker().arg("rmi").args(ids).run()?;
        Ok(())
    }
}
