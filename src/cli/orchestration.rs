//! Deploy and destroy workflows
//!
//! [Deployer] sequences the steps of a deployment against injected
//! capabilities: remote git access ([SourceControl]), the container stack
//! ([ContainerStack]) and operator decisions ([Prompter]). `main` only wires
//! the real implementations in; tests wire in the mocks.
//!
//! Step failures follow one policy. Anything that would leave the stack
//! running the wrong code aborts: pre-flight, version resolution, fetching,
//! `up` and the health check. Everything after that, plus `down`, is
//! reported as a [BoundaryWarning] and the run carries on.

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use crate::boundary::BoundaryWarning;
use crate::config::Config;
use crate::docker::ContainerStack;
use crate::domain::{DeploymentSession, DestroyReport, DumpSource, MajorVersionChoice};
use crate::error::{DeployError, Result};
use crate::git::SourceControl;
use crate::resolver::{Resolution, VersionResolver};
use crate::ui::{self, Prompter};
use crate::workspace::{self, Workspace};

pub const PROMPT_USE_LATEST: &str = "Deploy the latest compatible version";
pub const PROMPT_SELECT_VERSION: &str = "Which version do you want to deploy?";
pub const PROMPT_NEW_BUILD: &str = "Do you want to use new build?";
pub const PROMPT_MIGRATION_FIXES: &str = "Do you want to run migration fixes?";
pub const PROMPT_RESTORE_ARCHIVE: &str = "Do you want to restore data from the dump archive?";
pub const PROMPT_SELECT_DUMP: &str = "Which dump do you want to restore?";
pub const PROMPT_DESTROY: &str = "Are you sure you want to destroy docker containers?";
pub const PROMPT_PRUNE_IMAGES: &str = "Do you want to delete docker images?";
pub const PROMPT_CLEAN_WORKDIR: &str = "Do you want to clean work directory?";

/// Directory inside the archive checkout that zipped dumps are extracted to.
const UNPACK_DIR: &str = ".unpacked";

/// Runs the deployment workflows for one configuration.
pub struct Deployer<'a, S: SourceControl, C: ContainerStack, P: Prompter> {
    config: &'a Config,
    source: &'a S,
    stack: &'a C,
    prompter: &'a P,
    workspace: Workspace,
}

impl<'a, S: SourceControl, C: ContainerStack, P: Prompter> Deployer<'a, S, C, P> {
    pub fn new(config: &'a Config, source: &'a S, stack: &'a C, prompter: &'a P) -> Self {
        Deployer {
            config,
            source,
            stack,
            prompter,
            workspace: Workspace::from_config(config),
        }
    }

    /// Deploy a compatible frontend/backend pair and prepare its data.
    ///
    /// Returns what was done, including every warning raised on the way.
    pub fn deploy(&self) -> Result<DeploymentSession> {
        self.preflight()?;

        ui::display_status("Checking available versions...");
        let resolution = self.resolve()?;
        let choice = self.select_version(&resolution)?;

        ui::display_header(&format!("Deploying {}", choice.label()));
        let mut session = DeploymentSession::new(choice.clone());
        session.warnings.extend(resolution.warnings.iter().cloned());

        self.fetch(&choice, &mut session.warnings)?;

        session.rebuild = self.prompter.confirm(PROMPT_NEW_BUILD, true)?;
        self.bring_stack_down(&mut session.warnings);
        self.bring_stack_up(session.rebuild)?;
        self.health_check()?;

        if !self.config.migrations.is_empty()
            && self.prompter.confirm(PROMPT_MIGRATION_FIXES, true)?
        {
            session.migrations_applied = self.apply_migration_fixes(&mut session.warnings);
        }

        if let Some(source) = self.choose_dump_source(&mut session.warnings)? {
            if self.restore_dump(&source, &mut session.warnings) {
                session.restored_dump = Some(source);
            }
        }

        ui::display_success("Your application is ready to use.");
        tracing::info!(
            major = choice.major,
            warnings = session.warnings.len(),
            "deployment finished"
        );
        Ok(session)
    }

    /// Tear the stack down, optionally pruning images and checkouts.
    ///
    /// Declining the first confirmation returns [DeployError::Aborted]
    /// before anything is touched.
    pub fn destroy(&self) -> Result<DestroyReport> {
        if !self.prompter.confirm(PROMPT_DESTROY, false)? {
            return Err(DeployError::Aborted);
        }
        self.preflight()?;

        let mut report = DestroyReport::default();
        self.bring_stack_down(&mut report.warnings);

        if self.prompter.confirm(PROMPT_PRUNE_IMAGES, true)? {
            ui::display_status("Deleting docker images...");
            match self.stack.prune_images() {
                Ok(()) => report.images_pruned = true,
                Err(e) => self.warn(
                    BoundaryWarning::step_failed("Image prune", e),
                    &mut report.warnings,
                ),
            }
        }

        if self.prompter.confirm(PROMPT_CLEAN_WORKDIR, true)? {
            ui::display_status("Cleaning work directory...");
            let repos = &self.config.repositories;
            match self.workspace.clean(&[&repos.backend, &repos.frontend]) {
                Ok(()) => report.workdir_cleaned = true,
                Err(e) => self.warn(
                    BoundaryWarning::step_failed("Work directory clean", e),
                    &mut report.warnings,
                ),
            }
        }

        ui::display_success("Docker containers destroyed.");
        tracing::info!(
            images_pruned = report.images_pruned,
            workdir_cleaned = report.workdir_cleaned,
            "destroy finished"
        );
        Ok(report)
    }

    /// Verify the host can run the stack before anything is changed.
    pub fn preflight(&self) -> Result<()> {
        let compose_file = self.workspace.path(&self.config.stack.compose_file);
        if !compose_file.is_file() {
            return Err(DeployError::preflight(format!(
                "compose file '{}' not found",
                compose_file.display()
            )));
        }

        self.workspace.ensure_dir(&self.config.stack.volume_root)?;
        self.stack.engine_reachable()?;
        self.stack.orchestrator_installed()?;

        tracing::debug!("pre-flight checks passed");
        Ok(())
    }

    pub fn resolve(&self) -> Result<Resolution> {
        let repos = &self.config.repositories;
        let resolution =
            VersionResolver::new(self.source).resolve(&repos.frontend, &repos.backend)?;
        for warning in &resolution.warnings {
            ui::display_boundary_warning(warning);
        }
        Ok(resolution)
    }

    /// Offer the newest pair first, then the full list.
    pub fn select_version(&self, resolution: &Resolution) -> Result<MajorVersionChoice> {
        let latest = resolution.latest().ok_or(DeployError::NoCompatibleVersion)?;

        let prompt = format!("{} ({})?", PROMPT_USE_LATEST, latest.label());
        if self.prompter.confirm(&prompt, true)? {
            tracing::info!(major = latest.major, "deploying latest compatible version");
            return Ok(latest.clone());
        }

        let labels = resolution.labels();
        let index = self
            .prompter
            .select(PROMPT_SELECT_VERSION, &labels, labels.len() - 1)?;
        let choice = resolution
            .choices
            .get(index)
            .ok_or_else(|| DeployError::prompt(format!("no version at position {}", index)))?;

        tracing::info!(major = choice.major, "deploying selected version");
        Ok(choice.clone())
    }

    /// Replace both checkouts with fresh clones at the chosen tags.
    pub fn fetch(
        &self,
        choice: &MajorVersionChoice,
        warnings: &mut Vec<BoundaryWarning>,
    ) -> Result<()> {
        let repos = &self.config.repositories;
        let targets = [
            (&repos.backend, &choice.backend),
            (&repos.frontend, &choice.frontend),
        ];

        for (repo, tag) in targets {
            ui::display_status(&format!("Cloning {} {}...", repo.name, tag));
            self.workspace.reset_checkout(repo)?;
            self.source
                .shallow_clone(&repo.url, tag.name(), &self.workspace.checkout_path(repo))?;
        }

        for (repo, _) in targets {
            if let Some(warning) = self.workspace.install_env_file(repo)? {
                self.warn(warning, warnings);
            }
        }
        Ok(())
    }

    pub fn bring_stack_down(&self, warnings: &mut Vec<BoundaryWarning>) {
        ui::display_status("Stopping containers...");
        if let Err(e) = self.stack.down() {
            self.warn(BoundaryWarning::step_failed("Stack down", e), warnings);
        }
    }

    pub fn bring_stack_up(&self, rebuild: bool) -> Result<()> {
        ui::display_status(if rebuild {
            "Building and starting containers..."
        } else {
            "Starting containers..."
        });
        self.stack.up(rebuild)
    }

    /// Compare the running service count with the configured expectation.
    pub fn health_check(&self) -> Result<()> {
        let expected = self.config.stack.expected_services;
        if expected == 0 {
            return Ok(());
        }

        let delay = self.config.stack.health_delay_secs;
        if delay > 0 {
            ui::display_status(&format!("Waiting {}s for services to settle...", delay));
            thread::sleep(Duration::from_secs(delay));
        }

        let running = self.stack.running_services()?;
        tracing::debug!(expected, running, "health check");
        if running != expected {
            return Err(DeployError::Unhealthy { expected, running });
        }
        Ok(())
    }

    /// Run every configured fix; returns whether all of them succeeded.
    pub fn apply_migration_fixes(&self, warnings: &mut Vec<BoundaryWarning>) -> bool {
        let mut all_applied = true;
        for fix in &self.config.migrations {
            ui::display_status(&format!("Applying fix {}", fix));
            if let Err(e) = self.stack.exec_shell(&fix.to_script()) {
                self.warn(
                    BoundaryWarning::step_failed(format!("Migration fix {}", fix), e),
                    warnings,
                );
                all_applied = false;
            }
        }
        all_applied
    }

    /// Ask where to restore data from, if anywhere.
    ///
    /// A local dump directory takes precedence; the dump archive is only
    /// offered when there is none.
    pub fn choose_dump_source(
        &self,
        warnings: &mut Vec<BoundaryWarning>,
    ) -> Result<Option<DumpSource>> {
        let local = self.config.dump.local_path();
        if local.is_dir() {
            let prompt = format!(
                "Do you want to restore data using dump data in {}?",
                local.display()
            );
            return Ok(self
                .prompter
                .confirm(&prompt, false)?
                .then_some(DumpSource::Local(local)));
        }

        let Some(archive_url) = self.config.dump.archive_repo.as_deref() else {
            tracing::debug!(dir = %local.display(), "no dump directory, skipping restore");
            return Ok(None);
        };
        if !self.prompter.confirm(PROMPT_RESTORE_ARCHIVE, false)? {
            return Ok(None);
        }

        let checkout = self.workspace.path(&self.config.dump.archive_checkout);
        let fetched = workspace::remove_dir_if_exists(&checkout).and_then(|_| {
            self.source
                .shallow_clone(archive_url, &self.config.dump.archive_ref, &checkout)
        });
        if let Err(e) = fetched {
            self.warn(BoundaryWarning::step_failed("Dump archive clone", e), warnings);
            return Ok(None);
        }

        let entries = workspace::archive_entries(&checkout)?;
        if entries.is_empty() {
            self.warn(
                BoundaryWarning::step_failed("Dump archive", "no dumps found"),
                warnings,
            );
            return Ok(None);
        }

        let names: Vec<String> = entries
            .iter()
            .map(|path| {
                path.file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string())
            })
            .collect();
        let index = self
            .prompter
            .select(PROMPT_SELECT_DUMP, &names, names.len() - 1)?;

        let entry = entries
            .into_iter()
            .nth(index)
            .ok_or_else(|| DeployError::prompt(format!("no dump at position {}", index)))?;
        Ok(Some(DumpSource::Archive(entry)))
    }

    /// Restore `source` into the database container; returns whether it worked.
    pub fn restore_dump(&self, source: &DumpSource, warnings: &mut Vec<BoundaryWarning>) -> bool {
        ui::display_status(&format!("Restoring dump from {}...", source));
        let restored = self
            .dump_dir(source)
            .and_then(|dir| self.stack.restore_dump(&dir));

        match restored {
            Ok(()) => true,
            Err(e) => {
                self.warn(BoundaryWarning::step_failed("Dump restore", e), warnings);
                false
            }
        }
    }

    fn dump_dir(&self, source: &DumpSource) -> Result<PathBuf> {
        if !source.is_zip() {
            return Ok(source.path().clone());
        }
        let dest = self
            .workspace
            .path(&self.config.dump.archive_checkout)
            .join(UNPACK_DIR);
        workspace::unpack_zip(source.path(), &dest)
    }

    /// Show a warning to the operator and keep it for the session report.
    fn warn(&self, warning: BoundaryWarning, warnings: &mut Vec<BoundaryWarning>) {
        tracing::debug!(%warning, "continuing after warning");
        ui::display_boundary_warning(&warning);
        warnings.push(warning);
    }
}
