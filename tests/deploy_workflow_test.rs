// tests/deploy_workflow_test.rs
use std::fs;
use std::path::Path;

use portal_deploy::boundary::BoundaryWarning;
use portal_deploy::cli::orchestration::{
    PROMPT_CLEAN_WORKDIR, PROMPT_DESTROY, PROMPT_MIGRATION_FIXES, PROMPT_NEW_BUILD,
    PROMPT_PRUNE_IMAGES, PROMPT_SELECT_VERSION,
};
use portal_deploy::cli::Deployer;
use portal_deploy::config::Config;
use portal_deploy::docker::{MockStack, StackCall};
use portal_deploy::domain::DumpSource;
use portal_deploy::git::MockSourceControl;
use portal_deploy::ui::{Answer, ScriptedPrompter};
use portal_deploy::DeployError;
use tempfile::TempDir;

const FRONTEND_TAGS: &[&str] = &["v1.0.0", "v2.0.0"];
const BACKEND_TAGS: &[&str] = &["v1.0.0", "v1.5.0", "v2.1.0", "v3.0.0"];

/// A work directory with a compose file and both env files in place.
fn workdir() -> (TempDir, Config) {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("docker-compose.yml"), "services: {}\n").unwrap();
    fs::write(dir.path().join("frontend.env"), "API_URL=http://localhost:3000\n").unwrap();
    fs::write(dir.path().join("backend.env"), "PORT=3000\n").unwrap();

    let mut config = Config {
        workdir: dir.path().to_path_buf(),
        ..Config::default()
    };
    config.stack.health_delay_secs = 0;
    config.dump.local_dir = dir.path().join("dump").display().to_string();
    (dir, config)
}

fn source_control(config: &Config) -> MockSourceControl {
    let repos = &config.repositories;
    MockSourceControl::new()
        .with_tags(&repos.frontend.url, FRONTEND_TAGS)
        .with_tags(&repos.backend.url, BACKEND_TAGS)
        .with_clone_files(&repos.frontend.url, &["package.json"])
        .with_clone_files(&repos.backend.url, &["package.json"])
}

fn checkout(dir: &Path, name: &str) -> std::path::PathBuf {
    dir.join(name)
}

#[test]
fn test_declining_everything_only_fetches_and_restarts() {
    let (dir, config) = workdir();
    let scm = source_control(&config);
    let stack = MockStack::new(3);
    let prompter = ScriptedPrompter::declining();

    let session = Deployer::new(&config, &scm, &stack, &prompter)
        .deploy()
        .unwrap();

    assert_eq!(session.choice.major, 2);
    assert!(!session.rebuild);
    assert!(!session.migrations_applied);
    assert_eq!(session.restored_dump, None);
    assert!(session.warnings.is_empty());

    assert_eq!(
        stack.calls(),
        vec![StackCall::Down, StackCall::Up { rebuild: false }]
    );

    let clones = scm.clones();
    assert_eq!(clones.len(), 2);
    assert_eq!(clones[0].url, config.repositories.backend.url);
    assert_eq!(clones[0].tag, "v2.1.0");
    assert_eq!(clones[1].url, config.repositories.frontend.url);
    assert_eq!(clones[1].tag, "v2.0.0");

    let env = fs::read_to_string(checkout(dir.path(), "backend").join(".env")).unwrap();
    assert_eq!(env, "PORT=3000\n");
    assert!(checkout(dir.path(), "frontend").join(".env").is_file());
}

#[test]
fn test_full_deploy_with_migrations_and_local_dump() {
    let (dir, config) = workdir();
    let dump = dir.path().join("dump");
    fs::create_dir_all(dump.join("employeeDomain")).unwrap();
    let scm = source_control(&config);
    let stack = MockStack::new(3);
    let prompter = ScriptedPrompter::new([
        Answer::Yes, // latest
        Answer::Yes, // new build
        Answer::Yes, // migration fixes
        Answer::Yes, // restore dump
    ]);

    let session = Deployer::new(&config, &scm, &stack, &prompter)
        .deploy()
        .unwrap();

    assert!(session.rebuild);
    assert!(session.migrations_applied);
    assert_eq!(session.restored_dump, Some(DumpSource::Local(dump.clone())));

    let scripts: Vec<String> = config.migrations.iter().map(|f| f.to_script()).collect();
    assert_eq!(
        stack.calls(),
        vec![
            StackCall::Down,
            StackCall::Up { rebuild: true },
            StackCall::ExecShell(scripts[0].clone()),
            StackCall::ExecShell(scripts[1].clone()),
            StackCall::RestoreDump(dump.clone()),
        ]
    );

    let asked = prompter.asked();
    assert_eq!(asked.len(), 4);
    assert_eq!(asked[1], PROMPT_NEW_BUILD);
    assert_eq!(asked[2], PROMPT_MIGRATION_FIXES);
    assert_eq!(
        asked[3],
        format!(
            "Do you want to restore data using dump data in {}?",
            dump.display()
        )
    );
}

#[test]
fn test_selecting_an_older_version() {
    let (_dir, config) = workdir();
    let scm = source_control(&config);
    let stack = MockStack::new(3);
    let prompter = ScriptedPrompter::new([Answer::No, Answer::Pick(0), Answer::No, Answer::No]);

    let session = Deployer::new(&config, &scm, &stack, &prompter)
        .deploy()
        .unwrap();

    assert_eq!(session.choice.major, 1);
    assert_eq!(
        session.choice.label(),
        "backend ver: v1.5.0 - frontend ver: v1.0.0"
    );
    assert_eq!(prompter.asked()[1], PROMPT_SELECT_VERSION);
}

#[test]
fn test_no_compatible_version_aborts_before_fetching() {
    let (_dir, config) = workdir();
    let repos = &config.repositories;
    let scm = MockSourceControl::new()
        .with_tags(&repos.frontend.url, &["v4.0.0"])
        .with_tags(&repos.backend.url, &["v1.0.0"]);
    let stack = MockStack::new(3);
    let prompter = ScriptedPrompter::declining();

    let result = Deployer::new(&config, &scm, &stack, &prompter).deploy();

    assert!(matches!(result, Err(DeployError::NoCompatibleVersion)));
    assert!(scm.clones().is_empty());
    assert!(stack.calls().is_empty());
}

#[test]
fn test_preflight_failure_aborts_before_anything() {
    let (_dir, config) = workdir();
    let scm = source_control(&config);
    let stack = MockStack::new(3).with_engine_down();
    let prompter = ScriptedPrompter::declining();

    let result = Deployer::new(&config, &scm, &stack, &prompter).deploy();

    assert!(matches!(result, Err(DeployError::Preflight(_))));
    assert!(prompter.asked().is_empty());
    assert!(scm.clones().is_empty());
}

#[test]
fn test_missing_orchestrator_fails_preflight() {
    let (_dir, config) = workdir();
    let scm = source_control(&config);
    let stack = MockStack::new(3).without_orchestrator();
    let prompter = ScriptedPrompter::declining();

    let result = Deployer::new(&config, &scm, &stack, &prompter).deploy();

    assert!(matches!(result, Err(DeployError::Preflight(_))));
}

#[test]
fn test_unhealthy_stack_aborts_before_migration_fixes() {
    let (_dir, config) = workdir();
    let scm = source_control(&config);
    let stack = MockStack::new(2);
    let prompter = ScriptedPrompter::new([Answer::Yes, Answer::No]);

    let result = Deployer::new(&config, &scm, &stack, &prompter).deploy();

    assert!(matches!(
        result,
        Err(DeployError::Unhealthy {
            expected: 3,
            running: 2
        })
    ));
    assert!(!prompter
        .asked()
        .contains(&PROMPT_MIGRATION_FIXES.to_string()));
    assert!(!stack
        .calls()
        .iter()
        .any(|call| matches!(call, StackCall::ExecShell(_))));
}

#[test]
fn test_failed_down_warns_and_continues() {
    let (_dir, config) = workdir();
    let scm = source_control(&config);
    let stack = MockStack::new(3).failing("down");
    let prompter = ScriptedPrompter::declining();

    let session = Deployer::new(&config, &scm, &stack, &prompter)
        .deploy()
        .unwrap();

    assert!(matches!(
        session.warnings.as_slice(),
        [BoundaryWarning::StepFailed { step, .. }] if step == "Stack down"
    ));
    assert_eq!(
        stack.calls(),
        vec![StackCall::Down, StackCall::Up { rebuild: false }]
    );
}

#[test]
fn test_failed_up_aborts() {
    let (_dir, config) = workdir();
    let scm = source_control(&config);
    let stack = MockStack::new(3).failing("up");
    let prompter = ScriptedPrompter::declining();

    let result = Deployer::new(&config, &scm, &stack, &prompter).deploy();

    assert!(matches!(result, Err(DeployError::Command { .. })));
}

#[test]
fn test_clone_failure_aborts_before_stack_changes() {
    let (_dir, config) = workdir();
    let repos = &config.repositories;
    let scm = MockSourceControl::new()
        .with_tags(&repos.frontend.url, FRONTEND_TAGS)
        .with_tags(&repos.backend.url, BACKEND_TAGS)
        .with_failing_clone(&repos.frontend.url);
    let stack = MockStack::new(3);
    let prompter = ScriptedPrompter::declining();

    let result = Deployer::new(&config, &scm, &stack, &prompter).deploy();

    assert!(matches!(result, Err(DeployError::Remote(_))));
    assert_eq!(scm.clones().len(), 1);
    assert!(stack.calls().is_empty());
}

#[test]
fn test_missing_env_file_is_a_warning() {
    let (dir, config) = workdir();
    fs::remove_file(dir.path().join("frontend.env")).unwrap();
    let scm = source_control(&config);
    let stack = MockStack::new(3);
    let prompter = ScriptedPrompter::declining();

    let session = Deployer::new(&config, &scm, &stack, &prompter)
        .deploy()
        .unwrap();

    assert!(matches!(
        session.warnings.as_slice(),
        [BoundaryWarning::MissingEnvFile { repository, .. }] if repository == "frontend"
    ));
    assert!(!checkout(dir.path(), "frontend").join(".env").exists());
}

#[test]
fn test_redeploy_replaces_previous_checkout() {
    let (dir, config) = workdir();
    let stale = checkout(dir.path(), "backend").join("stale.txt");
    fs::create_dir_all(stale.parent().unwrap()).unwrap();
    fs::write(&stale, "old").unwrap();
    let scm = source_control(&config);
    let stack = MockStack::new(3);
    let prompter = ScriptedPrompter::declining();

    Deployer::new(&config, &scm, &stack, &prompter)
        .deploy()
        .unwrap();

    assert!(!stale.exists());
    assert!(checkout(dir.path(), "backend").join("package.json").exists());
}

#[test]
fn test_destroy_declined_touches_nothing() {
    let (dir, config) = workdir();
    fs::create_dir_all(checkout(dir.path(), "backend")).unwrap();
    let scm = source_control(&config);
    let stack = MockStack::new(3);
    let prompter = ScriptedPrompter::declining();

    let result = Deployer::new(&config, &scm, &stack, &prompter).destroy();

    assert!(matches!(result, Err(DeployError::Aborted)));
    assert!(stack.calls().is_empty());
    assert!(checkout(dir.path(), "backend").exists());
    assert_eq!(prompter.asked(), vec![PROMPT_DESTROY.to_string()]);
}

#[test]
fn test_destroy_with_everything_confirmed() {
    let (dir, config) = workdir();
    fs::create_dir_all(checkout(dir.path(), "backend")).unwrap();
    fs::create_dir_all(checkout(dir.path(), "frontend")).unwrap();
    let scm = source_control(&config);
    let stack = MockStack::new(3);
    let prompter = ScriptedPrompter::new([Answer::Yes, Answer::Default, Answer::Default]);

    let report = Deployer::new(&config, &scm, &stack, &prompter)
        .destroy()
        .unwrap();

    assert!(report.images_pruned);
    assert!(report.workdir_cleaned);
    assert_eq!(stack.calls(), vec![StackCall::Down, StackCall::PruneImages]);
    assert!(!checkout(dir.path(), "backend").exists());
    assert!(!checkout(dir.path(), "frontend").exists());
    assert!(dir.path().join("docker-compose.yml").exists());
    assert_eq!(
        prompter.asked(),
        vec![
            PROMPT_DESTROY.to_string(),
            PROMPT_PRUNE_IMAGES.to_string(),
            PROMPT_CLEAN_WORKDIR.to_string(),
        ]
    );
}

#[test]
fn test_destroy_prune_failure_warns() {
    let (_dir, config) = workdir();
    let scm = source_control(&config);
    let stack = MockStack::new(3).failing("prune");
    let prompter = ScriptedPrompter::new([Answer::Yes, Answer::Yes, Answer::No]);

    let report = Deployer::new(&config, &scm, &stack, &prompter)
        .destroy()
        .unwrap();

    assert!(!report.images_pruned);
    assert!(!report.workdir_cleaned);
    assert_eq!(report.warnings.len(), 1);
}
