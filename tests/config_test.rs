// tests/config_test.rs
use portal_deploy::config::{load_config, parse_config, Config, CONFIG_FILE_NAME};
use portal_deploy::DeployError;
use serial_test::serial;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

fn fixture() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/deploy.toml")
}

#[test]
fn test_default_config() {
    let config = Config::default();
    assert_eq!(config.workdir, PathBuf::from("."));
    assert_eq!(config.stack.compose_command, vec!["docker-compose".to_string()]);
    assert_eq!(config.stack.expected_services, 3);
    assert_eq!(config.database.container, "compose-database-1");
    assert_eq!(config.dump.local_dir, "~/dump");
    assert_eq!(config.dump.archive_repo, None);
}

#[test]
fn test_load_fixture() {
    let config = load_config(Some(&fixture())).unwrap();

    assert_eq!(config.workdir, PathBuf::from("/opt/portal"));
    assert_eq!(
        config.repositories.frontend.env_file,
        PathBuf::from("env/frontend.env")
    );
    assert_eq!(config.repositories.backend.name, "backend");
    assert_eq!(
        config.stack.compose_command,
        vec!["docker".to_string(), "compose".to_string()]
    );
    assert_eq!(config.stack.expected_services, 4);
    assert_eq!(config.stack.compose_file, PathBuf::from("docker-compose.yml"));
    assert_eq!(config.database.container, "portal-database-1");
    assert_eq!(config.database.restore_tool, "/usr/bin/mongorestore");
    assert_eq!(config.dump.local_path(), PathBuf::from("/srv/dump"));
    assert_eq!(config.dump.archive_ref, "master");
    assert_eq!(config.migrations.len(), 1);
    assert_eq!(
        config.migrations[0].to_script(),
        r#"db.getCollection("groups").updateMany({"systemType": "RETIRED"}, {$set: {"systemType": "RETIREE"}})"#
    );
}

#[test]
fn test_empty_migrations_list_disables_fixes() {
    let config = parse_config("migrations = []\n").unwrap();
    assert!(config.migrations.is_empty());
}

#[test]
fn test_invalid_file_is_config_error() {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(b"[stack]\nexpected_services = \"three\"\n").unwrap();
    temp_file.flush().unwrap();

    let result = load_config(Some(temp_file.path()));
    assert!(matches!(result, Err(DeployError::Config(_))));
}

#[test]
fn test_missing_explicit_file_is_config_error() {
    let result = load_config(Some(Path::new("/nonexistent/deploy.toml")));
    assert!(matches!(result, Err(DeployError::Config(_))));
}

#[test]
fn test_incomplete_repository_table_is_rejected() {
    let result = parse_config(
        r#"
[repositories.backend]
url = "git@example.com:backend.git"
"#,
    );
    assert!(result.is_err());
}

#[test]
#[serial]
fn test_load_from_current_directory() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(CONFIG_FILE_NAME),
        "[stack]\nexpected_services = 0\n",
    )
    .unwrap();

    let original = std::env::current_dir().unwrap();
    std::env::set_current_dir(dir.path()).unwrap();
    let result = load_config(None);
    std::env::set_current_dir(original).unwrap();

    assert_eq!(result.unwrap().stack.expected_services, 0);
}
