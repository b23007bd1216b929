//! Filesystem side effects of a deployment: checkouts, env files and the
//! database volume root, all under the configured work directory.

use std::fs;
use std::path::{Path, PathBuf};

use crate::boundary::BoundaryWarning;
use crate::config::{Config, RepositoryConfig};
use crate::error::{DeployError, Result};
use crate::process::Invocation;

#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Workspace { root: root.into() }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.workdir)
    }

    pub fn path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.root.join(relative)
    }

    pub fn checkout_path(&self, repo: &RepositoryConfig) -> PathBuf {
        self.path(&repo.checkout)
    }

    /// Remove a checkout left over from a previous run.
    pub fn reset_checkout(&self, repo: &RepositoryConfig) -> Result<()> {
        remove_dir_if_exists(&self.checkout_path(repo))
    }

    /// Copy the repository's prepared env file to `<checkout>/.env`.
    ///
    /// A missing env file is not an error; it is returned as a warning.
    pub fn install_env_file(&self, repo: &RepositoryConfig) -> Result<Option<BoundaryWarning>> {
        let source = self.path(&repo.env_file);
        if !source.is_file() {
            return Ok(Some(BoundaryWarning::MissingEnvFile {
                repository: repo.name.clone(),
                path: source,
            }));
        }

        let target = self.checkout_path(repo).join(".env");
        fs::copy(&source, &target).map_err(|e| {
            DeployError::Io(std::io::Error::new(
                e.kind(),
                format!(
                    "cannot copy '{}' to '{}': {}",
                    source.display(),
                    target.display(),
                    e
                ),
            ))
        })?;
        tracing::debug!(from = %source.display(), to = %target.display(), "env file installed");
        Ok(None)
    }

    /// Create the database volume root if it does not exist yet.
    pub fn ensure_dir(&self, relative: impl AsRef<Path>) -> Result<PathBuf> {
        let dir = self.path(relative);
        fs::create_dir_all(&dir).map_err(|e| {
            DeployError::preflight(format!("cannot create '{}': {}", dir.display(), e))
        })?;
        Ok(dir)
    }

    /// Remove every given checkout.
    pub fn clean(&self, repos: &[&RepositoryConfig]) -> Result<()> {
        for repo in repos {
            self.reset_checkout(repo)?;
        }
        Ok(())
    }
}

/// Entries of a dump archive checkout: sub-directories and `.zip` files,
/// sorted by name, hidden entries (`.git`) skipped.
pub fn archive_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = Vec::new();

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let hidden = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with('.'));
        if hidden {
            continue;
        }

        let is_zip = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"));
        if path.is_dir() || (path.is_file() && is_zip) {
            entries.push(path);
        }
    }

    entries.sort();
    Ok(entries)
}

/// Unzip `archive` into a fresh `dest` and return the dump directory inside it.
///
/// When the archive holds a single top-level directory, that directory is
/// the dump; otherwise `dest` itself is.
pub fn unpack_zip(archive: &Path, dest: &Path) -> Result<PathBuf> {
    remove_dir_if_exists(dest)?;
    fs::create_dir_all(dest)?;

    Invocation::new("unzip")
        .args(["-o", "-q"])
        .arg(archive)
        .arg("-d")
        .arg(dest)
        .run()?;

    Ok(single_subdir(dest)?.unwrap_or_else(|| dest.to_path_buf()))
}

fn single_subdir(dir: &Path) -> Result<Option<PathBuf>> {
    let mut children = Vec::new();
    for entry in fs::read_dir(dir)? {
        children.push(entry?.path());
    }
    match children.as_slice() {
        [only] if only.is_dir() => Ok(Some(only.clone())),
        _ => Ok(None),
    }
}

pub(crate) fn remove_dir_if_exists(path: &Path) -> Result<()> {
    match fs::remove_dir_all(path) {
        Ok(()) => {
            tracing::debug!(path = %path.display(), "removed");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Write a zip of empty entries (`dir/` for directories), stored uncompressed.
#[cfg(test)]
pub(crate) fn write_empty_zip(path: &Path, entries: &[&str]) {
    // MS-DOS date for 1980-01-01
    const DOS_DATE: u16 = (1 << 5) | 1;
    const DOS_DIRECTORY: u32 = 0x10;

    let mut local = Vec::new();
    let mut central = Vec::new();

    for name in entries {
        let offset = local.len() as u32;
        let name_len = name.len() as u16;

        local.extend_from_slice(&0x0403_4b50u32.to_le_bytes());
        local.extend_from_slice(&20u16.to_le_bytes()); // version needed
        local.extend_from_slice(&[0; 4]); // flags, method
        local.extend_from_slice(&0u16.to_le_bytes()); // time
        local.extend_from_slice(&DOS_DATE.to_le_bytes());
        local.extend_from_slice(&[0; 12]); // crc, sizes
        local.extend_from_slice(&name_len.to_le_bytes());
        local.extend_from_slice(&0u16.to_le_bytes()); // extra
        local.extend_from_slice(name.as_bytes());

        let attributes = if name.ends_with('/') { DOS_DIRECTORY } else { 0 };
        central.extend_from_slice(&0x0201_4b50u32.to_le_bytes());
        central.extend_from_slice(&20u16.to_le_bytes()); // version made by
        central.extend_from_slice(&20u16.to_le_bytes()); // version needed
        central.extend_from_slice(&[0; 4]); // flags, method
        central.extend_from_slice(&0u16.to_le_bytes()); // time
        central.extend_from_slice(&DOS_DATE.to_le_bytes());
        central.extend_from_slice(&[0; 12]); // crc, sizes
        central.extend_from_slice(&name_len.to_le_bytes());
        central.extend_from_slice(&[0; 8]); // extra, comment, disk, internal attributes
        central.extend_from_slice(&attributes.to_le_bytes());
        central.extend_from_slice(&offset.to_le_bytes());
        central.extend_from_slice(name.as_bytes());
    }

    let count = entries.len() as u16;
    let mut bytes = local;
    let central_offset = bytes.len() as u32;
    let central_size = central.len() as u32;
    bytes.extend_from_slice(&central);
    bytes.extend_from_slice(&0x0605_4b50u32.to_le_bytes());
    bytes.extend_from_slice(&[0; 4]); // disk numbers
    bytes.extend_from_slice(&count.to_le_bytes());
    bytes.extend_from_slice(&count.to_le_bytes());
    bytes.extend_from_slice(&central_size.to_le_bytes());
    bytes.extend_from_slice(&central_offset.to_le_bytes());
    bytes.extend_from_slice(&0u16.to_le_bytes()); // comment

    fs::write(path, bytes).unwrap();
}

/// Whether the `unzip` tool is available on this machine.
#[cfg(test)]
pub(crate) fn unzip_available() -> bool {
    Invocation::new("unzip").arg("-v").run().is_ok()
}
