use crate::boundary::BoundaryWarning;
use crate::config::RepositoryConfig;
use crate::domain::{common_majors, format_choice_label, MajorVersionChoice, RepositoryRef};
use crate::error::Result;
use crate::git::SourceControl;

/// Outcome of resolving both repositories: what can be deployed.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub frontend: RepositoryRef,
    pub backend: RepositoryRef,
    /// One entry per common major version, ascending.
    pub choices: Vec<MajorVersionChoice>,
    pub warnings: Vec<BoundaryWarning>,
}

impl Resolution {
    /// Build the resolution from two listed repositories.
    pub fn from_repositories(
        frontend: RepositoryRef,
        backend: RepositoryRef,
    ) -> Result<Self> {
        let mut choices = Vec::new();
        let mut warnings = Vec::new();

        for major in common_majors(&frontend.tags, &backend.tags) {
            let frontend_tag = frontend.latest_for_major(major)?;
            let backend_tag = backend.latest_for_major(major)?;

            warnings.extend(listing_order_warning(&frontend, major));
            warnings.extend(listing_order_warning(&backend, major));

            choices.push(MajorVersionChoice {
                major,
                frontend: frontend_tag.clone(),
                backend: backend_tag.clone(),
            });
        }

        Ok(Resolution {
            frontend,
            backend,
            choices,
            warnings,
        })
    }

    /// The choice with the highest major version.
    pub fn latest(&self) -> Option<&MajorVersionChoice> {
        self.choices.last()
    }

    pub fn choice(&self, major: u64) -> Option<&MajorVersionChoice> {
        self.choices.iter().find(|c| c.major == major)
    }

    /// Menu label for `major`: `backend ver: <tag> - frontend ver: <tag>`.
    pub fn format_choice_label(&self, major: u64) -> Result<String> {
        let backend = self.backend.latest_for_major(major)?;
        let frontend = self.frontend.latest_for_major(major)?;
        Ok(format_choice_label(backend, frontend))
    }

    pub fn labels(&self) -> Vec<String> {
        self.choices.iter().map(MajorVersionChoice::label).collect()
    }
}

/// Warn when the listing-order pick is not the highest semantic version.
fn listing_order_warning(repo: &RepositoryRef, major: u64) -> Option<BoundaryWarning> {
    let picked = repo.latest_for_major(major).ok()?;
    let picked_version = picked.semver()?;

    let highest = repo
        .tags
        .iter()
        .filter(|tag| tag.major() == major)
        .filter_map(|tag| tag.semver().map(|v| (v, tag)))
        .max_by(|(a, _), (b, _)| a.cmp(b))?;

    if highest.0 > picked_version {
        Some(BoundaryWarning::ListingOrderMismatch {
            repository: repo.name.clone(),
            major,
            picked: picked.name().to_string(),
            highest: highest.1.name().to_string(),
        })
    } else {
        None
    }
}

/// Lists both repositories and reconciles their major versions.
pub struct VersionResolver<'a, S: SourceControl> {
    source: &'a S,
}

impl<'a, S: SourceControl> VersionResolver<'a, S> {
    pub fn new(source: &'a S) -> Self {
        VersionResolver { source }
    }

    /// List one repository's tags.
    pub fn list_repository(
        &self,
        repo: &RepositoryConfig,
    ) -> Result<(RepositoryRef, Vec<BoundaryWarning>)> {
        let raw = self.source.list_tags(&repo.url)?;
        let (listed, rejected) = RepositoryRef::from_listing(&repo.name, &repo.url, &raw);

        let warnings = rejected
            .into_iter()
            .map(|tag| BoundaryWarning::UnparsableTag {
                repository: repo.name.clone(),
                tag,
            })
            .collect();

        tracing::info!(
            repository = %repo.name,
            tags = listed.tags.len(),
            "listed version tags"
        );
        Ok((listed, warnings))
    }

    /// Query both remotes (backend first) and compute the deployable choices.
    pub fn resolve(
        &self,
        frontend: &RepositoryConfig,
        backend: &RepositoryConfig,
    ) -> Result<Resolution> {
        let (backend_ref, mut warnings) = self.list_repository(backend)?;
        let (frontend_ref, frontend_warnings) = self.list_repository(frontend)?;
        warnings.extend(frontend_warnings);

        let mut resolution = Resolution::from_repositories(frontend_ref, backend_ref)?;
        warnings.append(&mut resolution.warnings);
        resolution.warnings = warnings;

        for warning in &resolution.warnings {
            tracing::debug!(%warning, "resolution warning");
        }
        tracing::debug!(
            majors = ?resolution.choices.iter().map(|c| c.major).collect::<Vec<_>>(),
            "common major versions"
        );
        Ok(resolution)
    }
}
