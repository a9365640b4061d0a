use super::filter::ReleaseFilter;
use super::{Resolution, ResolutionDetails};
use crate::domain::release::sort_descending;
use crate::domain::{BranchInfo, ParsedVersion, ReleaseCandidate};
use crate::error::Result;
use crate::github::{self, GitHubApi};
use crate::warning::UpdateWarning;

/// One way of deciding what "latest" means for an action
pub trait ResolutionStrategy {
    /// Resolve the version `repository` should be pinned to, or `None` when
    /// there is no acceptable update or a lookup failed.
    fn resolve(
        &self,
        api: &dyn GitHubApi,
        repository: &str,
        current_version: &str,
    ) -> Option<Resolution>;
}

/// Unwrap a lookup result, turning a failure into a warning scoped to `repository`
fn lookup<T>(repository: &str, result: Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            UpdateWarning::LookupFailed {
                repository: repository.to_string(),
                reason: e.to_string(),
            }
            .emit();
            None
        }
    }
}

/// Pin to the newest release tag allowed by the release filter
pub struct ReleaseTagStrategy {
    filter: ReleaseFilter,
}

impl ReleaseTagStrategy {
    pub fn new(filter: ReleaseFilter) -> Self {
        ReleaseTagStrategy { filter }
    }

    /// Newest qualifying non-prerelease release, if any
    pub fn latest_release(
        &self,
        api: &dyn GitHubApi,
        repository: &str,
        current_version: &str,
    ) -> Option<ReleaseCandidate> {
        let mut releases: Vec<ReleaseCandidate> = lookup(repository, api.list_releases(repository))?
            .into_iter()
            .filter(|release| !release.prerelease)
            .collect();

        if releases.is_empty() {
            tracing::debug!(repository, "no published releases");
            return None;
        }

        sort_descending(&mut releases);

        match ParsedVersion::parse(current_version) {
            ParsedVersion::Opaque(_) => {
                UpdateWarning::NonSemanticVersion {
                    repository: repository.to_string(),
                    current_version: current_version.to_string(),
                }
                .emit();
                releases.into_iter().next()
            }
            ParsedVersion::Semantic(current) => self.filter.select(&current, &releases).cloned(),
        }
    }
}

impl ResolutionStrategy for ReleaseTagStrategy {
    fn resolve(
        &self,
        api: &dyn GitHubApi,
        repository: &str,
        current_version: &str,
    ) -> Option<Resolution> {
        let release = self.latest_release(api, repository, current_version)?;

        Some(Resolution {
            version: release.tag_name.clone(),
            details: ResolutionDetails::Release(release),
        })
    }
}

/// Pin to the commit sha behind the newest allowed release tag
pub struct ReleaseCommitShaStrategy {
    releases: ReleaseTagStrategy,
}

impl ReleaseCommitShaStrategy {
    pub fn new(filter: ReleaseFilter) -> Self {
        ReleaseCommitShaStrategy {
            releases: ReleaseTagStrategy::new(filter),
        }
    }
}

impl ResolutionStrategy for ReleaseCommitShaStrategy {
    fn resolve(
        &self,
        api: &dyn GitHubApi,
        repository: &str,
        current_version: &str,
    ) -> Option<Resolution> {
        let release = self
            .releases
            .latest_release(api, repository, current_version)?;
        let commit = lookup(repository, api.latest_commit(repository, &release.tag_name))?;

        Some(Resolution {
            version: commit.sha.clone(),
            details: ResolutionDetails::ReleaseCommit { release, commit },
        })
    }
}

/// Pin to the head commit of the repository's default branch
pub struct DefaultBranchCommitShaStrategy;

impl ResolutionStrategy for DefaultBranchCommitShaStrategy {
    fn resolve(
        &self,
        api: &dyn GitHubApi,
        repository: &str,
        _current_version: &str,
    ) -> Option<Resolution> {
        let branch_name = lookup(repository, api.default_branch(repository))?;
        let commit = lookup(repository, api.latest_commit(repository, &branch_name))?;

        Some(Resolution {
            version: commit.sha.clone(),
            details: ResolutionDetails::BranchCommit {
                branch: BranchInfo {
                    branch_url: github::branch_url(repository, &branch_name),
                    branch_name,
                },
                commit,
            },
        })
    }
}
