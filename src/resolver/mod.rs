//! Version resolution for action references.
//!
//! A [VersionResolver] is built once per run from a [ResolutionPolicy]. It
//! picks one [ResolutionStrategy] up front and memoizes every
//! `(repository, current_version)` answer in a [ResolutionCache], since the
//! same action is usually pinned identically across many workflow files.

pub mod filter;
pub mod strategy;

pub use filter::ReleaseFilter;
pub use strategy::{
    DefaultBranchCommitShaStrategy, ReleaseCommitShaStrategy, ReleaseTagStrategy,
    ResolutionStrategy,
};

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::{ActionReference, BranchInfo, CommitInfo, ReleaseCandidate, ReleaseType};
use crate::error::{Result, UpdaterError};
use crate::github::GitHubApi;

/// What "latest" means when looking for a new pin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub enum UpdateStrategy {
    /// Newest release tag
    #[default]
    #[serde(rename = "release-tag")]
    ReleaseTag,
    /// Commit sha behind the newest release tag
    #[serde(rename = "release-commit-sha")]
    ReleaseCommitSha,
    /// Head commit sha of the default branch
    #[serde(rename = "default-branch-sha")]
    DefaultBranchCommitSha,
}

impl FromStr for UpdateStrategy {
    type Err = UpdaterError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "release-tag" => Ok(UpdateStrategy::ReleaseTag),
            "release-commit-sha" => Ok(UpdateStrategy::ReleaseCommitSha),
            "default-branch-sha" => Ok(UpdateStrategy::DefaultBranchCommitSha),
            other => Err(UpdaterError::config(format!(
                "Unknown update strategy '{}': expected release-tag, release-commit-sha or default-branch-sha",
                other
            ))),
        }
    }
}

impl fmt::Display for UpdateStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateStrategy::ReleaseTag => write!(f, "release-tag"),
            UpdateStrategy::ReleaseCommitSha => write!(f, "release-commit-sha"),
            UpdateStrategy::DefaultBranchCommitSha => write!(f, "default-branch-sha"),
        }
    }
}

/// How references are resolved and which ones are left alone
#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionPolicy {
    pub strategy: UpdateStrategy,
    pub release_types: BTreeSet<ReleaseType>,
    pub ignore: BTreeSet<String>,
}

impl Default for ResolutionPolicy {
    fn default() -> Self {
        ResolutionPolicy {
            strategy: UpdateStrategy::default(),
            release_types: ReleaseType::ALL.into_iter().collect(),
            ignore: BTreeSet::new(),
        }
    }
}

impl ResolutionPolicy {
    /// Whether `reference` matches an ignore entry
    pub fn is_ignored(&self, reference: &ActionReference) -> bool {
        self.ignore
            .iter()
            .any(|entry| reference.matches_ignore_entry(entry))
    }

    /// Build the strategy this policy selects
    pub fn build_strategy(&self) -> Box<dyn ResolutionStrategy> {
        let filter = ReleaseFilter::new(self.release_types.clone());
        match self.strategy {
            UpdateStrategy::ReleaseTag => Box::new(ReleaseTagStrategy::new(filter)),
            UpdateStrategy::ReleaseCommitSha => Box::new(ReleaseCommitShaStrategy::new(filter)),
            UpdateStrategy::DefaultBranchCommitSha => Box::new(DefaultBranchCommitShaStrategy),
        }
    }
}

/// Data behind a resolved version, used to describe the update
#[derive(Debug, Clone, PartialEq)]
pub enum ResolutionDetails {
    Release(ReleaseCandidate),
    ReleaseCommit {
        release: ReleaseCandidate,
        commit: CommitInfo,
    },
    BranchCommit {
        branch: BranchInfo,
        commit: CommitInfo,
    },
}

/// A new version for an action: the tag or sha to pin, plus its details
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub version: String,
    pub details: ResolutionDetails,
}

/// Run-scoped memo of resolutions keyed by `(repository, current_version)`.
///
/// Negative answers are cached too, so a failing lookup is not repeated.
#[derive(Debug, Default)]
pub struct ResolutionCache {
    entries: HashMap<(String, String), Option<Resolution>>,
}

impl ResolutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, repository: &str, current_version: &str) -> Option<&Option<Resolution>> {
        self.entries
            .get(&(repository.to_string(), current_version.to_string()))
    }

    pub fn insert(&mut self, repository: &str, current_version: &str, value: Option<Resolution>) {
        self.entries
            .insert((repository.to_string(), current_version.to_string()), value);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resolves new versions through one strategy, memoizing each answer
pub struct VersionResolver<'a> {
    api: &'a dyn GitHubApi,
    strategy: Box<dyn ResolutionStrategy>,
    cache: ResolutionCache,
}

impl<'a> VersionResolver<'a> {
    pub fn new(api: &'a dyn GitHubApi, policy: &ResolutionPolicy, cache: ResolutionCache) -> Self {
        Self::with_strategy(api, policy.build_strategy(), cache)
    }

    pub fn with_strategy(
        api: &'a dyn GitHubApi,
        strategy: Box<dyn ResolutionStrategy>,
        cache: ResolutionCache,
    ) -> Self {
        VersionResolver {
            api,
            strategy,
            cache,
        }
    }

    /// Resolve the new version for `repository` pinned at `current_version`.
    ///
    /// `None` means no qualifying update exists or a lookup failed.
    pub fn resolve(&mut self, repository: &str, current_version: &str) -> Option<Resolution> {
        if let Some(cached) = self.cache.get(repository, current_version) {
            tracing::debug!(repository, current_version, "resolution served from cache");
            return cached.clone();
        }

        tracing::info!(repository, "Checking for updates");
        let resolution = self.strategy.resolve(self.api, repository, current_version);
        self.cache
            .insert(repository, current_version, resolution.clone());
        resolution
    }

    /// Hand back the cache once the run is over
    pub fn into_cache(self) -> ResolutionCache {
        self.cache
    }
}
