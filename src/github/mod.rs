//! GitHub API abstraction layer
//!
//! The [GitHubApi] trait covers everything the updater asks of GitHub: the
//! read-only lookups used to resolve new versions, and the pull request calls
//! made once workflow files have been rewritten. Implementations:
//!
//! - [client::GitHubClient]: blocking `reqwest` client for the REST API
//! - [mock::MockGitHub]: in-memory implementation for tests
//!
//! Resolution and orchestration code depends on the trait only.

pub mod client;
pub mod mock;

pub use client::GitHubClient;
pub use mock::MockGitHub;

use std::collections::BTreeSet;

use crate::domain::{CommitInfo, ReleaseCandidate};
use crate::error::Result;

/// Base URL of github.com, used to build links for repositories and branches
pub const GITHUB_URL: &str = "https://github.com";

/// Number of most recent releases fetched per repository
pub const RELEASES_PER_PAGE: usize = 50;

/// Everything needed to open a pull request
#[derive(Debug, Clone, PartialEq)]
pub struct PullRequestDraft {
    pub repository: String,
    pub title: String,
    pub head_branch: String,
    pub base_branch: String,
    pub body: String,
}

/// Result of trying to open a pull request
#[derive(Debug, Clone, PartialEq)]
pub enum PullRequestOutcome {
    Created { number: u64, html_url: String },
    AlreadyExists,
}

/// GitHub operations used by the updater
///
/// Every lookup is read-only. Errors are scoped to the single call; callers
/// decide whether a failure aborts anything.
pub trait GitHubApi {
    /// Up to [RELEASES_PER_PAGE] most recent releases, in API order
    fn list_releases(&self, repository: &str) -> Result<Vec<ReleaseCandidate>>;

    /// Newest commit reachable from a tag, branch or sha
    fn latest_commit(&self, repository: &str, git_ref: &str) -> Result<CommitInfo>;

    /// Name of the repository's default branch
    fn default_branch(&self, repository: &str) -> Result<String>;

    /// Paths of the workflow files registered for a repository
    fn list_workflow_paths(&self, repository: &str) -> Result<Vec<String>>;

    /// Open a pull request
    fn create_pull_request(&self, draft: &PullRequestDraft) -> Result<PullRequestOutcome>;

    /// Request reviews from users and teams
    fn request_reviewers(
        &self,
        repository: &str,
        number: u64,
        users: &BTreeSet<String>,
        teams: &BTreeSet<String>,
    ) -> Result<()>;

    /// Add labels to a pull request
    fn add_labels(&self, repository: &str, number: u64, labels: &BTreeSet<String>) -> Result<()>;
}

/// Link to a repository on github.com
pub fn repository_url(repository: &str) -> String {
    format!("{}/{}", GITHUB_URL, repository)
}

/// Link to a branch of a repository on github.com
pub fn branch_url(repository: &str, branch: &str) -> String {
    format!("{}/{}/tree/{}", GITHUB_URL, repository, branch)
}
