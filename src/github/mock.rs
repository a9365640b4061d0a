use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};

use super::{GitHubApi, PullRequestDraft, PullRequestOutcome};
use crate::domain::{CommitInfo, ReleaseCandidate};
use crate::error::{Result, UpdaterError};

/// Mock GitHub API for testing without network access.
///
/// Repositories without configured data answer with a 404 API error, which
/// is how the real client reports unknown repositories.
#[derive(Default)]
pub struct MockGitHub {
    releases: HashMap<String, Vec<ReleaseCandidate>>,
    commits: HashMap<(String, String), CommitInfo>,
    default_branches: HashMap<String, String>,
    workflow_paths: Vec<String>,
    workflow_listing_fails: bool,
    pull_request_exists: bool,
    calls: RefCell<Vec<String>>,
    pull_requests: RefCell<Vec<PullRequestDraft>>,
    reviewers: RefCell<Vec<(u64, BTreeSet<String>, BTreeSet<String>)>>,
    labels: RefCell<Vec<(u64, BTreeSet<String>)>>,
}

impl MockGitHub {
    /// Create a new empty mock API
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a release (API order is insertion order)
    pub fn add_release(&mut self, repository: &str, tag_name: &str, published_at: &str, prerelease: bool) {
        let html_url = format!("https://github.com/{}/releases/tag/{}", repository, tag_name);
        self.releases
            .entry(repository.to_string())
            .or_default()
            .push(ReleaseCandidate::new(tag_name, published_at, html_url, prerelease));
    }

    /// Set the newest commit for a tag or branch
    pub fn set_commit(&mut self, repository: &str, git_ref: &str, sha: &str, date: &str) {
        self.commits.insert(
            (repository.to_string(), git_ref.to_string()),
            CommitInfo {
                sha: sha.to_string(),
                commit_url: format!("https://github.com/{}/commit/{}", repository, sha),
                commit_date: date.to_string(),
            },
        );
    }

    /// Set the default branch of a repository
    pub fn set_default_branch(&mut self, repository: &str, branch: &str) {
        self.default_branches
            .insert(repository.to_string(), branch.to_string());
    }

    /// Register a workflow path returned by the workflow listing
    pub fn add_workflow_path(&mut self, path: &str) {
        self.workflow_paths.push(path.to_string());
    }

    /// Make the workflow listing answer with an error
    pub fn failing_workflow_listing(mut self) -> Self {
        self.workflow_listing_fails = true;
        self
    }

    /// Make pull request creation report an existing pull request
    pub fn set_pull_request_exists(&mut self, exists: bool) {
        self.pull_request_exists = exists;
    }

    /// Every lookup made so far, as "method repository[ ref]"
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    /// Pull requests opened so far
    pub fn pull_requests(&self) -> Vec<PullRequestDraft> {
        self.pull_requests.borrow().clone()
    }

    /// Reviewer requests made so far
    pub fn reviewer_requests(&self) -> Vec<(u64, BTreeSet<String>, BTreeSet<String>)> {
        self.reviewers.borrow().clone()
    }

    /// Label requests made so far
    pub fn label_requests(&self) -> Vec<(u64, BTreeSet<String>)> {
        self.labels.borrow().clone()
    }

    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }

    fn not_found(what: &str) -> UpdaterError {
        UpdaterError::api(404, format!("Not Found: {}", what))
    }
}

impl GitHubApi for MockGitHub {
    fn list_releases(&self, repository: &str) -> Result<Vec<ReleaseCandidate>> {
        self.record(format!("list_releases {}", repository));
        self.releases
            .get(repository)
            .cloned()
            .ok_or_else(|| Self::not_found(repository))
    }

    fn latest_commit(&self, repository: &str, git_ref: &str) -> Result<CommitInfo> {
        self.record(format!("latest_commit {} {}", repository, git_ref));
        self.commits
            .get(&(repository.to_string(), git_ref.to_string()))
            .cloned()
            .ok_or_else(|| Self::not_found(git_ref))
    }

    fn default_branch(&self, repository: &str) -> Result<String> {
        self.record(format!("default_branch {}", repository));
        self.default_branches
            .get(repository)
            .cloned()
            .ok_or_else(|| Self::not_found(repository))
    }

    fn list_workflow_paths(&self, repository: &str) -> Result<Vec<String>> {
        self.record(format!("list_workflow_paths {}", repository));
        if self.workflow_listing_fails {
            return Err(UpdaterError::api(403, "Resource not accessible by integration"));
        }
        Ok(self.workflow_paths.clone())
    }

    fn create_pull_request(&self, draft: &PullRequestDraft) -> Result<PullRequestOutcome> {
        if self.pull_request_exists {
            return Ok(PullRequestOutcome::AlreadyExists);
        }

        let mut pull_requests = self.pull_requests.borrow_mut();
        pull_requests.push(draft.clone());
        let number = pull_requests.len() as u64;

        Ok(PullRequestOutcome::Created {
            number,
            html_url: format!("https://github.com/{}/pull/{}", draft.repository, number),
        })
    }

    fn request_reviewers(
        &self,
        _repository: &str,
        number: u64,
        users: &BTreeSet<String>,
        teams: &BTreeSet<String>,
    ) -> Result<()> {
        if users.is_empty() && teams.is_empty() {
            return Ok(());
        }
        self.reviewers
            .borrow_mut()
            .push((number, users.clone(), teams.clone()));
        Ok(())
    }

    fn add_labels(&self, _repository: &str, number: u64, labels: &BTreeSet<String>) -> Result<()> {
        if labels.is_empty() {
            return Ok(());
        }
        self.labels.borrow_mut().push((number, labels.clone()));
        Ok(())
    }
}
