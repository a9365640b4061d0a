use std::collections::BTreeMap;

use crate::github;
use crate::resolver::{Resolution, ResolutionDetails};

/// Heading of the pull request body and job summary
pub const CHANGE_SET_HEADING: &str = "### GitHub Actions Version Updates";

/// Markdown descriptions of applied updates, one per `owner/repo`.
///
/// The same update found in several files is described once. Lines are kept
/// sorted by repository so the rendered body is stable between runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    lines: BTreeMap<String, String>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an update of `repository`; the first description recorded wins
    pub fn record(&mut self, repository: &str, resolution: &Resolution) {
        let line = describe_update(repository, resolution);
        match self.lines.get(repository) {
            Some(existing) if existing != &line => {
                tracing::debug!(repository, "keeping first update description");
            }
            Some(_) => {}
            None => {
                self.lines.insert(repository.to_string(), line);
            }
        }
    }

    /// Fold another file's changes into this one
    pub fn merge(mut self, other: ChangeSet) -> Self {
        for (repository, line) in other.lines {
            self.lines.entry(repository).or_insert(line);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Description lines in repository order
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.values().map(String::as_str)
    }

    /// Markdown body listing every update
    pub fn to_markdown(&self) -> String {
        let mut body = format!("{}\n", CHANGE_SET_HEADING);
        for line in self.lines() {
            body.push_str(line);
            body.push('\n');
        }
        body
    }
}

/// One markdown bullet describing the update of `repository`
pub fn describe_update(repository: &str, resolution: &Resolution) -> String {
    let start = format!(
        "* **[{}]({})**",
        repository,
        github::repository_url(repository)
    );

    match &resolution.details {
        ResolutionDetails::Release(release) => format!(
            "{} published a new release **[{}]({})** on {}",
            start, release.tag_name, release.html_url, release.published_at
        ),
        ResolutionDetails::ReleaseCommit { release, commit } => format!(
            "{} added a new **[commit]({})** to **[{}]({})** tag on {}",
            start, commit.commit_url, release.tag_name, release.html_url, commit.commit_date
        ),
        ResolutionDetails::BranchCommit { branch, commit } => format!(
            "{} added a new **[commit]({})** to **[{}]({})** branch on {}",
            start, commit.commit_url, branch.branch_name, branch.branch_url, commit.commit_date
        ),
    }
}
