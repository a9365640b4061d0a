use crate::error::Result;
use crate::git::{CommitAuthor, GitRepository};
use std::cell::RefCell;

/// A commit recorded by [MockRepository]
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCommit {
    pub message: String,
    pub author: CommitAuthor,
    pub branch: String,
    pub force: bool,
}

/// Mock repository for testing without actual git operations
#[derive(Default)]
pub struct MockRepository {
    changed: bool,
    diff: String,
    branches: RefCell<Vec<(String, String)>>,
    commits: RefCell<Vec<RecordedCommit>>,
}

impl MockRepository {
    /// Create a new clean mock repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Report pending changes with the given diff text
    pub fn with_changes(diff: impl Into<String>) -> Self {
        MockRepository {
            changed: true,
            diff: diff.into(),
            ..Self::default()
        }
    }

    /// Branches created so far as `(base, branch)`
    pub fn branches(&self) -> Vec<(String, String)> {
        self.branches.borrow().clone()
    }

    /// Commits pushed so far
    pub fn commits(&self) -> Vec<RecordedCommit> {
        self.commits.borrow().clone()
    }
}

impl GitRepository for MockRepository {
    fn has_changes(&self) -> Result<bool> {
        Ok(self.changed)
    }

    fn diff(&self) -> Result<String> {
        Ok(self.diff.clone())
    }

    fn create_branch(&self, base: &str, branch: &str) -> Result<()> {
        self.branches
            .borrow_mut()
            .push((base.to_string(), branch.to_string()));
        Ok(())
    }

    fn commit_and_push(
        &self,
        message: &str,
        author: &CommitAuthor,
        branch: &str,
        force: bool,
    ) -> Result<()> {
        self.commits.borrow_mut().push(RecordedCommit {
            message: message.to_string(),
            author: author.clone(),
            branch: branch.to_string(),
            force,
        });
        Ok(())
    }
}
