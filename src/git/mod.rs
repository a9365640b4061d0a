//! Git operations abstraction layer
//!
//! The updater touches git only after every workflow file has been processed:
//! to check whether the files on disk actually changed, to show the diff, and
//! to publish the changes on a new branch. The [GitRepository] trait covers
//! those operations. Implementations:
//!
//! - [repository::Git2Repository]: a real implementation using the `git2` crate
//! - [mock::MockRepository]: a mock implementation for testing

pub mod mock;
pub mod repository;

pub use mock::MockRepository;
pub use repository::Git2Repository;

use crate::error::Result;

/// Identity used for the update commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitAuthor {
    pub name: String,
    pub email: String,
}

impl std::fmt::Display for CommitAuthor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}

/// Common git operation trait for abstraction
pub trait GitRepository {
    /// Whether tracked files in the working tree differ from the index
    fn has_changes(&self) -> Result<bool>;

    /// Unified diff of the working tree against the index
    fn diff(&self) -> Result<String>;

    /// Create (or reset) `branch` at `base` and make it HEAD.
    ///
    /// The working tree is left untouched so pending edits carry over.
    fn create_branch(&self, base: &str, branch: &str) -> Result<()>;

    /// Stage everything, commit as `author`, and push `branch` to origin
    fn commit_and_push(
        &self,
        message: &str,
        author: &CommitAuthor,
        branch: &str,
        force: bool,
    ) -> Result<()>;
}
