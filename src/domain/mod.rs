//! Domain logic - pure rules independent of the GitHub API and git

pub mod reference;
pub mod release;
pub mod version;

pub use reference::ActionReference;
pub use release::{BranchInfo, CommitInfo, ReleaseCandidate};
pub use version::{ParsedVersion, ReleaseType, Version};
