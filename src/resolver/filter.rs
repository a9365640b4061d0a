use std::collections::BTreeSet;

use crate::domain::{ReleaseCandidate, ReleaseType, Version};

/// Decides which releases count as an acceptable upgrade under the allowed
/// release types.
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseFilter {
    allowed: BTreeSet<ReleaseType>,
}

impl ReleaseFilter {
    pub fn new(allowed: BTreeSet<ReleaseType>) -> Self {
        ReleaseFilter { allowed }
    }

    /// Whether every release type is allowed, which disables filtering
    pub fn allows_all(&self) -> bool {
        ReleaseType::ALL.iter().all(|t| self.allowed.contains(t))
    }

    /// Whether `candidate` qualifies as an upgrade from `current`
    pub fn qualifies(&self, candidate: &Version, current: &Version) -> bool {
        self.allows_all()
            || self
                .allowed
                .iter()
                .any(|release_type| candidate.is_upgrade_of(current, *release_type))
    }

    /// First qualifying release of `sorted` (newest first).
    ///
    /// Releases whose tag is not semantic are never selected here.
    pub fn select<'r>(
        &self,
        current: &Version,
        sorted: &'r [ReleaseCandidate],
    ) -> Option<&'r ReleaseCandidate> {
        sorted.iter().find(|release| {
            release
                .version
                .semantic()
                .is_some_and(|candidate| self.qualifies(candidate, current))
        })
    }
}
