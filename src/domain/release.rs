use super::version::ParsedVersion;

/// A published, non-draft release of an action repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseCandidate {
    pub tag_name: String,
    pub published_at: String,
    pub html_url: String,
    pub prerelease: bool,
    pub version: ParsedVersion,
}

impl ReleaseCandidate {
    pub fn new(
        tag_name: impl Into<String>,
        published_at: impl Into<String>,
        html_url: impl Into<String>,
        prerelease: bool,
    ) -> Self {
        let tag_name = tag_name.into();
        let version = ParsedVersion::parse(&tag_name);

        ReleaseCandidate {
            tag_name,
            published_at: published_at.into(),
            html_url: html_url.into(),
            prerelease,
            version,
        }
    }
}

/// Commit information for a tag or branch head
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    pub sha: String,
    pub commit_url: String,
    pub commit_date: String,
}

/// Branch a commit was fetched from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchInfo {
    pub branch_name: String,
    pub branch_url: String,
}

/// Sort releases newest first: semantic tags in descending order, then opaque
/// tags in their original order.
pub fn sort_descending(releases: &mut [ReleaseCandidate]) {
    releases.sort_by(|a, b| match (a.version.semantic(), b.version.semantic()) {
        (Some(a), Some(b)) => b.cmp(a),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
}
