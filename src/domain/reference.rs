use crate::error::{Result, UpdaterError};
use std::fmt;

const DOCKER_SCHEME: &str = "docker://";

/// A pinned action reference found in a workflow file.
///
/// `owner/repo[/subpath]@ref` is split on the rightmost `@`. The full location
/// is kept for rewriting, while lookups and ignore matching use only the
/// `owner/repo` part.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ActionReference {
    pub location: String,
    pub pinned_version: String,
    pub raw_token: String,
}

impl ActionReference {
    /// Split a raw `uses` value into location and version.
    ///
    /// `docker://` images are not GitHub repositories and are rejected.
    pub fn parse(token: &str) -> Result<Self> {
        if token.starts_with(DOCKER_SCHEME) {
            return Err(UpdaterError::reference(token));
        }

        let (location, version) = token
            .rsplit_once('@')
            .ok_or_else(|| UpdaterError::reference(token))?;

        Ok(ActionReference {
            location: location.to_string(),
            pinned_version: version.to_string(),
            raw_token: token.to_string(),
        })
    }

    /// The `owner/repo` identity (first two path segments of the location)
    pub fn repository(&self) -> String {
        self.location
            .splitn(3, '/')
            .take(2)
            .collect::<Vec<_>>()
            .join("/")
    }

    /// The token this reference becomes once pinned to `new_version`
    pub fn with_version(&self, new_version: &str) -> String {
        format!("{}@{}", self.location, new_version)
    }

    /// Whether an ignore entry (`owner/repo` or `owner/repo@version`) matches
    pub fn matches_ignore_entry(&self, entry: &str) -> bool {
        let repository = self.repository();
        entry == repository
            || entry == self.location
            || entry == self.raw_token
            || entry == format!("{}@{}", repository, self.pinned_version)
    }
}

impl fmt::Display for ActionReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw_token)
    }
}
