use std::fmt;

/// Non-fatal conditions raised while scanning and resolving workflows.
/// Each one is scoped to a single file or reference and never aborts a run.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateWarning {
    /// A `uses` value without an `@version` part, or a `docker://` image
    UnsupportedReference { token: String },
    /// The pinned version is not `major.minor.patch`, so the newest release is picked blindly
    NonSemanticVersion {
        repository: String,
        current_version: String,
    },
    /// A GitHub lookup failed for one repository
    LookupFailed { repository: String, reason: String },
    /// No newer version qualifies under the configured policy
    NoUpdateFound { token: String },
    /// A workflow path was listed but does not exist in the workspace
    WorkflowNotFound { path: String },
    /// A workflow file could not be parsed as YAML
    MalformedWorkflow { path: String, reason: String },
    /// The workflow tree nests deeper than the scanner will follow
    ScanDepthExceeded { limit: usize },
}

impl UpdateWarning {
    /// Report this warning on the log channel
    pub fn emit(&self) {
        match self {
            UpdateWarning::UnsupportedReference { .. } | UpdateWarning::NoUpdateFound { .. } => {
                tracing::info!("{}", self)
            }
            UpdateWarning::MalformedWorkflow { .. } => tracing::error!("{}", self),
            _ => tracing::warn!("{}", self),
        }
    }
}

impl fmt::Display for UpdateWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateWarning::UnsupportedReference { token } => write!(
                f,
                "Action \"{}\" is in an unsupported format. Only community actions pinned with '@' are supported",
                token
            ),
            UpdateWarning::NonSemanticVersion {
                repository,
                current_version,
            } => write!(
                f,
                "Current version (`{}`) of `{}` does not follow Semantic Versioning. \
                 The newest release will be suggested, please review the update carefully",
                current_version, repository
            ),
            UpdateWarning::LookupFailed { repository, reason } => {
                write!(f, "Lookup failed for \"{}\": {}", repository, reason)
            }
            UpdateWarning::NoUpdateFound { token } => {
                write!(f, "Could not find any new version for {}. Skipping...", token)
            }
            UpdateWarning::WorkflowNotFound { path } => {
                write!(f, "Workflow file '{}' not found", path)
            }
            UpdateWarning::MalformedWorkflow { path, reason } => {
                write!(f, "Error while parsing YAML from '{}'. Reason: {}", path, reason)
            }
            UpdateWarning::ScanDepthExceeded { limit } => write!(
                f,
                "Workflow nests deeper than {} levels; deeper entries were not scanned",
                limit
            ),
        }
    }
}

/// Run `f` with a subscriber that records every event, returning the log text
#[cfg(test)]
pub(crate) fn capture_logs<F: FnOnce()>(f: F) -> String {
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    let buffer = Buffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    tracing::subscriber::with_default(subscriber, f);

    let bytes = buffer.0.lock().unwrap().clone();
    String::from_utf8_lossy(&bytes).into_owned()
}
