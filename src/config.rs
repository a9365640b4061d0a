use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::ReleaseType;
use crate::error::{Result, UpdaterError};
use crate::git::CommitAuthor;
use crate::github::client::DEFAULT_API_URL;
use crate::resolver::{ResolutionPolicy, UpdateStrategy};

/// Name of the configuration file looked up in the workspace and config dir
pub const CONFIG_FILE_NAME: &str = "actions-version-updater.toml";

/// Head branch used for the update pull request unless configured otherwise
pub const DEFAULT_PULL_REQUEST_BRANCH: &str = "gh-actions-workflow-updates";

/// Branch setting that asks for a fresh, timestamped branch name
pub const GENERATE_BRANCH: &str = "generate";

/// A GitHub token that never shows up in logs
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    pub fn new(value: impl Into<String>) -> Self {
        Token(value.into())
    }

    /// The raw token, for request headers and git credentials only
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token(***)")
    }
}

/// Represents the complete configuration for one update run.
///
/// Everything except the token can come from the TOML file; command line and
/// action inputs override file values.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    #[serde(skip)]
    pub token: Option<Token>,

    pub update_version_with: UpdateStrategy,

    pub release_types: BTreeSet<ReleaseType>,

    pub ignore_actions: BTreeSet<String>,

    pub skip_pull_request: bool,

    pub extra_workflow_locations: BTreeSet<String>,

    pub pull_request_title: String,

    pub commit_message: String,

    pub pull_request_branch: String,

    pub pull_request_user_reviewers: BTreeSet<String>,

    pub pull_request_team_reviewers: BTreeSet<String>,

    pub pull_request_labels: BTreeSet<String>,

    pub committer_username: String,

    pub committer_email: String,

    pub force_push: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            token: None,
            update_version_with: UpdateStrategy::default(),
            release_types: ReleaseType::ALL.into_iter().collect(),
            ignore_actions: BTreeSet::new(),
            skip_pull_request: false,
            extra_workflow_locations: BTreeSet::new(),
            pull_request_title: "Update GitHub Action Versions".to_string(),
            commit_message: "Update GitHub Action Versions".to_string(),
            pull_request_branch: DEFAULT_PULL_REQUEST_BRANCH.to_string(),
            pull_request_user_reviewers: BTreeSet::new(),
            pull_request_team_reviewers: BTreeSet::new(),
            pull_request_labels: BTreeSet::new(),
            committer_username: "github-actions[bot]".to_string(),
            committer_email: "github-actions[bot]@users.noreply.github.com".to_string(),
            force_push: false,
        }
    }
}

impl Config {
    /// Resolution settings derived from this configuration
    pub fn to_policy(&self) -> ResolutionPolicy {
        ResolutionPolicy {
            strategy: self.update_version_with,
            release_types: self.release_types.clone(),
            ignore: self.ignore_actions.clone(),
        }
    }

    /// Identity used for the update commit
    pub fn commit_author(&self) -> CommitAuthor {
        CommitAuthor {
            name: self.committer_username.clone(),
            email: self.committer_email.clone(),
        }
    }

    /// Head branch for the pull request, expanding `generate` to a unique name
    pub fn head_branch(&self) -> String {
        resolve_branch_name(&self.pull_request_branch, chrono::Utc::now().timestamp())
    }

    /// The raw token, if one is configured
    pub fn token(&self) -> Option<&str> {
        self.token.as_ref().map(Token::expose)
    }
}

/// Values the runner provides about the repository being updated
#[derive(Debug, Clone, PartialEq)]
pub struct ActionEnvironment {
    /// `owner/repo` the run belongs to
    pub repository: String,
    /// Branch the update branch starts from and the pull request targets
    pub base_branch: String,
    /// Checkout root; workflow paths are relative to it
    pub workspace: PathBuf,
    pub api_url: String,
    pub step_summary: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

impl ActionEnvironment {
    pub fn new(repository: impl Into<String>, base_branch: &str, workspace: impl Into<PathBuf>) -> Self {
        ActionEnvironment {
            repository: repository.into(),
            base_branch: short_branch_name(base_branch).to_string(),
            workspace: workspace.into(),
            api_url: DEFAULT_API_URL.to_string(),
            step_summary: None,
            output: None,
        }
    }
}

/// Strip `refs/heads/` from a full ref name
pub fn short_branch_name(git_ref: &str) -> &str {
    git_ref.strip_prefix("refs/heads/").unwrap_or(git_ref)
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `.github/actions-version-updater.toml` in the workspace
/// 3. `actions-version-updater.toml` in user config directory
/// 4. Default configuration if no file found
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&Path>, workspace: &Path) -> Result<Config> {
    let path = if let Some(path) = config_path {
        path.to_path_buf()
    } else if workspace.join(".github").join(CONFIG_FILE_NAME).exists() {
        workspace.join(".github").join(CONFIG_FILE_NAME)
    } else if let Some(config_dir) = dirs::config_dir() {
        let path = config_dir.join(CONFIG_FILE_NAME);
        if path.exists() {
            path
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    let config_str = fs::read_to_string(&path)?;
    let config: Config = toml::from_str(&config_str).map_err(|e| {
        UpdaterError::config(format!("Cannot parse {}: {}", path.display(), e))
    })?;

    tracing::debug!(path = %path.display(), "Loaded configuration file");
    Ok(config)
}

/// Parse the ignore input: a JSON array of strings or a comma-separated list
pub fn parse_ignore_list(value: &str) -> Result<BTreeSet<String>> {
    let trimmed = value.trim();

    if trimmed.starts_with('[') && trimmed.ends_with(']') {
        let items: Vec<String> = serde_json::from_str(trimmed).map_err(|_| {
            UpdaterError::config(format!(
                "Invalid input for `ignore` field, expected JSON array of strings but got `{}`",
                value
            ))
        })?;
        return Ok(items
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect());
    }

    Ok(parse_comma_set(trimmed))
}

/// Split a comma-separated input into a set, dropping blanks
pub fn parse_comma_set(value: &str) -> BTreeSet<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Expand the `generate` branch setting with a unix timestamp
pub fn resolve_branch_name(value: &str, timestamp: i64) -> String {
    let value = value.trim();
    if value.is_empty() {
        DEFAULT_PULL_REQUEST_BRANCH.to_string()
    } else if value == GENERATE_BRANCH {
        format!("{}-{}", DEFAULT_PULL_REQUEST_BRANCH, timestamp)
    } else {
        value.to_string()
    }
}
