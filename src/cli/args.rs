//! Command line and action input parsing
//!
//! Every option doubles as a GitHub Actions input: the runner exposes
//! `with:` values as `INPUT_*` environment variables, which clap reads
//! when the flag is absent.

use std::path::PathBuf;

use clap::builder::BoolishValueParser;
use clap::Parser;

use crate::config::{parse_comma_set, parse_ignore_list, ActionEnvironment, Config, Token};
use crate::domain::ReleaseType;
use crate::error::{Result, UpdaterError};
use crate::github::client::DEFAULT_API_URL;

#[derive(Debug, Clone, Parser)]
#[command(
    name = "gha-version-updater",
    version,
    about = "Keep the actions pinned in GitHub workflow files up to date"
)]
pub struct Args {
    #[arg(short, long, help = "Custom configuration file path")]
    pub config: Option<PathBuf>,

    #[arg(short, long, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(long, env = "INPUT_TOKEN", hide_env_values = true, help = "GitHub token")]
    pub token: Option<String>,

    #[arg(
        long,
        env = "INPUT_UPDATE_VERSION_WITH",
        help = "release-tag, release-commit-sha or default-branch-sha"
    )]
    pub update_version_with: Option<String>,

    #[arg(
        long,
        env = "INPUT_RELEASE_TYPES",
        help = "Comma-separated release types to accept (major, minor, patch or all)"
    )]
    pub release_types: Option<String>,

    #[arg(
        long,
        env = "INPUT_IGNORE",
        help = "Actions to skip, as a JSON array or comma-separated list"
    )]
    pub ignore: Option<String>,

    #[arg(
        long,
        env = "INPUT_SKIP_PULL_REQUEST",
        value_parser = BoolishValueParser::new(),
        help = "Only report the diff instead of opening a pull request"
    )]
    pub skip_pull_request: Option<bool>,

    #[arg(
        long,
        env = "INPUT_EXTRA_WORKFLOW_LOCATIONS",
        help = "Comma-separated extra workflow files or directories"
    )]
    pub extra_workflow_locations: Option<String>,

    #[arg(long, env = "INPUT_PULL_REQUEST_TITLE")]
    pub pull_request_title: Option<String>,

    #[arg(long, env = "INPUT_COMMIT_MESSAGE")]
    pub commit_message: Option<String>,

    #[arg(
        long,
        env = "INPUT_PULL_REQUEST_BRANCH",
        help = "Head branch name, or 'generate' for a timestamped one"
    )]
    pub pull_request_branch: Option<String>,

    #[arg(long, env = "INPUT_PULL_REQUEST_USER_REVIEWERS")]
    pub pull_request_user_reviewers: Option<String>,

    #[arg(long, env = "INPUT_PULL_REQUEST_TEAM_REVIEWERS")]
    pub pull_request_team_reviewers: Option<String>,

    #[arg(long, env = "INPUT_PULL_REQUEST_LABELS")]
    pub pull_request_labels: Option<String>,

    #[arg(long, env = "INPUT_COMMITTER_USERNAME")]
    pub committer_username: Option<String>,

    #[arg(long, env = "INPUT_COMMITTER_EMAIL")]
    pub committer_email: Option<String>,

    #[arg(long, env = "INPUT_FORCE_PUSH", value_parser = BoolishValueParser::new())]
    pub force_push: Option<bool>,

    #[arg(long, env = "GITHUB_REPOSITORY", help = "Repository being updated (owner/repo)")]
    pub repository: Option<String>,

    #[arg(long, env = "GITHUB_REF", help = "Base branch for the pull request")]
    pub base_ref: Option<String>,

    #[arg(long, env = "GITHUB_WORKSPACE", default_value = ".")]
    pub workspace: PathBuf,

    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    #[arg(long, env = "GITHUB_STEP_SUMMARY")]
    pub step_summary: Option<PathBuf>,

    #[arg(long, env = "GITHUB_OUTPUT")]
    pub output: Option<PathBuf>,
}

/// A value that was actually provided; empty inputs count as unset
fn provided(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl Args {
    /// Layer command line and input values over a loaded configuration
    pub fn apply(&self, config: &mut Config) -> Result<()> {
        if let Some(token) = provided(&self.token) {
            config.token = Some(Token::new(token));
        }
        if let Some(strategy) = provided(&self.update_version_with) {
            config.update_version_with = strategy.parse()?;
        }
        if let Some(types) = provided(&self.release_types) {
            config.release_types = ReleaseType::parse_list(types)?;
        }
        if let Some(ignore) = provided(&self.ignore) {
            config.ignore_actions = parse_ignore_list(ignore)?;
        }
        if let Some(skip) = self.skip_pull_request {
            config.skip_pull_request = skip;
        }
        if let Some(locations) = provided(&self.extra_workflow_locations) {
            config.extra_workflow_locations = parse_comma_set(locations);
        }
        if let Some(title) = provided(&self.pull_request_title) {
            config.pull_request_title = title.to_string();
        }
        if let Some(message) = provided(&self.commit_message) {
            config.commit_message = message.to_string();
        }
        if let Some(branch) = provided(&self.pull_request_branch) {
            config.pull_request_branch = branch.to_string();
        }
        if let Some(users) = provided(&self.pull_request_user_reviewers) {
            config.pull_request_user_reviewers = parse_comma_set(users);
        }
        if let Some(teams) = provided(&self.pull_request_team_reviewers) {
            config.pull_request_team_reviewers = parse_comma_set(teams);
        }
        if let Some(labels) = provided(&self.pull_request_labels) {
            config.pull_request_labels = parse_comma_set(labels);
        }
        if let Some(username) = provided(&self.committer_username) {
            config.committer_username = username.to_string();
        }
        if let Some(email) = provided(&self.committer_email) {
            config.committer_email = email.to_string();
        }
        if let Some(force) = self.force_push {
            config.force_push = force;
        }
        Ok(())
    }

    /// Runner-provided values describing the repository
    pub fn environment(&self) -> Result<ActionEnvironment> {
        let repository = provided(&self.repository).ok_or_else(|| {
            UpdaterError::config("Repository is not set (GITHUB_REPOSITORY or --repository)")
        })?;
        let base_ref = provided(&self.base_ref).ok_or_else(|| {
            UpdaterError::config("Base branch is not set (GITHUB_REF or --base-ref)")
        })?;

        let mut env = ActionEnvironment::new(repository, base_ref, self.workspace.clone());
        env.api_url = self.api_url.clone();
        env.step_summary = self.step_summary.clone();
        env.output = self.output.clone();
        Ok(env)
    }
}
