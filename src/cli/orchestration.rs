//! Main update workflow orchestration logic
//!
//! This module contains the update run that the binary drives. It is kept
//! apart from argument parsing so the whole run can be exercised with
//! [crate::github::MockGitHub] and [crate::git::MockRepository].

use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::changeset::ChangeSet;
use crate::config::{ActionEnvironment, Config};
use crate::domain::ActionReference;
use crate::git::GitRepository;
use crate::github::{GitHubApi, PullRequestDraft, PullRequestOutcome};
use crate::patch::PatchEngine;
use crate::resolver::{Resolution, ResolutionCache, ResolutionPolicy, VersionResolver};
use crate::scanner::{ConfigNode, WorkflowScanner};
use crate::summary::{diff_details, RunReport};
use crate::warning::UpdateWarning;

/// Directory holding the repository's own workflows
pub const WORKFLOW_DIR: &str = ".github/workflows";

/// Output carrying the number of the opened pull request
pub const PR_NUMBER_OUTPUT: &str = "GHA_UPDATE_PR_NUMBER";

/// How a run ended
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// No file changed on disk
    UpToDate,
    /// Changes were pushed and a pull request opened
    PullRequestOpened { number: u64 },
    /// Changes were pushed; a pull request for the branch was already open
    PullRequestExists,
    /// Changes were found but pull requests are disabled; the diff is in the job summary
    ChangesPendingReview,
}

/// One workflow file and its rewritten text
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowFile {
    pub path: PathBuf,
    pub raw_text: String,
    pub updated_text: String,
    pub changed: bool,
}

impl WorkflowFile {
    pub fn read(path: &Path) -> std::io::Result<Self> {
        let raw_text = fs::read_to_string(path)?;
        Ok(WorkflowFile {
            path: path.to_path_buf(),
            updated_text: raw_text.clone(),
            raw_text,
            changed: false,
        })
    }

    /// Rewrite old tokens to new ones, returning the old tokens that were found
    pub fn apply<'a, I>(&mut self, engine: &PatchEngine, replacements: I) -> BTreeSet<String>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let (updated, replaced) = engine.apply_tracked(&self.raw_text, replacements);
        self.updated_text = updated;
        self.changed = !replaced.is_empty();
        replaced
    }

    /// Write the updated text back if anything changed
    pub fn write_back(&self) -> std::io::Result<()> {
        if self.changed {
            fs::write(&self.path, &self.updated_text)?;
        }
        Ok(())
    }
}

/// Collect the workflow paths to check, relative to the workspace.
///
/// Paths come from the API's workflow list, the workspace's
/// `.github/workflows` directory and the configured extra locations.
pub fn discover_workflow_paths(
    api: &dyn GitHubApi,
    env: &ActionEnvironment,
    config: &Config,
) -> BTreeSet<String> {
    let mut paths = BTreeSet::new();

    match api.list_workflow_paths(&env.repository) {
        Ok(listed) => paths.extend(listed),
        Err(e) => UpdateWarning::LookupFailed {
            repository: env.repository.clone(),
            reason: e.to_string(),
        }
        .emit(),
    }

    paths.extend(yaml_files_in(&env.workspace, WORKFLOW_DIR));

    for location in &config.extra_workflow_locations {
        if env.workspace.join(location).is_dir() {
            paths.extend(yaml_files_in(&env.workspace, location));
        } else {
            paths.insert(location.clone());
        }
    }

    paths
}

fn yaml_files_in(workspace: &Path, dir: &str) -> Vec<String> {
    let Ok(entries) = fs::read_dir(workspace.join(dir)) else {
        return Vec::new();
    };

    entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| name.ends_with(".yml") || name.ends_with(".yaml"))
        .map(|name| format!("{}/{}", dir.trim_end_matches('/'), name))
        .collect()
}

/// Check one workflow file for updates and rewrite it in place.
///
/// Returns `changes` extended with this file's updates. Every failure is
/// scoped to the file or a single reference and only logged.
pub fn process_workflow_file(
    path: &Path,
    policy: &ResolutionPolicy,
    resolver: &mut VersionResolver<'_>,
    scanner: &WorkflowScanner,
    engine: &PatchEngine,
    changes: ChangeSet,
) -> ChangeSet {
    let shown = path.display().to_string();
    let _span = tracing::info_span!("workflow", path = %shown).entered();
    tracing::info!("Checking for updates");

    let mut file = match WorkflowFile::read(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            UpdateWarning::WorkflowNotFound { path: shown }.emit();
            return changes;
        }
        Err(e) => {
            UpdateWarning::MalformedWorkflow {
                path: shown,
                reason: e.to_string(),
            }
            .emit();
            return changes;
        }
    };

    let tree = match ConfigNode::from_yaml_str(&file.raw_text) {
        Ok(tree) => tree,
        Err(e) => {
            UpdateWarning::MalformedWorkflow {
                path: shown,
                reason: e.to_string(),
            }
            .emit();
            return changes;
        }
    };

    let mut pending: Vec<(String, String, String, Resolution)> = Vec::new();

    for token in scanner.scan(&tree) {
        let reference = match ActionReference::parse(&token) {
            Ok(reference) => reference,
            Err(_) => {
                UpdateWarning::UnsupportedReference { token }.emit();
                continue;
            }
        };

        if policy.is_ignored(&reference) {
            tracing::debug!(action = %reference, "Skipping ignored action");
            continue;
        }

        let repository = reference.repository();
        let Some(resolution) = resolver.resolve(&repository, &reference.pinned_version) else {
            UpdateWarning::NoUpdateFound { token }.emit();
            continue;
        };

        let updated = reference.with_version(&resolution.version);
        if updated == reference.raw_token {
            tracing::info!(repository = %repository, "No updates found");
            continue;
        }

        tracing::info!(from = %reference.raw_token, to = %updated, "Found new version");
        pending.push((reference.raw_token, updated, repository, resolution));
    }

    let replaced = file.apply(
        engine,
        pending.iter().map(|(old, new, _, _)| (old.as_str(), new.as_str())),
    );

    let mut file_changes = ChangeSet::new();
    for (old, _, repository, resolution) in &pending {
        if replaced.contains(old) {
            file_changes.record(repository, resolution);
        } else {
            tracing::warn!(token = %old, "Reference not found in the file text; left unchanged");
        }
    }

    if file.changed {
        if let Err(e) = file.write_back() {
            tracing::error!(error = %e, "Cannot write updated workflow");
            return changes;
        }
        tracing::info!(updates = file_changes.len(), "Updated workflow file");
    }

    changes.merge(file_changes)
}

/// Main update workflow
///
/// Orchestrates the entire run:
/// 1. Discover workflow files
/// 2. Resolve and rewrite every pinned action in each file
/// 3. If files changed on disk, write the summary and either open a pull
///    request or publish the diff for review
///
/// # Returns
///
/// How the run ended, or an error for run-fatal conditions such as having
/// no workflow file at all
pub fn run_update_workflow(
    config: &Config,
    env: &ActionEnvironment,
    api: &dyn GitHubApi,
    git: &dyn GitRepository,
) -> Result<RunOutcome> {
    let paths = discover_workflow_paths(api, env, config);
    if paths.is_empty() {
        bail!(
            "No workflow found in \"{}\". Skipping GitHub Actions version update",
            env.repository
        );
    }

    if !config.ignore_actions.is_empty() {
        tracing::info!(ignored = ?config.ignore_actions, "Actions will be skipped");
    }

    let policy = config.to_policy();
    let scanner = WorkflowScanner::default();
    let engine = PatchEngine::new().context("Failed to build the token matcher")?;
    let mut resolver = VersionResolver::new(api, &policy, ResolutionCache::new());

    let changes = paths.iter().fold(ChangeSet::new(), |changes, path| {
        process_workflow_file(
            &env.workspace.join(path),
            &policy,
            &mut resolver,
            &scanner,
            &engine,
            changes,
        )
    });

    let report = RunReport::new(env.step_summary.clone(), env.output.clone());

    if !git.has_changes().context("Failed to check for changed files")? {
        tracing::info!("Everything is up-to-date!");
        return Ok(RunOutcome::UpToDate);
    }

    let body = changes.to_markdown();
    report
        .append_summary(&body)
        .context("Failed to write the job summary")?;

    if config.skip_pull_request {
        let diff = git.diff().context("Failed to read the git diff")?;
        report
            .append_summary(&diff_details(&diff))
            .context("Failed to write the job summary")?;
        return Ok(RunOutcome::ChangesPendingReview);
    }

    open_pull_request(config, env, api, git, &report, body)
}

fn open_pull_request(
    config: &Config,
    env: &ActionEnvironment,
    api: &dyn GitHubApi,
    git: &dyn GitRepository,
    report: &RunReport,
    body: String,
) -> Result<RunOutcome> {
    let head_branch = config.head_branch();

    git.create_branch(&env.base_branch, &head_branch)
        .with_context(|| format!("Failed to create branch {}", head_branch))?;
    git.commit_and_push(
        &config.commit_message,
        &config.commit_author(),
        &head_branch,
        config.force_push,
    )
    .with_context(|| format!("Failed to push branch {}", head_branch))?;

    let draft = PullRequestDraft {
        repository: env.repository.clone(),
        title: config.pull_request_title.clone(),
        head_branch,
        base_branch: env.base_branch.clone(),
        body,
    };

    match api
        .create_pull_request(&draft)
        .with_context(|| format!("Could not create a pull request on {}", env.repository))?
    {
        PullRequestOutcome::Created { number, html_url } => {
            tracing::info!(number, url = %html_url, "Pull request opened");
            report
                .set_output(PR_NUMBER_OUTPUT, &number.to_string())
                .context("Failed to set the pull request output")?;

            if let Err(e) = api.request_reviewers(
                &env.repository,
                number,
                &config.pull_request_user_reviewers,
                &config.pull_request_team_reviewers,
            ) {
                tracing::warn!(number, error = %e, "Could not request reviewers");
            }
            if let Err(e) = api.add_labels(&env.repository, number, &config.pull_request_labels) {
                tracing::warn!(number, error = %e, "Could not add labels");
            }

            Ok(RunOutcome::PullRequestOpened { number })
        }
        PullRequestOutcome::AlreadyExists => {
            tracing::info!("A pull request already exists");
            Ok(RunOutcome::PullRequestExists)
        }
    }
}
