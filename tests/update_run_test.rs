// tests/update_run_test.rs
use gha_version_updater::changeset::CHANGE_SET_HEADING;
use gha_version_updater::cli::{run_update_workflow, RunOutcome};
use gha_version_updater::config::{ActionEnvironment, Config};
use gha_version_updater::git::{Git2Repository, MockRepository};
use gha_version_updater::github::MockGitHub;
use gha_version_updater::resolver::UpdateStrategy;
use git2::{IndexAddOption, Repository, Signature};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const CI_WORKFLOW: &str = "name: CI\non: push\njobs:\n  build:\n    runs-on: ubuntu-latest\n    steps:\n      - uses: actions/checkout@v2\n      - run: make test\n";

fn write_file(root: &Path, path: &str, content: &str) {
    let full = root.join(path);
    fs::create_dir_all(full.parent().unwrap()).unwrap();
    fs::write(full, content).unwrap();
}

fn checkout_releases() -> MockGitHub {
    let mut api = MockGitHub::new();
    api.add_release("actions/checkout", "v4", "2023-09-04T12:00:00Z", false);
    api.add_release("actions/checkout", "v3", "2022-03-01T12:00:00Z", false);
    api.add_release("actions/checkout", "v2", "2020-01-01T12:00:00Z", false);
    api
}

fn environment(workspace: &Path) -> ActionEnvironment {
    let mut env = ActionEnvironment::new("o/r", "refs/heads/main", workspace);
    env.step_summary = Some(workspace.join("summary.md"));
    env.output = Some(workspace.join("output"));
    env
}

fn commit_everything(workspace: &Path) -> Repository {
    let repo = Repository::init(workspace).unwrap();
    {
        let mut index = repo.index().unwrap();
        index
            .add_all(["*"].iter(), IndexAddOption::DEFAULT, None)
            .unwrap();
        index.write().unwrap();
        let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
        let sig = Signature::now("Test Bot", "bot@example.test").unwrap();
        repo.commit(Some("HEAD"), &sig, &sig, "init", &tree, &[])
            .unwrap();
    }
    repo
}

#[test]
fn test_end_to_end_release_tag_update() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), ".github/workflows/ci.yml", CI_WORKFLOW);

    let api = checkout_releases();
    let git = MockRepository::with_changes("diff");
    let env = environment(dir.path());

    let outcome = run_update_workflow(&Config::default(), &env, &api, &git).unwrap();
    assert_eq!(outcome, RunOutcome::PullRequestOpened { number: 1 });

    let updated = fs::read_to_string(dir.path().join(".github/workflows/ci.yml")).unwrap();
    assert_eq!(updated, CI_WORKFLOW.replace("actions/checkout@v2", "actions/checkout@v4"));

    let pull_requests = api.pull_requests();
    assert_eq!(pull_requests.len(), 1);
    let body_lines: Vec<&str> = pull_requests[0].body.lines().collect();
    assert_eq!(body_lines.len(), 2);
    assert_eq!(body_lines[0], CHANGE_SET_HEADING);
    assert!(body_lines[1].contains("actions/checkout"));
    assert!(body_lines[1].contains("**[v4]("));
    assert!(body_lines[1].ends_with("on 2023-09-04T12:00:00Z"));

    assert_eq!(pull_requests[0].base_branch, "main");
    assert_eq!(pull_requests[0].head_branch, "gh-actions-workflow-updates");
    assert_eq!(git.branches(), vec![("main".to_string(), "gh-actions-workflow-updates".to_string())]);
    assert_eq!(git.commits()[0].message, "Update GitHub Action Versions");

    let summary = fs::read_to_string(dir.path().join("summary.md")).unwrap();
    assert!(summary.starts_with(CHANGE_SET_HEADING));
    let output = fs::read_to_string(dir.path().join("output")).unwrap();
    assert_eq!(output, "GHA_UPDATE_PR_NUMBER=1\n");
}

#[test]
fn test_second_run_changes_nothing() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), ".github/workflows/ci.yml", CI_WORKFLOW);
    let api = checkout_releases();
    let env = environment(dir.path());

    run_update_workflow(&Config::default(), &env, &api, &MockRepository::with_changes("diff"))
        .unwrap();
    let after_first = fs::read_to_string(dir.path().join(".github/workflows/ci.yml")).unwrap();

    let outcome = run_update_workflow(&Config::default(), &env, &api, &MockRepository::new()).unwrap();
    let after_second = fs::read_to_string(dir.path().join(".github/workflows/ci.yml")).unwrap();

    assert_eq!(outcome, RunOutcome::UpToDate);
    assert_eq!(after_first, after_second);
}

#[test]
fn test_resolution_is_shared_across_files() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), ".github/workflows/ci.yml", CI_WORKFLOW);
    write_file(dir.path(), ".github/workflows/lint.yaml", CI_WORKFLOW);
    let api = checkout_releases();
    let git = MockRepository::with_changes("diff");

    run_update_workflow(&Config::default(), &environment(dir.path()), &api, &git).unwrap();

    let lookups = api
        .calls()
        .into_iter()
        .filter(|call| call == "list_releases actions/checkout")
        .count();
    assert_eq!(lookups, 1);
    assert_eq!(api.pull_requests()[0].body.lines().count(), 2);
    for file in [".github/workflows/ci.yml", ".github/workflows/lint.yaml"] {
        let text = fs::read_to_string(dir.path().join(file)).unwrap();
        assert!(text.contains("actions/checkout@v4"));
    }
}

#[test]
fn test_ignored_action_is_never_resolved() {
    let dir = TempDir::new().unwrap();
    let workflow = "jobs:\n  a:\n    steps:\n      - uses: actions/cache@v3\n      - uses: actions/checkout@v2\n";
    write_file(dir.path(), ".github/workflows/a.yml", workflow);
    write_file(dir.path(), ".github/workflows/b.yml", "steps:\n  - uses: actions/cache@v3\n");

    let mut api = checkout_releases();
    api.add_release("actions/cache", "v4", "2024-01-17T00:00:00Z", false);
    let config = Config {
        ignore_actions: ["actions/cache".to_string()].into_iter().collect(),
        ..Config::default()
    };

    run_update_workflow(&config, &environment(dir.path()), &api, &MockRepository::with_changes("diff"))
        .unwrap();

    assert!(!api.calls().iter().any(|call| call.contains("actions/cache")));
    let b = fs::read_to_string(dir.path().join(".github/workflows/b.yml")).unwrap();
    assert_eq!(b, "steps:\n  - uses: actions/cache@v3\n");
}

#[test]
fn test_ignore_entry_with_version() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), ".github/workflows/ci.yml", CI_WORKFLOW);
    let api = checkout_releases();
    let config = Config {
        ignore_actions: ["actions/checkout@v2".to_string()].into_iter().collect(),
        ..Config::default()
    };

    let outcome = run_update_workflow(&config, &environment(dir.path()), &api, &MockRepository::new())
        .unwrap();

    assert_eq!(outcome, RunOutcome::UpToDate);
    assert!(api.calls().iter().all(|call| !call.starts_with("list_releases")));
}

#[test]
fn test_malformed_workflow_is_skipped() {
    let dir = TempDir::new().unwrap();
    let broken = "jobs: [unclosed\n  uses: actions/checkout@v2\n";
    write_file(dir.path(), ".github/workflows/broken.yml", broken);
    write_file(dir.path(), ".github/workflows/ci.yml", CI_WORKFLOW);
    let api = checkout_releases();

    let outcome = run_update_workflow(
        &Config::default(),
        &environment(dir.path()),
        &api,
        &MockRepository::with_changes("diff"),
    )
    .unwrap();

    assert_eq!(outcome, RunOutcome::PullRequestOpened { number: 1 });
    assert_eq!(
        fs::read_to_string(dir.path().join(".github/workflows/broken.yml")).unwrap(),
        broken
    );
    assert!(fs::read_to_string(dir.path().join(".github/workflows/ci.yml"))
        .unwrap()
        .contains("actions/checkout@v4"));
}

#[test]
fn test_no_workflow_is_fatal() {
    let dir = TempDir::new().unwrap();
    let api = MockGitHub::new();

    let err = run_update_workflow(&Config::default(), &environment(dir.path()), &api, &MockRepository::new())
        .unwrap_err();
    assert!(err.to_string().contains("No workflow found"));
}

#[test]
fn test_release_commit_sha_strategy() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), ".github/workflows/ci.yml", CI_WORKFLOW);
    let mut api = checkout_releases();
    api.set_commit("actions/checkout", "v4", "8ade135a41bc03ea155e62e844d188df1ea18608", "2023-09-04T11:00:00Z");
    let config = Config {
        update_version_with: UpdateStrategy::ReleaseCommitSha,
        ..Config::default()
    };

    run_update_workflow(&config, &environment(dir.path()), &api, &MockRepository::with_changes("diff"))
        .unwrap();

    let updated = fs::read_to_string(dir.path().join(".github/workflows/ci.yml")).unwrap();
    assert!(updated.contains("actions/checkout@8ade135a41bc03ea155e62e844d188df1ea18608"));
    let body = &api.pull_requests()[0].body;
    assert!(body.contains("added a new **[commit](https://github.com/actions/checkout/commit/8ade135a41bc03ea155e62e844d188df1ea18608)**"));
    assert!(body.contains("**[v4](https://github.com/actions/checkout/releases/tag/v4)** tag"));
}

#[test]
fn test_default_branch_strategy() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), ".github/workflows/ci.yml", CI_WORKFLOW);
    let mut api = MockGitHub::new();
    api.set_default_branch("actions/checkout", "main");
    api.set_commit("actions/checkout", "main", "b4ffde65f46336ab88eb53be808477a3936bae11", "2024-02-01T00:00:00Z");
    let config = Config {
        update_version_with: UpdateStrategy::DefaultBranchCommitSha,
        ..Config::default()
    };

    run_update_workflow(&config, &environment(dir.path()), &api, &MockRepository::with_changes("diff"))
        .unwrap();

    let body = &api.pull_requests()[0].body;
    assert!(body.contains("**[main](https://github.com/actions/checkout/tree/main)** branch on 2024-02-01T00:00:00Z"));
}

#[test]
fn test_existing_pull_request() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), ".github/workflows/ci.yml", CI_WORKFLOW);
    let mut api = checkout_releases();
    api.set_pull_request_exists(true);
    let config = Config {
        pull_request_labels: ["dependencies".to_string()].into_iter().collect(),
        ..Config::default()
    };

    let outcome = run_update_workflow(&config, &environment(dir.path()), &api, &MockRepository::with_changes("diff"))
        .unwrap();

    assert_eq!(outcome, RunOutcome::PullRequestExists);
    assert!(api.label_requests().is_empty());
    assert!(!dir.path().join("output").exists());
}

#[test]
fn test_reviewers_and_labels_requested() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), ".github/workflows/ci.yml", CI_WORKFLOW);
    let api = checkout_releases();
    let config = Config {
        pull_request_user_reviewers: ["octocat".to_string()].into_iter().collect(),
        pull_request_team_reviewers: ["maintainers".to_string()].into_iter().collect(),
        pull_request_labels: ["dependencies".to_string()].into_iter().collect(),
        force_push: true,
        ..Config::default()
    };

    run_update_workflow(&config, &environment(dir.path()), &api, &MockRepository::with_changes("diff"))
        .unwrap();

    let reviewers = api.reviewer_requests();
    assert_eq!(reviewers.len(), 1);
    assert_eq!(reviewers[0].0, 1);
    assert!(reviewers[0].1.contains("octocat"));
    assert!(reviewers[0].2.contains("maintainers"));
    assert_eq!(api.label_requests().len(), 1);
}

#[test]
fn test_skip_pull_request_reports_diff() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), ".github/workflows/ci.yml", CI_WORKFLOW);
    let repo = commit_everything(dir.path());
    let git = Git2Repository::from_git2(repo);

    let api = checkout_releases();
    let mut env = ActionEnvironment::new("o/r", "main", dir.path());
    let summary_dir = TempDir::new().unwrap();
    env.step_summary = Some(summary_dir.path().join("summary.md"));
    let config = Config {
        skip_pull_request: true,
        ..Config::default()
    };

    let outcome = run_update_workflow(&config, &env, &api, &git).unwrap();
    assert_eq!(outcome, RunOutcome::ChangesPendingReview);
    assert!(api.pull_requests().is_empty());

    let summary = fs::read_to_string(summary_dir.path().join("summary.md")).unwrap();
    assert!(summary.starts_with(CHANGE_SET_HEADING));
    assert!(summary.contains("<details><summary>Git Diff</summary>"));
    assert!(summary.contains("-      - uses: actions/checkout@v2"));
    assert!(summary.contains("+      - uses: actions/checkout@v4"));
}

#[test]
fn test_up_to_date_repository() {
    let dir = TempDir::new().unwrap();
    write_file(
        dir.path(),
        ".github/workflows/ci.yml",
        &CI_WORKFLOW.replace("actions/checkout@v2", "actions/checkout@v4"),
    );
    let git = Git2Repository::from_git2(commit_everything(dir.path()));
    let api = checkout_releases();

    let outcome = run_update_workflow(&Config::default(), &environment(dir.path()), &api, &git).unwrap();
    assert_eq!(outcome, RunOutcome::UpToDate);
}
