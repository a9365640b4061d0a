use crate::error::{Result, UpdaterError};
use crate::git::{CommitAuthor, GitRepository};
use git2::{
    Cred, CredentialType, DiffFormat, IndexAddOption, Oid, PushOptions, RemoteCallbacks,
    Repository as Git2Repo, Signature,
};
use std::path::Path;

/// Wrapper around git2::Repository with our trait interface
pub struct Git2Repository {
    repo: Git2Repo,
    token: Option<String>,
}

impl Git2Repository {
    /// Open or discover a git repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path)?;

        Ok(Git2Repository { repo, token: None })
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Self {
        Git2Repository { repo, token: None }
    }

    /// Authenticate pushes over HTTPS with a GitHub token
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.is_empty());
        self
    }

    /// Stage every change in the working tree and commit it on HEAD
    pub fn commit_all(&self, message: &str, author: &CommitAuthor) -> Result<Oid> {
        let mut index = self.repo.index()?;
        index.add_all(["*"].iter(), IndexAddOption::DEFAULT, None)?;
        index.write()?;

        let tree = self.repo.find_tree(index.write_tree()?)?;
        let signature = Signature::now(&author.name, &author.email)?;
        let parent = self.repo.head()?.peel_to_commit()?;

        let oid = self.repo.commit(
            Some("HEAD"),
            &signature,
            &signature,
            message,
            &tree,
            &[&parent],
        )?;
        tracing::info!(commit = %oid, "Committed workflow updates");
        Ok(oid)
    }

    fn push(&self, branch: &str, force: bool) -> Result<()> {
        let mut remote = self
            .repo
            .find_remote("origin")
            .map_err(|e| UpdaterError::config(format!("Cannot find remote 'origin': {}", e)))?;

        let mut callbacks = RemoteCallbacks::new();
        let token = self.token.clone();
        callbacks.credentials(move |_url, _username, allowed_types| {
            match &token {
                Some(token) if allowed_types.contains(CredentialType::USER_PASS_PLAINTEXT) => {
                    Cred::userpass_plaintext("x-access-token", token)
                }
                _ => Cred::default(),
            }
        });
        callbacks.push_update_reference(|refname, status| match status {
            Some(status) => Err(git2::Error::from_str(&format!(
                "Push rejected for {}: {}",
                refname, status
            ))),
            None => Ok(()),
        });

        let mut push_options = PushOptions::new();
        push_options.remote_callbacks(callbacks);

        let refspec = format!(
            "{}refs/heads/{}:refs/heads/{}",
            if force { "+" } else { "" },
            branch,
            branch
        );
        remote.push(&[refspec.as_str()], Some(&mut push_options))?;

        tracing::info!(branch, force, "Pushed branch to origin");
        Ok(())
    }
}

impl GitRepository for Git2Repository {
    fn has_changes(&self) -> Result<bool> {
        let diff = self.repo.diff_index_to_workdir(None, None)?;
        Ok(diff.stats()?.files_changed() > 0)
    }

    fn diff(&self) -> Result<String> {
        let diff = self.repo.diff_index_to_workdir(None, None)?;
        let mut patch = String::new();

        diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
            if matches!(line.origin(), '+' | '-' | ' ') {
                patch.push(line.origin());
            }
            patch.push_str(&String::from_utf8_lossy(line.content()));
            true
        })?;

        Ok(patch)
    }

    fn create_branch(&self, base: &str, branch: &str) -> Result<()> {
        let base_commit = self.repo.revparse_single(base)?.peel_to_commit()?;
        self.repo.branch(branch, &base_commit, true)?;
        self.repo.set_head(&format!("refs/heads/{}", branch))?;

        tracing::info!(base, branch, "Created branch");
        Ok(())
    }

    fn commit_and_push(
        &self,
        message: &str,
        author: &CommitAuthor,
        branch: &str,
        force: bool,
    ) -> Result<()> {
        self.commit_all(message, author)?;
        self.push(branch, force)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn author() -> CommitAuthor {
        CommitAuthor {
            name: "Test Bot".to_string(),
            email: "bot@example.test".to_string(),
        }
    }

    fn init_repo() -> (TempDir, Git2Repository) {
        let dir = TempDir::new().unwrap();
        let repo = Git2Repo::init(dir.path()).unwrap();
        fs::write(dir.path().join("ci.yml"), "- uses: actions/checkout@v3\n").unwrap();

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

        (dir, Git2Repository::from_git2(repo))
    }

    #[test]
    fn test_clean_repository_has_no_changes() {
        let (_dir, repo) = init_repo();
        assert!(!repo.has_changes().unwrap());
        assert!(repo.diff().unwrap().is_empty());
    }

    #[test]
    fn test_modified_file_shows_in_diff() {
        let (dir, repo) = init_repo();
        fs::write(dir.path().join("ci.yml"), "- uses: actions/checkout@v4\n").unwrap();

        assert!(repo.has_changes().unwrap());
        let diff = repo.diff().unwrap();
        assert!(diff.contains("-- uses: actions/checkout@v3"));
        assert!(diff.contains("+- uses: actions/checkout@v4"));
    }

    #[test]
    fn test_create_branch_and_commit() {
        let (dir, repo) = init_repo();
        fs::write(dir.path().join("ci.yml"), "- uses: actions/checkout@v4\n").unwrap();

        let head = repo.repo.head().unwrap().shorthand().unwrap().to_string();
        repo.create_branch(&head, "workflow-updates").unwrap();
        assert!(repo.has_changes().unwrap());

        repo.commit_all("Update GitHub Action Versions", &author())
            .unwrap();

        let current = repo.repo.head().unwrap();
        assert_eq!(current.shorthand(), Some("workflow-updates"));
        assert_eq!(
            current.peel_to_commit().unwrap().message(),
            Some("Update GitHub Action Versions")
        );
        assert!(!repo.has_changes().unwrap());
    }

    #[test]
    fn test_push_without_origin_fails() {
        let (_dir, repo) = init_repo();
        assert!(repo
            .commit_and_push("msg", &author(), "workflow-updates", false)
            .is_err());
    }
}
