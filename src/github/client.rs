use std::collections::BTreeSet;
use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{GitHubApi, PullRequestDraft, PullRequestOutcome, RELEASES_PER_PAGE};
use crate::domain::{CommitInfo, ReleaseCandidate};
use crate::error::{Result, UpdaterError};

/// Default REST API endpoint
pub const DEFAULT_API_URL: &str = "https://api.github.com";

#[derive(Debug, Deserialize)]
struct ReleaseResponse {
    tag_name: String,
    #[serde(default)]
    published_at: Option<String>,
    html_url: String,
    #[serde(default)]
    prerelease: bool,
}

#[derive(Debug, Deserialize)]
struct CommitResponse {
    sha: String,
    html_url: String,
    commit: CommitDetails,
}

#[derive(Debug, Deserialize)]
struct CommitDetails {
    author: CommitAuthor,
}

#[derive(Debug, Deserialize)]
struct CommitAuthor {
    date: String,
}

#[derive(Debug, Deserialize)]
struct RepositoryResponse {
    default_branch: String,
}

#[derive(Debug, Deserialize)]
struct WorkflowsResponse {
    workflows: Vec<WorkflowEntry>,
}

#[derive(Debug, Deserialize)]
struct WorkflowEntry {
    path: String,
}

#[derive(Debug, Deserialize)]
struct CreatedPullRequest {
    number: u64,
    html_url: String,
}

#[derive(Debug, Serialize)]
struct PullRequestPayload<'a> {
    title: &'a str,
    head: &'a str,
    base: &'a str,
    body: &'a str,
}

#[derive(Debug, Serialize)]
struct ReviewersPayload<'a> {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    reviewers: Vec<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    team_reviewers: Vec<&'a str>,
}

#[derive(Debug, Serialize)]
struct LabelsPayload<'a> {
    labels: Vec<&'a str>,
}

/// Blocking GitHub REST API client
pub struct GitHubClient {
    base_url: String,
    token: Option<String>,
    client: Client,
}

impl GitHubClient {
    /// Create a client for `base_url`, authenticating with `token` when given
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(format!("gha-version-updater/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(GitHubClient {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.is_empty()),
            client,
        })
    }

    fn with_headers(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28");

        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(url = %url, ?query, "GET");

        let response = self
            .with_headers(self.client.get(&url))
            .query(query)
            .send()?;
        Self::parse(Self::expect_status(response, StatusCode::OK)?)
    }

    fn post<B: Serialize>(&self, path: &str, body: &B) -> Result<Response> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(url = %url, "POST");

        Ok(self.with_headers(self.client.post(&url)).json(body).send()?)
    }

    fn expect_status(response: Response, expected: StatusCode) -> Result<Response> {
        let status = response.status();
        if status == expected {
            return Ok(response);
        }

        let message = response
            .text()
            .unwrap_or_else(|_| "Unknown error".to_string());
        Err(UpdaterError::api(status.as_u16(), message))
    }

    fn parse<T: DeserializeOwned>(response: Response) -> Result<T> {
        response
            .json()
            .map_err(|e| UpdaterError::response(e.to_string()))
    }
}

impl GitHubApi for GitHubClient {
    fn list_releases(&self, repository: &str) -> Result<Vec<ReleaseCandidate>> {
        let per_page = RELEASES_PER_PAGE.to_string();
        let releases: Vec<ReleaseResponse> = self.get(
            &format!("/repos/{}/releases", repository),
            &[("per_page", per_page.as_str())],
        )?;

        Ok(releases
            .into_iter()
            .map(|r| {
                ReleaseCandidate::new(
                    r.tag_name,
                    r.published_at.unwrap_or_default(),
                    r.html_url,
                    r.prerelease,
                )
            })
            .collect())
    }

    fn latest_commit(&self, repository: &str, git_ref: &str) -> Result<CommitInfo> {
        let commits: Vec<CommitResponse> =
            self.get(&format!("/repos/{}/commits", repository), &[("sha", git_ref)])?;

        let newest = commits.into_iter().next().ok_or_else(|| {
            UpdaterError::response(format!("no commits returned for '{}'", git_ref))
        })?;

        Ok(CommitInfo {
            sha: newest.sha,
            commit_url: newest.html_url,
            commit_date: newest.commit.author.date,
        })
    }

    fn default_branch(&self, repository: &str) -> Result<String> {
        let repo: RepositoryResponse = self.get(&format!("/repos/{}", repository), &[])?;
        Ok(repo.default_branch)
    }

    fn list_workflow_paths(&self, repository: &str) -> Result<Vec<String>> {
        let response: WorkflowsResponse =
            self.get(&format!("/repos/{}/actions/workflows", repository), &[])?;
        Ok(response.workflows.into_iter().map(|w| w.path).collect())
    }

    fn create_pull_request(&self, draft: &PullRequestDraft) -> Result<PullRequestOutcome> {
        let payload = PullRequestPayload {
            title: &draft.title,
            head: &draft.head_branch,
            base: &draft.base_branch,
            body: &draft.body,
        };
        let response = self.post(&format!("/repos/{}/pulls", draft.repository), &payload)?;

        match response.status() {
            StatusCode::CREATED => {
                let created: CreatedPullRequest = Self::parse(response)?;
                Ok(PullRequestOutcome::Created {
                    number: created.number,
                    html_url: created.html_url,
                })
            }
            StatusCode::UNPROCESSABLE_ENTITY => {
                let message = response.text().unwrap_or_default();
                if message.contains("A pull request already exists for") {
                    Ok(PullRequestOutcome::AlreadyExists)
                } else {
                    Err(UpdaterError::api(422, message))
                }
            }
            status => Err(UpdaterError::api(
                status.as_u16(),
                response.text().unwrap_or_default(),
            )),
        }
    }

    fn request_reviewers(
        &self,
        repository: &str,
        number: u64,
        users: &BTreeSet<String>,
        teams: &BTreeSet<String>,
    ) -> Result<()> {
        if users.is_empty() && teams.is_empty() {
            return Ok(());
        }

        let payload = ReviewersPayload {
            reviewers: users.iter().map(String::as_str).collect(),
            team_reviewers: teams.iter().map(String::as_str).collect(),
        };
        let response = self.post(
            &format!("/repos/{}/pulls/{}/requested_reviewers", repository, number),
            &payload,
        )?;
        Self::expect_status(response, StatusCode::CREATED)?;
        Ok(())
    }

    fn add_labels(&self, repository: &str, number: u64, labels: &BTreeSet<String>) -> Result<()> {
        if labels.is_empty() {
            return Ok(());
        }

        let payload = LabelsPayload {
            labels: labels.iter().map(String::as_str).collect(),
        };
        let response = self.post(
            &format!("/repos/{}/issues/{}/labels", repository, number),
            &payload,
        )?;
        Self::expect_status(response, StatusCode::OK)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = GitHubClient::new("https://api.github.com/", None).unwrap();
        assert_eq!(client.base_url, "https://api.github.com");
    }

    #[test]
    fn test_empty_token_is_ignored() {
        let client = GitHubClient::new(DEFAULT_API_URL, Some(String::new())).unwrap();
        assert!(client.token.is_none());
    }
}
