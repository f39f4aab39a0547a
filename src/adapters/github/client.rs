//! GitHub HTTP client.
//!
//! Wraps the GitHub REST API v3 and the GraphQL endpoint, providing the
//! calls the mirror needs as an [`IssueTracker`]. Read-only calls are
//! retried with exponential backoff on network errors, 5xx and 429;
//! mutations are sent exactly once.

use std::time::Duration;

use async_trait::async_trait;
use backoff::{ExponentialBackoff, ExponentialBackoffBuilder};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::domain::errors::{MirrorError, MirrorResult};
use crate::domain::models::{Comment, Config, Issue, IssueUpdate, NewIssue, RepoRef, RetryConfig};
use crate::domain::ports::IssueTracker;

use super::models::{
    DeleteIssueData, GitHubCommentRequest, GitHubCreateIssueResponse, GraphQlRequest,
    GraphQlResponse, IssueIdData,
};

/// Base URL for the GitHub REST API v3.
const GITHUB_API_BASE: &str = "https://api.github.com";

/// GitHub GraphQL endpoint.
const GITHUB_GRAPHQL_URL: &str = "https://api.github.com/graphql";

/// Comments fetched per listing; only the first page is read.
const COMMENTS_PER_PAGE: u32 = 100;

const ISSUE_ID_QUERY: &str = "query($owner: String!, $name: String!, $number: Int!) {
  repository(owner: $owner, name: $name) {
    issue(number: $number) {
      id
    }
  }
}";

const DELETE_ISSUE_MUTATION: &str = "mutation($issueId: ID!) {
  deleteIssue(input: { issueId: $issueId }) {
    repository {
      id
    }
  }
}";

type Attempt<T> = Result<T, backoff::Error<MirrorError>>;

fn into_inner(err: backoff::Error<MirrorError>) -> MirrorError {
    match err {
        backoff::Error::Permanent(err) | backoff::Error::Transient { err, .. } => err,
    }
}

/// HTTP client for the GitHub REST and GraphQL APIs.
///
/// All methods return [`MirrorResult`]; HTTP 404 maps to
/// [`MirrorError::NotFound`] and every other failure to
/// [`MirrorError::Tracker`] naming the operation.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    /// The underlying HTTP client.
    http: Client,
    /// Token of the bot account.
    token: String,
    api_url: String,
    graphql_url: String,
    retry: RetryConfig,
}

impl GitHubClient {
    /// Create a new client against github.com with the given token.
    pub fn new(token: String) -> Self {
        Self {
            http: Client::new(),
            token,
            api_url: GITHUB_API_BASE.to_string(),
            graphql_url: GITHUB_GRAPHQL_URL.to_string(),
            retry: RetryConfig::default(),
        }
    }

    /// Create a client from the loaded configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.token.clone())
            .with_base_urls(&config.api_url, &config.graphql_url)
            .with_retry(config.retry.clone())
    }

    /// Point the client at other endpoints (GitHub Enterprise, test servers).
    pub fn with_base_urls(mut self, api_url: &str, graphql_url: &str) -> Self {
        self.api_url = api_url.trim_end_matches('/').to_string();
        self.graphql_url = graphql_url.to_string();
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Build an authorized request.
    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.http
            .request(method, url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .header("User-Agent", "issue-mirror")
    }

    fn repo_url(&self, repo: &RepoRef, path: &str) -> String {
        format!("{}/repos/{}/{}{path}", self.api_url, repo.owner, repo.name)
    }

    fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoffBuilder::new()
            .with_initial_interval(Duration::from_millis(self.retry.initial_backoff_ms))
            .with_max_interval(Duration::from_millis(self.retry.max_backoff_ms))
            .with_max_elapsed_time(None)
            .build()
    }

    /// Send a request once, classifying failures as transient or permanent.
    async fn send(operation: &'static str, request: RequestBuilder) -> Attempt<Response> {
        let resp = request.send().await.map_err(|e| {
            backoff::Error::transient(MirrorError::tracker(operation, format!("request failed: {e}")))
        })?;

        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let body = resp.text().await.unwrap_or_default();
        if status == StatusCode::NOT_FOUND {
            return Err(backoff::Error::permanent(MirrorError::NotFound(format!(
                "{operation} returned {status}: {body}"
            ))));
        }

        let err = MirrorError::tracker(operation, format!("returned {status}: {body}"));
        if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
            Err(backoff::Error::transient(err))
        } else {
            Err(backoff::Error::permanent(err))
        }
    }

    /// Send a mutation exactly once.
    async fn send_once(operation: &'static str, request: RequestBuilder) -> MirrorResult<Response> {
        Self::send(operation, request).await.map_err(into_inner)
    }

    /// Send a read-only request, retrying transient failures up to
    /// `retry.max_retries` times.
    async fn send_with_retry<F>(&self, operation: &'static str, make_request: F) -> MirrorResult<Response>
    where
        F: Fn() -> RequestBuilder,
    {
        let max_retries = self.retry.max_retries;
        let mut attempts = 0_u32;

        backoff::future::retry(self.backoff(), || {
            attempts += 1;
            let attempt = attempts;
            let request = make_request();
            async move {
                Self::send(operation, request).await.map_err(|err| match err {
                    backoff::Error::Transient { err, .. } if attempt > max_retries => {
                        backoff::Error::permanent(err)
                    }
                    backoff::Error::Transient { err, retry_after } => {
                        tracing::warn!(operation, attempt, error = %err, "transient GitHub failure, retrying");
                        backoff::Error::Transient { err, retry_after }
                    }
                    permanent @ backoff::Error::Permanent(_) => permanent,
                })
            }
        })
        .await
    }

    async fn parse_json<T: DeserializeOwned>(operation: &'static str, resp: Response) -> MirrorResult<T> {
        resp.json::<T>()
            .await
            .map_err(|e| MirrorError::tracker(operation, format!("parse failed: {e}")))
    }

    /// Run a GraphQL document and return its `data`, surfacing `errors`.
    async fn graphql<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        query: &str,
        variables: serde_json::Value,
        retry: bool,
    ) -> MirrorResult<T> {
        let body = GraphQlRequest { query, variables };
        let make_request = || {
            self.request(Method::POST, &self.graphql_url).json(&body)
        };

        let resp = if retry {
            self.send_with_retry(operation, make_request).await?
        } else {
            Self::send_once(operation, make_request()).await?
        };

        let parsed: GraphQlResponse<T> = Self::parse_json(operation, resp).await?;
        if let Some(message) = parsed.error_message() {
            return Err(if parsed.is_not_found() {
                MirrorError::NotFound(format!("{operation}: {message}"))
            } else {
                MirrorError::tracker(operation, message)
            });
        }
        parsed
            .data
            .ok_or_else(|| MirrorError::tracker(operation, "response carried no data"))
    }
}

#[async_trait]
impl IssueTracker for GitHubClient {
    async fn list_comments(&self, repo: &RepoRef, issue_number: u64) -> MirrorResult<Vec<Comment>> {
        let url = self.repo_url(
            repo,
            &format!("/issues/{issue_number}/comments?per_page={COMMENTS_PER_PAGE}"),
        );
        let resp = self
            .send_with_retry("list_comments", || self.request(Method::GET, &url))
            .await?;
        Self::parse_json("list_comments", resp).await
    }

    async fn create_comment(
        &self,
        repo: &RepoRef,
        issue_number: u64,
        body: &str,
    ) -> MirrorResult<Comment> {
        let url = self.repo_url(repo, &format!("/issues/{issue_number}/comments"));
        let req_body = GitHubCommentRequest {
            body: body.to_string(),
        };
        let resp =
            Self::send_once("create_comment", self.request(Method::POST, &url).json(&req_body))
                .await?;
        Self::parse_json("create_comment", resp).await
    }

    async fn delete_comment(&self, repo: &RepoRef, comment_id: u64) -> MirrorResult<()> {
        let url = self.repo_url(repo, &format!("/issues/comments/{comment_id}"));
        Self::send_once("delete_comment", self.request(Method::DELETE, &url))
            .await?;
        Ok(())
    }

    async fn create_issue(&self, repo: &RepoRef, issue: &NewIssue) -> MirrorResult<u64> {
        let url = self.repo_url(repo, "/issues");
        let resp = Self::send_once("create_issue", self.request(Method::POST, &url).json(issue))
            .await?;
        let created: GitHubCreateIssueResponse = Self::parse_json("create_issue", resp).await?;
        tracing::debug!(number = created.number, url = %created.html_url, "GitHub issue created");
        Ok(created.number)
    }

    async fn get_issue(&self, repo: &RepoRef, issue_number: u64) -> MirrorResult<Issue> {
        let url = self.repo_url(repo, &format!("/issues/{issue_number}"));
        let resp = self
            .send_with_retry("get_issue", || self.request(Method::GET, &url))
            .await?;
        Self::parse_json("get_issue", resp).await
    }

    async fn update_issue(
        &self,
        repo: &RepoRef,
        issue_number: u64,
        update: &IssueUpdate,
    ) -> MirrorResult<()> {
        let url = self.repo_url(repo, &format!("/issues/{issue_number}"));
        Self::send_once("update_issue", self.request(Method::PATCH, &url).json(update))
            .await?;
        Ok(())
    }

    async fn issue_node_id(&self, repo: &RepoRef, issue_number: u64) -> MirrorResult<String> {
        let variables = serde_json::json!({
            "owner": repo.owner,
            "name": repo.name,
            "number": issue_number,
        });
        let data: IssueIdData = self
            .graphql("issue_node_id", ISSUE_ID_QUERY, variables, true)
            .await?;
        data.repository
            .and_then(|repository| repository.issue)
            .map(|issue| issue.id)
            .ok_or_else(|| MirrorError::NotFound(format!("issue {repo}#{issue_number}")))
    }

    async fn delete_issue(&self, node_id: &str) -> MirrorResult<()> {
        let variables = serde_json::json!({ "issueId": node_id });
        let data: DeleteIssueData = self
            .graphql("delete_issue", DELETE_ISSUE_MUTATION, variables, false)
            .await?;
        if data.delete_issue.is_none() {
            return Err(MirrorError::tracker("delete_issue", "mutation returned no payload"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_new() {
        let client = GitHubClient::new("ghp_test_token".to_string());
        assert_eq!(client.token, "ghp_test_token");
        assert_eq!(client.api_url, GITHUB_API_BASE);
    }

    #[test]
    fn test_with_base_urls_trims_trailing_slash() {
        let client = GitHubClient::new("t".to_string())
            .with_base_urls("http://127.0.0.1:1234/", "http://127.0.0.1:1234/graphql");
        assert_eq!(
            client.repo_url(&RepoRef::new("acme", "pub"), "/issues/3"),
            "http://127.0.0.1:1234/repos/acme/pub/issues/3"
        );
    }

    #[test]
    fn test_from_config() {
        let config = Config {
            token: "tok".to_string(),
            api_url: "http://localhost:9".to_string(),
            ..Default::default()
        };
        let client = GitHubClient::from_config(&config);
        assert_eq!(client.api_url, "http://localhost:9");
        assert_eq!(client.retry.max_retries, config.retry.max_retries);
    }

    #[test]
    fn test_into_inner_unwraps_both_kinds() {
        let permanent = into_inner(backoff::Error::permanent(MirrorError::MissingLink));
        assert!(matches!(permanent, MirrorError::MissingLink));
        let transient = into_inner(backoff::Error::transient(MirrorError::MissingLink));
        assert!(matches!(transient, MirrorError::MissingLink));
    }
}
