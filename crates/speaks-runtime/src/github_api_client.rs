use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use speaks_core::webhook_payload::PullRequestPayload;
use speaks_core::{
    CanonicalRequest, CommentWriteResponse, GithubHost, IssueCommentRecord, RepoRef,
};
use tracing::debug;

use crate::transport::{
    is_retryable_github_status, is_retryable_transport_error, parse_retry_after, retry_delay,
    truncate_for_error,
};

const DIFF_MEDIA_TYPE: &str = "application/vnd.github.v3.diff";
const PAGE_SIZE: usize = 100;

#[derive(Debug, Clone)]
/// Connection settings for the GitHub client, filled from the CLI.
pub struct GithubApiSettings {
    pub api_base: String,
    pub raw_base: String,
    pub token: String,
    pub request_timeout_ms: u64,
    pub retry_max_attempts: usize,
    pub retry_base_delay_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
struct CommentRow {
    id: u64,
    user: UserRow,
    body: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct UserRow {
    login: String,
}

#[derive(Debug, Clone, Deserialize)]
struct CommentWriteRow {
    id: u64,
    html_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct CommitRow {
    commit: CommitDetailRow,
}

#[derive(Debug, Clone, Deserialize)]
struct CommitDetailRow {
    message: String,
}

#[derive(Clone)]
/// Authenticated GitHub REST client. Reads retry on rate limits and server
/// errors; comment creation is a single attempt so a slow response can never
/// turn into a duplicate comment.
pub struct GithubApiClient {
    http: reqwest::Client,
    api_base: String,
    raw_base: String,
    retry_max_attempts: usize,
    retry_base_delay_ms: u64,
}

impl GithubApiClient {
    pub fn new(settings: GithubApiSettings) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static("pep8speaks"),
        );
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "x-github-api-version",
            reqwest::header::HeaderValue::from_static("2022-11-28"),
        );
        let auth_header = format!("Bearer {}", settings.token.trim());
        headers.insert(
            reqwest::header::AUTHORIZATION,
            reqwest::header::HeaderValue::from_str(&auth_header)
                .context("invalid github authorization header")?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_millis(settings.request_timeout_ms.max(1)))
            .build()
            .context("failed to create github api client")?;
        Ok(Self {
            http: client,
            api_base: settings.api_base.trim_end_matches('/').to_string(),
            raw_base: settings.raw_base.trim_end_matches('/').to_string(),
            retry_max_attempts: settings.retry_max_attempts.max(1),
            retry_base_delay_ms: settings.retry_base_delay_ms.max(1),
        })
    }

    async fn request_json<T, F>(&self, operation: &str, request_builder: F) -> Result<T>
    where
        T: DeserializeOwned,
        F: FnMut() -> reqwest::RequestBuilder,
    {
        let response = self
            .request_with_retry(operation, request_builder, self.retry_max_attempts)
            .await?;
        response
            .json::<T>()
            .await
            .with_context(|| format!("failed to decode github {operation}"))
    }

    async fn request_text<F>(&self, operation: &str, request_builder: F) -> Result<String>
    where
        F: FnMut() -> reqwest::RequestBuilder,
    {
        let response = self
            .request_with_retry(operation, request_builder, self.retry_max_attempts)
            .await?;
        response
            .text()
            .await
            .with_context(|| format!("failed to read github {operation} body"))
    }

    /// Like `request_text`, but a 404 resolves to `None` instead of an
    /// error. Used for repository files that may simply not exist at a ref.
    async fn request_text_optional<F>(
        &self,
        operation: &str,
        mut request_builder: F,
    ) -> Result<Option<String>>
    where
        F: FnMut() -> reqwest::RequestBuilder,
    {
        let mut attempt = 0_usize;
        loop {
            attempt = attempt.saturating_add(1);
            let send = request_builder()
                .header("x-retry-attempt", attempt.saturating_sub(1).to_string())
                .send()
                .await;
            match send {
                Ok(response) => {
                    let status = response.status();
                    if status == reqwest::StatusCode::NOT_FOUND {
                        return Ok(None);
                    }
                    if status.is_success() {
                        let text = response
                            .text()
                            .await
                            .with_context(|| format!("failed to read github {operation} body"))?;
                        return Ok(Some(text));
                    }
                    let retry_after = parse_retry_after(response.headers());
                    let body = response.text().await.unwrap_or_default();
                    if attempt < self.retry_max_attempts
                        && is_retryable_github_status(status.as_u16(), retry_after)
                    {
                        debug!(operation, attempt, status = status.as_u16(), "retrying");
                        tokio::time::sleep(retry_delay(
                            self.retry_base_delay_ms,
                            attempt,
                            retry_after,
                        ))
                        .await;
                        continue;
                    }
                    bail!(
                        "github api {operation} failed with status {}: {}",
                        status.as_u16(),
                        truncate_for_error(&body, 800)
                    );
                }
                Err(error) => {
                    if attempt < self.retry_max_attempts && is_retryable_transport_error(&error) {
                        tokio::time::sleep(retry_delay(self.retry_base_delay_ms, attempt, None))
                            .await;
                        continue;
                    }
                    return Err(error)
                        .with_context(|| format!("github api {operation} request failed"));
                }
            }
        }
    }

    /// Sends with retries on retryable statuses and transport errors, up to
    /// `max_attempts`. Returns the first successful response; terminal
    /// failures carry the status and a truncated body.
    async fn request_with_retry<F>(
        &self,
        operation: &str,
        mut request_builder: F,
        max_attempts: usize,
    ) -> Result<reqwest::Response>
    where
        F: FnMut() -> reqwest::RequestBuilder,
    {
        let mut attempt = 0_usize;
        loop {
            attempt = attempt.saturating_add(1);
            let send = request_builder()
                .header("x-retry-attempt", attempt.saturating_sub(1).to_string())
                .send()
                .await;
            match send {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return Ok(response);
                    }
                    let retry_after = parse_retry_after(response.headers());
                    let body = response.text().await.unwrap_or_default();
                    if attempt < max_attempts
                        && is_retryable_github_status(status.as_u16(), retry_after)
                    {
                        debug!(operation, attempt, status = status.as_u16(), "retrying");
                        tokio::time::sleep(retry_delay(
                            self.retry_base_delay_ms,
                            attempt,
                            retry_after,
                        ))
                        .await;
                        continue;
                    }
                    bail!(
                        "github api {operation} failed with status {}: {}",
                        status.as_u16(),
                        truncate_for_error(&body, 800)
                    );
                }
                Err(error) => {
                    if attempt < max_attempts && is_retryable_transport_error(&error) {
                        tokio::time::sleep(retry_delay(self.retry_base_delay_ms, attempt, None))
                            .await;
                        continue;
                    }
                    return Err(error)
                        .with_context(|| format!("github api {operation} request failed"));
                }
            }
        }
    }
}

#[async_trait]
impl GithubHost for GithubApiClient {
    async fn repository_readable(&self, repo: &RepoRef) -> bool {
        let url = format!("{}/repos/{}", self.api_base, repo.full_name());
        match self.http.get(url).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    async fn fetch_pull_request(&self, api_url: &str) -> Result<PullRequestPayload> {
        self.request_json("fetch pull request", || self.http.get(api_url))
            .await
    }

    /// Private repositories cannot serve the public `diff_url`, so the diff
    /// is requested through the API with the diff media type instead.
    async fn fetch_diff(&self, request: &CanonicalRequest) -> Result<String> {
        if request.is_private {
            let url = format!(
                "{}/repos/{}/pulls/{}",
                self.api_base,
                request.repository.full_name(),
                request.pr_number
            );
            self.request_text("fetch pull request diff", || {
                self.http
                    .get(&url)
                    .header(reqwest::header::ACCEPT, DIFF_MEDIA_TYPE)
            })
            .await
        } else {
            self.request_text("fetch diff", || self.http.get(&request.diff_url))
                .await
        }
    }

    async fn fetch_file(
        &self,
        repo: &RepoRef,
        git_ref: &str,
        path: &str,
    ) -> Result<Option<String>> {
        let url = format!(
            "{}/{}/{}/{}",
            self.raw_base,
            repo.full_name(),
            git_ref,
            path.trim_start_matches('/')
        );
        self.request_text_optional("fetch raw file", || self.http.get(&url))
            .await
    }

    async fn list_comments(
        &self,
        repo: &RepoRef,
        pr_number: u64,
    ) -> Result<Vec<IssueCommentRecord>> {
        let url = format!(
            "{}/repos/{}/issues/{}/comments",
            self.api_base,
            repo.full_name(),
            pr_number
        );
        let mut page = 1_u32;
        let mut records = Vec::new();
        loop {
            let page_value = page.to_string();
            let chunk: Vec<CommentRow> = self
                .request_json("list pr comments", || {
                    self.http.get(&url).query(&[
                        ("per_page", "100"),
                        ("page", page_value.as_str()),
                    ])
                })
                .await?;
            let chunk_len = chunk.len();
            records.extend(chunk.into_iter().map(|row| IssueCommentRecord {
                id: row.id,
                author_login: row.user.login,
                body: row.body.unwrap_or_default(),
            }));
            if chunk_len < PAGE_SIZE {
                break;
            }
            page = page.saturating_add(1);
        }
        Ok(records)
    }

    /// Single attempt on purpose: a create that times out server-side may
    /// still have landed, and a retry would post a duplicate.
    async fn create_comment(
        &self,
        repo: &RepoRef,
        pr_number: u64,
        body: &str,
    ) -> Result<CommentWriteResponse> {
        let url = format!(
            "{}/repos/{}/issues/{}/comments",
            self.api_base,
            repo.full_name(),
            pr_number
        );
        let payload = json!({ "body": body });
        let response = self
            .request_with_retry("create pr comment", || self.http.post(&url).json(&payload), 1)
            .await?;
        let row: CommentWriteRow = response
            .json()
            .await
            .context("failed to decode github create pr comment")?;
        Ok(CommentWriteResponse {
            id: row.id,
            html_url: row.html_url.unwrap_or_default(),
        })
    }

    async fn update_comment(
        &self,
        repo: &RepoRef,
        comment_id: u64,
        body: &str,
    ) -> Result<CommentWriteResponse> {
        let url = format!(
            "{}/repos/{}/issues/comments/{}",
            self.api_base,
            repo.full_name(),
            comment_id
        );
        let payload = json!({ "body": body });
        let row: CommentWriteRow = self
            .request_json("update pr comment", || self.http.patch(&url).json(&payload))
            .await?;
        Ok(CommentWriteResponse {
            id: row.id,
            html_url: row.html_url.unwrap_or_default(),
        })
    }

    async fn list_commit_messages(&self, commits_url: &str) -> Result<Vec<String>> {
        let mut page = 1_u32;
        let mut messages = Vec::new();
        loop {
            let page_value = page.to_string();
            let chunk: Vec<CommitRow> = self
                .request_json("list pr commits", || {
                    self.http.get(commits_url).query(&[
                        ("per_page", "100"),
                        ("page", page_value.as_str()),
                    ])
                })
                .await?;
            let chunk_len = chunk.len();
            messages.extend(chunk.into_iter().map(|row| row.commit.message));
            if chunk_len < PAGE_SIZE {
                break;
            }
            page = page.saturating_add(1);
        }
        Ok(messages)
    }
}
