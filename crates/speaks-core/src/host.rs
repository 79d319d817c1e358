use anyhow::Result;
use async_trait::async_trait;

use crate::canonical_request::{CanonicalRequest, RepoRef};
use crate::webhook_payload::PullRequestPayload;

#[derive(Debug, Clone, PartialEq, Eq)]
/// One existing comment on a pull request, oldest-first in listings.
pub struct IssueCommentRecord {
    pub id: u64,
    pub author_login: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// API response fields kept after a comment create/update. GitHub can omit
/// `html_url` on some responses; the client normalizes that to empty.
pub struct CommentWriteResponse {
    pub id: u64,
    pub html_url: String,
}

/// Narrow GitHub surface the pipeline calls through. The core crates never
/// talk to the network themselves; the runtime provides the real client and
/// tests provide in-memory fakes.
#[async_trait]
pub trait GithubHost: Send + Sync {
    /// Whether the bot can read the repository at all. A failed lookup means
    /// the delivery is treated as invalid, not as an error.
    async fn repository_readable(&self, repo: &RepoRef) -> bool;

    /// Fetches the pull-request resource behind a comment-triggered event.
    async fn fetch_pull_request(&self, api_url: &str) -> Result<PullRequestPayload>;

    /// Fetches the PR's unified diff. Private repositories go through the
    /// authenticated endpoint with the diff media type; public ones use the
    /// anonymous diff URL.
    async fn fetch_diff(&self, request: &CanonicalRequest) -> Result<String>;

    /// Fetches one file at a commit or branch. `None` means the file does
    /// not exist at that ref.
    async fn fetch_file(&self, repo: &RepoRef, git_ref: &str, path: &str)
        -> Result<Option<String>>;

    async fn list_comments(&self, repo: &RepoRef, pr_number: u64)
        -> Result<Vec<IssueCommentRecord>>;

    async fn create_comment(
        &self,
        repo: &RepoRef,
        pr_number: u64,
        body: &str,
    ) -> Result<CommentWriteResponse>;

    async fn update_comment(
        &self,
        repo: &RepoRef,
        comment_id: u64,
        body: &str,
    ) -> Result<CommentWriteResponse>;

    /// Commit messages of every commit on the PR, in listing order.
    async fn list_commit_messages(&self, commits_url: &str) -> Result<Vec<String>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Captured output of one linter invocation. `scratch_name` is the filename
/// the linter saw; diagnostics are prefixed with it and must be rewritten to
/// the real repository path.
pub struct LinterInvocation {
    pub scratch_name: String,
    pub stdout_lines: Vec<String>,
}

/// Runs the external linter over one file's source text. Spawning processes
/// and scratch files live behind this trait; the core stays pure.
#[async_trait]
pub trait LinterRunner: Send + Sync {
    async fn run(&self, linter: &str, args: &[String], source: &str) -> Result<LinterInvocation>;
}
