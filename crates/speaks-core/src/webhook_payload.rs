use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
/// Account fields the bot reads from GitHub payloads.
pub struct UserPayload {
    pub login: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
/// Repository fields of a webhook delivery.
pub struct RepositoryPayload {
    pub full_name: String,
    #[serde(default)]
    pub default_branch: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
/// Head side of a pull request: commit and source branch.
pub struct HeadRefPayload {
    pub sha: String,
    #[serde(rename = "ref")]
    pub ref_name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
/// Privacy flag carried on the base repository.
pub struct BaseRepoPayload {
    pub private: bool,
}

impl Default for BaseRepoPayload {
    fn default() -> Self {
        Self { private: false }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
/// Base side of a pull request: target branch and its repository.
pub struct BaseRefPayload {
    #[serde(rename = "ref")]
    pub ref_name: String,
    #[serde(default)]
    pub repo: Option<BaseRepoPayload>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
/// The pull-request resource, either embedded in a `pull_request` event or
/// fetched through the API for comment-triggered deliveries.
pub struct PullRequestPayload {
    pub number: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub diff_url: Option<String>,
    #[serde(default)]
    pub commits_url: Option<String>,
    pub user: UserPayload,
    pub head: HeadRefPayload,
    pub base: BaseRefPayload,
}

impl PullRequestPayload {
    pub fn is_private(&self) -> bool {
        self.base.repo.as_ref().map(|repo| repo.private).unwrap_or(false)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
/// Pull-request pointer nested inside an issue payload. Present only when
/// the underlying issue is a pull request.
pub struct IssuePullRequestPayload {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
/// Issue fields of an `issue_comment` delivery.
pub struct IssuePayload {
    #[serde(default)]
    pub pull_request: Option<IssuePullRequestPayload>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
/// Comment fields of an `issue_comment` delivery.
pub struct CommentPayload {
    pub user: UserPayload,
    pub html_url: String,
    #[serde(default)]
    pub body: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
/// Envelope of a `pull_request` event.
pub struct PullRequestEventPayload {
    pub action: String,
    pub repository: RepositoryPayload,
    pub pull_request: PullRequestPayload,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
/// Envelope of an `issue_comment` event.
pub struct IssueCommentEventPayload {
    pub action: String,
    pub repository: RepositoryPayload,
    pub issue: IssuePayload,
    pub comment: CommentPayload,
}
