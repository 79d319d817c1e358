use serde_json::Value;
use tracing::debug;

use crate::canonical_request::{CanonicalRequest, EventKind, RepoRef, RequestAction};
use crate::host::GithubHost;
use crate::webhook_payload::{
    CommentPayload, IssueCommentEventPayload, PullRequestEventPayload, PullRequestPayload,
    RepositoryPayload,
};

/// The event/action state machine the bot acts on. Anything else produces an
/// invalid request that every downstream stage treats as a no-op.
pub fn is_supported_action(event_kind: EventKind, action: &RequestAction) -> bool {
    match event_kind {
        EventKind::PullRequest => matches!(
            action,
            RequestAction::Opened | RequestAction::Synchronize | RequestAction::Reopened
        ),
        EventKind::IssueComment => {
            matches!(action, RequestAction::Created | RequestAction::Edited)
        }
        _ => false,
    }
}

/// Normalizes one raw webhook payload into a `CanonicalRequest`. Payloads
/// that do not parse, unsupported event/action combinations, unreadable
/// repositories, and comments on plain issues all yield an invalid request
/// rather than an error.
pub async fn build_canonical_request(
    host: &dyn GithubHost,
    event_kind: EventKind,
    payload: &Value,
) -> CanonicalRequest {
    match event_kind {
        EventKind::PullRequest => build_from_pull_request_event(host, payload).await,
        EventKind::IssueComment => build_from_issue_comment_event(host, payload).await,
        other => CanonicalRequest::invalid(other, action_of(payload)),
    }
}

fn action_of(payload: &Value) -> RequestAction {
    let raw = payload
        .get("action")
        .and_then(Value::as_str)
        .unwrap_or_default();
    RequestAction::parse(raw)
}

async fn build_from_pull_request_event(
    host: &dyn GithubHost,
    payload: &Value,
) -> CanonicalRequest {
    let event: PullRequestEventPayload = match serde_json::from_value(payload.clone()) {
        Ok(event) => event,
        Err(error) => {
            debug!(%error, "pull_request payload did not parse");
            return CanonicalRequest::invalid(EventKind::PullRequest, action_of(payload));
        }
    };
    let action = RequestAction::parse(&event.action);
    if !is_supported_action(EventKind::PullRequest, &action) {
        return CanonicalRequest::invalid(EventKind::PullRequest, action);
    }
    assemble(
        host,
        EventKind::PullRequest,
        action,
        &event.repository,
        &event.pull_request,
        None,
        None,
    )
    .await
}

async fn build_from_issue_comment_event(
    host: &dyn GithubHost,
    payload: &Value,
) -> CanonicalRequest {
    let event: IssueCommentEventPayload = match serde_json::from_value(payload.clone()) {
        Ok(event) => event,
        Err(error) => {
            debug!(%error, "issue_comment payload did not parse");
            return CanonicalRequest::invalid(EventKind::IssueComment, action_of(payload));
        }
    };
    let action = RequestAction::parse(&event.action);
    if !is_supported_action(EventKind::IssueComment, &action) {
        return CanonicalRequest::invalid(EventKind::IssueComment, action);
    }
    // Comments on plain issues are not pull requests; nothing to lint.
    let Some(pr_pointer) = event.issue.pull_request.as_ref() else {
        return CanonicalRequest::invalid(EventKind::IssueComment, action);
    };
    let pull_request = match host.fetch_pull_request(&pr_pointer.url).await {
        Ok(pull_request) => pull_request,
        Err(error) => {
            debug!(%error, url = %pr_pointer.url, "pull request lookup failed");
            return CanonicalRequest::invalid(EventKind::IssueComment, action);
        }
    };
    // Comment events carry no base ref of their own; the repository default
    // branch stands in for it when resolving configuration.
    let base_override = event.repository.default_branch.clone();
    assemble(
        host,
        EventKind::IssueComment,
        action,
        &event.repository,
        &pull_request,
        Some(&event.comment),
        base_override,
    )
    .await
}

#[allow(clippy::too_many_arguments)]
async fn assemble(
    host: &dyn GithubHost,
    event_kind: EventKind,
    action: RequestAction,
    repository: &RepositoryPayload,
    pull_request: &PullRequestPayload,
    comment: Option<&CommentPayload>,
    base_override: Option<String>,
) -> CanonicalRequest {
    let Some(repo) = RepoRef::parse(&repository.full_name) else {
        return CanonicalRequest::invalid(event_kind, action);
    };
    if !host.repository_readable(&repo).await {
        debug!(repo = %repo.full_name(), "repository is not readable by the bot");
        return CanonicalRequest::invalid(event_kind, action);
    }
    CanonicalRequest {
        event_kind,
        action,
        is_valid: true,
        repository: repo,
        pr_number: pull_request.number,
        author: pull_request.user.login.clone(),
        base_branch: base_override.unwrap_or_else(|| pull_request.base.ref_name.clone()),
        head_sha: pull_request.head.sha.clone(),
        diff_url: pull_request.diff_url.clone().unwrap_or_default(),
        commits_url: pull_request.commits_url.clone().unwrap_or_default(),
        pr_title: pull_request.title.clone().unwrap_or_default(),
        pr_description: pull_request.body.clone().unwrap_or_default(),
        is_private: pull_request.is_private(),
        commenter: comment.map(|comment| comment.user.login.clone()),
        comment_body: comment.and_then(|comment| comment.body.clone()),
        comment_url: comment.map(|comment| comment.html_url.clone()),
        reports: Vec::new(),
        error: None,
    }
}

#[cfg(test)]
mod tests {
    use super::{build_canonical_request, is_supported_action};
    use crate::canonical_request::{CanonicalRequest, EventKind, RepoRef, RequestAction};
    use crate::host::{
        CommentWriteResponse, GithubHost, IssueCommentRecord,
    };
    use crate::webhook_payload::PullRequestPayload;
    use anyhow::{bail, Result};
    use async_trait::async_trait;
    use serde_json::json;

    struct StaticHost {
        readable: bool,
        pull_request: Option<PullRequestPayload>,
    }

    #[async_trait]
    impl GithubHost for StaticHost {
        async fn repository_readable(&self, _repo: &RepoRef) -> bool {
            self.readable
        }

        async fn fetch_pull_request(&self, _api_url: &str) -> Result<PullRequestPayload> {
            match &self.pull_request {
                Some(pull_request) => Ok(pull_request.clone()),
                None => bail!("no pull request"),
            }
        }

        async fn fetch_diff(&self, _request: &CanonicalRequest) -> Result<String> {
            bail!("not used")
        }

        async fn fetch_file(
            &self,
            _repo: &RepoRef,
            _git_ref: &str,
            _path: &str,
        ) -> Result<Option<String>> {
            Ok(None)
        }

        async fn list_comments(
            &self,
            _repo: &RepoRef,
            _pr_number: u64,
        ) -> Result<Vec<IssueCommentRecord>> {
            Ok(Vec::new())
        }

        async fn create_comment(
            &self,
            _repo: &RepoRef,
            _pr_number: u64,
            _body: &str,
        ) -> Result<CommentWriteResponse> {
            bail!("not used")
        }

        async fn update_comment(
            &self,
            _repo: &RepoRef,
            _comment_id: u64,
            _body: &str,
        ) -> Result<CommentWriteResponse> {
            bail!("not used")
        }

        async fn list_commit_messages(&self, _commits_url: &str) -> Result<Vec<String>> {
            Ok(Vec::new())
        }
    }

    fn pull_request_payload() -> serde_json::Value {
        json!({
            "action": "opened",
            "repository": { "full_name": "octocat/hello", "default_branch": "main" },
            "pull_request": {
                "number": 7,
                "title": "Add feature",
                "body": "description",
                "diff_url": "https://github.com/octocat/hello/pull/7.diff",
                "commits_url": "https://api.github.com/repos/octocat/hello/pulls/7/commits",
                "user": { "login": "someone" },
                "head": { "sha": "abc123", "ref": "feature" },
                "base": { "ref": "main", "repo": { "private": false } }
            }
        })
    }

    #[test]
    fn unit_is_supported_action_covers_the_event_state_machine() {
        assert!(is_supported_action(
            EventKind::PullRequest,
            &RequestAction::Opened
        ));
        assert!(is_supported_action(
            EventKind::PullRequest,
            &RequestAction::Synchronize
        ));
        assert!(is_supported_action(
            EventKind::PullRequest,
            &RequestAction::Reopened
        ));
        assert!(!is_supported_action(
            EventKind::PullRequest,
            &RequestAction::Other("closed".into())
        ));
        assert!(is_supported_action(
            EventKind::IssueComment,
            &RequestAction::Created
        ));
        assert!(!is_supported_action(
            EventKind::Ping,
            &RequestAction::Opened
        ));
    }

    #[tokio::test]
    async fn functional_pull_request_event_builds_valid_canonical_request() {
        let host = StaticHost {
            readable: true,
            pull_request: None,
        };
        let request =
            build_canonical_request(&host, EventKind::PullRequest, &pull_request_payload()).await;
        assert!(request.is_valid);
        assert_eq!(request.repository.full_name(), "octocat/hello");
        assert_eq!(request.pr_number, 7);
        assert_eq!(request.author, "someone");
        assert_eq!(request.base_branch, "main");
        assert_eq!(request.head_sha, "abc123");
        assert!(!request.is_private);
    }

    #[tokio::test]
    async fn functional_unreadable_repository_invalidates_the_request() {
        let host = StaticHost {
            readable: false,
            pull_request: None,
        };
        let request =
            build_canonical_request(&host, EventKind::PullRequest, &pull_request_payload()).await;
        assert!(!request.is_valid);
    }

    #[tokio::test]
    async fn regression_unsupported_pull_request_action_is_invalid() {
        let mut payload = pull_request_payload();
        payload["action"] = json!("closed");
        let host = StaticHost {
            readable: true,
            pull_request: None,
        };
        let request = build_canonical_request(&host, EventKind::PullRequest, &payload).await;
        assert!(!request.is_valid);
    }

    #[tokio::test]
    async fn functional_issue_comment_event_fetches_the_pull_request() {
        let pull_request: PullRequestPayload = serde_json::from_value(
            pull_request_payload()["pull_request"].clone(),
        )
        .expect("pull request");
        let host = StaticHost {
            readable: true,
            pull_request: Some(pull_request),
        };
        let payload = json!({
            "action": "created",
            "repository": { "full_name": "octocat/hello", "default_branch": "develop" },
            "issue": {
                "pull_request": { "url": "https://api.github.com/repos/octocat/hello/pulls/7" }
            },
            "comment": {
                "user": { "login": "reviewer" },
                "html_url": "https://github.com/octocat/hello/pull/7#issuecomment-1",
                "body": "@pep8speaks pep8ify"
            }
        });
        let request = build_canonical_request(&host, EventKind::IssueComment, &payload).await;
        assert!(request.is_valid);
        assert_eq!(request.commenter.as_deref(), Some("reviewer"));
        assert_eq!(request.comment_body.as_deref(), Some("@pep8speaks pep8ify"));
        // Comment deliveries resolve config against the default branch.
        assert_eq!(request.base_branch, "develop");
    }

    #[tokio::test]
    async fn regression_comment_on_plain_issue_is_invalid() {
        let host = StaticHost {
            readable: true,
            pull_request: None,
        };
        let payload = json!({
            "action": "created",
            "repository": { "full_name": "octocat/hello" },
            "issue": {},
            "comment": {
                "user": { "login": "reviewer" },
                "html_url": "https://github.com/octocat/hello/issues/3#issuecomment-1",
                "body": "hello"
            }
        });
        let request = build_canonical_request(&host, EventKind::IssueComment, &payload).await;
        assert!(!request.is_valid);
    }
}
