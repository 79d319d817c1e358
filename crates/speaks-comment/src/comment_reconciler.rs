use anyhow::Result;
use chrono::{DateTime, Utc};
use speaks_core::{GithubHost, RepoRef};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileAction {
    Created,
    Updated,
    Skipped,
}

impl ReconcileAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Skipped => "skipped",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// What the reconciler did and where the comment lives afterwards.
pub struct ReconcileOutcome {
    pub action: ReconcileAction,
    pub comment_id: Option<u64>,
    pub comment_url: Option<String>,
}

/// Trailer appended on every edit so readers can tell a refreshed comment
/// from a stale one.
pub fn last_updated_trailer(moment: DateTime<Utc>) -> String {
    format!(
        "\n\n##### Comment last updated on {}",
        moment.format("%B %d, %Y at %H:%M Hours UTC")
    )
}

/// Creates or edits the single bot comment on a pull request.
///
/// The target is the most recent comment authored by `bot_login`. When none
/// exists a new comment is created, unless the verdict restricted this
/// delivery to update-only. Edits append the last-updated trailer.
pub async fn reconcile_comment(
    host: &dyn GithubHost,
    repo: &RepoRef,
    pr_number: u64,
    bot_login: &str,
    text: &str,
    allow_create: bool,
) -> Result<ReconcileOutcome> {
    let comments = host.list_comments(repo, pr_number).await?;
    let existing = comments
        .iter()
        .rev()
        .find(|record| record.author_login == bot_login);

    match existing {
        Some(record) => {
            let body = format!("{text}{}", last_updated_trailer(Utc::now()));
            let response = host.update_comment(repo, record.id, &body).await?;
            info!(comment_id = response.id, pr_number, "comment updated");
            Ok(ReconcileOutcome {
                action: ReconcileAction::Updated,
                comment_id: Some(response.id),
                comment_url: Some(response.html_url),
            })
        }
        None if allow_create => {
            let response = host.create_comment(repo, pr_number, text).await?;
            info!(comment_id = response.id, pr_number, "comment created");
            Ok(ReconcileOutcome {
                action: ReconcileAction::Created,
                comment_id: Some(response.id),
                comment_url: Some(response.html_url),
            })
        }
        None => {
            info!(pr_number, "no prior comment and creation not allowed");
            Ok(ReconcileOutcome {
                action: ReconcileAction::Skipped,
                comment_id: None,
                comment_url: None,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{last_updated_trailer, reconcile_comment, ReconcileAction};
    use anyhow::{bail, Result};
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use speaks_core::webhook_payload::PullRequestPayload;
    use speaks_core::{
        CanonicalRequest, CommentWriteResponse, GithubHost, IssueCommentRecord, RepoRef,
    };
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Write {
        Create(String),
        Update(u64, String),
    }

    struct RecordingHost {
        comments: Vec<IssueCommentRecord>,
        writes: Mutex<Vec<Write>>,
    }

    impl RecordingHost {
        fn with_comments(comments: Vec<IssueCommentRecord>) -> Self {
            Self {
                comments,
                writes: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl GithubHost for RecordingHost {
        async fn repository_readable(&self, _repo: &RepoRef) -> bool {
            true
        }

        async fn fetch_pull_request(&self, _api_url: &str) -> Result<PullRequestPayload> {
            bail!("not used")
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
            Ok(self.comments.clone())
        }

        async fn create_comment(
            &self,
            _repo: &RepoRef,
            _pr_number: u64,
            body: &str,
        ) -> Result<CommentWriteResponse> {
            self.writes
                .lock()
                .expect("writes lock")
                .push(Write::Create(body.to_string()));
            Ok(CommentWriteResponse {
                id: 100,
                html_url: "https://github.com/octocat/hello/pull/7#issuecomment-100".to_string(),
            })
        }

        async fn update_comment(
            &self,
            _repo: &RepoRef,
            comment_id: u64,
            body: &str,
        ) -> Result<CommentWriteResponse> {
            self.writes
                .lock()
                .expect("writes lock")
                .push(Write::Update(comment_id, body.to_string()));
            Ok(CommentWriteResponse {
                id: comment_id,
                html_url: format!(
                    "https://github.com/octocat/hello/pull/7#issuecomment-{comment_id}"
                ),
            })
        }

        async fn list_commit_messages(&self, _commits_url: &str) -> Result<Vec<String>> {
            Ok(Vec::new())
        }
    }

    fn repo() -> RepoRef {
        RepoRef::parse("octocat/hello").expect("repo")
    }

    fn record(id: u64, author: &str) -> IssueCommentRecord {
        IssueCommentRecord {
            id,
            author_login: author.to_string(),
            body: "old body".to_string(),
        }
    }

    #[test]
    fn unit_trailer_formats_the_documented_timestamp() {
        let moment = Utc.with_ymd_and_hms(2019, 3, 7, 9, 5, 0).single().expect("moment");
        assert_eq!(
            last_updated_trailer(moment),
            "\n\n##### Comment last updated on March 07, 2019 at 09:05 Hours UTC"
        );
    }

    #[tokio::test]
    async fn functional_first_delivery_creates_a_comment_verbatim() {
        let host = RecordingHost::with_comments(vec![record(1, "reviewer")]);
        let outcome = reconcile_comment(&host, &repo(), 7, "pep8speaks", "the body", true)
            .await
            .expect("outcome");
        assert_eq!(outcome.action, ReconcileAction::Created);
        assert_eq!(outcome.comment_id, Some(100));
        assert_eq!(
            outcome.comment_url.as_deref(),
            Some("https://github.com/octocat/hello/pull/7#issuecomment-100")
        );
        let writes = host.writes.lock().expect("writes lock");
        assert_eq!(*writes, vec![Write::Create("the body".to_string())]);
    }

    #[tokio::test]
    async fn functional_existing_bot_comment_is_edited_with_the_trailer() {
        let host = RecordingHost::with_comments(vec![
            record(5, "pep8speaks"),
            record(6, "reviewer"),
            record(8, "pep8speaks"),
        ]);
        let outcome = reconcile_comment(&host, &repo(), 7, "pep8speaks", "fresh body", true)
            .await
            .expect("outcome");
        assert_eq!(outcome.action, ReconcileAction::Updated);
        assert_eq!(outcome.comment_id, Some(8));
        assert_eq!(
            outcome.comment_url.as_deref(),
            Some("https://github.com/octocat/hello/pull/7#issuecomment-8")
        );
        let writes = host.writes.lock().expect("writes lock");
        assert_eq!(writes.len(), 1);
        match &writes[0] {
            Write::Update(id, body) => {
                // The most recent bot comment is the edit target.
                assert_eq!(*id, 8);
                assert!(body.starts_with("fresh body"));
                assert!(body.contains("\n\n##### Comment last updated on "));
                assert!(body.ends_with("Hours UTC"));
            }
            other => panic!("unexpected write: {other:?}"),
        }
    }

    #[tokio::test]
    async fn functional_update_only_delivery_skips_when_no_comment_exists() {
        let host = RecordingHost::with_comments(vec![record(1, "reviewer")]);
        let outcome = reconcile_comment(&host, &repo(), 7, "pep8speaks", "clean body", false)
            .await
            .expect("outcome");
        assert_eq!(outcome.action, ReconcileAction::Skipped);
        assert_eq!(outcome.comment_id, None);
        assert!(host.writes.lock().expect("writes lock").is_empty());
    }

    #[tokio::test]
    async fn regression_update_only_still_edits_an_existing_comment() {
        let host = RecordingHost::with_comments(vec![record(5, "pep8speaks")]);
        let outcome = reconcile_comment(&host, &repo(), 7, "pep8speaks", "clean body", false)
            .await
            .expect("outcome");
        assert_eq!(outcome.action, ReconcileAction::Updated);
    }
}
