use std::sync::Arc;

use serde_json::Value;
use speaks_comment::{compose_comment, evaluate_suppression, reconcile_comment, ReconcileOutcome};
use speaks_config::resolve_config;
use speaks_core::{
    build_canonical_request, CanonicalRequest, EventKind, GithubHost, LinterRunner,
};
use speaks_diff::{parse_unified_diff, python_files};
use speaks_lint::map_lint_results;
use tracing::{info, warn};

/// Commands the autofix collaborator handles; recognized here only so the
/// delivery can be acknowledged instead of reported as unhandled.
const AUTOFIX_COMMANDS: &[&str] = &["pep8ify", "suggest diff"];

#[derive(Debug, Clone)]
/// What one webhook delivery amounted to, for response bodies and logs.
pub struct DeliveryReport {
    pub event: EventKind,
    pub reason_code: String,
    pub error: Option<String>,
    pub reconcile: Option<ReconcileOutcome>,
}

impl DeliveryReport {
    fn noop(event: EventKind, reason_code: &str) -> Self {
        Self {
            event,
            reason_code: reason_code.to_string(),
            error: None,
            reconcile: None,
        }
    }

    fn failed(event: EventKind, reason_code: &str, error: String) -> Self {
        Self {
            event,
            reason_code: reason_code.to_string(),
            error: Some(error),
            reconcile: None,
        }
    }
}

/// Drives one webhook delivery end to end: canonicalize, resolve config,
/// analyze the diff, compose the comment, check suppression, reconcile.
/// Strictly sequential with no state shared across deliveries.
pub struct DeliveryPipeline {
    host: Arc<dyn GithubHost>,
    linter: Arc<dyn LinterRunner>,
    bot_login: String,
}

impl DeliveryPipeline {
    pub fn new(host: Arc<dyn GithubHost>, linter: Arc<dyn LinterRunner>, bot_login: String) -> Self {
        Self {
            host,
            linter,
            bot_login,
        }
    }

    pub async fn handle_event(&self, event_kind: EventKind, payload: &Value) -> DeliveryReport {
        match event_kind {
            EventKind::PullRequest => self.handle_pull_request(payload).await,
            EventKind::IssueComment => self.handle_issue_comment(payload).await,
            EventKind::Ping => DeliveryReport::noop(event_kind, "pong"),
            EventKind::Installation => DeliveryReport::noop(event_kind, "installation_noted"),
            EventKind::Unsupported => DeliveryReport::noop(event_kind, "unsupported_event"),
        }
    }

    async fn handle_pull_request(&self, payload: &Value) -> DeliveryReport {
        let event = EventKind::PullRequest;
        let request =
            build_canonical_request(self.host.as_ref(), event, payload).await;
        if !request.is_valid {
            info!(error = ?request.error, "pull request delivery not actionable");
            return DeliveryReport::noop(event, "invalid_request");
        }

        let resolution = resolve_config(
            self.host.as_ref(),
            &request.repository,
            &request.base_branch,
            &request.head_sha,
        )
        .await;
        let mut config = resolution.config;
        config.personalize_messages(&request.author);

        let diff = match self.host.fetch_diff(&request).await {
            Ok(diff) => diff,
            Err(error) => {
                warn!(%error, "diff fetch failed");
                return DeliveryReport::failed(event, "diff_fetch_failed", error.to_string());
            }
        };
        let changed = python_files(
            parse_unified_diff(&diff),
            &config.active_linter_options().exclude,
        );
        if changed.is_empty() {
            return DeliveryReport::noop(event, "no_python_files");
        }

        let mut request = request;
        request.reports = map_lint_results(
            self.host.as_ref(),
            self.linter.as_ref(),
            &request,
            &config,
            &changed,
        )
        .await;

        let comment = compose_comment(&request, &config);
        if comment.is_empty() {
            return DeliveryReport::noop(event, "empty_comment_body");
        }

        let verdict = match evaluate_suppression(
            self.host.as_ref(),
            &request,
            &config,
            &comment,
            &self.bot_login,
        )
        .await
        {
            Ok(verdict) => verdict,
            Err(error) => {
                warn!(%error, "suppression check failed");
                return DeliveryReport::failed(
                    event,
                    "suppression_check_failed",
                    error.to_string(),
                );
            }
        };
        if !verdict.permitted {
            info!(reason = verdict.reason_code, "comment suppressed");
            return DeliveryReport::noop(event, verdict.reason_code);
        }

        match reconcile_comment(
            self.host.as_ref(),
            &request.repository,
            request.pr_number,
            &self.bot_login,
            &comment.full_text(),
            verdict.allow_create,
        )
        .await
        {
            Ok(outcome) => {
                let reason_code = format!("comment_{}", outcome.action.as_str());
                DeliveryReport {
                    event,
                    reason_code,
                    error: None,
                    reconcile: Some(outcome),
                }
            }
            Err(error) => {
                warn!(%error, "comment write failed");
                DeliveryReport::failed(event, "comment_write_failed", error.to_string())
            }
        }
    }

    /// Comment deliveries carry no posting side effect of their own:
    /// quiet/resume directives are read back from the stored comment list on
    /// the next pull request event, and autofix-style commands belong to a
    /// separate workflow.
    async fn handle_issue_comment(&self, payload: &Value) -> DeliveryReport {
        let event = EventKind::IssueComment;
        let request =
            build_canonical_request(self.host.as_ref(), event, payload).await;
        if !request.is_valid {
            return DeliveryReport::noop(event, "invalid_request");
        }
        if is_autofix_command(&request) {
            info!(commenter = ?request.commenter, "autofix command acknowledged");
            return DeliveryReport::noop(event, "autofix_command_acknowledged");
        }
        DeliveryReport::noop(event, "comment_noted")
    }
}

fn is_autofix_command(request: &CanonicalRequest) -> bool {
    let body = request
        .comment_body
        .as_deref()
        .unwrap_or_default()
        .to_lowercase();
    AUTOFIX_COMMANDS.iter().any(|command| body.contains(command))
}
