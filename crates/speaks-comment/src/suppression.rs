use anyhow::Result;
use speaks_config::BotConfig;
use speaks_core::{CanonicalRequest, GithubHost, MessageKind};
use tracing::debug;

use crate::comment_composer::ComposedComment;

/// Markers that silence the bot for a whole pull request when present in a
/// commit message, the PR title, or the PR description.
pub const SKIP_MARKERS: &[&str] = &["[skip pep8]", "[pep8 skip]"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Outcome of the ordered suppression rules. `allow_create` narrows a
/// permitted verdict to updating an existing comment only.
pub struct SuppressionVerdict {
    pub permitted: bool,
    pub allow_create: bool,
    pub reason_code: &'static str,
}

impl SuppressionVerdict {
    fn suppressed(reason_code: &'static str) -> Self {
        Self {
            permitted: false,
            allow_create: false,
            reason_code,
        }
    }
}

/// Applies the suppression rules in order, short-circuiting on the first
/// one that fires. Suppression gates only the posting side effect; the
/// analysis that produced the comment is untouched.
///
/// Rule order: empty body, clean-result policy, quiet/resume directives,
/// skip markers, self-authored PRs.
pub async fn evaluate_suppression(
    host: &dyn GithubHost,
    request: &CanonicalRequest,
    config: &BotConfig,
    comment: &ComposedComment,
    bot_login: &str,
) -> Result<SuppressionVerdict> {
    if comment.is_empty() {
        return Ok(SuppressionVerdict::suppressed("suppress_empty_body"));
    }

    // A clean result never creates a comment on a fresh PR. On update
    // actions it may refresh a prior erroring comment down to clean, and
    // with no_blank_comment disabled it may create one too.
    let mut allow_create = true;
    if !comment.has_errors {
        if request.action.message_kind() == Some(MessageKind::Opened) {
            return Ok(SuppressionVerdict::suppressed("suppress_clean_first_open"));
        }
        allow_create = !config.no_blank_comment;
    }

    let mention = format!("@{bot_login}");
    let comments = host
        .list_comments(&request.repository, request.pr_number)
        .await?;
    for record in comments.iter().rev() {
        if !record.body.contains(&mention) {
            continue;
        }
        let lowered = record.body.to_lowercase();
        if lowered.contains("resume") {
            break;
        }
        if lowered.contains("quiet") {
            return Ok(SuppressionVerdict::suppressed("suppress_quiet_directive"));
        }
    }

    let commit_messages = host.list_commit_messages(&request.commits_url).await?;
    for message in &commit_messages {
        if contains_skip_marker(message) {
            return Ok(SuppressionVerdict::suppressed("suppress_skip_marker_commit"));
        }
    }
    if contains_skip_marker(&request.pr_title) {
        return Ok(SuppressionVerdict::suppressed("suppress_skip_marker_title"));
    }
    if contains_skip_marker(&request.pr_description) {
        return Ok(SuppressionVerdict::suppressed(
            "suppress_skip_marker_description",
        ));
    }

    if request.author == bot_login {
        return Ok(SuppressionVerdict::suppressed("suppress_self_authored"));
    }

    debug!(allow_create, "comment permitted");
    Ok(SuppressionVerdict {
        permitted: true,
        allow_create,
        reason_code: "permit_comment",
    })
}

fn contains_skip_marker(text: &str) -> bool {
    let lowered = text.to_lowercase();
    SKIP_MARKERS.iter().any(|marker| lowered.contains(marker))
}
