use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Enumerates supported `EventKind` values.
pub enum EventKind {
    PullRequest,
    IssueComment,
    Installation,
    Ping,
    Unsupported,
}

impl EventKind {
    pub fn from_header(header: &str) -> Self {
        match header.trim() {
            "pull_request" => Self::PullRequest,
            "issue_comment" => Self::IssueComment,
            "installation" | "installation_repositories" | "integration_installation" => {
                Self::Installation
            }
            "ping" => Self::Ping,
            _ => Self::Unsupported,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PullRequest => "pull_request",
            Self::IssueComment => "issue_comment",
            Self::Installation => "installation",
            Self::Ping => "ping",
            Self::Unsupported => "unsupported",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Enumerates supported `RequestAction` values.
pub enum RequestAction {
    Opened,
    Synchronize,
    Reopened,
    Created,
    Edited,
    Other(String),
}

impl RequestAction {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "opened" => Self::Opened,
            "synchronize" => Self::Synchronize,
            "reopened" => Self::Reopened,
            "created" => Self::Created,
            "edited" => Self::Edited,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Opened => "opened",
            Self::Synchronize => "synchronize",
            Self::Reopened => "reopened",
            Self::Created => "created",
            Self::Edited => "edited",
            Self::Other(raw) => raw.as_str(),
        }
    }

    /// Maps the PR sub-action onto the message template family it selects.
    /// Synchronize and reopened both read the "updated" templates.
    pub fn message_kind(&self) -> Option<MessageKind> {
        match self {
            Self::Opened => Some(MessageKind::Opened),
            Self::Synchronize | Self::Reopened => Some(MessageKind::Updated),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Enumerates supported `MessageKind` values.
pub enum MessageKind {
    Opened,
    Updated,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Owner/name pair identifying one repository.
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    pub fn parse(full_name: &str) -> Option<Self> {
        let (owner, name) = full_name.split_once('/')?;
        if owner.trim().is_empty() || name.trim().is_empty() {
            return None;
        }
        Some(Self {
            owner: owner.trim().to_string(),
            name: name.trim().to_string(),
        })
    }

    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// One linter-reported style violation at a specific position.
pub struct Diagnostic {
    pub path: String,
    pub line: u64,
    pub column: u64,
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Lint outcome for one changed file. `extra` holds raw linter lines that
/// did not classify as actionable diagnostics. The blob `link` is recorded
/// for every analyzed file, diagnostics or not.
pub struct FileLintReport {
    pub path: String,
    pub link: String,
    pub diagnostics: Vec<Diagnostic>,
    pub extra: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// The normalized, stage-enriched representation of one webhook delivery.
/// Built once at the start of a delivery and discarded at the end; fields
/// are declared upfront instead of accreting during the pipeline.
pub struct CanonicalRequest {
    pub event_kind: EventKind,
    pub action: RequestAction,
    pub is_valid: bool,
    pub repository: RepoRef,
    pub pr_number: u64,
    pub author: String,
    pub base_branch: String,
    pub head_sha: String,
    pub diff_url: String,
    pub commits_url: String,
    pub pr_title: String,
    pub pr_description: String,
    pub is_private: bool,
    pub commenter: Option<String>,
    pub comment_body: Option<String>,
    pub comment_url: Option<String>,
    pub reports: Vec<FileLintReport>,
    pub error: Option<String>,
}

impl CanonicalRequest {
    /// An invalid request that every downstream stage must treat as a no-op.
    pub fn invalid(event_kind: EventKind, action: RequestAction) -> Self {
        Self {
            event_kind,
            action,
            is_valid: false,
            repository: RepoRef {
                owner: String::new(),
                name: String::new(),
            },
            pr_number: 0,
            author: String::new(),
            base_branch: String::new(),
            head_sha: String::new(),
            diff_url: String::new(),
            commits_url: String::new(),
            pr_title: String::new(),
            pr_description: String::new(),
            is_private: false,
            commenter: None,
            comment_body: None,
            comment_url: None,
            reports: Vec::new(),
            error: None,
        }
    }

    pub fn record_error(&mut self, message: impl Into<String>) {
        if self.error.is_none() {
            self.error = Some(message.into());
        }
    }
}
