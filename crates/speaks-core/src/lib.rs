//! Canonical request model and collaborator trait surface for the PEP8
//! review bot. Webhook payloads are normalized here once per delivery;
//! every later pipeline stage consumes the resulting `CanonicalRequest`.

pub mod canonical_request;
pub mod host;
pub mod request_validation;
pub mod webhook_payload;

pub use canonical_request::{
    CanonicalRequest, Diagnostic, EventKind, FileLintReport, MessageKind, RepoRef, RequestAction,
};
pub use host::{
    CommentWriteResponse, GithubHost, IssueCommentRecord, LinterInvocation, LinterRunner,
};
pub use request_validation::{build_canonical_request, is_supported_action};
