//! Comment lifecycle: composes the Markdown review comment from lint
//! reports, decides whether posting is permitted, and reconciles the
//! single bot comment per pull request (create once, edit thereafter).

pub mod comment_composer;
pub mod comment_reconciler;
pub mod suppression;

pub use comment_composer::{compose_comment, ComposedComment};
pub use comment_reconciler::{
    last_updated_trailer, reconcile_comment, ReconcileAction, ReconcileOutcome,
};
pub use suppression::{evaluate_suppression, SuppressionVerdict, SKIP_MARKERS};
