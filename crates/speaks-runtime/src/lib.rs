//! Runtime wiring: the GitHub API client behind the `GithubHost` trait, the
//! subprocess linter runner, webhook signature verification, and the
//! per-delivery pipeline that drives analysis through to the comment write.

pub mod delivery_pipeline;
pub mod github_api_client;
pub mod linter_process;
mod transport;
pub mod webhook_signature;

pub use delivery_pipeline::{DeliveryPipeline, DeliveryReport};
pub use github_api_client::{GithubApiClient, GithubApiSettings};
pub use linter_process::{SubprocessLinter, SCRATCH_FILE_NAME};
pub use webhook_signature::verify_webhook_signature;
