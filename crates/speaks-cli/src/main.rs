//! Webhook server binary: receives GitHub deliveries, verifies signatures,
//! and hands each event to the delivery pipeline.

mod cli_args;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use clap::Parser;
use serde_json::{json, Value};
use speaks_core::EventKind;
use speaks_runtime::{
    verify_webhook_signature, DeliveryPipeline, GithubApiClient, GithubApiSettings,
    SubprocessLinter,
};
use tracing::level_filters::LevelFilter;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli_args::CliArgs;

struct AppState {
    pipeline: DeliveryPipeline,
    webhook_secret: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = CliArgs::parse();

    let host = Arc::new(GithubApiClient::new(GithubApiSettings {
        api_base: args.api_base.clone(),
        raw_base: args.raw_base.clone(),
        token: args.github_token.clone(),
        request_timeout_ms: args.request_timeout_ms,
        retry_max_attempts: args.retry_max_attempts,
        retry_base_delay_ms: args.retry_base_delay_ms,
    })?);
    let pipeline = DeliveryPipeline::new(host, Arc::new(SubprocessLinter), args.bot_login.clone());
    let state = Arc::new(AppState {
        pipeline,
        webhook_secret: args.webhook_secret.clone(),
    });

    let app = Router::new()
        .route("/webhook", post(webhook))
        .route("/health", get(health))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&args.bind)
        .await
        .with_context(|| format!("failed to bind {}", args.bind))?;
    info!(bind = %args.bind, bot = %args.bot_login, "webhook server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("webhook server failed")?;
    Ok(())
}

async fn health() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

async fn webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let signature = headers
        .get("x-hub-signature-256")
        .and_then(|value| value.to_str().ok());
    if let Err(error) = verify_webhook_signature(state.webhook_secret.as_deref(), signature, &body)
    {
        warn!(%error, "webhook delivery rejected");
        return (
            StatusCode::FORBIDDEN,
            Json(json!({"error": "signature verification failed"})),
        );
    }

    let event_kind = headers
        .get("x-github-event")
        .and_then(|value| value.to_str().ok())
        .map(EventKind::from_header)
        .unwrap_or(EventKind::Unsupported);
    let payload: Value = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "payload is not valid json"})),
            );
        }
    };

    let report = state.pipeline.handle_event(event_kind, &payload).await;
    info!(
        event = event_kind.as_str(),
        reason = %report.reason_code,
        "delivery handled"
    );
    let status = if event_kind == EventKind::Unsupported {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::OK
    };
    (
        status,
        Json(json!({
            "event": event_kind.as_str(),
            "reason": report.reason_code,
            "error": report.error,
        })),
    )
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        warn!("failed to listen for shutdown signal");
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}
