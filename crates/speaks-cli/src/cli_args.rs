use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(
    name = "pep8speaks",
    about = "GitHub webhook bot that reviews Python pull requests for PEP 8 issues"
)]
pub struct CliArgs {
    /// Address the webhook server binds to.
    #[arg(long, env = "PEP8SPEAKS_BIND", default_value = "0.0.0.0:8080")]
    pub bind: String,

    /// Token used for all GitHub API calls.
    #[arg(long, env = "GITHUB_TOKEN")]
    pub github_token: String,

    #[arg(long, env = "GITHUB_API_BASE", default_value = "https://api.github.com")]
    pub api_base: String,

    #[arg(
        long,
        env = "GITHUB_RAW_BASE",
        default_value = "https://raw.githubusercontent.com"
    )]
    pub raw_base: String,

    /// Login of the bot account; used to find its own comments and to
    /// ignore its own pull requests.
    #[arg(long, env = "PEP8SPEAKS_BOT_LOGIN", default_value = "pep8speaks")]
    pub bot_login: String,

    /// Webhook HMAC secret. Unset disables signature verification, for
    /// local runs against replayed payloads.
    #[arg(long, env = "GITHUB_PAYLOAD_SECRET")]
    pub webhook_secret: Option<String>,

    #[arg(long, env = "PEP8SPEAKS_REQUEST_TIMEOUT_MS", default_value_t = 30_000)]
    pub request_timeout_ms: u64,

    #[arg(long, env = "PEP8SPEAKS_RETRY_MAX_ATTEMPTS", default_value_t = 3)]
    pub retry_max_attempts: usize,

    #[arg(long, env = "PEP8SPEAKS_RETRY_BASE_DELAY_MS", default_value_t = 500)]
    pub retry_base_delay_ms: u64,
}
