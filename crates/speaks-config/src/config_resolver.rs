use serde_yaml::Value;
use speaks_core::{GithubHost, RepoRef};
use tracing::{debug, warn};

use crate::bot_config::{BotConfig, LinterOptions, SUPPORTED_LINTERS};
use crate::config_merge::merge_values;
use crate::setup_cfg::parse_linter_section;

const SETUP_CFG_PATH: &str = "setup.cfg";
const YML_PATH: &str = ".pep8speaks.yml";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// What happened to one configuration document during resolution. Callers
/// can tell "no config" from "malformed config" without exception games.
pub enum ConfigDocOutcome {
    Absent,
    Malformed,
    Loaded,
}

#[derive(Debug, Clone)]
/// Fully resolved configuration plus per-document provenance.
pub struct ConfigResolution {
    pub config: BotConfig,
    pub setup_cfg: ConfigDocOutcome,
    pub yml: ConfigDocOutcome,
}

/// Resolves the layered configuration for one delivery: built-in defaults,
/// then the `setup.cfg` linter section, then `.pep8speaks.yml`, each fetched
/// from the base branch with a head-commit fallback. Fetch failures count as
/// file-absent; a malformed document keeps the previous layer. This stage
/// never fails the delivery.
pub async fn resolve_config(
    host: &dyn GithubHost,
    repo: &RepoRef,
    base_branch: &str,
    head_sha: &str,
) -> ConfigResolution {
    let mut config = BotConfig::default();

    let setup_cfg = match fetch_with_fallback(host, repo, base_branch, head_sha, SETUP_CFG_PATH)
        .await
    {
        Some(text) => match parse_linter_section(&text) {
            Some(section) if !section.is_empty() => {
                for linter in SUPPORTED_LINTERS {
                    section.apply_to(config.linter_options_mut(linter));
                }
                ConfigDocOutcome::Loaded
            }
            _ => ConfigDocOutcome::Absent,
        },
        None => ConfigDocOutcome::Absent,
    };

    let yml = match fetch_with_fallback(host, repo, base_branch, head_sha, YML_PATH).await {
        Some(text) => apply_yaml_overlay(&mut config, &text),
        None => ConfigDocOutcome::Absent,
    };

    config.pycodestyle.normalize_ignore_codes();
    config.flake8.normalize_ignore_codes();

    ConfigResolution {
        config,
        setup_cfg,
        yml,
    }
}

async fn fetch_with_fallback(
    host: &dyn GithubHost,
    repo: &RepoRef,
    base_branch: &str,
    head_sha: &str,
    path: &str,
) -> Option<String> {
    for git_ref in [base_branch, head_sha] {
        if git_ref.is_empty() {
            continue;
        }
        match host.fetch_file(repo, git_ref, path).await {
            Ok(Some(text)) => return Some(text),
            Ok(None) => {}
            Err(error) => {
                debug!(%error, path, git_ref, "config fetch failed; treating as absent");
            }
        }
    }
    None
}

fn apply_yaml_overlay(config: &mut BotConfig, text: &str) -> ConfigDocOutcome {
    let overlay: Value = match serde_yaml::from_str(text) {
        Ok(value) => value,
        Err(error) => {
            warn!(%error, "malformed {YML_PATH}; keeping previous configuration");
            return ConfigDocOutcome::Malformed;
        }
    };
    if !overlay.is_mapping() {
        warn!("{YML_PATH} is not a mapping; keeping previous configuration");
        return ConfigDocOutcome::Malformed;
    }
    let base = match serde_yaml::to_value(&*config) {
        Ok(value) => value,
        Err(error) => {
            warn!(%error, "configuration did not serialize for merging");
            return ConfigDocOutcome::Malformed;
        }
    };
    match serde_yaml::from_value::<BotConfig>(merge_values(base, overlay)) {
        Ok(merged) => {
            *config = merged;
            ConfigDocOutcome::Loaded
        }
        Err(error) => {
            warn!(%error, "merged configuration did not deserialize; keeping previous");
            ConfigDocOutcome::Malformed
        }
    }
}

/// Projects one linter's option table into command-line flags: a true
/// boolean becomes `--key`, a scalar `--key=value`, a non-empty list
/// `--key=v1,v2`. Empty and false values are omitted. Field order is the
/// declared order of `LinterOptions`, then pass-through extras.
pub fn linter_arguments(options: &LinterOptions) -> Vec<String> {
    let mut args = Vec::new();
    push_list(&mut args, "ignore", &options.ignore);
    if let Some(limit) = options.max_line_length {
        args.push(format!("--max-line-length={limit}"));
    }
    push_flag(&mut args, "count", options.count);
    push_flag(&mut args, "first", options.first);
    push_flag(&mut args, "show-pep8", options.show_pep8);
    push_list(&mut args, "filename", &options.filename);
    push_list(&mut args, "exclude", &options.exclude);
    push_list(&mut args, "select", &options.select);
    push_flag(&mut args, "show-source", options.show_source);
    push_flag(&mut args, "statistics", options.statistics);
    push_flag(&mut args, "hang-closing", options.hang_closing);
    for (key, value) in &options.extra {
        if let Some(argument) = extra_argument(key, value) {
            args.push(argument);
        }
    }
    args
}

/// The flags joined into one space-prefixed string, for logging and for
/// invocation records.
pub fn joined_arguments(options: &LinterOptions) -> String {
    let args = linter_arguments(options);
    if args.is_empty() {
        String::new()
    } else {
        format!(" {}", args.join(" "))
    }
}

fn push_flag(args: &mut Vec<String>, key: &str, enabled: bool) {
    if enabled {
        args.push(format!("--{key}"));
    }
}

fn push_list(args: &mut Vec<String>, key: &str, values: &[String]) {
    if !values.is_empty() {
        args.push(format!("--{key}={}", values.join(",")));
    }
}

fn extra_argument(key: &Value, value: &Value) -> Option<String> {
    let key = key.as_str()?;
    match value {
        Value::Bool(true) => Some(format!("--{key}")),
        Value::Number(number) => Some(format!("--{key}={number}")),
        Value::String(text) if !text.is_empty() => Some(format!("--{key}={text}")),
        Value::Sequence(items) if !items.is_empty() => {
            let joined = items
                .iter()
                .filter_map(scalar_text)
                .collect::<Vec<_>>()
                .join(",");
            if joined.is_empty() {
                None
            } else {
                Some(format!("--{key}={joined}"))
            }
        }
        _ => None,
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}
