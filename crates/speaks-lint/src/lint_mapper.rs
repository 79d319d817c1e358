use speaks_config::{linter_arguments, BotConfig};
use speaks_core::{
    CanonicalRequest, Diagnostic, FileLintReport, GithubHost, LinterRunner,
};
use speaks_diff::ChangedFile;
use tracing::warn;

use crate::linter_output::{accepted_code_letters, parse_linter_line, ParsedLine};

/// Runs the configured linter over every surviving changed file and maps the
/// output to per-file reports in diff order.
///
/// Diff-scoping and ignore-code filtering are independent criteria and are
/// both evaluated for every diagnostic. A failed fetch or linter invocation
/// degrades that one file to an empty report; analysis continues. Every
/// analyzed file gets a blob link, diagnostics or not.
pub async fn map_lint_results(
    host: &dyn GithubHost,
    runner: &dyn LinterRunner,
    request: &CanonicalRequest,
    config: &BotConfig,
    changed: &[ChangedFile],
) -> Vec<FileLintReport> {
    if !request.is_valid {
        return Vec::new();
    }
    let linter = config.scanner.linter.as_str();
    let options = config.active_linter_options();
    let args = linter_arguments(options);
    let accepted = accepted_code_letters(linter);

    let mut reports = Vec::with_capacity(changed.len());
    for file in changed {
        let link = format!(
            "https://github.com/{}/blob/{}/{}",
            request.repository.full_name(),
            request.head_sha,
            file.path
        );
        let mut report = FileLintReport {
            path: file.path.clone(),
            link,
            diagnostics: Vec::new(),
            extra: Vec::new(),
        };

        let source = match host
            .fetch_file(&request.repository, &request.head_sha, &file.path)
            .await
        {
            Ok(Some(source)) => Some(source),
            Ok(None) => {
                warn!(path = %file.path, "file missing at head commit; skipping lint");
                None
            }
            Err(error) => {
                warn!(%error, path = %file.path, "file fetch failed; skipping lint");
                None
            }
        };

        if let Some(source) = source {
            match runner.run(linter, &args, &source).await {
                Ok(invocation) => {
                    for raw in &invocation.stdout_lines {
                        match parse_linter_line(raw, &invocation.scratch_name, &file.path, accepted)
                        {
                            ParsedLine::Diagnostic(diagnostic) => {
                                if keep_diagnostic(&diagnostic, config, file) {
                                    report.diagnostics.push(diagnostic);
                                }
                            }
                            ParsedLine::Extra(line) => report.extra.push(line),
                        }
                    }
                }
                Err(error) => {
                    warn!(%error, path = %file.path, linter, "linter invocation failed");
                }
            }
        }
        reports.push(report);
    }
    reports
}

fn keep_diagnostic(diagnostic: &Diagnostic, config: &BotConfig, file: &ChangedFile) -> bool {
    let options = config.active_linter_options();
    let scoped_out = config.scanner.diff_only && !file.added_lines.contains(&diagnostic.line);
    let ignored = options
        .ignore
        .iter()
        .any(|code| code.eq_ignore_ascii_case(&diagnostic.code));
    !scoped_out && !ignored
}
