use speaks_config::BotConfig;
use speaks_core::{CanonicalRequest, Diagnostic, MessageKind};

#[derive(Debug, Clone, PartialEq, Eq)]
/// The three sections of the review comment plus the error flag the
/// suppression rules key on. An empty body means nothing gets posted.
pub struct ComposedComment {
    pub header: String,
    pub body: String,
    pub footer: String,
    pub has_errors: bool,
}

impl ComposedComment {
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn full_text(&self) -> String {
        format!("{}{}{}", self.header, self.body, self.footer)
    }
}

/// Builds the comment from the lint reports carried on the request.
///
/// The header greets by action family (opened vs updated) unless the
/// configured template overrides it; `{name}` substitution has already
/// happened on the config. Reports are walked in insertion order, so the
/// body mirrors the diff.
pub fn compose_comment(request: &CanonicalRequest, config: &BotConfig) -> ComposedComment {
    let kind = request.action.message_kind();
    let header = match kind {
        Some(MessageKind::Opened) => greeting(
            &config.message.opened.header,
            &request.author,
            "submitting",
        ),
        Some(MessageKind::Updated) => greeting(
            &config.message.updated.header,
            &request.author,
            "updating",
        ),
        None => String::new(),
    };

    let mut body = String::new();
    let mut has_errors = false;
    for report in &request.reports {
        if report.diagnostics.is_empty() {
            if !config.only_mention_files_with_errors {
                body.push_str(&format!(
                    " - There are no PEP8 issues in the file [`{}`]({}) !",
                    report.path, report.link
                ));
            }
        } else {
            has_errors = true;
            body.push_str(&format!(
                " - In the file [`{}`]({}), following are the PEP8 issues :\n",
                report.path, report.link
            ));
            let mut diagnostics: Vec<&Diagnostic> = report.diagnostics.iter().collect();
            if config.descending_issues_order {
                diagnostics.reverse();
            }
            for diagnostic in diagnostics {
                body.push_str(&format!(
                    "\n> [Line {line}:{col}]({link}#L{line}): [{code}](https://duckduckgo.com/?q=pep8%20{code}) {message}",
                    line = diagnostic.line,
                    col = diagnostic.column,
                    link = report.link,
                    code = diagnostic.code,
                    message = diagnostic.message,
                ));
            }
        }
        body.push_str("\n\n");
        if !report.extra.is_empty() {
            body.push_str(" - Complete extra results for this file :\n\n");
            body.push_str("> ");
            body.push_str(&report.extra.join("\n> "));
            body.push_str("\n\n---\n\n");
        }
    }

    if config.only_mention_files_with_errors && !has_errors {
        body.push_str(&config.message.no_errors);
    }

    let footer = match kind {
        Some(MessageKind::Opened) => config.message.opened.footer.clone(),
        Some(MessageKind::Updated) => config.message.updated.footer.clone(),
        None => String::new(),
    };

    ComposedComment {
        header,
        body,
        footer,
        has_errors,
    }
}

fn greeting(template: &str, author: &str, verb: &str) -> String {
    if template.is_empty() {
        format!("Hello @{author}! Thanks for {verb} the PR.\n\n")
    } else {
        format!("{template}\n\n")
    }
}
