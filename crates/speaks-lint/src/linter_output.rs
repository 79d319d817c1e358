use std::sync::OnceLock;

use regex::Regex;
use speaks_core::Diagnostic;

/// Diagnostic code letters treated as actionable per linter. pycodestyle
/// emits only E/W; flake8 adds F for pyflakes findings. Codes outside the
/// set stay in the extra bucket, never in results.
pub fn accepted_code_letters(linter: &str) -> &'static [char] {
    match linter {
        "flake8" => &['E', 'W', 'F'],
        _ => &['E', 'W'],
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Classification of one raw linter output line.
pub enum ParsedLine {
    Diagnostic(Diagnostic),
    /// Not an actionable diagnostic; kept for optional display with the
    /// scratch filename rewritten to the real path.
    Extra(String),
}

fn position_regex() -> &'static Regex {
    static POSITION: OnceLock<Regex> = OnceLock::new();
    POSITION.get_or_init(|| {
        Regex::new(r"^:(\d+):(\d+):\s+([A-Z]\d+)\s+(.*)$").expect("linter position regex")
    })
}

/// Parses one stdout line of the linter. Actionable diagnostics have the
/// shape `<scratch>:<line>:<col>: <CODE> <message>` with an accepted code
/// letter; everything else lands in `Extra`.
pub fn parse_linter_line(
    raw: &str,
    scratch_name: &str,
    real_path: &str,
    accepted_letters: &[char],
) -> ParsedLine {
    if let Some(rest) = raw.strip_prefix(scratch_name) {
        if let Some(captures) = position_regex().captures(rest) {
            let code = captures[3].to_string();
            let letter = code.chars().next().unwrap_or('?');
            if accepted_letters.contains(&letter) {
                let line = captures[1].parse().unwrap_or(0);
                let column = captures[2].parse().unwrap_or(0);
                return ParsedLine::Diagnostic(Diagnostic {
                    path: real_path.to_string(),
                    line,
                    column,
                    code,
                    message: captures[4].trim().to_string(),
                });
            }
        }
    }
    ParsedLine::Extra(raw.replace(scratch_name, real_path))
}

#[cfg(test)]
mod tests {
    use super::{accepted_code_letters, parse_linter_line, ParsedLine};
    use speaks_core::Diagnostic;

    #[test]
    fn unit_actionable_line_parses_into_a_diagnostic() {
        let parsed = parse_linter_line(
            "file_to_check.py:14:80: E501 line too long (93 > 79 characters)",
            "file_to_check.py",
            "modules/good_module.py",
            accepted_code_letters("pycodestyle"),
        );
        assert_eq!(
            parsed,
            ParsedLine::Diagnostic(Diagnostic {
                path: "modules/good_module.py".to_string(),
                line: 14,
                column: 80,
                code: "E501".to_string(),
                message: "line too long (93 > 79 characters)".to_string(),
            })
        );
    }

    #[test]
    fn unit_codes_outside_the_accepted_letter_set_become_extra() {
        let parsed = parse_linter_line(
            "file_to_check.py:3:1: F401 'os' imported but unused",
            "file_to_check.py",
            "app.py",
            accepted_code_letters("pycodestyle"),
        );
        assert!(matches!(parsed, ParsedLine::Extra(_)));

        let parsed = parse_linter_line(
            "file_to_check.py:3:1: F401 'os' imported but unused",
            "file_to_check.py",
            "app.py",
            accepted_code_letters("flake8"),
        );
        assert!(matches!(parsed, ParsedLine::Diagnostic(_)));
    }

    #[test]
    fn unit_extra_lines_rewrite_the_scratch_name() {
        let parsed = parse_linter_line(
            "file_to_check.py: summary text",
            "file_to_check.py",
            "src/app.py",
            accepted_code_letters("pycodestyle"),
        );
        assert_eq!(parsed, ParsedLine::Extra("src/app.py: summary text".to_string()));
    }

    #[test]
    fn regression_malformed_position_lines_are_extra() {
        let parsed = parse_linter_line(
            "file_to_check.py:abc:1: E501 nonsense",
            "file_to_check.py",
            "src/app.py",
            accepted_code_letters("pycodestyle"),
        );
        assert!(matches!(parsed, ParsedLine::Extra(_)));
    }

    #[test]
    fn unit_accepted_code_letters_differ_per_linter() {
        assert_eq!(accepted_code_letters("pycodestyle"), &['E', 'W']);
        assert_eq!(accepted_code_letters("flake8"), &['E', 'W', 'F']);
        assert_eq!(accepted_code_letters("unknown"), &['E', 'W']);
    }
}
