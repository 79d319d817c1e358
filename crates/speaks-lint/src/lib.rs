//! Maps diff hunks to structured lint results: runs the configured linter
//! per changed file, parses its output into diagnostics, and applies
//! diff-scoping and ignore-code filtering.

pub mod lint_mapper;
pub mod linter_output;

pub use lint_mapper::map_lint_results;
pub use linter_output::{accepted_code_letters, parse_linter_line, ParsedLine};
