//! Unified diff analysis: which files a PR touched, which line numbers it
//! added, and which of those files survive the source-file and
//! exclude-pattern filters.

pub mod path_filter;
pub mod unified_diff;

pub use path_filter::{filename_match, python_files};
pub use unified_diff::{parse_unified_diff, ChangedFile};
