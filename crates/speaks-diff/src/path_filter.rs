use glob::Pattern;

use crate::unified_diff::ChangedFile;

/// Whether any exclude pattern matches the filename.
///
/// A pattern ending in `/` is treated as a directory prefix (`pattern*`).
/// The candidate loses any leading `/` before testing. Each pattern is
/// first tried as a shell glob against the full relative path; a slash-free
/// pattern that fails the glob also matches when it equals any single path
/// segment, so a bare directory or file name excludes it anywhere.
pub fn filename_match(filename: &str, patterns: &[String]) -> bool {
    let candidate = filename.trim_start_matches('/');
    for raw_pattern in patterns {
        let normalized = if raw_pattern.ends_with('/') {
            format!("{raw_pattern}*")
        } else {
            raw_pattern.clone()
        };
        if let Ok(pattern) = Pattern::new(&normalized) {
            if pattern.matches(candidate) {
                return true;
            }
        }
        if !raw_pattern.contains('/')
            && candidate.split('/').any(|segment| segment == raw_pattern)
        {
            return true;
        }
    }
    false
}

/// Keeps Python source files not matched by any exclude pattern, preserving
/// diff order.
pub fn python_files(changed: Vec<ChangedFile>, exclude: &[String]) -> Vec<ChangedFile> {
    changed
        .into_iter()
        .filter(|file| file.path.ends_with(".py") && !filename_match(&file.path, exclude))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{filename_match, python_files};
    use crate::unified_diff::ChangedFile;
    use std::collections::BTreeSet;

    fn patterns(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|pattern| pattern.to_string()).collect()
    }

    #[test]
    fn unit_filename_match_glob_against_full_path() {
        assert!(filename_match("src/foo.py", &patterns(&["src/*"])));
        assert!(filename_match("foo.py", &patterns(&["foo.py"])));
        assert!(!filename_match("a/b/foo.py", &patterns(&["x/*"])));
    }

    #[test]
    fn unit_filename_match_slash_free_pattern_matches_any_segment() {
        assert!(filename_match("a/b/foo.py", &patterns(&["foo.py"])));
        assert!(filename_match("vendor/lib/mod.py", &patterns(&["vendor"])));
        assert!(!filename_match("a/b/bar.py", &patterns(&["foo.py"])));
    }

    #[test]
    fn unit_filename_match_directory_pattern_gets_a_star_suffix() {
        assert!(filename_match("docs/conf.py", &patterns(&["docs/"])));
        assert!(!filename_match("src/docs.py", &patterns(&["docs/"])));
    }

    #[test]
    fn regression_leading_slash_is_stripped_from_the_candidate() {
        assert!(filename_match("/src/foo.py", &patterns(&["src/*"])));
    }

    #[test]
    fn regression_invalid_glob_patterns_are_ignored() {
        assert!(!filename_match("src/foo.py", &patterns(&["[unclosed"])));
    }

    fn changed(path: &str) -> ChangedFile {
        ChangedFile {
            path: path.to_string(),
            added_lines: BTreeSet::new(),
        }
    }

    #[test]
    fn functional_python_files_filters_extension_and_excludes_in_order() {
        let files = vec![
            changed("README.md"),
            changed("src/app.py"),
            changed("tests/test_app.py"),
            changed("vendor/dep.py"),
        ];
        let kept = python_files(files, &patterns(&["vendor/"]));
        let paths: Vec<_> = kept.iter().map(|file| file.path.as_str()).collect();
        assert_eq!(paths, vec!["src/app.py", "tests/test_app.py"]);
    }
}
