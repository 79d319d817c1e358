use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;

#[derive(Debug, Clone, PartialEq, Eq)]
/// One file touched by the PR with the 1-based target-side line numbers the
/// PR added. Deleted and context lines never appear here.
pub struct ChangedFile {
    pub path: String,
    pub added_lines: BTreeSet<u64>,
}

fn hunk_header_regex() -> &'static Regex {
    static HUNK_HEADER: OnceLock<Regex> = OnceLock::new();
    HUNK_HEADER.get_or_init(|| {
        Regex::new(r"^@@ -\d+(?:,\d+)? \+(\d+)(?:,\d+)? @@").expect("hunk header regex")
    })
}

/// Parses a unified diff into changed files, in diff order. Files deleted by
/// the PR (`+++ /dev/null`) are skipped; `a/`/`b/` prefixes and leading
/// slashes are stripped from paths.
pub fn parse_unified_diff(diff: &str) -> Vec<ChangedFile> {
    let mut files: Vec<ChangedFile> = Vec::new();
    let mut current: Option<usize> = None;
    let mut target_line: u64 = 0;
    let mut in_hunk = false;

    for line in diff.lines() {
        if let Some(raw_path) = line.strip_prefix("+++ ") {
            in_hunk = false;
            current = match normalize_target_path(raw_path) {
                Some(path) => Some(position_for(&mut files, path)),
                None => None,
            };
            continue;
        }
        if let Some(captures) = hunk_header_regex().captures(line) {
            if current.is_some() {
                target_line = captures[1].parse().unwrap_or(0);
                in_hunk = true;
            }
            continue;
        }
        if !in_hunk {
            continue;
        }
        let Some(index) = current else {
            continue;
        };
        match line.as_bytes().first() {
            Some(b'+') => {
                files[index].added_lines.insert(target_line);
                target_line += 1;
            }
            Some(b' ') | None => {
                // An empty line inside a hunk is a context line whose
                // content is empty.
                target_line += 1;
            }
            Some(b'-') => {}
            // "\ No newline at end of file" and similar markers.
            _ => {}
        }
    }
    files
}

fn normalize_target_path(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let raw = raw.split('\t').next().unwrap_or(raw);
    if raw == "/dev/null" {
        return None;
    }
    let stripped = raw.strip_prefix("b/").unwrap_or(raw);
    let stripped = stripped.trim_start_matches('/');
    if stripped.is_empty() {
        return None;
    }
    Some(stripped.to_string())
}

fn position_for(files: &mut Vec<ChangedFile>, path: String) -> usize {
    if let Some(index) = files.iter().position(|file| file.path == path) {
        return index;
    }
    files.push(ChangedFile {
        path,
        added_lines: BTreeSet::new(),
    });
    files.len() - 1
}

#[cfg(test)]
mod tests {
    use super::parse_unified_diff;

    const SAMPLE_DIFF: &str = "\
diff --git a/modules/good_module.py b/modules/good_module.py
index 0000001..0000002 100644
--- a/modules/good_module.py
+++ b/modules/good_module.py
@@ -10,6 +10,8 @@ def existing():
 context line
 another context
+added_line_twelve = 1
 third context
+added_line_fourteen = 2
 fourth context
@@ -30,3 +32,4 @@ def later():
 tail context
+added_line_thirty_three = 3
 more tail
diff --git a/README.md b/README.md
--- a/README.md
+++ b/README.md
@@ -1,2 +1,3 @@
 title
+new readme line
 body
diff --git a/old.py b/old.py
--- a/old.py
+++ /dev/null
@@ -1,2 +0,0 @@
-gone = 1
-gone = 2
";

    #[test]
    fn functional_parse_unified_diff_collects_added_target_lines() {
        let files = parse_unified_diff(SAMPLE_DIFF);
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].path, "modules/good_module.py");
        assert_eq!(
            files[0].added_lines.iter().copied().collect::<Vec<_>>(),
            vec![12, 14, 33]
        );
        assert_eq!(files[1].path, "README.md");
        assert_eq!(
            files[1].added_lines.iter().copied().collect::<Vec<_>>(),
            vec![2]
        );
    }

    #[test]
    fn unit_deleted_files_are_skipped() {
        let files = parse_unified_diff(SAMPLE_DIFF);
        assert!(files.iter().all(|file| file.path != "old.py"));
    }

    #[test]
    fn unit_deleted_and_context_lines_never_count_as_added() {
        let diff = "\
--- a/sample.py
+++ b/sample.py
@@ -1,4 +1,3 @@
 keep = 1
-removed = 2
 keep2 = 3
 keep3 = 4
";
        let files = parse_unified_diff(diff);
        assert_eq!(files.len(), 1);
        assert!(files[0].added_lines.is_empty());
    }

    #[test]
    fn regression_hunk_without_comma_counts_parse() {
        let diff = "\
--- a/one.py
+++ b/one.py
@@ -1 +1 @@
-old = 1
+new = 1
";
        let files = parse_unified_diff(diff);
        assert_eq!(
            files[0].added_lines.iter().copied().collect::<Vec<_>>(),
            vec![1]
        );
    }

    #[test]
    fn regression_empty_diff_produces_no_files() {
        assert!(parse_unified_diff("").is_empty());
    }
}
