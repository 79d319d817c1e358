use crate::bot_config::{LinterOptions, SUPPORTED_LINTERS};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Recognized keys of a `[pycodestyle]` / `[flake8]` section in `setup.cfg`.
/// Both linters read the identical section shape, so one parsed section is
/// projected onto every known linter table.
pub struct LinterSection {
    pub ignore: Vec<String>,
    pub exclude: Vec<String>,
    pub filename: Vec<String>,
    pub select: Vec<String>,
    pub max_line_length: Option<u64>,
}

impl LinterSection {
    pub fn is_empty(&self) -> bool {
        self.ignore.is_empty()
            && self.exclude.is_empty()
            && self.filename.is_empty()
            && self.select.is_empty()
            && self.max_line_length.is_none()
    }

    /// Overlays the section onto one linter's option table. Only keys the
    /// section actually set are replaced.
    pub fn apply_to(&self, options: &mut LinterOptions) {
        if !self.ignore.is_empty() {
            options.ignore = self.ignore.clone();
        }
        if !self.exclude.is_empty() {
            options.exclude = self.exclude.clone();
        }
        if !self.filename.is_empty() {
            options.filename = self.filename.clone();
        }
        if !self.select.is_empty() {
            options.select = self.select.clone();
        }
        if self.max_line_length.is_some() {
            options.max_line_length = self.max_line_length;
        }
    }
}

/// Extracts the first `[pycodestyle]` or `[flake8]` section from an INI
/// document. Returns `None` when neither section exists. Values may span
/// indented continuation lines; inline `#` comments are stripped; list
/// values split on commas and newlines.
pub fn parse_linter_section(text: &str) -> Option<LinterSection> {
    let entries = collect_section_entries(text)?;
    let mut section = LinterSection::default();
    for (key, value) in entries {
        match key.as_str() {
            "ignore" => section.ignore = split_list(&value),
            "exclude" => section.exclude = split_list(&value),
            "filename" => section.filename = split_list(&value),
            "select" => section.select = split_list(&value),
            "max-line-length" | "max_line_length" => {
                section.max_line_length = value.trim().parse::<u64>().ok();
            }
            _ => {}
        }
    }
    Some(section)
}

fn collect_section_entries(text: &str) -> Option<Vec<(String, String)>> {
    let mut in_section = false;
    let mut seen_section = false;
    let mut entries: Vec<(String, String)> = Vec::new();
    for raw_line in text.lines() {
        let line = strip_inline_comment(raw_line);
        let trimmed = line.trim();
        if trimmed.starts_with('[') && trimmed.ends_with(']') {
            if in_section {
                break;
            }
            let name = trimmed.trim_start_matches('[').trim_end_matches(']').trim();
            in_section = SUPPORTED_LINTERS.contains(&name);
            seen_section = seen_section || in_section;
            continue;
        }
        if !in_section || trimmed.is_empty() {
            continue;
        }
        let is_continuation = line.starts_with(char::is_whitespace);
        if is_continuation {
            if let Some((_, value)) = entries.last_mut() {
                value.push('\n');
                value.push_str(trimmed);
            }
            continue;
        }
        if let Some((key, value)) = split_key_value(trimmed) {
            entries.push((key, value));
        }
    }
    if seen_section {
        Some(entries)
    } else {
        None
    }
}

fn split_key_value(line: &str) -> Option<(String, String)> {
    let separator = line.find(['=', ':'])?;
    let key = line[..separator].trim().to_ascii_lowercase();
    let value = line[separator + 1..].trim().to_string();
    if key.is_empty() {
        return None;
    }
    Some((key, value))
}

fn strip_inline_comment(line: &str) -> &str {
    match line.find('#') {
        Some(index) => &line[..index],
        None => line,
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(|ch| ch == ',' || ch == '\n')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}
