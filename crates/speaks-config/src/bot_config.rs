use serde::{Deserialize, Serialize};
use serde_yaml::Mapping;
use speaks_core::MessageKind;

/// Linters the scanner can be pointed at. Both accept the same option
/// section format; they differ only in the diagnostic code letters they emit.
pub const SUPPORTED_LINTERS: &[&str] = &["pycodestyle", "flake8"];

pub const DEFAULT_LINTER: &str = "pycodestyle";

const DEFAULT_NO_ERRORS_MESSAGE: &str =
    "Cheers ! There are no PEP8 issues in this Pull Request. :beers: ";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
/// Header/footer template pair for one message family. `{name}` in either
/// template is substituted with the PR author login before composing.
pub struct MessageTemplates {
    pub header: String,
    pub footer: String,
}

impl Default for MessageTemplates {
    fn default() -> Self {
        Self {
            header: String::new(),
            footer: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
/// The `message` block of the configuration document.
pub struct MessageConfig {
    pub opened: MessageTemplates,
    pub updated: MessageTemplates,
    pub no_errors: String,
}

impl Default for MessageConfig {
    fn default() -> Self {
        Self {
            opened: MessageTemplates::default(),
            updated: MessageTemplates::default(),
            no_errors: DEFAULT_NO_ERRORS_MESSAGE.to_string(),
        }
    }
}

impl MessageConfig {
    pub fn templates_for(&self, kind: MessageKind) -> &MessageTemplates {
        match kind {
            MessageKind::Opened => &self.opened,
            MessageKind::Updated => &self.updated,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
/// The `scanner` block: which linter runs and whether diagnostics are
/// restricted to lines the PR actually added.
pub struct ScannerConfig {
    pub diff_only: bool,
    pub linter: String,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            diff_only: false,
            linter: DEFAULT_LINTER.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
/// Per-linter option table. Field order here is the order flags are emitted
/// on the command line. Unknown keys land in `extra` and pass through.
pub struct LinterOptions {
    pub ignore: Vec<String>,
    #[serde(rename = "max-line-length")]
    pub max_line_length: Option<u64>,
    pub count: bool,
    pub first: bool,
    #[serde(rename = "show-pep8")]
    pub show_pep8: bool,
    pub filename: Vec<String>,
    pub exclude: Vec<String>,
    pub select: Vec<String>,
    #[serde(rename = "show-source")]
    pub show_source: bool,
    pub statistics: bool,
    #[serde(rename = "hang-closing")]
    pub hang_closing: bool,
    #[serde(flatten)]
    pub extra: Mapping,
}

impl Default for LinterOptions {
    fn default() -> Self {
        Self {
            ignore: Vec::new(),
            max_line_length: Some(79),
            count: false,
            first: false,
            show_pep8: false,
            filename: Vec::new(),
            exclude: Vec::new(),
            select: Vec::new(),
            show_source: false,
            statistics: false,
            hang_closing: false,
            extra: Mapping::new(),
        }
    }
}

impl LinterOptions {
    /// Linters are case-sensitive on codes; user config is not trusted to be.
    pub fn normalize_ignore_codes(&mut self) {
        for code in &mut self.ignore {
            *code = code.to_ascii_uppercase();
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
/// Fully merged bot configuration for one delivery.
pub struct BotConfig {
    pub message: MessageConfig,
    pub scanner: ScannerConfig,
    pub pycodestyle: LinterOptions,
    pub flake8: LinterOptions,
    pub no_blank_comment: bool,
    pub only_mention_files_with_errors: bool,
    pub descending_issues_order: bool,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            message: MessageConfig::default(),
            scanner: ScannerConfig::default(),
            pycodestyle: LinterOptions::default(),
            flake8: LinterOptions::default(),
            no_blank_comment: true,
            only_mention_files_with_errors: true,
            descending_issues_order: false,
        }
    }
}

impl BotConfig {
    /// Options of the linter the scanner is configured to run. An unknown
    /// linter name falls back to pycodestyle.
    pub fn active_linter_options(&self) -> &LinterOptions {
        self.linter_options(&self.scanner.linter)
    }

    pub fn linter_options(&self, linter: &str) -> &LinterOptions {
        match linter {
            "flake8" => &self.flake8,
            _ => &self.pycodestyle,
        }
    }

    pub fn linter_options_mut(&mut self, linter: &str) -> &mut LinterOptions {
        match linter {
            "flake8" => &mut self.flake8,
            _ => &mut self.pycodestyle,
        }
    }

    /// Substitutes `{name}` with the PR author login in every configured
    /// message template. Runs once, before composing.
    pub fn personalize_messages(&mut self, author: &str) {
        for templates in [&mut self.message.opened, &mut self.message.updated] {
            templates.header = templates.header.replace("{name}", author);
            templates.footer = templates.footer.replace("{name}", author);
        }
    }
}
