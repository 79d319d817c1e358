//! Layered configuration for the review bot: built-in defaults, the
//! `setup.cfg` linter section, and the repository `.pep8speaks.yml`, merged
//! right-biased and projected into linter command-line arguments.

pub mod bot_config;
pub mod config_merge;
pub mod config_resolver;
pub mod setup_cfg;

pub use bot_config::{
    BotConfig, LinterOptions, MessageConfig, MessageTemplates, ScannerConfig, DEFAULT_LINTER,
    SUPPORTED_LINTERS,
};
pub use config_merge::merge_values;
pub use config_resolver::{
    joined_arguments, linter_arguments, resolve_config, ConfigDocOutcome, ConfigResolution,
};
pub use setup_cfg::{parse_linter_section, LinterSection};
