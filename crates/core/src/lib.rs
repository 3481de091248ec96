pub mod config;
pub mod error;
pub mod layout;
pub mod logging;

pub use config::{Config, ConfigError, FileLoggingConfig, SkillsSettings};
pub use error::{Error, LayoutError, Result};
pub use layout::{Layout, SKILL_FILE};
pub use logging::{LogFormat, init_logging, sanitize_path};
