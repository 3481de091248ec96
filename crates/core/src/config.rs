use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::logging::LogFormat;

/// Settings consumed by the skill catalog.
///
/// Path settings use an empty string for "unset" so that the TOML file can
/// carry every key without forcing a value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SkillsSettings {
    /// Custom skills root, scanned recursively. Empty means "use the default roots".
    pub skills_path: String,

    /// Generate command files for enabled skills on every scan (never overwrites)
    pub auto_generate_commands: bool,

    /// Register the skill folders with the editor workspace on startup
    pub auto_add_to_workspace: bool,

    /// Directory that receives a generated `.code-workspace` file. Empty disables it.
    pub workspace_save_folder: String,
}

impl SkillsSettings {
    /// The configured custom root, if any.
    pub fn custom_root(&self) -> Option<PathBuf> {
        non_empty_path(&self.skills_path)
    }

    /// The configured workspace save folder, if any.
    pub fn workspace_save_folder(&self) -> Option<PathBuf> {
        non_empty_path(&self.workspace_save_folder)
    }

    /// Point the catalog at a custom root.
    pub fn with_skills_path(mut self, path: impl AsRef<Path>) -> Self {
        self.skills_path = path.as_ref().display().to_string();
        self
    }

    /// Enable or disable automatic command generation.
    pub fn with_auto_generate_commands(mut self, enabled: bool) -> Self {
        self.auto_generate_commands = enabled;
        self
    }
}

fn non_empty_path(value: &str) -> Option<PathBuf> {
    let trimmed = value.trim();
    if trimmed.is_empty() { None } else { Some(PathBuf::from(trimmed)) }
}

/// File logging section of the configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileLoggingConfig {
    /// Write JSON logs to the log directory
    pub enabled: bool,

    /// Filter level for the file output
    pub level: String,
}

impl Default for FileLoggingConfig {
    fn default() -> Self {
        Self { enabled: false, level: "debug".to_string() }
    }
}

/// `[logging]` section of the configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Default level for stderr output
    pub level: String,

    /// Stderr format: pretty, json or compact
    pub format: String,

    /// File logging
    pub file: FileLoggingConfig,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "warn".to_string(), format: "pretty".to_string(), file: FileLoggingConfig::default() }
    }
}

/// Root configuration structure for config.toml
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Skill catalog settings
    pub skills: SkillsSettings,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML string
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(toml_str).map_err(|e| crate::Error::Config(ConfigError::from(e).to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load configuration from a file, falling back to defaults when it does not exist
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::from_file(path)
        } else {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Default location of the config file (`~/.skillshelf/config.toml`)
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or(crate::error::LayoutError::NoHomeDir)?;
        Ok(home.join(crate::layout::APP_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        if LogFormat::parse_str(&self.logging.format).is_none() {
            return Err(crate::Error::Config(
                ConfigError::InvalidLogFormat(self.logging.format.clone()).to_string(),
            ));
        }
        Ok(())
    }

    /// Get example configuration (as a string)
    pub fn example() -> &'static str {
        r#"# skillshelf configuration

[skills]
# Custom skills root, scanned recursively for SKILL.md folders.
# Leave empty to scan ~/.cursor/skills* and <project>/.cursor/skills instead.
skills_path = ""
# Generate /commands files for enabled skills on every scan (existing files are kept)
auto_generate_commands = false
# Register skill folders with the editor workspace on startup
auto_add_to_workspace = false
# Where to write a .code-workspace file (relative paths resolve against the home directory)
workspace_save_folder = ""

[logging]
# Level for stderr output (overridden by SKILLSHELF_LOG or RUST_LOG)
level = "warn"
# Format: "pretty", "json" or "compact"
format = "pretty"

[logging.file]
enabled = false
level = "debug"
"#
    }
}

/// File name of the configuration inside the application directory
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Configuration-specific errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Unknown logging format
    #[error("invalid log format: {0}")]
    InvalidLogFormat(String),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    TomlParse(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::TomlParse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.skills.custom_root().is_none());
        assert!(!config.skills.auto_generate_commands);
        assert!(!config.skills.auto_add_to_workspace);
        assert!(config.skills.workspace_save_folder().is_none());
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.logging.format, "pretty");
        assert!(!config.logging.file.enabled);
    }

    #[test]
    fn test_config_from_toml_str() {
        let toml = r#"
[skills]
skills_path = "/home/user/my-skills"
auto_generate_commands = true

[logging]
level = "debug"
format = "json"
"#;

        let config = Config::from_toml_str(toml).unwrap();
        assert_eq!(config.skills.custom_root(), Some(PathBuf::from("/home/user/my-skills")));
        assert!(config.skills.auto_generate_commands);
        assert!(!config.skills.auto_add_to_workspace);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_blank_paths_are_unset() {
        let toml = r#"
[skills]
skills_path = "   "
workspace_save_folder = ""
"#;

        let config = Config::from_toml_str(toml).unwrap();
        assert!(config.skills.custom_root().is_none());
        assert!(config.skills.workspace_save_folder().is_none());
    }

    #[test]
    fn test_paths_are_trimmed() {
        let settings = SkillsSettings { skills_path: "  /skills  ".to_string(), ..Default::default() };
        assert_eq!(settings.custom_root(), Some(PathBuf::from("/skills")));
    }

    #[test]
    fn test_config_rejects_unknown_fields() {
        let result = Config::from_toml_str("[skills]\nunknown = 1\n");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("TOML parse error"));
    }

    #[test]
    fn test_config_rejects_unknown_log_format() {
        let result = Config::from_toml_str("[logging]\nformat = \"fancy\"\n");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("invalid log format: fancy"));
    }

    #[test]
    fn test_example_parses() {
        let config = Config::from_toml_str(Config::example()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let temp = TempDir::new().unwrap();
        let config = Config::load_or_default(&temp.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_or_default_existing_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[skills]\nauto_add_to_workspace = true\n").unwrap();

        let config = Config::load_or_default(&path).unwrap();
        assert!(config.skills.auto_add_to_workspace);
    }

    #[test]
    fn test_settings_builders() {
        let settings = SkillsSettings::default()
            .with_skills_path("/tmp/skills")
            .with_auto_generate_commands(true);
        assert_eq!(settings.custom_root(), Some(PathBuf::from("/tmp/skills")));
        assert!(settings.auto_generate_commands);
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidLogFormat("fancy".to_string());
        assert_eq!(err.to_string(), "invalid log format: fancy");

        let err = ConfigError::TomlParse("parse error".to_string());
        assert_eq!(err.to_string(), "TOML parse error: parse error");
    }
}
