use std::env;
use std::path::{Path, PathBuf};

use crate::error::{LayoutError, Result};

/// Application directory under the user's home (config, storage, logs)
pub const APP_DIR_NAME: &str = ".skillshelf";

/// Subdirectory holding the persisted overlay tables
pub const STORAGE_DIR: &str = "storage";

/// Subdirectory for rolling log files
pub const LOGS_DIR: &str = "logs";

/// Environment variable overriding the storage directory
pub const STORAGE_ENV: &str = "SKILLSHELF_HOME";

/// Editor directory under the home directory that holds the default skill roots
pub const EDITOR_DIR_NAME: &str = ".cursor";

/// Default skill roots are children of the editor directory starting with this prefix
pub const SKILLS_DIR_PREFIX: &str = "skills";

/// The one default root whose skills ship with the editor
pub const BUILTIN_SKILLS_DIR: &str = "skills-cursor";

/// Skill root relative to an open project
pub const PROJECT_SKILLS_DIR: &[&str] = &[EDITOR_DIR_NAME, "skills"];

/// Descriptor file marking a directory as a skill
pub const SKILL_FILE: &str = "SKILL.md";

/// Commands directory under the editor directory
pub const COMMANDS_DIR: &str = "commands";

/// Target for command files generated on explicit request
pub const MANUAL_COMMANDS_DIR: &str = "skills";

/// Target for command files generated during scans
pub const AUTO_COMMANDS_DIR: &str = "skills-auto";

/// Fixed filesystem locations used by skillshelf.
///
/// Every location is derived from a home directory so tests can point the
/// whole layout at a temporary directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    home: PathBuf,
    storage_dir: PathBuf,
}

impl Layout {
    /// Layout for the current user, honouring `SKILLSHELF_HOME` for storage.
    pub fn from_env() -> Result<Self> {
        let home = dirs::home_dir().ok_or(LayoutError::NoHomeDir)?;
        let mut layout = Self::with_home(home);
        if let Ok(storage) = env::var(STORAGE_ENV)
            && !storage.trim().is_empty()
        {
            layout.storage_dir = PathBuf::from(storage.trim());
        }
        Ok(layout)
    }

    /// Layout rooted at an explicit home directory.
    pub fn with_home(home: impl Into<PathBuf>) -> Self {
        let home = home.into();
        let storage_dir = home.join(APP_DIR_NAME).join(STORAGE_DIR);
        Self { home, storage_dir }
    }

    /// Replace the storage directory.
    pub fn with_storage_dir(mut self, storage_dir: impl Into<PathBuf>) -> Self {
        self.storage_dir = storage_dir.into();
        self
    }

    /// The home directory everything else is resolved against
    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Private directory for the overlay tables
    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    /// `~/.cursor`, parent of the default skill roots
    pub fn default_base_dir(&self) -> PathBuf {
        self.home.join(EDITOR_DIR_NAME)
    }

    /// `<project>/.cursor/skills`
    pub fn project_skills_dir(&self, project_root: &Path) -> PathBuf {
        PROJECT_SKILLS_DIR.iter().fold(project_root.to_path_buf(), |dir, part| dir.join(part))
    }

    /// `~/.cursor/commands/skills`
    pub fn manual_commands_dir(&self) -> PathBuf {
        self.default_base_dir().join(COMMANDS_DIR).join(MANUAL_COMMANDS_DIR)
    }

    /// `~/.cursor/commands/skills-auto`
    pub fn auto_commands_dir(&self) -> PathBuf {
        self.default_base_dir().join(COMMANDS_DIR).join(AUTO_COMMANDS_DIR)
    }

    /// Resolve a possibly relative path against the home directory.
    pub fn resolve_from_home(&self, path: &Path) -> PathBuf {
        if path.is_absolute() { path.to_path_buf() } else { self.home.join(path) }
    }
}
