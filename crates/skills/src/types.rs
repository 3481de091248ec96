//! Core types for the skill catalog.
//!
//! A skill is a directory holding a `SKILL.md` descriptor. Skills are
//! rediscovered on every scan; the user's overrides (enabled flag, translated
//! description, category) live in the overlay tables and are merged in after
//! discovery.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Origin/scope classification of a skill.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// User-owned skills (custom root or `~/.cursor/skills*`)
    Personal,
    /// Skills checked into an open project
    Project,
    /// Skills shipped with the editor (`~/.cursor/skills-cursor`)
    #[serde(alias = "cursor")]
    Builtin,
}

impl Category {
    /// All categories in display order.
    pub const VALUES: &[Category] = &[Category::Personal, Category::Project, Category::Builtin];

    /// Sort rank; lower ranks are listed first.
    pub fn rank(&self) -> u8 {
        match self {
            Category::Personal => 0,
            Category::Project => 1,
            Category::Builtin => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Personal => "personal",
            Category::Project => "project",
            Category::Builtin => "builtin",
        }
    }

    /// Human readable label used in listings and generated command files.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Personal => "Personal",
            Category::Project => "Project",
            Category::Builtin => "Built-in",
        }
    }

    /// Category of a default root, decided by the root directory's exact name.
    pub fn from_root_dir_name(name: &str) -> Self {
        if name == skillshelf_core::layout::BUILTIN_SKILLS_DIR { Category::Builtin } else { Category::Personal }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Category {
    type Err = SkillError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "personal" => Ok(Category::Personal),
            "project" => Ok(Category::Project),
            "builtin" | "cursor" => Ok(Category::Builtin),
            _ => Err(SkillError::Validation(format!(
                "invalid category: {s} (must be personal, project or builtin)"
            ))),
        }
    }
}

/// Target of a batch category change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryChoice {
    /// Drop the override and fall back to the category implied by the skill's location
    UseDefault,
    /// Override with a fixed category
    Fixed(Category),
}

impl FromStr for CategoryChoice {
    type Err = SkillError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "default" => Ok(CategoryChoice::UseDefault),
            other => other.parse().map(CategoryChoice::Fixed),
        }
    }
}

/// One discovered skill with its overlays applied.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Skill {
    /// Name from the descriptor, or the directory name when the descriptor has none
    pub name: String,

    /// Absolute path of the skill directory; the identity key for overlays
    pub path: PathBuf,

    /// Description from the descriptor (empty when absent)
    pub description: String,

    /// User supplied translation shown in place of `description`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translated_description: Option<String>,

    /// Whether the user enabled this skill
    #[serde(default)]
    pub enabled: bool,

    /// Effective category
    pub category: Category,
}

impl Skill {
    /// A freshly discovered skill with no overlays applied.
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, description: impl Into<String>, category: Category) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            description: description.into(),
            translated_description: None,
            enabled: false,
            category,
        }
    }

    /// The overlay key for this skill.
    pub fn key(&self) -> String {
        path_key(&self.path)
    }

    /// Translated description if set, otherwise the descriptor's description.
    pub fn effective_description(&self) -> &str {
        self.translated_description.as_deref().unwrap_or(&self.description)
    }

    /// Path of the descriptor file.
    pub fn descriptor_path(&self) -> PathBuf {
        self.path.join(skillshelf_core::SKILL_FILE)
    }
}

/// Overlay tables key skills by the string form of their canonical path.
pub fn path_key(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Errors that can occur when working with skills.
#[derive(Debug, thiserror::Error)]
pub enum SkillError {
    #[error("path does not exist: {}", .0.display())]
    NotFound(PathBuf),

    #[error("no skill matches '{0}'")]
    UnknownSkill(String),

    #[error("'{0}' matches more than one skill; use the skill path instead")]
    Ambiguous(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Validation(String),

    #[error("watcher error: {0}")]
    Watcher(String),
}

/// Result type for skill operations.
pub type Result<T> = std::result::Result<T, SkillError>;

impl From<SkillError> for skillshelf_core::Error {
    fn from(err: SkillError) -> Self {
        match err {
            SkillError::Io(e) => skillshelf_core::Error::Io(e),
            SkillError::Json(e) => skillshelf_core::Error::Parse(e.to_string()),
            SkillError::Validation(msg) => skillshelf_core::Error::Validation(msg),
            other => skillshelf_core::Error::Other(other.to_string()),
        }
    }
}
