//! Command files: small Markdown summaries the editor exposes as `/<name>`.
//!
//! Manual generation overwrites existing files; generation during a scan only
//! fills in files that do not exist yet, so user edits survive rescans.

use crate::types::{Result, Skill};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, warn};

static UNSAFE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9-]+").expect("file name pattern is valid"));

/// Placeholder used when a skill has no description at all
pub const NO_DESCRIPTION: &str = "(no description for this skill)";

/// File name and rendered Markdown for one skill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandFile {
    pub file_name: String,
    pub content: String,
}

impl CommandFile {
    pub fn for_skill(skill: &Skill) -> Self {
        Self { file_name: file_name_for(&skill.name), content: render(skill) }
    }
}

/// Result of a single write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Written(PathBuf),
    /// An existing file was left untouched
    Kept(PathBuf),
}

/// Summary of a batch generation. Per-skill failures do not stop the batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationReport {
    pub written: usize,
    pub kept: usize,
    /// `"<name>: <error>"` for each skill that failed
    pub errors: Vec<String>,
}

impl GenerationReport {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Filesystem-safe command file name for a skill name.
///
/// `"My Skill!"` becomes `my-skill.md`; a name with no usable characters
/// becomes `skill.md`.
pub fn file_name_for(name: &str) -> String {
    let lowered = name.to_lowercase();
    let replaced = UNSAFE_CHARS.replace_all(&lowered, "-");
    let safe = replaced.trim_matches('-');
    let stem = if safe.is_empty() { "skill" } else { safe };
    format!("{stem}.md")
}

fn render(skill: &Skill) -> String {
    let translated = skill.translated_description.as_deref();
    let title = translated.unwrap_or(&skill.name);
    let description = match translated {
        Some(text) => text,
        None if !skill.description.is_empty() => skill.description.as_str(),
        None => NO_DESCRIPTION,
    };

    let mut lines = vec![format!("# {title}"), String::new()];
    if translated.is_some() {
        lines.push(format!("> {}", skill.name));
        lines.push(String::new());
    }
    lines.extend([
        format!("**Category**: {}", skill.category.label()),
        String::new(),
        format!("**Description**: {description}"),
        String::new(),
        "---".to_string(),
        String::new(),
        "Usage:".to_string(),
        String::new(),
        format!("When this command is used in a conversation (for example `/{} ...`):", skill.name),
        String::new(),
        "1. Prefer the conventions of this local skill when answering.".to_string(),
        format!(
            "2. The skill lives at `{}`; ask for its key contents if you need them.",
            skill.path.display()
        ),
        "3. Interpret the input that follows the way the skill describes.".to_string(),
        String::new(),
    ]);
    lines.join("\n")
}

/// Write `file` into `dir`, creating the directory if needed.
///
/// With `overwrite == false` an existing file is kept as is.
pub fn write_command_file(dir: &Path, file: &CommandFile, overwrite: bool) -> Result<WriteOutcome> {
    fs::create_dir_all(dir)?;
    let path = dir.join(&file.file_name);

    if !overwrite && path.exists() {
        debug!(path = %path.display(), "command file exists, keeping it");
        return Ok(WriteOutcome::Kept(path));
    }

    fs::write(&path, &file.content)?;
    debug!(path = %path.display(), "wrote command file");
    Ok(WriteOutcome::Written(path))
}

/// Generate command files for every skill in `skills`.
pub fn generate_all(dir: &Path, skills: &[Skill], overwrite: bool) -> GenerationReport {
    let mut report = GenerationReport::default();

    for skill in skills {
        match write_command_file(dir, &CommandFile::for_skill(skill), overwrite) {
            Ok(WriteOutcome::Written(_)) => report.written += 1,
            Ok(WriteOutcome::Kept(_)) => report.kept += 1,
            Err(e) => {
                warn!(skill = %skill.name, error = %e, "failed to generate command file");
                report.errors.push(format!("{}: {}", skill.name, e));
            }
        }
    }

    report
}
