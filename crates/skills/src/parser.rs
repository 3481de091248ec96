//! Parser for the metadata block at the top of SKILL.md.
//!
//! SKILL.md format:
//! ```markdown
//! ---
//! name: pdf-tools
//! description: Extract text and tables from PDF files
//! ---
//!
//! # PDF Tools
//! ...
//! ```
//!
//! Only `name` and `description` are read, one line each. Other keys and
//! nested YAML structures are ignored.

use crate::types::{Category, Result, Skill};
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

static FRONTMATTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\A---\s*\r?\n((?s:.*?))\r?\n---").expect("frontmatter pattern is valid"));

static NAME_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^name:[ \t]*(.+)$").expect("name pattern is valid"));

static DESCRIPTION_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^description:[ \t]*(.+)$").expect("description pattern is valid"));

/// Values found in a descriptor's metadata block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Descriptor {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl Descriptor {
    /// Apply the fallbacks: directory name for a missing name, empty description.
    pub fn resolve(self, skill_dir: &Path) -> (String, String) {
        let name = self.name.unwrap_or_else(|| dir_name(skill_dir));
        (name, self.description.unwrap_or_default())
    }
}

/// Parse descriptor contents. `None` means the file does not have the
/// `---` delimited block and the directory is not a skill.
pub fn parse_descriptor(content: &str) -> Option<Descriptor> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let block = FRONTMATTER.captures(content)?.get(1)?.as_str();

    Some(Descriptor { name: first_value(&NAME_LINE, block), description: first_value(&DESCRIPTION_LINE, block) })
}

fn first_value(pattern: &Regex, block: &str) -> Option<String> {
    let value = pattern.captures(block)?.get(1)?.as_str().trim();
    if value.is_empty() { None } else { Some(value.to_string()) }
}

/// Read and parse the descriptor inside `skill_dir`.
///
/// Returns `Ok(None)` when the file is not a valid descriptor; I/O failures
/// are returned so the caller can decide how to report them.
pub fn parse_skill(skill_dir: &Path, category: Category) -> Result<Option<Skill>> {
    let content = fs::read_to_string(skill_dir.join(skillshelf_core::SKILL_FILE))?;

    Ok(parse_descriptor(&content).map(|descriptor| {
        let (name, description) = descriptor.resolve(skill_dir);
        Skill::new(name, skill_dir, description, category)
    }))
}

fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "unknown".to_string())
}
