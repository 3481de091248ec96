//! Recursive discovery of skill directories.
//!
//! A directory containing `SKILL.md` is a skill boundary: it is parsed and
//! nothing below it is visited, whether or not the descriptor parsed.
//! Directories without a descriptor are descended into until `max_depth`.

use crate::parser::parse_skill;
use crate::types::{Category, Skill};
use skillshelf_core::SKILL_FILE;
use std::path::Path;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Default recursion limit for a custom root.
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Directory names that are never scanned.
pub const EXCLUDED_DIRS: &[&str] = &[".git", "node_modules", "out", "dist", ".vscode"];

/// Dot-directories that are scanned despite the hidden-directory rule.
pub const ALLOWED_DOT_DIRS: &[&str] = &[".claude", ".cursor"];

/// Receives human-readable lines describing each scan decision.
pub trait ScanTrace {
    fn line(&mut self, line: &str);
}

impl<F: FnMut(&str)> ScanTrace for F {
    fn line(&mut self, line: &str) {
        self(line)
    }
}

struct NoTrace;

impl ScanTrace for NoTrace {
    fn line(&mut self, _line: &str) {}
}

/// Whether an entry is skipped by name, at any depth.
pub fn is_excluded(name: &str) -> bool {
    EXCLUDED_DIRS.contains(&name) || (name.starts_with('.') && !ALLOWED_DOT_DIRS.contains(&name))
}

/// Scan `root` for skills, assigning each the given category.
///
/// Results are in directory listing order. Unreadable directories contribute
/// nothing; a missing root yields an empty list.
pub fn scan(root: &Path, category: Category, max_depth: usize) -> Vec<Skill> {
    walk(root, category, max_depth, &mut NoTrace)
}

/// Same as [`scan`], additionally reporting every decision to `trace`.
pub fn scan_with_trace(root: &Path, category: Category, max_depth: usize, trace: &mut dyn ScanTrace) -> Vec<Skill> {
    walk(root, category, max_depth, trace)
}

fn walk(root: &Path, category: Category, max_depth: usize, trace: &mut dyn ScanTrace) -> Vec<Skill> {
    let mut skills = Vec::new();

    if !root.exists() {
        debug!(root = %root.display(), "scan root does not exist");
        return skills;
    }

    let mut entries = WalkDir::new(root).min_depth(1).max_depth(max_depth).into_iter();

    while let Some(next) = entries.next() {
        let entry = match next {
            Ok(entry) => entry,
            Err(err) => {
                let path = err.path().unwrap_or(root);
                warn!(path = %path.display(), error = %err, "failed to read directory");
                trace.line(&format!("{}scan error: {}: {}", indent(err.depth()), path.display(), err));
                continue;
            }
        };

        let pad = indent(entry.depth());
        let name = entry.file_name().to_string_lossy();
        let is_dir = entry.file_type().is_dir();

        if is_excluded(&name) {
            trace.line(&format!("{pad}skip: {name} (excluded by name)"));
            if is_dir {
                entries.skip_current_dir();
            }
            continue;
        }

        if !is_dir {
            continue;
        }

        let has_descriptor = entry.path().join(SKILL_FILE).exists();
        trace.line(&format!("{pad}dir: {name} | {SKILL_FILE} present: {has_descriptor}"));
        if !has_descriptor {
            continue;
        }

        entries.skip_current_dir();
        match parse_skill(entry.path(), category) {
            Ok(Some(skill)) => {
                debug!(skill = %skill.name, path = %skill.path.display(), "found skill");
                trace.line(&format!("{pad}  -> skill: name=\"{}\"", skill.name));
                skills.push(skill);
            }
            Ok(None) => {
                debug!(path = %entry.path().display(), "descriptor has no frontmatter block, skipping");
                trace.line(&format!(
                    "{pad}  -> not counted: no frontmatter block (must open and close with ---)"
                ));
            }
            Err(e) => {
                debug!(path = %entry.path().display(), error = %e, "failed to read descriptor, skipping");
                trace.line(&format!("{pad}  -> not counted: {e}"));
            }
        }
    }

    skills
}

fn indent(depth: usize) -> String {
    "  ".repeat(depth.saturating_sub(1))
}
