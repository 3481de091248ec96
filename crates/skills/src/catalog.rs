//! The skill catalog: decides which roots to scan, merges the overlays into
//! the discovered skills and applies the user's mutations.
//!
//! Two mutually exclusive modes:
//!
//! - **configured root**: `skills.skills_path` is set; that directory is
//!   scanned recursively and every skill is `personal`.
//! - **default roots**: every `~/.cursor/skills*` directory plus
//!   `<project>/.cursor/skills` of each open project, each scanned one level deep.

use crate::commands::{self, GenerationReport};
use crate::overlay::OverlayStore;
use crate::scanner::{self, DEFAULT_MAX_DEPTH, ScanTrace};
use crate::types::{Category, CategoryChoice, Result, Skill, SkillError};
use crate::watch::WatchTarget;
use crate::workspace::{self, WorkspaceFolder};
use skillshelf_core::layout::SKILLS_DIR_PREFIX;
use skillshelf_core::{Layout, SkillsSettings, sanitize_path};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Longest accepted translated description, in characters
pub const MAX_TRANSLATED_DESCRIPTION_LEN: usize = 200;

/// Default roots are expected to hold skills as direct children.
const DEFAULT_ROOT_DEPTH: usize = 1;

/// Non-fatal problems found while scanning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanWarning {
    /// The configured root does not exist
    RootNotFound(PathBuf),
    /// Automatic command generation failed for a skill (`"<name>: <error>"`)
    CommandGeneration(String),
}

impl fmt::Display for ScanWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanWarning::RootNotFound(path) => write!(f, "skills folder does not exist: {}", path.display()),
            ScanWarning::CommandGeneration(msg) => write!(f, "command generation failed: {msg}"),
        }
    }
}

/// Sorted scan result plus anything worth telling the user.
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    pub skills: Vec<Skill>,
    pub warnings: Vec<ScanWarning>,
}

pub struct SkillCatalog {
    settings: SkillsSettings,
    layout: Layout,
    overlays: OverlayStore,
    project_roots: Vec<PathBuf>,
}

impl SkillCatalog {
    pub fn new(settings: SkillsSettings, layout: Layout, overlays: OverlayStore) -> Self {
        Self { settings, layout, overlays, project_roots: Vec::new() }
    }

    /// Catalog with overlays loaded from the layout's storage directory.
    pub fn open(settings: SkillsSettings, layout: Layout) -> Self {
        let overlays = OverlayStore::open(layout.storage_dir());
        Self::new(settings, layout, overlays)
    }

    /// Open projects whose `.cursor/skills` folders are scanned in default mode.
    pub fn with_project_roots<I, P>(mut self, roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.project_roots = roots.into_iter().map(|root| absolute(&root.into())).collect();
        self
    }

    pub fn settings(&self) -> &SkillsSettings {
        &self.settings
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn overlays(&self) -> &OverlayStore {
        &self.overlays
    }

    pub fn project_roots(&self) -> &[PathBuf] {
        &self.project_roots
    }

    /// The configured custom root as an absolute path.
    pub fn configured_root(&self) -> Option<PathBuf> {
        self.settings.custom_root().map(|root| absolute(&root))
    }

    /// Canonical paths of every enabled skill, scanned or not.
    pub fn enabled_paths(&self) -> Vec<String> {
        self.overlays.enabled_keys().map(str::to_string).collect()
    }

    /// Every directory that currently acts as a scan root, with its category.
    ///
    /// Only existing directories are returned.
    pub fn active_roots(&self) -> Vec<(PathBuf, Category)> {
        match self.configured_root() {
            Some(root) if root.is_dir() => vec![(root, Category::Personal)],
            Some(_) => Vec::new(),
            None => {
                let mut roots: Vec<(PathBuf, Category)> = default_root_dirs(&self.layout.default_base_dir())
                    .into_iter()
                    .map(|(name, path)| (path, Category::from_root_dir_name(&name)))
                    .collect();
                roots.extend(
                    self.project_roots
                        .iter()
                        .map(|project| self.layout.project_skills_dir(project))
                        .filter(|dir| dir.is_dir())
                        .map(|dir| (dir, Category::Project)),
                );
                roots
            }
        }
    }

    /// Directories whose changes can affect the next scan. The editor
    /// directory is watched shallowly so new `skills*` roots are noticed.
    pub fn watch_targets(&self) -> Vec<WatchTarget> {
        match self.configured_root() {
            Some(root) => vec![WatchTarget::recursive(root)],
            None => {
                let mut targets = vec![WatchTarget::shallow(self.layout.default_base_dir())];
                targets.extend(self.active_roots().into_iter().map(|(root, _)| WatchTarget::recursive(root)));
                targets
            }
        }
    }

    /// Discover all skills, apply the overlays and sort them.
    pub fn scan_all(&self) -> ScanReport {
        let mut warnings = Vec::new();

        let mut skills = match self.configured_root() {
            Some(root) if !root.exists() => {
                warn!(root = %sanitize_path(&root), "configured skills folder does not exist");
                warnings.push(ScanWarning::RootNotFound(root));
                Vec::new()
            }
            Some(root) => {
                debug!(root = %sanitize_path(&root), "scanning configured root");
                scanner::scan(&root, Category::Personal, DEFAULT_MAX_DEPTH)
            }
            None => self
                .active_roots()
                .into_iter()
                .flat_map(|(root, category)| {
                    debug!(root = %sanitize_path(&root), %category, "scanning default root");
                    scanner::scan(&root, category, DEFAULT_ROOT_DEPTH)
                })
                .collect(),
        };

        let mut seen = HashSet::new();
        skills.retain(|skill| seen.insert(skill.path.clone()));

        for skill in &mut skills {
            self.overlays.apply(skill);
        }

        if self.settings.auto_generate_commands {
            let enabled: Vec<Skill> = skills.iter().filter(|s| s.enabled).cloned().collect();
            if !enabled.is_empty() {
                let report = commands::generate_all(&self.layout.auto_commands_dir(), &enabled, false);
                debug!(written = report.written, kept = report.kept, "auto-generated command files");
                warnings.extend(report.errors.into_iter().map(ScanWarning::CommandGeneration));
            }
        }

        sort_skills(&mut skills);
        info!(count = skills.len(), warnings = warnings.len(), "scan complete");

        ScanReport { skills, warnings }
    }

    /// Flip the enabled flag of `skill` and persist it. Returns the new state.
    pub fn toggle_enabled(&mut self, skill: &mut Skill) -> Result<bool> {
        let key = skill.key();
        let enabled = !self.overlays.is_enabled(&key);
        self.overlays.set_enabled(&key, enabled)?;
        skill.enabled = enabled;
        Ok(enabled)
    }

    /// Set the translated description; blank text removes it.
    pub fn set_translated_description(&mut self, skill: &mut Skill, text: &str) -> Result<()> {
        validate_translated_description(text)?;

        let key = skill.key();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            self.overlays.remove_translated_description(&key)?;
            skill.translated_description = None;
        } else {
            self.overlays.set_translated_description(&key, trimmed)?;
            skill.translated_description = Some(trimmed.to_string());
        }
        Ok(())
    }

    /// Apply a category choice to every skill in `skills`, persisting once.
    pub fn set_category(&mut self, skills: &mut [Skill], choice: CategoryChoice) -> Result<()> {
        if skills.is_empty() {
            return Ok(());
        }

        let keys: Vec<String> = skills.iter().map(Skill::key).collect();
        match choice {
            CategoryChoice::UseDefault => {
                self.overlays.update_categories(keys.iter().map(String::as_str), None)?;
                for skill in skills.iter_mut() {
                    skill.category = self.origin_category(&skill.path);
                }
            }
            CategoryChoice::Fixed(category) => {
                self.overlays.update_categories(keys.iter().map(String::as_str), Some(category))?;
                for skill in skills.iter_mut() {
                    skill.category = category;
                }
            }
        }
        Ok(())
    }

    /// The category a fresh scan assigns to the skill at `path`.
    ///
    /// Roots are consulted in scan order, so a directory that is both a
    /// default root and a project's skills dir resolves like the scan's
    /// surviving duplicate.
    pub fn origin_category(&self, path: &Path) -> Category {
        if let Some(root) = self.configured_root()
            && path.starts_with(&root)
        {
            return Category::Personal;
        }

        let parent = path.parent();
        if let Some((_, category)) = self.active_roots().into_iter().find(|(root, _)| Some(root.as_path()) == parent) {
            return category;
        }

        parent
            .and_then(Path::file_name)
            .map(|name| Category::from_root_dir_name(&name.to_string_lossy()))
            .unwrap_or(Category::Personal)
    }

    /// Write command files for `skills` into the manual commands directory,
    /// replacing existing ones.
    pub fn generate_commands(&self, skills: &[Skill]) -> GenerationReport {
        let dir = self.layout.manual_commands_dir();
        let report = commands::generate_all(&dir, skills, true);
        info!(written = report.written, failed = report.errors.len(), dir = %sanitize_path(&dir), "generated command files");
        report
    }

    /// Recursively scan an arbitrary folder as `personal`, without overlays.
    pub fn test_scan(&self, path: &Path) -> Result<Vec<Skill>> {
        let root = existing_root(path)?;
        Ok(scanner::scan(&root, Category::Personal, DEFAULT_MAX_DEPTH))
    }

    /// [`SkillCatalog::test_scan`] with every scan decision reported to `trace`.
    pub fn test_scan_with_trace(&self, path: &Path, trace: &mut dyn ScanTrace) -> Result<Vec<Skill>> {
        let root = existing_root(path)?;
        trace.line(&format!("root: {}", root.display()));
        let skills = scanner::scan_with_trace(&root, Category::Personal, DEFAULT_MAX_DEPTH, trace);
        trace.line(&format!("found {} skill(s)", skills.len()));
        Ok(skills)
    }

    /// Folders an editor workspace should list to show the skills.
    pub fn skill_folders(&self) -> Result<Vec<WorkspaceFolder>> {
        if let Some(root) = self.configured_root() {
            if !root.exists() {
                return Err(SkillError::NotFound(root));
            }
            return Ok(vec![WorkspaceFolder::from_path(root, "Skills")]);
        }

        let base = self.layout.default_base_dir();
        if !base.exists() {
            return Err(SkillError::NotFound(base));
        }

        Ok(default_root_dirs(&base)
            .into_iter()
            .map(|(name, path)| WorkspaceFolder { name, path })
            .collect())
    }

    /// Skill folders that are not already open as project roots.
    pub fn workspace_additions(&self) -> Result<Vec<WorkspaceFolder>> {
        let open: Vec<WorkspaceFolder> = self
            .project_roots
            .iter()
            .map(|root| WorkspaceFolder::from_path(root.clone(), "project"))
            .collect();
        Ok(workspace::new_folders(&open, self.skill_folders()?))
    }

    /// Write a workspace file for `folders` into the configured save folder.
    ///
    /// Returns `Ok(None)` when no save folder is configured or nothing was written.
    pub fn save_workspace(&self, folders: &[WorkspaceFolder]) -> Result<Option<PathBuf>> {
        match self.settings.workspace_save_folder() {
            Some(dir) => workspace::write_workspace_file(&self.layout, &dir, folders),
            None => Ok(None),
        }
    }
}

/// Reject translated descriptions longer than [`MAX_TRANSLATED_DESCRIPTION_LEN`] characters.
pub fn validate_translated_description(text: &str) -> Result<()> {
    let len = text.chars().count();
    if len > MAX_TRANSLATED_DESCRIPTION_LEN {
        return Err(SkillError::Validation(format!(
            "translated description is {len} characters, the limit is {MAX_TRANSLATED_DESCRIPTION_LEN}"
        )));
    }
    Ok(())
}

/// Order by category rank, then name: case-insensitively first so that
/// `alpha` and `Beta` interleave naturally, lower case before upper case on
/// a case-only tie, then by path.
///
/// Names are compared by code point after lowercasing, not by locale
/// collation, so accented letters sort after `z`.
pub fn sort_skills(skills: &mut [Skill]) {
    skills.sort_by(compare_skills);
}

fn compare_skills(a: &Skill, b: &Skill) -> Ordering {
    a.category
        .rank()
        .cmp(&b.category.rank())
        .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        .then_with(|| b.name.cmp(&a.name))
        .then_with(|| a.path.cmp(&b.path))
}

/// Index of the skill matching `query`, by canonical path first and then by
/// exact name. A name shared by several skills is ambiguous.
pub fn find_skill(skills: &[Skill], query: &str) -> Result<usize> {
    let as_path = absolute(Path::new(query));
    if let Some(index) = skills.iter().position(|s| s.path == as_path) {
        return Ok(index);
    }

    let mut matches = skills.iter().enumerate().filter(|(_, s)| s.name == query).map(|(i, _)| i);
    match (matches.next(), matches.next()) {
        (Some(index), None) => Ok(index),
        (Some(_), Some(_)) => Err(SkillError::Ambiguous(query.to_string())),
        (None, _) => Err(SkillError::UnknownSkill(query.to_string())),
    }
}

fn existing_root(path: &Path) -> Result<PathBuf> {
    let root = absolute(path);
    if !root.exists() {
        return Err(SkillError::NotFound(root));
    }
    Ok(root)
}

/// `(name, path)` of each `skills*` directory directly under `base`, sorted by name.
fn default_root_dirs(base: &Path) -> Vec<(String, PathBuf)> {
    let entries = match fs::read_dir(base) {
        Ok(entries) => entries,
        Err(e) => {
            if base.exists() {
                warn!(base = %sanitize_path(base), error = %e, "failed to list default skills roots");
            }
            return Vec::new();
        }
    };

    let mut dirs: Vec<(String, PathBuf)> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_ok_and(|t| t.is_dir()))
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().into_owned();
            name.starts_with(SKILLS_DIR_PREFIX).then(|| (name, entry.path()))
        })
        .collect();
    dirs.sort();
    dirs
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
