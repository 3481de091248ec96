//! Persisted per-skill overrides.
//!
//! Three independent tables keyed by the skill's canonical path:
//!
//! - `enabled-skills.json`: array of enabled paths
//! - `translated-descriptions.json`: object mapping path to display text
//! - `skill-categories.json`: object mapping path to category
//!
//! Tables are loaded once when the store is opened and every mutation
//! rewrites the affected file before returning.

use crate::types::{Category, Result, Skill};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const ENABLED_FILE: &str = "enabled-skills.json";
pub const TRANSLATIONS_FILE: &str = "translated-descriptions.json";
pub const CATEGORIES_FILE: &str = "skill-categories.json";

/// In-memory copy of the overlay tables plus the directory they persist to.
#[derive(Debug, Clone)]
pub struct OverlayStore {
    dir: PathBuf,
    enabled: BTreeSet<String>,
    translations: BTreeMap<String, String>,
    categories: BTreeMap<String, Category>,
}

impl OverlayStore {
    /// Load all tables from `dir`. Missing or unreadable files yield empty tables.
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let enabled = load_table(&dir.join(ENABLED_FILE));
        let translations = load_table(&dir.join(TRANSLATIONS_FILE));
        let categories = load_table(&dir.join(CATEGORIES_FILE));
        Self { dir, enabled, translations, categories }
    }

    /// Directory holding the JSON files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn is_enabled(&self, key: &str) -> bool {
        self.enabled.contains(key)
    }

    /// Every enabled path, in key order
    pub fn enabled_keys(&self) -> impl Iterator<Item = &str> {
        self.enabled.iter().map(String::as_str)
    }

    pub fn translated_description(&self, key: &str) -> Option<&str> {
        self.translations.get(key).map(String::as_str)
    }

    pub fn category(&self, key: &str) -> Option<Category> {
        self.categories.get(key).copied()
    }

    /// Merge the overlays into a freshly discovered skill.
    pub fn apply(&self, skill: &mut Skill) {
        let key = skill.key();
        skill.enabled = self.is_enabled(&key);
        skill.translated_description = self.translated_description(&key).map(str::to_string);
        if let Some(category) = self.category(&key) {
            skill.category = category;
        }
    }

    pub fn set_enabled(&mut self, key: &str, enabled: bool) -> Result<()> {
        if enabled {
            self.enabled.insert(key.to_string());
        } else {
            self.enabled.remove(key);
        }
        save_table(&self.dir.join(ENABLED_FILE), &self.enabled)?;
        info!(skill = key, enabled, "updated enabled skills");
        Ok(())
    }

    pub fn set_translated_description(&mut self, key: &str, text: &str) -> Result<()> {
        self.translations.insert(key.to_string(), text.to_string());
        save_table(&self.dir.join(TRANSLATIONS_FILE), &self.translations)?;
        info!(skill = key, "saved translated description");
        Ok(())
    }

    pub fn remove_translated_description(&mut self, key: &str) -> Result<()> {
        self.translations.remove(key);
        save_table(&self.dir.join(TRANSLATIONS_FILE), &self.translations)?;
        info!(skill = key, "removed translated description");
        Ok(())
    }

    pub fn set_category(&mut self, key: &str, category: Category) -> Result<()> {
        self.update_categories([key], Some(category))
    }

    pub fn clear_category(&mut self, key: &str) -> Result<()> {
        self.update_categories([key], None)
    }

    /// Set (or with `None`, clear) the category override of several skills,
    /// writing the table once.
    pub fn update_categories<'a>(
        &mut self, keys: impl IntoIterator<Item = &'a str>, category: Option<Category>,
    ) -> Result<()> {
        let mut count = 0usize;
        for key in keys {
            match category {
                Some(category) => {
                    self.categories.insert(key.to_string(), category);
                }
                None => {
                    self.categories.remove(key);
                }
            }
            count += 1;
        }
        save_table(&self.dir.join(CATEGORIES_FILE), &self.categories)?;
        info!(count, category = ?category, "updated category overrides");
        Ok(())
    }
}

fn load_table<T: DeserializeOwned + Default>(path: &Path) -> T {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "overlay file not present");
            return T::default();
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to read overlay file, starting empty");
            return T::default();
        }
    };

    serde_json::from_str(&content).unwrap_or_else(|e| {
        warn!(path = %path.display(), error = %e, "corrupt overlay file, starting empty");
        T::default()
    })
}

/// Write `value` as pretty JSON through a temp sibling renamed over `path`.
fn save_table<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(value)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_empty_dir() {
        let temp = TempDir::new().unwrap();
        let store = OverlayStore::open(temp.path().join("storage"));
        assert_eq!(store.enabled_keys().count(), 0);
        assert!(store.translated_description("/x").is_none());
        assert!(store.category("/x").is_none());
    }

    #[test]
    fn test_round_trip_through_reopen() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("storage");

        let mut store = OverlayStore::open(&dir);
        store.set_enabled("/skills/a", true).unwrap();
        store.set_enabled("/skills/b", true).unwrap();
        store.set_enabled("/skills/b", false).unwrap();
        store.set_translated_description("/skills/a", "Translated A").unwrap();
        store.set_category("/skills/a", Category::Project).unwrap();

        let reopened = OverlayStore::open(&dir);
        assert!(reopened.is_enabled("/skills/a"));
        assert!(!reopened.is_enabled("/skills/b"));
        assert_eq!(reopened.translated_description("/skills/a"), Some("Translated A"));
        assert_eq!(reopened.category("/skills/a"), Some(Category::Project));
    }

    #[test]
    fn test_file_formats() {
        let temp = TempDir::new().unwrap();
        let mut store = OverlayStore::open(temp.path());
        store.set_enabled("/skills/a", true).unwrap();
        store.set_translated_description("/skills/a", "A").unwrap();
        store.set_category("/skills/a", Category::Builtin).unwrap();

        let enabled: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(temp.path().join(ENABLED_FILE)).unwrap()).unwrap();
        assert_eq!(enabled, serde_json::json!(["/skills/a"]));

        let translations = fs::read_to_string(temp.path().join(TRANSLATIONS_FILE)).unwrap();
        assert_eq!(translations, "{\n  \"/skills/a\": \"A\"\n}");

        let categories: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(temp.path().join(CATEGORIES_FILE)).unwrap()).unwrap();
        assert_eq!(categories, serde_json::json!({"/skills/a": "builtin"}));

        assert!(!temp.path().join("enabled-skills.json.tmp").exists());
    }

    #[test]
    fn test_corrupt_file_is_empty_table() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(ENABLED_FILE), "{ not json").unwrap();
        fs::write(temp.path().join(TRANSLATIONS_FILE), "[1, 2, 3]").unwrap();
        fs::write(temp.path().join(CATEGORIES_FILE), r#"{"/skills/a": "project"}"#).unwrap();

        let store = OverlayStore::open(temp.path());
        assert_eq!(store.enabled_keys().count(), 0);
        assert!(store.translated_description("/skills/a").is_none());
        assert_eq!(store.category("/skills/a"), Some(Category::Project));
    }

    #[test]
    fn test_legacy_cursor_category_is_builtin() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(CATEGORIES_FILE), r#"{"/skills/a": "cursor"}"#).unwrap();

        let store = OverlayStore::open(temp.path());
        assert_eq!(store.category("/skills/a"), Some(Category::Builtin));
    }

    #[test]
    fn test_remove_translation_and_clear_category() {
        let temp = TempDir::new().unwrap();
        let mut store = OverlayStore::open(temp.path());
        store.set_translated_description("/skills/a", "A").unwrap();
        store.set_category("/skills/a", Category::Personal).unwrap();

        store.remove_translated_description("/skills/a").unwrap();
        store.clear_category("/skills/a").unwrap();

        let reopened = OverlayStore::open(temp.path());
        assert!(reopened.translated_description("/skills/a").is_none());
        assert!(reopened.category("/skills/a").is_none());
    }

    #[test]
    fn test_update_categories_batch() {
        let temp = TempDir::new().unwrap();
        let mut store = OverlayStore::open(temp.path());
        store.update_categories(["/a", "/b", "/c"], Some(Category::Project)).unwrap();
        store.update_categories(["/b"], None).unwrap();

        let reopened = OverlayStore::open(temp.path());
        assert_eq!(reopened.category("/a"), Some(Category::Project));
        assert_eq!(reopened.category("/b"), None);
        assert_eq!(reopened.category("/c"), Some(Category::Project));
    }

    #[test]
    fn test_apply_merges_overlays() {
        let temp = TempDir::new().unwrap();
        let mut store = OverlayStore::open(temp.path());
        store.set_enabled("/skills/pdf", true).unwrap();
        store.set_translated_description("/skills/pdf", "PDF").unwrap();
        store.set_category("/skills/pdf", Category::Builtin).unwrap();

        let mut skill = Skill::new("pdf", "/skills/pdf", "Work with PDFs", Category::Personal);
        store.apply(&mut skill);
        assert!(skill.enabled);
        assert_eq!(skill.translated_description.as_deref(), Some("PDF"));
        assert_eq!(skill.category, Category::Builtin);

        let mut other = Skill::new("other", "/skills/other", "", Category::Project);
        store.apply(&mut other);
        assert!(!other.enabled);
        assert!(other.translated_description.is_none());
        assert_eq!(other.category, Category::Project);
    }

    #[test]
    fn test_save_failure_is_reported() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("blocker");
        fs::write(&blocker, "file in the way").unwrap();

        let mut store = OverlayStore::open(blocker.join("storage"));
        assert!(store.set_enabled("/skills/a", true).is_err());
    }
}
