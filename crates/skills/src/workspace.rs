//! Editor workspace support: which skill folders a workspace should list,
//! and writing a `.code-workspace` file for them.

use crate::types::Result;
use serde::{Deserialize, Serialize};
use skillshelf_core::Layout;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const WORKSPACE_EXTENSION: &str = "code-workspace";

/// A folder entry of an editor workspace.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkspaceFolder {
    pub name: String,
    pub path: PathBuf,
}

impl WorkspaceFolder {
    /// Folder named after the last path component, or `fallback` when there is none.
    pub fn from_path(path: impl Into<PathBuf>, fallback: &str) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| fallback.to_string());
        Self { name, path }
    }
}

#[derive(Serialize)]
struct WorkspaceFile<'a> {
    folders: Vec<FolderEntry<'a>>,
    settings: serde_json::Map<String, serde_json::Value>,
}

#[derive(Serialize)]
struct FolderEntry<'a> {
    path: &'a Path,
}

/// Candidates whose path is not registered yet, in candidate order.
pub fn new_folders(existing: &[WorkspaceFolder], candidates: Vec<WorkspaceFolder>) -> Vec<WorkspaceFolder> {
    candidates
        .into_iter()
        .filter(|candidate| !existing.iter().any(|folder| folder.path == candidate.path))
        .collect()
}

/// Write a workspace file listing `folders` into `save_dir`.
///
/// A relative `save_dir` is resolved against the home directory. The file is
/// named after the first folder. Existing files are never overwritten; in
/// that case, or when `folders` is empty, `Ok(None)` is returned.
pub fn write_workspace_file(layout: &Layout, save_dir: &Path, folders: &[WorkspaceFolder]) -> Result<Option<PathBuf>> {
    let Some(first) = folders.first() else {
        return Ok(None);
    };

    let target_dir = layout.resolve_from_home(save_dir);
    fs::create_dir_all(&target_dir)?;

    let base_name = first.path.file_name().map(|n| n.to_string_lossy().into_owned());
    let base_name = base_name.filter(|n| !n.is_empty()).unwrap_or_else(|| "skills".to_string());
    let path = target_dir.join(format!("{base_name}.{WORKSPACE_EXTENSION}"));

    if path.exists() {
        debug!(path = %path.display(), "workspace file exists, not overwriting");
        return Ok(None);
    }

    let file = WorkspaceFile {
        folders: folders.iter().map(|f| FolderEntry { path: &f.path }).collect(),
        settings: serde_json::Map::new(),
    };
    fs::write(&path, serde_json::to_string_pretty(&file)?)?;
    info!(path = %path.display(), folders = folders.len(), "wrote workspace file");

    Ok(Some(path))
}
