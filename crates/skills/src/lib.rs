//! Skill discovery and metadata for skillshelf.
//!
//! Skills are directories holding a `SKILL.md` descriptor. This crate finds
//! them on disk, merges in the user's persisted overrides, and produces the
//! files and projections front ends need: command files, `@` mention
//! completions and workspace definitions.

pub mod catalog;
pub mod commands;
pub mod mention;
pub mod overlay;
mod parser;
pub mod scanner;
mod types;
pub mod watch;
pub mod workspace;

pub use catalog::{
    MAX_TRANSLATED_DESCRIPTION_LEN, ScanReport, ScanWarning, SkillCatalog, find_skill, sort_skills,
    validate_translated_description,
};
pub use commands::{CommandFile, GenerationReport, WriteOutcome};
pub use mention::{MentionItem, complete_mentions, group_by_category, mention_query};
pub use overlay::OverlayStore;
pub use parser::{Descriptor, parse_descriptor, parse_skill};
pub use scanner::ScanTrace;
pub use types::{Category, CategoryChoice, Result, Skill, SkillError, path_key};
pub use watch::{SkillWatcher, WatchTarget};
pub use workspace::{WorkspaceFolder, new_folders, write_workspace_file};
