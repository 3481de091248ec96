//! Read-only projections of a catalog listing: `@` mention completion,
//! display strings and category groups.

use crate::types::{Category, Skill};
use regex::Regex;
use std::sync::LazyLock;

static MENTION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"@(\S*)$").expect("mention pattern is valid"));

/// Default width for [`short_description`] in listings
pub const SHORT_DESCRIPTION_LEN: usize = 50;

/// One completion candidate for an `@` mention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MentionItem {
    pub label: String,
    pub detail: String,
    pub documentation: String,
    pub insert_text: String,
    /// Enabled skills sort first
    pub sort_key: String,
}

/// The partial mention being typed at the end of `line_prefix`, if any.
///
/// ```
/// use skillshelf_skills::mention::mention_query;
///
/// assert_eq!(mention_query("use @pd"), Some("pd"));
/// assert_eq!(mention_query("use @"), Some(""));
/// assert_eq!(mention_query("use @pdf now"), None);
/// ```
pub fn mention_query(line_prefix: &str) -> Option<&str> {
    MENTION.captures(line_prefix).and_then(|caps| caps.get(1)).map(|m| m.as_str())
}

/// Completion items for every skill whose name or translated description
/// contains `query`, case-insensitively. An empty query matches everything.
pub fn complete_mentions(skills: &[Skill], query: &str) -> Vec<MentionItem> {
    let needle = query.to_lowercase();

    let mut items: Vec<MentionItem> = skills
        .iter()
        .filter(|skill| {
            needle.is_empty()
                || skill.name.to_lowercase().contains(&needle)
                || skill
                    .translated_description
                    .as_deref()
                    .is_some_and(|text| text.to_lowercase().contains(&needle))
        })
        .map(mention_item)
        .collect();

    items.sort_by(|a, b| a.sort_key.cmp(&b.sort_key));
    items
}

fn mention_item(skill: &Skill) -> MentionItem {
    let label = match &skill.translated_description {
        Some(text) => format!("{text} ({})", skill.name),
        None => skill.name.clone(),
    };

    let detail = match (&skill.translated_description, skill.description.is_empty()) {
        (Some(text), _) => text.clone(),
        (None, false) => skill.description.clone(),
        (None, true) => skill.name.clone(),
    };

    let description = if skill.description.is_empty() { "No description" } else { skill.description.as_str() };
    let documentation = format!(
        "**{}**\n\n{}\n\nCategory: {}\nStatus: {}",
        skill.name,
        description,
        skill.category.label(),
        if skill.enabled { "enabled" } else { "disabled" }
    );

    let rank = if skill.enabled { 0 } else { 1 };

    MentionItem {
        label,
        detail,
        documentation,
        insert_text: format!("@{}", skill.name),
        sort_key: format!("{rank}_{}", skill.name),
    }
}

/// Title shown for a skill: translated description, falling back to the name.
pub fn display_title(skill: &Skill) -> &str {
    skill.translated_description.as_deref().unwrap_or(&skill.name)
}

/// The effective description cut to `max_chars` characters, with `...`
/// appended when something was cut.
pub fn short_description(skill: &Skill, max_chars: usize) -> String {
    let text = skill.effective_description();
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Skills grouped by category in rank order; empty groups are left out.
/// Order within a group follows the input.
pub fn group_by_category(skills: &[Skill]) -> Vec<(Category, Vec<&Skill>)> {
    Category::VALUES
        .iter()
        .map(|category| (*category, skills.iter().filter(|s| s.category == *category).collect::<Vec<_>>()))
        .filter(|(_, group)| !group.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skill(name: &str, category: Category, enabled: bool) -> Skill {
        let mut skill = Skill::new(name, format!("/skills/{name}"), format!("{name} description"), category);
        skill.enabled = enabled;
        skill
    }

    #[test]
    fn test_mention_query() {
        assert_eq!(mention_query("@"), Some(""));
        assert_eq!(mention_query("try @pdf-to"), Some("pdf-to"));
        assert_eq!(mention_query("a@b@c"), Some("b@c"));
        assert_eq!(mention_query("no mention"), None);
        assert_eq!(mention_query("@done "), None);
        assert_eq!(mention_query(""), None);
    }

    #[test]
    fn test_complete_filters_case_insensitively() {
        let mut translated = skill("data", Category::Personal, false);
        translated.translated_description = Some("Spreadsheet Helper".to_string());
        let skills = vec![skill("PDF-Tools", Category::Personal, false), translated, skill("git", Category::Project, false)];

        let items = complete_mentions(&skills, "pdf");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].insert_text, "@PDF-Tools");

        let items = complete_mentions(&skills, "SPREAD");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].label, "Spreadsheet Helper (data)");
        assert_eq!(items[0].detail, "Spreadsheet Helper");

        assert_eq!(complete_mentions(&skills, "").len(), 3);
        assert!(complete_mentions(&skills, "zzz").is_empty());
    }

    #[test]
    fn test_complete_description_is_not_searched() {
        let skills = vec![skill("pdf", Category::Personal, false)];
        assert!(complete_mentions(&skills, "description").is_empty());
    }

    #[test]
    fn test_enabled_sort_first() {
        let skills = vec![
            skill("alpha", Category::Personal, false),
            skill("beta", Category::Personal, true),
            skill("gamma", Category::Builtin, true),
        ];

        let items = complete_mentions(&skills, "");
        let keys: Vec<&str> = items.iter().map(|i| i.sort_key.as_str()).collect();
        assert_eq!(keys, vec!["0_beta", "0_gamma", "1_alpha"]);
        assert!(items[0].documentation.contains("Status: enabled"));
        assert!(items[2].documentation.contains("Status: disabled"));
    }

    #[test]
    fn test_detail_falls_back_to_name() {
        let skills = vec![Skill::new("bare", "/skills/bare", "", Category::Personal)];
        let items = complete_mentions(&skills, "bare");
        assert_eq!(items[0].detail, "bare");
        assert!(items[0].documentation.contains("No description"));
    }

    #[test]
    fn test_display_title_and_short_description() {
        let mut s = Skill::new("pdf", "/skills/pdf", "x".repeat(60), Category::Personal);
        assert_eq!(display_title(&s), "pdf");
        assert_eq!(short_description(&s, SHORT_DESCRIPTION_LEN), format!("{}...", "x".repeat(50)));

        s.translated_description = Some("短描述".to_string());
        assert_eq!(display_title(&s), "短描述");
        assert_eq!(short_description(&s, 2), "短描...");
        assert_eq!(short_description(&s, 3), "短描述");
    }

    #[test]
    fn test_group_by_category() {
        let skills = vec![
            skill("a", Category::Builtin, false),
            skill("b", Category::Personal, false),
            skill("c", Category::Builtin, false),
        ];

        let groups = group_by_category(&skills);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, Category::Personal);
        assert_eq!(groups[1].0, Category::Builtin);
        let names: Vec<&str> = groups[1].1.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["a", "c"]);
    }
}
