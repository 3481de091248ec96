use std::fs;
use std::path::Path;

use skillshelf_core::{Layout, SkillsSettings};
use skillshelf_skills::{
    Category, CategoryChoice, SkillCatalog, complete_mentions, find_skill, group_by_category, mention_query,
    new_folders, write_workspace_file,
};
use tempfile::TempDir;

fn write_skill(dir: &Path, body: &str) {
    fs::create_dir_all(dir).unwrap();
    fs::write(dir.join("SKILL.md"), body).unwrap();
}

/// A home directory with both default roots and a project holding its own skills.
fn populate(home: &Path) -> std::path::PathBuf {
    let cursor = home.join(".cursor");
    write_skill(
        &cursor.join("skills").join("pdf-tools"),
        "---\nname: pdf-tools\ndescription: Extract text from PDFs\n---\n# PDF\n",
    );
    write_skill(&cursor.join("skills").join("unnamed"), "---\ndescription: Has no name\n---\n");
    write_skill(&cursor.join("skills").join("broken"), "# no metadata block\n");
    write_skill(
        &cursor.join("skills-cursor").join("create-rule"),
        "\u{feff}---\r\nname: Create Rule\r\ndescription: Author editor rules\r\n---\r\n",
    );

    let project = home.join("projects").join("app");
    write_skill(
        &project.join(".cursor").join("skills").join("deploy"),
        "---\nname: deploy\ndescription: Ship the app\n---\n",
    );
    write_skill(
        &project.join(".cursor").join("skills").join("node_modules").join("vendored"),
        "---\nname: vendored\n---\n",
    );
    project
}

fn open(home: &Path, storage: &Path, project: &Path, settings: SkillsSettings) -> SkillCatalog {
    let layout = Layout::with_home(home).with_storage_dir(storage);
    SkillCatalog::open(settings, layout).with_project_roots([project])
}

#[test]
fn test_catalog_end_to_end() {
    let temp = TempDir::new().unwrap();
    let home = temp.path().join("home");
    let storage = temp.path().join("storage");
    let project = populate(&home);

    let mut catalog = open(&home, &storage, &project, SkillsSettings::default());
    let report = catalog.scan_all();
    assert!(report.warnings.is_empty());

    let listed: Vec<(&str, Category)> = report.skills.iter().map(|s| (s.name.as_str(), s.category)).collect();
    assert_eq!(
        listed,
        vec![
            ("pdf-tools", Category::Personal),
            ("unnamed", Category::Personal),
            ("deploy", Category::Project),
            ("Create Rule", Category::Builtin),
        ]
    );
    assert_eq!(report.skills[1].description, "Has no name");
    assert!(report.skills.iter().all(|s| s.path.is_absolute()));

    let mut skills = report.skills;
    let pdf = find_skill(&skills, "pdf-tools").unwrap();
    catalog.toggle_enabled(&mut skills[pdf]).unwrap();
    catalog.set_translated_description(&mut skills[pdf], "PDF helper").unwrap();

    let rule = find_skill(&skills, "Create Rule").unwrap();
    catalog
        .set_category(std::slice::from_mut(&mut skills[rule]), CategoryChoice::Fixed(Category::Personal))
        .unwrap();

    // A fresh catalog over the same storage sees the same overlays.
    let reopened = open(&home, &storage, &project, SkillsSettings::default());
    let skills = reopened.scan_all().skills;
    let pdf = &skills[find_skill(&skills, "pdf-tools").unwrap()];
    assert!(pdf.enabled);
    assert_eq!(pdf.translated_description.as_deref(), Some("PDF helper"));
    assert_eq!(skills[find_skill(&skills, "Create Rule").unwrap()].category, Category::Personal);
    assert_eq!(reopened.enabled_paths(), vec![pdf.key()]);

    let groups = group_by_category(&skills);
    assert_eq!(groups.iter().map(|(c, _)| *c).collect::<Vec<_>>(), vec![Category::Personal, Category::Project]);

    let query = mention_query("please use @pdf").unwrap();
    let items = complete_mentions(&skills, query);
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].label, "PDF helper (pdf-tools)");
    assert_eq!(items[0].insert_text, "@pdf-tools");
    assert_eq!(items[0].sort_key, "0_pdf-tools");

    let report = reopened.generate_commands(std::slice::from_ref(pdf));
    assert_eq!(report.written, 1);
    let command = fs::read_to_string(home.join(".cursor/commands/skills/pdf-tools.md")).unwrap();
    assert!(command.starts_with("# PDF helper\n\n> pdf-tools\n"));
}

#[test]
fn test_configured_root_recursive_scan() {
    let temp = TempDir::new().unwrap();
    let home = temp.path().join("home");
    let storage = temp.path().join("storage");
    let project = populate(&home);

    let custom = temp.path().join("library");
    write_skill(&custom.join("writing").join("blog").join("post"), "---\nname: post\n---\n");
    write_skill(&custom.join("writing").join("blog").join("post").join("inner"), "---\nname: inner\n---\n");
    write_skill(&custom.join(".claude").join("skills").join("review"), "---\nname: review\n---\n");
    write_skill(&custom.join(".git").join("hooks").join("x"), "---\nname: git-hook\n---\n");

    let settings = SkillsSettings::default().with_skills_path(&custom);
    let catalog = open(&home, &storage, &project, settings);
    let skills = catalog.scan_all().skills;

    let names: Vec<&str> = skills.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["post", "review"]);
    assert!(skills.iter().all(|s| s.category == Category::Personal));

    let folders = catalog.skill_folders().unwrap();
    assert_eq!(folders.len(), 1);
    assert_eq!(folders[0].name, "library");
}

#[test]
fn test_workspace_file_for_default_roots() {
    let temp = TempDir::new().unwrap();
    let home = temp.path().join("home");
    let storage = temp.path().join("storage");
    let project = populate(&home);

    let catalog = open(&home, &storage, &project, SkillsSettings::default());
    let folders = catalog.skill_folders().unwrap();
    let added = new_folders(&folders[..1], folders.clone());
    assert_eq!(added.len(), 1);
    assert_eq!(added[0].name, "skills-cursor");

    let layout = Layout::with_home(&home);
    let path = write_workspace_file(&layout, Path::new("workspaces"), &folders).unwrap().unwrap();
    assert_eq!(path, home.join("workspaces").join("skills.code-workspace"));
    assert!(write_workspace_file(&layout, Path::new("workspaces"), &folders).unwrap().is_none());
}
