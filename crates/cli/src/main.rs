use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use owo_colors::OwoColorize;
use skillshelf_core::logging::LoggingConfig;
use skillshelf_core::{Config, Layout, init_logging, sanitize_path};
use skillshelf_skills::mention::{SHORT_DESCRIPTION_LEN, display_title, short_description};
use skillshelf_skills::{
    CategoryChoice, ScanReport, Skill, SkillCatalog, SkillWatcher, complete_mentions, find_skill, group_by_category,
    mention_query, validate_translated_description,
};
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;

/// skillshelf - discover and manage local agent skills
#[derive(Parser, Debug)]
#[command(name = "skillshelf")]
#[command(about = "Discover, annotate and publish SKILL.md skills", long_about = None)]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to config.toml (default: ~/.skillshelf/config.toml)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Open project whose .cursor/skills folder is scanned (default: current directory)
    #[arg(short, long = "project", value_name = "DIR")]
    projects: Vec<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List all discovered skills
    List {
        /// Group the listing by category
        #[arg(short, long)]
        group: bool,

        /// Print the listing as JSON
        #[arg(long, conflicts_with = "group")]
        json: bool,
    },
    /// Enable a disabled skill or disable an enabled one
    Toggle {
        /// Skill name or path
        #[arg(value_name = "SKILL")]
        skill: String,
    },
    /// Set the translated description of a skill (omit TEXT to clear it)
    Describe {
        /// Skill name or path
        #[arg(value_name = "SKILL")]
        skill: String,

        /// Description shown in place of the original (at most 200 characters)
        #[arg(value_name = "TEXT")]
        text: Option<String>,
    },
    /// Change the category of one or more skills
    Category {
        /// default, personal, project or builtin
        #[arg(value_name = "CATEGORY")]
        choice: CategoryChoice,

        /// Skill names or paths
        #[arg(required = true, value_name = "SKILL")]
        skills: Vec<String>,
    },
    /// Generate /commands files for skills, replacing existing ones
    Generate {
        /// Skill names or paths
        #[arg(value_name = "SKILL", required_unless_present = "enabled")]
        skills: Vec<String>,

        /// Generate for every enabled skill
        #[arg(long, conflicts_with = "skills")]
        enabled: bool,
    },
    /// Scan an arbitrary folder recursively, ignoring all overrides
    TestScan {
        /// Folder to scan
        #[arg(value_name = "PATH")]
        path: PathBuf,

        /// Print every scan decision
        #[arg(short, long)]
        log: bool,
    },
    /// Complete an @ mention at the end of PREFIX
    Complete {
        /// Text before the cursor, e.g. "use @pd"
        #[arg(value_name = "PREFIX")]
        prefix: String,
    },
    /// Show the skill folders a workspace should contain
    Workspace {
        /// Write a .code-workspace file into the configured save folder
        #[arg(short, long)]
        save: bool,
    },
    /// Rescan and print the listing whenever a skill root changes
    Watch,
    /// Write an example config file
    Init {
        /// Replace an existing config file
        #[arg(short, long)]
        force: bool,
    },
    /// Print shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let config_path = match cli.config {
        Some(path) => path,
        None => Config::default_path().context("Failed to locate the config file")?,
    };

    match cli.command {
        Commands::Init { force } => return cmd_init(&config_path, force),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "skillshelf", &mut io::stdout());
            return Ok(());
        }
        _ => {}
    }

    let config = load_config(&config_path)?;

    let mut logging = LoggingConfig::from(config.logging.clone());
    if cli.verbose {
        logging = logging.with_level("debug");
    }
    let _guard = init_logging(Some(logging)).context("Failed to initialize logging")?;

    if cli.verbose {
        println!("{} Using config: {}", "Info:".blue().bold(), sanitize_path(&config_path));
    }

    let layout = Layout::from_env().context("Failed to resolve the home directory")?;
    let projects = if cli.projects.is_empty() {
        vec![std::env::current_dir().context("Failed to read the current directory")?]
    } else {
        cli.projects
    };
    let mut catalog = SkillCatalog::open(config.skills, layout).with_project_roots(projects);

    match cli.command {
        Commands::List { group, json } => cmd_list(&catalog, group, json, cli.verbose)?,
        Commands::Toggle { skill } => cmd_toggle(&mut catalog, &skill)?,
        Commands::Describe { skill, text } => cmd_describe(&mut catalog, &skill, text.as_deref())?,
        Commands::Category { choice, skills } => cmd_category(&mut catalog, choice, &skills)?,
        Commands::Generate { skills, enabled } => cmd_generate(&catalog, &skills, enabled)?,
        Commands::TestScan { path, log } => cmd_test_scan(&catalog, &path, log)?,
        Commands::Complete { prefix } => cmd_complete(&catalog, &prefix)?,
        Commands::Workspace { save } => cmd_workspace(&catalog, save)?,
        Commands::Watch => cmd_watch(&catalog, cli.verbose)?,
        Commands::Init { .. } | Commands::Completions { .. } => unreachable!("handled before loading config"),
    }

    Ok(())
}

/// Load config from file, falling back to defaults when it does not exist
fn load_config(path: &Path) -> Result<Config> {
    Config::load_or_default(path).with_context(|| format!("Failed to load config from {}", path.display()))
}

/// Write the example config
fn cmd_init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!("Config already exists at {} (use --force to replace it)", path.display());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create config directory")?;
    }
    std::fs::write(path, Config::example()).context("Failed to write config")?;

    println!("{} Created config at {}", "Success:".green().bold(), path.display());
    Ok(())
}

/// Scan and report warnings; the skills are returned sorted.
fn scan(catalog: &SkillCatalog) -> Vec<Skill> {
    let ScanReport { skills, warnings } = catalog.scan_all();
    for warning in &warnings {
        eprintln!("{} {}", "Warning:".yellow().bold(), warning);
    }
    skills
}

fn resolve(skills: &[Skill], query: &str) -> Result<usize> {
    find_skill(skills, query).with_context(|| format!("Cannot select skill '{}'", query))
}

fn print_skill(skill: &Skill, verbose: bool) {
    let mark = if skill.enabled { "[x]".green().to_string() } else { "[ ]".dimmed().to_string() };
    let title = display_title(skill);
    let title = if skill.enabled { title.bold().to_string() } else { title.to_string() };

    print!("{} {}", mark, title);
    if skill.translated_description.is_some() {
        print!(" {}", format!("({})", skill.name).dimmed());
    }
    println!(" {}", format!("[{}]", skill.category.label()).cyan());

    let description = short_description(skill, SHORT_DESCRIPTION_LEN);
    if !description.is_empty() {
        println!("    {}", description);
    }
    if verbose {
        println!("    {}", sanitize_path(&skill.path).dimmed());
    }
}

/// List all discovered skills
fn cmd_list(catalog: &SkillCatalog, group: bool, json: bool, verbose: bool) -> Result<()> {
    maybe_save_workspace(catalog);
    print_listing(catalog, group, json, verbose)
}

fn print_listing(catalog: &SkillCatalog, group: bool, json: bool, verbose: bool) -> Result<()> {
    let skills = scan(catalog);

    if json {
        println!("{}", serde_json::to_string_pretty(&skills).context("Failed to serialize skills")?);
        return Ok(());
    }

    if skills.is_empty() {
        println!("{} No skills found", "Info:".yellow().bold());
        return Ok(());
    }

    if group {
        for (category, members) in group_by_category(&skills) {
            println!("{} ({})", category.label().green().bold().underline(), members.len());
            for skill in members {
                print_skill(skill, verbose);
            }
            println!();
        }
    } else {
        for skill in &skills {
            print_skill(skill, verbose);
        }
    }

    let enabled = skills.iter().filter(|s| s.enabled).count();
    println!(
        "{} {} skill(s), {} enabled",
        "Info:".blue().bold(),
        skills.len().to_string().cyan(),
        enabled.to_string().cyan()
    );
    Ok(())
}

/// Flip a skill's enabled state
fn cmd_toggle(catalog: &mut SkillCatalog, query: &str) -> Result<()> {
    let mut skills = scan(catalog);
    let index = resolve(&skills, query)?;
    let skill = &mut skills[index];

    let enabled = catalog.toggle_enabled(skill).context("Failed to save enabled skills")?;
    let state = if enabled { "Enabled".green().bold().to_string() } else { "Disabled".yellow().bold().to_string() };
    println!("{} {}", state, skill.name.cyan());
    Ok(())
}

/// Set or clear a translated description
fn cmd_describe(catalog: &mut SkillCatalog, query: &str, text: Option<&str>) -> Result<()> {
    let text = text.unwrap_or("");
    validate_translated_description(text)?;

    let mut skills = scan(catalog);
    let index = resolve(&skills, query)?;
    let skill = &mut skills[index];

    catalog
        .set_translated_description(skill, text)
        .context("Failed to save translated description")?;

    match &skill.translated_description {
        Some(translated) => {
            println!("{} {} is now shown as {}", "Success:".green().bold(), skill.name.cyan(), translated.bold())
        }
        None => println!("{} Cleared translated description of {}", "Success:".green().bold(), skill.name.cyan()),
    }
    Ok(())
}

/// Change the category of several skills at once
fn cmd_category(catalog: &mut SkillCatalog, choice: CategoryChoice, queries: &[String]) -> Result<()> {
    let skills = scan(catalog);

    let mut indices = queries
        .iter()
        .map(|query| resolve(&skills, query))
        .collect::<Result<Vec<_>>>()?;
    indices.sort_unstable();
    indices.dedup();

    let mut selected: Vec<Skill> = indices.into_iter().map(|i| skills[i].clone()).collect();
    catalog
        .set_category(&mut selected, choice)
        .context("Failed to save skill categories")?;

    for skill in &selected {
        println!("{} {} -> {}", "Success:".green().bold(), skill.name.cyan(), skill.category.label());
    }
    Ok(())
}

/// Generate /commands files
fn cmd_generate(catalog: &SkillCatalog, queries: &[String], enabled: bool) -> Result<()> {
    let skills = scan(catalog);

    let targets: Vec<Skill> = if enabled {
        skills.iter().filter(|s| s.enabled).cloned().collect()
    } else {
        queries
            .iter()
            .map(|query| resolve(&skills, query).map(|i| skills[i].clone()))
            .collect::<Result<Vec<_>>>()?
    };

    if targets.is_empty() {
        println!("{} Nothing to generate", "Info:".yellow().bold());
        return Ok(());
    }

    let report = catalog.generate_commands(&targets);
    if report.written > 0 {
        println!(
            "{} Generated {} command file(s) in {}",
            "Success:".green().bold(),
            report.written.to_string().cyan(),
            sanitize_path(&catalog.layout().manual_commands_dir())
        );
    }

    if !report.is_ok() {
        for error in &report.errors {
            eprintln!("  {}", error.red());
        }
        anyhow::bail!("{} command file(s) could not be written", report.errors.len());
    }
    Ok(())
}

/// Diagnostic scan of an arbitrary folder
fn cmd_test_scan(catalog: &SkillCatalog, path: &Path, log: bool) -> Result<()> {
    let skills = if log {
        let mut print_line = |line: &str| println!("{}", line.dimmed());
        catalog.test_scan_with_trace(path, &mut print_line)?
    } else {
        catalog.test_scan(path)?
    };

    println!("{} Found {} skill(s)", "Info:".blue().bold(), skills.len().to_string().cyan());
    for skill in &skills {
        println!("  {} {}", skill.name.bold(), sanitize_path(&skill.path).dimmed());
    }
    Ok(())
}

/// Print @ mention completions, enabled skills first
fn cmd_complete(catalog: &SkillCatalog, prefix: &str) -> Result<()> {
    let Some(query) = mention_query(prefix) else {
        return Ok(());
    };

    for item in complete_mentions(&scan(catalog), query) {
        println!("{}\t{}\t{}", item.insert_text, item.label, item.detail);
    }
    Ok(())
}

/// Show (and optionally save) the workspace folders
fn cmd_workspace(catalog: &SkillCatalog, save: bool) -> Result<()> {
    let folders = catalog.skill_folders().context("Failed to collect skill folders")?;
    if folders.is_empty() {
        println!("{} No skill folders found", "Info:".yellow().bold());
        return Ok(());
    }

    for folder in &folders {
        println!("  {} {}", folder.name.cyan(), sanitize_path(&folder.path).dimmed());
    }

    if save {
        if catalog.settings().workspace_save_folder().is_none() {
            anyhow::bail!("Set skills.workspace_save_folder in the config to save a workspace file");
        }
        let additions = catalog.workspace_additions().context("Failed to collect skill folders")?;
        if additions.is_empty() {
            println!("{} Every skill folder is already open", "Info:".yellow().bold());
            return Ok(());
        }
        match catalog.save_workspace(&additions).context("Failed to write workspace file")? {
            Some(path) => println!("{} Wrote {}", "Success:".green().bold(), path.display()),
            None => println!("{} Workspace file already exists, left untouched", "Info:".yellow().bold()),
        }
    }
    Ok(())
}

/// Write a workspace file on startup when `auto_add_to_workspace` is set.
fn maybe_save_workspace(catalog: &SkillCatalog) {
    if !catalog.settings().auto_add_to_workspace {
        return;
    }

    let written = catalog.workspace_additions().and_then(|folders| catalog.save_workspace(&folders));
    match written {
        Ok(Some(path)) => println!("{} Wrote workspace file {}", "Info:".blue().bold(), path.display()),
        Ok(None) => {}
        Err(e) => eprintln!("{} Could not write workspace file: {}", "Warning:".yellow().bold(), e),
    }
}

/// Print the listing, then again after every change under the skill roots
fn cmd_watch(catalog: &SkillCatalog, verbose: bool) -> Result<()> {
    maybe_save_workspace(catalog);

    let mut targets = catalog.watch_targets();
    let mut watcher = SkillWatcher::new(&targets).context("Failed to start file watcher")?;

    print_listing(catalog, false, false, verbose)?;
    println!("{} Watching for changes (Ctrl-C to stop)", "Info:".blue().bold());

    while let Some(paths) = watcher.wait() {
        info!(changed = paths.len(), "skill roots changed, rescanning");
        println!();
        println!("{} {} path(s) changed, rescanning", "Info:".blue().bold(), paths.len());
        print_listing(catalog, false, false, verbose)?;

        let current = catalog.watch_targets();
        if current != targets {
            watcher = SkillWatcher::new(&current).context("Failed to restart file watcher")?;
            targets = current;
        }
    }

    Ok(())
}
