use std::path::{Path, PathBuf};
use std::str::FromStr;

use clap::{Args, Parser, Subcommand};
use console::style;
use miette::{miette, IntoDiagnostic, Result};

use gm_statblocks::config::AppConfig;
use gm_statblocks::core::logging;
use gm_statblocks::database::{
    Database, SortField, SortOrder, StatblockFilter, StatblockOps, UpsertAction,
};
use gm_statblocks::import::{self, srd, ImportFile, ImportReport};
use gm_statblocks::statblock::{
    format_modifier, split, Ability, CanonicalStatblock, ChallengeRating, Feature, Segment,
};

#[derive(Debug, Parser)]
#[command(name = "gm-statblocks")]
#[command(version, about = "Import, render and browse D&D 5e statblocks")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Import `.monster` files and statblock JSON into the library
    Import {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Import from the bundled 5e SRD monsters; lists them when given no name
    Srd {
        /// Monster name, matched ignoring case
        #[arg(conflicts_with = "all")]
        name: Vec<String>,
        /// Import every bundled monster
        #[arg(long)]
        all: bool,
    },
    /// List library statblocks
    List(ListArgs),
    /// Print one library statblock
    Show {
        #[arg(required = true)]
        name: Vec<String>,
    },
    /// Print a monster file without importing it
    Render { file: PathBuf },
    /// Remove a statblock from the library
    Delete {
        #[arg(required = true)]
        name: Vec<String>,
    },
}

#[derive(Debug, Args)]
struct ListArgs {
    /// Substring matched against name, type and tags
    query: Vec<String>,
    /// Only statblocks of this creature type
    #[arg(long = "type")]
    creature_type: Option<String>,
    /// Only statblocks of this challenge rating (`2`, `1/4`)
    #[arg(long, value_parser = ChallengeRating::from_str)]
    cr: Option<ChallengeRating>,
    #[arg(long, value_enum, ignore_case = true, default_value_t = SortField::Name)]
    sort: SortField,
    /// Sort in descending order
    #[arg(long)]
    desc: bool,
}

impl From<ListArgs> for StatblockFilter {
    fn from(args: ListArgs) -> Self {
        Self {
            query: (!args.query.is_empty()).then(|| args.query.join(" ")),
            creature_type: args.creature_type,
            challenge_rating: args.cr.map(ChallengeRating::value),
            sort_by: args.sort,
            order: if args.desc {
                SortOrder::Desc
            } else {
                SortOrder::Asc
            },
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load();
    let _log_guard = logging::init(&config.logging, &config.log_dir());
    log::info!("gm-statblocks v{} starting", gm_statblocks::VERSION);

    match cli.command {
        Command::Render { file } => render(&file, &config).await,
        Command::Srd { name, all: false } if name.is_empty() => {
            print_srd_catalog();
            Ok(())
        }
        command => {
            let db = Database::new(&config.data_dir()).await.into_diagnostic()?;
            let result = run(command, &db, &config).await;
            db.close().await;
            result
        }
    }
}

async fn run(command: Command, db: &Database, config: &AppConfig) -> Result<()> {
    match command {
        Command::Import { files: paths } => {
            let mut files = Vec::with_capacity(paths.len());
            for path in &paths {
                let file = ImportFile::read(path)
                    .await
                    .map_err(|e| miette!("Failed to read {}: {}", path.display(), e))?;
                files.push(file);
            }
            let report = import::import_files(&files, &config.import, db).await;
            print_report(&report);
            Ok(())
        }
        Command::Srd { all: true, .. } => {
            let report = srd::import_all(db).await;
            print_report(&report);
            Ok(())
        }
        Command::Srd { name, .. } => {
            let name = name.join(" ");
            let outcome = srd::import_one(&name, db)
                .await
                .into_diagnostic()?
                .ok_or_else(|| {
                    miette!(
                        help = "Run `gm-statblocks srd` to see the bundled monsters",
                        "No SRD monster named \"{}\"",
                        name
                    )
                })?;
            println!("{:>8} {}", action_label(outcome.action), outcome.record.name);
            Ok(())
        }
        Command::List(args) => {
            let filter = StatblockFilter::from(args);
            let records = db.list_statblocks(&filter).await.into_diagnostic()?;
            if records.is_empty() {
                println!("{}", style("No statblocks found").dim());
            }
            for record in &records {
                let cr = record
                    .statblock()
                    .map(|s| s.challenge_rating.to_string())
                    .unwrap_or_else(|_| record.challenge_rating.to_string());
                let custom = record
                    .custom_type
                    .as_deref()
                    .map(|t| format!(" [{}]", t))
                    .unwrap_or_default();
                println!(
                    "{:<32} {:<14} CR {:<5} {}{}",
                    style(&record.name).bold(),
                    record.creature_type,
                    cr,
                    style(&record.source).dim(),
                    custom
                );
            }
            Ok(())
        }
        Command::Show { name } => {
            let name = name.join(" ");
            let record = db
                .find_statblock_by_name(&name)
                .await
                .into_diagnostic()?
                .ok_or_else(|| miette!("No statblock named \"{}\"", name))?;
            let statblock = record.statblock().into_diagnostic()?;
            print_statblock(&statblock);
            Ok(())
        }
        Command::Delete { name } => {
            let name = name.join(" ");
            let record = db
                .find_statblock_by_name(&name)
                .await
                .into_diagnostic()?
                .ok_or_else(|| miette!("No statblock named \"{}\"", name))?;
            db.delete_statblock(&record.id).await.into_diagnostic()?;
            println!("{} {}", style("Deleted").red(), record.name);
            Ok(())
        }
        Command::Render { .. } => Ok(()),
    }
}

/// Print a monster file without importing it. Errors are shown as diagnostics.
async fn render(path: &Path, config: &AppConfig) -> Result<()> {
    let file = ImportFile::read(path)
        .await
        .map_err(|e| miette!("Failed to read {}: {}", path.display(), e))?;
    let format = import::validate_file(&file, &config.import)?;

    for record in import::parse_file(&file, format)? {
        let preview = record?;
        print_statblock(&preview.record);
        if !preview.valid {
            println!(
                "{} missing {}",
                style("warning:").yellow().bold(),
                preview.missing_fields.join(", ")
            );
        }
        println!();
    }
    Ok(())
}

// ============================================================================
// Output
// ============================================================================

fn action_label(action: UpsertAction) -> console::StyledObject<&'static str> {
    match action {
        UpsertAction::Created => style("created").green(),
        UpsertAction::Updated => style("updated").cyan(),
    }
}

fn print_srd_catalog() {
    for name in srd::available_monsters() {
        println!("{}", name);
    }
    println!(
        "\n{} SRD monsters; import with `gm-statblocks srd <name>` or `--all`",
        srd::monster_count()
    );
}

fn print_report(report: &ImportReport) {
    for record in &report.imported {
        println!("{:>8} {} ({})", action_label(record.action), record.name, record.file);
    }
    for record in &report.skipped {
        println!(
            "{:>8} {} ({} #{}): {}",
            style("skipped").yellow(),
            record.name,
            record.file,
            record.index,
            record.reason
        );
    }
    for failure in &report.errors {
        println!("{:>8} {}", style("error").red().bold(), failure.error);
    }

    println!(
        "\n{} created, {} updated, {} skipped, {} failed",
        report.created_count(),
        report.updated_count(),
        report.skipped.len(),
        report.errors.len()
    );
}

fn print_statblock(statblock: &CanonicalStatblock) {
    println!("{}", style(&statblock.name).bold().underlined());
    println!(
        "{}",
        style(format!(
            "{} {}, {}",
            statblock.size, statblock.creature_type, statblock.alignment
        ))
        .italic()
    );

    let ac_notes = if statblock.ac_notes.is_empty() {
        String::new()
    } else {
        format!(" ({})", statblock.ac_notes)
    };
    println!("{} {}{}", style("Armor Class").bold(), statblock.ac, ac_notes);
    println!("{} {} {}", style("Hit Points").bold(), statblock.hp, statblock.hp_formula);
    if !statblock.speed_notes.is_empty() {
        println!("{} {}", style("Speed").bold(), statblock.speed_notes);
    }

    let scores: Vec<String> = Ability::ALL
        .iter()
        .map(|ability| {
            format!(
                "{} {} ({})",
                ability.abbreviated_name().to_uppercase(),
                statblock.scores.get(*ability),
                format_modifier(statblock.scores.modifier(*ability))
            )
        })
        .collect();
    println!("{}", scores.join("  "));

    if !statblock.saving_throws.is_empty() {
        let saves: Vec<String> = statblock
            .saving_throws
            .iter()
            .map(|save| format!("{} {}", save.ability.long_name(), format_modifier(save.modifier)))
            .collect();
        println!("{} {}", style("Saving Throws").bold(), saves.join(", "));
    }
    if !statblock.skills.is_empty() {
        let skills: Vec<String> = statblock
            .skills
            .iter()
            .map(|skill| format!("{} {}", skill.skill, format_modifier(skill.modifier)))
            .collect();
        println!("{} {}", style("Skills").bold(), skills.join(", "));
    }
    print_list("Damage Vulnerabilities", &statblock.damage_vulnerabilities);
    print_list("Damage Resistances", &statblock.damage_resistances);
    print_list("Damage Immunities", &statblock.damage_immunities);
    print_list("Condition Immunities", &statblock.condition_immunities);

    let mut senses = Vec::new();
    for (label, range) in [
        ("blindsight", statblock.senses.blindsight),
        ("darkvision", statblock.senses.darkvision),
        ("tremorsense", statblock.senses.tremorsense),
        ("truesight", statblock.senses.truesight),
    ] {
        if let Some(range) = range {
            senses.push(format!("{} {} ft.", label, range));
        }
    }
    senses.push(format!("passive Perception {}", statblock.passive_perception));
    println!("{} {}", style("Senses").bold(), senses.join(", "));
    print_list("Languages", &statblock.languages);
    println!(
        "{} {} ({} XP)  {} {}",
        style("Challenge").bold(),
        statblock.challenge_rating,
        statblock.xp,
        style("Proficiency Bonus").bold(),
        format_modifier(statblock.prof_bonus)
    );

    print_features(None, &statblock.abilities);
    print_features(Some("Actions"), &statblock.actions);
    print_features(Some("Reactions"), &statblock.reactions);
    if let Some(legendary) = &statblock.legendary_actions {
        print_heading("Legendary Actions");
        print_rich(&legendary.description);
        print_features(None, &legendary.actions);
    }
    if let Some(mythic) = &statblock.mythic_trait {
        print_heading("Mythic Actions");
        print_rich(&mythic.description);
        print_features(None, &statblock.mythic_actions);
    }
    if let Some(lair) = &statblock.lair_actions {
        print_heading("Lair Actions");
        print_rich(&lair.description);
        print_rich(&lair.end_description);
    }
    if let Some(regional) = &statblock.regional_effects {
        print_heading("Regional Effects");
        print_rich(&regional.description);
        print_rich(&regional.end_description);
    }
}

fn print_list(label: &str, values: &[String]) {
    if !values.is_empty() {
        println!("{} {}", style(label).bold(), values.join(", "));
    }
}

fn print_heading(heading: &str) {
    println!("\n{}", style(heading).bold().underlined());
}

fn print_features(heading: Option<&str>, features: &[Feature]) {
    if features.is_empty() {
        return;
    }
    match heading {
        Some(heading) => print_heading(heading),
        None => println!(),
    }
    for feature in features {
        let name = style(format!("{}.", feature.name)).bold().italic();
        println!("{} {}", name, rich(&feature.description));
    }
}

fn print_rich(text: &str) {
    if !text.is_empty() {
        println!("{}", rich(text));
    }
}

/// Render `_emphasis_` segments in italics.
fn rich(text: &str) -> String {
    split(text)
        .into_iter()
        .map(|segment| match segment {
            Segment::Plain(text) => text,
            Segment::Emphasis(text) => style(text).italic().to_string(),
        })
        .collect()
}
