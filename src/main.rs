use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use legal_study::export::{export_json_to_path, import_json};
use legal_study::models::{format_interval, preview_intervals, summarize};
use legal_study::review::{
    add_to_study_list, due_items, import_items, remove_from_study_list, submit_review,
};
use legal_study::{ContentType, ReviewSession, SqliteStudyStore, StudyConfig, StudyItem, StudyStore};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "legal-study", about = "Spaced repetition study list", version)]
struct Cli {
    /// SQLite database file (overrides LEGAL_STUDY_DB)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Learner id (overrides LEGAL_STUDY_OWNER)
    #[arg(long, global = true)]
    owner: Option<String>,

    /// Output format
    #[arg(long, global = true, default_value = "plain")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, clap::ValueEnum)]
enum OutputFormat {
    Plain,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Add content to the study list
    Add {
        /// flashcard, book_section or legal_article
        #[arg(value_parser = parse_content_type)]
        content_type: ContentType,
        content_id: String,
    },

    /// List items due now
    Due {
        #[arg(long = "type", value_parser = parse_content_type)]
        content_type: Option<ContentType>,
    },

    /// Record one review of an item
    Review { item_id: Uuid, level: u8 },

    /// Show the interval each knowledge level would give an item
    Preview { item_id: Uuid },

    /// Review all due items interactively, repeating failed ones
    Study {
        #[arg(long = "type", value_parser = parse_content_type)]
        content_type: Option<ContentType>,
    },

    /// Remove an item from the study list
    Remove { item_id: Uuid },

    /// Show study list counts
    Stats,

    /// Write the study list to a JSON file
    Export { path: PathBuf },

    /// Add the items of a JSON file to the study list
    Import { path: PathBuf },
}

fn parse_content_type(raw: &str) -> Result<ContentType, String> {
    raw.parse().map_err(|e: legal_study::StudyError| e.to_string())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let mut config = StudyConfig::load().context("loading configuration")?;
    if let Some(db) = cli.db {
        config.database_path = db;
    }
    if let Some(owner) = cli.owner {
        config.owner_id = owner;
    }

    let store = SqliteStudyStore::open(&config.database_path)
        .with_context(|| format!("opening {}", config.database_path.display()))?;
    let owner = config.owner_id.as_str();
    let now = Utc::now();

    match cli.command {
        Command::Add {
            content_type,
            content_id,
        } => {
            let item = add_to_study_list(&store, owner, &content_id, content_type, now)?;
            print_items(&[item], &cli.format)?;
        }
        Command::Due { content_type } => {
            let due = due_items(&store, owner, content_type, now)?;
            print_items(&due, &cli.format)?;
        }
        Command::Review { item_id, level } => {
            let update = submit_review(&store, &config.policy, owner, item_id, level, now)?;
            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&update)?),
                OutputFormat::Plain => println!(
                    "next review in {} (streak {})",
                    format_interval(update.interval_days),
                    update.consecutive_correct
                ),
            }
        }
        Command::Preview { item_id } => {
            let item = store
                .get_item(owner, item_id)?
                .ok_or(legal_study::StudyError::NotFound { id: item_id })?;
            for (level, days) in preview_intervals(&config.policy, &item)? {
                println!("{level}: {}", format_interval(days));
            }
        }
        Command::Study { content_type } => {
            let session = ReviewSession::from_due(&store, owner, content_type, now)?;
            run_study(session, &store, &config)?;
        }
        Command::Remove { item_id } => {
            remove_from_study_list(&store, owner, item_id)?;
            println!("removed {item_id}");
        }
        Command::Stats => {
            let stats = summarize(&store.list_items(owner, None)?, now);
            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
                OutputFormat::Plain => {
                    println!("total: {}", stats.total_items);
                    println!("due: {}", stats.due_items);
                    println!("never reviewed: {}", stats.never_reviewed);
                    for (content_type, count) in &stats.by_content_type {
                        println!("  {content_type}: {count}");
                    }
                }
            }
        }
        Command::Export { path } => {
            export_json_to_path(&store.list_items(owner, None)?, &path)?;
        }
        Command::Import { path } => {
            let added = import_items(&store, owner, import_json(&path)?)?;
            println!("imported {added} items");
        }
    }

    Ok(())
}

fn print_items(items: &[StudyItem], format: &OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(items)?),
        OutputFormat::Plain => {
            for item in items {
                println!(
                    "{}  {:<13} {:<20} every {:<4} due {}",
                    item.id,
                    item.content_type.as_str(),
                    item.content_id,
                    format_interval(item.interval_days),
                    item.next_review_date.format("%Y-%m-%d %H:%M")
                );
            }
        }
    }
    Ok(())
}

fn run_study(
    mut session: ReviewSession,
    store: &SqliteStudyStore,
    config: &StudyConfig,
) -> anyhow::Result<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    while !session.is_completed() {
        let Some(item) = session.current_item() else {
            break;
        };
        println!("{}", session.phase_message());
        print!(
            "{} {}  level 0-{} (q to stop): ",
            item.content_type,
            item.content_id,
            config.policy.max_level
        );
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let answer = line.trim();
        if answer == "q" {
            break;
        }

        let level = match answer.parse::<u8>() {
            Ok(level) => level,
            Err(_) => {
                println!("not a level: {answer}");
                continue;
            }
        };
        match session.grade_current(store, &config.policy, level, Utc::now()) {
            Ok(update) => {
                println!("  next review in {}", format_interval(update.interval_days));
                session.next_item();
            }
            Err(legal_study::StudyError::InvalidArgument(message)) => println!("  {message}"),
            Err(e) => return Err(e.into()),
        }
    }

    println!(
        "{} of {} passed",
        session.learned_count(),
        session.total_count()
    );
    Ok(())
}
