use std::io::Read;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use meetminder_lib::config::{load_config, Config};
use meetminder_lib::db::MeetingDb;
use meetminder_lib::error::{ErrorReport, ServiceError};
use meetminder_lib::export::{minutes_markdown, tasks_csv};
use meetminder_lib::intelligence::{OllamaClient, RetryingGenerator};
use meetminder_lib::services::actions::{self, ItemRef, MeetingEdit, NewActionItem};
use meetminder_lib::services::meetings;

/// Export format for a stored meeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ExportFormat {
    Csv,
    Markdown,
}

/// Meeting transcripts in, structured minutes out.
#[derive(Parser)]
#[command(name = "meetminder", version, about = "Turn meeting transcripts into structured minutes")]
struct Cli {
    /// Path to config.json (default: ~/.meetminder/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Path to the SQLite database (overrides the config file)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Print results and errors as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract minutes from a transcript and store them
    Process {
        /// Title to use instead of the model's suggestion
        #[arg(long)]
        title: Option<String>,
        /// Read the transcript from a file instead of stdin
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// List stored meetings, newest first
    History,

    /// Print a stored meeting record
    Show {
        id: i64,
    },

    /// Change the status of one action item
    Status {
        id: i64,
        /// Zero-based position, or the item's id
        item: String,
        /// Backlog, "To Do", "In Progress" or Done
        status: String,
    },

    /// Add an action item by hand
    Add {
        id: i64,
        #[arg(long)]
        task: String,
        #[arg(long)]
        owner: Option<String>,
        /// Due date as YYYY-MM-DD
        #[arg(long)]
        due: Option<String>,
        #[arg(long)]
        priority: Option<String>,
        #[arg(long)]
        status: Option<String>,
    },

    /// Apply a bulk edit from a JSON document
    Edit {
        id: i64,
        /// JSON file with `title` and `action_items` rows
        #[arg(long)]
        file: PathBuf,
    },

    /// Render a stored meeting
    Export {
        id: i64,
        #[arg(long, value_enum, default_value = "markdown")]
        format: ExportFormat,
        /// Write to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Err(e) = run(&cli) {
        if cli.json {
            let report = ErrorReport::from(&e);
            match serde_json::to_string_pretty(&report) {
                Ok(json) => println!("{}", json),
                Err(_) => eprintln!("error: {}", e),
            }
        } else {
            eprintln!("error: {}", e);
            eprintln!("hint: {}", e.recovery_suggestion());
        }
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), ServiceError> {
    let mut config = load_config(cli.config.as_deref()).map_err(ServiceError::Config)?;
    if let Some(ref db) = cli.db {
        config.db_path = Some(db.clone());
    }
    let db = MeetingDb::open(&config)?;

    match &cli.command {
        Commands::Process { title, file } => {
            cmd_process(&db, &config, title.as_deref(), file.as_deref(), cli.json)
        }
        Commands::History => cmd_history(&db, cli.json),
        Commands::Show { id } => {
            let meeting = meetings::get_meeting(&db, *id)?;
            print_json(&meeting.record)
        }
        Commands::Status { id, item, status } => {
            let target = match item.parse::<usize>() {
                Ok(index) => ItemRef::Index(index),
                Err(_) => ItemRef::Id(item.clone()),
            };
            let updated = actions::update_status(&db, *id, &target, status)?;
            print_json(&updated)
        }
        Commands::Add {
            id,
            task,
            owner,
            due,
            priority,
            status,
        } => {
            let new = NewActionItem {
                task: task.clone(),
                owner: owner.clone(),
                due_date: due.clone(),
                priority: priority.clone(),
                status: status.clone(),
            };
            let item = actions::add_action_item(&db, *id, &new)?;
            print_json(&item)
        }
        Commands::Edit { id, file } => {
            let text = read_file(file)?;
            let edit: MeetingEdit = serde_json::from_str(&text)
                .map_err(|e| ServiceError::Input(format!("{}: {}", file.display(), e)))?;
            let record = actions::edit_meeting(&db, *id, &edit)?;
            print_json(&record)
        }
        Commands::Export { id, format, output } => {
            let meeting = meetings::get_meeting(&db, *id)?;
            let rendered = match format {
                ExportFormat::Csv => tasks_csv(&meeting.record.action_items),
                ExportFormat::Markdown => minutes_markdown(&meeting.record),
            };
            match output {
                Some(path) => std::fs::write(path, rendered)
                    .map_err(|e| ServiceError::Input(format!("{}: {}", path.display(), e))),
                None => {
                    print!("{}", rendered);
                    Ok(())
                }
            }
        }
    }
}

fn cmd_process(
    db: &MeetingDb,
    config: &Config,
    title: Option<&str>,
    file: Option<&Path>,
    json: bool,
) -> Result<(), ServiceError> {
    let transcript = match file {
        Some(path) => read_file(path)?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| ServiceError::Input(format!("stdin: {}", e)))?;
            buf
        }
    };

    let generator = RetryingGenerator::new(OllamaClient::from_config(config)?, config.max_retries);
    let now = chrono::Local::now().naive_local();
    let (id, record) =
        meetings::process_transcript(db, &generator, config.temperature, &transcript, title, now)?;

    if json {
        #[derive(Serialize)]
        struct Processed<'a> {
            id: i64,
            record: &'a meetminder_lib::types::MeetingRecord,
        }
        return print_json(&Processed { id, record: &record });
    }

    println!("Saved meeting {}", id);
    print_json(&record)
}

fn cmd_history(db: &MeetingDb, json: bool) -> Result<(), ServiceError> {
    let rows = meetings::list_meetings(db)?;
    if json {
        return print_json(&rows);
    }
    if rows.is_empty() {
        println!("No meetings stored yet.");
    }
    for row in rows {
        println!(
            "{:>5}  {}  {}",
            row.id,
            row.created_at,
            row.title.as_deref().unwrap_or("Untitled Meeting")
        );
    }
    Ok(())
}

fn read_file(path: &Path) -> Result<String, ServiceError> {
    std::fs::read_to_string(path).map_err(|e| ServiceError::Input(format!("{}: {}", path.display(), e)))
}

fn print_json<T: Serialize>(value: &T) -> Result<(), ServiceError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| ServiceError::Input(format!("failed to render JSON: {}", e)))?;
    println!("{}", json);
    Ok(())
}
