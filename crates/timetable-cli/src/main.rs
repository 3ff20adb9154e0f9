//! Timetable CLI
//!
//! Command-line tool for converting timetable workbooks and querying the
//! resulting schedules.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use timetable_core::{
    convert_workbook, detect_day_blocks, read_workbook, resolve_upload_source, semester_info,
    ExtractConfig, ScheduleEntry, TimetableIndex,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "timetable-cli")]
#[command(about = "Spreadsheet timetable extractor", long_about = None)]
#[command(version)]
struct Cli {
    /// Extraction settings (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a workbook into a slot CSV
    Convert {
        /// Path to the .xlsx workbook
        #[arg(short, long)]
        input: PathBuf,

        /// Output CSV path (defaults to the input with a .csv extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the day blocks detected in each sheet
    Blocks {
        /// Path to the .xlsx workbook
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Show one teacher's schedule
    Teacher {
        /// Workbook or slot CSV
        #[arg(short, long)]
        source: PathBuf,

        /// Teacher name, e.g. "Mr. Ali"
        #[arg(short, long)]
        name: String,

        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Show every class of a section
    Section {
        /// Workbook or slot CSV
        #[arg(short, long)]
        source: PathBuf,

        /// Section token or part of one, e.g. "BSSE-5"
        #[arg(short, long)]
        name: String,

        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Show every class held in a room
    Room {
        /// Workbook or slot CSV
        #[arg(short, long)]
        source: PathBuf,

        /// Room name or part of one
        #[arg(short, long)]
        name: String,

        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// List teachers, sections or rooms
    List {
        /// Workbook or slot CSV
        #[arg(short, long)]
        source: PathBuf,

        #[arg(short, long, value_enum)]
        what: Listing,
    },

    /// Find the newest upload, converting it when its CSV is stale
    Latest {
        /// Uploads directory containing xlsx/ and csv/
        #[arg(short, long)]
        dir: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum Listing {
    Teachers,
    Sections,
    Rooms,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run() -> timetable_core::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => {
            debug!(path = %path.display(), "loading extraction settings");
            ExtractConfig::load(path)?
        }
        None => ExtractConfig::default(),
    };

    match cli.command {
        Commands::Convert { input, output } => cmd_convert(&input, output.as_deref(), &config),
        Commands::Blocks { input } => cmd_blocks(&input, &config),
        Commands::Teacher {
            source,
            name,
            format,
        } => {
            let index = TimetableIndex::load(&source, &config)?;
            print_entries(&index.by_teacher(&name), format)
        }
        Commands::Section {
            source,
            name,
            format,
        } => {
            let index = TimetableIndex::load(&source, &config)?;
            print_entries(&index.by_section(&name), format)
        }
        Commands::Room {
            source,
            name,
            format,
        } => {
            let index = TimetableIndex::load(&source, &config)?;
            print_entries(&index.by_room(&name), format)
        }
        Commands::List { source, what } => cmd_list(&source, what, &config),
        Commands::Latest { dir } => cmd_latest(&dir, &config),
    }
}

fn cmd_convert(input: &Path, output: Option<&Path>, config: &ExtractConfig) -> timetable_core::Result<()> {
    let summary = convert_workbook(input, output, config)?;

    println!(
        "Converted {} sheet(s) from {}",
        summary.sheets,
        summary.input.display()
    );
    println!("Wrote {} slot(s) to {}", summary.slots, summary.output.display());

    Ok(())
}

fn cmd_blocks(input: &Path, config: &ExtractConfig) -> timetable_core::Result<()> {
    let grids = read_workbook(input)?;

    for grid in &grids {
        let blocks = detect_day_blocks(grid, config);
        println!("{} ({} blocks)", grid.name, blocks.len());
        for block in &blocks {
            println!(
                "  {:<10} day row {:>3}  time row {:>3}  {} time column(s)  rooms {:?}",
                block.day_name,
                block.day_row + 1,
                block.time_row + 1,
                block.time_columns.len(),
                block.room_rows.iter().map(|r| r + 1).collect::<Vec<_>>()
            );
        }
        println!();
    }

    Ok(())
}

fn cmd_list(source: &Path, what: Listing, config: &ExtractConfig) -> timetable_core::Result<()> {
    let index = TimetableIndex::load(source, config)?;

    let items: Vec<String> = match what {
        Listing::Teachers => index.all_teachers(),
        Listing::Sections => index.all_sections().iter().cloned().collect(),
        Listing::Rooms => index.all_rooms().iter().cloned().collect(),
    };

    println!("{} ({}):", index.semester(), items.len());
    for item in &items {
        println!("  {}", item);
    }

    Ok(())
}

fn cmd_latest(dir: &Path, config: &ExtractConfig) -> timetable_core::Result<()> {
    match resolve_upload_source(dir, config)? {
        Some(path) => {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            println!("{}", path.display());
            println!("Semester: {}", semester_info(&name));
        }
        None => println!("No timetable found under {}", dir.display()),
    }

    Ok(())
}

fn print_entries(entries: &[ScheduleEntry], format: OutputFormat) -> timetable_core::Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(entries)?);
        }
        OutputFormat::Table => {
            if entries.is_empty() {
                println!("No classes found");
                return Ok(());
            }

            let header = ["Day", "Start", "End", "Room", "Subject", "Groups", "Teachers"];
            println!("{}", header.join("\t"));
            println!("{}", "-".repeat(header.len() * 12));

            for entry in entries {
                println!(
                    "{}\t{}\t{}\t{}\t{}\t{}\t{}",
                    entry.day,
                    entry.start_time,
                    entry.end_time,
                    entry.location,
                    entry.subject,
                    entry.groups.join(", "),
                    entry.teachers
                );
            }
            println!();
            println!("{} class(es)", entries.len());
        }
    }

    Ok(())
}
