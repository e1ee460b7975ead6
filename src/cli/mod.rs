//! CLI commands implementation.

mod import;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::style;

use crate::cache::ResultCache;
use crate::config::Settings;
use crate::repository::{init_schema, CollegeRepository, ResultRepository};

#[derive(Parser)]
#[command(name = "orcrview")]
#[command(about = "Opening/closing rank browser for counseling data")]
#[command(version)]
pub struct Cli {
    /// Data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the data directory and database
    Init,

    /// Start the web server
    Serve {
        /// Host to bind
        #[arg(long)]
        host: Option<String>,
        /// Port to bind
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Bulk-import scraped counseling result rows from a JSON file
    Import {
        /// JSON file with an array of scraped rows
        file: PathBuf,
        /// Exam the rows belong to (ADVANCED, MAINS, WBJEE, NEET_PG, BITSAT)
        #[arg(long)]
        exam: String,
        /// Counseling type (JOSSA, CSAB, BITSAT, WBJEE, NEET_PG, JAC)
        #[arg(long = "type")]
        counseling_type: String,
        /// Year the rows belong to
        #[arg(long)]
        year: i32,
        /// Delete existing rows for this (exam, type, year) first
        #[arg(long)]
        replace: bool,
    },

    /// Manage the result cache
    Cache {
        #[command(subcommand)]
        command: CacheCommands,
    },

    /// Browse the college directory
    College {
        #[command(subcommand)]
        command: CollegeCommands,
    },
}

#[derive(Subcommand)]
enum CacheCommands {
    /// Show cache file count and total size
    Stats,
    /// Remove all cache files
    Clear,
}

#[derive(Subcommand)]
enum CollegeCommands {
    /// List all colleges
    List,
    /// Search colleges by name substring
    Search { query: String },
}

/// Parse arguments and run the selected command.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(cli.data_dir.clone())?;

    match cli.command {
        Commands::Init => cmd_init(&settings),
        Commands::Serve { host, port } => {
            let host = host.unwrap_or_else(|| settings.host.clone());
            let port = port.unwrap_or(settings.port);
            crate::server::serve(&settings, &host, port).await
        }
        Commands::Import {
            file,
            exam,
            counseling_type,
            year,
            replace,
        } => import::cmd_import(&settings, &file, &exam, &counseling_type, year, replace),
        Commands::Cache { command } => cmd_cache(&settings, command),
        Commands::College { command } => cmd_college(&settings, command),
    }
}

fn cmd_init(settings: &Settings) -> anyhow::Result<()> {
    settings.ensure_dirs()?;
    init_schema(&settings.db_path())?;
    println!(
        "{} Initialized data directory at {}",
        style("✓").green(),
        settings.data_dir.display()
    );
    Ok(())
}

fn cmd_cache(settings: &Settings, command: CacheCommands) -> anyhow::Result<()> {
    let cache = ResultCache::new(&settings.cache_dir(), !settings.production);
    match command {
        CacheCommands::Stats => {
            let (files, bytes) = cache.stats()?;
            println!("{} cache files, {} bytes", files, bytes);
        }
        CacheCommands::Clear => {
            let removed = cache.clear()?;
            println!("{} Removed {} cache files", style("✓").green(), removed);
        }
    }
    Ok(())
}

fn cmd_college(settings: &Settings, command: CollegeCommands) -> anyhow::Result<()> {
    let repo = CollegeRepository::new(&settings.db_path());
    let results = ResultRepository::new(&settings.db_path());
    let colleges = match command {
        CollegeCommands::List => repo.search(None)?,
        CollegeCommands::Search { query } => repo.search(Some(&query))?,
    };
    for college in &colleges {
        let flag = if college.moderated { " " } else { "?" };
        println!(
            "{:>6} {} {} [{}] bongs={}",
            college.id,
            flag,
            college.name,
            college.college_type.as_str(),
            college.bongs
        );
    }
    println!(
        "{} colleges, {} result rows total",
        colleges.len(),
        results.count()?
    );
    Ok(())
}
