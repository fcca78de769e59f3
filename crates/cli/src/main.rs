use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::Teach;

#[derive(Parser)]
#[command(
    name = "kharcha",
    version,
    about = "Sort bank statement withdrawals into spending categories."
)]
struct Cli {
    /// Increase log output (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a statement CSV, categorize it and print the totals.
    Categorize {
        /// Path to the statement CSV
        file: PathBuf,
        /// TOML file overriding the preamble length, column names or delimiter
        #[arg(long)]
        profile: Option<PathBuf>,
        /// Teach a category from a row, e.g. --teach 3=Food (rows as numbered in the output)
        #[arg(long = "teach", value_name = "ROW=CATEGORY", value_parser = commands::parse_teach)]
        teach: Vec<Teach>,
        /// Print the categorized rows and totals as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show which keyword would be learned from a narration.
    Keyword {
        /// Narration text, e.g. UPI-FOODBOOK-9876543210-ybl
        description: String,
    },
    /// List the categories offered for manual choice.
    Categories,
}

fn init_logger(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    let result = match cli.command {
        Commands::Categorize {
            file,
            profile,
            teach,
            json,
        } => commands::categorize(&file, profile.as_deref(), &teach, json),
        Commands::Keyword { description } => commands::keyword(&description),
        Commands::Categories => commands::categories(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
