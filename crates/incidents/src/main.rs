use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use incidents::{commands, Config};

#[derive(Parser)]
#[command(name = "incidents")]
#[command(
  about = "Incidents - Clustered Incident Analysis\nFind support incidents with similar short descriptions"
)]
#[command(version)]
struct Cli {
  /// CSV dataset to load (defaults to the configured path)
  #[arg(long, global = true, env = "INCIDENTS_CSV", value_name = "PATH")]
  csv: Option<PathBuf>,

  /// Configuration file path
  #[arg(long, global = true, value_name = "PATH")]
  config: Option<PathBuf>,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Show every incident in the dataset
  Table {
    /// Show all text fields for each incident
    #[arg(short, long)]
    wide: bool,
  },
  /// Find incidents with similar short-description tags
  Search {
    /// Only show matches from this cluster
    #[arg(short, long)]
    cluster: Option<String>,
    /// Print results as JSON
    #[arg(long)]
    json: bool,
    /// Short description to search for
    #[arg(required = true)]
    query: Vec<String>,
  },
  /// Search interactively, choosing a cluster after each query
  Explore,
  /// Regenerate the Short_Tags column from Short_Description
  Retag {
    /// Write to this file instead of overwriting the dataset
    #[arg(short, long)]
    output: Option<PathBuf>,
  },
  /// List resolution notes that have no near-duplicate
  Notes,
}

fn init_tracing() {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
  tracing_subscriber::registry().with(fmt::layer().with_writer(std::io::stderr)).with(filter).init();
}

fn main() {
  init_tracing();
  let cli = Cli::parse();

  if let Err(e) = run(cli) {
    bentley::error(&format!("{e:#}"));
    process::exit(1);
  }
}

fn run(cli: Cli) -> Result<()> {
  let config = Config::discover(cli.config.as_deref())?;
  let csv_path = cli.csv.unwrap_or_else(|| config.csv_path.clone());

  match cli.command {
    Commands::Table { wide } => {
      commands::show_table(&csv_path, wide)?;
    }
    Commands::Search { cluster, json, query } => {
      commands::search(&csv_path, &config, &query.join(" "), cluster.as_deref(), json)?;
    }
    Commands::Explore => {
      commands::explore_session(&csv_path, &config, std::io::stdin().lock())?;
    }
    Commands::Retag { output } => {
      commands::retag(&csv_path, output.as_deref())?;
    }
    Commands::Notes => {
      commands::list_unique_notes(&csv_path)?;
    }
  }

  Ok(())
}
