use anyhow::{anyhow, Context, Result};
use colored::*;
use std::io::{BufRead, Write};
use std::path::Path;

use crate::config::Config;
use crate::dataset::{self, Dataset};
use crate::display;
use crate::explore::{self, ClusterFilter, Exploration};
use crate::notes;

const PAGE_TITLE: &str = "Clustered Incident Analysis";

/// Load the dataset, reporting the outcome to the user
pub fn load_dataset(path: &Path) -> Result<Dataset> {
  match Dataset::load(path) {
    Ok(dataset) => {
      bentley::success(&format!("CSV file successfully loaded! ({} incidents)", dataset.len()));
      Ok(dataset)
    }
    Err(e) => Err(anyhow!("Failed to load CSV: {e}")),
  }
}

/// Show every incident
pub fn show_table(csv_path: &Path, wide: bool) -> Result<()> {
  let dataset = load_dataset(csv_path)?;

  bentley::title(PAGE_TITLE);
  bentley::subheader("Incidents");
  let width = display::terminal_width();
  if wide {
    print!("{}", display::format_cards(dataset.incidents(), width));
  } else {
    print!("{}", display::format_table(dataset.incidents().iter().map(|i| (i, None)), width));
  }

  if !dataset.supports_similarity() {
    bentley::warn(&similarity_unavailable(&dataset));
  }
  Ok(())
}

fn similarity_unavailable(dataset: &Dataset) -> String {
  let missing = dataset.missing_similarity_columns().into_iter().map(String::from).collect();
  explore::ExploreError::SimilarityUnavailable { missing }.to_string()
}

/// Run a single similarity search and print the results
pub fn search(csv_path: &Path, config: &Config, query: &str, cluster: Option<&str>, json: bool) -> Result<()> {
  let dataset = load_dataset(csv_path)?;
  let requested: ClusterFilter = cluster.unwrap_or("all").parse()?;

  let exploration = explore::explore(&dataset, query, &requested, config)?;
  report_fallback(&requested, &exploration);

  if json {
    println!("{}", display::format_json(&exploration).context("failed to serialize results")?);
  } else {
    bentley::title(PAGE_TITLE);
    print_exploration(&exploration);
  }
  Ok(())
}

fn report_fallback(requested: &ClusterFilter, exploration: &Exploration<'_>) {
  if *requested != exploration.filter {
    bentley::warn(&format!("Cluster {requested} is not among the top clusters; showing all"));
  }
}

fn print_exploration(exploration: &Exploration<'_>) {
  if exploration.tags.is_empty() {
    bentley::info(&format!("No searchable tags in \"{}\"", exploration.query));
    return;
  }

  bentley::subheader("Similar Clusters");
  println!("{}", display::format_clusters(&exploration.top_clusters));

  bentley::subheader(&format!("Similar Incidents ({})", exploration.filter));
  let rows = exploration.rows.iter().map(|row| (row.incident, Some(row.score)));
  print!("{}", display::format_table(rows, display::terminal_width()));

  bentley::subheader("Clustered Data Visualizations");
  for distribution in &exploration.distributions {
    println!("{}", display::format_distribution(distribution));
  }
}

/// Interactive session: read a query, pick a cluster, repeat until a blank line
pub fn explore_session<R: BufRead>(csv_path: &Path, config: &Config, mut input: R) -> Result<()> {
  let dataset = load_dataset(csv_path)?;
  if !dataset.supports_similarity() {
    return Err(anyhow!(similarity_unavailable(&dataset)));
  }

  bentley::title(PAGE_TITLE);
  loop {
    let Some(query) = prompt(&mut input, "Enter a Short Description (blank to quit): ")? else {
      break;
    };

    let overview = explore::explore(&dataset, &query, &ClusterFilter::All, config)?;
    if overview.tags.is_empty() {
      bentley::info(&format!("No searchable tags in \"{query}\""));
      continue;
    }

    bentley::subheader("Similar Clusters");
    println!("{}", display::format_clusters(&overview.top_clusters));
    println!("{}", display::format_cluster_choices(&overview.top_clusters));

    let requested = select_cluster(&mut input, &overview.top_clusters)?;

    let exploration = explore::explore(&dataset, &query, &requested, config)?;
    report_fallback(&requested, &exploration);
    print_exploration(&exploration);
  }

  println!("{}", "Goodbye".dimmed());
  Ok(())
}

/// Ask for a menu number until a valid one is given; blank or end of input means all
fn select_cluster<R: BufRead>(input: &mut R, labels: &[String]) -> Result<ClusterFilter> {
  loop {
    let Some(answer) = prompt(input, "Select a Cluster to Filter [0]: ")? else {
      return Ok(ClusterFilter::All);
    };
    match cluster_choice(&answer, labels) {
      Some(filter) => return Ok(filter),
      None => bentley::warn(&format!("Enter a number from 0 to {}", labels.len())),
    }
  }
}

/// Map a menu number to a filter; labels are never typed directly
fn cluster_choice(answer: &str, labels: &[String]) -> Option<ClusterFilter> {
  match answer.trim().parse::<usize>().ok()? {
    0 => Some(ClusterFilter::All),
    n => labels.get(n - 1).map(|label| ClusterFilter::Label(label.clone())),
  }
}

fn prompt<R: BufRead>(input: &mut R, message: &str) -> Result<Option<String>> {
  print!("{}", message.bold());
  std::io::stdout().flush()?;

  let mut line = String::new();
  if input.read_line(&mut line)? == 0 {
    println!();
    return Ok(None);
  }

  let line = line.trim();
  Ok(if line.is_empty() { None } else { Some(line.to_string()) })
}

/// Rewrite the stored tag column from the short descriptions
pub fn retag(csv_path: &Path, output: Option<&Path>) -> Result<()> {
  let output = output.unwrap_or(csv_path);
  let rows = dataset::retag(csv_path, output)
    .with_context(|| format!("Failed to retag {}", csv_path.display()))?;

  bentley::success(&format!("Tagged {rows} incidents into {}", output.display()));
  Ok(())
}

/// List resolution notes that have no near-duplicate
pub fn list_unique_notes(csv_path: &Path) -> Result<()> {
  let dataset = load_dataset(csv_path)?;
  let notes: Vec<Option<&str>> =
    dataset.incidents().iter().map(|i| i.resolution_notes.as_deref()).collect();
  let unique = notes::unique_notes(&notes);

  bentley::subheader(&format!("Unique Resolution Notes ({} of {})", unique.len(), notes.len()));
  for index in unique {
    let incident = &dataset.incidents()[index];
    println!(
      "{} {}",
      incident.incident.as_deref().unwrap_or("?").cyan(),
      notes[index].unwrap_or("").split_whitespace().collect::<Vec<_>>().join(" ")
    );
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_cluster_choice_is_a_menu_index() {
    let labels = vec!["5".to_string(), "3".to_string(), "1".to_string()];
    assert_eq!(cluster_choice("0", &labels), Some(ClusterFilter::All));
    assert_eq!(cluster_choice(" 3 ", &labels), Some(ClusterFilter::Label("1".into())));
    assert_eq!(cluster_choice("1", &labels), Some(ClusterFilter::Label("5".into())));
    assert_eq!(cluster_choice("4", &labels), None);
    assert_eq!(cluster_choice("all", &labels), None);
    assert_eq!(cluster_choice("-1", &labels), None);
  }

  #[test]
  fn test_select_cluster_asks_again_after_bad_answer() {
    let labels = vec!["5".to_string(), "3".to_string()];

    let mut input = "9\nnetwork\n2\n".as_bytes();
    assert_eq!(select_cluster(&mut input, &labels).unwrap(), ClusterFilter::Label("3".into()));

    let mut blank = "\n".as_bytes();
    assert_eq!(select_cluster(&mut blank, &labels).unwrap(), ClusterFilter::All);

    let mut closed = "7\n".as_bytes();
    assert_eq!(select_cluster(&mut closed, &labels).unwrap(), ClusterFilter::All);
  }

  #[test]
  fn test_prompt_reads_lines() {
    let mut input = "  db timeout \n\n".as_bytes();
    assert_eq!(prompt(&mut input, "> ").unwrap(), Some("db timeout".to_string()));
    assert_eq!(prompt(&mut input, "> ").unwrap(), None);
    assert_eq!(prompt(&mut input, "> ").unwrap(), None);
  }
}
