//! Terminal rendering for incidents, clusters and distributions.
//!
//! Everything here returns a `String` so callers decide where it goes.

use colored::*;

use crate::dataset::{Incident, ASSIGNED_TO, FINAL_CLUSTER, INCIDENT, SHORT_DESCRIPTION, STATE};
use crate::explore::{Distribution, Exploration};

const DEFAULT_WIDTH: usize = 120;
const BAR_WIDTH: usize = 30;
const GAP: &str = "  ";

/// Fixed-width columns; the short description takes what is left
const FIXED_COLUMNS: [(&str, usize); 4] =
  [(INCIDENT, 12), (STATE, 12), (ASSIGNED_TO, 18), (FINAL_CLUSTER, 14)];

const SCORE_WIDTH: usize = 6;
const MIN_DESCRIPTION_WIDTH: usize = 20;

/// Visible width of the terminal, or a default when not attached to one
pub fn terminal_width() -> usize {
  let term = console::Term::stdout();
  match term.size_checked() {
    Some((_, columns)) if columns > 0 => columns as usize,
    _ => DEFAULT_WIDTH,
  }
}

fn cell(text: &str, width: usize) -> String {
  let truncated = console::truncate_str(text, width, "…");
  console::pad_str(&truncated, width, console::Alignment::Left, None).into_owned()
}

fn single_line(text: &str) -> String {
  text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Render incidents as a table, with a score column when scores are given
pub fn format_table<'a, I>(rows: I, width: usize) -> String
where
  I: IntoIterator<Item = (&'a Incident, Option<f64>)>,
{
  let rows: Vec<(&Incident, Option<f64>)> = rows.into_iter().collect();
  if rows.is_empty() {
    return "No incidents to show".yellow().to_string();
  }

  let scored = rows.iter().any(|(_, score)| score.is_some());
  let fixed: usize = FIXED_COLUMNS.iter().map(|(_, w)| w + GAP.len()).sum::<usize>()
    + if scored { SCORE_WIDTH + GAP.len() } else { 0 };
  let description_width = width.saturating_sub(fixed).max(MIN_DESCRIPTION_WIDTH);

  let mut header: Vec<String> = Vec::new();
  if scored {
    header.push(cell("Score", SCORE_WIDTH));
  }
  header.extend(FIXED_COLUMNS.iter().map(|(name, w)| cell(name, *w)));
  header.push(cell(SHORT_DESCRIPTION, description_width));

  let mut output = String::new();
  output.push_str(&header.join(GAP).bright_white().bold().to_string());
  output.push('\n');
  output.push_str(&"-".repeat(header.iter().map(|h| h.len()).sum::<usize>().min(width)).dimmed().to_string());
  output.push('\n');

  for (incident, score) in rows {
    let mut line: Vec<String> = Vec::new();
    if let Some(score) = score {
      line.push(cell(&format!("{score:.3}"), SCORE_WIDTH).green().to_string());
    } else if scored {
      line.push(cell("", SCORE_WIDTH));
    }
    for (column, w) in FIXED_COLUMNS {
      let value = incident.field(column).unwrap_or("");
      let rendered = cell(value, w);
      line.push(if column == FINAL_CLUSTER { rendered.cyan().to_string() } else { rendered });
    }
    let description = single_line(incident.field(SHORT_DESCRIPTION).unwrap_or(""));
    line.push(cell(&description, description_width));

    output.push_str(line.join(GAP).trim_end());
    output.push('\n');
  }

  output
}

/// Render each incident as a block with every text field, wrapped to `width`
pub fn format_cards<'a, I>(rows: I, width: usize) -> String
where
  I: IntoIterator<Item = &'a Incident>,
{
  let mut output = String::new();

  for incident in rows {
    let header = format!(
      "=== {} [{}] ===",
      incident.incident.as_deref().unwrap_or("?").blue().bold(),
      incident.final_cluster.as_deref().unwrap_or("-").cyan()
    );
    output.push_str(&header);
    output.push('\n');

    let status = format!(
      "{}: {}  {}: {}",
      STATE,
      incident.state.as_deref().unwrap_or("-"),
      ASSIGNED_TO,
      incident.assigned_to.as_deref().unwrap_or("-")
    );
    output.push_str(&status.dimmed().to_string());
    output.push('\n');

    let sections = [
      ("Short description", &incident.short_description),
      ("Long description", &incident.long_description),
      ("Resolution notes", &incident.resolution_notes),
    ];
    for (label, text) in sections {
      let Some(text) = text.as_deref() else {
        continue;
      };
      output.push_str(&format!("{}\n", label.yellow()));
      for line in wrap_text(text, width) {
        output.push_str(&format!("  {line}\n"));
      }
    }
    output.push('\n');
  }

  output
}

/// Greedy word wrap by display width; blank source lines are kept as blank lines.
/// A word wider than `width` gets a line of its own.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
  text.lines().flat_map(|paragraph| wrap_paragraph(paragraph, width)).collect()
}

fn wrap_paragraph(paragraph: &str, width: usize) -> Vec<String> {
  let mut lines: Vec<String> = Vec::new();
  let mut used = 0;

  for word in paragraph.split_whitespace() {
    let word_width = console::measure_text_width(word);
    if !lines.is_empty() && used + 1 + word_width <= width {
      let last = lines.len() - 1;
      lines[last].push(' ');
      lines[last].push_str(word);
      used += 1 + word_width;
    } else {
      lines.push(word.to_string());
      used = word_width;
    }
  }

  if lines.is_empty() {
    lines.push(String::new());
  }
  lines
}

/// Cluster labels as a row of badges
pub fn format_clusters(labels: &[String]) -> String {
  if labels.is_empty() {
    return "No clusters among the matches".yellow().to_string();
  }
  bentley::badges(labels)
}

/// Numbered cluster choices, `0` meaning all clusters
pub fn format_cluster_choices(labels: &[String]) -> String {
  let mut choices = vec![format!("{} All", "0)".dimmed())];
  choices.extend(
    labels.iter().enumerate().map(|(i, label)| format!("{} {}", format!("{})", i + 1).dimmed(), label)),
  );
  choices.join("  ")
}

/// Horizontal bar chart of a column's value shares
pub fn format_distribution(distribution: &Distribution) -> String {
  let mut output = format!("{} Distribution\n", distribution.column.bold());
  if distribution.shares.is_empty() {
    output.push_str(&"  no values".dimmed().to_string());
    output.push('\n');
    return output;
  }

  let label_width = distribution
    .shares
    .iter()
    .map(|share| console::measure_text_width(&share.value))
    .max()
    .unwrap_or(0)
    .min(24);
  let palette = [Color::Blue, Color::Green, Color::Yellow, Color::Magenta, Color::Cyan, Color::Red];

  for (i, share) in distribution.shares.iter().enumerate() {
    let filled = ((share.percent / 100.0) * BAR_WIDTH as f64).round() as usize;
    let bar = "█".repeat(filled.max(1)).color(palette[i % palette.len()]);
    output.push_str(&format!(
      "  {} {} {:.1}% ({})\n",
      cell(&share.value, label_width),
      bar,
      share.percent,
      share.count
    ));
  }

  output
}

/// Render an exploration as pretty JSON
pub fn format_json(exploration: &Exploration<'_>) -> serde_json::Result<String> {
  serde_json::to_string_pretty(exploration)
}
