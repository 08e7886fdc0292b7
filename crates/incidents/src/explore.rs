//! One query's worth of exploration: rank the dataset, surface the most
//! common clusters among the matches, narrow to one of them and summarize the
//! remaining rows column by column.

use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::config::Config;
use crate::dataset::{Dataset, Incident};
use crate::ranker::{self, Matches};
use crate::tags;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExploreError {
  #[error("Required columns ({}) are missing from the dataset", quoted(.missing))]
  SimilarityUnavailable { missing: Vec<String> },
}

fn quoted(columns: &[String]) -> String {
  columns.iter().map(|c| format!("'{c}'")).collect::<Vec<_>>().join(" and ")
}

/// Which cluster the result table is narrowed to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClusterFilter {
  #[default]
  All,
  Label(String),
}

impl FromStr for ClusterFilter {
  type Err = Infallible;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let trimmed = s.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
      Ok(ClusterFilter::All)
    } else {
      Ok(ClusterFilter::Label(trimmed.to_string()))
    }
  }
}

impl fmt::Display for ClusterFilter {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ClusterFilter::All => write!(f, "All"),
      ClusterFilter::Label(label) => write!(f, "{label}"),
    }
  }
}

impl ClusterFilter {
  pub fn accepts(&self, incident: &Incident) -> bool {
    match self {
      ClusterFilter::All => true,
      ClusterFilter::Label(label) => incident.final_cluster.as_deref() == Some(label.as_str()),
    }
  }
}

/// Count and share of one value within a column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Share {
  pub value: String,
  pub count: usize,
  pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Distribution {
  pub column: String,
  pub total: usize,
  pub shares: Vec<Share>,
}

/// Value counts of `column`, most frequent first.
///
/// Missing values are left out. Equal counts keep first-seen order.
pub fn distribution<'a, I>(rows: I, column: &str) -> Distribution
where
  I: IntoIterator<Item = &'a Incident>,
{
  let mut seen: Vec<(String, usize)> = Vec::new();
  let mut positions: HashMap<String, usize> = HashMap::new();

  for incident in rows {
    let Some(value) = incident.field(column) else {
      continue;
    };
    match positions.get(value).copied() {
      Some(i) => seen[i].1 += 1,
      None => {
        positions.insert(value.to_string(), seen.len());
        seen.push((value.to_string(), 1));
      }
    }
  }

  seen.sort_by(|a, b| b.1.cmp(&a.1));
  let total: usize = seen.iter().map(|(_, count)| count).sum();
  let shares = seen
    .into_iter()
    .map(|(value, count)| Share { value, count, percent: count as f64 * 100.0 / total as f64 })
    .collect();

  Distribution { column: column.to_string(), total, shares }
}

/// The `n` most frequent cluster labels among `rows`.
///
/// Equal counts are ordered by label, numerically when both labels are numbers.
pub fn top_clusters<'a, I>(rows: I, n: usize) -> Vec<String>
where
  I: IntoIterator<Item = &'a Incident>,
{
  let mut counts: HashMap<&str, usize> = HashMap::new();
  for incident in rows {
    if let Some(label) = incident.final_cluster.as_deref() {
      *counts.entry(label).or_insert(0) += 1;
    }
  }

  let mut labels: Vec<(&str, usize)> = counts.into_iter().collect();
  labels.sort_by(|a, b| compare_labels(a.0, b.0));
  labels.sort_by(|a, b| b.1.cmp(&a.1));
  labels.into_iter().take(n).map(|(label, _)| label.to_string()).collect()
}

fn compare_labels(a: &str, b: &str) -> Ordering {
  match (a.parse::<f64>(), b.parse::<f64>()) {
    (Ok(x), Ok(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal).then_with(|| a.cmp(b)),
    _ => a.cmp(b),
  }
}

/// An incident with its similarity score
#[derive(Debug, Clone, Serialize)]
pub struct Scored<'a> {
  #[serde(flatten)]
  pub incident: &'a Incident,
  pub score: f64,
}

#[derive(Debug, Serialize)]
pub struct Exploration<'a> {
  pub query: String,
  pub tags: Vec<String>,
  pub top_clusters: Vec<String>,
  /// Filter actually applied; a requested label outside `top_clusters` becomes `All`
  pub filter: ClusterFilter,
  /// Ranked rows after filtering, best first
  pub rows: Vec<Scored<'a>>,
  pub distributions: Vec<Distribution>,
}

impl Exploration<'_> {
  pub fn incidents(&self) -> impl Iterator<Item = &Incident> + '_ {
    self.rows.iter().map(|row| row.incident)
  }
}

/// Run one query against the dataset.
///
/// Fails only when the dataset lacks the columns similarity needs.
pub fn explore<'a>(
  dataset: &'a Dataset,
  query: &str,
  requested: &ClusterFilter,
  config: &Config,
) -> Result<Exploration<'a>, ExploreError> {
  let missing = dataset.missing_similarity_columns();
  if !missing.is_empty() {
    return Err(ExploreError::SimilarityUnavailable {
      missing: missing.into_iter().map(String::from).collect(),
    });
  }

  let matches: Matches<'a, Incident> =
    ranker::rank(query, dataset.incidents(), config.top_matches);
  let top_clusters = top_clusters(matches.rows.iter().copied(), config.top_clusters);

  let filter = match requested {
    ClusterFilter::Label(label) if !top_clusters.contains(label) => {
      tracing::debug!(cluster = %label, "cluster is not among the top clusters; showing all");
      ClusterFilter::All
    }
    other => other.clone(),
  };

  let rows: Vec<Scored<'a>> = matches
    .iter()
    .filter(|(incident, _)| filter.accepts(incident))
    .map(|(incident, score)| Scored { incident, score })
    .collect();

  let distributions = config
    .chart_columns
    .iter()
    .map(|column| distribution(rows.iter().map(|row| row.incident), column))
    .collect();

  Ok(Exploration {
    query: query.to_string(),
    tags: tags::normalize(Some(query)),
    top_clusters,
    filter,
    rows,
    distributions,
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  fn incident(id: &str, tags: &str, cluster: Option<&str>, state: &str, who: Option<&str>) -> Incident {
    Incident {
      incident: Some(id.to_string()),
      short_tags: Some(tags.to_string()),
      final_cluster: cluster.map(String::from),
      state: Some(state.to_string()),
      assigned_to: who.map(String::from),
      ..Incident::default()
    }
  }

  fn dataset() -> Dataset {
    let headers = ["Incident", "State", "Assigned_to", "Final_Cluster", "Short_Tags"]
      .iter()
      .map(|h| h.to_string())
      .collect();
    Dataset::new(
      headers,
      vec![
        incident("INC1", "['db', 'timeout']", Some("3"), "Closed", Some("alice")),
        incident("INC2", "['db', 'error']", Some("7"), "Open", Some("bob")),
        incident("INC3", "['network', 'timeout']", Some("3"), "Open", None),
        incident("INC4", "['printer']", None, "Closed", Some("alice")),
      ],
    )
  }

  #[test]
  fn test_cluster_filter_parsing() {
    assert_eq!("all".parse::<ClusterFilter>().unwrap(), ClusterFilter::All);
    assert_eq!(" ALL ".parse::<ClusterFilter>().unwrap(), ClusterFilter::All);
    assert_eq!("".parse::<ClusterFilter>().unwrap(), ClusterFilter::All);
    assert_eq!("12".parse::<ClusterFilter>().unwrap(), ClusterFilter::Label("12".into()));
    assert_eq!(ClusterFilter::Label("12".into()).to_string(), "12");
  }

  #[test]
  fn test_top_clusters_by_count_then_label() {
    let rows = vec![
      incident("a", "[]", Some("10"), "Open", None),
      incident("b", "[]", Some("9"), "Open", None),
      incident("c", "[]", Some("2"), "Open", None),
      incident("d", "[]", Some("2"), "Open", None),
      incident("e", "[]", None, "Open", None),
    ];
    assert_eq!(top_clusters(&rows, 5), vec!["2", "9", "10"]);
    assert_eq!(top_clusters(&rows, 1), vec!["2"]);
  }

  #[test]
  fn test_distribution_excludes_missing_and_keeps_first_seen_ties() {
    let data = dataset();
    let dist = distribution(data.incidents(), "Assigned_to");
    assert_eq!(dist.total, 3);
    assert_eq!(dist.shares[0].value, "alice");
    assert_eq!(dist.shares[0].count, 2);
    assert_eq!(dist.shares[1].value, "bob");
    assert!((dist.shares[0].percent - 66.666).abs() < 0.01);

    let states = distribution(data.incidents(), "State");
    assert_eq!(states.shares[0].value, "Closed");
    assert_eq!(states.shares[1].value, "Open");
  }

  #[test]
  fn test_distribution_of_nothing() {
    let dist = distribution(std::iter::empty(), "State");
    assert_eq!(dist.total, 0);
    assert!(dist.shares.is_empty());
  }

  #[test]
  fn test_explore_all() {
    let data = dataset();
    let exploration = explore(&data, "DB Timeout 500", &ClusterFilter::All, &Config::default()).unwrap();

    assert_eq!(exploration.tags, vec!["db".to_string(), "timeout".to_string()]);
    assert_eq!(exploration.rows.len(), 4);
    assert_eq!(exploration.rows[0].incident.incident.as_deref(), Some("INC1"));
    assert_eq!(exploration.top_clusters, vec!["3", "7"]);
    assert_eq!(exploration.distributions.len(), 2);
    assert_eq!(exploration.distributions[0].column, "State");
  }

  #[test]
  fn test_explore_filters_to_cluster() {
    let data = dataset();
    let filter = ClusterFilter::Label("3".into());
    let exploration = explore(&data, "db timeout", &filter, &Config::default()).unwrap();

    assert_eq!(exploration.filter, filter);
    let ids: Vec<_> = exploration.incidents().filter_map(|i| i.incident.as_deref()).collect();
    assert_eq!(ids, vec!["INC1", "INC3"]);
    assert_eq!(exploration.distributions[0].total, 2);
  }

  #[test]
  fn test_explore_unknown_cluster_falls_back_to_all() {
    let data = dataset();
    let filter = ClusterFilter::Label("99".into());
    let exploration = explore(&data, "db", &filter, &Config::default()).unwrap();
    assert_eq!(exploration.filter, ClusterFilter::All);
    assert_eq!(exploration.rows.len(), 4);
  }

  #[test]
  fn test_explore_empty_query() {
    let data = dataset();
    let exploration = explore(&data, "42", &ClusterFilter::All, &Config::default()).unwrap();
    assert!(exploration.rows.is_empty());
    assert!(exploration.top_clusters.is_empty());
    assert!(exploration.distributions.iter().all(|d| d.total == 0));
  }

  #[test]
  fn test_explore_requires_similarity_columns() {
    let data = Dataset::new(vec!["Incident".into(), "Final_Cluster".into()], vec![]);
    let err = explore(&data, "db", &ClusterFilter::All, &Config::default()).unwrap_err();
    assert_eq!(err, ExploreError::SimilarityUnavailable { missing: vec!["Short_Tags".into()] });
    assert_eq!(err.to_string(), "Required columns ('Short_Tags') are missing from the dataset");
  }
}
