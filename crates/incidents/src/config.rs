//! Configuration management for the incident explorer
//!
//! Loaded once at start-up and passed around by reference afterwards.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::dataset::{ASSIGNED_TO, STATE};
use crate::ranker::DEFAULT_LIMIT;

/// File names searched in the working directory
const LOCAL_CONFIG_FILES: [&str; 2] = ["incidents.json", ".incidents.json"];

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("cannot read config {path}: {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
  #[error("invalid config {path}: {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
  /// Dataset loaded when no path is given on the command line
  #[serde(default = "default_csv_path")]
  pub csv_path: PathBuf,
  /// Number of ranked rows kept per query
  #[serde(default = "default_top_matches")]
  pub top_matches: usize,
  /// Number of clusters offered as filters
  #[serde(default = "default_top_clusters")]
  pub top_clusters: usize,
  /// Columns summarized below the results
  #[serde(default = "default_chart_columns")]
  pub chart_columns: Vec<String>,
}

fn default_csv_path() -> PathBuf {
  PathBuf::from("./Data/Clustered.csv")
}
fn default_top_matches() -> usize {
  DEFAULT_LIMIT
}
fn default_top_clusters() -> usize {
  5
}
fn default_chart_columns() -> Vec<String> {
  vec![STATE.to_string(), ASSIGNED_TO.to_string()]
}

impl Default for Config {
  fn default() -> Self {
    Self {
      csv_path: default_csv_path(),
      top_matches: default_top_matches(),
      top_clusters: default_top_clusters(),
      chart_columns: default_chart_columns(),
    }
  }
}

impl Config {
  /// Load configuration from a file
  pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
      .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
    serde_json::from_str(&content)
      .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
  }

  /// Load from `explicit`, else the first config file found, else defaults
  pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
    if let Some(path) = explicit {
      return Self::load_from_file(path);
    }

    for path in Self::search_paths() {
      if path.exists() {
        tracing::debug!(path = %path.display(), "using config file");
        return Self::load_from_file(&path);
      }
    }

    Ok(Config::default())
  }

  fn search_paths() -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = LOCAL_CONFIG_FILES.iter().map(PathBuf::from).collect();
    if let Some(dir) = dirs::config_dir() {
      paths.push(dir.join("incidents").join("config.json"));
    }
    paths
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::fs;
  use tempfile::TempDir;

  #[test]
  fn test_config_default() {
    let config = Config::default();
    assert_eq!(config.csv_path, PathBuf::from("./Data/Clustered.csv"));
    assert_eq!(config.top_matches, 20);
    assert_eq!(config.top_clusters, 5);
    assert_eq!(config.chart_columns, vec!["State".to_string(), "Assigned_to".to_string()]);
  }

  #[test]
  fn test_config_load_partial_config() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("partial.json");
    fs::write(&config_path, r#"{ "top_clusters": 3, "csv_path": "data/x.csv" }"#).unwrap();

    let config = Config::load_from_file(&config_path).unwrap();
    assert_eq!(config.top_clusters, 3);
    assert_eq!(config.csv_path, PathBuf::from("data/x.csv"));
    // Other fields should have defaults
    assert_eq!(config.top_matches, 20);
    assert_eq!(config.chart_columns.len(), 2);
  }

  #[test]
  fn test_config_load_nonexistent_file() {
    let result = Config::load_from_file("nonexistent.json");
    assert!(matches!(result, Err(ConfigError::Io { .. })));
  }

  #[test]
  fn test_config_load_invalid_json() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("invalid.json");
    fs::write(&config_path, "{ invalid json }").unwrap();

    let result = Config::load_from_file(&config_path);
    assert!(matches!(result, Err(ConfigError::Parse { .. })));
  }

  #[test]
  fn test_discover_prefers_explicit_path() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("custom.json");
    fs::write(&config_path, r#"{ "top_matches": 7 }"#).unwrap();

    let config = Config::discover(Some(&config_path)).unwrap();
    assert_eq!(config.top_matches, 7);
  }
}
