//! Incident dataset loading.
//!
//! The dataset is a CSV export with one incident per row. Only the columns
//! below are read; any other column (such as an unnamed index) is ignored and
//! empty cells are treated as missing values.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::tags;

pub const INCIDENT: &str = "Incident";
pub const SHORT_DESCRIPTION: &str = "Short_Description";
pub const LONG_DESCRIPTION: &str = "Long_Description";
pub const RESOLUTION_NOTES: &str = "Resolution_Notes";
pub const STATE: &str = "State";
pub const ASSIGNED_TO: &str = "Assigned_to";
pub const FINAL_CLUSTER: &str = "Final_Cluster";
pub const SHORT_TAGS: &str = "Short_Tags";

/// Columns the similarity search cannot run without
pub const SIMILARITY_COLUMNS: [&str; 2] = [SHORT_TAGS, FINAL_CLUSTER];

#[derive(Debug, Error)]
pub enum DatasetError {
  #[error("cannot open {path}: {source}")]
  Open {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
  #[error("malformed CSV: {0}")]
  Csv(#[from] csv::Error),
  #[error("required column '{0}' is missing")]
  MissingColumn(String),
}

/// One support incident
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Incident {
  #[serde(rename = "Incident")]
  pub incident: Option<String>,
  #[serde(rename = "Short_Description")]
  pub short_description: Option<String>,
  #[serde(rename = "Long_Description")]
  pub long_description: Option<String>,
  #[serde(rename = "Resolution_Notes")]
  pub resolution_notes: Option<String>,
  #[serde(rename = "State")]
  pub state: Option<String>,
  #[serde(rename = "Assigned_to")]
  pub assigned_to: Option<String>,
  #[serde(rename = "Final_Cluster")]
  pub final_cluster: Option<String>,
  /// Serialized tag list as stored in the file
  #[serde(rename = "Short_Tags")]
  pub short_tags: Option<String>,
}

impl Incident {
  /// Value of a column by its header name
  pub fn field(&self, column: &str) -> Option<&str> {
    let value = match column {
      INCIDENT => &self.incident,
      SHORT_DESCRIPTION => &self.short_description,
      LONG_DESCRIPTION => &self.long_description,
      RESOLUTION_NOTES => &self.resolution_notes,
      STATE => &self.state,
      ASSIGNED_TO => &self.assigned_to,
      FINAL_CLUSTER => &self.final_cluster,
      SHORT_TAGS => &self.short_tags,
      _ => return None,
    };
    value.as_deref()
  }

  /// Stored tags, empty when the column is missing or unreadable
  pub fn tags(&self) -> Vec<String> {
    tags::tags_or_empty(self.short_tags.as_deref())
  }
}

/// A loaded incident table
#[derive(Debug, Clone, Default)]
pub struct Dataset {
  headers: Vec<String>,
  incidents: Vec<Incident>,
}

impl Dataset {
  pub fn new(headers: Vec<String>, incidents: Vec<Incident>) -> Self {
    Self { headers, incidents }
  }

  /// Load a CSV file; either every row loads or the whole load fails
  pub fn load(path: &Path) -> Result<Self, DatasetError> {
    let file = File::open(path)
      .map_err(|source| DatasetError::Open { path: path.to_path_buf(), source })?;
    let dataset = Self::from_reader(file)?;
    tracing::info!(path = %path.display(), rows = dataset.len(), "loaded dataset");
    Ok(dataset)
  }

  pub fn from_reader<R: Read>(reader: R) -> Result<Self, DatasetError> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::Headers).from_reader(reader);
    let headers = csv_reader.headers()?.iter().map(String::from).collect();
    let incidents = csv_reader.deserialize().collect::<Result<Vec<Incident>, _>>()?;
    Ok(Self { headers, incidents })
  }

  pub fn headers(&self) -> &[String] {
    &self.headers
  }

  pub fn incidents(&self) -> &[Incident] {
    &self.incidents
  }

  pub fn len(&self) -> usize {
    self.incidents.len()
  }

  pub fn is_empty(&self) -> bool {
    self.incidents.is_empty()
  }

  pub fn has_column(&self, column: &str) -> bool {
    self.headers.iter().any(|h| h == column)
  }

  /// Similarity columns absent from the header, in declaration order
  pub fn missing_similarity_columns(&self) -> Vec<&'static str> {
    SIMILARITY_COLUMNS.iter().copied().filter(|c| !self.has_column(c)).collect()
  }

  pub fn supports_similarity(&self) -> bool {
    self.missing_similarity_columns().is_empty()
  }
}

/// Recompute the stored tag column from each short description.
///
/// Every other column is copied through unchanged and the tag column is
/// appended when the input has none. Returns the number of rows written.
pub fn retag(input: &Path, output: &Path) -> Result<usize, DatasetError> {
  let file = File::open(input)
    .map_err(|source| DatasetError::Open { path: input.to_path_buf(), source })?;
  let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::Headers).from_reader(file);

  let mut headers = reader.headers()?.clone();
  let description = headers
    .iter()
    .position(|h| h == SHORT_DESCRIPTION)
    .ok_or_else(|| DatasetError::MissingColumn(SHORT_DESCRIPTION.to_string()))?;
  let existing_tags = headers.iter().position(|h| h == SHORT_TAGS);
  if existing_tags.is_none() {
    headers.push_field(SHORT_TAGS);
  }

  // Read everything first so the output may overwrite the input.
  let records = reader.records().collect::<Result<Vec<_>, _>>()?;

  let mut writer = csv::Writer::from_path(output)?;
  writer.write_record(&headers)?;
  for record in &records {
    let text = record.get(description).filter(|d| !d.is_empty());
    let serialized = tags::format_tag_list(&tags::normalize(text));

    let row: Vec<&str> = match existing_tags {
      Some(column) => record
        .iter()
        .enumerate()
        .map(|(i, value)| if i == column { serialized.as_str() } else { value })
        .collect(),
      None => record.iter().chain(std::iter::once(serialized.as_str())).collect(),
    };
    writer.write_record(&row)?;
  }
  writer.flush().map_err(csv::Error::from)?;

  tracing::info!(rows = records.len(), output = %output.display(), "rewrote tag column");
  Ok(records.len())
}
