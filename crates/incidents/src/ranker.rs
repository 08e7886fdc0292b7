//! Tag similarity ranking.
//!
//! Every query rebuilds the term-frequency space from the corpus, scores each
//! row against the query by cosine similarity and keeps the best rows. Nothing
//! is cached between queries.

use std::cmp::Ordering;

use crate::dataset::Incident;
use crate::tags;
use crate::vectorizer::CountVectorizer;

/// Rows returned for a query unless configured otherwise
pub const DEFAULT_LIMIT: usize = 20;

/// A row that carries a stored, serialized tag list
pub trait Tagged {
  fn raw_tags(&self) -> Option<&str>;
}

impl Tagged for Incident {
  fn raw_tags(&self) -> Option<&str> {
    self.short_tags.as_deref()
  }
}

/// Ranked rows with their index-aligned scores, best first
#[derive(Debug)]
pub struct Matches<'a, T> {
  pub rows: Vec<&'a T>,
  pub scores: Vec<f64>,
}

impl<'a, T> Matches<'a, T> {
  pub fn empty() -> Self {
    Self { rows: Vec::new(), scores: Vec::new() }
  }

  pub fn len(&self) -> usize {
    self.rows.len()
  }

  pub fn is_empty(&self) -> bool {
    self.rows.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = (&'a T, f64)> + '_ {
    self.rows.iter().copied().zip(self.scores.iter().copied())
  }
}

/// Rank `corpus` rows by tag similarity to `query`, keeping at most `limit`.
///
/// A query without any usable tag returns no rows and builds no vectors.
/// Rows whose tag list cannot be read score 0. Equal scores keep corpus order.
pub fn rank<'a, T: Tagged>(query: &str, corpus: &'a [T], limit: usize) -> Matches<'a, T> {
  let query_tags = tags::normalize(Some(query));
  if query_tags.is_empty() {
    tracing::debug!(query, "query has no tags");
    return Matches::empty();
  }

  let documents: Vec<String> =
    corpus.iter().map(|row| tags::tags_or_empty(row.raw_tags()).join(" ")).collect();
  let (vectorizer, rows) = CountVectorizer::fit_transform(&documents);
  let query_vector = vectorizer.transform(&query_tags.join(" "));

  let similarities: Vec<f64> = rows.iter().map(|row| query_vector.cosine(row)).collect();

  let mut order: Vec<usize> = (0..corpus.len()).collect();
  // stable: ties keep corpus order
  order.sort_by(|a, b| {
    similarities[*b].partial_cmp(&similarities[*a]).unwrap_or(Ordering::Equal)
  });
  order.truncate(limit);

  tracing::debug!(
    query,
    tags = ?query_tags,
    vocabulary = vectorizer.vocabulary_len(),
    kept = order.len(),
    "ranked corpus"
  );

  Matches {
    rows: order.iter().map(|&i| &corpus[i]).collect(),
    scores: order.iter().map(|&i| similarities[i]).collect(),
  }
}
