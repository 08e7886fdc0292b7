//! Bag-of-words vector spaces.
//!
//! [`CountVectorizer`] keeps raw term counts over whitespace-split tokens and
//! is what the tag search runs on. [`TfidfVectorizer`] weights word tokens by
//! inverse document frequency and is used to spot near-duplicate notes.

use regex::Regex;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::LazyLock;

static TFIDF_TOKEN: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"\b\w\w+\b").expect("valid token pattern"));

/// Term weights keyed by vocabulary index. Absent entries are zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
  weights: BTreeMap<usize, f64>,
}

impl SparseVector {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn add(&mut self, index: usize, weight: f64) {
    *self.weights.entry(index).or_insert(0.0) += weight;
  }

  pub fn get(&self, index: usize) -> f64 {
    self.weights.get(&index).copied().unwrap_or(0.0)
  }

  pub fn is_zero(&self) -> bool {
    self.weights.values().all(|w| *w == 0.0)
  }

  pub fn dot(&self, other: &SparseVector) -> f64 {
    let (small, large) =
      if self.weights.len() <= other.weights.len() { (self, other) } else { (other, self) };
    small.weights.iter().map(|(index, w)| w * large.get(*index)).sum()
  }

  pub fn magnitude(&self) -> f64 {
    self.weights.values().map(|w| w * w).sum::<f64>().sqrt()
  }

  /// Scale to unit length; the zero vector stays zero
  pub fn normalized(mut self) -> Self {
    let magnitude = self.magnitude();
    if magnitude > 0.0 {
      for weight in self.weights.values_mut() {
        *weight /= magnitude;
      }
    }
    self
  }

  /// Cosine of the angle between two vectors, 0 when either one is zero.
  ///
  /// Weights in this crate are never negative, so the result is kept in [0, 1].
  pub fn cosine(&self, other: &SparseVector) -> f64 {
    let magnitude_a = self.magnitude();
    let magnitude_b = other.magnitude();

    if magnitude_a == 0.0 || magnitude_b == 0.0 {
      0.0
    } else {
      (self.dot(other) / (magnitude_a * magnitude_b)).clamp(0.0, 1.0)
    }
  }
}

/// Raw term-frequency space over whitespace-delimited tokens.
///
/// Tokens are taken as they are: no case folding, stemming or stop words.
#[derive(Debug, Clone, Default)]
pub struct CountVectorizer {
  vocabulary: HashMap<String, usize>,
}

impl CountVectorizer {
  /// Learn the vocabulary of `documents`, indexed in sorted token order
  pub fn fit<S: AsRef<str>>(documents: &[S]) -> Self {
    let terms: BTreeSet<&str> =
      documents.iter().flat_map(|doc| doc.as_ref().split_whitespace()).collect();
    let vocabulary = terms.into_iter().enumerate().map(|(i, t)| (t.to_string(), i)).collect();
    Self { vocabulary }
  }

  pub fn fit_transform<S: AsRef<str>>(documents: &[S]) -> (Self, Vec<SparseVector>) {
    let vectorizer = Self::fit(documents);
    let vectors = documents.iter().map(|doc| vectorizer.transform(doc.as_ref())).collect();
    (vectorizer, vectors)
  }

  /// Count the known tokens of `document`; unknown tokens are ignored
  pub fn transform(&self, document: &str) -> SparseVector {
    let mut vector = SparseVector::new();
    for token in document.split_whitespace() {
      if let Some(&index) = self.vocabulary.get(token) {
        vector.add(index, 1.0);
      }
    }
    vector
  }

  pub fn vocabulary_len(&self) -> usize {
    self.vocabulary.len()
  }

  pub fn index_of(&self, term: &str) -> Option<usize> {
    self.vocabulary.get(term).copied()
  }
}

/// TF-IDF space over lowercase word tokens of two or more characters.
///
/// Uses smoothed idf, `ln((1 + n) / (1 + df)) + 1`, and L2-normalized rows.
#[derive(Debug, Clone, Default)]
pub struct TfidfVectorizer {
  vocabulary: HashMap<String, usize>,
  idf: Vec<f64>,
}

impl TfidfVectorizer {
  fn tokenize(document: &str) -> Vec<String> {
    let lowered = document.to_lowercase();
    TFIDF_TOKEN.find_iter(&lowered).map(|m| m.as_str().to_string()).collect()
  }

  pub fn fit<S: AsRef<str>>(documents: &[S]) -> Self {
    let mut doc_freq: BTreeMap<String, usize> = BTreeMap::new();
    for doc in documents {
      let unique: BTreeSet<String> = Self::tokenize(doc.as_ref()).into_iter().collect();
      for term in unique {
        *doc_freq.entry(term).or_insert(0) += 1;
      }
    }

    let n = documents.len() as f64;
    let mut vocabulary = HashMap::with_capacity(doc_freq.len());
    let mut idf = Vec::with_capacity(doc_freq.len());
    for (index, (term, df)) in doc_freq.into_iter().enumerate() {
      idf.push(((1.0 + n) / (1.0 + df as f64)).ln() + 1.0);
      vocabulary.insert(term, index);
    }

    Self { vocabulary, idf }
  }

  pub fn fit_transform<S: AsRef<str>>(documents: &[S]) -> (Self, Vec<SparseVector>) {
    let vectorizer = Self::fit(documents);
    let vectors = documents.iter().map(|doc| vectorizer.transform(doc.as_ref())).collect();
    (vectorizer, vectors)
  }

  pub fn transform(&self, document: &str) -> SparseVector {
    let mut counts = SparseVector::new();
    for token in Self::tokenize(document) {
      if let Some(&index) = self.vocabulary.get(&token) {
        counts.add(index, 1.0);
      }
    }

    let mut weighted = SparseVector::new();
    for (index, count) in counts.weights {
      weighted.add(index, count * self.idf[index]);
    }
    weighted.normalized()
  }

  pub fn vocabulary_len(&self) -> usize {
    self.vocabulary.len()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
  }

  #[test]
  fn test_count_vocabulary_is_case_sensitive_and_sorted() {
    let vectorizer = CountVectorizer::fit(&["db Timeout", "db timeout"]);
    assert_eq!(vectorizer.vocabulary_len(), 3);
    assert_eq!(vectorizer.index_of("Timeout"), Some(0));
    assert_eq!(vectorizer.index_of("db"), Some(1));
    assert_eq!(vectorizer.index_of("timeout"), Some(2));
  }

  #[test]
  fn test_count_transform_counts_and_ignores_unknown() {
    let vectorizer = CountVectorizer::fit(&["a b", "b c"]);
    let vector = vectorizer.transform("b b zzz a");
    assert_eq!(vector.get(vectorizer.index_of("a").unwrap()), 1.0);
    assert_eq!(vector.get(vectorizer.index_of("b").unwrap()), 2.0);
    assert_eq!(vector.get(vectorizer.index_of("c").unwrap()), 0.0);
  }

  #[test]
  fn test_count_empty_corpus() {
    let (vectorizer, vectors) = CountVectorizer::fit_transform(&["", ""]);
    assert_eq!(vectorizer.vocabulary_len(), 0);
    assert!(vectors.iter().all(SparseVector::is_zero));
    assert!(vectorizer.transform("anything").is_zero());
  }

  #[test]
  fn test_cosine_identical_orthogonal_and_zero() {
    let (_, vectors) = CountVectorizer::fit_transform(&["db timeout", "db timeout", "network", ""]);
    assert!(approx(vectors[0].cosine(&vectors[1]), 1.0));
    assert_eq!(vectors[0].cosine(&vectors[2]), 0.0);
    assert_eq!(vectors[0].cosine(&vectors[3]), 0.0);
    assert_eq!(vectors[3].cosine(&vectors[3]), 0.0);
  }

  #[test]
  fn test_cosine_partial_overlap() {
    let (_, vectors) = CountVectorizer::fit_transform(&["db timeout", "db error"]);
    assert!(approx(vectors[0].cosine(&vectors[1]), 0.5));
  }

  #[test]
  fn test_tfidf_rows_are_unit_length() {
    let (_, vectors) =
      TfidfVectorizer::fit_transform(&["Restarted the service", "restarted service again", ""]);
    assert!(approx(vectors[0].magnitude(), 1.0));
    assert!(approx(vectors[1].magnitude(), 1.0));
    assert!(vectors[2].is_zero());
  }

  #[test]
  fn test_tfidf_skips_single_character_tokens() {
    let vectorizer = TfidfVectorizer::fit(&["a b cd"]);
    assert_eq!(vectorizer.vocabulary_len(), 1);
  }

  #[test]
  fn test_tfidf_smoothed_idf() {
    let vectorizer = TfidfVectorizer::fit(&["alpha beta", "alpha"]);
    // alpha appears everywhere: ln(3/3) + 1 = 1; beta: ln(3/2) + 1
    assert!(approx(vectorizer.idf[0], 1.0));
    assert!(approx(vectorizer.idf[1], (1.5f64).ln() + 1.0));
  }
}
