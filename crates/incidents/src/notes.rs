//! Near-duplicate detection for resolution notes.

use crate::vectorizer::TfidfVectorizer;

/// Notes more similar than this to some other note count as duplicates
pub const DUPLICATE_THRESHOLD: f64 = 0.9;

/// Indices of the notes that have no near-duplicate elsewhere in `notes`.
///
/// Missing notes are compared as empty text, which matches nothing. Notes
/// that duplicate each other are all left out, not just the later copies.
pub fn unique_notes(notes: &[Option<&str>]) -> Vec<usize> {
  let documents: Vec<&str> = notes.iter().map(|note| note.unwrap_or("")).collect();
  let (_, vectors) = TfidfVectorizer::fit_transform(&documents);

  (0..vectors.len())
    .filter(|&i| {
      !(0..vectors.len())
        .any(|j| i != j && vectors[i].cosine(&vectors[j]) > DUPLICATE_THRESHOLD)
    })
    .collect()
}
