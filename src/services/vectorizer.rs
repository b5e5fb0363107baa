//! TF-IDF vectorization of a single text field.
//!
//! Each field of the catalog gets its own fitted vectorizer: vocabulary,
//! document frequencies and IDF weights never leak between fields.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use super::stop_words::is_stop_word;

/// A sparse, L2-normalized term-weight vector.
///
/// Entries are sorted by term index; an empty vector is the zero vector.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
    entries: Vec<(u32, f32)>,
}

impl SparseVector {
    pub fn entries(&self) -> &[(u32, f32)] {
        &self.entries
    }

    pub fn is_zero(&self) -> bool {
        self.entries.is_empty()
    }

    /// Dot product of two sorted sparse vectors
    pub fn dot(&self, other: &SparseVector) -> f32 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0f32;
        while i < self.entries.len() && j < other.entries.len() {
            let (a_idx, a_w) = self.entries[i];
            let (b_idx, b_w) = other.entries[j];
            match a_idx.cmp(&b_idx) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += a_w * b_w;
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }
}

/// Fitted TF-IDF weighting for one text field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfIdfVectorizer {
    /// term → dimension index, assigned in lexicographic order
    vocabulary: BTreeMap<String, u32>,
    /// IDF weight per dimension
    idf: Vec<f32>,
    /// Number of documents the vectorizer was fitted on
    document_count: usize,
}

impl TfIdfVectorizer {
    /// Learns vocabulary and smoothed IDF weights from a corpus
    pub fn fit<S: AsRef<str>>(documents: &[S]) -> Self {
        let n = documents.len();
        let mut doc_freq: BTreeMap<String, usize> = BTreeMap::new();

        for doc in documents {
            let unique: BTreeSet<String> = tokenize(doc.as_ref()).collect();
            for term in unique {
                *doc_freq.entry(term).or_insert(0) += 1;
            }
        }

        let mut vocabulary = BTreeMap::new();
        let mut idf = Vec::with_capacity(doc_freq.len());
        for (idx, (term, df)) in doc_freq.into_iter().enumerate() {
            // ln((1 + n) / (1 + df)) + 1
            let weight = ((1.0 + n as f64) / (1.0 + df as f64)).ln() + 1.0;
            vocabulary.insert(term, idx as u32);
            idf.push(weight as f32);
        }

        Self {
            vocabulary,
            idf,
            document_count: n,
        }
    }

    /// Fits on a corpus and returns the vector of every document, in corpus order
    pub fn fit_transform<S: AsRef<str>>(documents: &[S]) -> (Self, Vec<SparseVector>) {
        let vectorizer = Self::fit(documents);
        let vectors = documents
            .iter()
            .map(|doc| vectorizer.transform(doc.as_ref()))
            .collect();
        (vectorizer, vectors)
    }

    /// Vectorizes text against the fitted vocabulary; unknown terms are ignored
    pub fn transform(&self, text: &str) -> SparseVector {
        let mut counts: HashMap<u32, f32> = HashMap::new();
        for term in tokenize(text) {
            if let Some(&idx) = self.vocabulary.get(&term) {
                *counts.entry(idx).or_insert(0.0) += 1.0;
            }
        }

        let mut entries: Vec<(u32, f32)> = counts
            .into_iter()
            .map(|(idx, tf)| (idx, tf * self.idf[idx as usize]))
            .collect();
        entries.sort_unstable_by_key(|&(idx, _)| idx);

        let norm = entries.iter().map(|(_, w)| w * w).sum::<f32>().sqrt();
        if norm > 0.0 {
            for (_, w) in entries.iter_mut() {
                *w /= norm;
            }
        }

        SparseVector { entries }
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn document_count(&self) -> usize {
        self.document_count
    }

    pub fn idf(&self, term: &str) -> Option<f32> {
        self.vocabulary
            .get(term)
            .map(|&idx| self.idf[idx as usize])
    }
}

/// Lowercases and splits on anything but alphanumerics and `_`.
///
/// Single-character tokens and stop words are dropped.
pub fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|token| token.chars().nth(1).is_some())
        .map(str::to_lowercase)
        .filter(|token| !is_stop_word(token))
}
