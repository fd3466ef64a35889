//! TF-IDF term weighting over short texts.
//!
//! Tokens are lowercase alphanumeric runs of at least two characters. Terms are
//! n-grams of those tokens, from unigrams up to `max_ngram`. IDF is smoothed:
//!
//! ```text
//! idf(t) = ln((1 + n) / (1 + df(t))) + 1
//! ```
//!
//! Document vectors are raw term counts times IDF, L2-normalised.

use std::collections::{BTreeSet, HashMap, HashSet};

/// Sparse vector stored as `(dimension, weight)` pairs sorted by dimension
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    entries: Vec<(usize, f64)>,
}

impl SparseVector {
    /// Builds a vector from unsorted entries. Zero weights are dropped.
    pub fn from_entries(mut entries: Vec<(usize, f64)>) -> Self {
        entries.retain(|&(_, w)| w != 0.0);
        entries.sort_by_key(|&(dim, _)| dim);
        Self { entries }
    }

    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }

    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    pub fn is_zero(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn norm(&self) -> f64 {
        self.entries.iter().map(|&(_, w)| w * w).sum::<f64>().sqrt()
    }

    pub fn dot(&self, other: &SparseVector) -> f64 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0;
        while i < self.entries.len() && j < other.entries.len() {
            let (a_dim, a_w) = self.entries[i];
            let (b_dim, b_w) = other.entries[j];
            match a_dim.cmp(&b_dim) {
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

    fn normalize(&mut self) {
        let norm = self.norm();
        if norm > 0.0 {
            for (_, w) in &mut self.entries {
                *w /= norm;
            }
        }
    }
}

/// Cosine similarity of two sparse vectors. A zero vector is orthogonal to everything.
pub fn cosine_similarity(a: &SparseVector, b: &SparseVector) -> f64 {
    let norm_a = a.norm();
    let norm_b = b.norm();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    a.dot(b) / (norm_a * norm_b)
}

/// Vocabulary and IDF weights fitted once over a corpus
#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    max_ngram: usize,
}

impl TfidfVectorizer {
    /// Fits vocabulary and IDF over `documents`. An empty corpus yields an
    /// empty vocabulary, which maps every text to the zero vector.
    pub fn fit<S: AsRef<str>>(documents: &[S], max_ngram: usize) -> Self {
        let max_ngram = max_ngram.max(1);
        let n_docs = documents.len() as f64;

        let mut doc_freq: HashMap<String, usize> = HashMap::new();
        for doc in documents {
            let unique: HashSet<String> = terms(doc.as_ref(), max_ngram).into_iter().collect();
            for term in unique {
                *doc_freq.entry(term).or_insert(0) += 1;
            }
        }

        // Dimensions follow lexical term order so the layout is reproducible.
        let sorted: BTreeSet<&String> = doc_freq.keys().collect();
        let mut vocabulary = HashMap::with_capacity(sorted.len());
        let mut idf = Vec::with_capacity(sorted.len());
        for (dim, term) in sorted.into_iter().enumerate() {
            let df = doc_freq[term] as f64;
            idf.push(((1.0 + n_docs) / (1.0 + df)).ln() + 1.0);
            vocabulary.insert(term.clone(), dim);
        }

        Self {
            vocabulary,
            idf,
            max_ngram,
        }
    }

    /// Maps `text` into the fitted space. Unknown terms carry no weight.
    pub fn transform(&self, text: &str) -> SparseVector {
        let mut counts: HashMap<usize, f64> = HashMap::new();
        for term in terms(text, self.max_ngram) {
            if let Some(&dim) = self.vocabulary.get(&term) {
                *counts.entry(dim).or_insert(0.0) += 1.0;
            }
        }

        let mut vector = SparseVector::from_entries(
            counts
                .into_iter()
                .map(|(dim, count)| (dim, count * self.idf[dim]))
                .collect(),
        );
        vector.normalize();
        vector
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn idf(&self, term: &str) -> Option<f64> {
        self.vocabulary.get(term).map(|&dim| self.idf[dim])
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| token.chars().count() >= 2)
        .map(str::to_string)
        .collect()
}

fn terms(text: &str, max_ngram: usize) -> Vec<String> {
    let tokens = tokenize(text);
    let mut terms = Vec::new();
    for n in 1..=max_ngram {
        terms.extend(tokens.windows(n).map(|window| window.join(" ")));
    }
    terms
}
