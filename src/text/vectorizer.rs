//! TF-IDF bag-of-n-grams vectorization.
//!
//! `fit` learns a capped vocabulary with IDF weights from a normalized
//! corpus; `transform` maps documents onto that fixed vocabulary. The fitted
//! state is plain data (term list + IDF table) so it serializes
//! deterministically inside the model artifact; the term lookup map is
//! rebuilt after deserialization.

use std::collections::{HashMap, HashSet};

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use crate::config::VectorizerConfig;
use crate::error::{PipelineError, Result};

/// One vectorized document: (column index, weight) pairs sorted by index.
/// Absent columns are zero.
pub type SparseRow = Vec<(usize, f64)>;

lazy_static! {
    /// English stop words removed before n-gram formation.
    static ref STOP_WORDS: HashSet<&'static str> = [
        "the", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of",
        "with", "by", "from", "as", "is", "are", "was", "were", "be", "been",
        "being", "have", "has", "had", "do", "does", "did", "will", "would",
        "could", "should", "may", "might", "must", "can", "this", "that",
        "these", "those", "it", "its", "we", "you", "they", "he", "she",
        "his", "her", "their", "our", "your", "my", "me", "us", "them", "if",
        "then", "than", "so", "not", "no", "nor", "too", "very", "just",
        "about", "into", "over", "after", "before", "between", "out", "up",
        "down", "off", "all", "any", "both", "each", "few", "more", "most",
        "other", "some", "such", "only", "own", "same", "there", "here",
        "when", "where", "why", "how", "what", "which", "who", "whom",
    ]
    .iter()
    .copied()
    .collect();
}

/// TF-IDF vectorizer with a fixed, learned vocabulary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    config: VectorizerConfig,

    /// Vocabulary terms in column-index order.
    terms: Vec<String>,

    /// IDF weight per column, aligned with `terms`.
    idf: Vec<f64>,

    /// Term lookup, rebuilt from `terms` after deserialization.
    #[serde(skip)]
    index: HashMap<String, usize>,

    is_fitted: bool,
}

impl TfidfVectorizer {
    pub fn new(config: VectorizerConfig) -> Self {
        Self {
            config,
            terms: Vec::new(),
            idf: Vec::new(),
            index: HashMap::new(),
            is_fitted: false,
        }
    }

    /// Learn the vocabulary and IDF weights from a normalized corpus.
    ///
    /// Candidate terms are counted once per document; terms below `min_df`
    /// are dropped; survivors are ranked by document frequency (descending,
    /// lexicographic tiebreak) and capped at `max_features`. Column indices
    /// are assigned alphabetically over the kept terms. Re-fitting replaces
    /// the vocabulary entirely.
    pub fn fit(&mut self, corpus: &[String]) -> Result<()> {
        if corpus.is_empty() {
            return Err(PipelineError::Data(
                "cannot fit vectorizer on an empty corpus".to_string(),
            ));
        }

        let mut doc_freq: HashMap<String, usize> = HashMap::new();
        for document in corpus {
            let mut seen: HashSet<String> = HashSet::new();
            for term in self.extract_terms(document) {
                seen.insert(term);
            }
            for term in seen {
                *doc_freq.entry(term).or_insert(0) += 1;
            }
        }

        let mut ranked: Vec<(String, usize)> = doc_freq
            .into_iter()
            .filter(|(_, df)| *df >= self.config.min_df)
            .collect();
        if ranked.is_empty() {
            return Err(PipelineError::Data(format!(
                "vocabulary is empty after min_df={} pruning over {} documents",
                self.config.min_df,
                corpus.len()
            )));
        }
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(self.config.max_features);
        ranked.sort_by(|a, b| a.0.cmp(&b.0));

        let n_docs = corpus.len() as f64;
        self.terms = Vec::with_capacity(ranked.len());
        self.idf = Vec::with_capacity(ranked.len());
        self.index = HashMap::with_capacity(ranked.len());
        for (position, (term, df)) in ranked.into_iter().enumerate() {
            self.idf.push(((1.0 + n_docs) / (1.0 + df as f64)).ln() + 1.0);
            self.index.insert(term.clone(), position);
            self.terms.push(term);
        }
        self.is_fitted = true;
        Ok(())
    }

    /// Map a document onto the fitted vocabulary. Out-of-vocabulary terms
    /// contribute nothing. Rows are L2-normalized; all-OOV documents yield
    /// an empty (all-zero) row.
    pub fn transform_one(&self, document: &str) -> Result<SparseRow> {
        if !self.is_fitted {
            return Err(PipelineError::Data(
                "vectorizer has not been fitted".to_string(),
            ));
        }

        let mut counts: HashMap<usize, usize> = HashMap::new();
        for term in self.extract_terms(document) {
            if let Some(&column) = self.index.get(&term) {
                *counts.entry(column).or_insert(0) += 1;
            }
        }

        let mut row: SparseRow = counts
            .into_iter()
            .map(|(column, count)| (column, count as f64 * self.idf[column]))
            .collect();
        row.sort_by_key(|&(column, _)| column);

        let norm = row.iter().map(|&(_, w)| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for entry in &mut row {
                entry.1 /= norm;
            }
        }
        Ok(row)
    }

    /// Vectorize a batch of documents in order.
    pub fn transform(&self, documents: &[String]) -> Result<Vec<SparseRow>> {
        documents
            .iter()
            .map(|document| self.transform_one(document))
            .collect()
    }

    /// Number of vocabulary columns. Zero until fitted.
    pub fn vocabulary_size(&self) -> usize {
        self.terms.len()
    }

    /// Vocabulary terms in column order.
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// IDF weights in column order.
    pub fn idf(&self) -> &[f64] {
        &self.idf
    }

    pub fn config(&self) -> &VectorizerConfig {
        &self.config
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }

    /// Restore the term lookup after deserialization.
    pub(crate) fn rebuild_index(&mut self) {
        self.index = self
            .terms
            .iter()
            .enumerate()
            .map(|(position, term)| (term.clone(), position))
            .collect();
    }

    /// Tokenize and expand into n-grams within the configured range. Tokens
    /// are ASCII alphanumeric runs of length >= 2 with stop words removed;
    /// n-grams join tokens with `_`.
    fn extract_terms(&self, document: &str) -> Vec<String> {
        let tokens: Vec<&str> = document
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|t| t.len() >= 2 && !STOP_WORDS.contains(t))
            .collect();

        let (lo, hi) = self.config.ngram_range;
        let mut terms = Vec::new();
        for n in lo.max(1)..=hi.min(tokens.len()) {
            for window in tokens.windows(n) {
                if n == 1 {
                    terms.push(window[0].to_string());
                } else {
                    terms.push(window.join("_"));
                }
            }
        }
        terms
    }
}
