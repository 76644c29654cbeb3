//! Term-frequency / inverse-document-frequency vector space over listing
//! documents, with cosine similarity. Vocabulary is built per request from
//! the documents themselves, in input order, so indices are reproducible.

use std::collections::{HashMap, HashSet};

use crate::config::EMPTY_TEXT_SENTINEL;

/// Lowercased alphanumeric tokens. Punctuation splits, everything else drops.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// A fitted TF-IDF vocabulary: term → column index plus smoothed IDF weights.
/// Also used by the learned recommender, which persists a pre-fitted copy.
#[derive(Debug, Clone)]
pub struct TfIdf {
    vocab: HashMap<String, usize>,
    idf: Vec<f64>,
}

impl TfIdf {
    /// Fits vocabulary and IDF from tokenized documents.
    /// IDF(t) = ln((N + 1) / (DF(t) + 1)) + 1, smoothed so single-document
    /// corpora still produce finite weights.
    pub fn fit(docs: &[Vec<String>]) -> Self {
        let total_docs = docs.len() as f64;
        let mut doc_freq: HashMap<String, usize> = HashMap::new();
        let mut order: Vec<String> = Vec::new();
        for tokens in docs {
            let unique: HashSet<&String> = tokens.iter().collect();
            for token in unique {
                let entry = doc_freq.entry(token.clone()).or_insert(0);
                if *entry == 0 {
                    order.push(token.clone());
                }
                *entry += 1;
            }
        }

        let mut vocab = HashMap::with_capacity(order.len());
        let mut idf = Vec::with_capacity(order.len());
        for (idx, term) in order.into_iter().enumerate() {
            let df = doc_freq[&term] as f64;
            idf.push(((total_docs + 1.0) / (df + 1.0)).ln() + 1.0);
            vocab.insert(term, idx);
        }
        Self { vocab, idf }
    }

    /// Restores a fitted vocabulary from persisted artifacts. Terms are
    /// indexed by their position in `terms`.
    pub fn from_parts(terms: Vec<String>, idf: Vec<f64>) -> Self {
        let vocab = terms
            .into_iter()
            .enumerate()
            .map(|(idx, term)| (term, idx))
            .collect();
        Self { vocab, idf }
    }

    pub fn vocab_len(&self) -> usize {
        self.idf.len()
    }

    /// Length-normalized TF weighted by IDF. Out-of-vocabulary tokens are
    /// ignored; an all-unknown document yields the zero vector.
    pub fn transform(&self, tokens: &[String]) -> Vec<f64> {
        let mut counts = vec![0.0f64; self.idf.len()];
        let mut hits = 0.0f64;
        for token in tokens {
            if let Some(&idx) = self.vocab.get(token) {
                counts[idx] += 1.0;
                hits += 1.0;
            }
        }
        if hits > 0.0 {
            for (idx, count) in counts.iter_mut().enumerate() {
                *count = (*count / hits) * self.idf[idx];
            }
        }
        counts
    }
}

/// Cosine similarity of two equal-length vectors; 0.0 when either is zero
/// so degenerate documents never produce NaN.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f64 = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

/// Similarity of document 0 (the target) against every other document.
/// Blank documents are replaced with a sentinel token before vectorization.
/// Fewer than two documents falls back to a defined neutral row.
pub fn target_similarities(documents: &[String]) -> Vec<f64> {
    if documents.len() < 2 {
        return vec![1.0; documents.len()];
    }

    let tokenized: Vec<Vec<String>> = documents
        .iter()
        .map(|doc| {
            let tokens = tokenize(doc);
            if tokens.is_empty() {
                vec![EMPTY_TEXT_SENTINEL.to_string()]
            } else {
                tokens
            }
        })
        .collect();

    let model = TfIdf::fit(&tokenized);
    if model.vocab_len() == 0 {
        // Nothing vectorizable at all: neutral, not an error.
        return vec![0.0; documents.len()];
    }

    let target_vec = model.transform(&tokenized[0]);
    tokenized
        .iter()
        .map(|tokens| cosine_similarity(&target_vec, &model.transform(tokens)))
        .collect()
}
