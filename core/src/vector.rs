use crate::dictionary::{Dictionary, TermId};
use crate::document::TokenDocument;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use time::format_description::well_known::Rfc3339;

pub const CORPUS_FORMAT_VERSION: u32 = 1;

/// Term counts of one document. `indices` strictly increasing, every value > 0.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SparseVector {
    pub dimension: u32,
    pub indices: Vec<TermId>,
    pub values: Vec<u32>,
}

impl SparseVector {
    pub fn empty(dimension: u32) -> Self {
        Self { dimension, indices: Vec::new(), values: Vec::new() }
    }

    fn from_counts(dimension: u32, counts: BTreeMap<TermId, u32>) -> Self {
        let (indices, values) = counts.into_iter().unzip();
        Self { dimension, indices, values }
    }

    /// Number of non-zero entries.
    pub fn len(&self) -> usize { self.indices.len() }

    pub fn is_empty(&self) -> bool { self.indices.is_empty() }

    pub fn total(&self) -> u64 { self.values.iter().map(|&v| v as u64).sum() }

    pub fn get(&self, index: TermId) -> u32 {
        self.indices.binary_search(&index).map_or(0, |pos| self.values[pos])
    }

    pub fn iter(&self) -> impl Iterator<Item = (TermId, u32)> + '_ {
        self.indices.iter().copied().zip(self.values.iter().copied())
    }
}

/// Count in-vocabulary tokens; out-of-vocabulary tokens are dropped.
pub fn vectorize(document: &TokenDocument, dictionary: &Dictionary) -> SparseVector {
    let mut counts: BTreeMap<TermId, u32> = BTreeMap::new();
    for term in document.terms() {
        if let Some(index) = dictionary.index_of(term) {
            *counts.entry(index).or_insert(0) += 1;
        }
    }
    SparseVector::from_counts(dictionary.len() as TermId, counts)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusMeta {
    pub num_docs: usize,
    pub dimension: usize,
    pub created_at: String,
    pub version: u32,
}

/// Vectorized documents ready for model fitting. Holds no empty vectors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorCorpus {
    pub meta: CorpusMeta,
    pub ids: Vec<String>,
    pub vectors: Vec<SparseVector>,
}

impl VectorCorpus {
    pub fn len(&self) -> usize { self.vectors.len() }

    pub fn is_empty(&self) -> bool { self.vectors.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SparseVector)> + '_ {
        self.ids.iter().map(String::as_str).zip(self.vectors.iter())
    }
}

/// Vectorize every document in parallel, keeping corpus order and dropping empty vectors.
pub fn vectorize_corpus(documents: &[TokenDocument], dictionary: &Dictionary) -> VectorCorpus {
    let (ids, vectors): (Vec<String>, Vec<SparseVector>) = documents
        .par_iter()
        .map(|doc| (doc.id.clone(), vectorize(doc, dictionary)))
        .filter(|(_, vector)| !vector.is_empty())
        .unzip();
    let dropped = documents.len() - vectors.len();
    tracing::info!(kept = vectors.len(), dropped, dimension = dictionary.len(), "vectorized corpus");
    VectorCorpus {
        meta: CorpusMeta {
            num_docs: vectors.len(),
            dimension: dictionary.len(),
            created_at: time::OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_default(),
            version: CORPUS_FORMAT_VERSION,
        },
        ids,
        vectors,
    }
}
