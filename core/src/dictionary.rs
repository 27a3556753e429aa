//! Corpus-wide vocabulary.
//!
//! Construction is two passes. `TermCounts` tallies every term together with
//! the position of its first occurrence; partial tallies merge by summing
//! counts and keeping the earliest position, so documents can be counted in
//! any order or in parallel and still give the same result. Selection then
//! ranks terms by count (descending) and first occurrence (ascending) and
//! keeps the top `vocabulary_size`, numbering them densely in rank order.

use crate::document::TokenDocument;
use crate::persist;
use crate::Result;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

pub type TermId = u32;

/// Largest vocabulary whose indices and dimension all fit in a `TermId`.
pub const MAX_VOCABULARY: usize = TermId::MAX as usize;

/// (document position, token position) of a term's first occurrence.
type FirstSeen = (usize, usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TermStat {
    count: u64,
    first_seen: FirstSeen,
}

impl TermStat {
    fn absorb(&mut self, other: TermStat) {
        self.count += other.count;
        self.first_seen = self.first_seen.min(other.first_seen);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TermCounts {
    stats: HashMap<String, TermStat>,
}

impl TermCounts {
    pub fn new() -> Self { Self::default() }

    /// Count one document found at `position` in the corpus.
    pub fn add_document(&mut self, position: usize, doc: &TokenDocument) {
        for (offset, term) in doc.content.iter().enumerate() {
            if term.is_empty() {
                continue;
            }
            let stat = TermStat { count: 1, first_seen: (position, offset) };
            match self.stats.get_mut(term.as_str()) {
                Some(existing) => existing.absorb(stat),
                None => {
                    self.stats.insert(term.clone(), stat);
                }
            }
        }
    }

    pub fn merge(self, other: TermCounts) -> TermCounts {
        let (mut into, from) = if self.stats.len() >= other.stats.len() { (self, other) } else { (other, self) };
        for (term, stat) in from.stats {
            into.stats.entry(term).and_modify(|s| s.absorb(stat)).or_insert(stat);
        }
        into
    }

    pub fn from_documents(docs: &[TokenDocument]) -> Self {
        docs.par_iter()
            .enumerate()
            .fold(TermCounts::new, |mut acc, (position, doc)| {
                acc.add_document(position, doc);
                acc
            })
            .reduce(TermCounts::new, TermCounts::merge)
    }

    pub fn count(&self, term: &str) -> u64 { self.stats.get(term).map_or(0, |s| s.count) }

    pub fn len(&self) -> usize { self.stats.len() }

    pub fn is_empty(&self) -> bool { self.stats.is_empty() }

    /// Terms by count descending, ties by first occurrence.
    pub fn ranked(&self) -> Vec<(&str, u64)> {
        let mut entries: Vec<(&String, &TermStat)> = self.stats.iter().collect();
        entries.sort_by(|a, b| b.1.count.cmp(&a.1.count).then(a.1.first_seen.cmp(&b.1.first_seen)));
        entries.into_iter().map(|(term, stat)| (term.as_str(), stat.count)).collect()
    }
}

/// Bounded term → index mapping. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dictionary {
    term_to_index: HashMap<String, TermId>,
    term_frequency: HashMap<String, u64>,
    terms: Vec<String>,
}

impl Dictionary {
    pub fn build(documents: &[TokenDocument], vocabulary_size: usize) -> Self {
        let counts = TermCounts::from_documents(documents);
        let dict = Self::from_counts(&counts, vocabulary_size);
        tracing::info!(
            docs = documents.len(),
            distinct_terms = counts.len(),
            vocabulary = dict.len(),
            "built dictionary"
        );
        dict
    }

    pub fn from_counts(counts: &TermCounts, vocabulary_size: usize) -> Self {
        let mut dict = Dictionary::default();
        let ranked = counts.ranked().into_iter().take(vocabulary_size.min(MAX_VOCABULARY));
        for (index, (term, count)) in ranked.enumerate() {
            dict.term_to_index.insert(term.to_string(), index as TermId);
            dict.term_frequency.insert(term.to_string(), count);
            dict.terms.push(term.to_string());
        }
        dict
    }

    pub fn index_of(&self, term: &str) -> Option<TermId> { self.term_to_index.get(term).copied() }

    pub fn term(&self, index: TermId) -> Option<&str> { self.terms.get(index as usize).map(String::as_str) }

    /// Corpus frequency of a selected term.
    pub fn frequency(&self, term: &str) -> Option<u64> { self.term_frequency.get(term).copied() }

    pub fn term_to_index(&self) -> &HashMap<String, TermId> { &self.term_to_index }

    pub fn len(&self) -> usize { self.terms.len() }

    pub fn is_empty(&self) -> bool { self.terms.is_empty() }

    /// `(index, term, frequency)` in index order.
    pub fn iter(&self) -> impl Iterator<Item = (TermId, &str, u64)> + '_ {
        self.terms.iter().enumerate().map(move |(i, term)| {
            (i as TermId, term.as_str(), self.term_frequency.get(term).copied().unwrap_or(0))
        })
    }
}

/// Load the dictionary at `location` if one exists there; otherwise build it
/// and, when a location was given, write it.
pub fn build_or_load(location: Option<&Path>, documents: &[TokenDocument], vocabulary_size: usize) -> Result<Dictionary> {
    if let Some(path) = location {
        if path.exists() {
            let dict = persist::load_dictionary(path)?;
            tracing::info!(path = %path.display(), vocabulary = dict.len(), "loaded dictionary");
            return Ok(dict);
        }
    }
    let dict = Dictionary::build(documents, vocabulary_size);
    if let Some(path) = location {
        persist::save_dictionary(path, &dict)?;
        tracing::info!(path = %path.display(), "saved dictionary");
    }
    Ok(dict)
}
