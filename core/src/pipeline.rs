use crate::archive::{self, ArchiveFile, Record};
use crate::config::PipelineConfig;
use crate::dictionary;
use crate::document::{Document, TextDocument, TokenDocument};
use crate::extract::TextExtractor;
use crate::normalize::Normalizer;
use crate::persist;
use crate::tokenizer::tokenize;
use crate::vector::{vectorize_corpus, VectorCorpus};
use crate::Result;
use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// Records decoded and held at once before they are turned into token documents.
const RECORD_BATCH: usize = 256;

/// Optional cache locations. Present files are loaded; absent ones are written after computing.
#[derive(Debug, Clone, Default)]
pub struct CachePaths {
    pub dictionary: Option<PathBuf>,
    pub corpus: Option<PathBuf>,
}

pub struct Pipeline {
    config: PipelineConfig,
    extractor: TextExtractor,
    normalizer: Normalizer,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        let extractor = TextExtractor::new(config.extract.clone());
        let normalizer = Normalizer::new(&config.normalize);
        Self { config, extractor, normalizer }
    }

    pub fn config(&self) -> &PipelineConfig { &self.config }

    /// Extraction, tokenization and normalization of one record. Stage failures
    /// leave an empty or sentinel token list instead of dropping the document.
    pub fn process_record(&self, record: &Record<'_>) -> TokenDocument {
        let html = Document::new(record.id.clone(), record.text());
        self.process_text(html.map(|html| self.extractor.extract(&html)))
    }

    pub fn process_text(&self, doc: TextDocument) -> TokenDocument {
        doc.map(|text| tokenize(&text)).map(|tokens| self.normalizer.normalize(tokens))
    }

    /// Token documents for the response records of one in-memory archive, in archive order.
    pub fn documents_from_bytes(&self, bytes: &[u8]) -> Result<Vec<TokenDocument>> {
        self.documents_from_records(archive::split(bytes))
    }

    /// Records are processed in parallel batches so only a bounded window of
    /// payloads is alive at once. Per-record faults are logged and skipped; a
    /// structural fault aborts.
    pub fn documents_from_records<'a, I>(&self, records: I) -> Result<Vec<TokenDocument>>
    where
        I: IntoIterator<Item = Result<Record<'a>>>,
    {
        let mut docs = Vec::new();
        let mut batch = Vec::with_capacity(RECORD_BATCH);
        let (mut seen, mut skipped) = (0usize, 0usize);
        for item in records {
            match item {
                Ok(record) => {
                    seen += 1;
                    batch.push(record);
                    if batch.len() == RECORD_BATCH {
                        self.flush(&mut batch, &mut docs);
                    }
                }
                Err(err) if err.is_recoverable() => {
                    skipped += 1;
                    tracing::warn!(error = %err, "skipping record");
                }
                Err(err) => return Err(err),
            }
        }
        self.flush(&mut batch, &mut docs);
        tracing::debug!(records = seen, skipped, "processed archive");
        Ok(docs)
    }

    fn flush(&self, batch: &mut Vec<Record<'_>>, docs: &mut Vec<TokenDocument>) {
        docs.par_extend(batch.par_iter().map(|r| self.process_record(r)));
        batch.clear();
    }

    pub fn documents_from_archives(&self, paths: &[PathBuf]) -> Result<Vec<TokenDocument>> {
        let mut docs = Vec::new();
        for path in paths {
            let found = match archive::open_archive(path)? {
                ArchiveFile::Empty => Vec::new(),
                ArchiveFile::Mapped(map) => self.documents_from_bytes(&map)?,
                ArchiveFile::Compressed(reader) => self.documents_from_records(archive::stream(reader))?,
            };
            tracing::info!(path = %path.display(), documents = found.len(), "read archive");
            docs.extend(found);
        }
        Ok(docs)
    }

    /// Archives to vector corpus, honouring the dictionary and corpus caches.
    pub fn run(&self, inputs: &[PathBuf], cache: &CachePaths) -> Result<VectorCorpus> {
        if let Some(corpus) = load_cached_corpus(cache.corpus.as_deref())? {
            return Ok(corpus);
        }
        let docs = self.documents_from_archives(inputs)?;
        let dictionary = dictionary::build_or_load(cache.dictionary.as_deref(), &docs, self.config.vocabulary_size)?;
        let corpus = vectorize_corpus(&docs, &dictionary);
        if let Some(path) = cache.corpus.as_deref() {
            persist::save_corpus(path, &corpus)?;
            tracing::info!(path = %path.display(), documents = corpus.len(), "saved corpus");
        }
        Ok(corpus)
    }
}

impl Default for Pipeline {
    fn default() -> Self { Self::new(PipelineConfig::default()) }
}

fn load_cached_corpus(location: Option<&Path>) -> Result<Option<VectorCorpus>> {
    match location {
        Some(path) if path.exists() => {
            let corpus = persist::load_corpus(path)?;
            tracing::info!(path = %path.display(), documents = corpus.len(), "loaded cached corpus");
            Ok(Some(corpus))
        }
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::borrow::Cow;

    #[test]
    fn text_flows_through_tokenize_and_normalize() {
        let pipeline = Pipeline::default();
        let doc = pipeline.process_text(Document::new("d", "The cats were running, 42 times!".to_string()));
        assert_eq!(doc.id, "d");
        assert_eq!(doc.content, vec!["cat", "run", "time"]);
    }

    #[test]
    fn records_are_extracted_first() {
        let pipeline = Pipeline::default();
        let record = Record {
            id: "<urn:uuid:1>".into(),
            uri: None,
            payload: Cow::Borrowed(b"<html><body><script>ignored()</script><p>Gardens &amp; flowers</p></body></html>"),
        };
        let doc = pipeline.process_record(&record);
        assert_eq!(doc.content, vec!["garden", "flower"]);
    }

    #[test]
    fn batches_keep_archive_order() {
        let pipeline = Pipeline::default();
        let records = (0..RECORD_BATCH * 2 + 3).map(|i| -> Result<Record<'static>> {
            Ok(Record { id: format!("<urn:uuid:{i}>"), uri: None, payload: Cow::Owned(b"<p>gardens</p>".to_vec()) })
        });
        let docs = pipeline.documents_from_records(records).unwrap();
        assert_eq!(docs.len(), RECORD_BATCH * 2 + 3);
        assert!(docs.iter().enumerate().all(|(i, d)| d.id == format!("<urn:uuid:{i}>")));
    }
}
