pub mod archive;
pub mod config;
pub mod dictionary;
pub mod document;
pub mod error;
pub mod extract;
pub mod normalize;
pub mod persist;
pub mod pipeline;
pub mod solver;
pub mod stopwords;
pub mod tokenizer;
pub mod vector;

pub use archive::{open_archive, split, stream, ArchiveFile, ArchiveReader, Record, StreamReader};
pub use config::{ExtractConfig, NormalizeConfig, PipelineConfig};
pub use dictionary::{Dictionary, TermCounts, TermId};
pub use document::{Document, TextDocument, TokenDocument};
pub use error::{Error, Result};
pub use extract::{extract, TextExtractor};
pub use normalize::{normalize, Filter, Normalizer};
pub use pipeline::{CachePaths, Pipeline};
pub use solver::{ExpectationMaximization, IterativeSolver, SolveReport, SolverState};
pub use tokenizer::tokenize;
pub use vector::{vectorize, vectorize_corpus, CorpusMeta, SparseVector, VectorCorpus};
