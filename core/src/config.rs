use crate::dictionary::MAX_VOCABULARY;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Inputs above this many bytes are extracted on a worker thread under `timeout_secs`.
    pub large_input_threshold: usize,
    pub timeout_secs: u64,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self { large_input_threshold: 4_000_000, timeout_secs: 120 }
    }
}

impl ExtractConfig {
    pub fn timeout(&self) -> Duration { Duration::from_secs(self.timeout_secs) }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeConfig {
    /// Raw tokens longer than this are dropped before any other filter.
    pub max_raw_len: usize,
    /// Bounds on the stemmed form.
    pub min_len: usize,
    pub max_len: usize,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self { max_raw_len: 32, min_len: 3, max_len: 14 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub extract: ExtractConfig,
    pub normalize: NormalizeConfig,
    pub vocabulary_size: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            extract: ExtractConfig::default(),
            normalize: NormalizeConfig::default(),
            vocabulary_size: 10_000,
        }
    }
}

impl PipelineConfig {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path.as_ref())?);
        let cfg: PipelineConfig = serde_json::from_reader(reader)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.vocabulary_size == 0 {
            return Err(Error::Config("vocabulary_size must be positive".into()));
        }
        if self.vocabulary_size > MAX_VOCABULARY {
            return Err(Error::Config(format!("vocabulary_size is capped at {MAX_VOCABULARY}")));
        }
        let n = &self.normalize;
        if n.min_len > n.max_len {
            return Err(Error::Config(format!("min_len {} exceeds max_len {}", n.min_len, n.max_len)));
        }
        Ok(())
    }
}
