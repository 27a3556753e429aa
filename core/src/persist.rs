use crate::{Dictionary, Result, VectorCorpus};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{create_dir_all, File};
use std::io::{Read, Write};
use std::path::Path;

fn save<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        create_dir_all(dir)?;
    }
    let mut f = File::create(path)?;
    let bytes = bincode::serialize(value)?;
    f.write_all(&bytes)?;
    Ok(())
}

fn load<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let mut f = File::open(path)?;
    let mut buf = Vec::new();
    f.read_to_end(&mut buf)?;
    let value = bincode::deserialize(&buf)?;
    Ok(value)
}

pub fn save_dictionary<P: AsRef<Path>>(path: P, dict: &Dictionary) -> Result<()> { save(path.as_ref(), dict) }

pub fn load_dictionary<P: AsRef<Path>>(path: P) -> Result<Dictionary> { load(path.as_ref()) }

pub fn save_corpus<P: AsRef<Path>>(path: P, corpus: &VectorCorpus) -> Result<()> { save(path.as_ref(), corpus) }

pub fn load_corpus<P: AsRef<Path>>(path: P) -> Result<VectorCorpus> { load(path.as_ref()) }
