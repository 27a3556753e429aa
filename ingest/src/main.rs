use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use topicvec_core::persist::load_dictionary;
use topicvec_core::{CachePaths, Pipeline, PipelineConfig};
use tracing_subscriber::{fmt, EnvFilter};
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "ingest")]
#[command(about = "Turn web-archive crawls into sparse term-count vectors", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a vector corpus from WARC files or a directory of them
    Build {
        /// Input path (file or directory)
        #[arg(long)]
        input: String,
        /// Dictionary location: loaded when present, written otherwise
        #[arg(long)]
        dictionary: Option<PathBuf>,
        /// Vector corpus location: loaded when present, written otherwise
        #[arg(long)]
        corpus: Option<PathBuf>,
        /// Number of terms kept in the dictionary
        #[arg(long)]
        vocabulary_size: Option<usize>,
        /// JSON pipeline configuration
        #[arg(long)]
        config: Option<PathBuf>,
        /// Worker threads (defaults to one per core)
        #[arg(long)]
        threads: Option<usize>,
    },
    /// Print the highest-ranked dictionary terms
    Terms {
        #[arg(long)]
        dictionary: PathBuf,
        #[arg(long, default_value_t = 20)]
        top: usize,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { input, dictionary, corpus, vocabulary_size, config, threads } => {
            if let Some(n) = threads {
                rayon::ThreadPoolBuilder::new().num_threads(n).build_global()?;
            }
            let config = load_config(config.as_deref(), vocabulary_size)?;
            build(&input, config, CachePaths { dictionary, corpus })
        }
        Commands::Terms { dictionary, top } => terms(&dictionary, top),
    }
}

fn load_config(path: Option<&Path>, vocabulary_size: Option<usize>) -> Result<PipelineConfig> {
    let mut config = match path {
        Some(p) => PipelineConfig::from_json_file(p).with_context(|| format!("reading config {}", p.display()))?,
        None => PipelineConfig::default(),
    };
    if let Some(n) = vocabulary_size {
        config.vocabulary_size = n;
    }
    config.validate()?;
    Ok(config)
}

fn build(input: &str, config: PipelineConfig, cache: CachePaths) -> Result<()> {
    let files = collect_inputs(Path::new(input));
    let cached = cache.corpus.as_ref().is_some_and(|p| p.exists());
    if files.is_empty() && !cached {
        bail!("no .warc or .warc.gz files under {input}");
    }
    tracing::info!(files = files.len(), vocabulary_size = config.vocabulary_size, "building corpus");

    let corpus = Pipeline::new(config).run(&files, &cache)?;
    let nnz: usize = corpus.vectors.iter().map(|v| v.len()).sum();
    tracing::info!(
        documents = corpus.len(),
        dimension = corpus.meta.dimension,
        nonzeros = nnz,
        "corpus ready"
    );
    Ok(())
}

fn terms(path: &Path, top: usize) -> Result<()> {
    let dict = load_dictionary(path).with_context(|| format!("reading dictionary {}", path.display()))?;
    for (index, term, freq) in dict.iter().take(top) {
        println!("{index}\t{term}\t{freq}");
    }
    Ok(())
}

fn collect_inputs(input: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = Vec::new();
    if input.is_dir() {
        for entry in WalkDir::new(input).into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() && is_archive(p) {
                files.push(p.to_path_buf());
            }
        }
        // Corpus order decides dictionary ties, so keep it stable.
        files.sort();
    } else if input.is_file() {
        files.push(input.to_path_buf());
    }
    files
}

fn is_archive(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .is_some_and(|name| name.ends_with(".warc") || name.ends_with(".warc.gz"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn walks_directories_for_archives_in_order() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("b")).unwrap();
        for name in ["b/2.warc.gz", "a.warc", "notes.txt", "b/1.warc", "c.gz"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        let found: Vec<_> = collect_inputs(dir.path())
            .into_iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(found, vec!["a.warc", "b/1.warc", "b/2.warc.gz"]);
    }

    #[test]
    fn single_file_is_taken_as_is() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("crawl.bin");
        fs::write(&file, b"").unwrap();
        assert_eq!(collect_inputs(&file), vec![file]);
    }

    #[test]
    fn flag_overrides_config_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pipeline.json");
        fs::write(&path, r#"{"vocabulary_size": 50}"#).unwrap();
        assert_eq!(load_config(Some(&path), None).unwrap().vocabulary_size, 50);
        assert_eq!(load_config(Some(&path), Some(7)).unwrap().vocabulary_size, 7);
        assert!(load_config(None, Some(0)).is_err());
    }

    #[test]
    fn cli_parses_build_flags() {
        let cli = Cli::try_parse_from([
            "ingest", "build", "--input", "crawl", "--dictionary", "d.bin", "--vocabulary-size", "100",
        ])
        .unwrap();
        match cli.command {
            Commands::Build { input, dictionary, vocabulary_size, corpus, .. } => {
                assert_eq!(input, "crawl");
                assert_eq!(dictionary, Some(PathBuf::from("d.bin")));
                assert_eq!(vocabulary_size, Some(100));
                assert!(corpus.is_none());
            }
            Commands::Terms { .. } => panic!("expected build"),
        }
    }
}
