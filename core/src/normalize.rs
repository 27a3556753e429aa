use crate::config::NormalizeConfig;
use crate::error::panic_message;
use crate::stopwords::is_stopword;
use crate::{Error, Result};
use lazy_static::lazy_static;
use rust_stemmers::{Algorithm, Stemmer};
use std::panic::{self, AssertUnwindSafe};

lazy_static! {
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
}

/// Porter2 can shorten its own output again ("agreed" → "agre" → "agr"), so
/// the stemmer is reapplied until the form stops changing.
const STEM_ROUNDS: usize = 8;

pub fn stable_stem(token: &str) -> String {
    let mut current = token.to_string();
    for _ in 0..STEM_ROUNDS {
        let next = STEMMER.stem(&current);
        if next == current.as_str() {
            break;
        }
        current = next.into_owned();
    }
    current
}

/// A stopword, or a word whose stem is one ("looked" stems to "look").
fn is_stop_form(token: &str) -> bool { is_stopword(token) || is_stopword(&stable_stem(token)) }

/// One stage of the normalization chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    /// Keep tokens of at most this many characters.
    MaxLength(usize),
    /// Keep tokens of at least this many characters.
    MinLength(usize),
    Lowercase,
    /// Drop stopwords, matched on the token and on its stem.
    Stopwords,
    /// Replace each token by its stable Porter2 stem.
    Stem,
}

impl Filter {
    pub fn apply(&self, tokens: Vec<String>) -> Vec<String> {
        match *self {
            Filter::MaxLength(max) => tokens.into_iter().filter(|t| t.chars().count() <= max).collect(),
            Filter::MinLength(min) => tokens.into_iter().filter(|t| t.chars().count() >= min).collect(),
            Filter::Lowercase => tokens.into_iter().map(|t| t.to_lowercase()).collect(),
            Filter::Stopwords => tokens.into_iter().filter(|t| !is_stop_form(t)).collect(),
            Filter::Stem => tokens.into_iter().map(|t| stable_stem(&t)).collect(),
        }
    }
}

/// Ordered filter chain. Stopwords are removed before stemming and the final
/// length bounds apply to stemmed forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalizer {
    filters: Vec<Filter>,
}

impl Normalizer {
    pub fn new(config: &NormalizeConfig) -> Self {
        Self {
            filters: vec![
                Filter::MaxLength(config.max_raw_len),
                Filter::Lowercase,
                Filter::Stopwords,
                Filter::Stem,
                Filter::MinLength(config.min_len),
                Filter::MaxLength(config.max_len),
            ],
        }
    }

    pub fn with_filters(filters: Vec<Filter>) -> Self { Self { filters } }

    pub fn filters(&self) -> &[Filter] { &self.filters }

    /// Never fails: on error yields `[""]`, which downstream stages ignore.
    pub fn normalize(&self, tokens: Vec<String>) -> Vec<String> {
        self.try_normalize(tokens).unwrap_or_else(|err| {
            tracing::warn!(error = %err, "normalization failed, using sentinel token");
            vec![String::new()]
        })
    }

    pub fn try_normalize(&self, tokens: Vec<String>) -> Result<Vec<String>> {
        panic::catch_unwind(AssertUnwindSafe(|| self.filters.iter().fold(tokens, |acc, f| f.apply(acc))))
            .map_err(|payload| Error::Normalize(panic_message(payload)))
    }
}

impl Default for Normalizer {
    fn default() -> Self { Self::new(&NormalizeConfig::default()) }
}

/// Normalize with the default chain.
pub fn normalize<I, S>(tokens: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Normalizer::default().normalize(tokens.into_iter().map(Into::into).collect())
}
