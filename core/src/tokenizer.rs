use crate::error::panic_message;
use crate::{Error, Result};
use lazy_static::lazy_static;
use regex::Regex;
use std::panic;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    // Dotted abbreviations (U.S.A.) first, then plain ASCII letter runs. Everything else separates.
    static ref RE: Regex = Regex::new(r"(?:[A-Za-z]\.){2,}|[A-Za-z]+").expect("valid regex");
}

/// Split text into alphabetic tokens, case preserved. Never fails: on error yields `[""]`.
pub fn tokenize(text: &str) -> Vec<String> {
    try_tokenize(text).unwrap_or_else(|err| {
        tracing::warn!(error = %err, "tokenization failed, using sentinel token");
        vec![String::new()]
    })
}

/// Accents are folded away (NFKD, combining marks dropped) before matching,
/// and the dots of an abbreviation are removed.
pub fn try_tokenize(text: &str) -> Result<Vec<String>> {
    panic::catch_unwind(|| {
        let folded: String = text.nfkd().filter(|c| !is_combining_mark(*c)).collect();
        RE.find_iter(&folded)
            .map(|m| {
                let token = m.as_str();
                if token.ends_with('.') { token.replace('.', "") } else { token.to_string() }
            })
            .collect()
    })
    .map_err(|payload| Error::Tokenize(panic_message(payload)))
}
