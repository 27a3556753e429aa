use crate::config::ExtractConfig;
use crate::error::panic_message;
use crate::{Error, Result};
use crossbeam::channel::{bounded, RecvTimeoutError};
use scraper::{Html, Node, Selector};
use std::panic::{self, AssertUnwindSafe};
use std::thread;
use std::time::Duration;

/// Elements whose text is never visible.
const HIDDEN: &[&str] = &["script", "style", "noscript", "template"];

/// HTML to visible plain text.
#[derive(Debug, Clone, Default)]
pub struct TextExtractor {
    config: ExtractConfig,
}

impl TextExtractor {
    pub fn new(config: ExtractConfig) -> Self { Self { config } }

    /// Never fails: any extraction error becomes the empty string.
    pub fn extract(&self, html: &str) -> String {
        self.try_extract(html).unwrap_or_else(|err| {
            tracing::warn!(error = %err, bytes = html.len(), "text extraction failed, using empty text");
            String::new()
        })
    }

    /// Oversized inputs are parsed on a worker thread and abandoned after the configured timeout.
    pub fn try_extract(&self, html: &str) -> Result<String> {
        if html.len() > self.config.large_input_threshold {
            let owned = html.to_owned();
            return run_bounded(move || visible_text(&owned), self.config.timeout());
        }
        panic::catch_unwind(|| visible_text(html)).unwrap_or_else(|payload| Err(Error::Extract(panic_message(payload))))
    }
}

/// Extract with the default thresholds.
pub fn extract(html: &str) -> String { TextExtractor::default().extract(html) }

/// Run `work` off the calling thread, waiting at most `budget`. A worker that overruns is detached.
fn run_bounded<F>(work: F, budget: Duration) -> Result<String>
where
    F: FnOnce() -> Result<String> + Send + 'static,
{
    let (tx, rx) = bounded(1);
    thread::Builder::new().name("extract".into()).spawn(move || {
        let outcome = panic::catch_unwind(AssertUnwindSafe(work)).map_err(panic_message);
        tx.send(outcome).ok();
    })?;
    match rx.recv_timeout(budget) {
        Ok(Ok(extracted)) => extracted,
        Ok(Err(msg)) => Err(Error::Extract(msg)),
        Err(RecvTimeoutError::Timeout) => Err(Error::ExtractTimeout(budget)),
        Err(RecvTimeoutError::Disconnected) => Err(Error::Extract("extraction worker exited".into())),
    }
}

/// One pre-order pass over the body; each subtree carries whether it sits inside a hidden element.
fn visible_text(html: &str) -> Result<String> {
    let body = Selector::parse("body").map_err(|err| Error::Extract(format!("{err:?}")))?;
    let doc = Html::parse_document(html);
    let root = doc.select(&body).next().unwrap_or_else(|| doc.root_element());
    let mut out = String::with_capacity(html.len() / 4);
    let mut pending = vec![(*root, false)];
    while let Some((node, hidden)) = pending.pop() {
        let hidden = match node.value() {
            Node::Text(text) if !hidden => {
                for word in text.split_whitespace() {
                    if !out.is_empty() {
                        out.push(' ');
                    }
                    out.push_str(word);
                }
                continue;
            }
            Node::Element(el) => hidden || HIDDEN.contains(&el.name()),
            _ => hidden,
        };
        pending.extend(node.children().rev().map(|child| (child, hidden)));
    }
    Ok(out)
}
