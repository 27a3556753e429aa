use serde::{Deserialize, Serialize};

/// A document at some pipeline stage. Stages build a new `Document` rather than editing one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document<T> {
    /// Opaque label; not guaranteed unique across archives.
    pub id: String,
    pub content: T,
}

pub type TextDocument = Document<String>;
pub type TokenDocument = Document<Vec<String>>;

impl<T> Document<T> {
    pub fn new(id: impl Into<String>, content: T) -> Self {
        Self { id: id.into(), content }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Document<U> {
        Document { id: self.id, content: f(self.content) }
    }
}

impl TokenDocument {
    /// Tokens that carry a term; the empty sentinel left by a failed stage is skipped.
    pub fn terms(&self) -> impl Iterator<Item = &str> + '_ {
        self.content.iter().map(String::as_str).filter(|t| !t.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_keeps_the_id() {
        let doc = Document::new("d1", "run run cat".to_string());
        let tokens = doc.map(|text| text.split(' ').map(str::to_string).collect::<Vec<_>>());
        assert_eq!(tokens.id, "d1");
        assert_eq!(tokens.content, vec!["run", "run", "cat"]);
    }

    #[test]
    fn sentinel_tokens_carry_no_terms() {
        let doc = Document::new("d", vec![String::new(), "cat".into()]);
        assert_eq!(doc.terms().collect::<Vec<_>>(), vec!["cat"]);
    }
}
