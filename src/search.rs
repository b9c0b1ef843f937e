//! Any-word prefix search over entry names.
//!
//! A query matches a name when any query word is a prefix of any word in the name.
//! Words are runs of alphanumeric characters, compared case-insensitively; everything
//! else separates words and never reaches the database as syntax.

/// Parsed search input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchTerms {
    raw: String,
    words: Vec<String>,
}

impl SearchTerms {
    /// Returns `None` for blank input, which callers treat as "no search".
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        let mut words = Vec::new();
        for word in tokenize(trimmed) {
            if !words.contains(&word) {
                words.push(word);
            }
        }
        Some(SearchTerms {
            raw: trimmed.to_string(),
            words,
        })
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// PostgreSQL `tsquery` text (`rent:* | gas:*`). `None` when the input had no words,
    /// in which case nothing can match.
    pub fn to_tsquery(&self) -> Option<String> {
        if self.words.is_empty() {
            return None;
        }
        Some(
            self.words
                .iter()
                .map(|w| format!("{}:*", w))
                .collect::<Vec<_>>()
                .join(" | "),
        )
    }

    pub fn matches(&self, text: &str) -> bool {
        let candidates = tokenize(text);
        self.words
            .iter()
            .any(|w| candidates.iter().any(|c| c.starts_with(w.as_str())))
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}
