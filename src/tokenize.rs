/// Word tokenization and frequency distribution.
///
/// Tokens are Unicode word-character runs. Stopwords come from a plain
/// newline-delimited file and are passed in explicitly.
use anyhow::{ensure, Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::path::Path;

use crate::model::Message;
use crate::ranking::{count_first_seen, rank_counts};
use crate::stats::WordCount;

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").expect("valid word regex"));

/// Largest supported n-gram size.
pub const MAX_NGRAM: usize = 3;

/// A set of words to leave out of frequency counts.
#[derive(Debug, Clone, Default)]
pub struct Stopwords {
    words: HashSet<String>,
}

impl Stopwords {
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            words: words
                .into_iter()
                .map(|w| w.as_ref().trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect(),
        }
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Load a newline-delimited stopword list.
pub fn load_stopwords(path: &Path) -> Result<Stopwords> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read stopwords file: {}", path.display()))?;

    let stopwords = Stopwords::from_words(content.lines());
    tracing::debug!(
        "Loaded {} stopwords from {}",
        stopwords.len(),
        path.display()
    );
    Ok(stopwords)
}

/// Split text into word-character runs. Punctuation-only segments yield nothing.
pub fn word_tokens(text: &str) -> impl Iterator<Item = &str> {
    WORD_RE.find_iter(text).map(|m| m.as_str())
}

/// Number of word tokens in a message body.
pub fn word_count(text: &str) -> usize {
    word_tokens(text).count()
}

/// Lowercased, alphabetic, non-stopword tokens from all message bodies.
pub fn tokenize_messages(messages: &[Message], stopwords: &Stopwords) -> Vec<String> {
    let mut tokens = Vec::new();
    for content in messages.iter().filter_map(|m| m.content.as_deref()) {
        let lowered = content.to_lowercase();
        tokens.extend(
            word_tokens(&lowered)
                .filter(|t| t.chars().all(char::is_alphabetic))
                .filter(|t| !stopwords.contains(t))
                .map(str::to_string),
        );
    }
    tokens
}

/// Frequency distribution of n-grams (n = 1, 2 or 3), most frequent first.
///
/// N-gram terms are tokens joined by a single space. Ties keep first-seen order.
pub fn word_frequencies(tokens: &[String], n: usize) -> Result<Vec<WordCount>> {
    ensure!(
        (1..=MAX_NGRAM).contains(&n),
        "n-gram size must be 1, 2 or 3 (got {})",
        n
    );

    let counts = count_first_seen(tokens.windows(n).map(|gram| gram.join(" ")));

    Ok(rank_counts(counts)
        .into_iter()
        .map(|(term, count)| WordCount { term, count })
        .collect())
}

/// The `k` most frequent n-grams.
pub fn most_common(tokens: &[String], n: usize, k: usize) -> Result<Vec<WordCount>> {
    let mut frequencies = word_frequencies(tokens, n)?;
    frequencies.truncate(k);
    Ok(frequencies)
}
