//! Part-of-speech tagged tokens and the tagger seam.
//!
//! Tagging is an external concern. Sentences usually arrive pre-tagged as
//! `[token, pos, lemma]` triples; when they don't, the labeler falls back on
//! whatever [`Tagger`] it was built with.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FrameError, LabelError};

/// A single tagged token. Serialized as a `[token, pos, lemma]` triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(String, String, String)", into = "(String, String, String)")]
pub struct TaggedToken {
    /// The surface form as it appears in the sentence.
    pub token: String,
    /// The part-of-speech tag (tag set is up to the tagger, e.g. `VVD`).
    pub pos: String,
    /// The lemma, matched against frame triggers.
    pub lemma: String,
}

impl TaggedToken {
    pub fn new(token: impl Into<String>, pos: impl Into<String>, lemma: impl Into<String>) -> Self {
        TaggedToken {
            token: token.into(),
            pos: pos.into(),
            lemma: lemma.into(),
        }
    }
}

impl From<(String, String, String)> for TaggedToken {
    fn from((token, pos, lemma): (String, String, String)) -> Self {
        TaggedToken { token, pos, lemma }
    }
}

impl From<TaggedToken> for (String, String, String) {
    fn from(tagged: TaggedToken) -> Self {
        (tagged.token, tagged.pos, tagged.lemma)
    }
}

/// Produces tagged tokens for raw sentence text.
pub trait Tagger: Send + Sync {
    fn tag(&self, text: &str) -> Result<Vec<TaggedToken>, LabelError>;
}

/// POS tag given to tokens the lexicon does not know.
pub const UNKNOWN_POS: &str = "UNK";

/// A dictionary tagger: surface form → `(pos, lemma)`.
///
/// Tokens are split on whitespace with leading and trailing punctuation
/// broken off into tokens of their own. Lookups are case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct LexiconTagger {
    entries: HashMap<String, (String, String)>,
}

impl LexiconTagger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a surface form to the lexicon.
    pub fn insert(
        &mut self,
        surface: impl AsRef<str>,
        pos: impl Into<String>,
        lemma: impl Into<String>,
    ) {
        self.entries
            .insert(surface.as_ref().to_lowercase(), (pos.into(), lemma.into()));
    }

    pub fn with(mut self, surface: &str, pos: &str, lemma: &str) -> Self {
        self.insert(surface, pos, lemma);
        self
    }

    /// Parse a lexicon from a JSON object of the form
    /// `{"played": ["VVD", "play"], ...}`.
    pub fn from_json(json: &str) -> Result<Self, FrameError> {
        let raw: HashMap<String, (String, String)> = serde_json::from_str(json)?;
        let mut tagger = LexiconTagger::new();
        for (surface, (pos, lemma)) in raw {
            tagger.insert(surface, pos, lemma);
        }
        Ok(tagger)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, FrameError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn tag_word(&self, word: &str) -> TaggedToken {
        let lower = word.to_lowercase();
        match self.entries.get(&lower) {
            Some((pos, lemma)) => TaggedToken::new(word, pos.clone(), lemma.clone()),
            None if word.chars().all(|c| c.is_ascii_punctuation()) => {
                TaggedToken::new(word, "PUN", word)
            }
            None => TaggedToken::new(word, UNKNOWN_POS, lower),
        }
    }
}

impl Tagger for LexiconTagger {
    fn tag(&self, text: &str) -> Result<Vec<TaggedToken>, LabelError> {
        Ok(split_words(text)
            .into_iter()
            .map(|word| self.tag_word(word))
            .collect())
    }
}

/// Split on whitespace, breaking leading and trailing punctuation off
/// each word.
pub fn split_words(text: &str) -> Vec<&str> {
    let mut words = Vec::new();

    for chunk in text.split_whitespace() {
        let start = chunk
            .char_indices()
            .find(|(_, c)| !c.is_ascii_punctuation())
            .map(|(i, _)| i);

        let Some(start) = start else {
            words.push(chunk);
            continue;
        };

        let end = chunk
            .char_indices()
            .rev()
            .find(|(_, c)| !c.is_ascii_punctuation())
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(chunk.len());

        for i in 0..start {
            words.push(&chunk[i..i + 1]);
        }
        words.push(&chunk[start..end]);
        for i in end..chunk.len() {
            words.push(&chunk[i..i + 1]);
        }
    }

    words
}
