//! Stop words: chunks never considered as frame element fillers.

use std::collections::HashSet;
use std::path::Path;

use crate::error::FrameError;

const ENGLISH: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "from", "he", "her", "his",
    "i", "if", "in", "into", "is", "it", "its", "me", "my", "no", "not", "of", "on", "or", "our",
    "she", "so", "such", "that", "the", "their", "them", "then", "there", "these", "they",
    "this", "those", "to", "us", "was", "we", "were", "which", "who", "will", "with", "you",
];

const ITALIAN: &[&str] = &[
    "a", "ad", "al", "alla", "alle", "anche", "che", "chi", "ci", "col", "con", "da", "dal",
    "dalla", "de", "degli", "dei", "del", "della", "delle", "di", "e", "ed", "gli", "ha", "i",
    "il", "in", "io", "la", "le", "lei", "li", "lo", "lui", "ma", "mi", "ne", "nei", "nel",
    "nella", "noi", "non", "o", "per", "più", "quale", "questo", "quello", "se", "si", "sono",
    "su", "sul", "sulla", "tra", "un", "una", "uno", "voi",
];

/// A lowercase set of words excluded from entity consideration.
#[derive(Debug, Clone, Default)]
pub struct StopWords {
    words: HashSet<String>,
}

impl StopWords {
    /// The built-in list for a language code. Unknown languages get an
    /// empty set.
    pub fn for_language(language: &str) -> Self {
        let words = match language.to_lowercase().as_str() {
            "en" => ENGLISH,
            "it" => ITALIAN,
            _ => &[],
        };
        words.iter().copied().collect()
    }

    /// Load a list with one word per line. Blank lines and lines starting
    /// with `#` are ignored.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, FrameError> {
        let text = std::fs::read_to_string(path)?;
        Ok(text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .collect())
    }

    /// Case-insensitive membership.
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(&word.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl<'a> FromIterator<&'a str> for StopWords {
    fn from_iter<T: IntoIterator<Item = &'a str>>(iter: T) -> Self {
        StopWords {
            words: iter.into_iter().map(str::to_lowercase).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn builtin_lists_are_case_insensitive() {
        let english = StopWords::for_language("EN");
        assert!(english.contains("The"));
        assert!(!english.contains("tennis"));

        let italian = StopWords::for_language("it");
        assert!(italian.contains("della"));
    }

    #[test]
    fn unknown_language_is_empty() {
        assert!(StopWords::for_language("xx").is_empty());
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# custom\nFoo\n\n bar ").unwrap();

        let words = StopWords::from_path(file.path()).unwrap();
        assert_eq!(words.len(), 2);
        assert!(words.contains("foo"));
        assert!(words.contains("BAR"));
    }
}
