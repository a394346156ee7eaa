//! Character vocabulary accumulated across every written line.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use crate::error::{CorpusError, Result};

/// Set of distinct characters observed in the normalised output.
///
/// Characters are kept in code-point order so the serialised file is reproducible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vocabulary {
    chars: BTreeSet<char>,
}

impl Vocabulary {
    /// Creates an empty vocabulary.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds every character of `text`.
    pub fn observe(&mut self, text: &str) {
        self.chars.extend(text.chars());
    }

    /// Returns `true` when `c` has been observed.
    #[must_use]
    pub fn contains(&self, c: char) -> bool {
        self.chars.contains(&c)
    }

    /// Number of distinct characters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// Returns `true` when nothing has been observed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Iterates characters in ascending code-point order.
    pub fn iter(&self) -> impl Iterator<Item = char> + '_ {
        self.chars.iter().copied()
    }

    /// Joins all characters with `\n`, without a trailing separator.
    #[must_use]
    pub fn to_file_contents(&self) -> String {
        let mut out = String::with_capacity(self.chars.len() * 2);
        for (idx, c) in self.chars.iter().enumerate() {
            if idx > 0 {
                out.push('\n');
            }
            out.push(*c);
        }
        out
    }

    /// Creates or truncates `path` and writes [`Vocabulary::to_file_contents`] to it.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_file_contents())
            .map_err(|err| CorpusError::io(err, Some(path.to_path_buf())))
    }
}

impl Extend<char> for Vocabulary {
    fn extend<T: IntoIterator<Item = char>>(&mut self, iter: T) {
        self.chars.extend(iter);
    }
}

impl FromIterator<char> for Vocabulary {
    fn from_iter<T: IntoIterator<Item = char>>(iter: T) -> Self {
        Self {
            chars: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn observe_deduplicates_and_orders() {
        let mut vocab = Vocabulary::new();
        vocab.observe("World\n");
        vocab.observe("Hello\n");
        let chars: String = vocab.iter().collect();
        assert_eq!(chars, "\nHWdelor");
        assert_eq!(vocab.len(), 8);
    }

    #[test]
    fn file_contents_join_without_trailing_newline() {
        let vocab: Vocabulary = "ba".chars().collect();
        assert_eq!(vocab.to_file_contents(), "a\nb");
        assert_eq!(Vocabulary::new().to_file_contents(), "");
    }

    #[test]
    fn save_truncates_existing_file() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("vocab.txt");
        std::fs::write(&path, "stale contents").expect("seed file");
        let vocab: Vocabulary = "é".chars().collect();
        vocab.save(&path).expect("save vocab");
        assert_eq!(std::fs::read_to_string(&path).expect("read"), "é");
    }
}
