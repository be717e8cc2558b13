//! Character classification tables.
//!
//! A [`CharacterClassifier`] maps a character to a small class value through a dense table
//! indexed by code point. The table is only as large as the highest configured code point;
//! everything beyond it falls back to the default class.

/// A dense `char -> class` lookup table.
#[derive(Debug, Clone)]
pub struct CharacterClassifier<T: Copy> {
    default: T,
    table: Vec<T>,
}

impl<T: Copy> CharacterClassifier<T> {
    /// Create a classifier where every character maps to `default`.
    pub fn new(default: T) -> Self {
        Self {
            default,
            table: Vec::new(),
        }
    }

    /// Assign `class` to `ch`, growing the table up to `ch` if needed.
    pub fn set(&mut self, ch: char, class: T) {
        let code = ch as usize;
        if code >= self.table.len() {
            self.table.resize(code + 1, self.default);
        }
        self.table[code] = class;
    }

    /// Look up the class of `ch`. O(1), never fails.
    pub fn get(&self, ch: char) -> T {
        self.table.get(ch as usize).copied().unwrap_or(self.default)
    }
}

/// Class of a character for word navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WordCharacterClass {
    /// Part of a regular word.
    Regular,
    /// Space or tab.
    Whitespace,
    /// One of the configured word separators.
    WordSeparator,
}

/// Classifier built from a word-separator string.
#[derive(Debug, Clone)]
pub struct WordCharacterClassifier {
    inner: CharacterClassifier<WordCharacterClass>,
}

impl WordCharacterClassifier {
    /// Build a classifier: space and tab are whitespace, every character of `separators` is a
    /// separator, and anything else is regular.
    pub fn new(separators: &str) -> Self {
        let mut inner = CharacterClassifier::new(WordCharacterClass::Regular);
        for ch in separators.chars() {
            inner.set(ch, WordCharacterClass::WordSeparator);
        }
        inner.set(' ', WordCharacterClass::Whitespace);
        inner.set('\t', WordCharacterClass::Whitespace);
        Self { inner }
    }

    /// Class of `ch`.
    pub fn get(&self, ch: char) -> WordCharacterClass {
        self.inner.get(ch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_beyond_table_use_default() {
        let mut c = CharacterClassifier::new(0u8);
        c.set('b', 2);
        assert_eq!(c.get('a'), 0);
        assert_eq!(c.get('b'), 2);
        assert_eq!(c.get('z'), 0);
        assert_eq!(c.get('中'), 0);
    }

    #[test]
    fn test_word_classifier() {
        let c = WordCharacterClassifier::new("().");
        assert_eq!(c.get('x'), WordCharacterClass::Regular);
        assert_eq!(c.get('('), WordCharacterClass::WordSeparator);
        assert_eq!(c.get(' '), WordCharacterClass::Whitespace);
        assert_eq!(c.get('\t'), WordCharacterClass::Whitespace);
        assert_eq!(c.get('é'), WordCharacterClass::Regular);
    }
}
