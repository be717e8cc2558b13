//! Word boundary search within a single line.
//!
//! A word is a maximal run of characters of the same class: either regular characters or
//! word separators. Whitespace is never part of a word. Offsets in [`FindWordResult`] are
//! 0-based UTF-16 offsets, so `offset + 1` is a column; `end` is exclusive.

use crate::classifier::{WordCharacterClass, WordCharacterClassifier};
use crate::position::text_before_column;

/// Kind of a word run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WordType {
    /// A run of regular characters.
    Regular,
    /// A run of separator characters.
    Separator,
}

/// Where word navigation stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WordNavigationType {
    /// Stop at word starts.
    #[default]
    WordStart,
    /// Stop at word ends.
    WordEnd,
}

/// A word found on a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FindWordResult {
    /// Start offset (0-based, inclusive).
    pub start: usize,
    /// End offset (0-based, exclusive).
    pub end: usize,
    /// Word kind.
    pub word_type: WordType,
}

/// Find the word ending at or before `column` (1-based) on `line`.
pub fn find_previous_word_on_line(
    line: &str,
    classifier: &WordCharacterClassifier,
    column: usize,
) -> Option<FindWordResult> {
    let chars: Vec<char> = line.chars().collect();
    let from = text_before_column(line, column).chars().count();
    previous_word(&chars, classifier, from).map(|word| to_code_units(&chars, word))
}

/// Find the word starting at or after `column` (1-based) on `line`.
pub fn find_next_word_on_line(
    line: &str,
    classifier: &WordCharacterClassifier,
    column: usize,
) -> Option<FindWordResult> {
    let chars: Vec<char> = line.chars().collect();
    let from = text_before_column(line, column).chars().count();
    next_word(&chars, classifier, from).map(|word| to_code_units(&chars, word))
}

fn to_code_units(chars: &[char], word: FindWordResult) -> FindWordResult {
    let units = |index: usize| chars[..index].iter().map(|ch| ch.len_utf16()).sum::<usize>();
    FindWordResult {
        start: units(word.start),
        end: units(word.end),
        word_type: word.word_type,
    }
}

/// Scans backwards from the char index `from`.
fn previous_word(chars: &[char], classifier: &WordCharacterClassifier, from: usize) -> Option<FindWordResult> {
    let mut word_type: Option<WordType> = None;
    for index in (0..from).rev() {
        match classifier.get(chars[index]) {
            WordCharacterClass::Regular => {
                if word_type == Some(WordType::Separator) {
                    return Some(word_from_start(chars, classifier, WordType::Separator, index + 1));
                }
                word_type = Some(WordType::Regular);
            }
            WordCharacterClass::WordSeparator => {
                if word_type == Some(WordType::Regular) {
                    return Some(word_from_start(chars, classifier, WordType::Regular, index + 1));
                }
                word_type = Some(WordType::Separator);
            }
            WordCharacterClass::Whitespace => {
                if let Some(word_type) = word_type {
                    return Some(word_from_start(chars, classifier, word_type, index + 1));
                }
            }
        }
    }

    word_type.map(|word_type| word_from_start(chars, classifier, word_type, 0))
}

/// Scans forwards from the char index `from`.
fn next_word(chars: &[char], classifier: &WordCharacterClassifier, from: usize) -> Option<FindWordResult> {
    let len = chars.len();
    let mut word_type: Option<WordType> = None;
    for index in from..len {
        match classifier.get(chars[index]) {
            WordCharacterClass::Regular => {
                if word_type == Some(WordType::Separator) {
                    return Some(word_from_end(chars, classifier, WordType::Separator, index));
                }
                word_type = Some(WordType::Regular);
            }
            WordCharacterClass::WordSeparator => {
                if word_type == Some(WordType::Regular) {
                    return Some(word_from_end(chars, classifier, WordType::Regular, index));
                }
                word_type = Some(WordType::Separator);
            }
            WordCharacterClass::Whitespace => {
                if let Some(word_type) = word_type {
                    return Some(word_from_end(chars, classifier, word_type, index));
                }
            }
        }
    }

    word_type.map(|word_type| word_from_end(chars, classifier, word_type, len))
}

fn word_from_start(
    chars: &[char],
    classifier: &WordCharacterClassifier,
    word_type: WordType,
    start: usize,
) -> FindWordResult {
    FindWordResult {
        start,
        end: find_end_of_word(chars, classifier, word_type, start),
        word_type,
    }
}

fn word_from_end(
    chars: &[char],
    classifier: &WordCharacterClassifier,
    word_type: WordType,
    end: usize,
) -> FindWordResult {
    FindWordResult {
        start: find_start_of_word(chars, classifier, word_type, end),
        end,
        word_type,
    }
}

fn terminates(word_type: WordType, class: WordCharacterClass) -> bool {
    matches!(
        (word_type, class),
        (_, WordCharacterClass::Whitespace)
            | (WordType::Regular, WordCharacterClass::WordSeparator)
            | (WordType::Separator, WordCharacterClass::Regular)
    )
}

fn find_end_of_word(
    chars: &[char],
    classifier: &WordCharacterClassifier,
    word_type: WordType,
    start: usize,
) -> usize {
    chars[start..]
        .iter()
        .position(|&ch| terminates(word_type, classifier.get(ch)))
        .map_or(chars.len(), |offset| start + offset)
}

/// `end` is exclusive: the scan starts at `end - 1`.
fn find_start_of_word(
    chars: &[char],
    classifier: &WordCharacterClassifier,
    word_type: WordType,
    end: usize,
) -> usize {
    chars[..end]
        .iter()
        .rposition(|&ch| terminates(word_type, classifier.get(ch)))
        .map_or(0, |index| index + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn classifier() -> WordCharacterClassifier {
        WordCharacterClassifier::new("`~!@#$%^&*()-=+[{]}\\|;:'\",.<>/?")
    }

    #[test]
    fn test_previous_word() {
        let c = classifier();
        let line = "foo.bar  baz";
        assert_eq!(
            find_previous_word_on_line(line, &c, 13),
            Some(FindWordResult {
                start: 9,
                end: 12,
                word_type: WordType::Regular
            })
        );
        // Inside the whitespace run: the previous word is `bar`.
        assert_eq!(
            find_previous_word_on_line(line, &c, 9).map(|w| (w.start, w.end)),
            Some((4, 7))
        );
        // Right after the separator.
        assert_eq!(
            find_previous_word_on_line(line, &c, 5),
            Some(FindWordResult {
                start: 3,
                end: 4,
                word_type: WordType::Separator
            })
        );
        assert_eq!(find_previous_word_on_line(line, &c, 1), None);
        assert_eq!(find_previous_word_on_line("   ", &c, 4), None);
    }

    #[test]
    fn test_next_word() {
        let c = classifier();
        let line = "  foo(bar)";
        assert_eq!(
            find_next_word_on_line(line, &c, 1),
            Some(FindWordResult {
                start: 2,
                end: 5,
                word_type: WordType::Regular
            })
        );
        // Starting in the middle of `foo` still reports the whole word.
        assert_eq!(
            find_next_word_on_line(line, &c, 4).map(|w| (w.start, w.end)),
            Some((2, 5))
        );
        assert_eq!(
            find_next_word_on_line(line, &c, 10).map(|w| (w.start, w.end, w.word_type)),
            Some((9, 10, WordType::Separator))
        );
        assert_eq!(find_next_word_on_line(line, &c, 11), None);
    }

    #[test]
    fn test_offsets_count_utf16_code_units() {
        let c = classifier();
        let line = "😀ab cd";
        assert_eq!(
            find_next_word_on_line(line, &c, 1).map(|w| (w.start, w.end)),
            Some((0, 4))
        );
        assert_eq!(
            find_previous_word_on_line(line, &c, 8).map(|w| (w.start, w.end)),
            Some((5, 7))
        );
        assert_eq!(
            find_next_word_on_line(line, &c, 5).map(|w| (w.start, w.end)),
            Some((5, 7))
        );
    }

    #[test]
    fn test_next_then_previous_is_symmetric() {
        let c = classifier();
        let alphabet = ['a', 'b', ' ', '\t', '.', ',', '(', 'é'];
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..500 {
            let len = rng.gen_range(0..24);
            let line: String = (0..len)
                .map(|_| alphabet[rng.gen_range(0..alphabet.len())])
                .collect();
            for column in 1..=len + 1 {
                if let Some(next) = find_next_word_on_line(&line, &c, column) {
                    let prev = find_previous_word_on_line(&line, &c, next.end + 1);
                    assert_eq!(prev, Some(next), "line {line:?} column {column}");
                }
            }
        }
    }
}
