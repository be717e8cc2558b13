use editor_cursor::movement::{column_from_visible_column, visible_column_from_column};
use editor_cursor::operations::CursorOperation;
use editor_cursor::words::{find_next_word_on_line, find_previous_word_on_line};
use editor_cursor::{
    DEFAULT_WORD_SEPARATORS, EditorOptions, EditorSession, Position, Selection, WordCharacterClass,
    WordCharacterClassifier, WordNavigationType,
};
use editor_cursor_lang::LanguageConfiguration;
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const ALPHABET: &[char] = &['a', 'Z', '_', '0', ' ', '\t', '.', '(', '-', 'é', '中'];

fn random_line(rng: &mut StdRng) -> String {
    let len = rng.gen_range(0..40);
    (0..len).map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())]).collect()
}

fn session(text: &str) -> EditorSession {
    EditorSession::new(text, LanguageConfiguration::plain(), EditorOptions::default()).unwrap()
}

#[test]
fn test_visible_column_round_trip_on_random_lines() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for _ in 0..500 {
        let line = random_line(&mut rng);
        let tab_size = rng.gen_range(1..9);
        for column in 1..=line.chars().count() + 1 {
            let visible = visible_column_from_column(&line, column, tab_size);
            assert_eq!(
                column_from_visible_column(&line, visible, tab_size),
                column,
                "line {line:?}, tab size {tab_size}"
            );
        }
    }
}

#[test]
fn test_found_words_are_homogeneous_runs() {
    let classifier = WordCharacterClassifier::new(DEFAULT_WORD_SEPARATORS);
    let mut rng = StdRng::seed_from_u64(42);

    for _ in 0..500 {
        let line = random_line(&mut rng);
        let chars: Vec<char> = line.chars().collect();
        for column in 1..=chars.len() + 1 {
            let words = [
                find_previous_word_on_line(&line, &classifier, column),
                find_next_word_on_line(&line, &classifier, column),
            ];
            for word in words.into_iter().flatten() {
                assert!(word.start < word.end && word.end <= chars.len());
                let class = classifier.get(chars[word.start]);
                assert_ne!(class, WordCharacterClass::Whitespace);
                assert!(chars[word.start..word.end].iter().all(|&c| classifier.get(c) == class));
                // Maximal: the neighbours are not part of the same run.
                if word.start > 0 {
                    assert_ne!(classifier.get(chars[word.start - 1]), class);
                }
                if word.end < chars.len() {
                    assert_ne!(classifier.get(chars[word.end]), class);
                }
            }
        }
    }
}

#[test]
fn test_word_right_then_left_returns_to_word_start() {
    let mut s = session("let value = compute(x);");
    let word_right = CursorOperation::MoveWordRight {
        select: false,
        word_navigation: WordNavigationType::WordEnd,
    };
    let word_left = CursorOperation::MoveWordLeft {
        select: false,
        word_navigation: WordNavigationType::WordStart,
    };

    s.execute(word_right.clone()).unwrap();
    assert_eq!(s.primary_selection(), Selection::collapsed(Position::new(1, 4)));
    s.execute(word_right.clone()).unwrap();
    assert_eq!(s.primary_selection(), Selection::collapsed(Position::new(1, 10)));
    s.execute(word_left.clone()).unwrap();
    assert_eq!(s.primary_selection(), Selection::collapsed(Position::new(1, 5)));
    s.execute(word_left).unwrap();
    assert_eq!(s.primary_selection(), Selection::collapsed(Position::new(1, 1)));
}

#[test]
fn test_word_navigation_crosses_lines() {
    let mut s = session("foo\nbar");
    s.set_selections(&[Selection::collapsed(Position::new(1, 4))]);
    s.execute(CursorOperation::MoveWordRight {
        select: false,
        word_navigation: WordNavigationType::WordEnd,
    })
    .unwrap();
    assert_eq!(s.primary_selection(), Selection::collapsed(Position::new(2, 4)));

    let word_left = CursorOperation::MoveWordLeft {
        select: false,
        word_navigation: WordNavigationType::WordStart,
    };
    s.execute(word_left.clone()).unwrap();
    assert_eq!(s.primary_selection(), Selection::collapsed(Position::new(2, 1)));
    s.execute(word_left).unwrap();
    assert_eq!(s.primary_selection(), Selection::collapsed(Position::new(1, 1)));
}

#[test]
fn test_custom_word_separators() {
    let options = EditorOptions {
        word_separators: "-".to_string(),
        ..EditorOptions::default()
    };
    let mut s = EditorSession::new("a.b-c", LanguageConfiguration::plain(), options).unwrap();
    s.execute(CursorOperation::MoveWordRight {
        select: true,
        word_navigation: WordNavigationType::WordEnd,
    })
    .unwrap();
    assert_eq!(s.primary_selection(), Selection::new(1, 1, 1, 4));
}
