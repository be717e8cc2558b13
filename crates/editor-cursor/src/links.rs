//! Link detection.
//!
//! Finds `http://`, `https://` and `file://` links in plain text. A small state machine
//! recognizes the scheme (case-insensitively); after `://` every character is accepted until
//! one that forces termination. Brackets are balanced so that `(https://a.b/x)` does not
//! swallow the closing paren while `https://a.b/f(x)` keeps it, and trailing `.`, `,` or `;`
//! is never part of a link.
//!
//! Scanning is a pure function of the text, so hosts can run it off the interactive thread
//! and simply discard stale results.

use crate::classifier::CharacterClassifier;
use crate::model::LineSource;
use crate::position::Range;
use serde::Serialize;
use std::sync::OnceLock;
use tracing::trace;

/// A detected link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    /// Where the link is, within one line.
    pub range: Range,
    /// The link text.
    pub url: String,
}

/// Anything that can hand out lines to scan.
pub trait LinkComputerTarget {
    /// Number of lines.
    fn link_line_count(&self) -> usize;
    /// Content of `line` (1-based).
    fn link_line_content(&self, line: usize) -> String;
}

impl<T: LineSource + ?Sized> LinkComputerTarget for T {
    fn link_line_count(&self) -> usize {
        self.line_count()
    }

    fn link_line_content(&self, line: usize) -> String {
        self.line_content(line)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Invalid,
    Start,
    H,
    Ht,
    Htt,
    Http,
    F,
    Fi,
    Fil,
    BeforeColon,
    AfterColon,
    AlmostThere,
    End,
    Accept,
}

const STATE_COUNT: usize = State::Accept as usize + 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    None,
    ForceTermination,
    CannotEndIn,
}

/// One transition table per state.
struct StateMachine {
    transitions: Vec<CharacterClassifier<State>>,
}

impl StateMachine {
    fn new(edges: &[(State, char, State)]) -> Self {
        let mut transitions = vec![CharacterClassifier::new(State::Invalid); STATE_COUNT];
        for &(from, ch, to) in edges {
            let table = &mut transitions[from as usize];
            table.set(ch.to_ascii_lowercase(), to);
            table.set(ch.to_ascii_uppercase(), to);
        }
        Self { transitions }
    }

    fn next(&self, state: State, ch: char) -> State {
        self.transitions[state as usize].get(ch)
    }
}

fn state_machine() -> &'static StateMachine {
    static MACHINE: OnceLock<StateMachine> = OnceLock::new();
    MACHINE.get_or_init(|| {
        use State::*;
        StateMachine::new(&[
            (Start, 'h', H),
            (H, 't', Ht),
            (Ht, 't', Htt),
            (Htt, 'p', Http),
            (Http, 's', BeforeColon),
            (Http, ':', AfterColon),
            (Start, 'f', F),
            (F, 'i', Fi),
            (Fi, 'l', Fil),
            (Fil, 'e', BeforeColon),
            (BeforeColon, ':', AfterColon),
            (AfterColon, '/', AlmostThere),
            (AlmostThere, '/', End),
        ])
    })
}

const FORCE_TERMINATION: &str = " \t<>'\"、。｡､，．：；‘“〈《「『【〔（［｛｢｣｝］）〕】』」》〉”’｀～…";
const CANNOT_END_IN: &str = ".,;";

fn classifier() -> &'static CharacterClassifier<CharClass> {
    static CLASSIFIER: OnceLock<CharacterClassifier<CharClass>> = OnceLock::new();
    CLASSIFIER.get_or_init(|| {
        let mut classifier = CharacterClassifier::new(CharClass::None);
        for ch in FORCE_TERMINATION.chars() {
            classifier.set(ch, CharClass::ForceTermination);
        }
        for ch in CANNOT_END_IN.chars() {
            classifier.set(ch, CharClass::CannotEndIn);
        }
        classifier
    })
}

fn is_quote(ch: char) -> bool {
    matches!(ch, '\'' | '"' | '`')
}

/// Build the link for `chars[begin..end]`, trimming trailing punctuation and a close bracket
/// that matches the character right before the link.
fn create_link(line_number: usize, chars: &[char], begin: usize, end: usize) -> Link {
    let classifier = classifier();
    let mut last = end - 1;
    while last > begin && classifier.get(chars[last]) == CharClass::CannotEndIn {
        last -= 1;
    }

    if begin > 0 {
        let enclosed = matches!(
            (chars[begin - 1], chars[last]),
            ('(', ')') | ('[', ']') | ('{', '}')
        );
        if enclosed {
            last -= 1;
        }
    }

    let column = |index: usize| chars[..index].iter().map(|ch| ch.len_utf16()).sum::<usize>() + 1;
    Link {
        range: Range::new(line_number, column(begin), line_number, column(last + 1)),
        url: chars[begin..=last].iter().collect(),
    }
}

/// Links on a single line.
pub fn compute_line_links(line_number: usize, line: &str) -> Vec<Link> {
    let machine = state_machine();
    let classifier = classifier();
    let chars: Vec<char> = line.chars().collect();
    let mut links = Vec::new();

    let mut state = State::Start;
    let mut begin = 0;
    let mut begin_char: Option<char> = None;
    let mut has_open_paren = false;
    let mut has_open_square = false;
    let mut in_square = false;
    let mut has_open_curly = false;

    for (j, &ch) in chars.iter().enumerate() {
        let mut reset = false;
        match state {
            State::Accept => {
                let class = match ch {
                    '(' => {
                        has_open_paren = true;
                        CharClass::None
                    }
                    ')' if has_open_paren => CharClass::None,
                    ')' => CharClass::ForceTermination,
                    '[' => {
                        in_square = true;
                        has_open_square = true;
                        CharClass::None
                    }
                    ']' => {
                        in_square = false;
                        if has_open_square {
                            CharClass::None
                        } else {
                            CharClass::ForceTermination
                        }
                    }
                    '{' => {
                        has_open_curly = true;
                        CharClass::None
                    }
                    '}' if has_open_curly => CharClass::None,
                    '}' => CharClass::ForceTermination,
                    '\'' | '"' | '`' => match begin_char {
                        Some(b) if b == ch => CharClass::ForceTermination,
                        Some(b) if is_quote(b) => CharClass::None,
                        _ => CharClass::ForceTermination,
                    },
                    '*' | '|' if begin_char == Some(ch) => CharClass::ForceTermination,
                    '*' | '|' => CharClass::None,
                    ' ' if in_square => CharClass::None,
                    _ => classifier.get(ch),
                };
                if class == CharClass::ForceTermination {
                    links.push(create_link(line_number, &chars, begin, j));
                    reset = true;
                }
            }
            State::End => {
                let class = if ch == '[' {
                    has_open_square = true;
                    CharClass::None
                } else {
                    classifier.get(ch)
                };
                if class == CharClass::ForceTermination {
                    reset = true;
                } else {
                    state = State::Accept;
                }
            }
            _ => {
                state = machine.next(state, ch);
                reset = state == State::Invalid;
            }
        }

        if reset {
            state = State::Start;
            has_open_paren = false;
            has_open_square = false;
            in_square = false;
            has_open_curly = false;
            begin = j + 1;
            begin_char = Some(ch);
        }
    }

    if state == State::Accept {
        links.push(create_link(line_number, &chars, begin, chars.len()));
    }
    links
}

/// Links in every line of `target`.
pub fn compute_links(target: &(impl LinkComputerTarget + ?Sized)) -> Vec<Link> {
    let links: Vec<Link> = (1..=target.link_line_count())
        .flat_map(|line| compute_line_links(line, &target.link_line_content(line)))
        .collect();
    trace!(count = links.len(), "computed links");
    links
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn urls(line: &str) -> Vec<String> {
        compute_line_links(1, line).into_iter().map(|l| l.url).collect()
    }

    #[test]
    fn test_plain_link() {
        let links = compute_line_links(3, "see https://example.com/a for details");
        assert_eq!(
            links,
            vec![Link {
                range: Range::new(3, 5, 3, 26),
                url: "https://example.com/a".to_string(),
            }]
        );
    }

    #[test]
    fn test_range_columns_count_utf16_code_units() {
        let links = compute_line_links(1, "😀 http://a.b");
        assert_eq!(links[0].range, Range::new(1, 4, 1, 14));
    }

    #[test]
    fn test_scheme_is_case_insensitive() {
        assert_eq!(urls("HTTP://a.b FiLe:///tmp/x"), vec!["HTTP://a.b", "FiLe:///tmp/x"]);
    }

    #[test]
    fn test_other_schemes_are_ignored() {
        assert_eq!(urls("ftp://a.b mailto:x@y hxxp://a"), Vec::<String>::new());
    }

    #[test]
    fn test_trailing_punctuation_is_trimmed() {
        assert_eq!(urls("go to http://a.b/c. then"), vec!["http://a.b/c"]);
        assert_eq!(urls("http://a.b/c,;"), vec!["http://a.b/c"]);
    }

    #[test]
    fn test_enclosing_brackets() {
        assert_eq!(urls("(http://a.b/c)"), vec!["http://a.b/c"]);
        assert_eq!(urls("[http://a.b/c]"), vec!["http://a.b/c"]);
        assert_eq!(urls("http://a.b/f(x)"), vec!["http://a.b/f(x)"]);
        assert_eq!(urls("http://a.b/c) rest"), vec!["http://a.b/c"]);
    }

    #[test]
    fn test_quotes() {
        assert_eq!(urls("\"http://a.b/c\""), vec!["http://a.b/c"]);
        assert_eq!(urls("`http://a.b/it's`"), vec!["http://a.b/it's"]);
        assert_eq!(urls("x http://a.b/it's"), vec!["http://a.b/it"]);
    }

    #[test]
    fn test_ipv6_authority() {
        assert_eq!(urls("http://[::1]:8080/x"), vec!["http://[::1]:8080/x"]);
    }

    #[test]
    fn test_full_width_punctuation_terminates() {
        assert_eq!(urls("链接：http://a.b/c。"), vec!["http://a.b/c"]);
    }

    #[test]
    fn test_scheme_without_body_is_not_a_link() {
        assert_eq!(urls("http:// x"), Vec::<String>::new());
        assert_eq!(urls("http://"), Vec::<String>::new());
    }

    #[test]
    fn test_compute_links_over_lines() {
        struct Lines(Vec<&'static str>);
        impl LineSource for Lines {
            fn line_count(&self) -> usize {
                self.0.len()
            }
            fn line_content(&self, line: usize) -> String {
                self.0[line - 1].to_string()
            }
        }

        let links = compute_links(&Lines(vec!["none", "file:///etc/hosts"]));
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].range, Range::new(2, 1, 2, 18));
    }
}
