//! Editor options and the derived per-configuration cursor settings.
//!
//! [`EditorOptions`] is the user-facing, serde-decodable settings bag. It is validated and
//! compiled into a [`CursorConfiguration`] (shared between cursors through `Arc`); the word
//! separator classifier is built once per configuration and dropped with it, so changing the
//! separators means building a new configuration.
//!
//! [`ModeConfiguration`] holds the language-derived tables the typing interceptors consult.

use crate::classifier::WordCharacterClassifier;
use crate::error::CursorError;
use crate::model::TextModelOptions;
use editor_cursor_lang::LanguageConfiguration;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};

/// Default word separators.
pub const DEFAULT_WORD_SEPARATORS: &str = "`~!@#$%^&*()-=+[{]}\\|;:'\",.<>/?";

/// User-facing editor options.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorOptions {
    /// Width of a tab stop.
    pub tab_size: usize,
    /// Indent with spaces instead of tabs.
    pub insert_spaces: bool,
    /// Characters that separate words.
    pub word_separators: String,
    /// Auto-close brackets and quotes while typing.
    pub auto_closing_brackets: bool,
    /// Backspace inside indentation deletes to the previous tab stop.
    pub use_tab_stops: bool,
    /// Cut with an empty selection cuts the whole line.
    pub empty_selection_clipboard: bool,
    /// Remove whitespace inserted by auto-indentation once the cursor leaves the line.
    pub trim_auto_whitespace: bool,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            tab_size: 4,
            insert_spaces: true,
            word_separators: DEFAULT_WORD_SEPARATORS.to_string(),
            auto_closing_brackets: true,
            use_tab_stops: true,
            empty_selection_clipboard: true,
            trim_auto_whitespace: true,
        }
    }
}

impl EditorOptions {
    /// Reject option values the engine cannot work with.
    pub fn validate(&self) -> Result<(), CursorError> {
        if self.tab_size == 0 {
            return Err(CursorError::InvalidOptions(
                "tabSize must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// The indentation options a document should use.
    pub fn model_options(&self) -> TextModelOptions {
        TextModelOptions {
            tab_size: self.tab_size,
            insert_spaces: self.insert_spaces,
        }
    }
}

/// Validated cursor settings.
#[derive(Debug, Clone)]
pub struct CursorConfiguration {
    /// Word separator classifier.
    pub word_separators: WordCharacterClassifier,
    /// Auto-close brackets and quotes.
    pub auto_closing_brackets: bool,
    /// Tab-stop aware backspace.
    pub use_tab_stops: bool,
    /// Full-line cut on empty selection.
    pub empty_selection_clipboard: bool,
    /// Trim auto-inserted whitespace.
    pub trim_auto_whitespace: bool,
}

impl CursorConfiguration {
    /// Validate `options` and build the configuration.
    pub fn new(options: &EditorOptions) -> Result<Self, CursorError> {
        options.validate()?;
        Ok(Self {
            word_separators: WordCharacterClassifier::new(&options.word_separators),
            auto_closing_brackets: options.auto_closing_brackets,
            use_tab_stops: options.use_tab_stops,
            empty_selection_clipboard: options.empty_selection_clipboard,
            trim_auto_whitespace: options.trim_auto_whitespace,
        })
    }
}

impl Default for CursorConfiguration {
    fn default() -> Self {
        let options = EditorOptions::default();
        Self {
            word_separators: WordCharacterClassifier::new(&options.word_separators),
            auto_closing_brackets: options.auto_closing_brackets,
            use_tab_stops: options.use_tab_stops,
            empty_selection_clipboard: options.empty_selection_clipboard,
            trim_auto_whitespace: options.trim_auto_whitespace,
        }
    }
}

/// Language-derived lookup tables for typing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModeConfiguration {
    /// Open character -> text inserted after the cursor.
    pub auto_closing_pairs_open: HashMap<char, String>,
    /// Single-character close -> its open character.
    pub auto_closing_pairs_close: HashMap<char, char>,
    /// Open character -> close character used to wrap a selection.
    pub surrounding_pairs: HashMap<char, char>,
    /// Characters whose insertion may re-indent the line.
    pub electric_chars: HashSet<char>,
}

impl ModeConfiguration {
    /// Derive the tables from a language configuration.
    pub fn from_language(language: &LanguageConfiguration) -> Self {
        let mut auto_closing_pairs_open = HashMap::new();
        let mut auto_closing_pairs_close = HashMap::new();
        for pair in language.auto_closing_pairs() {
            auto_closing_pairs_open.insert(pair.open, pair.close.clone());
            let mut close = pair.close.chars();
            if let (Some(c), None) = (close.next(), close.next()) {
                auto_closing_pairs_close.insert(c, pair.open);
            }
        }

        Self {
            auto_closing_pairs_open,
            auto_closing_pairs_close,
            surrounding_pairs: language.surrounding_pairs().into_iter().collect(),
            electric_chars: language.electric_characters().into_iter().collect(),
        }
    }

    /// `true` if `close` is the single character that `open` auto-closes with.
    pub fn closes_pair(&self, open: char, close: char) -> bool {
        self.auto_closing_pairs_open.get(&open).is_some_and(|text| {
            let mut chars = text.chars();
            chars.next() == Some(close) && chars.next().is_none()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_decode_with_defaults() {
        let options: EditorOptions =
            serde_json::from_str(r#"{ "tabSize": 2, "useTabStops": false }"#).unwrap();
        assert_eq!(options.tab_size, 2);
        assert!(!options.use_tab_stops);
        assert!(options.insert_spaces);
        assert_eq!(options.word_separators, DEFAULT_WORD_SEPARATORS);
    }

    #[test]
    fn test_zero_tab_size_is_rejected() {
        let options = EditorOptions {
            tab_size: 0,
            ..Default::default()
        };
        assert!(matches!(
            CursorConfiguration::new(&options),
            Err(CursorError::InvalidOptions(_))
        ));
    }

    #[test]
    fn test_mode_configuration_from_c_like() {
        let mode = ModeConfiguration::from_language(&LanguageConfiguration::c_like());
        assert_eq!(mode.auto_closing_pairs_open.get(&'(').map(String::as_str), Some(")"));
        assert_eq!(mode.auto_closing_pairs_close.get(&')'), Some(&'('));
        assert_eq!(mode.surrounding_pairs.get(&'"'), Some(&'"'));
        assert!(mode.electric_chars.contains(&'}'));
        assert!(mode.closes_pair('[', ']'));
        assert!(!mode.closes_pair('[', ')'));
    }
}
