#![warn(missing_docs)]
//! `editor-cursor-lang` - data-driven language configuration for `editor-cursor`.
//!
//! This crate intentionally stays lightweight and does **not** depend on any parsing or
//! highlighting system. It describes how a language wants the cursor engine to behave:
//!
//! - which character pairs are brackets (bracket matching, electric re-indentation)
//! - which pairs are auto-closed while typing, and in which token contexts they are not
//! - which pairs may surround a selection
//! - what happens when Enter is pressed (on-enter rules and indentation rules)
//! - doc-comment auto-completion (`/**` -> ` */`)
//! - comment tokens, used for the coarse token context of a position
//!
//! A configuration is usually decoded from a [`LanguageConfigurationSource`] (the serde shape of
//! a `language-configuration.json` file) and then queried through
//! [`LanguageConfiguration::on_enter`], [`LanguageConfiguration::should_auto_close_pair`] and
//! [`LanguageConfiguration::on_electric_character`].

use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

/// Errors produced while building a [`LanguageConfiguration`].
#[derive(Debug, Error)]
pub enum LanguageConfigError {
    #[error("regex compile error for pattern '{pattern}': {message}")]
    /// A rule pattern failed to compile.
    InvalidPattern {
        /// The regex pattern string.
        pattern: String,
        /// The compiler error message.
        message: String,
    },

    #[error("invalid auto-closing pair: open '{0}' must be exactly one character")]
    /// Auto-closing pairs are triggered by a single typed character.
    InvalidAutoClosingPair(String),
}

fn compile(pattern: &str) -> Result<Regex, LanguageConfigError> {
    Regex::new(pattern).map_err(|e| LanguageConfigError::InvalidPattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}

/// Comment tokens of a language.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommentConfig {
    /// Line comment token (e.g. `//`, `#`).
    pub line: Option<String>,
    /// Block comment start token (e.g. `/*`).
    pub block_start: Option<String>,
    /// Block comment end token (e.g. `*/`).
    pub block_end: Option<String>,
}

impl CommentConfig {
    /// Line comments only.
    pub fn line(token: impl Into<String>) -> Self {
        Self {
            line: Some(token.into()),
            block_start: None,
            block_end: None,
        }
    }

    /// Both line and block comments.
    pub fn line_and_block(
        line: impl Into<String>,
        block_start: impl Into<String>,
        block_end: impl Into<String>,
    ) -> Self {
        Self {
            line: Some(line.into()),
            block_start: Some(block_start.into()),
            block_end: Some(block_end.into()),
        }
    }

    fn line_token(&self) -> Option<Vec<char>> {
        self.line
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(|s| s.chars().collect())
    }

    fn block_tokens(&self) -> Option<(Vec<char>, Vec<char>)> {
        match (self.block_start.as_deref(), self.block_end.as_deref()) {
            (Some(start), Some(end)) if !start.is_empty() && !end.is_empty() => {
                Some((start.chars().collect(), end.chars().collect()))
            }
            _ => None,
        }
    }
}

/// Coarse token classification used for token-context aware decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StandardTokenType {
    /// Anything that is not a comment, string or regex literal.
    #[default]
    Other,
    /// Comment token.
    Comment,
    /// String literal token.
    String,
    /// Regular expression literal token.
    RegEx,
}

/// What the engine should do with indentation when Enter is pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IndentAction {
    /// Keep the indentation of the current line.
    #[default]
    None,
    /// Indent the new line once.
    Indent,
    /// Insert two new lines: the first indented once, the second keeping the current
    /// indentation. The cursor lands on the first one.
    IndentOutdent,
    /// Outdent the new line once.
    Outdent,
}

/// The action to perform when Enter is pressed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EnterAction {
    /// Indentation behaviour.
    pub indent_action: IndentAction,
    /// Text appended after the indentation on the new line.
    ///
    /// `None` means "use the default", which is one indent unit for `Indent` and
    /// `IndentOutdent`, and nothing otherwise.
    pub append_text: Option<String>,
    /// Number of characters to remove from the indentation of the new line.
    pub remove_text: usize,
}

impl EnterAction {
    /// Create an action with only an indent action set.
    pub fn new(indent_action: IndentAction) -> Self {
        Self {
            indent_action,
            append_text: None,
            remove_text: 0,
        }
    }

    /// Set the appended text.
    pub fn with_append_text(mut self, text: impl Into<String>) -> Self {
        self.append_text = Some(text.into());
        self
    }
}

/// A regex-driven on-enter rule.
#[derive(Debug, Clone)]
pub struct OnEnterRule {
    before_text: Regex,
    after_text: Option<Regex>,
    action: EnterAction,
}

impl OnEnterRule {
    /// Create a rule matching the text before the cursor (and optionally the text after it).
    pub fn new(
        before_text: &str,
        after_text: Option<&str>,
        action: EnterAction,
    ) -> Result<Self, LanguageConfigError> {
        Ok(Self {
            before_text: compile(before_text)?,
            after_text: after_text.map(compile).transpose()?,
            action,
        })
    }

    fn matches(&self, before: &str, after: &str) -> bool {
        if !self.before_text.is_match(before) {
            return false;
        }
        match &self.after_text {
            Some(re) => re.is_match(after),
            None => true,
        }
    }
}

/// Indentation rules (regex-based).
#[derive(Debug, Clone, Default)]
pub struct IndentationRules {
    /// If the text before the cursor matches, the next line is indented.
    pub increase_indent_pattern: Option<Regex>,
    /// If the text before the cursor matches, the next line is outdented.
    pub decrease_indent_pattern: Option<Regex>,
}

/// A bracket pair.
#[derive(Debug, Clone)]
pub struct BracketPair {
    /// Opening bracket text.
    pub open: String,
    /// Closing bracket text.
    pub close: String,
    open_at_end: Regex,
    close_at_start: Regex,
}

impl BracketPair {
    /// Create a bracket pair.
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Result<Self, LanguageConfigError> {
        let open = open.into();
        let close = close.into();
        let open_at_end = compile(&format!(r"{}\s*$", regex::escape(&open)))?;
        let close_at_start = compile(&format!(r"^\s*{}", regex::escape(&close)))?;
        Ok(Self {
            open,
            close,
            open_at_end,
            close_at_start,
        })
    }
}

/// An auto-closing pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoClosingPair {
    /// Typed character that triggers auto-closing.
    pub open: char,
    /// Text inserted after the cursor.
    pub close: String,
    /// Token contexts in which auto-closing is suppressed.
    pub not_in: Vec<StandardTokenType>,
}

impl AutoClosingPair {
    /// Create a pair that auto-closes everywhere.
    pub fn new(open: char, close: impl Into<String>) -> Self {
        Self {
            open,
            close: close.into(),
            not_in: Vec::new(),
        }
    }

    /// Suppress auto-closing inside the given token types.
    pub fn not_in(mut self, tokens: &[StandardTokenType]) -> Self {
        self.not_in = tokens.to_vec();
        self
    }
}

/// Doc comment auto-completion (typing `/**` appends ` */`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DocComment {
    /// Opening sequence.
    pub open: String,
    /// Text appended after the cursor.
    pub close: String,
}

/// Result of typing an electric character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElectricAction {
    /// Re-indent the current line to match the line holding the opening bracket for `close`.
    MatchOpenBracket {
        /// The closing bracket text that was just completed.
        close: String,
    },
    /// Insert `text` after the cursor, then advance the cursor by `advance_count`.
    AppendText {
        /// Text to append.
        text: String,
        /// Number of appended characters the cursor should skip over.
        advance_count: usize,
    },
}

/// The serde shape of a language configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LanguageConfigurationSource {
    /// `[open, close]` bracket pairs.
    pub brackets: Vec<(String, String)>,
    /// Auto-closing pairs.
    pub auto_closing_pairs: Vec<AutoClosingPairSource>,
    /// `[open, close]` surrounding pairs. Defaults to the auto-closing pairs when empty.
    pub surrounding_pairs: Vec<(String, String)>,
    /// On-enter rules.
    pub on_enter_rules: Vec<OnEnterRuleSource>,
    /// Indentation rules.
    pub indentation_rules: Option<IndentationRulesSource>,
    /// Doc comment completion.
    pub doc_comment: Option<DocComment>,
    /// Comment tokens.
    pub comments: Option<CommentsSource>,
}

/// The serde shape of comment tokens.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CommentsSource {
    /// Line comment token.
    pub line_comment: Option<String>,
    /// `[start, end]` block comment tokens.
    pub block_comment: Option<(String, String)>,
}

impl From<CommentsSource> for CommentConfig {
    fn from(source: CommentsSource) -> Self {
        let (block_start, block_end) = source.block_comment.unzip();
        Self {
            line: source.line_comment,
            block_start,
            block_end,
        }
    }
}

/// The serde shape of an auto-closing pair.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoClosingPairSource {
    /// Opening character.
    pub open: String,
    /// Closing text.
    pub close: String,
    /// Token contexts in which auto-closing is suppressed.
    #[serde(default)]
    pub not_in: Vec<StandardTokenType>,
}

/// The serde shape of an on-enter rule.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnEnterRuleSource {
    /// Pattern tested against the text before the cursor.
    pub before_text: String,
    /// Optional pattern tested against the text after the cursor.
    #[serde(default)]
    pub after_text: Option<String>,
    /// Action to perform.
    pub action: EnterAction,
}

/// The serde shape of indentation rules.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IndentationRulesSource {
    /// Increase-indent pattern.
    pub increase_indent_pattern: Option<String>,
    /// Decrease-indent pattern.
    pub decrease_indent_pattern: Option<String>,
}

/// A compiled language configuration.
#[derive(Debug, Clone, Default)]
pub struct LanguageConfiguration {
    brackets: Vec<BracketPair>,
    auto_closing_pairs: Vec<AutoClosingPair>,
    surrounding_pairs: Vec<(char, char)>,
    on_enter_rules: Vec<OnEnterRule>,
    indentation_rules: Option<IndentationRules>,
    doc_comment: Option<DocComment>,
    comments: CommentConfig,
}

#[derive(Clone, Copy)]
enum LexState {
    Code,
    BlockComment,
    Str(char),
}

fn starts_with_at(chars: &[char], at: usize, token: &[char]) -> bool {
    chars.get(at..at + token.len()).is_some_and(|s| s == token)
}

impl LanguageConfiguration {
    /// A configuration with no brackets and no rules (plain text).
    pub fn plain() -> Self {
        Self::default()
    }

    /// A configuration for C-like languages: `{}`, `[]`, `()` brackets, quote pairs that do
    /// not auto-close inside strings and comments, and `/** */` doc comments.
    pub fn c_like() -> Self {
        let brackets = [("{", "}"), ("[", "]"), ("(", ")")]
            .into_iter()
            .filter_map(|(o, c)| BracketPair::new(o, c).ok())
            .collect();

        let no_strings = [StandardTokenType::String, StandardTokenType::Comment];
        let auto_closing_pairs = vec![
            AutoClosingPair::new('{', "}"),
            AutoClosingPair::new('[', "]"),
            AutoClosingPair::new('(', ")"),
            AutoClosingPair::new('"', "\"").not_in(&no_strings),
            AutoClosingPair::new('\'', "'").not_in(&no_strings),
        ];

        Self {
            brackets,
            auto_closing_pairs,
            surrounding_pairs: Vec::new(),
            on_enter_rules: Vec::new(),
            indentation_rules: None,
            doc_comment: Some(DocComment {
                open: "/**".to_string(),
                close: " */".to_string(),
            }),
            comments: CommentConfig::line_and_block("//", "/*", "*/"),
        }
    }

    /// Compile a configuration from its serde shape.
    pub fn from_source(source: LanguageConfigurationSource) -> Result<Self, LanguageConfigError> {
        let brackets = source
            .brackets
            .into_iter()
            .map(|(open, close)| BracketPair::new(open, close))
            .collect::<Result<Vec<_>, _>>()?;

        let mut auto_closing_pairs = Vec::with_capacity(source.auto_closing_pairs.len());
        for pair in source.auto_closing_pairs {
            let open = single_char(&pair.open)?;
            auto_closing_pairs.push(AutoClosingPair {
                open,
                close: pair.close,
                not_in: pair.not_in,
            });
        }

        let mut surrounding_pairs = Vec::with_capacity(source.surrounding_pairs.len());
        for (open, close) in source.surrounding_pairs {
            surrounding_pairs.push((single_char(&open)?, single_char(&close)?));
        }

        let on_enter_rules = source
            .on_enter_rules
            .into_iter()
            .map(|r| OnEnterRule::new(&r.before_text, r.after_text.as_deref(), r.action))
            .collect::<Result<Vec<_>, _>>()?;

        let indentation_rules = match source.indentation_rules {
            Some(rules) => Some(IndentationRules {
                increase_indent_pattern: rules.increase_indent_pattern.as_deref().map(compile).transpose()?,
                decrease_indent_pattern: rules.decrease_indent_pattern.as_deref().map(compile).transpose()?,
            }),
            None => None,
        };

        Ok(Self {
            brackets,
            auto_closing_pairs,
            surrounding_pairs,
            on_enter_rules,
            indentation_rules,
            doc_comment: source.doc_comment,
            comments: source.comments.map(CommentConfig::from).unwrap_or_default(),
        })
    }

    /// Add an on-enter rule. Rules are tested in insertion order.
    pub fn with_on_enter_rule(mut self, rule: OnEnterRule) -> Self {
        self.on_enter_rules.push(rule);
        self
    }

    /// Set the indentation rules.
    pub fn with_indentation_rules(mut self, rules: IndentationRules) -> Self {
        self.indentation_rules = Some(rules);
        self
    }

    /// Replace the surrounding pairs.
    pub fn with_surrounding_pairs(mut self, pairs: Vec<(char, char)>) -> Self {
        self.surrounding_pairs = pairs;
        self
    }

    /// Replace the comment tokens.
    pub fn with_comments(mut self, comments: CommentConfig) -> Self {
        self.comments = comments;
        self
    }

    /// Comment tokens.
    pub fn comments(&self) -> &CommentConfig {
        &self.comments
    }

    /// Bracket pairs.
    pub fn brackets(&self) -> &[BracketPair] {
        &self.brackets
    }

    /// Auto-closing pairs.
    pub fn auto_closing_pairs(&self) -> &[AutoClosingPair] {
        &self.auto_closing_pairs
    }

    /// Surrounding pairs; falls back to the single-character auto-closing pairs when none were
    /// configured.
    pub fn surrounding_pairs(&self) -> Vec<(char, char)> {
        if !self.surrounding_pairs.is_empty() {
            return self.surrounding_pairs.clone();
        }
        self.auto_closing_pairs
            .iter()
            .filter_map(|p| {
                let mut chars = p.close.chars();
                match (chars.next(), chars.next()) {
                    (Some(close), None) => Some((p.open, close)),
                    _ => None,
                }
            })
            .collect()
    }

    /// Characters whose insertion may trigger [`Self::on_electric_character`].
    pub fn electric_characters(&self) -> Vec<char> {
        let mut out: Vec<char> = self
            .brackets
            .iter()
            .filter_map(|b| b.close.chars().last())
            .collect();
        if let Some(last) = self.doc_comment.as_ref().and_then(|d| d.open.chars().last()) {
            out.push(last);
        }
        out.sort_unstable();
        out.dedup();
        out
    }

    /// Compute the raw enter action for a cursor splitting a line into `before` / `after`.
    ///
    /// Returns `None` when no rule applies. Precedence: explicit on-enter rules, then the
    /// `IndentOutdent` bracket special case, then indentation rules, then open-bracket indent.
    pub fn on_enter(&self, _line_above: &str, before: &str, after: &str) -> Option<EnterAction> {
        if let Some(rule) = self.on_enter_rules.iter().find(|r| r.matches(before, after)) {
            return Some(rule.action.clone());
        }

        if !before.is_empty() && !after.is_empty() {
            let between_pair = self
                .brackets
                .iter()
                .any(|b| b.open_at_end.is_match(before) && b.close_at_start.is_match(after));
            if between_pair {
                return Some(EnterAction::new(IndentAction::IndentOutdent));
            }
        }

        if let Some(rules) = &self.indentation_rules {
            if rules
                .increase_indent_pattern
                .as_ref()
                .is_some_and(|re| re.is_match(before))
            {
                return Some(EnterAction::new(IndentAction::Indent));
            }
            if rules
                .decrease_indent_pattern
                .as_ref()
                .is_some_and(|re| re.is_match(before))
            {
                return Some(EnterAction::new(IndentAction::Outdent));
            }
        }

        if !before.is_empty() && self.brackets.iter().any(|b| b.open_at_end.is_match(before)) {
            return Some(EnterAction::new(IndentAction::Indent));
        }

        None
    }

    /// Whether typing `open` inside a token of type `token` should auto-close.
    pub fn should_auto_close_pair(&self, open: char, token: StandardTokenType) -> bool {
        self.auto_closing_pairs
            .iter()
            .filter(|p| p.open == open)
            .all(|p| !p.not_in.contains(&token))
    }

    /// Characters that delimit string literals: the symmetric auto-closing pairs that are
    /// suppressed inside strings.
    fn string_quotes(&self) -> Vec<char> {
        self.auto_closing_pairs
            .iter()
            .filter(|p| p.not_in.contains(&StandardTokenType::String))
            .filter(|p| {
                let mut close = p.close.chars();
                close.next() == Some(p.open) && close.next().is_none()
            })
            .map(|p| p.open)
            .collect()
    }

    /// The token context after the first `offset` characters of `line`.
    ///
    /// This is a single-line scan: comments and strings are recognised from the configured
    /// comment tokens and string quotes, and a block comment opened on an earlier line is not
    /// seen.
    pub fn token_type_at(&self, line: &str, offset: usize) -> StandardTokenType {
        let chars: Vec<char> = line.chars().collect();
        let end = offset.min(chars.len());
        let line_token = self.comments.line_token();
        let block = self.comments.block_tokens();
        let quotes = self.string_quotes();

        let mut state = LexState::Code;
        let mut i = 0;
        while i < end {
            match state {
                LexState::Code => {
                    if let Some(token) = &line_token
                        && i + token.len() <= end
                        && starts_with_at(&chars, i, token)
                    {
                        return StandardTokenType::Comment;
                    }
                    if let Some((start, _)) = &block
                        && i + start.len() <= end
                        && starts_with_at(&chars, i, start)
                    {
                        state = LexState::BlockComment;
                        i += start.len();
                        continue;
                    }
                    if quotes.contains(&chars[i]) {
                        state = LexState::Str(chars[i]);
                    }
                    i += 1;
                }
                LexState::BlockComment => {
                    if let Some((_, close)) = &block
                        && i + close.len() <= end
                        && starts_with_at(&chars, i, close)
                    {
                        state = LexState::Code;
                        i += close.len();
                    } else {
                        i += 1;
                    }
                }
                LexState::Str(quote) => {
                    if chars[i] == '\\' {
                        i += 2;
                    } else {
                        if chars[i] == quote {
                            state = LexState::Code;
                        }
                        i += 1;
                    }
                }
            }
        }

        match state {
            LexState::Code => StandardTokenType::Other,
            LexState::BlockComment => StandardTokenType::Comment,
            LexState::Str(_) => StandardTokenType::String,
        }
    }

    /// Decide what to do after an electric character was typed.
    ///
    /// `offset` is the character index of the typed character in `line`.
    pub fn on_electric_character(&self, line: &str, offset: usize) -> Option<ElectricAction> {
        let prefix: String = line.chars().take(offset + 1).collect();
        if prefix.chars().count() != offset + 1 {
            return None;
        }

        if let Some(doc) = &self.doc_comment
            && !doc.open.is_empty()
            && prefix.ends_with(&doc.open)
        {
            let rest: String = line.chars().skip(offset + 1).collect();
            if !rest.trim_start().starts_with(doc.close.trim_start()) {
                return Some(ElectricAction::AppendText {
                    text: doc.close.clone(),
                    advance_count: 0,
                });
            }
        }

        self.brackets.iter().find_map(|b| {
            let head = prefix.strip_suffix(b.close.as_str())?;
            if head.chars().all(|c| c == ' ' || c == '\t') {
                Some(ElectricAction::MatchOpenBracket {
                    close: b.close.clone(),
                })
            } else {
                None
            }
        })
    }
}

fn single_char(text: &str) -> Result<char, LanguageConfigError> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(LanguageConfigError::InvalidAutoClosingPair(text.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_on_enter_between_brackets_is_indent_outdent() {
        let conf = LanguageConfiguration::c_like();
        let action = conf.on_enter("", "function f() {", "}").unwrap();
        assert_eq!(action.indent_action, IndentAction::IndentOutdent);
    }

    #[test]
    fn test_on_enter_after_open_bracket_indents() {
        let conf = LanguageConfiguration::c_like();
        let action = conf.on_enter("", "if (x) {", "").unwrap();
        assert_eq!(action.indent_action, IndentAction::Indent);
        assert!(conf.on_enter("", "let x = 1;", "").is_none());
    }

    #[test]
    fn test_explicit_rule_wins_over_brackets() {
        let rule = OnEnterRule::new(
            r"^\s*/\*\*(?!/)([^*]|\*(?!/))*$",
            None,
            EnterAction::new(IndentAction::None).with_append_text(" * "),
        );
        // The regex crate has no look-around; the pattern must be rejected.
        assert!(matches!(rule, Err(LanguageConfigError::InvalidPattern { .. })));

        let rule = OnEnterRule::new(
            r"^\s*/\*\*[^/]*$",
            None,
            EnterAction::new(IndentAction::None).with_append_text(" * "),
        )
        .unwrap();
        let conf = LanguageConfiguration::c_like().with_on_enter_rule(rule);
        let action = conf.on_enter("", "/** {", "").unwrap();
        assert_eq!(action.append_text.as_deref(), Some(" * "));
    }

    #[test]
    fn test_should_auto_close_respects_not_in() {
        let conf = LanguageConfiguration::c_like();
        assert!(conf.should_auto_close_pair('"', StandardTokenType::Other));
        assert!(!conf.should_auto_close_pair('"', StandardTokenType::String));
        assert!(conf.should_auto_close_pair('(', StandardTokenType::String));
    }

    #[test]
    fn test_electric_close_bracket_only_after_whitespace() {
        let conf = LanguageConfiguration::c_like();
        assert_eq!(
            conf.on_electric_character("    }", 4),
            Some(ElectricAction::MatchOpenBracket {
                close: "}".to_string()
            })
        );
        assert_eq!(conf.on_electric_character("foo }", 4), None);
    }

    #[test]
    fn test_electric_doc_comment_appends_close() {
        let conf = LanguageConfiguration::c_like();
        assert_eq!(
            conf.on_electric_character("  /**", 4),
            Some(ElectricAction::AppendText {
                text: " */".to_string(),
                advance_count: 0
            })
        );
        assert_eq!(conf.on_electric_character("  /** */", 4), None);
    }

    #[test]
    fn test_from_source_json() {
        let json = r##"{
            "brackets": [["{", "}"], ["(", ")"]],
            "autoClosingPairs": [
                { "open": "{", "close": "}" },
                { "open": "\"", "close": "\"", "notIn": ["string"] }
            ],
            "indentationRules": { "increaseIndentPattern": ":\\s*$" },
            "onEnterRules": [
                { "beforeText": "^\\s*#", "action": { "indentAction": "none", "appendText": "# " } }
            ]
        }"##;
        let source: LanguageConfigurationSource = serde_json::from_str(json).unwrap();
        let conf = LanguageConfiguration::from_source(source).unwrap();

        assert_eq!(conf.brackets().len(), 2);
        assert_eq!(conf.surrounding_pairs(), vec![('{', '}'), ('"', '"')]);
        assert_eq!(
            conf.on_enter("", "def f():", "").map(|a| a.indent_action),
            Some(IndentAction::Indent)
        );
        assert_eq!(
            conf.on_enter("", "  # note", "").and_then(|a| a.append_text),
            Some("# ".to_string())
        );
        assert!(!conf.should_auto_close_pair('"', StandardTokenType::String));
    }

    #[test]
    fn test_token_type_at_tracks_strings_and_comments() {
        let conf = LanguageConfiguration::c_like();
        let line = r#"let s = "a\"b"; // note"#;
        assert_eq!(conf.token_type_at(line, 4), StandardTokenType::Other);
        assert_eq!(conf.token_type_at(line, 9), StandardTokenType::String);
        // The escaped quote does not end the string.
        assert_eq!(conf.token_type_at(line, 12), StandardTokenType::String);
        assert_eq!(conf.token_type_at(line, 14), StandardTokenType::Other);
        assert_eq!(conf.token_type_at(line, 19), StandardTokenType::Comment);

        assert_eq!(conf.token_type_at("a /* b */ c", 5), StandardTokenType::Comment);
        assert_eq!(conf.token_type_at("a /* b */ c", 10), StandardTokenType::Other);
        assert_eq!(
            LanguageConfiguration::plain().token_type_at("// x", 4),
            StandardTokenType::Other
        );
    }

    #[test]
    fn test_comments_from_source() {
        let json = r##"{ "comments": { "lineComment": "#", "blockComment": ["=begin", "=end"] } }"##;
        let source: LanguageConfigurationSource = serde_json::from_str(json).unwrap();
        let conf = LanguageConfiguration::from_source(source).unwrap();
        assert_eq!(conf.comments().line.as_deref(), Some("#"));
        assert_eq!(conf.comments().block_end.as_deref(), Some("=end"));
        assert_eq!(conf.token_type_at("x # y", 4), StandardTokenType::Comment);
    }

    #[test]
    fn test_from_source_rejects_multi_char_open() {
        let source = LanguageConfigurationSource {
            auto_closing_pairs: vec![AutoClosingPairSource {
                open: "/*".to_string(),
                close: "*/".to_string(),
                not_in: Vec::new(),
            }],
            ..Default::default()
        };
        assert!(matches!(
            LanguageConfiguration::from_source(source),
            Err(LanguageConfigError::InvalidAutoClosingPair(_))
        ));
    }
}
