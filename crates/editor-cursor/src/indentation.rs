//! Indentation helpers: leading whitespace, normalization, and tab-stop indent counts.

use crate::movement::{next_tab_column, prev_tab_column, visible_column_from_column};

/// The leading run of spaces and tabs of `line`.
pub fn leading_whitespace(line: &str) -> &str {
    let end = line
        .find(|ch: char| ch != ' ' && ch != '\t')
        .unwrap_or(line.len());
    &line[..end]
}

/// Offset of the first non-whitespace character, if any. Only spaces and tabs precede it, so
/// the offset is the same in characters and in UTF-16 code units.
pub fn first_non_whitespace_index(line: &str) -> Option<usize> {
    line.chars().position(|ch| ch != ' ' && ch != '\t')
}

/// UTF-16 offset just past the last non-whitespace character that starts at or before
/// `limit` (or anywhere in the line when `limit` is `None`).
pub fn last_non_whitespace_end(line: &str, limit: Option<usize>) -> Option<usize> {
    let mut units = 0;
    let mut end = None;
    for ch in line.chars() {
        if limit.is_some_and(|limit| units > limit) {
            break;
        }
        units += ch.len_utf16();
        if ch != ' ' && ch != '\t' {
            end = Some(units);
        }
    }
    end
}

/// `true` if the line is empty or consists of spaces and tabs only.
pub fn is_whitespace_only(line: &str) -> bool {
    line.chars().all(|ch| ch == ' ' || ch == '\t')
}

/// One indentation unit.
pub fn one_indent(tab_size: usize, insert_spaces: bool) -> String {
    if insert_spaces {
        " ".repeat(tab_size)
    } else {
        "\t".to_string()
    }
}

/// Rewrite the leading whitespace of `text` with tabs or spaces. Tabs count as `tab_size`
/// columns each.
pub fn normalize_indentation(text: &str, tab_size: usize, insert_spaces: bool) -> String {
    let indentation = leading_whitespace(text);
    let rest = &text[indentation.len()..];

    let mut spaces = indentation
        .chars()
        .map(|ch| if ch == '\t' { tab_size } else { 1 })
        .sum::<usize>();

    let mut out = String::with_capacity(text.len());
    if !insert_spaces && tab_size > 0 {
        out.extend(std::iter::repeat_n('\t', spaces / tab_size));
        spaces %= tab_size;
    }
    out.extend(std::iter::repeat_n(' ', spaces));
    out.push_str(rest);
    out
}

/// Number of indent units after indenting content that starts at `column` once more.
pub fn shift_indent_count(line: &str, column: usize, tab_size: usize) -> usize {
    let tab_size = tab_size.max(1);
    let content_start = visible_column_from_column(line, column, tab_size);
    next_tab_column(content_start, tab_size) / tab_size
}

/// Number of indent units after outdenting content that starts at `column` once.
pub fn unshift_indent_count(line: &str, column: usize, tab_size: usize) -> usize {
    let tab_size = tab_size.max(1);
    let content_start = visible_column_from_column(line, column, tab_size);
    prev_tab_column(content_start, tab_size) / tab_size
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leading_whitespace() {
        assert_eq!(leading_whitespace("  \tfoo "), "  \t");
        assert_eq!(leading_whitespace("   "), "   ");
        assert_eq!(first_non_whitespace_index("  x"), Some(2));
        assert_eq!(first_non_whitespace_index(" \t"), None);
        assert_eq!(last_non_whitespace_end("foo    bar", Some(6)), Some(3));
        assert_eq!(last_non_whitespace_end("foo    bar", None), Some(10));
        assert_eq!(last_non_whitespace_end("x😀  ", None), Some(3));
        assert_eq!(last_non_whitespace_end("  ", None), None);
    }

    #[test]
    fn test_normalize_indentation() {
        assert_eq!(normalize_indentation("\tfoo", 2, true), "  foo");
        assert_eq!(normalize_indentation("      x", 4, false), "\t  x");
        assert_eq!(normalize_indentation("", 4, true), "");
        assert_eq!(normalize_indentation(" \t", 4, true), "     ");
    }

    #[test]
    fn test_indent_counts() {
        // Content at visible column 2 with tab size 4.
        assert_eq!(shift_indent_count("  foo", 3, 4), 1);
        assert_eq!(unshift_indent_count("  foo", 3, 4), 0);
        // Content exactly at a tab stop.
        assert_eq!(shift_indent_count("        foo", 9, 4), 3);
        assert_eq!(unshift_indent_count("        foo", 9, 4), 1);
        assert_eq!(unshift_indent_count("", 1, 4), 0);
    }
}
