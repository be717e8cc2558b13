use editor_cursor::operations::CursorOperation;
use editor_cursor::{
    EditorOptions, EditorSession, Position, Selection, WordNavigationType, WrapMode, WrapOptions,
    compute_links,
};
use editor_cursor_lang::LanguageConfiguration;
use pretty_assertions::assert_eq;

fn plain(text: &str) -> EditorSession {
    EditorSession::new(text, LanguageConfiguration::plain(), EditorOptions::default()).unwrap()
}

fn c_like(text: &str) -> EditorSession {
    EditorSession::new(text, LanguageConfiguration::c_like(), EditorOptions::default()).unwrap()
}

fn at(line: usize, column: usize) -> Selection {
    Selection::collapsed(Position::new(line, column))
}

#[test]
fn test_vertical_moves_keep_the_desired_column() {
    let mut s = plain("hello world\nab\nhello world");
    s.set_selections(&[at(1, 10)]);

    s.execute(CursorOperation::MoveDown { select: false }).unwrap();
    assert_eq!(s.primary_selection(), at(2, 3));
    s.execute(CursorOperation::MoveDown { select: false }).unwrap();
    assert_eq!(s.primary_selection(), at(3, 10));
}

#[test]
fn test_horizontal_move_collapses_selection() {
    let mut s = plain("abcdef");
    s.set_selections(&[Selection::new(1, 2, 1, 5)]);
    s.execute(CursorOperation::MoveLeft { select: false }).unwrap();
    assert_eq!(s.primary_selection(), at(1, 2));

    s.set_selections(&[Selection::new(1, 5, 1, 2)]);
    s.execute(CursorOperation::MoveRight { select: false }).unwrap();
    assert_eq!(s.primary_selection(), at(1, 5));
}

#[test]
fn test_auto_closed_bracket_is_typed_over() {
    let mut s = c_like("");
    s.type_text("(").unwrap();
    assert_eq!(s.text(), "()");
    assert_eq!(s.primary_selection(), at(1, 2));

    s.type_text(")").unwrap();
    assert_eq!(s.text(), "()");
    assert_eq!(s.primary_selection(), at(1, 3));
}

#[test]
fn test_delete_left_removes_auto_closed_pair() {
    let mut s = c_like("");
    s.type_text("[").unwrap();
    s.execute(CursorOperation::DeleteLeft).unwrap();
    assert_eq!(s.text(), "");
}

#[test]
fn test_select_all() {
    let mut s = plain("ab\ncd");
    s.execute(CursorOperation::SelectAll).unwrap();
    assert_eq!(s.primary_selection(), Selection::new(1, 1, 2, 3));
}

#[test]
fn test_enter_between_braces_indents_and_undoes_in_one_step() {
    let mut s = c_like("fn main() ");
    s.set_selections(&[at(1, 11)]);
    s.type_text("{").unwrap();
    s.execute(CursorOperation::Type { ch: '\n' }).unwrap();
    assert_eq!(s.text(), "fn main() {\n    \n}");
    assert_eq!(s.primary_selection(), at(2, 5));

    assert!(s.undo());
    assert_eq!(s.text(), "fn main() {}");
    assert_eq!(s.primary_selection(), at(1, 12));
}

#[test]
fn test_delete_word_left_whitespace_heuristics() {
    let cases = [
        ("foo    bar", 8, "foobar"),
        ("foo  bar", 6, "foobar"),
        ("foo bar", 5, "bar"),
    ];
    for (text, column, expected) in cases {
        let mut s = plain(text);
        s.set_selections(&[at(1, column)]);
        s.execute(CursorOperation::DeleteWordLeft {
            whitespace_heuristics: true,
            word_navigation: WordNavigationType::WordStart,
        })
        .unwrap();
        assert_eq!(s.text(), expected, "{text:?} at column {column}");
    }
}

#[test]
fn test_column_select_then_type() {
    let mut s = plain("abc\ndef\nghi");
    s.set_selections(&[at(1, 2)]);
    s.execute(CursorOperation::ColumnSelectDown { page: false }).unwrap();
    s.execute(CursorOperation::ColumnSelectDown { page: false }).unwrap();
    s.execute(CursorOperation::ColumnSelectRight).unwrap();
    assert_eq!(
        s.selections(),
        vec![
            Selection::new(1, 2, 1, 3),
            Selection::new(2, 2, 2, 3),
            Selection::new(3, 2, 3, 3),
        ]
    );

    s.type_text("X").unwrap();
    assert_eq!(s.text(), "aXc\ndXf\ngXi");
}

#[test]
fn test_cut_empty_selection_removes_line() {
    let mut s = plain("a\nb\nc");
    s.set_selections(&[at(2, 1)]);
    s.execute(CursorOperation::Cut).unwrap();
    assert_eq!(s.text(), "a\nc");

    let mut s = plain("a\nb");
    s.set_selections(&[at(2, 1)]);
    s.execute(CursorOperation::Cut).unwrap();
    assert_eq!(s.text(), "a");
}

#[test]
fn test_cut_without_empty_selection_clipboard_is_a_no_op() {
    let options = EditorOptions {
        empty_selection_clipboard: false,
        ..EditorOptions::default()
    };
    let mut s = EditorSession::new("a\nb", LanguageConfiguration::plain(), options).unwrap();
    assert!(s.execute(CursorOperation::Cut).unwrap().is_handled());
    assert_eq!(s.text(), "a\nb");
}

#[test]
fn test_paste_full_line_above_cursor() {
    let mut s = plain("abc\ndef");
    s.set_selections(&[at(2, 2)]);
    s.execute(CursorOperation::Paste {
        text: "xyz\n".to_string(),
        paste_on_new_line: true,
    })
    .unwrap();
    assert_eq!(s.text(), "abc\nxyz\ndef");
    assert_eq!(s.primary_selection(), at(3, 2));
}

#[test]
fn test_tab_on_empty_line_and_mid_line() {
    let mut s = plain("");
    s.execute(CursorOperation::Tab).unwrap();
    assert_eq!(s.text(), "    ");

    let mut s = plain("ab");
    s.set_selections(&[at(1, 2)]);
    s.execute(CursorOperation::Tab).unwrap();
    assert_eq!(s.text(), "a   b");
    assert_eq!(s.primary_selection(), at(1, 5));
}

#[test]
fn test_indent_and_outdent_lines() {
    let mut s = plain("a\nb");
    s.set_selections(&[Selection::new(1, 1, 2, 2)]);
    s.execute(CursorOperation::Indent).unwrap();
    assert_eq!(s.text(), "    a\n    b");

    s.execute(CursorOperation::Outdent).unwrap();
    assert_eq!(s.text(), "a\nb");
}

#[test]
fn test_undo_redo_typing() {
    let mut s = plain("");
    s.type_text("hello").unwrap();
    s.execute(CursorOperation::MoveToBeginningOfLine { select: false }).unwrap();
    s.type_text("> ").unwrap();
    assert_eq!(s.text(), "> hello");

    assert!(s.undo());
    assert_eq!(s.text(), "hello");
    assert!(s.undo());
    assert_eq!(s.text(), "");
    assert!(!s.undo());

    assert!(s.redo());
    assert_eq!(s.text(), "hello");
    assert_eq!(s.primary_selection(), at(1, 6));
}

#[test]
fn test_moves_follow_wrapped_lines() {
    let mut s = plain("abcdefghijklmno");
    s.set_wrap_options(WrapOptions {
        viewport_width: 10,
        wrap_mode: WrapMode::Char,
        ..WrapOptions::default()
    });
    s.set_selections(&[at(1, 3)]);

    s.execute(CursorOperation::MoveDown { select: false }).unwrap();
    assert_eq!(s.primary_selection(), at(1, 13));
    s.execute(CursorOperation::MoveUp { select: false }).unwrap();
    assert_eq!(s.primary_selection(), at(1, 3));
}

#[test]
fn test_links_in_document() {
    let s = plain("docs: https://docs.rs/ropey\nnone here\n(file:///tmp/a.txt).");
    let urls: Vec<String> = compute_links(s.model()).into_iter().map(|l| l.url).collect();
    assert_eq!(urls, vec!["https://docs.rs/ropey", "file:///tmp/a.txt"]);
}
