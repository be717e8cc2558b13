//! Multi-cursor example
//!
//! Drives an `EditorSession` through a short editing script and prints the document after
//! each step.

use editor_cursor::operations::CursorOperation;
use editor_cursor::{EditorOptions, EditorSession, Position, Selection, WordNavigationType};
use editor_cursor_lang::LanguageConfiguration;

fn show(step: &str, session: &EditorSession) {
    println!("{step}:");
    for line in session.text().lines() {
        println!("  | {line}");
    }
    let selections: Vec<String> = session.selections().iter().map(|s| s.to_string()).collect();
    println!("  cursors: {}\n", selections.join(", "));
}

fn main() {
    let mut session = EditorSession::new(
        "let a = 1;\nlet b = 2;\nlet c = 3;",
        LanguageConfiguration::c_like(),
        EditorOptions::default(),
    )
    .unwrap();
    show("Initial document", &session);

    // 1. One cursor per line, after `let`.
    session.set_selections(&[
        Selection::collapsed(Position::new(1, 4)),
        Selection::collapsed(Position::new(2, 4)),
        Selection::collapsed(Position::new(3, 4)),
    ]);
    session.type_text(" mut").unwrap();
    show("Typed ' mut' at three cursors", &session);

    // 2. Select the variable names and wrap them in brackets.
    session.execute(CursorOperation::MoveRight { select: false }).unwrap();
    session
        .execute(CursorOperation::MoveWordRight {
            select: true,
            word_navigation: WordNavigationType::WordEnd,
        })
        .unwrap();
    session.type_text("(").unwrap();
    show("Surrounded the names with parens", &session);

    // 3. Undo both steps.
    session.undo();
    session.undo();
    show("Undone", &session);

    // 4. Box selection over the values.
    session.set_selections(&[Selection::collapsed(Position::new(1, 9))]);
    session.execute(CursorOperation::ColumnSelectRight).unwrap();
    session.execute(CursorOperation::ColumnSelectDown { page: false }).unwrap();
    session.execute(CursorOperation::ColumnSelectDown { page: false }).unwrap();
    session.type_text("0").unwrap();
    show("Replaced the values through a column selection", &session);
}
