use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use editor_cursor::operations::CursorOperation;
use editor_cursor::words::{find_next_word_on_line, find_previous_word_on_line};
use editor_cursor::{
    DEFAULT_WORD_SEPARATORS, EditorOptions, EditorSession, Position, Selection, TextModel,
    WordCharacterClassifier, WordNavigationType, compute_links,
};
use editor_cursor_lang::LanguageConfiguration;

fn large_text(line_count: usize) -> String {
    let mut out = String::with_capacity(line_count * 80);
    for i in 0..line_count {
        out.push_str(&format!(
            "{i:06} the quick brown fox jumps over https://example.com/lazy/dog?id={i} (bench)\n"
        ));
    }
    // Drop the final '\n' so there is no trailing empty line.
    out.pop();
    out
}

fn bench_word_scan(c: &mut Criterion) {
    let classifier = WordCharacterClassifier::new(DEFAULT_WORD_SEPARATORS);
    let line = large_text(1);
    let len = line.chars().count();
    c.bench_function("words/scan_every_column", |b| {
        b.iter(|| {
            for column in 1..=len + 1 {
                black_box(find_next_word_on_line(&line, &classifier, column));
                black_box(find_previous_word_on_line(&line, &classifier, column));
            }
        })
    });
}

fn bench_word_navigation_session(c: &mut Criterion) {
    let text = large_text(2_000);
    c.bench_function("words/move_word_right_500", |b| {
        b.iter_batched(
            || EditorSession::new(&text, LanguageConfiguration::plain(), EditorOptions::default()).unwrap(),
            |mut session| {
                for _ in 0..500 {
                    session
                        .execute(CursorOperation::MoveWordRight {
                            select: false,
                            word_navigation: WordNavigationType::WordEnd,
                        })
                        .unwrap();
                }
                black_box(session.primary_selection());
            },
            BatchSize::LargeInput,
        )
    });
}

fn bench_multi_cursor_typing(c: &mut Criterion) {
    let text = large_text(2_000);
    let cursors: Vec<Selection> = (1..=200)
        .map(|line| Selection::collapsed(Position::new(line * 10, 1)))
        .collect();
    c.bench_function("typing/200_cursors_10_chars", |b| {
        b.iter_batched(
            || {
                let mut session =
                    EditorSession::new(&text, LanguageConfiguration::plain(), EditorOptions::default())
                        .unwrap();
                session.set_selections(&cursors);
                session
            },
            |mut session| {
                session.type_text("0123456789").unwrap();
                black_box(session.model().version_id());
            },
            BatchSize::LargeInput,
        )
    });
}

fn bench_link_scan(c: &mut Criterion) {
    let model = TextModel::new(&large_text(10_000), LanguageConfiguration::plain());
    c.bench_function("links/10k_lines", |b| {
        b.iter(|| black_box(compute_links(&model).len()))
    });
}

criterion_group!(
    benches,
    bench_word_scan,
    bench_word_navigation_session,
    bench_multi_cursor_typing,
    bench_link_scan
);
criterion_main!(benches);
