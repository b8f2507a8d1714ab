use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use source_view_core::EditorWidget;

fn generate_text(lines: usize) -> String {
    (0..lines)
        .map(|i| format!("function f{i}(int a) returns int {{ return a + {i}; }}\n"))
        .collect()
}

fn bench_full_replace(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_replace");
    for lines in [100usize, 1_000, 10_000] {
        let text = generate_text(lines);
        let replacement = text.replace("  ", " ");
        group.bench_with_input(BenchmarkId::from_parameter(lines), &lines, |b, _| {
            b.iter(|| {
                let mut widget = EditorWidget::new(&text);
                let ticket = widget.issue_ticket();
                let range = widget.full_range();
                widget
                    .replace_range(range, black_box(&replacement), ticket)
                    .unwrap();
                black_box(widget.undo_depth())
            })
        });
    }
    group.finish();
}

fn bench_typing(c: &mut Criterion) {
    c.bench_function("typing_1000_chars", |b| {
        b.iter(|| {
            let mut widget = EditorWidget::new(&generate_text(200));
            for _ in 0..1000 {
                widget
                    .execute(source_view_core::InputCommand::InsertText("a".to_string()))
                    .unwrap();
            }
            black_box(widget.text().len())
        })
    });
}

criterion_group!(benches, bench_full_replace, bench_typing);
criterion_main!(benches);
