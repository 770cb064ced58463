use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use grammar::InsertMode;
use html::{Document, NodeId, parse_document, parse_fragment};
use morph::{MorphConfig, NoCallbacks, reconcile};

const ROWS: usize = 2_000;

fn make_rows(rows: usize, label: &str) -> String {
    let mut out = String::with_capacity(rows * 64);
    out.push_str(r#"<table id="grid"><tbody>"#);
    for i in 0..rows {
        out.push_str(&format!(
            r#"<tr id="r{i}"><td class="n">{i}</td><td>{label}</td><td><input name="q{i}" value="{i}"></td></tr>"#
        ));
    }
    out.push_str("</tbody></table>");
    out
}

fn make_reversed(rows: usize) -> String {
    let mut out = String::with_capacity(rows * 64);
    out.push_str(r#"<table id="grid"><tbody>"#);
    for i in (0..rows).rev() {
        out.push_str(&format!(
            r#"<tr id="r{i}"><td class="n">{i}</td><td>row</td><td><input name="q{i}" value="{i}"></td></tr>"#
        ));
    }
    out.push_str("</tbody></table>");
    out
}

fn setup(old: &str, new: &str) -> (Document, NodeId, NodeId) {
    let mut doc = parse_document(old);
    let grid = doc
        .element_by_id(doc.root(), "grid")
        .unwrap_or_else(|| panic!("fixture has no #grid"));
    let content = parse_fragment(&mut doc, new);
    (doc, grid, content)
}

fn bench_identical(c: &mut Criterion) {
    let old = make_rows(ROWS, "row");
    c.bench_function("bench_morph_identical", |b| {
        b.iter_batched(
            || setup(&old, &old),
            |(mut doc, grid, content)| {
                let outcome = reconcile(
                    &mut doc,
                    grid,
                    content,
                    InsertMode::Outer,
                    &MorphConfig::default(),
                    &mut NoCallbacks,
                );
                black_box(outcome.is_ok());
            },
            BatchSize::LargeInput,
        );
    });
}

fn bench_text_change(c: &mut Criterion) {
    let old = make_rows(ROWS, "row");
    let new = make_rows(ROWS, "changed");
    c.bench_function("bench_morph_text_change", |b| {
        b.iter_batched(
            || setup(&old, &new),
            |(mut doc, grid, content)| {
                let outcome = reconcile(
                    &mut doc,
                    grid,
                    content,
                    InsertMode::Outer,
                    &MorphConfig::default(),
                    &mut NoCallbacks,
                );
                black_box(outcome.is_ok());
            },
            BatchSize::LargeInput,
        );
    });
}

fn bench_reverse(c: &mut Criterion) {
    let old = make_rows(ROWS / 4, "row");
    let new = make_reversed(ROWS / 4);
    c.bench_function("bench_morph_reverse", |b| {
        b.iter_batched(
            || setup(&old, &new),
            |(mut doc, grid, content)| {
                let outcome = reconcile(
                    &mut doc,
                    grid,
                    content,
                    InsertMode::Outer,
                    &MorphConfig::default(),
                    &mut NoCallbacks,
                );
                black_box(outcome.is_ok());
            },
            BatchSize::LargeInput,
        );
    });
}

criterion_group!(benches, bench_identical, bench_text_change, bench_reverse);
criterion_main!(benches);
