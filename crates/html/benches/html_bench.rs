use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use html::serialize::outer_html;
use html::{Document, parse_document, parse_fragment, tokenize};

const SMALL_BLOCKS: usize = 64;
const LARGE_BLOCKS: usize = 20_000;

fn make_blocks(blocks: usize) -> String {
    let mut out = String::with_capacity(blocks * 56);
    for i in 0..blocks {
        out.push_str(&format!(
            r#"<div id="b{i}" class=box><span>hello</span><img src=x></div>"#
        ));
    }
    out
}

fn make_rawtext_adversarial(bytes: usize) -> String {
    let mut body = String::with_capacity(bytes + 32);
    body.push_str("<script>");
    while body.len() < bytes {
        body.push_str("</scri");
        body.push('<');
        body.push_str("pt");
    }
    body.push_str("</script>");
    body
}

fn bench_tokenize_small(c: &mut Criterion) {
    let input = make_blocks(SMALL_BLOCKS);
    c.bench_function("bench_tokenize_small", |b| {
        b.iter(|| black_box(tokenize(black_box(&input)).len()));
    });
}

fn bench_tokenize_large(c: &mut Criterion) {
    let input = make_blocks(LARGE_BLOCKS);
    c.bench_function("bench_tokenize_large", |b| {
        b.iter(|| black_box(tokenize(black_box(&input)).len()));
    });
}

fn bench_tokenize_rawtext(c: &mut Criterion) {
    let input = make_rawtext_adversarial(256 * 1024);
    c.bench_function("bench_tokenize_rawtext", |b| {
        b.iter(|| black_box(tokenize(black_box(&input)).len()));
    });
}

fn bench_parse_document_large(c: &mut Criterion) {
    let input = make_blocks(LARGE_BLOCKS);
    c.bench_function("bench_parse_document_large", |b| {
        b.iter(|| black_box(parse_document(black_box(&input)).live_node_count()));
    });
}

fn bench_parse_fragment_reused_arena(c: &mut Criterion) {
    let input = make_blocks(SMALL_BLOCKS);
    c.bench_function("bench_parse_fragment_reused_arena", |b| {
        b.iter_batched(
            Document::new,
            |mut doc| {
                let frag = parse_fragment(&mut doc, black_box(&input));
                black_box(doc.purge(frag));
            },
            BatchSize::SmallInput,
        );
    });
}

fn bench_serialize_large(c: &mut Criterion) {
    let doc = parse_document(&make_blocks(LARGE_BLOCKS));
    c.bench_function("bench_serialize_large", |b| {
        b.iter(|| black_box(outer_html(&doc, doc.root()).len()));
    });
}

criterion_group!(
    benches,
    bench_tokenize_small,
    bench_tokenize_large,
    bench_tokenize_rawtext,
    bench_parse_document_large,
    bench_parse_fragment_reused_arena,
    bench_serialize_large
);
criterion_main!(benches);
