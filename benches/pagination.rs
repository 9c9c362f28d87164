use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use readalong::{TimedWord, highlight_index, paginate, parse_timestamps};

/// Synthetic narration: `count` words, a sentence end every 12 words,
/// 0.3s per word.
fn synthetic_words(count: usize) -> Vec<TimedWord> {
    (0..count)
        .map(|i| {
            let text = if i % 12 == 11 { "end." } else { "word" };
            let start = i as f64 * 0.3;
            TimedWord::new(text, start, start + 0.3).unwrap_or_else(|e| panic!("{e}"))
        })
        .collect()
}

fn synthetic_json(count: usize) -> String {
    let entries: Vec<String> = synthetic_words(count)
        .iter()
        .map(|w| {
            format!(
                r#"{{"text":"{}","start":{},"end":{}}}"#,
                w.text, w.start, w.end
            )
        })
        .collect();
    format!("[{}]", entries.join(","))
}

fn bench_paginate(c: &mut Criterion) {
    let words = synthetic_words(10_000);
    let mut group = c.benchmark_group("paginate");

    for min_words in [40, 160, 640] {
        group.bench_with_input(
            BenchmarkId::from_parameter(min_words),
            &min_words,
            |b, &min_words| {
                b.iter(|| paginate(black_box(words.clone()), black_box(min_words)));
            },
        );
    }
    group.finish();
}

fn bench_parse(c: &mut Criterion) {
    let json = synthetic_json(10_000);
    c.bench_function("parse_timestamps_10k", |b| {
        b.iter(|| parse_timestamps(black_box(&json)));
    });
}

fn bench_highlight(c: &mut Criterion) {
    let pages = paginate(synthetic_words(10_000), 160);
    let page = &pages[pages.len() / 2];
    let window = page.window();
    let mid = (window.start + window.end) / 2.0;

    c.bench_function("highlight_index_mid_page", |b| {
        b.iter(|| highlight_index(black_box(page), black_box(mid), true));
    });
}

criterion_group!(benches, bench_paginate, bench_parse, bench_highlight);
criterion_main!(benches);
