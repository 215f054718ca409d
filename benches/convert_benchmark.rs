//! Benchmarks for pdf2markdown conversion performance.
//!
//! Run with: cargo bench
//!
//! These benchmarks convert synthetic token pages with headings, body text,
//! a list and a table on every page.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pdf2markdown::{BBox, ConvertOptions, Converter, PageTokens, Token};

fn token(text: &str, x0: f32, y1: f32, size: f32) -> Token {
    let width = text.chars().count() as f32 * size * 0.5;
    Token::new(text, BBox::new(x0, y1 - size, x0 + width, y1), "Times", size)
}

/// Creates synthetic pages with a mix of block types.
fn create_test_pages(page_count: usize) -> Vec<PageTokens> {
    (0..page_count)
        .map(|i| {
            let mut tokens = vec![token(&format!("Section {}", i + 1), 72.0, 90.0, 18.0)];
            let mut y = 120.0;
            for line in 0..12 {
                tokens.push(token(
                    &format!("Body line {} of page {} with enough words to wrap", line, i),
                    72.0,
                    y,
                    11.0,
                ));
                y += 14.0;
            }
            y += 20.0;
            for item in 0..4 {
                tokens.push(token(&format!("- item {}", item), 72.0 + 18.0 * (item % 2) as f32, y, 11.0));
                y += 14.0;
            }
            y += 20.0;
            for row in 0..6 {
                tokens.push(token(&format!("r{}", row), 72.0, y, 11.0));
                tokens.push(token("alpha", 200.0, y, 11.0));
                tokens.push(token("42", 320.0, y, 11.0));
                y += 14.0;
            }
            PageTokens::new(i, tokens).with_size(612.0, 792.0)
        })
        .collect()
}

/// Benchmark conversion at various sizes, parallel and sequential.
fn bench_conversion(c: &mut Criterion) {
    let mut group = c.benchmark_group("convert");

    for page_count in [1, 10, 50].iter() {
        let pages = create_test_pages(*page_count);

        group.bench_function(format!("{}_pages_parallel", page_count), |b| {
            let converter = Converter::default();
            b.iter(|| converter.convert_pages(black_box(pages.clone())).unwrap());
        });

        group.bench_function(format!("{}_pages_sequential", page_count), |b| {
            let converter = Converter::new(ConvertOptions::sequential()).unwrap();
            b.iter(|| converter.convert_pages(black_box(pages.clone())).unwrap());
        });
    }

    group.finish();
}

/// Benchmark the streaming intake path.
fn bench_streaming(c: &mut Criterion) {
    let pages = create_test_pages(20);
    c.bench_function("convert_source_20_pages", |b| {
        let converter = Converter::default();
        b.iter(|| {
            converter
                .convert_source(black_box(pages.clone()).into_iter().map(Ok))
                .unwrap()
        });
    });
}

criterion_group!(benches, bench_conversion, bench_streaming);
criterion_main!(benches);
