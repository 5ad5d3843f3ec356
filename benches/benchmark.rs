//! Performance benchmarks for logseq-clipper.
//!
//! Run with: `cargo bench`
//!
//! Benchmarks include:
//! - Candidate index scan over a synthetic article
//! - A full remove-mode session from start to capture
//! - Markdown and Logseq block formatting of the captured HTML

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use logseq_clipper::index::scan;
use logseq_clipper::logseq::html_to_blocks;
use logseq_clipper::{IndexOptions, Mode, Page, Picker, VecSink};

const PARAGRAPH: &str = "Benchmarks measure how long the picker takes to scan a page and serialize the \
     included blocks. Each paragraph carries enough text to pass the candidate threshold.";

/// A synthetic article with `sections` heading/paragraph/list groups plus the
/// usual navigation and footer boilerplate.
fn article(sections: usize) -> String {
    let mut body = String::new();
    for i in 0..sections {
        body.push_str(&format!(
            "<h2>Section {i} heading</h2><p>{PARAGRAPH}</p><p>{PARAGRAPH} <em>Emphasis {i}</em>.</p>\
             <ul><li>First point of section {i}</li><li>Second point of section {i}</li></ul>"
        ));
    }
    format!(
        "<!DOCTYPE html><html><head><title>Benchmark</title></head><body>\
         <nav><a href=\"/\">Home</a><a href=\"/about\">About</a></nav>\
         <article>{body}</article>\
         <aside class=\"related\"><p>Related article text</p></aside>\
         <footer><p>Copyright notice text</p></footer></body></html>"
    )
}

fn bench_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan");
    for sections in [5, 50, 200] {
        let html = article(sections);
        group.throughput(Throughput::Bytes(html.len() as u64));
        let page = Page::parse(&html, "https://example.com/bench");
        let options = IndexOptions::default();
        group.bench_with_input(BenchmarkId::from_parameter(sections), &page, |b, page| {
            b.iter(|| scan(black_box(page), black_box(&options)));
        });
    }
    group.finish();
}

fn bench_session(c: &mut Criterion) {
    let html = article(50);
    let page = Page::parse(&html, "https://example.com/bench");
    c.bench_function("session_start_capture", |b| {
        b.iter(|| {
            let mut picker = Picker::new(&page, VecSink::new());
            picker.start(Mode::Remove);
            picker.capture().ok()
        });
    });
}

fn bench_format(c: &mut Criterion) {
    let html = article(50);
    let page = Page::parse(&html, "https://example.com/bench");
    let mut picker = Picker::new(&page, VecSink::new());
    picker.start(Mode::Remove);
    if picker.capture().is_err() {
        return;
    }
    let Some(captured) = picker.sink().last().map(|p| p.html.clone()) else {
        return;
    };

    c.bench_function("html_to_blocks", |b| {
        b.iter(|| html_to_blocks(black_box(&captured), 0));
    });
}

criterion_group!(benches, bench_scan, bench_session, bench_format);
criterion_main!(benches);
