//! Parser benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use vtgrid::parser::{Command, Parser, Perform};

/// Counts events without allocating, to measure the state machine alone
#[derive(Default)]
struct Counter {
    characters: usize,
    commands: usize,
}

impl Perform for Counter {
    fn character_received(&mut self, _c: char) {
        self.characters += 1;
    }

    fn command_received(&mut self, _command: Command) {
        self.commands += 1;
    }
}

fn bench_parse_plain_text(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser");

    let plain_text = "Hello, World! ".repeat(1000);
    group.throughput(Throughput::Bytes(plain_text.len() as u64));

    group.bench_function("plain_text", |b| {
        b.iter(|| {
            let mut parser = Parser::new();
            let mut counter = Counter::default();
            parser.advance(black_box(&plain_text), &mut counter);
            black_box(counter.characters)
        })
    });

    group.finish();
}

fn bench_parse_csi_sequences(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser");

    let csi_heavy = "\x1b[1;31mRed\x1b[0m \x1b[5;10H\x1b[2J\x1b[?1049h".repeat(100);
    group.throughput(Throughput::Bytes(csi_heavy.len() as u64));

    group.bench_function("csi_sequences", |b| {
        b.iter(|| {
            let mut parser = Parser::new();
            let actions = parser.parse(black_box(&csi_heavy));
            black_box(actions)
        })
    });

    group.finish();
}

fn bench_parse_mixed(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser");

    // Typical shell output with colored status words and title updates
    let mixed =
        "\x1b]0;build\x07Line 1: \x1b[32mOK\x1b[0m\r\nLine 2: \x1b[31mERROR\x1b[0m\r\n".repeat(500);
    group.throughput(Throughput::Bytes(mixed.len() as u64));

    group.bench_function("mixed_content", |b| {
        b.iter(|| {
            let mut parser = Parser::new();
            let actions = parser.parse(black_box(&mixed));
            black_box(actions)
        })
    });

    group.finish();
}

fn bench_parse_chunked(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser");

    let mixed = "Line: \x1b[38;2;10;20;30mrgb\x1b[0m\x1b[K\r\n".repeat(500);
    let chunks: Vec<String> = mixed
        .chars()
        .collect::<Vec<_>>()
        .chunks(7)
        .map(|chunk| chunk.iter().collect())
        .collect();
    group.throughput(Throughput::Bytes(mixed.len() as u64));

    group.bench_function("chunked_7", |b| {
        b.iter(|| {
            let mut parser = Parser::new();
            let mut counter = Counter::default();
            for chunk in &chunks {
                parser.advance(black_box(chunk), &mut counter);
            }
            black_box(counter.commands)
        })
    });

    group.finish();
}

fn bench_parse_utf8(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser");

    let utf8 = "Hello, \u{4e16}\u{754c}! \u{1f389} ".repeat(500);
    group.throughput(Throughput::Bytes(utf8.len() as u64));

    group.bench_function("utf8_content", |b| {
        b.iter(|| {
            let mut parser = Parser::new();
            let actions = parser.parse(black_box(&utf8));
            black_box(actions)
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_parse_plain_text,
    bench_parse_csi_sequences,
    bench_parse_mixed,
    bench_parse_chunked,
    bench_parse_utf8
);

criterion_main!(benches);
