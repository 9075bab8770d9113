//! Benchmarks for keyword tracking and pre-population
//!
//! Run with: cargo bench --bench tracker

use complete_mentions::config::DEFAULT_PATTERN;
use complete_mentions::prepopulate;
use complete_mentions::selection::Selection;
use complete_mentions::sync::EditEvent;
use complete_mentions::tracker::Tracker;

#[global_allocator]
static ALLOC: divan::AllocProfiler = divan::AllocProfiler::system();

fn main() {
    divan::main();
}

/// One event per keystroke of `prefix` followed by "@keyword "
fn keystrokes(prefix_len: usize) -> Vec<EditEvent> {
    let text: String = "lorem ipsum "
        .chars()
        .cycle()
        .take(prefix_len)
        .chain("@keyword ".chars())
        .collect();
    let chars: Vec<char> = text.chars().collect();
    (prefix_len..chars.len())
        .map(|i| {
            let before: String = chars[..i].iter().collect();
            let after: String = chars[..=i].iter().collect();
            EditEvent::new(after, before, Selection::caret(i + 1), Selection::caret(i))
        })
        .collect()
}

#[divan::bench(args = [0, 1_000, 10_000])]
fn type_keyword(bencher: divan::Bencher, prefix_len: usize) {
    let events = keystrokes(prefix_len);
    bencher.bench_local(|| {
        let mut tracker = Tracker::new('@');
        for event in &events {
            divan::black_box(tracker.update(event));
        }
    });
}

#[divan::bench(args = [10, 100, 1000])]
fn scan_serialized(bencher: divan::Bencher, count: usize) {
    let text: String = (0..count)
        .map(|i| format!("hi @[Name{}](id:{}) ", i, i))
        .collect();
    bencher.bench_local(|| prepopulate::scan(divan::black_box(&text), DEFAULT_PATTERN, '@', None));
}
