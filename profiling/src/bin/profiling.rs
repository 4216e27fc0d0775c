use clap::Parser;
use concord::{compare_collections, AnnotationCollection, ConcordConfig, Span, TagRef};
use env_logger::Env;
use log::info;
use serde::Deserialize;
use serde_jsonlines::json_lines;
use std::ops::Range;
use std::path::Path;
use std::time::{Duration, Instant};

const TAGS: [&str; 4] = ["event", "state", "process", "non_event"];

/// One line of a profiling dataset: a span of one of the two collections.
#[derive(Deserialize)]
struct Example {
    collection: String,
    id: String,
    start: usize,
    end: usize,
    tag: String,
}

fn load_collections<P: AsRef<Path>>(path: P) -> (AnnotationCollection, AnnotationCollection) {
    let mut first = Vec::new();
    let mut second = Vec::new();
    for example in json_lines::<Example, P>(path).unwrap().map(|r| r.unwrap()) {
        let tag = TagRef::new(format!("tag-{}", example.tag), example.tag);
        let span = Span::new(example.id, example.start, example.end, tag).unwrap();
        match example.collection.as_str() {
            "first" => first.push(span),
            _ => second.push(span),
        }
    }
    (
        AnnotationCollection::new("first", "dataset", first).into_sorted(),
        AnnotationCollection::new("second", "dataset", second).into_sorted(),
    )
}

fn build_collections(n_spans: usize) -> (AnnotationCollection, AnnotationCollection) {
    let tags: Vec<TagRef> = TAGS
        .iter()
        .map(|t| TagRef::new(format!("tag-{t}"), *t))
        .collect();
    let mut first = Vec::with_capacity(n_spans);
    let mut second = Vec::with_capacity(n_spans);
    for i in 0..n_spans {
        let start = i * 20;
        let len = 5 + i % 11;
        first.push(Span::new(format!("a-{i}"), start, start + len, tags[i % 4].clone()).unwrap());
        if i % 7 != 0 {
            let tag = if i % 5 == 0 { &tags[(i + 1) % 4] } else { &tags[i % 4] };
            second.push(
                Span::new(format!("b-{i}"), start + i % 3, start + len, tag.clone()).unwrap(),
            );
        }
    }
    (
        AnnotationCollection::new("first", "synthetic", first),
        AnnotationCollection::new("second", "synthetic", second),
    )
}

#[derive(Debug, Parser)]
struct Args {
    #[arg(short, long, default_value_t = 1)]
    n_samples: u32,
    /// Number of spans per synthetic collection.
    #[arg(short, long, default_value_t = 10_000)]
    spans: usize,
    /// Json lines dataset to load instead of the synthetic collections.
    #[arg(short, long)]
    dataset: Option<String>,
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let n_samples = args.n_samples;
    let iter = Range {
        start: 0,
        end: n_samples,
    };
    let (first, second) = match &args.dataset {
        Some(path) => load_collections(path),
        None => build_collections(args.spans),
    };
    info!(
        "Comparing {} spans against {} spans",
        first.len(),
        second.len()
    );
    let config = ConcordConfig::default();
    let mut total_duration = Duration::ZERO;
    for _ in iter {
        let now = Instant::now();
        {
            compare_collections(&first, &second, &config).unwrap();
        }
        let elapsed = now.elapsed();
        total_duration += elapsed;
    }
    println!(
        "Total duration: {} with {n_samples} samples",
        total_duration.as_secs_f64()
    )
}
