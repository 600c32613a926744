//! Parse, save and expression throughput over the full fixture.

use core::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use uidescription::expression::evaluate;
use uidescription::{SaveFlags, UiDescription};

const FULL: &str = include_str!("../tests/fixtures/full.uidesc");

fn parsed() -> UiDescription {
    let mut description = UiDescription::new();
    if let Err(error) = description.parse_str(FULL) {
        log::warn!(target: "uidescription", "fixture failed to parse: {error}");
    }
    description
}

fn bench_parse(criterion: &mut Criterion) {
    criterion.bench_function("uidesc_parse_full", |bencher| {
        bencher.iter(|| black_box(parsed().collect_template_view_names().len()));
    });
}

fn bench_save(criterion: &mut Criterion) {
    let mut description = parsed();
    criterion.bench_function("uidesc_save_full", |bencher| {
        bencher.iter(|| {
            black_box(
                description
                    .save_to_string(SaveFlags::EMBED_BITMAPS)
                    .map(|text| text.len())
                    .unwrap_or_default(),
            )
        });
    });
}

fn bench_expression(criterion: &mut Criterion) {
    let description = parsed();
    criterion.bench_function("uidesc_expression_tags", |bencher| {
        bencher.iter(|| {
            black_box(evaluate(black_box("(tag.volume + var.margin) * 2 / 3"), &description).ok())
        });
    });
}

criterion_group!(uidesc_benches, bench_parse, bench_save, bench_expression);
criterion_main!(uidesc_benches);
