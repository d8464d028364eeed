use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use contaerp_documents::{tax_breakdown, DocumentLine, DocumentTotals};
use rust_decimal::Decimal;

const RATES: [(&str, i64, i64); 4] = [("IVA21", 21, 52), ("IVA10", 10, 14), ("IVA4", 4, 5), ("IVA0", 0, 0)];

fn lines(count: usize) -> Vec<DocumentLine> {
    (0..count)
        .map(|i| {
            let (code, iva, recargo) = RATES[i % RATES.len()];
            DocumentLine::new(
                format!("line {i}"),
                Decimal::from(1 + (i % 7) as i64),
                Decimal::new(1_999 + (i as i64 * 37) % 5_000, 3),
            )
            .with_tax(code, Decimal::from(iva), Decimal::new(recargo, 1))
        })
        .collect()
}

fn bench_totals_from_lines(c: &mut Criterion) {
    let mut group = c.benchmark_group("totals_from_lines");

    for size in [10usize, 100, 1_000].iter() {
        let input = lines(*size);
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &input, |b, input| {
            b.iter(|| DocumentTotals::from_lines(black_box(input)));
        });
    }

    group.finish();
}

fn bench_tax_breakdown(c: &mut Criterion) {
    let mut group = c.benchmark_group("tax_breakdown");

    for size in [10usize, 100, 1_000].iter() {
        let input = lines(*size);
        let totals = DocumentTotals::from_lines(&input);
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &input, |b, input| {
            b.iter(|| tax_breakdown(black_box(input), black_box(&totals)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_totals_from_lines, bench_tax_breakdown);
criterion_main!(benches);
