use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use pgtable::{Descriptor, Ident, Value, render_read, render_update};

/// Descriptor with `n` columns and values plus a key:
/// UPDATE t SET col0=$1,...,col{n-1}=$n WHERE id=$(n+1)
fn build_descriptor(n: usize) -> Descriptor {
    (0..n).fold(Descriptor::new().key("id", 1), |d, i| {
        d.set(format!("col{i}"), Value::Int(i as i64))
    })
}

fn bench_render_update(c: &mut Criterion) {
    let table = Ident::parse("t").unwrap();
    let mut group = c.benchmark_group("render/update");

    for n in [1, 5, 10, 50, 100] {
        let d = build_descriptor(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &d, |b, d| {
            b.iter(|| black_box(render_update(&table, d)));
        });
    }

    group.finish();
}

fn bench_build_and_render_read(c: &mut Criterion) {
    let table = Ident::parse("t").unwrap();
    let mut group = c.benchmark_group("render/build_and_read");

    for n in [1, 5, 10, 50] {
        let columns: Vec<String> = (0..n).map(|i| format!("col{i}")).collect();
        group.bench_with_input(BenchmarkId::from_parameter(n), &columns, |b, columns| {
            b.iter(|| {
                let d = Descriptor::new()
                    .key("id", 7)
                    .columns(columns)
                    .order_by("col0")
                    .descending(true)
                    .limit(10);
                black_box(render_read(&table, &d));
            });
        });
    }

    group.finish();
}

fn bench_ident_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("render/ident_parse");

    for name in ["col1", "public.fixtures", r#""Mixed Case"."Table""#] {
        group.bench_with_input(BenchmarkId::from_parameter(name), name, |b, name| {
            b.iter(|| black_box(Ident::parse(name)));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_render_update,
    bench_build_and_render_read,
    bench_ident_parse
);
criterion_main!(benches);
