//! Benchmarks for splitting and converting large migration scripts

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use sqlreview_core::Dialect;
use sqlreview_sql::{convert, split_statements, SqlParser};

/// Generate a migration script with N tables, each followed by an index and a query
fn generate_script(num_tables: usize) -> String {
    let mut sql = String::new();

    for i in 0..num_tables {
        sql.push_str(&format!(
            "CREATE TABLE public.table_{i} (\n  id bigserial PRIMARY KEY,\n  name varchar(64) NOT NULL,\n  amount numeric(10, 2),\n  parent_id bigint REFERENCES public.table_{parent} (id)\n);\n",
            parent = i.saturating_sub(1)
        ));
        sql.push_str(&format!("CREATE INDEX idx_table_{i}_name ON public.table_{i} (name);\n"));
        sql.push_str(&format!(
            "SELECT id, name FROM public.table_{i} WHERE name LIKE 'a%' AND amount > 10;\n"
        ));
    }

    sql
}

fn bench_split(c: &mut Criterion) {
    let mut group = c.benchmark_group("split_statements");

    for size in [10, 100, 1000] {
        let script = generate_script(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &script, |b, script| {
            b.iter(|| split_statements(black_box(script), Dialect::Postgres))
        });
    }

    group.finish();
}

fn bench_parse_and_convert(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_and_convert");
    let parser = SqlParser::postgres();

    for size in [10, 100] {
        let script = generate_script(size);
        let statements = split_statements(&script, Dialect::Postgres).unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(size), &statements, |b, statements| {
            b.iter(|| {
                for statement in statements {
                    let native = parser.parse(statement).unwrap();
                    black_box(convert(&native, statement).unwrap());
                }
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_split, bench_parse_and_convert);
criterion_main!(benches);
