//! Benchmarks for WHERE-clause rendering and checksums.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pgwhere::db::{ColumnDetails, TableSchema};
use pgwhere::filter::{FilterDocument, Operand, PgQuoter, WhereClause};

const DOCUMENT: &str = r#"
table = "orders"
columns = [
    { name = "status", type = "text" },
    { name = "total", type = "numeric" },
    { name = "customer_id", type = "bigint" },
]

[[predicate]]
field = "status"
operand = "EQUALS"
value = "completed"

[[predicate]]
field = "total"
operand = ">"
value = 100.0

[[predicate]]
conjunction = "or"
field = "customer_id"
operand = "!="
value = 42
"#;

fn orders_schema() -> TableSchema {
    let columns = ["status", "total", "customer_id", "note"]
        .iter()
        .zip(1..)
        .map(|(name, position)| ColumnDetails {
            name: name.to_string(),
            data_type: "text".to_string(),
            is_nullable: true,
            ordinal_position: position,
        })
        .collect();
    TableSchema::new("public", "orders", columns)
}

fn clause_of(size: usize) -> WhereClause {
    let mut clause = WhereClause::new();
    for i in 0..size {
        match i % 4 {
            0 => clause.and("status", Operand::Equals, format!("state-{}", i)),
            1 => clause.and("total", Operand::GreaterThan, i as f64 * 1.5),
            2 => clause.or("customer_id", Operand::NotEquals, i as i64),
            _ => clause.and("note", Operand::NotIn, "O'Brien"),
        };
    }
    clause
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    let schema = orders_schema();

    for size in [1usize, 4, 16, 64] {
        let clause = clause_of(size);
        group.bench_with_input(BenchmarkId::new("render", size), &clause, |b, clause| {
            b.iter(|| clause.render(black_box(&PgQuoter), black_box(&schema)).unwrap());
        });
    }

    group.finish();
}

fn bench_checksum(c: &mut Criterion) {
    let mut group = c.benchmark_group("checksum");

    for size in [1usize, 4, 16, 64] {
        let clause = clause_of(size);
        group.bench_with_input(BenchmarkId::new("checksum", size), &clause, |b, clause| {
            b.iter(|| black_box(clause).checksum());
        });
    }

    group.finish();
}

fn bench_document(c: &mut Criterion) {
    c.bench_function("document_to_sql", |b| {
        b.iter(|| {
            let doc = FilterDocument::from_toml_str(black_box(DOCUMENT)).unwrap();
            let schema = doc.offline_schema().unwrap();
            doc.to_clause().unwrap().render(&PgQuoter, &schema).unwrap()
        });
    });
}

criterion_group!(benches, bench_render, bench_checksum, bench_document);
criterion_main!(benches);
