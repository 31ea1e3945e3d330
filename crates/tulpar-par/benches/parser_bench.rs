//! Parser benchmarks. Run with `cargo bench --package tulpar-par`.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use tulpar_par::{Node, Parser};
use tulpar_util::Handler;

fn parse_source(source: &str) -> Node {
    let handler = Handler::new();
    let mut parser = Parser::new(source, &handler);
    parser.parse()
}

fn bench_parser_var_decl(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser_var_decl");

    let source = "int x = 42;";
    group.throughput(Throughput::Bytes(source.len() as u64));
    group.bench_function("var_decl", |b| b.iter(|| parse_source(black_box(source))));

    group.finish();
}

fn bench_parser_function(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser_function");

    let source = r#"
        func fib(int n) {
            if (n <= 1) {
                return n;
            }
            return fib(n - 1) + fib(n - 2);
        }
    "#;

    group.throughput(Throughput::Bytes(source.len() as u64));
    group.bench_function("fib", |b| b.iter(|| parse_source(black_box(source))));

    group.finish();
}

fn bench_parser_loop_heavy(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser_loop_heavy");

    let source = r#"
        func main() {
            array nums = [1, 2, 3, 4, 5];
            int total = 0;
            for (n in nums) {
                total += n;
            }
            for (int i = 0; i < 10; i++) {
                total += i;
            }
            return total;
        }
    "#;

    group.throughput(Throughput::Bytes(source.len() as u64));
    group.bench_function("loops", |b| b.iter(|| parse_source(black_box(source))));

    group.finish();
}

criterion_group!(
    benches,
    bench_parser_var_decl,
    bench_parser_function,
    bench_parser_loop_heavy
);
criterion_main!(benches);
