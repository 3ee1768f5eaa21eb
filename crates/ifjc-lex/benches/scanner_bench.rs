use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ifjc_lex::{Scanner, TokenKind};

fn sample_program() -> String {
    let mut source = String::from("import \"ifj25\" for Ifj\nclass Program {\n");
    for i in 0..200 {
        source.push_str(&format!(
            "static fn{i}(a, b) {{\n    var x = a + b * {i}\n    while (x > 0) {{\n        x = x - 1\n    }} \n    return x\n}}\n"
        ));
    }
    source.push('}');
    source
}

fn bench_scanner(c: &mut Criterion) {
    let source = sample_program();
    c.bench_function("scan_sample_program", |b| {
        b.iter(|| {
            let mut scanner = Scanner::new(black_box(&source));
            let mut count = 0usize;
            loop {
                let token = scanner.next_token().expect("lexical error in bench input");
                if token.kind == TokenKind::Eof {
                    break;
                }
                count += 1;
            }
            black_box(count)
        })
    });
}

criterion_group!(benches, bench_scanner);
criterion_main!(benches);
