//! End-to-end CLI scenarios: source file in, exit code and IR text out.

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::NamedTempFile;

fn ifjc() -> Command {
    Command::cargo_bin("ifjc").expect("ifjc binary builds")
}

fn source_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp file");
    file.write_all(contents.as_bytes()).expect("write source");
    file
}

#[test]
fn hello_world_compiles_to_ir_on_stdout() {
    let file = source_file(
        "import \"ifj25\" for Ifj\nclass Program { static main() { Ifj.write(\"hi\") } }",
    );

    ifjc()
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::starts_with(".IFJcode25"))
        .stdout(predicate::str::contains("LABEL main$0%func"))
        .stdout(predicate::str::contains("WRITE"))
        .stdout(predicate::str::contains("string@hi"));
}

#[test]
fn missing_main_exits_3() {
    let file = source_file("import \"ifj25\" for Ifj\nclass Program {\nstatic foo() {\n}\n}");

    ifjc()
        .arg(file.path())
        .assert()
        .code(3)
        .stderr(predicate::str::contains("main"));
}

#[test]
fn mixed_addition_compiles_with_runtime_error_branch() {
    let file = source_file(
        "import \"ifj25\" for Ifj\nclass Program {\nstatic main() {\nvar x = 1 + \"x\"\n}\n}",
    );

    ifjc()
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("CONCAT"))
        .stdout(predicate::str::contains("ADDS"))
        .stdout(predicate::str::contains("EXIT int@26"));
}

#[test]
fn redeclared_function_exits_4() {
    let file = source_file(
        "import \"ifj25\" for Ifj\nclass Program {\nstatic foo() {\n}\nstatic foo() {\n}\nstatic main() {\n}\n}",
    );

    ifjc().arg(file.path()).assert().code(4);
}

#[test]
fn wrong_arity_call_exits_5() {
    let file = source_file(
        "import \"ifj25\" for Ifj\nclass Program {\nstatic foo(a) {\nreturn a\n}\nstatic main() {\nfoo(1, 2)\n}\n}",
    );

    ifjc().arg(file.path()).assert().code(5);
}

#[test]
fn nested_block_comment_is_accepted() {
    let file = source_file(
        "import \"ifj25\" for Ifj\nclass Program {\nstatic main() {\n/* a /* b */ c */\nIfj.write(1)\n}\n}",
    );

    ifjc().arg(file.path()).assert().success();
}

#[test]
fn unterminated_block_comment_exits_1() {
    let file = source_file(
        "import \"ifj25\" for Ifj\nclass Program {\nstatic main() {\n}\n}\n/* a /* b */ ",
    );

    ifjc()
        .arg(file.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("[SCANNER]"));
}

#[test]
fn syntax_error_exits_2_with_position() {
    let file = source_file("import \"ifj25\" for Ifj\nclass Program {\nstatic main( {\n}\n}");

    ifjc()
        .arg(file.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("[PARSER] SyntaxError:"));
}

#[test]
fn missing_file_exits_99() {
    ifjc()
        .arg("definitely/not/here.ifj")
        .assert()
        .code(99)
        .stderr(predicate::str::contains("cannot read"));
}

#[test]
fn usage_error_exits_99() {
    ifjc()
        .assert()
        .code(99)
        .stderr(predicate::str::contains("usage"));
}

#[test]
fn factorial_program_compiles() {
    let file = source_file(
        r#"import "ifj25" for Ifj
class Program {
static main() {
var n = Ifj.read_num()
if (n is Num) {
Ifj.write(fact(n))
} else {
Ifj.write("not a number")
}
}
static fact(n) {
var result = 1
while (n > 1) {
result = result * n
n = n - 1
}
return result
}
}"#,
    );

    ifjc()
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("LABEL fact$1%func"))
        .stdout(predicate::str::contains("CALL fact$1%func"))
        .stdout(predicate::str::contains("READ"));
}
