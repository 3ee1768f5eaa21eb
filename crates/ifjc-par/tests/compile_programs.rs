//! End-to-end parses over small programs, asserting on the printed IR.

use ifjc_par::Parser;
use ifjc_util::{CompileError, Result};

fn compile(source: &str) -> Result<String> {
    let parser = Parser::new(source)?;
    let emitter = parser.parse_program()?;
    Ok(ifjc_ir::printer::print_to_string(&emitter))
}

fn compile_ok(source: &str) -> String {
    match compile(source) {
        Ok(ir) => ir,
        Err(e) => panic!("compilation failed: {e}"),
    }
}

fn compile_code(source: &str) -> i32 {
    match compile(source) {
        Ok(_) => 0,
        Err(e) => e.exit_code(),
    }
}

fn program(body: &str) -> String {
    format!("import \"ifj25\" for Ifj\nclass Program {{\n{body}\n}}")
}

#[test]
fn write_literal_lands_in_main() {
    let ir = compile_ok(&program("static main() {\nIfj.write(\"hi\")\n}"));
    let main_at = ir.find("LABEL main$0%func").expect("main label");
    let write_at = ir.find("WRITE").expect("WRITE instruction");
    assert!(write_at > main_at);
    assert!(ir.contains("string@hi"));
}

#[test]
fn function_params_move_from_frame() {
    let ir = compile_ok(&program(
        "static main() {\nvar r = add(1, 2)\n}\nstatic add(a, b) {\nreturn a + b\n}",
    ));
    // call site: TF params defined then popped in reverse
    assert!(ir.contains("DEFVAR TF@%param0"));
    assert!(ir.contains("DEFVAR TF@%param1"));
    assert!(ir.contains("CALL add$2%func"));
    assert!(ir.contains("PUSHS TF@%retval"));
    // callee prologue: params land in uniquely named locals
    assert!(ir.contains("LABEL add$2%func"));
    assert!(ir.contains("MOVE LF@a%"));
    assert!(ir.contains("MOVE LF@b%"));
}

#[test]
fn forward_call_resolved_by_later_definition() {
    let code = compile_code(&program(
        "static main() {\nvar x = later(1)\n}\nstatic later(n) {\nreturn n\n}",
    ));
    assert_eq!(code, 0);
}

#[test]
fn forward_call_never_defined_is_error_3() {
    let code = compile_code(&program("static main() {\nvar x = ghost(1)\n}"));
    assert_eq!(code, 3);
}

#[test]
fn function_redefinition_is_error_4() {
    let code = compile_code(&program(
        "static foo() {\n}\nstatic foo() {\n}\nstatic main() {\n}",
    ));
    assert_eq!(code, 4);
}

#[test]
fn same_name_different_arity_is_allowed() {
    let code = compile_code(&program(
        "static foo() {\n}\nstatic foo(a) {\nreturn a\n}\nstatic main() {\n}",
    ));
    assert_eq!(code, 0);
}

#[test]
fn wrong_argument_count_is_error_5() {
    let code = compile_code(&program(
        "static foo(a) {\nreturn a\n}\nstatic main() {\nfoo(1, 2)\n}",
    ));
    assert_eq!(code, 5);
}

#[test]
fn builtin_wrong_argument_count_is_error_5() {
    let code = compile_code(&program("static main() {\nIfj.length(\"a\", \"b\")\n}"));
    assert_eq!(code, 5);
}

#[test]
fn builtin_known_bad_argument_type_is_error_6() {
    let code = compile_code(&program("static main() {\nIfj.length(5)\n}"));
    assert_eq!(code, 6);
}

#[test]
fn mixed_addition_compiles_with_runtime_branches() {
    // `1 + "x"` defers to runtime: both the concat and numeric paths are
    // present, guarded by the runtime error branch.
    let ir = compile_ok(&program("static main() {\nvar x = 1 + \"x\"\n}"));
    assert!(ir.contains("CONCAT"));
    assert!(ir.contains("ADDS"));
    assert!(ir.contains("EXIT int@26"));
}

#[test]
fn null_operand_in_addition_is_error_6() {
    let code = compile_code(&program("static main() {\nvar x = 1 + null\n}"));
    assert_eq!(code, 6);
}

#[test]
fn precedence_multiplication_reduces_first() {
    let ir = compile_ok(&program("static main() {\nvar x = 1 + 2 * 3\n}"));
    let muls = ir.find("MULS").expect("MULS emitted");
    let adds = ir.find("ADDS").expect("ADDS emitted");
    assert!(muls < adds, "2*3 must reduce before the addition");
}

#[test]
fn parenthesized_expression_overrides_precedence() {
    let ir = compile_ok(&program("static main() {\nvar x = (1 + 2) * 3\n}"));
    let muls = ir.find("MULS").expect("MULS emitted");
    let adds = ir.find("ADDS").expect("ADDS emitted");
    assert!(adds < muls, "(1+2) must reduce before the multiplication");
}

#[test]
fn is_type_test_compiles_to_type_dispatch() {
    let ir = compile_ok(&program("static main() {\nvar x = 1 is Num\n}"));
    assert!(ir.contains("PUSHS string@int"));
    assert!(ir.contains("PUSHS string@float"));
    assert!(ir.contains("ORS"));
}

#[test]
fn while_loop_hoists_defvars_above_loop_label() {
    let ir = compile_ok(&program(
        "static main() {\nvar i = 0\nwhile (i < 3) {\nvar x = i + 1\ni = x\n}\n}",
    ));

    // Find the loop label emitted right after the "While loop start"
    // comment; every body DEFVAR must sit between the comment and it.
    let anchor = ir.find("# While loop start").expect("loop anchor comment");
    let after_anchor = &ir[anchor..];
    let label_off = after_anchor.find("LABEL %L").expect("loop label");
    let loop_end_comment = after_anchor.find("# While loop end").expect("loop end");

    let body = &after_anchor[label_off..loop_end_comment];
    assert!(
        !body.contains("DEFVAR LF@"),
        "no local DEFVAR may remain inside the loop window:\n{body}"
    );

    let hoisted = &after_anchor[..label_off];
    assert!(
        hoisted.contains("DEFVAR LF@x%"),
        "body variable must be hoisted in front of the loop label"
    );
}

#[test]
fn variable_shadowing_gets_distinct_ir_names() {
    let ir = compile_ok(&program(
        "static main() {\nvar x = 1\nif (x) {\nvar y = 2\n} else {\nvar y = 3\n}\n}",
    ));
    // two distinct `y` uniquifications must both appear
    let first = ir.find("DEFVAR LF@y%").expect("first y");
    let rest = &ir[first + 1..];
    assert!(rest.contains("DEFVAR LF@y%"), "second y must not alias");
}

#[test]
fn variable_redefinition_in_same_scope_is_error_4() {
    let code = compile_code(&program("static main() {\nvar x = 1\nvar x = 2\n}"));
    assert_eq!(code, 4);
}

#[test]
fn undefined_variable_use_is_semantic_error() {
    // reading an unknown identifier desugars to a getter read, which then
    // fails the end-of-parse definedness sweep
    let code = compile_code(&program("static main() {\nvar x = y + 1\n}"));
    assert_eq!(code, 3);
}

#[test]
fn setter_assignment_desugars_to_call() {
    let ir = compile_ok(&program(
        "static size = (v) {\nIfj.write(v)\n}\nstatic main() {\nsize = 42\n}",
    ));
    assert!(ir.contains("LABEL size$1%setter"));
    assert!(ir.contains("CALL size$1%setter"));
    assert!(ir.contains("POPS TF@%param0"));
}

#[test]
fn getter_read_desugars_to_call() {
    let ir = compile_ok(&program(
        "static size {\nreturn 4\n}\nstatic main() {\nvar x = size\n}",
    ));
    assert!(ir.contains("LABEL size$0%getter"));
    assert!(ir.contains("CALL size$0%getter"));
}

#[test]
fn assignment_to_unknown_name_requires_setter_definition() {
    let code = compile_code(&program("static main() {\nmystery = 1\n}"));
    assert_eq!(code, 3);
}

#[test]
fn getter_and_setter_share_name_with_function() {
    let code = compile_code(&program(
        "static size {\nreturn 1\n}\nstatic size = (v) {\n}\nstatic size() {\n}\nstatic main() {\n}",
    ));
    assert_eq!(code, 0);
}

#[test]
fn duplicate_getter_is_error_4() {
    let code = compile_code(&program(
        "static size {\nreturn 1\n}\nstatic size {\nreturn 2\n}\nstatic main() {\n}",
    ));
    assert_eq!(code, 4);
}

#[test]
fn one_line_function_body_compiles_as_return() {
    let ir = compile_ok(&program("static one() { 1 }\nstatic main() {\n}"));
    let label = ir.find("LABEL one$0%func").expect("one label");
    let window = &ir[label..];
    let pops = window.find("POPS LF@%retval").expect("return value popped");
    let ret = window.find("RETURN").expect("RETURN emitted");
    assert!(pops < ret);
}

#[test]
fn global_variables_are_predefined_in_preamble() {
    let ir = compile_ok(&program(
        "static main() {\nvar __g = 1\n__g = __g + 1\nIfj.write(__g)\n}",
    ));
    let header = ir.find(".IFJcode25").expect("header");
    let defvar = ir.find("DEFVAR GF@__g").expect("global def");
    let init = ir.find("MOVE GF@__g nil@nil").expect("nil init");
    let entry = ir.find("LABEL %start").expect("entry label");
    assert!(header < defvar && defvar < init && init < entry);
    // exactly one preamble definition
    assert_eq!(ir.matches("DEFVAR GF@__g").count(), 1);
}

#[test]
fn implicit_global_assignment_defines_the_global() {
    let ir = compile_ok(&program("static main() {\n__total = 5\n}"));
    assert!(ir.contains("DEFVAR GF@__total"));
    assert!(ir.contains("POPS GF@__total"));
}

#[test]
fn undefined_global_read_is_error_10() {
    let code = compile_code(&program("static main() {\nvar x = __nope\n}"));
    assert_eq!(code, 10);
}

#[test]
fn if_statement_lowers_through_truthiness() {
    let ir = compile_ok(&program(
        "static main() {\nif (1) {\nIfj.write(1)\n} else {\nIfj.write(2)\n}\n}",
    ));
    assert!(ir.contains("# If statement condition"));
    assert!(ir.contains("PUSHS bool@false"));
    assert!(ir.contains("JUMPIFEQS %L"));
    assert!(ir.contains("# Else-block"));
}

#[test]
fn return_pops_into_retval() {
    let ir = compile_ok(&program(
        "static f() {\nreturn 7\n}\nstatic main() {\nvar x = f()\n}",
    ));
    assert!(ir.contains("POPS LF@%retval"));
    assert!(ir.contains("DEFVAR LF@%retval"));
    assert!(ir.contains("MOVE LF@%retval nil@nil"));
}

#[test]
fn nested_call_arguments_evaluate_in_order() {
    let ir = compile_ok(&program(
        "static main() {\nIfj.write(Ifj.length(\"abc\"))\n}",
    ));
    let length = ir.find("# Ifj.length call").expect("length pattern");
    let write = ir.find("# Ifj.write call").expect("write pattern");
    assert!(length < write);
}

#[test]
fn statement_call_keeps_builtin_result_on_stack() {
    let ir = compile_ok(&program("static main() {\nIfj.write(\"x\")\n}"));
    // write pushes nil as its result even in statement position
    assert!(ir.contains("PUSHS nil@nil"));
}

#[test]
fn multiline_string_literal_preserves_newline() {
    let ir = compile_ok(&program(
        "static main() {\nIfj.write(\"\"\"a\nb\"\"\")\n}",
    ));
    assert!(ir.contains("string@a\\010b"));
}

#[test]
fn labels_are_globally_unique() {
    let ir = compile_ok(&program(
        "static main() {\nif (1) {\nvar a = 1\n} else {\nvar b = 2\n}\nwhile (0) {\nvar c = 3\n}\n}",
    ));
    let mut labels: Vec<&str> = ir
        .lines()
        .filter_map(|line| line.strip_prefix("LABEL "))
        .collect();
    let total = labels.len();
    labels.sort();
    labels.dedup();
    assert_eq!(labels.len(), total, "duplicate LABEL emitted");
}
