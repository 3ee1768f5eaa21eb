//! Canonical IR templates for polymorphic constructs and built-in calls.
//!
//! IFJ25 defers most typing to runtime, so every polymorphic operator and
//! every built-in expands to a fixed template that dispatches on the
//! runtime `TYPE` of its operands. Templates obey a strict stack
//! discipline: a pattern consumes exactly one stack value per operand and
//! leaves exactly one result. All temporaries and labels are drawn fresh
//! from the emitter, so patterns nest freely.
//!
//! Runtime failures exit the interpreted program directly: code 25 for a
//! built-in parameter of the wrong type, code 26 for operator type
//! incompatibility.

use ifjc_sem::DataType;

use crate::emitter::Emitter;
use crate::instr::Opcode;
use crate::operand::Operand;

/// Runtime exit code for a built-in parameter of the wrong type.
pub const RUNTIME_PARAM_TYPE_ERROR: i64 = 25;
/// Runtime exit code for operator type incompatibility.
pub const RUNTIME_TYPE_ERROR: i64 = 26;

fn new_temp_var(e: &mut Emitter) -> Operand {
    let name = e.new_temp();
    Operand::temp(name)
}

fn new_label_op(e: &mut Emitter) -> Operand {
    let name = e.new_label();
    Operand::label(name)
}

/// Defines a fresh temporary and pops the top of the data stack into it.
fn pop_into_temp(e: &mut Emitter) -> Operand {
    let var = new_temp_var(e);
    e.op1(Opcode::DefVar, var.clone());
    e.op1(Opcode::PopS, var.clone());
    var
}

/// Defines a fresh temporary holding the runtime type name of `value`.
fn type_of(e: &mut Emitter, value: &Operand) -> Operand {
    let ty = new_temp_var(e);
    e.op1(Opcode::DefVar, ty.clone());
    e.op2(Opcode::Type, ty.clone(), value.clone());
    ty
}

/// Program preamble: jump over nothing into `%start`, call `main$0%func`
/// in a fresh frame and exit with 0. Function bodies are emitted after
/// this block, so control never falls through into them.
pub fn program_entrypoint(e: &mut Emitter) {
    e.blank();
    let start = Operand::label("%start");
    e.op1(Opcode::Jump, start.clone());
    e.blank();

    e.comment("####################");
    e.comment("Program entry point");
    e.comment("####################");

    e.op1(Opcode::Label, start);
    e.op(Opcode::CreateFrame);
    e.op(Opcode::PushFrame);
    e.op1(Opcode::Call, Operand::label("main$0%func"));
    e.op(Opcode::PopFrame);

    e.op1(Opcode::Exit, Operand::ConstInt(0));
    e.blank();
    e.blank();
}

/// Truthiness reduction for `if`/`while` conditions: `null` is false, a
/// boolean is itself, anything else is true. Consumes `value` (already
/// popped into a variable by the caller) and pushes the boolean.
pub fn truthiness(e: &mut Emitter, value: &Operand) {
    let result = new_temp_var(e);
    e.op1(Opcode::DefVar, result.clone());

    let is_null = new_label_op(e);
    let is_bool = new_label_op(e);
    let is_other = new_label_op(e);
    let end = new_label_op(e);

    e.op3(Opcode::JumpIfEq, is_null.clone(), value.clone(), Operand::Nil);

    let ty = type_of(e, value);
    e.op3(
        Opcode::JumpIfEq,
        is_bool.clone(),
        ty,
        Operand::string("bool"),
    );
    e.op1(Opcode::Jump, is_other.clone());

    e.op1(Opcode::Label, is_null);
    e.op2(Opcode::Move, result.clone(), Operand::ConstBool(false));
    e.op1(Opcode::Jump, end.clone());

    e.op1(Opcode::Label, is_bool);
    e.op2(Opcode::Move, result.clone(), value.clone());
    e.op1(Opcode::Jump, end.clone());

    e.op1(Opcode::Label, is_other);
    e.op2(Opcode::Move, result.clone(), Operand::ConstBool(true));
    e.op1(Opcode::Jump, end.clone());

    e.op1(Opcode::Label, end);
    e.op1(Opcode::PushS, result);
}

/// The polymorphic `+`: string+string concatenates, numeric operands are
/// promoted to float and added, anything else exits with 26 at runtime.
pub fn add(e: &mut Emitter) {
    let op2 = pop_into_temp(e);
    let op1 = pop_into_temp(e);
    let type1 = type_of(e, &op1);
    let type2 = type_of(e, &op2);

    let end = new_label_op(e);
    let numeric_check = new_label_op(e);
    let type_error = new_label_op(e);

    // both strings?
    e.op1(Opcode::PushS, type1.clone());
    e.op1(Opcode::PushS, Operand::string("string"));
    e.op(Opcode::EqS);
    e.op1(Opcode::PushS, type2.clone());
    e.op1(Opcode::PushS, Operand::string("string"));
    e.op(Opcode::EqS);
    e.op(Opcode::AndS);
    e.op1(Opcode::PushS, Operand::ConstBool(true));
    e.op1(Opcode::JumpIfNeqS, numeric_check.clone());

    let concatenated = new_temp_var(e);
    e.op1(Opcode::DefVar, concatenated.clone());
    e.op3(
        Opcode::Concat,
        concatenated.clone(),
        op1.clone(),
        op2.clone(),
    );
    e.op1(Opcode::PushS, concatenated);
    e.op1(Opcode::Jump, end.clone());

    e.op1(Opcode::Label, numeric_check);
    promote_operand_to_float(e, &op1, &type1, &type_error);
    promote_operand_to_float(e, &op2, &type2, &type_error);

    e.op1(Opcode::PushS, op1);
    e.op1(Opcode::PushS, op2);
    e.op(Opcode::AddS);
    e.op1(Opcode::Jump, end.clone());

    e.op1(Opcode::Label, type_error);
    e.op1(Opcode::Exit, Operand::ConstInt(RUNTIME_TYPE_ERROR));

    e.op1(Opcode::Label, end);
}

/// Emits the int-to-float promotion for one operand of a numeric
/// operation: floats pass, ints are converted, everything else jumps to
/// the runtime type error.
fn promote_operand_to_float(
    e: &mut Emitter,
    operand: &Operand,
    operand_type: &Operand,
    type_error: &Operand,
) {
    let done = new_label_op(e);
    e.op1(Opcode::PushS, operand_type.clone());
    e.op1(Opcode::PushS, Operand::string("float"));
    e.op1(Opcode::JumpIfEqS, done.clone());
    e.op1(Opcode::PushS, operand_type.clone());
    e.op1(Opcode::PushS, Operand::string("int"));
    e.op1(Opcode::JumpIfNeqS, type_error.clone());
    e.op2(Opcode::Int2Float, operand.clone(), operand.clone());
    e.op1(Opcode::Label, done);
}

/// The polymorphic `*`: string×int (either order) repeats the string via
/// a CONCAT loop, numeric operands multiply with promotion, anything else
/// exits with 26 at runtime.
pub fn multiply(e: &mut Emitter) {
    let op2 = pop_into_temp(e);
    let op1 = pop_into_temp(e);
    let type1 = type_of(e, &op1);
    let type2 = type_of(e, &op2);

    let end = new_label_op(e);
    let numeric_check = new_label_op(e);
    let type_error = new_label_op(e);

    // (type1 == string AND type2 numeric) OR (type2 == string AND type1 numeric)?
    e.op1(Opcode::PushS, type1.clone());
    e.op1(Opcode::PushS, Operand::string("string"));
    e.op(Opcode::EqS);
    e.op1(Opcode::PushS, type2.clone());
    e.op1(Opcode::PushS, Operand::string("int"));
    e.op(Opcode::EqS);
    e.op1(Opcode::PushS, type2.clone());
    e.op1(Opcode::PushS, Operand::string("float"));
    e.op(Opcode::EqS);
    e.op(Opcode::OrS);
    e.op(Opcode::AndS);
    e.op1(Opcode::PushS, type2.clone());
    e.op1(Opcode::PushS, Operand::string("string"));
    e.op(Opcode::EqS);
    e.op1(Opcode::PushS, type1.clone());
    e.op1(Opcode::PushS, Operand::string("int"));
    e.op(Opcode::EqS);
    e.op1(Opcode::PushS, type1.clone());
    e.op1(Opcode::PushS, Operand::string("float"));
    e.op(Opcode::EqS);
    e.op(Opcode::OrS);
    e.op(Opcode::AndS);
    e.op(Opcode::OrS);
    e.op1(Opcode::PushS, Operand::ConstBool(true));
    e.op1(Opcode::JumpIfNeqS, numeric_check.clone());

    // Repetition path. Normalize so op1 is the string and op2 the count.
    let swap = new_temp_var(e);
    let no_swap = new_label_op(e);
    e.op1(Opcode::DefVar, swap.clone());
    e.op1(Opcode::PushS, type1.clone());
    e.op1(Opcode::PushS, Operand::string("string"));
    e.op1(Opcode::JumpIfEqS, no_swap.clone());
    e.op2(Opcode::Move, swap.clone(), op1.clone());
    e.op2(Opcode::Move, op1.clone(), op2.clone());
    e.op2(Opcode::Move, op2.clone(), swap.clone());
    e.op2(Opcode::Type, type1.clone(), op1.clone());
    e.op2(Opcode::Type, type2.clone(), op2.clone());
    e.op1(Opcode::Label, no_swap);

    // A float count must hold an integral value; truncate it.
    let count_is_int = new_label_op(e);
    e.op1(Opcode::PushS, type2.clone());
    e.op1(Opcode::PushS, Operand::string("float"));
    e.op1(Opcode::JumpIfNeqS, count_is_int.clone());
    e.op1(Opcode::PushS, op2.clone());
    e.op(Opcode::Float2IntS);
    e.op1(Opcode::PopS, op2.clone());
    e.op1(Opcode::Label, count_is_int);

    let repeated = new_temp_var(e);
    e.op1(Opcode::DefVar, repeated.clone());
    e.op2(Opcode::Move, repeated.clone(), Operand::string(""));

    let loop_start = new_label_op(e);
    let loop_end = new_label_op(e);
    let condition = new_temp_var(e);
    e.op1(Opcode::DefVar, condition.clone());

    e.op1(Opcode::Label, loop_start.clone());
    e.op3(
        Opcode::Gt,
        condition.clone(),
        op2.clone(),
        Operand::ConstInt(0),
    );
    e.op3(
        Opcode::JumpIfNeq,
        loop_end.clone(),
        condition.clone(),
        Operand::ConstBool(true),
    );
    e.op3(Opcode::Concat, repeated.clone(), repeated.clone(), op1.clone());
    e.op3(Opcode::Sub, op2.clone(), op2.clone(), Operand::ConstInt(1));
    e.op1(Opcode::Jump, loop_start);
    e.op1(Opcode::Label, loop_end);
    e.op1(Opcode::PushS, repeated);
    e.op1(Opcode::Jump, end.clone());

    e.op1(Opcode::Label, numeric_check);
    promote_operand_to_float(e, &op1, &type1, &type_error);
    promote_operand_to_float(e, &op2, &type2, &type_error);

    e.op1(Opcode::PushS, op1);
    e.op1(Opcode::PushS, op2);
    e.op(Opcode::MulS);
    e.op1(Opcode::Jump, end.clone());

    e.op1(Opcode::Label, type_error);
    e.op1(Opcode::Exit, Operand::ConstInt(RUNTIME_TYPE_ERROR));

    e.op1(Opcode::Label, end);
}

/// `-` and `/`: both operands must be numeric and are promoted to float;
/// division of integer originals is still a floating divide.
pub fn numeric(e: &mut Emitter, op: &str) {
    let op2 = pop_into_temp(e);
    let op1 = pop_into_temp(e);
    let type1 = type_of(e, &op1);
    let type2 = type_of(e, &op2);

    let type_error = new_label_op(e);
    let checked = new_label_op(e);

    push_is_numeric(e, &type1);
    push_is_numeric(e, &type2);
    e.op(Opcode::AndS);
    e.op1(Opcode::PushS, Operand::ConstBool(true));
    e.op1(Opcode::JumpIfNeqS, type_error.clone());
    e.op1(Opcode::Jump, checked.clone());

    e.op1(Opcode::Label, type_error);
    e.op1(Opcode::Exit, Operand::ConstInt(RUNTIME_TYPE_ERROR));

    e.op1(Opcode::Label, checked);

    convert_int_operand(e, &op1, &type1);
    convert_int_operand(e, &op2, &type2);

    e.op1(Opcode::PushS, op1);
    e.op1(Opcode::PushS, op2);
    match op {
        "-" => e.op(Opcode::SubS),
        "/" => e.op(Opcode::DivS),
        "*" => e.op(Opcode::MulS),
        _ => e.op(Opcode::AddS),
    };
}

/// Pushes `type is int OR type is float` onto the data stack.
fn push_is_numeric(e: &mut Emitter, operand_type: &Operand) {
    e.op1(Opcode::PushS, operand_type.clone());
    e.op1(Opcode::PushS, Operand::string("float"));
    e.op(Opcode::EqS);
    e.op1(Opcode::PushS, operand_type.clone());
    e.op1(Opcode::PushS, Operand::string("int"));
    e.op(Opcode::EqS);
    e.op(Opcode::OrS);
}

/// Converts an int operand (already known numeric) to float in place.
fn convert_int_operand(e: &mut Emitter, operand: &Operand, operand_type: &Operand) {
    let is_int = new_temp_var(e);
    e.op1(Opcode::DefVar, is_int.clone());
    e.op3(
        Opcode::Eq,
        is_int.clone(),
        operand_type.clone(),
        Operand::string("int"),
    );
    let skip = new_label_op(e);
    e.op3(
        Opcode::JumpIfNeq,
        skip.clone(),
        is_int,
        Operand::ConstBool(true),
    );
    e.op2(Opcode::Int2Float, operand.clone(), operand.clone());
    e.op1(Opcode::Label, skip);
}

/// Relational and equality operators.
///
/// `<` `>` `<=` `>=` require numeric operands (runtime error 26) and
/// compare as floats; `<=`/`>=` are implemented as `NOT >` / `NOT <`.
/// `==`/`!=` accept any types: a type mismatch yields `false` (negated
/// for `!=`), numeric comparison promotes int to float first.
pub fn relational(e: &mut Emitter, op: &str) {
    let op2 = pop_into_temp(e);
    let op1 = pop_into_temp(e);
    let type1 = type_of(e, &op1);
    let type2 = type_of(e, &op2);

    if op != "==" && op != "!=" {
        let type_error = new_label_op(e);
        let checked = new_label_op(e);

        push_is_numeric(e, &type1);
        push_is_numeric(e, &type2);
        e.op(Opcode::AndS);
        e.op1(Opcode::PushS, Operand::ConstBool(true));
        e.op1(Opcode::JumpIfNeqS, type_error.clone());
        e.op1(Opcode::Jump, checked.clone());

        e.op1(Opcode::Label, type_error);
        e.op1(Opcode::Exit, Operand::ConstInt(RUNTIME_TYPE_ERROR));

        e.op1(Opcode::Label, checked);
    }

    // Promote ints so 1 == 1.0 compares equal and orderings are uniform.
    for (operand, operand_type) in [(&op1, &type1), (&op2, &type2)] {
        let skip = new_label_op(e);
        e.op1(Opcode::PushS, operand_type.clone());
        e.op1(Opcode::PushS, Operand::string("int"));
        e.op1(Opcode::JumpIfNeqS, skip.clone());
        e.op1(Opcode::PushS, operand.clone());
        e.op(Opcode::Int2FloatS);
        e.op1(Opcode::PopS, operand.clone());
        e.op2(
            Opcode::Move,
            operand_type.clone(),
            Operand::string("float"),
        );
        e.op1(Opcode::Label, skip);
    }

    let same_type = new_label_op(e);
    let end = new_label_op(e);

    e.op3(
        Opcode::JumpIfEq,
        same_type.clone(),
        type1.clone(),
        type2.clone(),
    );
    // Different runtime types: equal is false, not-equal is true.
    e.op1(Opcode::PushS, Operand::ConstBool(op == "!="));
    e.op1(Opcode::Jump, end.clone());

    e.op1(Opcode::Label, same_type);
    e.op1(Opcode::PushS, op1);
    e.op1(Opcode::PushS, op2);

    let (opcode, negate) = match op {
        "<" => (Opcode::LtS, false),
        ">" => (Opcode::GtS, false),
        "==" => (Opcode::EqS, false),
        "!=" => (Opcode::EqS, true),
        "<=" => (Opcode::GtS, true),
        _ => (Opcode::LtS, true), // ">="
    };
    e.op(opcode);
    if negate {
        e.op(Opcode::NotS);
    }
    e.op1(Opcode::Label, end);
}

/// The `is` type test: consumes one stack value and pushes whether its
/// runtime type matches the named type. `Num` covers both int and float.
pub fn type_test(e: &mut Emitter, tested: DataType) {
    let value = pop_into_temp(e);
    let ty = type_of(e, &value);

    match tested {
        DataType::Num => {
            e.op1(Opcode::PushS, ty.clone());
            e.op1(Opcode::PushS, Operand::string("int"));
            e.op(Opcode::EqS);
            e.op1(Opcode::PushS, ty);
            e.op1(Opcode::PushS, Operand::string("float"));
            e.op(Opcode::EqS);
            e.op(Opcode::OrS);
        },
        DataType::String => {
            e.op1(Opcode::PushS, ty);
            e.op1(Opcode::PushS, Operand::string("string"));
            e.op(Opcode::EqS);
        },
        DataType::Null => {
            e.op1(Opcode::PushS, ty);
            e.op1(Opcode::PushS, Operand::string("nil"));
            e.op(Opcode::EqS);
        },
        DataType::Undef => {
            e.op1(Opcode::PushS, Operand::ConstBool(false));
        },
    }
}

/// `Ifj.write(x)`: a float holding an integral value prints as an int;
/// pushes `nil` as the call result.
pub fn builtin_write(e: &mut Emitter) -> DataType {
    e.blank();
    e.comment("Ifj.write call");

    let arg = pop_into_temp(e);

    e.op1(Opcode::PushS, arg.clone());
    e.op(Opcode::TypeS);

    let done = new_label_op(e);
    e.op1(Opcode::PushS, Operand::string("float"));
    e.op1(Opcode::JumpIfNeqS, done.clone());

    e.op1(Opcode::PushS, arg.clone());
    e.op(Opcode::IsIntS);
    e.op1(Opcode::PushS, Operand::ConstBool(true));
    e.op1(Opcode::JumpIfNeqS, done.clone());
    e.op2(Opcode::Float2Int, arg.clone(), arg.clone());
    e.op1(Opcode::Label, done);

    e.op1(Opcode::Write, arg);
    e.op1(Opcode::PushS, Operand::Nil);

    DataType::Null
}

/// `Ifj.read_str()`: reads a string and pushes it.
pub fn builtin_read_str(e: &mut Emitter) -> DataType {
    e.blank();
    e.comment("Ifj.read_str call");

    let result = new_temp_var(e);
    e.op1(Opcode::DefVar, result.clone());
    e.op2(Opcode::Read, result.clone(), Operand::TypeName("string"));
    e.op1(Opcode::PushS, result);

    DataType::String
}

/// `Ifj.read_num()`: reads a float; an integral value is truncated to int.
pub fn builtin_read_num(e: &mut Emitter) -> DataType {
    e.blank();
    e.comment("Ifj.read_num call");

    let result = new_temp_var(e);
    e.op1(Opcode::DefVar, result.clone());
    e.op2(Opcode::Read, result.clone(), Operand::TypeName("float"));

    let keep = new_label_op(e);
    e.op1(Opcode::PushS, result.clone());
    e.op(Opcode::TypeS);
    e.op1(Opcode::PushS, Operand::string("float"));
    e.op1(Opcode::JumpIfNeqS, keep.clone());

    e.op1(Opcode::PushS, result.clone());
    e.op(Opcode::IsIntS);
    e.op1(Opcode::PushS, Operand::ConstBool(true));
    e.op1(Opcode::JumpIfNeqS, keep.clone());
    e.op2(Opcode::Float2Int, result.clone(), result.clone());

    e.op1(Opcode::Label, keep);
    e.op1(Opcode::PushS, result);

    DataType::Num
}

/// `Ifj.strcmp(s1, s2)`: both arguments must be strings (runtime error
/// 25); pushes -1, 0 or 1.
pub fn builtin_strcmp(e: &mut Emitter) -> DataType {
    e.blank();
    e.comment("Ifj.strcmp call");

    let s2 = pop_into_temp(e);
    let s1 = pop_into_temp(e);

    e.op1(Opcode::PushS, s1.clone());
    e.op(Opcode::TypeS);
    e.op1(Opcode::PushS, s2.clone());
    e.op(Opcode::TypeS);

    let type_error = new_label_op(e);
    let checked = new_label_op(e);

    e.op1(Opcode::PushS, Operand::string("string"));
    e.op1(Opcode::JumpIfNeqS, type_error.clone());
    e.op1(Opcode::PushS, Operand::string("string"));
    e.op1(Opcode::JumpIfNeqS, type_error.clone());
    e.op1(Opcode::Jump, checked.clone());

    e.op1(Opcode::Label, type_error);
    e.op1(Opcode::Exit, Operand::ConstInt(RUNTIME_PARAM_TYPE_ERROR));

    e.op1(Opcode::Label, checked);

    let result = new_temp_var(e);
    e.op1(Opcode::DefVar, result.clone());

    let equal = new_label_op(e);
    let less = new_label_op(e);
    let end = new_label_op(e);

    e.op1(Opcode::PushS, s1.clone());
    e.op1(Opcode::PushS, s2.clone());
    e.op1(Opcode::JumpIfEqS, equal.clone());

    e.op1(Opcode::PushS, s1);
    e.op1(Opcode::PushS, s2);
    e.op(Opcode::LtS);
    e.op1(Opcode::PushS, Operand::ConstBool(true));
    e.op1(Opcode::JumpIfEqS, less.clone());

    e.op2(Opcode::Move, result.clone(), Operand::ConstInt(1));
    e.op1(Opcode::Jump, end.clone());

    e.op1(Opcode::Label, equal);
    e.op2(Opcode::Move, result.clone(), Operand::ConstInt(0));
    e.op1(Opcode::Jump, end.clone());

    e.op1(Opcode::Label, less);
    e.op2(Opcode::Move, result.clone(), Operand::ConstInt(-1));

    e.op1(Opcode::Label, end);
    e.op1(Opcode::PushS, result);

    DataType::Num
}

/// Truncates `value` (known int or float) to int when it is a float
/// carrying an integral value; a non-integral float or non-numeric value
/// jumps to `type_error`.
fn truncate_index_arg(e: &mut Emitter, value: &Operand, value_type: &Operand, type_error: &Operand) {
    let done = new_label_op(e);
    e.op1(Opcode::PushS, value_type.clone());
    e.op1(Opcode::PushS, Operand::string("int"));
    e.op1(Opcode::JumpIfEqS, done.clone());
    e.op1(Opcode::PushS, value_type.clone());
    e.op1(Opcode::PushS, Operand::string("float"));
    e.op1(Opcode::JumpIfNeqS, type_error.clone());
    e.op1(Opcode::PushS, value.clone());
    e.op(Opcode::IsIntS);
    e.op1(Opcode::PushS, Operand::ConstBool(true));
    e.op1(Opcode::JumpIfNeqS, type_error.clone());
    e.op2(Opcode::Float2Int, value.clone(), value.clone());
    e.op1(Opcode::Label, done);
}

/// `Ifj.ord(s, i)`: character code of `s[i]`, 0 for an out-of-range index
/// or empty string; argument type errors exit with 25.
pub fn builtin_ord(e: &mut Emitter) -> DataType {
    e.blank();
    e.comment("Ifj.ord call");

    let index = pop_into_temp(e);
    let string = pop_into_temp(e);
    let index_type = type_of(e, &index);

    let type_error = new_label_op(e);
    let checked = new_label_op(e);

    e.op1(Opcode::PushS, string.clone());
    e.op(Opcode::TypeS);
    e.op1(Opcode::PushS, Operand::string("string"));
    e.op1(Opcode::JumpIfNeqS, type_error.clone());

    truncate_index_arg(e, &index, &index_type, &type_error);
    e.op1(Opcode::Jump, checked.clone());

    e.op1(Opcode::Label, type_error);
    e.op1(Opcode::Exit, Operand::ConstInt(RUNTIME_PARAM_TYPE_ERROR));

    e.op1(Opcode::Label, checked);

    let length = new_temp_var(e);
    e.op1(Opcode::DefVar, length.clone());
    e.op2(Opcode::StrLen, length.clone(), string.clone());

    let result = new_temp_var(e);
    e.op1(Opcode::DefVar, result.clone());

    let return_zero = new_label_op(e);
    let end = new_label_op(e);

    // empty string
    e.op1(Opcode::PushS, length.clone());
    e.op1(Opcode::PushS, Operand::ConstInt(0));
    e.op1(Opcode::JumpIfEqS, return_zero.clone());

    // i < 0
    e.op1(Opcode::PushS, index.clone());
    e.op1(Opcode::PushS, Operand::ConstInt(0));
    e.op(Opcode::LtS);
    e.op1(Opcode::PushS, Operand::ConstBool(true));
    e.op1(Opcode::JumpIfEqS, return_zero.clone());

    // i >= length
    e.op1(Opcode::PushS, index.clone());
    e.op1(Opcode::PushS, length);
    e.op(Opcode::LtS);
    e.op(Opcode::NotS);
    e.op1(Opcode::PushS, Operand::ConstBool(true));
    e.op1(Opcode::JumpIfEqS, return_zero.clone());

    e.op3(Opcode::Stri2Int, result.clone(), string, index);
    e.op1(Opcode::Jump, end.clone());

    e.op1(Opcode::Label, return_zero);
    e.op2(Opcode::Move, result.clone(), Operand::ConstInt(0));

    e.op1(Opcode::Label, end);
    e.op1(Opcode::PushS, result);

    DataType::Num
}

/// `Ifj.floor(x)`: an int passes through, a float truncates, anything
/// else exits with 25.
pub fn builtin_floor(e: &mut Emitter) -> DataType {
    e.blank();
    e.comment("Ifj.floor call");

    let is_int = new_label_op(e);
    let not_numeric = new_label_op(e);
    let end = new_label_op(e);

    let arg = pop_into_temp(e);

    e.op1(Opcode::PushS, arg.clone());
    e.op(Opcode::TypeS);
    e.op1(Opcode::PushS, Operand::string("int"));
    e.op1(Opcode::JumpIfEqS, is_int.clone());

    e.op1(Opcode::PushS, arg.clone());
    e.op(Opcode::TypeS);
    e.op1(Opcode::PushS, Operand::string("float"));
    e.op1(Opcode::JumpIfNeqS, not_numeric.clone());

    e.op1(Opcode::PushS, arg.clone());
    e.op(Opcode::Float2IntS);
    e.op1(Opcode::Jump, end.clone());

    e.op1(Opcode::Label, is_int);
    e.op1(Opcode::PushS, arg);
    e.op1(Opcode::Jump, end.clone());

    e.op1(Opcode::Label, not_numeric);
    e.op1(Opcode::Exit, Operand::ConstInt(RUNTIME_PARAM_TYPE_ERROR));

    e.op1(Opcode::Label, end);

    DataType::Num
}

/// `Ifj.str(x)`: dispatches on the runtime type; a string passes through,
/// numbers convert, `null` becomes the string `"null"`.
pub fn builtin_str(e: &mut Emitter) -> DataType {
    e.blank();
    e.comment("Ifj.str call");

    let arg = pop_into_temp(e);

    let result = new_temp_var(e);
    e.op1(Opcode::DefVar, result.clone());

    let ty = type_of(e, &arg);

    let end = new_label_op(e);
    let is_string = new_label_op(e);
    let is_int = new_label_op(e);
    let is_float = new_label_op(e);
    let is_nil = new_label_op(e);

    e.op3(Opcode::JumpIfEq, is_nil.clone(), arg.clone(), Operand::Nil);
    e.op3(
        Opcode::JumpIfEq,
        is_string.clone(),
        ty.clone(),
        Operand::string("string"),
    );
    e.op3(
        Opcode::JumpIfEq,
        is_int.clone(),
        ty.clone(),
        Operand::string("int"),
    );
    e.op3(
        Opcode::JumpIfEq,
        is_float.clone(),
        ty,
        Operand::string("float"),
    );

    // any other runtime type stringifies to the empty string
    e.op2(Opcode::Move, result.clone(), Operand::string(""));
    e.op1(Opcode::Jump, end.clone());

    e.op1(Opcode::Label, is_string);
    e.op2(Opcode::Move, result.clone(), arg.clone());
    e.op1(Opcode::Jump, end.clone());

    e.op1(Opcode::Label, is_int);
    e.op2(Opcode::Int2Str, result.clone(), arg.clone());
    e.op1(Opcode::Jump, end.clone());

    e.op1(Opcode::Label, is_float);
    e.op2(Opcode::Float2Str, result.clone(), arg.clone());
    e.op1(Opcode::Jump, end.clone());

    e.op1(Opcode::Label, is_nil);
    e.op2(Opcode::Move, result.clone(), Operand::string("null"));

    e.op1(Opcode::Label, end);
    e.op1(Opcode::PushS, result);

    DataType::String
}

/// `Ifj.length(s)`: the argument must be a string (runtime error 25);
/// pushes its length.
pub fn builtin_length(e: &mut Emitter) -> DataType {
    e.blank();
    e.comment("Ifj.length call");

    let arg = pop_into_temp(e);

    e.op1(Opcode::PushS, arg.clone());
    e.op(Opcode::TypeS);

    let checked = new_label_op(e);
    e.op1(Opcode::PushS, Operand::string("string"));
    e.op1(Opcode::JumpIfEqS, checked.clone());
    e.op1(Opcode::Exit, Operand::ConstInt(RUNTIME_PARAM_TYPE_ERROR));

    e.op1(Opcode::Label, checked);

    let result = new_temp_var(e);
    e.op1(Opcode::DefVar, result.clone());
    e.op2(Opcode::StrLen, result.clone(), arg);
    e.op1(Opcode::PushS, result);

    DataType::Num
}

/// `Ifj.substring(s, i, j)`: nil for any out-of-range combination,
/// otherwise a GETCHAR/CONCAT loop building `s[i..j]`.
pub fn builtin_substring(e: &mut Emitter) -> DataType {
    e.blank();
    e.comment("Ifj.substring call");

    let j = pop_into_temp(e);
    let i = pop_into_temp(e);
    let s = pop_into_temp(e);

    let i_type = type_of(e, &i);
    let j_type = type_of(e, &j);

    let type_error = new_label_op(e);
    let checked = new_label_op(e);

    e.op1(Opcode::PushS, s.clone());
    e.op(Opcode::TypeS);
    e.op1(Opcode::PushS, Operand::string("string"));
    e.op1(Opcode::JumpIfNeqS, type_error.clone());

    truncate_index_arg(e, &j, &j_type, &type_error);
    truncate_index_arg(e, &i, &i_type, &type_error);
    e.op1(Opcode::Jump, checked.clone());

    e.op1(Opcode::Label, type_error);
    e.op1(Opcode::Exit, Operand::ConstInt(RUNTIME_PARAM_TYPE_ERROR));

    e.op1(Opcode::Label, checked);

    let length = new_temp_var(e);
    e.op1(Opcode::DefVar, length.clone());
    e.op2(Opcode::StrLen, length.clone(), s.clone());

    let return_nil = new_label_op(e);
    let end = new_label_op(e);

    // i < 0
    e.op1(Opcode::PushS, i.clone());
    e.op1(Opcode::PushS, Operand::ConstInt(0));
    e.op(Opcode::LtS);
    e.op1(Opcode::PushS, Operand::ConstBool(true));
    e.op1(Opcode::JumpIfEqS, return_nil.clone());

    // j < 0
    e.op1(Opcode::PushS, j.clone());
    e.op1(Opcode::PushS, Operand::ConstInt(0));
    e.op(Opcode::LtS);
    e.op1(Opcode::PushS, Operand::ConstBool(true));
    e.op1(Opcode::JumpIfEqS, return_nil.clone());

    // i > j
    e.op1(Opcode::PushS, i.clone());
    e.op1(Opcode::PushS, j.clone());
    e.op(Opcode::GtS);
    e.op1(Opcode::PushS, Operand::ConstBool(true));
    e.op1(Opcode::JumpIfEqS, return_nil.clone());

    // i >= length
    e.op1(Opcode::PushS, i.clone());
    e.op1(Opcode::PushS, length.clone());
    e.op(Opcode::LtS);
    e.op(Opcode::NotS);
    e.op1(Opcode::PushS, Operand::ConstBool(true));
    e.op1(Opcode::JumpIfEqS, return_nil.clone());

    // j > length
    e.op1(Opcode::PushS, j.clone());
    e.op1(Opcode::PushS, length);
    e.op(Opcode::GtS);
    e.op1(Opcode::PushS, Operand::ConstBool(true));
    e.op1(Opcode::JumpIfEqS, return_nil.clone());

    let result = new_temp_var(e);
    e.op1(Opcode::DefVar, result.clone());
    e.op2(Opcode::Move, result.clone(), Operand::string(""));

    let cursor = new_temp_var(e);
    e.op1(Opcode::DefVar, cursor.clone());
    e.op2(Opcode::Move, cursor.clone(), i);

    let current = new_temp_var(e);
    e.op1(Opcode::DefVar, current.clone());

    let loop_start = new_label_op(e);
    let loop_end = new_label_op(e);

    e.op1(Opcode::Label, loop_start.clone());
    e.op1(Opcode::PushS, cursor.clone());
    e.op1(Opcode::PushS, j);
    e.op(Opcode::LtS);
    e.op1(Opcode::PushS, Operand::ConstBool(false));
    e.op1(Opcode::JumpIfEqS, loop_end.clone());

    e.op3(Opcode::GetChar, current.clone(), s, cursor.clone());
    e.op3(Opcode::Concat, result.clone(), result.clone(), current.clone());
    e.op3(
        Opcode::Add,
        cursor.clone(),
        cursor.clone(),
        Operand::ConstInt(1),
    );
    e.op1(Opcode::Jump, loop_start);
    e.op1(Opcode::Label, loop_end);

    e.op1(Opcode::PushS, result);
    e.op1(Opcode::Jump, end.clone());

    e.op1(Opcode::Label, return_nil);
    e.op1(Opcode::PushS, Operand::Nil);

    e.op1(Opcode::Label, end);

    DataType::String
}

/// `Ifj.chr(i)`: the argument must be numeric with an integral value
/// (runtime error 25); pushes the one-character string.
pub fn builtin_chr(e: &mut Emitter) -> DataType {
    e.blank();
    e.comment("Ifj.chr call");

    let arg = pop_into_temp(e);
    let arg_type = type_of(e, &arg);

    let type_error = new_label_op(e);
    let checked = new_label_op(e);

    truncate_index_arg(e, &arg, &arg_type, &type_error);
    e.op1(Opcode::Jump, checked.clone());

    e.op1(Opcode::Label, type_error);
    e.op1(Opcode::Exit, Operand::ConstInt(RUNTIME_PARAM_TYPE_ERROR));

    e.op1(Opcode::Label, checked);

    e.op1(Opcode::PushS, arg);
    e.op(Opcode::Int2CharS);

    DataType::String
}
