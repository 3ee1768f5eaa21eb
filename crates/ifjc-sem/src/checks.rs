//! Compile-time semantic checks.
//!
//! The static layer only rejects what can never succeed at runtime and is
//! actually known at compile time: arithmetic on a `null` operand, and
//! built-in arguments whose literal types contradict the signature.
//! Everything else stays `Undef` and is handled by the runtime
//! type-dispatch code the IR patterns emit.

use ifjc_util::{CompileError, Result, Span};

use crate::symbol::Symbol;
use crate::types::DataType;

/// Types an arithmetic operation and rejects known-`null` operands.
///
/// Returns the propagated result type. Operand pairs whose runtime
/// behavior is data-dependent (e.g. Num + String) propagate `Undef` and
/// defer to the emitted runtime checks.
pub fn check_operation(op: &str, left: DataType, right: DataType, span: Span) -> Result<DataType> {
    if left == DataType::Undef || right == DataType::Undef {
        return Ok(DataType::Undef);
    }

    if left == DataType::Null || right == DataType::Null {
        return Err(CompileError::type_incompatibility(
            span,
            format!("Operand of '{op}' cannot be null"),
        ));
    }

    let result = match op {
        "+" => match (left, right) {
            (DataType::Num, DataType::Num) => DataType::Num,
            (DataType::String, DataType::String) => DataType::String,
            _ => DataType::Undef,
        },
        "-" | "/" => match (left, right) {
            (DataType::Num, DataType::Num) => DataType::Num,
            _ => DataType::Undef,
        },
        "*" => match (left, right) {
            (DataType::Num, DataType::Num) => DataType::Num,
            (DataType::String, DataType::Num) | (DataType::Num, DataType::String) => {
                DataType::String
            },
            _ => DataType::Undef,
        },
        _ => DataType::Undef,
    };

    Ok(result)
}

/// Checks a built-in call's argument count and statically known argument
/// types against the function's signature.
pub fn check_builtin_args(
    name: &str,
    symbol: &Symbol,
    arg_types: &[DataType],
    span: Span,
) -> Result<()> {
    let (param_count, param_types) = match symbol {
        Symbol::Function {
            param_count,
            param_types,
            ..
        } => (*param_count, param_types.as_slice()),
        Symbol::Variable { .. } => {
            return Err(CompileError::undefined_function(format!(
                "'{name}' is not a function"
            )));
        },
    };

    if arg_types.len() != param_count {
        return Err(CompileError::wrong_argument_count(
            span,
            format!(
                "'{name}' expects {param_count} arguments, got {}",
                arg_types.len()
            ),
        ));
    }

    for (index, (&expected, &given)) in param_types.iter().zip(arg_types).enumerate() {
        if expected.is_known() && given.is_known() && expected != given {
            return Err(CompileError::type_incompatibility(
                span,
                format!(
                    "Argument {} of '{name}': expected {expected}, got {given}",
                    index + 1
                ),
            ));
        }
    }

    Ok(())
}
