//! Symbol descriptors and name mangling.
//!
//! Regular functions, getters and setters share one namespace with
//! variables through mangled symbol-table keys:
//!
//! - plain `name` for variables,
//! - `name@N` for a user function of arity N,
//! - `getter:name@0` / `setter:name@1` for accessors,
//! - dotted `Ifj.name` for built-ins.
//!
//! The corresponding IR label forms are `name$N%func`, `name$0%getter` and
//! `name$1%setter`.

use crate::types::DataType;

/// A symbol-table entry.
#[derive(Clone, Debug, PartialEq)]
pub enum Symbol {
    /// A variable, with its (usually `Undef`) type and its stable unique
    /// IR name. Two distinct scopes never share a unique name, so shadowed
    /// variables cannot alias in the flat IR namespace.
    Variable {
        data_type: DataType,
        unique_name: String,
    },
    /// A user function or built-in. `defined` distinguishes forward
    /// references created at call sites from declarations with a body;
    /// built-ins are installed as defined.
    Function {
        return_type: DataType,
        param_count: usize,
        param_types: Vec<DataType>,
        param_names: Vec<String>,
        defined: bool,
    },
}

impl Symbol {
    /// A variable descriptor with an as-yet-unknown type.
    pub fn variable(unique_name: impl Into<String>) -> Self {
        Symbol::Variable {
            data_type: DataType::Undef,
            unique_name: unique_name.into(),
        }
    }

    /// A forward-declared function of the given arity: every parameter
    /// type is `Undef` and no body has been seen yet.
    pub fn forward_function(param_count: usize) -> Self {
        Symbol::Function {
            return_type: DataType::Undef,
            param_count,
            param_types: vec![DataType::Undef; param_count],
            param_names: Vec::new(),
            defined: false,
        }
    }

    /// True for function descriptors.
    pub fn is_function(&self) -> bool {
        matches!(self, Symbol::Function { .. })
    }
}

/// Symbol-table key for a user function of the given arity.
pub fn function_key(name: &str, arity: usize) -> String {
    format!("{name}@{arity}")
}

/// Symbol-table key for a getter.
pub fn getter_key(name: &str) -> String {
    format!("getter:{name}@0")
}

/// Symbol-table key for a setter.
pub fn setter_key(name: &str) -> String {
    format!("setter:{name}@1")
}

/// IR label for a user function of the given arity.
pub fn function_label(name: &str, arity: usize) -> String {
    format!("{name}${arity}%func")
}

/// IR label for a getter.
pub fn getter_label(name: &str) -> String {
    format!("{name}$0%getter")
}

/// IR label for a setter.
pub fn setter_label(name: &str) -> String {
    format!("{name}$1%setter")
}
