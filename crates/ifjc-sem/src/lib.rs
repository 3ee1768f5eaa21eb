//! ifjc-sem - Symbols, scopes and compile-time checks for ifjc.
//!
//! IFJ25 is intentionally dynamic: most values only get a type at runtime,
//! so the compile-time layer here is thin. What it does own is name
//! resolution (per-scope AVL symbol tables stacked for nesting), the
//! built-in function registry, mangled-name bookkeeping for overloads and
//! accessors, and the few checks that can be decided statically.

pub mod builtins;
pub mod checks;
pub mod scope;
pub mod symbol;
pub mod symtable;
pub mod types;

pub use builtins::{install_builtins, BuiltinDef, BUILTINS};
pub use scope::ScopeStack;
pub use symbol::{
    function_key, function_label, getter_key, getter_label, setter_key, setter_label, Symbol,
};
pub use symtable::SymTable;
pub use types::DataType;
