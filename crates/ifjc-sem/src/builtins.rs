//! The `Ifj.*` built-in function registry.
//!
//! Built-ins live in the global symbol table under their dotted name and
//! are the only functions with non-`Undef` parameter types, which is what
//! makes compile-time argument checking possible for them. They are never
//! `CALL`ed; each call site expands to its IR pattern instead.

use indexmap::IndexMap;

use crate::symbol::Symbol;
use crate::symtable::SymTable;
use crate::types::DataType;

/// Signature of one built-in function.
pub struct BuiltinDef {
    pub name: &'static str,
    pub return_type: DataType,
    pub params: &'static [DataType],
}

/// All ten IFJ25 built-ins, in registration order.
pub const BUILTINS: &[BuiltinDef] = &[
    BuiltinDef {
        name: "Ifj.write",
        return_type: DataType::Null,
        params: &[DataType::Undef],
    },
    BuiltinDef {
        name: "Ifj.read_num",
        return_type: DataType::Num,
        params: &[],
    },
    BuiltinDef {
        name: "Ifj.read_str",
        return_type: DataType::String,
        params: &[],
    },
    BuiltinDef {
        name: "Ifj.floor",
        return_type: DataType::Num,
        params: &[DataType::Num],
    },
    BuiltinDef {
        name: "Ifj.str",
        return_type: DataType::String,
        params: &[DataType::Undef],
    },
    BuiltinDef {
        name: "Ifj.length",
        return_type: DataType::Num,
        params: &[DataType::String],
    },
    BuiltinDef {
        name: "Ifj.substring",
        return_type: DataType::String,
        params: &[DataType::String, DataType::Num, DataType::Num],
    },
    BuiltinDef {
        name: "Ifj.strcmp",
        return_type: DataType::Num,
        params: &[DataType::String, DataType::String],
    },
    BuiltinDef {
        name: "Ifj.ord",
        return_type: DataType::Num,
        params: &[DataType::String, DataType::Num],
    },
    BuiltinDef {
        name: "Ifj.chr",
        return_type: DataType::String,
        params: &[DataType::Num],
    },
];

/// The registry as an ordered map keyed by dotted name.
pub fn builtin_registry() -> IndexMap<&'static str, &'static BuiltinDef> {
    BUILTINS.iter().map(|def| (def.name, def)).collect()
}

/// Installs every built-in into the global table as a defined function.
pub fn install_builtins(globals: &mut SymTable) {
    for def in BUILTINS {
        let symbol = Symbol::Function {
            return_type: def.return_type,
            param_count: def.params.len(),
            param_types: def.params.to_vec(),
            param_names: Vec::new(),
            defined: true,
        };
        globals.insert(def.name, symbol);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_is_complete() {
        let registry = builtin_registry();
        assert_eq!(registry.len(), 10);
        assert!(registry.contains_key("Ifj.write"));
        assert!(registry.contains_key("Ifj.substring"));
    }

    #[test]
    fn test_install_builtins() {
        let mut globals = SymTable::new();
        install_builtins(&mut globals);
        match globals.find("Ifj.substring") {
            Some(Symbol::Function {
                param_count,
                param_types,
                defined,
                ..
            }) => {
                assert_eq!(*param_count, 3);
                assert_eq!(
                    param_types,
                    &vec![DataType::String, DataType::Num, DataType::Num]
                );
                assert!(*defined);
            },
            other => panic!("unexpected entry: {:?}", other),
        }
    }

    #[test]
    fn test_builtins_are_defined_up_front() {
        let mut globals = SymTable::new();
        install_builtins(&mut globals);
        let mut undefined = Vec::new();
        globals.visit(&mut |key, symbol| {
            if let Symbol::Function { defined: false, .. } = symbol {
                undefined.push(key.to_string());
            }
        });
        assert!(undefined.is_empty());
    }
}
