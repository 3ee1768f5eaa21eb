//! Scope stack.
//!
//! Nested lexical scopes form a last-in-first-out stack of symbol tables.
//! The global table sits at the bottom for the whole compilation and holds
//! built-ins, functions, accessors and `__`-prefixed globals; local tables
//! are pushed for each function body and block and dropped when the scope
//! closes, so nothing entered in a scope escapes into another scope's
//! lookup.

use crate::symbol::Symbol;
use crate::symtable::SymTable;

/// Stack of symbol tables with the innermost scope on top.
#[derive(Default)]
pub struct ScopeStack {
    globals: SymTable,
    locals: Vec<SymTable>,
}

impl ScopeStack {
    /// Creates a stack holding only the (empty) global scope.
    pub fn new() -> Self {
        Self {
            globals: SymTable::new(),
            locals: Vec::new(),
        }
    }

    /// Opens a new innermost scope.
    pub fn push_scope(&mut self) {
        self.locals.push(SymTable::new());
    }

    /// Closes the innermost scope, dropping its table.
    pub fn pop_scope(&mut self) {
        self.locals.pop();
    }

    /// Number of open local scopes.
    pub fn depth(&self) -> usize {
        self.locals.len()
    }

    /// The innermost local table, if any scope is open.
    pub fn innermost_mut(&mut self) -> Option<&mut SymTable> {
        self.locals.last_mut()
    }

    /// The global table at the bottom of the stack.
    pub fn globals(&self) -> &SymTable {
        &self.globals
    }

    /// Mutable access to the global table.
    pub fn globals_mut(&mut self) -> &mut SymTable {
        &mut self.globals
    }

    /// Walks outward from the innermost scope to the global table and
    /// returns the first hit. Used for variable resolution inside function
    /// bodies.
    pub fn find(&self, key: &str) -> Option<&Symbol> {
        for table in self.locals.iter().rev() {
            if let Some(symbol) = table.find(key) {
                return Some(symbol);
            }
        }
        self.globals.find(key)
    }

    /// Outward lookup restricted to local scopes, skipping the globals.
    pub fn find_local(&self, key: &str) -> Option<&Symbol> {
        for table in self.locals.iter().rev() {
            if let Some(symbol) = table.find(key) {
                return Some(symbol);
            }
        }
        None
    }
}
