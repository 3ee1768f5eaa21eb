//! Function, getter and setter declarations.
//!
//! Every declaration lands in the global table under its mangled key
//! (`name@N`, `getter:name@0`, `setter:name@1`). Call sites may run ahead
//! of declarations; they insert forward entries with `defined = false`,
//! and the end-of-parse sweep reports any that never gained a body.

use ifjc_lex::TokenKind;
use ifjc_sem::{
    function_key, function_label, getter_key, getter_label, setter_key, setter_label, DataType,
    Symbol,
};
use ifjc_ir::{Opcode, Operand};
use ifjc_util::{CompileError, Result};

use crate::Parser;

/// What the global table already knows about a mangled key.
enum Declared {
    No,
    Forward,
    Defined,
}

impl<'a> Parser<'a> {
    /// `func_list := ( 'static' decl )+`
    pub(crate) fn parse_func_list(&mut self) -> Result<()> {
        if self.current.kind != TokenKind::KwStatic {
            return Err(CompileError::syntax(
                self.span(),
                "Missing expected 'static' keyword".to_string(),
            ));
        }

        while self.current.kind == TokenKind::KwStatic {
            self.parse_function_declaration()?;
            // end-of-line separates declarations; the class brace may
            // follow the last one directly
            if self.current.kind != TokenKind::Eol {
                break;
            }
            self.consume_eol()?;
        }
        Ok(())
    }

    fn declared_state(&self, key: &str) -> Declared {
        match self.scopes.globals().find(key) {
            Some(Symbol::Function { defined: true, .. }) => Declared::Defined,
            Some(_) => Declared::Forward,
            None => Declared::No,
        }
    }

    fn mark_defined(&mut self, key: &str) {
        if let Some(Symbol::Function { defined, .. }) = self.scopes.globals_mut().find_mut(key) {
            *defined = true;
        }
    }

    /// One `static` declaration: a regular function, a getter
    /// (`static name { … }`) or a setter (`static name = (p) { … }`).
    fn parse_function_declaration(&mut self) -> Result<()> {
        self.expect_and_consume(TokenKind::KwStatic)?;

        if self.current.kind != TokenKind::Ident {
            return Err(self.syntax_error("identifier"));
        }
        let name = self.current.text().to_string();
        self.advance()?;

        match self.current.kind {
            TokenKind::LBrace => return self.parse_getter(&name),
            TokenKind::Assign => return self.parse_setter(&name),
            TokenKind::LParen => {},
            _ => return Err(self.syntax_error("(")),
        }

        self.advance()?;
        self.skip_optional_eol()?;

        self.scopes.push_scope();

        let params = self.parse_parameter_list()?;
        let param_count = params.len();

        self.emitter.comment("####################");
        self.emitter.comment(format!("Function declaration: {name}"));
        self.emitter.comment("####################");
        self.emitter.op1(
            Opcode::Label,
            Operand::label(function_label(&name, param_count)),
        );

        self.emit_retval_prologue();

        for (_, unique_name) in &params {
            self.emitter
                .op1(Opcode::DefVar, Operand::local(unique_name.clone()));
        }
        for (index, (_, unique_name)) in params.iter().enumerate() {
            self.emitter.op2(
                Opcode::Move,
                Operand::local(unique_name.clone()),
                Operand::local(format!("%param{index}")),
            );
        }

        self.emitter.blank();
        self.emitter.reset_temps();

        self.expect_and_consume(TokenKind::RParen)?;

        let key = function_key(&name, param_count);
        let param_names: Vec<String> = params.iter().map(|(source, _)| source.clone()).collect();
        let span = self.span();

        match self.declared_state(&key) {
            Declared::Defined => {
                return Err(CompileError::redefinition(
                    span,
                    format!("Function '{name}' redefined"),
                ));
            },
            Declared::Forward => {
                // a call site saw this function first; fill in the details
                if let Some(Symbol::Function {
                    param_count: declared_count,
                    param_types,
                    param_names: declared_names,
                    ..
                }) = self.scopes.globals_mut().find_mut(&key)
                {
                    *declared_count = param_count;
                    *param_types = vec![DataType::Undef; param_count];
                    *declared_names = param_names;
                }
            },
            Declared::No => {
                let mut symbol = Symbol::forward_function(param_count);
                if let Symbol::Function {
                    param_names: names, ..
                } = &mut symbol
                {
                    *names = param_names;
                }
                self.scopes.globals_mut().insert(&key, symbol);
            },
        }

        self.parse_block(true)?;
        self.mark_defined(&key);

        self.scopes.pop_scope();

        self.emitter.op(Opcode::Return);
        self.emitter.blank();
        self.emitter.blank();
        Ok(())
    }

    /// `static name { ... }` is a getter: no parameter list, label
    /// `name$0%getter`, read through a zero-argument call.
    fn parse_getter(&mut self, name: &str) -> Result<()> {
        let key = getter_key(name);
        let span = self.span();

        match self.declared_state(&key) {
            Declared::Defined => {
                return Err(CompileError::redefinition(
                    span,
                    format!("Getter '{name}' redefined"),
                ));
            },
            Declared::Forward => {},
            Declared::No => {
                self.scopes
                    .globals_mut()
                    .insert(&key, Symbol::forward_function(0));
            },
        }

        self.scopes.push_scope();

        self.emitter.comment("####################");
        self.emitter
            .comment(format!("Function declaration: {name} (getter)"));
        self.emitter.comment("####################");
        self.emitter
            .op1(Opcode::Label, Operand::label(getter_label(name)));

        self.emit_retval_prologue();
        self.emitter.reset_temps();

        self.parse_block(true)?;
        self.mark_defined(&key);

        self.scopes.pop_scope();

        self.emitter.op(Opcode::Return);
        self.emitter.blank();
        self.emitter.blank();
        Ok(())
    }

    /// `static name = (param) { ... }` is a setter: one parameter, label
    /// `name$1%setter`, invoked by assignment statements.
    fn parse_setter(&mut self, name: &str) -> Result<()> {
        self.advance()?; // consume '='
        self.expect_and_consume(TokenKind::LParen)?;

        if self.current.kind != TokenKind::Ident {
            return Err(self.syntax_error("identifier"));
        }
        let param_name = self.current.text().to_string();
        self.advance()?;
        self.expect_and_consume(TokenKind::RParen)?;

        let key = setter_key(name);
        let span = self.span();

        match self.declared_state(&key) {
            Declared::Defined => {
                return Err(CompileError::redefinition(
                    span,
                    format!("Setter '{name}' already defined"),
                ));
            },
            Declared::Forward => {},
            Declared::No => {
                self.scopes
                    .globals_mut()
                    .insert(&key, Symbol::forward_function(1));
            },
        }

        self.scopes.push_scope();

        let unique_name = self.emitter.unique_name(&param_name);
        if let Some(table) = self.scopes.innermost_mut() {
            table.insert(&param_name, Symbol::variable(unique_name.clone()));
        }

        self.emitter
            .op1(Opcode::Label, Operand::label(setter_label(name)));

        self.emit_retval_prologue();

        self.emitter
            .op1(Opcode::DefVar, Operand::local(unique_name.clone()));
        self.emitter.op2(
            Opcode::Move,
            Operand::local(unique_name),
            Operand::local("%param0"),
        );
        self.emitter.reset_temps();

        self.parse_block(true)?;
        self.mark_defined(&key);

        self.scopes.pop_scope();

        self.emitter.op(Opcode::Return);
        self.emitter.blank();
        self.emitter.blank();
        Ok(())
    }

    /// Defines `%retval` and initializes it to nil; every callable starts
    /// with this so a body without `return` yields nil.
    fn emit_retval_prologue(&mut self) {
        self.emitter.op1(Opcode::DefVar, Operand::local("%retval"));
        self.emitter
            .op2(Opcode::Move, Operand::local("%retval"), Operand::Nil);
    }

    /// `param_list := ( id ( ',' id )* )?`; leaves the closing `)` as the
    /// current token. Each parameter gets a fresh unique IR name in the
    /// just-pushed function scope. Returns (source name, unique name)
    /// pairs in declaration order.
    fn parse_parameter_list(&mut self) -> Result<Vec<(String, String)>> {
        let mut params = Vec::new();

        if self.current.kind == TokenKind::RParen {
            return Ok(params);
        }

        self.emitter.blank();
        self.emitter.comment("Parameter declaration");

        loop {
            if self.current.kind != TokenKind::Ident {
                return Err(self.syntax_error("identifier"));
            }
            let param_name = self.current.text().to_string();
            let span = self.span();

            let unique_name = self.emitter.unique_name(&param_name);
            let inserted = match self.scopes.innermost_mut() {
                Some(table) => table.insert(&param_name, Symbol::variable(unique_name.clone())),
                None => return Err(CompileError::internal("no open scope for parameter")),
            };
            if !inserted {
                return Err(CompileError::redefinition(
                    span,
                    format!("Redefinition of function parameter '{param_name}'"),
                ));
            }
            params.push((param_name, unique_name));

            self.advance()?;
            if self.current.kind == TokenKind::RParen {
                break;
            }
            self.expect_and_consume(TokenKind::Comma)?;
            self.skip_optional_eol()?;
        }

        Ok(params)
    }

    /// End-of-parse sweep over the global table: any function entry still
    /// not defined was referenced (called, or targeted by an accessor
    /// rewrite) but never declared with a body.
    pub(crate) fn check_undefined_functions(&self) -> Result<()> {
        let mut first_undefined: Option<String> = None;
        self.scopes.globals().visit(&mut |key, symbol| {
            if first_undefined.is_none() {
                if let Symbol::Function { defined: false, .. } = symbol {
                    first_undefined = Some(key.to_string());
                }
            }
        });

        match first_undefined {
            Some(key) => Err(CompileError::undefined_function(format!(
                "Undefined function '{key}'"
            ))),
            None => Ok(()),
        }
    }
}
