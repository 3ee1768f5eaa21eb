//! Blocks and statements.
//!
//! Statements are parsed by recursive descent and lowered on the spot:
//! there is no intermediate tree. Control flow (`if`, `while`) routes its
//! condition through the truthiness pattern; `while` additionally runs the
//! DEFVAR hoisting pass over the instructions its body emitted.

use ifjc_lex::TokenKind;
use ifjc_sem::{checks, function_key, function_label, setter_key, setter_label, DataType, Symbol};
use ifjc_ir::{patterns, Opcode, Operand};
use ifjc_util::{CompileError, Result};

use crate::Parser;

impl<'a> Parser<'a> {
    /// `block := '{' ( statement EOL )* '}' | '{' expr? '}'`
    ///
    /// The one-line form (no EOL after `{`) compiles as a `return` inside
    /// a function body. In nested position its value is popped into a
    /// scratch temporary so the data stack stays balanced.
    pub(crate) fn parse_block(&mut self, is_function_body: bool) -> Result<()> {
        if !is_function_body {
            self.scopes.push_scope();
        }

        self.expect_and_consume(TokenKind::LBrace)?;

        if self.current.kind != TokenKind::Eol {
            // one-line block
            if self.current.kind != TokenKind::RBrace {
                if is_function_body {
                    self.emit_return(true)?;
                } else {
                    self.parse_expression()?;
                    let scratch = Operand::temp(self.emitter.new_temp());
                    self.emitter.op1(Opcode::DefVar, scratch.clone());
                    self.emitter.op1(Opcode::PopS, scratch);
                }
            }
            self.expect_and_consume(TokenKind::RBrace)?;
            if !is_function_body {
                self.scopes.pop_scope();
            }
            return Ok(());
        }

        self.consume_eol()?;

        while self.current.kind != TokenKind::RBrace && self.current.kind != TokenKind::Eof {
            self.parse_statement()?;
            self.consume_eol()?;
        }

        self.expect_and_consume(TokenKind::RBrace)?;

        if !is_function_body {
            self.scopes.pop_scope();
        }
        Ok(())
    }

    fn parse_statement(&mut self) -> Result<()> {
        match self.current.kind {
            TokenKind::LBrace => self.parse_block(false),
            TokenKind::KwIf => self.parse_if_statement(),
            TokenKind::KwWhile => self.parse_while_statement(),
            TokenKind::KwReturn => self.emit_return(false),
            TokenKind::KwVar => self.parse_variable_declaration(),
            TokenKind::Ident | TokenKind::GlobalIdent => self.parse_assignment_statement(),
            TokenKind::KwIfj => {
                self.parse_ifj_call()?;
                Ok(())
            },
            _ => Err(CompileError::syntax(
                self.span(),
                format!("Unexpected token '{}'.", self.current.kind.describe()),
            )),
        }
    }

    /// `'return' expr`, or the bare one-line block body.
    pub(crate) fn emit_return(&mut self, is_one_line: bool) -> Result<()> {
        if !is_one_line {
            self.advance()?; // consume 'return'
        }

        self.parse_expression()?;
        self.emitter
            .op1(Opcode::PopS, Operand::local("%retval"));
        self.emitter.op(Opcode::Return);
        Ok(())
    }

    /// Pops the expression result into a fresh temporary and reduces it
    /// to a boolean via the truthiness pattern; the boolean ends up on
    /// the data stack.
    fn lower_condition(&mut self) -> Result<()> {
        self.parse_expression()?;

        let value = Operand::temp(self.emitter.new_temp());
        self.emitter.op1(Opcode::DefVar, value.clone());
        self.emitter.op1(Opcode::PopS, value.clone());

        patterns::truthiness(&mut self.emitter, &value);
        Ok(())
    }

    /// `'if' '(' expr ')' block 'else' block`
    fn parse_if_statement(&mut self) -> Result<()> {
        self.advance()?; // consume 'if'
        self.expect_and_consume(TokenKind::LParen)?;
        self.skip_optional_eol()?;

        self.emitter.blank();
        self.emitter.comment("If statement condition");
        self.lower_condition()?;

        self.expect_and_consume(TokenKind::RParen)?;

        let else_label = Operand::label(self.emitter.new_label());
        self.emitter
            .op1(Opcode::PushS, Operand::ConstBool(false));
        self.emitter.op1(Opcode::JumpIfEqS, else_label.clone());

        self.emitter.comment("If-block");
        self.parse_block(false)?;

        self.expect_and_consume(TokenKind::KwElse)?;

        let end_label = Operand::label(self.emitter.new_label());
        self.emitter.op1(Opcode::Jump, end_label.clone());
        self.emitter.op1(Opcode::Label, else_label);

        self.emitter.comment("Else-block");
        self.parse_block(false)?;

        self.emitter.op1(Opcode::Label, end_label);
        self.emitter.comment("If statement end");
        self.emitter.blank();
        Ok(())
    }

    /// `'while' '(' expr ')' block`
    ///
    /// After the loop is fully emitted, every `DEFVAR` of a local-frame
    /// variable between the loop anchor and the loop end is hoisted out
    /// in front of the loop label, so re-entry does not redefine them.
    fn parse_while_statement(&mut self) -> Result<()> {
        self.advance()?; // consume 'while'
        self.expect_and_consume(TokenKind::LParen)?;
        self.skip_optional_eol()?;

        self.emitter.blank();
        self.emitter.comment("While loop start");
        let anchor = match self.emitter.list().active_id() {
            Some(id) => id,
            None => return Err(CompileError::internal("emitter has no active node")),
        };

        let loop_start = Operand::label(self.emitter.new_label());
        let loop_end = Operand::label(self.emitter.new_label());

        self.emitter.op1(Opcode::Label, loop_start.clone());
        self.emitter.comment("While condition");

        self.lower_condition()?;

        let condition = Operand::temp(self.emitter.new_temp());
        self.emitter.op1(Opcode::DefVar, condition.clone());
        self.emitter.op1(Opcode::PopS, condition.clone());
        self.emitter.op3(
            Opcode::JumpIfEq,
            loop_end.clone(),
            condition,
            Operand::ConstBool(false),
        );

        self.expect_and_consume(TokenKind::RParen)?;

        self.emitter.comment("While body");
        self.parse_block(false)?;

        self.emitter.op1(Opcode::Jump, loop_start);
        self.emitter.op1(Opcode::Label, loop_end);
        self.emitter.comment("While loop end");
        let stop = self.emitter.op(Opcode::Nop);

        self.emitter.list_mut().hoist_defvars(anchor, stop);
        self.emitter.list_mut().set_active(stop);
        Ok(())
    }

    /// `'var' ident ( '=' expr )?`
    ///
    /// Locals get a fresh unique IR name and an inline `DEFVAR`;
    /// `__` globals go to the global table and the global-definition side
    /// list printed in the program preamble.
    fn parse_variable_declaration(&mut self) -> Result<()> {
        self.advance()?; // consume 'var'

        let is_global = match self.current.kind {
            TokenKind::Ident => false,
            TokenKind::GlobalIdent => true,
            _ => return Err(self.syntax_error("identifier")),
        };
        let name = self.current.text().to_string();
        let span = self.span();
        self.advance()?;

        let operand = if is_global {
            let inserted = self
                .scopes
                .globals_mut()
                .insert(&name, Symbol::variable(name.clone()));
            if !inserted {
                return Err(CompileError::redefinition(
                    span,
                    format!("Variable '{name}' redefined"),
                ));
            }
            self.emitter.define_global(&name);
            Operand::global(name.clone())
        } else {
            let unique_name = self.emitter.unique_name(&name);
            let inserted = match self.scopes.innermost_mut() {
                Some(table) => table.insert(&name, Symbol::variable(unique_name.clone())),
                None => return Err(CompileError::internal("no open scope for variable")),
            };
            if !inserted {
                return Err(CompileError::redefinition(
                    span,
                    format!("Variable '{name}' redefined"),
                ));
            }
            Operand::local(unique_name)
        };

        self.emitter.blank();
        self.emitter
            .comment(format!("Declaration of variable '{name}'"));
        if !is_global {
            self.emitter.op1(Opcode::DefVar, operand.clone());
        }

        if self.current.kind == TokenKind::Assign {
            self.advance()?;
            let expr_type = self.parse_expression()?;
            self.set_variable_type(&name, is_global, expr_type);
            self.emitter.op1(Opcode::PopS, operand);
        }
        Ok(())
    }

    fn set_variable_type(&mut self, name: &str, is_global: bool, data_type: DataType) {
        let symbol = if is_global {
            self.scopes.globals_mut().find_mut(name)
        } else {
            match self.scopes.innermost_mut() {
                Some(table) => table.find_mut(name),
                None => None,
            }
        };
        if let Some(Symbol::Variable { data_type: t, .. }) = symbol {
            *t = data_type;
        }
    }

    /// `ident '=' expr`, `ident '(' args? ')'` in statement position, or
    /// an assignment to a setter name.
    ///
    /// The setter rewrite is an explicit desugaring: when the left-hand
    /// side is a known (or forward-declared) setter, the statement becomes
    /// evaluate-RHS, pop into `TF@%param0`, call `name$1%setter`.
    fn parse_assignment_statement(&mut self) -> Result<()> {
        if self.current.kind == TokenKind::Ident && self.peek()?.kind == TokenKind::LParen {
            return self.parse_function_call();
        }

        let is_global = self.current.kind == TokenKind::GlobalIdent;
        let name = self.current.text().to_string();
        self.advance()?;

        if is_global {
            let is_new = self.scopes.globals().find(&name).is_none();
            if is_new {
                self.scopes
                    .globals_mut()
                    .insert(&name, Symbol::variable(name.clone()));
                self.emitter.define_global(&name);
            } else {
                self.emitter
                    .comment(format!("Assignment to variable '{name}'"));
            }

            self.expect_and_consume(TokenKind::Assign)?;
            self.skip_optional_eol()?;
            self.parse_expression()?;
            self.emitter
                .op1(Opcode::PopS, Operand::global(name));
            self.emitter.blank();
            return Ok(());
        }

        let variable = match self.scopes.find(&name) {
            Some(Symbol::Variable { unique_name, .. }) => Some(unique_name.clone()),
            _ => None,
        };
        let has_setter = self.scopes.globals().find(&setter_key(&name)).is_some();

        if variable.is_none() || has_setter {
            // Setter rewrite. An unknown target forward-declares the
            // setter; it must gain a body before the parse ends.
            if variable.is_none() && !has_setter {
                self.scopes
                    .globals_mut()
                    .insert(&setter_key(&name), Symbol::forward_function(1));
            }

            self.expect_and_consume(TokenKind::Assign)?;
            self.skip_optional_eol()?;
            self.parse_expression()?;

            self.emitter.op(Opcode::CreateFrame);
            self.emitter
                .op1(Opcode::DefVar, Operand::tf("%param0"));
            self.emitter.op1(Opcode::PopS, Operand::tf("%param0"));
            self.emitter.op(Opcode::PushFrame);
            self.emitter
                .op1(Opcode::Call, Operand::label(setter_label(&name)));
            self.emitter.op(Opcode::PopFrame);
            return Ok(());
        }

        self.emitter
            .comment(format!("Assignment to variable '{name}'"));

        self.expect_and_consume(TokenKind::Assign)?;
        self.skip_optional_eol()?;
        self.parse_expression()?;

        match variable {
            Some(unique_name) => {
                self.emitter
                    .op1(Opcode::PopS, Operand::local(unique_name));
            },
            None => return Err(CompileError::internal("assignment target vanished")),
        }
        self.emitter.blank();
        Ok(())
    }

    /// `ident '(' args? ')'`: a user-function call, in statement or
    /// expression position. Leaves `TF@%retval` pushed on the data stack.
    pub(crate) fn parse_function_call(&mut self) -> Result<()> {
        let name = self.current.text().to_string();
        let call_span = self.span();
        self.advance()?;

        self.expect_and_consume(TokenKind::LParen)?;
        self.skip_optional_eol()?;

        let mut arg_count = 0usize;
        if self.current.kind != TokenKind::RParen {
            self.parse_expression()?;
            arg_count += 1;
            while self.current.kind == TokenKind::Comma {
                self.advance()?;
                self.skip_optional_eol()?;
                self.parse_expression()?;
                arg_count += 1;
            }
        }

        self.expect_and_consume(TokenKind::RParen)?;

        self.emitter.op(Opcode::CreateFrame);
        for index in 0..arg_count {
            self.emitter
                .op1(Opcode::DefVar, Operand::tf(format!("%param{index}")));
        }
        // arguments were pushed left to right; pop them back in reverse
        for index in (0..arg_count).rev() {
            self.emitter
                .op1(Opcode::PopS, Operand::tf(format!("%param{index}")));
        }

        self.emitter.op(Opcode::PushFrame);
        self.emitter.op1(
            Opcode::Call,
            Operand::label(function_label(&name, arg_count)),
        );
        self.emitter.op(Opcode::PopFrame);
        self.emitter
            .op1(Opcode::PushS, Operand::tf("%retval"));

        let key = function_key(&name, arg_count);
        let known = self.scopes.globals().find(&key).map(Symbol::is_function);
        match known {
            Some(true) => Ok(()),
            Some(false) => Err(CompileError::undefined_function(format!(
                "'{name}' is not a function"
            ))),
            None => {
                if self.scopes.globals().find_function(&key) {
                    return Err(CompileError::wrong_argument_count(
                        call_span,
                        format!("Wrong argument count for function '{name}'"),
                    ));
                }
                self.scopes
                    .globals_mut()
                    .insert(&key, Symbol::forward_function(arg_count));
                Ok(())
            },
        }
    }

    /// `'Ifj' '.' ident '(' args? ')'`: expands the built-in's IR pattern
    /// in place; no `CALL` is emitted.
    pub(crate) fn parse_ifj_call(&mut self) -> Result<DataType> {
        self.expect_and_consume(TokenKind::KwIfj)?;
        self.expect_and_consume(TokenKind::Dot)?;
        self.skip_optional_eol()?;

        if self.current.kind != TokenKind::Ident {
            return Err(self.syntax_error("identifier"));
        }
        let method = self.current.text().to_string();
        let full_name = format!("Ifj.{method}");
        let call_span = self.span();
        self.advance()?;

        self.expect_and_consume(TokenKind::LParen)?;
        self.skip_optional_eol()?;

        let mut arg_types = Vec::new();
        if self.current.kind != TokenKind::RParen {
            arg_types.push(self.parse_expression()?);
            while self.current.kind == TokenKind::Comma {
                self.advance()?;
                self.skip_optional_eol()?;
                arg_types.push(self.parse_expression()?);
            }
        }

        self.expect_and_consume(TokenKind::RParen)?;

        let symbol = match self.scopes.globals().find(&full_name) {
            Some(symbol @ Symbol::Function { .. }) => symbol.clone(),
            _ => {
                return Err(CompileError::undefined_function(format!(
                    "Undefined built-in function '{full_name}'"
                )));
            },
        };

        checks::check_builtin_args(&full_name, &symbol, &arg_types, call_span)?;

        let e = &mut self.emitter;
        let return_type = match method.as_str() {
            "write" => patterns::builtin_write(e),
            "read_str" => patterns::builtin_read_str(e),
            "read_num" => patterns::builtin_read_num(e),
            "strcmp" => patterns::builtin_strcmp(e),
            "ord" => patterns::builtin_ord(e),
            "floor" => patterns::builtin_floor(e),
            "str" => patterns::builtin_str(e),
            "length" => patterns::builtin_length(e),
            "substring" => patterns::builtin_substring(e),
            "chr" => patterns::builtin_chr(e),
            _ => {
                return Err(CompileError::internal(format!(
                    "builtin '{full_name}' has no pattern"
                )));
            },
        };

        Ok(return_type)
    }
}
