//! Operator-precedence expression parsing.
//!
//! Expressions are analyzed with a fixed 10×10 precedence table over
//! symbolic categories derived from token kinds. A side stack holds
//! terminals and reduced non-terminals; every reduction emits the IR for
//! the sub-expression it covers, so by the time the expression ends its
//! value sits on the interpreter's data stack.
//!
//! Function-call atoms (an identifier followed by `(`) and `Ifj.` calls
//! are not driven through the table: the statement parser's call routines
//! consume them and leave the return value on the data stack, and the
//! side stack receives a ready non-terminal.

use ifjc_lex::TokenKind;
use ifjc_sem::{checks, getter_key, getter_label, DataType, Symbol};
use ifjc_ir::{patterns, Opcode, Operand};
use ifjc_util::{CompileError, Result};

use crate::literal;
use crate::Parser;

/// Symbolic categories indexing the precedence table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PrecSym {
    MulDiv = 0,
    PlusMinus,
    Rel,
    EqNeq,
    Is,
    Type,
    LParen,
    RParen,
    Id,
    Dollar,
}

/// Precedence relations.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Prec {
    Less,
    Greater,
    Equal,
    Error,
}

use Prec::{Equal as Q, Error as X, Greater as G, Less as L};

/// `PRECEDENCE[stack_terminal][lookahead]`.
#[rustfmt::skip]
const PRECEDENCE: [[Prec; 10]; 10] = [
    //            *,/  +,-  rel  ==   is  TYPE  (    )    id   $
    /* *,/  */  [ G,   G,   G,   G,   G,   X,   L,   G,   L,   G ],
    /* +,-  */  [ L,   G,   G,   G,   G,   X,   L,   G,   L,   G ],
    /* rel  */  [ L,   L,   G,   G,   G,   X,   L,   G,   L,   G ],
    /* ==   */  [ L,   L,   L,   G,   L,   X,   L,   G,   L,   G ],
    /* is   */  [ L,   L,   L,   L,   X,   L,   L,   G,   L,   G ],
    /* TYPE */  [ G,   G,   G,   G,   G,   G,   X,   G,   X,   G ],
    /* (    */  [ L,   L,   L,   L,   L,   L,   L,   Q,   L,   X ],
    /* )    */  [ G,   G,   G,   G,   G,   G,   X,   G,   X,   G ],
    /* id   */  [ G,   G,   G,   G,   G,   X,   X,   G,   X,   G ],
    /* $    */  [ L,   L,   L,   L,   L,   L,   L,   X,   L,   X ],
];

/// Maps a token kind to its precedence category. Tokens outside the
/// expression alphabet act as end-of-input.
fn category(kind: TokenKind) -> PrecSym {
    match kind {
        TokenKind::Star | TokenKind::Slash => PrecSym::MulDiv,
        TokenKind::Plus | TokenKind::Minus => PrecSym::PlusMinus,
        TokenKind::Lt | TokenKind::Gt | TokenKind::LtEq | TokenKind::GtEq => PrecSym::Rel,
        TokenKind::Eq | TokenKind::NotEq => PrecSym::EqNeq,
        TokenKind::KwIs => PrecSym::Is,
        TokenKind::KwNum | TokenKind::KwString | TokenKind::KwNullType => PrecSym::Type,
        TokenKind::LParen => PrecSym::LParen,
        TokenKind::RParen => PrecSym::RParen,
        TokenKind::Ident
        | TokenKind::GlobalIdent
        | TokenKind::IntLiteral
        | TokenKind::FloatLiteral
        | TokenKind::StringLiteral
        | TokenKind::KwNull => PrecSym::Id,
        _ => PrecSym::Dollar,
    }
}

/// Tokens that legitimately follow a complete expression.
fn is_expr_end(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::RParen
            | TokenKind::Comma
            | TokenKind::Eol
            | TokenKind::RBrace
            | TokenKind::Eof
    )
}

/// One slot of the expression side stack.
struct Entry {
    sym: PrecSym,
    terminal: bool,
    /// Pending atom operand, pushed onto the data stack at `E -> id`.
    operand: Option<Operand>,
    /// Operator spelling for `E -> E op E`.
    op_text: Option<&'static str>,
    /// Tested type for `E -> E is TYPE`.
    type_kw: DataType,
    /// Abstract type propagated through reductions.
    dtype: DataType,
}

impl Entry {
    fn dollar() -> Self {
        Entry {
            sym: PrecSym::Dollar,
            terminal: true,
            operand: None,
            op_text: None,
            type_kw: DataType::Undef,
            dtype: DataType::Undef,
        }
    }

    fn terminal(sym: PrecSym) -> Self {
        Entry {
            sym,
            terminal: true,
            operand: None,
            op_text: None,
            type_kw: DataType::Undef,
            dtype: DataType::Undef,
        }
    }

    fn nonterminal(dtype: DataType) -> Self {
        Entry {
            sym: PrecSym::Id,
            terminal: false,
            operand: None,
            op_text: None,
            type_kw: DataType::Undef,
            dtype,
        }
    }
}

fn top_terminal_sym(stack: &[Entry]) -> Option<PrecSym> {
    stack.iter().rev().find(|entry| entry.terminal).map(|e| e.sym)
}

impl<'a> Parser<'a> {
    /// Parses one expression; its value ends up on the data stack and the
    /// propagated abstract type is returned. The terminating token
    /// (`)`, `,`, EOL, `}`, EOF) is left as the current token.
    pub(crate) fn parse_expression(&mut self) -> Result<DataType> {
        let mut stack = vec![Entry::dollar()];

        loop {
            // Call atoms bypass the table: the call routine consumes the
            // whole call and leaves its value on the data stack.
            if self.current.kind == TokenKind::Ident
                && self.peek()?.kind == TokenKind::LParen
            {
                self.require_atom_position(&stack)?;
                self.parse_function_call()?;
                stack.push(Entry::nonterminal(DataType::Undef));
                if expression_done(&stack, self.current.kind) {
                    break;
                }
                continue;
            }

            if self.current.kind == TokenKind::KwIfj {
                self.require_atom_position(&stack)?;
                let dtype = self.parse_ifj_call()?;
                stack.push(Entry::nonterminal(dtype));
                if expression_done(&stack, self.current.kind) {
                    break;
                }
                continue;
            }

            // A bare identifier that is not a visible variable reads a
            // getter: rewrite to a zero-argument accessor call.
            if self.current.kind == TokenKind::Ident && !self.is_visible_variable() {
                self.require_atom_position(&stack)?;
                let name = self.current.text().to_string();
                self.emit_getter_read(&name)?;
                self.advance()?;
                stack.push(Entry::nonterminal(DataType::Undef));
                if expression_done(&stack, self.current.kind) {
                    break;
                }
                continue;
            }

            let a = match top_terminal_sym(&stack) {
                Some(sym) => sym,
                None => return Err(CompileError::internal("expression stack lost its sentinel")),
            };
            let b = category(self.current.kind);

            match PRECEDENCE[a as usize][b as usize] {
                Prec::Less | Prec::Equal => {
                    let entry = self.shift_entry(b)?;
                    stack.push(entry);
                    self.advance()?;
                },
                Prec::Greater => {
                    self.reduce(&mut stack)?;
                },
                Prec::Error => {
                    return Err(CompileError::syntax(
                        self.span(),
                        format!(
                            "Unexpected token '{}' in expression",
                            self.current.kind.describe()
                        ),
                    ));
                },
            }

            if expression_done(&stack, self.current.kind) {
                break;
            }
        }

        match stack.last() {
            Some(entry) if !entry.terminal => Ok(entry.dtype),
            _ => Err(CompileError::syntax(
                self.span(),
                "Malformed expression".to_string(),
            )),
        }
    }

    /// An atom may only appear where the table would shift an `id`.
    fn require_atom_position(&self, stack: &[Entry]) -> Result<()> {
        let a = match top_terminal_sym(stack) {
            Some(sym) => sym,
            None => return Err(CompileError::internal("expression stack lost its sentinel")),
        };
        match PRECEDENCE[a as usize][PrecSym::Id as usize] {
            Prec::Less | Prec::Equal => Ok(()),
            _ => Err(CompileError::syntax(
                self.span(),
                format!(
                    "Unexpected token '{}' in expression",
                    self.current.kind.describe()
                ),
            )),
        }
    }

    fn is_visible_variable(&self) -> bool {
        matches!(
            self.scopes.find(self.current.text()),
            Some(Symbol::Variable { .. })
        )
    }

    /// Builds the stack entry for a shifted terminal, recording the
    /// payloads reductions will need.
    fn shift_entry(&mut self, sym: PrecSym) -> Result<Entry> {
        let mut entry = Entry::terminal(sym);
        match sym {
            PrecSym::Id => {
                let (operand, dtype) = self.atom_operand()?;
                entry.operand = Some(operand);
                entry.dtype = dtype;
            },
            PrecSym::MulDiv | PrecSym::PlusMinus | PrecSym::Rel | PrecSym::EqNeq => {
                entry.op_text = Some(match self.current.kind {
                    TokenKind::Star => "*",
                    TokenKind::Slash => "/",
                    TokenKind::Plus => "+",
                    TokenKind::Minus => "-",
                    TokenKind::Lt => "<",
                    TokenKind::Gt => ">",
                    TokenKind::LtEq => "<=",
                    TokenKind::GtEq => ">=",
                    TokenKind::Eq => "==",
                    _ => "!=",
                });
            },
            PrecSym::Type => {
                entry.type_kw = match self.current.kind {
                    TokenKind::KwNum => DataType::Num,
                    TokenKind::KwString => DataType::String,
                    _ => DataType::Null,
                };
            },
            _ => {},
        }
        Ok(entry)
    }

    /// Builds the constant or variable operand for an atom token.
    fn atom_operand(&mut self) -> Result<(Operand, DataType)> {
        let span = self.span();
        match self.current.kind {
            TokenKind::IntLiteral => match literal::parse_int_literal(self.current.text()) {
                Some(value) => Ok((Operand::ConstInt(value), DataType::Num)),
                None => Err(CompileError::lexical(
                    span,
                    format!("Num literal '{}' out of range", self.current.text()),
                )),
            },
            TokenKind::FloatLiteral => match literal::parse_float_literal(self.current.text()) {
                Some(value) => Ok((Operand::ConstFloat(value), DataType::Num)),
                None => Err(CompileError::lexical(
                    span,
                    format!("Num literal '{}' out of range", self.current.text()),
                )),
            },
            TokenKind::StringLiteral => Ok((
                Operand::string(literal::decode_string_literal(self.current.text())),
                DataType::String,
            )),
            TokenKind::KwNull => Ok((Operand::Nil, DataType::Null)),
            TokenKind::Ident => {
                // visibility was established before shifting
                match self.scopes.find(self.current.text()) {
                    Some(Symbol::Variable {
                        unique_name,
                        data_type,
                    }) => Ok((Operand::local(unique_name.clone()), *data_type)),
                    _ => Err(CompileError::internal("atom variable vanished")),
                }
            },
            TokenKind::GlobalIdent => {
                let name = self.current.text();
                match self.scopes.globals().find(name) {
                    Some(Symbol::Variable { data_type, .. }) => {
                        Ok((Operand::global(name), *data_type))
                    },
                    _ => Err(CompileError::other_semantic(
                        span,
                        format!("Use of undefined global variable '{name}'"),
                    )),
                }
            },
            _ => Err(CompileError::internal("token is not an expression atom")),
        }
    }

    /// Applies the first matching reduction rule to the top of the stack.
    fn reduce(&mut self, stack: &mut Vec<Entry>) -> Result<()> {
        // E -> id
        if stack
            .last()
            .is_some_and(|top| top.terminal && top.sym == PrecSym::Id)
        {
            let entry = match stack.pop() {
                Some(entry) => entry,
                None => return Err(CompileError::internal("expression stack underflow")),
            };
            let operand = match entry.operand {
                Some(operand) => operand,
                None => return Err(CompileError::internal("atom entry without operand")),
            };
            self.emitter.op1(Opcode::PushS, operand);
            stack.push(Entry::nonterminal(entry.dtype));
            return Ok(());
        }

        let n = stack.len();
        if n >= 3 {
            let deep = &stack[n - 3];
            let mid = &stack[n - 2];
            let top = &stack[n - 1];

            // E -> ( E )
            if top.terminal
                && top.sym == PrecSym::RParen
                && !mid.terminal
                && deep.terminal
                && deep.sym == PrecSym::LParen
            {
                let dtype = mid.dtype;
                stack.truncate(n - 3);
                stack.push(Entry::nonterminal(dtype));
                return Ok(());
            }

            // E -> E op E
            if !top.terminal
                && mid.terminal
                && matches!(
                    mid.sym,
                    PrecSym::MulDiv | PrecSym::PlusMinus | PrecSym::Rel | PrecSym::EqNeq
                )
                && !deep.terminal
            {
                let op = match mid.op_text {
                    Some(op) => op,
                    None => return Err(CompileError::internal("operator entry without text")),
                };
                let is_arithmetic =
                    matches!(mid.sym, PrecSym::MulDiv | PrecSym::PlusMinus);
                let left = deep.dtype;
                let right = top.dtype;
                let span = self.span();
                stack.truncate(n - 3);

                let dtype = if is_arithmetic {
                    checks::check_operation(op, left, right, span)?
                } else {
                    DataType::Undef
                };

                match op {
                    "+" => patterns::add(&mut self.emitter),
                    "-" | "/" => patterns::numeric(&mut self.emitter, op),
                    "*" => patterns::multiply(&mut self.emitter),
                    _ => patterns::relational(&mut self.emitter, op),
                }

                stack.push(Entry::nonterminal(dtype));
                return Ok(());
            }

            // E -> E is TYPE
            if top.terminal
                && top.sym == PrecSym::Type
                && mid.terminal
                && mid.sym == PrecSym::Is
                && !deep.terminal
            {
                let tested = top.type_kw;
                stack.truncate(n - 3);
                patterns::type_test(&mut self.emitter, tested);
                stack.push(Entry::nonterminal(DataType::Undef));
                return Ok(());
            }
        }

        Err(CompileError::syntax(
            self.span(),
            "Malformed expression".to_string(),
        ))
    }

    /// Compiles a getter read: forward-declares `getter:name@0` when
    /// unseen and emits the zero-argument accessor call, leaving the
    /// value on the data stack.
    fn emit_getter_read(&mut self, name: &str) -> Result<()> {
        let key = getter_key(name);
        let known = self.scopes.globals().find(&key).map(Symbol::is_function);
        match known {
            Some(true) => {},
            Some(false) => {
                return Err(CompileError::undefined_function(format!(
                    "'{name}' is not a getter"
                )));
            },
            None => {
                self.scopes
                    .globals_mut()
                    .insert(&key, Symbol::forward_function(0));
            },
        }

        self.emitter.op(Opcode::CreateFrame);
        self.emitter.op(Opcode::PushFrame);
        self.emitter
            .op1(Opcode::Call, Operand::label(getter_label(name)));
        self.emitter.op(Opcode::PopFrame);
        self.emitter
            .op1(Opcode::PushS, Operand::tf("%retval"));
        Ok(())
    }
}

/// The expression is complete when the stack has been reduced to the
/// sentinel plus one non-terminal and the lookahead terminates it.
fn expression_done(stack: &[Entry], lookahead: TokenKind) -> bool {
    stack.len() == 2
        && stack[0].sym == PrecSym::Dollar
        && !stack[1].terminal
        && is_expr_end(lookahead)
}
