//! ifjc-par - Syntactic and semantic analysis for IFJ25.
//!
//! A single-pass parser: recursive descent over statements and
//! declarations, coupled with an operator-precedence analyzer for
//! expressions. The parser pulls tokens from the scanner on demand (one
//! current token plus one peek slot), resolves names against the scope
//! stack, and emits IR incrementally through the emitter it owns. There
//! is no AST; by the time a construct has been recognized its code is
//! already in the instruction list.

mod expr;
mod items;
mod literal;
mod stmt;

use ifjc_lex::{Scanner, Token, TokenKind};
use ifjc_sem::{install_builtins, ScopeStack};
use ifjc_ir::{patterns, Emitter};
use ifjc_util::{CompileError, Result, Span};

/// The parser. Create one per compilation via [`Parser::new`] and run it
/// with [`Parser::parse_program`].
pub struct Parser<'a> {
    scanner: Scanner<'a>,
    current: Token,
    peeked: Option<Token>,
    scopes: ScopeStack,
    emitter: Emitter,
}

impl<'a> Parser<'a> {
    /// Creates a parser over the given source, priming the current token
    /// and installing the built-in functions into the global scope.
    pub fn new(source: &'a str) -> Result<Self> {
        let mut scanner = Scanner::new(source);
        let current = scanner.next_token()?;
        let mut scopes = ScopeStack::new();
        install_builtins(scopes.globals_mut());

        Ok(Self {
            scanner,
            current,
            peeked: None,
            scopes,
            emitter: Emitter::new(),
        })
    }

    /// Parses the whole program and returns the emitter holding the
    /// finished IR list, ready for printing.
    ///
    /// Grammar: `program := prolog classdef EOF`.
    pub fn parse_program(mut self) -> Result<Emitter> {
        self.parse_prolog()?;
        self.parse_class_def()?;
        self.skip_optional_eol()?;
        self.expect_and_consume(TokenKind::Eof)?;

        self.check_undefined_functions()?;

        Ok(self.emitter)
    }

    /// `prolog := 'import' '"ifj25"' 'for' 'Ifj' EOL`.
    fn parse_prolog(&mut self) -> Result<()> {
        self.skip_optional_eol()?;
        self.expect_and_consume(TokenKind::KwImport)?;
        self.skip_optional_eol()?;
        self.expect_lexeme(TokenKind::StringLiteral, "\"ifj25\"")?;
        self.expect_and_consume(TokenKind::KwFor)?;
        self.skip_optional_eol()?;
        self.expect_and_consume(TokenKind::KwIfj)?;
        self.consume_eol()
    }

    /// `classdef := 'class' 'Program' '{' func_list '}'`.
    fn parse_class_def(&mut self) -> Result<()> {
        self.expect_and_consume(TokenKind::KwClass)?;
        self.expect_lexeme(TokenKind::Ident, "Program")?;
        self.expect_and_consume(TokenKind::LBrace)?;
        self.skip_optional_eol()?;

        patterns::program_entrypoint(&mut self.emitter);

        self.parse_func_list()?;

        if self
            .scopes
            .globals()
            .find(&ifjc_sem::function_key("main", 0))
            .is_none()
        {
            return Err(CompileError::undefined_function(
                "undefined function 'main' with 0 parameters",
            ));
        }

        self.expect_and_consume(TokenKind::RBrace)
    }

    // ----- token plumbing -----

    /// Consumes the current token and pulls the next one, honoring the
    /// peek buffer.
    fn advance(&mut self) -> Result<()> {
        self.current = match self.peeked.take() {
            Some(token) => token,
            None => self.scanner.next_token()?,
        };
        Ok(())
    }

    /// Looks at the next token without consuming the current one.
    fn peek(&mut self) -> Result<&Token> {
        if self.peeked.is_none() {
            self.peeked = Some(self.scanner.next_token()?);
        }
        match &self.peeked {
            Some(token) => Ok(token),
            None => Err(CompileError::internal("peek buffer empty after fill")),
        }
    }

    /// The current token's position.
    fn span(&self) -> Span {
        self.current.span
    }

    /// Builds an expected-vs-found syntax error at the current token.
    fn syntax_error(&self, expected: &str) -> CompileError {
        CompileError::syntax(
            self.span(),
            format!(
                "Unexpected token '{}'. Expected: '{}'",
                self.current.kind.describe(),
                expected
            ),
        )
    }

    /// Requires the current token to be of `kind` and consumes it.
    fn expect_and_consume(&mut self, kind: TokenKind) -> Result<()> {
        if self.current.kind != kind {
            return Err(self.syntax_error(kind.describe()));
        }
        self.advance()
    }

    /// Requires the current token to be of `kind` with the exact source
    /// text `lexeme`, and consumes it.
    fn expect_lexeme(&mut self, kind: TokenKind, lexeme: &str) -> Result<()> {
        if self.current.kind != kind {
            return Err(self.syntax_error(kind.describe()));
        }
        if self.current.text() != lexeme {
            return Err(CompileError::syntax(
                self.span(),
                format!(
                    "Unexpected token value: {}. Expected: {}",
                    self.current.text(),
                    lexeme
                ),
            ));
        }
        self.advance()
    }

    /// Skips any number of end-of-line tokens.
    fn skip_optional_eol(&mut self) -> Result<()> {
        while self.current.kind == TokenKind::Eol {
            self.advance()?;
        }
        Ok(())
    }

    /// Requires at least one end-of-line token and skips the whole run.
    fn consume_eol(&mut self) -> Result<()> {
        if self.current.kind != TokenKind::Eol {
            return Err(self.syntax_error("EOL"));
        }
        self.skip_optional_eol()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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

    fn compile_err(source: &str) -> CompileError {
        match compile(source) {
            Ok(_) => panic!("expected a compile error"),
            Err(e) => e,
        }
    }

    const PROLOG: &str = "import \"ifj25\" for Ifj\n";

    #[test]
    fn test_minimal_program() {
        let ir = compile_ok(&format!(
            "{PROLOG}class Program {{\nstatic main() {{\n}}\n}}"
        ));
        assert!(ir.starts_with(".IFJcode25\n"));
        assert!(ir.contains("LABEL main$0%func"));
        assert!(ir.contains("CALL main$0%func"));
        assert!(ir.contains("EXIT int@0"));
    }

    #[test]
    fn test_write_string() {
        let ir = compile_ok(&format!(
            "{PROLOG}class Program {{\nstatic main() {{\nIfj.write(\"hi\")\n}}\n}}"
        ));
        assert!(ir.contains("WRITE"));
        assert!(ir.contains("string@hi"));
    }

    #[test]
    fn test_missing_prolog_is_syntax_error() {
        let err = compile_err("class Program {\nstatic main() {\n}\n}");
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_wrong_prolog_string() {
        let err = compile_err("import \"ifj24\" for Ifj\nclass Program {\nstatic main() {\n}\n}");
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_missing_main() {
        let err = compile_err(&format!(
            "{PROLOG}class Program {{\nstatic foo() {{\n}}\n}}"
        ));
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_class_must_be_named_program() {
        let err = compile_err(&format!(
            "{PROLOG}class Other {{\nstatic main() {{\n}}\n}}"
        ));
        assert_eq!(err.exit_code(), 2);
    }
}
