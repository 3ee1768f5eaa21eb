//! The IFJ25 scanner.
//!
//! A deterministic automaton consuming one character at a time. Successive
//! [`Scanner::next_token`] calls yield one token each; once the stream is
//! exhausted the scanner returns `EOF` tokens indefinitely. State that must
//! survive between calls (line/column, comment nesting) lives in the cursor
//! and on the call stack of the current token only.
//!
//! Any unexpected byte in a context that forbids it is a lexical error
//! carrying the line and column of the offending character.

use ifjc_util::{CompileError, Result, Span};

use crate::cursor::Cursor;
use crate::token::{Token, TokenKind};

/// Scanner for the IFJ25 language.
pub struct Scanner<'a> {
    cursor: Cursor<'a>,
}

impl<'a> Scanner<'a> {
    /// Creates a new scanner over the given source text.
    pub fn new(source: &'a str) -> Self {
        Self {
            cursor: Cursor::new(source),
        }
    }

    /// Returns the next token from the source.
    ///
    /// Whitespace other than end-of-line is absorbed silently, as are both
    /// comment forms. End-of-line is returned as a token of its own.
    pub fn next_token(&mut self) -> Result<Token> {
        loop {
            self.skip_blanks();

            let span = Span::new(self.cursor.line(), self.cursor.column());

            if self.cursor.is_at_end() {
                return Ok(Token::new(TokenKind::Eof, span));
            }

            match self.cursor.current_char() {
                '\n' => {
                    self.cursor.advance();
                    return Ok(Token::new(TokenKind::Eol, span));
                },
                '(' => return Ok(self.single(TokenKind::LParen, span)),
                ')' => return Ok(self.single(TokenKind::RParen, span)),
                '{' => return Ok(self.single(TokenKind::LBrace, span)),
                '}' => return Ok(self.single(TokenKind::RBrace, span)),
                ',' => return Ok(self.single(TokenKind::Comma, span)),
                ':' => return Ok(self.single(TokenKind::Colon, span)),
                ';' => return Ok(self.single(TokenKind::Semicolon, span)),
                '?' => return Ok(self.single(TokenKind::Question, span)),
                '+' => return Ok(self.single(TokenKind::Plus, span)),
                '-' => return Ok(self.single(TokenKind::Minus, span)),
                '*' => return Ok(self.single(TokenKind::Star, span)),
                '/' => {
                    if self.cursor.peek_char(1) == '/' {
                        self.skip_line_comment();
                        continue;
                    }
                    if self.cursor.peek_char(1) == '*' {
                        self.skip_block_comment()?;
                        continue;
                    }
                    return Ok(self.single(TokenKind::Slash, span));
                },
                '.' => return Ok(self.lex_dots(span)),
                '>' => {
                    self.cursor.advance();
                    let kind = if self.cursor.match_char('=') {
                        TokenKind::GtEq
                    } else {
                        TokenKind::Gt
                    };
                    return Ok(Token::new(kind, span));
                },
                '<' => {
                    self.cursor.advance();
                    let kind = if self.cursor.match_char('=') {
                        TokenKind::LtEq
                    } else {
                        TokenKind::Lt
                    };
                    return Ok(Token::new(kind, span));
                },
                '=' => {
                    self.cursor.advance();
                    let kind = if self.cursor.match_char('=') {
                        TokenKind::Eq
                    } else {
                        TokenKind::Assign
                    };
                    return Ok(Token::new(kind, span));
                },
                '!' => {
                    self.cursor.advance();
                    let kind = if self.cursor.match_char('=') {
                        TokenKind::NotEq
                    } else {
                        TokenKind::Not
                    };
                    return Ok(Token::new(kind, span));
                },
                '"' => return self.lex_string(span),
                '_' => return self.lex_global_ident(span),
                c if c.is_ascii_alphabetic() => return Ok(self.lex_ident(span)),
                c if c.is_ascii_digit() => return self.lex_number(span),
                c => {
                    return Err(self.error_here(format!("Unexpected {}", self.describe(c))));
                },
            }
        }
    }

    fn single(&mut self, kind: TokenKind, span: Span) -> Token {
        self.cursor.advance();
        Token::new(kind, span)
    }

    /// Skips whitespace except end-of-line, which is a token.
    fn skip_blanks(&mut self) {
        while !self.cursor.is_at_end() {
            let c = self.cursor.current_char();
            if c.is_ascii_whitespace() && c != '\n' {
                self.cursor.advance();
            } else {
                break;
            }
        }
    }

    /// Consumes `// …` up to, but not including, the end of line.
    fn skip_line_comment(&mut self) {
        while !self.cursor.is_at_end() && self.cursor.current_char() != '\n' {
            self.cursor.advance();
        }
    }

    /// Consumes a `/* … */` comment, honoring nesting.
    fn skip_block_comment(&mut self) -> Result<()> {
        // consume the opening "/*"
        self.cursor.advance();
        self.cursor.advance();
        let mut depth: u32 = 1;

        while depth > 0 {
            if self.cursor.is_at_end() {
                return Err(self.error_here("Unterminated block comment, found EOF".to_string()));
            }
            let c = self.cursor.current_char();
            if c == '/' && self.cursor.peek_char(1) == '*' {
                depth += 1;
                self.cursor.advance();
                self.cursor.advance();
            } else if c == '*' && self.cursor.peek_char(1) == '/' {
                depth -= 1;
                self.cursor.advance();
                self.cursor.advance();
            } else {
                self.cursor.advance();
            }
        }
        Ok(())
    }

    /// `.`, `..` or `...`.
    fn lex_dots(&mut self, span: Span) -> Token {
        self.cursor.advance();
        if !self.cursor.match_char('.') {
            return Token::new(TokenKind::Dot, span);
        }
        if self.cursor.match_char('.') {
            Token::new(TokenKind::Ellipsis, span)
        } else {
            Token::new(TokenKind::DotDot, span)
        }
    }

    /// Identifier or keyword.
    fn lex_ident(&mut self, span: Span) -> Token {
        let start = self.cursor.position();
        while is_ident_continue(self.cursor.current_char()) {
            self.cursor.advance();
        }
        let lexeme = self.cursor.slice_from(start);
        match TokenKind::keyword(lexeme) {
            Some(kind) => Token::new(kind, span),
            None => Token::with_lexeme(TokenKind::Ident, lexeme, span),
        }
    }

    /// Global identifier: exactly two underscores then identifier chars.
    /// A single `_` is not a valid token in IFJ25.
    fn lex_global_ident(&mut self, span: Span) -> Result<Token> {
        let start = self.cursor.position();
        self.cursor.advance();
        if self.cursor.current_char() != '_' {
            return Err(self.error_here(format!(
                "Expected '_' after '_' for declaring global variable, found {}",
                self.describe_current()
            )));
        }
        self.cursor.advance();
        if !is_ident_continue(self.cursor.current_char()) {
            return Err(self.error_here(format!(
                "Expected a-z, A-Z, 0-9 or '_' after '__', found {}",
                self.describe_current()
            )));
        }
        while is_ident_continue(self.cursor.current_char()) {
            self.cursor.advance();
        }
        Ok(Token::with_lexeme(
            TokenKind::GlobalIdent,
            self.cursor.slice_from(start),
            span,
        ))
    }

    /// Integer or float literal.
    ///
    /// A `.` directly followed by another `.` terminates the integer so
    /// that range punctuation lexes as expected: `1..5` is INT `..` INT.
    fn lex_number(&mut self, span: Span) -> Result<Token> {
        let start = self.cursor.position();
        let mut is_float = false;

        if self.cursor.current_char() == '0' {
            self.cursor.advance();
            if self.cursor.current_char() == 'x' {
                self.cursor.advance();
                if !self.cursor.current_char().is_ascii_hexdigit() {
                    return Err(self.error_here(format!(
                        "Expected a-f, A-F or a digit after 'x' in Num, found {}",
                        self.describe_current()
                    )));
                }
                while self.cursor.current_char().is_ascii_hexdigit() {
                    self.cursor.advance();
                }
                return Ok(Token::with_lexeme(
                    TokenKind::IntLiteral,
                    self.cursor.slice_from(start),
                    span,
                ));
            }
            // a lone leading zero does not continue into more digits
        } else {
            while self.cursor.current_char().is_ascii_digit() {
                self.cursor.advance();
            }
        }

        if self.cursor.current_char() == '.' {
            if self.cursor.peek_char(1).is_ascii_digit() {
                self.cursor.advance();
                while self.cursor.current_char().is_ascii_digit() {
                    self.cursor.advance();
                }
                is_float = true;
            } else if self.cursor.peek_char(1) == '.' {
                // range operator follows; the integer ends here
                return Ok(Token::with_lexeme(
                    TokenKind::IntLiteral,
                    self.cursor.slice_from(start),
                    span,
                ));
            } else {
                self.cursor.advance();
                return Err(self.error_here(format!(
                    "Expected a digit after '.' in Num, found {}",
                    self.describe_current()
                )));
            }
        }

        if matches!(self.cursor.current_char(), 'e' | 'E') {
            self.cursor.advance();
            if matches!(self.cursor.current_char(), '+' | '-') {
                self.cursor.advance();
                if !self.cursor.current_char().is_ascii_digit() {
                    return Err(self.error_here(format!(
                        "Expected a digit after +- sign in Num, found {}",
                        self.describe_current()
                    )));
                }
            } else if !self.cursor.current_char().is_ascii_digit() {
                return Err(self.error_here(format!(
                    "Expected a digit or +- sign after 'e','E' in Num, found {}",
                    self.describe_current()
                )));
            }
            while self.cursor.current_char().is_ascii_digit() {
                self.cursor.advance();
            }
            is_float = true;
        }

        let kind = if is_float {
            TokenKind::FloatLiteral
        } else {
            TokenKind::IntLiteral
        };
        Ok(Token::with_lexeme(kind, self.cursor.slice_from(start), span))
    }

    /// String literal, single-line or triple-quoted multi-line.
    ///
    /// The returned lexeme keeps its surrounding quotes and raw escape
    /// sequences; decoding happens when the operand is built.
    fn lex_string(&mut self, span: Span) -> Result<Token> {
        let start = self.cursor.position();
        self.cursor.advance();

        if self.cursor.current_char() == '"' {
            self.cursor.advance();
            if self.cursor.current_char() == '"' {
                self.cursor.advance();
                return self.lex_multiline_string(start, span);
            }
            // empty string ""
            return Ok(Token::with_lexeme(
                TokenKind::StringLiteral,
                self.cursor.slice_from(start),
                span,
            ));
        }

        loop {
            let c = self.cursor.current_char();
            if self.cursor.is_at_end() {
                return Err(self.error_here(
                    "Expected printable ASCII char (>=0x20) in string, found EOF".to_string(),
                ));
            }
            match c {
                '"' => {
                    self.cursor.advance();
                    return Ok(Token::with_lexeme(
                        TokenKind::StringLiteral,
                        self.cursor.slice_from(start),
                        span,
                    ));
                },
                '\\' => {
                    self.cursor.advance();
                    match self.cursor.current_char() {
                        '"' | '\\' | 'n' | 'r' | 't' => self.cursor.advance(),
                        'x' => {
                            self.cursor.advance();
                            for _ in 0..2 {
                                if !self.cursor.current_char().is_ascii_hexdigit() {
                                    return Err(self.error_here(format!(
                                        "Expected a-f, A-F or a digit after '\\x' in string, found {}",
                                        self.describe_current()
                                    )));
                                }
                                self.cursor.advance();
                            }
                        },
                        _ => {
                            return Err(self.error_here(format!(
                                "Expected '\"','n','r','t','\\' or 'x' after '\\' in string, found {}",
                                self.describe_current()
                            )));
                        },
                    }
                },
                c if (c as u32) >= 0x20 => self.cursor.advance(),
                _ => {
                    return Err(self.error_here(format!(
                        "Expected printable ASCII char (>=0x20) in string, found {}",
                        self.describe_current()
                    )));
                },
            }
        }
    }

    /// The body of a `"""…"""` literal preserves everything, newlines
    /// included, until the first run of three closing quotes.
    fn lex_multiline_string(&mut self, start: usize, span: Span) -> Result<Token> {
        let mut quote_run = 0;
        loop {
            if self.cursor.is_at_end() {
                return Err(self.error_here("Unterminated multiline string, found EOF".to_string()));
            }
            if self.cursor.current_char() == '"' {
                quote_run += 1;
                self.cursor.advance();
                if quote_run == 3 {
                    return Ok(Token::with_lexeme(
                        TokenKind::StringLiteral,
                        self.cursor.slice_from(start),
                        span,
                    ));
                }
            } else {
                quote_run = 0;
                self.cursor.advance();
            }
        }
    }

    fn error_here(&self, message: String) -> CompileError {
        CompileError::lexical(Span::new(self.cursor.line(), self.cursor.column()), message)
    }

    fn describe_current(&self) -> String {
        if self.cursor.is_at_end() {
            "EOF".to_string()
        } else {
            self.describe(self.cursor.current_char())
        }
    }

    fn describe(&self, c: char) -> String {
        match c {
            '\n' => "EOL".to_string(),
            '\r' => "'\\r'".to_string(),
            c if (c as u32) >= 0x20 => format!("'{}'", c),
            c => format!("0x{:x}", c as u32),
        }
    }
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let mut scanner = Scanner::new(source);
        let mut out = Vec::new();
        loop {
            let token = scanner.next_token().expect("lexical error");
            let kind = token.kind;
            out.push(kind);
            if kind == TokenKind::Eof {
                return out;
            }
        }
    }

    fn lexemes(source: &str) -> Vec<String> {
        let mut scanner = Scanner::new(source);
        let mut out = Vec::new();
        loop {
            let token = scanner.next_token().expect("lexical error");
            if token.kind == TokenKind::Eof {
                return out;
            }
            if let Some(lexeme) = token.lexeme {
                out.push(lexeme);
            }
        }
    }

    fn first_error(source: &str) -> CompileError {
        let mut scanner = Scanner::new(source);
        loop {
            match scanner.next_token() {
                Ok(t) if t.kind == TokenKind::Eof => panic!("expected a lexical error"),
                Ok(_) => {},
                Err(e) => return e,
            }
        }
    }

    #[test]
    fn test_punctuation_and_operators() {
        assert_eq!(
            kinds("( ) { } , : ; ? + - * / = == != < <= > >="),
            vec![
                TokenKind::LParen,
                TokenKind::RParen,
                TokenKind::LBrace,
                TokenKind::RBrace,
                TokenKind::Comma,
                TokenKind::Colon,
                TokenKind::Semicolon,
                TokenKind::Question,
                TokenKind::Plus,
                TokenKind::Minus,
                TokenKind::Star,
                TokenKind::Slash,
                TokenKind::Assign,
                TokenKind::Eq,
                TokenKind::NotEq,
                TokenKind::Lt,
                TokenKind::LtEq,
                TokenKind::Gt,
                TokenKind::GtEq,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_keywords_and_identifiers() {
        assert_eq!(
            kinds("class Program static main var x"),
            vec![
                TokenKind::KwClass,
                TokenKind::Ident,
                TokenKind::KwStatic,
                TokenKind::Ident,
                TokenKind::KwVar,
                TokenKind::Ident,
                TokenKind::Eof,
            ]
        );
        assert_eq!(lexemes("foo Program bar_2"), vec!["foo", "Program", "bar_2"]);
    }

    #[test]
    fn test_global_identifier() {
        let mut scanner = Scanner::new("__counter");
        let token = scanner.next_token().unwrap();
        assert_eq!(token.kind, TokenKind::GlobalIdent);
        assert_eq!(token.text(), "__counter");
    }

    #[test]
    fn test_single_underscore_is_error() {
        let err = first_error("_x");
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_bare_double_underscore_is_error() {
        assert_eq!(first_error("__ ").exit_code(), 1);
    }

    #[test]
    fn test_integers() {
        assert_eq!(lexemes("0 42 0x1F"), vec!["0", "42", "0x1F"]);
        assert_eq!(
            kinds("0x1F"),
            vec![TokenKind::IntLiteral, TokenKind::Eof]
        );
    }

    #[test]
    fn test_floats() {
        assert_eq!(
            kinds("1.5 0.25 2e10 3.14E-2 1e+3"),
            vec![
                TokenKind::FloatLiteral,
                TokenKind::FloatLiteral,
                TokenKind::FloatLiteral,
                TokenKind::FloatLiteral,
                TokenKind::FloatLiteral,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_range_backoff() {
        // `1..5` must not lex `1.` as a malformed float
        assert_eq!(
            kinds("1..5"),
            vec![
                TokenKind::IntLiteral,
                TokenKind::DotDot,
                TokenKind::IntLiteral,
                TokenKind::Eof,
            ]
        );
        assert_eq!(
            kinds("1...5"),
            vec![
                TokenKind::IntLiteral,
                TokenKind::Ellipsis,
                TokenKind::IntLiteral,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_trailing_dot_is_error() {
        assert_eq!(first_error("1.x").exit_code(), 1);
        assert_eq!(first_error("1.\n").exit_code(), 1);
    }

    #[test]
    fn test_bad_exponent_is_error() {
        assert_eq!(first_error("1e").exit_code(), 1);
        assert_eq!(first_error("1e+").exit_code(), 1);
    }

    #[test]
    fn test_strings() {
        assert_eq!(lexemes(r#""hi""#), vec![r#""hi""#]);
        assert_eq!(lexemes(r#""""#), vec![r#""""#]);
        assert_eq!(
            lexemes(r#""a\"b\\c\n\t\r\x41""#),
            vec![r#""a\"b\\c\n\t\r\x41""#]
        );
    }

    #[test]
    fn test_string_bad_escape() {
        assert_eq!(first_error(r#""\q""#).exit_code(), 1);
        assert_eq!(first_error(r#""\x4g""#).exit_code(), 1);
    }

    #[test]
    fn test_string_with_raw_newline_is_error() {
        assert_eq!(first_error("\"a\nb\"").exit_code(), 1);
    }

    #[test]
    fn test_unterminated_string() {
        assert_eq!(first_error("\"abc").exit_code(), 1);
    }

    #[test]
    fn test_multiline_string() {
        let source = "\"\"\"line1\nline2\"\"\"";
        let mut scanner = Scanner::new(source);
        let token = scanner.next_token().unwrap();
        assert_eq!(token.kind, TokenKind::StringLiteral);
        assert_eq!(token.text(), source);
    }

    #[test]
    fn test_unterminated_multiline_string() {
        assert_eq!(first_error("\"\"\"abc\ndef").exit_code(), 1);
    }

    #[test]
    fn test_line_comment() {
        assert_eq!(
            kinds("a // comment until eol\nb"),
            vec![
                TokenKind::Ident,
                TokenKind::Eol,
                TokenKind::Ident,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_nested_block_comment() {
        assert_eq!(
            kinds("a /* x /* y */ z */ b"),
            vec![TokenKind::Ident, TokenKind::Ident, TokenKind::Eof]
        );
    }

    #[test]
    fn test_unterminated_block_comment() {
        assert_eq!(first_error("/* a /* b */ ").exit_code(), 1);
    }

    #[test]
    fn test_eol_is_significant() {
        assert_eq!(
            kinds("a\n\nb"),
            vec![
                TokenKind::Ident,
                TokenKind::Eol,
                TokenKind::Eol,
                TokenKind::Ident,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_eof_repeats() {
        let mut scanner = Scanner::new("");
        assert_eq!(scanner.next_token().unwrap().kind, TokenKind::Eof);
        assert_eq!(scanner.next_token().unwrap().kind, TokenKind::Eof);
    }

    #[test]
    fn test_spans() {
        let mut scanner = Scanner::new("a\n  b");
        let a = scanner.next_token().unwrap();
        assert_eq!((a.span.line, a.span.column), (1, 1));
        let eol = scanner.next_token().unwrap();
        assert_eq!(eol.kind, TokenKind::Eol);
        let b = scanner.next_token().unwrap();
        assert_eq!((b.span.line, b.span.column), (2, 3));
    }

    #[test]
    fn test_unexpected_character() {
        assert_eq!(first_error("a @ b").exit_code(), 1);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn identifiers_lex_verbatim(s in "[a-z][a-z0-9_]{0,12}") {
                prop_assume!(TokenKind::keyword(&s).is_none());
                let mut scanner = Scanner::new(&s);
                let token = scanner.next_token().unwrap();
                prop_assert_eq!(token.kind, TokenKind::Ident);
                prop_assert_eq!(token.text(), s.as_str());
            }

            #[test]
            fn decimal_integers_lex_verbatim(n in 1u64..1_000_000_000_000u64) {
                let s = n.to_string();
                let mut scanner = Scanner::new(&s);
                let token = scanner.next_token().unwrap();
                prop_assert_eq!(token.kind, TokenKind::IntLiteral);
                prop_assert_eq!(token.text(), s.as_str());
            }
        }
    }
}
