//! Token definitions for the IFJ25 language.

use ifjc_util::Span;

/// The closed set of terminal categories produced by the scanner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    /// Plain identifier.
    Ident,
    /// Global identifier: `__` followed by at least one identifier char.
    GlobalIdent,

    /// Integer literal, decimal or `0x` hexadecimal.
    IntLiteral,
    /// Float literal with a decimal point and/or an exponent.
    FloatLiteral,
    /// String literal; the lexeme keeps its surrounding quotes.
    StringLiteral,

    // Keywords, recognized after a successful identifier scan
    KwClass,
    KwIf,
    KwElse,
    KwIs,
    KwNull,
    KwReturn,
    KwVar,
    KwWhile,
    KwIfj,
    KwStatic,
    KwImport,
    KwFor,
    KwNum,
    KwString,
    KwNullType,
    KwIn,
    KwBreak,
    KwContinue,

    // Punctuation
    LParen,
    RParen,
    LBrace,
    RBrace,
    Comma,
    Colon,
    Semicolon,
    Question,
    Dot,
    DotDot,
    Ellipsis,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Assign,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Not,

    /// End of line; a significant statement terminator in IFJ25.
    Eol,
    /// End of input; returned indefinitely once the stream is exhausted.
    Eof,
}

impl TokenKind {
    /// Human-readable name used in expected-vs-found diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::Ident => "identifier",
            TokenKind::GlobalIdent => "global identifier",
            TokenKind::IntLiteral => "integer literal",
            TokenKind::FloatLiteral => "float literal",
            TokenKind::StringLiteral => "string literal",
            TokenKind::KwClass => "class",
            TokenKind::KwIf => "if",
            TokenKind::KwElse => "else",
            TokenKind::KwIs => "is",
            TokenKind::KwNull => "null",
            TokenKind::KwReturn => "return",
            TokenKind::KwVar => "var",
            TokenKind::KwWhile => "while",
            TokenKind::KwIfj => "Ifj",
            TokenKind::KwStatic => "static",
            TokenKind::KwImport => "import",
            TokenKind::KwFor => "for",
            TokenKind::KwNum => "Num",
            TokenKind::KwString => "String",
            TokenKind::KwNullType => "Null",
            TokenKind::KwIn => "in",
            TokenKind::KwBreak => "break",
            TokenKind::KwContinue => "continue",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::Comma => ",",
            TokenKind::Colon => ":",
            TokenKind::Semicolon => ";",
            TokenKind::Question => "?",
            TokenKind::Dot => ".",
            TokenKind::DotDot => "..",
            TokenKind::Ellipsis => "...",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Assign => "=",
            TokenKind::Eq => "==",
            TokenKind::NotEq => "!=",
            TokenKind::Lt => "<",
            TokenKind::LtEq => "<=",
            TokenKind::Gt => ">",
            TokenKind::GtEq => ">=",
            TokenKind::Not => "!",
            TokenKind::Eol => "EOL",
            TokenKind::Eof => "EOF",
        }
    }

    /// Maps an identifier lexeme to its keyword kind, if it is one.
    pub fn keyword(lexeme: &str) -> Option<TokenKind> {
        let kind = match lexeme {
            "class" => TokenKind::KwClass,
            "if" => TokenKind::KwIf,
            "else" => TokenKind::KwElse,
            "is" => TokenKind::KwIs,
            "null" => TokenKind::KwNull,
            "return" => TokenKind::KwReturn,
            "var" => TokenKind::KwVar,
            "while" => TokenKind::KwWhile,
            "Ifj" => TokenKind::KwIfj,
            "static" => TokenKind::KwStatic,
            "import" => TokenKind::KwImport,
            "for" => TokenKind::KwFor,
            "Num" => TokenKind::KwNum,
            "String" => TokenKind::KwString,
            "Null" => TokenKind::KwNullType,
            "in" => TokenKind::KwIn,
            "break" => TokenKind::KwBreak,
            "continue" => TokenKind::KwContinue,
            _ => return None,
        };
        Some(kind)
    }
}

/// A single token with its optional textual payload and source position.
///
/// The payload is only meaningful for identifiers and literals; keywords
/// and punctuation carry `None`.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: Option<String>,
    pub span: Span,
}

impl Token {
    /// Creates a payload-less token.
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self {
            kind,
            lexeme: None,
            span,
        }
    }

    /// Creates a token carrying its source text.
    pub fn with_lexeme(kind: TokenKind, lexeme: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            lexeme: Some(lexeme.into()),
            span,
        }
    }

    /// The token's text; empty for payload-less tokens.
    pub fn text(&self) -> &str {
        self.lexeme.as_deref().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_lookup() {
        assert_eq!(TokenKind::keyword("while"), Some(TokenKind::KwWhile));
        assert_eq!(TokenKind::keyword("Ifj"), Some(TokenKind::KwIfj));
        assert_eq!(TokenKind::keyword("Null"), Some(TokenKind::KwNullType));
        assert_eq!(TokenKind::keyword("null"), Some(TokenKind::KwNull));
        assert_eq!(TokenKind::keyword("main"), None);
        // Keyword matching is exact, not case-insensitive
        assert_eq!(TokenKind::keyword("While"), None);
    }

    #[test]
    fn test_describe() {
        assert_eq!(TokenKind::Eol.describe(), "EOL");
        assert_eq!(TokenKind::LtEq.describe(), "<=");
        assert_eq!(TokenKind::KwStatic.describe(), "static");
    }

    #[test]
    fn test_token_text() {
        let span = Span::new(1, 1);
        let t = Token::with_lexeme(TokenKind::Ident, "main", span);
        assert_eq!(t.text(), "main");
        assert_eq!(Token::new(TokenKind::Comma, span).text(), "");
    }
}
