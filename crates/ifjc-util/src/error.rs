//! Terminal compiler errors.
//!
//! Every phase of the compiler reports failure through a single
//! [`CompileError`]. Errors are terminal: the first one aborts the
//! compilation, the driver prints it to stderr and exits with the code
//! returned by [`CompileError::exit_code`]. There is no recovery and no
//! multi-error collection; the source language is small enough that one
//! definitive diagnostic is the right user experience.
//!
//! Each message identifies the reporting component (`[SCANNER]`,
//! `[PARSER]`, `[SEMANTIC]`, `[INTERNAL]`), the error class, and where
//! applicable the line and column of the offending construct.

use thiserror::Error;

use crate::span::Span;

/// Result type alias used across all compiler phases.
pub type Result<T> = std::result::Result<T, CompileError>;

/// A fatal compilation error.
///
/// The variant determines the process exit code; the message carries the
/// site-specific detail, including an expected-vs-found summary where the
/// reporting code can provide one.
#[derive(Debug, Error)]
pub enum CompileError {
    /// Unexpected byte, unterminated literal or unterminated comment.
    #[error("[SCANNER] LexicalError:{span}: {message}")]
    Lexical { span: Span, message: String },

    /// Unexpected token.
    #[error("[PARSER] SyntaxError:{span}: {message}")]
    Syntax { span: Span, message: String },

    /// Undefined function, or a non-function used as one.
    #[error("[SEMANTIC] UndefinedFunctionError: {message}")]
    UndefinedFunction { message: String },

    /// Redefinition of a function, getter, setter or variable.
    #[error("[SEMANTIC] RedefinitionError:{span}: {message}")]
    Redefinition { span: Span, message: String },

    /// Call with an argument count not matching any declaration.
    #[error("[SEMANTIC] ArgumentCountError:{span}: {message}")]
    WrongArgumentCount { span: Span, message: String },

    /// Compile-time type incompatibility (both operand types known).
    #[error("[SEMANTIC] TypeError:{span}: {message}")]
    TypeIncompatibility { span: Span, message: String },

    /// Any other semantic violation, e.g. use of an undeclared variable.
    #[error("[SEMANTIC] Error:{span}: {message}")]
    OtherSemantic { span: Span, message: String },

    /// Invariant violation inside the compiler itself.
    #[error("[INTERNAL] FatalError: {message}")]
    Internal { message: String },
}

impl CompileError {
    /// The process exit code carried by this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CompileError::Lexical { .. } => 1,
            CompileError::Syntax { .. } => 2,
            CompileError::UndefinedFunction { .. } => 3,
            CompileError::Redefinition { .. } => 4,
            CompileError::WrongArgumentCount { .. } => 5,
            CompileError::TypeIncompatibility { .. } => 6,
            CompileError::OtherSemantic { .. } => 10,
            CompileError::Internal { .. } => 99,
        }
    }

    /// Lexical error at `span`.
    pub fn lexical(span: Span, message: impl Into<String>) -> Self {
        CompileError::Lexical {
            span,
            message: message.into(),
        }
    }

    /// Syntax error at `span`.
    pub fn syntax(span: Span, message: impl Into<String>) -> Self {
        CompileError::Syntax {
            span,
            message: message.into(),
        }
    }

    /// Undefined-function error; positionless because it is usually raised
    /// by the end-of-parse sweep over the global table.
    pub fn undefined_function(message: impl Into<String>) -> Self {
        CompileError::UndefinedFunction {
            message: message.into(),
        }
    }

    /// Redefinition error at `span`.
    pub fn redefinition(span: Span, message: impl Into<String>) -> Self {
        CompileError::Redefinition {
            span,
            message: message.into(),
        }
    }

    /// Wrong-argument-count error at `span`.
    pub fn wrong_argument_count(span: Span, message: impl Into<String>) -> Self {
        CompileError::WrongArgumentCount {
            span,
            message: message.into(),
        }
    }

    /// Compile-time type incompatibility at `span`.
    pub fn type_incompatibility(span: Span, message: impl Into<String>) -> Self {
        CompileError::TypeIncompatibility {
            span,
            message: message.into(),
        }
    }

    /// Other semantic error at `span`.
    pub fn other_semantic(span: Span, message: impl Into<String>) -> Self {
        CompileError::OtherSemantic {
            span,
            message: message.into(),
        }
    }

    /// Internal compiler error.
    pub fn internal(message: impl Into<String>) -> Self {
        CompileError::Internal {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(CompileError::lexical(Span::DUMMY, "x").exit_code(), 1);
        assert_eq!(CompileError::syntax(Span::DUMMY, "x").exit_code(), 2);
        assert_eq!(CompileError::undefined_function("x").exit_code(), 3);
        assert_eq!(CompileError::redefinition(Span::DUMMY, "x").exit_code(), 4);
        assert_eq!(
            CompileError::wrong_argument_count(Span::DUMMY, "x").exit_code(),
            5
        );
        assert_eq!(
            CompileError::type_incompatibility(Span::DUMMY, "x").exit_code(),
            6
        );
        assert_eq!(
            CompileError::other_semantic(Span::DUMMY, "x").exit_code(),
            10
        );
        assert_eq!(CompileError::internal("x").exit_code(), 99);
    }

    #[test]
    fn test_display_carries_component_and_position() {
        let err = CompileError::syntax(Span::new(4, 9), "Unexpected token 'EOL'. Expected: ')'");
        let text = err.to_string();
        assert!(text.starts_with("[PARSER] SyntaxError:4:9:"));
        assert!(text.contains("Expected: ')'"));
    }

    #[test]
    fn test_display_lexical() {
        let err = CompileError::lexical(Span::new(2, 1), "Unterminated block comment, found EOF");
        assert_eq!(
            err.to_string(),
            "[SCANNER] LexicalError:2:1: Unterminated block comment, found EOF"
        );
    }
}
